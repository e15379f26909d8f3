//! Best-time tables stored at the end of Elma levels.
//!
//! The block holds two lists, single player then multiplayer, each with up to
//! ten entries. On disk the whole block is XOR-obfuscated with a keystream
//! that depends only on the byte position, so the same routine both encrypts
//! and decrypts.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use elma_common::strings::{decode_fixed_string, encode_terminated_string};
use elma_common::{BinaryReader, Error as CommonError};

use crate::Result;

/// Entries kept per list.
pub const TOP10_CAPACITY: usize = 10;

/// Player name slot, NUL terminated.
pub const PLAYER_NAME_SLOT: usize = 15;

/// Encrypted block size (two lists).
pub const TOP10_SIZE: usize = 2 * std::mem::size_of::<RawTimeList>();

/// One list as stored on disk.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct RawTimeList {
    pub count: u32,
    /// Hundredths of a second.
    pub times: [u32; TOP10_CAPACITY],
    pub names_1: [[u8; PLAYER_NAME_SLOT]; TOP10_CAPACITY],
    pub names_2: [[u8; PLAYER_NAME_SLOT]; TOP10_CAPACITY],
}

/// Both lists as stored on disk (after decryption).
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct RawTop10 {
    pub single: RawTimeList,
    pub multi: RawTimeList,
}

/// A finished run.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TimeEntry {
    /// Hundredths of a second.
    pub time: u32,
    pub player: String,
    /// Second rider of a multiplayer run.
    pub partner: Option<String>,
}

impl TimeEntry {
    pub fn single(time: u32, player: impl Into<String>) -> Self {
        Self {
            time,
            player: player.into(),
            partner: None,
        }
    }

    pub fn multi(time: u32, player: impl Into<String>, partner: impl Into<String>) -> Self {
        Self {
            time,
            player: player.into(),
            partner: Some(partner.into()),
        }
    }

    #[inline]
    pub fn is_multi(&self) -> bool {
        self.partner.is_some()
    }
}

/// Single and multiplayer best times.
///
/// The lists may be longer than [`TOP10_CAPACITY`] or unsorted in memory;
/// encoding writes the ten fastest of each.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Top10 {
    pub single: Vec<TimeEntry>,
    pub multi: Vec<TimeEntry>,
}

impl Top10 {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.single.is_empty() && self.multi.is_empty()
    }

    /// Add an entry to the list matching its kind, keeping the ten fastest.
    pub fn insert(&mut self, entry: TimeEntry) {
        let list = if entry.is_multi() {
            &mut self.multi
        } else {
            &mut self.single
        };
        merge_list(list, std::slice::from_ref(&entry));
    }

    /// Merge another table into this one.
    ///
    /// Each list becomes the ten fastest of both inputs. Ties keep entries
    /// from `self` first; identical entries are not collapsed.
    pub fn merge(&mut self, other: &Top10) {
        merge_list(&mut self.single, &other.single);
        merge_list(&mut self.multi, &other.multi);
    }

    /// Decrypt and parse an on-disk block.
    pub fn decode(block: &[u8; TOP10_SIZE]) -> Result<Self> {
        let mut plain = *block;
        crypt_top10(&mut plain);

        let raw: RawTop10 = BinaryReader::new(&plain).read_struct()?;
        Ok(Self {
            single: read_list(raw.single, false)?,
            multi: read_list(raw.multi, true)?,
        })
    }

    /// Serialize and encrypt both lists.
    ///
    /// Entries are filed by [`TimeEntry::is_multi`], not by the list that
    /// holds them, so a partner is never dropped.
    pub fn encode(&self) -> Result<[u8; TOP10_SIZE]> {
        let all = || self.single.iter().chain(&self.multi);
        let raw = RawTop10 {
            single: write_list(all().filter(|entry| !entry.is_multi()).collect())?,
            multi: write_list(all().filter(|entry| entry.is_multi()).collect())?,
        };

        let mut block = [0u8; TOP10_SIZE];
        block.copy_from_slice(raw.as_bytes());
        crypt_top10(&mut block);
        Ok(block)
    }
}

fn merge_list(list: &mut Vec<TimeEntry>, other: &[TimeEntry]) {
    list.extend_from_slice(other);
    list.sort_by_key(|entry| entry.time);
    list.truncate(TOP10_CAPACITY);
}

fn read_list(raw: RawTimeList, multi: bool) -> Result<Vec<TimeEntry>> {
    let count = raw.count;
    let count = usize::try_from(count)
        .ok()
        .filter(|count| *count <= TOP10_CAPACITY)
        .ok_or_else(|| CommonError::BadFormat(format!("top10 count {count} exceeds {TOP10_CAPACITY}")))?;

    let times = raw.times;
    let names_1 = raw.names_1;
    let names_2 = raw.names_2;

    Ok((0..count)
        .map(|i| {
            let player = decode_fixed_string(&names_1[i]);
            if multi {
                TimeEntry::multi(times[i], player, decode_fixed_string(&names_2[i]))
            } else {
                TimeEntry::single(times[i], player)
            }
        })
        .collect())
}

fn write_list(mut sorted: Vec<&TimeEntry>) -> Result<RawTimeList> {
    sorted.sort_by_key(|entry| entry.time);
    sorted.truncate(TOP10_CAPACITY);

    let mut times = [0u32; TOP10_CAPACITY];
    let mut names_1 = [[0u8; PLAYER_NAME_SLOT]; TOP10_CAPACITY];
    let mut names_2 = [[0u8; PLAYER_NAME_SLOT]; TOP10_CAPACITY];

    for (i, entry) in sorted.iter().enumerate() {
        times[i] = entry.time;
        names_1[i] = encode_terminated_string::<PLAYER_NAME_SLOT>(&entry.player)?;
        // Single-player rows repeat the player in the second slot.
        let second = entry.partner.as_deref().unwrap_or(&entry.player);
        names_2[i] = encode_terminated_string::<PLAYER_NAME_SLOT>(second)?;
    }

    Ok(RawTimeList {
        count: sorted.len() as u32,
        times,
        names_1,
        names_2,
    })
}

/// XOR the block with its position-dependent keystream. Applying it twice
/// restores the input.
pub fn crypt_top10(buffer: &mut [u8]) {
    let mut ebp8: i16 = 0x15;
    let mut ebp10: i16 = 0x2637;

    for byte in buffer.iter_mut().take(TOP10_SIZE) {
        *byte ^= (ebp8 & 0xFF) as u8;
        ebp10 = ebp10.wrapping_add((ebp8 % 0xD3D).wrapping_mul(0xD3D));
        ebp8 = ebp10.wrapping_mul(0x1F).wrapping_add(0xD3D);
    }
}
