//! Elma CLI - Command-line tool for Elasto Mania level and LGR files.
//!
//! This is the main entry point for the Elma command-line application.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use glob::{MatchOptions, Pattern};
use image::RgbaImage;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;

use elma::prelude::*;

/// Elma - Elasto Mania level and LGR tool
#[derive(Parser)]
#[command(name = "elma")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List images in an LGR file
    LgrList {
        /// Path to the LGR file
        #[arg(short, long, env = "ELMA_LGR")]
        lgr: PathBuf,

        /// Filter pattern (glob-style)
        #[arg(short, long)]
        filter: Option<String>,
    },

    /// Export LGR images as PNG files
    LgrExtract {
        /// Path to the LGR file
        #[arg(short, long, env = "ELMA_LGR")]
        lgr: PathBuf,

        /// Output directory
        #[arg(short, long)]
        output: PathBuf,

        /// Filter pattern (glob-style)
        #[arg(short, long)]
        filter: Option<String>,
    },

    /// Decode and re-encode an LGR file
    LgrRepack {
        /// Path to the LGR file
        #[arg(short, long, env = "ELMA_LGR")]
        lgr: PathBuf,

        /// Output LGR file
        #[arg(short, long)]
        output: PathBuf,

        /// Give every paletted image the palette of this image
        #[arg(long)]
        palette_from: Option<String>,
    },

    /// Show the contents of a level
    LevInfo {
        /// Path to the level file
        #[arg(short, long, env = "ELMA_LEV")]
        lev: PathBuf,

        /// Print the whole level as JSON
        #[arg(long)]
        json: bool,

        /// Check the stored integrity values
        #[arg(long)]
        verify: bool,
    },

    /// Merge best times from other copies of a level
    LevMergeTimes {
        /// Level receiving the times
        #[arg(short, long, env = "ELMA_LEV")]
        lev: PathBuf,

        /// Levels to take times from
        #[arg(short, long, required = true)]
        from: Vec<PathBuf>,

        /// Output file (defaults to overwriting the level)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::LgrList { lgr, filter } => {
            cmd_lgr_list(&lgr, filter.as_deref())?;
        }
        Commands::LgrExtract { lgr, output, filter } => {
            cmd_lgr_extract(&lgr, &output, filter.as_deref())?;
        }
        Commands::LgrRepack {
            lgr,
            output,
            palette_from,
        } => {
            cmd_lgr_repack(&lgr, &output, palette_from.as_deref())?;
        }
        Commands::LevInfo { lev, json, verify } => {
            cmd_lev_info(&lev, json, verify)?;
        }
        Commands::LevMergeTimes { lev, from, output } => {
            cmd_lev_merge_times(&lev, &from, output.as_deref())?;
        }
    }

    Ok(())
}

fn open_lgr(path: &Path) -> Result<LgrArchive> {
    LgrArchive::from_file(path).with_context(|| format!("Failed to open LGR {}", path.display()))
}

fn cmd_lgr_list(lgr_path: &Path, filter: Option<&str>) -> Result<()> {
    let filter = NameFilter::new(filter)?;
    let lgr = open_lgr(lgr_path)?;

    let mut count = 0;
    for entry in lgr.iter().filter(|e| filter.matches(e.name())) {
        let raster = entry.raster();
        let size = format!("{}x{}", raster.width(), raster.height());
        match entry.info() {
            Some(info) => println!(
                "{:<8} {:>9} {:<8?} {:>3} {:<9?} {:?}",
                entry.name(),
                size,
                info.image_type,
                info.distance,
                info.clipping,
                info.transparency
            ),
            None => println!("{:<8} {:>9} special", entry.name(), size),
        }
        count += 1;
    }

    println!("\nTotal: {} images", count);

    Ok(())
}

fn cmd_lgr_extract(lgr_path: &Path, output: &Path, filter: Option<&str>) -> Result<()> {
    let filter = NameFilter::new(filter)?;
    println!("Opening LGR: {}", lgr_path.display());

    let start = Instant::now();
    let lgr = open_lgr(lgr_path)?;
    println!("Loaded {} images in {:?}", lgr.len(), start.elapsed());

    let entries: Vec<&LgrEntry> = lgr
        .iter()
        .filter(|e| filter.matches(e.name()))
        .collect();

    println!("Extracting {} images...", entries.len());

    let pb = ProgressBar::new(entries.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
            .progress_chars("#>-"),
    );

    fs::create_dir_all(output)?;

    entries.par_iter().try_for_each(|entry| -> Result<()> {
        let raster = entry.raster();
        // Special images have no rule of their own; the game keys them on the top-left pixel.
        let rule = entry
            .info()
            .map_or(Transparency::TopLeft, |info| info.transparency);
        let rgba = raster.to_rgba(raster.transparent_index(rule));

        let image = RgbaImage::from_raw(u32::from(raster.width()), u32::from(raster.height()), rgba)
            .with_context(|| format!("Pixel buffer of {} does not match its size", entry.name()))?;
        let path = output.join(png_file_name(entry.name())?);
        image
            .save(&path)
            .with_context(|| format!("Failed to write {}", path.display()))?;

        pb.inc(1);
        Ok(())
    })?;

    pb.finish_with_message("Done");
    println!("Extraction completed in {:?}", start.elapsed());

    Ok(())
}

fn cmd_lgr_repack(lgr_path: &Path, output: &Path, palette_from: Option<&str>) -> Result<()> {
    let mut lgr = open_lgr(lgr_path)?;

    if let Some(name) = palette_from {
        let index = lgr
            .find(name)
            .with_context(|| format!("No image named {name}"))?;
        let palette = lgr
            .get(index)
            .and_then(|entry| entry.raster().palette())
            .cloned()
            .with_context(|| format!("Image {name} has no palette"))?;

        let recoloured = lgr.set_palette(&palette);
        println!("Applied the palette of {name} to {recoloured} images");
    }

    lgr.write_to_file(output)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    let listed = lgr.iter().filter(|e| e.is_listed()).count();
    println!(
        "Wrote {} images ({} in pictures.lst) to {}",
        lgr.len(),
        listed,
        output.display()
    );

    Ok(())
}

fn open_level(path: &Path, options: DecodeOptions) -> Result<Level> {
    let data = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    Level::decode_with(&data, options).with_context(|| format!("Failed to parse level {}", path.display()))
}

fn cmd_lev_info(lev_path: &Path, json: bool, verify: bool) -> Result<()> {
    let level = open_level(
        lev_path,
        DecodeOptions {
            verify_integrity: verify,
        },
    )?;

    if json {
        println!("{}", serde_json::to_string_pretty(&level)?);
        return Ok(());
    }

    println!("Name:     {}", level.name);
    println!("Version:  {:?}", level.version);
    println!("Link:     {}", level.link);
    println!("LGR:      {}", level.lgr);
    println!("Textures: {} / {}", level.ground, level.sky);

    let grass = level.polygons.iter().filter(|p| p.grass).count();
    println!("Polygons: {} ({} grass)", level.polygons.len(), grass);

    let count = |wanted: fn(&ObjectKind) -> bool| level.objects.iter().filter(|o| wanted(&o.kind)).count();
    println!(
        "Objects:  {} apples, {} flowers, {} killers, {} starts",
        count(|k| matches!(k, ObjectKind::Food { .. })),
        count(|k| matches!(k, ObjectKind::Flower)),
        count(|k| matches!(k, ObjectKind::Killer)),
        count(|k| matches!(k, ObjectKind::Start)),
    );
    println!("Pictures: {}", level.pictures.len());

    for (title, list) in [("Single", &level.top10.single), ("Multi", &level.top10.multi)] {
        if list.is_empty() {
            continue;
        }
        println!("\n{title} best times:");
        for (rank, entry) in list.iter().enumerate() {
            match &entry.partner {
                Some(partner) => println!(
                    "{:>3}. {:>9}  {} & {}",
                    rank + 1,
                    format_time(entry.time),
                    entry.player,
                    partner
                ),
                None => println!("{:>3}. {:>9}  {}", rank + 1, format_time(entry.time), entry.player),
            }
        }
    }

    Ok(())
}

fn cmd_lev_merge_times(lev_path: &Path, sources: &[PathBuf], output: Option<&Path>) -> Result<()> {
    let mut level = open_level(lev_path, DecodeOptions::default())?;
    if level.version != Version::Elma {
        bail!("{} has no best-time table", lev_path.display());
    }

    for source in sources {
        let other = open_level(source, DecodeOptions::default())?;
        if other.link != level.link {
            log::warn!(
                "{} has link {} but {} has {}; merging anyway",
                source.display(),
                other.link,
                lev_path.display(),
                level.link
            );
        }
        level.top10.merge(&other.top10);
    }

    let output = output.unwrap_or(lev_path);
    level
        .write_to_file(output)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    println!(
        "Merged {} files: {} single and {} multi times",
        sources.len(),
        level.top10.single.len(),
        level.top10.multi.len()
    );

    Ok(())
}

/// Format hundredths of a second as `m:ss.hh`.
fn format_time(hundredths: u32) -> String {
    let minutes = hundredths / 6000;
    let seconds = hundredths / 100 % 60;
    let rest = hundredths % 100;
    if minutes > 0 {
        format!("{minutes}:{seconds:02}.{rest:02}")
    } else {
        format!("{seconds}.{rest:02}")
    }
}

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: false,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

/// Case-insensitive glob filter over image names. A pattern without
/// wildcards matches any name containing it.
struct NameFilter(Option<Pattern>);

impl NameFilter {
    fn new(pattern: Option<&str>) -> Result<Self> {
        pattern
            .map(|pattern| {
                let pattern = if pattern.contains(['*', '?', '[']) {
                    pattern.to_string()
                } else {
                    format!("*{}*", Pattern::escape(pattern))
                };
                Pattern::new(&pattern).with_context(|| format!("Invalid glob pattern: {pattern}"))
            })
            .transpose()
            .map(Self)
    }

    fn matches(&self, name: &str) -> bool {
        self.0
            .as_ref()
            .map_or(true, |pattern| pattern.matches_with(name, MATCH_OPTIONS))
    }
}

/// PNG file name for an image, refusing names that would leave the output directory.
fn png_file_name(name: &str) -> Result<String> {
    if name.is_empty() || name.contains(['/', '\\']) || name.contains("..") {
        bail!("Refusing to extract image with unsafe name {name:?}");
    }
    Ok(format!("{name}.png"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(1379), "13.79");
        assert_eq!(format_time(6000), "1:00.00");
        assert_eq!(format_time(12345), "2:03.45");
    }

    #[test]
    fn test_name_filter() {
        let matches = |pattern: &str, name: &str| NameFilter::new(Some(pattern)).unwrap().matches(name);

        assert!(matches("qfood*", "QFOOD1"));
        assert!(matches("*up_*", "qup_1"));
        assert!(!matches("q*1", "qfood2"));
        assert!(matches("bar", "barrel"));
        // Trailing literals anchor at the end, wherever they first occur.
        assert!(matches("*a", "aXa"));
        assert!(matches("*r", "barrier"));
        assert!(!matches("*r", "barriers"));

        assert!(NameFilter::new(None).unwrap().matches("anything"));
        assert!(NameFilter::new(Some("[")).is_err());
    }

    #[test]
    fn test_png_file_name() {
        assert_eq!(png_file_name("barrel").unwrap(), "barrel.png");
        assert!(png_file_name("../x").is_err());
        assert!(png_file_name("a/b").is_err());
        assert!(png_file_name("a\\b").is_err());
        assert!(png_file_name("").is_err());
    }
}
