use elma_lev::{
    Error, Gravity, Level, Object, ObjectKind, Picture, Polygon, Position, TimeEntry, Top10,
    Version, END_OF_DATA,
};

const LINK: u32 = 2_535_781_587;

fn triangle() -> Polygon {
    Polygon::new(vec![
        Position::new(0.0, 0.0),
        Position::new(0.0, 1.0),
        Position::new(1.0, 0.0),
    ])
}

fn food(gravity: Gravity) -> ObjectKind {
    ObjectKind::Food {
        gravity,
        animation: 1,
    }
}

fn objects(kinds: &[ObjectKind]) -> Vec<Object> {
    kinds
        .iter()
        .map(|kind| Object::new(Position::default(), *kind))
        .collect()
}

fn common(err: Error) -> elma_common::Error {
    match err {
        Error::Common(inner) => inner,
        other => panic!("expected a layout error, got {other:?}"),
    }
}

fn sample_level() -> Level {
    let mut level = Level {
        link: LINK,
        polygons: vec![triangle()],
        pictures: vec![Picture::new(Position::default())],
        objects: objects(&[
            ObjectKind::Flower,
            ObjectKind::Start,
            ObjectKind::Killer,
            ObjectKind::FOOD,
            food(Gravity::Up),
            food(Gravity::Down),
            food(Gravity::Left),
            food(Gravity::Right),
            food(Gravity::Normal),
        ]),
        ..Level::default()
    };
    level.top10.single.push(TimeEntry::single(1386, "player1"));
    level.top10.single.push(TimeEntry::single(1379, "player2"));
    level.top10.multi.push(TimeEntry::multi(709, "player3", "player2"));
    level.top10.multi.push(TimeEntry::multi(714, "player4", "player1"));
    level
}

#[test]
fn elma_level_round_trip() {
    let original = sample_level();
    let level = Level::decode(&original.encode().unwrap()).unwrap();

    assert_eq!(level.version, Version::Elma);
    assert_eq!(level.link, LINK);
    assert_eq!(level.name, "Unnamed");
    assert_eq!(level.lgr, "DEFAULT");
    assert_eq!(level.ground, "ground");
    assert_eq!(level.sky, "sky");

    assert_eq!(level.polygons, vec![triangle()]);
    assert_eq!(level.pictures, original.pictures);
    assert_eq!(level.objects.len(), 9);
    assert_eq!(level.objects, original.objects);

    assert_eq!(
        level.top10.single,
        vec![TimeEntry::single(1379, "player2"), TimeEntry::single(1386, "player1")]
    );
    assert_eq!(
        level.top10.multi,
        vec![
            TimeEntry::multi(709, "player3", "player2"),
            TimeEntry::multi(714, "player4", "player1"),
        ]
    );
}

#[test]
fn merge_decoded_best_times() {
    let mut level = Level::decode(&sample_level().encode().unwrap()).unwrap();

    let mut newer = Top10::new();
    newer.single.push(TimeEntry::single(1383, "player2"));
    newer.multi.push(TimeEntry::multi(714, "player1", "player5"));
    level.top10.merge(&newer);

    assert_eq!(
        level.top10.single,
        vec![
            TimeEntry::single(1379, "player2"),
            TimeEntry::single(1383, "player2"),
            TimeEntry::single(1386, "player1"),
        ]
    );
    assert_eq!(
        level.top10.multi,
        vec![
            TimeEntry::multi(709, "player3", "player2"),
            TimeEntry::multi(714, "player4", "player1"),
            TimeEntry::multi(714, "player1", "player5"),
        ]
    );

    // Merged times survive another trip through the file.
    let again = Level::decode(&level.encode().unwrap()).unwrap();
    assert_eq!(again.top10, level.top10);
}

#[test]
fn across_level_round_trip() {
    let original = Level {
        version: Version::Across,
        link: LINK,
        polygons: vec![triangle()],
        objects: objects(&[
            ObjectKind::Flower,
            ObjectKind::Start,
            ObjectKind::Killer,
            ObjectKind::FOOD,
        ]),
        ..Level::default()
    };

    let bytes = original.encode().unwrap();
    assert_eq!(&bytes[..5], b"POT06");
    let tail = u32::from_le_bytes(bytes[bytes.len() - 4..].try_into().unwrap());
    assert_eq!(tail, END_OF_DATA);

    let level = Level::decode(&bytes).unwrap();
    assert_eq!(level.version, Version::Across);
    assert_eq!(level.link, LINK);
    assert_eq!(level.name, "Unnamed");
    assert_eq!(level.polygons, vec![triangle()]);
    assert_eq!(level.objects, original.objects);
}

#[test]
fn unknown_versions_are_rejected() {
    let mut bytes = sample_level().encode().unwrap();
    bytes[3..5].copy_from_slice(b"99");
    assert!(matches!(
        Level::decode(&bytes),
        Err(Error::UnsupportedVersion(version)) if version == "POT99"
    ));

    // Any magic other than the two known ones names an unknown version.
    bytes[..5].copy_from_slice(b"ABC14");
    assert!(matches!(
        Level::decode(&bytes),
        Err(Error::UnsupportedVersion(version)) if version == "ABC14"
    ));
}

#[test]
fn oversized_counts_are_truncation() {
    let mut bytes = Level {
        link: LINK,
        ..Level::default()
    }
    .encode()
    .unwrap();

    // Claim a million polygons in an otherwise empty level.
    bytes[130..138].copy_from_slice(&(1_000_000.0f64 + 0.4643643).to_le_bytes());
    assert!(matches!(
        common(Level::decode(&bytes).unwrap_err()),
        elma_common::Error::TruncatedInput { .. }
    ));

    bytes[130..138].copy_from_slice(&(-5.0f64).to_le_bytes());
    assert!(matches!(
        common(Level::decode(&bytes).unwrap_err()),
        elma_common::Error::BadFormat(_)
    ));
}

#[test]
fn bad_sentinels_are_bad_format() {
    let bytes = sample_level().encode().unwrap();

    let mut broken = bytes.clone();
    let end = broken.len() - 4;
    broken[end] ^= 0x01;
    assert!(matches!(
        common(Level::decode(&broken).unwrap_err()),
        elma_common::Error::BadFormat(_)
    ));

    let mut broken = bytes;
    let end_of_data = broken.len() - 4 - 688 - 4;
    broken[end_of_data] ^= 0x01;
    assert!(matches!(
        common(Level::decode(&broken).unwrap_err()),
        elma_common::Error::BadFormat(_)
    ));
}

#[test]
fn truncated_level_is_reported() {
    let bytes = sample_level().encode().unwrap();
    for cut in [3, 100, 200, bytes.len() - 2] {
        assert!(matches!(
            common(Level::decode(&bytes[..cut]).unwrap_err()),
            elma_common::Error::TruncatedInput { .. }
        ));
    }
}

#[test]
fn names_must_fit_their_slots() {
    let level = Level {
        name: "x".repeat(51),
        ..Level::default()
    };
    assert!(matches!(
        common(level.encode().unwrap_err()),
        elma_common::Error::NameTooLong { max: 50, .. }
    ));

    let level = Level {
        name: "x".repeat(51),
        version: Version::Across,
        ..Level::default()
    };
    assert!(level.encode().is_ok());

    let level = Level {
        pictures: vec![Picture::named(Position::default(), "longpicture")],
        ..Level::default()
    };
    assert!(matches!(
        common(level.encode().unwrap_err()),
        elma_common::Error::NameTooLong { max: 9, .. }
    ));
}
