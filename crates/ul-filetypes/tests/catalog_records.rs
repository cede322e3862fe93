use std::fs;

use tempfile::tempdir;
use ul_filetypes::{append_ul_cfg, read_ul_cfg, MediaKind, UlEntry, UL_ENTRY_SIZE};

fn entry(game_id: &str, name: &str, media: MediaKind) -> UlEntry {
    UlEntry {
        game_id: game_id.to_string(),
        name: name.to_string(),
        media,
    }
}

#[test]
fn round_trips_an_entry_through_the_record_codec() {
    let original = entry("SLUS_203", "Shadow of the Colossus", MediaKind::Dvd);

    let record = original.to_bytes();
    assert_eq!(record.len(), UL_ENTRY_SIZE);
    assert_eq!(UlEntry::from_bytes(&record), original);
}

#[test]
fn encode_truncates_fields_to_record_widths() {
    let original = entry(
        "SLUS_20312345",
        "A name that is much longer than the thirty-two byte field allows",
        MediaKind::Cd,
    );

    let decoded = UlEntry::from_bytes(&original.to_bytes());
    assert_eq!(decoded.game_id, "SLUS_203");
    assert_eq!(decoded.name.len(), 32);
    assert!(original.name.starts_with(&decoded.name));
}

#[test]
fn nonzero_type_flags_decode_as_dvd() {
    let mut record = entry("TEST_001", "Test", MediaKind::Cd).to_bytes();
    record[40] = 7;

    assert_eq!(UlEntry::from_bytes(&record).media, MediaKind::Dvd);
}

#[test]
fn missing_catalog_reads_as_empty() {
    let dir = tempdir().expect("temp dir");

    let entries = read_ul_cfg(&dir.path().join("ul.cfg")).expect("read absent catalog");
    assert!(entries.is_empty());
}

#[test]
fn appends_keep_the_catalog_well_formed() {
    let dir = tempdir().expect("temp dir");
    let catalog = dir.path().join("ul.cfg");

    let titles = [
        entry("SLUS_210", "First", MediaKind::Cd),
        entry("SLES_543", "Second", MediaKind::Dvd),
        entry("SCUS_973", "Third", MediaKind::Cd),
    ];
    for title in &titles {
        append_ul_cfg(&catalog, title).expect("append entry");
    }

    let on_disk = fs::metadata(&catalog).expect("catalog metadata").len();
    assert_eq!(on_disk, (titles.len() * UL_ENTRY_SIZE) as u64);

    let read_back = read_ul_cfg(&catalog).expect("read catalog");
    assert_eq!(read_back, titles);
}

#[test]
fn read_ignores_a_trailing_partial_record() {
    let dir = tempdir().expect("temp dir");
    let catalog = dir.path().join("ul.cfg");

    let mut bytes = entry("SLUS_210", "Kept", MediaKind::Cd).to_bytes().to_vec();
    bytes.extend_from_slice(&[0xAB; 20]);
    fs::write(&catalog, bytes).expect("write catalog with partial tail");

    let entries = read_ul_cfg(&catalog).expect("read catalog");
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].name, "Kept");
}

#[test]
fn append_heals_a_trailing_partial_record() {
    let dir = tempdir().expect("temp dir");
    let catalog = dir.path().join("ul.cfg");

    let mut bytes = entry("SLUS_210", "Kept", MediaKind::Cd).to_bytes().to_vec();
    bytes.extend_from_slice(&[0xAB; 20]);
    fs::write(&catalog, bytes).expect("write catalog with partial tail");

    append_ul_cfg(&catalog, &entry("SLES_543", "New", MediaKind::Dvd)).expect("append entry");

    let on_disk = fs::metadata(&catalog).expect("catalog metadata").len();
    assert_eq!(on_disk % UL_ENTRY_SIZE as u64, 0);

    let entries = read_ul_cfg(&catalog).expect("read catalog");
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].name, "Kept");
    assert_eq!(entries[1].name, "New");
}
