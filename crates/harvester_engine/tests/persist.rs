mod common;

use std::fs;

use common::{init_logging, BASE_URL};
use harvester_core::{PostStatus, Profile};
use harvester_engine::{ensure_output_dir, AtomicFileWriter, ProgressStore, SnapshotError};
use tempfile::TempDir;

#[test]
fn creates_missing_output_dir() {
    let temp = TempDir::new().unwrap();
    let new_dir = temp.path().join("someone").join("20240102-03_04");
    assert!(!new_dir.exists());
    ensure_output_dir(&new_dir).unwrap();
    assert!(new_dir.is_dir());
}

#[test]
fn atomic_write_replaces_existing_file() {
    let temp = TempDir::new().unwrap();
    let writer = AtomicFileWriter::new(temp.path().to_path_buf());

    let first = writer.write("someone-profile.json", "hello").unwrap();
    assert_eq!(first.file_name().unwrap(), "someone-profile.json");
    assert_eq!(fs::read_to_string(&first).unwrap(), "hello");

    let second = writer.write_bytes("someone-profile.json", b"world").unwrap();
    assert_eq!(first, second);
    assert_eq!(fs::read_to_string(&second).unwrap(), "world");
}

#[test]
fn overwriting_leaves_only_the_target_file() {
    let temp = TempDir::new().unwrap();
    let writer = AtomicFileWriter::new(temp.path().to_path_buf());

    for round in 0..3 {
        let path = writer
            .write("someone-profile.json", &format!("round {round}"))
            .unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), format!("round {round}"));
    }

    let names: Vec<_> = fs::read_dir(temp.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name())
        .collect();
    assert_eq!(names, vec!["someone-profile.json"]);
}

#[test]
fn no_partial_file_on_error() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("not_a_dir");
    fs::write(&file_path, "x").unwrap();

    let writer = AtomicFileWriter::new(file_path.clone());
    let result = writer.write("00-TXT.txt", "data");
    assert!(result.is_err());
    assert!(!file_path.with_file_name("00-TXT.txt").exists());
}

#[test]
fn snapshot_is_written_with_two_space_indent() {
    init_logging();
    let temp = TempDir::new().unwrap();
    let store = ProgressStore::new(temp.path());
    let mut profile = Profile::new("someone", BASE_URL);
    profile.registry_mut().add_post("/p/1/", PostStatus::Available);

    store.save(&profile);

    let path = temp.path().join("someone").join("someone-profile.json");
    assert_eq!(store.snapshot_path(&profile), path);
    let text = fs::read_to_string(path).unwrap();
    assert!(text.contains("\n  \"profile\": \"someone\""));
    assert!(text.contains("\"available_posts\": [\n    \"https://feed.test/p/1/\"\n  ]"));
}

#[test]
fn snapshot_round_trip_restores_registry() {
    init_logging();
    let temp = TempDir::new().unwrap();
    let store = ProgressStore::new(temp.path());
    let mut profile = Profile::new("someone", BASE_URL);
    profile
        .registry_mut()
        .add_posts(["/p/b/", "/p/a/", "/p/c/"], PostStatus::Available);
    profile
        .registry_mut()
        .add_posts(["/p/c/", "/p/b/"], PostStatus::Downloaded);
    store.write(&profile).unwrap();

    let mut restored = Profile::new("someone", BASE_URL);
    store.restore(&mut restored);

    assert_eq!(restored.registry(), profile.registry());
    let pending: Vec<_> = restored.registry().pending_posts().collect();
    assert_eq!(pending, vec!["https://feed.test/p/a/"]);
}

#[test]
fn missing_snapshot_leaves_registry_empty() {
    init_logging();
    let temp = TempDir::new().unwrap();
    let store = ProgressStore::new(temp.path());
    let mut profile = Profile::new("someone", BASE_URL);

    assert!(matches!(store.read(&profile), Err(SnapshotError::Missing(_))));
    store.restore(&mut profile);
    assert!(profile.registry().available().is_empty());
}

#[test]
fn corrupt_snapshot_leaves_registry_empty() {
    init_logging();
    let temp = TempDir::new().unwrap();
    let store = ProgressStore::new(temp.path());
    let mut profile = Profile::new("someone", BASE_URL);
    let path = store.snapshot_path(&profile);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, "{ \"profile\": ").unwrap();

    assert!(matches!(
        store.read(&profile),
        Err(SnapshotError::Corrupt { .. })
    ));
    store.restore(&mut profile);
    assert!(profile.registry().available().is_empty());
    assert!(profile.registry().downloaded().is_empty());
}
