use harvester_core::{PostStatus, Profile, ProgressSnapshot};
use pretty_assertions::assert_eq;

fn init_logging() {
    engine_logging::initialize_for_tests();
}

#[test]
fn snapshot_round_trip_reproduces_registry_order() {
    init_logging();
    let mut profile = Profile::new("someone", "https://x");
    profile
        .registry_mut()
        .add_posts(["/p/3/", "/p/1/", "/p/2/"], PostStatus::Available);
    profile.registry_mut().add_post("/p/1/", PostStatus::Downloaded);

    let snapshot = ProgressSnapshot::capture(&profile);
    assert_eq!(snapshot.total, 3);
    assert_eq!(snapshot.total_downloaded, 1);
    assert_eq!(snapshot.progress, 33.33);

    let json = serde_json::to_string_pretty(&snapshot).unwrap();
    let decoded: ProgressSnapshot = serde_json::from_str(&json).unwrap();

    let mut restored = Profile::new("someone", "https://x");
    decoded.restore_into(&mut restored);
    assert_eq!(restored.registry(), profile.registry());
    assert_eq!(
        restored.registry().available().to_vec(),
        vec!["https://x/p/3/", "https://x/p/1/", "https://x/p/2/"]
    );
}

#[test]
fn snapshot_uses_persisted_field_names() {
    let profile = Profile::new("someone", "https://x");
    let value = serde_json::to_value(ProgressSnapshot::capture(&profile)).unwrap();
    for key in [
        "profile",
        "total",
        "total_downloaded",
        "progress",
        "available_posts",
        "downloaded_posts",
    ] {
        assert!(value.get(key).is_some(), "missing {key}");
    }
}

#[test]
fn profile_paths_derive_from_name() {
    let profile = Profile::new("someone", "https://x/");
    assert_eq!(profile.feed_url(), "https://x/someone");
    assert_eq!(
        profile.snapshot_file(),
        std::path::Path::new("someone").join("someone-profile.json")
    );
    assert_eq!(
        profile.post_folder("20240102-03_04"),
        std::path::Path::new("someone").join("20240102-03_04")
    );
    assert_eq!(profile.to_string(), "Profile(someone)");
}

#[test]
fn profile_registry_resolves_links_against_profile_base_url() {
    let mut profile = Profile::new("someone", "https://x/");
    profile
        .registry_mut()
        .add_posts(["/p/1/", "https://x/p/1/"], PostStatus::Available);

    assert_eq!(profile.registry().base_url(), "https://x/");
    assert_eq!(profile.registry().available().to_vec(), vec!["https://x/p/1/"]);
}
