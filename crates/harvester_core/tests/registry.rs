use harvester_core::{PostRegistry, PostStatus};

const BASE: &str = "https://x";

fn registry_with(available: &[&str], downloaded: &[&str]) -> PostRegistry {
    let mut registry = PostRegistry::new(BASE);
    registry.add_posts(available, PostStatus::Available);
    registry.add_posts(downloaded, PostStatus::Downloaded);
    registry
}

#[test]
fn relative_links_are_prefixed_with_base_url() {
    let mut registry = PostRegistry::new(BASE);
    registry.add_post("p", PostStatus::Available);
    assert_eq!(registry.available().to_vec(), vec!["https://x/p"]);

    registry.add_post("https://x/p", PostStatus::Available);
    assert_eq!(registry.available().len(), 1);
}

#[test]
fn leading_slash_does_not_double_up() {
    let mut registry = PostRegistry::new(BASE);
    registry.add_posts(["/p/abc/", "p/abc/"], PostStatus::Available);
    assert_eq!(registry.available().to_vec(), vec!["https://x/p/abc/"]);
}

#[test]
fn status_selects_target_set() {
    let registry = registry_with(&["a"], &["b"]);
    assert_eq!(registry.available().to_vec(), vec!["https://x/a"]);
    assert_eq!(registry.downloaded().to_vec(), vec!["https://x/b"]);
    assert!(registry.is_downloaded("b"));
    assert!(!registry.is_downloaded("a"));
}

#[test]
fn pending_posts_skip_downloaded_in_discovery_order() {
    let registry = registry_with(&["a", "b", "c"], &["b"]);
    let pending: Vec<_> = registry.pending_posts().collect();
    assert_eq!(pending, vec!["https://x/a", "https://x/c"]);
    assert_eq!(registry.pending_count(), 2);
}

#[test]
fn pending_posts_reflect_current_state_on_each_query() {
    let mut registry = registry_with(&["a", "b"], &[]);
    assert_eq!(registry.pending_count(), 2);

    registry.add_post("a", PostStatus::Downloaded);
    let pending: Vec<_> = registry.pending_posts().collect();
    assert_eq!(pending, vec!["https://x/b"]);
}

#[test]
fn cursor_sees_mutations_between_pulls() {
    let mut registry = registry_with(&["a", "b", "c"], &[]);
    let mut cursor = registry.pending_cursor();

    assert_eq!(cursor.next_pending(&registry).as_deref(), Some("https://x/a"));
    registry.add_post("a", PostStatus::Downloaded);
    // Downloaded ahead of the cursor: must not be yielded.
    registry.add_post("c", PostStatus::Downloaded);
    // Discovered after the walk started: still reached.
    registry.add_post("d", PostStatus::Available);

    assert_eq!(cursor.next_pending(&registry).as_deref(), Some("https://x/b"));
    assert_eq!(cursor.next_pending(&registry).as_deref(), Some("https://x/d"));
    assert_eq!(cursor.next_pending(&registry), None);
}

#[test]
fn downloaded_links_outside_available_are_kept() {
    let registry = registry_with(&["a"], &["gone"]);
    assert_eq!(registry.downloaded().len(), 1);
    assert_eq!(registry.pending_count(), 1);
}
