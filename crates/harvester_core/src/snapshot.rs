use serde::{Deserialize, Serialize};

use crate::{PostStatus, Profile};

/// Persisted registry state of one profile, the recovery point of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    pub profile: String,
    pub total: usize,
    pub total_downloaded: usize,
    /// Percentage rounded to two decimals; `0.0` for an empty registry.
    pub progress: f64,
    pub available_posts: Vec<String>,
    pub downloaded_posts: Vec<String>,
}

impl ProgressSnapshot {
    pub fn capture(profile: &Profile) -> Self {
        let registry = profile.registry();
        let total = registry.available().len();
        let total_downloaded = registry.downloaded().len();
        Self {
            profile: profile.name().to_string(),
            total,
            total_downloaded,
            progress: progress_percent(total_downloaded, total),
            available_posts: registry.available().to_vec(),
            downloaded_posts: registry.downloaded().to_vec(),
        }
    }

    /// Seeds the profile's registry with the persisted links, keeping order.
    pub fn restore_into(&self, profile: &mut Profile) {
        profile
            .registry_mut()
            .add_posts(&self.available_posts, PostStatus::Available);
        profile
            .registry_mut()
            .add_posts(&self.downloaded_posts, PostStatus::Downloaded);
    }
}

pub(crate) fn progress_percent(downloaded: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let percent = downloaded as f64 / total as f64 * 100.0;
    (percent * 100.0).round() / 100.0
}
