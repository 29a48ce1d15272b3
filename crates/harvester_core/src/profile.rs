use std::fmt;
use std::path::PathBuf;

use crate::PostRegistry;

const SNAPSHOT_SUFFIX: &str = "-profile.json";
const LOG_FILENAME: &str = "execution.log";

/// The feed owner being harvested. All on-disk paths derive from `name` and
/// are relative to the output root chosen by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    name: String,
    base_url: String,
    feed_url: String,
    registry: PostRegistry,
}

impl Profile {
    pub fn new(name: impl Into<String>, base_url: impl Into<String>) -> Self {
        let name = name.into();
        let base_url = base_url.into();
        let feed_url = format!("{}/{}", base_url.trim_end_matches('/'), name);
        Self {
            registry: PostRegistry::new(base_url.clone()),
            name,
            base_url,
            feed_url,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn feed_url(&self) -> &str {
        &self.feed_url
    }

    pub fn registry(&self) -> &PostRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut PostRegistry {
        &mut self.registry
    }

    pub fn folder(&self) -> PathBuf {
        PathBuf::from(&self.name)
    }

    /// `{name}/{name}-profile.json`
    pub fn snapshot_file(&self) -> PathBuf {
        self.folder().join(format!("{}{SNAPSHOT_SUFFIX}", self.name))
    }

    pub fn log_file(&self) -> PathBuf {
        self.folder().join(LOG_FILENAME)
    }

    /// `{name}/{timestamp}` for one downloaded post.
    pub fn post_folder(&self, timestamp: &str) -> PathBuf {
        self.folder().join(timestamp)
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Profile({})", self.name)
    }
}
