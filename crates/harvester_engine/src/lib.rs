//! Harvester engine: page automation, downloads, persistence and the
//! discovery/harvest loops.
mod discover;
mod fetch;
mod harvest;
mod page;
mod persist;
mod progress;
mod retry;
mod save;
mod scrape;
mod types;
mod webdriver;

pub use discover::STAGNATION_LIMIT;
pub use fetch::{FetchSettings, MediaFetcher, ReqwestFetcher};
pub use harvest::{Credentials, HarvestSettings, Harvester};
pub use page::{AutomationError, AutomationFailure, Key, PageDriver, PageElement, Selectors};
pub use persist::{ensure_output_dir, AtomicFileWriter, PersistError};
pub use progress::{ProgressStore, SnapshotError};
pub use retry::{RetryOutcome, RetryPolicy, Sleeper, ThreadSleeper};
pub use save::{media_extension, ContentSaveError, ContentSaver};
pub use scrape::{
    clean_caption, parse_post_date, post_caption, post_date, post_folder_name, post_media,
    ScrapeError,
};
pub use types::{FailureKind, FetchError, FetchMetadata, FetchOutput};
pub use webdriver::{WebDriverElement, WebDriverPage, WebDriverSettings};
