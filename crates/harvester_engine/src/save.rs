use std::path::{Path, PathBuf};

use engine_logging::{engine_debug, engine_error};
use harvester_core::{Content, ContentKind};
use thiserror::Error;

use crate::fetch::MediaFetcher;
use crate::persist::{AtomicFileWriter, PersistError};
use crate::{FailureKind, FetchError};

#[derive(Debug, Error)]
pub enum ContentSaveError {
    #[error("failed to fetch {link}: {source}")]
    Fetch {
        link: String,
        #[source]
        source: FetchError,
    },
    #[error("failed to write {path}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: PersistError,
    },
}

/// Writes [`Content`] items next to a base path such as `out/02-IMG`.
pub struct ContentSaver<'a, F: MediaFetcher + ?Sized> {
    fetcher: &'a F,
}

impl<'a, F: MediaFetcher + ?Sized> ContentSaver<'a, F> {
    pub fn new(fetcher: &'a F) -> Self {
        Self { fetcher }
    }

    /// Text and URL payloads go to `{base}.txt` and write failures are
    /// returned. Media is downloaded to `{base}.{subtype}`; any failure there
    /// is logged and `Ok(None)` is returned so the caller's sequence goes on.
    pub fn save(&self, content: &Content, base: &Path) -> Result<Option<PathBuf>, ContentSaveError> {
        match content.kind() {
            ContentKind::Url | ContentKind::Text => self.save_text(content, base).map(Some),
            ContentKind::Image | ContentKind::Video => match self.save_media(content, base) {
                Ok(path) => Ok(Some(path)),
                Err(err) => {
                    engine_error!("{err}");
                    Ok(None)
                }
            },
        }
    }

    fn save_text(&self, content: &Content, base: &Path) -> Result<PathBuf, ContentSaveError> {
        let target = with_extension(base, "txt");
        write_file(&target, content.payload().unwrap_or_default().as_bytes())
    }

    fn save_media(&self, content: &Content, base: &Path) -> Result<PathBuf, ContentSaveError> {
        let fetch_failed = |source| ContentSaveError::Fetch {
            link: content.link().to_string(),
            source,
        };
        let output = self.fetcher.get(content.link()).map_err(fetch_failed)?;
        let extension = output
            .content_type()
            .and_then(media_extension)
            .ok_or_else(|| {
                fetch_failed(FetchError::new(
                    FailureKind::MissingContentType,
                    "response declares no media type",
                ))
            })?;
        let target = with_extension(base, &extension);
        let path = write_file(&target, &output.bytes)?;
        engine_debug!("saved {} bytes to {}", output.bytes.len(), path.display());
        Ok(path)
    }
}

/// The subtype of a content type value: `image/jpeg; q=1` gives `jpeg`.
pub fn media_extension(content_type: &str) -> Option<String> {
    let essence = content_type.split(';').next().unwrap_or(content_type).trim();
    let subtype = essence.rsplit('/').next().unwrap_or(essence).trim();
    if subtype.is_empty() {
        None
    } else {
        Some(subtype.to_ascii_lowercase())
    }
}

// `Path::with_extension` would replace anything after a dot in the stem.
fn with_extension(base: &Path, extension: &str) -> PathBuf {
    let mut name = base.as_os_str().to_os_string();
    name.push(".");
    name.push(extension);
    PathBuf::from(name)
}

fn write_file(target: &Path, bytes: &[u8]) -> Result<PathBuf, ContentSaveError> {
    let persist_failed = |source| ContentSaveError::Persist {
        path: target.to_path_buf(),
        source,
    };
    let (writer, filename) = AtomicFileWriter::for_path(target).map_err(persist_failed)?;
    writer.write_bytes(&filename, bytes).map_err(persist_failed)
}
