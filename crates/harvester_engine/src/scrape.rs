use std::sync::LazyLock;

use chrono::{DateTime, NaiveDateTime, Utc};
use engine_logging::{engine_debug, engine_info};
use harvester_core::{Content, ContentKind, OrderedSet};
use regex::Regex;
use thiserror::Error;

use crate::page::{AutomationError, AutomationFailure, PageDriver, PageElement, Selectors};
use crate::persist::PersistError;
use crate::save::ContentSaveError;

const POST_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.fZ";
const FOLDER_DATE_FORMAT: &str = "%Y%m%d-%H_%M";
const CAPTION_SPAN_INDEX: usize = 1;
const PROFILE_PICTURE_MARKER: &str = "profile";

static LINE_BREAK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<br\s*/?>").expect("valid regex"));
static ANCHOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<a\b[^>]*>(.*?)</a>").expect("valid regex"));

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error(transparent)]
    Automation(#[from] AutomationError),
    #[error("post has no publish date")]
    MissingDate,
    #[error("invalid publish date {value:?}: {source}")]
    InvalidDate {
        value: String,
        #[source]
        source: chrono::ParseError,
    },
    #[error("failed to create post folder: {0}")]
    Persist(#[from] PersistError),
    #[error(transparent)]
    ContentSave(#[from] ContentSaveError),
}

/// Publish time from the first `time` element's `datetime` attribute.
pub fn post_date<D: PageDriver>(
    page: &mut D,
    selectors: &Selectors,
) -> Result<DateTime<Utc>, ScrapeError> {
    let times = page.query_all(&selectors.post_time)?;
    let value = match times.first() {
        Some(time) => time.attribute("datetime")?,
        None => None,
    }
    .ok_or(ScrapeError::MissingDate)?;
    parse_post_date(&value)
}

pub fn parse_post_date(value: &str) -> Result<DateTime<Utc>, ScrapeError> {
    NaiveDateTime::parse_from_str(value, POST_DATE_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|source| ScrapeError::InvalidDate {
            value: value.to_string(),
            source,
        })
}

/// Folder name of a post, e.g. `20240102-03_04`.
pub fn post_folder_name(date: &DateTime<Utc>) -> String {
    date.format(FOLDER_DATE_FORMAT).to_string()
}

/// Caption text of the open post; empty when the post has none.
pub fn post_caption<D: PageDriver>(
    page: &mut D,
    selectors: &Selectors,
    post: &str,
) -> Result<Content, ScrapeError> {
    let markup = match caption_markup(page, selectors) {
        Ok(markup) => markup,
        Err(err)
            if matches!(
                err.kind,
                AutomationFailure::ElementNotFound | AutomationFailure::Timeout
            ) =>
        {
            engine_info!("no caption found for {post}: {err}");
            String::new()
        }
        Err(err) => return Err(err.into()),
    };
    Ok(Content::text(post, clean_caption(&markup)))
}

fn caption_markup<D: PageDriver>(
    page: &mut D,
    selectors: &Selectors,
) -> Result<String, AutomationError> {
    let spans = page.query_all(&selectors.caption_spans)?;
    spans
        .get(CAPTION_SPAN_INDEX)
        .ok_or_else(|| AutomationError::not_found(&selectors.caption_spans))?
        .inner_markup()
}

/// Line breaks become newlines and anchors are reduced to their text.
pub fn clean_caption(markup: &str) -> String {
    let text = LINE_BREAK_RE.replace_all(markup, "\n");
    ANCHOR_RE.replace_all(&text, "$1").into_owned()
}

/// Walks the media carousel of the open post and collects every image and
/// video once, in display order.
///
/// A timeout while reading the media elements keeps what was collected so
/// far; any other automation failure fails the scrape.
pub fn post_media<D: PageDriver>(
    page: &mut D,
    selectors: &Selectors,
) -> Result<OrderedSet<Content>, ScrapeError> {
    let mut contents = OrderedSet::new();

    advance_carousel(page, selectors)?;
    loop {
        contents.add_all(visible_media(page, selectors)?);
        if !advance_carousel(page, selectors)? {
            break;
        }
    }
    contents.add_all(visible_media(page, selectors)?);

    engine_debug!("collected {} media items", contents.len());
    Ok(contents)
}

fn advance_carousel<D: PageDriver>(
    page: &mut D,
    selectors: &Selectors,
) -> Result<bool, AutomationError> {
    if !page.is_visible(&selectors.next_media)? {
        return Ok(false);
    }
    page.click(&selectors.next_media)?;
    Ok(true)
}

fn visible_media<D: PageDriver>(
    page: &mut D,
    selectors: &Selectors,
) -> Result<OrderedSet<Content>, AutomationError> {
    let mut contents = OrderedSet::new();
    let elements = match page.query_all(&selectors.media) {
        Ok(elements) => elements,
        Err(err) if err.kind == AutomationFailure::Timeout => {
            engine_debug!("media query timed out: {err}");
            return Ok(contents);
        }
        Err(err) => return Err(err),
    };
    for element in &elements {
        match media_content(element) {
            Ok(Some(content)) => {
                contents.add(content);
            }
            Ok(None) => {}
            Err(err) if err.kind == AutomationFailure::Timeout => {
                engine_debug!("media element timed out: {err}");
                break;
            }
            Err(err) => return Err(err),
        }
    }
    Ok(contents)
}

fn media_content<E: PageElement>(element: &E) -> Result<Option<Content>, AutomationError> {
    let Some(link) = element.attribute("src")?.filter(|src| !src.is_empty()) else {
        return Ok(None);
    };
    let is_decoration = element
        .attribute("alt")?
        .is_some_and(|alt| alt.contains(PROFILE_PICTURE_MARKER));
    if is_decoration {
        return Ok(None);
    }
    let tag = element.tag_name()?;
    Ok(ContentKind::from_tag(&tag).map(|kind| Content::media(link, kind)))
}
