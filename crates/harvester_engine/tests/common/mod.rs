#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::Once;
use std::time::Duration;

use harvester_engine::{
    AutomationError, AutomationFailure, FailureKind, FetchError, FetchMetadata, FetchOutput, Key,
    MediaFetcher, PageDriver, PageElement, Selectors, Sleeper,
};

pub const BASE_URL: &str = "https://feed.test";

pub fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(engine_logging::initialize_for_tests);
}

#[derive(Default)]
pub struct RecordingSleeper {
    pub waits: RefCell<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn count(&self, duration: Duration) -> usize {
        self.waits.borrow().iter().filter(|d| **d == duration).count()
    }
}

impl Sleeper for RecordingSleeper {
    fn sleep(&self, duration: Duration) {
        self.waits.borrow_mut().push(duration);
    }
}

#[derive(Debug, Clone, Default)]
pub struct FakeElement {
    pub tag: String,
    pub attributes: HashMap<String, String>,
    pub markup: String,
}

impl FakeElement {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            ..Self::default()
        }
    }

    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attributes.insert(name.to_string(), value.to_string());
        self
    }

    pub fn markup(mut self, markup: &str) -> Self {
        self.markup = markup.to_string();
        self
    }
}

impl PageElement for FakeElement {
    fn attribute(&self, name: &str) -> Result<Option<String>, AutomationError> {
        Ok(self.attributes.get(name).cloned())
    }

    fn inner_markup(&self) -> Result<String, AutomationError> {
        Ok(self.markup.clone())
    }

    fn tag_name(&self) -> Result<String, AutomationError> {
        Ok(self.tag.to_ascii_uppercase())
    }
}

#[derive(Debug, Clone, Default)]
pub struct FakePost {
    pub datetime: String,
    pub caption: Option<String>,
    /// Carousel pages, each a list of visible media elements.
    pub media_pages: Vec<Vec<FakeElement>>,
    /// Number of upcoming scrape attempts whose date lookup fails.
    pub failing_attempts: usize,
}

impl FakePost {
    pub fn new(datetime: &str) -> Self {
        Self {
            datetime: datetime.to_string(),
            ..Self::default()
        }
    }

    pub fn caption(mut self, caption: &str) -> Self {
        self.caption = Some(caption.to_string());
        self
    }

    pub fn page(mut self, media: Vec<FakeElement>) -> Self {
        self.media_pages.push(media);
        self
    }

    pub fn failing(mut self, attempts: usize) -> Self {
        self.failing_attempts = attempts;
        self
    }
}

pub fn image(src: &str) -> FakeElement {
    FakeElement::new("img").attr("src", src)
}

pub fn video(src: &str) -> FakeElement {
    FakeElement::new("video").attr("src", src)
}

/// In-memory profile feed. Each scroll reveals the next batch of post links;
/// links stay rendered once revealed.
#[derive(Default)]
pub struct FakePage {
    pub selectors: Selectors,
    pub batches: Vec<Vec<String>>,
    pub scrolls: usize,
    pub posts: HashMap<String, FakePost>,
    pub current_url: Option<String>,
    pub media_page: usize,
    pub navigations: Vec<String>,
    pub failing_navigations: usize,
    /// Number of upcoming media queries that fail with a protocol error.
    pub failing_media_queries: usize,
    /// Number of upcoming "next media" clicks that fail with a protocol error.
    pub failing_carousel_clicks: usize,
    pub filled: Vec<(String, String)>,
    pub clicked: Vec<String>,
}

impl FakePage {
    pub fn with_feed(batches: &[&[&str]]) -> Self {
        Self {
            batches: batches
                .iter()
                .map(|batch| batch.iter().map(|link| link.to_string()).collect())
                .collect(),
            ..Self::default()
        }
    }

    pub fn post(mut self, href: &str, post: FakePost) -> Self {
        self.posts.insert(format!("{BASE_URL}{href}"), post);
        self
    }

    fn current_post(&mut self) -> Option<&mut FakePost> {
        let url = self.current_url.clone()?;
        self.posts.get_mut(&url)
    }

    fn rendered_links(&self) -> Vec<FakeElement> {
        self.batches
            .iter()
            .take(self.scrolls)
            .flatten()
            .map(|href| FakeElement::new("a").attr("href", href))
            .collect()
    }

    fn post_times(&mut self) -> Result<Vec<FakeElement>, AutomationError> {
        let Some(post) = self.current_post() else {
            return Ok(Vec::new());
        };
        if post.failing_attempts > 0 {
            post.failing_attempts -= 1;
            return Err(AutomationError::new(
                AutomationFailure::Timeout,
                "time element did not render",
            ));
        }
        Ok(vec![FakeElement::new("time").attr("datetime", &post.datetime)])
    }

    fn caption_spans(&mut self) -> Vec<FakeElement> {
        match self.current_post().and_then(|post| post.caption.clone()) {
            Some(caption) => vec![
                FakeElement::new("span").markup("author"),
                FakeElement::new("span").markup(&caption),
            ],
            None => Vec::new(),
        }
    }

    fn visible_media(&mut self) -> Vec<FakeElement> {
        let page = self.media_page;
        self.current_post()
            .and_then(|post| post.media_pages.get(page).cloned())
            .unwrap_or_default()
    }

    fn has_next_media(&mut self) -> bool {
        let page = self.media_page;
        self.current_post()
            .is_some_and(|post| page + 1 < post.media_pages.len())
    }
}

fn session_hiccup() -> AutomationError {
    AutomationError::new(AutomationFailure::Protocol, "session hiccup")
}

impl PageDriver for FakePage {
    type Element = FakeElement;

    fn navigate(&mut self, url: &str) -> Result<(), AutomationError> {
        self.navigations.push(url.to_string());
        if self.failing_navigations > 0 {
            self.failing_navigations -= 1;
            return Err(AutomationError::new(AutomationFailure::Navigation, "net error"));
        }
        self.current_url = Some(url.to_string());
        self.media_page = 0;
        Ok(())
    }

    fn query_all(&mut self, selector: &str) -> Result<Vec<Self::Element>, AutomationError> {
        let selectors = self.selectors.clone();
        if selector == selectors.feed_links {
            Ok(self.rendered_links())
        } else if selector == selectors.post_time {
            self.post_times()
        } else if selector == selectors.caption_spans {
            Ok(self.caption_spans())
        } else if selector == selectors.media {
            if self.failing_media_queries > 0 {
                self.failing_media_queries -= 1;
                return Err(session_hiccup());
            }
            Ok(self.visible_media())
        } else {
            Err(AutomationError::not_found(selector))
        }
    }

    fn click(&mut self, selector: &str) -> Result<(), AutomationError> {
        self.clicked.push(selector.to_string());
        if selector == self.selectors.next_media {
            if self.failing_carousel_clicks > 0 {
                self.failing_carousel_clicks -= 1;
                return Err(session_hiccup());
            }
            if !self.has_next_media() {
                return Err(AutomationError::not_found(selector));
            }
            self.media_page += 1;
        }
        Ok(())
    }

    fn fill(&mut self, selector: &str, text: &str) -> Result<(), AutomationError> {
        self.filled.push((selector.to_string(), text.to_string()));
        Ok(())
    }

    fn press_key(&mut self, key: Key) -> Result<(), AutomationError> {
        if key == Key::End {
            self.scrolls += 1;
        }
        Ok(())
    }

    fn is_visible(&mut self, selector: &str) -> Result<bool, AutomationError> {
        if selector == self.selectors.next_media {
            return Ok(self.has_next_media());
        }
        Ok(false)
    }
}

/// Serves canned media responses keyed by URL.
#[derive(Default)]
pub struct FakeFetcher {
    pub responses: HashMap<String, (Option<String>, Vec<u8>)>,
    pub requests: RefCell<Vec<String>>,
}

impl FakeFetcher {
    pub fn serve(mut self, url: &str, content_type: Option<&str>, body: &[u8]) -> Self {
        self.responses.insert(
            url.to_string(),
            (content_type.map(str::to_string), body.to_vec()),
        );
        self
    }
}

impl MediaFetcher for FakeFetcher {
    fn get(&self, url: &str) -> Result<FetchOutput, FetchError> {
        self.requests.borrow_mut().push(url.to_string());
        let (content_type, bytes) = self
            .responses
            .get(url)
            .cloned()
            .ok_or_else(|| FetchError::new(FailureKind::HttpStatus(404), "404 Not Found"))?;
        Ok(FetchOutput {
            metadata: FetchMetadata {
                requested_url: url.to_string(),
                final_url: url.to_string(),
                content_type,
            },
            bytes,
        })
    }
}
