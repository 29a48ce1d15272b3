use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentKind {
    Image,
    Video,
    Text,
    Url,
}

impl ContentKind {
    /// Short code used in saved filenames, e.g. `03-IMG`.
    pub fn code(self) -> &'static str {
        match self {
            ContentKind::Image => "IMG",
            ContentKind::Video => "VID",
            ContentKind::Text => "TXT",
            ContentKind::Url => "URL",
        }
    }

    /// Media kind for an element tag name; `None` for tags that carry no media.
    pub fn from_tag(tag: &str) -> Option<Self> {
        if tag.eq_ignore_ascii_case("img") {
            Some(ContentKind::Image)
        } else if tag.eq_ignore_ascii_case("video") {
            Some(ContentKind::Video)
        } else {
            None
        }
    }

    pub fn is_media(self) -> bool {
        matches!(self, ContentKind::Image | ContentKind::Video)
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// One saved artifact of a post.
///
/// Identity is the link alone: equality, hashing and ordering ignore kind and
/// payload.
#[derive(Debug, Clone)]
pub struct Content {
    link: String,
    kind: ContentKind,
    payload: Option<String>,
}

impl Content {
    pub fn media(link: impl Into<String>, kind: ContentKind) -> Self {
        Self {
            link: link.into(),
            kind,
            payload: None,
        }
    }

    pub fn text(link: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            link: link.into(),
            kind: ContentKind::Text,
            payload: Some(text.into()),
        }
    }

    /// The post URL marker: its payload is the link itself.
    pub fn url(link: impl Into<String>) -> Self {
        let link = link.into();
        Self {
            payload: Some(link.clone()),
            link,
            kind: ContentKind::Url,
        }
    }

    pub fn link(&self) -> &str {
        &self.link
    }

    pub fn kind(&self) -> ContentKind {
        self.kind
    }

    pub fn payload(&self) -> Option<&str> {
        self.payload.as_deref()
    }
}

impl PartialEq for Content {
    fn eq(&self, other: &Self) -> bool {
        self.link == other.link
    }
}

impl Eq for Content {}

impl Hash for Content {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.link.hash(state);
    }
}

impl PartialOrd for Content {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Content {
    fn cmp(&self, other: &Self) -> Ordering {
        self.link.cmp(&other.link)
    }
}
