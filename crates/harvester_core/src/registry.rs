use crate::OrderedSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostStatus {
    Available,
    Downloaded,
}

/// Discovered and downloaded post links of one profile.
///
/// `downloaded` is expected to be a subset of `available` but nothing
/// enforces it: a restored snapshot may reference links the live feed no
/// longer shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostRegistry {
    base_url: String,
    available: OrderedSet<String>,
    downloaded: OrderedSet<String>,
}

impl PostRegistry {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            available: OrderedSet::new(),
            downloaded: OrderedSet::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn available(&self) -> &OrderedSet<String> {
        &self.available
    }

    pub fn downloaded(&self) -> &OrderedSet<String> {
        &self.downloaded
    }

    /// Fully qualifies `link` against the base URL unless it already contains it.
    pub fn normalize(&self, link: &str) -> String {
        if link.contains(self.base_url.as_str()) {
            return link.to_string();
        }
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            link.trim_start_matches('/')
        )
    }

    pub fn add_post(&mut self, link: &str, status: PostStatus) {
        self.add_posts([link], status);
    }

    pub fn add_posts<I, S>(&mut self, links: I, status: PostStatus)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let normalized: Vec<String> = links
            .into_iter()
            .map(|link| self.normalize(link.as_ref()))
            .collect();
        match status {
            PostStatus::Available => self.available.add_all(normalized),
            PostStatus::Downloaded => self.downloaded.add_all(normalized),
        }
    }

    pub fn is_downloaded(&self, link: &str) -> bool {
        self.downloaded.contains(&self.normalize(link))
    }

    /// Lazily yields available links not yet downloaded, in discovery order.
    pub fn pending_posts(&self) -> PendingPosts<'_> {
        PendingPosts {
            registry: self,
            cursor: PendingCursor::default(),
        }
    }

    /// A detached position over the pending posts, for walks that mutate the
    /// registry between pulls.
    pub fn pending_cursor(&self) -> PendingCursor {
        PendingCursor::default()
    }

    pub fn pending_count(&self) -> usize {
        self.pending_posts().count()
    }
}

/// Position in `available`; membership in `downloaded` is checked against the
/// registry at each pull, never cached.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PendingCursor {
    position: usize,
}

impl PendingCursor {
    pub fn next_pending(&mut self, registry: &PostRegistry) -> Option<String> {
        while let Some(link) = registry.available.get(self.position) {
            self.position += 1;
            if !registry.downloaded.contains(link) {
                return Some(link.clone());
            }
        }
        None
    }
}

pub struct PendingPosts<'a> {
    registry: &'a PostRegistry,
    cursor: PendingCursor,
}

impl Iterator for PendingPosts<'_> {
    type Item = String;

    fn next(&mut self) -> Option<Self::Item> {
        self.cursor.next_pending(self.registry)
    }
}
