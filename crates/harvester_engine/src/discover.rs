use engine_logging::{engine_debug, engine_info};
use harvester_core::{OrderedSet, Profile};

use crate::fetch::MediaFetcher;
use crate::harvest::Harvester;
use crate::page::{Key, PageDriver, PageElement};
use crate::retry::Sleeper;

/// Consecutive scrolls without a new link after which the feed is considered
/// exhausted.
pub const STAGNATION_LIMIT: u32 = 5;

impl<D, F, S> Harvester<'_, D, F, S>
where
    D: PageDriver,
    F: MediaFetcher + ?Sized,
    S: Sleeper + ?Sized,
{
    /// Scrolls the profile feed and collects every post link it reveals.
    ///
    /// Stops as soon as the feed shows a link already known as available (the
    /// rest of the feed was seen on an earlier run), or after
    /// [`STAGNATION_LIMIT`] scrolls in a row add nothing.
    pub fn discover(&mut self, profile: &Profile) -> OrderedSet<String> {
        self.goto(profile.feed_url());

        let known = profile.registry().available();
        let mut links = OrderedSet::new();
        let mut previous_count = 0;
        let mut stagnant_scrolls = 0;
        let mut scrolls = 0;

        loop {
            scrolls += 1;
            if let Err(err) = self.page.press_key(Key::End) {
                engine_debug!("scroll failed: {err}");
            }

            for href in self.visible_post_links() {
                links.add(profile.registry().normalize(&href));
            }

            if links.contains_any(known) {
                engine_info!("reached previously discovered posts after {scrolls} scrolls");
                break;
            }

            let current_count = links.len();
            if current_count == previous_count {
                stagnant_scrolls += 1;
                self.sleeper.sleep(self.settings.scrolling_delay);
            } else {
                stagnant_scrolls = 0;
            }
            previous_count = current_count;

            if stagnant_scrolls == STAGNATION_LIMIT {
                engine_info!("no new posts after {STAGNATION_LIMIT} scrolls");
                break;
            }

            self.sleeper.sleep(self.settings.scrolling_delay);
        }

        engine_info!(
            "discovered {} post links in {} scrolls",
            links.len(),
            scrolls
        );
        links
    }

    fn visible_post_links(&mut self) -> Vec<String> {
        match self.page.query_all(&self.settings.selectors.feed_links) {
            Ok(elements) => elements
                .iter()
                .filter_map(|element| element.attribute("href").ok().flatten())
                .filter(|href| !href.is_empty())
                .collect(),
            Err(err) => {
                engine_debug!("feed link query failed: {err}");
                Vec::new()
            }
        }
    }
}
