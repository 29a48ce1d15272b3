use std::path::PathBuf;
use std::time::Duration;

use engine_logging::{engine_debug, engine_info};
use harvester_core::{Content, PostStatus, Profile};

use crate::fetch::MediaFetcher;
use crate::page::{AutomationError, PageDriver, Selectors};
use crate::persist::ensure_output_dir;
use crate::progress::ProgressStore;
use crate::retry::{RetryOutcome, RetryPolicy, Sleeper};
use crate::save::ContentSaver;
use crate::scrape::{self, ScrapeError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarvestSettings {
    pub loading_delay: Duration,
    pub scrolling_delay: Duration,
    pub scraping_delay: Duration,
    pub max_retries: u32,
    pub credentials: Option<Credentials>,
    pub selectors: Selectors,
}

impl Default for HarvestSettings {
    fn default() -> Self {
        Self {
            loading_delay: Duration::from_secs(15),
            scrolling_delay: Duration::from_secs(30),
            scraping_delay: Duration::from_secs(70),
            max_retries: 5,
            credentials: None,
            selectors: Selectors::default(),
        }
    }
}

/// Drives one profile from discovery through download on a single thread.
pub struct Harvester<'a, D, F, S>
where
    D: PageDriver,
    F: MediaFetcher + ?Sized,
    S: Sleeper + ?Sized,
{
    pub(crate) page: &'a mut D,
    pub(crate) sleeper: &'a S,
    pub(crate) settings: &'a HarvestSettings,
    saver: ContentSaver<'a, F>,
    store: ProgressStore,
}

impl<'a, D, F, S> Harvester<'a, D, F, S>
where
    D: PageDriver,
    F: MediaFetcher + ?Sized,
    S: Sleeper + ?Sized,
{
    pub fn new(
        page: &'a mut D,
        fetcher: &'a F,
        sleeper: &'a S,
        settings: &'a HarvestSettings,
        store: ProgressStore,
    ) -> Self {
        Self {
            page,
            sleeper,
            settings,
            saver: ContentSaver::new(fetcher),
            store,
        }
    }

    pub fn store(&self) -> &ProgressStore {
        &self.store
    }

    /// Log in, discover the feed, then download every pending post.
    pub fn run(&mut self, profile: &mut Profile) {
        engine_info!("started scraping {profile}");

        self.log_in(profile);
        let discovered = self.discover(profile);
        profile
            .registry_mut()
            .add_posts(discovered.iter(), PostStatus::Available);
        self.store.save(profile);
        self.harvest_pending(profile);

        engine_info!("finished scraping {profile}");
    }

    pub fn log_in(&mut self, profile: &Profile) {
        let settings = self.settings;
        let Some(credentials) = settings.credentials.as_ref() else {
            engine_debug!("no credentials configured, skipping log in");
            return;
        };
        self.goto(profile.base_url());

        if let Err(err) = self.submit_login(credentials) {
            engine_info!("log in form not completed: {err}");
        }

        self.sleeper.sleep(settings.loading_delay);
    }

    fn submit_login(&mut self, credentials: &Credentials) -> Result<(), AutomationError> {
        let selectors = &self.settings.selectors;
        self.page
            .fill(&selectors.login_username, &credentials.username)?;
        self.page
            .fill(&selectors.login_password, &credentials.password)?;
        self.page.click(&selectors.login_submit)
    }

    /// Navigate with retries. Failures are not reported; the page is left on
    /// whatever it last rendered.
    pub fn goto(&mut self, url: &str) {
        let policy = RetryPolicy::new(self.settings.max_retries, self.settings.loading_delay);
        let page = &mut *self.page;
        policy.run_swallowing(self.sleeper, &format!("going to {url}"), || page.navigate(url));
    }

    /// Downloads pending posts one by one, saving progress after each.
    pub fn harvest_pending(&mut self, profile: &mut Profile) {
        let policy = RetryPolicy::new(self.settings.max_retries, self.settings.scraping_delay);
        let mut cursor = profile.registry().pending_cursor();

        while let Some(post) = cursor.next_pending(profile.registry()) {
            let action = format!("scraping {post} from user {}", profile.name());
            let outcome = policy.run_until_success(self.sleeper, &action, |_attempt| {
                self.goto(&post);
                self.scrape_post(profile, &post)
            });

            match outcome {
                RetryOutcome::Succeeded { .. } => {
                    profile.registry_mut().add_post(&post, PostStatus::Downloaded);
                }
                RetryOutcome::Exhausted { attempts } => {
                    engine_info!("{post} still pending after {attempts} attempts");
                }
            }
            self.store.save(profile);
        }
    }

    fn scrape_post(&mut self, profile: &Profile, post: &str) -> Result<(), ScrapeError> {
        let selectors = &self.settings.selectors;
        let date = scrape::post_date(self.page, selectors)?;

        let folder = self
            .store
            .root()
            .join(profile.post_folder(&scrape::post_folder_name(&date)));
        ensure_output_dir(&folder)?;

        let url = Content::url(post);
        let caption = scrape::post_caption(self.page, selectors, post)?;
        let media = scrape::post_media(self.page, selectors)?;
        let media_count = media.len();

        let contents = [url, caption].into_iter().chain(media);
        for (index, content) in contents.enumerate() {
            let base: PathBuf = folder.join(format!("{index:02}-{}", content.kind().code()));
            self.saver.save(&content, &base)?;
        }

        engine_debug!("date: {date}, media: {media_count}");
        Ok(())
    }
}
