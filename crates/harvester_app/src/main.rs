//! Command-line entry point: harvest one profile's feed into a folder tree.

mod config;
mod logging;

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use engine_logging::{engine_error, engine_info, set_log_profile};
use harvester_core::Profile;
use harvester_engine::{
    ensure_output_dir, FetchSettings, Harvester, ProgressStore, ReqwestFetcher, ThreadSleeper,
    WebDriverPage,
};
use log::LevelFilter;

use crate::config::Config;

#[derive(Debug, Parser)]
#[command(name = "feed-harvester", version, about = "Resumable profile feed harvester")]
struct Args {
    /// Profile to harvest.
    profile: String,

    /// JSON file with credentials, browser mode and delays.
    #[arg(default_value = "config.json")]
    config: PathBuf,

    /// Folder under which `<profile>/` is created.
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,

    #[arg(long, default_value = "https://www.instagram.com")]
    base_url: String,

    /// Address of a running WebDriver server (geckodriver).
    #[arg(long, default_value = "http://localhost:4444")]
    webdriver_url: String,

    #[arg(long, default_value = "debug")]
    log_level: LevelFilter,
}

fn main() {
    let args = Args::parse();
    if let Err(err) = run(args) {
        engine_error!("harvest aborted: {err:#}");
    }
}

fn run(args: Args) -> anyhow::Result<()> {
    let mut profile = Profile::new(&args.profile, &args.base_url);

    logging::initialize(args.log_level, &args.output_dir.join(profile.log_file()));
    set_log_profile(profile.name());

    let profile_dir = args.output_dir.join(profile.folder());
    ensure_output_dir(&profile_dir)
        .with_context(|| format!("creating profile folder {}", profile_dir.display()))?;
    engine_info!("starting harvest of {}", profile.feed_url());

    let config = Config::read(&args.config)?;

    let store = ProgressStore::new(&args.output_dir);
    store.restore(&mut profile);

    let fetcher = ReqwestFetcher::new(FetchSettings::default())
        .context("building media HTTP client")?;
    let mut page = WebDriverPage::connect(&config.webdriver_settings(&args.webdriver_url))
        .with_context(|| format!("connecting to WebDriver at {}", args.webdriver_url))?;
    let sleeper = ThreadSleeper;
    let settings = config.harvest_settings();

    let mut harvester = Harvester::new(&mut page, &fetcher, &sleeper, &settings, store);
    harvester.run(&mut profile);

    engine_info!(
        "finished {}: {} of {} posts downloaded",
        profile,
        profile.registry().downloaded().len(),
        profile.registry().available().len()
    );
    Ok(())
}
