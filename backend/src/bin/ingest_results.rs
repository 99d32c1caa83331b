//! Load lottery draw results from a JSON file into the document store.
//!
//! Optionally caches a precomputed statistics document alongside, keyed by the
//! logical statistics names (`frequency_stats`, `last_results`, ...).
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use cap_std::{ambient_authority, fs::Dir};
use clap::Parser;
use color_eyre::eyre::{Context, Result, eyre};
use lottery_backend::domain::{DrawResultDraft, DrawResultService, FailOpenCache, StatsSnapshot};
use lottery_backend::outbound::cache::{CacheSettings, RedisCacheTransport};
use lottery_backend::outbound::dynamodb::{DynamoStoreClient, StoreSettings};
use lottery_backend::outbound::persistence::DocumentDrawResultRepository;
use mockable::DefaultClock;
use ortho_config::OrthoConfig;
use serde::de::DeserializeOwned;
use tokio::runtime::Builder;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

/// `ingest-results` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "ingest-results",
    about = "Persist lottery draw results and optionally cache their statistics",
    version
)]
struct CliArgs {
    /// JSON array of draw results.
    #[arg(long = "input", value_name = "path")]
    input: PathBuf,
    /// JSON object of statistics documents keyed by statistics name.
    /// Requires `CACHE_HOST` and `CACHE_PORT`.
    #[arg(long = "stats", value_name = "path")]
    stats: Option<PathBuf>,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }
    let args = CliArgs::parse();
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .wrap_err("failed to build Tokio runtime")?;
    runtime.block_on(run(args))
}

async fn run(args: CliArgs) -> Result<()> {
    let drafts: Vec<DrawResultDraft> = read_json(&args.input)?;
    let stats = args
        .stats
        .as_deref()
        .map(read_json::<StatsSnapshot>)
        .transpose()?;

    let settings = StoreSettings::load_from_iter([OsString::from("ingest-results")])
        .map_err(|err| eyre!("failed to load store settings: {err}"))?;
    let tables = settings.tables()?;
    let store = Arc::new(DynamoStoreClient::connect(&settings.connection()?));
    let repository = Arc::new(DocumentDrawResultRepository::new(store, tables.results));
    let mut service = DrawResultService::new(repository, Arc::new(DefaultClock));

    if stats.is_some() {
        let cache = CacheSettings::load_from_iter([OsString::from("ingest-results")])
            .map_err(|err| eyre!("failed to load cache settings: {err}"))?
            .connection()?;
        let transport = Arc::new(RedisCacheTransport::new(&cache)?);
        service = service
            .with_stats_cache(FailOpenCache::new(transport).with_default_ttl(cache.default_ttl()));
    }

    let saved = service
        .save_results(drafts)
        .await
        .wrap_err("failed to save draw results")?;
    println!("saved_count={}", saved.len());
    if let Some(latest) = saved.iter().max_by_key(|result| result.contest) {
        println!("latest_contest={}", latest.contest);
        println!("latest_draw_date={}", latest.draw_date.format("%Y-%m-%d"));
    }

    if let Some(stats) = stats {
        service
            .save_stats(&stats)
            .await
            .wrap_err("failed to cache statistics")?;
        println!("stats_keys={}", stats.len());
    }
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let parent = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .ok_or_else(|| eyre!("input path '{}' must name a file", path.display()))?;
    let directory = Dir::open_ambient_dir(parent, ambient_authority())
        .with_context(|| format!("failed to open directory '{}'", parent.display()))?;
    let raw = directory
        .read_to_string(Path::new(file_name))
        .with_context(|| format!("failed to read '{}'", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("failed to parse '{}'", path.display()))
}

#[cfg(test)]
mod tests {
    //! Unit tests for input loading.

    use std::io::Write;

    use lottery_backend::domain::ports::StatsKey;
    use rstest::rstest;
    use tempfile::NamedTempFile;

    use super::*;

    fn file_with(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("temp file");
        file.write_all(contents.as_bytes()).expect("write fixture");
        file
    }

    #[rstest]
    fn reads_a_batch_of_drafts() {
        let file = file_with(
            r#"[{
                "contest": 3010,
                "drawDate": "2024-02-10",
                "numbers": ["01", "09", "14"],
                "prizes": {"fifteen": {"winners": 1, "prize": 1500000.0}},
                "accumulated": false,
                "nextContestEstimate": 4500000.0,
                "nextContestDate": "2024-02-12",
                "nextContest": 3011,
                "luckyTeam": "Bahia",
                "luckyMonth": "May"
            }]"#,
        );

        let drafts: Vec<DrawResultDraft> = read_json(file.path()).expect("drafts parse");
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].contest, 3_010);
        assert_eq!(drafts[0].prizes["fifteen"].winners, 1);
    }

    #[rstest]
    fn reads_statistics_keyed_by_name() {
        let file = file_with(r#"{"frequency_stats": [1, 2], "last_results": []}"#);

        let stats: StatsSnapshot = read_json(file.path()).expect("stats parse");
        assert_eq!(
            stats.keys().copied().collect::<Vec<_>>(),
            [StatsKey::FrequencyStats, StatsKey::LastResults]
        );
    }

    #[rstest]
    fn unknown_statistics_names_are_rejected() {
        let file = file_with(r#"{"lucky_numbers": []}"#);

        let result: Result<StatsSnapshot> = read_json(file.path());
        assert!(result.is_err());
    }

    #[rstest]
    fn missing_files_name_the_path() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("absent.json");

        let err = read_json::<Vec<DrawResultDraft>>(&path).expect_err("missing file");
        assert!(format!("{err:#}").contains("absent.json"));
    }
}
