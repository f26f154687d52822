pub mod annotation;
pub mod chart;
pub mod error;
pub mod fetch;
pub mod game;
pub mod parse;
pub mod replay;
pub mod report;

use std::collections::BTreeMap;
use std::time::Instant;

use log::{info, warn};

pub use error::{Error, FetchError, ParseError, ParseErrorKind};
pub use fetch::{fetch_games, ArchiveSource, ChessComClient, RawGame};
pub use game::{GameRecord, Month, Outcome, ResultCode, TimeControl};
pub use parse::{parse_game, parse_months, OnMalformed};
pub use report::Report;

/// Parsed games of one player, in chronological month order.
pub type GamesByMonth = BTreeMap<Month, Vec<GameRecord>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisConfig {
    pub handle: String,
    pub time_control: TimeControl,
}

impl AnalysisConfig {
    pub fn new(handle: impl Into<String>) -> Self {
        Self {
            handle: handle.into(),
            time_control: TimeControl::default(),
        }
    }
}

/// Runs the three aggregations over every parsed game the player took part in.
pub fn analyze(games: &GamesByMonth, config: &AnalysisConfig) -> Report {
    let handle = config.handle.as_str();
    let played: Vec<&GameRecord> = games
        .values()
        .flatten()
        .filter(|game| {
            let found = game.outcome_for(handle).is_some();
            if !found {
                warn!("{}: {} is not exactly one of the two players", game.url, handle);
            }
            found
        })
        .collect();
    let all = || played.iter().copied();

    Report {
        handle: config.handle.clone(),
        games: played.len(),
        by_color: report::by_color(all(), handle),
        by_move_count: report::by_move_count(all(), handle, config.time_control),
        by_time_of_day: report::by_time_of_day(all(), handle, config.time_control),
    }
}

/// Fetch, parse and aggregate in one pass.
pub fn run<S>(
    source: &S,
    config: &AnalysisConfig,
    jobs: usize,
    policy: OnMalformed,
    verify: bool,
) -> Result<Report, Error>
where
    S: ArchiveSource + ?Sized,
{
    info!("Fetching archives for {}", config.handle);
    let fetch_start = Instant::now();
    let raw = fetch_games(source, &config.handle, jobs)?;
    info!(
        "Fetched {} games in {:.2}s",
        raw.values().map(Vec::len).sum::<usize>(),
        fetch_start.elapsed().as_secs_f64()
    );

    let games = parse_months(&raw, policy, verify)?;
    Ok(analyze(&games, config))
}
