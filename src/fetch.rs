use std::collections::BTreeMap;

use log::{debug, info};
use rayon::prelude::*;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::error::FetchError;
use crate::game::Month;

pub const DEFAULT_API_BASE: &str = "https://api.chess.com/pub";
const USER_AGENT: &str = concat!("chess-stats/", env!("CARGO_PKG_VERSION"));

#[derive(Deserialize)]
struct ArchivesResponse {
    archives: Vec<String>,
}

#[derive(Deserialize)]
struct GamesResponse {
    games: Vec<RawGame>,
}

/// One archive entry as served. Field presence and types are checked per
/// game by `parse::parse_game`, so one bad entry never spoils its month.
pub type RawGame = Value;

pub type RawGamesByMonth = BTreeMap<Month, Vec<RawGame>>;

/// Where monthly game archives come from.
pub trait ArchiveSource: Sync {
    /// Locations of every monthly archive for `handle`.
    fn archives(&self, handle: &str) -> Result<Vec<String>, FetchError>;

    fn month_games(&self, location: &str) -> Result<Vec<RawGame>, FetchError>;
}

pub struct ChessComClient {
    client: reqwest::blocking::Client,
    base: String,
}

impl ChessComClient {
    pub fn new(base: &str) -> Result<Self, FetchError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|source| FetchError::Http {
                url: base.to_string(),
                source,
            })?;

        Ok(Self {
            client,
            base: base.trim_end_matches('/').to_string(),
        })
    }

    fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, FetchError> {
        let http = |source| FetchError::Http {
            url: url.to_string(),
            source,
        };

        let resp = self.client.get(url).send().map_err(http)?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }

        resp.json().map_err(|source| FetchError::Payload {
            url: url.to_string(),
            source,
        })
    }
}

impl ArchiveSource for ChessComClient {
    fn archives(&self, handle: &str) -> Result<Vec<String>, FetchError> {
        let url = format!(
            "{}/player/{}/games/archives",
            self.base,
            handle.to_lowercase()
        );
        let resp: ArchivesResponse = self.get_json(&url)?;
        Ok(resp.archives)
    }

    fn month_games(&self, location: &str) -> Result<Vec<RawGame>, FetchError> {
        let resp: GamesResponse = self.get_json(location)?;
        Ok(resp.games)
    }
}

/// Fetches every monthly archive of `handle`, keyed by month.
///
/// With `jobs > 1` months are fetched on a dedicated pool of that size.
/// Any failed call aborts the whole fetch.
pub fn fetch_games<S>(source: &S, handle: &str, jobs: usize) -> Result<RawGamesByMonth, FetchError>
where
    S: ArchiveSource + ?Sized,
{
    let locations = source.archives(handle)?;
    debug!("{} archives listed for {}", locations.len(), handle);

    let months = locations
        .iter()
        .map(|location| {
            Month::from_location(location)
                .map(|month| (month, location.as_str()))
                .ok_or_else(|| FetchError::ArchiveLocation(location.clone()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let fetch_month = |(month, location): (Month, &str)| -> Result<(Month, Vec<RawGame>), FetchError> {
        let games = source.month_games(location)?;
        info!("Fetched {} games from {}", games.len(), month);
        Ok((month, games))
    };

    let batches = if jobs <= 1 {
        months
            .into_iter()
            .map(fetch_month)
            .collect::<Result<Vec<_>, _>>()?
    } else {
        let pool = rayon::ThreadPoolBuilder::new().num_threads(jobs).build()?;
        pool.install(|| {
            months
                .into_par_iter()
                .map(fetch_month)
                .collect::<Result<Vec<_>, _>>()
        })?
    };

    Ok(batches.into_iter().collect())
}
