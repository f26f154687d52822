use log::{debug, trace, warn};
use serde_json::Value;

use crate::annotation;
use crate::error::{ParseError, ParseErrorKind};
use crate::fetch::{RawGame, RawGamesByMonth};
use crate::game::{GameRecord, ResultCode, Side, TimeControl};
use crate::replay;
use crate::GamesByMonth;

/// What to do with a raw record that fails to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OnMalformed {
    /// Stop at the first malformed record.
    #[default]
    Abort,
    /// Log the record and leave it out of the analysis.
    Skip,
}

const UNKNOWN_URL: &str = "<no url>";

pub fn parse_game(raw: &RawGame) -> Result<GameRecord, ParseError> {
    let url = raw.get("url").and_then(Value::as_str).unwrap_or(UNKNOWN_URL);
    let fail = |kind| ParseError::new(url, kind);

    str_field(raw, "url").map_err(fail)?;
    let pgn = str_field(raw, "pgn").map_err(fail)?;
    let time_control = str_field(raw, "time_control")
        .map_err(fail)?
        .parse::<TimeControl>()
        .map_err(fail)?;

    let played = annotation::played_at(pgn).map_err(fail)?;
    let white = parse_side(raw, &WHITE).map_err(fail)?;
    let black = parse_side(raw, &BLACK).map_err(fail)?;

    Ok(GameRecord {
        url: url.to_string(),
        time_control,
        move_count: annotation::count_moves(pgn),
        played_date: played.date,
        played_time: played.time,
        timezone: played.timezone,
        white,
        black,
    })
}

/// Looks up a dotted field path; `null` counts as missing.
fn field<'a>(raw: &'a Value, name: &'static str) -> Result<&'a Value, ParseErrorKind> {
    let pointer = format!("/{}", name.replace('.', "/"));
    match raw.pointer(&pointer) {
        None | Some(Value::Null) => Err(ParseErrorKind::MissingField(name)),
        Some(value) => Ok(value),
    }
}

fn str_field<'a>(raw: &'a Value, name: &'static str) -> Result<&'a str, ParseErrorKind> {
    field(raw, name)?
        .as_str()
        .ok_or(ParseErrorKind::MalformedField(name))
}

struct SideFields {
    object: &'static str,
    rating: &'static str,
    username: &'static str,
    result: &'static str,
}

const WHITE: SideFields = SideFields {
    object: "white",
    rating: "white.rating",
    username: "white.username",
    result: "white.result",
};

const BLACK: SideFields = SideFields {
    object: "black",
    rating: "black.rating",
    username: "black.username",
    result: "black.result",
};

fn parse_side(raw: &Value, fields: &SideFields) -> Result<Side, ParseErrorKind> {
    if !field(raw, fields.object)?.is_object() {
        return Err(ParseErrorKind::MalformedField(fields.object));
    }
    let rating = field(raw, fields.rating)?
        .as_i64()
        .and_then(|r| i32::try_from(r).ok())
        .ok_or(ParseErrorKind::MalformedField(fields.rating))?;

    Ok(Side {
        rating,
        handle: str_field(raw, fields.username)?.to_string(),
        result: str_field(raw, fields.result)?.parse::<ResultCode>()?,
    })
}

/// Parses every month's raw records, keeping month order.
///
/// With `verify` set each game's movetext is also replayed and a warning is
/// logged when the replayed turn count disagrees with the annotation count.
pub fn parse_months(
    raw: &RawGamesByMonth,
    policy: OnMalformed,
    verify: bool,
) -> Result<GamesByMonth, ParseError> {
    let mut games = GamesByMonth::new();

    for (month, batch) in raw {
        let mut records = Vec::with_capacity(batch.len());
        for game in batch {
            match parse_game(game) {
                Ok(record) => {
                    trace!(
                        "{}: {} moves, played {} {}",
                        record.url,
                        record.move_count,
                        record.played_date,
                        record.played_time_label()
                    );
                    if verify {
                        verify_move_count(&record, game["pgn"].as_str().unwrap_or_default());
                    }
                    records.push(record);
                }
                Err(e) if policy == OnMalformed::Skip => warn!("Skipping {}", e),
                Err(e) => return Err(e),
            }
        }
        debug!("{}: parsed {} of {} games", month, records.len(), batch.len());
        games.insert(*month, records);
    }

    Ok(games)
}

fn verify_move_count(record: &GameRecord, pgn: &str) {
    let replay = replay::replay(pgn);
    if !replay.complete {
        warn!("{}: movetext did not replay past ply {}", record.url, replay.plies);
    } else if replay.turns() != record.move_count {
        warn!(
            "{}: annotation gives {} moves, replay gives {}",
            record.url,
            record.move_count,
            replay.turns()
        );
    }
}
