use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;
use shakmaty::Color;

use crate::error::ParseErrorKind;

/// Outcome of a game for one side, as reported by the archive service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultCode {
    Win,
    Checkmated,
    Resigned,
    Timeout,
    Abandoned,
    Repetition,
    Stalemate,
    Insufficient,
    TimeVsInsufficient,
    Agreed,
}

impl ResultCode {
    pub const ALL: [ResultCode; 10] = [
        ResultCode::Win,
        ResultCode::Checkmated,
        ResultCode::Resigned,
        ResultCode::Timeout,
        ResultCode::Abandoned,
        ResultCode::Repetition,
        ResultCode::Stalemate,
        ResultCode::Insufficient,
        ResultCode::TimeVsInsufficient,
        ResultCode::Agreed,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ResultCode::Win => "win",
            ResultCode::Checkmated => "checkmated",
            ResultCode::Resigned => "resigned",
            ResultCode::Timeout => "timeout",
            ResultCode::Abandoned => "abandoned",
            ResultCode::Repetition => "repetition",
            ResultCode::Stalemate => "stalemate",
            ResultCode::Insufficient => "insufficient",
            ResultCode::TimeVsInsufficient => "timevsinsufficient",
            ResultCode::Agreed => "agreed",
        }
    }

    #[inline]
    pub fn outcome(self) -> Outcome {
        match self {
            ResultCode::Win => Outcome::Win,
            ResultCode::Repetition
            | ResultCode::TimeVsInsufficient
            | ResultCode::Insufficient
            | ResultCode::Stalemate
            | ResultCode::Agreed => Outcome::Draw,
            ResultCode::Timeout
            | ResultCode::Checkmated
            | ResultCode::Abandoned
            | ResultCode::Resigned => Outcome::Loss,
        }
    }
}

impl FromStr for ResultCode {
    type Err = ParseErrorKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResultCode::ALL
            .into_iter()
            .find(|code| code.as_str() == s)
            .ok_or_else(|| ParseErrorKind::UnknownResult(s.to_string()))
    }
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Win,
    Draw,
    Loss,
}

/// Declared clock of a game: `300`, `180+2` or daily `1/86400`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeControl {
    pub base_seconds: u32,
    pub increment_seconds: u32,
    pub daily: bool,
}

impl TimeControl {
    pub const fn seconds(base_seconds: u32) -> Self {
        Self {
            base_seconds,
            increment_seconds: 0,
            daily: false,
        }
    }
}

impl Default for TimeControl {
    fn default() -> Self {
        TimeControl::seconds(300)
    }
}

impl FromStr for TimeControl {
    type Err = ParseErrorKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || ParseErrorKind::MalformedTimeControl(s.to_string());
        let parse = |part: &str| -> Result<u32, ParseErrorKind> {
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(malformed());
            }
            part.parse().map_err(|_| malformed())
        };

        let s = s.trim();
        if let Some((moves, secs)) = s.split_once('/') {
            parse(moves)?;
            return Ok(TimeControl {
                base_seconds: parse(secs)?,
                increment_seconds: 0,
                daily: true,
            });
        }

        match s.split_once('+') {
            Some((base, inc)) => Ok(TimeControl {
                base_seconds: parse(base)?,
                increment_seconds: parse(inc)?,
                daily: false,
            }),
            None => Ok(TimeControl::seconds(parse(s)?)),
        }
    }
}

impl fmt::Display for TimeControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.daily {
            write!(f, "1/{}", self.base_seconds)
        } else if self.increment_seconds > 0 {
            write!(f, "{}+{}", self.base_seconds, self.increment_seconds)
        } else {
            write!(f, "{}", self.base_seconds)
        }
    }
}

/// Calendar month of an archive, taken from the trailing `YYYY/MM` of its location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Month {
    pub year: u16,
    pub month: u8,
}

impl Month {
    pub fn from_location(location: &str) -> Option<Month> {
        let mut parts = location.trim_end_matches('/').rsplit('/');
        let month = parts.next()?;
        let year = parts.next()?;

        if year.len() != 4 || month.len() != 2 {
            return None;
        }
        if !year.bytes().chain(month.bytes()).all(|b| b.is_ascii_digit()) {
            return None;
        }

        let month: u8 = month.parse().ok()?;
        if !(1..=12).contains(&month) {
            return None;
        }
        Some(Month {
            year: year.parse().ok()?,
            month,
        })
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}/{:02}", self.year, self.month)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Side {
    pub rating: i32,
    pub handle: String,
    pub result: ResultCode,
}

/// One played game, built once from a raw archive entry and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameRecord {
    pub url: String,
    pub time_control: TimeControl,
    pub move_count: u32,
    pub played_date: NaiveDate,
    pub played_time: NaiveTime,
    pub timezone: String,
    pub white: Side,
    pub black: Side,
}

impl GameRecord {
    #[inline]
    pub fn time_control_seconds(&self) -> u32 {
        self.time_control.base_seconds
    }

    /// Wall-clock time with its zone, e.g. `15:24:10 UTC`.
    pub fn played_time_label(&self) -> String {
        format!("{} {}", self.played_time.format("%H:%M:%S"), self.timezone)
    }

    pub fn side(&self, color: Color) -> &Side {
        color.fold_wb(&self.white, &self.black)
    }

    /// Colour played by `handle`, if exactly one side is theirs.
    pub fn color_of(&self, handle: &str) -> Option<Color> {
        let white = self.white.handle.eq_ignore_ascii_case(handle);
        let black = self.black.handle.eq_ignore_ascii_case(handle);
        match (white, black) {
            (true, false) => Some(Color::White),
            (false, true) => Some(Color::Black),
            _ => None,
        }
    }

    pub fn outcome_for(&self, handle: &str) -> Option<(Color, Outcome)> {
        let color = self.color_of(handle)?;
        Some((color, self.side(color).result.outcome()))
    }
}
