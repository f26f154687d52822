use chrono::Timelike;
use serde::Serialize;
use shakmaty::Color;

use crate::game::{GameRecord, Outcome, TimeControl};

pub const MOVE_BUCKETS: usize = 9;
pub const MOVE_BUCKET_LABELS: [&str; MOVE_BUCKETS] = [
    "1-9", "10-19", "20-29", "30-39", "40-49", "50-59", "60-69", "70-79", "80+",
];

pub const TIME_BANDS: usize = 8;
/// Hours covered by each band under the four-hour shift of `time_band`.
pub const TIME_BAND_LABELS: [&str; TIME_BANDS] = [
    "04:00-06:59",
    "07:00-09:59",
    "10:00-12:59",
    "13:00-15:59",
    "16:00-18:59",
    "19:00-21:59",
    "22:00-00:59",
    "01:00-03:59",
];

#[inline]
pub fn move_bucket(move_count: u32) -> usize {
    (move_count / 10).min(MOVE_BUCKETS as u32 - 1) as usize
}

/// `(hour - 4) // 3` with floor division, wrapped into `0..8`.
#[inline]
pub fn time_band(hour: u32) -> usize {
    (hour as i32 - 4).div_euclid(3).rem_euclid(TIME_BANDS as i32) as usize
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Tally {
    pub win: u32,
    pub draw: u32,
    pub loss: u32,
}

impl Tally {
    #[inline]
    pub fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Win => self.win += 1,
            Outcome::Draw => self.draw += 1,
            Outcome::Loss => self.loss += 1,
        }
    }

    #[inline]
    pub fn total(&self) -> u32 {
        self.win + self.draw + self.loss
    }

    /// `None` for an empty tally rather than dividing by zero.
    pub fn percentages(&self) -> Option<Percentages> {
        let total = self.total();
        if total == 0 {
            return None;
        }
        let pct = |n: u32| n as f64 / total as f64 * 100.0;
        Some(Percentages {
            win: pct(self.win),
            draw: pct(self.draw),
            loss: pct(self.loss),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Percentages {
    pub win: f64,
    pub draw: f64,
    pub loss: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SideSummary {
    #[serde(flatten)]
    pub tally: Tally,
    pub percentages: Option<Percentages>,
}

impl SideSummary {
    fn new(tally: Tally) -> Self {
        Self {
            tally,
            percentages: tally.percentages(),
        }
    }
}

/// Win/draw/loss of the player as White and as Black.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColorReport {
    pub white: SideSummary,
    pub black: SideSummary,
}

impl ColorReport {
    pub fn side(&self, color: Color) -> &SideSummary {
        color.fold_wb(&self.white, &self.black)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bucket {
    pub label: &'static str,
    #[serde(flatten)]
    pub tally: Tally,
}

/// Ordered win/draw/loss buckets over games of one time control.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BucketReport {
    pub title: &'static str,
    pub time_control: String,
    pub buckets: Vec<Bucket>,
}

impl BucketReport {
    fn empty(title: &'static str, time_control: TimeControl, labels: &[&'static str]) -> Self {
        Self {
            title,
            time_control: time_control.to_string(),
            buckets: labels
                .iter()
                .map(|&label| Bucket {
                    label,
                    tally: Tally::default(),
                })
                .collect(),
        }
    }

    pub fn total(&self) -> u32 {
        self.buckets.iter().map(|b| b.tally.total()).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub handle: String,
    pub games: usize,
    pub by_color: ColorReport,
    pub by_move_count: BucketReport,
    pub by_time_of_day: BucketReport,
}

pub fn by_color<'a, I>(games: I, handle: &str) -> ColorReport
where
    I: IntoIterator<Item = &'a GameRecord>,
{
    let mut white = Tally::default();
    let mut black = Tally::default();

    for game in games {
        if let Some((color, outcome)) = game.outcome_for(handle) {
            match color {
                Color::White => white.record(outcome),
                Color::Black => black.record(outcome),
            }
        }
    }

    ColorReport {
        white: SideSummary::new(white),
        black: SideSummary::new(black),
    }
}

fn bucketed<'a, I, F>(
    games: I,
    handle: &str,
    time_control: TimeControl,
    mut report: BucketReport,
    index: F,
) -> BucketReport
where
    I: IntoIterator<Item = &'a GameRecord>,
    F: Fn(&GameRecord) -> usize,
{
    for game in games {
        if game.time_control != time_control {
            continue;
        }
        if let Some((_, outcome)) = game.outcome_for(handle) {
            report.buckets[index(game)].tally.record(outcome);
        }
    }
    report
}

pub fn by_move_count<'a, I>(games: I, handle: &str, time_control: TimeControl) -> BucketReport
where
    I: IntoIterator<Item = &'a GameRecord>,
{
    let report = BucketReport::empty("Wins/Losses by Moves Per Game", time_control, &MOVE_BUCKET_LABELS);
    bucketed(games, handle, time_control, report, |game| move_bucket(game.move_count))
}

pub fn by_time_of_day<'a, I>(games: I, handle: &str, time_control: TimeControl) -> BucketReport
where
    I: IntoIterator<Item = &'a GameRecord>,
{
    let report = BucketReport::empty("Wins/Losses at Times of Day", time_control, &TIME_BAND_LABELS);
    bucketed(games, handle, time_control, report, |game| time_band(game.played_time.hour()))
}
