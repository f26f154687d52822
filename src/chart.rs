//! Terminal rendering of the reports: one percentage chart per colour and
//! one win/loss bar chart per bucket report.

use std::fmt;

use shakmaty::Color;

use crate::report::{BucketReport, ColorReport, Report, SideSummary};

const BAR_WIDTH: usize = 40;
const RULE_WIDTH: usize = 50;

fn bar(value: f64, max: f64) -> String {
    if max <= 0.0 {
        return String::new();
    }
    let len = (value / max * BAR_WIDTH as f64).round() as usize;
    "█".repeat(len.min(BAR_WIDTH))
}

fn heading(f: &mut fmt::Formatter<'_>, title: &str) -> fmt::Result {
    writeln!(f, "{}", title)?;
    writeln!(f, "{}", "=".repeat(RULE_WIDTH))
}

fn write_side(f: &mut fmt::Formatter<'_>, color: Color, side: &SideSummary) -> fmt::Result {
    let name = color.fold_wb("White", "Black");
    writeln!(f, "Games as {} ({})", name, side.tally.total())?;

    let Some(pct) = side.percentages else {
        return writeln!(f, "   n/a");
    };
    let rows = [
        ("Win", side.tally.win, pct.win),
        ("Draw", side.tally.draw, pct.draw),
        ("Loss", side.tally.loss, pct.loss),
    ];
    for (label, count, share) in rows {
        writeln!(
            f,
            "   {:<5}{:>6.1}% {:>5}  {}",
            label,
            share,
            count,
            bar(share, 100.0)
        )?;
    }
    Ok(())
}

impl fmt::Display for ColorReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        heading(f, "Results by Colour")?;
        write_side(f, Color::White, &self.white)?;
        writeln!(f)?;
        write_side(f, Color::Black, &self.black)
    }
}

impl fmt::Display for BucketReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        heading(f, &format!("{} ({})", self.title, self.time_control))?;

        let max = self
            .buckets
            .iter()
            .map(|b| b.tally.win.max(b.tally.loss))
            .max()
            .unwrap_or(0) as f64;

        for bucket in &self.buckets {
            let tally = &bucket.tally;
            writeln!(f, "{:>11} W {:>4} {}", bucket.label, tally.win, bar(tally.win as f64, max))?;
            writeln!(
                f,
                "{:>11} L {:>4} {}   (draws: {})",
                "",
                tally.loss,
                bar(tally.loss as f64, max),
                tally.draw
            )?;
        }
        writeln!(f, "Games: {}", self.total())
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Player: {}", self.handle)?;
        writeln!(f, "Games played: {}", self.games)?;
        writeln!(f)?;
        writeln!(f, "{}", self.by_color)?;
        writeln!(f, "{}", self.by_move_count)?;
        write!(f, "{}", self.by_time_of_day)
    }
}
