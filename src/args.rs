use std::path::PathBuf;

use chess_stats::fetch::DEFAULT_API_BASE;
use chess_stats::{AnalysisConfig, OnMalformed, TimeControl};
use clap::{ArgAction, Parser};

#[derive(Parser, Debug)]
#[command(name = "chess-stats")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Win/draw/loss breakdowns of a player's archived games")]
pub struct Args {
    /// Player handle whose archives are analysed.
    pub username: String,

    /// Only games with this clock count towards the bucket charts (`300`, `180+2`, `1/86400`).
    #[arg(long, default_value = "300")]
    pub time_control: TimeControl,

    /// Months fetched concurrently.
    #[arg(long, default_value_t = 1)]
    pub jobs: usize,

    #[arg(long, value_enum, default_value_t = OnMalformed::Abort)]
    pub on_malformed: OnMalformed,

    /// Print the reports as JSON instead of charts.
    #[arg(long)]
    pub json: bool,

    /// Replay every game's moves and warn where the move count disagrees.
    #[arg(long)]
    pub verify_moves: bool,

    #[arg(long, default_value = DEFAULT_API_BASE)]
    pub api_base: String,

    /// Also write debug logs to this file.
    #[arg(short, long)]
    pub log_file: Option<PathBuf>,

    /// Raise log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    pub fn config(&self) -> AnalysisConfig {
        AnalysisConfig {
            handle: self.username.clone(),
            time_control: self.time_control,
        }
    }
}
