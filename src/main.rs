mod args;

use std::error::Error;
use std::fs::File;

use args::Args;
use chess_stats::{run, ChessComClient};
use clap::Parser;
use log::LevelFilter;
use simplelog::{ColorChoice, CombinedLogger, Config, SharedLogger, TermLogger, TerminalMode, WriteLogger};

fn main() -> Result<(), Box<dyn Error>> {
    let args = init()?;
    let config = args.config();

    let client = ChessComClient::new(&args.api_base)?;
    let report = run(&client, &config, args.jobs, args.on_malformed, args.verify_moves)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", report);
    }

    Ok(())
}

fn init() -> Result<Args, Box<dyn Error>> {
    let args = Args::parse();

    let level = match args.verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    let mut loggers: Vec<Box<dyn SharedLogger>> = Vec::with_capacity(2);
    loggers.push(TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    ));
    if let Some(log_file) = &args.log_file {
        loggers.push(WriteLogger::new(
            LevelFilter::Debug,
            Config::default(),
            File::create(log_file)?,
        ));
    }
    CombinedLogger::init(loggers)?;

    Ok(args)
}
