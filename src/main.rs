use log::{debug, info, warn};

use clap::Parser;
use snafu::ErrorCompat;

mod args;
mod bracket;

use crate::args::Args;
use crate::bracket::*;

fn run(args: &Args) -> BracketResult<()> {
    let question = match args.question.as_deref() {
        Some(q) => Some(parse_question(q)?),
        None => None,
    };
    let opts = RunOptions {
        config_path: args.config.clone(),
        extra_ballots: args.ballots.clone().unwrap_or_default(),
        out: args.out.clone(),
        reference: args.reference.clone(),
        now: parse_now(args.now.as_deref())?,
        question,
    };
    debug!("run: options: {:?}", opts);
    run_bracket(&opts)?;
    Ok(())
}

fn main() {
    let args = Args::parse();
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if args.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.init();

    info!("args {:?}", args);

    if let Err(e) = run(&args) {
        warn!("Error occured {:?}", e);
        eprintln!("An error occured: {}", e);
        if let Some(bt) = ErrorCompat::backtrace(&e) {
            eprintln!("trace: {}", bt);
        }
        std::process::exit(1);
    }
}
