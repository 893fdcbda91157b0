use log::{debug, info, warn};

use bracket_engine::builder::Builder;
use bracket_engine::*;
use snafu::{prelude::*, Snafu};

use chrono::{DateTime, Utc};
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::json;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::bracket::config_reader::*;
use crate::bracket::policy::*;

mod config_reader;
mod io_common;
mod io_csv;
mod io_json;
pub mod policy;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum BracketError {
    #[snafu(display("Error opening file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Error writing the summary to {path}"))]
    WritingSummary {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error opening CSV file {path}"))]
    CsvOpen { source: csv::Error, path: String },
    #[snafu(display("Error reading CSV line {lineno}"))]
    CsvLineParse { source: csv::Error, lineno: usize },
    #[snafu(display("Missing column {column} in {path}"))]
    CsvMissingColumn { column: String, path: String },
    #[snafu(display("Line {lineno}: invalid {field}: {value:?}"))]
    InvalidField {
        lineno: usize,
        field: String,
        value: String,
    },
    #[snafu(display("Invalid date {value:?}"))]
    ParsingDate {
        source: chrono::ParseError,
        value: String,
    },
    #[snafu(display("The configuration file has no parent directory"))]
    MissingParentDir {},
    #[snafu(display("{source}"))]
    Engine { source: BracketErrors },
    #[snafu(display("No peeking! Bracket {name:?} isn't open yet"))]
    NotStarted { name: String },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type BracketResult<T> = Result<T, BracketError>;

/// Whether a ballot was cast while the whole bracket was open, or as a guess
/// on the outcome of the current round.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum BallotKind {
    Vote,
    Guess,
}

/// A ballot, as parsed by the readers.
/// This is before applying the rules for duplicates.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ParsedBallot {
    pub id: String,
    pub voter: Option<String>,
    pub round: u32,
    pub question: u32,
    pub choice: String,
}

impl ParsedBallot {
    pub fn to_ballot(&self) -> Ballot {
        Ballot::new(self.round, self.question, &self.choice)
    }
}

/// Everything that can be changed from the command line.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub config_path: String,
    pub extra_ballots: Vec<String>,
    pub out: Option<String>,
    pub reference: Option<String>,
    pub now: DateTime<Utc>,
    pub question: Option<(u32, u32)>,
}

pub fn parse_now(now: Option<&str>) -> BracketResult<DateTime<Utc>> {
    match now {
        Some(s) => Ok(DateTime::parse_from_rfc3339(s)
            .context(ParsingDateSnafu {
                value: s.to_string(),
            })?
            .with_timezone(&Utc)),
        None => Ok(Utc::now()),
    }
}

/// Parses a question written as `ROUND:QUESTION`.
pub fn parse_question(s: &str) -> BracketResult<(u32, u32)> {
    let parts: Vec<&str> = s.split(':').collect();
    match parts.as_slice() {
        [r, q] => match (r.trim().parse::<u32>(), q.trim().parse::<u32>()) {
            (Ok(r), Ok(q)) => Ok((r, q)),
            _ => whatever!("Cannot read question {:?}: expected ROUND:QUESTION", s),
        },
        _ => whatever!("Cannot read question {:?}: expected ROUND:QUESTION", s),
    }
}

fn read_ballot_file(path: String, provider: &str) -> BracketResult<Vec<ParsedBallot>> {
    info!("Attempting to read ballot file {:?}", path);
    match provider {
        "json" => io_json::read_json(path),
        "csv" => io_csv::read_csv_ballots(path),
        x => whatever!("Provider not implemented {:?}", x),
    }
}

fn choice_to_json(c: &Choice) -> JSValue {
    json!({"name": c.name, "votes": c.votes})
}

fn rounds_to_json(rounds: &[Round]) -> Vec<JSValue> {
    rounds
        .iter()
        .map(|r| {
            let choices: Vec<JSValue> = r.choices().iter().map(choice_to_json).collect();
            json!({"round": r.round_number, "choices": choices})
        })
        .collect()
}

fn outcomes_to_json(outcomes: &[QuestionOutcome]) -> Vec<JSValue> {
    outcomes
        .iter()
        .map(|o| {
            let tally: Vec<JSValue> = o
                .tally
                .iter()
                .map(|(name, count)| json!({"name": name, "votes": count}))
                .collect();
            json!({
                "round": o.round_number,
                "question": o.question_number,
                "tally": tally,
                "winner": o.winner.name,
                "tiebreak": o.tiebreak,
            })
        })
        .collect()
}

fn table_to_json(view: &BracketView) -> Vec<JSValue> {
    view.to_table()
        .iter()
        .map(|row| {
            let cells: Vec<JSValue> = row
                .iter()
                .map(|c| match c {
                    Some(c) => json!(c.name),
                    None => JSValue::Null,
                })
                .collect();
            JSValue::Array(cells)
        })
        .collect()
}

fn build_summary_js(
    config: &BracketConfig,
    view: &BracketView,
    guesses: Option<(u32, &[QuestionOutcome])>,
    status: WindowStatus,
) -> JSValue {
    let b = &config.bracket;
    let c = json!({
        "name": b.name,
        "totalRounds": view.total_rounds(),
        "isOpen": b.is_open,
        "currentRound": b.current_round,
        "startTime": b.start_time.map(|t| t.to_rfc3339()),
        "endTime": b.end_time.map(|t| t.to_rfc3339()),
        "status": status.to_string(),
    });
    let mut js = json!({
        "config": c,
        "header": view.header(),
        "rounds": rounds_to_json(view.rounds()),
        "questions": outcomes_to_json(view.outcomes()),
        "champion": view.champion().map(|c| c.name.clone()),
        "table": table_to_json(view),
    });
    if let Some((round, outcomes)) = guesses {
        js["guesses"] = json!({
            "round": round,
            "questions": outcomes_to_json(outcomes),
        });
    }
    js
}

fn write_summary(path: &str, pretty_js: &str) -> BracketResult<()> {
    if path == "stdout" {
        println!("{}", pretty_js);
        return Ok(());
    }
    info!("Writing summary to {:?}", path);
    fs::write(path, pretty_js).context(WritingSummarySnafu {
        path: path.to_string(),
    })
}

/// Reads a bracket and its ballots, resolves it and prints it.
///
/// Returns the JSON summary of the resolved bracket.
pub fn run_bracket(opts: &RunOptions) -> BracketResult<JSValue> {
    let config_p = Path::new(opts.config_path.as_str());
    let config = read_config(&opts.config_path)?;
    debug!("config: {:?}", config);

    // A bad bracket fails here, before any ballot is read.
    let definition =
        BracketDefinition::new(&config.bracket.name, &config.bracket.choices).context(EngineSnafu)?;
    info!(
        "Bracket {:?}: {} choices, {} rounds",
        definition.name,
        definition.entries().len(),
        definition.total_rounds()
    );

    let status = window_status(&config.bracket, opts.now);
    info!("Bracket {:?} status at {}: {}", definition.name, opts.now, status);
    ensure!(
        can_view(&config.bracket, opts.now),
        NotStartedSnafu {
            name: definition.name.clone()
        }
    );

    info!(
        "Bracket {:?}: accepting votes: {}, accepting guesses for round {}: {}",
        definition.name,
        can_vote(&config.bracket, opts.now),
        config.bracket.current_round,
        can_guess(&config.bracket, config.bracket.current_round, opts.now)
    );

    let root_p = config_p.parent().context(MissingParentDirSnafu {})?;
    let mut votes: Vec<ParsedBallot> = Vec::new();
    let mut guesses: Vec<ParsedBallot> = Vec::new();
    for source in config.ballot_sources.iter() {
        let p: PathBuf = root_p.join(&source.file_path);
        let mut file_data = read_ballot_file(p.display().to_string(), &source.provider)?;
        match source.kind()? {
            BallotKind::Vote => votes.append(&mut file_data),
            BallotKind::Guess => guesses.append(&mut file_data),
        }
    }
    for extra in opts.extra_ballots.iter() {
        let provider = io_common::provider_for_path(extra)?;
        let mut file_data = read_ballot_file(extra.clone(), provider)?;
        votes.append(&mut file_data);
    }
    info!(
        "Read {} votes and {} guesses",
        votes.len(),
        guesses.len()
    );

    let policy = config.duplicate_policy()?;
    let votes = dedup_ballots(votes, policy);
    let mut builder = Builder::from_definition(&definition);
    for b in votes.iter() {
        builder.add_ballot(b.round, b.question, &b.choice);
    }
    let view = builder.build().context(EngineSnafu)?;

    let current_round = config.bracket.current_round;
    let guess_outcomes = if guesses.is_empty() {
        None
    } else if current_round == 0 {
        warn!(
            "Bracket {:?} has no current round, ignoring {} guesses",
            definition.name,
            guesses.len()
        );
        None
    } else {
        let guesses = dedup_ballots(guesses, policy);
        let guess_ballots: Vec<Ballot> = guesses
            .iter()
            .filter(|b| {
                let keep = b.round == current_round;
                if !keep {
                    warn!(
                        "Guess {} is for round {} but round {} is the current one, skipping",
                        b.id, b.round, current_round
                    );
                }
                keep
            })
            .map(|b| b.to_ballot())
            .collect();
        // Guesses are counted on the contestants resolved from the votes.
        let outcomes = view
            .tally_round(current_round, &guess_ballots)
            .context(EngineSnafu)?;
        Some(outcomes)
    };

    let table = view.to_table();
    let col_width = grid::column_width(view.longest_name());
    print!("{}", grid::render_text(&table, &view.header(), col_width));
    match view.champion() {
        Some(c) => info!("Bracket {:?}: champion is {}", definition.name, c),
        None => info!("Bracket {:?}: no champion yet", definition.name),
    }

    if let Some((r, q)) = opts.question {
        let (c1, c2) = view.get_question(r, q).context(EngineSnafu)?;
        println!("Round {} question {}: {} / {}", r, q, c1, c2);
    }

    // Assemble the final json
    let result_js = build_summary_js(
        &config,
        &view,
        guess_outcomes
            .as_deref()
            .map(|outcomes| (current_round, outcomes)),
        status,
    );
    let pretty_js_stats = serde_json::to_string_pretty(&result_js).context(ParsingJsonSnafu {})?;

    let out_path = opts
        .out
        .clone()
        .or_else(|| config.output_settings.as_ref().and_then(|o| o.output_path.clone()));
    if let Some(out) = out_path {
        write_summary(&out, &pretty_js_stats)?;
    }

    // The reference summary, if provided for comparison
    if let Some(summary_p) = opts.reference.clone() {
        let summary_ref = read_summary(summary_p)?;
        let pretty_js_summary_ref =
            serde_json::to_string_pretty(&summary_ref).context(ParsingJsonSnafu {})?;
        if pretty_js_summary_ref != pretty_js_stats {
            warn!("Found differences with the reference string");
            print_diff(
                pretty_js_summary_ref.as_str(),
                pretty_js_stats.as_ref(),
                "\n",
            );
            whatever!("Difference detected between resolved summary and reference summary")
        }
    }

    Ok(result_js)
}
