use clap::Parser;

/// This is a bracket resolution program for single-elimination votes.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path) The file containing the bracket description and the list of ballot files, in JSON.
    /// For more information about the file format, read the documentation of the bracket_engine::manual module.
    #[clap(short, long, value_parser)]
    pub config: String,

    /// (file path) A reference file containing the resolved bracket in JSON format. If provided, bracketizer will
    /// check that the resolved output matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (file path, 'stdout' or empty) If specified, the summary of the bracket will be written in JSON format to the given
    /// location. Setting this option overrides the path that may be specified with the --config option.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file paths) Extra ballot files, added to the ones listed in the configuration. The provider is guessed from
    /// the extension (.json or .csv).
    #[clap(short, long, value_parser)]
    pub ballots: Option<Vec<String>>,

    /// (RFC 3339 date, default: now) The time used to check if the bracket can be displayed.
    #[clap(long, value_parser)]
    pub now: Option<String>,

    /// (ROUND:QUESTION) If specified, prints the two contestants of this question.
    #[clap(short, long, value_parser)]
    pub question: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
