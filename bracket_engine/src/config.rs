// ********* Input data structures ***********

use std::error::Error;
use std::fmt::Display;
use std::hash::{Hash, Hasher};

/// The name given to a contestant that is not known yet, because the question
/// that should have produced it did not receive any ballot.
pub const PLACEHOLDER: &str = "__________";

/// A ballot cast for one question of one round.
///
/// Ballots are treated as an unordered collection: the order in which they are
/// passed to the engine never changes the outcome.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub struct Ballot {
    pub round_number: u32,
    /// Question within the round, starting at 1.
    pub question_number: u32,
    /// The name of the chosen entry. Names that are not one of the two
    /// candidates of the question are ignored.
    pub choice: String,
}

impl Ballot {
    pub fn new(round_number: u32, question_number: u32, choice: &str) -> Ballot {
        Ballot {
            round_number,
            question_number,
            choice: choice.to_string(),
        }
    }
}

// ******** Output data structures *********

/// A contestant of a round, with the number of votes attached to it.
///
/// Two choices are equal if and only if they have the same name (case-sensitive).
/// The vote count does not take part in equality or hashing.
#[derive(Debug, Clone)]
pub struct Choice {
    pub name: String,
    pub votes: u64,
}

impl Choice {
    pub fn new(name: &str) -> Choice {
        Choice::with_votes(name, 0)
    }

    pub fn with_votes(name: &str, votes: u64) -> Choice {
        Choice {
            name: name.to_string(),
            votes,
        }
    }

    /// A contestant for a question that has not been decided.
    pub fn placeholder() -> Choice {
        Choice::new(PLACEHOLDER)
    }

    pub fn is_placeholder(&self) -> bool {
        self.name == PLACEHOLDER
    }
}

impl PartialEq for Choice {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Choice {}

impl Hash for Choice {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl PartialEq<str> for Choice {
    fn eq(&self, other: &str) -> bool {
        self.name == other
    }
}

impl Display for Choice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// One elimination stage.
///
/// Invariant: the number of choices is even, except for the terminal round
/// which holds exactly one choice.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Round {
    pub round_number: u32,
    choices: Vec<Choice>,
}

impl Round {
    pub fn new(round_number: u32, choices: Vec<Choice>) -> Result<Round, BracketErrors> {
        let n = choices.len();
        if n == 0 || (n != 1 && n % 2 != 0) {
            return Err(BracketErrors::Structural {
                message: format!(
                    "Round {} cannot be split into questions: {} choices",
                    round_number, n
                ),
            });
        }
        Ok(Round {
            round_number,
            choices,
        })
    }

    pub fn choices(&self) -> &[Choice] {
        &self.choices
    }

    pub fn total_questions(&self) -> u32 {
        (self.choices.len() / 2) as u32
    }

    /// The round with the single winner of the bracket.
    pub fn is_terminal(&self) -> bool {
        self.choices.len() == 1
    }

    /// Returns the two choices. Question number 1 returns choice 0 and 1, and so on.
    pub fn get_question(&self, number: u32) -> Result<(&Choice, &Choice), BracketErrors> {
        if number < 1 {
            return Err(BracketErrors::QuestionRange {
                message: "The first question is number 1".to_string(),
            });
        }
        if number > self.total_questions() {
            return Err(BracketErrors::QuestionRange {
                message: format!(
                    "Requested question {} but there are only {}",
                    number,
                    self.total_questions()
                ),
            });
        }
        let pos = ((number - 1) * 2) as usize;
        Ok((&self.choices[pos], &self.choices[pos + 1]))
    }
}

impl Display for Round {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Round {}, {} choices",
            self.round_number,
            self.choices.len()
        )
    }
}

/// How one question was decided.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct QuestionOutcome {
    pub round_number: u32,
    pub question_number: u32,
    /// The two candidates in question order, with their tallies.
    pub tally: Vec<(String, u64)>,
    pub winner: Choice,
    /// True if the tallies were equal and non-zero.
    pub tiebreak: bool,
}

/// Errors that prevent a bracket from being resolved or inspected.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum BracketErrors {
    /// The entries cannot form a single-elimination bracket.
    Structural { message: String },
    /// A question number outside of the questions of a round.
    QuestionRange { message: String },
    /// A round number outside of the rounds of the bracket.
    RoundRange { message: String },
}

impl Error for BracketErrors {}

impl Display for BracketErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BracketErrors::Structural { message } => write!(f, "Invalid bracket: {}", message),
            BracketErrors::QuestionRange { message } => write!(f, "Invalid question: {}", message),
            BracketErrors::RoundRange { message } => write!(f, "Invalid round: {}", message),
        }
    }
}
