pub mod builder;
mod config;
pub mod grid;
pub mod manual;

use log::{debug, info, warn};
use sha2::{Digest, Sha256};

use std::{
    collections::HashSet,
    ops::{Add, AddAssign},
};

pub use crate::config::*;

// **** Private structures ****

#[derive(Eq, PartialEq, Debug, Clone, Copy, PartialOrd, Ord, Hash)]
struct VoteCount(u64);

impl VoteCount {
    const EMPTY: VoteCount = VoteCount(0);
    const ONE: VoteCount = VoteCount(1);
}

impl AddAssign for VoteCount {
    fn add_assign(&mut self, rhs: VoteCount) {
        self.0 += rhs.0;
    }
}

impl Add for VoteCount {
    type Output = VoteCount;
    fn add(self: VoteCount, rhs: VoteCount) -> VoteCount {
        VoteCount(self.0 + rhs.0)
    }
}

// Flag to indicate if a tiebreak happened.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
enum TiebreakSituation {
    Clean,           // Did not happen
    TiebreakOccured, // Happened and had to be resolved.
}

/// The outcome of a full resolution pass.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Resolution {
    /// All the rounds, from round 1 to the terminal round.
    pub rounds: Vec<Round>,
    /// One entry per question of every round except the terminal one, in round
    /// then question order.
    pub outcomes: Vec<QuestionOutcome>,
}

/// Returns the total number of rounds in a bracket, including the final round
/// with the winner (only one choice).
pub fn total_rounds(entries: &[String]) -> Result<u32, BracketErrors> {
    let mut total_choices = entries.len();
    if total_choices < 2 {
        return Err(BracketErrors::Structural {
            message: "Not enough choices, you must have at least 2".to_string(),
        });
    }
    if !total_choices.is_power_of_two() {
        return Err(BracketErrors::Structural {
            message: format!(
                "The number of choices must be a power of two, got {}",
                total_choices
            ),
        });
    }
    let mut rounds = 0;
    while total_choices > 1 {
        rounds += 1;
        total_choices /= 2;
    }
    // That gives the number of rounds with at least two choices, add one for
    // the final round with the winner.
    Ok(rounds + 1)
}

/// The immutable definition of a bracket: its name and the entries of the
/// first round.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct BracketDefinition {
    pub name: String,
    entries: Vec<String>,
    total_rounds: u32,
}

impl BracketDefinition {
    pub fn new(name: &str, entries: &[String]) -> Result<BracketDefinition, BracketErrors> {
        let total_rounds = total_rounds(entries)?;
        let mut seen: HashSet<&String> = HashSet::new();
        for e in entries.iter() {
            if !seen.insert(e) {
                warn!(
                    "BracketDefinition: bracket {:?} has a duplicated entry {:?}, ballots for it are ambiguous",
                    name, e
                );
            }
        }
        Ok(BracketDefinition {
            name: name.to_string(),
            entries: entries.to_vec(),
            total_rounds,
        })
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn total_rounds(&self) -> u32 {
        self.total_rounds
    }

    pub fn longest_name(&self) -> usize {
        grid::longest_name(&self.entries)
    }
}

/// Resolves the bracket round by round and returns all the rounds, including
/// the terminal round with the champion.
///
/// Arguments:
/// * `entries` the entries of the first round, in order
/// * `total_rounds` the number of rounds, as computed by [total_rounds]
/// * `ballots` all the ballots, in any order
pub fn resolve(
    entries: &[String],
    total_rounds: u32,
    ballots: &[Ballot],
) -> Result<Vec<Round>, BracketErrors> {
    resolve_with_stats(entries, total_rounds, ballots).map(|r| r.rounds)
}

/// Same as [resolve], and also reports how every question was decided.
pub fn resolve_with_stats(
    entries: &[String],
    total_rounds: u32,
    ballots: &[Ballot],
) -> Result<Resolution, BracketErrors> {
    // Checked before looking at any ballot: no partial result on a bad bracket.
    let expected_rounds = crate::total_rounds(entries)?;
    if expected_rounds != total_rounds {
        return Err(BracketErrors::Structural {
            message: format!(
                "{} choices make {} rounds, but {} rounds were requested",
                entries.len(),
                expected_rounds,
                total_rounds
            ),
        });
    }
    info!(
        "Resolving {:?} entries over {:?} rounds with {:?} ballots",
        entries.len(),
        total_rounds,
        ballots.len()
    );

    let first_round = Round::new(1, entries.iter().map(|e| Choice::new(e)).collect())?;
    let mut rounds: Vec<Round> = vec![first_round];
    let mut outcomes: Vec<QuestionOutcome> = Vec::new();
    let mut counted_ballots: usize = 0;

    for round_number in 1..total_rounds {
        let round_ballots: Vec<&Ballot> = ballots
            .iter()
            .filter(|b| b.round_number == round_number)
            .collect();
        let cur_round = get_round(&rounds, entries.len(), total_rounds, round_number)?;
        debug!(
            "resolve: {} with {:?} ballots",
            cur_round,
            round_ballots.len()
        );

        let round_outcomes = decide_round(&cur_round, &round_ballots)?;
        counted_ballots += round_outcomes
            .iter()
            .flat_map(|o| o.tally.iter())
            .map(|(_, count)| *count as usize)
            .sum::<usize>();
        let winners: Vec<Choice> = round_outcomes.iter().map(|o| o.winner.clone()).collect();
        outcomes.extend(round_outcomes);
        rounds.push(Round::new(round_number + 1, winners)?);
    }

    if counted_ballots < ballots.len() {
        warn!(
            "resolve: ignored {:?} ballots that do not name a candidate of their question",
            ballots.len() - counted_ballots
        );
    }
    Ok(Resolution { rounds, outcomes })
}

/// Tallies the ballots cast for `round` against the contestants it already
/// holds. The rounds before it are not resolved again, and ballots for other
/// rounds are ignored.
pub fn tally_round(round: &Round, ballots: &[Ballot]) -> Result<Vec<QuestionOutcome>, BracketErrors> {
    let round_ballots: Vec<&Ballot> = ballots
        .iter()
        .filter(|b| b.round_number == round.round_number)
        .collect();
    debug!(
        "tally_round: {} with {:?} ballots",
        round,
        round_ballots.len()
    );
    decide_round(round, &round_ballots)
}

fn decide_round(
    cur_round: &Round,
    round_ballots: &[&Ballot],
) -> Result<Vec<QuestionOutcome>, BracketErrors> {
    let mut outcomes: Vec<QuestionOutcome> = Vec::new();
    for question_number in 1..=cur_round.total_questions() {
        let (c1, c2) = cur_round.get_question(question_number)?;
        let (n1, n2) = compute_tally(round_ballots, question_number, c1, c2);
        debug!(
            "resolve: round {} question {}: {} -> {:?}, {} -> {:?}",
            cur_round.round_number, question_number, c1, n1, c2, n2
        );

        let (winner, situation) = select_winner(c1, n1, c2, n2);
        outcomes.push(QuestionOutcome {
            round_number: cur_round.round_number,
            question_number,
            tally: vec![(c1.name.clone(), n1.0), (c2.name.clone(), n2.0)],
            winner,
            tiebreak: situation == TiebreakSituation::TiebreakOccured,
        });
    }
    Ok(outcomes)
}

/// Returns the round number `number`, or a synthetic round of placeholders if
/// it has not been resolved yet.
fn get_round(
    rounds: &[Round],
    first_round_size: usize,
    total_rounds: u32,
    number: u32,
) -> Result<Round, BracketErrors> {
    if number < 1 || number > total_rounds {
        return Err(BracketErrors::RoundRange {
            message: format!(
                "Requested round {} but the rounds are numbered 1 to {}",
                number, total_rounds
            ),
        });
    }
    match rounds.get((number - 1) as usize) {
        Some(r) => Ok(r.clone()),
        None => placeholder_round(first_round_size, number),
    }
}

/// A round of the right size for its position in the bracket, in which every
/// choice is still undecided.
pub fn placeholder_round(first_round_size: usize, number: u32) -> Result<Round, BracketErrors> {
    let mut choice_count = first_round_size;
    for _ in 1..number {
        choice_count /= 2;
    }
    Round::new(number, vec![Choice::placeholder(); choice_count])
}

fn compute_tally(
    round_ballots: &[&Ballot],
    question_number: u32,
    c1: &Choice,
    c2: &Choice,
) -> (VoteCount, VoteCount) {
    let mut n1 = VoteCount::EMPTY;
    let mut n2 = VoteCount::EMPTY;
    for b in round_ballots
        .iter()
        .filter(|b| b.question_number == question_number)
    {
        // An undecided contestant cannot collect votes.
        if b.choice == PLACEHOLDER {
            continue;
        }
        if *c1 == *b.choice.as_str() {
            n1 += VoteCount::ONE;
        } else if *c2 == *b.choice.as_str() {
            n2 += VoteCount::ONE;
        }
    }
    (n1, n2)
}

fn select_winner(
    c1: &Choice,
    n1: VoteCount,
    c2: &Choice,
    n2: VoteCount,
) -> (Choice, TiebreakSituation) {
    if n1 == VoteCount::EMPTY && n2 == VoteCount::EMPTY {
        (Choice::placeholder(), TiebreakSituation::Clean)
    } else if n1 > n2 {
        (Choice::new(&c1.name), TiebreakSituation::Clean)
    } else if n1 == n2 {
        // The winner keeps its tally as a marker of the tie.
        let winner = tiebreak_winner(c1, c2);
        info!("Tie! Using {} ({} against {})", winner, c1, c2);
        (
            Choice::with_votes(&winner.name, n1.0),
            TiebreakSituation::TiebreakOccured,
        )
    } else {
        (Choice::new(&c2.name), TiebreakSituation::Clean)
    }
}

/// The sort key of a name when breaking ties: the hex SHA-256 digest of its
/// UTF-8 bytes. It only depends on the name, so replays give the same result.
pub fn tiebreak_key(name: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(name.as_bytes());
    format!("{:x}", hasher.finalize())
}

// The candidate with the smallest key wins. Equal keys (same names) pick the
// second candidate.
fn tiebreak_winner<'a>(c1: &'a Choice, c2: &'a Choice) -> &'a Choice {
    if tiebreak_key(&c1.name) < tiebreak_key(&c2.name) {
        c1
    } else {
        c2
    }
}

/// Combines a bracket definition and a list of ballots into the final
/// representation of a bracket.
#[derive(Debug, Clone)]
pub struct BracketView {
    definition: BracketDefinition,
    rounds: Vec<Round>,
    outcomes: Vec<QuestionOutcome>,
}

impl BracketView {
    pub fn new(
        definition: &BracketDefinition,
        ballots: &[Ballot],
    ) -> Result<BracketView, BracketErrors> {
        let res = resolve_with_stats(definition.entries(), definition.total_rounds(), ballots)?;
        Ok(BracketView {
            definition: definition.clone(),
            rounds: res.rounds,
            outcomes: res.outcomes,
        })
    }

    pub fn name(&self) -> &str {
        &self.definition.name
    }

    pub fn definition(&self) -> &BracketDefinition {
        &self.definition
    }

    pub fn total_rounds(&self) -> u32 {
        self.definition.total_rounds()
    }

    pub fn rounds(&self) -> &[Round] {
        &self.rounds
    }

    pub fn outcomes(&self) -> &[QuestionOutcome] {
        &self.outcomes
    }

    /// The winner of the bracket, if the last question has been decided.
    pub fn champion(&self) -> Option<&Choice> {
        self.rounds
            .last()
            .filter(|r| r.is_terminal())
            .and_then(|r| r.choices().first())
            .filter(|c| !c.is_placeholder())
    }

    /// Returns round number `number` or a synthetic round.
    pub fn get_round(&self, number: u32) -> Result<Round, BracketErrors> {
        get_round(
            &self.rounds,
            self.definition.entries().len(),
            self.total_rounds(),
            number,
        )
    }

    pub fn get_question(
        &self,
        round: u32,
        question: u32,
    ) -> Result<(Choice, Choice), BracketErrors> {
        let my_round = self.get_round(round)?;
        let (c1, c2) = my_round.get_question(question)?;
        Ok((c1.clone(), c2.clone()))
    }

    /// Tallies `ballots` on the questions of round `number`, with the
    /// contestants this view resolved for that round.
    pub fn tally_round(
        &self,
        number: u32,
        ballots: &[Ballot],
    ) -> Result<Vec<QuestionOutcome>, BracketErrors> {
        let my_round = self.get_round(number)?;
        tally_round(&my_round, ballots)
    }

    pub fn longest_name(&self) -> usize {
        self.definition.longest_name()
    }

    pub fn header(&self) -> Vec<String> {
        grid::header(self.total_rounds())
    }

    pub fn to_table(&self) -> Vec<Vec<Option<Choice>>> {
        grid::to_table(&self.rounds, self.total_rounds())
    }
}
