//! The rules of the surrounding application: when a bracket can be seen or
//! voted on, and which ballots of a voter are kept. The resolution itself does
//! not look at any of this.

use log::{debug, warn};

use std::collections::HashMap;
use std::fmt::Display;

use chrono::{DateTime, Utc};

use crate::bracket::config_reader::BracketSettings;
use crate::bracket::ParsedBallot;

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum WindowStatus {
    NotStarted,
    Open,
    Ended,
    /// Locked out by the bracket owner.
    Closed,
}

impl Display for WindowStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            WindowStatus::NotStarted => "notStarted",
            WindowStatus::Open => "open",
            WindowStatus::Ended => "ended",
            WindowStatus::Closed => "closed",
        };
        write!(f, "{}", s)
    }
}

/// What to do when a voter casts more than one ballot for the same question.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum DuplicatePolicy {
    /// The first ballot is kept.
    InsertOnly,
    /// The last ballot replaces the previous ones.
    Upsert,
}

pub fn window_status(b: &BracketSettings, now: DateTime<Utc>) -> WindowStatus {
    if b.start_time.map_or(false, |start| now < start) {
        WindowStatus::NotStarted
    } else if b.end_time.map_or(false, |end| now > end) {
        WindowStatus::Ended
    } else if !b.is_open {
        WindowStatus::Closed
    } else {
        WindowStatus::Open
    }
}

/// The bracket may be displayed once it has started, even if voting is over.
pub fn can_view(b: &BracketSettings, now: DateTime<Utc>) -> bool {
    window_status(b, now) != WindowStatus::NotStarted
}

/// Votes are accepted on the whole bracket at once, when no round is singled out.
pub fn can_vote(b: &BracketSettings, now: DateTime<Utc>) -> bool {
    b.current_round == 0 && window_status(b, now) == WindowStatus::Open
}

/// Guesses are only accepted for the current round.
pub fn can_guess(b: &BracketSettings, round: u32, now: DateTime<Utc>) -> bool {
    b.current_round != 0 && b.current_round == round && window_status(b, now) == WindowStatus::Open
}

/// Keeps one ballot per voter, round and question. Anonymous ballots are all kept.
///
/// The order of the kept ballots follows the input.
pub fn dedup_ballots(ballots: Vec<ParsedBallot>, policy: DuplicatePolicy) -> Vec<ParsedBallot> {
    let mut res: Vec<ParsedBallot> = Vec::with_capacity(ballots.len());
    let mut seen: HashMap<(String, u32, u32), usize> = HashMap::new();
    for b in ballots {
        let voter = match b.voter.clone() {
            Some(v) => v,
            None => {
                res.push(b);
                continue;
            }
        };
        let key = (voter, b.round, b.question);
        let existing: Option<usize> = seen.get(&key).copied();
        match (existing, policy) {
            (Some(_), DuplicatePolicy::InsertOnly) => {
                warn!(
                    "dedup_ballots: {} already voted on round {} question {}, rejecting ballot {}",
                    key.0, key.1, key.2, b.id
                );
            }
            (Some(idx), DuplicatePolicy::Upsert) => {
                debug!(
                    "dedup_ballots: ballot {} replaces ballot {}",
                    b.id, res[idx].id
                );
                res[idx] = b;
            }
            (None, _) => {
                seen.insert(key, res.len());
                res.push(b);
            }
        }
    }
    res
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn settings(is_open: bool, current_round: u32) -> BracketSettings {
        BracketSettings {
            name: "b".to_string(),
            choices: vec!["a".to_string(), "b".to_string()],
            is_open,
            current_round,
            start_time: Some(Utc.with_ymd_and_hms(2023, 3, 1, 0, 0, 0).unwrap()),
            end_time: Some(Utc.with_ymd_and_hms(2023, 3, 22, 0, 0, 0).unwrap()),
        }
    }

    fn ballot(id: &str, voter: Option<&str>, round: u32, question: u32, choice: &str) -> ParsedBallot {
        ParsedBallot {
            id: id.to_string(),
            voter: voter.map(|v| v.to_string()),
            round,
            question,
            choice: choice.to_string(),
        }
    }

    #[test]
    fn window() {
        let b = settings(true, 0);
        assert_eq!(
            window_status(&b, Utc.with_ymd_and_hms(2023, 2, 1, 0, 0, 0).unwrap()),
            WindowStatus::NotStarted
        );
        assert_eq!(
            window_status(&b, Utc.with_ymd_and_hms(2023, 3, 5, 0, 0, 0).unwrap()),
            WindowStatus::Open
        );
        assert_eq!(
            window_status(&b, Utc.with_ymd_and_hms(2023, 4, 1, 0, 0, 0).unwrap()),
            WindowStatus::Ended
        );
        assert_eq!(
            window_status(&settings(false, 0), Utc.with_ymd_and_hms(2023, 3, 5, 0, 0, 0).unwrap()),
            WindowStatus::Closed
        );
        assert_eq!(WindowStatus::NotStarted.to_string(), "notStarted");
    }

    #[test]
    fn view_vote_guess() {
        let during = Utc.with_ymd_and_hms(2023, 3, 5, 0, 0, 0).unwrap();
        let after = Utc.with_ymd_and_hms(2023, 4, 1, 0, 0, 0).unwrap();
        let before = Utc.with_ymd_and_hms(2023, 2, 1, 0, 0, 0).unwrap();

        let whole = settings(true, 0);
        assert!(can_view(&whole, during));
        assert!(can_view(&whole, after));
        assert!(!can_view(&whole, before));
        assert!(can_vote(&whole, during));
        assert!(!can_vote(&whole, after));
        assert!(!can_guess(&whole, 0, during));

        let round_two = settings(true, 2);
        assert!(!can_vote(&round_two, during));
        assert!(can_guess(&round_two, 2, during));
        assert!(!can_guess(&round_two, 1, during));
        assert!(!can_guess(&settings(false, 2), 2, during));
    }

    #[test]
    fn insert_only_keeps_first() {
        let ballots = vec![
            ballot("1", Some("bob"), 1, 1, "a"),
            ballot("2", Some("bob"), 1, 1, "b"),
            ballot("3", Some("bob"), 1, 2, "c"),
            ballot("4", None, 1, 1, "b"),
            ballot("5", None, 1, 1, "b"),
        ];
        let res = dedup_ballots(ballots, DuplicatePolicy::InsertOnly);
        let ids: Vec<&str> = res.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3", "4", "5"]);
    }

    #[test]
    fn upsert_keeps_last() {
        let ballots = vec![
            ballot("1", Some("bob"), 1, 1, "a"),
            ballot("2", Some("alice"), 1, 1, "a"),
            ballot("3", Some("bob"), 1, 1, "b"),
        ];
        let res = dedup_ballots(ballots, DuplicatePolicy::Upsert);
        let ids: Vec<&str> = res.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, vec!["3", "2"]);
        assert_eq!(res[0].choice, "b");
    }
}
