use crate::bracket::*;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct BracketSettings {
    pub name: String,
    /// The entries of the first round, in order.
    pub choices: Vec<String>,
    #[serde(rename = "isOpen", default)]
    pub is_open: bool,
    /// If 0, voting is allowed on the entire bracket. If 1+, only guesses in that round.
    #[serde(rename = "currentRound", default)]
    pub current_round: u32,
    /// Start time, UTC
    #[serde(rename = "startTime")]
    pub start_time: Option<DateTime<Utc>>,
    /// End time, UTC
    #[serde(rename = "endTime")]
    pub end_time: Option<DateTime<Utc>>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct BallotSource {
    pub provider: String,
    #[serde(rename = "filePath")]
    pub file_path: String,
    #[serde(rename = "kind")]
    pub _kind: Option<String>,
}

impl BallotSource {
    pub fn kind(&self) -> BracketResult<BallotKind> {
        match self._kind.as_deref() {
            None | Some("vote") => Ok(BallotKind::Vote),
            Some("guess") => Ok(BallotKind::Guess),
            Some(x) => whatever!("unknown ballot kind for {}: {}", self.file_path, x),
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct BracketRules {
    #[serde(rename = "duplicatePolicy")]
    pub duplicate_policy: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(rename = "outputPath")]
    pub output_path: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct BracketConfig {
    pub bracket: BracketSettings,
    #[serde(rename = "ballotSources", default)]
    pub ballot_sources: Vec<BallotSource>,
    pub rules: Option<BracketRules>,
    #[serde(rename = "outputSettings")]
    pub output_settings: Option<OutputSettings>,
}

impl BracketConfig {
    pub fn duplicate_policy(&self) -> BracketResult<DuplicatePolicy> {
        let policy = self
            .rules
            .as_ref()
            .and_then(|r| r.duplicate_policy.clone());
        match policy.as_deref() {
            None | Some("insertOnly") => Ok(DuplicatePolicy::InsertOnly),
            Some("upsert") => Ok(DuplicatePolicy::Upsert),
            Some(x) => whatever!("unknown duplicate policy: {}", x),
        }
    }
}

pub fn read_config(path: &str) -> BracketResult<BracketConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    serde_json::from_str(&contents).context(ParsingJsonSnafu {})
}

pub fn read_summary(path: String) -> BracketResult<JSValue> {
    let contents = fs::read_to_string(path.clone()).context(OpeningJsonSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(js)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> BracketConfig {
        serde_json::from_str(s).unwrap()
    }

    #[test]
    fn minimal_config() {
        let c = parse(r#"{"bracket": {"name": "x", "choices": ["a", "b"]}}"#);
        assert!(!c.bracket.is_open);
        assert_eq!(c.bracket.current_round, 0);
        assert!(c.bracket.start_time.is_none());
        assert!(c.ballot_sources.is_empty());
        assert_eq!(c.duplicate_policy().unwrap(), DuplicatePolicy::InsertOnly);
    }

    #[test]
    fn rules_and_kinds() {
        let c = parse(
            r#"{"bracket": {"name": "x", "choices": ["a", "b"], "startTime": "2023-03-01T00:00:00Z"},
                "ballotSources": [{"provider": "csv", "filePath": "g.csv", "kind": "guess"},
                                  {"provider": "csv", "filePath": "h.csv", "kind": "wish"}],
                "rules": {"duplicatePolicy": "upsert"}}"#,
        );
        assert_eq!(c.duplicate_policy().unwrap(), DuplicatePolicy::Upsert);
        assert_eq!(c.ballot_sources[0].kind().unwrap(), BallotKind::Guess);
        assert!(c.ballot_sources[1].kind().is_err());
        assert_eq!(
            c.bracket.start_time.map(|t| t.to_rfc3339()),
            Some("2023-03-01T00:00:00+00:00".to_string())
        );
    }

    #[test]
    fn unknown_policy() {
        let c = parse(
            r#"{"bracket": {"name": "x", "choices": ["a", "b"]}, "rules": {"duplicatePolicy": "merge"}}"#,
        );
        assert!(c.duplicate_policy().is_err());
    }
}
