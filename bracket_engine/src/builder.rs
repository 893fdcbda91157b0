pub use crate::config::*;
use crate::{BracketDefinition, BracketView};

/// A builder for collecting ballots before resolving a bracket.
///
/// Ballots may come from several places (already stored, or still buffered for
/// a voter) and are all resolved together.
///
/// ```
/// pub use bracket_engine::builder::Builder;
/// # use bracket_engine::BracketErrors;
///
/// let mut builder = Builder::new(
///     "Fruits",
///     &["Apple".to_string(), "Banana".to_string()],
/// )?;
///
/// builder.add_ballot(1, 1, "Banana");
/// let view = builder.build()?;
/// assert_eq!(view.champion().map(|c| c.name.as_str()), Some("Banana"));
///
/// # Ok::<(), BracketErrors>(())
/// ```
pub struct Builder {
    pub(crate) _definition: BracketDefinition,
    pub(crate) _ballots: Vec<Ballot>,
}

impl Builder {
    /// Fails if the entries cannot make a bracket.
    pub fn new(name: &str, entries: &[String]) -> Result<Builder, BracketErrors> {
        Ok(Builder {
            _definition: BracketDefinition::new(name, entries)?,
            _ballots: Vec::new(),
        })
    }

    pub fn from_definition(definition: &BracketDefinition) -> Builder {
        Builder {
            _definition: definition.clone(),
            _ballots: Vec::new(),
        }
    }

    /// Adds a single ballot.
    ///
    /// No check is done here: ballots that do not match a candidate of their
    /// question are ignored during resolution.
    pub fn add_ballot(&mut self, round: u32, question: u32, choice: &str) {
        self._ballots.push(Ballot::new(round, question, choice));
    }

    pub fn add_ballots(&mut self, ballots: &[Ballot]) {
        self._ballots.extend_from_slice(ballots);
    }

    pub fn ballots(&self) -> &[Ballot] {
        &self._ballots
    }

    pub fn build(&self) -> Result<BracketView, BracketErrors> {
        BracketView::new(&self._definition, &self._ballots)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_rejects_bad_brackets() {
        let entries: Vec<String> = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        assert!(Builder::new("three", &entries).is_err());
    }

    #[test]
    fn builder_merges_sources() {
        let entries: Vec<String> = ["A", "B", "C", "D"].iter().map(|s| s.to_string()).collect();
        let mut builder = Builder::new("abcd", &entries).unwrap();
        // Stored ballots, then ballots still buffered for the current voter.
        builder.add_ballots(&[Ballot::new(1, 1, "B"), Ballot::new(1, 2, "C")]);
        builder.add_ballot(2, 1, "C");
        assert_eq!(builder.ballots().len(), 3);
        let view = builder.build().unwrap();
        assert_eq!(view.champion().map(|c| c.name.clone()), Some("C".to_string()));
        assert_eq!(view.name(), "abcd");
    }

    #[test]
    fn builder_from_definition() {
        let entries: Vec<String> = ["A", "B"].iter().map(|s| s.to_string()).collect();
        let def = BracketDefinition::new("ab", &entries).unwrap();
        let mut builder = Builder::from_definition(&def);
        assert!(builder.ballots().is_empty());
        builder.add_ballot(1, 1, "A");
        let view = builder.build().unwrap();
        assert_eq!(view.definition(), &def);
        assert_eq!(view.champion().map(|c| c.name.clone()), Some("A".to_string()));
    }
}
