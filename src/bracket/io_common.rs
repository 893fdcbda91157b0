use std::path::Path;

use crate::bracket::*;

pub fn simplify_file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string())
}

/// Builds the identifier of a ballot from the file it comes from and its position.
pub fn make_default_id(path: &str) -> impl Fn(usize) -> String {
    let simplified_file_name = simplify_file_name(path);
    move |lineno| format!("{}-{:08}", simplified_file_name, lineno)
}

/// The provider to use for a ballot file, based on its extension.
pub fn provider_for_path(path: &str) -> BracketResult<&'static str> {
    match Path::new(path).extension().and_then(|e| e.to_str()) {
        Some("json") => Ok("json"),
        Some("csv") => Ok("csv"),
        _ => whatever!("Cannot guess the provider of ballot file {:?}", path),
    }
}

/// Empty user names are anonymous ballots.
pub fn voter_name(s: Option<&str>) -> Option<String> {
    s.map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids() {
        let f = make_default_id("/tmp/x/votes.csv");
        assert_eq!(f(3), "votes.csv-00000003");
    }

    #[test]
    fn providers() {
        assert_eq!(provider_for_path("a/b.json").unwrap(), "json");
        assert_eq!(provider_for_path("b.csv").unwrap(), "csv");
        assert!(provider_for_path("b.xlsx").is_err());
    }

    #[test]
    fn voters() {
        assert_eq!(voter_name(Some(" bob ")), Some("bob".to_string()));
        assert_eq!(voter_name(Some("")), None);
        assert_eq!(voter_name(None), None);
    }
}
