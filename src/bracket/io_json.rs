// Reader for ballots stored as a JSON array.

use serde::Deserialize;

use crate::bracket::{
    io_common::{make_default_id, voter_name},
    *,
};

#[derive(Debug, Deserialize)]
struct JsonBallot {
    username: Option<String>,
    round: u32,
    question: u32,
    choice: String,
}

pub fn read_json(path: String) -> BracketResult<Vec<ParsedBallot>> {
    let contents = fs::read_to_string(path.clone()).context(OpeningJsonSnafu { path: path.clone() })?;
    parse_json(&contents, &path)
}

fn parse_json(contents: &str, path: &str) -> BracketResult<Vec<ParsedBallot>> {
    let default_id = make_default_id(path);
    let raw: Vec<JsonBallot> = serde_json::from_str(contents).context(ParsingJsonSnafu {})?;
    debug!("read_json: {} ballots in {:?}", raw.len(), path);
    let res = raw
        .into_iter()
        .enumerate()
        .map(|(idx, jb)| ParsedBallot {
            id: default_id(idx + 1),
            voter: voter_name(jb.username.as_deref()),
            round: jb.round,
            question: jb.question,
            choice: jb.choice,
        })
        .collect();
    Ok(res)
}
