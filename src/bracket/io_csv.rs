// Primitives for reading CSV files.

use crate::bracket::{
    io_common::{make_default_id, voter_name},
    *,
};

pub fn read_csv_ballots(path: String) -> BracketResult<Vec<ParsedBallot>> {
    let rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(&path)
        .context(CsvOpenSnafu { path: path.clone() })?;
    read_records(rdr, &path)
}

fn column(headers: &csv::StringRecord, name: &str) -> Option<usize> {
    headers.iter().position(|h| h.eq_ignore_ascii_case(name))
}

fn read_records<R: std::io::Read>(
    mut rdr: csv::Reader<R>,
    path: &str,
) -> BracketResult<Vec<ParsedBallot>> {
    let default_id = make_default_id(path);
    let headers = rdr
        .headers()
        .context(CsvLineParseSnafu { lineno: 1usize })?
        .clone();
    let user_idx = column(&headers, "username");
    let round_idx = column(&headers, "round").context(CsvMissingColumnSnafu {
        column: "round",
        path,
    })?;
    let question_idx = column(&headers, "question").context(CsvMissingColumnSnafu {
        column: "question",
        path,
    })?;
    let choice_idx = column(&headers, "choice").context(CsvMissingColumnSnafu {
        column: "choice",
        path,
    })?;

    let mut res: Vec<ParsedBallot> = Vec::new();
    for (idx, line_r) in rdr.records().enumerate() {
        // The header is line 1.
        let lineno = idx + 2;
        let line = line_r.context(CsvLineParseSnafu { lineno })?;
        debug!("read_csv_ballots: lineno: {:?} row: {:?}", lineno, line);
        let round = parse_number(&line, round_idx, "round", lineno)?;
        let question = parse_number(&line, question_idx, "question", lineno)?;
        let choice = line.get(choice_idx).context(InvalidFieldSnafu {
            lineno,
            field: "choice",
            value: "",
        })?;
        res.push(ParsedBallot {
            id: default_id(lineno),
            voter: voter_name(user_idx.and_then(|i| line.get(i))),
            round,
            question,
            choice: choice.to_string(),
        });
    }
    Ok(res)
}

fn parse_number(
    line: &csv::StringRecord,
    idx: usize,
    field: &str,
    lineno: usize,
) -> BracketResult<u32> {
    let s = line.get(idx).unwrap_or("");
    s.parse::<u32>().ok().context(InvalidFieldSnafu {
        lineno,
        field,
        value: s,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read(contents: &str) -> BracketResult<Vec<ParsedBallot>> {
        let rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(contents.as_bytes());
        read_records(rdr, "votes.csv")
    }

    #[test]
    fn reads_ballots() {
        let res = read("username,round,question,choice\nbob,1,1,A\n,1,2,C\n").unwrap();
        assert_eq!(res.len(), 2);
        assert_eq!(res[0].voter, Some("bob".to_string()));
        assert_eq!(res[0].id, "votes.csv-00000002");
        assert_eq!(res[1].voter, None);
        assert_eq!(res[1].to_ballot(), Ballot::new(1, 2, "C"));
    }

    #[test]
    fn username_is_optional() {
        let res = read("round,question,choice\n1,1,A\n").unwrap();
        assert_eq!(res[0].voter, None);
    }

    #[test]
    fn bad_number() {
        let res = read("round,question,choice\n1,x,A\n");
        assert!(matches!(
            res,
            Err(BracketError::InvalidField { lineno: 2, .. })
        ));
    }

    #[test]
    fn missing_column() {
        let res = read("round,choice\n1,A\n");
        assert!(matches!(res, Err(BracketError::CsvMissingColumn { .. })));
    }
}
