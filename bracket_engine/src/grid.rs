//! Layout of a resolved bracket in a grid, for display.
//!
//! The first round takes every other row. Each following round sits at the
//! vertical midpoint of the pair of rows that produced it:
//!
//! ```text
//! A
//!     A
//! B
//!         D
//! C
//!     D
//! D
//! ```

use log::debug;

use crate::{placeholder_round, Choice, Round};

/// A cell of the grid: empty, or the contestant at this position.
pub type Cell = Option<Choice>;

/// Places the choices of every round in a grid with `2 * (entries in round 1)` rows
/// and `total_rounds` columns. Rounds that are missing are shown with placeholders.
pub fn to_table(rounds: &[Round], total_rounds: u32) -> Vec<Vec<Cell>> {
    let first_round_size = rounds.first().map(|r| r.choices().len()).unwrap_or(0);
    let mut data: Vec<Vec<Cell>> = vec![vec![None; total_rounds as usize]; first_round_size * 2];

    let mut spaces = 2; // spaces between items in the first round
    let mut offset = 0; // vertical offset
    for round_number in 1..=total_rounds {
        let this_round: Round = match rounds.get((round_number - 1) as usize) {
            Some(r) => r.clone(),
            None => match placeholder_round(first_round_size, round_number) {
                Ok(r) => r,
                // Only happens when there is nothing to lay out.
                Err(_) => break,
            },
        };
        for (i, c) in this_round.choices().iter().enumerate() {
            let row_number = i * spaces + offset;
            if let Some(cell) = data
                .get_mut(row_number)
                .and_then(|row| row.get_mut((round_number - 1) as usize))
            {
                *cell = Some(c.clone());
            }
        }
        spaces *= 2;
        offset = offset * 2 + 1;
    }
    debug!(
        "to_table: {} rows, {} columns",
        data.len(),
        total_rounds
    );
    data
}

pub fn header(total_rounds: u32) -> Vec<String> {
    (1..=total_rounds).map(|i| format!("Round {}", i)).collect()
}

/// The length of the longest entry name, in characters.
pub fn longest_name(entries: &[String]) -> usize {
    entries.iter().map(|e| e.chars().count()).max().unwrap_or(0)
}

/// The width of one column when printing the grid as text.
pub fn column_width(longest_name: usize) -> usize {
    longest_name + 4
}

/// Renders the header and the grid as left-justified text columns.
pub fn render_text(data: &[Vec<Cell>], header: &[String], col_width: usize) -> String {
    let mut lines: Vec<String> = Vec::with_capacity(data.len() + 1);
    lines.push(render_line(header.iter().map(|h| h.as_str()), col_width));
    for row in data.iter() {
        let cells = row
            .iter()
            .map(|c| c.as_ref().map(|c| c.name.as_str()).unwrap_or(""));
        lines.push(render_line(cells, col_width));
    }
    let mut res = lines.join("\n");
    res.push('\n');
    res
}

fn render_line<'a>(cells: impl Iterator<Item = &'a str>, col_width: usize) -> String {
    let line: String = cells
        .map(|s| format!("{:<width$}", s, width = col_width))
        .collect();
    line.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{resolve, Ballot, PLACEHOLDER};

    fn entries(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("e{}", i)).collect()
    }

    fn names_at(data: &[Vec<Cell>], col: usize) -> Vec<(usize, String)> {
        data.iter()
            .enumerate()
            .filter_map(|(row, cells)| cells[col].as_ref().map(|c| (row, c.name.clone())))
            .collect()
    }

    #[test]
    fn grid_dimensions() {
        for k in 1..6u32 {
            let es = entries(1 << k);
            let rounds = resolve(&es, k + 1, &[]).unwrap();
            let data = to_table(&rounds, k + 1);
            assert_eq!(data.len(), 2 * es.len());
            assert!(data.iter().all(|row| row.len() == (k + 1) as usize));
            assert_eq!(header(k + 1).len(), (k + 1) as usize);
        }
    }

    #[test]
    fn bracket_spacing() {
        let es: Vec<String> = ["A", "B", "C", "D"].iter().map(|s| s.to_string()).collect();
        let ballots = vec![
            Ballot::new(1, 1, "A"),
            Ballot::new(1, 2, "D"),
            Ballot::new(2, 1, "D"),
        ];
        let rounds = resolve(&es, 3, &ballots).unwrap();
        let data = to_table(&rounds, 3);
        assert_eq!(data.len(), 8);
        assert_eq!(
            names_at(&data, 0),
            vec![
                (0, "A".to_string()),
                (2, "B".to_string()),
                (4, "C".to_string()),
                (6, "D".to_string())
            ]
        );
        assert_eq!(
            names_at(&data, 1),
            vec![(1, "A".to_string()), (5, "D".to_string())]
        );
        assert_eq!(names_at(&data, 2), vec![(3, "D".to_string())]);
        // Row 7 is never written.
        assert!(data[7].iter().all(|c| c.is_none()));
    }

    #[test]
    fn missing_rounds_are_placeholders() {
        let es = entries(4);
        let rounds = resolve(&es, 3, &[]).unwrap();
        let data = to_table(&rounds[..1], 3);
        assert_eq!(
            names_at(&data, 1),
            vec![(1, PLACEHOLDER.to_string()), (5, PLACEHOLDER.to_string())]
        );
        assert!(to_table(&[], 3).is_empty());
    }

    #[test]
    fn header_labels() {
        assert_eq!(header(3), vec!["Round 1", "Round 2", "Round 3"]);
    }

    #[test]
    fn longest_name_counts_characters() {
        let es: Vec<String> = vec!["abc".to_string(), "héllo".to_string()];
        assert_eq!(longest_name(&es), 5);
        assert_eq!(column_width(5), 9);
        assert_eq!(longest_name(&[]), 0);
    }

    #[test]
    fn text_rendering() {
        let es: Vec<String> = vec!["A".to_string(), "B".to_string()];
        let rounds = resolve(&es, 2, &[Ballot::new(1, 1, "B")]).unwrap();
        let data = to_table(&rounds, 2);
        let txt = render_text(&data, &header(2), 9);
        assert_eq!(txt, "Round 1  Round 2\nA\n         B\nB\n\n");
    }
}
