//! Source ingestion: raw delimited text in, header + body rows out.
//!
//! All documented limits are enforced here, before the edit engine is
//! touched, so a rejected upload never mutates core state.

use crate::error::EditError;

/// Hard cap on the uploaded file, in bytes (5 MB).
pub const MAX_FILE_BYTES: usize = 5_242_880;

/// Hard cap on the first row's field count.
pub const MAX_COLUMNS: usize = 15;

/// Hard cap on data rows (rows after the header).
pub const MAX_ROWS: usize = 5000;

/// Parsed upload: the first row as column headers, the rest as body rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Parse delimited text into a dataset, enforcing the ingestion limits.
///
/// Empty lines are skipped, matching the upload path of the browser UI.
/// Quoted fields may contain commas and doubled quotes; embedded newlines
/// are not supported (the input is split line-first).
pub fn parse_csv(text: &str) -> Result<Dataset, EditError> {
    if text.len() > MAX_FILE_BYTES {
        return Err(EditError::FileTooLarge {
            size: text.len(),
            max: MAX_FILE_BYTES,
        });
    }

    let mut rows: Vec<Vec<String>> = Vec::new();
    for line in text.lines() {
        if line.trim().is_empty() {
            continue;
        }
        rows.push(parse_csv_row(line));
    }

    if rows.is_empty() {
        return Err(EditError::EmptyInput);
    }
    if rows[0].len() > MAX_COLUMNS {
        return Err(EditError::TooManyColumns {
            count: rows[0].len(),
            max: MAX_COLUMNS,
        });
    }
    if rows.len() - 1 > MAX_ROWS {
        return Err(EditError::TooManyRows {
            count: rows.len() - 1,
            max: MAX_ROWS,
        });
    }

    let header = rows.remove(0);
    Ok(Dataset { header, rows })
}

// Quote-aware single-line field splitter. A doubled quote inside a quoted
// field is an escaped literal quote.
fn parse_csv_row(line: &str) -> Vec<String> {
    let mut result = Vec::new();
    let mut current_field = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' => {
                if in_quotes && chars.peek() == Some(&'"') {
                    current_field.push('"');
                    chars.next();
                } else {
                    in_quotes = !in_quotes;
                }
            }
            ',' if !in_quotes => {
                result.push(std::mem::take(&mut current_field));
            }
            _ => {
                current_field.push(c);
            }
        }
    }

    result.push(current_field);
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_and_rows_split() {
        let ds = parse_csv("A,B,C\n1,2,3\n4,5,6\n").unwrap();
        assert_eq!(ds.header, ["A", "B", "C"]);
        assert_eq!(ds.rows.len(), 2);
        assert_eq!(ds.rows[1], ["4", "5", "6"]);
    }

    #[test]
    fn quoted_fields_with_commas_and_escaped_quotes() {
        let ds = parse_csv("name,note\n\"Smith, Jane\",\"said \"\"hi\"\"\"\n").unwrap();
        assert_eq!(ds.rows[0], ["Smith, Jane", r#"said "hi""#]);
    }

    #[test]
    fn empty_lines_are_skipped() {
        let ds = parse_csv("A\n\n1\n\n\n2\n").unwrap();
        assert_eq!(ds.rows, [["1"], ["2"]]);
    }

    #[test]
    fn empty_input_rejected() {
        assert_eq!(parse_csv(""), Err(EditError::EmptyInput));
        assert_eq!(parse_csv("\n  \n"), Err(EditError::EmptyInput));
    }

    #[test]
    fn too_many_columns_rejected() {
        let header: Vec<String> = (0..16).map(|i| format!("c{i}")).collect();
        let text = header.join(",");
        assert!(matches!(
            parse_csv(&text),
            Err(EditError::TooManyColumns { count: 16, .. })
        ));
    }

    #[test]
    fn too_many_rows_rejected() {
        let mut text = String::from("A\n");
        for i in 0..5001 {
            text.push_str(&format!("{i}\n"));
        }
        assert!(matches!(
            parse_csv(&text),
            Err(EditError::TooManyRows { count: 5001, .. })
        ));
    }

    #[test]
    fn exactly_at_limits_is_accepted() {
        let header: Vec<String> = (0..15).map(|i| format!("c{i}")).collect();
        let mut text = header.join(",");
        text.push('\n');
        for _ in 0..5000 {
            text.push_str(&vec!["x"; 15].join(","));
            text.push('\n');
        }
        let ds = parse_csv(&text).unwrap();
        assert_eq!(ds.header.len(), 15);
        assert_eq!(ds.rows.len(), 5000);
    }

    #[test]
    fn oversized_file_rejected() {
        let text = "x".repeat(MAX_FILE_BYTES + 1);
        assert!(matches!(
            parse_csv(&text),
            Err(EditError::FileTooLarge { .. })
        ));
    }
}
