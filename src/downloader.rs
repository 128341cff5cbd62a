//! Export: current columns + grid out to delimited text or a binary
//! spreadsheet document. Both are pure functions of core state.

use crate::column::Columns;
use crate::grid::Grid;

/// Render the sheet as CSV: one header row of column names, then the data
/// rows. Fields containing commas, quotes or newlines are quoted, with
/// embedded quotes doubled.
pub fn to_csv(columns: &Columns, grid: &Grid) -> String {
    let mut csv_content = String::new();

    for (i, column) in columns.iter().enumerate() {
        if i > 0 {
            csv_content.push(',');
        }
        push_escaped(&mut csv_content, &column.name);
    }
    csv_content.push('\n');

    for row in grid.rows() {
        for (i, value) in row.iter().enumerate() {
            if i > 0 {
                csv_content.push(',');
            }
            push_escaped(&mut csv_content, value);
        }
        csv_content.push('\n');
    }

    csv_content
}

fn push_escaped(out: &mut String, value: &str) {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        out.push('"');
        out.push_str(&value.replace('"', "\"\""));
        out.push('"');
    } else {
        out.push_str(value);
    }
}

/// Render the sheet as a binary spreadsheet document (XLSX), header row
/// first. Writer failures surface as external failures; core state is
/// untouched either way.
#[cfg(feature = "web")]
pub fn to_document(columns: &Columns, grid: &Grid) -> Result<Vec<u8>, crate::error::EditError> {
    use crate::error::EditError;
    use rust_xlsxwriter::{Workbook, Worksheet};

    let mut workbook = Workbook::new();
    let mut worksheet = Worksheet::new();

    for (c, column) in columns.iter().enumerate() {
        worksheet
            .write_string(0, c as u16, column.name.as_str())
            .map_err(|e| EditError::External(e.to_string()))?;
    }

    for (r, row) in grid.rows().enumerate() {
        for (c, value) in row.iter().enumerate() {
            worksheet
                .write_string((r + 1) as u32, c as u16, value.as_str())
                .map_err(|e| EditError::External(e.to_string()))?;
        }
    }

    workbook.push_worksheet(worksheet);
    workbook
        .save_to_buffer()
        .map_err(|e| EditError::External(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader;

    fn sheet() -> (Columns, Grid) {
        let columns = Columns::from_names(["name", "note"]);
        let grid = Grid::from_rows(
            vec![
                vec!["Smith, Jane".into(), "said \"hi\"".into()],
                vec!["plain".into(), String::new()],
            ],
            2,
        );
        (columns, grid)
    }

    #[test]
    fn escapes_commas_and_quotes() {
        let (columns, grid) = sheet();
        let csv = to_csv(&columns, &grid);
        assert_eq!(
            csv,
            "name,note\n\"Smith, Jane\",\"said \"\"hi\"\"\"\nplain,\n"
        );
    }

    #[test]
    fn csv_round_trips_through_the_loader() {
        let (columns, grid) = sheet();
        let csv = to_csv(&columns, &grid);
        let ds = loader::parse_csv(&csv).unwrap();
        assert_eq!(ds.header, columns.names());
        let reparsed = Grid::from_rows(ds.rows, columns.len());
        assert_eq!(reparsed, grid);
    }

    #[cfg(feature = "web")]
    #[test]
    fn document_export_produces_a_workbook() {
        let (columns, grid) = sheet();
        let bytes = to_document(&columns, &grid).unwrap();
        // XLSX is a zip container; check the magic.
        assert_eq!(&bytes[..2], b"PK");
    }
}
