//! Spreadsheet exports (xlsx, xls, xlsb, ods).

use crate::table::{Cell, Table};
use calamine::{open_workbook_auto, Data, Reader};
use campaign_core::{CampaignError, CampaignResult};
use std::path::Path;
use tracing::debug;

/// Read one worksheet; the first row is the header. Uses the first sheet when
/// `sheet` is `None`.
pub fn read_workbook(path: &Path, sheet: Option<&str>) -> CampaignResult<Table> {
    let mut workbook = open_workbook_auto(path).map_err(|e| {
        CampaignError::DataUnavailable(format!("cannot open workbook '{}': {e}", path.display()))
    })?;

    let sheet_name = match sheet {
        Some(name) => name.to_string(),
        None => workbook.sheet_names().first().cloned().ok_or_else(|| {
            CampaignError::DataUnavailable(format!("workbook '{}' has no sheets", path.display()))
        })?,
    };
    debug!(path = %path.display(), sheet = %sheet_name, "Reading worksheet");

    let range = workbook.worksheet_range(&sheet_name).map_err(|e| {
        CampaignError::DataUnavailable(format!("cannot read sheet '{sheet_name}': {e}"))
    })?;

    let mut rows = range.rows();
    let headers = rows
        .next()
        .ok_or_else(|| CampaignError::DataUnavailable(format!("sheet '{sheet_name}' is empty")))?
        .iter()
        .map(|cell| match cell {
            Data::Empty => String::new(),
            other => other.to_string(),
        })
        .collect();

    let rows = rows.map(|row| row.iter().map(to_cell).collect()).collect();
    Ok(Table { headers, rows })
}

fn to_cell(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::Float(f) => Cell::Number(*f),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::String(s) => Cell::Text(s.clone()),
        other => Cell::Text(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_workbook_is_unavailable() {
        let err = read_workbook(Path::new("/nonexistent/data.xlsx"), None).unwrap_err();
        assert!(matches!(err, CampaignError::DataUnavailable(ref m) if m.contains("data.xlsx")));
    }

    #[test]
    fn test_cell_conversion() {
        assert_eq!(to_cell(&Data::Int(12)), Cell::Number(12.0));
        assert_eq!(to_cell(&Data::Float(0.5)), Cell::Number(0.5));
        assert_eq!(to_cell(&Data::String("leads".to_string())), Cell::Text("leads".to_string()));
        assert_eq!(to_cell(&Data::Empty), Cell::Empty);
    }
}
