use campaign_core::types::HistoricalRecord;
use campaign_core::{CampaignError, CampaignResult};

use crate::columns::ColumnMap;

/// A single cell as read from the source file.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Number(f64),
    Text(String),
}

impl Cell {
    fn as_label(&self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Number(n) => n.to_string(),
            Self::Text(s) => s.clone(),
        }
    }
}

/// Header row plus data rows, independent of the file format.
#[derive(Debug, Clone, Default)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    /// Convert every data row into a record using the resolved columns.
    pub fn to_records(&self, columns: &ColumnMap) -> CampaignResult<Vec<HistoricalRecord>> {
        self.rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                // Row numbers are 1-based and count the header line.
                let line = i + 2;
                let number = |index: usize| numeric_cell(row.get(index), line, &self.headers[index]);
                Ok(HistoricalRecord {
                    objective: row.get(columns.objective).map(Cell::as_label).unwrap_or_default(),
                    spend: number(columns.spend)?,
                    impressions: number(columns.impressions)?,
                    clicks: number(columns.clicks)?,
                    results: number(columns.results)?,
                    conversions: columns.conversions.map(number).transpose()?,
                })
            })
            .collect()
    }
}

fn numeric_cell(cell: Option<&Cell>, line: usize, header: &str) -> CampaignResult<f64> {
    match cell {
        None | Some(Cell::Empty) => Ok(0.0),
        Some(Cell::Number(n)) => Ok(*n),
        Some(Cell::Text(s)) if s.trim().is_empty() => Ok(0.0),
        Some(Cell::Text(s)) => s.trim().parse::<f64>().map_err(|_| {
            CampaignError::DataUnavailable(format!(
                "row {line}, column '{header}': '{s}' is not a number"
            ))
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use campaign_core::config::ColumnHints;

    fn table() -> Table {
        Table {
            headers: vec![
                "Indicateur de résultats".to_string(),
                "Montant dépensé (EUR)".to_string(),
                "Impressions".to_string(),
                "Clics (tous)".to_string(),
                "Résultats".to_string(),
            ],
            rows: vec![
                vec![
                    Cell::Text("leads".to_string()),
                    Cell::Number(100.0),
                    Cell::Text(" 10000 ".to_string()),
                    Cell::Number(200.0),
                    Cell::Empty,
                ],
                vec![Cell::Text("reach".to_string()), Cell::Number(5.5)],
            ],
        }
    }

    #[test]
    fn test_rows_become_records() {
        let table = table();
        let columns = ColumnMap::resolve(&table.headers, &ColumnHints::default()).unwrap();
        let records = table.to_records(&columns).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0], HistoricalRecord::new("leads", 100.0, 10_000.0, 200.0, 0.0));
        // Short rows read missing cells as zero.
        assert_eq!(records[1], HistoricalRecord::new("reach", 5.5, 0.0, 0.0, 0.0));
    }

    #[test]
    fn test_non_numeric_cell_names_row_and_column() {
        let mut table = table();
        table.rows[1] = vec![Cell::Text("reach".to_string()), Cell::Text("n/a".to_string())];
        let columns = ColumnMap::resolve(&table.headers, &ColumnHints::default()).unwrap();

        match table.to_records(&columns) {
            Err(CampaignError::DataUnavailable(msg)) => {
                assert!(msg.contains("row 3"), "{msg}");
                assert!(msg.contains("Montant dépensé"), "{msg}");
            }
            other => panic!("expected DataUnavailable, got {other:?}"),
        }
    }
}
