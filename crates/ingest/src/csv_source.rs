//! CSV exports.

use crate::table::{Cell, Table};
use campaign_core::{CampaignError, CampaignResult};
use std::io::Read;

/// Read a CSV export with a header row. Every non-empty cell is kept as text;
/// numeric parsing happens when rows become records.
pub fn read_csv<R: Read>(reader: R) -> CampaignResult<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| CampaignError::DataUnavailable(format!("cannot read CSV header: {e}")))?
        .iter()
        .map(str::to_string)
        .collect();

    if headers.iter().all(|h| h.is_empty()) {
        return Err(CampaignError::DataUnavailable("CSV header row is empty".to_string()));
    }

    let mut rows = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let record = record.map_err(|e| {
            CampaignError::DataUnavailable(format!("CSV parse error at row {}: {e}", i + 2))
        })?;
        rows.push(
            record
                .iter()
                .map(|field| {
                    if field.is_empty() {
                        Cell::Empty
                    } else {
                        Cell::Text(field.to_string())
                    }
                })
                .collect(),
        );
    }

    Ok(Table { headers, rows })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_quoted_fields_and_short_rows() {
        let data = "\
Indicateur de résultats,Impressions,\"Clics (tous)\",Montant dépensé (EUR),Résultats
\"leads, form\",10000,200,100.5,20
engagement,500
";
        let table = read_csv(data.as_bytes()).unwrap();
        assert_eq!(table.headers.len(), 5);
        assert_eq!(table.headers[2], "Clics (tous)");
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0][0], Cell::Text("leads, form".to_string()));
        assert_eq!(table.rows[1].len(), 2);
    }

    #[test]
    fn test_empty_input_is_unavailable() {
        assert!(matches!(read_csv("".as_bytes()), Err(CampaignError::DataUnavailable(_))));
    }
}
