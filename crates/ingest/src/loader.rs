//! Dataset loading entry points.

use crate::columns::ColumnMap;
use crate::csv_source::read_csv;
use crate::table::Table;
use crate::workbook::read_workbook;
use campaign_core::config::{AppConfig, DatasetConfig};
use campaign_core::types::HistoricalRecord;
use campaign_core::{CampaignError, CampaignResult};
use campaign_estimation::{Aggregator, BaselineSnapshot, TrendTable};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Instant;
use tracing::info;

/// Load every historical record from the configured export.
pub fn load_records(config: &DatasetConfig) -> CampaignResult<Vec<HistoricalRecord>> {
    let path = Path::new(&config.path);
    let table = read_table(path, config.sheet.as_deref())?;
    let columns = ColumnMap::resolve(&table.headers, &config.columns)?;
    let records = table.to_records(&columns)?;

    info!(
        path = %path.display(),
        rows = records.len(),
        columns = table.headers.len(),
        "Historical dataset loaded"
    );
    Ok(records)
}

fn read_table(path: &Path, sheet: Option<&str>) -> CampaignResult<Table> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match extension.as_str() {
        "csv" => {
            let file = File::open(path).map_err(|e| {
                CampaignError::DataUnavailable(format!("cannot open '{}': {e}", path.display()))
            })?;
            read_csv(BufReader::new(file))
        }
        "xlsx" | "xlsm" | "xls" | "xlsb" | "ods" => read_workbook(path, sheet),
        other => Err(CampaignError::DataUnavailable(format!(
            "unsupported dataset format '{other}' for '{}'",
            path.display()
        ))),
    }
}

/// Load the dataset, aggregate it, and attach trend coefficients when configured.
pub fn build_snapshot(config: &AppConfig) -> CampaignResult<BaselineSnapshot> {
    let started = Instant::now();
    let records = load_records(&config.dataset)?;

    let trends = match &config.forecast.trends_path {
        Some(path) => TrendTable::from_path(Path::new(path))?,
        None => TrendTable::default(),
    };

    let trended = !trends.is_empty();
    let snapshot = Aggregator::aggregate_with_trends(&records, trends)?;
    info!(
        objectives = snapshot.objective_names().len(),
        trended,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Baseline snapshot built"
    );
    Ok(snapshot)
}
