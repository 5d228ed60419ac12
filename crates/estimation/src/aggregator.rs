//! Reduces historical campaign rows to baseline rates, overall and per objective.

use crate::snapshot::BaselineSnapshot;
use crate::trend::TrendTable;
use campaign_core::types::{BaselineRates, HistoricalRecord};
use campaign_core::{CampaignError, CampaignResult};
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, info};
use utoipa::ToSchema;

/// Summed funnel counts for a group of historical records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, ToSchema)]
pub struct ObjectiveTotals {
    pub total_spend: f64,
    pub total_impressions: f64,
    pub total_clicks: f64,
    pub total_results: f64,
    pub total_conversions: f64,
}

impl ObjectiveTotals {
    fn add(&mut self, record: &HistoricalRecord) {
        self.total_spend += record.spend;
        self.total_impressions += record.impressions;
        self.total_clicks += record.clicks;
        self.total_results += record.results;
        self.total_conversions += record.conversions_or_results();
    }

    /// Baseline rates implied by these totals. A zero denominator yields a zero rate.
    pub fn rates(&self) -> BaselineRates {
        BaselineRates {
            avg_cpm: ratio(self.total_spend, self.total_impressions) * 1000.0,
            avg_cpc: ratio(self.total_spend, self.total_clicks),
            avg_ctr: ratio(self.total_clicks, self.total_impressions) * 100.0,
            avg_cost_per_result: ratio(self.total_spend, self.total_results),
            avg_conversion_rate: ratio(self.total_conversions, self.total_clicks) * 100.0,
        }
    }
}

/// Totals and the rates derived from them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, ToSchema)]
pub struct ObjectiveMetrics {
    pub totals: ObjectiveTotals,
    pub rates: BaselineRates,
}

impl From<ObjectiveTotals> for ObjectiveMetrics {
    fn from(totals: ObjectiveTotals) -> Self {
        Self {
            rates: totals.rates(),
            totals,
        }
    }
}

pub(crate) fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

/// Stateless aggregation over a full record set.
pub struct Aggregator;

impl Aggregator {
    /// Aggregate `records` into a snapshot without trend data.
    ///
    /// Objectives are grouped by exact label and kept in order of first
    /// appearance. Rows with an empty label count toward the overall baseline only.
    pub fn aggregate(records: &[HistoricalRecord]) -> CampaignResult<BaselineSnapshot> {
        Self::aggregate_with_trends(records, TrendTable::default())
    }

    pub fn aggregate_with_trends(
        records: &[HistoricalRecord],
        trends: TrendTable,
    ) -> CampaignResult<BaselineSnapshot> {
        if records.is_empty() {
            return Err(CampaignError::DataUnavailable(
                "historical dataset contains no records".to_string(),
            ));
        }

        let mut overall = ObjectiveTotals::default();
        let mut groups: Vec<(String, ObjectiveTotals)> = Vec::new();
        let mut index: HashMap<&str, usize> = HashMap::new();

        for (row, record) in records.iter().enumerate() {
            validate(row, record)?;
            overall.add(record);

            if record.objective.is_empty() {
                continue;
            }
            let slot = match index.get(record.objective.as_str()) {
                Some(&slot) => slot,
                None => {
                    groups.push((record.objective.clone(), ObjectiveTotals::default()));
                    index.insert(record.objective.as_str(), groups.len() - 1);
                    groups.len() - 1
                }
            };
            groups[slot].1.add(record);
        }

        let objectives: Vec<(String, ObjectiveMetrics)> = groups
            .into_iter()
            .map(|(label, totals)| (label, ObjectiveMetrics::from(totals)))
            .collect();

        for (label, metrics) in &objectives {
            debug!(
                objective = %label,
                cpm = metrics.rates.avg_cpm,
                cpc = metrics.rates.avg_cpc,
                ctr = metrics.rates.avg_ctr,
                "Objective baseline computed"
            );
        }

        info!(
            records = records.len(),
            objectives = objectives.len(),
            total_spend = overall.total_spend,
            "Historical data aggregated"
        );

        Ok(BaselineSnapshot::new(
            ObjectiveMetrics::from(overall),
            objectives,
            trends,
            records.len(),
        ))
    }
}

fn validate(row: usize, record: &HistoricalRecord) -> CampaignResult<()> {
    let fields = [
        ("spend", record.spend),
        ("impressions", record.impressions),
        ("clicks", record.clicks),
        ("results", record.results),
        ("conversions", record.conversions_or_results()),
    ];
    for (name, value) in fields {
        if !value.is_finite() || value < 0.0 {
            return Err(CampaignError::DataUnavailable(format!(
                "record {row}: '{name}' must be a non-negative number, got {value}"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_records() -> Vec<HistoricalRecord> {
        vec![
            HistoricalRecord::new("leads", 100.0, 10_000.0, 200.0, 20.0),
            HistoricalRecord::new("engagement", 60.0, 20_000.0, 300.0, 600.0),
            HistoricalRecord::new("leads", 50.0, 5_000.0, 100.0, 10.0),
        ]
    }

    #[test]
    fn test_single_objective_baseline() {
        let records = vec![HistoricalRecord::new("leads", 100.0, 10_000.0, 200.0, 20.0)];
        let snapshot = Aggregator::aggregate(&records).unwrap();
        let leads = snapshot.objective("leads").unwrap().rates;

        assert!((leads.avg_cpm - 10.0).abs() < 1e-9);
        assert!((leads.avg_cpc - 0.5).abs() < 1e-9);
        assert!((leads.avg_ctr - 2.0).abs() < 1e-9);
        assert!((leads.avg_cost_per_result - 5.0).abs() < 1e-9);
        assert!((leads.avg_conversion_rate - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_overall_and_grouped_totals() {
        let snapshot = Aggregator::aggregate(&sample_records()).unwrap();

        let overall = snapshot.overall();
        assert!((overall.totals.total_spend - 210.0).abs() < 1e-9);
        assert!((overall.totals.total_impressions - 35_000.0).abs() < 1e-9);
        assert!((overall.rates.avg_cpm - 6.0).abs() < 1e-9);
        assert!((overall.rates.avg_cpc - 0.35).abs() < 1e-9);

        let leads = snapshot.objective("leads").unwrap();
        assert!((leads.totals.total_spend - 150.0).abs() < 1e-9);
        assert!((leads.totals.total_results - 30.0).abs() < 1e-9);
        assert!((leads.rates.avg_cost_per_result - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_objectives_in_discovery_order() {
        let snapshot = Aggregator::aggregate(&sample_records()).unwrap();
        assert_eq!(snapshot.objective_names(), vec!["leads", "engagement"]);
    }

    #[test]
    fn test_labels_are_exact() {
        let records = vec![
            HistoricalRecord::new("Leads", 10.0, 1_000.0, 10.0, 1.0),
            HistoricalRecord::new("leads", 10.0, 1_000.0, 10.0, 1.0),
            HistoricalRecord::new("leads ", 10.0, 1_000.0, 10.0, 1.0),
        ];
        let snapshot = Aggregator::aggregate(&records).unwrap();
        assert_eq!(snapshot.objective_names(), vec!["Leads", "leads", "leads "]);
    }

    #[test]
    fn test_zero_denominators_yield_zero_rates() {
        let records = vec![
            HistoricalRecord::new("awareness", 25.0, 0.0, 0.0, 0.0),
            HistoricalRecord::new("awareness", 15.0, 0.0, 0.0, 0.0),
        ];
        let snapshot = Aggregator::aggregate(&records).unwrap();

        assert_eq!(snapshot.overall().rates, BaselineRates::default());
        assert_eq!(snapshot.objective("awareness").unwrap().rates, BaselineRates::default());
    }

    #[test]
    fn test_unlabelled_rows_count_toward_overall_only() {
        let records = vec![
            HistoricalRecord::new("leads", 10.0, 1_000.0, 10.0, 1.0),
            HistoricalRecord::new("", 30.0, 1_000.0, 10.0, 1.0),
        ];
        let snapshot = Aggregator::aggregate(&records).unwrap();
        assert_eq!(snapshot.objective_names(), vec!["leads"]);
        assert!((snapshot.overall().totals.total_spend - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_separate_conversions_column() {
        let mut record = HistoricalRecord::new("sales", 100.0, 10_000.0, 400.0, 50.0);
        record.conversions = Some(8.0);
        let snapshot = Aggregator::aggregate(&[record]).unwrap();
        let rates = snapshot.objective("sales").unwrap().rates;
        assert!((rates.avg_conversion_rate - 2.0).abs() < 1e-9);
        assert!((rates.avg_cost_per_result - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_dataset_is_unavailable() {
        let err = Aggregator::aggregate(&[]).unwrap_err();
        assert!(matches!(err, CampaignError::DataUnavailable(_)));
    }

    #[test]
    fn test_negative_values_are_rejected() {
        let records = vec![HistoricalRecord::new("leads", -1.0, 10.0, 1.0, 1.0)];
        let err = Aggregator::aggregate(&records).unwrap_err();
        assert!(matches!(err, CampaignError::DataUnavailable(_)));
    }

    #[test]
    fn test_aggregation_is_deterministic() {
        let records = sample_records();
        let first = Aggregator::aggregate(&records).unwrap();
        let second = Aggregator::aggregate(&records).unwrap();

        assert_eq!(first.objective_names(), second.objective_names());
        assert_eq!(first.overall().rates.avg_cpm.to_bits(), second.overall().rates.avg_cpm.to_bits());
        for name in first.objective_names() {
            let a = first.objective(&name).unwrap();
            let b = second.objective(&name).unwrap();
            assert_eq!(a, b);
            assert_eq!(a.rates.avg_ctr.to_bits(), b.rates.avg_ctr.to_bits());
        }
    }
}
