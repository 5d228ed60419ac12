//! Immutable aggregation output and its atomic publication point.

use crate::aggregator::ObjectiveMetrics;
use crate::trend::TrendTable;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;
use utoipa::ToSchema;

/// Baselines computed from one aggregation run. Never mutated after construction.
#[derive(Debug, Clone)]
pub struct BaselineSnapshot {
    overall: ObjectiveMetrics,
    /// Objective label -> metrics, in order of first appearance in the dataset.
    objectives: Vec<(String, ObjectiveMetrics)>,
    index: HashMap<String, usize>,
    trends: TrendTable,
    record_count: usize,
    generated_at: DateTime<Utc>,
}

impl BaselineSnapshot {
    pub(crate) fn new(
        overall: ObjectiveMetrics,
        objectives: Vec<(String, ObjectiveMetrics)>,
        trends: TrendTable,
        record_count: usize,
    ) -> Self {
        let index = objectives
            .iter()
            .enumerate()
            .map(|(i, (label, _))| (label.clone(), i))
            .collect();
        Self {
            overall,
            objectives,
            index,
            trends,
            record_count,
            generated_at: Utc::now(),
        }
    }

    pub fn overall(&self) -> &ObjectiveMetrics {
        &self.overall
    }

    /// Metrics for an exact objective label.
    pub fn objective(&self, label: &str) -> Option<&ObjectiveMetrics> {
        self.index.get(label).map(|&i| &self.objectives[i].1)
    }

    pub fn contains(&self, label: &str) -> bool {
        self.index.contains_key(label)
    }

    /// Known objective labels in discovery order.
    pub fn objective_names(&self) -> Vec<String> {
        self.objectives.iter().map(|(label, _)| label.clone()).collect()
    }

    pub fn trends(&self) -> &TrendTable {
        &self.trends
    }

    /// Replace the trend table, keeping the aggregated baselines.
    pub fn with_trends(mut self, trends: TrendTable) -> Self {
        self.trends = trends;
        self
    }

    pub fn record_count(&self) -> usize {
        self.record_count
    }

    pub fn report(&self) -> AnalysisReport {
        AnalysisReport {
            generated_at: self.generated_at,
            record_count: self.record_count,
            overall: self.overall,
            metrics_by_objective: self
                .objectives
                .iter()
                .map(|(label, metrics)| ObjectiveReport {
                    objective: label.clone(),
                    totals: metrics.totals,
                    rates: metrics.rates,
                })
                .collect(),
        }
    }
}

/// Serializable view of a snapshot, for the analysis endpoint and CLI.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AnalysisReport {
    pub generated_at: DateTime<Utc>,
    pub record_count: usize,
    pub overall: ObjectiveMetrics,
    pub metrics_by_objective: Vec<ObjectiveReport>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ObjectiveReport {
    pub objective: String,
    pub totals: crate::aggregator::ObjectiveTotals,
    pub rates: campaign_core::types::BaselineRates,
}

/// Holds the current snapshot. Readers clone the `Arc`; a reload swaps in a
/// fully built replacement, so no reader ever sees a partial aggregation.
pub struct SnapshotStore {
    current: RwLock<Arc<BaselineSnapshot>>,
}

impl SnapshotStore {
    pub fn new(snapshot: BaselineSnapshot) -> Self {
        Self {
            current: RwLock::new(Arc::new(snapshot)),
        }
    }

    pub fn current(&self) -> Arc<BaselineSnapshot> {
        self.current.read().clone()
    }

    /// Publish a new snapshot and return the one it replaced.
    pub fn publish(&self, snapshot: BaselineSnapshot) -> Arc<BaselineSnapshot> {
        let next = Arc::new(snapshot);
        let objectives = next.objectives.len();
        let previous = std::mem::replace(&mut *self.current.write(), next);
        info!(objectives, "Baseline snapshot published");
        previous
    }
}
