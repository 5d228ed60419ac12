//! Baseline aggregation and budget-driven funnel estimation.
//!
//! Historical campaign rows are reduced to per-objective baseline rates once,
//! published as an immutable [`BaselineSnapshot`], and every estimate is a pure
//! function of a request and that snapshot.

pub mod aggregator;
pub mod estimator;
pub mod predictor;
pub mod snapshot;
pub mod trend;

pub use aggregator::{Aggregator, ObjectiveMetrics, ObjectiveTotals};
pub use estimator::{EffectiveRates, Estimator, EstimatorConfig};
pub use predictor::SpendPredictor;
pub use snapshot::{AnalysisReport, BaselineSnapshot, ObjectiveReport, SnapshotStore};
pub use trend::TrendTable;
