//! Spend-only prediction from an objective's historical cost ratios.

use crate::aggregator::ratio;
use crate::estimator::round_count;
use crate::snapshot::BaselineSnapshot;
use campaign_core::types::{PredictedMetrics, SpendPrediction};
use tracing::debug;

pub struct SpendPredictor {
    reach_factor: f64,
}

impl SpendPredictor {
    pub fn new(reach_factor: f64) -> Self {
        Self { reach_factor }
    }

    /// Predict results, impressions and coverage for `spend` on `objective`.
    /// No duration or trend adjustment is applied.
    pub fn predict(&self, objective: &str, spend: f64, snapshot: &BaselineSnapshot) -> SpendPrediction {
        let Some(metrics) = snapshot.objective(objective) else {
            debug!(objective, "Spend prediction for unknown objective");
            return SpendPrediction::NotEnoughData;
        };
        let rates = metrics.rates;
        if rates.avg_cost_per_result <= 0.0 {
            debug!(objective, "Objective has no cost-per-result baseline");
            return SpendPrediction::NotEnoughData;
        }

        let results = spend / rates.avg_cost_per_result;
        let impressions = ratio(spend, rates.avg_cpm) * 1000.0;
        let coverage = impressions * self.reach_factor;

        SpendPrediction::Predicted(PredictedMetrics {
            predicted_results: round_count(results),
            predicted_impressions: round_count(impressions),
            predicted_coverage: round_count(coverage),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::Aggregator;
    use campaign_core::types::HistoricalRecord;

    fn snapshot() -> BaselineSnapshot {
        Aggregator::aggregate(&[
            HistoricalRecord::new("leads", 100.0, 10_000.0, 200.0, 20.0),
            HistoricalRecord::new("brand_awareness", 80.0, 40_000.0, 40.0, 0.0),
        ])
        .unwrap()
    }

    #[test]
    fn test_predict_from_spend() {
        let predictor = SpendPredictor::new(0.7);
        match predictor.predict("leads", 200.0, &snapshot()) {
            SpendPrediction::Predicted(m) => {
                assert_eq!(m.predicted_results, 40);
                assert_eq!(m.predicted_impressions, 20_000);
                assert_eq!(m.predicted_coverage, 14_000);
            }
            SpendPrediction::NotEnoughData => panic!("expected a prediction"),
        }
    }

    #[test]
    fn test_zero_cost_baseline_is_not_enough_data() {
        let predictor = SpendPredictor::new(0.7);
        assert_eq!(
            predictor.predict("brand_awareness", 200.0, &snapshot()),
            SpendPrediction::NotEnoughData
        );
    }

    #[test]
    fn test_unknown_objective_is_not_enough_data() {
        let predictor = SpendPredictor::new(0.7);
        assert_eq!(
            predictor.predict("unknown_xyz", 200.0, &snapshot()),
            SpendPrediction::NotEnoughData
        );
    }
}
