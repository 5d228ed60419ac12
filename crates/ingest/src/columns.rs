//! Column discovery over the export's header row.

use campaign_core::config::ColumnHints;
use campaign_core::{CampaignError, CampaignResult};
use tracing::debug;

/// Positions of the metric columns within a header row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMap {
    pub impressions: usize,
    pub clicks: usize,
    pub spend: usize,
    pub results: usize,
    pub objective: usize,
    pub conversions: Option<usize>,
}

impl ColumnMap {
    /// Numeric columns take the first header containing the hint; the objective
    /// column must match its hint exactly. Matching is case-sensitive.
    pub fn resolve(headers: &[String], hints: &ColumnHints) -> CampaignResult<Self> {
        debug!(?headers, "Resolving dataset columns");

        let containing = |hint: &str, role: &str| {
            headers
                .iter()
                .position(|h| h.contains(hint))
                .ok_or_else(|| missing(role, hint))
        };

        let objective = headers
            .iter()
            .position(|h| h == &hints.objective)
            .ok_or_else(|| missing("objective", &hints.objective))?;

        let conversions = match &hints.conversions {
            Some(hint) => Some(containing(hint, "conversions")?),
            None => None,
        };

        Ok(Self {
            impressions: containing(&hints.impressions, "impressions")?,
            clicks: containing(&hints.clicks, "clicks")?,
            spend: containing(&hints.spend, "spend")?,
            results: containing(&hints.results, "results")?,
            objective,
            conversions,
        })
    }
}

fn missing(role: &str, hint: &str) -> CampaignError {
    CampaignError::DataUnavailable(format!("no {role} column matching '{hint}' in dataset header"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_resolves_export_headers() {
        let headers = headers(&[
            "Nom de la campagne",
            "Indicateur de résultats",
            "Résultats",
            "Impressions",
            "Montant dépensé (EUR)",
            "Clics (tous)",
        ]);
        let map = ColumnMap::resolve(&headers, &ColumnHints::default()).unwrap();
        assert_eq!(
            map,
            ColumnMap {
                impressions: 3,
                clicks: 5,
                spend: 4,
                results: 2,
                objective: 1,
                conversions: None,
            }
        );
    }

    #[test]
    fn test_first_containing_header_wins() {
        let headers = headers(&["Impressions uniques", "Impressions", "Clicks", "Spend", "Results", "Objective"]);
        let hints = ColumnHints {
            impressions: "Impressions".to_string(),
            clicks: "Clicks".to_string(),
            spend: "Spend".to_string(),
            results: "Results".to_string(),
            objective: "Objective".to_string(),
            conversions: None,
        };
        let map = ColumnMap::resolve(&headers, &hints).unwrap();
        assert_eq!(map.impressions, 0);
    }

    #[test]
    fn test_objective_requires_exact_header() {
        let headers = headers(&[
            "Indicateur de résultats (v2)",
            "Résultats",
            "Impressions",
            "Montant dépensé",
            "Clics (tous)",
        ]);
        let err = ColumnMap::resolve(&headers, &ColumnHints::default()).unwrap_err();
        assert!(matches!(err, CampaignError::DataUnavailable(ref m) if m.contains("objective")));
    }

    #[test]
    fn test_missing_spend_column() {
        let headers = headers(&["Indicateur de résultats", "Résultats", "Impressions", "Clics (tous)"]);
        let err = ColumnMap::resolve(&headers, &ColumnHints::default()).unwrap_err();
        assert!(matches!(err, CampaignError::DataUnavailable(ref m) if m.contains("spend")));
    }

    #[test]
    fn test_optional_conversions_column() {
        let headers = headers(&[
            "Indicateur de résultats",
            "Résultats",
            "Impressions",
            "Montant dépensé",
            "Clics (tous)",
            "Conversions sur le site",
        ]);
        let hints = ColumnHints {
            conversions: Some("Conversions".to_string()),
            ..ColumnHints::default()
        };
        let map = ColumnMap::resolve(&headers, &hints).unwrap();
        assert_eq!(map.conversions, Some(5));
    }
}
