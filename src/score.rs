//! Importance-weighted score aggregation.
//!
//! Pure functions over the classified factor set. Given the same inputs
//! the scores are identical regardless of factor order — means and
//! weighted sums carry no order dependence.
//!
//! Per-factor: `OK`/`N/A` score 100; `OFI` scores `60 - penalty`;
//! `Priority OFI` scores `30 - penalty`, with penalty 15/10/5 for
//! High/Medium/Low importance. Category scores are arithmetic means;
//! the overall score is the fixed-weight sum of category means.

use crate::config::CategoryWeights;
use crate::model::{
    FactorAssessment, FactorCategory, FactorStatus, Importance, OfiClassification,
};
use std::collections::BTreeMap;

/// Penalty subtracted for a failing factor, by importance.
pub fn importance_penalty(importance: Importance) -> f64 {
    match importance {
        Importance::High => 15.0,
        Importance::Medium => 10.0,
        Importance::Low => 5.0,
    }
}

/// Score for one factor. `N/A` is never scored as a defect.
pub fn factor_score(status: FactorStatus, importance: Importance) -> f64 {
    match status {
        FactorStatus::Ok | FactorStatus::NotApplicable => 100.0,
        FactorStatus::Ofi => 60.0 - importance_penalty(importance),
        FactorStatus::PriorityOfi => 30.0 - importance_penalty(importance),
    }
}

/// Aggregated category and overall scores.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreBreakdown {
    /// 0–100.
    pub overall: u8,
    /// Mean factor score per category, for categories with factors.
    pub per_category: BTreeMap<FactorCategory, f64>,
}

/// Aggregate the classified factor set.
///
/// `classifications` pair one-to-one with `assessments`; the final
/// (possibly escalated) status scores the factor while the raw assessment
/// supplies category and importance. Categories without factors are
/// excluded and the remaining category weights renormalized.
pub fn aggregate(
    assessments: &[FactorAssessment],
    classifications: &[OfiClassification],
    weights: &CategoryWeights,
) -> ScoreBreakdown {
    let mut sums: BTreeMap<FactorCategory, (f64, u32)> = BTreeMap::new();

    for (assessment, classification) in assessments.iter().zip(classifications.iter()) {
        let score = factor_score(classification.status, assessment.importance);
        let entry = sums.entry(assessment.category).or_insert((0.0, 0));
        entry.0 += score;
        entry.1 += 1;
    }

    let per_category: BTreeMap<FactorCategory, f64> = sums
        .into_iter()
        .map(|(category, (sum, count))| (category, sum / count as f64))
        .collect();

    let mut weighted_sum = 0.0;
    let mut weight_total = 0.0;
    for (category, mean) in &per_category {
        let weight = category_weight(weights, *category);
        weighted_sum += mean * weight;
        weight_total += weight;
    }

    let overall = if weight_total > 0.0 {
        (weighted_sum / weight_total).round().clamp(0.0, 100.0) as u8
    } else {
        0
    };

    ScoreBreakdown {
        overall,
        per_category,
    }
}

fn category_weight(weights: &CategoryWeights, category: FactorCategory) -> f64 {
    match category {
        FactorCategory::ContentQuality => weights.content,
        FactorCategory::TechnicalSeo => weights.technical,
        FactorCategory::LocalTrust => weights.local,
        FactorCategory::UxPerformance => weights.ux,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(
        category: FactorCategory,
        status: FactorStatus,
        importance: Importance,
    ) -> (FactorAssessment, OfiClassification) {
        let assessment = FactorAssessment {
            name: "factor".to_string(),
            category,
            status,
            importance,
            rationale: String::new(),
            page_url: "https://example.com/".to_string(),
        };
        let classification = OfiClassification {
            factor_name: assessment.name.clone(),
            page_url: assessment.page_url.clone(),
            status,
            business_impact: crate::model::Tier::Low,
            technical_complexity: crate::model::Tier::Low,
            effort: crate::model::Effort::Minimal,
            quick_win: false,
        };
        (assessment, classification)
    }

    #[test]
    fn test_factor_score_table() {
        use FactorStatus::*;
        use Importance::*;
        assert_eq!(factor_score(Ok, High), 100.0);
        assert_eq!(factor_score(NotApplicable, High), 100.0);
        assert_eq!(factor_score(Ofi, High), 45.0);
        assert_eq!(factor_score(Ofi, Medium), 50.0);
        assert_eq!(factor_score(Ofi, Low), 55.0);
        assert_eq!(factor_score(PriorityOfi, High), 15.0);
        assert_eq!(factor_score(PriorityOfi, Medium), 20.0);
        assert_eq!(factor_score(PriorityOfi, Low), 25.0);
    }

    #[test]
    fn test_fixed_category_means_produce_74() {
        // Category means of 80/60/70/90 under the default weights:
        // 80*.25 + 60*.30 + 70*.25 + 90*.20 = 73.5 → 74.
        let weights = CategoryWeights::default();
        let overall = (80.0 * weights.content
            + 60.0 * weights.technical
            + 70.0 * weights.local
            + 90.0 * weights.ux)
            .round() as u8;
        assert_eq!(overall, 74);
    }

    #[test]
    fn test_all_passing_factors_score_100() {
        let weights = CategoryWeights::default();
        let mut assessments = Vec::new();
        let mut classifications = Vec::new();
        for category in FactorCategory::ALL {
            let (a, c) = pair(category, FactorStatus::Ok, Importance::High);
            assessments.push(a);
            classifications.push(c);
        }
        let breakdown = aggregate(&assessments, &classifications, &weights);
        assert_eq!(breakdown.overall, 100);
        assert_eq!(breakdown.per_category.len(), 4);
    }

    #[test]
    fn test_order_independence() {
        let weights = CategoryWeights::default();
        let mut pairs = vec![
            pair(FactorCategory::ContentQuality, FactorStatus::Ok, Importance::High),
            pair(FactorCategory::ContentQuality, FactorStatus::Ofi, Importance::Medium),
            pair(FactorCategory::TechnicalSeo, FactorStatus::PriorityOfi, Importance::High),
            pair(FactorCategory::LocalTrust, FactorStatus::NotApplicable, Importance::Low),
            pair(FactorCategory::UxPerformance, FactorStatus::Ofi, Importance::Low),
        ];

        let (a1, c1): (Vec<_>, Vec<_>) = pairs.clone().into_iter().unzip();
        let forward = aggregate(&a1, &c1, &weights);

        pairs.reverse();
        let (a2, c2): (Vec<_>, Vec<_>) = pairs.into_iter().unzip();
        let reversed = aggregate(&a2, &c2, &weights);

        assert_eq!(forward, reversed);
    }

    #[test]
    fn test_na_never_lowers_a_category() {
        let weights = CategoryWeights::default();
        let (a1, c1) = pair(FactorCategory::ContentQuality, FactorStatus::Ok, Importance::High);
        let (a2, c2) = pair(
            FactorCategory::ContentQuality,
            FactorStatus::NotApplicable,
            Importance::High,
        );
        let breakdown = aggregate(&[a1, a2], &[c1, c2], &weights);
        assert_eq!(
            breakdown.per_category[&FactorCategory::ContentQuality],
            100.0
        );
    }

    #[test]
    fn test_escalated_status_scores_lower() {
        let weights = CategoryWeights::default();
        // The classification carries Priority OFI even though the raw
        // assessment said OFI — the final status is what scores.
        let (a, mut c) = pair(FactorCategory::TechnicalSeo, FactorStatus::Ofi, Importance::High);
        c.status = FactorStatus::PriorityOfi;
        let breakdown = aggregate(&[a], &[c], &weights);
        assert_eq!(breakdown.per_category[&FactorCategory::TechnicalSeo], 15.0);
    }

    #[test]
    fn test_missing_categories_renormalize() {
        let weights = CategoryWeights::default();
        let (a, c) = pair(FactorCategory::ContentQuality, FactorStatus::Ok, Importance::High);
        let breakdown = aggregate(&[a], &[c], &weights);
        // One category at 100 with renormalized weight → overall 100.
        assert_eq!(breakdown.overall, 100);
    }

    #[test]
    fn test_empty_input() {
        let breakdown = aggregate(&[], &[], &CategoryWeights::default());
        assert_eq!(breakdown.overall, 0);
        assert!(breakdown.per_category.is_empty());
    }
}
