//! Cost analyzer: per-source cost breakdown and unit economics

use serde::Serialize;

use super::{AnalysisContext, AnalysisOutput, BlendAnalyzer};

/// One retained source's contribution to total cost
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostLine {
    pub source: String,
    pub quantity: f64,
    pub unit_cost: f64,
    pub cost: f64,
    /// Share of total blend cost (0-100)
    pub cost_share_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostAnalysis {
    pub currency: String,
    pub total_cost: f64,
    /// `total_cost / total_required`
    pub cost_per_ton: f64,
    pub breakdown: Vec<CostLine>,
    /// Source carrying the largest share of cost
    #[serde(skip_serializing_if = "Option::is_none")]
    pub largest_component: Option<String>,
    /// Population variance of `cost_share_percent`; low means cost is spread evenly
    pub cost_share_variance: f64,
    pub insights: Vec<String>,
}

pub struct CostAnalyzer;

impl BlendAnalyzer for CostAnalyzer {
    fn name(&self) -> &str {
        "Cost"
    }

    fn analyze(&self, ctx: &AnalysisContext<'_>) -> AnalysisOutput {
        let profile = ctx.profile;
        let currency = ctx.config.currency.clone();

        let breakdown: Vec<CostLine> = profile
            .composition
            .iter()
            .map(|entry| CostLine {
                source: entry.source.clone(),
                quantity: entry.quantity,
                unit_cost: entry.unit_cost,
                cost: entry.cost,
                cost_share_percent: if profile.total_cost > 0.0 {
                    entry.cost / profile.total_cost * 100.0
                } else {
                    0.0
                },
            })
            .collect();

        let cost_per_ton = if ctx.target.total_required > 0.0 {
            profile.total_cost / ctx.target.total_required
        } else {
            0.0
        };

        let largest = breakdown
            .iter()
            .max_by(|a, b| a.cost.total_cmp(&b.cost));

        let cost_share_variance = if breakdown.is_empty() {
            0.0
        } else {
            let n = breakdown.len() as f64;
            let mean = breakdown.iter().map(|l| l.cost_share_percent).sum::<f64>() / n;
            breakdown
                .iter()
                .map(|l| (l.cost_share_percent - mean).powi(2))
                .sum::<f64>()
                / n
        };

        let mut insights = vec![format!(
            "Blend cost {:.2} {currency} per ton ({:.2} {currency} total)",
            cost_per_ton, profile.total_cost
        )];
        if let Some(line) = largest {
            insights.push(format!(
                "{} is the largest cost component at {:.1}% of total",
                line.source, line.cost_share_percent
            ));
        }
        if breakdown.len() > 1 {
            let (lo, hi) = breakdown.iter().fold((f64::MAX, f64::MIN), |(lo, hi), l| {
                (lo.min(l.cost_share_percent), hi.max(l.cost_share_percent))
            });
            insights.push(format!(
                "Cost share spread {:.1} points across {} sources",
                hi - lo,
                breakdown.len()
            ));
        }
        if let Some(cheapest) = ctx
            .sources
            .iter()
            .min_by(|a, b| a.unit_cost.total_cmp(&b.unit_cost))
        {
            let premium = cost_per_ton - cheapest.unit_cost;
            if premium > 0.0 {
                insights.push(format!(
                    "Quality targets add {:.2} {currency}/t over the cheapest source ({})",
                    premium, cheapest.name
                ));
            }
        }

        AnalysisOutput::Cost(CostAnalysis {
            currency,
            total_cost: profile.total_cost,
            cost_per_ton,
            largest_component: largest.map(|l| l.source.clone()),
            breakdown,
            cost_share_variance,
            insights,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::test_support;

    fn run() -> CostAnalysis {
        let (profile, target, sources, config) = (
            test_support::profile(),
            test_support::target(),
            test_support::sources(),
            test_support::config(),
        );
        let ctx = AnalysisContext {
            profile: &profile,
            target: &target,
            sources: &sources,
            config: &config,
        };
        match CostAnalyzer.analyze(&ctx) {
            AnalysisOutput::Cost(c) => c,
            other => panic!("unexpected output: {other:?}"),
        }
    }

    #[test]
    fn breakdown_shares_sum_to_hundred() {
        let analysis = run();
        assert_eq!(analysis.breakdown.len(), 2);
        let total: f64 = analysis.breakdown.iter().map(|l| l.cost_share_percent).sum();
        assert!((total - 100.0).abs() < 1e-9);
        assert!((analysis.breakdown[0].cost_share_percent - 300_000.0 / 460_000.0 * 100.0).abs() < 1e-9);
    }

    #[test]
    fn cost_per_ton_uses_required_tonnage() {
        let analysis = run();
        assert!((analysis.cost_per_ton - 92.0).abs() < 1e-9);
        assert_eq!(analysis.currency, "USD");
        assert_eq!(analysis.largest_component.as_deref(), Some("A"));
    }

    #[test]
    fn spread_and_premium_insights() {
        let analysis = run();
        assert!(analysis
            .insights
            .iter()
            .any(|i| i.starts_with("Cost share spread 30.4 points")));
        assert!(analysis
            .insights
            .iter()
            .any(|i| i.contains("12.00 USD/t over the cheapest source (B)")));
    }
}
