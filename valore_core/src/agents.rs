//! Agent metric groups.
//!
//! Seven independent analytical perspectives, each a small set of clamped
//! [0, 1] metrics. Every metric is a fixed linear combination of the
//! individual's [`RawInputs`], its traits and the parent organization's
//! composite scores. Metrics never read other metrics, so derivation order
//! within a pass does not matter.

use crate::model::TraitVector;
use crate::observation::RawInputs;
use crate::scoring::{OrganizationScores, UNIT_BAND};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the seven analytical perspectives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentGroup {
    SocialMedia,
    AthleticPerformance,
    MarketIntelligence,
    BrandAlignment,
    Psychology,
    RiskCompliance,
    Ethics,
}

impl AgentGroup {
    /// All groups, in derivation and serialization order.
    pub const ALL: [AgentGroup; 7] = [
        AgentGroup::SocialMedia,
        AgentGroup::AthleticPerformance,
        AgentGroup::MarketIntelligence,
        AgentGroup::BrandAlignment,
        AgentGroup::Psychology,
        AgentGroup::RiskCompliance,
        AgentGroup::Ethics,
    ];

    /// Machine key, also the serialized form.
    pub fn key(&self) -> &'static str {
        match self {
            AgentGroup::SocialMedia => "social_media",
            AgentGroup::AthleticPerformance => "athletic_performance",
            AgentGroup::MarketIntelligence => "market_intelligence",
            AgentGroup::BrandAlignment => "brand_alignment",
            AgentGroup::Psychology => "psychology",
            AgentGroup::RiskCompliance => "risk_compliance",
            AgentGroup::Ethics => "ethics",
        }
    }

    /// Short title used as a feed source.
    pub fn title(&self) -> &'static str {
        match self {
            AgentGroup::SocialMedia => "Social Media",
            AgentGroup::AthleticPerformance => "Athletic Performance",
            AgentGroup::MarketIntelligence => "Market Intelligence",
            AgentGroup::BrandAlignment => "Brand Alignment",
            AgentGroup::Psychology => "Psychology",
            AgentGroup::RiskCompliance => "Risk Compliance",
            AgentGroup::Ethics => "Ethics",
        }
    }

    /// Human-readable agent name.
    pub fn display_name(&self) -> &'static str {
        match self {
            AgentGroup::SocialMedia => "Social Media Analysis Agent",
            AgentGroup::AthleticPerformance => "Athletic Performance Agent",
            AgentGroup::MarketIntelligence => "Market Intelligence Agent",
            AgentGroup::BrandAlignment => "Brand Alignment Agent",
            AgentGroup::Psychology => "Psychological Profile Agent",
            AgentGroup::RiskCompliance => "Risk & Compliance Agent",
            AgentGroup::Ethics => "Ethics Oversight Agent",
        }
    }

    /// Headline metric of the group.
    pub fn primary_metric(&self) -> &'static str {
        match self {
            AgentGroup::SocialMedia => "engagement_authenticity",
            AgentGroup::AthleticPerformance => "stat_efficiency",
            AgentGroup::MarketIntelligence => "comp_deal_alignment",
            AgentGroup::BrandAlignment => "values_match",
            AgentGroup::Psychology => "fan_identity_tie",
            AgentGroup::RiskCompliance => "regulatory_score",
            AgentGroup::Ethics => "ethics_confidence",
        }
    }
}

impl fmt::Display for AgentGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

macro_rules! metric_group {
    ($(#[$meta:meta])* $name:ident { $($field:ident),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
        pub struct $name {
            $(pub $field: f64,)+
        }

        impl $name {
            /// `(metric, value)` pairs in declaration order.
            pub fn entries(&self) -> Vec<(&'static str, f64)> {
                vec![$((stringify!($field), self.$field)),+]
            }

            fn minus(&self, previous: &Self) -> Self {
                Self { $($field: self.$field - previous.$field,)+ }
            }

            fn clamped(self) -> Self {
                Self { $($field: UNIT_BAND.clamp(self.$field),)+ }
            }
        }
    };
}

metric_group!(
    /// Social media analysis.
    SocialMediaMetrics {
        engagement_authenticity,
        sentiment_intensity,
        virality_potential,
        platform_fit,
        authenticity_detection,
    }
);

metric_group!(
    /// Athletic performance.
    AthleticPerformanceMetrics {
        stat_efficiency,
        context_adjustment,
        injury_risk,
        pro_projection,
        leadership_signal,
    }
);

metric_group!(
    /// Market intelligence.
    MarketIntelligenceMetrics {
        comp_deal_alignment,
        market_timing,
        brand_demand,
        economic_context,
        competitive_position,
    }
);

metric_group!(
    /// Brand alignment.
    BrandAlignmentMetrics {
        values_match,
        story_resonance,
        activation_readiness,
    }
);

metric_group!(
    /// Psychological profile.
    PsychologyMetrics {
        fan_identity_tie,
        influence_score,
        trust_velocity,
    }
);

metric_group!(
    /// Risk and compliance.
    RiskComplianceMetrics {
        regulatory_score,
        disclosure_health,
        audit_risk,
    }
);

metric_group!(
    /// Ethics oversight.
    EthicsMetrics {
        bias_index,
        fairness_drift,
        ethics_confidence,
    }
);

/// All seven groups for one individual.
///
/// The same shape carries field-wise deltas in an individual diff (see
/// [`AgentMetrics::delta`]); deltas are not clamped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AgentMetrics {
    pub social_media: SocialMediaMetrics,
    pub athletic_performance: AthleticPerformanceMetrics,
    pub market_intelligence: MarketIntelligenceMetrics,
    pub brand_alignment: BrandAlignmentMetrics,
    pub psychology: PsychologyMetrics,
    pub risk_compliance: RiskComplianceMetrics,
    pub ethics: EthicsMetrics,
}

/// A single metric value addressed by group and name.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricReading {
    pub group: AgentGroup,
    pub metric: &'static str,
    pub value: f64,
}

impl AgentMetrics {
    /// Derives every group. Runs strictly after the parent has been scored.
    pub fn derive(inputs: &RawInputs, traits: &TraitVector, parent: &OrganizationScores) -> Self {
        let ps = traits.parasocial_strength;
        let ia = traits.identity_alignment;
        let auth = traits.authenticity_signal;
        let nm = traits.network_multiplier;
        let sm = inputs.sentiment_mean;
        let sr = inputs.share_rate;
        let churn = inputs.churn_shock;
        let stab = inputs.stability_index;
        let sched = inputs.schedule_volatility;

        Self {
            social_media: SocialMediaMetrics {
                engagement_authenticity: 0.45 + 0.35 * ps + 0.25 * (sr / 0.6) - 0.25 * churn,
                sentiment_intensity: 0.3 + 0.6 * sm
                    + 0.1 * (1.0 - inputs.sentiment_volatility * 1.6),
                virality_potential: 0.35 + 0.55 * (sr / 0.55) + 0.1 * (nm - 1.0),
                platform_fit: 0.45 + 0.25 * nm + 0.2 * auth - 0.15 * churn,
                authenticity_detection: 0.5 + 0.3 * auth - 0.25 * churn + 0.1 * sm,
            }
            .clamped(),
            athletic_performance: AthleticPerformanceMetrics {
                stat_efficiency: 0.5 + 0.25 * ps + 0.2 * (sm - 0.6),
                context_adjustment: 0.48 + 0.28 * ia
                    + 0.18 * (parent.social_identity_index - 0.75),
                injury_risk: 0.2 + 0.35 * sched + 0.25 * churn - 0.25 * auth,
                pro_projection: 0.42 + 0.32 * nm + 0.2 * ia,
                leadership_signal: 0.4 + 0.3 * auth + 0.2 * ia - 0.15 * churn,
            }
            .clamped(),
            market_intelligence: MarketIntelligenceMetrics {
                comp_deal_alignment: 0.4 + 0.35 * nm + 0.25 * (sr / 0.55),
                market_timing: 0.45 + 0.3 * stab + 0.15 * (parent.sponsor_velocity * 2.0),
                brand_demand: 0.42 + 0.28 * ia + 0.25 * sm,
                economic_context: 0.5 + 0.2 * parent.sponsor_velocity
                    + 0.15 * (parent.social_identity_index - 0.75),
                competitive_position: 0.38 + 0.3 * nm + 0.2 * auth,
            }
            .clamped(),
            brand_alignment: BrandAlignmentMetrics {
                values_match: 0.48 + 0.32 * ia + 0.2 * auth,
                story_resonance: 0.45 + 0.3 * ps + 0.2 * sm,
                activation_readiness: 0.4 + 0.3 * nm + 0.2 * (1.0 - churn) + 0.1 * sr * 2.0,
            }
            .clamped(),
            psychology: PsychologyMetrics {
                fan_identity_tie: 0.5 + 0.35 * ia + 0.2 * (parent.social_identity_index - 0.75),
                influence_score: 0.45 + 0.3 * ps + 0.2 * nm,
                trust_velocity: 0.42 + 0.32 * auth - 0.2 * churn
                    + 0.15 * inputs.retention_rate,
            }
            .clamped(),
            risk_compliance: RiskComplianceMetrics {
                regulatory_score: 0.6 + 0.25 * auth - 0.3 * parent.compliance_risk,
                disclosure_health: 0.55 + 0.25 * stab - 0.25 * sched,
                audit_risk: 0.25 + 0.35 * sched + 0.25 * churn - 0.25 * auth,
            }
            .clamped(),
            ethics: EthicsMetrics {
                bias_index: 0.35 - 0.15 * (parent.fairness_index - 0.95) + 0.25 * churn,
                fairness_drift: 0.3 - 0.25 * (parent.fairness_index - 0.95) + 0.2 * sched,
                ethics_confidence: 0.6 + 0.25 * auth - 0.2 * churn,
            }
            .clamped(),
        }
    }

    /// Field-wise `self - previous`.
    pub fn delta(&self, previous: &Self) -> Self {
        Self {
            social_media: self.social_media.minus(&previous.social_media),
            athletic_performance: self.athletic_performance.minus(&previous.athletic_performance),
            market_intelligence: self.market_intelligence.minus(&previous.market_intelligence),
            brand_alignment: self.brand_alignment.minus(&previous.brand_alignment),
            psychology: self.psychology.minus(&previous.psychology),
            risk_compliance: self.risk_compliance.minus(&previous.risk_compliance),
            ethics: self.ethics.minus(&previous.ethics),
        }
    }

    /// `(metric, value)` pairs of one group.
    pub fn group_entries(&self, group: AgentGroup) -> Vec<(&'static str, f64)> {
        match group {
            AgentGroup::SocialMedia => self.social_media.entries(),
            AgentGroup::AthleticPerformance => self.athletic_performance.entries(),
            AgentGroup::MarketIntelligence => self.market_intelligence.entries(),
            AgentGroup::BrandAlignment => self.brand_alignment.entries(),
            AgentGroup::Psychology => self.psychology.entries(),
            AgentGroup::RiskCompliance => self.risk_compliance.entries(),
            AgentGroup::Ethics => self.ethics.entries(),
        }
    }

    /// Every metric, group by group in [`AgentGroup::ALL`] order.
    pub fn readings(&self) -> Vec<MetricReading> {
        AgentGroup::ALL
            .iter()
            .flat_map(|&group| {
                self.group_entries(group)
                    .into_iter()
                    .map(move |(metric, value)| MetricReading { group, metric, value })
            })
            .collect()
    }

    /// Looks up one metric by name.
    pub fn value(&self, group: AgentGroup, metric: &str) -> Option<f64> {
        self.group_entries(group)
            .into_iter()
            .find(|(name, _)| *name == metric)
            .map(|(_, value)| value)
    }

    /// The group's headline metric.
    pub fn primary(&self, group: AgentGroup) -> f64 {
        self.value(group, group.primary_metric()).unwrap_or_default()
    }

    /// The reading with the largest magnitude; ties keep the earliest.
    /// `None` when every value is zero.
    pub fn largest_shift(&self) -> Option<MetricReading> {
        let mut best: Option<MetricReading> = None;
        for reading in self.readings() {
            let current = best.map(|b| b.value.abs()).unwrap_or(0.0);
            if reading.value.abs() > current {
                best = Some(reading);
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::score_organization;
    use approx::assert_relative_eq;

    fn inputs() -> RawInputs {
        RawInputs {
            sentiment_mean: 0.78,
            sentiment_volatility: 0.05,
            interactions_weekly: 60_000.0,
            interactions_baseline: 58_000.0,
            content_similarity: 0.76,
            share_rate: 0.24,
            retention_rate: 0.84,
            churn_shock: 0.07,
            stability_index: 0.97,
            schedule_volatility: 0.13,
        }
    }

    fn traits() -> TraitVector {
        TraitVector {
            parasocial_strength: 0.88,
            identity_alignment: 0.8,
            authenticity_signal: 0.85,
            network_multiplier: 1.3,
        }
    }

    fn metrics() -> AgentMetrics {
        let parent = score_organization(&inputs(), 1_800_000.0);
        AgentMetrics::derive(&inputs(), &traits(), &parent)
    }

    #[test]
    fn test_every_group_has_its_primary_metric() {
        let m = metrics();
        for group in AgentGroup::ALL {
            assert!(
                m.value(group, group.primary_metric()).is_some(),
                "{} missing {}",
                group,
                group.primary_metric()
            );
        }
    }

    #[test]
    fn test_readings_cover_all_metrics_in_unit_band() {
        let readings = metrics().readings();
        assert_eq!(readings.len(), 27);
        assert!(readings.iter().all(|r| UNIT_BAND.contains(r.value)));
        assert_eq!(readings[0].metric, "engagement_authenticity");
        assert_eq!(readings[26].metric, "ethics_confidence");
    }

    #[test]
    fn test_engagement_authenticity_formula() {
        assert_relative_eq!(
            metrics().social_media.engagement_authenticity,
            0.45 + 0.35 * 0.88 + 0.25 * 0.4 - 0.25 * 0.07,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_delta_of_self_is_zero() {
        let m = metrics();
        let delta = m.delta(&m);
        assert!(delta.readings().iter().all(|r| r.value == 0.0));
        assert!(delta.largest_shift().is_none());
    }

    #[test]
    fn test_largest_shift_prefers_first_on_tie() {
        let m = metrics();
        let mut delta = m.delta(&m);
        delta.brand_alignment.values_match = -0.02;
        delta.ethics.bias_index = 0.02;
        let shift = delta.largest_shift().unwrap();
        assert_eq!(shift.group, AgentGroup::BrandAlignment);
        assert_eq!(shift.metric, "values_match");
        assert!(shift.value < 0.0);
    }

    #[test]
    fn test_serialized_group_keys() {
        let json = serde_json::to_value(metrics()).unwrap();
        for group in AgentGroup::ALL {
            assert!(json.get(group.key()).is_some());
        }
    }
}
