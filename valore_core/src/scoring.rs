//! Scoring: pure maps from [`RawInputs`] (plus traits, for individuals) to
//! clamped component and composite scores.
//!
//! Component vectors are combined with fixed weight vectors via a `Vector5`
//! dot product. Every composite is clamped to its [`Band`]; the bands are
//! public so tests and the simulation harness check against the same numbers.

use crate::model::TraitVector;
use crate::observation::RawInputs;
use nalgebra::Vector5;
use serde::{Deserialize, Serialize};

/// Inclusive clamp range for a score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    pub min: f64,
    pub max: f64,
}

impl Band {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn clamp(self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }

    pub fn contains(self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Components and metric values.
pub const UNIT_BAND: Band = Band::new(0.0, 1.0);
pub const SOCIAL_IDENTITY_BAND: Band = Band::new(0.5, 0.98);
pub const FAIRNESS_BAND: Band = Band::new(0.88, 0.995);
pub const COMPLIANCE_BAND: Band = Band::new(0.02, 0.35);
/// Individuals are nudged around the parent's value and clamped to the
/// parent's bands, not the wider ranges the raw nudge can reach, so every
/// stored snapshot satisfies the same fairness and compliance ranges.
pub const INDIVIDUAL_FAIRNESS_BAND: Band = FAIRNESS_BAND;
pub const INDIVIDUAL_COMPLIANCE_BAND: Band = COMPLIANCE_BAND;
pub const SPONSOR_VELOCITY_BAND: Band = Band::new(0.02, 0.35);
pub const ENGAGEMENT_VELOCITY_BAND: Band = Band::new(0.01, 0.45);

/// Valuations are quantized to this step.
pub const VALUATION_STEP: f64 = 10_000.0;

/// Minimum individual valuation projection.
pub const INDIVIDUAL_VALUATION_FLOOR: f64 = 40_000.0;

/// Minimum memoized individual valuation baseline.
pub const INDIVIDUAL_BASELINE_FLOOR: f64 = 60_000.0;

/// Organization weights: EI, IF, CR, LI, TC.
const ORG_RESONANCE_WEIGHTS: [f64; 5] = [0.28, 0.22, 0.2, 0.16, 0.14];
/// Organization weights: C, VA, BC, CS, TS.
const ORG_AUTHENTICITY_WEIGHTS: [f64; 5] = [0.24, 0.2, 0.2, 0.18, 0.18];
const INDIVIDUAL_RESONANCE_WEIGHTS: [f64; 5] = [0.3, 0.2, 0.18, 0.16, 0.16];
const INDIVIDUAL_AUTHENTICITY_WEIGHTS: [f64; 5] = [0.24, 0.22, 0.18, 0.18, 0.18];

/// Rounds to the nearest [`VALUATION_STEP`], ties to even.
pub fn round_valuation(value: f64) -> f64 {
    (value / VALUATION_STEP).round_ties_even() * VALUATION_STEP
}

/// Rounds to `places` decimal places, ties to even.
pub fn round_places(value: f64, places: i32) -> f64 {
    let scale = 10f64.powi(places);
    (value * scale).round_ties_even() / scale
}

/// Behavioral-resonance components, each in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResonanceComponents {
    #[serde(rename = "EI")]
    pub emotional_intensity: f64,
    #[serde(rename = "IF")]
    pub identity_fusion: f64,
    #[serde(rename = "CR")]
    pub content_resonance: f64,
    #[serde(rename = "LI")]
    pub loyalty_index: f64,
    #[serde(rename = "TC")]
    pub temporal_consistency: f64,
}

impl ResonanceComponents {
    fn clamped(self) -> Self {
        Self {
            emotional_intensity: UNIT_BAND.clamp(self.emotional_intensity),
            identity_fusion: UNIT_BAND.clamp(self.identity_fusion),
            content_resonance: UNIT_BAND.clamp(self.content_resonance),
            loyalty_index: UNIT_BAND.clamp(self.loyalty_index),
            temporal_consistency: UNIT_BAND.clamp(self.temporal_consistency),
        }
    }

    pub fn as_vector(&self) -> Vector5<f64> {
        Vector5::new(
            self.emotional_intensity,
            self.identity_fusion,
            self.content_resonance,
            self.loyalty_index,
            self.temporal_consistency,
        )
    }

    /// Weighted composite score.
    pub fn weighted(&self, weights: [f64; 5]) -> f64 {
        self.as_vector().dot(&Vector5::from(weights))
    }
}

/// Authenticity components, each in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AuthenticityComponents {
    #[serde(rename = "C")]
    pub consistency: f64,
    #[serde(rename = "VA")]
    pub value_alignment: f64,
    #[serde(rename = "BC")]
    pub brand_consistency: f64,
    #[serde(rename = "CS")]
    pub content_sentiment: f64,
    #[serde(rename = "TS")]
    pub trust_stability: f64,
}

impl AuthenticityComponents {
    fn clamped(self) -> Self {
        Self {
            consistency: UNIT_BAND.clamp(self.consistency),
            value_alignment: UNIT_BAND.clamp(self.value_alignment),
            brand_consistency: UNIT_BAND.clamp(self.brand_consistency),
            content_sentiment: UNIT_BAND.clamp(self.content_sentiment),
            trust_stability: UNIT_BAND.clamp(self.trust_stability),
        }
    }

    pub fn as_vector(&self) -> Vector5<f64> {
        Vector5::new(
            self.consistency,
            self.value_alignment,
            self.brand_consistency,
            self.content_sentiment,
            self.trust_stability,
        )
    }

    /// Weighted composite score.
    pub fn weighted(&self, weights: [f64; 5]) -> f64 {
        self.as_vector().dot(&Vector5::from(weights))
    }
}

/// Organization-level scores.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrganizationScores {
    pub resonance_components: ResonanceComponents,
    pub authenticity_components: AuthenticityComponents,
    pub resonance_score: f64,
    pub authenticity_score: f64,
    pub social_identity_index: f64,
    pub fairness_index: f64,
    pub compliance_risk: f64,
    pub sponsor_velocity: f64,
    /// Multiple of 10,000
    pub valuation_projection: f64,
}

/// Scores an organization from its summary and baseline valuation.
pub fn score_organization(inputs: &RawInputs, baseline_valuation: f64) -> OrganizationScores {
    let ratio = inputs.interaction_ratio();
    let share = inputs.share_rate / 0.45;

    let resonance_components = ResonanceComponents {
        emotional_intensity: 0.35 + 0.55 * inputs.sentiment_mean
            - 0.25 * inputs.sentiment_volatility,
        identity_fusion: 0.55 + 0.25 * (ratio - 1.0),
        content_resonance: 0.42 * inputs.content_similarity + 0.58 * share,
        loyalty_index: inputs.retention_rate - 0.4 * inputs.churn_shock,
        temporal_consistency: 0.48 + 0.38 * inputs.stability_index
            - 0.3 * inputs.schedule_volatility,
    }
    .clamped();
    let resonance_score = resonance_components.weighted(ORG_RESONANCE_WEIGHTS);

    let authenticity_components = AuthenticityComponents {
        consistency: 0.4 + 0.55 * inputs.stability_index - 0.25 * inputs.schedule_volatility,
        value_alignment: 0.35 + 0.5 * inputs.retention_rate + 0.15 * inputs.sentiment_mean,
        brand_consistency: 0.45 + 0.45 * inputs.stability_index - 0.2 * inputs.churn_shock,
        content_sentiment: 0.4 + 0.5 * inputs.sentiment_mean - 0.2 * inputs.sentiment_volatility,
        trust_stability: 0.5 + 0.42 * inputs.stability_index - 0.3 * inputs.schedule_volatility,
    }
    .clamped();
    let authenticity_score = authenticity_components.weighted(ORG_AUTHENTICITY_WEIGHTS);

    let social_identity_index = SOCIAL_IDENTITY_BAND
        .clamp(0.55 + 0.2 * inputs.retention_rate + 0.15 * share + 0.1 * resonance_score);

    let fairness_index = FAIRNESS_BAND.clamp(
        0.9 + 0.04 * inputs.retention_rate - 0.035 * inputs.churn_shock
            + 0.03 * inputs.stability_index
            - 0.02 * inputs.schedule_volatility,
    );

    let compliance_risk = COMPLIANCE_BAND.clamp(
        0.05 + 0.4 * inputs.schedule_volatility + 0.25 * inputs.churn_shock
            - 0.3 * inputs.stability_index,
    );

    let sponsor_velocity = SPONSOR_VELOCITY_BAND.clamp(
        0.06 + 0.25 * share + 0.2 * (inputs.content_similarity - 0.7) + 0.1 * (ratio - 1.0),
    );

    let multiplier = 0.35 * (resonance_score - 0.75)
        + 0.25 * (authenticity_score - 0.75)
        + 0.15 * (social_identity_index - 0.8)
        + 0.4 * sponsor_velocity;
    let valuation_projection = round_valuation(baseline_valuation * (1.0 + multiplier));

    OrganizationScores {
        resonance_components,
        authenticity_components,
        resonance_score,
        authenticity_score,
        social_identity_index,
        fairness_index,
        compliance_risk,
        sponsor_velocity,
        valuation_projection,
    }
}

/// Individual-level scores.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndividualScores {
    pub resonance_components: ResonanceComponents,
    pub authenticity_components: AuthenticityComponents,
    pub resonance_score: f64,
    pub authenticity_score: f64,
    pub fairness_index: f64,
    pub compliance_risk: f64,
    pub engagement_velocity: f64,
    /// Multiple of 10,000, at least 40,000
    pub valuation_projection: f64,
}

/// Computes the valuation baseline an individual keeps for life.
///
/// Callers memoize the result at first snapshot build; later parent
/// valuation swings do not move it.
pub fn individual_valuation_baseline(parent_valuation: f64, traits: &TraitVector) -> f64 {
    round_valuation(
        (parent_valuation * 0.085 * traits.network_multiplier).max(INDIVIDUAL_BASELINE_FLOOR),
    )
}

/// Scores an individual: its own summary modulated by traits, with
/// fairness and compliance expressed as offsets from the parent's values.
pub fn score_individual(
    inputs: &RawInputs,
    traits: &TraitVector,
    parent: &OrganizationScores,
    valuation_baseline: f64,
) -> IndividualScores {
    let ratio = inputs.interaction_ratio();
    let ps = traits.parasocial_strength;
    let ia = traits.identity_alignment;
    let auth = traits.authenticity_signal;
    let nm = traits.network_multiplier;

    let resonance_components = ResonanceComponents {
        emotional_intensity: 0.32 + 0.55 * inputs.sentiment_mean * (0.9 + 0.25 * (ps - 0.8))
            - 0.18 * inputs.sentiment_volatility,
        identity_fusion: 0.5 + 0.28 * (ratio - 1.0) * nm,
        content_resonance: 0.34 * inputs.content_similarity
            + 0.6 * (inputs.share_rate / 0.5) * auth,
        loyalty_index: inputs.retention_rate * ia - 0.35 * inputs.churn_shock,
        temporal_consistency: 0.46 + 0.38 * inputs.stability_index
            - 0.27 * inputs.schedule_volatility,
    }
    .clamped();
    let resonance_score = resonance_components.weighted(INDIVIDUAL_RESONANCE_WEIGHTS);

    let authenticity_components = AuthenticityComponents {
        consistency: 0.46 + 0.5 * inputs.stability_index * auth
            - 0.24 * inputs.schedule_volatility,
        value_alignment: 0.4 + 0.45 * inputs.retention_rate * ia + 0.18 * inputs.sentiment_mean,
        brand_consistency: 0.44 + 0.44 * inputs.stability_index - 0.18 * inputs.churn_shock,
        content_sentiment: 0.38 + 0.48 * inputs.sentiment_mean * auth
            - 0.18 * inputs.sentiment_volatility,
        trust_stability: 0.49 + 0.4 * inputs.stability_index - 0.28 * inputs.schedule_volatility,
    }
    .clamped();
    let authenticity_score = authenticity_components.weighted(INDIVIDUAL_AUTHENTICITY_WEIGHTS);

    let engagement_velocity = ENGAGEMENT_VELOCITY_BAND
        .clamp(0.05 + 0.26 * (inputs.share_rate / 0.5) * nm + 0.18 * (ratio - 1.0));

    let fairness_index = INDIVIDUAL_FAIRNESS_BAND.clamp(
        parent.fairness_index + 0.018 * (ia - 0.8) - 0.03 * inputs.churn_shock
            + 0.02 * (inputs.stability_index - 0.75),
    );

    let compliance_risk = INDIVIDUAL_COMPLIANCE_BAND.clamp(
        parent.compliance_risk + 0.05 * inputs.schedule_volatility + 0.04 * inputs.churn_shock
            - 0.05 * auth,
    );

    let multiplier = 0.4 * (resonance_score - 0.75)
        + 0.32 * (authenticity_score - 0.77)
        + 0.18 * (engagement_velocity - 0.12)
        - 0.25 * compliance_risk;
    let valuation_projection =
        round_valuation(valuation_baseline * (1.0 + multiplier)).max(INDIVIDUAL_VALUATION_FLOOR);

    IndividualScores {
        resonance_components,
        authenticity_components,
        resonance_score,
        authenticity_score,
        fairness_index,
        compliance_risk,
        engagement_velocity,
        valuation_projection,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    fn typical_inputs() -> RawInputs {
        RawInputs {
            sentiment_mean: 0.8,
            sentiment_volatility: 0.045,
            interactions_weekly: 130_000.0,
            interactions_baseline: 125_000.0,
            content_similarity: 0.78,
            share_rate: 0.23,
            retention_rate: 0.82,
            churn_shock: 0.08,
            stability_index: 0.98,
            schedule_volatility: 0.12,
        }
    }

    fn traits() -> TraitVector {
        TraitVector {
            parasocial_strength: 0.86,
            identity_alignment: 0.82,
            authenticity_signal: 0.9,
            network_multiplier: 1.2,
        }
    }

    #[test]
    fn test_round_valuation() {
        assert_eq!(round_valuation(1_234_567.0), 1_230_000.0);
        assert_eq!(round_valuation(1_235_000.0), 1_240_000.0);
        // Ties go to even
        assert_eq!(round_valuation(25_000.0), 20_000.0);
        assert_eq!(round_places(0.12345, 3), 0.123);
    }

    #[test]
    fn test_weights_sum_to_one() {
        for weights in [
            ORG_RESONANCE_WEIGHTS,
            ORG_AUTHENTICITY_WEIGHTS,
            INDIVIDUAL_RESONANCE_WEIGHTS,
            INDIVIDUAL_AUTHENTICITY_WEIGHTS,
        ] {
            assert_relative_eq!(weights.iter().sum::<f64>(), 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_organization_components() {
        let scores = score_organization(&typical_inputs(), 1_500_000.0);
        let c = scores.resonance_components;

        // 0.35 + 0.55 * 0.8 - 0.25 * 0.045
        assert_relative_eq!(c.emotional_intensity, 0.77875, epsilon = 1e-12);
        // Loyalty: 0.82 - 0.4 * 0.08
        assert_relative_eq!(c.loyalty_index, 0.788, epsilon = 1e-12);
        assert_relative_eq!(
            scores.resonance_score,
            c.as_vector().dot(&Vector5::from(ORG_RESONANCE_WEIGHTS)),
            epsilon = 1e-12
        );
        assert_eq!(scores.valuation_projection % VALUATION_STEP, 0.0);
    }

    #[test]
    fn test_zero_baseline_interactions() {
        let mut inputs = typical_inputs();
        inputs.interactions_baseline = 0.0;
        let scores = score_organization(&inputs, 1_000_000.0);
        assert!(scores.resonance_components.identity_fusion.is_finite());
        assert_eq!(scores.resonance_components.identity_fusion, 1.0);
    }

    #[test]
    fn test_individual_baseline_floor() {
        let low = individual_valuation_baseline(100_000.0, &traits());
        assert_eq!(low, INDIVIDUAL_BASELINE_FLOOR);

        // 2,000,000 * 0.085 * 1.2 = 204,000 -> 200,000
        assert_eq!(individual_valuation_baseline(2_000_000.0, &traits()), 200_000.0);
    }

    #[test]
    fn test_individual_offsets_track_parent() {
        let inputs = typical_inputs();
        let parent = score_organization(&inputs, 1_500_000.0);
        let child = score_individual(&inputs, &traits(), &parent, 200_000.0);

        let expected_fairness = parent.fairness_index + 0.018 * (0.82 - 0.8) - 0.03 * 0.08
            + 0.02 * (0.98 - 0.75);
        assert_relative_eq!(
            child.fairness_index,
            INDIVIDUAL_FAIRNESS_BAND.clamp(expected_fairness),
            epsilon = 1e-12
        );
        assert!(child.valuation_projection >= INDIVIDUAL_VALUATION_FLOOR);
    }

    #[test]
    fn test_individual_clamps_at_parent_band_edges() {
        let mut inputs = typical_inputs();
        let mut parent = score_organization(&inputs, 1_500_000.0);

        // Upward nudge from the top of the fairness band, downward from
        // the bottom of the compliance band
        inputs.churn_shock = 0.0;
        inputs.schedule_volatility = 0.0;
        parent.fairness_index = FAIRNESS_BAND.max;
        parent.compliance_risk = COMPLIANCE_BAND.min;
        let mut high_traits = traits();
        high_traits.identity_alignment = 0.95;
        high_traits.authenticity_signal = 0.95;

        let child = score_individual(&inputs, &high_traits, &parent, 200_000.0);
        assert_eq!(child.fairness_index, INDIVIDUAL_FAIRNESS_BAND.max);
        assert_eq!(child.compliance_risk, INDIVIDUAL_COMPLIANCE_BAND.min);
        assert!(FAIRNESS_BAND.contains(INDIVIDUAL_FAIRNESS_BAND.min));
        assert!(COMPLIANCE_BAND.contains(INDIVIDUAL_COMPLIANCE_BAND.max));
    }

    #[test]
    fn test_serialized_component_keys() {
        let scores = score_organization(&typical_inputs(), 1_500_000.0);
        let json = serde_json::to_value(scores.resonance_components).unwrap();
        assert!(json.get("EI").is_some());
        assert!(json.get("IF").is_some());
        let json = serde_json::to_value(scores.authenticity_components).unwrap();
        assert!(json.get("VA").is_some());
    }

    fn arb_inputs() -> impl Strategy<Value = RawInputs> {
        (
            (0.0..1.0f64, 0.0..0.5f64, 0.0..400_000.0f64, 0.0..400_000.0f64),
            (0.0..1.0f64, 0.0..0.7f64, 0.4..1.0f64, 0.0..0.3f64),
            (0.5..0.99f64, 0.0..0.4f64),
        )
            .prop_map(|((sm, sv, weekly, base), (cs, sr, ret, churn), (stab, sched))| RawInputs {
                sentiment_mean: sm,
                sentiment_volatility: sv,
                interactions_weekly: weekly,
                interactions_baseline: base,
                content_similarity: cs,
                share_rate: sr,
                retention_rate: ret,
                churn_shock: churn,
                stability_index: stab,
                schedule_volatility: sched,
            })
    }

    fn arb_traits() -> impl Strategy<Value = TraitVector> {
        (0.6..0.95f64, 0.6..0.94f64, 0.62..0.96f64, 0.9..1.45f64).prop_map(|(ps, ia, auth, nm)| {
            TraitVector {
                parasocial_strength: ps,
                identity_alignment: ia,
                authenticity_signal: auth,
                network_multiplier: nm,
            }
        })
    }

    proptest! {
        #[test]
        fn prop_organization_scores_stay_in_bands(
            inputs in arb_inputs(),
            baseline in 100_000.0..5_000_000.0f64,
        ) {
            let s = score_organization(&inputs, baseline);
            prop_assert!(UNIT_BAND.contains(s.resonance_score));
            prop_assert!(UNIT_BAND.contains(s.authenticity_score));
            prop_assert!(SOCIAL_IDENTITY_BAND.contains(s.social_identity_index));
            prop_assert!(FAIRNESS_BAND.contains(s.fairness_index));
            prop_assert!(COMPLIANCE_BAND.contains(s.compliance_risk));
            prop_assert!(SPONSOR_VELOCITY_BAND.contains(s.sponsor_velocity));
            prop_assert_eq!(s.valuation_projection % VALUATION_STEP, 0.0);
        }

        #[test]
        fn prop_individual_scores_stay_in_bands(
            inputs in arb_inputs(),
            traits in arb_traits(),
            baseline in 60_000.0..500_000.0f64,
        ) {
            let parent = score_organization(&inputs, 2_000_000.0);
            let s = score_individual(&inputs, &traits, &parent, round_valuation(baseline));
            prop_assert!(UNIT_BAND.contains(s.resonance_score));
            prop_assert!(UNIT_BAND.contains(s.authenticity_score));
            prop_assert!(INDIVIDUAL_FAIRNESS_BAND.contains(s.fairness_index));
            prop_assert!(INDIVIDUAL_COMPLIANCE_BAND.contains(s.compliance_risk));
            prop_assert!(ENGAGEMENT_VELOCITY_BAND.contains(s.engagement_velocity));
            prop_assert!(s.valuation_projection >= INDIVIDUAL_VALUATION_FLOOR);
            prop_assert_eq!(s.valuation_projection % VALUATION_STEP, 0.0);
        }
    }
}
