//! Entity records: organizations, individuals, scenarios and validation metrics.
//!
//! These are plain value types. Every read accessor on the engine hands out
//! clones, so callers can never reach back into engine state through them.

use serde::{Deserialize, Serialize};

/// Aggregate metrics carried by an organization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrganizationMetrics {
    /// Fan reach ratio [0, 1]
    pub reach: f64,

    /// Baseline valuation in currency units (multiple of 10,000)
    pub baseline_valuation: f64,

    /// Community highlights
    pub highlights: Vec<String>,
}

/// A sports program.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Organization {
    pub id: String,
    pub name: String,
    pub conference: String,
    pub tier: String,
    pub phase: String,
    pub metrics: OrganizationMetrics,
}

/// Behavioral traits of an individual. Each field has its own clamp range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TraitVector {
    /// [0.6, 0.95]
    pub parasocial_strength: f64,
    /// [0.6, 0.94]
    pub identity_alignment: f64,
    /// [0.62, 0.96]
    pub authenticity_signal: f64,
    /// [0.9, 1.45]
    pub network_multiplier: f64,
}

/// An athlete. Belongs to exactly one organization by id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Individual {
    pub id: String,
    pub organization_id: String,
    pub name: String,
    pub position: String,
    pub archetype: String,
    pub class_year: String,
    pub traits: TraitVector,
    pub notes: Vec<String>,
}

impl Individual {
    /// First token of the display name, used in feed headlines.
    pub fn first_name(&self) -> &str {
        self.name.split_whitespace().next().unwrap_or(&self.name)
    }
}

/// A matchup projection. Generated once, never advanced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub id: String,
    pub organization_id: String,
    pub opponent: String,
    pub lineup: Vec<String>,
    pub win_probability: f64,
    pub uplift: f64,
    /// Five-point fan sentiment curve
    pub sentiment_curve: Vec<f64>,
}

/// Headline model-validation figures shown alongside the dataset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValidationMetrics {
    pub valuation_accuracy: f64,
    pub demographic_parity: f64,
    pub earnings_lift: f64,
    pub compliance_cost_reduction: f64,
}
