//! Entity generation: perturbs the fixed baseline records.
//!
//! Identity fields are copied verbatim; numeric fields are jittered within
//! bounds and clamped. Bounds are never enforced by rejection.

use crate::baseline::BaselineCatalog;
use crate::model::{Individual, Organization, Scenario, TraitVector, ValidationMetrics};
use crate::rng::SeedStream;
use crate::scoring::{round_places, round_valuation, Band};

pub const REACH_BAND: Band = Band::new(0.42, 0.96);
pub const PARASOCIAL_BAND: Band = Band::new(0.6, 0.95);
pub const IDENTITY_BAND: Band = Band::new(0.6, 0.94);
pub const AUTHENTICITY_SIGNAL_BAND: Band = Band::new(0.62, 0.96);
pub const NETWORK_BAND: Band = Band::new(0.9, 1.45);

const WIN_PROBABILITY_BAND: Band = Band::new(0.35, 0.92);
const UPLIFT_BAND: Band = Band::new(0.05, 0.28);
const LINEUP_SIZE: usize = 3;
const CURVE_POINTS: usize = 5;

/// Jitters reach and baseline valuation, and maybe appends a highlight.
pub fn generate_organizations(rng: &mut SeedStream, catalog: &BaselineCatalog) -> Vec<Organization> {
    catalog
        .organizations
        .iter()
        .map(|base| {
            let mut organization = base.clone();
            let metrics = &mut organization.metrics;

            metrics.reach = REACH_BAND.clamp(metrics.reach + rng.uniform(-0.05, 0.06));
            metrics.baseline_valuation =
                round_valuation(metrics.baseline_valuation * (1.0 + rng.uniform(-0.12, 0.2)));

            if let Some(highlight) = rng.pick(&catalog.highlight_pool) {
                if !metrics.highlights.contains(highlight) {
                    metrics.highlights.push(highlight.clone());
                }
            }
            organization
        })
        .collect()
}

/// Jitters every trait within its own band.
pub fn generate_individuals(rng: &mut SeedStream, catalog: &BaselineCatalog) -> Vec<Individual> {
    catalog
        .individuals
        .iter()
        .map(|base| {
            let t = base.traits;
            let traits = TraitVector {
                parasocial_strength: PARASOCIAL_BAND
                    .clamp(t.parasocial_strength + rng.uniform(-0.03, 0.03)),
                identity_alignment: IDENTITY_BAND
                    .clamp(t.identity_alignment + rng.uniform(-0.025, 0.025)),
                authenticity_signal: AUTHENTICITY_SIGNAL_BAND
                    .clamp(t.authenticity_signal + rng.uniform(-0.02, 0.02)),
                network_multiplier: NETWORK_BAND
                    .clamp(t.network_multiplier + rng.uniform(-0.08, 0.08)),
            };
            Individual {
                traits,
                ..base.clone()
            }
        })
        .collect()
}

/// Generates one scenario per baseline scenario.
///
/// Lineups draw from the *baseline* roster, so scenarios can be generated
/// before individuals are perturbed.
pub fn generate_scenarios(rng: &mut SeedStream, catalog: &BaselineCatalog, seed: u64) -> Vec<Scenario> {
    let roster = catalog.roster_by_organization();

    catalog
        .scenarios
        .iter()
        .map(|base| {
            let win_delta = rng.uniform(-0.08, 0.08);
            let uplift_delta = rng.uniform(-0.05, 0.06);
            let win_probability = WIN_PROBABILITY_BAND.clamp(base.win_probability + win_delta);
            let uplift = UPLIFT_BAND.clamp(base.uplift + uplift_delta);
            let sentiment_curve = sentiment_curve(rng, win_probability);
            let lineup = lineup(rng, &base.organization_id, &roster);

            Scenario {
                id: format!(
                    "{}_{:04}_{}",
                    base.organization_id,
                    seed % 10_000,
                    base.opponent.to_lowercase().replace(' ', "")
                ),
                organization_id: base.organization_id.clone(),
                opponent: base.opponent.clone(),
                lineup,
                win_probability,
                uplift,
                sentiment_curve,
            }
        })
        .collect()
}

fn sentiment_curve(rng: &mut SeedStream, win_probability: f64) -> Vec<f64> {
    let base = (0.45 + (win_probability - 0.5) * 0.6).clamp(0.3, 0.95);
    let momentum = rng.uniform(0.02, 0.08);
    (0..CURVE_POINTS)
        .map(|i| {
            let noise = rng.uniform(-0.04, 0.04);
            round_places((base + momentum * i as f64 + noise).clamp(0.25, 0.99), 3)
        })
        .collect()
}

/// One member from the own organization, one from each of two shuffled
/// other organizations, topped up from the own pool.
fn lineup(rng: &mut SeedStream, organization_id: &str, roster: &[(String, Vec<String>)]) -> Vec<String> {
    let own: &[String] = roster
        .iter()
        .find(|(id, _)| id == organization_id)
        .map(|(_, members)| members.as_slice())
        .unwrap_or(&[]);

    let mut lineup = Vec::with_capacity(LINEUP_SIZE);
    if let Some(member) = rng.pick(own) {
        lineup.push(member.clone());
    }

    let mut others: Vec<&(String, Vec<String>)> =
        roster.iter().filter(|(id, _)| id != organization_id).collect();
    rng.shuffle(&mut others);
    for (_, members) in others.into_iter().take(2) {
        if let Some(member) = rng.pick(members) {
            lineup.push(member.clone());
        }
    }

    while lineup.len() < LINEUP_SIZE {
        match rng.pick(own) {
            Some(member) => lineup.push(member.clone()),
            None => break,
        }
    }
    lineup
}

/// Headline validation figures.
pub fn generate_validation_metrics(rng: &mut SeedStream) -> ValidationMetrics {
    ValidationMetrics {
        valuation_accuracy: rng.gauss(0.91, 0.03).clamp(0.82, 0.98),
        demographic_parity: rng.gauss(0.965, 0.015).clamp(0.9, 0.995),
        earnings_lift: rng.gauss(0.29, 0.05).clamp(0.15, 0.45),
        compliance_cost_reduction: rng.gauss(0.58, 0.07).clamp(0.32, 0.82),
    }
}
