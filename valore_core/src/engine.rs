//! The synthetic engine facade.
//!
//! An [`Engine`] owns one seeded random stream and every snapshot store.
//! All first-generation state is built synchronously in the constructor in a
//! fixed order:
//!
//! 1. organizations
//! 2. scenarios
//! 3. validation metrics
//! 4. organization snapshots
//! 5. individuals
//! 6. individual snapshots (with their first feeds)
//!
//! Reads return clones. `advance` computes every replacement first and swaps
//! the stored entries only at the end, so no partially updated snapshot is
//! ever observable. Mutating calls take `&mut self`; the borrow checker is
//! the single-writer contract.

use crate::advance::{
    select_dependents, IndividualDiff, IndividualUpdate, OrganizationDiff, UpdateBundle,
};
use crate::baseline::BaselineCatalog;
use crate::entities::{
    generate_individuals, generate_organizations, generate_scenarios, generate_validation_metrics,
};
use crate::error::EngineError;
use crate::feed::{initial_feed, push_signal, signal_item, visible, FeedItem};
use crate::model::{Individual, Organization, Scenario, ValidationMetrics};
use crate::observation::{generate_individual_series, generate_organization_series, WalkPlan};
use crate::rng::SeedStream;
use crate::scoring::individual_valuation_baseline;
use crate::snapshot::{BehavioralSnapshot, IndividualSnapshot};
use crate::timeline::{build_timeline, TimelineEvent};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};
use valore_env::{ValoreContext, VirtualClock, WallClock};

/// Deterministic synthetic-data engine for one seed.
pub struct Engine {
    seed: u64,
    context: Arc<dyn ValoreContext>,
    catalog: BaselineCatalog,
    rng: SeedStream,

    organizations: Vec<Organization>,
    scenarios: Vec<Scenario>,
    validation: ValidationMetrics,
    individuals: Vec<Individual>,

    organization_snapshots: HashMap<String, BehavioralSnapshot>,

    /// Stored with the full feed history
    individual_snapshots: HashMap<String, IndividualSnapshot>,

    /// Memoized at first snapshot build
    valuation_baselines: HashMap<String, f64>,
}

impl Engine {
    /// Creates an engine.
    ///
    /// With a seed, time comes from a [`VirtualClock`] so feed timestamps are
    /// reproducible too. Without one, the current Unix time is the seed and
    /// the wall clock is used.
    pub fn new(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::with_context(seed, VirtualClock::shared(seed)),
            None => {
                let clock = WallClock::shared();
                let seed = clock.unix_secs().max(0) as u64;
                Self::with_context(seed, clock)
            }
        }
    }

    /// Creates an engine over the standard catalog with an explicit context.
    pub fn with_context(seed: u64, context: Arc<dyn ValoreContext>) -> Self {
        Self::with_catalog(seed, context, BaselineCatalog::standard())
    }

    /// Creates an engine over a custom catalog.
    pub fn with_catalog(seed: u64, context: Arc<dyn ValoreContext>, catalog: BaselineCatalog) -> Self {
        let mut rng = SeedStream::new(seed);

        let organizations = generate_organizations(&mut rng, &catalog);
        let scenarios = generate_scenarios(&mut rng, &catalog, seed);
        let validation = generate_validation_metrics(&mut rng);

        let mut organization_snapshots = HashMap::with_capacity(organizations.len());
        for organization in &organizations {
            let series = generate_organization_series(&mut rng, organization);
            organization_snapshots.insert(
                organization.id.clone(),
                BehavioralSnapshot::build(organization, series),
            );
        }

        let individuals = generate_individuals(&mut rng, &catalog);

        let now = context.unix_secs();
        let mut individual_snapshots = HashMap::with_capacity(individuals.len());
        let mut valuation_baselines = HashMap::with_capacity(individuals.len());
        for individual in &individuals {
            let Some(parent) = organization_snapshots.get(&individual.organization_id) else {
                continue;
            };
            let series = generate_individual_series(&mut rng, &parent.raw_inputs, &individual.traits);
            let baseline = individual_valuation_baseline(
                parent.scores.valuation_projection,
                &individual.traits,
            );
            valuation_baselines.insert(individual.id.clone(), baseline);

            let snapshot = IndividualSnapshot::build(individual, &parent.scores, baseline, series);
            let feed = initial_feed(&mut rng, individual, &snapshot.agent_metrics, &catalog, now);
            individual_snapshots.insert(individual.id.clone(), snapshot.with_feed(feed));
        }

        info!(
            seed,
            organizations = organizations.len(),
            individuals = individuals.len(),
            scenarios = scenarios.len(),
            "Synthetic engine ready"
        );

        Self {
            seed,
            context,
            catalog,
            rng,
            organizations,
            scenarios,
            validation,
            individuals,
            organization_snapshots,
            individual_snapshots,
            valuation_baselines,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// The context supplying timestamps; stream drivers sleep on it.
    pub fn context(&self) -> Arc<dyn ValoreContext> {
        Arc::clone(&self.context)
    }

    pub fn catalog(&self) -> &BaselineCatalog {
        &self.catalog
    }

    pub fn organizations(&self) -> Vec<Organization> {
        self.organizations.clone()
    }

    pub fn organization(&self, organization_id: &str) -> Option<Organization> {
        self.organizations.iter().find(|o| o.id == organization_id).cloned()
    }

    /// Individuals, optionally restricted to one organization.
    pub fn individuals(&self, organization_id: Option<&str>) -> Vec<Individual> {
        self.individuals
            .iter()
            .filter(|i| organization_id.map_or(true, |id| i.organization_id == id))
            .cloned()
            .collect()
    }

    pub fn individual(&self, individual_id: &str) -> Option<Individual> {
        self.individuals.iter().find(|i| i.id == individual_id).cloned()
    }

    /// Scenarios, optionally restricted to one organization.
    pub fn scenarios(&self, organization_id: Option<&str>) -> Vec<Scenario> {
        self.scenarios
            .iter()
            .filter(|s| organization_id.map_or(true, |id| s.organization_id == id))
            .cloned()
            .collect()
    }

    pub fn validation_metrics(&self) -> ValidationMetrics {
        self.validation
    }

    pub fn behavioral_snapshot(&self, organization_id: &str) -> Option<BehavioralSnapshot> {
        self.organization_snapshots.get(organization_id).cloned()
    }

    /// An individual's snapshot with its visible feed slice.
    pub fn individual_snapshot(&self, individual_id: &str) -> Option<IndividualSnapshot> {
        self.individual_snapshots.get(individual_id).map(exposed)
    }

    /// Individual snapshots in roster order, optionally for one organization.
    pub fn individual_snapshots(&self, organization_id: Option<&str>) -> Vec<IndividualSnapshot> {
        self.individuals
            .iter()
            .filter(|i| organization_id.map_or(true, |id| i.organization_id == id))
            .filter_map(|i| self.individual_snapshots.get(&i.id))
            .map(exposed)
            .collect()
    }

    /// Full stored feed history (up to the history cap).
    pub fn feed_history(&self, individual_id: &str) -> Option<Vec<FeedItem>> {
        self.individual_snapshots
            .get(individual_id)
            .map(|s| s.feed_items.clone())
    }

    /// Builds the evaluation timeline. Empty for an unknown organization.
    ///
    /// Consumes draws from the engine stream for the advisory delays.
    pub fn agent_timeline(
        &mut self,
        organization_id: &str,
        valuation_anchor: Option<f64>,
    ) -> Vec<TimelineEvent> {
        match self.organization_snapshots.get(organization_id) {
            Some(snapshot) => build_timeline(&mut self.rng, snapshot, valuation_anchor),
            None => Vec::new(),
        }
    }

    /// Advances an organization one step and cascades to its individuals.
    ///
    /// Every individual of the organization is advanced as a candidate (in
    /// roster order, consuming draws); only the highest-impact ones are
    /// committed, the rest keep their previous snapshot.
    pub fn advance(&mut self, organization_id: &str) -> Result<UpdateBundle, EngineError> {
        let unknown = || EngineError::UnknownOrganization(organization_id.to_string());
        let organization = self
            .organizations
            .iter()
            .find(|o| o.id == organization_id)
            .ok_or_else(unknown)?;
        let previous = self
            .organization_snapshots
            .get(organization_id)
            .ok_or_else(unknown)?;

        let series =
            WalkPlan::for_organization(&previous.raw_inputs).step(&mut self.rng, &previous.raw_series);
        let snapshot = BehavioralSnapshot::build(organization, series);
        let diff = OrganizationDiff::between(previous, &snapshot);

        let now = self.context.unix_secs();
        let mut candidates = Vec::new();
        for individual in self.individuals.iter().filter(|i| i.organization_id == organization_id) {
            let Some(before) = self.individual_snapshots.get(&individual.id) else {
                continue;
            };
            let baseline = match self.valuation_baselines.get(&individual.id) {
                Some(baseline) => *baseline,
                None => return Err(EngineError::UnknownIndividual(individual.id.clone())),
            };

            let rolled = WalkPlan::for_individual(&before.raw_inputs, &individual.traits)
                .step(&mut self.rng, &before.raw_series);
            let after = IndividualSnapshot::build(individual, &snapshot.scores, baseline, rolled);
            let individual_diff = IndividualDiff::between(before, &after);

            let signal = signal_item(
                &mut self.rng,
                individual,
                &after.agent_metrics,
                &individual_diff.agent_metrics,
                now,
            );
            let after = after.with_feed(push_signal(&before.feed_items, signal));
            candidates.push(IndividualUpdate::new(after, individual_diff));
        }

        let selected = select_dependents(candidates);
        debug!(
            organization = organization_id,
            valuation_delta = diff.valuation_projection,
            resonance_delta = diff.resonance_score,
            selected = selected.len(),
            "Advanced organization"
        );

        self.organization_snapshots
            .insert(organization_id.to_string(), snapshot.clone());
        for update in &selected {
            self.individual_snapshots
                .insert(update.snapshot.individual_id.clone(), update.snapshot.clone());
        }

        let individuals = selected
            .into_iter()
            .map(|mut update| {
                update.snapshot.feed_items = visible(&update.snapshot.feed_items);
                update
            })
            .collect();

        Ok(UpdateBundle {
            organization_id: organization_id.to_string(),
            snapshot,
            diff,
            individuals,
        })
    }
}

/// Clone with the feed cut to the visible slice.
fn exposed(snapshot: &IndividualSnapshot) -> IndividualSnapshot {
    IndividualSnapshot {
        feed_items: visible(&snapshot.feed_items),
        ..snapshot.clone()
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("seed", &self.seed)
            .field("organizations", &self.organizations.len())
            .field("individuals", &self.individuals.len())
            .field("scenarios", &self.scenarios.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::{FEED_HISTORY_CAP, FEED_VISIBLE_CAP};
    use std::time::Duration;

    #[test]
    fn test_construction_populates_every_store() {
        let engine = Engine::new(Some(42));
        let catalog = BaselineCatalog::standard();

        assert_eq!(engine.seed(), 42);
        assert_eq!(engine.organizations().len(), catalog.organizations.len());
        assert_eq!(engine.individuals(None).len(), catalog.individuals.len());
        assert_eq!(engine.scenarios(None).len(), catalog.scenarios.len());
        for organization in engine.organizations() {
            assert!(engine.behavioral_snapshot(&organization.id).is_some());
        }
        for individual in engine.individuals(None) {
            let snapshot = engine.individual_snapshot(&individual.id).unwrap();
            assert_eq!(snapshot.feed_items.len(), 5);
        }
    }

    #[test]
    fn test_filters_by_organization() {
        let engine = Engine::new(Some(7));
        let id = engine.organizations()[0].id.clone();
        assert!(engine.individuals(Some(&id)).iter().all(|i| i.organization_id == id));
        assert!(engine.scenarios(Some(&id)).iter().all(|s| s.organization_id == id));
        assert_eq!(
            engine.individual_snapshots(Some(&id)).len(),
            engine.individuals(Some(&id)).len()
        );
        assert!(engine.individuals(Some("nope")).is_empty());
    }

    #[test]
    fn test_unknown_ids_are_absent() {
        let mut engine = Engine::new(Some(1));
        assert!(engine.behavioral_snapshot("nope").is_none());
        assert!(engine.individual_snapshot("nope").is_none());
        assert!(engine.agent_timeline("nope", None).is_empty());
        assert_eq!(
            engine.advance("nope").unwrap_err(),
            EngineError::UnknownOrganization("nope".to_string())
        );
    }

    #[test]
    fn test_advance_replaces_snapshot() {
        let mut engine = Engine::new(Some(99));
        let id = engine.organizations()[2].id.clone();
        let before = engine.behavioral_snapshot(&id).unwrap();

        let bundle = engine.advance(&id).unwrap();
        let after = engine.behavioral_snapshot(&id).unwrap();

        assert_eq!(bundle.snapshot, after);
        assert_eq!(
            bundle.diff.valuation_projection,
            after.scores.valuation_projection - before.scores.valuation_projection
        );
        assert!(bundle.individuals.len() <= crate::advance::DEPENDENT_UPDATE_LIMIT);
        for update in &bundle.individuals {
            assert_eq!(
                engine.individual_snapshot(&update.snapshot.individual_id),
                Some(update.snapshot.clone())
            );
        }
    }

    #[test]
    fn test_feed_history_cap_over_many_advances() {
        let clock = VirtualClock::shared(5);
        let mut engine = Engine::with_context(5, clock.clone());
        let id = engine.organizations()[0].id.clone();

        for _ in 0..40 {
            clock.advance_time(Duration::from_secs(5));
            engine.advance(&id).unwrap();
            for individual in engine.individuals(Some(&id)) {
                let history = engine.feed_history(&individual.id).unwrap();
                assert!(history.len() <= FEED_HISTORY_CAP);
                let snapshot = engine.individual_snapshot(&individual.id).unwrap();
                assert!(snapshot.feed_items.len() <= FEED_VISIBLE_CAP);
            }
        }
    }

    #[test]
    fn test_unseeded_engine_uses_time() {
        let engine = Engine::new(None);
        assert!(engine.seed() > 1_700_000_000);
    }
}
