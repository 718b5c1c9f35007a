//! Raw observation series and their statistical summary.
//!
//! A [`RawSeries`] holds fixed-length windows of synthetic observations; a
//! [`RawInputs`] is always recomputed from a series by [`RawInputs::from_series`]
//! and never edited on its own. Advancement rolls each window by one sample
//! (drop oldest, append newest) so window lengths never change.

use crate::model::{Organization, TraitVector};
use crate::rng::SeedStream;
use nalgebra::DVector;
use serde::{Deserialize, Serialize};

/// Daily series length.
pub const DAILY_WINDOW: usize = 30;

/// Monthly retention series length.
pub const MONTHLY_WINDOW: usize = 4;

/// Churn shock series length.
pub const CHURN_WINDOW: usize = 3;

/// Days in the baseline and current interaction weeks.
const WEEK: usize = 7;

/// Guard for the week-over-week interaction ratio.
const RATIO_EPSILON: f64 = 1e-6;

/// Fixed-length observation windows for one entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSeries {
    pub sentiment_daily: Vec<f64>,
    pub interactions_daily: Vec<i64>,
    pub content_similarity_daily: Vec<f64>,
    pub share_rate_daily: Vec<f64>,
    pub retention_monthly: Vec<f64>,
    pub churn_events: Vec<f64>,
    pub schedule_volatility_daily: Vec<f64>,
}

impl RawSeries {
    /// Returns true if every window still has its fixed length.
    pub fn has_fixed_windows(&self) -> bool {
        self.sentiment_daily.len() == DAILY_WINDOW
            && self.interactions_daily.len() == DAILY_WINDOW
            && self.content_similarity_daily.len() == DAILY_WINDOW
            && self.share_rate_daily.len() == DAILY_WINDOW
            && self.retention_monthly.len() == MONTHLY_WINDOW
            && self.churn_events.len() == CHURN_WINDOW
            && self.schedule_volatility_daily.len() == DAILY_WINDOW
    }
}

/// Ten summary statistics of a [`RawSeries`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawInputs {
    pub sentiment_mean: f64,
    /// Population standard deviation of daily sentiment
    pub sentiment_volatility: f64,
    /// Mean of the last seven days
    pub interactions_weekly: f64,
    /// Mean of the first seven days
    pub interactions_baseline: f64,
    pub content_similarity: f64,
    pub share_rate: f64,
    pub retention_rate: f64,
    pub churn_shock: f64,
    /// Damping of retention's standard deviation, [0.5, 0.99]
    pub stability_index: f64,
    pub schedule_volatility: f64,
}

impl RawInputs {
    /// Reduces a series to its summary. Pure; used both at first generation
    /// and after every rolling update.
    pub fn from_series(series: &RawSeries) -> Self {
        let interactions: Vec<f64> = series.interactions_daily.iter().map(|&v| v as f64).collect();
        let first_week = &interactions[..interactions.len().min(WEEK)];
        let last_week = &interactions[interactions.len().saturating_sub(WEEK)..];

        let stability_index =
            (0.55 + 0.45 * (1.0 - pstdev(&series.retention_monthly))).clamp(0.5, 0.99);

        Self {
            sentiment_mean: mean(&series.sentiment_daily),
            sentiment_volatility: pstdev(&series.sentiment_daily),
            interactions_weekly: mean(last_week),
            interactions_baseline: mean(first_week),
            content_similarity: mean(&series.content_similarity_daily),
            share_rate: mean(&series.share_rate_daily),
            retention_rate: mean(&series.retention_monthly),
            churn_shock: mean(&series.churn_events),
            stability_index,
            schedule_volatility: mean(&series.schedule_volatility_daily),
        }
    }

    /// Current week over baseline week, epsilon-guarded.
    pub fn interaction_ratio(&self) -> f64 {
        self.interactions_weekly / (self.interactions_baseline + RATIO_EPSILON)
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    DVector::from_row_slice(values).mean()
}

/// Population standard deviation (0 for fewer than two samples).
fn pstdev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    DVector::from_row_slice(values).variance().sqrt()
}

/// A clamped normal draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Draw {
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}

impl Draw {
    fn new(mean: f64, std_dev: f64, min: f64, max: f64) -> Self {
        Self { mean, std_dev, min, max }
    }

    fn sample(&self, rng: &mut SeedStream) -> f64 {
        rng.gauss(self.mean, self.std_dev).clamp(self.min, self.max)
    }

    fn series(&self, rng: &mut SeedStream, len: usize) -> Vec<f64> {
        (0..len).map(|_| self.sample(rng)).collect()
    }
}

/// A normal draw truncated to an integer count with a floor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CountDraw {
    pub mean: f64,
    pub std_dev: f64,
    pub floor: i64,
}

impl CountDraw {
    fn new(mean: f64, std_dev: f64, floor: i64) -> Self {
        Self { mean, std_dev, floor }
    }

    fn sample(&self, rng: &mut SeedStream) -> i64 {
        (rng.gauss(self.mean, self.std_dev) as i64).max(self.floor)
    }

    fn series(&self, rng: &mut SeedStream, len: usize) -> Vec<i64> {
        (0..len).map(|_| self.sample(rng)).collect()
    }
}

/// Generates an organization's first series, anchored on its reach.
pub fn generate_organization_series(rng: &mut SeedStream, organization: &Organization) -> RawSeries {
    let reach = organization.metrics.reach;

    let sentiment_anchor = rng.gauss(0.72 + reach * 0.12, 0.05).clamp(0.35, 0.98);
    let sentiment_daily = Draw::new(sentiment_anchor, 0.045, 0.15, 0.99).series(rng, DAILY_WINDOW);

    let base_interactions = (rng.gauss(80_000.0 * (0.8 + reach), 12_000.0) as i64).max(25_000) as f64;
    let interactions_daily =
        CountDraw::new(base_interactions, base_interactions * 0.2, 8_000).series(rng, DAILY_WINDOW);

    let content_similarity_daily =
        Draw::new(0.7 + reach * 0.1, 0.05, 0.3, 0.99).series(rng, DAILY_WINDOW);
    let share_rate_daily = Draw::new(0.2 + reach * 0.04, 0.04, 0.04, 0.55).series(rng, DAILY_WINDOW);
    let retention_monthly =
        Draw::new(0.78 + reach * 0.05, 0.035, 0.55, 0.98).series(rng, MONTHLY_WINDOW);
    let churn_events = Draw::new(0.08, 0.02, 0.015, 0.22).series(rng, CHURN_WINDOW);
    let schedule_volatility_daily = Draw::new(0.12, 0.035, 0.02, 0.32).series(rng, DAILY_WINDOW);

    RawSeries {
        sentiment_daily,
        interactions_daily,
        content_similarity_daily,
        share_rate_daily,
        retention_monthly,
        churn_events,
        schedule_volatility_daily,
    }
}

/// Generates an individual's first series.
///
/// Every anchor is the parent organization's summary value scaled by a
/// trait-dependent factor, so the parent's inputs must exist first.
pub fn generate_individual_series(
    rng: &mut SeedStream,
    parent: &RawInputs,
    traits: &TraitVector,
) -> RawSeries {
    let sentiment_anchor = (parent.sentiment_mean
        * (0.88 + 0.25 * (traits.parasocial_strength - 0.8)))
        .clamp(0.2, 0.99);
    let sentiment_daily = Draw::new(sentiment_anchor, 0.05, 0.15, 0.99).series(rng, DAILY_WINDOW);

    let interaction_anchor =
        (parent.interactions_weekly * (0.12 + 0.42 * traits.network_multiplier)).max(9_500.0);
    let interactions_daily =
        CountDraw::new(interaction_anchor, interaction_anchor * 0.22, 2_800).series(rng, DAILY_WINDOW);

    let content_anchor = (parent.content_similarity
        * (0.9 + 0.22 * (traits.identity_alignment - 0.75)))
        .clamp(0.3, 0.99);
    let content_similarity_daily =
        Draw::new(content_anchor, 0.045, 0.25, 0.99).series(rng, DAILY_WINDOW);

    let share_anchor =
        (parent.share_rate * (0.92 + 0.25 * (traits.network_multiplier - 1.0))).clamp(0.05, 0.62);
    let share_rate_daily = Draw::new(share_anchor, 0.035, 0.03, 0.6).series(rng, DAILY_WINDOW);

    let retention_anchor =
        (parent.retention_rate * (0.9 + 0.22 * traits.identity_alignment)).clamp(0.55, 0.99);
    let retention_monthly = Draw::new(retention_anchor, 0.03, 0.5, 0.995).series(rng, MONTHLY_WINDOW);

    let churn_anchor =
        (parent.churn_shock * (0.85 + 0.28 * (1.0 - traits.identity_alignment))).clamp(0.01, 0.25);
    let churn_events = Draw::new(churn_anchor, 0.012, 0.005, 0.24).series(rng, CHURN_WINDOW);

    let schedule_anchor = (parent.schedule_volatility
        * (1.0 + 0.15 * (1.05 - traits.authenticity_signal)))
        .clamp(0.02, 0.34);
    let schedule_volatility_daily =
        Draw::new(schedule_anchor, 0.018, 0.015, 0.35).series(rng, DAILY_WINDOW);

    RawSeries {
        sentiment_daily,
        interactions_daily,
        content_similarity_daily,
        share_rate_daily,
        retention_monthly,
        churn_events,
        schedule_volatility_daily,
    }
}

/// One bounded random-walk step for every window of a series.
///
/// Each draw is centered on the previous *summary* value (not resampled from
/// scratch), so consecutive snapshots stay correlated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WalkPlan {
    pub sentiment: Draw,
    pub interactions: CountDraw,
    pub content_similarity: Draw,
    pub share_rate: Draw,
    pub retention: Draw,
    pub churn: Draw,
    pub schedule_volatility: Draw,
}

impl WalkPlan {
    /// Walk parameters for an organization.
    pub fn for_organization(previous: &RawInputs) -> Self {
        Self {
            sentiment: Draw::new(previous.sentiment_mean, 0.04, 0.15, 0.99),
            interactions: CountDraw::new(
                previous.interactions_weekly,
                previous.interactions_weekly * 0.18,
                8_000,
            ),
            content_similarity: Draw::new(previous.content_similarity, 0.035, 0.3, 0.99),
            share_rate: Draw::new(previous.share_rate, 0.03, 0.04, 0.55),
            retention: Draw::new(previous.retention_rate, 0.02, 0.55, 0.99),
            churn: Draw::new(previous.churn_shock, 0.015, 0.01, 0.25),
            schedule_volatility: Draw::new(previous.schedule_volatility, 0.02, 0.02, 0.32),
        }
    }

    /// Walk parameters for an individual; centers are nudged by traits.
    pub fn for_individual(previous: &RawInputs, traits: &TraitVector) -> Self {
        let interaction_mu = (previous.interactions_weekly
            * (0.92 + 0.18 * (traits.network_multiplier - 1.0)))
            .max(3_500.0);
        let similarity_mu = (previous.content_similarity
            * (0.96 + 0.15 * (traits.identity_alignment - 0.75)))
            .clamp(0.25, 0.99);
        let share_mu = (previous.share_rate * (0.95 + 0.18 * (traits.network_multiplier - 1.0)))
            .clamp(0.04, 0.62);
        let retention_mu =
            (previous.retention_rate * (0.95 + 0.15 * traits.identity_alignment)).clamp(0.55, 0.995);
        let churn_mu = (previous.churn_shock * (0.95 + 0.22 * (1.0 - traits.identity_alignment)))
            .clamp(0.01, 0.28);
        let schedule_mu = (previous.schedule_volatility
            * (0.98 + 0.15 * (1.05 - traits.authenticity_signal)))
            .clamp(0.02, 0.34);

        Self {
            sentiment: Draw::new(previous.sentiment_mean, 0.045, 0.12, 0.99),
            interactions: CountDraw::new(interaction_mu, interaction_mu * 0.2, 2_500),
            content_similarity: Draw::new(similarity_mu, 0.035, 0.2, 0.99),
            share_rate: Draw::new(share_mu, 0.028, 0.02, 0.6),
            retention: Draw::new(retention_mu, 0.025, 0.5, 0.995),
            churn: Draw::new(churn_mu, 0.01, 0.005, 0.27),
            schedule_volatility: Draw::new(schedule_mu, 0.016, 0.015, 0.35),
        }
    }

    /// Draws one sample per window (in a fixed order) and rolls each window.
    pub fn step(&self, rng: &mut SeedStream, previous: &RawSeries) -> RawSeries {
        let sentiment = self.sentiment.sample(rng);
        let interactions = self.interactions.sample(rng);
        let content_similarity = self.content_similarity.sample(rng);
        let share_rate = self.share_rate.sample(rng);
        let retention = self.retention.sample(rng);
        let churn = self.churn.sample(rng);
        let schedule_volatility = self.schedule_volatility.sample(rng);

        RawSeries {
            sentiment_daily: roll(&previous.sentiment_daily, sentiment),
            interactions_daily: roll(&previous.interactions_daily, interactions),
            content_similarity_daily: roll(&previous.content_similarity_daily, content_similarity),
            share_rate_daily: roll(&previous.share_rate_daily, share_rate),
            retention_monthly: roll(&previous.retention_monthly, retention),
            churn_events: roll(&previous.churn_events, churn),
            schedule_volatility_daily: roll(&previous.schedule_volatility_daily, schedule_volatility),
        }
    }
}

/// Drops the oldest entry and appends `value`. Empty windows stay empty.
fn roll<T: Copy>(window: &[T], value: T) -> Vec<T> {
    if window.is_empty() {
        return Vec::new();
    }
    let mut rolled = Vec::with_capacity(window.len());
    rolled.extend_from_slice(&window[1..]);
    rolled.push(value);
    rolled
}
