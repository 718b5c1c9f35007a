//! One-shot multi-perspective evaluation timeline.
//!
//! Four evidence events, one consensus event, then exactly one of a bias
//! alert (fairness index below [`FAIRNESS_ALERT_THRESHOLD`]) or an insight.
//! Each event carries an advisory delay; nothing here sleeps.

use crate::rng::SeedStream;
use crate::scoring::{round_places, round_valuation, Band};
use crate::snapshot::BehavioralSnapshot;
use serde::{Deserialize, Serialize};

/// Fairness index below which the timeline ends in a bias alert.
pub const FAIRNESS_ALERT_THRESHOLD: f64 = 0.94;

const MARKET_CONFIDENCE_BAND: Band = Band::new(0.4, 0.97);
const CONSENSUS_CONFIDENCE_BAND: Band = Band::new(0.55, 0.98);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Evidence,
    Consensus,
    Insight,
    BiasAlert,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
}

/// One perspective's supporting evidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidencePayload {
    pub agent: String,
    pub confidence: f64,
    pub rationale: String,
    pub data_points: Vec<String>,
}

/// The combined verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsensusPayload {
    /// Multiple of 10,000
    pub valuation: f64,
    pub confidence: f64,
    pub notes: Vec<String>,
}

/// Fairness outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoticePayload {
    pub message: String,
    pub severity: Severity,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EventPayload {
    Evidence(EvidencePayload),
    Consensus(ConsensusPayload),
    Notice(NoticePayload),
}

/// A timed timeline step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEvent {
    #[serde(rename = "type")]
    pub kind: EventKind,

    /// Advisory pause before emitting, in seconds
    #[serde(rename = "delay")]
    pub delay_secs: f64,

    pub payload: EventPayload,
}

impl TimelineEvent {
    fn evidence(
        delay_secs: f64,
        agent: &str,
        confidence: f64,
        rationale: &str,
        data_points: Vec<String>,
    ) -> Self {
        Self {
            kind: EventKind::Evidence,
            delay_secs,
            payload: EventPayload::Evidence(EvidencePayload {
                agent: agent.to_string(),
                confidence,
                rationale: rationale.to_string(),
                data_points,
            }),
        }
    }
}

/// Formats a currency amount as `$1,234,567`.
pub fn format_currency(amount: f64) -> String {
    let whole = amount.round() as i64;
    let digits = whole.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if whole < 0 {
        format!("-${}", grouped)
    } else {
        format!("${}", grouped)
    }
}

/// Builds the evaluation timeline for an organization snapshot.
///
/// A non-positive or absent `valuation_anchor` falls back to the snapshot's
/// own valuation projection. Delays are drawn in event order.
pub fn build_timeline(
    rng: &mut SeedStream,
    snapshot: &BehavioralSnapshot,
    valuation_anchor: Option<f64>,
) -> Vec<TimelineEvent> {
    let s = &snapshot.scores;
    let anchor = valuation_anchor
        .filter(|v| v.is_finite() && *v > 0.0)
        .unwrap_or(s.valuation_projection);
    let anchor = round_valuation(anchor);

    let mut events = Vec::with_capacity(6);

    events.push(TimelineEvent::evidence(
        rng.uniform(0.05, 0.15),
        "Psychology",
        round_places(s.resonance_score, 2),
        "Parasocial and identity signals show resilient fan attachment",
        vec![
            format!("EI:{:.2}", s.resonance_components.emotional_intensity),
            format!("IF:{:.2}", s.resonance_components.identity_fusion),
            format!("CR:{:.2}", s.resonance_components.content_resonance),
        ],
    ));

    events.push(TimelineEvent::evidence(
        rng.uniform(0.08, 0.18),
        "Brand Alignment",
        round_places(s.authenticity_score, 2),
        "Messaging consistency and value alignment remain above threshold",
        vec![
            format!("Consistency:{:.2}", s.authenticity_components.consistency),
            format!("ValueAlignment:{:.2}", s.authenticity_components.value_alignment),
        ],
    ));

    events.push(TimelineEvent::evidence(
        rng.uniform(0.05, 0.14),
        "Market Intelligence",
        round_places(MARKET_CONFIDENCE_BAND.clamp(0.72 + s.sponsor_velocity * 0.1), 2),
        "Sponsor velocity and collective funding outlook support uplift",
        vec![
            format!("sponsor_velocity:+{:.1}%", s.sponsor_velocity * 100.0),
            format!("valuation_projection:{}", format_currency(s.valuation_projection)),
        ],
    ));

    events.push(TimelineEvent::evidence(
        rng.uniform(0.06, 0.12),
        "Compliance",
        round_places(1.0 - s.compliance_risk, 2),
        "Disclosure cadence and audit posture meet NIL policy benchmarks",
        vec![
            format!("compliance_risk:{:.2}", s.compliance_risk),
            format!("fairness_index:{:.2}", s.fairness_index),
        ],
    ));

    let fairness_adjustment = (s.fairness_index - 0.95) * 0.05;
    let resonance_adjustment = (s.resonance_score - 0.8) * 0.08;
    let confidence =
        CONSENSUS_CONFIDENCE_BAND.clamp(0.78 + fairness_adjustment + resonance_adjustment);
    let valuation =
        round_valuation(anchor * (1.0 + resonance_adjustment + s.sponsor_velocity * 0.12));
    events.push(TimelineEvent {
        kind: EventKind::Consensus,
        delay_secs: rng.uniform(0.05, 0.1),
        payload: EventPayload::Consensus(ConsensusPayload {
            valuation,
            confidence: round_places(confidence, 3),
            notes: vec![
                "Consensus formed using synthetic agent emulation".to_string(),
                "Adjust scenario knobs to explore alternative negotiations".to_string(),
            ],
        }),
    });

    let parity = s.fairness_index * 100.0;
    let (kind, message, severity) = if s.fairness_index < FAIRNESS_ALERT_THRESHOLD {
        (
            EventKind::BiasAlert,
            format!("Fairness watch: demographic parity at {:.1}%.", parity),
            Severity::Warning,
        )
    } else {
        (
            EventKind::Insight,
            format!("Fairness check complete: demographic parity {:.1}%.", parity),
            Severity::Info,
        )
    };
    events.push(TimelineEvent {
        kind,
        delay_secs: rng.uniform(0.04, 0.08),
        payload: EventPayload::Notice(NoticePayload { message, severity }),
    });

    events
}
