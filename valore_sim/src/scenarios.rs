//! Invariant scenarios for the synthetic engine.

use serde::{Deserialize, Serialize};

/// Scenario identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioId {
    /// INV-001: Same seed, same dataset and same advancement results
    Determinism,

    /// INV-002: Every score stays inside its clamp band
    RangeBands,

    /// INV-003: Valuations are multiples of 10,000
    ValuationQuantization,

    /// INV-004: Series windows keep their lengths under advancement
    RollingWindow,

    /// INV-005: Diffs equal new minus old, exactly
    DiffConsistency,

    /// INV-006: Feed history and visible slices stay capped
    FeedCap,

    /// INV-007: Engines with the same seed never share random state
    ReplayIsolation,

    /// INV-008: Unknown ids yield absence or an explicit error
    UnknownEntity,

    /// INV-009: Timelines end in a bias alert exactly when fairness is low
    FairnessGate,
}

impl ScenarioId {
    /// Returns a list of all scenarios.
    pub fn all() -> Vec<ScenarioId> {
        vec![
            ScenarioId::Determinism,
            ScenarioId::RangeBands,
            ScenarioId::ValuationQuantization,
            ScenarioId::RollingWindow,
            ScenarioId::DiffConsistency,
            ScenarioId::FeedCap,
            ScenarioId::ReplayIsolation,
            ScenarioId::UnknownEntity,
            ScenarioId::FairnessGate,
        ]
    }

    /// Returns the scenario name.
    pub fn name(&self) -> &'static str {
        match self {
            ScenarioId::Determinism => "determinism",
            ScenarioId::RangeBands => "range_bands",
            ScenarioId::ValuationQuantization => "valuation_quantization",
            ScenarioId::RollingWindow => "rolling_window",
            ScenarioId::DiffConsistency => "diff_consistency",
            ScenarioId::FeedCap => "feed_cap",
            ScenarioId::ReplayIsolation => "replay_isolation",
            ScenarioId::UnknownEntity => "unknown_entity",
            ScenarioId::FairnessGate => "fairness_gate",
        }
    }

    /// Returns a description of the scenario.
    pub fn description(&self) -> &'static str {
        match self {
            ScenarioId::Determinism => "Two engines from one seed agree field-for-field, before and after advancing",
            ScenarioId::RangeBands => "Fairness, compliance, velocity and every component stay in their bands",
            ScenarioId::ValuationQuantization => "Organization, individual and consensus valuations are multiples of 10,000",
            ScenarioId::RollingWindow => "30/4/3-entry windows keep their length over many advances",
            ScenarioId::DiffConsistency => "Every diff field equals new snapshot field minus old, exactly",
            ScenarioId::FeedCap => "Stored feeds hold at most 10 items, exposed slices at most 8",
            ScenarioId::ReplayIsolation => "Fresh engines with one seed produce byte-identical first diffs",
            ScenarioId::UnknownEntity => "Unknown organization ids never panic and never mutate state",
            ScenarioId::FairnessGate => "bias_alert below 0.94 fairness, insight otherwise, never both",
        }
    }
}

impl std::fmt::Display for ScenarioId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for ScenarioId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "determinism" | "inv-001" => Ok(ScenarioId::Determinism),
            "range_bands" | "rangebands" | "inv-002" => Ok(ScenarioId::RangeBands),
            "valuation_quantization" | "quantization" | "inv-003" => {
                Ok(ScenarioId::ValuationQuantization)
            }
            "rolling_window" | "rollingwindow" | "inv-004" => Ok(ScenarioId::RollingWindow),
            "diff_consistency" | "diffconsistency" | "inv-005" => Ok(ScenarioId::DiffConsistency),
            "feed_cap" | "feedcap" | "inv-006" => Ok(ScenarioId::FeedCap),
            "replay_isolation" | "replayisolation" | "inv-007" => Ok(ScenarioId::ReplayIsolation),
            "unknown_entity" | "unknownentity" | "inv-008" => Ok(ScenarioId::UnknownEntity),
            "fairness_gate" | "fairnessgate" | "inv-009" => Ok(ScenarioId::FairnessGate),
            _ => Err(format!("Unknown scenario: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip_through_from_str() {
        for scenario in ScenarioId::all() {
            assert_eq!(scenario.name().parse::<ScenarioId>(), Ok(scenario));
            assert!(!scenario.description().is_empty());
        }
    }

    #[test]
    fn test_aliases() {
        assert_eq!("INV-003".parse::<ScenarioId>(), Ok(ScenarioId::ValuationQuantization));
        assert_eq!("FeedCap".parse::<ScenarioId>(), Ok(ScenarioId::FeedCap));
        assert!("split_brain".parse::<ScenarioId>().is_err());
    }
}
