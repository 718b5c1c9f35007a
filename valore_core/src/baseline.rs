//! Fixed baseline records the engine perturbs at construction.
//!
//! Identity fields (ids, names, categories) are copied verbatim; numeric
//! fields are jittered by the entity generator.

use crate::model::{Individual, Organization, OrganizationMetrics, TraitVector};

/// A baseline matchup before jitter.
#[derive(Debug, Clone, PartialEq)]
pub struct BaselineScenario {
    pub organization_id: String,
    pub opponent: String,
    pub win_probability: f64,
    pub uplift: f64,
}

/// Every static table the engine draws from.
#[derive(Debug, Clone, PartialEq)]
pub struct BaselineCatalog {
    pub organizations: Vec<Organization>,
    pub individuals: Vec<Individual>,
    pub scenarios: Vec<BaselineScenario>,

    /// Highlights that may be appended to an organization
    pub highlight_pool: Vec<String>,

    /// Flavor text for feed items
    pub social_platforms: Vec<String>,
    pub news_outlets: Vec<String>,
    pub performance_trackers: Vec<String>,
}

// (id, name, conference, tier, reach, baseline valuation, highlights)
const ORGANIZATIONS: [(&str, &str, &str, &str, f64, f64, [&str; 2]); 9] = [
    ("auburn_mbb", "Auburn Men's Basketball", "SEC", "Power 5", 0.73, 4_200_000.0,
        ["Auburn Family Network", "Regional Sponsor Ecosystem"]),
    ("sacstate_mbb", "Sacramento State Men's Basketball", "Big Sky", "Mid-Major", 0.55, 1_800_000.0,
        ["Capitol Corporate Partners", "NorCal Alumni Hub"]),
    ("houston_mbb", "Houston Men's Basketball", "Big 12", "Power 5", 0.77, 4_600_000.0,
        ["Urban Sponsor Grid", "Legacy NBA Pipeline"]),
    ("gonzaga_mbb", "Gonzaga Men's Basketball", "WCC", "Mid-Major", 0.74, 4_000_000.0,
        ["National Mid-Major Loyalists", "Pacific Northwest Corporate Ties"]),
    ("kansas_mbb", "Kansas Men's Basketball", "Big 12", "Power 5", 0.83, 5_200_000.0,
        ["Rock Chalk Collective", "Historic Blueblood Market"]),
    ("villanova_mbb", "Villanova Men's Basketball", "Big East", "Power 5", 0.68, 3_500_000.0,
        ["Philly Main Line Network", "Northeast Brand Portfolio"]),
    ("southcarolina_wbb", "South Carolina Women's Basketball", "SEC", "Power 5", 0.81, 3_800_000.0,
        ["Women's Sports Leadership", "Columbia Corporate Partners"]),
    ("stanford_wbb", "Stanford Women's Basketball", "Pac-12", "Power 5", 0.71, 3_200_000.0,
        ["Silicon Valley Innovation Partners", "Academic Prestige"]),
    ("louisville_wbb", "Louisville Women's Basketball", "ACC", "Power 5", 0.72, 3_000_000.0,
        ["Derby City Sponsor Belt", "Women-Owned Business Coalition"]),
];

const PHASE: &str = "Phase 1 Basketball POC";

// (id, organization, name, position, archetype, class year,
//  [parasocial, identity, authenticity, network], notes)
type IndividualRow = (&'static str, &'static str, &'static str, &'static str, &'static str,
    &'static str, [f64; 4], [&'static str; 2]);

const INDIVIDUALS: [IndividualRow; 9] = [
    ("auburn_guard", "auburn_mbb", "Jalen Carter", "Guard", "Playmaker", "Sophomore",
        [0.86, 0.81, 0.88, 1.27],
        ["Weekly livestream Q&A maintains direct fan intimacy",
         "Shared hometown roots with 40% of the local fanbase"]),
    ("sacstate_forward", "sacstate_mbb", "Miguel Alvarez", "Forward", "Connector", "Junior",
        [0.78, 0.74, 0.82, 1.19],
        ["Vlog series drives sustained engagement across NorCal campuses",
         "Bilingual outreach expands sponsor resonance"]),
    ("houston_guard", "houston_mbb", "Marcus Reed", "Guard", "Closer", "Senior",
        [0.84, 0.79, 0.90, 1.31],
        ["Post-game analysis threads trend nationally",
         "Disaster relief activism elevates trust metrics"]),
    ("gonzaga_center", "gonzaga_mbb", "Leo Markovic", "Center", "Anchor", "Sophomore",
        [0.73, 0.77, 0.80, 1.22],
        ["Global student audience taps into weekly analytics podcast",
         "International heritage fosters expanded donor outreach"]),
    ("kansas_wing", "kansas_mbb", "Devon Ellis", "Wing", "Emergent Star", "Freshman",
        [0.82, 0.85, 0.87, 1.29],
        ["Interactive NIL journey polls create participatory fandom",
         "Legacy families cite relatable upbringing"]),
    ("villanova_guard", "villanova_mbb", "Chris Donnelly", "Guard", "Mentor", "Senior",
        [0.76, 0.72, 0.83, 1.18],
        ["Podcast breakdowns reinforce basketball IQ perception",
         "Literacy advocacy builds trust with parent demographics"]),
    ("southcarolina_guard", "southcarolina_wbb", "Amara Fields", "Guard", "Catalyst", "Junior",
        [0.89, 0.87, 0.91, 1.33],
        ["Triple-double narratives trend across women's sports media",
         "Equity keynote cements leadership positioning"]),
    ("stanford_forward", "stanford_wbb", "Riley Chen", "Forward", "Innovator", "Senior",
        [0.80, 0.83, 0.92, 1.26],
        ["STEM scholarship campaign deepens alumni pride",
         "Wellness app fosters peer-to-peer community growth"]),
    ("louisville_guard", "louisville_wbb", "Tiana Brooks", "Guard", "Storyteller", "Sophomore",
        [0.77, 0.82, 0.85, 1.21],
        ["Mentorship vignettes resonate with women-owned businesses",
         "Mental health storytelling elevates authenticity perception"]),
];

// (organization, opponent, win probability, uplift)
const SCENARIOS: [(&str, &str, f64, f64); 9] = [
    ("auburn_mbb", "Kentucky", 0.68, 0.14),
    ("sacstate_mbb", "Montana", 0.58, 0.11),
    ("houston_mbb", "Baylor", 0.72, 0.17),
    ("gonzaga_mbb", "Saint Mary's", 0.64, 0.12),
    ("kansas_mbb", "Duke", 0.70, 0.16),
    ("villanova_mbb", "Seton Hall", 0.60, 0.10),
    ("southcarolina_wbb", "LSU", 0.76, 0.19),
    ("stanford_wbb", "UCLA", 0.69, 0.15),
    ("louisville_wbb", "Notre Dame", 0.63, 0.13),
];

const HIGHLIGHT_POOL: [&str; 5] = [
    "Immersive XR fan showcases",
    "Collective-funded mental health concierge",
    "AI-personalized alumni outreach",
    "Women's sports equity campaign",
    "Regional brand accelerator studio",
];

const SOCIAL_PLATFORMS: [&str; 5] = ["TikTok", "Instagram", "YouTube Shorts", "Twitter/X", "Twitch"];

const NEWS_OUTLETS: [&str; 5] = [
    "ESPN Insider",
    "The Athletic",
    "CampusHQ",
    "Sports Business Journal",
    "College Hoops Report",
];

const PERFORMANCE_TRACKERS: [&str; 4] = [
    "Synergy Analytics",
    "Second Spectrum",
    "HustleBoard",
    "CourtVision AI",
];

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl BaselineCatalog {
    /// The nine-program basketball catalog.
    pub fn standard() -> Self {
        let organizations = ORGANIZATIONS
            .iter()
            .map(|(id, name, conference, tier, reach, valuation, highlights)| Organization {
                id: id.to_string(),
                name: name.to_string(),
                conference: conference.to_string(),
                tier: tier.to_string(),
                phase: PHASE.to_string(),
                metrics: OrganizationMetrics {
                    reach: *reach,
                    baseline_valuation: *valuation,
                    highlights: owned(highlights),
                },
            })
            .collect();

        let individuals = INDIVIDUALS
            .iter()
            .map(|(id, org, name, position, archetype, class_year, traits, notes)| Individual {
                id: id.to_string(),
                organization_id: org.to_string(),
                name: name.to_string(),
                position: position.to_string(),
                archetype: archetype.to_string(),
                class_year: class_year.to_string(),
                traits: TraitVector {
                    parasocial_strength: traits[0],
                    identity_alignment: traits[1],
                    authenticity_signal: traits[2],
                    network_multiplier: traits[3],
                },
                notes: owned(notes),
            })
            .collect();

        let scenarios = SCENARIOS
            .iter()
            .map(|(org, opponent, win_probability, uplift)| BaselineScenario {
                organization_id: org.to_string(),
                opponent: opponent.to_string(),
                win_probability: *win_probability,
                uplift: *uplift,
            })
            .collect();

        Self {
            organizations,
            individuals,
            scenarios,
            highlight_pool: owned(&HIGHLIGHT_POOL),
            social_platforms: owned(&SOCIAL_PLATFORMS),
            news_outlets: owned(&NEWS_OUTLETS),
            performance_trackers: owned(&PERFORMANCE_TRACKERS),
        }
    }

    /// Baseline individual ids grouped by organization, in first-seen order.
    pub fn roster_by_organization(&self) -> Vec<(String, Vec<String>)> {
        let mut roster: Vec<(String, Vec<String>)> = Vec::new();
        for individual in &self.individuals {
            match roster.iter_mut().find(|(org, _)| *org == individual.organization_id) {
                Some((_, ids)) => ids.push(individual.id.clone()),
                None => roster.push((individual.organization_id.clone(), vec![individual.id.clone()])),
            }
        }
        roster
    }
}

impl Default for BaselineCatalog {
    fn default() -> Self {
        Self::standard()
    }
}
