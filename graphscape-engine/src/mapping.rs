// Field-role mapping and keyword-based suggestion

use serde::{Deserialize, Serialize};

/// Keywords recognized for the `source` role, in priority order.
pub const SOURCE_KEYWORDS: [&str; 11] = [
    "source",
    "src",
    "from",
    "start",
    "u",
    "origin",
    "author",
    "sender",
    "user",
    "initiator",
    "subject",
];

/// Keywords recognized for the `target` role, in priority order.
pub const TARGET_KEYWORDS: [&str; 10] = [
    "target",
    "tgt",
    "to",
    "end",
    "v",
    "dest",
    "destination",
    "receiver",
    "recipient",
    "object",
];

/// Keywords recognized for the `weight` role, in priority order.
pub const WEIGHT_KEYWORDS: [&str; 8] = [
    "weight", "poids", "value", "score", "w", "count", "cost", "strength",
];

/// Assignment of input field names to the semantic roles `source`, `target`
/// and `weight`. An absent weight means every edge gets weight 1.0.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mapping {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<String>,
}

impl Mapping {
    /// Propose a mapping from field names alone.
    ///
    /// Each role scans its keyword list in priority order against the
    /// lowercased field names; the first keyword with any match decides the
    /// role. The first matching keyword wins, not the first matching field:
    /// with columns `[from, src]` the source role resolves to `src`.
    pub fn suggest(fields: &[String]) -> Mapping {
        let lowered: Vec<(String, &String)> =
            fields.iter().map(|f| (f.to_lowercase(), f)).collect();
        let find = |keywords: &[&str]| {
            keywords.iter().find_map(|keyword| {
                lowered
                    .iter()
                    .find(|(lower, _)| lower == keyword)
                    .map(|(_, field)| (*field).clone())
            })
        };
        Mapping {
            source: find(&SOURCE_KEYWORDS),
            target: find(&TARGET_KEYWORDS),
            weight: find(&WEIGHT_KEYWORDS),
        }
    }

    /// Fill unset roles from suggestions derived from `fields`. Explicitly
    /// assigned roles always take precedence over the heuristic.
    pub fn resolved(&self, fields: &[String]) -> Mapping {
        let suggested = Mapping::suggest(fields);
        Mapping {
            source: self.source.clone().or(suggested.source),
            target: self.target.clone().or(suggested.target),
            weight: self.weight.clone().or(suggested.weight),
        }
    }

    /// True when both required roles are assigned.
    pub fn is_complete(&self) -> bool {
        self.source.is_some() && self.target.is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.source.is_none() && self.target.is_none() && self.weight.is_none()
    }
}
