//! Wire types exchanged with the discovery backend.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::criteria::{FilterCriteria, PreferenceVector};
use crate::swipe::SwipeDecision;

/// A single feed entry: a matchable founder with their projects.
///
/// Fields the core doesn't interpret are kept verbatim in `attributes`
/// for the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    #[serde(alias = "user_id", deserialize_with = "id_string")]
    pub founder_id: String,
    #[serde(default)]
    pub projects: Vec<ProjectRef>,
    /// Server-computed compatibility (0-100). Never re-sorted client-side.
    #[serde(
        rename = "preference_score",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub compatibility_score: Option<f64>,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl Candidate {
    pub fn new(id: impl Into<String>, founder_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            founder_id: founder_id.into(),
            projects: Vec::new(),
            compatibility_score: None,
            attributes: Map::new(),
        }
    }

    pub fn with_project(mut self, project_id: impl Into<String>) -> Self {
        self.projects.push(ProjectRef {
            id: project_id.into(),
            attributes: Map::new(),
        });
        self
    }

    pub fn with_score(mut self, score: f64) -> Self {
        self.compatibility_score = Some(score);
        self
    }

    /// The project a swipe is recorded against, if the founder has one.
    pub fn primary_project_id(&self) -> Option<&str> {
        self.projects.first().map(|p| p.id.as_str())
    }

    /// Display name, when the backend provides one.
    pub fn display_name(&self) -> Option<&str> {
        ["name", "full_name", "display_name"]
            .iter()
            .find_map(|key| self.attributes.get(*key).and_then(Value::as_str))
    }
}

/// Project embedded in a candidate record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectRef {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

/// Backends disagree on numeric vs string ids; normalize to strings.
fn id_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {}",
            other
        ))),
    }
}

/// One page of fetch results.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedPage {
    pub candidates: Vec<Candidate>,
    /// True when the backend returned fewer candidates than requested.
    pub exhausted: bool,
}

impl FeedPage {
    pub fn from_response(candidates: Vec<Candidate>, page_size: usize) -> Self {
        let exhausted = candidates.len() < page_size;
        Self {
            candidates,
            exhausted,
        }
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

/// Parameters of a single page fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct PageRequest {
    pub criteria: FilterCriteria,
    pub preferences: PreferenceVector,
    /// Offset into the result set (total already fetched this epoch).
    pub cursor: usize,
    pub page_size: usize,
}

impl PageRequest {
    /// Query parameters for the discovery endpoint.
    ///
    /// Empty text filters are omitted; skills repeat; preferences are a
    /// JSON object and only sent when non-empty.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        let criteria = &self.criteria;

        for (key, value) in [
            ("search", &criteria.search),
            ("location", &criteria.location),
        ] {
            if !value.trim().is_empty() {
                pairs.push((key, value.trim().to_string()));
            }
        }
        if let Some(stage) = criteria.project_stage {
            pairs.push(("project_stage", stage.as_str().to_string()));
        }
        if !criteria.looking_for.trim().is_empty() {
            pairs.push(("looking_for", criteria.looking_for.trim().to_string()));
        }
        for skill in &criteria.skills {
            pairs.push(("skills", skill.clone()));
        }

        if !self.preferences.is_empty() {
            let object: Map<String, Value> = self
                .preferences
                .iter()
                .map(|(question, option)| (question.to_string(), Value::from(option)))
                .collect();
            pairs.push(("preferences", Value::Object(object).to_string()));
        }

        pairs.push(("offset", self.cursor.to_string()));
        pairs.push(("limit", self.page_size.to_string()));
        pairs.push(("discover", "true".to_string()));
        pairs
    }
}

/// Body of the swipe-recording request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SwipeRequest {
    /// Founder the decision is recorded against.
    pub swiped_id: String,
    pub swipe_type: SwipeDecision,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
}

/// Response of the swipe-recording endpoint.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SwipeResponse {
    #[serde(default)]
    pub match_created: bool,
}
