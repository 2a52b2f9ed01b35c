use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Project maturity filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStage {
    Idea,
    Prototype,
    Mvp,
    Launched,
    Growth,
}

impl ProjectStage {
    /// Stable wire value used for the `project_stage` query parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idea => "idea",
            Self::Prototype => "prototype",
            Self::Mvp => "mvp",
            Self::Launched => "launched",
            Self::Growth => "growth",
        }
    }
}

impl fmt::Display for ProjectStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProjectStage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "idea" => Ok(Self::Idea),
            "prototype" => Ok(Self::Prototype),
            "mvp" => Ok(Self::Mvp),
            "launched" => Ok(Self::Launched),
            "growth" => Ok(Self::Growth),
            other => Err(format!("unknown project stage '{}'", other)),
        }
    }
}

/// Active discovery filters. Empty fields are not sent to the backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCriteria {
    pub search: String,
    pub location: String,
    pub looking_for: String,
    pub project_stage: Option<ProjectStage>,
    pub skills: Vec<String>,
}

impl FilterCriteria {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Merge `update` into these criteria and report how the change
    /// should reach the feed.
    pub fn apply(&mut self, update: FilterUpdate) -> Propagation {
        let mut propagation = Propagation::Unchanged;

        let text_fields = [
            (&mut self.search, update.search),
            (&mut self.location, update.location),
            (&mut self.looking_for, update.looking_for),
        ];
        for (field, value) in text_fields {
            if let Some(value) = value {
                if *field != value {
                    *field = value;
                    propagation = propagation.merge(Propagation::Debounced);
                }
            }
        }

        if let Some(stage) = update.project_stage {
            if self.project_stage != stage {
                self.project_stage = stage;
                propagation = propagation.merge(Propagation::Immediate);
            }
        }

        if let Some(skills) = update.skills {
            if self.skills != skills {
                self.skills = skills;
                propagation = propagation.merge(Propagation::Immediate);
            }
        }

        propagation
    }
}

/// Partial filter edit. `None` leaves the field as it is.
///
/// `project_stage: Some(None)` clears the stage filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterUpdate {
    pub search: Option<String>,
    pub location: Option<String>,
    pub looking_for: Option<String>,
    pub project_stage: Option<Option<ProjectStage>>,
    pub skills: Option<Vec<String>>,
}

impl FilterUpdate {
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_looking_for(mut self, looking_for: impl Into<String>) -> Self {
        self.looking_for = Some(looking_for.into());
        self
    }

    pub fn with_stage(mut self, stage: Option<ProjectStage>) -> Self {
        self.project_stage = Some(stage);
        self
    }

    pub fn with_skills<I, S>(mut self, skills: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.skills = Some(skills.into_iter().map(Into::into).collect());
        self
    }
}

/// Compatibility questionnaire answers: question id → selected option.
///
/// An empty vector disables server-side scoring.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PreferenceVector(BTreeMap<String, String>);

impl PreferenceVector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, question: impl Into<String>, option: impl Into<String>) {
        self.0.insert(question.into(), option.into());
    }

    pub fn with(mut self, question: impl Into<String>, option: impl Into<String>) -> Self {
        self.set(question, option);
        self
    }

    pub fn get(&self, question: &str) -> Option<&str> {
        self.0.get(question).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// How a criteria mutation reaches the feed.
///
/// Ordered so that combining two changes keeps the more urgent one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Propagation {
    /// Nothing changed; no refetch.
    Unchanged,
    /// Free-text edit; refetch after the debounce quiet period.
    Debounced,
    /// Enumerable filter or preference change; refetch now.
    Immediate,
}

impl Propagation {
    pub fn merge(self, other: Propagation) -> Propagation {
        self.max(other)
    }
}

/// Event emitted by the criteria store on every mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct CriteriaChange {
    pub criteria: FilterCriteria,
    pub preferences: PreferenceVector,
    pub propagation: Propagation,
}
