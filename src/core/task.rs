use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Identifier assigned by the task store. The client never makes one up
/// and never looks inside it beyond printing it into a URL.
///
/// Any JSON number or string is accepted. Stores differ on which they use,
/// so `7` and `"7"` compare equal.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TaskId {
    Number(serde_json::Number),
    Text(String),
}

impl TaskId {
    pub fn number(n: i64) -> Self {
        Self::Number(n.into())
    }
}

impl PartialEq for TaskId {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => a == b,
            (Self::Text(a), Self::Text(b)) => a == b,
            (Self::Number(n), Self::Text(s)) | (Self::Text(s), Self::Number(n)) => {
                *s == n.to_string()
            }
        }
    }
}

impl Eq for TaskId {}

impl Hash for TaskId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.to_string().hash(state);
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", n),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl FromStr for TaskId {
    type Err = std::convert::Infallible;

    /// Integers become `Number`; anything else stays text and still matches
    /// a numeric id with the same printed form.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(n) = s.parse::<i64>() {
            return Ok(Self::Number(n.into()));
        }
        if let Ok(n) = s.parse::<u64>() {
            return Ok(Self::Number(n.into()));
        }
        Ok(Self::Text(s.to_string()))
    }
}

impl From<&str> for TaskId {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[default]
    #[serde(rename = "Next Actions")]
    NextActions,
    #[serde(rename = "Waiting For")]
    WaitingFor,
    #[serde(rename = "Someday-Maybe")]
    SomedayMaybe,
}

impl Category {
    pub const ALL: [Category; 3] = [Self::NextActions, Self::WaitingFor, Self::SomedayMaybe];

    /// The label used on the wire and in the category menu.
    pub fn as_label(&self) -> &'static str {
        match self {
            Self::NextActions => "Next Actions",
            Self::WaitingFor => "Waiting For",
            Self::SomedayMaybe => "Someday-Maybe",
        }
    }

    /// Accepts the wire label as well as the short forms typed on the command line.
    pub fn from_label(s: &str) -> Option<Self> {
        let normalized = s.trim().to_ascii_lowercase().replace(['_', ' ', '/'], "-");
        match normalized.as_str() {
            "next-actions" | "next" => Some(Self::NextActions),
            "waiting-for" | "waiting" => Some(Self::WaitingFor),
            "someday-maybe" | "someday" | "maybe" => Some(Self::SomedayMaybe),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_label(s).ok_or_else(|| {
            let labels: Vec<&str> = Self::ALL.iter().map(|c| c.as_label()).collect();
            format!("unknown category '{}' (expected one of: {})", s, labels.join(", "))
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub text: String,
    #[serde(default)]
    pub category: Category,
    #[serde(default)]
    pub completed: bool,
}

impl Task {
    pub fn new(id: TaskId, text: impl Into<String>, category: Category) -> Self {
        Self {
            id,
            text: text.into(),
            category,
            completed: false,
        }
    }
}

/// Body of `POST /tasks`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewTask {
    pub text: String,
    pub category: Category,
}

impl NewTask {
    /// Trims `text`; returns `None` when nothing is left to submit.
    pub fn new(text: &str, category: Category) -> Option<Self> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        Some(Self {
            text: text.to_string(),
            category,
        })
    }
}

/// Body of `PATCH /tasks/{id}`.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryPatch {
    pub category: Category,
}

/// Body of `PATCH /tasks/{id}/completed`.
#[derive(Debug, Clone, Serialize)]
pub struct CompletedPatch {
    pub completed: bool,
}
