use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::{BTreeMap, BTreeSet};
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Disabled {
    Disabled,
}

/// Per-handler setting in the persisted form: a priority, or `"disabled"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PrioritySetting {
    Priority(i32),
    Disabled(Disabled),
}

/// Persisted configuration of the registry.
///
/// ```json
/// { "priorities": { "guishop": 100, "legacy-shop": "disabled" },
///   "generous": "guishop economy++" }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigTable {
    #[serde(default)]
    pub priorities: BTreeMap<String, PrioritySetting>,
    #[serde(
        default,
        serialize_with = "serialize_generous",
        deserialize_with = "deserialize_generous"
    )]
    pub generous: BTreeSet<String>,
}

fn serialize_generous<S>(ids: &BTreeSet<String>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let joined = ids.iter().map(String::as_str).collect::<Vec<_>>().join(" ");
    serializer.serialize_str(&joined)
}

fn deserialize_generous<'de, D>(deserializer: D) -> Result<BTreeSet<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(raw.split_whitespace().map(str::to_string).collect())
}

/// One line of the resolved table, as reported to operators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableRow {
    pub id: String,
    pub priority: Option<i32>,
    pub disabled: bool,
    pub generous: bool,
}

impl ConfigTable {
    /// The table written when no configuration file exists yet.
    pub fn defaults() -> Self {
        let priorities = [
            ("autoeconomy", 200),
            ("guishop", 100),
            ("economy++", 50),
            ("FactionsShop", 25),
            ("totaleconomy", 10),
            ("conjurate-shop", 5),
        ]
        .into_iter()
        .map(|(id, priority)| (id.to_string(), PrioritySetting::Priority(priority)))
        .collect();
        Self {
            priorities,
            generous: BTreeSet::new(),
        }
    }

    /// Drops entries whose id can never match a registered handler.
    pub fn sanitize(&mut self) {
        self.priorities.retain(|id, _| {
            let valid = !id.is_empty() && !id.chars().any(char::is_whitespace);
            if !valid {
                warn!(key = %id, "skipping configuration entry with invalid handler id");
            }
            valid
        });
    }

    pub fn priority(&self, id: &str, declared: i8) -> i32 {
        match self.priorities.get(id) {
            Some(PrioritySetting::Priority(priority)) => *priority,
            _ => i32::from(declared),
        }
    }

    pub fn configured_priority(&self, id: &str) -> Option<i32> {
        match self.priorities.get(id) {
            Some(PrioritySetting::Priority(priority)) => Some(*priority),
            _ => None,
        }
    }

    pub fn is_disabled(&self, id: &str) -> bool {
        matches!(self.priorities.get(id), Some(PrioritySetting::Disabled(_)))
    }

    pub fn is_generous(&self, id: &str) -> bool {
        self.generous.contains(id)
    }

    /// Returns whether an entry was added.
    pub fn ensure_entry(&mut self, id: &str, priority: i32) -> bool {
        if self.priorities.contains_key(id) {
            return false;
        }
        self.priorities
            .insert(id.to_string(), PrioritySetting::Priority(priority));
        true
    }

    pub fn set_priority(&mut self, id: &str, priority: i32) {
        self.priorities
            .insert(id.to_string(), PrioritySetting::Priority(priority));
    }

    pub fn clear_priority(&mut self, id: &str) -> bool {
        self.priorities.remove(id).is_some()
    }

    /// Disabling replaces any priority; enabling removes the entry so the
    /// handler's declared priority applies again.
    pub fn set_disabled(&mut self, id: &str, disabled: bool) {
        if disabled {
            self.priorities
                .insert(id.to_string(), PrioritySetting::Disabled(Disabled::Disabled));
        } else if self.is_disabled(id) {
            self.priorities.remove(id);
        }
    }

    pub fn set_generous(&mut self, id: &str, generous: bool) {
        if generous {
            self.generous.insert(id.to_string());
        } else {
            self.generous.remove(id);
        }
    }

    /// Every configured id, highest priority first, then disabled and
    /// unprioritised ids, each group sorted by id.
    pub fn rows(&self) -> Vec<TableRow> {
        let ids: BTreeSet<&String> = self.priorities.keys().chain(self.generous.iter()).collect();
        let mut rows: Vec<TableRow> = ids
            .into_iter()
            .map(|id| TableRow {
                id: id.clone(),
                priority: self.configured_priority(id),
                disabled: self.is_disabled(id),
                generous: self.is_generous(id),
            })
            .collect();
        rows.sort_by(|a, b| match (a.priority, b.priority) {
            (Some(x), Some(y)) => y.cmp(&x).then_with(|| a.id.cmp(&b.id)),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => a.id.cmp(&b.id),
        });
        rows
    }
}
