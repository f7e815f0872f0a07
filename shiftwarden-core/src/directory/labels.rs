use std::collections::BTreeSet;

/// Canonical form of a role label: lowercase with whitespace, `_` and `-`
/// removed, so "HR Manager", "hr_manager" and "hr-manager" compare equal.
pub fn normalize(label: &str) -> String {
    label
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Set of oversight role labels, matched after normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleLabels {
    normalized: BTreeSet<String>,
}

impl RoleLabels {
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let normalized = labels
            .into_iter()
            .map(|label| normalize(label.as_ref()))
            .filter(|label| !label.is_empty())
            .collect();
        Self { normalized }
    }

    pub fn contains(&self, label: &str) -> bool {
        self.normalized.contains(&normalize(label))
    }

    pub fn is_empty(&self) -> bool {
        self.normalized.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.normalized.iter().map(String::as_str)
    }
}

impl Default for RoleLabels {
    fn default() -> Self {
        Self::new(["hr", "hr manager", "human resources"])
    }
}
