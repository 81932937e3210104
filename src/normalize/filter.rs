use regex::Regex;

use crate::utils::Result;

/// Name filter applied to queues and topics.
///
/// Every pattern is wrapped in a non-capturing group and the groups are joined
/// by alternation, so a name is accepted when any single pattern matches some
/// part of it. An empty match does not count: `x*` rejects `orders`. With no
/// patterns the filter accepts everything.
#[derive(Debug, Clone, Default)]
pub struct EntityFilter {
    pattern: Option<Regex>,
}

impl EntityFilter {
    pub fn new<I, S>(patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let groups: Vec<String> = patterns
            .into_iter()
            .map(|p| format!("(?:{})", p.as_ref()))
            .collect();

        if groups.is_empty() {
            return Ok(Self::default());
        }

        let pattern = Regex::new(&groups.join("|"))?;
        Ok(Self {
            pattern: Some(pattern),
        })
    }

    /// Returns true when no patterns were supplied.
    pub fn accepts_all(&self) -> bool {
        self.pattern.is_none()
    }

    pub fn matches(&self, name: &str) -> bool {
        match &self.pattern {
            Some(pattern) => pattern.find(name).is_some_and(|m| !m.is_empty()),
            None => true,
        }
    }
}
