//! Catalog tag vocabulary: maps free-form tags onto the approved list.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

pub const DEFAULT_VOCABULARY_ID: &str = "4e61d464-4943-4e97-973a-84673c1aaa87";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TagVocabulary {
    pub id: String,
    pub approved: BTreeSet<String>,
    /// Raw tag -> approved tag.
    pub mappings: BTreeMap<String, String>,
}

impl Default for TagVocabulary {
    fn default() -> Self {
        Self {
            id: DEFAULT_VOCABULARY_ID.to_string(),
            approved: ["administrative boundaries-divisions", "geodata", "gazetteer"]
                .into_iter()
                .map(String::from)
                .collect(),
            mappings: [(
                "administrative divisions".to_string(),
                "administrative boundaries-divisions".to_string(),
            )]
            .into_iter()
            .collect(),
        }
    }
}

impl TagVocabulary {
    /// Translate `tags` through the mappings, keeping first-seen order.
    /// Tags that are not approved after mapping are dropped with a warning.
    pub fn clean<S: AsRef<str>>(&self, tags: &[S]) -> Vec<String> {
        let mut cleaned: Vec<String> = Vec::with_capacity(tags.len());
        for tag in tags {
            let raw = tag.as_ref().trim().to_lowercase();
            let mapped = self.mappings.get(&raw).cloned().unwrap_or(raw);
            if !self.approved.contains(&mapped) {
                tracing::warn!(tag = %mapped, "dropping tag not in approved vocabulary");
                continue;
            }
            if !cleaned.contains(&mapped) {
                cleaned.push(mapped);
            }
        }
        cleaned
    }
}
