//! Country names and the set of locations the catalog accepts.

mod countries;

use std::collections::BTreeSet;

pub use countries::COUNTRIES;

/// Resolves an ISO3 code to the display name used in dataset titles.
pub trait CountryLookup: Send + Sync {
    fn name_from_iso3(&self, iso3: &str) -> Option<String>;
}

/// Built-in lookup backed by [COUNTRIES].
#[derive(Debug, Clone, Copy, Default)]
pub struct CountryTable;

impl CountryLookup for CountryTable {
    fn name_from_iso3(&self, iso3: &str) -> Option<String> {
        let code = iso3.trim();
        COUNTRIES
            .iter()
            .find(|(candidate, _)| candidate.eq_ignore_ascii_case(code))
            .map(|(_, name)| (*name).to_string())
    }
}

/// Location codes (lowercase ISO3) a dataset may be attached to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locations {
    codes: BTreeSet<String>,
}

impl Locations {
    pub fn new<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            codes: codes
                .into_iter()
                .map(|code| code.as_ref().trim().to_lowercase())
                .collect(),
        }
    }

    pub fn contains(&self, iso3: &str) -> bool {
        self.codes.contains(&iso3.trim().to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

impl Default for Locations {
    /// Every country in the built-in table.
    fn default() -> Self {
        Self::new(COUNTRIES.iter().map(|(code, _)| *code))
    }
}
