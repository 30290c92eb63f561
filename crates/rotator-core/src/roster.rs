//! Roster store: the ordered, deduplicated channel list plus the category
//! filter, both persisted through a [`KeyValueStore`].
//!
//! Every mutation is written to the store before it is applied in memory, so
//! a failed write leaves both views unchanged.

use tracing::{info, warn};

use crate::store::{KeyValueStore, StoreError};

pub const ROSTER_KEY: &str = "customStreamers";
pub const CATEGORY_KEY: &str = "categoryFilter";

pub const DEFAULT_CATEGORY: &str = "Minecraft";

/// Longest login the platform hands out.
pub const MAX_NAME_LEN: usize = 25;

pub const DEFAULT_ROSTER: &[&str] = &[
    "AdamRoguezy",
    "ADarkLegacy",
    "aksually",
    "ARCHIT3CT",
    "ashleyroboto",
    "banthony",
    "blizz",
    "BobbyBurm",
    "butteryflaky",
    "bwick",
    "Carla",
    "cheebs",
    "chiblee",
    "chrismelberger",
    "ChrispyGameplay",
    "Crub",
    "detune",
    "dudlik",
    "EthanNestor",
    "hankstergirl",
    "hanner",
    "JessCapricorn",
    "johnchoi",
    "LeoSypniewski",
    "Loganolio",
    "Michael_Lopriore",
    "nandre",
    "PapaHogsPalaceOfPleasure",
    "PointCrow",
    "prezoh",
    "sandy",
    "Shaggedy",
    "Skootish",
    "vaqrgaming",
    "vixella",
    "whisqey",
];

/// User-facing roster mistakes.  The messages are shown as-is.
#[derive(Debug, thiserror::Error)]
pub enum RosterError {
    #[error("Please enter a streamer name")]
    EmptyName,

    #[error("\"{0}\" is not a valid streamer name (letters, digits and _ only)")]
    Invalid(String),

    #[error("Streamer already in list")]
    Duplicate(String),

    #[error("Please enter at least one streamer name")]
    NothingToAdd,

    #[error("All streamers are already in the list")]
    AllPresent,

    #[error("{0} is not in the list")]
    NotFound(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub struct RosterStore<S> {
    store: S,
    channels: Vec<String>,
    category: String,
}

impl<S: KeyValueStore> RosterStore<S> {
    /// Load both values independently; each falls back to its default when
    /// absent or unreadable.
    pub fn load(store: S) -> Self {
        let channels = match store.get(ROSTER_KEY) {
            Some(raw) => match serde_json::from_str::<Vec<String>>(&raw) {
                Ok(list) => dedupe(list),
                Err(e) => {
                    warn!("roster: stored list unreadable ({}), using defaults", e);
                    default_roster()
                }
            },
            None => default_roster(),
        };
        let category = store
            .get(CATEGORY_KEY)
            .unwrap_or_else(|| DEFAULT_CATEGORY.to_string());

        Self {
            store,
            channels,
            category,
        }
    }

    pub fn channels(&self) -> &[String] {
        &self.channels
    }

    pub fn contains(&self, name: &str) -> bool {
        self.channels.iter().any(|c| c == name)
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Current category filter; empty means no filtering.
    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn add(&mut self, raw: &str) -> Result<(), RosterError> {
        let name = raw.trim();
        if name.is_empty() {
            return Err(RosterError::EmptyName);
        }
        validate_name(name)?;
        if self.contains(name) {
            return Err(RosterError::Duplicate(name.to_string()));
        }
        let mut next = self.channels.clone();
        next.push(name.to_string());
        self.commit_channels(next)?;
        info!("roster: added {}", name);
        Ok(())
    }

    /// Add every name from a comma-separated paste.  Returns how many were
    /// new.  One malformed name rejects the whole paste.
    pub fn bulk_add(&mut self, text: &str) -> Result<usize, RosterError> {
        let names: Vec<&str> = text
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();
        if names.is_empty() {
            return Err(RosterError::NothingToAdd);
        }
        for name in &names {
            validate_name(name)?;
        }

        let mut next = self.channels.clone();
        let mut added = 0usize;
        for name in names {
            if !next.iter().any(|c| c == name) {
                next.push(name.to_string());
                added += 1;
            }
        }
        if added == 0 {
            return Err(RosterError::AllPresent);
        }
        self.commit_channels(next)?;
        info!("roster: bulk-added {} channel(s)", added);
        Ok(added)
    }

    pub fn remove(&mut self, name: &str) -> Result<(), RosterError> {
        if !self.contains(name) {
            return Err(RosterError::NotFound(name.to_string()));
        }
        let next: Vec<String> = self
            .channels
            .iter()
            .filter(|c| c.as_str() != name)
            .cloned()
            .collect();
        self.commit_channels(next)?;
        info!("roster: removed {}", name);
        Ok(())
    }

    /// Set the category filter.  Surrounding whitespace is dropped; an empty
    /// result clears the filter.
    pub fn set_category(&mut self, raw: &str) -> Result<(), RosterError> {
        let category = raw.trim().to_string();
        self.store.set(CATEGORY_KEY, &category)?;
        if category.is_empty() {
            info!("roster: category filter cleared");
        } else {
            info!("roster: category filter set to {}", category);
        }
        self.category = category;
        Ok(())
    }

    pub fn clear_category(&mut self) -> Result<(), RosterError> {
        self.set_category("")
    }

    fn commit_channels(&mut self, next: Vec<String>) -> Result<(), RosterError> {
        let json = serde_json::to_string(&next).map_err(StoreError::from)?;
        self.store.set(ROSTER_KEY, &json)?;
        self.channels = next;
        Ok(())
    }
}

/// Logins are ASCII letters, digits and underscores.  Anything else would be
/// split or mangled on its way through the comma-separated status query.
pub fn validate_name(name: &str) -> Result<(), RosterError> {
    let well_formed = name.len() <= MAX_NAME_LEN
        && !name.is_empty()
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if well_formed {
        Ok(())
    } else {
        Err(RosterError::Invalid(name.to_string()))
    }
}

fn default_roster() -> Vec<String> {
    DEFAULT_ROSTER.iter().map(|s| s.to_string()).collect()
}

/// Keep the first occurrence of each identifier.
fn dedupe(list: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(list.len());
    for id in list {
        if !id.is_empty() && !out.contains(&id) {
            out.push(id);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn roster_of(names: &[&str]) -> RosterStore<MemoryStore> {
        let mut store = MemoryStore::new();
        store
            .set(ROSTER_KEY, &serde_json::to_string(names).unwrap())
            .unwrap();
        RosterStore::load(store)
    }

    #[test]
    fn test_defaults_when_store_empty() {
        let roster = RosterStore::load(MemoryStore::new());
        assert_eq!(roster.len(), DEFAULT_ROSTER.len());
        assert_eq!(roster.category(), DEFAULT_CATEGORY);
    }

    #[test]
    fn test_stored_empty_category_means_no_filter() {
        let mut store = MemoryStore::new();
        store.set(CATEGORY_KEY, "").unwrap();
        let roster = RosterStore::load(store);
        assert_eq!(roster.category(), "");
        assert_eq!(roster.len(), DEFAULT_ROSTER.len());
    }

    #[test]
    fn test_load_dedupes_preserving_order() {
        let roster = roster_of(&["b", "a", "b", "c", "a"]);
        assert_eq!(roster.channels(), ["b", "a", "c"]);
    }

    #[test]
    fn test_add_rejects_empty_and_duplicates() {
        let mut roster = roster_of(&["A"]);
        assert!(matches!(roster.add("   "), Err(RosterError::EmptyName)));
        assert!(matches!(roster.add(" A "), Err(RosterError::Duplicate(_))));
        roster.add(" B ").unwrap();
        assert_eq!(roster.channels(), ["A", "B"]);
    }

    #[test]
    fn test_identifiers_are_case_sensitive() {
        let mut roster = roster_of(&["A"]);
        roster.add("a").unwrap();
        assert_eq!(roster.channels(), ["A", "a"]);
    }

    #[test]
    fn test_bulk_add_counts_new_names() {
        let mut roster = roster_of(&["A"]);
        assert_eq!(roster.bulk_add("A, B,, C , B").unwrap(), 2);
        assert_eq!(roster.channels(), ["A", "B", "C"]);
        assert!(matches!(roster.bulk_add("A,B"), Err(RosterError::AllPresent)));
        assert!(matches!(roster.bulk_add(" , "), Err(RosterError::NothingToAdd)));
    }

    #[test]
    fn test_malformed_names_are_rejected_and_not_saved() {
        let mut roster = roster_of(&["A"]);
        let too_long = "x".repeat(MAX_NAME_LEN + 1);
        for bad in ["foo,bar", "two words", "caf\u{e9}", "a&b", too_long.as_str()] {
            assert!(
                matches!(roster.add(bad), Err(RosterError::Invalid(_))),
                "{}",
                bad
            );
        }
        assert!(matches!(
            roster.bulk_add("B, two words, C"),
            Err(RosterError::Invalid(name)) if name == "two words"
        ));
        assert_eq!(roster.channels(), ["A"]);
        assert_eq!(
            RosterStore::load(roster.store.clone()).channels(),
            ["A"]
        );
        roster.add("Michael_Lopriore").unwrap();
    }

    #[test]
    fn test_mutations_are_persisted() {
        let mut roster = roster_of(&["A", "B"]);
        roster.remove("A").unwrap();
        roster.set_category("  Chess ").unwrap();

        let reloaded = RosterStore::load(roster.store.clone());
        assert_eq!(reloaded.channels(), ["B"]);
        assert_eq!(reloaded.category(), "Chess");
    }

    #[test]
    fn test_remove_unknown_is_an_error() {
        let mut roster = roster_of(&["A"]);
        assert!(matches!(roster.remove("Z"), Err(RosterError::NotFound(_))));
    }
}
