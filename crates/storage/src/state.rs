//! Persisted user map state.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use gis_address::CivilNumber;
use omana_common::{MapElement, OmanaResult};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::LocalStore;

/// Key holding the drawn map elements.
pub const USER_MAP_KEY: &str = "userMap";
/// Key holding notes by house id.
pub const HOUSE_NOTES_KEY: &str = "houseNotes";
/// Key holding civil number to house links.
pub const ID_HOUSE_MAPPINGS_KEY: &str = "idHouseMappings";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HouseNote {
    pub text: String,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdHouseMapping {
    pub civil_number: CivilNumber,
    pub house_id: String,
    pub linked_at: DateTime<Utc>,
}

/// Elements, notes and links held in memory between `load` and `save`.
///
/// A key that fails to load starts out empty. `save` leaves its file alone
/// until that section is modified, and then moves the old file aside to
/// `<key>.json.corrupt` before writing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MapState {
    elements: Vec<MapElement>,
    notes: BTreeMap<String, HouseNote>,
    links: Vec<IdHouseMapping>,
    /// Keys that failed to load, and whether they changed since.
    unreadable: BTreeMap<&'static str, bool>,
}

/// Read one key, treating a corrupt or unreadable blob as absent.
fn load_or_default<T: DeserializeOwned + Default>(
    store: &LocalStore,
    key: &'static str,
    unreadable: &mut BTreeMap<&'static str, bool>,
) -> T {
    match store.get(key) {
        Ok(Some(value)) => value,
        Ok(None) => T::default(),
        Err(e) => {
            warn!(key, error = %e, "Ignoring unreadable stored state");
            unreadable.insert(key, false);
            T::default()
        }
    }
}

impl MapState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(store: &LocalStore) -> Self {
        let mut unreadable = BTreeMap::new();
        let state = Self {
            elements: load_or_default(store, USER_MAP_KEY, &mut unreadable),
            notes: load_or_default(store, HOUSE_NOTES_KEY, &mut unreadable),
            links: load_or_default(store, ID_HOUSE_MAPPINGS_KEY, &mut unreadable),
            unreadable,
        };
        info!(
            elements = state.elements.len(),
            notes = state.notes.len(),
            links = state.links.len(),
            "Loaded map state"
        );
        state
    }

    pub fn save(&mut self, store: &LocalStore) -> OmanaResult<()> {
        if self.prepare_key(store, USER_MAP_KEY)? {
            store.set(USER_MAP_KEY, &self.elements)?;
        }
        if self.prepare_key(store, HOUSE_NOTES_KEY)? {
            store.set(HOUSE_NOTES_KEY, &self.notes)?;
        }
        if self.prepare_key(store, ID_HOUSE_MAPPINGS_KEY)? {
            store.set(ID_HOUSE_MAPPINGS_KEY, &self.links)?;
        }
        Ok(())
    }

    /// Keys whose stored value could not be read at load time.
    pub fn unreadable_keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.unreadable.keys().copied()
    }

    /// Whether `key` should be written. An unreadable key is skipped while
    /// untouched, and quarantined once it has been modified.
    fn prepare_key(&mut self, store: &LocalStore, key: &'static str) -> OmanaResult<bool> {
        match self.unreadable.get(key) {
            None => Ok(true),
            Some(false) => {
                debug!(key, "Leaving unreadable stored state in place");
                Ok(false)
            }
            Some(true) => {
                store.quarantine(key)?;
                self.unreadable.remove(key);
                Ok(true)
            }
        }
    }

    fn touch(&mut self, key: &'static str) {
        if let Some(modified) = self.unreadable.get_mut(key) {
            *modified = true;
        }
    }

    // === Elements ===

    pub fn elements(&self) -> &[MapElement] {
        &self.elements
    }

    pub fn add_element(&mut self, element: MapElement) -> Uuid {
        self.touch(USER_MAP_KEY);
        let id = element.id;
        self.elements.push(element);
        id
    }

    pub fn remove_element(&mut self, id: Uuid) -> Option<MapElement> {
        let idx = self.elements.iter().position(|e| e.id == id)?;
        self.touch(USER_MAP_KEY);
        Some(self.elements.remove(idx))
    }

    // === Notes ===

    /// Set the note for a house. Blank text clears it.
    pub fn set_note(&mut self, house_id: &str, text: &str) {
        self.touch(HOUSE_NOTES_KEY);
        let text = text.trim();
        if text.is_empty() {
            self.notes.remove(house_id);
            return;
        }
        self.notes.insert(
            house_id.to_string(),
            HouseNote {
                text: text.to_string(),
                updated_at: Utc::now(),
            },
        );
    }

    pub fn note(&self, house_id: &str) -> Option<&HouseNote> {
        self.notes.get(house_id)
    }

    pub fn clear_note(&mut self, house_id: &str) -> bool {
        self.touch(HOUSE_NOTES_KEY);
        self.notes.remove(house_id).is_some()
    }

    pub fn notes(&self) -> impl Iterator<Item = (&str, &HouseNote)> {
        self.notes.iter().map(|(k, v)| (k.as_str(), v))
    }

    // === Civil number links ===

    /// Link a civil number to a house, replacing any previous link for
    /// that number. Returns the previously linked house.
    pub fn link(&mut self, civil_number: CivilNumber, house_id: &str) -> Option<String> {
        self.touch(ID_HOUSE_MAPPINGS_KEY);
        let previous = self.unlink(&civil_number);
        self.links.push(IdHouseMapping {
            civil_number,
            house_id: house_id.to_string(),
            linked_at: Utc::now(),
        });
        previous
    }

    /// Remove the link for a civil number; returns the house it pointed to.
    pub fn unlink(&mut self, civil_number: &CivilNumber) -> Option<String> {
        let idx = self
            .links
            .iter()
            .position(|m| &m.civil_number == civil_number)?;
        self.touch(ID_HOUSE_MAPPINGS_KEY);
        Some(self.links.remove(idx).house_id)
    }

    pub fn house_for(&self, civil_number: &CivilNumber) -> Option<&str> {
        self.links
            .iter()
            .find(|m| &m.civil_number == civil_number)
            .map(|m| m.house_id.as_str())
    }

    pub fn civils_for(&self, house_id: &str) -> Vec<&CivilNumber> {
        self.links
            .iter()
            .filter(|m| m.house_id == house_id)
            .map(|m| &m.civil_number)
            .collect()
    }

    pub fn links(&self) -> &[IdHouseMapping] {
        &self.links
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn civil(s: &str) -> CivilNumber {
        CivilNumber::parse(s).unwrap()
    }

    #[test]
    fn test_relink_replaces() {
        let mut state = MapState::new();
        assert_eq!(state.link(civil("12345678"), "SQ-A-001-0101"), None);
        assert_eq!(
            state.link(civil("12345678"), "SQ-A-002-0201"),
            Some("SQ-A-001-0101".to_string())
        );
        assert_eq!(state.links().len(), 1);
        assert_eq!(state.house_for(&civil("12345678")), Some("SQ-A-002-0201"));
    }

    #[test]
    fn test_civils_for_house() {
        let mut state = MapState::new();
        state.link(civil("12345678"), "h1");
        state.link(civil("87654321"), "h1");
        state.link(civil("11112222"), "h2");
        assert_eq!(state.civils_for("h1").len(), 2);
        assert_eq!(state.unlink(&civil("87654321")), Some("h1".to_string()));
        assert_eq!(state.civils_for("h1").len(), 1);
    }

    #[test]
    fn test_blank_note_clears() {
        let mut state = MapState::new();
        state.set_note("h1", "gate code 4411");
        assert_eq!(state.note("h1").unwrap().text, "gate code 4411");
        state.set_note("h1", "   ");
        assert!(state.note("h1").is_none());
        assert!(!state.clear_note("h1"));
    }
}
