//! Persisted and exported record shapes.

use chrono::{DateTime, Utc};
use family_rules::{GameState, GameStyle, ADULT_AGE};
use serde::{Deserialize, Serialize};

/// A named save: a deep copy of a game state plus bookkeeping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveGame {
    pub id: String,
    pub name: String,
    pub game_state: GameState,
    pub created_at: DateTime<Utc>,
    pub last_modified: DateTime<Utc>,
    pub version: String,
    /// Checksum of `game_state`.
    pub checksum: String,
}

impl SaveGame {
    /// Listing view of this save.
    pub fn metadata(&self) -> SaveGameMetadata {
        let state = &self.game_state;
        let child_name = state
            .active_child()
            .or_else(|| state.children.values().min_by(|a, b| a.name.cmp(&b.name)))
            .map(|c| c.name.clone());

        SaveGameMetadata {
            id: self.id.clone(),
            name: self.name.clone(),
            created_at: self.created_at,
            last_modified: self.last_modified,
            current_age: state.current_age,
            child_name,
            parent_name: state.parent.name.clone(),
            game_style: state.game_style,
            progress_percent: progress_percent(state.current_age),
        }
    }
}

/// Share of childhood played through, 0-100.
fn progress_percent(current_age: u32) -> u8 {
    (current_age.min(ADULT_AGE) * 100 / ADULT_AGE) as u8
}

/// Summary of a save for menus. Always derived, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveGameMetadata {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub last_modified: DateTime<Utc>,
    pub current_age: u32,
    pub child_name: Option<String>,
    pub parent_name: String,
    pub game_style: GameStyle,
    pub progress_percent: u8,
}

/// Portable, human-readable export of one save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportEnvelope {
    pub schema_version: String,
    pub exported_at: DateTime<Utc>,
    pub save_game: SaveGame,
    /// Checksum of `save_game`.
    pub export_checksum: String,
}

/// Contents of the auto-save slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoSaveRecord {
    pub game_state: GameState,
    pub checksum: String,
    pub saved_at: DateTime<Utc>,
    pub schema_version: String,
}

/// Plaintext cache describing the save map. Not authoritative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreMetadata {
    pub total_saves: usize,
    pub last_updated: DateTime<Utc>,
    pub schema_version: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use family_rules::{ChildCharacter, ParentCharacter};

    fn record(state: GameState) -> SaveGame {
        let now = Utc::now();
        SaveGame {
            id: "save-1".to_string(),
            name: "First".to_string(),
            game_state: state,
            created_at: now,
            last_modified: now,
            version: "1.0.0".to_string(),
            checksum: String::new(),
        }
    }

    #[test]
    fn test_metadata_projection() {
        let mut state = GameState::new(ParentCharacter::new("Sam"), GameStyle::Whimsical);
        state.add_child(ChildCharacter::new("Maya"));
        state.add_child(ChildCharacter::new("Leo"));
        state.current_age = 9;

        let meta = record(state).metadata();
        assert_eq!(meta.child_name.as_deref(), Some("Maya"));
        assert_eq!(meta.parent_name, "Sam");
        assert_eq!(meta.game_style, GameStyle::Whimsical);
        assert_eq!(meta.progress_percent, 50);
    }

    #[test]
    fn test_metadata_without_active_child() {
        let mut state = GameState::default();
        state.children.insert(
            family_rules::ChildId::new(),
            ChildCharacter::new("Zoe"),
        );
        state.current_age = 40;

        let meta = record(state).metadata();
        assert_eq!(meta.child_name.as_deref(), Some("Zoe"));
        assert_eq!(meta.progress_percent, 100);
    }

    #[test]
    fn test_export_envelope_field_names() {
        let envelope = ExportEnvelope {
            schema_version: "1.0.0".to_string(),
            exported_at: Utc::now(),
            save_game: record(GameState::default()),
            export_checksum: "00".to_string(),
        };
        let json = serde_json::to_value(&envelope).unwrap();
        for key in ["schemaVersion", "exportedAt", "saveGame", "exportChecksum"] {
            assert!(json.get(key).is_some(), "missing {key}");
        }
        assert!(json["saveGame"].get("lastModified").is_some());
    }
}
