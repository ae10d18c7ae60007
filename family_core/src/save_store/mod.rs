//! Save Store - versioned local saves with integrity checks and quotas.
//!
//! Layout inside the storage backend:
//! - `saves`: JSON map of save id -> encoded [`SaveGame`]
//! - `autosave`: encoded [`AutoSaveRecord`]
//! - `metadata`: plaintext [`StoreMetadata`] cache, rebuilt from `saves` on demand
//! - `storageKey`: plaintext obfuscation key, generated on first use
//!
//! Every mutation is a read-modify-write of the whole `saves` slot followed by
//! a single slot write. A single call is atomic with respect to itself, but two
//! stores writing the same backend race and the last writer wins; nothing here
//! locks across processes or tabs.

mod autosave;
pub mod checksum;
pub mod encoding;
mod error;
mod record;
mod storage;
mod validation;

pub use autosave::*;
pub use encoding::{EncodingError, StorageKey};
pub use error::*;
pub use record::*;
pub use storage::*;
pub use validation::*;

use chrono::{DateTime, Utc};
use family_rules::GameState;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::StoreConfig;
use checksum::{checksum, verify};
use encoding::{decode, encode};

/// Appended to the display name of imported saves.
pub const IMPORT_SUFFIX: &str = " (Imported)";

/// Deepest JSON nesting accepted in an import payload.
const IMPORT_MAX_DEPTH: usize = 32;

/// Fields an export envelope must carry.
const EXPORT_FIELDS: [&str; 4] = ["schemaVersion", "exportedAt", "saveGame", "exportChecksum"];

type Clock = Box<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Owner of all persisted saves.
pub struct SaveStore<S> {
    storage: S,
    config: StoreConfig,
    gateway: Box<dyn ValidationGateway + Send + Sync>,
    key: StorageKey,
    clock: Clock,
}

impl<S: StorageBackend> SaveStore<S> {
    /// Open a store over `storage` using the [`BasicGateway`] validator.
    pub fn new(storage: S, config: StoreConfig) -> SaveResult<Self> {
        Self::with_gateway(storage, config, BasicGateway)
    }

    /// Open a store with a caller-supplied validation gateway.
    pub fn with_gateway(
        mut storage: S,
        config: StoreConfig,
        gateway: impl ValidationGateway + Send + Sync + 'static,
    ) -> SaveResult<Self> {
        let key = load_or_create_key(&mut storage)?;
        Ok(Self {
            storage,
            config,
            gateway: Box::new(gateway),
            key,
            clock: Box::new(Utc::now),
        })
    }

    /// Replace the wall clock used for timestamps.
    pub fn with_clock(mut self, clock: impl Fn() -> DateTime<Utc> + Send + Sync + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// The active configuration.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// The obfuscation key protecting this store.
    pub fn key(&self) -> &StorageKey {
        &self.key
    }

    /// The underlying backend.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Mutable access to the underlying backend.
    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    /// Give the backend back.
    pub fn into_storage(self) -> S {
        self.storage
    }

    /// Persist a new named save of `state`.
    pub fn save(&mut self, state: &GameState, name: Option<&str>) -> SaveResult<SaveGame> {
        state.validate()?;
        let now = (self.clock)();
        let name = match name {
            Some(name) => self.sanitize_name(name)?,
            None => format!("Save {}", now.format("%Y-%m-%d %H:%M")),
        };

        let map = self.read_save_map_or_heal();
        self.check_save_limit(&map)?;

        let record = SaveGame {
            id: Uuid::new_v4().to_string(),
            name,
            game_state: state.clone(),
            created_at: now,
            last_modified: now,
            version: self.config.schema_version.clone(),
            checksum: checksum(state)?,
        };
        self.persist_record(map, &record)?;

        info!(save_id = %record.id, name = %record.name, "game saved");
        Ok(record)
    }

    /// Load the game state of a save.
    pub fn load(&self, id: &str) -> SaveResult<GameState> {
        Ok(self.get(id)?.game_state)
    }

    /// Fetch a full save record after verifying its checksum.
    pub fn get(&self, id: &str) -> SaveResult<SaveGame> {
        let map = self.read_save_map()?;
        let blob = map
            .get(id)
            .ok_or_else(|| SaveError::NotFound(id.to_string()))?;
        let record = self.decode_record(blob)?;
        verify_record(&record)?;
        Ok(record)
    }

    /// Metadata of every readable save, most recently modified first.
    ///
    /// Never fails: unreadable storage lists as empty and corrupt entries are
    /// skipped.
    pub fn list(&mut self) -> Vec<SaveGameMetadata> {
        let map = self.read_save_map_or_heal();
        let mut saves: Vec<SaveGameMetadata> = map
            .iter()
            .filter_map(|(id, blob)| match self.decode_record(blob) {
                Ok(record) => Some(record.metadata()),
                Err(error) => {
                    warn!(save_id = %id, %error, "skipping unreadable save");
                    None
                }
            })
            .collect();
        saves.sort_by(|a, b| b.last_modified.cmp(&a.last_modified));
        saves
    }

    /// Number of entries in the save map.
    pub fn save_count(&self) -> usize {
        self.read_save_map().map(|map| map.len()).unwrap_or(0)
    }

    /// Delete a save.
    pub fn delete(&mut self, id: &str) -> SaveResult<()> {
        let mut map = self.read_save_map()?;
        if map.remove(id).is_none() {
            return Err(SaveError::NotFound(id.to_string()));
        }
        self.write_save_map(&map)?;
        info!(save_id = %id, "save deleted");
        Ok(())
    }

    /// Rename a save and bump its modification time.
    pub fn rename(&mut self, id: &str, new_name: &str) -> SaveResult<SaveGame> {
        let name = self.sanitize_name(new_name)?;
        let map = self.read_save_map()?;
        let blob = map
            .get(id)
            .ok_or_else(|| SaveError::NotFound(id.to_string()))?;
        let mut record = self.decode_record(blob)?;
        verify_record(&record)?;

        record.name = name;
        record.last_modified = (self.clock)();
        self.persist_record(map, &record)?;

        info!(save_id = %id, name = %record.name, "save renamed");
        Ok(record)
    }

    /// Export a save as a plaintext JSON envelope.
    pub fn export_save(&self, id: &str) -> SaveResult<String> {
        let record = self.get(id)?;
        let envelope = ExportEnvelope {
            schema_version: self.config.schema_version.clone(),
            exported_at: (self.clock)(),
            export_checksum: checksum(&record)?,
            save_game: record,
        };
        Ok(serde_json::to_string_pretty(&envelope)?)
    }

    /// Import an exported save under a fresh id.
    pub fn import_save(&mut self, payload: &str) -> SaveResult<SaveGame> {
        let value: Value = serde_json::from_str(payload)?;
        let rules = DataRules {
            max_depth: IMPORT_MAX_DEPTH,
            required_keys: EXPORT_FIELDS.iter().map(|f| f.to_string()).collect(),
        };
        self.gateway
            .validate_data(&value, &rules)
            .into_result()
            .map_err(|e| SaveError::ValidationFailed(format!("invalid export: {e}")))?;

        let export_checksum_ok = match value.get("saveGame") {
            Some(raw) => value
                .get("exportChecksum")
                .and_then(Value::as_str)
                .map(|expected| verify(raw, expected))
                .transpose()?
                .unwrap_or(false),
            None => false,
        };

        let envelope: ExportEnvelope = serde_json::from_value(value)
            .map_err(|e| SaveError::ValidationFailed(format!("malformed export: {e}")))?;

        if !export_checksum_ok {
            warn!(save_id = %envelope.save_game.id, "export checksum mismatch");
            return Err(SaveError::IntegrityCheckFailed(
                "export checksum does not match its save".to_string(),
            ));
        }
        verify_record(&envelope.save_game)?;
        if major_version(&envelope.schema_version) != major_version(&self.config.schema_version) {
            return Err(SaveError::ValidationFailed(format!(
                "unsupported schema version {}",
                envelope.schema_version
            )));
        }

        let imported = envelope.save_game;
        imported.game_state.validate()?;
        let name = self.imported_name(&imported.name)?;

        let map = self.read_save_map_or_heal();
        self.check_save_limit(&map)?;

        let record = SaveGame {
            id: Uuid::new_v4().to_string(),
            name,
            checksum: checksum(&imported.game_state)?,
            game_state: imported.game_state,
            created_at: imported.created_at,
            last_modified: (self.clock)(),
            version: self.config.schema_version.clone(),
        };
        self.persist_record(map, &record)?;

        info!(save_id = %record.id, original_id = %imported.id, "save imported");
        Ok(record)
    }

    /// Overwrite the auto-save slot. Exempt from the save count limit.
    pub fn auto_save(&mut self, state: &GameState) -> SaveResult<()> {
        state.validate()?;
        let record = AutoSaveRecord {
            game_state: state.clone(),
            checksum: checksum(state)?,
            saved_at: (self.clock)(),
            schema_version: self.config.schema_version.clone(),
        };
        let text = serde_json::to_string(&record)?;
        if text.len() > self.config.max_payload_bytes {
            return Err(SaveError::QuotaExceeded(QuotaViolation::PayloadTooLarge {
                bytes: text.len(),
                limit: self.config.max_payload_bytes,
            }));
        }
        self.storage.set(AUTOSAVE_SLOT, &encode(&text, &self.key))?;
        debug!(bytes = text.len(), "auto-save written");
        Ok(())
    }

    /// The auto-saved state, if a usable one exists.
    ///
    /// A corrupt or outdated auto-save is removed and reported as absent.
    pub fn get_auto_save(&mut self) -> Option<GameState> {
        let text = match self.storage.get(AUTOSAVE_SLOT) {
            Ok(Some(text)) => text,
            Ok(None) => return None,
            Err(error) => {
                warn!(%error, "auto-save slot unreadable");
                return None;
            }
        };
        match self.decode_auto_save(&text) {
            Ok(state) => Some(state),
            Err(error) => {
                warn!(%error, "discarding unusable auto-save");
                self.clear_auto_save();
                None
            }
        }
    }

    /// Remove the auto-save slot.
    pub fn clear_auto_save(&mut self) {
        if let Err(error) = self.storage.remove(AUTOSAVE_SLOT) {
            warn!(%error, "failed to clear auto-save slot");
        }
    }

    /// The metadata cache, rebuilt if missing or out of step with the saves.
    pub fn metadata(&mut self) -> StoreMetadata {
        let total_saves = self.save_count();
        let cached = self
            .storage
            .get(METADATA_SLOT)
            .ok()
            .flatten()
            .and_then(|text| serde_json::from_str::<StoreMetadata>(&text).ok());

        match cached {
            Some(meta)
                if meta.total_saves == total_saves
                    && meta.schema_version == self.config.schema_version =>
            {
                meta
            }
            _ => {
                debug!(total_saves, "rebuilding metadata cache");
                self.refresh_metadata(total_saves)
            }
        }
    }

    fn sanitize_name(&self, name: &str) -> SaveResult<String> {
        self.gateway
            .sanitize_text(name, &TextRules::save_name(self.config.name_max_length))
            .into_result()
            .map_err(|e| SaveError::ValidationFailed(format!("invalid save name: {e}")))
    }

    /// Name for an imported copy: the original without earlier import
    /// suffixes, cut so that one suffix still fits.
    fn imported_name(&self, original: &str) -> SaveResult<String> {
        let original = self.sanitize_name(original)?;
        let mut base = original.as_str();
        while let Some(stripped) = base.strip_suffix(IMPORT_SUFFIX) {
            base = stripped.trim_end();
        }
        let room = self
            .config
            .name_max_length
            .saturating_sub(IMPORT_SUFFIX.chars().count());
        let base: String = base.chars().take(room).collect();
        self.sanitize_name(&format!("{}{IMPORT_SUFFIX}", base.trim_end()))
    }

    fn check_save_limit(&self, map: &BTreeMap<String, String>) -> SaveResult<()> {
        if map.len() >= self.config.max_saves {
            warn!(max = self.config.max_saves, "save limit reached");
            return Err(SaveError::LimitReached {
                max: self.config.max_saves,
            });
        }
        Ok(())
    }

    fn read_save_map(&self) -> SaveResult<BTreeMap<String, String>> {
        match self.storage.get(SAVES_SLOT)? {
            Some(text) => Ok(serde_json::from_str(&text)?),
            None => Ok(BTreeMap::new()),
        }
    }

    /// Read the save map, resetting it to empty if it cannot be read.
    fn read_save_map_or_heal(&mut self) -> BTreeMap<String, String> {
        match self.read_save_map() {
            Ok(map) => map,
            Err(error) => {
                warn!(%error, "save storage unreadable, resetting to empty");
                if let Err(error) = self.storage.set(SAVES_SLOT, "{}") {
                    warn!(%error, "failed to reset save storage");
                }
                BTreeMap::new()
            }
        }
    }

    fn decode_record(&self, blob: &str) -> SaveResult<SaveGame> {
        let text = decode(blob, &self.key)?;
        Ok(serde_json::from_str(&text)?)
    }

    fn decode_auto_save(&self, text: &str) -> SaveResult<GameState> {
        let record: AutoSaveRecord = serde_json::from_str(&decode(text, &self.key)?)?;
        if record.schema_version != self.config.schema_version {
            return Err(SaveError::ValidationFailed(format!(
                "auto-save schema {} does not match {}",
                record.schema_version, self.config.schema_version
            )));
        }
        if !verify(&record.game_state, &record.checksum)? {
            return Err(SaveError::IntegrityCheckFailed("auto-save".to_string()));
        }
        Ok(record.game_state)
    }

    /// Insert or replace `record` in `map`, enforce the size quota and write.
    fn persist_record(
        &mut self,
        mut map: BTreeMap<String, String>,
        record: &SaveGame,
    ) -> SaveResult<()> {
        let text = serde_json::to_string(record)?;
        let bytes = self.payload_size(&map, &record.id, text.len());
        let limit = self.config.max_payload_bytes;
        if bytes > limit {
            warn!(bytes, limit, "save rejected, payload too large");
            return Err(SaveError::QuotaExceeded(QuotaViolation::PayloadTooLarge {
                bytes,
                limit,
            }));
        }

        map.insert(record.id.clone(), encode(&text, &self.key));
        self.write_save_map(&map)
    }

    /// Length of the save map serialized as compact JSON before encoding, with
    /// `id` holding a record of `record_len` bytes.
    fn payload_size(&self, map: &BTreeMap<String, String>, id: &str, record_len: usize) -> usize {
        // "key":value
        let entry = |key: &str, len: usize| key.len() + 3 + len;
        let mut total = 2 + entry(id, record_len);
        let mut entries = 1;
        for (key, blob) in map.iter().filter(|(key, _)| key.as_str() != id) {
            let len = decode(blob, &self.key)
                .map(|text| text.len())
                .unwrap_or(blob.len());
            total += entry(key, len);
            entries += 1;
        }
        total + entries - 1
    }

    fn write_save_map(&mut self, map: &BTreeMap<String, String>) -> SaveResult<()> {
        let text = serde_json::to_string(map)?;
        if let Err(error) = self.storage.set(SAVES_SLOT, &text) {
            warn!(%error, "save storage write failed");
            return Err(error.into());
        }
        self.refresh_metadata(map.len());
        Ok(())
    }

    fn refresh_metadata(&mut self, total_saves: usize) -> StoreMetadata {
        let meta = StoreMetadata {
            total_saves,
            last_updated: (self.clock)(),
            schema_version: self.config.schema_version.clone(),
        };
        match serde_json::to_string(&meta) {
            Ok(text) => {
                if let Err(error) = self.storage.set(METADATA_SLOT, &text) {
                    warn!(%error, "failed to write metadata cache");
                }
            }
            Err(error) => warn!(%error, "failed to serialize metadata cache"),
        }
        meta
    }
}

fn load_or_create_key<S: StorageBackend>(storage: &mut S) -> SaveResult<StorageKey> {
    if let Some(hex) = storage.get(STORAGE_KEY_SLOT)? {
        match StorageKey::from_hex(&hex) {
            Ok(key) => return Ok(key),
            Err(error) => warn!(%error, "stored key unreadable, generating a new one"),
        }
    }
    let key = StorageKey::generate();
    storage.set(STORAGE_KEY_SLOT, &key.to_hex())?;
    info!("generated new storage key");
    Ok(key)
}

fn verify_record(record: &SaveGame) -> SaveResult<()> {
    if verify(&record.game_state, &record.checksum)? {
        Ok(())
    } else {
        warn!(save_id = %record.id, "save checksum mismatch");
        Err(SaveError::IntegrityCheckFailed(format!(
            "save {} does not match its checksum",
            record.id
        )))
    }
}

fn major_version(version: &str) -> &str {
    version.split('.').next().unwrap_or(version)
}
