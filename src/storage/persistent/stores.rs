//! The durable zoo store.
//!
//! All reads are served from an in-memory [`ZooRecords`] snapshot. Writes are
//! checked against the snapshot, appended to the log, then applied, so a
//! rejected write never reaches disk.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockWriteGuard};

use crate::animal::{Animal, AnimalId};
use crate::habitat::{Habitat, HabitatId};
use crate::storage::memory::ZooRecords;
use crate::storage::traits::{Placement, StorageError, ZooAttributes, ZooStore};

use super::file_lock::DirectoryLock;
use super::wal::{WalEntryKind, WriteAheadLog};
use super::PersistentConfig;

/// Name of the log file inside the zoo directory.
pub const WAL_FILE_NAME: &str = "zoo.wal";

fn lock_err(context: &'static str) -> StorageError {
    StorageError::Backend(format!("poisoned lock: {context}"))
}

fn io_err(context: &str, e: &io::Error) -> StorageError {
    StorageError::Io(format!("{context}: {e}"))
}

/// Rejects a mutation that would fail to apply.
fn precheck(records: &ZooRecords, kind: &WalEntryKind) -> Result<(), StorageError> {
    let has_animal = |id: AnimalId| records.animals.iter().any(|a| a.id() == id);
    let has_habitat = |id: HabitatId| records.habitats.iter().any(|h| h.id() == id);

    match kind {
        WalEntryKind::AnimalSave(animal) if has_animal(animal.id()) => {
            Err(StorageError::DuplicateKey(animal.id().to_string()))
        }
        WalEntryKind::HabitatSave(habitat) if has_habitat(habitat.id()) => {
            Err(StorageError::DuplicateKey(habitat.id().to_string()))
        }
        WalEntryKind::AnimalUsed { id, .. } if !has_animal(*id) => {
            Err(StorageError::AnimalNotFound(*id))
        }
        WalEntryKind::HabitatUsed { id, .. } | WalEntryKind::HabitatName { id, .. }
            if !has_habitat(*id) =>
        {
            Err(StorageError::HabitatNotFound(*id))
        }
        _ => Ok(()),
    }
}

fn apply(records: &mut ZooRecords, kind: WalEntryKind) -> Result<(), StorageError> {
    match kind {
        WalEntryKind::AnimalSave(animal) => records.insert_animal(&animal),
        WalEntryKind::HabitatSave(habitat) => records.insert_habitat(&habitat),
        WalEntryKind::AnimalUsed { id, used } => records.set_animal_used(id, used),
        WalEntryKind::HabitatUsed { id, used } => records.set_habitat_used(id, used),
        WalEntryKind::HabitatName { id, name } => records.set_habitat_name(id, &name),
        WalEntryKind::Attributes {
            balance,
            current_day,
        } => {
            records.set_attributes(balance, current_day);
            Ok(())
        }
        WalEntryKind::AssociationSave(placement) => {
            records.add_placement(placement);
            Ok(())
        }
        WalEntryKind::AssociationRemove(placement) => {
            records.remove_placement(placement);
            Ok(())
        }
        WalEntryKind::Snapshot(snapshot) => {
            *records = snapshot;
            Ok(())
        }
    }
}

/// Zoo store backed by a write-ahead log in a locked directory.
pub struct PersistentZooStore {
    dir: PathBuf,
    _lock: DirectoryLock,
    wal: WriteAheadLog,
    records: RwLock<ZooRecords>,
    config: PersistentConfig,
}

impl std::fmt::Debug for PersistentZooStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistentZooStore")
            .field("dir", &self.dir)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl PersistentZooStore {
    /// Opens or creates a zoo directory and replays its log.
    ///
    /// # Errors
    /// - `Io` if the directory cannot be created, is locked, or the log cannot be read
    /// - `Corrupt` if a log entry fails its checksum or contradicts earlier entries
    pub fn open(dir: &Path, config: PersistentConfig) -> Result<Self, StorageError> {
        fs::create_dir_all(dir).map_err(|e| io_err("failed to create zoo directory", &e))?;
        let lock = DirectoryLock::acquire(dir).map_err(|e| io_err("failed to acquire lock", &e))?;

        let wal = WriteAheadLog::open(&dir.join(WAL_FILE_NAME), config.sync_on_write)
            .map_err(|e| match e.kind() {
                io::ErrorKind::InvalidData => StorageError::Corrupt(format!("zoo log: {e}")),
                _ => io_err("failed to open zoo log", &e),
            })?;

        let records = Self::replay(&wal)?;

        Ok(Self {
            dir: dir.to_path_buf(),
            _lock: lock,
            wal,
            records: RwLock::new(records),
            config,
        })
    }

    fn replay(wal: &WriteAheadLog) -> Result<ZooRecords, StorageError> {
        let mut records = ZooRecords::default();
        let mut count = 0usize;

        for entry in wal.iter().map_err(|e| io_err("failed to read zoo log", &e))? {
            let entry = entry.map_err(|e| StorageError::Corrupt(format!("zoo log entry: {e}")))?;
            let sequence = entry.sequence;
            apply(&mut records, entry.kind).map_err(|e| {
                StorageError::Corrupt(format!("zoo log entry {sequence} does not apply: {e}"))
            })?;
            count += 1;
        }

        if count > 0 {
            log::info!(
                "replayed {count} zoo log entries up to sequence {}",
                wal.current_sequence()
            );
        }
        Ok(records)
    }

    /// The directory this store lives in.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Current size of the log file in bytes.
    #[must_use]
    pub fn wal_size(&self) -> u64 {
        self.wal.size_bytes().unwrap_or(0)
    }

    /// Rewrites the log as a single snapshot of the current records.
    ///
    /// # Errors
    /// Returns `Io` if the new log cannot be written; the old log is kept.
    pub fn compact(&self) -> Result<(), StorageError> {
        let records = self.records.write().map_err(|_| lock_err("zoo.compact"))?;
        self.compact_locked(&records)
    }

    fn compact_locked(&self, records: &ZooRecords) -> Result<(), StorageError> {
        let before = self.wal_size();
        self.wal
            .rewrite(WalEntryKind::Snapshot(records.clone()))
            .map_err(|e| io_err("failed to compact zoo log", &e))?;
        log::info!(
            "compacted zoo log {} from {before} to {} bytes",
            self.dir.display(),
            self.wal_size()
        );
        Ok(())
    }

    fn records_mut(
        &self,
        context: &'static str,
    ) -> Result<RwLockWriteGuard<'_, ZooRecords>, StorageError> {
        self.records.write().map_err(|_| lock_err(context))
    }

    /// Checks, logs, then applies one mutation.
    fn commit(&self, context: &'static str, kind: WalEntryKind) -> Result<(), StorageError> {
        let mut records = self.records_mut(context)?;
        precheck(&records, &kind)?;
        self.wal
            .append(kind.clone())
            .map_err(|e| io_err("failed to append to zoo log", &e))?;
        apply(&mut records, kind)?;

        if self.wal_size() > self.config.max_wal_size {
            // The mutation is already durable; a failed compaction only costs space.
            if let Err(e) = self.compact_locked(&records) {
                log::warn!("zoo log compaction failed: {e}");
            }
        }
        Ok(())
    }

    fn read<T>(
        &self,
        context: &'static str,
        f: impl FnOnce(&ZooRecords) -> T,
    ) -> Result<T, StorageError> {
        let records = self.records.read().map_err(|_| lock_err(context))?;
        Ok(f(&records))
    }
}

impl ZooStore for PersistentZooStore {
    fn load_zoo_attributes(&self) -> Result<ZooAttributes, StorageError> {
        self.read("zoo.load_attributes", |r| r.attributes)
    }

    fn load_habitats(&self) -> Result<Vec<Habitat>, StorageError> {
        self.read("habitat.load", |r| r.habitats.clone())
    }

    fn load_animals(&self) -> Result<Vec<Animal>, StorageError> {
        self.read("animal.load", |r| r.animals.clone())
    }

    fn load_associations(&self) -> Result<Vec<Placement>, StorageError> {
        self.read("placement.load", |r| r.placements.clone())
    }

    fn save_animal(&self, animal: &Animal) -> Result<(), StorageError> {
        self.commit("animal.insert", WalEntryKind::AnimalSave(animal.clone()))
    }

    fn save_habitat(&self, habitat: &Habitat) -> Result<(), StorageError> {
        self.commit("habitat.insert", WalEntryKind::HabitatSave(habitat.clone()))
    }

    fn update_animal_used(&self, id: AnimalId, used: bool) -> Result<(), StorageError> {
        self.commit("animal.update_used", WalEntryKind::AnimalUsed { id, used })
    }

    fn update_habitat_used(&self, id: HabitatId, used: bool) -> Result<(), StorageError> {
        self.commit("habitat.update_used", WalEntryKind::HabitatUsed { id, used })
    }

    fn update_habitat_name(&self, id: HabitatId, name: &str) -> Result<(), StorageError> {
        self.commit(
            "habitat.update_name",
            WalEntryKind::HabitatName {
                id,
                name: name.to_string(),
            },
        )
    }

    fn update_zoo_attributes(&self, balance: u32, current_day: u32) -> Result<(), StorageError> {
        self.commit(
            "zoo.update_attributes",
            WalEntryKind::Attributes {
                balance,
                current_day,
            },
        )
    }

    fn save_association(&self, placement: Placement) -> Result<(), StorageError> {
        self.commit("placement.insert", WalEntryKind::AssociationSave(placement))
    }

    fn remove_association(&self, placement: Placement) -> Result<(), StorageError> {
        self.commit("placement.delete", WalEntryKind::AssociationRemove(placement))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animal::Species;
    use crate::climate::Climate;
    use tempfile::tempdir;

    fn config() -> PersistentConfig {
        PersistentConfig {
            sync_on_write: false,
            ..PersistentConfig::default()
        }
    }

    #[test]
    fn test_rejected_write_is_not_logged() {
        let dir = tempdir().unwrap();
        let store = PersistentZooStore::open(dir.path(), config()).unwrap();
        let size = store.wal_size();

        let err = store.update_animal_used(AnimalId::new(), true).unwrap_err();
        assert!(matches!(err, StorageError::AnimalNotFound(_)));
        assert_eq!(store.wal_size(), size);
    }

    #[test]
    fn test_records_survive_reopen() {
        let dir = tempdir().unwrap();
        let habitat = Habitat::new("Pen", Climate::Temperate);
        let animal = Animal::new(Species::WildBoar, 3, 80_000, 90.0);

        {
            let store = PersistentZooStore::open(dir.path(), config()).unwrap();
            store.save_habitat(&habitat).unwrap();
            store.save_animal(&animal).unwrap();
            store.update_habitat_used(habitat.id(), true).unwrap();
            store.update_habitat_name(habitat.id(), "Oak Pen").unwrap();
            store
                .save_association(Placement::new(animal.id(), habitat.id()))
                .unwrap();
            store.update_zoo_attributes(70, 2).unwrap();
        }

        let store = PersistentZooStore::open(dir.path(), config()).unwrap();
        let habitats = store.load_habitats().unwrap();
        assert_eq!(habitats.len(), 1);
        assert_eq!(habitats[0].name(), "Oak Pen");
        assert!(habitats[0].is_used());
        assert_eq!(store.load_animals().unwrap(), vec![animal.clone()]);
        assert_eq!(
            store.load_associations().unwrap(),
            vec![Placement::new(animal.id(), habitat.id())]
        );
        let attrs = store.load_zoo_attributes().unwrap();
        assert_eq!((attrs.balance, attrs.current_day), (Some(70), Some(2)));
    }

    #[test]
    fn test_second_open_is_refused() {
        let dir = tempdir().unwrap();
        let _store = PersistentZooStore::open(dir.path(), config()).unwrap();
        let err = PersistentZooStore::open(dir.path(), config()).unwrap_err();
        assert!(matches!(err, StorageError::Io(_)));
    }

    #[test]
    fn test_compaction_keeps_state() {
        let dir = tempdir().unwrap();
        {
            let store = PersistentZooStore::open(dir.path(), config()).unwrap();
            for day in 1..=50 {
                store.update_zoo_attributes(100 + day, day).unwrap();
            }
            let before = store.wal_size();
            store.compact().unwrap();
            assert!(store.wal_size() < before);
            store.update_zoo_attributes(999, 51).unwrap();
        }

        let store = PersistentZooStore::open(dir.path(), config()).unwrap();
        let attrs = store.load_zoo_attributes().unwrap();
        assert_eq!((attrs.balance, attrs.current_day), (Some(999), Some(51)));
    }

    #[test]
    fn test_auto_compaction_past_threshold() {
        let dir = tempdir().unwrap();
        let cfg = PersistentConfig {
            max_wal_size: PersistentConfig::MIN_WAL_SIZE,
            sync_on_write: false,
        };
        let store = PersistentZooStore::open(dir.path(), cfg).unwrap();
        for day in 1..=200 {
            store.update_zoo_attributes(day, day).unwrap();
        }
        assert!(store.wal_size() <= PersistentConfig::MIN_WAL_SIZE * 2);
        assert_eq!(store.load_zoo_attributes().unwrap().current_day, Some(200));
    }
}
