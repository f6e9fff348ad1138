//! Generic keyed collection backed by a JSON file
//!
//! Each collection keeps a read cache behind an `RwLock`. Every mutation is
//! a transaction: it takes an exclusive lock on a sidecar `.lock` file,
//! re-reads the JSON file, applies the change and writes the file back
//! before releasing the lock. Writers in other threads or other processes
//! therefore always see each other's committed records.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Display;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use fs2::FileExt;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{ChorebookError, ChorebookResult};
use crate::models::{
    Alert, AlertId, Chore, ChoreId, Expense, ExpenseId, Household, HouseholdId, Member, MemberId,
    MissedTask, MissedTaskId,
};

use super::file_io::{read_json, write_json_atomic};

/// Exclusive advisory lock on a collection's sidecar file, released on drop
struct FileLock {
    file: File,
}

impl FileLock {
    fn acquire(path: &Path) -> ChorebookResult<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                ChorebookError::Storage(format!(
                    "Failed to create directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .map_err(|e| {
                ChorebookError::Storage(format!("Failed to open {}: {}", path.display(), e))
            })?;
        FileExt::lock_exclusive(&file).map_err(|e| {
            ChorebookError::Storage(format!("Failed to lock {}: {}", path.display(), e))
        })?;
        Ok(Self { file })
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            warn!(error = %e, "failed to release collection lock");
        }
    }
}

/// A persisted entity with a stable id and an owning household
pub trait Record: Clone + Serialize + DeserializeOwned {
    type Id: Copy + Ord + Display;

    /// Entity name used in errors and logs
    const ENTITY: &'static str;

    fn id(&self) -> Self::Id;

    fn household_id(&self) -> HouseholdId;
}

impl Record for Member {
    type Id = MemberId;
    const ENTITY: &'static str = "Member";

    fn id(&self) -> MemberId {
        self.id
    }

    fn household_id(&self) -> HouseholdId {
        HouseholdId::for_admin(self.admin_id.unwrap_or(self.id))
    }
}

impl Record for Household {
    type Id = HouseholdId;
    const ENTITY: &'static str = "Household";

    fn id(&self) -> HouseholdId {
        self.id
    }

    fn household_id(&self) -> HouseholdId {
        self.id
    }
}

impl Record for Chore {
    type Id = ChoreId;
    const ENTITY: &'static str = "Chore";

    fn id(&self) -> ChoreId {
        self.id
    }

    fn household_id(&self) -> HouseholdId {
        self.household_id
    }
}

impl Record for MissedTask {
    type Id = MissedTaskId;
    const ENTITY: &'static str = "MissedTask";

    fn id(&self) -> MissedTaskId {
        self.id
    }

    fn household_id(&self) -> HouseholdId {
        self.household_id
    }
}

impl Record for Expense {
    type Id = ExpenseId;
    const ENTITY: &'static str = "Expense";

    fn id(&self) -> ExpenseId {
        self.id
    }

    fn household_id(&self) -> HouseholdId {
        self.household_id
    }
}

impl Record for Alert {
    type Id = AlertId;
    const ENTITY: &'static str = "Alert";

    fn id(&self) -> AlertId {
        self.id
    }

    fn household_id(&self) -> HouseholdId {
        self.household_id
    }
}

/// On-disk layout of a collection file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: DeserializeOwned"))]
struct CollectionFile<T> {
    records: Vec<T>,
}

impl<T> Default for CollectionFile<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
        }
    }
}

/// Collection of records persisted as one JSON file
pub struct Collection<T: Record> {
    path: PathBuf,
    lock_path: PathBuf,
    data: RwLock<BTreeMap<T::Id, T>>,
}

impl<T: Record> Collection<T> {
    pub fn new(path: PathBuf) -> Self {
        Self {
            lock_path: path.with_extension("json.lock"),
            path,
            data: RwLock::new(BTreeMap::new()),
        }
    }

    fn read(&self) -> ChorebookResult<RwLockReadGuard<'_, BTreeMap<T::Id, T>>> {
        self.data
            .read()
            .map_err(|e| ChorebookError::Storage(format!("Failed to acquire read lock: {}", e)))
    }

    fn write(&self) -> ChorebookResult<RwLockWriteGuard<'_, BTreeMap<T::Id, T>>> {
        self.data
            .write()
            .map_err(|e| ChorebookError::Storage(format!("Failed to acquire write lock: {}", e)))
    }

    fn not_found(id: T::Id) -> ChorebookError {
        ChorebookError::NotFound {
            entity_type: T::ENTITY,
            identifier: id.to_string(),
        }
    }

    fn read_file(&self) -> ChorebookResult<BTreeMap<T::Id, T>> {
        let file: CollectionFile<T> = read_json(&self.path)?;
        Ok(file
            .records
            .into_iter()
            .map(|record| (record.id(), record))
            .collect())
    }

    /// Run `f` against the current file contents under the file lock
    ///
    /// `f` returns its result and whether it changed anything. Changes are
    /// written back before the lock is released; the cache is refreshed
    /// either way. Nothing is written when `f` fails.
    fn transact<R, F>(&self, f: F) -> ChorebookResult<R>
    where
        F: FnOnce(&mut BTreeMap<T::Id, T>) -> ChorebookResult<(R, bool)>,
    {
        let mut data = self.write()?;
        let _lock = FileLock::acquire(&self.lock_path)?;

        let mut working = self.read_file()?;
        let (result, changed) = f(&mut working)?;
        if changed {
            let file = CollectionFile {
                records: working.values().cloned().collect(),
            };
            write_json_atomic(&self.path, &file)?;
            debug!(entity = T::ENTITY, count = working.len(), "collection written");
        }
        *data = working;
        Ok(result)
    }

    /// Replace the in-memory contents with the file on disk
    pub fn load(&self) -> ChorebookResult<()> {
        let records = self.read_file()?;
        let mut data = self.write()?;
        *data = records;
        debug!(entity = T::ENTITY, count = data.len(), "loaded collection");
        Ok(())
    }

    /// Get a record by id
    pub fn get(&self, id: T::Id) -> ChorebookResult<Option<T>> {
        Ok(self.read()?.get(&id).cloned())
    }

    /// All records matching the predicate
    pub fn find<F>(&self, predicate: F) -> ChorebookResult<Vec<T>>
    where
        F: Fn(&T) -> bool,
    {
        Ok(self
            .read()?
            .values()
            .filter(|record| predicate(record))
            .cloned()
            .collect())
    }

    /// The first record matching the predicate
    pub fn find_one<F>(&self, predicate: F) -> ChorebookResult<Option<T>>
    where
        F: Fn(&T) -> bool,
    {
        Ok(self
            .read()?
            .values()
            .find(|record| predicate(record))
            .cloned())
    }

    /// All records belonging to a household
    pub fn by_household(&self, household_id: HouseholdId) -> ChorebookResult<Vec<T>> {
        self.find(|record| record.household_id() == household_id)
    }

    /// Insert a new record
    pub fn insert(&self, record: T) -> ChorebookResult<()> {
        self.transact(|data| {
            let id = record.id();
            if data.contains_key(&id) {
                return Err(ChorebookError::Duplicate {
                    entity_type: T::ENTITY,
                    identifier: id.to_string(),
                });
            }
            data.insert(id, record);
            Ok(((), true))
        })
    }

    /// Insert a record unless an existing record matches `conflict`
    ///
    /// The check and the insert happen in one transaction. Returns whether
    /// the record was inserted.
    pub fn insert_unless<F>(&self, record: T, conflict: F) -> ChorebookResult<bool>
    where
        F: Fn(&T) -> bool,
    {
        self.transact(|data| {
            if data.values().any(|existing| conflict(existing)) || data.contains_key(&record.id())
            {
                return Ok((false, false));
            }
            data.insert(record.id(), record);
            Ok((true, true))
        })
    }

    /// Atomic read-modify-write of one record
    ///
    /// `f` runs on a copy of the record as it is on disk; the copy is
    /// committed only if `f` returns `Ok`.
    pub fn modify<R, F>(&self, id: T::Id, f: F) -> ChorebookResult<R>
    where
        F: FnOnce(&mut T) -> ChorebookResult<R>,
    {
        self.transact(|data| {
            let slot = data.get_mut(&id).ok_or_else(|| Self::not_found(id))?;
            let mut working = slot.clone();
            let result = f(&mut working)?;
            *slot = working;
            Ok((result, true))
        })
    }

    /// Remove a record, returning it if it existed
    pub fn delete(&self, id: T::Id) -> ChorebookResult<Option<T>> {
        self.transact(|data| {
            let removed = data.remove(&id);
            let changed = removed.is_some();
            Ok((removed, changed))
        })
    }

    /// Remove every record matching the predicate, returning the removed records
    pub fn delete_where<F>(&self, predicate: F) -> ChorebookResult<Vec<T>>
    where
        F: Fn(&T) -> bool,
    {
        self.transact(|data| {
            let ids: Vec<T::Id> = data
                .values()
                .filter(|record| predicate(record))
                .map(Record::id)
                .collect();
            let removed: Vec<T> = ids.into_iter().filter_map(|id| data.remove(&id)).collect();
            let changed = !removed.is_empty();
            Ok((removed, changed))
        })
    }

    /// Keep only the records `f` returns, removing the rest
    ///
    /// `f` sees every record as stored on disk. Returns the removed records.
    pub fn retain_with<F>(&self, f: F) -> ChorebookResult<Vec<T>>
    where
        F: FnOnce(&[T]) -> Vec<T>,
    {
        self.transact(|data| {
            let current: Vec<T> = data.values().cloned().collect();
            let kept: BTreeSet<T::Id> = f(&current).iter().map(Record::id).collect();
            let removed: Vec<T> = current
                .into_iter()
                .filter(|record| !kept.contains(&record.id()))
                .collect();
            for record in &removed {
                data.remove(&record.id());
            }
            let changed = !removed.is_empty();
            Ok((removed, changed))
        })
    }

    pub fn count(&self) -> ChorebookResult<usize> {
        Ok(self.read()?.len())
    }
}
