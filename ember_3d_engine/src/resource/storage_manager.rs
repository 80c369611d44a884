/// Storage manager: registry of named resource storages plus the cache
///
/// Storages are shared as `Arc<Mutex<ResourceStorage>>` so a renderer
/// command can hold on to the storage its resources live in. Lock order is
/// storage first, then the context and the GPU objects it reaches.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use rustc_hash::FxHashMap;

use crate::error::{Error, Result};
use crate::gfx::Context;
use crate::resource::ResourceStorage;
use crate::utils::lock;
use crate::{engine_debug, engine_error, engine_info, engine_warn};

/// Storage handle shared between the manager and its users
pub type SharedStorage = Arc<Mutex<ResourceStorage>>;

/// Storage manager configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageManagerConfig {
    /// Name of the cache storage
    pub cache_name: String,
    /// Parent directory of the cache storage
    pub cache_dir: PathBuf,
}

impl Default for StorageManagerConfig {
    fn default() -> Self {
        Self {
            cache_name: "cache".to_string(),
            cache_dir: PathBuf::from("resource_cache/"),
        }
    }
}

#[derive(Debug)]
pub struct StorageManager {
    context: Arc<Context>,
    cache: SharedStorage,
    storages: FxHashMap<String, SharedStorage>,
    /// Storages displaced by a later one with the same name
    orphans: Vec<SharedStorage>,
}

impl StorageManager {
    /// Create the manager and its cache storage
    ///
    /// # Errors
    ///
    /// Returns `Error::InitializationFailed` if the context was shut down.
    pub fn init(context: Arc<Context>, config: StorageManagerConfig) -> Result<Self> {
        if !context.is_alive() {
            let message = "Storage manager needs a live graphics context".to_string();
            engine_error!("ember3d::StorageManager", "{}", message);
            return Err(Error::InitializationFailed(message));
        }

        let cache = ResourceStorage::new(config.cache_name, config.cache_dir, Arc::clone(&context));
        engine_info!("ember3d::StorageManager", "Storage manager initialized (cache '{}')", cache.name());

        Ok(Self {
            context,
            cache: Arc::new(Mutex::new(cache)),
            storages: FxHashMap::default(),
            orphans: Vec::new(),
        })
    }

    /// Create and register a storage
    ///
    /// A storage already registered under `name` is replaced; the replaced
    /// one is no longer reachable by name but is still destroyed at shutdown.
    pub fn create_storage(&mut self, name: &str, parent_dir: impl Into<PathBuf>) -> SharedStorage {
        let storage = Arc::new(Mutex::new(ResourceStorage::new(
            name,
            parent_dir,
            Arc::clone(&self.context),
        )));

        if let Some(previous) = self.storages.insert(name.to_string(), Arc::clone(&storage)) {
            engine_warn!("ember3d::StorageManager", "Storage '{}' already exists, replacing it", name);
            self.orphans.push(previous);
        }
        storage
    }

    pub fn storage(&self, name: &str) -> Option<SharedStorage> {
        self.storages.get(name).cloned()
    }

    pub fn storage_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.storages.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn storage_count(&self) -> usize {
        self.storages.len()
    }

    /// Storage for engine-generated resources
    pub fn cache(&self) -> &SharedStorage {
        &self.cache
    }

    pub fn context(&self) -> &Arc<Context> {
        &self.context
    }

    /// Destroy a storage and drop it from the registry
    ///
    /// Works for registered and displaced storages alike. Repeated calls are
    /// harmless.
    pub fn destroy_storage(&mut self, storage: &SharedStorage) {
        lock(storage).destroy();
        self.storages.retain(|_, registered| !Arc::ptr_eq(registered, storage));
        self.orphans.retain(|orphan| !Arc::ptr_eq(orphan, storage));
    }

    /// Destroy the storage registered under `name`; false if there is none
    pub fn destroy_storage_named(&mut self, name: &str) -> bool {
        match self.storages.remove(name) {
            Some(storage) => {
                lock(&storage).destroy();
                true
            }
            None => {
                engine_debug!("ember3d::StorageManager", "No storage named '{}' to destroy", name);
                false
            }
        }
    }

    /// Destroy the cache, then every remaining storage
    pub fn shutdown(mut self) {
        lock(&self.cache).destroy();

        let storages: Vec<SharedStorage> = self.storages.drain().map(|(_, storage)| storage).collect();
        for storage in storages.iter().chain(self.orphans.iter()) {
            lock(storage).destroy();
        }
        self.orphans.clear();

        engine_info!("ember3d::StorageManager", "Storage manager shut down ({} storages released)",
            storages.len());
    }
}

#[cfg(test)]
#[path = "storage_manager_tests.rs"]
mod tests;
