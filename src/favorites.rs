// Favorites persistence: a flat JSON array of place keys, written through on
// every toggle. The original storage entry was "pr_map_favorites_v1"; the
// file name keeps the version suffix so a future format change can move to a
// new name instead of migrating.

use std::fs;
use std::path::PathBuf;

use rustc_hash::FxHashSet;

const FAVORITES_FILE_NAME: &str = "mapmigo_favorites_v1.json";

pub struct FavoritesStore {
    /// None when no config dir is available; the store then lives in memory
    /// only for this session.
    path: Option<PathBuf>,
    set: FxHashSet<String>,
}

impl FavoritesStore {
    /// Load from the default location. Absent or corrupt data yields an
    /// empty set; this never fails.
    pub fn load() -> Self {
        match dirs::config_dir() {
            Some(dir) => Self::load_from(dir.join(FAVORITES_FILE_NAME)),
            None => {
                eprintln!("No config dir found, favorites will not persist");
                Self { path: None, set: FxHashSet::default() }
            }
        }
    }

    pub fn load_from(path: PathBuf) -> Self {
        let set = match fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str::<Vec<String>>(&content) {
                Ok(keys) => keys.into_iter().collect(),
                Err(e) => {
                    eprintln!("Failed to parse favorites file {:?}: {}", path, e);
                    FxHashSet::default()
                }
            },
            // Missing file is the normal first-run case.
            Err(_) => FxHashSet::default(),
        };
        Self { path: Some(path), set }
    }

    pub fn is_favorite(&self, key: &str) -> bool {
        self.set.contains(key)
    }

    /// Flip membership and persist immediately. Returns the new state.
    pub fn toggle(&mut self, key: &str) -> bool {
        let now_active = if self.set.contains(key) {
            self.set.remove(key);
            false
        } else {
            self.set.insert(key.to_string());
            true
        };
        self.save();
        now_active
    }

    pub fn len(&self) -> usize {
        self.set.len()
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }

    /// Snapshot copy, safe for callers to hold across later toggles.
    pub fn keys(&self) -> FxHashSet<String> {
        self.set.clone()
    }

    fn save(&self) {
        let Some(ref path) = self.path else { return };
        let keys: Vec<&String> = self.set.iter().collect();
        match serde_json::to_string(&keys) {
            Ok(json) => {
                if let Err(e) = fs::write(path, json) {
                    eprintln!("Failed to save favorites to {:?}: {}", path, e);
                }
            }
            Err(e) => eprintln!("Failed to serialize favorites: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store(name: &str) -> FavoritesStore {
        let path = std::env::temp_dir().join(format!("mapmigo_fav_test_{}_{}.json", name, std::process::id()));
        let _ = fs::remove_file(&path);
        FavoritesStore::load_from(path)
    }

    #[test]
    fn test_toggle_roundtrip() {
        let mut store = temp_store("roundtrip");
        let path = store.path.clone().unwrap();

        assert!(!store.is_favorite("id:1"));
        assert!(store.toggle("id:1"));
        assert!(store.is_favorite("id:1"));

        // Reload from disk: the toggle was written through.
        let reloaded = FavoritesStore::load_from(path.clone());
        assert!(reloaded.is_favorite("id:1"));

        assert!(!store.toggle("id:1"));
        let reloaded = FavoritesStore::load_from(path.clone());
        assert!(!reloaded.is_favorite("id:1"));
        assert!(reloaded.is_empty());

        let _ = fs::remove_file(path);
    }

    #[test]
    fn test_corrupt_file_degrades_to_empty() {
        let path = std::env::temp_dir()
            .join(format!("mapmigo_fav_test_corrupt_{}.json", std::process::id()));
        fs::write(&path, "{not json[").unwrap();

        let store = FavoritesStore::load_from(path.clone());
        assert!(store.is_empty());

        let _ = fs::remove_file(path);
    }

    #[test]
    fn test_keys_snapshot_is_independent() {
        let mut store = temp_store("snapshot");
        store.toggle("id:a");
        let snapshot = store.keys();
        store.toggle("id:b");
        assert_eq!(snapshot.len(), 1);
        assert_eq!(store.len(), 2);

        if let Some(p) = store.path.clone() {
            let _ = fs::remove_file(p);
        }
    }
}
