//! # File Profile Cache
//!
//! Keeps the profile snapshot as `<dir>/e-user.json`.

use shop_core::{ProfileCache, ShopError, ShopResult, UserProfile, PROFILE_KEY};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::warn;

/// JSON file under a profile directory
#[derive(Debug, Clone)]
pub struct FileProfileCache {
    path: PathBuf,
}

impl FileProfileCache {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(format!("{}.json", PROFILE_KEY)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ProfileCache for FileProfileCache {
    fn load(&self) -> Option<UserProfile> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return None,
            Err(e) => {
                warn!("Cannot read {}: {}", self.path.display(), e);
                return None;
            }
        };

        serde_json::from_str(&content)
            .map_err(|e| warn!("Ignoring corrupt profile {}: {}", self.path.display(), e))
            .ok()
    }

    fn store(&self, profile: &UserProfile) -> ShopResult<()> {
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir).map_err(|e| ShopError::Profile(e.to_string()))?;
        }
        let content =
            serde_json::to_string_pretty(profile).map_err(|e| ShopError::Profile(e.to_string()))?;
        std::fs::write(&self.path, content).map_err(|e| ShopError::Profile(e.to_string()))
    }

    fn clear(&self) -> ShopResult<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ShopError::Profile(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir() -> PathBuf {
        std::env::temp_dir().join(format!("storefront-profile-{}", uuid::Uuid::new_v4()))
    }

    #[test]
    fn test_round_trip_and_clear() {
        let dir = scratch_dir();
        let cache = FileProfileCache::new(&dir);
        assert!(cache.load().is_none());

        let profile = UserProfile::new("rex").with_email("rex@example.com");
        cache.store(&profile).unwrap();
        assert!(cache.path().ends_with("e-user.json"));
        assert_eq!(cache.load(), Some(profile));

        cache.clear().unwrap();
        assert!(cache.load().is_none());
        cache.clear().unwrap();

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_corrupt_file_reads_as_absent() {
        let dir = scratch_dir();
        std::fs::create_dir_all(&dir).unwrap();
        let cache = FileProfileCache::new(&dir);
        std::fs::write(cache.path(), "{not json").unwrap();

        assert!(cache.load().is_none());

        std::fs::remove_dir_all(&dir).ok();
    }
}
