use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use crate::status::FileStatus;

type Entries = HashMap<PathBuf, Option<FileStatus>>;

/// Last computed status per absolute path.
///
/// Every access goes through one mutex: invalidation never interleaves with
/// a lookup, and a mutation run through [`StatusCache::invalidate_after`]
/// clears the cache before anyone else can read it.
#[derive(Debug, Default)]
pub struct StatusCache {
    entries: Mutex<Entries>,
}

impl StatusCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// `None` on a miss; `Some(None)` for a cached "absent".
    pub fn get(&self, path: &Path) -> Option<Option<FileStatus>> {
        self.lock().get(path).copied()
    }

    pub fn set(&self, path: PathBuf, status: Option<FileStatus>) {
        self.lock().insert(path, status);
    }

    pub fn invalidate_all(&self) {
        let mut entries = self.lock();
        tracing::debug!(entries = entries.len(), "invalidating status cache");
        entries.clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Return the cached status or compute and store it, holding the lock
    /// across `compute` so a concurrent invalidation cannot be overwritten
    /// with a stale result.
    pub fn get_or_insert_with<E>(
        &self,
        path: &Path,
        compute: impl FnOnce() -> Result<Option<FileStatus>, E>,
    ) -> Result<Option<FileStatus>, E> {
        let mut entries = self.lock();
        if let Some(status) = entries.get(path) {
            return Ok(*status);
        }

        let status = compute()?;
        entries.insert(path.to_path_buf(), status);
        Ok(status)
    }

    /// Run `op` with the cache locked, then clear it, whether or not `op`
    /// succeeded.
    pub fn invalidate_after<T>(&self, op: impl FnOnce() -> T) -> T {
        let mut entries = self.lock();
        let result = op();
        tracing::debug!(entries = entries.len(), "invalidating status cache after mutation");
        entries.clear();
        result
    }

    fn lock(&self) -> MutexGuard<'_, Entries> {
        // Poisoned: drop whatever was cached.
        self.entries.lock().unwrap_or_else(|poisoned| {
            let mut guard = poisoned.into_inner();
            guard.clear();
            guard
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn get_set_invalidate() {
        let cache = StatusCache::new();
        let path = PathBuf::from("/repo/a.txt");

        assert_eq!(cache.get(&path), None);
        cache.set(path.clone(), Some(FileStatus::New));
        assert_eq!(cache.get(&path), Some(Some(FileStatus::New)));

        cache.set(PathBuf::from("/repo/gone"), None);
        assert_eq!(cache.get(Path::new("/repo/gone")), Some(None));
        assert_eq!(cache.len(), 2);

        cache.invalidate_all();
        assert!(cache.is_empty());
    }

    #[test]
    fn get_or_insert_computes_once() {
        let cache = StatusCache::new();
        let path = Path::new("/repo/a.txt");
        let mut calls = 0;

        for _ in 0..3 {
            let status = cache
                .get_or_insert_with::<()>(path, || {
                    calls += 1;
                    Ok(Some(FileStatus::Modified))
                })
                .unwrap();
            assert_eq!(status, Some(FileStatus::Modified));
        }
        assert_eq!(calls, 1);
    }

    #[test]
    fn failed_compute_is_not_cached() {
        let cache = StatusCache::new();
        let path = Path::new("/repo/a.txt");

        let result = cache.get_or_insert_with(path, || Err("engine down"));
        assert_eq!(result, Err("engine down"));
        assert!(cache.is_empty());
    }

    #[test]
    fn invalidate_after_clears_even_on_error() {
        let cache = StatusCache::new();
        cache.set(PathBuf::from("/repo/a"), Some(FileStatus::Tracked));

        let result: Result<(), &str> = cache.invalidate_after(|| Err("boom"));
        assert!(result.is_err());
        assert!(cache.is_empty());
    }

    #[test]
    fn concurrent_readers_and_invalidators() {
        let cache = Arc::new(StatusCache::new());
        let mut handles = Vec::new();

        for t in 0..4 {
            let cache = Arc::clone(&cache);
            handles.push(thread::spawn(move || {
                for i in 0..200 {
                    let path = PathBuf::from(format!("/repo/{t}/{i}"));
                    if i % 50 == 0 {
                        cache.invalidate_all();
                    }
                    let status = cache
                        .get_or_insert_with::<()>(&path, || Ok(Some(FileStatus::New)))
                        .unwrap();
                    assert_eq!(status, Some(FileStatus::New));
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }
    }
}
