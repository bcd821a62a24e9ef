//! Best-score persistence
//!
//! The best score is a single integer. On the web it lives in LocalStorage
//! as a plain decimal string; tests and the native runner keep it in memory.

/// Somewhere the best score survives between runs
pub trait ScoreStore {
    /// Stored best score, if any (unreadable values count as absent)
    fn best_score(&self) -> Option<u64>;
    fn set_best_score(&mut self, score: u64);
}

/// Parse a stored score. Anything but a non-negative integer is ignored.
pub fn parse_score(raw: &str) -> Option<u64> {
    raw.trim().parse().ok()
}

/// In-process store
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    best: Option<u64>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ScoreStore for MemoryStore {
    fn best_score(&self) -> Option<u64> {
        self.best
    }

    fn set_best_score(&mut self, score: u64) {
        self.best = Some(score);
    }
}

/// Browser LocalStorage store
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStorageStore;

#[cfg(target_arch = "wasm32")]
impl LocalStorageStore {
    /// LocalStorage key
    const STORAGE_KEY: &'static str = "cryptoBreakoutHighScore";

    fn storage() -> Option<web_sys::Storage> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
    }
}

#[cfg(target_arch = "wasm32")]
impl ScoreStore for LocalStorageStore {
    fn best_score(&self) -> Option<u64> {
        let raw = Self::storage()?.get_item(Self::STORAGE_KEY).ok().flatten()?;
        let best = parse_score(&raw);
        if best.is_none() {
            log::warn!("Ignoring unreadable stored best score {:?}", raw);
        }
        best
    }

    fn set_best_score(&mut self, score: u64) {
        if let Some(storage) = Self::storage() {
            if storage
                .set_item(Self::STORAGE_KEY, &score.to_string())
                .is_err()
            {
                log::warn!("Failed to persist best score");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_score() {
        assert_eq!(parse_score("1500"), Some(1500));
        assert_eq!(parse_score(" 42\n"), Some(42));
        assert_eq!(parse_score("-3"), None);
        assert_eq!(parse_score("lots"), None);
        assert_eq!(parse_score(""), None);
    }

    #[test]
    fn test_memory_store() {
        let mut store = MemoryStore::new();
        assert_eq!(store.best_score(), None);
        store.set_best_score(900);
        store.set_best_score(1200);
        assert_eq!(store.best_score(), Some(1200));
    }
}
