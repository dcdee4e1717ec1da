//! Persistence of the current token pair.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use super::Tokens;
use crate::Result;

/// Storage for the current token pair.
///
/// Implementations are not expected to coordinate concurrent writers:
/// the last save wins.
pub trait TokenStore: Send + Sync {
    /// Persist `tokens`, replacing whatever was stored before.
    fn save_tokens(&self, tokens: &Tokens) -> Result<()>;

    /// Load the stored tokens.
    ///
    /// Returns `None` when nothing has been stored yet or the stored data
    /// cannot be read.
    fn load_tokens(&self) -> Option<Tokens>;
}

/// A [`TokenStore`] backed by a JSON file.
///
/// # Example
///
/// ```no_run
/// use schwab_rs::{LocalTokenStore, TokenStore};
///
/// let store = LocalTokenStore::new("/var/lib/my-app/schwab_tokens.json");
/// if store.load_tokens().is_none() {
///     println!("no saved tokens, authorize first");
/// }
/// ```
#[derive(Debug, Clone)]
pub struct LocalTokenStore {
    path: PathBuf,
}

impl LocalTokenStore {
    /// Create a store that reads and writes `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The token file location.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenStore for LocalTokenStore {
    fn save_tokens(&self, tokens: &Tokens) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        // The file is closed when `writer` drops, on success and on error.
        let mut writer = BufWriter::new(File::create(&self.path)?);
        serde_json::to_writer_pretty(&mut writer, tokens)?;
        writer.flush()?;

        tracing::debug!(path = %self.path.display(), "saved tokens");
        Ok(())
    }

    fn load_tokens(&self) -> Option<Tokens> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return None,
            Err(err) => {
                tracing::warn!(path = %self.path.display(), error = %err, "cannot open token file");
                return None;
            }
        };

        match serde_json::from_reader(BufReader::new(file)) {
            Ok(tokens) => Some(tokens),
            Err(err) => {
                tracing::warn!(path = %self.path.display(), error = %err, "ignoring unparseable token file");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn sample_tokens() -> Tokens {
        let now = Utc::now();
        Tokens::new(
            "access",
            "refresh",
            now + Duration::minutes(30),
            now + Duration::days(7),
        )
    }

    #[test]
    fn test_save_then_load_is_field_for_field_equal() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalTokenStore::new(dir.path().join("tokens.json"));
        let tokens = sample_tokens();

        store.save_tokens(&tokens).unwrap();
        assert_eq!(store.load_tokens(), Some(tokens));
    }

    #[test]
    fn test_missing_file_loads_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalTokenStore::new(dir.path().join("absent.json"));
        assert!(store.load_tokens().is_none());
    }

    #[test]
    fn test_corrupt_file_loads_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tokens.json");
        fs::write(&path, "{not json").unwrap();

        let store = LocalTokenStore::new(path);
        assert!(store.load_tokens().is_none());
    }

    #[test]
    fn test_save_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalTokenStore::new(dir.path().join("nested/dir/tokens.json"));

        store.save_tokens(&sample_tokens()).unwrap();
        assert!(store.path().exists());
    }

    #[test]
    fn test_last_writer_wins() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalTokenStore::new(dir.path().join("tokens.json"));
        let now = Utc::now();
        let second = Tokens::new("access-2", "refresh-2", now, now + Duration::days(1));

        store.save_tokens(&sample_tokens()).unwrap();
        store.save_tokens(&second).unwrap();
        assert_eq!(store.load_tokens().unwrap().access_token(), "access-2");
    }
}
