//! Path utilities for determining data storage locations.
//!
//! Data lives in `$POCKET_TODO_HOME` when that variable is set, otherwise in
//! the platform data directory under `pocket-todo/`.

use std::path::{Path, PathBuf};

/// Environment variable that overrides the data directory.
pub const HOME_ENV_VAR: &str = "POCKET_TODO_HOME";

/// Directory name under the platform data directory.
const DATA_DIR_NAME: &str = "pocket-todo";

/// The database filename.
pub const DATABASE_FILENAME: &str = "todos.sqlite3";

/// The config filename.
pub const CONFIG_FILENAME: &str = "config.yaml";

/// Get the data directory.
///
/// Returns `None` if neither the override nor a platform data directory is
/// available.
#[must_use]
pub fn data_dir() -> Option<PathBuf> {
    match std::env::var_os(HOME_ENV_VAR) {
        Some(dir) if !dir.is_empty() => Some(PathBuf::from(dir)),
        _ => dirs::data_dir().map(|base| base.join(DATA_DIR_NAME)),
    }
}

/// Database path inside `dir`.
#[must_use]
pub fn db_path_in(dir: &Path) -> PathBuf {
    dir.join(DATABASE_FILENAME)
}

/// Config path inside `dir`.
#[must_use]
pub fn config_path_in(dir: &Path) -> PathBuf {
    dir.join(CONFIG_FILENAME)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    struct EnvGuard(Option<std::ffi::OsString>);

    impl EnvGuard {
        fn set(value: &str) -> Self {
            let previous = std::env::var_os(HOME_ENV_VAR);
            std::env::set_var(HOME_ENV_VAR, value);
            Self(previous)
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            match self.0.take() {
                Some(v) => std::env::set_var(HOME_ENV_VAR, v),
                None => std::env::remove_var(HOME_ENV_VAR),
            }
        }
    }

    #[test]
    #[serial]
    fn test_data_dir_uses_override() {
        let _guard = EnvGuard::set("/tmp/pocket-home");
        assert_eq!(data_dir(), Some(PathBuf::from("/tmp/pocket-home")));
    }

    #[test]
    #[serial]
    fn test_data_dir_ignores_empty_override() {
        let _guard = EnvGuard::set("");
        if let Some(base) = dirs::data_dir() {
            assert_eq!(data_dir(), Some(base.join("pocket-todo")));
        }
    }

    #[test]
    fn test_file_paths() {
        let dir = Path::new("/data");
        assert_eq!(db_path_in(dir), PathBuf::from("/data/todos.sqlite3"));
        assert_eq!(config_path_in(dir), PathBuf::from("/data/config.yaml"));
    }
}
