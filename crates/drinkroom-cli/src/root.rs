use std::path::{Path, PathBuf};

use drinkroom_core::paths;

/// Resolve the drink room root directory.
///
/// Priority:
/// 1. `--root` flag / `DRINKROOM_ROOT` env var (passed in as `explicit`)
/// 2. Walk upward from `cwd` looking for `.drinkroom/`
/// 3. Fall back to `cwd`
pub fn resolve_root(explicit: Option<&Path>) -> PathBuf {
    if let Some(p) = explicit {
        return p.to_path_buf();
    }

    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    find_data_dir(&cwd).unwrap_or(cwd)
}

fn find_data_dir(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(paths::DATA_DIR).is_dir())
        .map(Path::to_path_buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn explicit_root_wins() {
        let dir = TempDir::new().unwrap();
        assert_eq!(resolve_root(Some(dir.path())), dir.path());
    }

    #[test]
    fn finds_data_dir_from_nested_directory() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join(".drinkroom")).unwrap();
        let nested = dir.path().join("a/b");
        std::fs::create_dir_all(&nested).unwrap();

        assert_eq!(find_data_dir(&nested).as_deref(), Some(dir.path()));
    }

    #[test]
    fn no_data_dir_yields_none() {
        let dir = TempDir::new().unwrap();
        // TempDir parents (e.g. /tmp) are not expected to carry .drinkroom/.
        assert!(find_data_dir(dir.path()).is_none());
    }
}
