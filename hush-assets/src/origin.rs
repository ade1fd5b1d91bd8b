//! Asset origins - where assets come from when the cache misses

use std::path::{Component, Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while fetching from an origin
#[derive(Error, Debug)]
pub enum OriginError {
    #[error("Asset not found: {0}")]
    NotFound(String),
    #[error("Invalid asset path: {0}")]
    InvalidPath(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Source of asset bodies (the network when offline caching is in play)
pub trait AssetOrigin {
    fn fetch(&self, path: &str) -> Result<Vec<u8>, OriginError>;
}

/// Serves assets from files under a root directory
#[derive(Debug, Clone)]
pub struct DirOrigin {
    root: PathBuf,
}

impl DirOrigin {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map an asset path ("/help.txt") to a file under the root
    ///
    /// Only plain relative components are accepted.
    fn resolve(&self, path: &str) -> Result<PathBuf, OriginError> {
        let relative = Path::new(path.trim_start_matches('/'));
        if relative.as_os_str().is_empty() {
            return Err(OriginError::InvalidPath(path.to_string()));
        }
        if !relative.components().all(|c| matches!(c, Component::Normal(_))) {
            return Err(OriginError::InvalidPath(path.to_string()));
        }
        Ok(self.root.join(relative))
    }
}

impl AssetOrigin for DirOrigin {
    fn fetch(&self, path: &str) -> Result<Vec<u8>, OriginError> {
        let file = self.resolve(path)?;
        match std::fs::read(&file) {
            Ok(body) => Ok(body),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(OriginError::NotFound(path.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn temp_root(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("hush-origin-{}-{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(dir.join("icons")).unwrap();
        dir
    }

    #[test]
    fn test_fetch_file() {
        let root = temp_root("fetch");
        fs::write(root.join("help.txt"), b"press space").unwrap();
        fs::write(root.join("icons").join("app.svg"), b"<svg/>").unwrap();

        let origin = DirOrigin::new(&root);
        assert_eq!(origin.fetch("/help.txt").unwrap(), b"press space");
        assert_eq!(origin.fetch("icons/app.svg").unwrap(), b"<svg/>");

        fs::remove_dir_all(&root).unwrap();
    }

    #[test]
    fn test_missing_file() {
        let root = temp_root("missing");
        let origin = DirOrigin::new(&root);

        assert!(matches!(origin.fetch("/nope.txt"), Err(OriginError::NotFound(_))));

        fs::remove_dir_all(&root).unwrap();
    }

    #[test]
    fn test_rejects_escaping_paths() {
        let origin = DirOrigin::new("/srv/assets");

        assert!(matches!(origin.fetch("/"), Err(OriginError::InvalidPath(_))));
        assert!(matches!(origin.fetch(""), Err(OriginError::InvalidPath(_))));
        assert!(matches!(
            origin.fetch("/../etc/passwd"),
            Err(OriginError::InvalidPath(_))
        ));
        assert!(matches!(
            origin.fetch("icons/./../../x"),
            Err(OriginError::InvalidPath(_))
        ));
    }
}
