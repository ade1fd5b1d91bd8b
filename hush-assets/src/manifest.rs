//! Fixed list of static assets pre-fetched on install

/// Versioned set of asset paths stored under one cache name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    /// Cache name; bump the version suffix to invalidate old caches
    pub cache_name: String,
    pub paths: Vec<String>,
}

impl Manifest {
    /// Current cache name
    pub const CACHE_NAME: &'static str = "hush-assets-v1";

    /// Paths served by the terminal UI
    pub const DEFAULT_PATHS: &'static [&'static str] = &["/help.txt", "/banner.txt"];

    pub fn new(cache_name: impl Into<String>, paths: &[&str]) -> Self {
        Self {
            cache_name: cache_name.into(),
            paths: paths.iter().map(|p| p.to_string()).collect(),
        }
    }

    pub fn contains(&self, path: &str) -> bool {
        self.paths.iter().any(|p| p == path)
    }
}

impl Default for Manifest {
    fn default() -> Self {
        Self::new(Self::CACHE_NAME, Self::DEFAULT_PATHS)
    }
}
