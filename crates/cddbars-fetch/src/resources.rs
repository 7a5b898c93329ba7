//! Bundled and directory-backed resource trees.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::OnceLock;

use cddbars_types::CddError;

/// Sample CSV files embedded at compile time, keyed by virtual path.
const BUNDLED_FILES: &[(&str, &str)] = &[
    (
        "sample/Binance_BTCUSDT_minute.csv",
        include_str!("../data/sample/Binance_BTCUSDT_minute.csv"),
    ),
    (
        "sample/BinanceBTCData/Binance_BTCUSDT_2024-08_minute.csv",
        include_str!("../data/sample/BinanceBTCData/Binance_BTCUSDT_2024-08_minute.csv"),
    ),
    (
        "sample/BinanceBTCData/Binance_BTCUSDT_2024-09_minute.csv",
        include_str!("../data/sample/BinanceBTCData/Binance_BTCUSDT_2024-09_minute.csv"),
    ),
    (
        "sample/BinanceBTCData/Binance_ETHUSDT_2024-08_minute.csv",
        include_str!("../data/sample/BinanceBTCData/Binance_ETHUSDT_2024-08_minute.csv"),
    ),
];

/// Global bundled resource tree.
static BUNDLED: OnceLock<BundledResources> = OnceLock::new();

/// A read-only tree of named byte blobs.
///
/// Paths are virtual and `/`-separated; a leading or trailing `/` on a
/// directory is ignored.
pub trait ResourceSource: Send + Sync {
    /// Lists the file names directly under `dir`.
    ///
    /// # Errors
    ///
    /// Returns [`CddError::SourceUnavailable`] if `dir` does not exist.
    fn list(&self, dir: &str) -> Result<Vec<String>, CddError>;

    /// Reads the entry at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`CddError::SourceUnavailable`] if there is no such entry.
    fn read(&self, path: &str) -> Result<Vec<u8>, CddError>;
}

/// Joins a virtual directory and an entry name.
#[must_use]
pub fn join(dir: &str, name: &str) -> String {
    let dir = dir.trim_matches('/');
    if dir.is_empty() {
        name.to_string()
    } else {
        format!("{dir}/{name}")
    }
}

/// In-memory resource tree.
#[derive(Debug, Clone, Default)]
pub struct BundledResources {
    entries: BTreeMap<String, &'static [u8]>,
}

impl BundledResources {
    /// Returns the tree of sample files compiled into this crate.
    ///
    /// The tree is initialized lazily on first access.
    #[must_use]
    pub fn global() -> &'static Self {
        BUNDLED.get_or_init(|| {
            Self::from_entries(
                BUNDLED_FILES
                    .iter()
                    .map(|(path, body)| (*path, body.as_bytes())),
            )
        })
    }

    /// Builds a tree from `(path, bytes)` pairs, e.g. from `include_bytes!`.
    #[must_use]
    pub fn from_entries(entries: impl IntoIterator<Item = (&'static str, &'static [u8])>) -> Self {
        Self {
            entries: entries
                .into_iter()
                .map(|(path, body)| (path.trim_matches('/').to_string(), body))
                .collect(),
        }
    }

    /// Returns every entry path in the tree.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the tree has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ResourceSource for BundledResources {
    fn list(&self, dir: &str) -> Result<Vec<String>, CddError> {
        let dir = dir.trim_matches('/');
        let names: Vec<String> = self
            .entries
            .keys()
            .filter_map(|path| {
                let (parent, name) = path.rsplit_once('/').unwrap_or(("", path.as_str()));
                (parent == dir).then(|| name.to_string())
            })
            .collect();

        if names.is_empty() {
            return Err(CddError::unavailable(
                format!("resource:{dir}"),
                "no bundled entries under this directory",
            ));
        }
        Ok(names)
    }

    fn read(&self, path: &str) -> Result<Vec<u8>, CddError> {
        self.entries
            .get(path.trim_matches('/'))
            .map(|body| body.to_vec())
            .ok_or_else(|| CddError::unavailable(format!("resource:{path}"), "no such entry"))
    }
}

/// Resource tree rooted at a filesystem directory.
#[derive(Debug, Clone)]
pub struct DirResources {
    root: PathBuf,
}

impl DirResources {
    /// Creates a tree rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        self.root.join(path.trim_matches('/'))
    }
}

impl ResourceSource for DirResources {
    fn list(&self, dir: &str) -> Result<Vec<String>, CddError> {
        let path = self.resolve(dir);
        let entries = std::fs::read_dir(&path)
            .map_err(|e| CddError::unavailable(path.display().to_string(), e))?;

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        Ok(names)
    }

    fn read(&self, path: &str) -> Result<Vec<u8>, CddError> {
        let path = self.resolve(path);
        std::fs::read(&path).map_err(|e| CddError::unavailable(path.display().to_string(), e))
    }
}
