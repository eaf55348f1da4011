//! # Asset Discovery
//!
//! Assets are the template files a run renders. They are selected from one
//! or more roots given with `--path`: a file root contributes itself, a
//! directory root contributes every file beneath it, walked recursively in
//! lexical order so that re-runs over an unchanged tree select the same
//! assets in the same order.
//!
//! Selection then:
//!
//! 1. concatenates root expansions in root order, keeping the first
//!    occurrence of any asset reached through more than one root;
//! 2. drops the header file, wherever it sits;
//! 3. drops anything matched by an exclusion (exact path, directory prefix,
//!    or glob pattern);
//! 4. fails with [`Error::NoFilesSelected`] if nothing is left.

use std::collections::HashSet;
use std::fmt;
use std::path::{Component, Path, PathBuf};

use glob::Pattern;
use log::debug;
use walkdir::WalkDir;

use crate::error::{Error, Result};

/// One input root, tagged by what it points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetRoot {
    File(PathBuf),
    Directory(PathBuf),
}

impl AssetRoot {
    /// Inspect `path` on disk and tag it as a file or directory root.
    pub fn classify<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let metadata = std::fs::metadata(path).map_err(|e| Error::InvalidRoot {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        if metadata.is_dir() {
            Ok(AssetRoot::Directory(path.to_path_buf()))
        } else {
            Ok(AssetRoot::File(path.to_path_buf()))
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            AssetRoot::File(path) | AssetRoot::Directory(path) => path,
        }
    }

    /// Expand the root into asset names, in deterministic order.
    fn expand(&self) -> Result<Vec<AssetName>> {
        match self {
            AssetRoot::File(path) => {
                let relative = path
                    .file_name()
                    .map(PathBuf::from)
                    .unwrap_or_else(|| path.clone());
                Ok(vec![AssetName::new(normalize(path), relative)])
            }
            AssetRoot::Directory(root) => {
                let mut names = Vec::new();
                for entry in WalkDir::new(root).follow_links(true).sort_by_file_name() {
                    let entry = entry?;
                    if !entry.file_type().is_file() {
                        continue;
                    }
                    let relative = entry
                        .path()
                        .strip_prefix(root)
                        .map(Path::to_path_buf)
                        .unwrap_or_else(|_| entry.path().to_path_buf());
                    names.push(AssetName::new(normalize(entry.path()), relative));
                }
                Ok(names)
            }
        }
    }
}

/// Identifier of a selected asset.
///
/// `path` is the path as reached from its root (relative or absolute, as the
/// root was given); `relative` is the same file relative to that root, used
/// when rendered output is laid out in a directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AssetName {
    path: PathBuf,
    relative: PathBuf,
}

impl AssetName {
    pub fn new(path: PathBuf, relative: PathBuf) -> Self {
        Self { path, relative }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn relative(&self) -> &Path {
        &self.relative
    }
}

impl fmt::Display for AssetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

/// One `--exclude` entry.
#[derive(Debug, Clone)]
pub enum Exclusion {
    /// An exact file path, or a directory excluding everything beneath it.
    /// Held in its resolved form so any spelling of the same file matches.
    Path(PathBuf),
    /// A glob pattern matched against the asset path as given.
    Pattern(Pattern),
}

impl Exclusion {
    /// Entries containing glob metacharacters are patterns; anything else is
    /// a path.
    pub fn parse(entry: &str) -> Result<Self> {
        if entry.contains(['*', '?', '[']) {
            Ok(Exclusion::Pattern(Pattern::new(entry)?))
        } else {
            Ok(Exclusion::Path(identity(Path::new(entry))))
        }
    }

    /// `path` is the asset path as reached from its root, `resolved` its
    /// on-disk identity.
    pub fn matches(&self, path: &Path, resolved: &Path) -> bool {
        match self {
            Exclusion::Path(excluded) => resolved.starts_with(excluded),
            Exclusion::Pattern(pattern) => pattern.matches_path(path),
        }
    }
}

/// Reads assets from a set of file and directory roots.
#[derive(Debug, Clone)]
pub struct DirectoriesReader {
    roots: Vec<AssetRoot>,
    header: Option<PathBuf>,
}

impl DirectoriesReader {
    /// Build a reader over `paths`, failing on the first root that does not
    /// exist.
    pub fn new<P: AsRef<Path>>(header: Option<&Path>, paths: &[P]) -> Result<Self> {
        let roots = paths
            .iter()
            .map(AssetRoot::classify)
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            roots,
            header: header.map(Path::to_path_buf),
        })
    }

    pub fn roots(&self) -> &[AssetRoot] {
        &self.roots
    }

    pub fn header(&self) -> Option<&Path> {
        self.header.as_deref()
    }

    /// Resolve the ordered, duplicate-free list of selected assets.
    pub fn asset_names<S: AsRef<str>>(&self, exclude: &[S]) -> Result<Vec<AssetName>> {
        let exclusions = exclude
            .iter()
            .map(|entry| Exclusion::parse(entry.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        let header = self.header.as_deref().map(identity);

        let mut seen = HashSet::new();
        let mut selected = Vec::new();

        for root in &self.roots {
            for name in root.expand()? {
                let resolved = identity(name.path());
                if !seen.insert(resolved.clone()) {
                    continue;
                }
                if header.as_ref() == Some(&resolved) {
                    continue;
                }
                if exclusions.iter().any(|e| e.matches(name.path(), &resolved)) {
                    debug!("Excluding asset {}", name);
                    continue;
                }
                selected.push(name);
            }
        }

        if selected.is_empty() {
            return Err(Error::NoFilesSelected);
        }

        debug!("Selected {} assets", selected.len());
        Ok(selected)
    }

    /// Read the raw bytes of a selected asset.
    pub fn read_asset(&self, name: &AssetName) -> Result<Vec<u8>> {
        std::fs::read(name.path()).map_err(|e| Error::AssetNotFound {
            path: name.path().to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Read the header fragment; empty when no header was configured.
    pub fn read_header(&self) -> Result<Vec<u8>> {
        match &self.header {
            Some(path) => std::fs::read(path).map_err(|e| Error::AssetNotFound {
                path: path.clone(),
                message: e.to_string(),
            }),
            None => Ok(Vec::new()),
        }
    }
}

/// The on-disk identity of `path`, used to compare paths written in
/// different forms (relative, absolute, through `..` or a symlink). Paths
/// that cannot be resolved fall back to their normalized text.
fn identity(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| normalize(path))
}

/// Drop `.` components so that `./dir/a.yaml` and `dir/a.yaml` compare equal.
fn normalize(path: &Path) -> PathBuf {
    let normalized: PathBuf = path
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect();

    if normalized.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        normalized
    }
}
