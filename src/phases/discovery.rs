//! Phase 1: Asset Discovery
//!
//! This is the first phase of the `applier` pipeline. It turns the `--path`,
//! `--header` and `--exclude` flags into the list of assets the run will
//! render.
//!
//! ## Process
//!
//! 1.  **Root Classification**: Every path is checked on disk and tagged as a
//!     file or directory root. A missing root aborts the run.
//!
//! 2.  **Expansion and Selection**: Roots are expanded in order, duplicates
//!     and the header are dropped, and exclusions are applied (see
//!     [`crate::assets`]).
//!
//! 3.  **Validation**: An empty selection is rejected here, before any
//!     template is rendered or any cluster call is made.

use log::{debug, info};

use super::Sources;
use crate::assets::{AssetName, DirectoriesReader};
use crate::error::Result;

/// The reader used for discovery, paired with what it selected.
#[derive(Debug, Clone)]
pub struct Selection {
    pub reader: DirectoriesReader,
    pub assets: Vec<AssetName>,
}

/// Execute Phase 1: select assets from `sources`.
pub fn execute(sources: &Sources) -> Result<Selection> {
    let reader = DirectoriesReader::new(sources.header.as_deref(), &sources.paths)?;
    let assets = reader.asset_names(&sources.exclude)?;

    info!("Selected {} template(s)", assets.len());
    for asset in &assets {
        debug!("  {}", asset);
    }

    Ok(Selection { reader, assets })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::fs;
    use tempfile::TempDir;

    fn scenario() -> TempDir {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("musttemplateasset");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("header.txt"), "apiVersion: v1\n").unwrap();
        fs::write(
            dir.join("body_for_header.txt"),
            "kind: ServiceAccount\nmetadata:\n  name: {{ .ServiceAccount }}\n",
        )
        .unwrap();
        temp
    }

    #[test]
    fn test_phase1_directory_with_header() {
        let temp = scenario();
        let dir = temp.path().join("musttemplateasset");
        let sources = Sources {
            paths: vec![dir.clone()],
            header: Some(dir.join("header.txt")),
            ..Default::default()
        };

        let selection = execute(&sources).unwrap();
        assert_eq!(selection.assets.len(), 1);
        assert!(selection.assets[0]
            .path()
            .ends_with("musttemplateasset/body_for_header.txt"));
    }

    #[test]
    fn test_phase1_wrong_dir() {
        let sources = Sources {
            paths: vec!["wrong_dir".into()],
            ..Default::default()
        };
        let err = execute(&sources).unwrap_err();
        assert!(matches!(err, Error::InvalidRoot { .. }));
    }

    #[test]
    fn test_phase1_empty_sources() {
        let err = execute(&Sources::default()).unwrap_err();
        assert!(matches!(err, Error::NoFilesSelected));
    }

    #[test]
    fn test_phase1_is_deterministic() {
        let temp = scenario();
        let sources = Sources {
            paths: vec![temp.path().to_path_buf()],
            ..Default::default()
        };
        let first = execute(&sources).unwrap().assets;
        let second = execute(&sources).unwrap().assets;
        assert_eq!(first, second);
    }
}
