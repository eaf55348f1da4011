//! Phase 5: Writing Output
//!
//! This is the final phase of the `applier` pipeline. It delivers what the run
//! produced to its sink.
//!
//! ## Process
//!
//! 1.  **Captured Output**: The output blocks collected in Phase 4 (or, for a
//!     render run, the ordered batch) are joined with a newline, a trailing
//!     newline is added, and the result is written to `--output-file` when
//!     one is set and to standard output otherwise. A run that produced no
//!     blocks writes nothing and does not create the file.
//!
//! 2.  **Rendered Files**: For a render run with `--output-dir`, every rendered
//!     document is written under the directory at its path relative to its
//!     root, creating parent directories as needed. Two assets that map to
//!     the same destination (for example `a/x.yaml` and `b/x.yaml` given as
//!     file roots) fail the phase before any file is written.

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use log::debug;

use super::RenderedDocument;
use crate::error::{Error, Result};

/// Join captured output blocks into the text written to the sink.
pub fn join_blocks(blocks: &[String]) -> String {
    if blocks.is_empty() {
        return String::new();
    }
    let mut text = blocks.join("\n");
    text.push('\n');
    text
}

/// Execute Phase 5: write the captured output to `output_file`, or to
/// `stdout` when no file is given.
pub fn execute(output_file: Option<&Path>, blocks: &[String], stdout: &mut dyn Write) -> Result<()> {
    if blocks.is_empty() {
        debug!("No output to write");
        return Ok(());
    }

    let text = join_blocks(blocks);
    match output_file {
        Some(path) => {
            fs::write(path, &text).map_err(|e| Error::Output {
                destination: path.display().to_string(),
                message: e.to_string(),
            })?;
            debug!("Wrote {} block(s) to {}", blocks.len(), path.display());
        }
        None => {
            stdout
                .write_all(text.as_bytes())
                .and_then(|_| stdout.flush())
                .map_err(|e| Error::Output {
                    destination: "standard output".to_string(),
                    message: e.to_string(),
                })?;
        }
    }

    Ok(())
}

/// Write every rendered document under `output_dir`.
pub fn write_rendered(documents: &[RenderedDocument], output_dir: &Path) -> Result<()> {
    let mut destinations: HashMap<PathBuf, &RenderedDocument> = HashMap::new();
    for document in documents {
        let full_path = output_dir.join(document.asset.relative());
        if let Some(first) = destinations.insert(full_path.clone(), document) {
            return Err(Error::Output {
                destination: full_path.display().to_string(),
                message: format!(
                    "both {} and {} would be written here",
                    first.asset, document.asset
                ),
            });
        }
    }

    for document in documents {
        let full_path = output_dir.join(document.asset.relative());

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::Output {
                destination: parent.display().to_string(),
                message: e.to_string(),
            })?;
        }

        fs::write(&full_path, &document.content).map_err(|e| Error::Output {
            destination: full_path.display().to_string(),
            message: e.to_string(),
        })?;
        debug!("Wrote {}", full_path.display());
    }

    Ok(())
}
