//! Phase 2: Rendering
//!
//! This is the second phase of the `applier` pipeline. It produces one
//! rendered document per selected asset and then extracts the resource
//! manifests those documents contain.
//!
//! ## Process
//!
//! 1.  **Header Read**: The header fragment is read once for the whole run.
//!
//! 2.  **Template Processing**: For each asset, the header bytes and the asset
//!     bytes are concatenated (header first) and passed through template
//!     substitution in a single pass, so definitions in either part are
//!     visible to the other.
//!
//! 3.  **Manifest Extraction**: Each rendered document is split as a YAML
//!     stream into individual manifests, in document order.
//!
//! The first failure aborts the phase. No manifest reaches the cluster until
//! every asset has rendered.

use log::debug;

use super::discovery::Selection;
use super::RenderedDocument;
use crate::assets::AssetName;
use crate::error::{Error, Result};
use crate::manifest::{self, Manifest};
use crate::template;
use crate::values::ValuesDocument;

/// Render one asset: header then asset bytes, substituted with `values`.
pub fn render(
    asset: &AssetName,
    asset_bytes: &[u8],
    header: &[u8],
    values: &ValuesDocument,
) -> Result<Vec<u8>> {
    let mut combined = Vec::with_capacity(header.len() + asset_bytes.len());
    combined.extend_from_slice(header);
    combined.extend_from_slice(asset_bytes);

    let text = String::from_utf8(combined).map_err(|_| Error::Template {
        asset: asset.to_string(),
        message: "template is not valid UTF-8".to_string(),
        variable: None,
    })?;

    let rendered = template::compile(&text, values).map_err(|e| Error::Template {
        asset: asset.to_string(),
        message: e.message,
        variable: e.variable,
    })?;

    Ok(rendered.into_bytes())
}

/// Execute Phase 2: render every selected asset.
pub fn execute(selection: &Selection, values: &ValuesDocument) -> Result<Vec<RenderedDocument>> {
    let header = selection.reader.read_header()?;

    let mut documents = Vec::with_capacity(selection.assets.len());
    for asset in &selection.assets {
        let bytes = selection.reader.read_asset(asset)?;
        let content = render(asset, &bytes, &header, values)?;
        debug!("Rendered {} ({} bytes)", asset, content.len());
        documents.push(RenderedDocument {
            asset: asset.clone(),
            content,
        });
    }

    Ok(documents)
}

/// Split every rendered document into manifests, keeping discovery order.
pub fn extract(documents: &[RenderedDocument]) -> Result<Vec<Manifest>> {
    let mut manifests = Vec::new();
    for document in documents {
        manifests.extend(manifest::split(&document.asset, &document.content)?);
    }
    Ok(manifests)
}
