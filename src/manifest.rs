//! Resource manifests extracted from rendered documents.
//!
//! A rendered document is a YAML stream: it may hold zero, one or several
//! manifests separated by `---`. Empty documents are skipped; every other
//! document must be a mapping with a `kind`.

use std::fmt;

use serde::Deserialize;

use crate::assets::AssetName;
use crate::error::{Error, Result};

/// One resource manifest, as it will be submitted to the cluster.
#[derive(Debug, Clone, PartialEq)]
pub struct Manifest {
    /// The asset whose rendering produced this manifest
    pub asset: AssetName,
    /// Position of the manifest inside its rendered document
    pub index: usize,
    pub kind: String,
    pub api_version: String,
    /// `metadata.name`, falling back to `metadata.generateName`
    pub name: String,
    pub namespace: Option<String>,
    /// Parsed manifest content
    pub value: serde_yaml::Value,
    /// Manifest serialized back to YAML
    pub yaml: String,
}

impl Manifest {
    fn from_value(asset: &AssetName, index: usize, value: serde_yaml::Value) -> Result<Self> {
        if !value.is_mapping() {
            return Err(Error::Manifest {
                asset: asset.to_string(),
                message: format!("document {} is not a mapping", index),
            });
        }

        let kind = string_field(&value, &["kind"]).ok_or_else(|| Error::Manifest {
            asset: asset.to_string(),
            message: format!("document {} has no kind", index),
        })?;
        let api_version = string_field(&value, &["apiVersion"]).unwrap_or_default();
        let name = string_field(&value, &["metadata", "name"])
            .or_else(|| string_field(&value, &["metadata", "generateName"]))
            .unwrap_or_default();
        let namespace = string_field(&value, &["metadata", "namespace"]);
        let yaml = serde_yaml::to_string(&value)?;

        Ok(Self {
            asset: asset.clone(),
            index,
            kind,
            api_version,
            name,
            namespace,
            value,
            yaml,
        })
    }

    /// The captured output block for this manifest.
    pub fn output_block(&self) -> String {
        format!("---\n{}", self.yaml.trim_end())
    }
}

impl fmt::Display for Manifest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind, self.name)
    }
}

fn string_field(value: &serde_yaml::Value, path: &[&str]) -> Option<String> {
    let field = path
        .iter()
        .try_fold(value, |current, key| current.get(*key))?;
    field
        .as_str()
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Split a rendered document into its manifests.
pub fn split(asset: &AssetName, rendered: &[u8]) -> Result<Vec<Manifest>> {
    let mut manifests = Vec::new();

    for (index, document) in serde_yaml::Deserializer::from_slice(rendered).enumerate() {
        let value = serde_yaml::Value::deserialize(document).map_err(|e| Error::Manifest {
            asset: asset.to_string(),
            message: e.to_string(),
        })?;
        if value.is_null() {
            continue;
        }
        manifests.push(Manifest::from_value(asset, index, value)?);
    }

    Ok(manifests)
}
