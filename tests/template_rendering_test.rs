//! Template rendering tests using datatest-stable for test data discovery
//!
//! Every YAML template under `tests/testdata/templates` is rendered with
//! `tests/testdata/values.yaml` and split into manifests. Adding a template
//! to the directory adds a test case.

use applier::assets::AssetName;
use applier::manifest;
use applier::phases::phase2;
use applier::values::ValuesDocument;
use std::path::{Path, PathBuf};

const VALUES: &str = "tests/testdata/values.yaml";

/// Render a template and check the manifests it produces
///
/// Verifies that:
/// 1. The template renders without an unresolved reference
/// 2. The rendered stream is valid YAML
/// 3. Every manifest carries a kind, an apiVersion, and a name
/// 4. No template action survives rendering
/// 5. Rendering twice gives identical bytes
fn test_template_rendering(path: &Path) -> datatest_stable::Result<()> {
    let values_bytes = std::fs::read(VALUES)
        .map_err(|e| format!("Failed to read values {}: {}", VALUES, e))?;
    let values = ValuesDocument::parse(&values_bytes)?;

    let template = std::fs::read(path)
        .map_err(|e| format!("Failed to read template {}: {}", path.display(), e))?;
    let file_name = path
        .file_name()
        .map(PathBuf::from)
        .ok_or_else(|| format!("No file name in {}", path.display()))?;
    let asset = AssetName::new(path.to_path_buf(), file_name);

    let rendered = phase2::render(&asset, &template, b"", &values)?;
    let again = phase2::render(&asset, &template, b"", &values)?;
    assert_eq!(rendered, again, "{} rendered differently twice", path.display());

    let text = String::from_utf8(rendered.clone())?;
    assert!(
        !text.contains("{{"),
        "Unrendered action left in {}",
        path.display()
    );

    let manifests = manifest::split(&asset, &rendered)?;
    assert!(
        !manifests.is_empty(),
        "{} should contain at least one manifest",
        path.display()
    );

    for manifest in &manifests {
        assert!(
            !manifest.api_version.is_empty(),
            "{} in {} has no apiVersion",
            manifest,
            path.display()
        );
        assert!(
            !manifest.name.is_empty(),
            "Manifest {} in {} has no name",
            manifest.index,
            path.display()
        );
    }

    println!("✓ {} rendered {} manifest(s)", path.display(), manifests.len());
    Ok(())
}

datatest_stable::harness!(test_template_rendering, "tests/testdata/templates", r".*\.yaml$");
