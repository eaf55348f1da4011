//! Shared test utilities for integration and E2E tests.
//!
//! This module provides common fixtures and template snippets to reduce
//! duplication across test files.
//!
//! ## Usage
//!
//! Add `mod common;` to your test file, then use the helpers:
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = TestFixture::new().with_service_account_templates();
//!     fixture.command().args(["render", "--path", "templates"]).assert().success();
//! }
//! ```

use assert_fs::prelude::*;
use std::path::{Path, PathBuf};

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    #[allow(unused_imports)]
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    #[allow(unused_imports)]
    pub use assert_fs::TempDir;
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::templates;
    pub use super::TestFixture;
}

/// Template and values snippets for testing.
#[allow(dead_code)]
pub mod templates {
    /// Header fragment prepended to every template.
    pub const HEADER: &str = "apiVersion: v1\n";

    /// Body rendered after [`HEADER`].
    pub const SERVICE_ACCOUNT_BODY: &str =
        "kind: ServiceAccount\nmetadata:\n  name: {{ .ServiceAccount }}\n";

    /// Values for [`SERVICE_ACCOUNT_BODY`].
    pub const SERVICE_ACCOUNT_VALUES: &str = "ServiceAccount: my-sa\n";

    /// A Deployment followed by the Namespace it lives in.
    pub const DEPLOYMENT_THEN_NAMESPACE: &str = r#"apiVersion: apps/v1
kind: Deployment
metadata:
  name: {{ .Name }}
  namespace: {{ .Namespace }}
---
apiVersion: v1
kind: Namespace
metadata:
  name: {{ .Namespace }}
"#;

    /// Values for [`DEPLOYMENT_THEN_NAMESPACE`].
    pub const DEPLOYMENT_VALUES: &str = "Name: web\nNamespace: prod\n";

    /// A template referencing a key no values document defines.
    pub const UNDEFINED_REFERENCE: &str =
        "apiVersion: v1\nkind: ConfigMap\nmetadata:\n  name: {{ .Undefined }}\n";
}

/// A test fixture that provides a temporary directory laid out like a
/// template repository.
///
/// # Example
///
/// ```rust,ignore
/// let fixture = TestFixture::new()
///     .with_values(templates::DEPLOYMENT_VALUES)
///     .with_file("templates/app.yaml", templates::DEPLOYMENT_THEN_NAMESPACE);
///
/// fixture.command().args(["render", "--path", "templates"]).assert().success();
/// ```
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

impl TestFixture {
    /// Create a new test fixture with an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Add a `values.yaml` file with the given content.
    pub fn with_values(self, content: &str) -> Self {
        self.with_file("values.yaml", content)
    }

    /// Add `musttemplateasset/header.txt`, `musttemplateasset/body_for_header.txt`
    /// and matching values.
    pub fn with_service_account_templates(self) -> Self {
        self.with_file("musttemplateasset/header.txt", templates::HEADER)
            .with_file(
                "musttemplateasset/body_for_header.txt",
                templates::SERVICE_ACCOUNT_BODY,
            )
            .with_values(templates::SERVICE_ACCOUNT_VALUES)
    }

    /// Add a file with the given path and content.
    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.temp_dir
            .child(path)
            .write_str(content)
            .expect("Failed to write file");
        self
    }

    /// Get the path to the temporary directory.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Get the path to the values file.
    #[allow(dead_code)]
    pub fn values_path(&self) -> PathBuf {
        self.temp_dir.path().join("values.yaml")
    }

    /// Create a child path in the temp directory.
    #[allow(dead_code)]
    pub fn child(&self, path: &str) -> assert_fs::fixture::ChildPath {
        self.temp_dir.child(path)
    }

    /// Create a command configured to run in this fixture's directory.
    ///
    /// Environment that would otherwise leak into the run is cleared.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("applier");
        cmd.current_dir(self.path())
            .env_remove("APPLIER_VALUES")
            .env_remove("APPLIER_KUBECTL")
            .env_remove("KUBECONFIG")
            .env_remove("RUST_LOG");
        cmd
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_creates_temp_dir() {
        let fixture = TestFixture::new();
        assert!(fixture.path().exists());
    }

    #[test]
    fn test_fixture_with_service_account_templates() {
        let fixture = TestFixture::new().with_service_account_templates();
        assert!(fixture.path().join("musttemplateasset/header.txt").exists());
        assert!(fixture.values_path().exists());
    }

    #[test]
    fn test_values_snippets_are_valid_yaml() {
        for values in [
            templates::SERVICE_ACCOUNT_VALUES,
            templates::DEPLOYMENT_VALUES,
        ] {
            let parsed: Result<serde_yaml::Value, _> = serde_yaml::from_str(values);
            assert!(parsed.is_ok(), "Invalid values: {}", values);
        }
    }
}
