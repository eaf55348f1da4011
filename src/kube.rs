//! # Cluster Access
//!
//! The pipeline reaches the cluster through one trait, [`KubeOperations`],
//! so that the apply strategies can be exercised in tests against a mock and
//! so that the client machinery stays outside the library core.
//!
//! The default implementation, [`Kubectl`], shells out to the system
//! `kubectl`. It picks up the same kubeconfig, context, and credentials a
//! user's interactive `kubectl` would, and it honours a per-request timeout
//! so that a hung API server surfaces as an error instead of blocking a run.
//!
//! | Resource type      | Command                                                      |
//! |--------------------|--------------------------------------------------------------|
//! | `CoreResources`    | `kubectl apply -f -`                                         |
//! | `Deployments`      | `kubectl apply -f -`, then `kubectl rollout status`          |
//! | `CustomResources`  | `kubectl apply --server-side --force-conflicts -f -`         |

use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use log::debug;

use crate::error::{Error, Result};
use crate::manifest::Manifest;

/// Which apply strategy a run uses. Set once per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceType {
    /// Typed core resources, created or updated in place
    CoreResources,
    /// Deployments, applied and then followed until their rollout completes
    Deployments,
    /// Custom resources, applied without a compiled-in schema
    CustomResources,
}

impl ResourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::CoreResources => "core-resources",
            ResourceType::Deployments => "deployments",
            ResourceType::CustomResources => "custom-resources",
        }
    }
}

/// Mutating access to a cluster.
///
/// Implementations return the human-readable status line for the manifest
/// (for example `configmap/settings configured`). Dry runs never reach this
/// trait.
pub trait KubeOperations: Send + Sync {
    fn apply(&self, manifest: &Manifest, mode: ResourceType) -> Result<String>;
}

/// [`KubeOperations`] backed by the `kubectl` binary.
#[derive(Debug, Clone)]
pub struct Kubectl {
    binary: PathBuf,
    kubeconfig: Option<PathBuf>,
    context: Option<String>,
    request_timeout: Option<String>,
    rollout_timeout: String,
}

impl Default for Kubectl {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("kubectl"),
            kubeconfig: None,
            context: None,
            request_timeout: None,
            rollout_timeout: "5m".to_string(),
        }
    }
}

impl Kubectl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_binary(mut self, binary: impl Into<PathBuf>) -> Self {
        self.binary = binary.into();
        self
    }

    pub fn with_kubeconfig(mut self, kubeconfig: Option<PathBuf>) -> Self {
        self.kubeconfig = kubeconfig;
        self
    }

    pub fn with_context(mut self, context: Option<String>) -> Self {
        self.context = context;
        self
    }

    /// Timeout passed to every request, e.g. `30s`.
    pub fn with_request_timeout(mut self, timeout: Option<String>) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// How long `rollout status` waits for a Deployment.
    pub fn with_rollout_timeout(mut self, timeout: impl Into<String>) -> Self {
        self.rollout_timeout = timeout.into();
        self
    }

    /// Connection flags shared by every invocation.
    fn global_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        if let Some(kubeconfig) = &self.kubeconfig {
            args.push(format!("--kubeconfig={}", kubeconfig.display()));
        }
        if let Some(context) = &self.context {
            args.push(format!("--context={}", context));
        }
        if let Some(timeout) = &self.request_timeout {
            args.push(format!("--request-timeout={}", timeout));
        }
        args
    }

    fn apply_args(mode: ResourceType) -> Vec<String> {
        let mut args = vec!["apply".to_string()];
        if mode == ResourceType::CustomResources {
            args.push("--server-side".to_string());
            args.push("--force-conflicts".to_string());
        }
        args.push("-f".to_string());
        args.push("-".to_string());
        args
    }

    fn rollout_args(&self, manifest: &Manifest) -> Vec<String> {
        let mut args = vec![
            "rollout".to_string(),
            "status".to_string(),
            format!("deployment/{}", manifest.name),
            format!("--timeout={}", self.rollout_timeout),
        ];
        if let Some(namespace) = &manifest.namespace {
            args.push(format!("--namespace={}", namespace));
        }
        args
    }

    /// Run kubectl with `args`, feeding `stdin` if given, and return stdout.
    fn run(&self, args: &[String], stdin: Option<&str>) -> Result<String> {
        let command_line = args.join(" ");
        debug!("Running kubectl {}", command_line);

        let mut child = Command::new(&self.binary)
            .args(self.global_args())
            .args(args)
            .stdin(if stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| Error::Kubectl {
                command: command_line.clone(),
                stderr: e.to_string(),
            })?;

        if let (Some(input), Some(mut pipe)) = (stdin, child.stdin.take()) {
            pipe.write_all(input.as_bytes())?;
        }

        let output = child.wait_with_output()?;
        if !output.status.success() {
            return Err(Error::Kubectl {
                command: command_line,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

impl KubeOperations for Kubectl {
    fn apply(&self, manifest: &Manifest, mode: ResourceType) -> Result<String> {
        let applied = self.run(&Self::apply_args(mode), Some(&manifest.yaml))?;

        if mode == ResourceType::Deployments {
            let rollout = self.run(&self.rollout_args(manifest), None)?;
            return Ok(format!("{}\n{}", applied, rollout));
        }

        Ok(applied)
    }
}
