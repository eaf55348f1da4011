//! Phase 4: Dispatch
//!
//! This is the fourth phase of the `applier` pipeline. It applies the ordered
//! batch through the cluster collaborator using the strategy selected by the
//! run's [`ResourceType`]:
//!
//! - **Core resources** are created or updated in place. Their ordering
//!   policy follows `--sort-on-kind`.
//! - **Deployments** are applied and then followed until the rollout
//!   completes. Only `Deployment` manifests are accepted.
//! - **Custom resources** are applied without a compiled-in schema. Any
//!   manifest with an `apiVersion` is accepted.
//!
//! ## Failure semantics
//!
//! The whole batch is validated for the strategy before the first apply
//! call, so a manifest the strategy cannot take fails the run with nothing
//! applied. Manifests are then applied one at a time in batch order. The
//! first failure stops the batch and is returned naming the failing
//! manifest. Manifests applied before it stay applied: there is no rollback.
//!
//! ## Dry run
//!
//! With dry run set, every manifest goes through the same validation and
//! produces the same captured output, but the collaborator is never called.

use log::info;

use super::ordering::KindOrder;
use super::{ApplyOutcome, OrderedBatch};
use crate::error::{Error, Result};
pub use crate::kube::ResourceType;
use crate::kube::KubeOperations;
use crate::manifest::Manifest;

/// The ordering policy a run of `resource_type` uses.
///
/// Only core resource runs can opt out of kind ordering.
pub fn kind_order_for(resource_type: ResourceType, sort_on_kind: bool) -> KindOrder {
    match resource_type {
        ResourceType::CoreResources => KindOrder::from_sort_on_kind(sort_on_kind),
        ResourceType::Deployments | ResourceType::CustomResources => KindOrder::Standard,
    }
}

/// Applies an ordered batch with one strategy.
pub struct Applier<'a> {
    client: &'a dyn KubeOperations,
    resource_type: ResourceType,
    dry_run: bool,
}

impl<'a> Applier<'a> {
    pub fn new(client: &'a dyn KubeOperations, resource_type: ResourceType) -> Self {
        Self {
            client,
            resource_type,
            dry_run: false,
        }
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn resource_type(&self) -> ResourceType {
        self.resource_type
    }

    /// Execute Phase 4: validate the whole batch for this strategy, then
    /// apply every manifest, stopping at the first failure.
    ///
    /// A validation failure returns before the collaborator sees any
    /// manifest.
    pub fn apply(&self, batch: &OrderedBatch) -> Result<Vec<ApplyOutcome>> {
        batch.iter().try_for_each(|manifest| self.validate(manifest))?;
        batch.iter().map(|manifest| self.apply_one(manifest)).collect()
    }

    fn validate(&self, manifest: &Manifest) -> Result<()> {
        require_name(manifest)?;
        match self.resource_type {
            ResourceType::CoreResources => Ok(()),
            ResourceType::Deployments => validate_deployment(manifest),
            ResourceType::CustomResources => validate_custom_resource(manifest),
        }
    }

    fn apply_one(&self, manifest: &Manifest) -> Result<ApplyOutcome> {
        let status = if self.dry_run {
            info!("{} from {} (dry run)", manifest, manifest.asset);
            None
        } else {
            let status = self
                .client
                .apply(manifest, self.resource_type)
                .map_err(|e| rejected(manifest, &e.to_string()))?;
            info!("{}", status);
            Some(status)
        };

        Ok(ApplyOutcome {
            manifest: manifest.to_string(),
            asset: manifest.asset.to_string(),
            status,
            output: manifest.output_block(),
        })
    }
}

fn require_name(manifest: &Manifest) -> Result<()> {
    if manifest.name.is_empty() {
        return Err(rejected(manifest, "manifest has no metadata.name"));
    }
    Ok(())
}

fn validate_deployment(manifest: &Manifest) -> Result<()> {
    if manifest.kind != "Deployment" {
        return Err(rejected(manifest, "not a Deployment"));
    }
    Ok(())
}

fn validate_custom_resource(manifest: &Manifest) -> Result<()> {
    if manifest.api_version.is_empty() {
        return Err(rejected(manifest, "custom resource has no apiVersion"));
    }
    Ok(())
}

fn rejected(manifest: &Manifest, message: &str) -> Error {
    Error::Apply {
        kind: manifest.kind.clone(),
        name: manifest.name.clone(),
        asset: manifest.asset.to_string(),
        message: message.to_string(),
    }
}
