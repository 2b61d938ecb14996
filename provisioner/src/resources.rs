// SPDX-FileCopyrightText: fixture-gen contributors
//
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use log::info;
use std::fmt;
use variants::{VARIANTS, Variant};

use crate::{Error, ServiceError};

pub const DEFAULT_REGION: &str = "us-west-2";
pub const DEFAULT_FAILOVER_REGION: &str = "us-east-2";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ResourceKind {
    /// Secrets Manager secret
    Secret,
    /// SSM Parameter Store SecureString parameter
    Parameter,
}

impl ResourceKind {
    /// Error code returned when creating a resource whose name is taken.
    pub fn exists_code(&self) -> &'static str {
        match self {
            ResourceKind::Secret => "ResourceExistsException",
            ResourceKind::Parameter => "ParameterAlreadyExists",
        }
    }

    /// Error code returned when deleting a resource that is already gone.
    pub fn not_found_code(&self) -> &'static str {
        match self {
            ResourceKind::Secret => "ResourceNotFoundException",
            ResourceKind::Parameter => "ParameterNotFound",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::Secret => f.write_str("secret"),
            ResourceKind::Parameter => f.write_str("parameter"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Create,
    Cleanup,
}

impl Action {
    fn progressive(&self) -> &'static str {
        match self {
            Action::Create => "Creating",
            Action::Cleanup => "Cleaning up",
        }
    }

    fn past(&self) -> &'static str {
        match self {
            Action::Create => "created",
            Action::Cleanup => "cleaned up",
        }
    }
}

/// A resource every variant owns, once per region.
#[derive(Debug, Clone, Copy)]
pub struct Resource {
    pub kind: ResourceKind,
    pub base_name: &'static str,
    pub value: &'static str,
}

const fn secret(base_name: &'static str, value: &'static str) -> Resource {
    Resource {
        kind: ResourceKind::Secret,
        base_name,
        value,
    }
}

const fn parameter(base_name: &'static str, value: &'static str) -> Resource {
    Resource {
        kind: ResourceKind::Parameter,
        base_name,
        value,
    }
}

/// Handled in this order within each region.
pub const RESOURCES: [Resource; 9] = [
    secret("SecretsManagerTest1", "SecretsManagerTest1Value"),
    secret("SecretsManagerTest2", "SecretsManagerTest2Value"),
    secret("SecretsManagerSync", "SecretUser"),
    secret("SecretsManagerRotationTest", "BeforeRotation"),
    secret(
        "secretsManagerJson",
        r#"{"username": "SecretsManagerUser", "password": "PasswordForSecretsManager"}"#,
    ),
    parameter("ParameterStoreTest1", "ParameterStoreTest1Value"),
    parameter("ParameterStoreTestWithLongName", "ParameterStoreTest2Value"),
    parameter("ParameterStoreRotationTest", "BeforeRotation"),
    parameter(
        "jsonSsm",
        r#"{"username": "ParameterStoreUser", "password": "PasswordForParameterStore"}"#,
    ),
];

/// Primary and failover region; every resource exists in both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Regions {
    pub primary: String,
    pub failover: String,
}

impl Regions {
    pub fn new(primary: impl Into<String>, failover: impl Into<String>) -> Self {
        Self {
            primary: primary.into(),
            failover: failover.into(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        [self.primary.as_str(), self.failover.as_str()].into_iter()
    }
}

impl Default for Regions {
    fn default() -> Self {
        Self::new(DEFAULT_REGION, DEFAULT_FAILOVER_REGION)
    }
}

#[async_trait]
pub trait ResourceBackend: Send + Sync {
    async fn create(
        &self,
        region: &str,
        kind: ResourceKind,
        name: &str,
        value: &str,
    ) -> Result<(), ServiceError>;

    async fn delete(&self, region: &str, kind: ResourceKind, name: &str)
    -> Result<(), ServiceError>;
}

// `$target` is the resource as `located` prints it; `$op` is prefixed to it
// only in the error.
macro_rules! info_if_benign {
    ($result:ident, $benign_code:expr, $op:expr, $target:expr) => {
        match $result {
            Ok(_) => {}
            Err(e) if e.code() == Some($benign_code) => {
                info!("  Already exists/not found: {}", $target)
            }
            Err(source) => {
                return Err(Error::Service {
                    what: format!("{} {}", $op, $target),
                    source,
                });
            }
        }
    };
}

fn located(name: &str, region: &str) -> String {
    format!("{name} in {region}")
}

/// Creates or deletes every resource of `variant` in both regions.
///
/// Not transactional: the first unexpected error aborts the run and leaves
/// whatever was already handled in place. Running it again is safe.
pub async fn manage<B: ResourceBackend + ?Sized>(
    backend: &B,
    regions: &Regions,
    variant: &Variant,
    action: Action,
) -> Result<(), Error> {
    info!("{} resources for {}...", action.progressive(), variant.name());

    for region in regions.iter() {
        for resource in &RESOURCES {
            let name = variant.resource_name(resource.base_name);
            match action {
                Action::Create => {
                    info!("  create {}: {name} in {region}", resource.kind);
                    let result = backend
                        .create(region, resource.kind, &name, resource.value)
                        .await;
                    info_if_benign!(
                        result,
                        resource.kind.exists_code(),
                        format!("create {}", resource.kind),
                        located(&name, region)
                    );
                }
                Action::Cleanup => {
                    info!("  delete {}: {name} in {region}", resource.kind);
                    let result = backend.delete(region, resource.kind, &name).await;
                    info_if_benign!(
                        result,
                        resource.kind.not_found_code(),
                        format!("delete {}", resource.kind),
                        located(&name, region)
                    );
                }
            }
        }
    }

    Ok(())
}

pub async fn manage_all<B: ResourceBackend + ?Sized>(
    backend: &B,
    regions: &Regions,
    action: Action,
) -> Result<(), Error> {
    info!(
        "{} secrets for all test configurations...",
        action.progressive()
    );
    for variant in &VARIANTS {
        manage(backend, regions, variant, action).await?;
    }
    info!("All secrets {} successfully", action.past());
    Ok(())
}
