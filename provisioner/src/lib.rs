// SPDX-FileCopyrightText: fixture-gen contributors
//
// SPDX-License-Identifier: MIT

// Cloud-side setup for the integration tests: the secrets and parameters
// each test variant mounts, and the private provider image it installs.

pub mod aws;
pub mod image;
pub mod resources;

#[cfg(test)]
mod mock_backend;

pub use resources::{Action, Regions, ResourceBackend, ResourceKind, manage, manage_all};

/// A failed call to an AWS service, reduced to what the callers branch on.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct ServiceError {
    code: Option<String>,
    message: String,
}

impl ServiceError {
    pub fn new(code: Option<&str>, message: impl Into<String>) -> Self {
        Self {
            code: code.map(str::to_string),
            message: message.into(),
        }
    }

    /// Service error code, e.g. `ResourceExistsException`.
    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to {what}: {source}")]
    Service {
        what: String,
        #[source]
        source: ServiceError,
    },
}
