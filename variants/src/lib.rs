// SPDX-FileCopyrightText: fixture-gen contributors
//
// SPDX-License-Identifier: MIT

//! The fixed test matrix: every combination of node architecture and
//! authentication mode the integration tests run against.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arch {
    X64,
    Arm,
}

impl Arch {
    pub fn as_str(&self) -> &'static str {
        match self {
            Arch::X64 => "x64",
            Arch::Arm => "arm",
        }
    }

    /// Instance type used for the cluster's nodes when the
    /// `NODE_TYPE_*` variable is not set.
    pub fn default_node_type(&self) -> &'static str {
        match self {
            Arch::X64 => "m5.large",
            Arch::Arm => "m6g.large",
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthMode {
    /// IAM roles for service accounts
    Irsa,
    /// EKS Pod Identity
    PodIdentity,
}

impl AuthMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthMode::Irsa => "irsa",
            AuthMode::PodIdentity => "pod-identity",
        }
    }
}

impl fmt::Display for AuthMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Variant {
    pub arch: Arch,
    pub auth: AuthMode,
    pub log_color: &'static str,
    pub color_code: &'static str,
}

pub const VARIANTS: [Variant; 4] = [
    Variant {
        arch: Arch::X64,
        auth: AuthMode::Irsa,
        log_color: "CYAN",
        color_code: "36",
    },
    Variant {
        arch: Arch::X64,
        auth: AuthMode::PodIdentity,
        log_color: "MAGENTA",
        color_code: "35",
    },
    Variant {
        arch: Arch::Arm,
        auth: AuthMode::Irsa,
        log_color: "BLUE",
        color_code: "34",
    },
    Variant {
        arch: Arch::Arm,
        auth: AuthMode::PodIdentity,
        log_color: "YELLOW",
        color_code: "33",
    },
];

pub fn lookup(name: &str) -> Option<&'static Variant> {
    VARIANTS.iter().find(|v| v.name() == name)
}

impl Variant {
    /// `{arch}-{auth}`, e.g. `arm-pod-identity`. Doubles as the suffix of
    /// every cloud resource and generated file belonging to this variant.
    pub fn name(&self) -> String {
        format!("{}-{}", self.arch, self.auth)
    }

    /// External identifier of a secret or parameter, identical in every region.
    pub fn resource_name(&self, base: &str) -> String {
        format!("{base}-{}", self.name())
    }

    pub fn service_account(&self) -> String {
        format!("basic-test-mount-sa-{}", self.name())
    }

    pub fn default_node_type(&self) -> &'static str {
        self.arch.default_node_type()
    }

    pub fn node_type_var(&self) -> String {
        format!("NODE_TYPE_{}", self.env_suffix())
    }

    pub fn kubeconfig_var(&self) -> String {
        format!("KUBECONFIG_FILE_{}", self.env_suffix())
    }

    fn env_suffix(&self) -> String {
        format!(
            "{}_{}",
            self.arch.as_str().to_uppercase(),
            self.auth.as_str().to_uppercase().replace('-', "_")
        )
    }

    /// Simple `{{KEY}}` substitutions available to every template, in
    /// substitution order.
    pub fn attributes(&self) -> Vec<(&'static str, String)> {
        vec![
            ("ARCH", self.arch.to_string()),
            ("AUTH_TYPE", self.auth.to_string()),
            ("LOG_COLOR", self.log_color.to_string()),
            ("COLOR_CODE", self.color_code.to_string()),
            ("NODE_TYPE_VAR", self.node_type_var()),
            ("DEFAULT_NODE_TYPE", self.default_node_type().to_string()),
            ("KUBECONFIG_VAR", self.kubeconfig_var()),
        ]
    }
}
