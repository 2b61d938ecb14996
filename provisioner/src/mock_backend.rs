// SPDX-FileCopyrightText: fixture-gen contributors
//
// SPDX-License-Identifier: MIT

// In-memory stand-in for Secrets Manager and Parameter Store, answering
// with the same error codes the real services use.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Mutex;

use crate::{ResourceBackend, ResourceKind, ServiceError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub region: String,
    pub kind: ResourceKind,
    pub name: String,
}

type Key = (String, ResourceKind, String);

#[derive(Default)]
pub struct MemoryBackend {
    store: Mutex<BTreeMap<Key, String>>,
    calls: Mutex<Vec<Call>>,
    fail_with: Option<&'static str>,
}

impl MemoryBackend {
    /// Every call fails with `code`.
    pub fn failing(code: &'static str) -> Self {
        Self {
            fail_with: Some(code),
            ..Default::default()
        }
    }

    pub fn len(&self) -> usize {
        self.store.lock().unwrap().len()
    }

    pub fn value(&self, region: &str, kind: ResourceKind, name: &str) -> Option<String> {
        let key = (region.to_string(), kind, name.to_string());
        self.store.lock().unwrap().get(&key).cloned()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, region: &str, kind: ResourceKind, name: &str) -> Result<Key, ServiceError> {
        self.calls.lock().unwrap().push(Call {
            region: region.to_string(),
            kind,
            name: name.to_string(),
        });
        match self.fail_with {
            Some(code) => Err(ServiceError::new(Some(code), "injected failure")),
            None => Ok((region.to_string(), kind, name.to_string())),
        }
    }
}

#[async_trait]
impl ResourceBackend for MemoryBackend {
    async fn create(
        &self,
        region: &str,
        kind: ResourceKind,
        name: &str,
        value: &str,
    ) -> Result<(), ServiceError> {
        let key = self.record(region, kind, name)?;
        let mut store = self.store.lock().unwrap();
        if store.contains_key(&key) {
            let msg = format!("The {kind} {name} already exists.");
            return Err(ServiceError::new(Some(kind.exists_code()), msg));
        }
        store.insert(key, value.to_string());
        Ok(())
    }

    async fn delete(
        &self,
        region: &str,
        kind: ResourceKind,
        name: &str,
    ) -> Result<(), ServiceError> {
        let key = self.record(region, kind, name)?;
        match self.store.lock().unwrap().remove(&key) {
            Some(_) => Ok(()),
            None => Err(ServiceError::new(
                Some(kind.not_found_code()),
                format!("{kind} {name} not found"),
            )),
        }
    }
}
