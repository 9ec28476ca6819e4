// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::collections::HashMap;

use thiserror::Error;

use crate::{
    cfg::config::Config,
    models::params::{MpModel, SecurityLevel, SecurityModel, TransportDomain},
};

#[derive(Debug, Error)]
pub enum TargetError {
    #[error("no such target: {0:?}")]
    UnknownTarget(String),
}

/// Everything a driver needs to know about a target, resolved once per
/// request from the store (the flattened SNMP-TARGET-MIB addr + params
/// rows).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetInfo {
    pub transport_domain: TransportDomain,
    pub transport_address: String,
    /// Per-try timeout in centiseconds, as held in the target MIB.
    pub timeout_cs: u32,
    /// Maximum retries; total attempts is one more than this.
    pub retry_limit: u32,
    pub mp_model: MpModel,
    pub security_model: SecurityModel,
    pub security_name: String,
    pub security_level: SecurityLevel,
}

/// Read-only store mapping symbolic target names onto [`TargetInfo`].
#[derive(Debug, Default)]
pub struct TargetStore {
    targets: HashMap<String, TargetInfo>,
}

impl TargetStore {
    pub fn from_config(cfg: &Config) -> Self {
        let targets = cfg
            .targets
            .iter()
            .map(|(name, tc)| {
                (name.clone(), TargetInfo {
                    transport_domain: tc.transport_domain,
                    transport_address: tc.address.clone(),
                    timeout_cs: tc.timeout_cs,
                    retry_limit: tc.retries,
                    mp_model: tc.mp_model,
                    security_model: tc.security_model,
                    security_name: tc.security_name.clone(),
                    security_level: tc.security_level,
                })
            })
            .collect();
        Self { targets }
    }

    pub fn insert(&mut self, name: impl Into<String>, info: TargetInfo) {
        self.targets.insert(name.into(), info);
    }

    pub fn resolve(&self, name: &str) -> Result<TargetInfo, TargetError> {
        self.targets
            .get(name)
            .cloned()
            .ok_or_else(|| TargetError::UnknownTarget(name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}
