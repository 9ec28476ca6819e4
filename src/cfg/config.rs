// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::{collections::HashMap, fs, path::Path};

use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};

use crate::models::params::{MpModel, SecurityLevel, SecurityModel, TransportDomain};

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct Config {
    /// Symbolic target name -> endpoint + security parameters.
    #[serde(rename = "Targets")]
    pub targets: HashMap<String, TargetConfig>,
}

/// One row of the target table: where to send, how long to wait, and under
/// which identity. Timeout/retry defaults follow SNMP-TARGET-MIB.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct TargetConfig {
    #[serde(default, rename = "TransportDomain")]
    pub transport_domain: TransportDomain,

    #[serde(rename = "Address")]
    pub address: String,

    /// Per-try timeout in centiseconds.
    #[serde(default = "default_timeout_cs", rename = "TimeoutCentiseconds")]
    pub timeout_cs: u32,

    #[serde(default = "default_retries", rename = "Retries")]
    pub retries: u32,

    #[serde(rename = "MpModel")]
    pub mp_model: MpModel,

    #[serde(rename = "SecurityModel")]
    pub security_model: SecurityModel,

    /// Community string for v1/v2c, USM user name for v3.
    #[serde(rename = "SecurityName")]
    pub security_name: String,

    #[serde(default, rename = "SecurityLevel")]
    pub security_level: SecurityLevel,
}

fn default_timeout_cs() -> u32 {
    1500
}

fn default_retries() -> u32 {
    3
}

impl Config {
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {path:?}"))?;
        let cfg: Config = serde_yaml::from_str(&raw)
            .with_context(|| format!("failed to parse config file {path:?}"))?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<()> {
        ensure!(!self.targets.is_empty(), "config defines no targets");
        for (name, target) in &self.targets {
            ensure!(
                !target.address.is_empty(),
                "target {name:?}: Address must not be empty"
            );
            ensure!(
                !target.security_name.is_empty(),
                "target {name:?}: SecurityName must not be empty"
            );
            ensure!(
                target.timeout_cs > 0,
                "target {name:?}: TimeoutCentiseconds must be positive"
            );
            if target.mp_model == MpModel::V3 {
                ensure!(
                    target.security_model == SecurityModel::Usm,
                    "target {name:?}: v3 targets require the usm security model"
                );
            } else {
                ensure!(
                    target.security_model != SecurityModel::Usm,
                    "target {name:?}: community targets cannot use the usm security model"
                );
            }
        }
        Ok(())
    }
}
