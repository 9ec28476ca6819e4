// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Environment variable overriding the configuration path.
pub const CONFIG_ENV: &str = "SNMP_CMDGEN_CONFIG";

/// Resolve a configuration path: `SNMP_CMDGEN_CONFIG` wins over the given
/// default, relative paths are anchored at the current working directory.
pub fn resolve_config_path(rel: &str) -> Result<PathBuf> {
    let chosen = std::env::var(CONFIG_ENV).unwrap_or_else(|_| rel.to_string());
    let p = Path::new(&chosen);

    let abs = if p.is_absolute() {
        p.to_path_buf()
    } else {
        std::env::current_dir()
            .context("cannot get current working dir")?
            .join(p)
    };

    let canon = abs
        .canonicalize()
        .with_context(|| format!("failed to canonicalize path {abs:?}"))?;

    Ok(canon)
}
