// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use anyhow::{Context, Result, ensure};
use bytes::Bytes;

/// Parse a hexadecimal SNMP engine identifier (with or without a `0x`
/// prefix) into bytes, enforcing the RFC 3411 SnmpEngineID size bounds.
pub fn parse_engine_id(raw: &str) -> Result<Bytes> {
    let cleaned = raw.trim();
    let cleaned = cleaned.strip_prefix("0x").unwrap_or(cleaned);

    let decoded = hex::decode(cleaned)
        .with_context(|| format!("engine id {raw:?} is not valid hex"))?;
    ensure!(
        (5..=32).contains(&decoded.len()),
        "engine id must be 5..=32 bytes, got {}",
        decoded.len()
    );

    Ok(Bytes::from(decoded))
}
