// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::{fmt, str::FromStr};

use thiserror::Error;

/// Returned when a dotted OID literal cannot be parsed.
#[derive(Debug, Error)]
#[error("invalid object identifier {literal:?}: {reason}")]
pub struct ParseOidError {
    pub literal: String,
    pub reason: &'static str,
}

/// An SNMP object identifier.
///
/// Ordering is lexicographic over the arcs, which is exactly the order a
/// GetNext/GetBulk traversal visits instances in (RFC 3416 § 4.2.2).
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Oid(Vec<u32>);

impl Oid {
    pub fn new(arcs: impl Into<Vec<u32>>) -> Self {
        Self(arcs.into())
    }

    pub fn arcs(&self) -> &[u32] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True when `self` lies inside the subtree rooted at `prefix`.
    ///
    /// Every OID lies inside the subtree of the empty OID.
    pub fn starts_with(&self, prefix: &Oid) -> bool {
        self.0.len() >= prefix.0.len() && self.0[..prefix.0.len()] == prefix.0[..]
    }
}

impl From<&[u32]> for Oid {
    fn from(arcs: &[u32]) -> Self {
        Self(arcs.to_vec())
    }
}

impl fmt::Display for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for arc in &self.0 {
            if !first {
                write!(f, ".")?;
            }
            write!(f, "{arc}")?;
            first = false;
        }
        Ok(())
    }
}

impl FromStr for Oid {
    type Err = ParseOidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().trim_start_matches('.');
        if trimmed.is_empty() {
            return Err(ParseOidError {
                literal: s.to_string(),
                reason: "empty OID",
            });
        }
        let mut arcs = Vec::with_capacity(16);
        for part in trimmed.split('.') {
            let arc = part.parse::<u32>().map_err(|_| ParseOidError {
                literal: s.to_string(),
                reason: "arc is not an unsigned 32-bit integer",
            })?;
            arcs.push(arc);
        }
        Ok(Self(arcs))
    }
}
