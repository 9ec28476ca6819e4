// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::fmt;

use bytes::Bytes;

use crate::models::oid::Oid;

/// A typed SNMP object value as carried in a varbind.
///
/// The first group mirrors the ASN.1 syntaxes of RFC 1155/2578; the last
/// three are the varbind exceptions of RFC 3416 § 4.2.1. `EndOfMibView`
/// doubles as the version-neutral end-of-view marker inside this crate: the
/// v1 codec synthesises it from a `noSuchName` walk response so the walk
/// drivers can recognise the end of the view without knowing the version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Null,
    Integer(i32),
    OctetString(Bytes),
    ObjectIdentifier(Oid),
    IpAddress([u8; 4]),
    Counter32(u32),
    Gauge32(u32),
    TimeTicks(u32),
    Counter64(u64),
    Opaque(Bytes),
    NoSuchObject,
    NoSuchInstance,
    EndOfMibView,
}

impl Value {
    /// Convenience constructor copying a byte/str literal.
    pub fn octet_string(raw: impl AsRef<[u8]>) -> Self {
        Self::OctetString(Bytes::copy_from_slice(raw.as_ref()))
    }

    /// True for the RFC 3416 varbind exceptions.
    pub fn is_exception(&self) -> bool {
        matches!(
            self,
            Self::NoSuchObject | Self::NoSuchInstance | Self::EndOfMibView
        )
    }

    pub fn is_end_of_mib_view(&self) -> bool {
        matches!(self, Self::EndOfMibView)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Integer(v) => write!(f, "{v}"),
            Self::OctetString(raw) => write!(f, "{}", String::from_utf8_lossy(raw)),
            Self::ObjectIdentifier(oid) => write!(f, "{oid}"),
            Self::IpAddress(a) => write!(f, "{}.{}.{}.{}", a[0], a[1], a[2], a[3]),
            Self::Counter32(v) => write!(f, "{v}"),
            Self::Gauge32(v) => write!(f, "{v}"),
            Self::TimeTicks(v) => write!(f, "{v}"),
            Self::Counter64(v) => write!(f, "{v}"),
            Self::Opaque(raw) => write!(f, "opaque({})", hex::encode(raw)),
            Self::NoSuchObject => write!(f, "noSuchObject"),
            Self::NoSuchInstance => write!(f, "noSuchInstance"),
            Self::EndOfMibView => write!(f, "endOfMibView"),
        }
    }
}
