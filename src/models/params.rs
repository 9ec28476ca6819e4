// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// SNMP message-processing model (RFC 3411): v1 = 0, v2c = 1, v3 = 3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MpModel {
    #[serde(rename = "v1")]
    V1,
    #[serde(rename = "v2c")]
    V2c,
    #[serde(rename = "v3")]
    V3,
}

/// PDU encoding family: 0 for the v1 PDU set, 1 for the v2c/v3 PDU set.
///
/// SNMPv3 carries v2c-family PDUs, so two codec modules cover all three
/// message-processing models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PduVersion {
    V1,
    V2c,
}

/// SNMP security model (RFC 3411): community v1 = 1, community v2c = 2,
/// USM = 3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SecurityModel {
    #[serde(rename = "v1")]
    V1,
    #[serde(rename = "v2c")]
    V2c,
    #[serde(rename = "usm")]
    Usm,
}

/// USM security level. Community-based models always run `noAuthNoPriv`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
pub enum SecurityLevel {
    #[default]
    #[serde(rename = "noAuthNoPriv")]
    NoAuthNoPriv,
    #[serde(rename = "authNoPriv")]
    AuthNoPriv,
    #[serde(rename = "authPriv")]
    AuthPriv,
}

/// Transport domain of a target endpoint.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum TransportDomain {
    #[default]
    Udp,
    Udp6,
}

/// SNMPv3 context selector attached to a request.
///
/// An empty/default scope is a wildcard on the way back: a response is only
/// required to carry the same context when the request named one.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    pub context_engine_id: Option<Bytes>,
    pub context_name: String,
}

impl Scope {
    pub fn new(context_engine_id: Option<Bytes>, context_name: impl Into<String>) -> Self {
        Self {
            context_engine_id,
            context_name: context_name.into(),
        }
    }
}
