// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::{fmt, time::Instant};

use bytes::Bytes;
use thiserror::Error;

use crate::models::{
    params::{MpModel, PduVersion, SecurityLevel, SecurityModel, TransportDomain},
    pdu::Pdu,
};

/// Dispatcher-assigned token identifying one transmission attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SendHandle(pub u64);

impl fmt::Display for SendHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Failure classes a dispatcher reports in place of a response PDU.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ErrorIndication {
    #[error("requestTimedOut")]
    RequestTimedOut,
    #[error("transportFailure: {0}")]
    TransportFailure(String),
    #[error("securityFailure: {0}")]
    SecurityFailure(String),
}

/// Non-PDU outcome of a transmission attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusInformation {
    pub error_indication: ErrorIndication,
}

impl From<ErrorIndication> for StatusInformation {
    fn from(error_indication: ErrorIndication) -> Self {
        Self { error_indication }
    }
}

/// One PDU plus everything the dispatcher needs to secure and route it.
#[derive(Debug, Clone)]
pub struct OutgoingPdu {
    pub transport_domain: TransportDomain,
    pub transport_address: String,
    pub mp_model: MpModel,
    pub security_model: SecurityModel,
    pub security_name: String,
    pub security_level: SecurityLevel,
    pub context_engine_id: Option<Bytes>,
    pub context_name: String,
    pub pdu_version: PduVersion,
    pub pdu: Pdu,
}

/// What the dispatcher hands back for one transmission attempt: either a
/// response PDU under the identity it arrived with, or a status record.
#[derive(Debug)]
pub struct ResponseEvent {
    pub mp_model: MpModel,
    pub security_model: SecurityModel,
    pub security_name: String,
    pub security_level: SecurityLevel,
    pub context_engine_id: Option<Bytes>,
    pub context_name: String,
    pub pdu_version: PduVersion,
    /// Present iff `status_information` is absent.
    pub pdu: Option<Pdu>,
    pub status_information: Option<StatusInformation>,
    pub send_handle: SendHandle,
}

impl ResponseEvent {
    /// A successful response echoing the identity the request went out
    /// with.
    pub fn matching(out: &OutgoingPdu, send_handle: SendHandle, pdu: Pdu) -> Self {
        Self {
            mp_model: out.mp_model,
            security_model: out.security_model,
            security_name: out.security_name.clone(),
            security_level: out.security_level,
            context_engine_id: out.context_engine_id.clone(),
            context_name: out.context_name.clone(),
            pdu_version: out.pdu_version,
            pdu: Some(pdu),
            status_information: None,
            send_handle,
        }
    }

    /// A transport/security/timeout failure for the attempt.
    pub fn failed(
        out: &OutgoingPdu,
        send_handle: SendHandle,
        status: StatusInformation,
    ) -> Self {
        Self {
            mp_model: out.mp_model,
            security_model: out.security_model,
            security_name: out.security_name.clone(),
            security_level: out.security_level,
            context_engine_id: out.context_engine_id.clone(),
            context_name: out.context_name.clone(),
            pdu_version: out.pdu_version,
            pdu: None,
            status_information: Some(status),
            send_handle,
        }
    }
}

/// Continuation a command generator attaches to every send; the dispatcher
/// invokes it exactly once, on response or on failure/timeout.
pub type ResponseContinuation = Box<dyn FnOnce(ResponseEvent) + Send + 'static>;

/// The message-and-PDU dispatcher seam.
///
/// Implementations serialise, secure, and transmit the PDU, then schedule
/// the continuation when a response arrives or the deadline passes. The
/// continuation must never be invoked from inside `send_pdu` itself: the
/// caller registers its in-flight state only after `send_pdu` returns.
/// Transport failures are reported asynchronously through
/// [`StatusInformation`], which is why this call has no error path.
pub trait PduDispatcher: Send + Sync {
    fn send_pdu(
        &self,
        out: OutgoingPdu,
        deadline: Instant,
        on_response: ResponseContinuation,
    ) -> SendHandle;
}
