// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::{
    marker::PhantomData,
    sync::{Arc, Weak},
    time::{Duration, Instant},
};

use dashmap::DashMap;
use tracing::{debug, warn};

use crate::{
    cmdgen::common::{RequestHandle, RequestHandleSource},
    dispatch::dispatcher::{
        ErrorIndication, OutgoingPdu, PduDispatcher, ResponseContinuation,
        ResponseEvent, SendHandle,
    },
    models::{codec, params::{PduVersion, Scope}, pdu::Pdu},
    target::{TargetError, TargetInfo, TargetStore},
};

/// The record held for every PDU in flight, keyed by the dispatcher's send
/// handle. The retained [`OutgoingPdu`] is the immutable template a retry
/// re-transmits, request-id included.
pub struct PendingRequest {
    pub(crate) out: OutgoingPdu,
    pub(crate) timeout_cs: u32,
    pub(crate) retry_limit: u32,
    /// Attempts issued so far: 1 after the initial send. The retry budget
    /// is exhausted once this exceeds `retry_limit`.
    pub(crate) attempts: u32,
    pub(crate) request_handle: RequestHandle,
}

/// Per-operation half of a command generator: how to hand a finished or
/// failed exchange to the application.
pub trait CommandOp: Sized + Send + Sync + 'static {
    /// Application callback state carried through retries and (for walks)
    /// continuation rounds.
    type Callback: Send + 'static;

    const NAME: &'static str;

    /// Deliver a dispatcher failure after the retry budget ran out.
    fn deliver_error(handle: RequestHandle, err: ErrorIndication, cb: Self::Callback);

    /// Handle a response PDU that passed the identity and request-id
    /// checks.
    fn handle_response(
        core: &Arc<CommandGenerator<Self>>,
        pending: PendingRequest,
        rsp: Pdu,
        cb: Self::Callback,
    );
}

/// Shared command-generator machinery: owns the pending-request table,
/// issues PDUs through the dispatcher, and runs the response protocol.
/// One instance per operation kind; see the `Get`/`Set`/`Walk`/`BulkWalk`
/// aliases.
pub struct CommandGenerator<O: CommandOp> {
    dispatcher: Arc<dyn PduDispatcher>,
    targets: Arc<TargetStore>,
    pending: DashMap<SendHandle, PendingRequest>,
    handles: RequestHandleSource,
    _op: PhantomData<O>,
}

impl<O: CommandOp> CommandGenerator<O> {
    pub fn new(dispatcher: Arc<dyn PduDispatcher>, targets: Arc<TargetStore>) -> Arc<Self> {
        Arc::new(Self {
            dispatcher,
            targets,
            pending: DashMap::new(),
            handles: RequestHandleSource::new(),
            _op: PhantomData,
        })
    }

    /// Number of requests currently in flight on this generator.
    pub fn outstanding(&self) -> usize {
        self.pending.len()
    }

    pub(crate) fn next_request_handle(&self) -> RequestHandle {
        self.handles.next_handle()
    }

    pub(crate) fn resolve_target(&self, name: &str) -> Result<TargetInfo, TargetError> {
        self.targets.resolve(name)
    }

    pub(crate) fn outgoing(
        target: &TargetInfo,
        scope: &Scope,
        pdu_version: PduVersion,
        pdu: Pdu,
    ) -> OutgoingPdu {
        OutgoingPdu {
            transport_domain: target.transport_domain,
            transport_address: target.transport_address.clone(),
            mp_model: target.mp_model,
            security_model: target.security_model,
            security_name: target.security_name.clone(),
            security_level: target.security_level,
            context_engine_id: scope.context_engine_id.clone(),
            context_name: scope.context_name.clone(),
            pdu_version,
            pdu,
        }
    }

    /// RFC 3413 § 3.1: hand the PDU to the dispatcher and remember the
    /// in-flight request. `attempts` counts sends already issued for this
    /// logical request (0 on the first send).
    pub(crate) fn send_pdu_inner(
        self: &Arc<Self>,
        out: OutgoingPdu,
        timeout_cs: u32,
        retry_limit: u32,
        attempts: u32,
        request_handle: RequestHandle,
        cb: O::Callback,
    ) {
        let deadline =
            Instant::now() + Duration::from_millis(u64::from(timeout_cs) * 10);

        let weak: Weak<Self> = Arc::downgrade(self);
        let continuation: ResponseContinuation = Box::new(move |event| {
            if let Some(core) = weak.upgrade() {
                core.process_response_pdu(event, cb);
            } else {
                debug!(op = O::NAME, "command generator dropped, discarding response");
            }
        });

        let send_handle = self.dispatcher.send_pdu(out.clone(), deadline, continuation);
        self.pending.insert(send_handle, PendingRequest {
            out,
            timeout_cs,
            retry_limit,
            attempts: attempts + 1,
            request_handle,
        });
        debug!(
            op = O::NAME,
            %send_handle,
            %request_handle,
            attempt = attempts + 1,
            "pdu handed to dispatcher"
        );
    }

    /// The dispatcher continuation lands here; implements the response
    /// checks of RFC 3413 § 3.1.1.
    pub fn process_response_pdu(self: &Arc<Self>, event: ResponseEvent, cb: O::Callback) {
        let Some((_, pending)) = self.pending.remove(&event.send_handle) else {
            debug!(
                op = O::NAME,
                send_handle = %event.send_handle,
                "response for unknown send handle, dropping"
            );
            return;
        };

        // 3.1.3: dispatcher failure or timeout; retry until the budget runs
        // out, re-transmitting the retained PDU unchanged.
        if let Some(status) = event.status_information {
            if pending.attempts > pending.retry_limit {
                warn!(
                    op = O::NAME,
                    request_handle = %pending.request_handle,
                    error = %status.error_indication,
                    attempts = pending.attempts,
                    "request failed, retries exhausted"
                );
                O::deliver_error(pending.request_handle, status.error_indication, cb);
                return;
            }
            debug!(
                op = O::NAME,
                request_handle = %pending.request_handle,
                attempt = pending.attempts + 1,
                "re-sending request"
            );
            let PendingRequest {
                out,
                timeout_cs,
                retry_limit,
                attempts,
                request_handle,
            } = pending;
            self.send_pdu_inner(out, timeout_cs, retry_limit, attempts, request_handle, cb);
            return;
        }

        // 3.1.1: the response must come back under the identity the request
        // went out with; securityLevel is not part of that identity. A
        // request sent under a default (empty) context accepts any context
        // in the response.
        let orig = &pending.out;
        if orig.mp_model != event.mp_model
            || orig.security_model != event.security_model
            || orig.security_name != event.security_name
            || orig.pdu_version != event.pdu_version
        {
            debug!(
                op = O::NAME,
                request_handle = %pending.request_handle,
                "response identity mismatch, dropping"
            );
            return;
        }
        if let Some(engine_id) = &orig.context_engine_id
            && event.context_engine_id.as_ref() != Some(engine_id)
        {
            debug!(
                op = O::NAME,
                request_handle = %pending.request_handle,
                "response context engine-id mismatch, dropping"
            );
            return;
        }
        if !orig.context_name.is_empty() && orig.context_name != event.context_name {
            debug!(
                op = O::NAME,
                request_handle = %pending.request_handle,
                "response context name mismatch, dropping"
            );
            return;
        }

        let Some(rsp) = event.pdu else {
            debug!(
                op = O::NAME,
                send_handle = %event.send_handle,
                "response event carries neither pdu nor status, dropping"
            );
            return;
        };

        // 3.1.2: the response answers this request, not an earlier one.
        let module = codec::module_for(orig.pdu_version);
        if module.request_id(&rsp) != module.request_id(&orig.pdu) {
            debug!(
                op = O::NAME,
                request_handle = %pending.request_handle,
                "request-id mismatch, dropping"
            );
            return;
        }

        O::handle_response(self, pending, rsp, cb);
    }
}
