// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! In-process dispatcher used by the test suite and the demo binary.
//!
//! [`LoopbackDispatcher`] parks every sent PDU until the caller decides its
//! fate: answer it, time it out, or fail it. [`SimulatedAgent`] is a small
//! MIB image that can answer Get/GetNext/GetBulk/Set, so whole walks can be
//! driven without a socket in sight.

use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex, PoisonError},
    time::Instant,
};

use tracing::debug;

use crate::{
    dispatch::dispatcher::{
        ErrorIndication, OutgoingPdu, PduDispatcher, ResponseContinuation,
        ResponseEvent, SendHandle, StatusInformation,
    },
    models::{
        codec,
        oid::Oid,
        params::PduVersion,
        pdu::{ErrorStatus, Pdu, PduType},
        value::Value,
        varbind::VarBind,
    },
};

struct Parked {
    out: OutgoingPdu,
    deadline: Instant,
    on_response: ResponseContinuation,
}

#[derive(Default)]
struct State {
    next_handle: u64,
    total_sent: u64,
    parked: BTreeMap<SendHandle, Parked>,
}

/// Queue-backed [`PduDispatcher`]: sends park, deliveries are explicit.
#[derive(Default)]
pub struct LoopbackDispatcher {
    state: Mutex<State>,
}

impl PduDispatcher for LoopbackDispatcher {
    fn send_pdu(
        &self,
        out: OutgoingPdu,
        deadline: Instant,
        on_response: ResponseContinuation,
    ) -> SendHandle {
        let mut st = self.state();
        st.next_handle += 1;
        st.total_sent += 1;
        let handle = SendHandle(st.next_handle);
        debug!(%handle, pdu_type = %out.pdu.pdu_type, "loopback parked pdu");
        st.parked.insert(handle, Parked {
            out,
            deadline,
            on_response,
        });
        handle
    }
}

impl LoopbackDispatcher {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn state(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of PDUs currently parked.
    pub fn outstanding(&self) -> usize {
        self.state().parked.len()
    }

    /// Total PDUs ever handed to this dispatcher.
    pub fn sent_count(&self) -> u64 {
        self.state().total_sent
    }

    /// Oldest parked send, if any.
    pub fn oldest(&self) -> Option<SendHandle> {
        self.state().parked.keys().next().copied()
    }

    /// Copy of the outgoing PDU parked under `handle`.
    pub fn sent(&self, handle: SendHandle) -> Option<OutgoingPdu> {
        self.state().parked.get(&handle).map(|p| p.out.clone())
    }

    /// Absolute per-try deadline recorded for `handle`.
    pub fn deadline(&self, handle: SendHandle) -> Option<Instant> {
        self.state().parked.get(&handle).map(|p| p.deadline)
    }

    fn take(&self, handle: SendHandle) -> Option<Parked> {
        self.state().parked.remove(&handle)
    }

    /// Deliver `rsp` for `handle` under the identity the request went out
    /// with. Returns false when nothing is parked under `handle`.
    pub fn respond(&self, handle: SendHandle, rsp: Pdu) -> bool {
        let Some(parked) = self.take(handle) else {
            return false;
        };
        let event = ResponseEvent::matching(&parked.out, handle, rsp);
        (parked.on_response)(event);
        true
    }

    /// Deliver an arbitrary event built from the parked request; used to
    /// exercise identity-mismatch paths.
    pub fn respond_event(
        &self,
        handle: SendHandle,
        build: impl FnOnce(&OutgoingPdu, SendHandle) -> ResponseEvent,
    ) -> bool {
        let Some(parked) = self.take(handle) else {
            return false;
        };
        let event = build(&parked.out, handle);
        (parked.on_response)(event);
        true
    }

    /// Synthesise a timeout for `handle`, as a real dispatcher does when
    /// the deadline passes.
    pub fn time_out(&self, handle: SendHandle) -> bool {
        self.fail(handle, ErrorIndication::RequestTimedOut)
    }

    /// Synthesise a dispatcher failure for `handle`.
    pub fn fail(&self, handle: SendHandle, err: ErrorIndication) -> bool {
        let Some(parked) = self.take(handle) else {
            return false;
        };
        let event =
            ResponseEvent::failed(&parked.out, handle, StatusInformation::from(err));
        (parked.on_response)(event);
        true
    }

    /// Let `agent` answer parked sends until the queue drains or `limit`
    /// deliveries happened. Continuations may park new sends (walk
    /// continuation rounds); those are served too. Returns the number of
    /// deliveries made.
    pub fn serve_with(&self, agent: &SimulatedAgent, limit: usize) -> usize {
        let mut served = 0;
        while served < limit {
            let Some(handle) = self.oldest() else {
                break;
            };
            let Some(parked) = self.take(handle) else {
                break;
            };
            let rsp = agent.serve(&parked.out);
            (parked.on_response)(ResponseEvent::matching(&parked.out, handle, rsp));
            served += 1;
        }
        served
    }
}

/// A MIB image answering command-generator requests in-process.
pub struct SimulatedAgent {
    mib: Mutex<BTreeMap<Oid, Value>>,
}

impl Default for SimulatedAgent {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedAgent {
    pub fn new() -> Self {
        Self {
            mib: Mutex::new(BTreeMap::new()),
        }
    }

    fn mib(&self) -> std::sync::MutexGuard<'_, BTreeMap<Oid, Value>> {
        self.mib.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn insert(&self, oid: Oid, value: Value) {
        self.mib().insert(oid, value);
    }

    pub fn get(&self, oid: &Oid) -> Option<Value> {
        self.mib().get(oid).cloned()
    }

    /// First binding lexicographically after `oid`, or an `EndOfMibView`
    /// marker anchored at `oid`.
    fn next_after(&self, oid: &Oid) -> VarBind {
        let mib = self.mib();
        match mib
            .range((std::ops::Bound::Excluded(oid.clone()), std::ops::Bound::Unbounded))
            .next()
        {
            Some((next, value)) => VarBind::new(next.clone(), value.clone()),
            None => VarBind::new(oid.clone(), Value::EndOfMibView),
        }
    }

    /// Answer one request PDU the way an agent would.
    pub fn serve(&self, out: &OutgoingPdu) -> Pdu {
        let module = codec::module_for(out.pdu_version);
        let req = &out.pdu;
        let mut rsp = module.response();
        module.set_request_id(&mut rsp, module.request_id(req));

        match req.pdu_type {
            PduType::GetRequest => self.serve_get(out.pdu_version, req, &mut rsp),
            PduType::GetNextRequest => self.serve_next(out.pdu_version, req, &mut rsp),
            PduType::GetBulkRequest => self.serve_bulk(req, &mut rsp),
            PduType::SetRequest => self.serve_set(req, &mut rsp),
            PduType::Response => {
                rsp.error_status = ErrorStatus::GenErr.code();
                rsp.var_binds = req.var_binds.clone();
            },
        }
        rsp
    }

    fn serve_get(&self, version: PduVersion, req: &Pdu, rsp: &mut Pdu) {
        let mut vbs = Vec::with_capacity(req.var_binds.len());
        for (idx, vb) in req.var_binds.iter().enumerate() {
            match self.get(&vb.oid) {
                Some(value) => vbs.push(VarBind::new(vb.oid.clone(), value)),
                None if version == PduVersion::V1 => {
                    // RFC 1157: the error response echoes the request bindings
                    rsp.error_status = ErrorStatus::NoSuchName.code();
                    rsp.error_index = idx as u32 + 1;
                    rsp.var_binds = req.var_binds.clone();
                    return;
                },
                None => vbs.push(VarBind::new(vb.oid.clone(), Value::NoSuchObject)),
            }
        }
        rsp.var_binds = vbs;
    }

    fn serve_next(&self, version: PduVersion, req: &Pdu, rsp: &mut Pdu) {
        let mut vbs = Vec::with_capacity(req.var_binds.len());
        for (idx, vb) in req.var_binds.iter().enumerate() {
            let next = self.next_after(&vb.oid);
            if next.value.is_end_of_mib_view() && version == PduVersion::V1 {
                rsp.error_status = ErrorStatus::NoSuchName.code();
                rsp.error_index = idx as u32 + 1;
                rsp.var_binds = req.var_binds.clone();
                return;
            }
            vbs.push(next);
        }
        rsp.var_binds = vbs;
    }

    fn serve_bulk(&self, req: &Pdu, rsp: &mut Pdu) {
        let module = codec::module_for(PduVersion::V2c);
        let fixed = (module.non_repeaters(req) as usize).min(req.var_binds.len());
        let reps = module.max_repetitions(req) as usize;

        let mut vbs = Vec::new();
        for vb in &req.var_binds[..fixed] {
            vbs.push(self.next_after(&vb.oid));
        }

        let mut cursors: Vec<Oid> = req.var_binds[fixed..]
            .iter()
            .map(|vb| vb.oid.clone())
            .collect();
        for _ in 0..reps {
            if cursors.is_empty() {
                break;
            }
            let mut all_ended = true;
            for cursor in cursors.iter_mut() {
                let next = self.next_after(cursor);
                if !next.value.is_end_of_mib_view() {
                    *cursor = next.oid.clone();
                    all_ended = false;
                }
                vbs.push(next);
            }
            if all_ended {
                break;
            }
        }
        rsp.var_binds = vbs;
    }

    fn serve_set(&self, req: &Pdu, rsp: &mut Pdu) {
        for vb in &req.var_binds {
            self.insert(vb.oid.clone(), vb.value.clone());
        }
        rsp.var_binds = req.var_binds.clone();
    }
}
