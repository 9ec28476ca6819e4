// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::sync::Arc;

use anyhow::Result;
use tracing::debug;

use crate::{
    cmdgen::{
        base::{CommandGenerator, CommandOp, PendingRequest},
        common::{
            RequestHandle, WalkControl, WalkRound, WalkSession, columns_exhausted,
        },
    },
    dispatch::dispatcher::ErrorIndication,
    models::{codec, params::Scope, pdu::Pdu, varbind::VarBind},
};

pub struct WalkOp;

impl CommandOp for WalkOp {
    type Callback = WalkSession;

    const NAME: &'static str = "walk";

    fn deliver_error(handle: RequestHandle, err: ErrorIndication, mut session: Self::Callback) {
        (session.cb)(WalkRound {
            request_handle: handle,
            error_indication: Some(err),
            error_status: 0,
            error_index: 0,
            table: &[],
        });
    }

    fn handle_response(
        core: &Arc<CommandGenerator<Self>>,
        pending: PendingRequest,
        rsp: Pdu,
        mut session: Self::Callback,
    ) {
        let module = codec::module_for(pending.out.pdu_version);
        let table = module.var_bind_table(&pending.out.pdu, &rsp);

        let control = (session.cb)(WalkRound {
            request_handle: pending.request_handle,
            error_indication: None,
            error_status: module.error_status(&rsp),
            error_index: module.error_index(&rsp),
            table: &table,
        });
        // The callback is the serialisation point: the next round goes out
        // only after it returned, and only if it wants more.
        if control == WalkControl::Stop {
            debug!(request_handle = %pending.request_handle, "walk stopped by application");
            return;
        }

        let Some(last) = table.last() else {
            debug!(request_handle = %pending.request_handle, "walk response held no rows");
            return;
        };
        if columns_exhausted(&session.roots, last, 0) {
            debug!(request_handle = %pending.request_handle, "walk left the requested view");
            return;
        }

        // Fresh GetNext seeded from the last row returned; the prior
        // request PDU stays untouched in the completed pending record.
        let mut next = module.get_next_request();
        module.set_defaults(&mut next);
        module.set_var_binds(
            &mut next,
            last.iter().map(|vb| VarBind::null(vb.oid.clone())).collect(),
        );

        let handle = core.next_request_handle();
        let mut out = pending.out;
        out.pdu = next;
        core.send_pdu_inner(
            out,
            pending.timeout_cs,
            pending.retry_limit,
            0,
            handle,
            session,
        );
    }
}

/// GetNext iteration driver: one callback per response row, re-seeded
/// until the application stops it or the walk leaves the requested view.
pub type Walk = CommandGenerator<WalkOp>;

impl CommandGenerator<WalkOp> {
    /// Start a GetNext walk rooted at the given varbind OIDs.
    ///
    /// The walk is a chain of independent requests: every round gets its
    /// own application handle and a full retry budget.
    pub fn send_req(
        self: &Arc<Self>,
        target_name: &str,
        var_binds: Vec<VarBind>,
        scope: Scope,
        cb: impl FnMut(WalkRound<'_>) -> WalkControl + Send + 'static,
    ) -> Result<RequestHandle> {
        let target = self.resolve_target(target_name)?;
        let (pdu_version, module) = codec::version_specifics(target.mp_model);

        let mut req = module.get_next_request();
        module.set_defaults(&mut req);
        let roots: Vec<_> = var_binds.iter().map(|vb| vb.oid.clone()).collect();
        module.set_var_binds(&mut req, var_binds);

        let handle = self.next_request_handle();
        let out = Self::outgoing(&target, &scope, pdu_version, req);
        self.send_pdu_inner(
            out,
            target.timeout_cs,
            target.retry_limit,
            0,
            handle,
            WalkSession::new(roots, Box::new(cb)),
        );
        Ok(handle)
    }
}
