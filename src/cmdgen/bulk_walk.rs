// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::sync::Arc;

use anyhow::{Result, bail};
use tracing::{debug, warn};

use crate::{
    cmdgen::{
        base::{CommandGenerator, CommandOp, PendingRequest},
        common::{
            CommandError, RequestHandle, WalkControl, WalkRound, WalkSession,
            columns_exhausted,
        },
        walk::WalkOp,
    },
    dispatch::dispatcher::ErrorIndication,
    models::{codec, params::{MpModel, Scope}, pdu::Pdu, varbind::VarBind},
};

pub struct BulkOp;

impl CommandOp for BulkOp {
    type Callback = WalkSession;

    const NAME: &'static str = "bulkwalk";

    fn deliver_error(handle: RequestHandle, err: ErrorIndication, session: Self::Callback) {
        WalkOp::deliver_error(handle, err, session);
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
        if control == WalkControl::Stop {
            debug!(request_handle = %pending.request_handle, "bulk walk stopped by application");
            return;
        }

        let Some(last) = table.last() else {
            debug!(request_handle = %pending.request_handle, "bulk response held no rows");
            return;
        };
        let non_repeaters = module.non_repeaters(&pending.out.pdu);
        let skip = (non_repeaters as usize).min(session.roots.len());
        if columns_exhausted(&session.roots, last, skip) {
            debug!(request_handle = %pending.request_handle, "bulk walk left the requested view");
            return;
        }

        // Next bulk round, seeded from the last row; non-repeaters and
        // max-repetitions carry over from the retained request.
        let mut next = match module.get_bulk_request() {
            Ok(pdu) => pdu,
            Err(e) => {
                warn!(request_handle = %pending.request_handle, "cannot continue bulk walk: {e}");
                return;
            },
        };
        module.set_non_repeaters(&mut next, non_repeaters);
        module.set_max_repetitions(&mut next, module.max_repetitions(&pending.out.pdu));
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

/// GetBulk iteration driver: same shape as [`crate::cmdgen::walk::Walk`],
/// but every round carries a table of up to max-repetitions rows.
pub type BulkWalk = CommandGenerator<BulkOp>;

impl CommandGenerator<BulkOp> {
    /// Start a GetBulk walk.
    ///
    /// The first `non_repeaters` varbinds are fetched once per round, the
    /// rest up to `max_repetitions` times. Refused synchronously for v1
    /// targets, which have no GetBulk.
    pub fn send_req(
        self: &Arc<Self>,
        target_name: &str,
        non_repeaters: u32,
        max_repetitions: u32,
        var_binds: Vec<VarBind>,
        scope: Scope,
        cb: impl FnMut(WalkRound<'_>) -> WalkControl + Send + 'static,
    ) -> Result<RequestHandle> {
        let target = self.resolve_target(target_name)?;
        if target.mp_model == MpModel::V1 {
            bail!(CommandError::UnsupportedOperation {
                op: "getbulk",
                mp_model: target.mp_model,
            });
        }
        let (pdu_version, module) = codec::version_specifics(target.mp_model);

        let mut req = module.get_bulk_request()?;
        // The bulk parameters live in the error slots; set_defaults knows
        // to leave them alone.
        module.set_non_repeaters(&mut req, non_repeaters);
        module.set_max_repetitions(&mut req, max_repetitions);
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
