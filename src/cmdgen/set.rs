// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::sync::Arc;

use anyhow::Result;

use crate::{
    cmdgen::{
        base::{CommandGenerator, CommandOp, PendingRequest},
        common::{CommandCallback, CommandOutcome, RequestHandle},
        get::GetOp,
    },
    dispatch::dispatcher::ErrorIndication,
    models::{codec, params::Scope, pdu::Pdu, varbind::VarBind},
};

pub struct SetOp;

impl CommandOp for SetOp {
    type Callback = CommandCallback;

    const NAME: &'static str = "set";

    fn deliver_error(handle: RequestHandle, err: ErrorIndication, cb: Self::Callback) {
        GetOp::deliver_error(handle, err, cb);
    }

    fn handle_response(
        _core: &Arc<CommandGenerator<Self>>,
        pending: PendingRequest,
        rsp: Pdu,
        cb: Self::Callback,
    ) {
        let module = codec::module_for(pending.out.pdu_version);
        cb(CommandOutcome {
            request_handle: pending.request_handle,
            error_indication: None,
            error_status: module.error_status(&rsp),
            error_index: module.error_index(&rsp),
            var_binds: rsp.var_binds,
        });
    }
}

/// Single-shot SetRequest driver.
pub type Set = CommandGenerator<SetOp>;

impl CommandGenerator<SetOp> {
    /// Issue a SetRequest; the caller-supplied varbind values go out
    /// verbatim.
    pub fn send_req(
        self: &Arc<Self>,
        target_name: &str,
        var_binds: Vec<VarBind>,
        scope: Scope,
        cb: impl FnOnce(CommandOutcome) + Send + 'static,
    ) -> Result<RequestHandle> {
        let target = self.resolve_target(target_name)?;
        let (pdu_version, module) = codec::version_specifics(target.mp_model);

        let mut req = module.set_request();
        module.set_defaults(&mut req);
        module.set_var_binds(&mut req, var_binds);

        let handle = self.next_request_handle();
        let out = Self::outgoing(&target, &scope, pdu_version, req);
        self.send_pdu_inner(
            out,
            target.timeout_cs,
            target.retry_limit,
            0,
            handle,
            Box::new(cb),
        );
        Ok(handle)
    }
}
