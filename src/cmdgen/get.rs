// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::sync::Arc;

use anyhow::Result;

use crate::{
    cmdgen::{
        base::{CommandGenerator, CommandOp, PendingRequest},
        common::{CommandCallback, CommandOutcome, RequestHandle},
    },
    dispatch::dispatcher::ErrorIndication,
    models::{codec, params::Scope, pdu::Pdu, varbind::VarBind},
};

pub struct GetOp;

impl CommandOp for GetOp {
    type Callback = CommandCallback;

    const NAME: &'static str = "get";

    fn deliver_error(handle: RequestHandle, err: ErrorIndication, cb: Self::Callback) {
        cb(CommandOutcome {
            request_handle: handle,
            error_indication: Some(err),
            error_status: 0,
            error_index: 0,
            var_binds: Vec::new(),
        });
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

/// Single-shot GetRequest driver: one request, one callback.
pub type Get = CommandGenerator<GetOp>;

impl CommandGenerator<GetOp> {
    /// Issue a GetRequest for `var_binds` against the named target.
    ///
    /// Returns the application handle echoed in the callback. The callback
    /// fires exactly once, after the response arrived or the retry budget
    /// ran out.
    pub fn send_req(
        self: &Arc<Self>,
        target_name: &str,
        var_binds: Vec<VarBind>,
        scope: Scope,
        cb: impl FnOnce(CommandOutcome) + Send + 'static,
    ) -> Result<RequestHandle> {
        let target = self.resolve_target(target_name)?;
        let (pdu_version, module) = codec::version_specifics(target.mp_model);

        let mut req = module.get_request();
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
