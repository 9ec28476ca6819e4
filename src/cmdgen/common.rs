// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::{
    fmt,
    sync::atomic::{AtomicU32, Ordering},
};

use thiserror::Error;

use crate::{
    dispatch::dispatcher::ErrorIndication,
    models::{oid::Oid, params::MpModel, varbind::VarBind},
};

/// Token identifying one logical request across its retries.
///
/// Handed back from `send_req` and echoed in every callback, so an
/// application juggling several outstanding requests can tell the results
/// apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestHandle(u32);

impl RequestHandle {
    pub fn value(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for RequestHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "req-{}", self.0)
    }
}

/// Per-generator monotonic [`RequestHandle`] source. The first handle is 1;
/// overflow wraps back to 1.
#[derive(Debug, Default)]
pub struct RequestHandleSource {
    next: AtomicU32,
}

impl RequestHandleSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_handle(&self) -> RequestHandle {
        let prev = self
            .next
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |v| {
                Some(if v == u32::MAX { 1 } else { v + 1 })
            })
            .unwrap_or_else(|v| v);
        RequestHandle(if prev == u32::MAX { 1 } else { prev + 1 })
    }
}

/// Synchronous refusals out of `send_req`.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("{op} is not supported under message processing model {mp_model:?}")]
    UnsupportedOperation {
        op: &'static str,
        mp_model: MpModel,
    },
}

/// Final result of a Get/Set request.
///
/// When `error_indication` is set the request never completed on the wire:
/// the error fields are zero and `var_binds` is empty. Otherwise
/// `error_status`/`error_index` carry the responder's verdict and
/// `var_binds` the returned bindings.
#[derive(Debug)]
pub struct CommandOutcome {
    pub request_handle: RequestHandle,
    pub error_indication: Option<ErrorIndication>,
    pub error_status: u32,
    pub error_index: u32,
    pub var_binds: Vec<VarBind>,
}

/// Application callback for single-shot requests.
pub type CommandCallback = Box<dyn FnOnce(CommandOutcome) + Send + 'static>;

/// One delivered round of a walk or bulk walk.
///
/// `table` holds rows aligned to the request's column set; a round with an
/// `error_indication` is terminal and carries no rows.
#[derive(Debug)]
pub struct WalkRound<'a> {
    pub request_handle: RequestHandle,
    pub error_indication: Option<ErrorIndication>,
    pub error_status: u32,
    pub error_index: u32,
    pub table: &'a [Vec<VarBind>],
}

/// What the application wants after seeing a walk round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkControl {
    Continue,
    Stop,
}

/// Application callback for walks; invoked once per PDU round.
pub type WalkCallback = Box<dyn FnMut(WalkRound<'_>) -> WalkControl + Send + 'static>;

/// Walk state threaded through continuation rounds: the subtree roots the
/// walk was started under, and the application callback.
pub struct WalkSession {
    pub(crate) roots: Vec<Oid>,
    pub(crate) cb: WalkCallback,
}

impl WalkSession {
    pub(crate) fn new(roots: Vec<Oid>, cb: WalkCallback) -> Self {
        Self { roots, cb }
    }
}

/// True when every tracked column (past the first `skip`) has either
/// reported end-of-view or stepped outside the subtree it was started
/// under. A walk with nothing left to track is finished.
pub(crate) fn columns_exhausted(roots: &[Oid], row: &[VarBind], skip: usize) -> bool {
    row.iter().enumerate().skip(skip).all(|(idx, vb)| {
        vb.value.is_end_of_mib_view()
            || roots.get(idx).is_none_or(|root| !vb.oid.starts_with(root))
    })
}
