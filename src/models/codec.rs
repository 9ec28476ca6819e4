// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! Per-version PDU API.
//!
//! Two modules cover the whole protocol family: the v1 module serves
//! `MpModel::V1`, the v2c module serves both `MpModel::V2c` and
//! `MpModel::V3` (SNMPv3 reuses the v2c PDU set). The modules read and
//! write typed [`Pdu`] fields; BER serialisation happens below the message
//! dispatcher and is not this crate's concern.

use std::sync::atomic::{AtomicI32, Ordering};

use anyhow::{Result, bail};
use once_cell::sync::Lazy;
use rand::RngExt;

use crate::models::{
    params::{MpModel, PduVersion},
    pdu::{ErrorStatus, Pdu, PduType},
    value::Value,
    varbind::VarBind,
};

/// Process-wide request-id source, seeded at a random point so restarted
/// engines do not re-issue the ids of their predecessor.
static NEXT_REQUEST_ID: Lazy<AtomicI32> =
    Lazy::new(|| AtomicI32::new(rand::rng().random_range(1..0x4000_0000)));

fn next_request_id() -> i32 {
    let mut id = NEXT_REQUEST_ID.fetch_add(1, Ordering::Relaxed);
    // Wrap back into positive space; ids stay unique within any realistic
    // retransmit window.
    if id <= 0 {
        NEXT_REQUEST_ID.store(1, Ordering::Relaxed);
        id = NEXT_REQUEST_ID.fetch_add(1, Ordering::Relaxed);
    }
    id
}

static V1_MODULE: ProtoModule = ProtoModule {
    version: PduVersion::V1,
};
static V2C_MODULE: ProtoModule = ProtoModule {
    version: PduVersion::V2c,
};

/// The codec module serving one [`PduVersion`].
pub fn module_for(version: PduVersion) -> &'static ProtoModule {
    match version {
        PduVersion::V1 => &V1_MODULE,
        PduVersion::V2c => &V2C_MODULE,
    }
}

/// Map a message-processing model onto its PDU encoding family and codec.
pub fn version_specifics(mp_model: MpModel) -> (PduVersion, &'static ProtoModule) {
    let version = match mp_model {
        MpModel::V1 => PduVersion::V1,
        MpModel::V2c | MpModel::V3 => PduVersion::V2c,
    };
    (version, module_for(version))
}

/// Typed accessors over [`Pdu`] for one encoding family.
#[derive(Debug)]
pub struct ProtoModule {
    version: PduVersion,
}

impl ProtoModule {
    pub fn version(&self) -> PduVersion {
        self.version
    }

    pub fn get_request(&self) -> Pdu {
        Pdu::new(PduType::GetRequest)
    }

    pub fn get_next_request(&self) -> Pdu {
        Pdu::new(PduType::GetNextRequest)
    }

    pub fn set_request(&self) -> Pdu {
        Pdu::new(PduType::SetRequest)
    }

    /// GetBulk exists only in the v2c PDU family (RFC 3416 § 4.2.3).
    pub fn get_bulk_request(&self) -> Result<Pdu> {
        if self.version == PduVersion::V1 {
            bail!("the v1 PDU family has no get-bulk-request");
        }
        Ok(Pdu::new(PduType::GetBulkRequest))
    }

    pub fn response(&self) -> Pdu {
        Pdu::new(PduType::Response)
    }

    /// Assign a fresh request-id and clear the error fields.
    ///
    /// For GetBulk the error slots hold non-repeaters/max-repetitions, so
    /// they are left untouched regardless of whether they were set before
    /// or after this call.
    pub fn set_defaults(&self, pdu: &mut Pdu) {
        pdu.request_id = next_request_id();
        if !pdu.pdu_type.is_bulk() {
            pdu.error_status = 0;
            pdu.error_index = 0;
        }
    }

    pub fn set_var_binds(&self, pdu: &mut Pdu, var_binds: Vec<VarBind>) {
        pdu.var_binds = var_binds;
    }

    pub fn var_binds<'a>(&self, pdu: &'a Pdu) -> &'a [VarBind] {
        &pdu.var_binds
    }

    pub fn request_id(&self, pdu: &Pdu) -> i32 {
        pdu.request_id
    }

    pub fn set_request_id(&self, pdu: &mut Pdu, request_id: i32) {
        pdu.request_id = request_id;
    }

    pub fn error_status(&self, pdu: &Pdu) -> u32 {
        if pdu.pdu_type.is_bulk() { 0 } else { pdu.error_status }
    }

    pub fn error_index(&self, pdu: &Pdu) -> u32 {
        if pdu.pdu_type.is_bulk() { 0 } else { pdu.error_index }
    }

    pub fn set_non_repeaters(&self, pdu: &mut Pdu, non_repeaters: u32) {
        pdu.error_status = non_repeaters;
    }

    pub fn non_repeaters(&self, pdu: &Pdu) -> u32 {
        pdu.error_status
    }

    pub fn set_max_repetitions(&self, pdu: &mut Pdu, max_repetitions: u32) {
        pdu.error_index = max_repetitions;
    }

    pub fn max_repetitions(&self, pdu: &Pdu) -> u32 {
        pdu.error_index
    }

    /// Arrange the response varbinds into rows aligned to the request's
    /// column set.
    ///
    /// GetNext yields one row per response (chunked defensively if an agent
    /// returns more). GetBulk yields up to max-repetitions rows; the
    /// non-repeater columns are carried into every row so a row always has
    /// the request's column count and ordering.
    ///
    /// v1 has no `endOfMibView`; a `noSuchName` error response to a v1
    /// GetNext marks the end of the view and is mapped to a single row of
    /// terminal markers.
    pub fn var_bind_table(&self, req: &Pdu, rsp: &Pdu) -> Vec<Vec<VarBind>> {
        if self.version == PduVersion::V1
            && req.pdu_type == PduType::GetNextRequest
            && rsp.error_status == ErrorStatus::NoSuchName.code()
        {
            let row = req
                .var_binds
                .iter()
                .map(|vb| VarBind::new(vb.oid.clone(), Value::EndOfMibView))
                .collect();
            return vec![row];
        }

        if req.pdu_type.is_bulk() {
            self.bulk_table(req, rsp)
        } else {
            let columns = req.var_binds.len();
            if columns == 0 {
                return Vec::new();
            }
            rsp.var_binds
                .chunks(columns)
                .map(<[VarBind]>::to_vec)
                .collect()
        }
    }

    fn bulk_table(&self, req: &Pdu, rsp: &Pdu) -> Vec<Vec<VarBind>> {
        let columns = req.var_binds.len();
        if columns == 0 {
            return Vec::new();
        }
        let fixed = (self.non_repeaters(req) as usize).min(columns);
        let repeaters = columns - fixed;
        let bound = rsp.var_binds.len().min(fixed);
        let lead = &rsp.var_binds[..bound];

        if repeaters == 0 {
            return vec![lead.to_vec()];
        }

        let repetitions = (rsp.var_binds.len().saturating_sub(fixed) / repeaters)
            .min(self.max_repetitions(req) as usize);
        if repetitions == 0 {
            if lead.is_empty() {
                return Vec::new();
            }
            return vec![lead.to_vec()];
        }

        let mut table = Vec::with_capacity(repetitions);
        for round in 0..repetitions {
            let start = fixed + round * repeaters;
            let mut row = Vec::with_capacity(columns);
            row.extend_from_slice(lead);
            row.extend_from_slice(&rsp.var_binds[start..start + repeaters]);
            table.push(row);
        }
        table
    }
}
