// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::sync::{Arc, Mutex};

use anyhow::Result;
use snmp_cmdgen_rs::{
    cmdgen::{
        bulk_walk::BulkWalk,
        common::{CommandError, WalkControl},
    },
    dispatch::loopback::LoopbackDispatcher,
    models::{
        codec,
        params::{MpModel, PduVersion, Scope},
        pdu::PduType,
        value::Value,
        varbind::VarBind,
    },
};

use crate::integration_tests::common::{init_test_logger, interfaces_agent, load_targets, oid};

type Rounds = Arc<Mutex<Vec<Vec<Vec<VarBind>>>>>;

#[test]
fn test_bulk_walk_on_v1_is_refused() -> Result<()> {
    init_test_logger();
    let dispatcher = LoopbackDispatcher::new();
    let bulk = BulkWalk::new(dispatcher.clone(), load_targets()?);
    let called = Arc::new(Mutex::new(0usize));
    let counter = called.clone();

    let err = bulk
        .send_req(
            "lab-v1",
            0,
            10,
            vec![VarBind::null(oid("1.3.6.1.2.1.2.2.1.2"))],
            Scope::default(),
            move |_round| {
                *counter.lock().expect("counter lock") += 1;
                WalkControl::Stop
            },
        )
        .expect_err("getbulk has no v1 rendition");

    assert!(matches!(
        err.downcast_ref::<CommandError>(),
        Some(CommandError::UnsupportedOperation {
            op,
            mp_model: MpModel::V1,
        }) if *op == "getbulk"
    ));
    // refused before the dispatcher ever saw it
    assert_eq!(dispatcher.sent_count(), 0);
    assert_eq!(*called.lock().expect("counter lock"), 0);
    assert_eq!(bulk.outstanding(), 0);

    Ok(())
}

#[test]
fn test_bulk_walk_rounds_against_agent() -> Result<()> {
    init_test_logger();
    let dispatcher = LoopbackDispatcher::new();
    let bulk = BulkWalk::new(dispatcher.clone(), load_targets()?);
    let rounds: Rounds = Arc::new(Mutex::new(Vec::new()));
    let sink = rounds.clone();

    bulk.send_req(
        "lab-v2c",
        1,
        2,
        vec![
            VarBind::null(oid("1.3.6.1.2.1.1.3")),
            VarBind::null(oid("1.3.6.1.2.1.2.2.1.2")),
            VarBind::null(oid("1.3.6.1.2.1.2.2.1.3")),
        ],
        Scope::default(),
        move |round| {
            sink.lock()
                .expect("rounds lock")
                .push(round.table.to_vec());
            WalkControl::Continue
        },
    )?;

    // first round assembled by hand so the wire PDU can be inspected
    let module = codec::module_for(PduVersion::V2c);
    let sh = dispatcher.oldest().expect("round 1 send");
    let out1 = dispatcher.sent(sh).expect("round 1 pdu");
    assert_eq!(out1.pdu.pdu_type, PduType::GetBulkRequest);
    assert_eq!(module.non_repeaters(&out1.pdu), 1);
    assert_eq!(module.max_repetitions(&out1.pdu), 2);

    let agent = interfaces_agent();
    let rsp = agent.serve(&out1);
    assert!(dispatcher.respond(sh, rsp));

    // continuation round carries the same bulk parameters, seeded from the
    // last row, values nulled
    let sh = dispatcher.oldest().expect("round 2 send");
    let out2 = dispatcher.sent(sh).expect("round 2 pdu");
    assert_eq!(module.non_repeaters(&out2.pdu), 1);
    assert_eq!(module.max_repetitions(&out2.pdu), 2);
    assert_eq!(out2.pdu.var_binds.len(), 3);
    assert_eq!(out2.pdu.var_binds[0].oid, oid("1.3.6.1.2.1.1.3.0"));
    assert_eq!(out2.pdu.var_binds[1].oid, oid("1.3.6.1.2.1.2.2.1.2.2"));
    assert_eq!(out2.pdu.var_binds[2].oid, oid("1.3.6.1.2.1.2.2.1.3.2"));
    for vb in &out2.pdu.var_binds {
        assert_eq!(vb.value, Value::Null);
    }
    assert_ne!(out2.pdu.request_id, out1.pdu.request_id);

    // let the agent finish the walk
    dispatcher.serve_with(&agent, 8);

    let rounds = rounds.lock().expect("rounds lock");
    assert_eq!(rounds.len(), 2);

    // round 1: two repetitions, three request-ordered columns each
    let first = &rounds[0];
    assert_eq!(first.len(), 2);
    for row in first {
        assert_eq!(row.len(), 3);
        assert_eq!(row[0].oid, oid("1.3.6.1.2.1.1.3.0"));
    }
    assert_eq!(first[0][1].value, Value::octet_string("lo"));
    assert_eq!(first[1][1].value, Value::octet_string("eth0"));
    assert_eq!(first[0][2].value, Value::Integer(24));
    assert_eq!(first[1][2].value, Value::Integer(6));

    // round 2 ran off both repeater columns, ending the walk
    let last_row = rounds[1].last().expect("round 2 rows");
    assert!(
        last_row[1..]
            .iter()
            .all(|vb| vb.value.is_end_of_mib_view()
                || !vb.oid.starts_with(&oid("1.3.6.1.2.1.2.2.1.2")))
    );

    assert_eq!(dispatcher.outstanding(), 0);
    assert_eq!(bulk.outstanding(), 0);

    Ok(())
}

#[test]
fn test_bulk_walk_stops_on_application_signal() -> Result<()> {
    init_test_logger();
    let dispatcher = LoopbackDispatcher::new();
    let bulk = BulkWalk::new(dispatcher.clone(), load_targets()?);
    let rounds: Rounds = Arc::new(Mutex::new(Vec::new()));
    let sink = rounds.clone();

    bulk.send_req(
        "lab-v2c",
        0,
        2,
        vec![VarBind::null(oid("1.3.6.1.2.1.2.2.1.2"))],
        Scope::default(),
        move |round| {
            sink.lock()
                .expect("rounds lock")
                .push(round.table.to_vec());
            WalkControl::Stop
        },
    )?;

    let agent = interfaces_agent();
    assert_eq!(dispatcher.serve_with(&agent, 8), 1);

    assert_eq!(rounds.lock().expect("rounds lock").len(), 1);
    assert_eq!(dispatcher.sent_count(), 1);
    assert_eq!(bulk.outstanding(), 0);

    Ok(())
}
