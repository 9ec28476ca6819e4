// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::sync::{Arc, Mutex};

use anyhow::Result;
use snmp_cmdgen_rs::{
    cmdgen::{common::CommandOutcome, set::Set},
    dispatch::loopback::LoopbackDispatcher,
    models::{params::Scope, pdu::PduType, value::Value, varbind::VarBind},
};

use crate::integration_tests::common::{init_test_logger, interfaces_agent, load_targets, oid};

#[test]
fn test_set_transmits_values_verbatim() -> Result<()> {
    init_test_logger();
    let dispatcher = LoopbackDispatcher::new();
    let set = Set::new(dispatcher.clone(), load_targets()?);
    let seen: Arc<Mutex<Vec<CommandOutcome>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();

    let bindings = vec![
        VarBind::new(oid("1.3.6.1.2.1.1.5.0"), Value::octet_string("core-sw-1")),
        VarBind::new(oid("1.3.6.1.2.1.1.4.0"), Value::octet_string("noc@example.net")),
    ];
    let handle = set.send_req(
        "lab-v2c",
        bindings.clone(),
        Scope::default(),
        move |outcome| sink.lock().expect("capture lock").push(outcome),
    )?;

    let sh = dispatcher.oldest().expect("parked send");
    let out = dispatcher.sent(sh).expect("pdu");
    assert_eq!(out.pdu.pdu_type, PduType::SetRequest);
    // the caller's values ride along untouched
    assert_eq!(out.pdu.var_binds, bindings);

    let agent = interfaces_agent();
    assert_eq!(dispatcher.serve_with(&agent, 4), 1);

    let outcomes = seen.lock().expect("capture lock");
    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].request_handle, handle);
    assert_eq!(outcomes[0].error_status, 0);
    assert_eq!(outcomes[0].var_binds, bindings);
    assert_eq!(set.outstanding(), 0);

    // the simulated agent committed the write
    assert_eq!(
        agent.get(&oid("1.3.6.1.2.1.1.5.0")),
        Some(Value::octet_string("core-sw-1"))
    );

    Ok(())
}
