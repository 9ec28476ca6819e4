// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::sync::Arc;

use anyhow::Result;
use snmp_cmdgen_rs::{
    cfg::{cli::resolve_config_path, config::Config, logger::init_logger},
    dispatch::loopback::SimulatedAgent,
    models::{codec, oid::Oid, pdu::Pdu, value::Value, varbind::VarBind},
    target::TargetStore,
};

/// Bring up the logging stack for a test. Only the first caller in the
/// process wins the global subscriber; later calls fail and are ignored.
pub fn init_test_logger() {
    let _ = init_logger("tests/config_logger.yaml");
}

pub fn load_targets() -> Result<Arc<TargetStore>> {
    let cfg = resolve_config_path("tests/config.yaml").and_then(Config::load_from_file)?;
    Ok(Arc::new(TargetStore::from_config(&cfg)))
}

pub fn oid(literal: &str) -> Oid {
    literal.parse().expect("valid oid literal")
}

/// A response PDU answering `req` with the given bindings.
pub fn response_to(req: &Pdu, var_binds: Vec<VarBind>) -> Pdu {
    let module = codec::module_for(snmp_cmdgen_rs::models::params::PduVersion::V2c);
    let mut rsp = module.response();
    module.set_request_id(&mut rsp, module.request_id(req));
    module.set_var_binds(&mut rsp, var_binds);
    rsp
}

/// The interface table every walk scenario runs over: two rows of ifDescr
/// followed by two rows of ifType.
pub fn interfaces_agent() -> SimulatedAgent {
    let agent = SimulatedAgent::new();
    agent.insert(oid("1.3.6.1.2.1.1.3.0"), Value::TimeTicks(421_338));
    agent.insert(oid("1.3.6.1.2.1.2.2.1.2.1"), Value::octet_string("lo"));
    agent.insert(oid("1.3.6.1.2.1.2.2.1.2.2"), Value::octet_string("eth0"));
    agent.insert(oid("1.3.6.1.2.1.2.2.1.3.1"), Value::Integer(24));
    agent.insert(oid("1.3.6.1.2.1.2.2.1.3.2"), Value::Integer(6));
    agent
}
