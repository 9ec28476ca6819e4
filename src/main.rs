// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::sync::Arc;

use anyhow::{Context, Result};
use snmp_cmdgen_rs::{
    cfg::{cli::resolve_config_path, config::Config, logger::init_logger},
    cmdgen::{bulk_walk::BulkWalk, common::WalkControl, get::Get, walk::Walk},
    dispatch::loopback::{LoopbackDispatcher, SimulatedAgent},
    models::{oid::Oid, params::Scope, value::Value, varbind::VarBind},
    target::TargetStore,
};
use tracing::{info, warn};

/// Walk the demo MIB image through the loopback dispatcher: one Get, one
/// GetNext walk, one GetBulk walk, all against the targets from the config
/// file.
fn main() -> Result<()> {
    let _log_guard = init_logger("tests/config_logger.yaml")?;

    let cfg = resolve_config_path("tests/config.yaml")
        .and_then(Config::load_from_file)
        .context("failed to resolve or load config")?;
    let targets = Arc::new(TargetStore::from_config(&cfg));
    let dispatcher = LoopbackDispatcher::new();

    let agent = SimulatedAgent::new();
    agent.insert(
        "1.3.6.1.2.1.1.1.0".parse::<Oid>()?,
        Value::octet_string("demo router"),
    );
    agent.insert("1.3.6.1.2.1.1.3.0".parse::<Oid>()?, Value::TimeTicks(421_338));
    agent.insert(
        "1.3.6.1.2.1.2.2.1.2.1".parse::<Oid>()?,
        Value::octet_string("lo"),
    );
    agent.insert(
        "1.3.6.1.2.1.2.2.1.2.2".parse::<Oid>()?,
        Value::octet_string("eth0"),
    );
    agent.insert("1.3.6.1.2.1.2.2.1.3.1".parse::<Oid>()?, Value::Integer(24));
    agent.insert("1.3.6.1.2.1.2.2.1.3.2".parse::<Oid>()?, Value::Integer(6));

    // Single Get
    let get = Get::new(dispatcher.clone(), targets.clone());
    get.send_req(
        "lab-v2c",
        vec![VarBind::null("1.3.6.1.2.1.1.1.0".parse::<Oid>()?)],
        Scope::default(),
        |outcome| match outcome.error_indication {
            Some(err) => warn!(handle = %outcome.request_handle, %err, "get failed"),
            None => {
                for vb in &outcome.var_binds {
                    info!(handle = %outcome.request_handle, "get: {vb}");
                }
            },
        },
    )?;
    dispatcher.serve_with(&agent, 8);

    // GetNext walk over ifDescr
    let walk = Walk::new(dispatcher.clone(), targets.clone());
    walk.send_req(
        "lab-v2c",
        vec![VarBind::null("1.3.6.1.2.1.2.2.1.2".parse::<Oid>()?)],
        Scope::default(),
        |round| {
            if let Some(err) = &round.error_indication {
                warn!(handle = %round.request_handle, %err, "walk failed");
                return WalkControl::Stop;
            }
            for row in round.table {
                for vb in row {
                    info!(handle = %round.request_handle, "walk: {vb}");
                }
            }
            WalkControl::Continue
        },
    )?;
    dispatcher.serve_with(&agent, 32);

    // GetBulk walk: sysUpTime once per round, ifDescr/ifType repeated
    let bulk = BulkWalk::new(dispatcher.clone(), targets);
    bulk.send_req(
        "lab-v2c",
        1,
        2,
        vec![
            VarBind::null("1.3.6.1.2.1.1.3".parse::<Oid>()?),
            VarBind::null("1.3.6.1.2.1.2.2.1.2".parse::<Oid>()?),
            VarBind::null("1.3.6.1.2.1.2.2.1.3".parse::<Oid>()?),
        ],
        Scope::default(),
        |round| {
            if let Some(err) = &round.error_indication {
                warn!(handle = %round.request_handle, %err, "bulk walk failed");
                return WalkControl::Stop;
            }
            for (idx, row) in round.table.iter().enumerate() {
                for vb in row {
                    info!(handle = %round.request_handle, row = idx, "bulk: {vb}");
                }
            }
            WalkControl::Continue
        },
    )?;
    dispatcher.serve_with(&agent, 32);

    info!("loopback demo complete");
    Ok(())
}
