// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use anyhow::Result;
use snmp_cmdgen_rs::{
    cfg::{cli::resolve_config_path, config::Config},
    models::params::{MpModel, SecurityLevel, SecurityModel, TransportDomain},
    target::{TargetError, TargetStore},
};

fn load_config() -> Result<Config> {
    resolve_config_path("tests/config.yaml").and_then(Config::load_from_file)
}

#[test]
fn test_targets_parse_with_explicit_fields() -> Result<()> {
    let cfg = load_config()?;

    let lab = cfg.targets.get("lab-v2c").expect("lab-v2c present");
    assert_eq!(lab.address, "192.0.2.10:161");
    assert_eq!(lab.timeout_cs, 100);
    assert_eq!(lab.retries, 3);
    assert_eq!(lab.mp_model, MpModel::V2c);
    assert_eq!(lab.security_model, SecurityModel::V2c);
    assert_eq!(lab.security_name, "public");
    assert_eq!(lab.transport_domain, TransportDomain::Udp);

    let v3 = cfg.targets.get("lab-v3").expect("lab-v3 present");
    assert_eq!(v3.mp_model, MpModel::V3);
    assert_eq!(v3.security_model, SecurityModel::Usm);
    assert_eq!(v3.security_level, SecurityLevel::AuthPriv);

    Ok(())
}

#[test]
fn test_target_mib_defaults_apply() -> Result<()> {
    let cfg = load_config()?;

    let target = cfg.targets.get("defaults-v2c").expect("defaults-v2c present");
    assert_eq!(target.timeout_cs, 1500);
    assert_eq!(target.retries, 3);
    assert_eq!(target.security_level, SecurityLevel::NoAuthNoPriv);
    assert_eq!(target.transport_domain, TransportDomain::Udp);

    Ok(())
}

#[test]
fn test_store_resolves_known_and_refuses_unknown() -> Result<()> {
    let cfg = load_config()?;
    let store = TargetStore::from_config(&cfg);
    assert_eq!(store.len(), cfg.targets.len());

    let info = store.resolve("lab-v1")?;
    assert_eq!(info.transport_address, "192.0.2.11:161");
    assert_eq!(info.mp_model, MpModel::V1);
    assert_eq!(info.retry_limit, 1);

    let err = store.resolve("no-such-router").expect_err("unknown target");
    assert!(matches!(err, TargetError::UnknownTarget(name) if name == "no-such-router"));

    Ok(())
}

#[test]
fn test_inconsistent_security_model_is_refused() {
    let result =
        resolve_config_path("tests/config_bad.yaml").and_then(Config::load_from_file);
    assert!(result.is_err());
}
