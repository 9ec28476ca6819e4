// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use anyhow::Result;
use snmp_cmdgen_rs::models::{
    codec::{module_for, version_specifics},
    params::{MpModel, PduVersion},
    pdu::{ErrorStatus, PduType},
    value::Value,
    varbind::VarBind,
};

use crate::unit_tests::oid;

#[test]
fn test_version_specifics_mapping() {
    let (v, module) = version_specifics(MpModel::V1);
    assert_eq!(v, PduVersion::V1);
    assert_eq!(module.version(), PduVersion::V1);

    let (v, _) = version_specifics(MpModel::V2c);
    assert_eq!(v, PduVersion::V2c);

    // v3 rides on the v2c PDU family
    let (v, _) = version_specifics(MpModel::V3);
    assert_eq!(v, PduVersion::V2c);
}

#[test]
fn test_defaults_assign_fresh_request_ids() {
    let module = module_for(PduVersion::V2c);
    let mut a = module.get_request();
    let mut b = module.get_request();
    a.error_status = 5;
    a.error_index = 2;

    module.set_defaults(&mut a);
    module.set_defaults(&mut b);

    assert!(module.request_id(&a) > 0);
    assert_ne!(module.request_id(&a), module.request_id(&b));
    assert_eq!(module.error_status(&a), 0);
    assert_eq!(module.error_index(&a), 0);
}

#[test]
fn test_defaults_leave_bulk_parameters_alone() -> Result<()> {
    let module = module_for(PduVersion::V2c);

    // set before defaults, the order the drivers use
    let mut pdu = module.get_bulk_request()?;
    module.set_non_repeaters(&mut pdu, 1);
    module.set_max_repetitions(&mut pdu, 10);
    module.set_defaults(&mut pdu);
    assert_eq!(module.non_repeaters(&pdu), 1);
    assert_eq!(module.max_repetitions(&pdu), 10);
    assert!(module.request_id(&pdu) > 0);

    // and after, which must work just as well
    let mut pdu = module.get_bulk_request()?;
    module.set_defaults(&mut pdu);
    module.set_non_repeaters(&mut pdu, 2);
    module.set_max_repetitions(&mut pdu, 7);
    assert_eq!(module.non_repeaters(&pdu), 2);
    assert_eq!(module.max_repetitions(&pdu), 7);

    // the reused slots never leak out as a responder error
    assert_eq!(module.error_status(&pdu), 0);
    assert_eq!(module.error_index(&pdu), 0);

    Ok(())
}

#[test]
fn test_v1_has_no_bulk() {
    assert!(module_for(PduVersion::V1).get_bulk_request().is_err());
}

#[test]
fn test_var_bind_roundtrip() {
    let module = module_for(PduVersion::V2c);
    let mut pdu = module.set_request();
    let bindings = vec![
        VarBind::new(oid("1.3.6.1.2.1.1.5.0"), Value::octet_string("core-sw-1")),
        VarBind::new(oid("1.3.6.1.2.1.1.6.0"), Value::octet_string("rack 4")),
    ];
    module.set_var_binds(&mut pdu, bindings.clone());
    assert_eq!(module.var_binds(&pdu), &bindings[..]);
}

#[test]
fn test_next_table_aligns_to_request_columns() {
    let module = module_for(PduVersion::V2c);
    let mut req = module.get_next_request();
    module.set_var_binds(&mut req, vec![
        VarBind::null(oid("1.3.6.1.2.1.2.2.1.2")),
        VarBind::null(oid("1.3.6.1.2.1.2.2.1.3")),
    ]);

    let mut rsp = module.response();
    module.set_var_binds(&mut rsp, vec![
        VarBind::new(oid("1.3.6.1.2.1.2.2.1.2.1"), Value::octet_string("lo")),
        VarBind::new(oid("1.3.6.1.2.1.2.2.1.3.1"), Value::Integer(24)),
    ]);

    let table = module.var_bind_table(&req, &rsp);
    assert_eq!(table.len(), 1);
    assert_eq!(table[0].len(), 2);
    assert_eq!(table[0][0].oid, oid("1.3.6.1.2.1.2.2.1.2.1"));
    assert_eq!(table[0][1].oid, oid("1.3.6.1.2.1.2.2.1.3.1"));
}

#[test]
fn test_bulk_table_shape() -> Result<()> {
    let module = module_for(PduVersion::V2c);
    let mut req = module.get_bulk_request()?;
    module.set_non_repeaters(&mut req, 1);
    module.set_max_repetitions(&mut req, 2);
    module.set_defaults(&mut req);
    module.set_var_binds(&mut req, vec![
        VarBind::null(oid("1.3.6.1.2.1.1.3")),
        VarBind::null(oid("1.3.6.1.2.1.2.2.1.2")),
        VarBind::null(oid("1.3.6.1.2.1.2.2.1.3")),
    ]);

    // one non-repeater binding plus two repetitions of two repeaters
    let mut rsp = module.response();
    module.set_var_binds(&mut rsp, vec![
        VarBind::new(oid("1.3.6.1.2.1.1.3.0"), Value::TimeTicks(1000)),
        VarBind::new(oid("1.3.6.1.2.1.2.2.1.2.1"), Value::octet_string("lo")),
        VarBind::new(oid("1.3.6.1.2.1.2.2.1.3.1"), Value::Integer(24)),
        VarBind::new(oid("1.3.6.1.2.1.2.2.1.2.2"), Value::octet_string("eth0")),
        VarBind::new(oid("1.3.6.1.2.1.2.2.1.3.2"), Value::Integer(6)),
    ]);

    let table = module.var_bind_table(&req, &rsp);
    assert_eq!(table.len(), 2);
    for row in &table {
        // every row has the request's column count and ordering
        assert_eq!(row.len(), 3);
        assert_eq!(row[0].oid, oid("1.3.6.1.2.1.1.3.0"));
        assert!(row[1].oid.starts_with(&oid("1.3.6.1.2.1.2.2.1.2")));
        assert!(row[2].oid.starts_with(&oid("1.3.6.1.2.1.2.2.1.3")));
    }
    assert_eq!(table[1][1].oid, oid("1.3.6.1.2.1.2.2.1.2.2"));

    Ok(())
}

#[test]
fn test_bulk_table_is_bounded_by_max_repetitions() -> Result<()> {
    let module = module_for(PduVersion::V2c);
    let mut req = module.get_bulk_request()?;
    module.set_non_repeaters(&mut req, 0);
    module.set_max_repetitions(&mut req, 2);
    module.set_var_binds(&mut req, vec![VarBind::null(oid("1.3.6.1.2.1.2.2.1.2"))]);

    // a misbehaving agent returning three repetitions gets clipped
    let mut rsp = module.response();
    module.set_var_binds(&mut rsp, vec![
        VarBind::new(oid("1.3.6.1.2.1.2.2.1.2.1"), Value::octet_string("lo")),
        VarBind::new(oid("1.3.6.1.2.1.2.2.1.2.2"), Value::octet_string("eth0")),
        VarBind::new(oid("1.3.6.1.2.1.2.2.1.2.3"), Value::octet_string("eth1")),
    ]);

    let table = module.var_bind_table(&req, &rsp);
    assert_eq!(table.len(), 2);

    Ok(())
}

#[test]
fn test_v1_no_such_name_marks_end_of_view() {
    let module = module_for(PduVersion::V1);
    let mut req = module.get_next_request();
    module.set_var_binds(&mut req, vec![VarBind::null(oid("1.3.6.1.2.1.2.2.1.2.2"))]);

    let mut rsp = module.response();
    rsp.error_status = ErrorStatus::NoSuchName.code();
    rsp.error_index = 1;
    module.set_var_binds(&mut rsp, vec![VarBind::null(oid("1.3.6.1.2.1.2.2.1.2.2"))]);

    let table = module.var_bind_table(&req, &rsp);
    assert_eq!(table.len(), 1);
    assert_eq!(table[0].len(), 1);
    assert_eq!(table[0][0].oid, oid("1.3.6.1.2.1.2.2.1.2.2"));
    assert!(table[0][0].value.is_end_of_mib_view());
}

#[test]
fn test_pdu_type_texture() {
    let module = module_for(PduVersion::V2c);
    assert_eq!(module.get_request().pdu_type, PduType::GetRequest);
    assert_eq!(module.get_next_request().pdu_type, PduType::GetNextRequest);
    assert_eq!(module.set_request().pdu_type, PduType::SetRequest);
    assert_eq!(module.response().pdu_type, PduType::Response);
    assert_eq!(ErrorStatus::from_code(2), Some(ErrorStatus::NoSuchName));
    assert_eq!(ErrorStatus::NoSuchName.to_string(), "noSuchName");
}
