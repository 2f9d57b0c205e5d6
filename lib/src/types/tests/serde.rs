use std::str::FromStr;

use serde_json::json;

use crate::types::{
    byte_string::ByteString, date_time::DateTime, diagnostic_info::DiagnosticInfo, guid::Guid,
    localized_text::LocalizedText, node_id::NodeId, status_code::StatusCode, string::UAString,
};

#[test]
fn serialize_string() {
    let json = serde_json::to_value(&UAString::from("Hello World!")).unwrap();
    assert_eq!(json, json!({"value": "Hello World!"}));
    let s: UAString = serde_json::from_value(json).unwrap();
    assert_eq!(s.as_ref(), "Hello World!");

    let json = serde_json::to_value(&UAString::null()).unwrap();
    assert_eq!(json, json!({"value": null}));
    let s: UAString = serde_json::from_value(json).unwrap();
    assert!(s.is_null());
}

#[test]
fn serialize_date_time() {
    let dt1 = DateTime::now();
    let vs = serde_json::to_string(&dt1).unwrap();
    println!("date_time = {}", vs);
    assert_eq!(vs, dt1.checked_ticks().to_string());
    let dt2 = serde_json::from_str::<DateTime>(&vs).unwrap();
    assert_eq!(dt1, dt2);

    // Out of range ticks are clamped
    let dt: DateTime = serde_json::from_value(json!(-10)).unwrap();
    assert!(dt.is_null());
}

#[test]
fn serialize_guid() {
    let g1 = Guid::new();
    let vs = serde_json::to_string(&g1).unwrap();
    let g2: Guid = serde_json::from_str(&vs).unwrap();
    assert_eq!(g1, g2);

    let g1: Guid = serde_json::from_value(json!("f9e561f3-351c-47a2-b969-b8d6d7226fee")).unwrap();
    let g2 = Guid::from_str("f9e561f3-351c-47a2-b969-b8d6d7226fee").unwrap();
    assert_eq!(g1, g2);

    assert!(
        serde_json::from_value::<Guid>(json!("{f9e561f3-351c-47a2-b969-b8d6d7226fee")).is_err()
    );
}

#[test]
fn serialize_byte_string() {
    let json = serde_json::to_value(&ByteString::from(&[1u8, 2, 3])).unwrap();
    assert_eq!(json, json!("AQID"));
    assert_eq!(
        serde_json::from_value::<ByteString>(json).unwrap(),
        ByteString::from(&[1u8, 2, 3])
    );

    assert_eq!(serde_json::to_value(&ByteString::null()).unwrap(), json!(null));
    assert!(serde_json::from_value::<ByteString>(json!(null))
        .unwrap()
        .is_null());
    assert!(serde_json::from_value::<ByteString>(json!("***")).is_err());
}

#[test]
fn serialize_status_code() {
    // Unknown codes survive
    let code = StatusCode::from(0x8123_0000u32);
    let json = serde_json::to_value(&code).unwrap();
    assert_eq!(json, json!(0x8123_0000u32));
    assert_eq!(serde_json::from_value::<StatusCode>(json).unwrap(), code);
}

#[test]
fn serialize_node_id() {
    for id in [
        NodeId::new(0, 85u32),
        NodeId::new(2, "Pump"),
        NodeId::new(1, Guid::new()),
        NodeId::new(5, ByteString::from(b"opaque")),
    ]
    .iter()
    {
        let json = serde_json::to_string(id).unwrap();
        println!("node id = {}", json);
        assert_eq!(&serde_json::from_str::<NodeId>(&json).unwrap(), id);
    }
    assert_eq!(
        serde_json::to_value(&NodeId::new(0, 85u32)).unwrap(),
        json!({"namespace": 0, "identifier": {"Numeric": 85}})
    );
}

#[test]
fn serialize_localized_text() {
    let text = LocalizedText::new("en", "Hello");
    let json = serde_json::to_string(&text).unwrap();
    assert_eq!(serde_json::from_str::<LocalizedText>(&json).unwrap(), text);
}

#[test]
fn serialize_diagnostic_info() {
    let info = DiagnosticInfo {
        symbolic_id: Some(1),
        additional_info: Some(UAString::from("more")),
        inner_diagnostic_info: Some(Box::new(DiagnosticInfo {
            inner_status_code: Some(StatusCode::BadTimeout),
            ..Default::default()
        })),
        ..Default::default()
    };
    let json = serde_json::to_string(&info).unwrap();
    println!("diagnostic info = {}", json);
    assert_eq!(serde_json::from_str::<DiagnosticInfo>(&json).unwrap(), info);
}
