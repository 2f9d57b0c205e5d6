use std::sync::Arc;

use serde_json::json;

use crate::types::{service_types::*, tests::*, variant_type_id::EncodingMask};

fn encode_to_vec<T: BinaryEncoder<T>>(value: &T) -> Vec<u8> {
    let mut bytes = Vec::new();
    value.encode(&mut bytes).unwrap();
    assert_eq!(bytes.len(), value.byte_len());
    bytes
}

fn motor_speed() -> Argument {
    Argument::new("Speed", DataTypeId::Double, -1, "Motor speed")
}

fn empty_registry_context() -> EncodingContext {
    EncodingContext::with_registry(Arc::new(TypeRegistryBuilder::new().build().unwrap()))
}

#[test]
fn null() {
    let mut eo = ExtensionObject::null();
    assert!(eo.is_null());
    assert!(eo.is_empty());
    assert_eq!(eo.encoding_format(), None);
    assert!(eo.resolve(&EncodingContext::default()).unwrap().is_none());
    assert_eq!(encode_to_vec(&eo), vec![0x00, 0x00, 0x00]);
}

#[test]
fn opaque_body_passes_through_unchanged() {
    let body = ByteString::from(vec![1u8, 2, 3, 4, 5]);
    let eo = ExtensionObject::new(
        NodeId::new(5, 999u32),
        ExtensionObjectEncoding::ByteString(body),
    );
    let bytes = encode_to_vec(&eo);
    assert_eq!(
        bytes,
        vec![0x01, 0x05, 0xE7, 0x03, 0x01, 0x05, 0x00, 0x00, 0x00, 1, 2, 3, 4, 5]
    );

    let mut read: ExtensionObject = decode_bytes(&bytes).unwrap();
    assert_eq!(read, eo);

    // Nobody knows the type, the object stays opaque
    assert!(read.resolve(&EncodingContext::default()).unwrap().is_none());
    assert!(read.value().is_none());
    assert_eq!(encode_to_vec(&read), bytes);

    // Same again inside a variant
    let variant = Variant::from(read);
    let variant_bytes = encode_to_vec(&variant);
    assert_eq!(variant_bytes[0], EncodingMask::EXTENSION_OBJECT);
    assert_eq!(&variant_bytes[1..], bytes.as_slice());
    let read: Variant = decode_bytes(&variant_bytes).unwrap();
    assert_eq!(encode_to_vec(&read), variant_bytes);
}

#[test]
fn from_structure_writes_binary_encoding_id() {
    let eo = ExtensionObject::from_structure(motor_speed());
    assert_eq!(eo.node_id, Argument::BINARY_ENCODING_ID);
    assert!(!eo.is_null());
    assert!(!eo.is_empty());

    let bytes = encode_to_vec(&eo);
    let read: ExtensionObject = decode_bytes(&bytes).unwrap();
    assert_eq!(read.node_id, Argument::BINARY_ENCODING_ID);
    assert_eq!(read.encoding_format(), Some(EncodingFormat::Binary));
    let body = read.binary_body().unwrap();
    assert_eq!(body.value.as_ref().unwrap(), &encode_binary(&motor_speed()).unwrap());
}

#[test]
fn resolve_through_registry() {
    let bytes = encode_to_vec(&ExtensionObject::from_structure(motor_speed()));
    let mut read: ExtensionObject = decode_bytes(&bytes).unwrap();
    assert!(read.value().is_none());

    let ctx = EncodingContext::default();
    let value = read.resolve(&ctx).unwrap().unwrap();
    assert_eq!(value.type_name(), "Argument");
    assert_eq!(value.data_type_id(), Argument::TYPE_ID);
    assert_eq!(value.downcast_ref::<Argument>(), Some(&motor_speed()));
    assert!(read.value().is_some());

    // The decoded value is kept, a registry that knows nothing is not consulted again
    let value = read.resolve(&empty_registry_context()).unwrap().unwrap();
    assert_eq!(value.downcast_ref::<Argument>(), Some(&motor_speed()));

    // Writing a resolved object reproduces the bytes it was read from
    assert_eq!(encode_to_vec(&read), bytes);
}

#[test]
fn resolved_objects_compare_by_value() {
    let bytes = encode_to_vec(&ExtensionObject::from_structure(motor_speed()));
    let mut a: ExtensionObject = decode_bytes(&bytes).unwrap();
    let mut b: ExtensionObject = decode_bytes(&bytes).unwrap();
    let ctx = EncodingContext::default();
    a.resolve(&ctx).unwrap();
    b.resolve(&ctx).unwrap();
    assert_eq!(a, b);
}

#[test]
fn resolve_bad_body_keeps_body() {
    let mut eo = ExtensionObject::new(
        Argument::BINARY_ENCODING_ID,
        ExtensionObjectEncoding::ByteString(ByteString::from(vec![0x01u8, 0x02])),
    );
    assert!(eo.resolve(&EncodingContext::default()).is_err());
    assert!(eo.value().is_none());
    assert!(eo.binary_body().is_some());
}

#[test]
fn resolve_xml_body() {
    let xml = encode_xml(&motor_speed()).unwrap();
    let mut eo = ExtensionObject::new(
        Argument::XML_ENCODING_ID,
        ExtensionObjectEncoding::XmlElement(XmlElement::from(xml)),
    );
    assert_eq!(eo.encoding_format(), Some(EncodingFormat::Xml));
    let value = eo.resolve(&EncodingContext::default()).unwrap().unwrap();
    assert_eq!(value.downcast_ref::<Argument>(), Some(&motor_speed()));
}

#[test]
fn resolve_json_body() {
    let body = encode_json(&motor_speed()).unwrap();
    let mut eo = ExtensionObject::new(Argument::JSON_ENCODING_ID, ExtensionObjectEncoding::Json(body));
    assert_eq!(eo.encoding_format(), Some(EncodingFormat::Json));
    let value = eo.resolve(&EncodingContext::default()).unwrap().unwrap();
    assert_eq!(value.downcast_ref::<Argument>(), Some(&motor_speed()));
}

#[test]
fn json_body_cannot_be_written_as_binary() {
    let eo = ExtensionObject::new(
        NodeId::new(2, 7000u32),
        ExtensionObjectEncoding::Json(json!({"Value": 1})),
    );
    let mut bytes = Vec::new();
    assert!(matches!(
        eo.encode(&mut bytes),
        Err(EncodingError::InvalidEncoding(_))
    ));

    // Once resolved the value is written instead
    let mut eo = ExtensionObject::new(
        Argument::JSON_ENCODING_ID,
        ExtensionObjectEncoding::Json(encode_json(&motor_speed()).unwrap()),
    );
    eo.resolve(&EncodingContext::default()).unwrap();
    let bytes = encode_to_vec(&eo);
    let mut read: ExtensionObject = decode_bytes(&bytes).unwrap();
    assert_eq!(read.node_id, Argument::BINARY_ENCODING_ID);
    assert_eq!(
        read.decode_as::<Argument>(&EncodingContext::default()).unwrap(),
        motor_speed()
    );
}

#[test]
fn decode_as_checks_encoding_id() {
    let header = RequestHeader::new(&NodeId::null(), &DateTime::epoch(), 1);
    let bytes = encode_to_vec(&ExtensionObject::from_structure(header.clone()));
    let mut read: ExtensionObject = decode_bytes(&bytes).unwrap();

    let err = read
        .decode_as::<Argument>(&EncodingContext::default())
        .unwrap_err();
    assert!(matches!(err, EncodingError::TypeMismatch { .. }));
    assert_eq!(err.status_code(), StatusCode::BadTypeMismatch);

    assert_eq!(
        read.decode_as::<RequestHeader>(&EncodingContext::default())
            .unwrap(),
        header
    );
}

#[test]
fn decode_as_without_registration() {
    let bytes = encode_to_vec(&ExtensionObject::from_structure(motor_speed()));
    let mut read: ExtensionObject = decode_bytes(&bytes).unwrap();
    let ctx = empty_registry_context();
    assert!(read.resolve(&ctx).unwrap().is_none());
    assert_eq!(read.decode_as::<Argument>(&ctx).unwrap(), motor_speed());
    assert!(read.value().is_some());
}

#[test]
fn decode_as_empty_body() {
    let mut eo = ExtensionObject::new(Argument::BINARY_ENCODING_ID, ExtensionObjectEncoding::None);
    assert!(matches!(
        eo.decode_as::<Argument>(&empty_registry_context()),
        Err(EncodingError::InvalidEncoding(_))
    ));
}
