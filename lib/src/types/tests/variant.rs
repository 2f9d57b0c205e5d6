use std::convert::TryFrom;
use std::str::FromStr;

use crate::types::{tests::*, variant_type_id::EncodingMask};

#[test]
fn size() {
    // Boxing keeps the variant small
    let size = std::mem::size_of::<Variant>();
    println!("Variant size = {}", size);
    assert!(size <= 32);
}

#[test]
fn decode_int32() {
    let v = decode_bytes::<Variant>(&[0x06, 0x2A, 0x00, 0x00, 0x00]).unwrap();
    assert_eq!(v, Variant::Int32(42));
    assert_eq!(v.type_id(), VariantTypeId::Int32);
    assert_eq!(v.as_i32().unwrap(), 42);
}

#[test]
fn encode_scalars() {
    serialize_and_compare(Variant::Empty, &[0x00]);
    serialize_and_compare(Variant::from(true), &[EncodingMask::BOOLEAN, 0x01]);
    serialize_and_compare(Variant::from(42i32), &[0x06, 0x2A, 0x00, 0x00, 0x00]);
    serialize_and_compare(
        Variant::from("ab"),
        &[EncodingMask::STRING, 0x02, 0x00, 0x00, 0x00, b'a', b'b'],
    );
    serialize_and_compare(
        Variant::from(NodeId::new(0, 1u32)),
        &[EncodingMask::NODE_ID, 0x00, 0x01],
    );
}

#[test]
fn round_trip_scalars() {
    let values = vec![
        Variant::Empty,
        Variant::from(false),
        Variant::from(-3i8),
        Variant::from(200u8),
        Variant::from(-1000i16),
        Variant::from(60000u16),
        Variant::from(-100000i32),
        Variant::from(4000000000u32),
        Variant::from(-9000000000i64),
        Variant::from(18000000000000000000u64),
        Variant::from(1.5f32),
        Variant::from(-2.25f64),
        Variant::from("hello"),
        Variant::from(UAString::null()),
        Variant::from(DateTime::ymd_hms(2020, 2, 29, 12, 0, 0)),
        Variant::from(Guid::new()),
        Variant::from(StatusCode::BadTypeMismatch),
        Variant::from(ByteString::from(b"bytes")),
        Variant::XmlElement(XmlElement::from("<a>1</a>")),
        Variant::from(QualifiedName::new(2, "Name")),
        Variant::from(LocalizedText::new("en", "Text")),
        Variant::from(NodeId::new(3, "Node")),
        Variant::from(ExpandedNodeId::with_namespace_uri("urn:x", 5u32)),
        Variant::from(DataValue::value_only(10u16)),
        Variant::from(DiagnosticInfo {
            symbolic_id: Some(1),
            ..Default::default()
        }),
        Variant::Variant(Box::new(Variant::from(1u8))),
    ];
    for v in values {
        serialize_test(v);
    }
}

#[test]
fn single_dimension_array() {
    let v = Variant::from(vec![1i32, 2, 3]);
    assert!(v.is_array());
    assert!(v.is_array_of_type(VariantTypeId::Int32));
    assert!(!v.is_array_of_type(VariantTypeId::UInt32));
    assert_eq!(v.type_id(), VariantTypeId::Int32);
    assert_eq!(v.type_name(), "array of Int32");
    serialize_and_compare(
        v.clone(),
        &[
            0x86, 0x03, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x02, 0x00, 0x00, 0x00, 0x03,
            0x00, 0x00, 0x00,
        ],
    );
    serialize_test(v.clone());
    assert_eq!(Vec::<i32>::try_from(&v).unwrap(), vec![1, 2, 3]);

    let v = Variant::from(vec!["a".to_string(), "b".to_string()]);
    serialize_test(v);

    let v = Variant::new_array(VariantTypeId::Variant, vec![
        Variant::Variant(Box::new(Variant::from(1u8))),
        Variant::Variant(Box::new(Variant::from("x"))),
    ])
    .unwrap();
    serialize_test(v);
}

#[test]
fn empty_array() {
    let v = Variant::new_array(VariantTypeId::Double, Vec::new()).unwrap();
    serialize_and_compare(
        v.clone(),
        &[EncodingMask::DOUBLE | EncodingMask::ARRAY_VALUES_BIT, 0, 0, 0, 0],
    );
    serialize_test(v);
}

#[test]
fn decode_null_array() {
    // A null array is a null variant, not an empty array
    let bytes = [EncodingMask::INT32 | EncodingMask::ARRAY_VALUES_BIT, 0xFF, 0xFF, 0xFF, 0xFF];
    let v = decode_bytes::<Variant>(&bytes).unwrap();
    assert_eq!(v, Variant::Empty);
    serialize_and_compare(v, &[0x00]);

    // Dimensions after a null array are read and dropped
    let bytes = [
        EncodingMask::INT32 | EncodingMask::ARRAY_VALUES_BIT | EncodingMask::ARRAY_DIMENSIONS_BIT,
        0xFF,
        0xFF,
        0xFF,
        0xFF,
        0x01,
        0x00,
        0x00,
        0x00,
        0x02,
        0x00,
        0x00,
        0x00,
    ];
    let mut stream = std::io::Cursor::new(&bytes[..]);
    let v = Variant::decode(&mut stream, &DecodingOptions::default()).unwrap();
    assert_eq!(v, Variant::Empty);
    assert_eq!(stream.position() as usize, bytes.len());
}

#[test]
fn array_type_mismatch() {
    let err = Variant::new_array(
        VariantTypeId::Int32,
        vec![Variant::from(1i32), Variant::from(2u32)],
    )
    .unwrap_err();
    assert_eq!(err, EncodingError::type_mismatch("Int32", "UInt32"));

    // Arrays may not be nested
    let inner = Variant::from(vec![1i32]);
    assert!(Variant::new_array(VariantTypeId::Int32, vec![inner]).is_err());

    // Arrays need a type
    assert!(Variant::new_array(VariantTypeId::Empty, Vec::new()).is_err());
}

#[test]
fn multi_dimension_array() {
    let values: Vec<Variant> = (1..=6i32).map(Variant::from).collect::<Vec<Variant>>();
    let v = Variant::new_matrix(VariantTypeId::Int32, values, vec![2u32, 3]).unwrap();
    let array = v.as_array().unwrap();
    assert_eq!(array.dimensions(), &[2, 3]);
    assert_eq!(array.len(), 6);
    assert!(array.has_dimensions());

    let mut expected = vec![0xC6, 0x06, 0x00, 0x00, 0x00];
    for i in 1u8..=6 {
        expected.extend_from_slice(&[i, 0, 0, 0]);
    }
    expected.extend_from_slice(&[0x02, 0, 0, 0, 0x02, 0, 0, 0, 0x03, 0, 0, 0]);
    serialize_and_compare(v.clone(), &expected);
    serialize_test(v);

    // 3 dimensions
    let values: Vec<Variant> = (0..24).map(|i| Variant::from(i as u8)).collect();
    let v = Variant::new_matrix(VariantTypeId::Byte, values, vec![2u32, 3, 4]).unwrap();
    serialize_test(v);
}

#[test]
fn matrix_dimension_mismatch() {
    let values: Vec<Variant> = (1..=5i32).map(Variant::from).collect::<Vec<Variant>>();
    let err = Variant::new_matrix(VariantTypeId::Int32, values, vec![2u32, 3]).unwrap_err();
    assert_eq!(
        err,
        EncodingError::DimensionMismatch {
            dimensions: vec![2, 3],
            len: 5
        }
    );
    assert_eq!(err.status_code(), StatusCode::BadDataEncodingInvalid);

    // Dimensions that overflow are a mismatch, not a panic
    let values = vec![Variant::from(1i32)];
    assert!(matches!(
        Variant::new_matrix(VariantTypeId::Int32, values, vec![u32::MAX, u32::MAX, u32::MAX]),
        Err(EncodingError::DimensionMismatch { .. })
    ));
}

#[test]
fn decode_matrix_dimension_mismatch() {
    // 2 values, dimensions say 3
    let bytes = [
        0xC6, 0x02, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x02, 0x00, 0x00, 0x00, 0x01, 0x00,
        0x00, 0x00, 0x03, 0x00, 0x00, 0x00,
    ];
    assert!(matches!(
        decode_bytes::<Variant>(&bytes),
        Err(EncodingError::DimensionMismatch { .. })
    ));
}

#[test]
fn decode_dimensions_without_array() {
    let bytes = [EncodingMask::INT32 | EncodingMask::ARRAY_DIMENSIONS_BIT, 0x01, 0, 0, 0];
    assert!(matches!(
        decode_bytes::<Variant>(&bytes),
        Err(EncodingError::InvalidEncoding(_))
    ));
}

#[test]
fn decode_unknown_type() {
    assert!(matches!(
        decode_bytes::<Variant>(&[0x1F]),
        Err(EncodingError::InvalidEncoding(_))
    ));
}

#[test]
fn decode_truncated() {
    assert_eq!(
        decode_bytes::<Variant>(&[0x06, 0x2A, 0x00]).unwrap_err(),
        EncodingError::UnexpectedEof
    );
}

#[test]
fn accessors() {
    let v = Variant::from(7u16);
    assert_eq!(v.as_u16().unwrap(), 7);
    assert_eq!(u16::try_from(&v).unwrap(), 7);

    let err = v.as_i32().unwrap_err();
    assert_eq!(err, EncodingError::type_mismatch("Int32", "UInt16"));
    assert_eq!(err.status_code(), StatusCode::BadTypeMismatch);

    // No widening or narrowing
    assert!(Variant::from(1i32).as_i64().is_err());
    assert!(Variant::from(1.0f32).as_f64().is_err());

    let v = Variant::from("text");
    assert_eq!(v.as_string().unwrap().as_ref(), "text");
    assert!(v.as_node_id().is_err());

    let v = Variant::from(vec![1u32, 2]);
    assert!(v.as_u32().is_err());
    assert_eq!(v.as_array().unwrap().value_type(), VariantTypeId::UInt32);
    assert!(Vec::<i32>::try_from(&v).is_err());
    assert!(Variant::from(1u32).as_array().is_err());

    let node_id = NodeId::from_str("ns=1;s=x").unwrap();
    let v = Variant::from(node_id.clone());
    assert_eq!(v.as_node_id().unwrap(), &node_id);
    assert_eq!(NodeId::try_from(&v).unwrap(), node_id);
}

#[test]
fn type_names() {
    assert_eq!(Variant::Empty.type_name(), "Null");
    assert_eq!(Variant::from(1.0f64).type_name(), "Double");
    assert!(Variant::from(1.0f64).is_numeric());
    assert!(!Variant::from("1").is_numeric());
    assert!(!Variant::from(vec![1.0f64]).is_numeric());
    for name in ["Boolean", "Int32", "ExtensionObject", "Null"].iter() {
        assert_eq!(VariantTypeId::from_name(name).unwrap().name(), *name);
    }
    assert_eq!(VariantTypeId::from_name("Int33"), None);
}

#[test]
fn data_type_ids() {
    assert_eq!(
        VariantTypeId::Int32.data_type_id(),
        Some(DataTypeId::Int32)
    );
    assert_eq!(
        VariantTypeId::ExtensionObject.data_type_id(),
        Some(DataTypeId::Structure)
    );
    assert_eq!(VariantTypeId::Empty.data_type_id(), None);
    assert_eq!(
        VariantTypeId::try_from(&NodeId::from(DataTypeId::LocalizedText)).unwrap(),
        VariantTypeId::LocalizedText
    );
}

#[test]
fn nested_variant_depth() {
    let mut v = Variant::from(1i32);
    for _ in 0..constants::MAX_DECODING_DEPTH {
        v = Variant::Variant(Box::new(v));
    }
    // Exactly at the limit
    serialize_test(v.clone());

    let v = Variant::Variant(Box::new(v));
    let mut stream = serialize_as_stream(v);
    let err = Variant::decode(&mut stream, &DecodingOptions::test()).unwrap_err();
    assert_eq!(
        err,
        EncodingError::DecodingDepthExceeded(constants::MAX_DECODING_DEPTH)
    );
}

#[test]
fn array_of_variants_depth() {
    // Variants nested inside an array count too
    let mut v = Variant::from(1i32);
    for _ in 0..=constants::MAX_DECODING_DEPTH {
        v = Variant::Variant(Box::new(v));
    }
    let array = Variant::new_array(VariantTypeId::Variant, vec![v]).unwrap();
    let mut stream = serialize_as_stream(array);
    assert!(matches!(
        Variant::decode(&mut stream, &DecodingOptions::test()),
        Err(EncodingError::DecodingDepthExceeded(_))
    ));
}

#[test]
fn extension_object_in_variant() {
    let eo = ExtensionObject::new(
        ObjectId::Argument_Encoding_DefaultBinary,
        ExtensionObjectEncoding::ByteString(ByteString::from(&[1u8, 2, 3])),
    );
    let v = Variant::from(eo.clone());
    assert_eq!(v.as_extension_object().unwrap(), &eo);
    serialize_test(v);
}

#[test]
fn display() {
    assert_eq!(Variant::from(12i32).to_string(), "12");
    assert_eq!(Variant::from("abc").to_string(), "abc");
    assert_eq!(Variant::from(NodeId::new(2, 7u32)).to_string(), "ns=2;i=7");
    assert_eq!(
        Variant::Variant(Box::new(Variant::from(true))).to_string(),
        "Variant(true)"
    );
}
