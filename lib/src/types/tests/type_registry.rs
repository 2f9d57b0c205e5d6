use std::{io::Cursor, sync::Arc};

use crate::types::{service_types::*, tests::*};

fn point_ids() -> EncodingIds {
    EncodingIds {
        binary: NodeId::new(2, 5001u32),
        xml: NodeId::new(2, 5002u32),
        json: NodeId::new(2, 5003u32),
    }
}

fn point_definition() -> StructureDefinition {
    StructureDefinition::new(
        StructureKind::Structure,
        vec![
            StructureField::new("X", DataTypeId::Double),
            StructureField::new("Y", DataTypeId::Double),
        ],
    )
}

#[test]
fn builtin_lookups() {
    let registry = TypeRegistry::builtin();

    let codec = registry.binary_codec(&Argument::BINARY_ENCODING_ID).unwrap();
    assert_eq!(codec.type_name(), "Argument");
    assert!(registry.xml_codec(&Argument::XML_ENCODING_ID).is_some());
    assert!(registry.json_codec(&Argument::JSON_ENCODING_ID).is_some());

    // Each table only holds the ids of its own format
    assert!(registry.binary_codec(&Argument::XML_ENCODING_ID).is_none());
    assert!(registry
        .codec(EncodingFormat::Json, &Argument::BINARY_ENCODING_ID)
        .is_none());
    assert!(registry
        .codec(EncodingFormat::Json, &Argument::JSON_ENCODING_ID)
        .is_some());

    assert_eq!(
        registry.codec_for_type(&RequestHeader::TYPE_ID).unwrap().type_name(),
        "RequestHeader"
    );
    assert_eq!(
        registry.encoding_ids(&Argument::TYPE_ID),
        Some(&Argument::encoding_ids())
    );
    assert!(registry.is_structure(&StructureDefinition::TYPE_ID));
    assert!(!registry.is_structure(&DataTypeId::Int32.node_id()));
    assert!(registry.is_enumeration(&DataTypeId::StructureType.node_id()));
    assert!(!registry.is_enumeration(&Argument::TYPE_ID));
}

#[test]
fn builtin_is_shared() {
    assert!(Arc::ptr_eq(&TypeRegistry::builtin(), &TypeRegistry::builtin()));
    let ctx = EncodingContext::default();
    assert!(Arc::ptr_eq(&ctx.registry, &TypeRegistry::builtin()));
}

#[test]
fn duplicate_encoding_ids() {
    let err = TypeRegistryBuilder::new()
        .register_type::<Argument>()
        .register_type::<Argument>()
        .build()
        .unwrap_err();
    assert_eq!(err, EncodingError::DuplicateEncodingId(Argument::BINARY_ENCODING_ID));
    assert_eq!(err.status_code(), StatusCode::BadConfigurationError);

    // A dynamic type may not take the id of a builtin one
    let err = TypeRegistryBuilder::with_builtin_types()
        .register_dynamic(
            "Clash",
            NodeId::new(2, 5000u32),
            point_definition(),
            EncodingIds {
                binary: NodeId::new(2, 5001u32),
                xml: Argument::XML_ENCODING_ID,
                json: NodeId::new(2, 5003u32),
            },
        )
        .build()
        .unwrap_err();
    assert_eq!(err, EncodingError::DuplicateEncodingId(Argument::XML_ENCODING_ID));
}

#[test]
fn duplicate_type_ids() {
    let other_ids = EncodingIds {
        binary: NodeId::new(2, 6001u32),
        xml: NodeId::new(2, 6002u32),
        json: NodeId::new(2, 6003u32),
    };
    let err = TypeRegistryBuilder::new()
        .register_dynamic("Point", NodeId::new(2, 5000u32), point_definition(), point_ids())
        .register_dynamic("Point2", NodeId::new(2, 5000u32), point_definition(), other_ids)
        .build()
        .unwrap_err();
    assert_eq!(err, EncodingError::DuplicateEncodingId(NodeId::new(2, 5000u32)));
}

#[test]
fn register_dynamic() {
    let registry = TypeRegistryBuilder::with_builtin_types()
        .register_dynamic("Point", NodeId::new(2, 5000u32), point_definition(), point_ids())
        .build()
        .unwrap();
    assert!(registry.is_structure(&NodeId::new(2, 5000u32)));
    let codec = registry.binary_codec(&NodeId::new(2, 5001u32)).unwrap().clone();
    assert_eq!(codec.type_name(), "Point");
    assert_eq!(codec.structure_definition(), point_definition());

    let mut bytes = Vec::new();
    bytes.extend_from_slice(&1.5f64.to_le_bytes());
    bytes.extend_from_slice(&(-2.0f64).to_le_bytes());

    let ctx = EncodingContext::with_registry(Arc::new(registry));
    let mut stream = Cursor::new(bytes.as_slice());
    let mut decoder = BinaryStreamDecoder::new(&mut stream, &ctx);
    let value = codec.decode(&mut decoder).unwrap();
    let point = value.downcast_ref::<DynamicStruct>().unwrap();
    assert_eq!(point.get("X"), Some(&Variant::Double(1.5)));
    assert_eq!(point.get("Y"), Some(&Variant::Double(-2.0)));
    assert_eq!(value.data_type_id(), NodeId::new(2, 5000u32));
    assert_eq!(value.encoding_id(EncodingFormat::Json), NodeId::new(2, 5003u32));

    assert_eq!(encode_binary(value.as_ref()).unwrap(), bytes);
}

#[test]
fn unknown_field_type() {
    let definition = StructureDefinition::new(
        StructureKind::Structure,
        vec![
            StructureField::new("Id", DataTypeId::UInt32),
            StructureField::new("Payload", NodeId::new(2, 9999u32)),
        ],
    );
    let registry = TypeRegistryBuilder::new()
        .register_dynamic("Message", NodeId::new(2, 7000u32), definition, point_ids())
        .build()
        .unwrap();
    let codec = registry.binary_codec(&NodeId::new(2, 5001u32)).unwrap().clone();

    let ctx = EncodingContext::with_registry(Arc::new(registry));
    let bytes = [0x01u8, 0x00, 0x00, 0x00, 0xFF];
    let mut stream = Cursor::new(&bytes[..]);
    let mut decoder = BinaryStreamDecoder::new(&mut stream, &ctx);
    let err = codec.decode(&mut decoder).unwrap_err();
    assert_eq!(err, EncodingError::UnknownType(NodeId::new(2, 9999u32)));
    assert_eq!(err.status_code(), StatusCode::BadDataEncodingUnsupported);
}

#[test]
fn decode_struct_by_expected_id() {
    let argument = Argument::new("Count", DataTypeId::UInt32, -1, "Item count");
    let bytes = encode_binary(&argument).unwrap();
    let ctx = EncodingContext::default();

    // Either the encoding id or the data type id finds the codec
    for id in [Argument::BINARY_ENCODING_ID, Argument::TYPE_ID].iter() {
        let mut stream = Cursor::new(bytes.as_slice());
        let mut decoder = BinaryStreamDecoder::new(&mut stream, &ctx);
        let value = TypeRegistry::decode_struct(&mut decoder, "Argument", id).unwrap();
        assert_eq!(value.downcast_ref::<Argument>(), Some(&argument));
    }

    let mut stream = Cursor::new(bytes.as_slice());
    let mut decoder = BinaryStreamDecoder::new(&mut stream, &ctx);
    assert_eq!(
        TypeRegistry::decode_struct(&mut decoder, "Argument", &NodeId::new(3, 1u32)).unwrap_err(),
        EncodingError::UnknownType(NodeId::new(3, 1u32))
    );
}

#[test]
fn encode_struct_through_registry() {
    let argument = Argument::new("Count", DataTypeId::UInt32, -1, "Item count");
    let registry = TypeRegistry::builtin();

    let mut bytes = Vec::new();
    let mut encoder = BinaryStreamEncoder::new(&mut bytes);
    registry
        .encode_struct(&mut encoder, "Argument", &argument, &Argument::BINARY_ENCODING_ID)
        .unwrap();
    assert_eq!(bytes, encode_binary(&argument).unwrap());

    // A codec refuses values of another type
    let header = RequestHeader::dummy();
    let mut bytes = Vec::new();
    let mut encoder = BinaryStreamEncoder::new(&mut bytes);
    assert!(matches!(
        registry.encode_struct(&mut encoder, "Argument", &header, &Argument::BINARY_ENCODING_ID),
        Err(EncodingError::TypeMismatch { .. })
    ));
}

#[test]
fn enumeration_fields_read_as_int32() {
    let definition = StructureDefinition::new(
        StructureKind::Structure,
        vec![StructureField::new("Kind", DataTypeId::StructureType)],
    );
    let registry = TypeRegistryBuilder::with_builtin_types()
        .register_dynamic("Tagged", NodeId::new(2, 5000u32), definition, point_ids())
        .build()
        .unwrap();
    let codec = registry.binary_codec(&NodeId::new(2, 5001u32)).unwrap().clone();
    let ctx = EncodingContext::with_registry(Arc::new(registry));

    let bytes = [0x02u8, 0x00, 0x00, 0x00];
    let mut stream = Cursor::new(&bytes[..]);
    let mut decoder = BinaryStreamDecoder::new(&mut stream, &ctx);
    let value = codec.decode(&mut decoder).unwrap();
    let tagged = value.downcast_ref::<DynamicStruct>().unwrap();
    assert_eq!(tagged.get("Kind"), Some(&Variant::Int32(2)));
}
