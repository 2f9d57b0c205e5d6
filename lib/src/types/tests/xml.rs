use std::str::FromStr;

use crate::types::{service_types::*, tests::*};

const ROOT: &str = "<Root xmlns=\"http://opcfoundation.org/UA/2008/02/Types.xsd\" xmlns:xsi=\"http://www.w3.org/2001/XMLSchema-instance\">";

fn wrapped(inner: &str) -> String {
    format!("{}{}</Root>", ROOT, inner)
}

fn write_fields<F>(f: F) -> String
where
    F: FnOnce(&mut XmlStreamEncoder) -> EncodingResult<()>,
{
    let mut encoder = XmlStreamEncoder::new();
    encoder.begin_struct("Root").unwrap();
    f(&mut encoder).unwrap();
    encoder.end_struct().unwrap();
    encoder.into_string()
}

fn variant_round_trip(value: Variant) {
    let xml = write_fields(|e| e.variant("Value", &value));
    println!("xml = {}", xml);
    let ctx = EncodingContext::default();
    let mut decoder = XmlStreamDecoder::from_body(&xml, &ctx).unwrap();
    assert_eq!(decoder.variant("Value").unwrap(), value);
}

fn motor_speed() -> Argument {
    Argument::new("Speed", DataTypeId::Double, -1, "Motor speed")
}

#[test]
fn scalar_shapes() {
    assert_eq!(
        write_fields(|e| {
            e.boolean("B", true)?;
            e.int32("I", -7)?;
            e.double("D", f64::INFINITY)?;
            e.string("S", &UAString::from("a<b&c"))
        }),
        wrapped("<B>true</B><I>-7</I><D>INF</D><S>a&lt;b&amp;c</S>")
    );

    // Null values are left out of structures, empty ones are not
    assert_eq!(
        write_fields(|e| {
            e.string("Null", &UAString::null())?;
            e.string("Empty", &UAString::from(""))?;
            e.node_id("Node", &NodeId::null())?;
            e.byte_string("Bytes", &ByteString::null())
        }),
        wrapped("<Empty></Empty>")
    );
}

#[test]
fn builtin_shapes() {
    let guid = Guid::from_str("72962B91-FA75-4AE6-8D28-B404DC7DAF63").unwrap();
    assert_eq!(
        write_fields(|e| e.guid("Id", &guid)),
        wrapped("<Id><String>72962b91-fa75-4ae6-8d28-b404dc7daf63</String></Id>")
    );
    assert_eq!(
        write_fields(|e| e.node_id("Node", &NodeId::new(2, "Pump"))),
        wrapped("<Node><Identifier>ns=2;s=Pump</Identifier></Node>")
    );
    assert_eq!(
        write_fields(|e| e.status_code("Status", StatusCode::Good)),
        wrapped("<Status><Code>0</Code></Status>")
    );
    assert_eq!(
        write_fields(|e| e.qualified_name("Name", &QualifiedName::new(0, "Foo"))),
        wrapped("<Name><Name>Foo</Name></Name>")
    );
    assert_eq!(
        write_fields(|e| e.localized_text("Text", &LocalizedText::new("en", "Hi"))),
        wrapped("<Text><Locale>en</Locale><Text>Hi</Text></Text>")
    );
    assert_eq!(
        write_fields(|e| e.byte_string("Bytes", &ByteString::from(&[1u8, 2, 3]))),
        wrapped("<Bytes>AQID</Bytes>")
    );
}

#[test]
fn variant_shapes() {
    assert_eq!(
        write_fields(|e| e.variant("Value", &Variant::Int32(5))),
        wrapped("<Value><Int32>5</Int32></Value>")
    );
    assert_eq!(
        write_fields(|e| e.variant("Value", &Variant::from(vec![1i32, 2]))),
        wrapped("<Value><ListOfInt32><Int32>1</Int32><Int32>2</Int32></ListOfInt32></Value>")
    );
    let matrix = Variant::new_matrix(
        VariantTypeId::Byte,
        vec![Variant::Byte(1), Variant::Byte(2)],
        vec![1u32, 2],
    )
    .unwrap();
    assert_eq!(
        write_fields(|e| e.variant("Value", &matrix)),
        wrapped(
            "<Value><Matrix><Dimensions><Int32>1</Int32><Int32>2</Int32></Dimensions>\
             <Elements><Byte>1</Byte><Byte>2</Byte></Elements></Matrix></Value>"
        )
    );
    // Empty variants are left out
    assert_eq!(write_fields(|e| e.variant("Value", &Variant::Empty)), wrapped(""));
}

#[test]
fn null_array_items_are_nil() {
    let values = Some(vec![UAString::null(), UAString::from("x")]);
    let xml = write_fields(|e| e.string_array("Items", &values));
    assert_eq!(
        xml,
        wrapped("<Items><String xsi:nil=\"true\"/><String>x</String></Items>")
    );
    let ctx = EncodingContext::default();
    let mut decoder = XmlStreamDecoder::from_body(&xml, &ctx).unwrap();
    assert_eq!(decoder.string_array("Items").unwrap(), values);
    // A null array is left out and a missing array reads as null
    assert_eq!(write_fields(|e| e.string_array("Items", &None)), wrapped(""));
    assert_eq!(decoder.string_array("Missing").unwrap(), None);
}

#[test]
fn variants_round_trip() {
    let values = vec![
        Variant::Boolean(true),
        Variant::SByte(-5),
        Variant::Byte(200),
        Variant::Int16(-300),
        Variant::UInt16(60000),
        Variant::Int32(i32::MIN),
        Variant::UInt32(u32::MAX),
        Variant::Int64(i64::MIN),
        Variant::UInt64(u64::MAX),
        Variant::Float(1.25),
        Variant::Double(-0.001),
        Variant::from("Hello & goodbye"),
        Variant::from(DateTime::ymd_hms_nano(2022, 2, 28, 23, 59, 59, 123_456_700)),
        Variant::from(Guid::new()),
        Variant::from(StatusCode::BadNodeIdUnknown),
        Variant::from(ByteString::from(b"bytes")),
        Variant::XmlElement(XmlElement::from("<a>1</a>")),
        Variant::from(QualifiedName::new(3, "Browse")),
        Variant::from(LocalizedText::new("de", "Hallo")),
        Variant::from(NodeId::new(1, Guid::new())),
        Variant::from(ExpandedNodeId::from_str("svr=1;nsu=urn:x;i=5").unwrap()),
        Variant::from(DataValue {
            value: Some(Variant::Double(3.5)),
            status: Some(StatusCode::Good),
            source_timestamp: Some(DateTime::ymd_hms(2020, 1, 1, 0, 0, 0)),
            ..DataValue::null()
        }),
        Variant::from(DiagnosticInfo {
            symbolic_id: Some(3),
            additional_info: Some(UAString::from("info")),
            inner_diagnostic_info: Some(Box::new(DiagnosticInfo {
                locale: Some(1),
                ..Default::default()
            })),
            ..Default::default()
        }),
        Variant::from(vec![UAString::from("a"), UAString::null(), UAString::from("")]),
        Variant::new_array(
            VariantTypeId::Variant,
            vec![
                Variant::Variant(Box::new(Variant::Int32(1))),
                Variant::Variant(Box::new(Variant::from("x"))),
            ],
        )
        .unwrap(),
        Variant::new_matrix(
            VariantTypeId::Int32,
            (1..=6i32).map(Variant::from).collect::<Vec<_>>(),
            vec![2u32, 3],
        )
        .unwrap(),
    ];
    for value in values {
        variant_round_trip(value);
    }
}

#[test]
fn structure_shape() {
    let xml = encode_xml(&motor_speed()).unwrap();
    assert_eq!(
        xml,
        "<Argument xmlns=\"http://opcfoundation.org/UA/2008/02/Types.xsd\" xmlns:xsi=\"http://www.w3.org/2001/XMLSchema-instance\">\
         <Name>Speed</Name>\
         <DataType><Identifier>i=11</Identifier></DataType>\
         <ValueRank>-1</ValueRank>\
         <Description><Locale></Locale><Text>Motor speed</Text></Description>\
         </Argument>"
    );
}

#[test]
fn decode_with_prefixes_and_whitespace() {
    let xml = r#"<?xml version="1.0" encoding="utf-8"?>
<uax:Argument xmlns:uax="http://opcfoundation.org/UA/2008/02/Types.xsd">
  <uax:Name>Speed</uax:Name>
  <uax:DataType>
    <uax:Identifier>i=11</uax:Identifier>
  </uax:DataType>
  <uax:ValueRank> -1 </uax:ValueRank>
  <uax:Description><uax:Text>Motor speed</uax:Text></uax:Description>
</uax:Argument>"#;
    let argument = decode_xml::<Argument>(xml, &EncodingContext::default()).unwrap();
    assert_eq!(argument.name, UAString::from("Speed"));
    assert_eq!(argument.data_type, DataTypeId::Double);
    assert_eq!(argument.value_rank, -1);
    assert!(argument.array_dimensions.is_none());
    assert!(argument.description.locale.is_null());
    assert_eq!(argument.description.text, UAString::from("Motor speed"));
}

#[test]
fn missing_elements_read_as_null() {
    let argument = decode_xml::<Argument>("<Argument/>", &EncodingContext::default()).unwrap();
    assert!(argument.name.is_null());
    assert!(argument.data_type.is_null());
    assert_eq!(argument.value_rank, 0);
    assert!(argument.array_dimensions.is_none());
    assert!(argument.description.is_null());
}

#[test]
fn invalid_values() {
    let ctx = EncodingContext::default();
    for xml in [
        "<Argument><ValueRank>abc</ValueRank></Argument>",
        "<Argument><ValueRank>99999999999</ValueRank></Argument>",
        "<Argument><DataType><Identifier>x=1</Identifier></DataType></Argument>",
        "<Argument><Name>x</Argument>",
    ]
    .iter()
    {
        let err = decode_xml::<Argument>(xml, &ctx).unwrap_err();
        assert!(
            matches!(
                err,
                EncodingError::InvalidEncoding(_) | EncodingError::MalformedIdentifier(_)
            ),
            "{} gave {:?}",
            xml,
            err
        );
    }

    let xml = write_fields(|e| e.string("B", &UAString::from("yes")));
    let mut decoder = XmlStreamDecoder::from_body(&xml, &ctx).unwrap();
    assert!(matches!(
        decoder.boolean("B"),
        Err(EncodingError::InvalidEncoding(_))
    ));
    let xml = wrapped("<B>1</B><C>0</C>");
    let mut decoder = XmlStreamDecoder::from_body(&xml, &ctx).unwrap();
    assert!(decoder.boolean("B").unwrap());
    assert!(!decoder.boolean("C").unwrap());
}

#[test]
fn limits() {
    let mut ctx = EncodingContext::default();
    ctx.options.max_message_size = 32;
    let xml = encode_xml(&motor_speed()).unwrap();
    assert!(matches!(
        XmlStreamDecoder::from_body(&xml, &ctx),
        Err(EncodingError::InvalidLength { limit: 32, .. })
    ));

    let mut ctx = EncodingContext::default();
    ctx.options.max_string_length = 3;
    assert!(matches!(
        decode_xml::<Argument>(&xml, &ctx),
        Err(EncodingError::InvalidLength { limit: 3, .. })
    ));

    let mut ctx = EncodingContext::default();
    ctx.options.max_array_length = 2;
    let xml = wrapped("<Items><Int32>1</Int32><Int32>2</Int32><Int32>3</Int32></Items>");
    let mut decoder = XmlStreamDecoder::from_body(&xml, &ctx).unwrap();
    assert!(matches!(
        decoder.int32_array("Items"),
        Err(EncodingError::InvalidLength { .. })
    ));

    let nested = format!("{}{}", "<a>".repeat(600), "</a>".repeat(600));
    assert!(matches!(
        XmlStreamDecoder::new(&nested, &EncodingContext::default()),
        Err(EncodingError::DecodingDepthExceeded(512))
    ));
}

#[test]
fn nested_variants_are_depth_limited() {
    let mut inner = "<Int32>1</Int32>".to_string();
    for _ in 0..=constants::MAX_DECODING_DEPTH {
        inner = format!("<ListOfVariant><Variant>{}</Variant></ListOfVariant>", inner);
    }
    let xml = wrapped(&format!("<Value>{}</Value>", inner));
    let ctx = EncodingContext::default();
    let mut decoder = XmlStreamDecoder::from_body(&xml, &ctx).unwrap();
    assert!(matches!(
        decoder.variant("Value"),
        Err(EncodingError::DecodingDepthExceeded(_))
    ));
}

#[test]
fn extension_object_bodies() {
    let mut header = RequestHeader::new(&NodeId::null(), &DateTime::epoch(), 5);
    header.additional_header = ExtensionObject::from_structure(motor_speed());
    let xml = encode_xml(&header).unwrap();
    let expected = format!(
        "<AdditionalHeader><TypeId><Identifier>{}</Identifier></TypeId><Body><Argument>",
        Argument::XML_ENCODING_ID
    );
    assert!(xml.contains(&expected), "{}", xml);

    let ctx = EncodingContext::default();
    let mut read = decode_xml::<RequestHeader>(&xml, &ctx).unwrap();
    assert_eq!(read.additional_header.node_id, Argument::XML_ENCODING_ID);
    assert_eq!(read.additional_header.encoding_format(), Some(EncodingFormat::Xml));
    assert_eq!(
        read.additional_header.decode_as::<Argument>(&ctx).unwrap(),
        motor_speed()
    );

    // A binary body the reader cannot decode is carried as base64
    header.additional_header = ExtensionObject::new(
        NodeId::new(4, 12u32),
        ExtensionObjectEncoding::ByteString(ByteString::from(&[1u8, 2, 3])),
    );
    let xml = encode_xml(&header).unwrap();
    assert!(xml.contains("<Body><ByteString>AQID</ByteString></Body>"), "{}", xml);
    assert_eq!(decode_xml::<RequestHeader>(&xml, &ctx).unwrap(), header);
}

#[test]
fn enumerations() {
    let definition = StructureDefinition::new(
        StructureKind::StructureWithOptionalFields,
        vec![StructureField::new("A", DataTypeId::Int32)],
    );
    let xml = encode_xml(&definition).unwrap();
    assert!(
        xml.contains("<StructureType>StructureWithOptionalFields_1</StructureType>"),
        "{}",
        xml
    );

    // The value alone is accepted too
    let xml = "<StructureDefinition><StructureType>2</StructureType></StructureDefinition>";
    let read = decode_xml::<StructureDefinition>(xml, &EncodingContext::default()).unwrap();
    assert_eq!(read.structure_type, Enumeration::Known(StructureKind::Union));
    assert!(read.fields.is_none());
}
