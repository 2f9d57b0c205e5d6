use std::str::FromStr;

use proptest::{collection::vec, prelude::*};

use crate::types::{service_types::*, tests::*};

fn identifier() -> impl Strategy<Value = Identifier> {
    prop_oneof![
        any::<u32>().prop_map(Identifier::Numeric),
        "([!-~]{1,32})?".prop_map(|s| Identifier::String(UAString::from(s))),
        any::<[u8; 16]>().prop_map(|b| Identifier::Guid(Guid::from_bytes(b))),
        vec(any::<u8>(), 0..32).prop_map(|b| Identifier::ByteString(ByteString::from(b))),
    ]
}

fn node_id() -> impl Strategy<Value = NodeId> {
    (any::<u16>(), identifier()).prop_map(|(namespace, identifier)| NodeId {
        namespace,
        identifier,
    })
}

fn text() -> impl Strategy<Value = UAString> {
    prop_oneof![
        Just(UAString::null()),
        "[ -~]{0,40}".prop_map(UAString::from),
    ]
}

fn argument() -> impl Strategy<Value = Argument> {
    (text(), node_id(), text(), text()).prop_map(|(name, data_type, locale, description)| {
        Argument {
            name,
            data_type,
            value_rank: -1,
            array_dimensions: None,
            description: LocalizedText {
                locale,
                text: description,
            },
        }
    })
}

proptest! {
    #[test]
    fn node_id_text_round_trip(id in node_id()) {
        let text = id.to_string();
        prop_assert_eq!(NodeId::from_str(&text).unwrap(), id);
    }

    #[test]
    fn node_id_binary_round_trip(id in node_id()) {
        let mut bytes = Vec::new();
        let len = id.encode(&mut bytes).unwrap();
        prop_assert_eq!(len, id.byte_len());
        prop_assert_eq!(decode_bytes::<NodeId>(&bytes).unwrap(), id);
    }

    #[test]
    fn numeric_node_ids_use_the_smallest_form(namespace in any::<u16>(), value in any::<u32>()) {
        let id = NodeId::new(namespace, value);
        let expected = if namespace == 0 && value <= 255 {
            2
        } else if namespace <= 255 && value <= 65535 {
            4
        } else {
            7
        };
        prop_assert_eq!(id.byte_len(), expected);
    }

    #[test]
    fn truncated_node_ids_fail(id in node_id(), cut in 1usize..8) {
        let mut bytes = Vec::new();
        id.encode(&mut bytes).unwrap();
        let keep = bytes.len().saturating_sub(cut);
        prop_assert!(decode_bytes::<NodeId>(&bytes[..keep]).is_err());
    }

    #[test]
    fn arguments_round_trip_in_every_format(argument in argument()) {
        structure_round_trip(&argument);
    }

    #[test]
    fn int32_arrays_round_trip(values in vec(any::<i32>(), 0..64)) {
        let variant = Variant::from(values);
        let mut bytes = Vec::new();
        variant.encode(&mut bytes).unwrap();
        prop_assert_eq!(decode_bytes::<Variant>(&bytes).unwrap(), variant);
    }

    #[test]
    fn arbitrary_bytes_never_panic(bytes in vec(any::<u8>(), 0..256)) {
        let ctx = EncodingContext::default();
        let _ = decode_bytes::<Variant>(&bytes);
        let _ = decode_bytes::<ExtensionObject>(&bytes);
        let _ = decode_binary::<RequestHeader>(&bytes, &ctx);
        let _ = decode_binary::<StructureDefinition>(&bytes, &ctx);
    }
}
