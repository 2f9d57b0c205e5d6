use std::str::FromStr;

use crate::types::tests::*;

#[test]
fn parse_numeric() {
    let node_id = NodeId::from_str("i=2045").unwrap();
    assert_eq!(node_id, NodeId::new(0, 2045u32));
    assert_eq!(node_id.to_string(), "i=2045");

    let node_id = NodeId::from_str("ns=3;i=1").unwrap();
    assert_eq!(node_id, NodeId::new(3, 1u32));
    assert_eq!(node_id.to_string(), "ns=3;i=1");
}

#[test]
fn parse_string() {
    let node_id = NodeId::from_str("ns=2;s=Demo.Static.Int32").unwrap();
    assert_eq!(node_id, NodeId::new(2, "Demo.Static.Int32"));
    assert_eq!(node_id.to_string(), "ns=2;s=Demo.Static.Int32");

    // The value may hold the separator chars
    let node_id = NodeId::from_str("ns=1;s=a;b=c").unwrap();
    assert_eq!(node_id, NodeId::new(1, "a;b=c"));
}

#[test]
fn parse_guid() {
    let node_id = NodeId::from_str("ns=1;g=72962b91-fa75-4ae6-8d28-b404dc7daf63").unwrap();
    let guid = Guid::from_str("72962B91-FA75-4AE6-8D28-B404DC7DAF63").unwrap();
    assert_eq!(node_id, NodeId::new(1, guid));
    assert_eq!(
        node_id.to_string(),
        "ns=1;g=72962b91-fa75-4ae6-8d28-b404dc7daf63"
    );
}

#[test]
fn parse_byte_string() {
    let node_id = NodeId::from_str("ns=4;b=AQID").unwrap();
    assert_eq!(node_id, NodeId::new(4, ByteString::from(&[1u8, 2, 3])));
    assert_eq!(node_id.to_string(), "ns=4;b=AQID");
}

#[test]
fn display_round_trip() {
    let ids = [
        NodeId::new(0, 0u32),
        NodeId::new(0, 85u32),
        NodeId::new(65535, u32::MAX),
        NodeId::new(7, "水Boy"),
        NodeId::new(1, Guid::new()),
        NodeId::new(9, ByteString::from(b"hello")),
        NodeId::new(2, ""),
        NodeId::new(3, ByteString::from(Vec::new())),
    ];
    for id in ids.iter() {
        let parsed = NodeId::from_str(&id.to_string()).unwrap();
        assert_eq!(&parsed, id);
    }
}

#[test]
fn malformed() {
    let bad = [
        "",
        "i=",
        "g=",
        "ns=2;i=",
        "x=12",
        "i=abc",
        "i=4294967296",
        "ns=;i=1",
        "ns=65536;i=1",
        "ns=1;",
        "ns=1i=1",
        "g=not-a-guid",
        "b=!!!",
        "ns=-1;i=1",
    ];
    for s in bad.iter() {
        let err = NodeId::from_str(s).unwrap_err();
        assert_eq!(err, EncodingError::MalformedIdentifier(s.to_string()), "{}", s);
        assert_eq!(err.status_code(), StatusCode::BadNodeIdInvalid);
    }
}

#[test]
fn parse_empty_identifiers() {
    let node_id = NodeId::from_str("ns=2;s=").unwrap();
    assert_eq!(node_id, NodeId::new(2, ""));
    assert!(!node_id.is_null());

    let node_id = NodeId::from_str("b=").unwrap();
    assert_eq!(node_id, NodeId::new(0, ByteString::from(Vec::new())));
    assert_eq!(node_id.to_string(), "b=");
}

#[test]
fn null() {
    assert!(NodeId::null().is_null());
    assert!(NodeId::new(0, 0u32).is_null());
    assert!(!NodeId::new(1, 0u32).is_null());
    assert!(!NodeId::new(0, "").is_null());
    assert_eq!(NodeId::default(), NodeId::null());
}

#[test]
fn as_u32() {
    assert_eq!(NodeId::new(0, 12u32).as_u32(), Some(12));
    assert_eq!(NodeId::new(0, "12").as_u32(), None);
}

#[test]
fn well_known_ids() {
    assert_eq!(DataTypeId::Int32.node_id(), NodeId::new(0, 6u32));
    assert_eq!(NodeId::from(DataTypeId::Boolean), NodeId::new(0, 1u32));
    assert!(NodeId::new(0, 12u32) == DataTypeId::String);
    assert_eq!(
        DataTypeId::try_from(&NodeId::new(0, 13u32)).unwrap(),
        DataTypeId::DateTime
    );
    assert!(DataTypeId::try_from(&NodeId::new(1, 13u32)).is_err());
}

#[test]
fn expanded_parse_namespace_index() {
    let id = ExpandedNodeId::from_str("ns=2;i=5").unwrap();
    assert_eq!(id.node_id, NodeId::new(2, 5u32));
    assert!(id.namespace_uri.is_null());
    assert_eq!(id.server_index, 0);
    assert_eq!(id.to_string(), "ns=2;i=5");
    assert!(id == NodeId::new(2, 5u32));
}

#[test]
fn expanded_parse_namespace_uri() {
    let id = ExpandedNodeId::from_str("nsu=urn:test;s=Temperature").unwrap();
    assert_eq!(id.node_id, NodeId::new(0, "Temperature"));
    assert_eq!(id.namespace_uri.as_ref(), "urn:test");
    assert_eq!(id.to_string(), "nsu=urn:test;s=Temperature");
    assert_eq!(
        id,
        ExpandedNodeId::with_namespace_uri("urn:test", "Temperature")
    );
    // An id that carries a uri never equals a plain node id
    assert!(id != NodeId::new(0, "Temperature"));
}

#[test]
fn expanded_parse_server_index() {
    let id = ExpandedNodeId::from_str("svr=3;nsu=urn:a;i=10").unwrap();
    assert_eq!(id.server_index, 3);
    assert_eq!(id.namespace_uri.as_ref(), "urn:a");
    assert_eq!(id.node_id, NodeId::new(0, 10u32));
    assert!(!id.is_local());
    assert_eq!(id.to_string(), "svr=3;nsu=urn:a;i=10");

    let id = ExpandedNodeId::from_str("svr=1;ns=4;i=10").unwrap();
    assert_eq!(id.server_index, 1);
    assert_eq!(id.node_id, NodeId::new(4, 10u32));
    assert_eq!(id.to_string(), "svr=1;ns=4;i=10");
}

#[test]
fn expanded_uri_escaping() {
    let id = ExpandedNodeId::with_namespace_uri("urn:a;b%c", 1u32);
    let s = id.to_string();
    assert_eq!(s, "nsu=urn:a%3Bb%25c;i=1");
    let parsed = ExpandedNodeId::from_str(&s).unwrap();
    assert_eq!(parsed.namespace_uri.as_ref(), "urn:a;b%c");
    assert_eq!(parsed, id);

    // Lower case escapes are accepted too
    let parsed = ExpandedNodeId::from_str("nsu=urn:x%3by;i=1").unwrap();
    assert_eq!(parsed.namespace_uri.as_ref(), "urn:x;y");
}

#[test]
fn expanded_display_round_trip() {
    let ids = [
        ExpandedNodeId::from_str("svr=2;ns=4;s=").unwrap(),
        ExpandedNodeId::with_namespace_uri("urn:a", ""),
        ExpandedNodeId::with_namespace_uri("", 7u32),
        ExpandedNodeId {
            node_id: NodeId::new(5, ByteString::from(Vec::new())),
            namespace_uri: UAString::null(),
            server_index: 1,
        },
    ];
    for id in ids.iter() {
        let parsed = ExpandedNodeId::from_str(&id.to_string()).unwrap();
        assert_eq!(&parsed, id);
    }

    // An empty uri is still a uri
    let id = ExpandedNodeId::with_namespace_uri("", 7u32);
    assert_eq!(id.to_string(), "nsu=;i=7");

    // With a uri the index is not written
    let id = ExpandedNodeId {
        node_id: NodeId::new(3, 1u32),
        namespace_uri: UAString::from("urn:x"),
        server_index: 0,
    };
    assert_eq!(id.to_string(), "nsu=urn:x;i=1");
    let parsed = ExpandedNodeId::from_str(&id.to_string()).unwrap();
    assert_eq!(parsed.node_id, NodeId::new(0, 1u32));
    assert_eq!(parsed.namespace_uri, id.namespace_uri);
}

#[test]
fn expanded_malformed() {
    for s in ["svr=;i=1", "nsu=;", "svr=x;i=1", "nsu=urn:a", "i=1;nsu=urn:a", "svr=1;i="].iter() {
        assert!(
            matches!(
                ExpandedNodeId::from_str(s),
                Err(EncodingError::MalformedIdentifier(_))
            ),
            "{}",
            s
        );
    }
}

#[test]
fn namespace_table() {
    let table = NamespaceTable::from_uris(&["urn:a", "urn:b"]);
    assert_eq!(table.len(), 3);
    assert_eq!(table.uri(0), Some(OPC_UA_NAMESPACE_URI));
    assert_eq!(table.index_of(OPC_UA_NAMESPACE_URI), Some(0));
    assert_eq!(table.index_of("urn:a"), Some(1));
    assert_eq!(table.index_of("urn:b"), Some(2));
    assert_eq!(table.index_of("urn:c"), None);
    assert_eq!(table.uri(3), None);

    // A list that starts with the OPC UA namespace keeps the same indexes
    let same = NamespaceTable::from_uris(&[OPC_UA_NAMESPACE_URI, "urn:a", "urn:b"]);
    assert_eq!(same, table);

    let uris: Vec<(u16, &str)> = table.iter().collect();
    assert_eq!(
        uris,
        vec![(0, OPC_UA_NAMESPACE_URI), (1, "urn:a"), (2, "urn:b")]
    );
}

#[test]
fn namespace_table_add() {
    let mut table = NamespaceTable::new();
    assert_eq!(table.add_namespace("urn:x"), 1);
    assert_eq!(table.add_namespace("urn:y"), 2);
    // Adding again keeps the index
    assert_eq!(table.add_namespace("urn:x"), 1);
    assert_eq!(table.len(), 3);
}

#[test]
fn resolve_against_table() {
    let table = NamespaceTable::from_uris(&["urn:a", "urn:b"]);

    let id = ExpandedNodeId::with_namespace_uri("urn:b", "Pump");
    assert_eq!(id.resolve(&table).unwrap(), NodeId::new(2, "Pump"));
    assert!(id.matches(&NodeId::new(2, "Pump"), &table));
    assert!(!id.matches(&NodeId::new(1, "Pump"), &table));

    // No uri, resolves to the node id as it is
    let id = ExpandedNodeId::new(NodeId::new(5, 1u32));
    assert_eq!(id.resolve(&table).unwrap(), NodeId::new(5, 1u32));

    // Same node named two ways
    let by_index = ExpandedNodeId::new(NodeId::new(1, 7u32));
    let by_uri = ExpandedNodeId::with_namespace_uri("urn:a", 7u32);
    assert!(by_index != by_uri);
    assert!(by_index.eq_resolved(&by_uri, &table));
}

#[test]
fn resolve_unknown_namespace() {
    let table = NamespaceTable::from_uris(&["urn:a"]);
    let id = ExpandedNodeId::with_namespace_uri("urn:missing", 1u32);
    let err = id.resolve(&table).unwrap_err();
    assert_eq!(err, EncodingError::UnknownNamespace("urn:missing".to_string()));
    assert_eq!(err.status_code(), StatusCode::BadNodeIdUnknown);
    assert!(!id.matches(&NodeId::new(0, 1u32), &table));

    // Nodes on other servers cannot be resolved locally
    let mut id = ExpandedNodeId::new(NodeId::new(1, 1u32));
    id.server_index = 2;
    assert!(matches!(
        id.resolve(&table),
        Err(EncodingError::UnknownNamespace(_))
    ));
}

#[test]
fn to_expanded() {
    let table = NamespaceTable::from_uris(&["urn:a"]);
    let expanded = table.to_expanded(&NodeId::new(1, "x"));
    assert_eq!(expanded, ExpandedNodeId::with_namespace_uri("urn:a", "x"));
    assert_eq!(expanded.resolve(&table).unwrap(), NodeId::new(1, "x"));

    // Namespace 0 and unknown indexes are left alone
    assert_eq!(
        table.to_expanded(&NodeId::new(0, 85u32)),
        ExpandedNodeId::new(NodeId::new(0, 85u32))
    );
    assert_eq!(
        table.to_expanded(&NodeId::new(9, 1u32)),
        ExpandedNodeId::new(NodeId::new(9, 1u32))
    );
}
