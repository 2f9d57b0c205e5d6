// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0
// Copyright (C) 2017-2022 Adam Lock

//! The namespace table maps namespace indexes onto namespace uris.

use std::collections::HashMap;

use crate::types::{expanded_node_id::ExpandedNodeId, node_id::NodeId, string::UAString};

/// The uri of the OPC UA namespace, always index 0
pub const OPC_UA_NAMESPACE_URI: &str = "http://opcfoundation.org/UA/";

/// Ordered table of namespace uris. Index 0 is always the OPC UA namespace.
///
/// The table is filled in while a session or address space is set up. Encoders and decoders
/// only ever read it.
#[derive(Debug, Clone, PartialEq)]
pub struct NamespaceTable {
    uris: Vec<String>,
    indexes: HashMap<String, u16>,
}

impl Default for NamespaceTable {
    fn default() -> Self {
        Self::new()
    }
}

impl NamespaceTable {
    pub fn new() -> Self {
        let mut indexes = HashMap::new();
        indexes.insert(OPC_UA_NAMESPACE_URI.to_owned(), 0u16);
        Self {
            uris: vec![OPC_UA_NAMESPACE_URI.to_owned()],
            indexes,
        }
    }

    /// Creates a table from a list of uris in index order. The OPC UA namespace is put in front
    /// when the list does not start with it.
    pub fn from_uris<T: AsRef<str>>(uris: &[T]) -> Self {
        let mut table = Self::new();
        for uri in uris {
            table.add_namespace(uri.as_ref());
        }
        table
    }

    /// Adds a namespace and returns its index. Adding a known namespace returns its existing index.
    pub fn add_namespace(&mut self, namespace: &str) -> u16 {
        if let Some(ns) = self.indexes.get(namespace) {
            return *ns;
        }
        let ns = self.uris.len() as u16;
        self.uris.push(namespace.to_owned());
        self.indexes.insert(namespace.to_owned(), ns);
        ns
    }

    pub fn index_of(&self, namespace: &str) -> Option<u16> {
        self.indexes.get(namespace).copied()
    }

    pub fn uri(&self, index: u16) -> Option<&str> {
        self.uris.get(index as usize).map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.uris.len()
    }

    pub fn is_empty(&self) -> bool {
        self.uris.is_empty()
    }

    /// Iterates `(index, uri)` in index order
    pub fn iter(&self) -> impl Iterator<Item = (u16, &str)> {
        self.uris
            .iter()
            .enumerate()
            .map(|(i, uri)| (i as u16, uri.as_str()))
    }

    /// Expands a node id so it names its namespace by uri rather than index. Namespace 0 ids and
    /// ids whose index is not in the table are left as they are.
    pub fn to_expanded(&self, node_id: &NodeId) -> ExpandedNodeId {
        match self.uri(node_id.namespace) {
            Some(uri) if node_id.namespace != 0 => ExpandedNodeId {
                node_id: NodeId {
                    namespace: 0,
                    identifier: node_id.identifier.clone(),
                },
                namespace_uri: UAString::from(uri),
                server_index: 0,
            },
            _ => ExpandedNodeId::from(node_id),
        }
    }
}

#[test]
fn namespace_table_indexes() {
    let mut table = NamespaceTable::new();
    assert_eq!(table.index_of(OPC_UA_NAMESPACE_URI), Some(0));
    assert_eq!(table.add_namespace("urn:a"), 1);
    assert_eq!(table.add_namespace("urn:b"), 2);
    assert_eq!(table.add_namespace("urn:a"), 1);
    assert_eq!(table.uri(2), Some("urn:b"));
    assert_eq!(table.uri(3), None);
    assert_eq!(table.len(), 3);
}
