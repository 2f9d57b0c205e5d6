// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0
// Copyright (C) 2017-2022 Adam Lock

//! Contains the implementation of `ExpandedNodeId`.

use std::{
    self, fmt,
    io::{Read, Write},
    str::FromStr,
};

use crate::types::{
    encoding::*,
    namespaces::NamespaceTable,
    node_id::{Identifier, NodeId},
    string::*,
};

const NAMESPACE_URI_FLAG: u8 = 0x80;
const SERVER_INDEX_FLAG: u8 = 0x40;

/// A NodeId that allows the namespace URI to be specified instead of an index, and that may
/// refer to a node on another server.
#[derive(PartialEq, Eq, Hash, Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExpandedNodeId {
    pub node_id: NodeId,
    /// When not null this takes precedence over the namespace index of `node_id`
    pub namespace_uri: UAString,
    /// 0 is the local server
    pub server_index: u32,
}

impl BinaryEncoder<ExpandedNodeId> for ExpandedNodeId {
    fn byte_len(&self) -> usize {
        let mut size = self.node_id.byte_len();
        if !self.namespace_uri.is_null() {
            size += self.namespace_uri.byte_len();
        }
        if self.server_index != 0 {
            size += self.server_index.byte_len();
        }
        size
    }

    fn encode<S: Write>(&self, stream: &mut S) -> EncodingResult<usize> {
        let mut flags = 0;
        if !self.namespace_uri.is_null() {
            flags |= NAMESPACE_URI_FLAG;
        }
        if self.server_index != 0 {
            flags |= SERVER_INDEX_FLAG;
        }
        let mut size = self.node_id.encode_with_flags(stream, flags)?;
        if !self.namespace_uri.is_null() {
            size += self.namespace_uri.encode(stream)?;
        }
        if self.server_index != 0 {
            size += self.server_index.encode(stream)?;
        }
        Ok(size)
    }

    fn decode<S: Read>(stream: &mut S, decoding_options: &DecodingOptions) -> EncodingResult<Self> {
        let encoding = read_u8(stream)?;
        let node_id = NodeId::decode_body(encoding, stream, decoding_options)?;
        let namespace_uri = if encoding & NAMESPACE_URI_FLAG != 0 {
            UAString::decode(stream, decoding_options)?
        } else {
            UAString::null()
        };
        let server_index = if encoding & SERVER_INDEX_FLAG != 0 {
            read_u32(stream)?
        } else {
            0
        };
        Ok(ExpandedNodeId {
            node_id,
            namespace_uri,
            server_index,
        })
    }
}

impl From<&NodeId> for ExpandedNodeId {
    fn from(v: &NodeId) -> Self {
        v.clone().into()
    }
}

impl From<NodeId> for ExpandedNodeId {
    fn from(v: NodeId) -> Self {
        ExpandedNodeId {
            node_id: v,
            namespace_uri: UAString::null(),
            server_index: 0,
        }
    }
}

/// A plain node id only equals a local expanded node id without a namespace uri. Comparing
/// against an id carrying a uri needs a namespace table, see `ExpandedNodeId::matches`.
impl PartialEq<NodeId> for ExpandedNodeId {
    fn eq(&self, other: &NodeId) -> bool {
        self.server_index == 0 && self.namespace_uri.is_null() && self.node_id == *other
    }
}

/// Writes `svr=<serverindex>;nsu=<uri>;<type>=<value>`. The text form has no room for both a uri
/// and an index, so an id with a uri is written without its namespace index and parses back with
/// index 0. The binary encoding keeps both.
impl fmt::Display for ExpandedNodeId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.server_index != 0 {
            write!(f, "svr={};", self.server_index)?;
        }
        if self.namespace_uri.is_null() {
            write!(f, "{}", self.node_id)
        } else {
            // The % and ; chars have to be escaped out in the uri
            let namespace_uri = self
                .namespace_uri
                .as_ref()
                .replace('%', "%25")
                .replace(';', "%3B");
            write!(f, "nsu={};{}", namespace_uri, self.node_id.identifier)
        }
    }
}

impl FromStr for ExpandedNodeId {
    type Err = EncodingError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        use regex::Regex;

        // Parses a node from a string using the format specified in 5.3.1.11 part 6
        //
        // svr=<serverindex>;ns=<namespaceindex>;<type>=<value>
        // or
        // svr=<serverindex>;nsu=<uri>;<type>=<value>

        lazy_static! {
            // Contains capture groups "svr", either "ns" or "nsu" and then "t" for type
            static ref RE: Regex = Regex::new(r"^(svr=(?P<svr>[0-9]+);)?(ns=(?P<ns>[0-9]+);|nsu=(?P<nsu>[^;]*);)?(?P<t>[isgb]=.*)$").unwrap();
        }

        let malformed = || EncodingError::MalformedIdentifier(s.to_string());
        let captures = RE.captures(s).ok_or_else(malformed)?;

        let server_index = match captures.name("svr") {
            Some(svr) => svr.as_str().parse::<u32>().map_err(|_| malformed())?,
            None => 0,
        };

        let namespace_uri = match captures.name("nsu") {
            // The % and ; chars need to be unescaped
            Some(nsu) => UAString::from(
                nsu.as_str()
                    .replace("%3B", ";")
                    .replace("%3b", ";")
                    .replace("%25", "%"),
            ),
            None => UAString::null(),
        };

        let namespace = match captures.name("ns") {
            Some(ns) => ns.as_str().parse::<u16>().map_err(|_| malformed())?,
            None => 0,
        };

        let t = captures.name("t").ok_or_else(malformed)?;
        let identifier = Identifier::from_str(t.as_str()).map_err(|_| malformed())?;
        Ok(ExpandedNodeId {
            server_index,
            namespace_uri,
            node_id: NodeId::new(namespace, identifier),
        })
    }
}

impl ExpandedNodeId {
    /// Creates an expanded node id from a node id
    pub fn new<T>(value: T) -> ExpandedNodeId
    where
        T: Into<ExpandedNodeId>,
    {
        value.into()
    }

    /// Creates an expanded node id that names its namespace by uri
    pub fn with_namespace_uri<T>(namespace_uri: &str, identifier: T) -> ExpandedNodeId
    where
        T: Into<Identifier>,
    {
        ExpandedNodeId {
            node_id: NodeId::new(0, identifier),
            namespace_uri: UAString::from(namespace_uri),
            server_index: 0,
        }
    }

    pub fn null() -> ExpandedNodeId {
        Self::new(NodeId::null())
    }

    pub fn is_null(&self) -> bool {
        self.node_id.is_null() && self.namespace_uri.is_null() && self.server_index == 0
    }

    /// Test if the id refers to a node on this server
    pub fn is_local(&self) -> bool {
        self.server_index == 0
    }

    /// Rewrites the id into a local `NodeId`, turning the namespace uri (if any) into its index
    /// in the table. Ids on another server and uris missing from the table cannot be resolved.
    pub fn resolve(&self, namespaces: &NamespaceTable) -> EncodingResult<NodeId> {
        if self.server_index != 0 {
            debug!("Expanded node id {} is not on the local server", self);
            return Err(EncodingError::UnknownNamespace(format!(
                "svr={}",
                self.server_index
            )));
        }
        if self.namespace_uri.is_null() {
            Ok(self.node_id.clone())
        } else {
            let uri = self.namespace_uri.as_ref();
            let namespace = namespaces.index_of(uri).ok_or_else(|| {
                debug!("Namespace {} is not in the namespace table", uri);
                EncodingError::UnknownNamespace(uri.to_string())
            })?;
            Ok(NodeId {
                namespace,
                identifier: self.node_id.identifier.clone(),
            })
        }
    }

    /// Tests if this id names the same local node as the plain node id.
    pub fn matches(&self, node_id: &NodeId, namespaces: &NamespaceTable) -> bool {
        matches!(self.resolve(namespaces), Ok(ref resolved) if resolved == node_id)
    }

    /// Tests if two expanded ids name the same node once both are resolved against the table.
    /// Ids that do not resolve are compared structurally.
    pub fn eq_resolved(&self, other: &ExpandedNodeId, namespaces: &NamespaceTable) -> bool {
        match (self.resolve(namespaces), other.resolve(namespaces)) {
            (Ok(a), Ok(b)) => a == b,
            _ => self == other,
        }
    }
}
