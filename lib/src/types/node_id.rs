// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0
// Copyright (C) 2017-2022 Adam Lock

//! Contains the implementation of `NodeId` and its `Identifier`.

use std::{
    self, fmt,
    io::{Read, Write},
    str::FromStr,
    sync::atomic::{AtomicU32, Ordering},
};

use crate::types::{byte_string::ByteString, encoding::*, guid::Guid, string::*};

/// The kind of identifier, numeric, string, guid or byte
#[derive(Eq, PartialEq, Clone, Debug, Hash, Serialize, Deserialize)]
pub enum Identifier {
    Numeric(u32),
    String(UAString),
    Guid(Guid),
    ByteString(ByteString),
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Identifier::Numeric(v) => write!(f, "i={}", *v),
            Identifier::String(v) => write!(f, "s={}", v),
            Identifier::Guid(v) => write!(f, "g={}", v),
            Identifier::ByteString(v) => write!(f, "b={}", v.as_base64()),
        }
    }
}

impl FromStr for Identifier {
    type Err = EncodingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || EncodingError::MalformedIdentifier(s.to_string());
        if s.len() < 2 || !s.is_char_boundary(2) {
            return Err(malformed());
        }
        let (k, v) = s.split_at(2);
        match k {
            "i=" => v.parse::<u32>().map(Identifier::from).map_err(|_| malformed()),
            "s=" => Ok(UAString::from(v).into()),
            "g=" => Guid::from_str(v).map(Identifier::from).map_err(|_| malformed()),
            "b=" => ByteString::from_base64(v)
                .map(Identifier::from)
                .ok_or_else(malformed),
            _ => Err(malformed()),
        }
    }
}

impl From<u32> for Identifier {
    fn from(v: u32) -> Self {
        Identifier::Numeric(v)
    }
}

impl<'a> From<&'a str> for Identifier {
    fn from(v: &'a str) -> Self {
        Identifier::from(UAString::from(v))
    }
}

impl From<String> for Identifier {
    fn from(v: String) -> Self {
        Identifier::from(UAString::from(v))
    }
}

impl From<UAString> for Identifier {
    fn from(v: UAString) -> Self {
        Identifier::String(v)
    }
}

impl From<Guid> for Identifier {
    fn from(v: Guid) -> Self {
        Identifier::Guid(v)
    }
}

impl From<ByteString> for Identifier {
    fn from(v: ByteString) -> Self {
        Identifier::ByteString(v)
    }
}

/// An identifier for a node in the address space of an OPC UA Server.
#[derive(PartialEq, Eq, Clone, Debug, Hash, Serialize, Deserialize)]
pub struct NodeId {
    /// The index for a namespace
    pub namespace: u16,
    /// The identifier for the node in the address space
    pub identifier: Identifier,
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.namespace != 0 {
            write!(f, "ns={};{}", self.namespace, self.identifier)
        } else {
            write!(f, "{}", self.identifier)
        }
    }
}

// The encoding byte of a node id. The upper two bits are used by `ExpandedNodeId` for its flags.
const TWO_BYTE: u8 = 0x0;
const FOUR_BYTE: u8 = 0x1;
const NUMERIC: u8 = 0x2;
const STRING: u8 = 0x3;
const GUID: u8 = 0x4;
const BYTE_STRING: u8 = 0x5;

impl BinaryEncoder<NodeId> for NodeId {
    fn byte_len(&self) -> usize {
        match self.identifier {
            Identifier::Numeric(value) => {
                if self.namespace == 0 && value <= 255 {
                    2
                } else if self.namespace <= 255 && value <= 65535 {
                    4
                } else {
                    7
                }
            }
            Identifier::String(ref value) => 3 + value.byte_len(),
            Identifier::Guid(ref value) => 3 + value.byte_len(),
            Identifier::ByteString(ref value) => 3 + value.byte_len(),
        }
    }

    fn encode<S: Write>(&self, stream: &mut S) -> EncodingResult<usize> {
        self.encode_with_flags(stream, 0)
    }

    fn decode<S: Read>(stream: &mut S, decoding_options: &DecodingOptions) -> EncodingResult<Self> {
        let encoding = read_u8(stream)?;
        if encoding & 0xC0 != 0 {
            error!("Node id encoding {:#04x} carries expanded node id flags", encoding);
            return Err(EncodingError::invalid_encoding(
                "node id has expanded node id flags",
            ));
        }
        Self::decode_body(encoding, stream, decoding_options)
    }
}

impl NodeId {
    /// Writes the node id with the supplied flag bits or'd into the encoding byte. The smallest
    /// encoding that can hold the value is chosen.
    pub(crate) fn encode_with_flags<S: Write>(
        &self,
        stream: &mut S,
        flags: u8,
    ) -> EncodingResult<usize> {
        let mut size: usize = 0;
        match &self.identifier {
            Identifier::Numeric(value) => {
                if self.namespace == 0 && *value <= 255 {
                    size += write_u8(stream, flags | TWO_BYTE)?;
                    size += write_u8(stream, *value as u8)?;
                } else if self.namespace <= 255 && *value <= 65535 {
                    size += write_u8(stream, flags | FOUR_BYTE)?;
                    size += write_u8(stream, self.namespace as u8)?;
                    size += write_u16(stream, *value as u16)?;
                } else {
                    size += write_u8(stream, flags | NUMERIC)?;
                    size += write_u16(stream, self.namespace)?;
                    size += write_u32(stream, *value)?;
                }
            }
            Identifier::String(value) => {
                size += write_u8(stream, flags | STRING)?;
                size += write_u16(stream, self.namespace)?;
                size += value.encode(stream)?;
            }
            Identifier::Guid(value) => {
                size += write_u8(stream, flags | GUID)?;
                size += write_u16(stream, self.namespace)?;
                size += value.encode(stream)?;
            }
            Identifier::ByteString(value) => {
                size += write_u8(stream, flags | BYTE_STRING)?;
                size += write_u16(stream, self.namespace)?;
                size += value.encode(stream)?;
            }
        }
        Ok(size)
    }

    /// Reads the rest of a node id whose encoding byte has already been read.
    pub(crate) fn decode_body<S: Read>(
        encoding: u8,
        stream: &mut S,
        decoding_options: &DecodingOptions,
    ) -> EncodingResult<Self> {
        let node_id = match encoding & 0x3F {
            TWO_BYTE => NodeId::new(0, u32::from(read_u8(stream)?)),
            FOUR_BYTE => {
                let namespace = read_u8(stream)?;
                let value = read_u16(stream)?;
                NodeId::new(u16::from(namespace), u32::from(value))
            }
            NUMERIC => {
                let namespace = read_u16(stream)?;
                NodeId::new(namespace, read_u32(stream)?)
            }
            STRING => {
                let namespace = read_u16(stream)?;
                NodeId::new(namespace, UAString::decode(stream, decoding_options)?)
            }
            GUID => {
                let namespace = read_u16(stream)?;
                NodeId::new(namespace, Guid::decode(stream, decoding_options)?)
            }
            BYTE_STRING => {
                let namespace = read_u16(stream)?;
                NodeId::new(namespace, ByteString::decode(stream, decoding_options)?)
            }
            other => {
                error!("Unrecognized node id type {}", other);
                return Err(EncodingError::invalid_encoding(format!(
                    "unrecognized node id type {:#04x}",
                    other
                )));
            }
        };
        Ok(node_id)
    }
}

impl FromStr for NodeId {
    type Err = EncodingError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        use regex::Regex;

        // Parses a node from a string using the format specified in 5.3.1.10 part 6
        //
        // ns=<namespaceindex>;<type>=<value>
        //
        // Where type:
        //   i = NUMERIC
        //   s = STRING
        //   g = GUID
        //   b = OPAQUE (ByteString)
        //
        // If namespace == 0, the ns=0; will be omitted

        lazy_static! {
            // Contains capture groups "ns" and "t" for namespace and type respectively
            static ref RE: Regex = Regex::new(r"^(ns=(?P<ns>[0-9]+);)?(?P<t>[isgb]=.*)$").unwrap();
        }

        let malformed = || EncodingError::MalformedIdentifier(s.to_string());
        let captures = RE.captures(s).ok_or_else(malformed)?;

        let namespace = match captures.name("ns") {
            Some(ns) => ns.as_str().parse::<u16>().map_err(|_| malformed())?,
            None => 0,
        };

        let t = captures.name("t").ok_or_else(malformed)?;
        Identifier::from_str(t.as_str())
            .map(|t| NodeId::new(namespace, t))
            .map_err(|_| malformed())
    }
}

impl From<&NodeId> for NodeId {
    fn from(v: &NodeId) -> Self {
        v.clone()
    }
}

impl From<NodeId> for String {
    fn from(value: NodeId) -> Self {
        value.to_string()
    }
}

impl<'a> From<(u16, &'a str)> for NodeId {
    fn from(v: (u16, &'a str)) -> Self {
        Self::new(v.0, UAString::from(v.1))
    }
}

impl From<(u16, u32)> for NodeId {
    fn from(v: (u16, u32)) -> Self {
        Self::new(v.0, v.1)
    }
}

impl From<(u16, Guid)> for NodeId {
    fn from(v: (u16, Guid)) -> Self {
        Self::new(v.0, v.1)
    }
}

impl From<(u16, ByteString)> for NodeId {
    fn from(v: (u16, ByteString)) -> Self {
        Self::new(v.0, v.1)
    }
}

static NEXT_NODE_ID_NUMERIC: AtomicU32 = AtomicU32::new(1000);

impl Default for NodeId {
    fn default() -> Self {
        NodeId::null()
    }
}

impl NodeId {
    /// Constructs a new NodeId from anything that can be turned into Identifier
    /// u32, Guid, ByteString or String
    pub fn new<T>(namespace: u16, value: T) -> NodeId
    where
        T: Into<Identifier>,
    {
        NodeId {
            namespace,
            identifier: value.into(),
        }
    }

    /// A numeric node id usable in constant expressions
    pub const fn numeric(namespace: u16, value: u32) -> NodeId {
        NodeId {
            namespace,
            identifier: Identifier::Numeric(value),
        }
    }

    /// Test if the node id is null, i.e. 0 namespace and 0 identifier
    pub fn is_null(&self) -> bool {
        self.namespace == 0 && self.identifier == Identifier::Numeric(0)
    }

    /// Returns a null node id
    pub const fn null() -> NodeId {
        NodeId::numeric(0, 0)
    }

    /// Creates a numeric node id with an id incrementing up from 1000
    pub fn next_numeric(namespace: u16) -> NodeId {
        NodeId::new(namespace, NEXT_NODE_ID_NUMERIC.fetch_add(1, Ordering::SeqCst))
    }

    /// Extracts the numeric identifier of the node id, if it is numeric
    pub fn as_u32(&self) -> Option<u32> {
        match self.identifier {
            Identifier::Numeric(id) => Some(id),
            _ => None,
        }
    }

    /// Test if the node id is numeric
    pub fn is_numeric(&self) -> bool {
        matches!(self.identifier, Identifier::Numeric(_))
    }

    /// Test if the node id is a string
    pub fn is_string(&self) -> bool {
        matches!(self.identifier, Identifier::String(_))
    }

    /// Test if the node id is a guid
    pub fn is_guid(&self) -> bool {
        matches!(self.identifier, Identifier::Guid(_))
    }

    /// Test if the node id us a byte string
    pub fn is_byte_string(&self) -> bool {
        matches!(self.identifier, Identifier::ByteString(_))
    }
}
