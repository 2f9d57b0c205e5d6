// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0
// Copyright (C) 2017-2022 Adam Lock

//! Contains the implementation of `ExtensionObject`.

use std::{
    io::{Cursor, Read, Write},
    sync::Arc,
};

use crate::core::debug;
use crate::types::{
    binary_codec::{BinaryStreamDecoder, BinaryStreamEncoder},
    byte_string::ByteString,
    codec::EncodingFormat,
    encoding::*,
    json_codec::JsonStreamDecoder,
    node_id::NodeId,
    string::XmlElement,
    structure::{DataTypeCodec, StructCodec, StructureType, UaStructure},
    type_registry::EncodingContext,
    xml_codec::XmlStreamDecoder,
};

/// Enumeration that holds the kinds of encoding that an ExtensionObject data may be encoded with.
#[derive(PartialEq, Debug, Clone)]
pub enum ExtensionObjectEncoding {
    /// For an extension object with nothing encoded with it
    None,
    /// For an extension object with data encoded in a ByteString
    ByteString(ByteString),
    /// For an extension object with data encoded in an XML string
    XmlElement(XmlElement),
    /// For an extension object read from the JSON encoding, the body as it was read
    Json(serde_json::Value),
}

impl ExtensionObjectEncoding {
    /// The format the body is encoded in
    pub fn format(&self) -> Option<EncodingFormat> {
        match self {
            ExtensionObjectEncoding::None => None,
            ExtensionObjectEncoding::ByteString(_) => Some(EncodingFormat::Binary),
            ExtensionObjectEncoding::XmlElement(_) => Some(EncodingFormat::Xml),
            ExtensionObjectEncoding::Json(_) => Some(EncodingFormat::Json),
        }
    }
}

fn memo_eq(a: &Option<Arc<dyn UaStructure>>, b: &Option<Arc<dyn UaStructure>>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a.eq_dyn(b.as_ref()),
        _ => true,
    }
}

/// An extension object holds a structure identified by its encoding id.
///
/// An object read off the wire keeps its body undecoded until `resolve()` finds a codec for the
/// encoding id in the type registry. A body nobody can decode is kept as it is and written back
/// unchanged.
#[derive(Derivative, Clone)]
#[derivative(Debug, PartialEq)]
pub struct ExtensionObject {
    pub node_id: NodeId,
    pub body: ExtensionObjectEncoding,
    #[derivative(PartialEq(compare_with = "memo_eq"))]
    decoded: Option<Arc<dyn UaStructure>>,
}

impl Default for ExtensionObject {
    fn default() -> Self {
        Self::null()
    }
}

impl BinaryEncoder<ExtensionObject> for ExtensionObject {
    fn byte_len(&self) -> usize {
        match (&self.body, self.value()) {
            (ExtensionObjectEncoding::ByteString(value), _) => {
                self.node_id.byte_len() + 1 + value.byte_len()
            }
            (_, Some(value)) => match encode_binary_body(value) {
                Ok(body) => value.encoding_id(EncodingFormat::Binary).byte_len() + 1 + 4 + body.len(),
                Err(err) => {
                    error!("Cannot compute length of {}, {}", value.type_name(), err);
                    0
                }
            },
            (ExtensionObjectEncoding::XmlElement(value), None) => {
                self.node_id.byte_len() + 1 + value.byte_len()
            }
            (ExtensionObjectEncoding::None, None) | (ExtensionObjectEncoding::Json(_), None) => {
                self.node_id.byte_len() + 1
            }
        }
    }

    fn encode<S: Write>(&self, stream: &mut S) -> EncodingResult<usize> {
        let mut size = 0;
        match (&self.body, self.value()) {
            (ExtensionObjectEncoding::ByteString(value), _) => {
                size += self.node_id.encode(stream)?;
                size += write_u8(stream, 0x1)?;
                size += value.encode(stream)?;
            }
            (_, Some(value)) => {
                let body = encode_binary_body(value)?;
                size += value.encoding_id(EncodingFormat::Binary).encode(stream)?;
                size += write_u8(stream, 0x1)?;
                size += write_i32(stream, body.len() as i32)?;
                size += write_bytes(stream, &body)?;
            }
            (ExtensionObjectEncoding::XmlElement(value), None) => {
                size += self.node_id.encode(stream)?;
                size += write_u8(stream, 0x2)?;
                size += value.encode(stream)?;
            }
            (ExtensionObjectEncoding::None, None) => {
                size += self.node_id.encode(stream)?;
                size += write_u8(stream, 0x0)?;
            }
            (ExtensionObjectEncoding::Json(_), None) => {
                error!(
                    "Extension object {} holds an undecoded JSON body which cannot be written as binary",
                    self.node_id
                );
                return Err(EncodingError::invalid_encoding(
                    "undecoded JSON body cannot be written as binary",
                ));
            }
        }
        Ok(size)
    }

    fn decode<S: Read>(stream: &mut S, decoding_options: &DecodingOptions) -> EncodingResult<Self> {
        // Extension object is depth checked to prevent deep recursion
        let _depth_lock = decoding_options.depth_lock()?;
        let node_id = NodeId::decode(stream, decoding_options)?;
        let encoding_type = u8::decode(stream, decoding_options)?;
        let body = match encoding_type {
            0x0 => ExtensionObjectEncoding::None,
            0x1 => {
                ExtensionObjectEncoding::ByteString(ByteString::decode(stream, decoding_options)?)
            }
            0x2 => {
                ExtensionObjectEncoding::XmlElement(XmlElement::decode(stream, decoding_options)?)
            }
            _ => {
                error!("Invalid encoding type {} in stream", encoding_type);
                return Err(EncodingError::invalid_encoding(format!(
                    "extension object body type {}",
                    encoding_type
                )));
            }
        };
        Ok(ExtensionObject::new(node_id, body))
    }
}

/// Writes the fields of a structure into a buffer that becomes the binary body
fn encode_binary_body(value: &dyn UaStructure) -> EncodingResult<Vec<u8>> {
    let mut body = Vec::new();
    let mut encoder = BinaryStreamEncoder::new(&mut body);
    value.encode_dyn(&mut encoder)?;
    Ok(body)
}

impl ExtensionObject {
    /// Creates an extension object holding an undecoded body
    pub fn new<T>(node_id: T, body: ExtensionObjectEncoding) -> ExtensionObject
    where
        T: Into<NodeId>,
    {
        ExtensionObject {
            node_id: node_id.into(),
            body,
            decoded: None,
        }
    }

    /// Creates a null extension object, i.e. one with no value or payload
    pub fn null() -> ExtensionObject {
        ExtensionObject::new(NodeId::null(), ExtensionObjectEncoding::None)
    }

    /// Tests for a null encoding id with nothing encoded with it
    pub fn is_null(&self) -> bool {
        self.node_id.is_null()
            && matches!(self.body, ExtensionObjectEncoding::None)
            && self.decoded.is_none()
    }

    /// Tests for an object that has neither a body nor a value
    pub fn is_empty(&self) -> bool {
        matches!(self.body, ExtensionObjectEncoding::None) && self.decoded.is_none()
    }

    /// Creates an extension object holding a decoded structure. The encoding id is the binary
    /// encoding id of the structure.
    pub fn from_structure<T>(value: T) -> ExtensionObject
    where
        T: UaStructure,
    {
        ExtensionObject {
            node_id: value.encoding_id(EncodingFormat::Binary),
            body: ExtensionObjectEncoding::None,
            decoded: Some(Arc::new(value)),
        }
    }

    /// Creates an extension object holding a structure returned by a codec
    pub fn from_dyn(value: Box<dyn UaStructure>) -> ExtensionObject {
        ExtensionObject {
            node_id: value.encoding_id(EncodingFormat::Binary),
            body: ExtensionObjectEncoding::None,
            decoded: Some(Arc::from(value)),
        }
    }

    /// The decoded structure, if the object was built from one or has been resolved
    pub fn value(&self) -> Option<&dyn UaStructure> {
        self.decoded.as_deref()
    }

    /// The binary body as it was read
    pub fn binary_body(&self) -> Option<&ByteString> {
        match self.body {
            ExtensionObjectEncoding::ByteString(ref body) => Some(body),
            _ => None,
        }
    }

    /// The format of the undecoded body
    pub fn encoding_format(&self) -> Option<EncodingFormat> {
        self.body.format()
    }

    /// Decodes the body through the codec the type registry holds for the encoding id. The
    /// result is kept so the body is only decoded once.
    ///
    /// An encoding id the registry does not know is not an error, the object stays opaque and
    /// `None` is returned. A body that fails to decode is an error and the object keeps its body.
    pub fn resolve(&mut self, ctx: &EncodingContext) -> EncodingResult<Option<&dyn UaStructure>> {
        if self.decoded.is_none() {
            let format = match self.body.format() {
                Some(format) => format,
                None => return Ok(None),
            };
            let codec = match ctx.registry.codec(format, &self.node_id) {
                Some(codec) => codec.clone(),
                None => {
                    debug!(
                        "No {} codec is registered for {}, the extension object stays opaque",
                        format, self.node_id
                    );
                    return Ok(None);
                }
            };
            let value = self.decode_body(codec.as_ref(), ctx)?;
            self.decoded = Some(Arc::from(value));
        }
        Ok(self.value())
    }

    /// Resolves the body as a structure of type `T`. The encoding id must be one of the encoding
    /// ids of `T`.
    pub fn decode_as<T>(&mut self, ctx: &EncodingContext) -> EncodingResult<T>
    where
        T: StructureType,
    {
        let is_type = T::encoding_ids().contains(&self.node_id)
            || self.value().map_or(false, |v| v.data_type_id() == T::TYPE_ID);
        if !is_type {
            error!(
                "Extension object with encoding id {} is not a {}",
                self.node_id,
                T::NAME
            );
            return Err(EncodingError::type_mismatch(T::NAME, &self.node_id));
        }
        if let Some(value) = self.resolve(ctx)?.and_then(|v| v.downcast_ref::<T>()) {
            return Ok(value.clone());
        }
        if self.body.format().is_none() {
            error!("Extension object {} has no body to decode", self.node_id);
            return Err(EncodingError::invalid_encoding("extension object has no body"));
        }
        // The registry does not know the type, decode it directly
        let value = self.decode_body(&StructCodec::<T>::new(), ctx)?;
        let result = value
            .downcast_ref::<T>()
            .cloned()
            .ok_or_else(|| EncodingError::type_mismatch(T::NAME, value.type_name()))?;
        self.decoded = Some(Arc::from(value));
        Ok(result)
    }

    fn decode_body(
        &self,
        codec: &dyn DataTypeCodec,
        ctx: &EncodingContext,
    ) -> EncodingResult<Box<dyn UaStructure>> {
        match self.body {
            ExtensionObjectEncoding::ByteString(ref body) => {
                let bytes = body.value.as_deref().unwrap_or(&[]);
                let mut stream = Cursor::new(bytes);
                let mut decoder = BinaryStreamDecoder::new(&mut stream, ctx);
                codec.decode(&mut decoder).map_err(|err| {
                    debug::log_buffer(&format!("Body of {} failed to decode", self.node_id), bytes);
                    err
                })
            }
            ExtensionObjectEncoding::XmlElement(ref body) => {
                let mut decoder = XmlStreamDecoder::from_body(body.as_ref(), ctx)?;
                codec.decode(&mut decoder)
            }
            ExtensionObjectEncoding::Json(ref body) => {
                let mut decoder = JsonStreamDecoder::from_body(body, ctx)?;
                codec.decode(&mut decoder)
            }
            ExtensionObjectEncoding::None => {
                Err(EncodingError::invalid_encoding("extension object has no body"))
            }
        }
    }
}
