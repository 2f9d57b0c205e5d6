// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0
// Copyright (C) 2017-2022 Adam Lock

//! The binary implementation of `UaEncoder` and `UaDecoder`. Field names are not written, every
//! value goes through the `BinaryEncoder` impl of its type.

use std::io::{Cursor, Read, Write};

use crate::types::{
    byte_string::ByteString,
    codec::{EncodingFormat, UaDecoder, UaEncoder},
    data_value::DataValue,
    date_time::DateTime,
    diagnostic_info::DiagnosticInfo,
    encoding::*,
    expanded_node_id::ExpandedNodeId,
    extension_object::ExtensionObject,
    guid::Guid,
    localized_text::LocalizedText,
    node_id::NodeId,
    qualified_name::QualifiedName,
    status_code::StatusCode,
    string::{UAString, XmlElement},
    structure::{StructureType, UaStructure},
    type_registry::EncodingContext,
    variant::Variant,
};

macro_rules! encode_copy {
    ($($name:ident($ty:ty);)*) => {
        $(
            fn $name(&mut self, _field: &str, value: $ty) -> EncodingResult<()> {
                value.encode(self.stream).map(|_| ())
            }
        )*
    };
}

macro_rules! encode_ref {
    ($($name:ident($ty:ty);)*) => {
        $(
            fn $name(&mut self, _field: &str, value: &$ty) -> EncodingResult<()> {
                value.encode(self.stream).map(|_| ())
            }
        )*
    };
}

macro_rules! decode_value {
    ($($name:ident($ty:ty);)*) => {
        $(
            fn $name(&mut self, _field: &str) -> EncodingResult<$ty> {
                <$ty>::decode(self.stream, &self.options)
            }
        )*
    };
}

/// Writes values to a stream in the binary encoding
pub struct BinaryStreamEncoder<'a, W: Write> {
    stream: &'a mut W,
}

impl<'a, W: Write> BinaryStreamEncoder<'a, W> {
    pub fn new(stream: &'a mut W) -> Self {
        BinaryStreamEncoder { stream }
    }
}

impl<'a, W: Write> UaEncoder for BinaryStreamEncoder<'a, W> {
    fn format(&self) -> EncodingFormat {
        EncodingFormat::Binary
    }

    encode_copy! {
        boolean(bool);
        sbyte(i8);
        byte(u8);
        int16(i16);
        uint16(u16);
        int32(i32);
        uint32(u32);
        int64(i64);
        uint64(u64);
        float(f32);
        double(f64);
        status_code(StatusCode);
    }

    encode_ref! {
        string(UAString);
        date_time(DateTime);
        guid(Guid);
        byte_string(ByteString);
        xml_element(XmlElement);
        node_id(NodeId);
        expanded_node_id(ExpandedNodeId);
        qualified_name(QualifiedName);
        localized_text(LocalizedText);
        extension_object(ExtensionObject);
        data_value(DataValue);
        variant(Variant);
        diagnostic_info(DiagnosticInfo);
    }

    fn enumeration(&mut self, _field: &str, value: i32, _symbol: Option<&str>) -> EncodingResult<()> {
        write_i32(self.stream, value).map(|_| ())
    }

    fn begin_struct(&mut self, _field: &str) -> EncodingResult<()> {
        Ok(())
    }

    fn end_struct(&mut self) -> EncodingResult<()> {
        Ok(())
    }

    fn begin_array(&mut self, _field: &str, len: usize) -> EncodingResult<()> {
        if len > i32::MAX as usize {
            error!("Array of {} values is too long to encode", len);
            return Err(EncodingError::InvalidLength {
                length: len as i64,
                limit: i32::MAX as usize,
            });
        }
        write_i32(self.stream, len as i32).map(|_| ())
    }

    fn null_array(&mut self, _field: &str) -> EncodingResult<()> {
        write_i32(self.stream, -1).map(|_| ())
    }

    fn end_array(&mut self) -> EncodingResult<()> {
        Ok(())
    }
}

/// Reads values from a stream in the binary encoding
pub struct BinaryStreamDecoder<'a, R: Read> {
    stream: &'a mut R,
    context: &'a EncodingContext,
    options: DecodingOptions,
}

impl<'a, R: Read> BinaryStreamDecoder<'a, R> {
    pub fn new(stream: &'a mut R, context: &'a EncodingContext) -> Self {
        BinaryStreamDecoder {
            stream,
            context,
            options: context.options.for_decoder(),
        }
    }
}

impl<'a, R: Read> UaDecoder for BinaryStreamDecoder<'a, R> {
    fn format(&self) -> EncodingFormat {
        EncodingFormat::Binary
    }

    fn context(&self) -> &EncodingContext {
        self.context
    }

    fn options(&self) -> &DecodingOptions {
        &self.options
    }

    decode_value! {
        boolean(bool);
        sbyte(i8);
        byte(u8);
        int16(i16);
        uint16(u16);
        int32(i32);
        uint32(u32);
        int64(i64);
        uint64(u64);
        float(f32);
        double(f64);
        string(UAString);
        date_time(DateTime);
        guid(Guid);
        byte_string(ByteString);
        xml_element(XmlElement);
        node_id(NodeId);
        expanded_node_id(ExpandedNodeId);
        status_code(StatusCode);
        qualified_name(QualifiedName);
        localized_text(LocalizedText);
        extension_object(ExtensionObject);
        data_value(DataValue);
        variant(Variant);
        diagnostic_info(DiagnosticInfo);
    }

    fn enumeration(&mut self, _field: &str) -> EncodingResult<i32> {
        read_i32(self.stream)
    }

    fn begin_struct(&mut self, _field: &str) -> EncodingResult<()> {
        Ok(())
    }

    fn end_struct(&mut self) -> EncodingResult<()> {
        Ok(())
    }

    fn begin_array(&mut self, _field: &str) -> EncodingResult<Option<usize>> {
        let len = read_i32(self.stream)?;
        self.options.check_array_length(len)
    }

    fn end_array(&mut self) -> EncodingResult<()> {
        Ok(())
    }
}

/// Encodes the fields of a structure into a new buffer
pub fn encode_binary(value: &dyn UaStructure) -> EncodingResult<Vec<u8>> {
    let mut buffer = Vec::new();
    let mut encoder = BinaryStreamEncoder::new(&mut buffer);
    value.encode_dyn(&mut encoder)?;
    Ok(buffer)
}

/// Decodes a structure of type `T` from a buffer
pub fn decode_binary<T: StructureType>(data: &[u8], ctx: &EncodingContext) -> EncodingResult<T> {
    let limit = ctx.options.max_message_size;
    if limit > 0 && data.len() > limit {
        error!("Message of {} bytes exceeds the message size limit {}", data.len(), limit);
        return Err(EncodingError::InvalidLength {
            length: data.len() as i64,
            limit,
        });
    }
    let mut stream = Cursor::new(data);
    let mut decoder = BinaryStreamDecoder::new(&mut stream, ctx);
    T::decode_fields(&mut decoder)
}
