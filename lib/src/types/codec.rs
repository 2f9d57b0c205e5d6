// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0
// Copyright (C) 2017-2022 Adam Lock

//! The format independent encoder and decoder interfaces that structure codecs are written
//! against. There is one implementation of each per wire format, binary, XML and JSON.
//!
//! Every operation takes the name of the field being written. The binary format ignores it,
//! XML uses it as the element name and JSON as the member name. Inside an array the values
//! are positional and the name is the element name of the item type, e.g. "Int32".

use std::fmt;

use crate::types::{
    byte_string::ByteString,
    data_value::DataValue,
    date_time::DateTime,
    diagnostic_info::DiagnosticInfo,
    encoding::{DecodingOptions, EncodingError, EncodingResult},
    expanded_node_id::ExpandedNodeId,
    extension_object::ExtensionObject,
    guid::Guid,
    localized_text::LocalizedText,
    node_id::NodeId,
    qualified_name::QualifiedName,
    status_code::StatusCode,
    string::{UAString, XmlElement},
    structure::StructureType,
    type_registry::EncodingContext,
    variant::Variant,
    variant_type_id::VariantTypeId,
};

/// The wire formats
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum EncodingFormat {
    Binary,
    Xml,
    Json,
}

impl fmt::Display for EncodingFormat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            EncodingFormat::Binary => "binary",
            EncodingFormat::Xml => "xml",
            EncodingFormat::Json => "json",
        };
        write!(f, "{}", name)
    }
}

macro_rules! encode_array_fns {
    (@pass copy $v:ident) => { *$v };
    (@pass by_ref $v:ident) => { $v };
    ($($array_fn:ident => $scalar_fn:ident($ty:ty, $item:literal, $pass:ident);)*) => {
        $(
            fn $array_fn(&mut self, field: &str, values: &Option<Vec<$ty>>) -> EncodingResult<()> {
                match values {
                    None => self.null_array(field),
                    Some(values) => {
                        self.begin_array(field, values.len())?;
                        for value in values {
                            self.$scalar_fn($item, encode_array_fns!(@pass $pass value))?;
                        }
                        self.end_array()
                    }
                }
            }
        )*
    };
}

macro_rules! decode_array_fns {
    ($($array_fn:ident => $scalar_fn:ident($ty:ty, $item:literal);)*) => {
        $(
            fn $array_fn(&mut self, field: &str) -> EncodingResult<Option<Vec<$ty>>> {
                match self.begin_array(field)? {
                    None => Ok(None),
                    Some(len) => {
                        let mut values = Vec::with_capacity(len);
                        for _ in 0..len {
                            values.push(self.$scalar_fn($item)?);
                        }
                        self.end_array()?;
                        Ok(Some(values))
                    }
                }
            }
        )*
    };
}

/// Writes values in one wire format
pub trait UaEncoder {
    fn format(&self) -> EncodingFormat;

    fn boolean(&mut self, field: &str, value: bool) -> EncodingResult<()>;
    fn sbyte(&mut self, field: &str, value: i8) -> EncodingResult<()>;
    fn byte(&mut self, field: &str, value: u8) -> EncodingResult<()>;
    fn int16(&mut self, field: &str, value: i16) -> EncodingResult<()>;
    fn uint16(&mut self, field: &str, value: u16) -> EncodingResult<()>;
    fn int32(&mut self, field: &str, value: i32) -> EncodingResult<()>;
    fn uint32(&mut self, field: &str, value: u32) -> EncodingResult<()>;
    fn int64(&mut self, field: &str, value: i64) -> EncodingResult<()>;
    fn uint64(&mut self, field: &str, value: u64) -> EncodingResult<()>;
    fn float(&mut self, field: &str, value: f32) -> EncodingResult<()>;
    fn double(&mut self, field: &str, value: f64) -> EncodingResult<()>;
    fn string(&mut self, field: &str, value: &UAString) -> EncodingResult<()>;
    fn date_time(&mut self, field: &str, value: &DateTime) -> EncodingResult<()>;
    fn guid(&mut self, field: &str, value: &Guid) -> EncodingResult<()>;
    fn byte_string(&mut self, field: &str, value: &ByteString) -> EncodingResult<()>;
    fn xml_element(&mut self, field: &str, value: &XmlElement) -> EncodingResult<()>;
    fn node_id(&mut self, field: &str, value: &NodeId) -> EncodingResult<()>;
    fn expanded_node_id(&mut self, field: &str, value: &ExpandedNodeId) -> EncodingResult<()>;
    fn status_code(&mut self, field: &str, value: StatusCode) -> EncodingResult<()>;
    fn qualified_name(&mut self, field: &str, value: &QualifiedName) -> EncodingResult<()>;
    fn localized_text(&mut self, field: &str, value: &LocalizedText) -> EncodingResult<()>;
    fn extension_object(&mut self, field: &str, value: &ExtensionObject) -> EncodingResult<()>;
    fn data_value(&mut self, field: &str, value: &DataValue) -> EncodingResult<()>;
    fn variant(&mut self, field: &str, value: &Variant) -> EncodingResult<()>;
    fn diagnostic_info(&mut self, field: &str, value: &DiagnosticInfo) -> EncodingResult<()>;
    /// Writes an enumeration value. The symbol is used by formats that write the name.
    fn enumeration(&mut self, field: &str, value: i32, symbol: Option<&str>) -> EncodingResult<()>;

    fn begin_struct(&mut self, field: &str) -> EncodingResult<()>;
    fn end_struct(&mut self) -> EncodingResult<()>;
    fn begin_array(&mut self, field: &str, len: usize) -> EncodingResult<()>;
    /// Writes a null array. No `end_array` follows.
    fn null_array(&mut self, field: &str) -> EncodingResult<()>;
    fn end_array(&mut self) -> EncodingResult<()>;

    encode_array_fns! {
        boolean_array => boolean(bool, "Boolean", copy);
        sbyte_array => sbyte(i8, "SByte", copy);
        byte_array => byte(u8, "Byte", copy);
        int16_array => int16(i16, "Int16", copy);
        uint16_array => uint16(u16, "UInt16", copy);
        int32_array => int32(i32, "Int32", copy);
        uint32_array => uint32(u32, "UInt32", copy);
        int64_array => int64(i64, "Int64", copy);
        uint64_array => uint64(u64, "UInt64", copy);
        float_array => float(f32, "Float", copy);
        double_array => double(f64, "Double", copy);
        string_array => string(UAString, "String", by_ref);
        date_time_array => date_time(DateTime, "DateTime", by_ref);
        guid_array => guid(Guid, "Guid", by_ref);
        byte_string_array => byte_string(ByteString, "ByteString", by_ref);
        node_id_array => node_id(NodeId, "NodeId", by_ref);
        expanded_node_id_array => expanded_node_id(ExpandedNodeId, "ExpandedNodeId", by_ref);
        status_code_array => status_code(StatusCode, "StatusCode", copy);
        qualified_name_array => qualified_name(QualifiedName, "QualifiedName", by_ref);
        localized_text_array => localized_text(LocalizedText, "LocalizedText", by_ref);
        extension_object_array => extension_object(ExtensionObject, "ExtensionObject", by_ref);
        data_value_array => data_value(DataValue, "DataValue", by_ref);
        variant_array => variant(Variant, "Variant", by_ref);
        diagnostic_info_array => diagnostic_info(DiagnosticInfo, "DiagnosticInfo", by_ref);
    }
}

/// Reads values in one wire format. A decoder carries the context (type registry, namespace
/// table) that nested structures are decoded with, and its own copy of the decoding limits.
pub trait UaDecoder {
    fn format(&self) -> EncodingFormat;
    fn context(&self) -> &EncodingContext;
    fn options(&self) -> &DecodingOptions;

    fn boolean(&mut self, field: &str) -> EncodingResult<bool>;
    fn sbyte(&mut self, field: &str) -> EncodingResult<i8>;
    fn byte(&mut self, field: &str) -> EncodingResult<u8>;
    fn int16(&mut self, field: &str) -> EncodingResult<i16>;
    fn uint16(&mut self, field: &str) -> EncodingResult<u16>;
    fn int32(&mut self, field: &str) -> EncodingResult<i32>;
    fn uint32(&mut self, field: &str) -> EncodingResult<u32>;
    fn int64(&mut self, field: &str) -> EncodingResult<i64>;
    fn uint64(&mut self, field: &str) -> EncodingResult<u64>;
    fn float(&mut self, field: &str) -> EncodingResult<f32>;
    fn double(&mut self, field: &str) -> EncodingResult<f64>;
    fn string(&mut self, field: &str) -> EncodingResult<UAString>;
    fn date_time(&mut self, field: &str) -> EncodingResult<DateTime>;
    fn guid(&mut self, field: &str) -> EncodingResult<Guid>;
    fn byte_string(&mut self, field: &str) -> EncodingResult<ByteString>;
    fn xml_element(&mut self, field: &str) -> EncodingResult<XmlElement>;
    fn node_id(&mut self, field: &str) -> EncodingResult<NodeId>;
    fn expanded_node_id(&mut self, field: &str) -> EncodingResult<ExpandedNodeId>;
    fn status_code(&mut self, field: &str) -> EncodingResult<StatusCode>;
    fn qualified_name(&mut self, field: &str) -> EncodingResult<QualifiedName>;
    fn localized_text(&mut self, field: &str) -> EncodingResult<LocalizedText>;
    /// Reads an extension object leaving its body undecoded
    fn extension_object(&mut self, field: &str) -> EncodingResult<ExtensionObject>;
    fn data_value(&mut self, field: &str) -> EncodingResult<DataValue>;
    fn variant(&mut self, field: &str) -> EncodingResult<Variant>;
    fn diagnostic_info(&mut self, field: &str) -> EncodingResult<DiagnosticInfo>;
    fn enumeration(&mut self, field: &str) -> EncodingResult<i32>;

    /// Enters a structure. A structure missing from the input reads as all of its fields
    /// missing.
    fn begin_struct(&mut self, field: &str) -> EncodingResult<()>;
    fn end_struct(&mut self) -> EncodingResult<()>;
    /// Enters an array and returns its length, or `None` for a null array in which case
    /// `end_array` must not be called.
    fn begin_array(&mut self, field: &str) -> EncodingResult<Option<usize>>;
    fn end_array(&mut self) -> EncodingResult<()>;

    decode_array_fns! {
        boolean_array => boolean(bool, "Boolean");
        sbyte_array => sbyte(i8, "SByte");
        byte_array => byte(u8, "Byte");
        int16_array => int16(i16, "Int16");
        uint16_array => uint16(u16, "UInt16");
        int32_array => int32(i32, "Int32");
        uint32_array => uint32(u32, "UInt32");
        int64_array => int64(i64, "Int64");
        uint64_array => uint64(u64, "UInt64");
        float_array => float(f32, "Float");
        double_array => double(f64, "Double");
        string_array => string(UAString, "String");
        date_time_array => date_time(DateTime, "DateTime");
        guid_array => guid(Guid, "Guid");
        byte_string_array => byte_string(ByteString, "ByteString");
        node_id_array => node_id(NodeId, "NodeId");
        expanded_node_id_array => expanded_node_id(ExpandedNodeId, "ExpandedNodeId");
        status_code_array => status_code(StatusCode, "StatusCode");
        qualified_name_array => qualified_name(QualifiedName, "QualifiedName");
        localized_text_array => localized_text(LocalizedText, "LocalizedText");
        extension_object_array => extension_object(ExtensionObject, "ExtensionObject");
        data_value_array => data_value(DataValue, "DataValue");
        variant_array => variant(Variant, "Variant");
        diagnostic_info_array => diagnostic_info(DiagnosticInfo, "DiagnosticInfo");
    }
}

/// Writes a structure field whose type is known at compile time
pub fn encode_structure<T: StructureType>(
    encoder: &mut dyn UaEncoder,
    field: &str,
    value: &T,
) -> EncodingResult<()> {
    encoder.begin_struct(field)?;
    value.encode_fields(encoder)?;
    encoder.end_struct()
}

/// Reads a structure field whose type is known at compile time
pub fn decode_structure<T: StructureType>(
    decoder: &mut dyn UaDecoder,
    field: &str,
) -> EncodingResult<T> {
    let _depth_lock = decoder.options().depth_lock()?;
    decoder.begin_struct(field)?;
    let value = T::decode_fields(decoder)?;
    decoder.end_struct()?;
    Ok(value)
}

pub fn encode_structure_array<T: StructureType>(
    encoder: &mut dyn UaEncoder,
    field: &str,
    values: &Option<Vec<T>>,
) -> EncodingResult<()> {
    match values {
        None => encoder.null_array(field),
        Some(values) => {
            encoder.begin_array(field, values.len())?;
            for value in values {
                encode_structure(encoder, T::NAME, value)?;
            }
            encoder.end_array()
        }
    }
}

pub fn decode_structure_array<T: StructureType>(
    decoder: &mut dyn UaDecoder,
    field: &str,
) -> EncodingResult<Option<Vec<T>>> {
    match decoder.begin_array(field)? {
        None => Ok(None),
        Some(len) => {
            let mut values = Vec::with_capacity(len);
            for _ in 0..len {
                values.push(decode_structure::<T>(decoder, T::NAME)?);
            }
            decoder.end_array()?;
            Ok(Some(values))
        }
    }
}

/// Reads one value of a builtin type into a variant
pub fn decode_builtin(
    decoder: &mut dyn UaDecoder,
    field: &str,
    type_id: VariantTypeId,
) -> EncodingResult<Variant> {
    let value = match type_id {
        VariantTypeId::Empty => Variant::Empty,
        VariantTypeId::Boolean => decoder.boolean(field)?.into(),
        VariantTypeId::SByte => decoder.sbyte(field)?.into(),
        VariantTypeId::Byte => decoder.byte(field)?.into(),
        VariantTypeId::Int16 => decoder.int16(field)?.into(),
        VariantTypeId::UInt16 => decoder.uint16(field)?.into(),
        VariantTypeId::Int32 => decoder.int32(field)?.into(),
        VariantTypeId::UInt32 => decoder.uint32(field)?.into(),
        VariantTypeId::Int64 => decoder.int64(field)?.into(),
        VariantTypeId::UInt64 => decoder.uint64(field)?.into(),
        VariantTypeId::Float => decoder.float(field)?.into(),
        VariantTypeId::Double => decoder.double(field)?.into(),
        VariantTypeId::String => decoder.string(field)?.into(),
        VariantTypeId::DateTime => decoder.date_time(field)?.into(),
        VariantTypeId::Guid => decoder.guid(field)?.into(),
        VariantTypeId::StatusCode => decoder.status_code(field)?.into(),
        VariantTypeId::ByteString => decoder.byte_string(field)?.into(),
        VariantTypeId::XmlElement => Variant::XmlElement(decoder.xml_element(field)?),
        VariantTypeId::QualifiedName => decoder.qualified_name(field)?.into(),
        VariantTypeId::LocalizedText => decoder.localized_text(field)?.into(),
        VariantTypeId::NodeId => decoder.node_id(field)?.into(),
        VariantTypeId::ExpandedNodeId => decoder.expanded_node_id(field)?.into(),
        VariantTypeId::ExtensionObject => decoder.extension_object(field)?.into(),
        VariantTypeId::Variant => {
            let _depth_lock = decoder.options().depth_lock()?;
            Variant::Variant(Box::new(decoder.variant(field)?))
        }
        VariantTypeId::DataValue => {
            let _depth_lock = decoder.options().depth_lock()?;
            decoder.data_value(field)?.into()
        }
        VariantTypeId::DiagnosticInfo => decoder.diagnostic_info(field)?.into(),
    };
    Ok(value)
}

/// Writes the scalar held by a variant with the operation of its type
pub fn encode_builtin(encoder: &mut dyn UaEncoder, field: &str, value: &Variant) -> EncodingResult<()> {
    match value {
        Variant::Boolean(v) => encoder.boolean(field, *v),
        Variant::SByte(v) => encoder.sbyte(field, *v),
        Variant::Byte(v) => encoder.byte(field, *v),
        Variant::Int16(v) => encoder.int16(field, *v),
        Variant::UInt16(v) => encoder.uint16(field, *v),
        Variant::Int32(v) => encoder.int32(field, *v),
        Variant::UInt32(v) => encoder.uint32(field, *v),
        Variant::Int64(v) => encoder.int64(field, *v),
        Variant::UInt64(v) => encoder.uint64(field, *v),
        Variant::Float(v) => encoder.float(field, *v),
        Variant::Double(v) => encoder.double(field, *v),
        Variant::String(v) => encoder.string(field, v),
        Variant::DateTime(v) => encoder.date_time(field, v),
        Variant::Guid(v) => encoder.guid(field, v),
        Variant::StatusCode(v) => encoder.status_code(field, *v),
        Variant::ByteString(v) => encoder.byte_string(field, v),
        Variant::XmlElement(v) => encoder.xml_element(field, v),
        Variant::QualifiedName(v) => encoder.qualified_name(field, v),
        Variant::LocalizedText(v) => encoder.localized_text(field, v),
        Variant::NodeId(v) => encoder.node_id(field, v),
        Variant::ExpandedNodeId(v) => encoder.expanded_node_id(field, v),
        Variant::ExtensionObject(v) => encoder.extension_object(field, v),
        Variant::Variant(v) => encoder.variant(field, v),
        Variant::DataValue(v) => encoder.data_value(field, v),
        Variant::DiagnosticInfo(v) => encoder.diagnostic_info(field, v),
        Variant::Empty | Variant::Array(_) => {
            error!("Field {} holds {} which is not a scalar value", field, value.type_name());
            Err(EncodingError::type_mismatch("scalar", value.type_name()))
        }
    }
}

/// Reads an array of a builtin type, `None` for a null array
pub fn decode_builtin_array(
    decoder: &mut dyn UaDecoder,
    field: &str,
    type_id: VariantTypeId,
) -> EncodingResult<Option<Vec<Variant>>> {
    match decoder.begin_array(field)? {
        None => Ok(None),
        Some(len) => {
            let mut values = Vec::with_capacity(len);
            for _ in 0..len {
                values.push(decode_builtin(decoder, type_id.name(), type_id)?);
            }
            decoder.end_array()?;
            Ok(Some(values))
        }
    }
}

/// Writes values of one builtin type as an array
pub fn encode_builtin_array(
    encoder: &mut dyn UaEncoder,
    field: &str,
    type_id: VariantTypeId,
    values: Option<&[Variant]>,
) -> EncodingResult<()> {
    match values {
        None => encoder.null_array(field),
        Some(values) => {
            encoder.begin_array(field, values.len())?;
            for value in values {
                encode_builtin(encoder, type_id.name(), value)?;
            }
            encoder.end_array()
        }
    }
}
