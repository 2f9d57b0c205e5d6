// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0
// Copyright (C) 2017-2022 Adam Lock

use std::convert::TryFrom;

use crate::types::{
    encoding::{EncodingError, EncodingResult},
    node_id::NodeId,
    node_ids::DataTypeId,
};

/// The variant type id is the type of the variant but without its payload. For an array it is
/// the type of the elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VariantTypeId {
    // Null / Empty
    Empty,
    // Scalar types
    Boolean,
    SByte,
    Byte,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Float,
    Double,
    String,
    DateTime,
    Guid,
    StatusCode,
    ByteString,
    XmlElement,
    QualifiedName,
    LocalizedText,
    NodeId,
    ExpandedNodeId,
    ExtensionObject,
    Variant,
    DataValue,
    DiagnosticInfo,
}

/// Maps a builtin data type node id onto the variant type that holds it. `BaseDataType` maps to
/// `Variant` and `Structure` to `ExtensionObject`.
impl TryFrom<&NodeId> for VariantTypeId {
    type Error = EncodingError;

    fn try_from(value: &NodeId) -> Result<Self, Self::Error> {
        let data_type_id = DataTypeId::try_from(value)?;
        match data_type_id {
            DataTypeId::BaseDataType => Ok(VariantTypeId::Variant),
            DataTypeId::Structure => Ok(VariantTypeId::ExtensionObject),
            data_type_id if (data_type_id as u32) <= 25 => {
                VariantTypeId::from_encoding_mask(data_type_id as u8)
            }
            _ => Err(EncodingError::UnknownType(value.clone())),
        }
    }
}

impl VariantTypeId {
    /// The builtin type id written in the low bits of the variant encoding mask
    pub fn encoding_mask(&self) -> u8 {
        match self {
            // Null / Empty
            VariantTypeId::Empty => 0u8,
            // Scalar types
            VariantTypeId::Boolean => EncodingMask::BOOLEAN,
            VariantTypeId::SByte => EncodingMask::SBYTE,
            VariantTypeId::Byte => EncodingMask::BYTE,
            VariantTypeId::Int16 => EncodingMask::INT16,
            VariantTypeId::UInt16 => EncodingMask::UINT16,
            VariantTypeId::Int32 => EncodingMask::INT32,
            VariantTypeId::UInt32 => EncodingMask::UINT32,
            VariantTypeId::Int64 => EncodingMask::INT64,
            VariantTypeId::UInt64 => EncodingMask::UINT64,
            VariantTypeId::Float => EncodingMask::FLOAT,
            VariantTypeId::Double => EncodingMask::DOUBLE,
            VariantTypeId::String => EncodingMask::STRING,
            VariantTypeId::DateTime => EncodingMask::DATE_TIME,
            VariantTypeId::Guid => EncodingMask::GUID,
            VariantTypeId::StatusCode => EncodingMask::STATUS_CODE,
            VariantTypeId::ByteString => EncodingMask::BYTE_STRING,
            VariantTypeId::XmlElement => EncodingMask::XML_ELEMENT,
            VariantTypeId::QualifiedName => EncodingMask::QUALIFIED_NAME,
            VariantTypeId::LocalizedText => EncodingMask::LOCALIZED_TEXT,
            VariantTypeId::NodeId => EncodingMask::NODE_ID,
            VariantTypeId::ExpandedNodeId => EncodingMask::EXPANDED_NODE_ID,
            VariantTypeId::ExtensionObject => EncodingMask::EXTENSION_OBJECT,
            VariantTypeId::Variant => EncodingMask::VARIANT,
            VariantTypeId::DataValue => EncodingMask::DATA_VALUE,
            VariantTypeId::DiagnosticInfo => EncodingMask::DIAGNOSTIC_INFO,
        }
    }

    pub fn from_encoding_mask(encoding_mask: u8) -> EncodingResult<Self> {
        match encoding_mask & !EncodingMask::ARRAY_MASK {
            0u8 => Ok(VariantTypeId::Empty),
            EncodingMask::BOOLEAN => Ok(VariantTypeId::Boolean),
            EncodingMask::SBYTE => Ok(VariantTypeId::SByte),
            EncodingMask::BYTE => Ok(VariantTypeId::Byte),
            EncodingMask::INT16 => Ok(VariantTypeId::Int16),
            EncodingMask::UINT16 => Ok(VariantTypeId::UInt16),
            EncodingMask::INT32 => Ok(VariantTypeId::Int32),
            EncodingMask::UINT32 => Ok(VariantTypeId::UInt32),
            EncodingMask::INT64 => Ok(VariantTypeId::Int64),
            EncodingMask::UINT64 => Ok(VariantTypeId::UInt64),
            EncodingMask::FLOAT => Ok(VariantTypeId::Float),
            EncodingMask::DOUBLE => Ok(VariantTypeId::Double),
            EncodingMask::STRING => Ok(VariantTypeId::String),
            EncodingMask::DATE_TIME => Ok(VariantTypeId::DateTime),
            EncodingMask::GUID => Ok(VariantTypeId::Guid),
            EncodingMask::STATUS_CODE => Ok(VariantTypeId::StatusCode),
            EncodingMask::BYTE_STRING => Ok(VariantTypeId::ByteString),
            EncodingMask::XML_ELEMENT => Ok(VariantTypeId::XmlElement),
            EncodingMask::QUALIFIED_NAME => Ok(VariantTypeId::QualifiedName),
            EncodingMask::LOCALIZED_TEXT => Ok(VariantTypeId::LocalizedText),
            EncodingMask::NODE_ID => Ok(VariantTypeId::NodeId),
            EncodingMask::EXPANDED_NODE_ID => Ok(VariantTypeId::ExpandedNodeId),
            EncodingMask::EXTENSION_OBJECT => Ok(VariantTypeId::ExtensionObject),
            EncodingMask::VARIANT => Ok(VariantTypeId::Variant),
            EncodingMask::DATA_VALUE => Ok(VariantTypeId::DataValue),
            EncodingMask::DIAGNOSTIC_INFO => Ok(VariantTypeId::DiagnosticInfo),
            other => {
                error!("Unrecognized variant encoding mask {:#04x}", other);
                Err(EncodingError::invalid_encoding(format!(
                    "unrecognized variant type {}",
                    other
                )))
            }
        }
    }

    /// The data type node id of the builtin type, `None` for `Empty`
    pub fn data_type_id(&self) -> Option<DataTypeId> {
        match self {
            VariantTypeId::Empty => None,
            VariantTypeId::Variant => Some(DataTypeId::BaseDataType),
            VariantTypeId::ExtensionObject => Some(DataTypeId::Structure),
            other => DataTypeId::try_from(u32::from(other.encoding_mask())).ok(),
        }
    }

    /// The element name used for values of this type in the XML encoding, and the type name in
    /// error messages
    pub fn name(&self) -> &'static str {
        match self {
            VariantTypeId::Empty => "Null",
            VariantTypeId::Boolean => "Boolean",
            VariantTypeId::SByte => "SByte",
            VariantTypeId::Byte => "Byte",
            VariantTypeId::Int16 => "Int16",
            VariantTypeId::UInt16 => "UInt16",
            VariantTypeId::Int32 => "Int32",
            VariantTypeId::UInt32 => "UInt32",
            VariantTypeId::Int64 => "Int64",
            VariantTypeId::UInt64 => "UInt64",
            VariantTypeId::Float => "Float",
            VariantTypeId::Double => "Double",
            VariantTypeId::String => "String",
            VariantTypeId::DateTime => "DateTime",
            VariantTypeId::Guid => "Guid",
            VariantTypeId::StatusCode => "StatusCode",
            VariantTypeId::ByteString => "ByteString",
            VariantTypeId::XmlElement => "XmlElement",
            VariantTypeId::QualifiedName => "QualifiedName",
            VariantTypeId::LocalizedText => "LocalizedText",
            VariantTypeId::NodeId => "NodeId",
            VariantTypeId::ExpandedNodeId => "ExpandedNodeId",
            VariantTypeId::ExtensionObject => "ExtensionObject",
            VariantTypeId::Variant => "Variant",
            VariantTypeId::DataValue => "DataValue",
            VariantTypeId::DiagnosticInfo => "DiagnosticInfo",
        }
    }

    /// The inverse of `name()`
    pub fn from_name(name: &str) -> Option<Self> {
        let type_id = match name {
            "Null" => VariantTypeId::Empty,
            "Boolean" => VariantTypeId::Boolean,
            "SByte" => VariantTypeId::SByte,
            "Byte" => VariantTypeId::Byte,
            "Int16" => VariantTypeId::Int16,
            "UInt16" => VariantTypeId::UInt16,
            "Int32" => VariantTypeId::Int32,
            "UInt32" => VariantTypeId::UInt32,
            "Int64" => VariantTypeId::Int64,
            "UInt64" => VariantTypeId::UInt64,
            "Float" => VariantTypeId::Float,
            "Double" => VariantTypeId::Double,
            "String" => VariantTypeId::String,
            "DateTime" => VariantTypeId::DateTime,
            "Guid" => VariantTypeId::Guid,
            "StatusCode" => VariantTypeId::StatusCode,
            "ByteString" => VariantTypeId::ByteString,
            "XmlElement" => VariantTypeId::XmlElement,
            "QualifiedName" => VariantTypeId::QualifiedName,
            "LocalizedText" => VariantTypeId::LocalizedText,
            "NodeId" => VariantTypeId::NodeId,
            "ExpandedNodeId" => VariantTypeId::ExpandedNodeId,
            "ExtensionObject" => VariantTypeId::ExtensionObject,
            "Variant" => VariantTypeId::Variant,
            "DataValue" => VariantTypeId::DataValue,
            "DiagnosticInfo" => VariantTypeId::DiagnosticInfo,
            _ => return None,
        };
        Some(type_id)
    }

    /// Tests and returns true if the variant holds a numeric type
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            VariantTypeId::SByte
                | VariantTypeId::Byte
                | VariantTypeId::Int16
                | VariantTypeId::UInt16
                | VariantTypeId::Int32
                | VariantTypeId::UInt32
                | VariantTypeId::Int64
                | VariantTypeId::UInt64
                | VariantTypeId::Float
                | VariantTypeId::Double
        )
    }
}

pub(crate) struct EncodingMask;

impl EncodingMask {
    // These are values, not bits
    pub const BOOLEAN: u8 = DataTypeId::Boolean as u8;
    pub const SBYTE: u8 = DataTypeId::SByte as u8;
    pub const BYTE: u8 = DataTypeId::Byte as u8;
    pub const INT16: u8 = DataTypeId::Int16 as u8;
    pub const UINT16: u8 = DataTypeId::UInt16 as u8;
    pub const INT32: u8 = DataTypeId::Int32 as u8;
    pub const UINT32: u8 = DataTypeId::UInt32 as u8;
    pub const INT64: u8 = DataTypeId::Int64 as u8;
    pub const UINT64: u8 = DataTypeId::UInt64 as u8;
    pub const FLOAT: u8 = DataTypeId::Float as u8;
    pub const DOUBLE: u8 = DataTypeId::Double as u8;
    pub const STRING: u8 = DataTypeId::String as u8;
    pub const DATE_TIME: u8 = DataTypeId::DateTime as u8;
    pub const GUID: u8 = DataTypeId::Guid as u8;
    pub const BYTE_STRING: u8 = DataTypeId::ByteString as u8;
    pub const XML_ELEMENT: u8 = DataTypeId::XmlElement as u8;
    pub const NODE_ID: u8 = DataTypeId::NodeId as u8;
    pub const EXPANDED_NODE_ID: u8 = DataTypeId::ExpandedNodeId as u8;
    pub const STATUS_CODE: u8 = DataTypeId::StatusCode as u8;
    pub const QUALIFIED_NAME: u8 = DataTypeId::QualifiedName as u8;
    pub const LOCALIZED_TEXT: u8 = DataTypeId::LocalizedText as u8;
    pub const EXTENSION_OBJECT: u8 = 22;
    pub const DATA_VALUE: u8 = DataTypeId::DataValue as u8;
    pub const VARIANT: u8 = 24;
    pub const DIAGNOSTIC_INFO: u8 = DataTypeId::DiagnosticInfo as u8;
    /// Bit indicates an array with dimensions
    pub const ARRAY_DIMENSIONS_BIT: u8 = 1 << 6;
    /// Bit indicates an array with values
    pub const ARRAY_VALUES_BIT: u8 = 1 << 7;

    pub const ARRAY_MASK: u8 = EncodingMask::ARRAY_DIMENSIONS_BIT | EncodingMask::ARRAY_VALUES_BIT;
}
