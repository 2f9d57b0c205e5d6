// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0
// Copyright (C) 2017-2022 Adam Lock

//! Contains the implementation of `Variant`.

use std::{
    convert::TryFrom,
    fmt,
    io::{Read, Write},
};

use crate::types::{
    array::*,
    byte_string::ByteString,
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
    variant_type_id::{EncodingMask, VariantTypeId},
};

/// A `Variant` holds built-in OPC UA data types, including single and multi dimensional arrays,
/// data values and extension objects. A structure is never held directly, it is always wrapped
/// in an `ExtensionObject`.
///
/// As variants may be passed around a lot on the stack, Boxes are used for more complex types to
/// keep the size of this type down a bit, especially when used in arrays.
#[derive(PartialEq, Debug, Clone, Default)]
pub enum Variant {
    /// Empty type has no value. It is equivalent to a Null value (part 6 5.1.6)
    #[default]
    Empty,
    Boolean(bool),
    SByte(i8),
    Byte(u8),
    Int16(i16),
    UInt16(u16),
    Int32(i32),
    UInt32(u32),
    Int64(i64),
    UInt64(u64),
    Float(f32),
    Double(f64),
    String(UAString),
    DateTime(Box<DateTime>),
    Guid(Box<Guid>),
    StatusCode(StatusCode),
    ByteString(ByteString),
    XmlElement(XmlElement),
    QualifiedName(Box<QualifiedName>),
    LocalizedText(Box<LocalizedText>),
    NodeId(Box<NodeId>),
    ExpandedNodeId(Box<ExpandedNodeId>),
    ExtensionObject(Box<ExtensionObject>),
    /// A variant nested in a variant. Only occurs as the element of an array of variants.
    Variant(Box<Variant>),
    DataValue(Box<DataValue>),
    DiagnosticInfo(Box<DiagnosticInfo>),
    /// Single or multi dimension array which can contain any scalar type, all the same type.
    /// Nested arrays are rejected.
    Array(Box<Array>),
}

macro_rules! variant_from_copy {
    ($($rtype:ty => $vtype:ident),*) => {
        $(
            impl From<$rtype> for Variant {
                fn from(v: $rtype) -> Self {
                    Variant::$vtype(v)
                }
            }
        )*
    };
}

macro_rules! variant_from_boxed {
    ($($rtype:ty => $vtype:ident),*) => {
        $(
            impl From<$rtype> for Variant {
                fn from(v: $rtype) -> Self {
                    Variant::$vtype(Box::new(v))
                }
            }
        )*
    };
}

variant_from_copy!(
    bool => Boolean, i8 => SByte, u8 => Byte, i16 => Int16, u16 => UInt16, i32 => Int32,
    u32 => UInt32, i64 => Int64, u64 => UInt64, f32 => Float, f64 => Double,
    UAString => String, StatusCode => StatusCode, ByteString => ByteString
);

variant_from_boxed!(
    DateTime => DateTime, Guid => Guid, QualifiedName => QualifiedName,
    LocalizedText => LocalizedText, NodeId => NodeId, ExpandedNodeId => ExpandedNodeId,
    ExtensionObject => ExtensionObject, DataValue => DataValue, DiagnosticInfo => DiagnosticInfo,
    Array => Array
);

impl From<()> for Variant {
    fn from(_: ()) -> Self {
        Variant::Empty
    }
}

impl<'a> From<&'a str> for Variant {
    fn from(v: &'a str) -> Self {
        Variant::String(UAString::from(v))
    }
}

impl From<String> for Variant {
    fn from(v: String) -> Self {
        Variant::String(UAString::from(v))
    }
}

macro_rules! from_array_to_variant_impl {
    ($encoding_mask: expr, $rtype: ty) => {
        impl<'a> From<&'a [$rtype]> for Variant {
            fn from(v: &'a [$rtype]) -> Self {
                let values: Vec<Variant> = v.iter().map(|v| Variant::from(v.clone())).collect();
                Variant::Array(Box::new(Array::from_typed_values($encoding_mask, values)))
            }
        }

        impl From<Vec<$rtype>> for Variant {
            fn from(v: Vec<$rtype>) -> Self {
                Variant::from(v.as_slice())
            }
        }
    };
}

from_array_to_variant_impl!(VariantTypeId::String, String);
from_array_to_variant_impl!(VariantTypeId::String, UAString);
from_array_to_variant_impl!(VariantTypeId::Boolean, bool);
from_array_to_variant_impl!(VariantTypeId::SByte, i8);
from_array_to_variant_impl!(VariantTypeId::Byte, u8);
from_array_to_variant_impl!(VariantTypeId::Int16, i16);
from_array_to_variant_impl!(VariantTypeId::UInt16, u16);
from_array_to_variant_impl!(VariantTypeId::Int32, i32);
from_array_to_variant_impl!(VariantTypeId::UInt32, u32);
from_array_to_variant_impl!(VariantTypeId::Int64, i64);
from_array_to_variant_impl!(VariantTypeId::UInt64, u64);
from_array_to_variant_impl!(VariantTypeId::Float, f32);
from_array_to_variant_impl!(VariantTypeId::Double, f64);
from_array_to_variant_impl!(VariantTypeId::Guid, Guid);
from_array_to_variant_impl!(VariantTypeId::DateTime, DateTime);
from_array_to_variant_impl!(VariantTypeId::ByteString, ByteString);
from_array_to_variant_impl!(VariantTypeId::NodeId, NodeId);
from_array_to_variant_impl!(VariantTypeId::LocalizedText, LocalizedText);
from_array_to_variant_impl!(VariantTypeId::QualifiedName, QualifiedName);
from_array_to_variant_impl!(VariantTypeId::ExtensionObject, ExtensionObject);

/// Extracts a scalar of exactly the named type, e.g. `i32::try_from(&variant)`. No conversions
/// between types are attempted.
macro_rules! try_from_variant_impl {
    ($rtype: ty, $vtype: ident, $conv: expr) => {
        impl TryFrom<&Variant> for $rtype {
            type Error = EncodingError;

            fn try_from(value: &Variant) -> Result<Self, Self::Error> {
                match value {
                    Variant::$vtype(v) => Ok($conv(v)),
                    other => Err(EncodingError::type_mismatch(
                        VariantTypeId::$vtype.name(),
                        other.type_name(),
                    )),
                }
            }
        }

        impl TryFrom<&Variant> for Vec<$rtype> {
            type Error = EncodingError;

            fn try_from(value: &Variant) -> Result<Self, Self::Error> {
                match value {
                    Variant::Array(array) if array.value_type() == VariantTypeId::$vtype => array
                        .values()
                        .iter()
                        .map(<$rtype>::try_from)
                        .collect(),
                    other => Err(EncodingError::type_mismatch(
                        format!("array of {}", VariantTypeId::$vtype.name()),
                        other.type_name(),
                    )),
                }
            }
        }
    };
}

try_from_variant_impl!(bool, Boolean, |v: &bool| *v);
try_from_variant_impl!(i8, SByte, |v: &i8| *v);
try_from_variant_impl!(u8, Byte, |v: &u8| *v);
try_from_variant_impl!(i16, Int16, |v: &i16| *v);
try_from_variant_impl!(u16, UInt16, |v: &u16| *v);
try_from_variant_impl!(i32, Int32, |v: &i32| *v);
try_from_variant_impl!(u32, UInt32, |v: &u32| *v);
try_from_variant_impl!(i64, Int64, |v: &i64| *v);
try_from_variant_impl!(u64, UInt64, |v: &u64| *v);
try_from_variant_impl!(f32, Float, |v: &f32| *v);
try_from_variant_impl!(f64, Double, |v: &f64| *v);
try_from_variant_impl!(UAString, String, |v: &UAString| v.clone());
try_from_variant_impl!(StatusCode, StatusCode, |v: &StatusCode| *v);
try_from_variant_impl!(DateTime, DateTime, |v: &Box<DateTime>| **v);
try_from_variant_impl!(Guid, Guid, |v: &Box<Guid>| (**v).clone());
try_from_variant_impl!(ByteString, ByteString, |v: &ByteString| v.clone());
try_from_variant_impl!(NodeId, NodeId, |v: &Box<NodeId>| (**v).clone());
try_from_variant_impl!(QualifiedName, QualifiedName, |v: &Box<QualifiedName>| (**v)
    .clone());
try_from_variant_impl!(LocalizedText, LocalizedText, |v: &Box<LocalizedText>| (**v)
    .clone());

/// Borrowing accessors that fail with `TypeMismatch` when the variant holds something else.
macro_rules! variant_accessor {
    ($name: ident, $vtype: ident, $rtype: ty) => {
        pub fn $name(&self) -> EncodingResult<&$rtype> {
            match self {
                Variant::$vtype(v) => Ok(v),
                other => Err(EncodingError::type_mismatch(
                    VariantTypeId::$vtype.name(),
                    other.type_name(),
                )),
            }
        }
    };
}

macro_rules! variant_value_accessor {
    ($name: ident, $vtype: ident, $rtype: ty) => {
        pub fn $name(&self) -> EncodingResult<$rtype> {
            <$rtype>::try_from(self)
        }
    };
}

impl BinaryEncoder<Variant> for Variant {
    fn byte_len(&self) -> usize {
        // Encoding mask
        let mut size: usize = 1;

        // Value itself
        size += match self {
            Variant::Array(array) => {
                // Array length
                let mut size = 4;
                // Size of each value
                size += array
                    .values()
                    .iter()
                    .map(Variant::byte_len_variant_value)
                    .sum::<usize>();
                if array.has_dimensions() {
                    // Dimensions (size + num elements)
                    size += 4 + array.dimensions().len() * 4;
                }
                size
            }
            value => Variant::byte_len_variant_value(value),
        };
        size
    }

    fn encode<S: Write>(&self, stream: &mut S) -> EncodingResult<usize> {
        // Encoding mask will include the array bits if applicable for the type
        let mut size = write_u8(stream, self.encoding_mask())?;
        size += match self {
            Variant::Array(array) => {
                let mut size = write_i32(stream, array.len() as i32)?;
                for value in array.values().iter() {
                    size += Variant::encode_variant_value(stream, value)?;
                }
                if array.has_dimensions() {
                    // Note array dimensions are encoded as Int32 even though they are presented
                    // as UInt32 through attribute.
                    size += write_i32(stream, array.dimensions().len() as i32)?;
                    for dimension in array.dimensions() {
                        size += write_i32(stream, *dimension as i32)?;
                    }
                }
                size
            }
            value => Variant::encode_variant_value(stream, value)?,
        };
        Ok(size)
    }

    fn decode<S: Read>(stream: &mut S, decoding_options: &DecodingOptions) -> EncodingResult<Self> {
        let encoding_mask = read_u8(stream)?;
        let value_type_id = VariantTypeId::from_encoding_mask(encoding_mask)?;

        // Arrays are constructed through Array::new_multi or Array::new so malicious data comes
        // back as an error.
        if encoding_mask & EncodingMask::ARRAY_VALUES_BIT != 0 {
            if value_type_id == VariantTypeId::Empty {
                error!("Variant array has no element type");
                return Err(EncodingError::invalid_encoding("variant array of null"));
            }
            // A null array has no value, any dimensions that follow go with it
            let array_length = match decoding_options.check_array_length(read_i32(stream)?)? {
                Some(array_length) => array_length,
                None => {
                    if encoding_mask & EncodingMask::ARRAY_DIMENSIONS_BIT != 0 {
                        let _: Option<Vec<i32>> = read_array(stream, decoding_options)?;
                    }
                    return Ok(Variant::Empty);
                }
            };
            let mut values: Vec<Variant> = Vec::with_capacity(array_length);
            for _ in 0..array_length {
                values.push(Variant::decode_variant_value(
                    stream,
                    value_type_id,
                    decoding_options,
                )?);
            }
            if encoding_mask & EncodingMask::ARRAY_DIMENSIONS_BIT != 0 {
                let dimensions: Option<Vec<i32>> = read_array(stream, decoding_options)?;
                let dimensions = dimensions.unwrap_or_default();
                if dimensions.iter().any(|d| *d < 0) {
                    error!("Invalid array dimensions {:?}", dimensions);
                    return Err(EncodingError::invalid_encoding("negative array dimension"));
                }
                let dimensions: Vec<u32> = dimensions.into_iter().map(|d| d as u32).collect();
                Array::new_multi(value_type_id, values, dimensions).map(Variant::from)
            } else {
                Array::new(value_type_id, values).map(Variant::from)
            }
        } else if encoding_mask & EncodingMask::ARRAY_DIMENSIONS_BIT != 0 {
            error!("Array dimensions bit specified without any values");
            Err(EncodingError::invalid_encoding(
                "variant dimensions without array",
            ))
        } else {
            Variant::decode_variant_value(stream, value_type_id, decoding_options)
        }
    }
}

/// This implementation is mainly for debugging / convenience purposes, to eliminate some of the
/// noise in common types from using the Debug trait.
impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Variant::SByte(v) => write!(f, "{}", v),
            Variant::Byte(v) => write!(f, "{}", v),
            Variant::Int16(v) => write!(f, "{}", v),
            Variant::UInt16(v) => write!(f, "{}", v),
            Variant::Int32(v) => write!(f, "{}", v),
            Variant::UInt32(v) => write!(f, "{}", v),
            Variant::Int64(v) => write!(f, "{}", v),
            Variant::UInt64(v) => write!(f, "{}", v),
            Variant::Float(v) => write!(f, "{}", v),
            Variant::Double(v) => write!(f, "{}", v),
            Variant::Boolean(v) => write!(f, "{}", v),
            Variant::String(ref v) => write!(f, "{}", v),
            Variant::Guid(ref v) => write!(f, "{}", v),
            Variant::DateTime(ref v) => write!(f, "{}", v),
            Variant::NodeId(ref v) => write!(f, "{}", v),
            Variant::ExpandedNodeId(ref v) => write!(f, "{}", v),
            Variant::StatusCode(ref v) => write!(f, "{}", v),
            Variant::Variant(ref v) => write!(f, "Variant({})", v),
            value => write!(f, "{:?}", value),
        }
    }
}

impl Variant {
    /// Returns the length of just the value, not the encoding flag
    fn byte_len_variant_value(value: &Variant) -> usize {
        match value {
            Variant::Empty => 0,
            Variant::Boolean(value) => value.byte_len(),
            Variant::SByte(value) => value.byte_len(),
            Variant::Byte(value) => value.byte_len(),
            Variant::Int16(value) => value.byte_len(),
            Variant::UInt16(value) => value.byte_len(),
            Variant::Int32(value) => value.byte_len(),
            Variant::UInt32(value) => value.byte_len(),
            Variant::Int64(value) => value.byte_len(),
            Variant::UInt64(value) => value.byte_len(),
            Variant::Float(value) => value.byte_len(),
            Variant::Double(value) => value.byte_len(),
            Variant::String(value) => value.byte_len(),
            Variant::DateTime(value) => value.byte_len(),
            Variant::Guid(value) => value.byte_len(),
            Variant::ByteString(value) => value.byte_len(),
            Variant::XmlElement(value) => value.byte_len(),
            Variant::NodeId(value) => value.byte_len(),
            Variant::ExpandedNodeId(value) => value.byte_len(),
            Variant::StatusCode(value) => value.byte_len(),
            Variant::QualifiedName(value) => value.byte_len(),
            Variant::LocalizedText(value) => value.byte_len(),
            Variant::ExtensionObject(value) => value.byte_len(),
            Variant::Variant(value) => value.byte_len(),
            Variant::DataValue(value) => value.byte_len(),
            Variant::DiagnosticInfo(value) => value.byte_len(),
            Variant::Array(_) => {
                error!("Cannot compute length of a nested array");
                0
            }
        }
    }

    /// Encodes just the value, not the encoding flag
    fn encode_variant_value<S: Write>(stream: &mut S, value: &Variant) -> EncodingResult<usize> {
        match value {
            Variant::Empty => Ok(0),
            Variant::Boolean(value) => value.encode(stream),
            Variant::SByte(value) => value.encode(stream),
            Variant::Byte(value) => value.encode(stream),
            Variant::Int16(value) => value.encode(stream),
            Variant::UInt16(value) => value.encode(stream),
            Variant::Int32(value) => value.encode(stream),
            Variant::UInt32(value) => value.encode(stream),
            Variant::Int64(value) => value.encode(stream),
            Variant::UInt64(value) => value.encode(stream),
            Variant::Float(value) => value.encode(stream),
            Variant::Double(value) => value.encode(stream),
            Variant::String(value) => value.encode(stream),
            Variant::DateTime(value) => value.encode(stream),
            Variant::Guid(value) => value.encode(stream),
            Variant::ByteString(value) => value.encode(stream),
            Variant::XmlElement(value) => value.encode(stream),
            Variant::NodeId(value) => value.encode(stream),
            Variant::ExpandedNodeId(value) => value.encode(stream),
            Variant::StatusCode(value) => value.encode(stream),
            Variant::QualifiedName(value) => value.encode(stream),
            Variant::LocalizedText(value) => value.encode(stream),
            Variant::ExtensionObject(value) => value.encode(stream),
            Variant::Variant(value) => value.encode(stream),
            Variant::DataValue(value) => value.encode(stream),
            Variant::DiagnosticInfo(value) => value.encode(stream),
            Variant::Array(_) => {
                warn!("Cannot encode a nested array");
                Err(EncodingError::type_mismatch("scalar", "Array"))
            }
        }
    }

    /// Reads just the variant value from the stream
    fn decode_variant_value<S: Read>(
        stream: &mut S,
        value_type_id: VariantTypeId,
        decoding_options: &DecodingOptions,
    ) -> EncodingResult<Self> {
        let result = match value_type_id {
            VariantTypeId::Empty => Variant::Empty,
            VariantTypeId::Boolean => Self::from(bool::decode(stream, decoding_options)?),
            VariantTypeId::SByte => Self::from(i8::decode(stream, decoding_options)?),
            VariantTypeId::Byte => Self::from(u8::decode(stream, decoding_options)?),
            VariantTypeId::Int16 => Self::from(i16::decode(stream, decoding_options)?),
            VariantTypeId::UInt16 => Self::from(u16::decode(stream, decoding_options)?),
            VariantTypeId::Int32 => Self::from(i32::decode(stream, decoding_options)?),
            VariantTypeId::UInt32 => Self::from(u32::decode(stream, decoding_options)?),
            VariantTypeId::Int64 => Self::from(i64::decode(stream, decoding_options)?),
            VariantTypeId::UInt64 => Self::from(u64::decode(stream, decoding_options)?),
            VariantTypeId::Float => Self::from(f32::decode(stream, decoding_options)?),
            VariantTypeId::Double => Self::from(f64::decode(stream, decoding_options)?),
            VariantTypeId::String => Self::from(UAString::decode(stream, decoding_options)?),
            VariantTypeId::DateTime => Self::from(DateTime::decode(stream, decoding_options)?),
            VariantTypeId::Guid => Self::from(Guid::decode(stream, decoding_options)?),
            VariantTypeId::ByteString => {
                Self::from(ByteString::decode(stream, decoding_options)?)
            }
            // Force the type to be XmlElement since its typedef'd to UAString
            VariantTypeId::XmlElement => {
                Variant::XmlElement(XmlElement::decode(stream, decoding_options)?)
            }
            VariantTypeId::NodeId => Self::from(NodeId::decode(stream, decoding_options)?),
            VariantTypeId::ExpandedNodeId => {
                Self::from(ExpandedNodeId::decode(stream, decoding_options)?)
            }
            VariantTypeId::StatusCode => {
                Self::from(StatusCode::decode(stream, decoding_options)?)
            }
            VariantTypeId::QualifiedName => {
                Self::from(QualifiedName::decode(stream, decoding_options)?)
            }
            VariantTypeId::LocalizedText => {
                Self::from(LocalizedText::decode(stream, decoding_options)?)
            }
            VariantTypeId::ExtensionObject => {
                // Extension object internally does depth checking to prevent deep recursion
                Self::from(ExtensionObject::decode(stream, decoding_options)?)
            }
            VariantTypeId::Variant => {
                // Nested variant is depth checked to prevent deep recursion
                let _depth_lock = decoding_options.depth_lock()?;
                Variant::Variant(Box::new(Variant::decode(stream, decoding_options)?))
            }
            VariantTypeId::DataValue => {
                let _depth_lock = decoding_options.depth_lock()?;
                Self::from(DataValue::decode(stream, decoding_options)?)
            }
            VariantTypeId::DiagnosticInfo => {
                Self::from(DiagnosticInfo::decode(stream, decoding_options)?)
            }
        };
        Ok(result)
    }

    /// Creates a single dimension array variant, failing if any value is not of the type
    pub fn new_array<V>(value_type: VariantTypeId, values: V) -> EncodingResult<Variant>
    where
        V: Into<Vec<Variant>>,
    {
        Array::new(value_type, values).map(Variant::from)
    }

    /// Creates a multi dimension array variant
    pub fn new_matrix<V, D>(value_type: VariantTypeId, values: V, dimensions: D) -> EncodingResult<Variant>
    where
        V: Into<Vec<Variant>>,
        D: Into<Vec<u32>>,
    {
        Array::new_multi(value_type, values, dimensions).map(Variant::from)
    }

    /// Returns the type of the variant, or the element type for an array
    pub fn type_id(&self) -> VariantTypeId {
        match self {
            Variant::Empty => VariantTypeId::Empty,
            Variant::Boolean(_) => VariantTypeId::Boolean,
            Variant::SByte(_) => VariantTypeId::SByte,
            Variant::Byte(_) => VariantTypeId::Byte,
            Variant::Int16(_) => VariantTypeId::Int16,
            Variant::UInt16(_) => VariantTypeId::UInt16,
            Variant::Int32(_) => VariantTypeId::Int32,
            Variant::UInt32(_) => VariantTypeId::UInt32,
            Variant::Int64(_) => VariantTypeId::Int64,
            Variant::UInt64(_) => VariantTypeId::UInt64,
            Variant::Float(_) => VariantTypeId::Float,
            Variant::Double(_) => VariantTypeId::Double,
            Variant::String(_) => VariantTypeId::String,
            Variant::DateTime(_) => VariantTypeId::DateTime,
            Variant::Guid(_) => VariantTypeId::Guid,
            Variant::ByteString(_) => VariantTypeId::ByteString,
            Variant::XmlElement(_) => VariantTypeId::XmlElement,
            Variant::StatusCode(_) => VariantTypeId::StatusCode,
            Variant::QualifiedName(_) => VariantTypeId::QualifiedName,
            Variant::LocalizedText(_) => VariantTypeId::LocalizedText,
            Variant::NodeId(_) => VariantTypeId::NodeId,
            Variant::ExpandedNodeId(_) => VariantTypeId::ExpandedNodeId,
            Variant::ExtensionObject(_) => VariantTypeId::ExtensionObject,
            Variant::Variant(_) => VariantTypeId::Variant,
            Variant::DataValue(_) => VariantTypeId::DataValue,
            Variant::DiagnosticInfo(_) => VariantTypeId::DiagnosticInfo,
            Variant::Array(array) => array.value_type(),
        }
    }

    /// A readable name of the type held, used in error messages
    pub fn type_name(&self) -> String {
        if self.is_array() {
            format!("array of {}", self.type_id().name())
        } else {
            self.type_id().name().to_string()
        }
    }

    /// Tests and returns true if the variant holds a numeric type
    pub fn is_numeric(&self) -> bool {
        !self.is_array() && self.type_id().is_numeric()
    }

    /// Test if the variant holds an array
    pub fn is_array(&self) -> bool {
        matches!(self, Variant::Array(_))
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Variant::Empty)
    }

    /// Test if the variant is an array whose elements are of the type
    pub fn is_array_of_type(&self, variant_type: VariantTypeId) -> bool {
        match self {
            Variant::Array(array) => array.value_type() == variant_type,
            _ => false,
        }
    }

    pub(crate) fn encoding_mask(&self) -> u8 {
        match self {
            Variant::Array(array) => array.encoding_mask(),
            value => value.type_id().encoding_mask(),
        }
    }

    variant_value_accessor!(as_bool, Boolean, bool);
    variant_value_accessor!(as_i8, SByte, i8);
    variant_value_accessor!(as_u8, Byte, u8);
    variant_value_accessor!(as_i16, Int16, i16);
    variant_value_accessor!(as_u16, UInt16, u16);
    variant_value_accessor!(as_i32, Int32, i32);
    variant_value_accessor!(as_u32, UInt32, u32);
    variant_value_accessor!(as_i64, Int64, i64);
    variant_value_accessor!(as_u64, UInt64, u64);
    variant_value_accessor!(as_f32, Float, f32);
    variant_value_accessor!(as_f64, Double, f64);
    variant_value_accessor!(as_status_code, StatusCode, StatusCode);
    variant_value_accessor!(as_date_time, DateTime, DateTime);
    variant_accessor!(as_string, String, UAString);
    variant_accessor!(as_guid, Guid, Guid);
    variant_accessor!(as_byte_string, ByteString, ByteString);
    variant_accessor!(as_xml_element, XmlElement, XmlElement);
    variant_accessor!(as_qualified_name, QualifiedName, QualifiedName);
    variant_accessor!(as_localized_text, LocalizedText, LocalizedText);
    variant_accessor!(as_node_id, NodeId, NodeId);
    variant_accessor!(as_expanded_node_id, ExpandedNodeId, ExpandedNodeId);
    variant_accessor!(as_extension_object, ExtensionObject, ExtensionObject);
    variant_accessor!(as_data_value, DataValue, DataValue);
    variant_accessor!(as_variant, Variant, Variant);
    variant_accessor!(as_diagnostic_info, DiagnosticInfo, DiagnosticInfo);

    /// The array held by the variant
    pub fn as_array(&self) -> EncodingResult<&Array> {
        match self {
            Variant::Array(array) => Ok(array),
            other => Err(EncodingError::type_mismatch("array", other.type_name())),
        }
    }

    /// Mutable access to the extension object so it can be resolved in place
    pub fn as_extension_object_mut(&mut self) -> EncodingResult<&mut ExtensionObject> {
        match self {
            Variant::ExtensionObject(v) => Ok(v),
            other => Err(EncodingError::type_mismatch(
                VariantTypeId::ExtensionObject.name(),
                other.type_name(),
            )),
        }
    }
}
