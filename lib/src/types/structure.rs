// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0
// Copyright (C) 2017-2022 Adam Lock

//! Structures and the codecs that read and write them.
//!
//! A structure known at compile time implements `StructureType`, which lists its fields in wire
//! order. Any structure, compiled or built at runtime from a `StructureDefinition`, can be held
//! behind the object safe `UaStructure` and is read and written by a `DataTypeCodec` found in the
//! type registry.

use std::{any::Any, fmt, marker::PhantomData};

use crate::types::{
    codec::{EncodingFormat, UaDecoder, UaEncoder},
    encoding::{EncodingError, EncodingResult},
    enums::Enumeration,
    localized_text::LocalizedText,
    node_id::NodeId,
    node_ids::DataTypeId,
    structure_definition::{StructureDefinition, StructureField, StructureType as StructureKind},
};

/// The value rank of a scalar field
pub const VALUE_RANK_SCALAR: i32 = -1;
/// The value rank of a one dimension array field
pub const VALUE_RANK_ONE_DIMENSION: i32 = 1;

/// Describes one field of a compiled structure.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldInfo {
    pub name: &'static str,
    pub data_type: DataTypeId,
    pub value_rank: i32,
    pub is_optional: bool,
}

impl FieldInfo {
    pub const fn scalar(name: &'static str, data_type: DataTypeId) -> FieldInfo {
        FieldInfo {
            name,
            data_type,
            value_rank: VALUE_RANK_SCALAR,
            is_optional: false,
        }
    }

    pub const fn array(name: &'static str, data_type: DataTypeId) -> FieldInfo {
        FieldInfo {
            name,
            data_type,
            value_rank: VALUE_RANK_ONE_DIMENSION,
            is_optional: false,
        }
    }
}

/// The encoding ids of a data type, one per wire format
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EncodingIds {
    pub binary: NodeId,
    pub xml: NodeId,
    pub json: NodeId,
}

impl EncodingIds {
    pub fn get(&self, format: EncodingFormat) -> &NodeId {
        match format {
            EncodingFormat::Binary => &self.binary,
            EncodingFormat::Xml => &self.xml,
            EncodingFormat::Json => &self.json,
        }
    }

    /// Tests if the node id is one of the encoding ids
    pub fn contains(&self, node_id: &NodeId) -> bool {
        self.binary == *node_id || self.xml == *node_id || self.json == *node_id
    }
}

/// A structure value whose type is only known at runtime.
pub trait UaStructure: fmt::Debug + Send + Sync + Any {
    fn as_any(&self) -> &dyn Any;

    fn clone_box(&self) -> Box<dyn UaStructure>;

    fn eq_dyn(&self, other: &dyn UaStructure) -> bool;

    /// The browse name of the data type, also the element name of the structure in XML
    fn type_name(&self) -> &str;

    fn data_type_id(&self) -> NodeId;

    /// The encoding id that tags this value when it is written in the format
    fn encoding_id(&self, format: EncodingFormat) -> NodeId;

    /// Writes the fields of the structure
    fn encode_dyn(&self, encoder: &mut dyn UaEncoder) -> EncodingResult<()>;
}

impl Clone for Box<dyn UaStructure> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

impl PartialEq for dyn UaStructure {
    fn eq(&self, other: &Self) -> bool {
        self.eq_dyn(other)
    }
}

impl dyn UaStructure {
    /// Returns the concrete value if it is of the type
    pub fn downcast_ref<T: UaStructure>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }
}

/// A structure whose layout is fixed at compile time.
pub trait StructureType: fmt::Debug + Clone + PartialEq + Send + Sync + 'static {
    const NAME: &'static str;
    const TYPE_ID: NodeId;
    const BINARY_ENCODING_ID: NodeId;
    const XML_ENCODING_ID: NodeId;
    const JSON_ENCODING_ID: NodeId;
    /// Every field in wire order, the fields of base types first
    const FIELDS: &'static [FieldInfo];

    fn encode_fields(&self, encoder: &mut dyn UaEncoder) -> EncodingResult<()>;

    fn decode_fields(decoder: &mut dyn UaDecoder) -> EncodingResult<Self>;

    fn encoding_ids() -> EncodingIds {
        EncodingIds {
            binary: Self::BINARY_ENCODING_ID,
            xml: Self::XML_ENCODING_ID,
            json: Self::JSON_ENCODING_ID,
        }
    }

    /// The definition of the type built from its field table, so that a generic decoder reads
    /// the same layout as `decode_fields`
    fn structure_definition() -> StructureDefinition {
        let has_optional = Self::FIELDS.iter().any(|f| f.is_optional);
        StructureDefinition {
            default_encoding_id: Self::BINARY_ENCODING_ID,
            base_data_type: DataTypeId::Structure.into(),
            structure_type: Enumeration::Known(if has_optional {
                StructureKind::StructureWithOptionalFields
            } else {
                StructureKind::Structure
            }),
            fields: Some(
                Self::FIELDS
                    .iter()
                    .map(|f| StructureField {
                        name: f.name.into(),
                        description: LocalizedText::null(),
                        data_type: f.data_type.into(),
                        value_rank: f.value_rank,
                        array_dimensions: None,
                        max_string_length: 0,
                        is_optional: f.is_optional,
                    })
                    .collect(),
            ),
        }
    }
}

impl<T: StructureType> UaStructure for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn clone_box(&self) -> Box<dyn UaStructure> {
        Box::new(self.clone())
    }

    fn eq_dyn(&self, other: &dyn UaStructure) -> bool {
        other
            .as_any()
            .downcast_ref::<T>()
            .map_or(false, |other| self == other)
    }

    fn type_name(&self) -> &str {
        T::NAME
    }

    fn data_type_id(&self) -> NodeId {
        T::TYPE_ID
    }

    fn encoding_id(&self, format: EncodingFormat) -> NodeId {
        match format {
            EncodingFormat::Binary => T::BINARY_ENCODING_ID,
            EncodingFormat::Xml => T::XML_ENCODING_ID,
            EncodingFormat::Json => T::JSON_ENCODING_ID,
        }
    }

    fn encode_dyn(&self, encoder: &mut dyn UaEncoder) -> EncodingResult<()> {
        self.encode_fields(encoder)
    }
}

/// Reads and writes the fields of one data type. Codecs are stateless and are shared by every
/// decoder through the type registry.
pub trait DataTypeCodec: Send + Sync {
    fn type_name(&self) -> &str;

    fn decode(&self, decoder: &mut dyn UaDecoder) -> EncodingResult<Box<dyn UaStructure>>;

    /// Writes the value, failing with `TypeMismatch` when it is not of the codec's type
    fn encode(&self, encoder: &mut dyn UaEncoder, value: &dyn UaStructure) -> EncodingResult<()>;

    fn structure_definition(&self) -> StructureDefinition;
}

/// The codec of a compiled structure
pub struct StructCodec<T: StructureType> {
    _marker: PhantomData<fn() -> T>,
}

impl<T: StructureType> Default for StructCodec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: StructureType> StructCodec<T> {
    pub fn new() -> Self {
        StructCodec {
            _marker: PhantomData,
        }
    }
}

impl<T: StructureType> DataTypeCodec for StructCodec<T> {
    fn type_name(&self) -> &str {
        T::NAME
    }

    fn decode(&self, decoder: &mut dyn UaDecoder) -> EncodingResult<Box<dyn UaStructure>> {
        Ok(Box::new(T::decode_fields(decoder)?))
    }

    fn encode(&self, encoder: &mut dyn UaEncoder, value: &dyn UaStructure) -> EncodingResult<()> {
        match value.downcast_ref::<T>() {
            Some(value) => value.encode_fields(encoder),
            None => {
                error!(
                    "Codec for {} was asked to encode a {}",
                    T::NAME,
                    value.type_name()
                );
                Err(EncodingError::type_mismatch(T::NAME, value.type_name()))
            }
        }
    }

    fn structure_definition(&self) -> StructureDefinition {
        T::structure_definition()
    }
}
