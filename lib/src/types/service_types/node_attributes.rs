// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0
// Copyright (C) 2017-2022 Adam Lock

//! The attributes passed when adding nodes. Every kind of attributes starts with the fields of
//! `NodeAttributes`, held in a `base` field and written before the fields of its own.

use std::convert::TryFrom;

use crate::types::{
    codec::{decode_structure_array, encode_structure_array, UaDecoder, UaEncoder},
    encoding::{EncodingError, EncodingResult},
    extension_object::ExtensionObject,
    localized_text::LocalizedText,
    node_id::NodeId,
    node_ids::{DataTypeId, ObjectId},
    structure::{FieldInfo, StructureType},
    type_registry::EncodingContext,
    variant::Variant,
};

bitflags! {
    /// The bits of `SpecifiedAttributes` saying which attributes were set by the client
    pub struct AttributesMask: u32 {
        const ACCESS_LEVEL = 1;
        const ARRAY_DIMENSIONS = 1 << 1;
        const BROWSE_NAME = 1 << 2;
        const CONTAINS_NO_LOOPS = 1 << 3;
        const DATA_TYPE = 1 << 4;
        const DESCRIPTION = 1 << 5;
        const DISPLAY_NAME = 1 << 6;
        const EVENT_NOTIFIER = 1 << 7;
        const EXECUTABLE = 1 << 8;
        const HISTORIZING = 1 << 9;
        const INVERSE_NAME = 1 << 10;
        const IS_ABSTRACT = 1 << 11;
        const MINIMUM_SAMPLING_INTERVAL = 1 << 12;
        const NODE_CLASS = 1 << 13;
        const NODE_ID = 1 << 14;
        const SYMMETRIC = 1 << 15;
        const USER_ACCESS_LEVEL = 1 << 16;
        const USER_EXECUTABLE = 1 << 17;
        const USER_WRITE_MASK = 1 << 18;
        const VALUE_RANK = 1 << 19;
        const WRITE_MASK = 1 << 20;
        const VALUE = 1 << 21;
        const DATA_TYPE_DEFINITION = 1 << 22;
        const ROLE_PERMISSIONS = 1 << 23;
        const ACCESS_RESTRICTIONS = 1 << 24;
        const ACCESS_LEVEL_EX = 1 << 25;
    }
}

/// Expands to the field table of an attributes type, the base fields followed by its own
macro_rules! node_attributes_fields {
    ($($field:expr,)*) => {
        &[
            FieldInfo::scalar("SpecifiedAttributes", DataTypeId::UInt32),
            FieldInfo::scalar("DisplayName", DataTypeId::LocalizedText),
            FieldInfo::scalar("Description", DataTypeId::LocalizedText),
            FieldInfo::scalar("WriteMask", DataTypeId::UInt32),
            FieldInfo::scalar("UserWriteMask", DataTypeId::UInt32),
            $($field,)*
        ]
    };
}

/// Implements `StructureType` for a type of attributes. The body encodes and decodes the fields
/// after the base.
macro_rules! node_attributes_type {
    (
        $name:ident, $type_id:ident, $binary:ident, $xml:ident, $json:ident,
        [$($field:expr,)*],
        |$self_:ident, $encoder:ident| $encode:block,
        |$decoder:ident, $base:ident| $decode:block
    ) => {
        impl StructureType for $name {
            const NAME: &'static str = stringify!($name);
            const TYPE_ID: NodeId = DataTypeId::$type_id.node_id();
            const BINARY_ENCODING_ID: NodeId = ObjectId::$binary.node_id();
            const XML_ENCODING_ID: NodeId = ObjectId::$xml.node_id();
            const JSON_ENCODING_ID: NodeId = ObjectId::$json.node_id();
            const FIELDS: &'static [FieldInfo] = node_attributes_fields![$($field,)*];

            fn encode_fields(&$self_, $encoder: &mut dyn UaEncoder) -> EncodingResult<()> {
                $self_.base.encode_fields($encoder)?;
                $encode
            }

            fn decode_fields($decoder: &mut dyn UaDecoder) -> EncodingResult<Self> {
                let $base = NodeAttributes::decode_fields($decoder)?;
                $decode
            }
        }
    };
}

/// The attributes every node has
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NodeAttributes {
    pub specified_attributes: u32,
    pub display_name: LocalizedText,
    pub description: LocalizedText,
    pub write_mask: u32,
    pub user_write_mask: u32,
}

impl StructureType for NodeAttributes {
    const NAME: &'static str = "NodeAttributes";
    const TYPE_ID: NodeId = DataTypeId::NodeAttributes.node_id();
    const BINARY_ENCODING_ID: NodeId = ObjectId::NodeAttributes_Encoding_DefaultBinary.node_id();
    const XML_ENCODING_ID: NodeId = ObjectId::NodeAttributes_Encoding_DefaultXml.node_id();
    const JSON_ENCODING_ID: NodeId = ObjectId::NodeAttributes_Encoding_DefaultJson.node_id();
    const FIELDS: &'static [FieldInfo] = node_attributes_fields![];

    fn encode_fields(&self, encoder: &mut dyn UaEncoder) -> EncodingResult<()> {
        encoder.uint32("SpecifiedAttributes", self.specified_attributes)?;
        encoder.localized_text("DisplayName", &self.display_name)?;
        encoder.localized_text("Description", &self.description)?;
        encoder.uint32("WriteMask", self.write_mask)?;
        encoder.uint32("UserWriteMask", self.user_write_mask)
    }

    fn decode_fields(decoder: &mut dyn UaDecoder) -> EncodingResult<Self> {
        Ok(NodeAttributes {
            specified_attributes: decoder.uint32("SpecifiedAttributes")?,
            display_name: decoder.localized_text("DisplayName")?,
            description: decoder.localized_text("Description")?,
            write_mask: decoder.uint32("WriteMask")?,
            user_write_mask: decoder.uint32("UserWriteMask")?,
        })
    }
}

impl NodeAttributes {
    /// The specified attributes, unknown bits are dropped
    pub fn specified(&self) -> AttributesMask {
        AttributesMask::from_bits_truncate(self.specified_attributes)
    }

    pub fn is_specified(&self, mask: AttributesMask) -> bool {
        self.specified().contains(mask)
    }

    pub fn set_specified(&mut self, mask: AttributesMask) {
        self.specified_attributes |= mask.bits();
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObjectAttributes {
    pub base: NodeAttributes,
    pub event_notifier: u8,
}

node_attributes_type!(
    ObjectAttributes,
    ObjectAttributes,
    ObjectAttributes_Encoding_DefaultBinary,
    ObjectAttributes_Encoding_DefaultXml,
    ObjectAttributes_Encoding_DefaultJson,
    [FieldInfo::scalar("EventNotifier", DataTypeId::Byte),],
    |self, encoder| { encoder.byte("EventNotifier", self.event_notifier) },
    |decoder, base| {
        Ok(ObjectAttributes {
            base,
            event_notifier: decoder.byte("EventNotifier")?,
        })
    }
);

#[derive(Debug, Clone, PartialEq, Default)]
pub struct VariableAttributes {
    pub base: NodeAttributes,
    pub value: Variant,
    pub data_type: NodeId,
    pub value_rank: i32,
    pub array_dimensions: Option<Vec<u32>>,
    pub access_level: u8,
    pub user_access_level: u8,
    pub minimum_sampling_interval: f64,
    pub historizing: bool,
}

node_attributes_type!(
    VariableAttributes,
    VariableAttributes,
    VariableAttributes_Encoding_DefaultBinary,
    VariableAttributes_Encoding_DefaultXml,
    VariableAttributes_Encoding_DefaultJson,
    [
        FieldInfo::scalar("Value", DataTypeId::BaseDataType),
        FieldInfo::scalar("DataType", DataTypeId::NodeId),
        FieldInfo::scalar("ValueRank", DataTypeId::Int32),
        FieldInfo::array("ArrayDimensions", DataTypeId::UInt32),
        FieldInfo::scalar("AccessLevel", DataTypeId::Byte),
        FieldInfo::scalar("UserAccessLevel", DataTypeId::Byte),
        FieldInfo::scalar("MinimumSamplingInterval", DataTypeId::Duration),
        FieldInfo::scalar("Historizing", DataTypeId::Boolean),
    ],
    |self, encoder| {
        encoder.variant("Value", &self.value)?;
        encoder.node_id("DataType", &self.data_type)?;
        encoder.int32("ValueRank", self.value_rank)?;
        encoder.uint32_array("ArrayDimensions", &self.array_dimensions)?;
        encoder.byte("AccessLevel", self.access_level)?;
        encoder.byte("UserAccessLevel", self.user_access_level)?;
        encoder.double("MinimumSamplingInterval", self.minimum_sampling_interval)?;
        encoder.boolean("Historizing", self.historizing)
    },
    |decoder, base| {
        Ok(VariableAttributes {
            base,
            value: decoder.variant("Value")?,
            data_type: decoder.node_id("DataType")?,
            value_rank: decoder.int32("ValueRank")?,
            array_dimensions: decoder.uint32_array("ArrayDimensions")?,
            access_level: decoder.byte("AccessLevel")?,
            user_access_level: decoder.byte("UserAccessLevel")?,
            minimum_sampling_interval: decoder.double("MinimumSamplingInterval")?,
            historizing: decoder.boolean("Historizing")?,
        })
    }
);

#[derive(Debug, Clone, PartialEq, Default)]
pub struct MethodAttributes {
    pub base: NodeAttributes,
    pub executable: bool,
    pub user_executable: bool,
}

node_attributes_type!(
    MethodAttributes,
    MethodAttributes,
    MethodAttributes_Encoding_DefaultBinary,
    MethodAttributes_Encoding_DefaultXml,
    MethodAttributes_Encoding_DefaultJson,
    [
        FieldInfo::scalar("Executable", DataTypeId::Boolean),
        FieldInfo::scalar("UserExecutable", DataTypeId::Boolean),
    ],
    |self, encoder| {
        encoder.boolean("Executable", self.executable)?;
        encoder.boolean("UserExecutable", self.user_executable)
    },
    |decoder, base| {
        Ok(MethodAttributes {
            base,
            executable: decoder.boolean("Executable")?,
            user_executable: decoder.boolean("UserExecutable")?,
        })
    }
);

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObjectTypeAttributes {
    pub base: NodeAttributes,
    pub is_abstract: bool,
}

node_attributes_type!(
    ObjectTypeAttributes,
    ObjectTypeAttributes,
    ObjectTypeAttributes_Encoding_DefaultBinary,
    ObjectTypeAttributes_Encoding_DefaultXml,
    ObjectTypeAttributes_Encoding_DefaultJson,
    [FieldInfo::scalar("IsAbstract", DataTypeId::Boolean),],
    |self, encoder| { encoder.boolean("IsAbstract", self.is_abstract) },
    |decoder, base| {
        Ok(ObjectTypeAttributes {
            base,
            is_abstract: decoder.boolean("IsAbstract")?,
        })
    }
);

#[derive(Debug, Clone, PartialEq, Default)]
pub struct VariableTypeAttributes {
    pub base: NodeAttributes,
    pub value: Variant,
    pub data_type: NodeId,
    pub value_rank: i32,
    pub array_dimensions: Option<Vec<u32>>,
    pub is_abstract: bool,
}

node_attributes_type!(
    VariableTypeAttributes,
    VariableTypeAttributes,
    VariableTypeAttributes_Encoding_DefaultBinary,
    VariableTypeAttributes_Encoding_DefaultXml,
    VariableTypeAttributes_Encoding_DefaultJson,
    [
        FieldInfo::scalar("Value", DataTypeId::BaseDataType),
        FieldInfo::scalar("DataType", DataTypeId::NodeId),
        FieldInfo::scalar("ValueRank", DataTypeId::Int32),
        FieldInfo::array("ArrayDimensions", DataTypeId::UInt32),
        FieldInfo::scalar("IsAbstract", DataTypeId::Boolean),
    ],
    |self, encoder| {
        encoder.variant("Value", &self.value)?;
        encoder.node_id("DataType", &self.data_type)?;
        encoder.int32("ValueRank", self.value_rank)?;
        encoder.uint32_array("ArrayDimensions", &self.array_dimensions)?;
        encoder.boolean("IsAbstract", self.is_abstract)
    },
    |decoder, base| {
        Ok(VariableTypeAttributes {
            base,
            value: decoder.variant("Value")?,
            data_type: decoder.node_id("DataType")?,
            value_rank: decoder.int32("ValueRank")?,
            array_dimensions: decoder.uint32_array("ArrayDimensions")?,
            is_abstract: decoder.boolean("IsAbstract")?,
        })
    }
);

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReferenceTypeAttributes {
    pub base: NodeAttributes,
    pub is_abstract: bool,
    pub symmetric: bool,
    pub inverse_name: LocalizedText,
}

node_attributes_type!(
    ReferenceTypeAttributes,
    ReferenceTypeAttributes,
    ReferenceTypeAttributes_Encoding_DefaultBinary,
    ReferenceTypeAttributes_Encoding_DefaultXml,
    ReferenceTypeAttributes_Encoding_DefaultJson,
    [
        FieldInfo::scalar("IsAbstract", DataTypeId::Boolean),
        FieldInfo::scalar("Symmetric", DataTypeId::Boolean),
        FieldInfo::scalar("InverseName", DataTypeId::LocalizedText),
    ],
    |self, encoder| {
        encoder.boolean("IsAbstract", self.is_abstract)?;
        encoder.boolean("Symmetric", self.symmetric)?;
        encoder.localized_text("InverseName", &self.inverse_name)
    },
    |decoder, base| {
        Ok(ReferenceTypeAttributes {
            base,
            is_abstract: decoder.boolean("IsAbstract")?,
            symmetric: decoder.boolean("Symmetric")?,
            inverse_name: decoder.localized_text("InverseName")?,
        })
    }
);

#[derive(Debug, Clone, PartialEq, Default)]
pub struct DataTypeAttributes {
    pub base: NodeAttributes,
    pub is_abstract: bool,
}

node_attributes_type!(
    DataTypeAttributes,
    DataTypeAttributes,
    DataTypeAttributes_Encoding_DefaultBinary,
    DataTypeAttributes_Encoding_DefaultXml,
    DataTypeAttributes_Encoding_DefaultJson,
    [FieldInfo::scalar("IsAbstract", DataTypeId::Boolean),],
    |self, encoder| { encoder.boolean("IsAbstract", self.is_abstract) },
    |decoder, base| {
        Ok(DataTypeAttributes {
            base,
            is_abstract: decoder.boolean("IsAbstract")?,
        })
    }
);

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ViewAttributes {
    pub base: NodeAttributes,
    pub contains_no_loops: bool,
    pub event_notifier: u8,
}

node_attributes_type!(
    ViewAttributes,
    ViewAttributes,
    ViewAttributes_Encoding_DefaultBinary,
    ViewAttributes_Encoding_DefaultXml,
    ViewAttributes_Encoding_DefaultJson,
    [
        FieldInfo::scalar("ContainsNoLoops", DataTypeId::Boolean),
        FieldInfo::scalar("EventNotifier", DataTypeId::Byte),
    ],
    |self, encoder| {
        encoder.boolean("ContainsNoLoops", self.contains_no_loops)?;
        encoder.byte("EventNotifier", self.event_notifier)
    },
    |decoder, base| {
        Ok(ViewAttributes {
            base,
            contains_no_loops: decoder.boolean("ContainsNoLoops")?,
            event_notifier: decoder.byte("EventNotifier")?,
        })
    }
);

/// One attribute of `GenericAttributes`
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GenericAttributeValue {
    pub attribute_id: u32,
    pub value: Variant,
}

impl StructureType for GenericAttributeValue {
    const NAME: &'static str = "GenericAttributeValue";
    const TYPE_ID: NodeId = DataTypeId::GenericAttributeValue.node_id();
    const BINARY_ENCODING_ID: NodeId =
        ObjectId::GenericAttributeValue_Encoding_DefaultBinary.node_id();
    const XML_ENCODING_ID: NodeId = ObjectId::GenericAttributeValue_Encoding_DefaultXml.node_id();
    const JSON_ENCODING_ID: NodeId =
        ObjectId::GenericAttributeValue_Encoding_DefaultJson.node_id();
    const FIELDS: &'static [FieldInfo] = &[
        FieldInfo::scalar("AttributeId", DataTypeId::IntegerId),
        FieldInfo::scalar("Value", DataTypeId::BaseDataType),
    ];

    fn encode_fields(&self, encoder: &mut dyn UaEncoder) -> EncodingResult<()> {
        encoder.uint32("AttributeId", self.attribute_id)?;
        encoder.variant("Value", &self.value)
    }

    fn decode_fields(decoder: &mut dyn UaDecoder) -> EncodingResult<Self> {
        Ok(GenericAttributeValue {
            attribute_id: decoder.uint32("AttributeId")?,
            value: decoder.variant("Value")?,
        })
    }
}

/// Attributes of any node class as a list of attribute id and value pairs
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GenericAttributes {
    pub base: NodeAttributes,
    pub attribute_values: Option<Vec<GenericAttributeValue>>,
}

node_attributes_type!(
    GenericAttributes,
    GenericAttributes,
    GenericAttributes_Encoding_DefaultBinary,
    GenericAttributes_Encoding_DefaultXml,
    GenericAttributes_Encoding_DefaultJson,
    [FieldInfo::array("AttributeValues", DataTypeId::GenericAttributeValue),],
    |self, encoder| { encode_structure_array(encoder, "AttributeValues", &self.attribute_values) },
    |decoder, base| {
        Ok(GenericAttributes {
            base,
            attribute_values: decode_structure_array(decoder, "AttributeValues")?,
        })
    }
);

impl GenericAttributes {
    /// The value of an attribute, if it is in the list
    pub fn value(&self, attribute_id: u32) -> Option<&Variant> {
        self.attribute_values
            .as_ref()?
            .iter()
            .find(|v| v.attribute_id == attribute_id)
            .map(|v| &v.value)
    }
}

/// The attributes of a node to add, by the kind of node
#[derive(Clone, Debug, PartialEq)]
pub enum NodeAttributesKind {
    Object(ObjectAttributes),
    Variable(VariableAttributes),
    Method(MethodAttributes),
    ObjectType(ObjectTypeAttributes),
    VariableType(VariableTypeAttributes),
    ReferenceType(ReferenceTypeAttributes),
    DataType(DataTypeAttributes),
    View(ViewAttributes),
    Generic(GenericAttributes),
    None,
}

fn downcast<T: StructureType>(value: &dyn crate::types::structure::UaStructure) -> EncodingResult<T> {
    value
        .downcast_ref::<T>()
        .cloned()
        .ok_or_else(|| EncodingError::type_mismatch(T::NAME, value.type_name()))
}

impl NodeAttributesKind {
    /// Resolves an extension object holding attributes of any kind. A null object is `None`,
    /// anything that is not node attributes is an error.
    pub fn from_extension_object(
        obj: &mut ExtensionObject,
        ctx: &EncodingContext,
    ) -> EncodingResult<Self> {
        if obj.is_null() {
            return Ok(Self::None);
        }
        let node_id = obj.node_id.clone();
        let value = obj.resolve(ctx)?.ok_or_else(|| {
            error!("Extension object {} does not hold a known type of node attributes", node_id);
            EncodingError::UnknownType(node_id.clone())
        })?;
        let type_id = value.data_type_id();
        let kind = match DataTypeId::try_from(&type_id)? {
            DataTypeId::ObjectAttributes => Self::Object(downcast(value)?),
            DataTypeId::VariableAttributes => Self::Variable(downcast(value)?),
            DataTypeId::MethodAttributes => Self::Method(downcast(value)?),
            DataTypeId::ObjectTypeAttributes => Self::ObjectType(downcast(value)?),
            DataTypeId::VariableTypeAttributes => Self::VariableType(downcast(value)?),
            DataTypeId::ReferenceTypeAttributes => Self::ReferenceType(downcast(value)?),
            DataTypeId::DataTypeAttributes => Self::DataType(downcast(value)?),
            DataTypeId::ViewAttributes => Self::View(downcast(value)?),
            DataTypeId::GenericAttributes => Self::Generic(downcast(value)?),
            _ => {
                error!("Extension object {} holds a {} which is not node attributes", node_id, value.type_name());
                return Err(EncodingError::type_mismatch("node attributes", value.type_name()));
            }
        };
        Ok(kind)
    }

    pub fn as_extension_object(&self) -> ExtensionObject {
        match self {
            Self::Object(v) => ExtensionObject::from_structure(v.clone()),
            Self::Variable(v) => ExtensionObject::from_structure(v.clone()),
            Self::Method(v) => ExtensionObject::from_structure(v.clone()),
            Self::ObjectType(v) => ExtensionObject::from_structure(v.clone()),
            Self::VariableType(v) => ExtensionObject::from_structure(v.clone()),
            Self::ReferenceType(v) => ExtensionObject::from_structure(v.clone()),
            Self::DataType(v) => ExtensionObject::from_structure(v.clone()),
            Self::View(v) => ExtensionObject::from_structure(v.clone()),
            Self::Generic(v) => ExtensionObject::from_structure(v.clone()),
            Self::None => ExtensionObject::null(),
        }
    }

    /// The attributes shared by every kind
    pub fn base(&self) -> Option<&NodeAttributes> {
        match self {
            Self::Object(v) => Some(&v.base),
            Self::Variable(v) => Some(&v.base),
            Self::Method(v) => Some(&v.base),
            Self::ObjectType(v) => Some(&v.base),
            Self::VariableType(v) => Some(&v.base),
            Self::ReferenceType(v) => Some(&v.base),
            Self::DataType(v) => Some(&v.base),
            Self::View(v) => Some(&v.base),
            Self::Generic(v) => Some(&v.base),
            Self::None => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_fields_follow_base_fields() {
        let base: Vec<_> = NodeAttributes::FIELDS.iter().map(|f| f.name).collect();
        let derived: Vec<_> = VariableAttributes::FIELDS.iter().map(|f| f.name).collect();
        assert_eq!(&derived[..base.len()], &base[..]);
        assert_eq!(derived[base.len()], "Value");
        assert_eq!(derived.len(), base.len() + 8);
    }

    #[test]
    fn specified_attributes() {
        let mut attributes = NodeAttributes::default();
        attributes.set_specified(AttributesMask::DISPLAY_NAME | AttributesMask::VALUE);
        assert!(attributes.is_specified(AttributesMask::DISPLAY_NAME));
        assert!(!attributes.is_specified(AttributesMask::DESCRIPTION));
        assert_eq!(attributes.specified_attributes, (1 << 6) | (1 << 21));
    }
}
