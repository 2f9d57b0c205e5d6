// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0
// Copyright (C) 2017-2022 Adam Lock

//! Runtime descriptions of structures and a codec that reads and writes any structure from its
//! description.
//!
//! A `StructureDefinition` lists the fields of a structure in wire order, the fields of base types
//! first. `decode_generic` walks such a list and reads every field into a `Variant` keyed by the
//! field name, so structures that were never compiled into this crate can still be read, changed
//! and written back.

use std::{convert::TryFrom, sync::Arc};

use crate::types::{
    codec::{
        decode_builtin, decode_builtin_array, decode_structure_array, encode_builtin,
        encode_builtin_array, encode_structure_array, EncodingFormat, UaDecoder, UaEncoder,
    },
    encoding::{EncodingError, EncodingResult},
    enums::{decode_enumeration, encode_enumeration, Enumeration},
    extension_object::ExtensionObject,
    localized_text::LocalizedText,
    node_id::NodeId,
    node_ids::{DataTypeId, ObjectId},
    string::UAString,
    structure::{
        self, DataTypeCodec, EncodingIds, FieldInfo, UaStructure, VALUE_RANK_ONE_DIMENSION,
        VALUE_RANK_SCALAR,
    },
    type_registry::TypeRegistry,
    variant::Variant,
    variant_type_id::VariantTypeId,
};

crate::ua_enum! {
    /// The kinds of structure a `StructureDefinition` can describe
    pub enum StructureType {
        Structure = 0,
        StructureWithOptionalFields = 1,
        Union = 2,
        StructureWithSubtypedValues = 3,
        UnionWithSubtypedValues = 4,
    }
}

/// One field of a structure.
#[derive(Debug, Clone, PartialEq)]
pub struct StructureField {
    pub name: UAString,
    pub description: LocalizedText,
    pub data_type: NodeId,
    pub value_rank: i32,
    pub array_dimensions: Option<Vec<u32>>,
    pub max_string_length: u32,
    pub is_optional: bool,
}

impl Default for StructureField {
    fn default() -> Self {
        StructureField {
            name: UAString::null(),
            description: LocalizedText::null(),
            data_type: NodeId::null(),
            value_rank: VALUE_RANK_SCALAR,
            array_dimensions: None,
            max_string_length: 0,
            is_optional: false,
        }
    }
}

impl StructureField {
    /// A mandatory scalar field
    pub fn new<S, T>(name: S, data_type: T) -> StructureField
    where
        S: Into<UAString>,
        T: Into<NodeId>,
    {
        StructureField {
            name: name.into(),
            data_type: data_type.into(),
            ..Default::default()
        }
    }

    /// A mandatory one dimension array field
    pub fn new_array<S, T>(name: S, data_type: T) -> StructureField
    where
        S: Into<UAString>,
        T: Into<NodeId>,
    {
        StructureField {
            value_rank: VALUE_RANK_ONE_DIMENSION,
            ..Self::new(name, data_type)
        }
    }

    pub fn optional(mut self) -> StructureField {
        self.is_optional = true;
        self
    }

    pub fn name(&self) -> &str {
        self.name.as_ref()
    }

    pub fn is_array(&self) -> bool {
        self.value_rank != VALUE_RANK_SCALAR
    }
}

impl structure::StructureType for StructureField {
    const NAME: &'static str = "StructureField";
    const TYPE_ID: NodeId = DataTypeId::StructureField.node_id();
    const BINARY_ENCODING_ID: NodeId = ObjectId::StructureField_Encoding_DefaultBinary.node_id();
    const XML_ENCODING_ID: NodeId = ObjectId::StructureField_Encoding_DefaultXml.node_id();
    const JSON_ENCODING_ID: NodeId = ObjectId::StructureField_Encoding_DefaultJson.node_id();
    const FIELDS: &'static [FieldInfo] = &[
        FieldInfo::scalar("Name", DataTypeId::String),
        FieldInfo::scalar("Description", DataTypeId::LocalizedText),
        FieldInfo::scalar("DataType", DataTypeId::NodeId),
        FieldInfo::scalar("ValueRank", DataTypeId::Int32),
        FieldInfo::array("ArrayDimensions", DataTypeId::UInt32),
        FieldInfo::scalar("MaxStringLength", DataTypeId::UInt32),
        FieldInfo::scalar("IsOptional", DataTypeId::Boolean),
    ];

    fn encode_fields(&self, encoder: &mut dyn UaEncoder) -> EncodingResult<()> {
        encoder.string("Name", &self.name)?;
        encoder.localized_text("Description", &self.description)?;
        encoder.node_id("DataType", &self.data_type)?;
        encoder.int32("ValueRank", self.value_rank)?;
        encoder.uint32_array("ArrayDimensions", &self.array_dimensions)?;
        encoder.uint32("MaxStringLength", self.max_string_length)?;
        encoder.boolean("IsOptional", self.is_optional)
    }

    fn decode_fields(decoder: &mut dyn UaDecoder) -> EncodingResult<Self> {
        Ok(StructureField {
            name: decoder.string("Name")?,
            description: decoder.localized_text("Description")?,
            data_type: decoder.node_id("DataType")?,
            value_rank: decoder.int32("ValueRank")?,
            array_dimensions: decoder.uint32_array("ArrayDimensions")?,
            max_string_length: decoder.uint32("MaxStringLength")?,
            is_optional: decoder.boolean("IsOptional")?,
        })
    }
}

/// Describes the fields of a structure data type in wire order.
#[derive(Debug, Clone, PartialEq)]
pub struct StructureDefinition {
    pub default_encoding_id: NodeId,
    pub base_data_type: NodeId,
    pub structure_type: Enumeration<StructureType>,
    pub fields: Option<Vec<StructureField>>,
}

impl Default for StructureDefinition {
    fn default() -> Self {
        StructureDefinition {
            default_encoding_id: NodeId::null(),
            base_data_type: DataTypeId::Structure.into(),
            structure_type: Enumeration::Known(StructureType::Structure),
            fields: None,
        }
    }
}

impl structure::StructureType for StructureDefinition {
    const NAME: &'static str = "StructureDefinition";
    const TYPE_ID: NodeId = DataTypeId::StructureDefinition.node_id();
    const BINARY_ENCODING_ID: NodeId =
        ObjectId::StructureDefinition_Encoding_DefaultBinary.node_id();
    const XML_ENCODING_ID: NodeId = ObjectId::StructureDefinition_Encoding_DefaultXml.node_id();
    const JSON_ENCODING_ID: NodeId = ObjectId::StructureDefinition_Encoding_DefaultJson.node_id();
    const FIELDS: &'static [FieldInfo] = &[
        FieldInfo::scalar("DefaultEncodingId", DataTypeId::NodeId),
        FieldInfo::scalar("BaseDataType", DataTypeId::NodeId),
        FieldInfo::scalar("StructureType", DataTypeId::StructureType),
        FieldInfo::array("Fields", DataTypeId::StructureField),
    ];

    fn encode_fields(&self, encoder: &mut dyn UaEncoder) -> EncodingResult<()> {
        encoder.node_id("DefaultEncodingId", &self.default_encoding_id)?;
        encoder.node_id("BaseDataType", &self.base_data_type)?;
        encode_enumeration(encoder, "StructureType", &self.structure_type)?;
        encode_structure_array(encoder, "Fields", &self.fields)
    }

    fn decode_fields(decoder: &mut dyn UaDecoder) -> EncodingResult<Self> {
        Ok(StructureDefinition {
            default_encoding_id: decoder.node_id("DefaultEncodingId")?,
            base_data_type: decoder.node_id("BaseDataType")?,
            structure_type: decode_enumeration(decoder, "StructureType")?,
            fields: decode_structure_array(decoder, "Fields")?,
        })
    }
}

impl StructureDefinition {
    pub fn new(structure_type: StructureType, fields: Vec<StructureField>) -> StructureDefinition {
        StructureDefinition {
            structure_type: Enumeration::Known(structure_type),
            fields: Some(fields),
            ..Default::default()
        }
    }

    /// Describes a type derived from this one, whose data type id is `base_type_id`. The fields
    /// of the base come first.
    pub fn derive<T>(&self, base_type_id: T, own_fields: Vec<StructureField>) -> StructureDefinition
    where
        T: Into<NodeId>,
    {
        let mut fields = self.fields().to_vec();
        fields.extend(own_fields);
        StructureDefinition {
            default_encoding_id: NodeId::null(),
            base_data_type: base_type_id.into(),
            structure_type: self.structure_type,
            fields: Some(fields),
        }
    }

    pub fn fields(&self) -> &[StructureField] {
        self.fields.as_deref().unwrap_or(&[])
    }

    pub fn field(&self, name: &str) -> Option<&StructureField> {
        self.fields().iter().find(|f| f.name() == name)
    }

    /// An encoding mask has one bit per optional field, so at most 32 of them fit.
    fn check_optional_fields(&self) -> EncodingResult<()> {
        let count = self.fields().iter().filter(|f| f.is_optional).count();
        if count > 32 {
            error!("Structure has {} optional fields, the encoding mask holds 32", count);
            Err(EncodingError::invalid_encoding(format!(
                "{} optional fields do not fit the encoding mask",
                count
            )))
        } else {
            Ok(())
        }
    }

    /// Bit k of the encoding mask is set when the k-th optional field is present.
    fn encoding_mask_of(&self, fields: &GenericFields) -> EncodingResult<u32> {
        self.check_optional_fields()?;
        Ok(self
            .fields()
            .iter()
            .filter(|f| f.is_optional)
            .enumerate()
            .filter(|(_, f)| fields.contains(f.name()))
            .fold(0u32, |mask, (k, _)| mask | (1 << k)))
    }
}

/// The values of a structure's fields keyed by field name, in field order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GenericFields {
    entries: Vec<(String, Variant)>,
}

impl GenericFields {
    pub fn new() -> GenericFields {
        GenericFields::default()
    }

    /// Sets the value of a field. A new field goes after the existing ones.
    pub fn insert<S, V>(&mut self, name: S, value: V)
    where
        S: Into<String>,
        V: Into<Variant>,
    {
        let name = name.into();
        let value = value.into();
        if let Some(entry) = self.entries.iter_mut().find(|(n, _)| *n == name) {
            entry.1 = value;
        } else {
            self.entries.push((name, value));
        }
    }

    pub fn get(&self, name: &str) -> Option<&Variant> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    pub fn remove(&mut self, name: &str) -> Option<Variant> {
        let idx = self.entries.iter().position(|(n, _)| n == name)?;
        Some(self.entries.remove(idx).1)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(n, _)| n == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Variant)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<S: Into<String>, V: Into<Variant>> FromIterator<(S, V)> for GenericFields {
    fn from_iter<I: IntoIterator<Item = (S, V)>>(iter: I) -> Self {
        let mut fields = GenericFields::new();
        iter.into_iter().for_each(|(k, v)| fields.insert(k, v));
        fields
    }
}

/// How a field is carried on the wire
#[derive(Debug, Clone, Copy, PartialEq)]
enum FieldKind {
    Builtin(VariantTypeId),
    Enumeration,
    /// A structure written in place, or wrapped in an extension object when subtypes are allowed
    Structure,
}

/// Maps a field data type onto a builtin type. Aliases resolve to the type they are an alias of.
fn builtin_type_of(data_type: &NodeId) -> Option<VariantTypeId> {
    let id = DataTypeId::try_from(data_type).ok()?;
    let type_id = match id {
        DataTypeId::Duration => VariantTypeId::Double,
        DataTypeId::UtcTime => VariantTypeId::DateTime,
        DataTypeId::IntegerId | DataTypeId::Counter | DataTypeId::Index => VariantTypeId::UInt32,
        DataTypeId::LocaleId | DataTypeId::NumericRange => VariantTypeId::String,
        DataTypeId::Number | DataTypeId::Integer | DataTypeId::UInteger => VariantTypeId::Variant,
        DataTypeId::Enumeration | DataTypeId::StructureType => VariantTypeId::Int32,
        other => return VariantTypeId::try_from(&other.node_id()).ok(),
    };
    Some(type_id)
}

fn field_kind(registry: &TypeRegistry, field: &StructureField) -> EncodingResult<FieldKind> {
    if registry.is_enumeration(&field.data_type) {
        Ok(FieldKind::Enumeration)
    } else if let Some(type_id) = builtin_type_of(&field.data_type) {
        Ok(FieldKind::Builtin(type_id))
    } else if registry.is_structure(&field.data_type) {
        Ok(FieldKind::Structure)
    } else {
        error!(
            "Field {} has data type {} which is neither builtin nor registered",
            field.name, field.data_type
        );
        Err(EncodingError::UnknownType(field.data_type.clone()))
    }
}

/// The kind of a field when writing, where no registry is at hand. Types that are not builtin
/// are recognised from the value.
fn field_kind_of_value(field: &StructureField, value: &Variant) -> FieldKind {
    if let Some(type_id) = builtin_type_of(&field.data_type) {
        FieldKind::Builtin(type_id)
    } else if value.type_id() == VariantTypeId::Int32 {
        FieldKind::Enumeration
    } else {
        FieldKind::Structure
    }
}

fn check_value_rank(field: &StructureField) -> EncodingResult<()> {
    match field.value_rank {
        VALUE_RANK_SCALAR | 0 | VALUE_RANK_ONE_DIMENSION => Ok(()),
        rank => {
            error!("Field {} has unsupported value rank {}", field.name, rank);
            Err(EncodingError::invalid_encoding(format!(
                "value rank {} of field {}",
                rank, field.name
            )))
        }
    }
}

fn decode_field(
    decoder: &mut dyn UaDecoder,
    field: &StructureField,
    subtyped: bool,
) -> EncodingResult<Variant> {
    check_value_rank(field)?;
    let kind = field_kind(&decoder.context().registry, field)?;
    let name = field.name();
    if !field.is_array() {
        match kind {
            FieldKind::Builtin(VariantTypeId::Variant) => decoder.variant(name),
            FieldKind::Builtin(type_id) => decode_builtin(decoder, name, type_id),
            FieldKind::Enumeration => decoder.enumeration(name).map(Variant::from),
            FieldKind::Structure if subtyped => decoder.extension_object(name).map(Variant::from),
            FieldKind::Structure => {
                let value = TypeRegistry::decode_struct(decoder, name, &field.data_type)?;
                Ok(ExtensionObject::from_dyn(value).into())
            }
        }
    } else {
        let (type_id, values) = match kind {
            FieldKind::Builtin(type_id) => (type_id, decode_builtin_array(decoder, name, type_id)?),
            FieldKind::Enumeration => (VariantTypeId::Int32, decode_enumeration_array(decoder, name)?),
            FieldKind::Structure if subtyped => (
                VariantTypeId::ExtensionObject,
                decode_builtin_array(decoder, name, VariantTypeId::ExtensionObject)?,
            ),
            FieldKind::Structure => (
                VariantTypeId::ExtensionObject,
                TypeRegistry::decode_struct_array(decoder, name, &field.data_type)?.map(|v| {
                    v.into_iter()
                        .map(|s| Variant::from(ExtensionObject::from_dyn(s)))
                        .collect()
                }),
            ),
        };
        match values {
            None => Ok(Variant::Empty),
            Some(values) => Variant::new_array(type_id, values),
        }
    }
}

fn decode_enumeration_array(
    decoder: &mut dyn UaDecoder,
    field: &str,
) -> EncodingResult<Option<Vec<Variant>>> {
    match decoder.begin_array(field)? {
        None => Ok(None),
        Some(len) => {
            let mut values = Vec::with_capacity(len);
            for _ in 0..len {
                values.push(Variant::from(decoder.enumeration(VariantTypeId::Int32.name())?));
            }
            decoder.end_array()?;
            Ok(Some(values))
        }
    }
}

fn encode_dyn_structure(
    encoder: &mut dyn UaEncoder,
    field: &str,
    value: &Variant,
) -> EncodingResult<()> {
    let structure = value.as_extension_object()?.value().ok_or_else(|| {
        error!("Field {} holds an extension object that is not decoded", field);
        EncodingError::type_mismatch("structure", "undecoded extension object")
    })?;
    encoder.begin_struct(field)?;
    structure.encode_dyn(encoder)?;
    encoder.end_struct()
}

fn encode_field(
    encoder: &mut dyn UaEncoder,
    field: &StructureField,
    value: &Variant,
    subtyped: bool,
) -> EncodingResult<()> {
    check_value_rank(field)?;
    let kind = field_kind_of_value(field, value);
    let name = field.name();
    if !field.is_array() {
        match kind {
            FieldKind::Builtin(VariantTypeId::Variant) => encoder.variant(name, value),
            FieldKind::Builtin(type_id) => {
                if value.is_array() || value.type_id() != type_id {
                    error!(
                        "Field {} expects {} but holds {}",
                        name,
                        type_id.name(),
                        value.type_name()
                    );
                    return Err(EncodingError::type_mismatch(type_id.name(), value.type_name()));
                }
                encode_builtin(encoder, name, value)
            }
            FieldKind::Enumeration => encoder.enumeration(name, value.as_i32()?, None),
            FieldKind::Structure if subtyped => {
                encoder.extension_object(name, value.as_extension_object()?)
            }
            FieldKind::Structure => encode_dyn_structure(encoder, name, value),
        }
    } else {
        let array = match value {
            Variant::Empty => return encoder.null_array(name),
            value => value.as_array()?,
        };
        match kind {
            FieldKind::Structure if !subtyped => {
                encoder.begin_array(name, array.len())?;
                for value in array.values() {
                    let item_name = value
                        .as_extension_object()?
                        .value()
                        .map(|v| v.type_name().to_string())
                        .unwrap_or_default();
                    encode_dyn_structure(encoder, &item_name, value)?;
                }
                encoder.end_array()
            }
            FieldKind::Enumeration => {
                encoder.begin_array(name, array.len())?;
                for value in array.values() {
                    encoder.enumeration(VariantTypeId::Int32.name(), value.as_i32()?, None)?;
                }
                encoder.end_array()
            }
            FieldKind::Builtin(type_id) if type_id != array.value_type() => {
                error!(
                    "Field {} expects an array of {} but holds {}",
                    name,
                    type_id.name(),
                    value.type_name()
                );
                Err(EncodingError::type_mismatch(type_id.name(), value.type_name()))
            }
            _ => encode_builtin_array(encoder, name, array.value_type(), Some(array.values())),
        }
    }
}

fn is_specified(specified: u32, position: usize) -> bool {
    position < 32 && specified & (1 << position) != 0
}

/// Reads the fields in definition order. `present` gets the position of an optional field and
/// its index among the optional fields, a field it rejects is not read.
fn decode_present_fields<F>(
    definition: &StructureDefinition,
    decoder: &mut dyn UaDecoder,
    present: F,
) -> EncodingResult<GenericFields>
where
    F: Fn(usize, usize) -> bool,
{
    let subtyped = definition.structure_type.known()
        == Some(StructureType::StructureWithSubtypedValues);
    let mut result = GenericFields::new();
    let mut optional_index = 0;
    for (i, field) in definition.fields().iter().enumerate() {
        if field.is_optional {
            optional_index += 1;
            if !present(i, optional_index - 1) {
                trace!("Optional field {} is not specified", field.name);
                continue;
            }
        }
        let value = decode_field(decoder, field, subtyped)?;
        result.insert(field.name(), value);
    }
    Ok(result)
}

/// Reads the fields of a structure in definition order. An optional field whose bit in
/// `specified` (bit index = field position) is clear is not read and is absent from the result.
pub fn decode_generic(
    definition: &StructureDefinition,
    decoder: &mut dyn UaDecoder,
    specified: u32,
) -> EncodingResult<GenericFields> {
    decode_present_fields(definition, decoder, |position, _| {
        is_specified(specified, position)
    })
}

/// Writes the fields of a structure in definition order. Optional fields missing from `fields`
/// are skipped, a missing mandatory field is an error.
pub fn encode_generic(
    definition: &StructureDefinition,
    encoder: &mut dyn UaEncoder,
    fields: &GenericFields,
) -> EncodingResult<()> {
    let subtyped = definition.structure_type.known()
        == Some(StructureType::StructureWithSubtypedValues);
    for field in definition.fields() {
        match fields.get(field.name()) {
            Some(value) => encode_field(encoder, field, value, subtyped)?,
            None if field.is_optional => {}
            None => {
                error!("Mandatory field {} has no value", field.name);
                return Err(EncodingError::invalid_encoding(format!(
                    "mandatory field {} has no value",
                    field.name
                )));
            }
        }
    }
    Ok(())
}

#[derive(Debug)]
struct DynamicTypeInfo {
    name: String,
    type_id: NodeId,
    ids: EncodingIds,
    definition: StructureDefinition,
}

/// A structure read by a `DynamicStructCodec`. The values are held by field name.
#[derive(Debug, Clone)]
pub struct DynamicStruct {
    info: Arc<DynamicTypeInfo>,
    fields: GenericFields,
}

impl PartialEq for DynamicStruct {
    fn eq(&self, other: &Self) -> bool {
        self.info.type_id == other.info.type_id && self.fields == other.fields
    }
}

impl DynamicStruct {
    pub fn fields(&self) -> &GenericFields {
        &self.fields
    }

    pub fn fields_mut(&mut self) -> &mut GenericFields {
        &mut self.fields
    }

    pub fn get(&self, name: &str) -> Option<&Variant> {
        self.fields.get(name)
    }

    pub fn definition(&self) -> &StructureDefinition {
        &self.info.definition
    }

    fn encode_union(&self, encoder: &mut dyn UaEncoder) -> EncodingResult<()> {
        let subtyped = self.info.definition.structure_type.known()
            == Some(StructureType::UnionWithSubtypedValues);
        let present = self
            .info
            .definition
            .fields()
            .iter()
            .enumerate()
            .find_map(|(i, f)| self.fields.get(f.name()).map(|v| (i, f, v)));
        match present {
            None => encoder.uint32("SwitchField", 0),
            Some((i, field, value)) => {
                encoder.uint32("SwitchField", i as u32 + 1)?;
                encode_field(encoder, field, value, subtyped)
            }
        }
    }
}

impl UaStructure for DynamicStruct {
    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn clone_box(&self) -> Box<dyn UaStructure> {
        Box::new(self.clone())
    }

    fn eq_dyn(&self, other: &dyn UaStructure) -> bool {
        other
            .downcast_ref::<DynamicStruct>()
            .map_or(false, |other| self == other)
    }

    fn type_name(&self) -> &str {
        &self.info.name
    }

    fn data_type_id(&self) -> NodeId {
        self.info.type_id.clone()
    }

    fn encoding_id(&self, format: EncodingFormat) -> NodeId {
        self.info.ids.get(format).clone()
    }

    fn encode_dyn(&self, encoder: &mut dyn UaEncoder) -> EncodingResult<()> {
        let definition = &self.info.definition;
        match definition.structure_type {
            Enumeration::Known(StructureType::Structure)
            | Enumeration::Known(StructureType::StructureWithSubtypedValues) => {
                encode_generic(definition, encoder, &self.fields)
            }
            Enumeration::Known(StructureType::StructureWithOptionalFields) => {
                encoder.uint32("EncodingMask", definition.encoding_mask_of(&self.fields)?)?;
                encode_generic(definition, encoder, &self.fields)
            }
            Enumeration::Known(StructureType::Union)
            | Enumeration::Known(StructureType::UnionWithSubtypedValues) => {
                self.encode_union(encoder)
            }
            Enumeration::Unknown(v) => Err(unknown_structure_type(v)),
        }
    }
}

fn unknown_structure_type(value: i32) -> EncodingError {
    error!("Structure type {} is unknown", value);
    EncodingError::invalid_encoding(format!("structure type {}", value))
}

/// Reads and writes the structure a `StructureDefinition` describes.
#[derive(Debug)]
pub struct DynamicStructCodec {
    info: Arc<DynamicTypeInfo>,
}

impl DynamicStructCodec {
    pub fn new<S: Into<String>>(
        name: S,
        type_id: NodeId,
        definition: StructureDefinition,
        ids: EncodingIds,
    ) -> DynamicStructCodec {
        DynamicStructCodec {
            info: Arc::new(DynamicTypeInfo {
                name: name.into(),
                type_id,
                ids,
                definition,
            }),
        }
    }

    /// Creates an empty structure of this type that fields can be inserted into
    pub fn new_value(&self, fields: GenericFields) -> DynamicStruct {
        DynamicStruct {
            info: self.info.clone(),
            fields,
        }
    }

    fn decode_union(&self, decoder: &mut dyn UaDecoder, subtyped: bool) -> EncodingResult<GenericFields> {
        let definition = &self.info.definition;
        let switch = decoder.uint32("SwitchField")? as usize;
        let mut fields = GenericFields::new();
        if switch == 0 {
            return Ok(fields);
        }
        let field = definition.fields().get(switch - 1).ok_or_else(|| {
            error!(
                "Union {} has no field at switch value {}",
                self.info.name, switch
            );
            EncodingError::invalid_encoding(format!("union switch value {}", switch))
        })?;
        let value = decode_field(decoder, field, subtyped)?;
        fields.insert(field.name(), value);
        Ok(fields)
    }
}

impl DataTypeCodec for DynamicStructCodec {
    fn type_name(&self) -> &str {
        &self.info.name
    }

    fn decode(&self, decoder: &mut dyn UaDecoder) -> EncodingResult<Box<dyn UaStructure>> {
        let definition = &self.info.definition;
        let fields = match definition.structure_type {
            Enumeration::Known(StructureType::Structure)
            | Enumeration::Known(StructureType::StructureWithSubtypedValues) => {
                decode_present_fields(definition, decoder, |_, _| true)?
            }
            Enumeration::Known(StructureType::StructureWithOptionalFields) => {
                definition.check_optional_fields()?;
                let encoding_mask = decoder.uint32("EncodingMask")?;
                decode_present_fields(definition, decoder, |_, k| {
                    encoding_mask & (1 << k) != 0
                })?
            }
            Enumeration::Known(StructureType::Union) => self.decode_union(decoder, false)?,
            Enumeration::Known(StructureType::UnionWithSubtypedValues) => {
                self.decode_union(decoder, true)?
            }
            Enumeration::Unknown(v) => return Err(unknown_structure_type(v)),
        };
        Ok(Box::new(self.new_value(fields)))
    }

    fn encode(&self, encoder: &mut dyn UaEncoder, value: &dyn UaStructure) -> EncodingResult<()> {
        match value.downcast_ref::<DynamicStruct>() {
            Some(v) if v.info.type_id == self.info.type_id => v.encode_dyn(encoder),
            _ => {
                error!(
                    "Codec for {} was asked to encode a {}",
                    self.info.name,
                    value.type_name()
                );
                Err(EncodingError::type_mismatch(&self.info.name, value.type_name()))
            }
        }
    }

    fn structure_definition(&self) -> StructureDefinition {
        self.info.definition.clone()
    }
}
