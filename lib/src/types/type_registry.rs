// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0
// Copyright (C) 2017-2022 Adam Lock

//! The type registry maps encoding ids onto the codecs that read and write structures.
//!
//! A registry is assembled with a `TypeRegistryBuilder` and is immutable once built, so it can be
//! shared between any number of decoders through an `Arc`.

use std::{
    collections::{HashMap, HashSet},
    fmt,
    sync::Arc,
};

use crate::types::{
    codec::{EncodingFormat, UaDecoder, UaEncoder},
    encoding::{DecodingOptions, EncodingError, EncodingResult},
    namespaces::NamespaceTable,
    node_id::NodeId,
    node_ids::DataTypeId,
    service_types,
    structure::{DataTypeCodec, EncodingIds, StructCodec, StructureType, UaStructure},
    structure_definition::{DynamicStructCodec, StructureDefinition},
};

lazy_static! {
    static ref BUILTIN_TYPES: Arc<TypeRegistry> = Arc::new(
        TypeRegistryBuilder::new()
            .register_builtin_types()
            .build()
            .expect("builtin types have unique encoding ids")
    );
}

struct Registration {
    type_id: NodeId,
    ids: EncodingIds,
    codec: Arc<dyn DataTypeCodec>,
}

/// Collects codecs and enumerations and then builds an immutable `TypeRegistry`.
#[derive(Default)]
pub struct TypeRegistryBuilder {
    registrations: Vec<Registration>,
    enumerations: Vec<NodeId>,
}

impl TypeRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from every structure compiled into this crate
    pub fn with_builtin_types() -> Self {
        Self::new().register_builtin_types()
    }

    /// Registers a codec under the data type id and its encoding ids
    pub fn register<T>(mut self, type_id: T, codec: Arc<dyn DataTypeCodec>, ids: EncodingIds) -> Self
    where
        T: Into<NodeId>,
    {
        self.registrations.push(Registration {
            type_id: type_id.into(),
            ids,
            codec,
        });
        self
    }

    /// Registers a compiled structure
    pub fn register_type<T: StructureType>(self) -> Self {
        self.register(T::TYPE_ID, Arc::new(StructCodec::<T>::new()), T::encoding_ids())
    }

    /// Registers a structure that is described at runtime by its definition
    pub fn register_dynamic<S, T>(
        self,
        name: S,
        type_id: T,
        definition: StructureDefinition,
        ids: EncodingIds,
    ) -> Self
    where
        S: Into<String>,
        T: Into<NodeId>,
    {
        let type_id = type_id.into();
        let codec = DynamicStructCodec::new(name, type_id.clone(), definition, ids.clone());
        self.register(type_id, Arc::new(codec), ids)
    }

    /// Registers the data type id of an enumeration. Fields of the type are read as Int32.
    pub fn register_enumeration<T>(mut self, type_id: T) -> Self
    where
        T: Into<NodeId>,
    {
        self.enumerations.push(type_id.into());
        self
    }

    pub fn register_builtin_types(self) -> Self {
        self.register_type::<service_types::RequestHeader>()
            .register_type::<service_types::ResponseHeader>()
            .register_type::<service_types::Argument>()
            .register_type::<service_types::NodeAttributes>()
            .register_type::<service_types::ObjectAttributes>()
            .register_type::<service_types::VariableAttributes>()
            .register_type::<service_types::MethodAttributes>()
            .register_type::<service_types::ObjectTypeAttributes>()
            .register_type::<service_types::VariableTypeAttributes>()
            .register_type::<service_types::ReferenceTypeAttributes>()
            .register_type::<service_types::DataTypeAttributes>()
            .register_type::<service_types::ViewAttributes>()
            .register_type::<service_types::GenericAttributeValue>()
            .register_type::<service_types::GenericAttributes>()
            .register_type::<crate::types::structure_definition::StructureField>()
            .register_type::<StructureDefinition>()
            .register_enumeration(DataTypeId::StructureType)
    }

    /// Builds the registry. Every encoding id and type id may only be registered once.
    pub fn build(self) -> EncodingResult<TypeRegistry> {
        let mut registry = TypeRegistry {
            binary: HashMap::new(),
            xml: HashMap::new(),
            json: HashMap::new(),
            types: HashMap::new(),
            enumerations: self.enumerations.into_iter().collect(),
        };
        for r in self.registrations {
            for (table, id) in [
                (&mut registry.binary, &r.ids.binary),
                (&mut registry.xml, &r.ids.xml),
                (&mut registry.json, &r.ids.json),
            ] {
                if table.insert(id.clone(), r.codec.clone()).is_some() {
                    error!("Encoding id {} is registered more than once", id);
                    return Err(EncodingError::DuplicateEncodingId(id.clone()));
                }
            }
            if registry
                .types
                .insert(r.type_id.clone(), (r.codec, r.ids))
                .is_some()
            {
                error!("Data type {} is registered more than once", r.type_id);
                return Err(EncodingError::DuplicateEncodingId(r.type_id));
            }
        }
        debug!(
            "Type registry built with {} types and {} enumerations",
            registry.types.len(),
            registry.enumerations.len()
        );
        Ok(registry)
    }
}

/// Immutable lookup tables from encoding id to codec, one per wire format.
pub struct TypeRegistry {
    binary: HashMap<NodeId, Arc<dyn DataTypeCodec>>,
    xml: HashMap<NodeId, Arc<dyn DataTypeCodec>>,
    json: HashMap<NodeId, Arc<dyn DataTypeCodec>>,
    types: HashMap<NodeId, (Arc<dyn DataTypeCodec>, EncodingIds)>,
    enumerations: HashSet<NodeId>,
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("types", &self.types.len())
            .field("enumerations", &self.enumerations.len())
            .finish()
    }
}

impl TypeRegistry {
    /// The registry holding every structure compiled into this crate
    pub fn builtin() -> Arc<TypeRegistry> {
        BUILTIN_TYPES.clone()
    }

    pub fn binary_codec(&self, encoding_id: &NodeId) -> Option<&Arc<dyn DataTypeCodec>> {
        self.binary.get(encoding_id)
    }

    pub fn xml_codec(&self, encoding_id: &NodeId) -> Option<&Arc<dyn DataTypeCodec>> {
        self.xml.get(encoding_id)
    }

    pub fn json_codec(&self, encoding_id: &NodeId) -> Option<&Arc<dyn DataTypeCodec>> {
        self.json.get(encoding_id)
    }

    /// The codec for an encoding id in the table of the format
    pub fn codec(&self, format: EncodingFormat, encoding_id: &NodeId) -> Option<&Arc<dyn DataTypeCodec>> {
        match format {
            EncodingFormat::Binary => self.binary_codec(encoding_id),
            EncodingFormat::Xml => self.xml_codec(encoding_id),
            EncodingFormat::Json => self.json_codec(encoding_id),
        }
    }

    pub fn codec_for_type(&self, type_id: &NodeId) -> Option<&Arc<dyn DataTypeCodec>> {
        self.types.get(type_id).map(|(codec, _)| codec)
    }

    pub fn encoding_ids(&self, type_id: &NodeId) -> Option<&EncodingIds> {
        self.types.get(type_id).map(|(_, ids)| ids)
    }

    pub fn is_structure(&self, type_id: &NodeId) -> bool {
        self.types.contains_key(type_id)
    }

    pub fn is_enumeration(&self, type_id: &NodeId) -> bool {
        self.enumerations.contains(type_id)
    }

    /// Finds a codec by an encoding id of the format or, failing that, by data type id
    fn lookup(&self, format: EncodingFormat, id: &NodeId) -> EncodingResult<Arc<dyn DataTypeCodec>> {
        self.codec(format, id)
            .or_else(|| self.codec_for_type(id))
            .cloned()
            .ok_or_else(|| {
                error!("No {} codec is registered for {}", format, id);
                EncodingError::UnknownType(id.clone())
            })
    }

    /// Reads a structure field whose type the caller expects. An id the registry does not know
    /// is an error. The id may be an encoding id or a data type id.
    pub fn decode_struct(
        decoder: &mut dyn UaDecoder,
        field: &str,
        expected_id: &NodeId,
    ) -> EncodingResult<Box<dyn UaStructure>> {
        let codec = decoder
            .context()
            .registry
            .lookup(decoder.format(), expected_id)?;
        let _depth_lock = decoder.options().depth_lock()?;
        decoder.begin_struct(field)?;
        let value = codec.decode(decoder)?;
        decoder.end_struct()?;
        Ok(value)
    }

    /// Reads an array of structures of the expected type
    pub fn decode_struct_array(
        decoder: &mut dyn UaDecoder,
        field: &str,
        expected_id: &NodeId,
    ) -> EncodingResult<Option<Vec<Box<dyn UaStructure>>>> {
        let codec = decoder
            .context()
            .registry
            .lookup(decoder.format(), expected_id)?;
        match decoder.begin_array(field)? {
            None => Ok(None),
            Some(len) => {
                let mut values = Vec::with_capacity(len);
                for _ in 0..len {
                    let _depth_lock = decoder.options().depth_lock()?;
                    decoder.begin_struct(codec.type_name())?;
                    values.push(codec.decode(decoder)?);
                    decoder.end_struct()?;
                }
                decoder.end_array()?;
                Ok(Some(values))
            }
        }
    }

    /// Writes a structure through the codec registered for the encoding id
    pub fn encode_struct(
        &self,
        encoder: &mut dyn UaEncoder,
        field: &str,
        value: &dyn UaStructure,
        encoding_id: &NodeId,
    ) -> EncodingResult<()> {
        let codec = self.lookup(encoder.format(), encoding_id)?;
        encoder.begin_struct(field)?;
        codec.encode(encoder, value)?;
        encoder.end_struct()
    }
}

/// Everything a decoder needs besides the input: the registry to find codecs of nested
/// structures in, the namespace table and the decoding limits.
#[derive(Debug, Clone)]
pub struct EncodingContext {
    pub registry: Arc<TypeRegistry>,
    pub namespaces: Arc<NamespaceTable>,
    pub options: DecodingOptions,
}

impl Default for EncodingContext {
    fn default() -> Self {
        EncodingContext {
            registry: TypeRegistry::builtin(),
            namespaces: Arc::new(NamespaceTable::new()),
            options: DecodingOptions::default(),
        }
    }
}

impl EncodingContext {
    pub fn new(
        registry: Arc<TypeRegistry>,
        namespaces: Arc<NamespaceTable>,
        options: DecodingOptions,
    ) -> Self {
        EncodingContext {
            registry,
            namespaces,
            options,
        }
    }

    pub fn with_registry(registry: Arc<TypeRegistry>) -> Self {
        EncodingContext {
            registry,
            ..Default::default()
        }
    }
}
