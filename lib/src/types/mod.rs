// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0
// Copyright (C) 2017-2022 Adam Lock

//! The OPC UA types module contains the builtin data types, the node ids that identify types and
//! encodings, and the binary, XML and JSON encodings of them.
//!
//! Structures are read and written through the `UaEncoder` / `UaDecoder` traits, one
//! implementation per wire format. The codecs of structures are looked up by encoding id in a
//! `TypeRegistry`, which is how the body of an `ExtensionObject` is decoded on demand.

pub mod constants {
    /// Maximum number of elements in an array
    pub const MAX_ARRAY_LENGTH: usize = 100_000;
    /// Maximum size of a string in bytes
    pub const MAX_STRING_LENGTH: usize = 65535;
    /// Maximum size of a byte string in bytes
    pub const MAX_BYTE_STRING_LENGTH: usize = 65535;
    /// Maximum size of a message
    pub const MAX_MESSAGE_SIZE: usize = 65535 * 32;
    /// Default maximum decoding depth for recursive data structures, i.e. if data is nested deeper
    /// than this it is an error during decoding. This is a security measure to stop deeply nested
    /// junk being sent to a server / client.
    pub const MAX_DECODING_DEPTH: usize = 10;
}

pub mod array;
pub mod basic_types;
pub mod binary_codec;
pub mod byte_string;
pub mod codec;
pub mod data_value;
pub mod date_time;
pub mod diagnostic_info;
pub mod encoding;
pub mod enums;
pub mod expanded_node_id;
pub mod extension_object;
pub mod guid;
pub mod json_codec;
pub mod localized_text;
pub mod namespaces;
pub mod node_id;
pub mod node_ids;
pub mod qualified_name;
pub mod service_types;
pub mod status_code;
pub mod string;
pub mod structure;
pub mod structure_definition;
pub mod type_registry;
pub mod variant;
pub mod variant_type_id;
pub mod xml_codec;

pub use self::{
    array::*,
    binary_codec::*,
    byte_string::*,
    codec::*,
    data_value::*,
    date_time::*,
    diagnostic_info::*,
    encoding::*,
    enums::*,
    expanded_node_id::*,
    extension_object::*,
    guid::*,
    json_codec::*,
    localized_text::*,
    namespaces::*,
    node_id::*,
    node_ids::*,
    qualified_name::*,
    status_code::*,
    string::*,
    structure::*,
    structure_definition::{
        decode_generic, encode_generic, DynamicStruct, DynamicStructCodec, GenericFields,
        StructureDefinition, StructureField, StructureType as StructureKind,
    },
    type_registry::*,
    variant::*,
    variant_type_id::*,
    xml_codec::*,
};

#[cfg(test)]
mod tests;
