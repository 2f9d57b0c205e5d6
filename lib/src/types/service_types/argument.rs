// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0
// Copyright (C) 2017-2022 Adam Lock

use crate::types::{
    codec::{UaDecoder, UaEncoder},
    encoding::{EncodingError, EncodingResult},
    localized_text::LocalizedText,
    node_id::NodeId,
    node_ids::{DataTypeId, ObjectId},
    string::UAString,
    structure::{FieldInfo, StructureType},
};

// From OPC UA Part 3 - Address Space Model 1.03 Specification
//
// This Structured DataType defines a Method input or output argument specification. It is for
// example used in the input and output argument Properties for Methods. Its elements are described in
// Table23

#[derive(Clone, Debug, PartialEq)]
pub struct Argument {
    pub name: UAString,
    pub data_type: NodeId,
    pub value_rank: i32,
    pub array_dimensions: Option<Vec<u32>>,
    pub description: LocalizedText,
}

impl StructureType for Argument {
    const NAME: &'static str = "Argument";
    const TYPE_ID: NodeId = DataTypeId::Argument.node_id();
    const BINARY_ENCODING_ID: NodeId = ObjectId::Argument_Encoding_DefaultBinary.node_id();
    const XML_ENCODING_ID: NodeId = ObjectId::Argument_Encoding_DefaultXml.node_id();
    const JSON_ENCODING_ID: NodeId = ObjectId::Argument_Encoding_DefaultJson.node_id();
    const FIELDS: &'static [FieldInfo] = &[
        FieldInfo::scalar("Name", DataTypeId::String),
        FieldInfo::scalar("DataType", DataTypeId::NodeId),
        FieldInfo::scalar("ValueRank", DataTypeId::Int32),
        FieldInfo::array("ArrayDimensions", DataTypeId::UInt32),
        FieldInfo::scalar("Description", DataTypeId::LocalizedText),
    ];

    fn encode_fields(&self, encoder: &mut dyn UaEncoder) -> EncodingResult<()> {
        check_array_dimensions(self.value_rank, &self.array_dimensions)?;
        encoder.string("Name", &self.name)?;
        encoder.node_id("DataType", &self.data_type)?;
        encoder.int32("ValueRank", self.value_rank)?;
        encoder.uint32_array("ArrayDimensions", &self.array_dimensions)?;
        encoder.localized_text("Description", &self.description)
    }

    fn decode_fields(decoder: &mut dyn UaDecoder) -> EncodingResult<Self> {
        let name = decoder.string("Name")?;
        let data_type = decoder.node_id("DataType")?;
        let value_rank = decoder.int32("ValueRank")?;
        let array_dimensions = decoder.uint32_array("ArrayDimensions")?;
        check_array_dimensions(value_rank, &array_dimensions)?;
        let description = decoder.localized_text("Description")?;
        Ok(Argument {
            name,
            data_type,
            value_rank,
            array_dimensions,
            description,
        })
    }
}

/// Array dimensions, when there are any, must have one entry per dimension of the value rank
fn check_array_dimensions(value_rank: i32, array_dimensions: &Option<Vec<u32>>) -> EncodingResult<()> {
    match array_dimensions {
        Some(array_dimensions)
            if value_rank > 0
                && !array_dimensions.is_empty()
                && value_rank as usize != array_dimensions.len() =>
        {
            error!(
                "The array dimensions {} of the Argument should match value rank {} and they don't",
                array_dimensions.len(),
                value_rank
            );
            Err(EncodingError::DimensionMismatch {
                dimensions: array_dimensions.clone(),
                len: value_rank as usize,
            })
        }
        _ => Ok(()),
    }
}

impl Argument {
    pub fn new<S, T>(name: S, data_type: T, value_rank: i32, description: &str) -> Argument
    where
        S: Into<UAString>,
        T: Into<NodeId>,
    {
        Argument {
            name: name.into(),
            data_type: data_type.into(),
            value_rank,
            array_dimensions: None,
            description: LocalizedText::new("", description),
        }
    }
}
