// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0
// Copyright (C) 2017-2022 Adam Lock

//! Well known namespace 0 node ids used by the encoding layer.

use std::convert::TryFrom;

use crate::types::{encoding::EncodingError, node_id::NodeId};

macro_rules! node_id_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident = $value:literal,)* }) => {
        $(#[$meta])*
        #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant = $value,)*
        }

        impl $name {
            pub const fn node_id(self) -> NodeId {
                NodeId::numeric(0, self as u32)
            }
        }

        impl From<$name> for NodeId {
            fn from(v: $name) -> Self {
                v.node_id()
            }
        }

        impl TryFrom<u32> for $name {
            type Error = u32;

            fn try_from(value: u32) -> Result<Self, Self::Error> {
                match value {
                    $($value => Ok($name::$variant),)*
                    _ => Err(value),
                }
            }
        }

        impl<'a> TryFrom<&'a NodeId> for $name {
            type Error = EncodingError;

            fn try_from(value: &'a NodeId) -> Result<Self, Self::Error> {
                match value.as_u32() {
                    Some(id) if value.namespace == 0 => {
                        $name::try_from(id).map_err(|_| EncodingError::UnknownType(value.clone()))
                    }
                    _ => Err(EncodingError::UnknownType(value.clone())),
                }
            }
        }

        impl PartialEq<$name> for NodeId {
            fn eq(&self, other: &$name) -> bool {
                self.namespace == 0 && self.as_u32() == Some(*other as u32)
            }
        }
    };
}

node_id_enum! {
    /// Data type node ids. The builtin types 1 to 25 double as the type tags of the `Variant`
    /// encoding mask.
    DataTypeId {
        Boolean = 1,
        SByte = 2,
        Byte = 3,
        Int16 = 4,
        UInt16 = 5,
        Int32 = 6,
        UInt32 = 7,
        Int64 = 8,
        UInt64 = 9,
        Float = 10,
        Double = 11,
        String = 12,
        DateTime = 13,
        Guid = 14,
        ByteString = 15,
        XmlElement = 16,
        NodeId = 17,
        ExpandedNodeId = 18,
        StatusCode = 19,
        QualifiedName = 20,
        LocalizedText = 21,
        Structure = 22,
        DataValue = 23,
        BaseDataType = 24,
        DiagnosticInfo = 25,
        Number = 26,
        Integer = 27,
        UInteger = 28,
        Enumeration = 29,
        StructureDefinition = 99,
        EnumDefinition = 100,
        StructureField = 101,
        StructureType = 98,
        IntegerId = 288,
        Counter = 289,
        Duration = 290,
        NumericRange = 291,
        UtcTime = 294,
        LocaleId = 295,
        Argument = 296,
        NodeAttributes = 349,
        ObjectAttributes = 352,
        VariableAttributes = 355,
        MethodAttributes = 358,
        ObjectTypeAttributes = 361,
        VariableTypeAttributes = 364,
        ReferenceTypeAttributes = 367,
        DataTypeAttributes = 370,
        ViewAttributes = 373,
        RequestHeader = 389,
        ResponseHeader = 392,
        Index = 17588,
        GenericAttributeValue = 17606,
        GenericAttributes = 17607,
    }
}

node_id_enum! {
    /// Object node ids. These are the encoding ids that tag the body of an `ExtensionObject`.
    #[allow(non_camel_case_types)]
    ObjectId {
        StructureDefinition_Encoding_DefaultBinary = 122,
        EnumDefinition_Encoding_DefaultBinary = 123,
        Argument_Encoding_DefaultXml = 297,
        Argument_Encoding_DefaultBinary = 298,
        NodeAttributes_Encoding_DefaultXml = 350,
        NodeAttributes_Encoding_DefaultBinary = 351,
        ObjectAttributes_Encoding_DefaultXml = 353,
        ObjectAttributes_Encoding_DefaultBinary = 354,
        VariableAttributes_Encoding_DefaultXml = 356,
        VariableAttributes_Encoding_DefaultBinary = 357,
        MethodAttributes_Encoding_DefaultXml = 359,
        MethodAttributes_Encoding_DefaultBinary = 360,
        ObjectTypeAttributes_Encoding_DefaultXml = 362,
        ObjectTypeAttributes_Encoding_DefaultBinary = 363,
        VariableTypeAttributes_Encoding_DefaultXml = 365,
        VariableTypeAttributes_Encoding_DefaultBinary = 366,
        ReferenceTypeAttributes_Encoding_DefaultXml = 368,
        ReferenceTypeAttributes_Encoding_DefaultBinary = 369,
        DataTypeAttributes_Encoding_DefaultXml = 371,
        DataTypeAttributes_Encoding_DefaultBinary = 372,
        ViewAttributes_Encoding_DefaultXml = 374,
        ViewAttributes_Encoding_DefaultBinary = 375,
        RequestHeader_Encoding_DefaultXml = 390,
        RequestHeader_Encoding_DefaultBinary = 391,
        ResponseHeader_Encoding_DefaultXml = 393,
        ResponseHeader_Encoding_DefaultBinary = 394,
        StructureDefinition_Encoding_DefaultXml = 14798,
        EnumDefinition_Encoding_DefaultXml = 14799,
        StructureField_Encoding_DefaultXml = 14797,
        StructureField_Encoding_DefaultBinary = 14844,
        StructureField_Encoding_DefaultJson = 15065,
        StructureDefinition_Encoding_DefaultJson = 15066,
        EnumDefinition_Encoding_DefaultJson = 15067,
        Argument_Encoding_DefaultJson = 15081,
        RequestHeader_Encoding_DefaultJson = 15088,
        ResponseHeader_Encoding_DefaultJson = 15089,
        NodeAttributes_Encoding_DefaultJson = 15151,
        ObjectAttributes_Encoding_DefaultJson = 15152,
        VariableAttributes_Encoding_DefaultJson = 15153,
        MethodAttributes_Encoding_DefaultJson = 15157,
        ObjectTypeAttributes_Encoding_DefaultJson = 15158,
        VariableTypeAttributes_Encoding_DefaultJson = 15159,
        ReferenceTypeAttributes_Encoding_DefaultJson = 15160,
        DataTypeAttributes_Encoding_DefaultJson = 15161,
        ViewAttributes_Encoding_DefaultJson = 15162,
        GenericAttributeValue_Encoding_DefaultXml = 17608,
        GenericAttributes_Encoding_DefaultXml = 17609,
        GenericAttributeValue_Encoding_DefaultBinary = 17610,
        GenericAttributes_Encoding_DefaultBinary = 17611,
        GenericAttributeValue_Encoding_DefaultJson = 17612,
        GenericAttributes_Encoding_DefaultJson = 17613,
    }
}
