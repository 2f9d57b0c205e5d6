// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0
// Copyright (C) 2017-2022 Adam Lock

use crate::types::{
    codec::{UaDecoder, UaEncoder},
    date_time::DateTime,
    encoding::EncodingResult,
    extension_object::ExtensionObject,
    node_id::NodeId,
    node_ids::{DataTypeId, ObjectId},
    string::UAString,
    structure::{FieldInfo, StructureType},
};

/// The `RequestHeader` contains information common to every request from a client to the server.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestHeader {
    /// The secret session identifier used to verify that the request is associated with
    /// the session.
    pub authentication_token: NodeId,
    /// The time the Client sent the request.
    pub timestamp: DateTime,
    /// A requestHandle associated with the request. The client defines the value and the
    /// server returns it in the response.
    pub request_handle: u32,
    /// A bit mask that identifies the types of vendor-specific diagnostics to be returned.
    pub return_diagnostics: u32,
    /// An identifier that identifies the Client's security audit log entry associated with
    /// this request.
    pub audit_entry_id: UAString,
    /// How long in milliseconds the client expects to wait for a response, 0 for no timeout.
    pub timeout_hint: u32,
    /// Reserved for future use.
    pub additional_header: ExtensionObject,
}

impl Default for RequestHeader {
    fn default() -> Self {
        RequestHeader::dummy()
    }
}

impl StructureType for RequestHeader {
    const NAME: &'static str = "RequestHeader";
    const TYPE_ID: NodeId = DataTypeId::RequestHeader.node_id();
    const BINARY_ENCODING_ID: NodeId = ObjectId::RequestHeader_Encoding_DefaultBinary.node_id();
    const XML_ENCODING_ID: NodeId = ObjectId::RequestHeader_Encoding_DefaultXml.node_id();
    const JSON_ENCODING_ID: NodeId = ObjectId::RequestHeader_Encoding_DefaultJson.node_id();
    const FIELDS: &'static [FieldInfo] = &[
        FieldInfo::scalar("AuthenticationToken", DataTypeId::NodeId),
        FieldInfo::scalar("Timestamp", DataTypeId::UtcTime),
        FieldInfo::scalar("RequestHandle", DataTypeId::IntegerId),
        FieldInfo::scalar("ReturnDiagnostics", DataTypeId::UInt32),
        FieldInfo::scalar("AuditEntryId", DataTypeId::String),
        FieldInfo::scalar("TimeoutHint", DataTypeId::UInt32),
        FieldInfo::scalar("AdditionalHeader", DataTypeId::Structure),
    ];

    fn encode_fields(&self, encoder: &mut dyn UaEncoder) -> EncodingResult<()> {
        encoder.node_id("AuthenticationToken", &self.authentication_token)?;
        encoder.date_time("Timestamp", &self.timestamp)?;
        encoder.uint32("RequestHandle", self.request_handle)?;
        encoder.uint32("ReturnDiagnostics", self.return_diagnostics)?;
        encoder.string("AuditEntryId", &self.audit_entry_id)?;
        encoder.uint32("TimeoutHint", self.timeout_hint)?;
        encoder.extension_object("AdditionalHeader", &self.additional_header)
    }

    fn decode_fields(decoder: &mut dyn UaDecoder) -> EncodingResult<Self> {
        Ok(RequestHeader {
            authentication_token: decoder.node_id("AuthenticationToken")?,
            timestamp: decoder.date_time("Timestamp")?,
            request_handle: decoder.uint32("RequestHandle")?,
            return_diagnostics: decoder.uint32("ReturnDiagnostics")?,
            audit_entry_id: decoder.string("AuditEntryId")?,
            timeout_hint: decoder.uint32("TimeoutHint")?,
            additional_header: decoder.extension_object("AdditionalHeader")?,
        })
    }
}

impl RequestHeader {
    pub fn new(authentication_token: &NodeId, timestamp: &DateTime, request_handle: u32) -> Self {
        RequestHeader {
            authentication_token: authentication_token.clone(),
            timestamp: *timestamp,
            request_handle,
            return_diagnostics: 0,
            audit_entry_id: UAString::null(),
            timeout_hint: 0,
            additional_header: ExtensionObject::null(),
        }
    }

    pub fn dummy() -> Self {
        RequestHeader::new(&NodeId::null(), &DateTime::now(), 1)
    }
}
