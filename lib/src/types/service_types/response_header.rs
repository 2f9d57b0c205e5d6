// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0
// Copyright (C) 2017-2022 Adam Lock

use crate::types::{
    codec::{UaDecoder, UaEncoder},
    date_time::DateTime,
    diagnostic_info::DiagnosticInfo,
    encoding::EncodingResult,
    extension_object::ExtensionObject,
    node_id::NodeId,
    node_ids::{DataTypeId, ObjectId},
    service_types::RequestHeader,
    status_code::StatusCode,
    string::UAString,
    structure::{FieldInfo, StructureType},
};

/// The `ResponseHeader` contains information common to every response from server to client.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseHeader {
    pub timestamp: DateTime,
    pub request_handle: u32,
    pub service_result: StatusCode,
    pub service_diagnostics: DiagnosticInfo,
    pub string_table: Option<Vec<UAString>>,
    pub additional_header: ExtensionObject,
}

impl StructureType for ResponseHeader {
    const NAME: &'static str = "ResponseHeader";
    const TYPE_ID: NodeId = DataTypeId::ResponseHeader.node_id();
    const BINARY_ENCODING_ID: NodeId = ObjectId::ResponseHeader_Encoding_DefaultBinary.node_id();
    const XML_ENCODING_ID: NodeId = ObjectId::ResponseHeader_Encoding_DefaultXml.node_id();
    const JSON_ENCODING_ID: NodeId = ObjectId::ResponseHeader_Encoding_DefaultJson.node_id();
    const FIELDS: &'static [FieldInfo] = &[
        FieldInfo::scalar("Timestamp", DataTypeId::UtcTime),
        FieldInfo::scalar("RequestHandle", DataTypeId::IntegerId),
        FieldInfo::scalar("ServiceResult", DataTypeId::StatusCode),
        FieldInfo::scalar("ServiceDiagnostics", DataTypeId::DiagnosticInfo),
        FieldInfo::array("StringTable", DataTypeId::String),
        FieldInfo::scalar("AdditionalHeader", DataTypeId::Structure),
    ];

    fn encode_fields(&self, encoder: &mut dyn UaEncoder) -> EncodingResult<()> {
        encoder.date_time("Timestamp", &self.timestamp)?;
        encoder.uint32("RequestHandle", self.request_handle)?;
        encoder.status_code("ServiceResult", self.service_result)?;
        encoder.diagnostic_info("ServiceDiagnostics", &self.service_diagnostics)?;
        encoder.string_array("StringTable", &self.string_table)?;
        encoder.extension_object("AdditionalHeader", &self.additional_header)
    }

    fn decode_fields(decoder: &mut dyn UaDecoder) -> EncodingResult<Self> {
        Ok(ResponseHeader {
            timestamp: decoder.date_time("Timestamp")?,
            request_handle: decoder.uint32("RequestHandle")?,
            service_result: decoder.status_code("ServiceResult")?,
            service_diagnostics: decoder.diagnostic_info("ServiceDiagnostics")?,
            string_table: decoder.string_array("StringTable")?,
            additional_header: decoder.extension_object("AdditionalHeader")?,
        })
    }
}

impl ResponseHeader {
    pub fn new_good(request_header: &RequestHeader) -> ResponseHeader {
        ResponseHeader::new_service_result(request_header, StatusCode::Good)
    }

    pub fn new_service_result(
        request_header: &RequestHeader,
        service_result: StatusCode,
    ) -> ResponseHeader {
        ResponseHeader::new_timestamped_service_result(
            DateTime::now(),
            request_header,
            service_result,
        )
    }

    pub fn new_timestamped_service_result(
        timestamp: DateTime,
        request_header: &RequestHeader,
        service_result: StatusCode,
    ) -> ResponseHeader {
        ResponseHeader {
            timestamp,
            request_handle: request_header.request_handle,
            service_result,
            service_diagnostics: DiagnosticInfo::default(),
            string_table: None,
            additional_header: ExtensionObject::null(),
        }
    }
}
