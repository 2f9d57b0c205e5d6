// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0
// Copyright (C) 2017-2022 Adam Lock

//! Contains the implementation of `DiagnosticInfo`.

use std::io::{Read, Write};

use crate::types::{encoding::*, status_code::StatusCode, string::UAString};

bitflags! {
    pub struct DiagnosticInfoMask: u8 {
        const HAS_SYMBOLIC_ID = 0x01;
        const HAS_NAMESPACE = 0x02;
        const HAS_LOCALIZED_TEXT = 0x04;
        const HAS_LOCALE = 0x08;
        const HAS_ADDITIONAL_INFO = 0x10;
        const HAS_INNER_STATUS_CODE = 0x20;
        const HAS_INNER_DIAGNOSTIC_INFO = 0x40;
    }
}

bitflags! {
    /// The diagnostics a client asks for in the `return_diagnostics` of a request header.
    #[derive(Default, Serialize, Deserialize)]
    pub struct DiagnosticBits: u32 {
        const SERVICE_LEVEL_SYMBOLIC_ID = 0x0000_0001;
        const SERVICE_LEVEL_LOCALIZED_TEXT = 0x0000_0002;
        const SERVICE_LEVEL_ADDITIONAL_INFO = 0x0000_0004;
        const SERVICE_LEVEL_INNER_STATUS_CODE = 0x0000_0008;
        const SERVICE_LEVEL_INNER_DIAGNOSTICS = 0x0000_0010;
        const OPERATIONAL_LEVEL_SYMBOLIC_ID = 0x0000_0020;
        const OPERATIONAL_LEVEL_LOCALIZED_TEXT = 0x0000_0040;
        const OPERATIONAL_LEVEL_ADDITIONAL_INFO = 0x0000_0080;
        const OPERATIONAL_LEVEL_INNER_STATUS_CODE = 0x0000_0100;
        const OPERATIONAL_LEVEL_INNER_DIAGNOSTICS = 0x0000_0200;
    }
}

/// Diagnostic information. The string members are indexes into the string table of the response
/// header that carries them.
#[derive(PartialEq, Eq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiagnosticInfo {
    /// A symbolic name for the status code.
    pub symbolic_id: Option<i32>,
    /// A namespace that qualifies the symbolic id.
    pub namespace_uri: Option<i32>,
    /// The locale used for the localized text.
    pub locale: Option<i32>,
    /// A human readable summary of the status code.
    pub localized_text: Option<i32>,
    /// Detailed application specific diagnostic information.
    pub additional_info: Option<UAString>,
    /// A status code provided by an underlying system.
    pub inner_status_code: Option<StatusCode>,
    /// Diagnostic info associated with the inner status code.
    pub inner_diagnostic_info: Option<Box<DiagnosticInfo>>,
}

impl BinaryEncoder<DiagnosticInfo> for DiagnosticInfo {
    fn byte_len(&self) -> usize {
        let mut size: usize = 1;
        size += self.symbolic_id.map(|_| 4).unwrap_or(0);
        size += self.namespace_uri.map(|_| 4).unwrap_or(0);
        size += self.locale.map(|_| 4).unwrap_or(0);
        size += self.localized_text.map(|_| 4).unwrap_or(0);
        size += self
            .additional_info
            .as_ref()
            .map(|v| v.byte_len())
            .unwrap_or(0);
        size += self.inner_status_code.map(|_| 4).unwrap_or(0);
        size += self
            .inner_diagnostic_info
            .as_ref()
            .map(|v| v.byte_len())
            .unwrap_or(0);
        size
    }

    fn encode<S: Write>(&self, stream: &mut S) -> EncodingResult<usize> {
        let mut size = write_u8(stream, self.encoding_mask().bits())?;
        // Locale precedes localized text on the wire even though its mask bit is higher
        for value in [
            self.symbolic_id,
            self.namespace_uri,
            self.locale,
            self.localized_text,
        ]
        .iter()
        .flatten()
        {
            size += write_i32(stream, *value)?;
        }
        if let Some(ref additional_info) = self.additional_info {
            size += additional_info.encode(stream)?;
        }
        if let Some(ref inner_status_code) = self.inner_status_code {
            size += inner_status_code.encode(stream)?;
        }
        if let Some(ref inner_diagnostic_info) = self.inner_diagnostic_info {
            size += inner_diagnostic_info.encode(stream)?;
        }
        Ok(size)
    }

    fn decode<S: Read>(stream: &mut S, decoding_options: &DecodingOptions) -> EncodingResult<Self> {
        let encoding_mask = DiagnosticInfoMask::from_bits_truncate(read_u8(stream)?);
        let mut diagnostic_info = DiagnosticInfo::default();

        if encoding_mask.contains(DiagnosticInfoMask::HAS_SYMBOLIC_ID) {
            diagnostic_info.symbolic_id = Some(read_i32(stream)?);
        }
        if encoding_mask.contains(DiagnosticInfoMask::HAS_NAMESPACE) {
            diagnostic_info.namespace_uri = Some(read_i32(stream)?);
        }
        if encoding_mask.contains(DiagnosticInfoMask::HAS_LOCALE) {
            diagnostic_info.locale = Some(read_i32(stream)?);
        }
        if encoding_mask.contains(DiagnosticInfoMask::HAS_LOCALIZED_TEXT) {
            diagnostic_info.localized_text = Some(read_i32(stream)?);
        }
        if encoding_mask.contains(DiagnosticInfoMask::HAS_ADDITIONAL_INFO) {
            diagnostic_info.additional_info = Some(UAString::decode(stream, decoding_options)?);
        }
        if encoding_mask.contains(DiagnosticInfoMask::HAS_INNER_STATUS_CODE) {
            diagnostic_info.inner_status_code = Some(StatusCode::decode(stream, decoding_options)?);
        }
        if encoding_mask.contains(DiagnosticInfoMask::HAS_INNER_DIAGNOSTIC_INFO) {
            let _depth_lock = decoding_options.depth_lock()?;
            diagnostic_info.inner_diagnostic_info =
                Some(Box::new(DiagnosticInfo::decode(stream, decoding_options)?));
        }
        Ok(diagnostic_info)
    }
}

impl DiagnosticInfo {
    pub fn null() -> DiagnosticInfo {
        DiagnosticInfo::default()
    }

    pub fn is_null(&self) -> bool {
        self.encoding_mask().is_empty()
    }

    pub fn encoding_mask(&self) -> DiagnosticInfoMask {
        let mut encoding_mask = DiagnosticInfoMask::empty();
        encoding_mask.set(DiagnosticInfoMask::HAS_SYMBOLIC_ID, self.symbolic_id.is_some());
        encoding_mask.set(DiagnosticInfoMask::HAS_NAMESPACE, self.namespace_uri.is_some());
        encoding_mask.set(DiagnosticInfoMask::HAS_LOCALE, self.locale.is_some());
        encoding_mask.set(
            DiagnosticInfoMask::HAS_LOCALIZED_TEXT,
            self.localized_text.is_some(),
        );
        encoding_mask.set(
            DiagnosticInfoMask::HAS_ADDITIONAL_INFO,
            self.additional_info.is_some(),
        );
        encoding_mask.set(
            DiagnosticInfoMask::HAS_INNER_STATUS_CODE,
            self.inner_status_code.is_some(),
        );
        encoding_mask.set(
            DiagnosticInfoMask::HAS_INNER_DIAGNOSTIC_INFO,
            self.inner_diagnostic_info.is_some(),
        );
        encoding_mask
    }
}
