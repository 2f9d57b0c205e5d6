// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0
// Copyright (C) 2017-2022 Adam Lock

//! Contains the definition of `LocalizedText`.
use std::{
    fmt,
    io::{Read, Write},
};

use crate::types::{encoding::*, string::*};

/// A human readable text with an optional locale identifier.
#[derive(PartialEq, Eq, Hash, Default, Debug, Clone, Serialize, Deserialize)]
pub struct LocalizedText {
    /// The locale. Omitted from stream if null.
    pub locale: UAString,
    /// The text in the specified locale. Omitted from stream if null.
    pub text: UAString,
}

// Bits of the encoding mask
const HAS_LOCALE: u8 = 0x1;
const HAS_TEXT: u8 = 0x2;

impl<'a> From<&'a str> for LocalizedText {
    fn from(value: &'a str) -> Self {
        Self {
            locale: UAString::null(),
            text: UAString::from(value),
        }
    }
}

impl From<String> for LocalizedText {
    fn from(value: String) -> Self {
        Self {
            locale: UAString::null(),
            text: UAString::from(value),
        }
    }
}

impl fmt::Display for LocalizedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text)
    }
}

impl BinaryEncoder<LocalizedText> for LocalizedText {
    fn byte_len(&self) -> usize {
        let mut size = 1;
        if !self.locale.is_null() {
            size += self.locale.byte_len();
        }
        if !self.text.is_null() {
            size += self.text.byte_len();
        }
        size
    }

    fn encode<S: Write>(&self, stream: &mut S) -> EncodingResult<usize> {
        let mut size = self.encoding_mask().encode(stream)?;
        if !self.locale.is_null() {
            size += self.locale.encode(stream)?;
        }
        if !self.text.is_null() {
            size += self.text.encode(stream)?;
        }
        Ok(size)
    }

    fn decode<S: Read>(stream: &mut S, decoding_options: &DecodingOptions) -> EncodingResult<Self> {
        let encoding_mask = u8::decode(stream, decoding_options)?;
        let locale = if encoding_mask & HAS_LOCALE != 0 {
            UAString::decode(stream, decoding_options)?
        } else {
            UAString::null()
        };
        let text = if encoding_mask & HAS_TEXT != 0 {
            UAString::decode(stream, decoding_options)?
        } else {
            UAString::null()
        };
        Ok(LocalizedText { locale, text })
    }
}

impl LocalizedText {
    pub fn new(locale: &str, text: &str) -> LocalizedText {
        LocalizedText {
            locale: UAString::from(locale),
            text: UAString::from(text),
        }
    }

    pub fn null() -> LocalizedText {
        LocalizedText::default()
    }

    pub fn is_null(&self) -> bool {
        self.locale.is_null() && self.text.is_null()
    }

    fn encoding_mask(&self) -> u8 {
        let mut encoding_mask = 0;
        if !self.locale.is_null() {
            encoding_mask |= HAS_LOCALE;
        }
        if !self.text.is_null() {
            encoding_mask |= HAS_TEXT;
        }
        encoding_mask
    }
}
