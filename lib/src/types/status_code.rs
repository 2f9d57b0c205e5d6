// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0
// Copyright (C) 2017-2022 Adam Lock

//! The `StatusCode` type. A status code is a 32-bit value where the top two bits are the severity,
//! the next 14 bits are the sub code and the low 16 bits carry info bits. Codes that the crate has
//! no name for are preserved unchanged.

use std::{
    fmt,
    io::{Read, Write},
};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::types::encoding::*;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct StatusCode(u32);

macro_rules! status_codes {
    ( $( $name:ident = $value:expr ),* $(,)? ) => {
        #[allow(non_upper_case_globals)]
        impl StatusCode {
            $( pub const $name: StatusCode = StatusCode($value); )*

            /// Returns the symbolic name of the status part of the code, if it is known.
            pub fn name(&self) -> Option<&'static str> {
                match self.status().0 {
                    $( $value => Some(stringify!($name)), )*
                    _ => None,
                }
            }
        }
    };
}

status_codes! {
    Good = 0,
    Uncertain = 0x4000_0000,
    Bad = 0x8000_0000,
    BadUnexpectedError = 0x8001_0000,
    BadInternalError = 0x8002_0000,
    BadOutOfMemory = 0x8003_0000,
    BadResourceUnavailable = 0x8004_0000,
    BadCommunicationError = 0x8005_0000,
    BadEncodingError = 0x8006_0000,
    BadDecodingError = 0x8007_0000,
    BadEncodingLimitsExceeded = 0x8008_0000,
    BadRequestTooLarge = 0x80B8_0000,
    BadResponseTooLarge = 0x80B9_0000,
    BadUnknownResponse = 0x8009_0000,
    BadTimeout = 0x800A_0000,
    BadServiceUnsupported = 0x800B_0000,
    BadShutdown = 0x800C_0000,
    BadServerNotConnected = 0x800D_0000,
    BadServerHalted = 0x800E_0000,
    BadNothingToDo = 0x800F_0000,
    BadTooManyOperations = 0x8010_0000,
    BadDataTypeIdUnknown = 0x8011_0000,
    BadCertificateInvalid = 0x8012_0000,
    BadUserAccessDenied = 0x801F_0000,
    BadNodeIdInvalid = 0x8033_0000,
    BadNodeIdUnknown = 0x8034_0000,
    BadAttributeIdInvalid = 0x8035_0000,
    BadIndexRangeInvalid = 0x8036_0000,
    BadIndexRangeNoData = 0x8037_0000,
    BadDataEncodingInvalid = 0x8038_0000,
    BadDataEncodingUnsupported = 0x8039_0000,
    BadNotReadable = 0x803A_0000,
    BadNotWritable = 0x803B_0000,
    BadOutOfRange = 0x803C_0000,
    BadNotSupported = 0x803D_0000,
    BadNotFound = 0x803E_0000,
    BadTypeMismatch = 0x8074_0000,
    BadArgumentsMissing = 0x8076_0000,
    BadConfigurationError = 0x8089_0000,
    BadInvalidArgument = 0x80AB_0000,
    BadInvalidState = 0x80AF_0000,
    UncertainInitialValue = 0x4092_0000,
    GoodClamped = 0x0030_0000,
}

impl StatusCode {
    /// Mask selecting the severity and sub code, i.e. everything but the info bits.
    pub const STATUS_MASK: u32 = 0xFFFF_0000;
    /// Mask selecting the info bits.
    pub const BIT_MASK: u32 = 0x0000_FFFF;

    pub const fn from_u32(value: u32) -> Self {
        StatusCode(value)
    }

    pub const fn bits(&self) -> u32 {
        self.0
    }

    /// Returns the status only, i.e. it masks out any bit flags that come with the status code
    pub fn status(&self) -> StatusCode {
        StatusCode(self.0 & Self::STATUS_MASK)
    }

    /// Returns the info bits of the status code
    pub fn info_bits(&self) -> u32 {
        self.0 & Self::BIT_MASK
    }

    /// Tests if the status code is bad
    pub fn is_bad(&self) -> bool {
        self.0 & 0x8000_0000 != 0
    }

    /// Tests if the status code is uncertain
    pub fn is_uncertain(&self) -> bool {
        self.0 & 0xC000_0000 == 0x4000_0000
    }

    /// Tests if the status code is good (i.e. not bad or uncertain)
    pub fn is_good(&self) -> bool {
        self.0 & 0xC000_0000 == 0
    }
}

impl From<u32> for StatusCode {
    fn from(value: u32) -> Self {
        StatusCode(value)
    }
}

impl From<StatusCode> for u32 {
    fn from(value: StatusCode) -> Self {
        value.0
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match (self.name(), self.info_bits()) {
            (Some(name), 0) => write!(f, "{}", name),
            (Some(name), bits) => write!(f, "{}+{:#06x}", name, bits),
            (None, _) => write!(f, "{:#010x}", self.0),
        }
    }
}

impl fmt::Debug for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "StatusCode({})", self)
    }
}

impl BinaryEncoder<StatusCode> for StatusCode {
    fn byte_len(&self) -> usize {
        4
    }

    fn encode<S: Write>(&self, stream: &mut S) -> EncodingResult<usize> {
        write_u32(stream, self.0)
    }

    fn decode<S: Read>(stream: &mut S, _: &DecodingOptions) -> EncodingResult<Self> {
        Ok(StatusCode(read_u32(stream)?))
    }
}

// Serialized as the raw code so that unknown codes survive a round trip
impl Serialize for StatusCode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u32(self.0)
    }
}

impl<'de> Deserialize<'de> for StatusCode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(StatusCode(u32::deserialize(deserializer)?))
    }
}
