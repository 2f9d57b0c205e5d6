// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0
// Copyright (C) 2017-2022 Adam Lock

//! Contains the `EncodingError` taxonomy, the decoding limits, the `BinaryEncoder` trait
//! implemented by every builtin type and helpers for reading and writing scalar values.

use std::{
    fmt::Debug,
    io::{self, Cursor, Read, Write},
    sync::Arc,
};

use byteorder::{ByteOrder, LittleEndian};
use thiserror::Error;

use crate::{
    sync::Mutex,
    types::{constants, node_id::NodeId, status_code::StatusCode},
};

/// Every way that encoding or decoding a value can fail.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EncodingError {
    #[error("malformed identifier \"{0}\"")]
    MalformedIdentifier(String),
    #[error("namespace \"{0}\" cannot be resolved")]
    UnknownNamespace(String),
    #[error("unexpected end of input")]
    UnexpectedEof,
    #[error("invalid length {length}, the limit is {limit}")]
    InvalidLength { length: i64, limit: usize },
    #[error("invalid encoding, {0}")]
    InvalidEncoding(String),
    #[error("no codec is registered for {0}")]
    UnknownType(NodeId),
    #[error("type mismatch, expected {expected} but found {found}")]
    TypeMismatch { expected: String, found: String },
    #[error("array dimensions {dimensions:?} do not describe {len} values")]
    DimensionMismatch { dimensions: Vec<u32>, len: usize },
    #[error("decoding depth exceeds the maximum of {0}")]
    DecodingDepthExceeded(usize),
    #[error("encoding id {0} is registered more than once")]
    DuplicateEncodingId(NodeId),
    #[error("stream error, {0}")]
    Io(String),
}

impl EncodingError {
    pub fn invalid_encoding<T: Into<String>>(message: T) -> Self {
        EncodingError::InvalidEncoding(message.into())
    }

    pub fn type_mismatch<E: ToString, F: ToString>(expected: E, found: F) -> Self {
        EncodingError::TypeMismatch {
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }

    /// The status code a service reports on the wire for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            EncodingError::MalformedIdentifier(_) => StatusCode::BadNodeIdInvalid,
            EncodingError::UnknownNamespace(_) => StatusCode::BadNodeIdUnknown,
            EncodingError::UnexpectedEof | EncodingError::InvalidEncoding(_) => {
                StatusCode::BadDecodingError
            }
            EncodingError::InvalidLength { .. } | EncodingError::DecodingDepthExceeded(_) => {
                StatusCode::BadEncodingLimitsExceeded
            }
            EncodingError::UnknownType(_) => StatusCode::BadDataEncodingUnsupported,
            EncodingError::TypeMismatch { .. } => StatusCode::BadTypeMismatch,
            EncodingError::DimensionMismatch { .. } => StatusCode::BadDataEncodingInvalid,
            EncodingError::DuplicateEncodingId(_) => StatusCode::BadConfigurationError,
            EncodingError::Io(_) => StatusCode::BadEncodingError,
        }
    }
}

impl From<io::Error> for EncodingError {
    fn from(err: io::Error) -> Self {
        if err.kind() == io::ErrorKind::UnexpectedEof {
            EncodingError::UnexpectedEof
        } else {
            EncodingError::Io(err.to_string())
        }
    }
}

pub type EncodingResult<T> = std::result::Result<T, EncodingError>;

/// Depth lock holds a reference on the depth gauge. The drop ensures impl that the reference is
/// decremented even if there is a panic unwind.
#[derive(Debug)]
pub struct DepthLock {
    depth_gauge: Arc<Mutex<DepthGauge>>,
}

impl Drop for DepthLock {
    fn drop(&mut self) {
        let mut dg = trace_lock!(self.depth_gauge);
        if dg.current_depth > 0 {
            dg.current_depth -= 1;
        }
    }
}

impl DepthLock {
    /// Tests if the depth can increment and then obtains a lock on it. The lock decrements the
    /// depth when it drops.
    pub fn obtain(depth_gauge: Arc<Mutex<DepthGauge>>) -> EncodingResult<DepthLock> {
        let mut dg = trace_lock!(depth_gauge);
        if dg.current_depth >= dg.max_depth {
            warn!(
                "Decoding aborted, maximum recursion depth {} reached",
                dg.max_depth
            );
            Err(EncodingError::DecodingDepthExceeded(dg.max_depth))
        } else {
            dg.current_depth += 1;
            drop(dg);
            Ok(Self { depth_gauge })
        }
    }
}

/// Depth gauge is used on potentially recursive structures like Variant, ExtensionObject,
/// DiagnosticInfo and nested structures during decoding to limit how deep the decoder goes.
#[derive(Debug)]
pub struct DepthGauge {
    /// Maximum decoding depth for recursive elements. Triggers when current depth equals max depth.
    pub(crate) max_depth: usize,
    /// Current decoding depth for recursive elements.
    pub(crate) current_depth: usize,
}

impl Default for DepthGauge {
    fn default() -> Self {
        Self::new(constants::MAX_DECODING_DEPTH)
    }
}

impl DepthGauge {
    pub fn new(max_depth: usize) -> Self {
        Self {
            max_depth,
            current_depth: 0,
        }
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn current_depth(&self) -> usize {
        self.current_depth
    }
}

/// Limits applied while decoding untrusted input.
///
/// Cloning the options shares the depth gauge. Every decoder calls `for_decoder()` so that
/// decoders running on different threads never share a gauge.
#[derive(Clone, Debug)]
pub struct DecodingOptions {
    /// Maximum size of a message in bytes. 0 means no limit.
    pub max_message_size: usize,
    /// Maximum length in bytes (not chars!) of a string. 0 actually means 0, i.e. no string permitted
    pub max_string_length: usize,
    /// Maximum length in bytes of a byte string. 0 actually means 0, i.e. no byte string permitted
    pub max_byte_string_length: usize,
    /// Maximum number of array elements. 0 actually means 0, i.e. no array permitted
    pub max_array_length: usize,
    /// Maximum nesting of recursive values
    pub max_decoding_depth: usize,
    /// Decoding depth gauge is used to check for recursion
    pub decoding_depth_gauge: Arc<Mutex<DepthGauge>>,
}

impl Default for DecodingOptions {
    fn default() -> Self {
        DecodingOptions {
            max_message_size: constants::MAX_MESSAGE_SIZE,
            max_string_length: constants::MAX_STRING_LENGTH,
            max_byte_string_length: constants::MAX_BYTE_STRING_LENGTH,
            max_array_length: constants::MAX_ARRAY_LENGTH,
            max_decoding_depth: constants::MAX_DECODING_DEPTH,
            decoding_depth_gauge: Arc::new(Mutex::new(DepthGauge::default())),
        }
    }
}

impl DecodingOptions {
    /// For test only. Having a separate function makes it easier to control calls to DecodingOptions::default().
    #[cfg(test)]
    pub fn test() -> Self {
        Self::default()
    }

    /// A copy of these limits with a depth gauge of its own.
    pub fn for_decoder(&self) -> Self {
        DecodingOptions {
            decoding_depth_gauge: Arc::new(Mutex::new(DepthGauge::new(self.max_decoding_depth))),
            ..self.clone()
        }
    }

    pub fn depth_lock(&self) -> EncodingResult<DepthLock> {
        DepthLock::obtain(self.decoding_depth_gauge.clone())
    }

    /// Validates a string length prefix, returning `None` for the null sentinel.
    pub fn check_string_length(&self, len: i32) -> EncodingResult<Option<usize>> {
        check_length(len, self.max_string_length)
    }

    /// Validates a byte string length prefix, returning `None` for the null sentinel.
    pub fn check_byte_string_length(&self, len: i32) -> EncodingResult<Option<usize>> {
        check_length(len, self.max_byte_string_length)
    }

    /// Validates an array count prefix, returning `None` for a null array.
    pub fn check_array_length(&self, len: i32) -> EncodingResult<Option<usize>> {
        check_length(len, self.max_array_length)
    }
}

fn check_length(len: i32, limit: usize) -> EncodingResult<Option<usize>> {
    if len == -1 {
        Ok(None)
    } else if len < -1 {
        error!("Length {} is negative and is not the null sentinel", len);
        Err(EncodingError::InvalidLength {
            length: len as i64,
            limit,
        })
    } else if len as usize > limit {
        error!("Length {} exceeds decoding limit {}", len, limit);
        Err(EncodingError::InvalidLength {
            length: len as i64,
            limit,
        })
    } else {
        Ok(Some(len as usize))
    }
}

/// OPC UA Binary Encoding interface. Every builtin type implements this. It provides functions to
/// calculate the size in bytes of the value (for allocating memory), encoding to a stream and
/// decoding from a stream.
pub trait BinaryEncoder<T> {
    /// Returns the exact byte length of the structure as it would be if `encode` were called.
    /// This may be called prior to writing to ensure the correct amount of space is available.
    fn byte_len(&self) -> usize;
    /// Encodes the instance to the write stream.
    fn encode<S: Write>(&self, stream: &mut S) -> EncodingResult<usize>;
    /// Decodes an instance from the read stream. The decoding options contains restrictions set by
    /// the server / client on the length of strings, arrays etc. If these limits are exceeded the
    /// implementation should return with an error as soon as possible.
    fn decode<S: Read>(stream: &mut S, decoding_options: &DecodingOptions) -> EncodingResult<T>;

    // Convenience method for encoding a message straight into an array of bytes. It is preferable to reuse buffers than
    // to call this so it should be reserved for tests and trivial code.
    fn encode_to_vec(&self) -> Vec<u8> {
        let mut buffer = Cursor::new(Vec::with_capacity(self.byte_len()));
        let _ = self.encode(&mut buffer);
        buffer.into_inner()
    }
}

/// Converts an IO encoding error (and logs when in error) into an EncodingResult
pub fn process_encode_io_result(result: io::Result<usize>) -> EncodingResult<usize> {
    result.map_err(|err| {
        trace!("Encoding error - {:?}", err);
        EncodingError::from(err)
    })
}

/// Converts an IO decoding error (and logs when in error) into an EncodingResult
pub fn process_decode_io_result<T>(result: io::Result<T>) -> EncodingResult<T>
where
    T: Debug,
{
    result.map_err(|err| {
        trace!("Decoding error - {:?}", err);
        EncodingError::from(err)
    })
}

/// Calculates the length in bytes of an array of encoded type
pub fn byte_len_array<T: BinaryEncoder<T>>(values: &Option<Vec<T>>) -> usize {
    let mut size = 4;
    if let Some(ref values) = values {
        size += values.iter().map(|v| v.byte_len()).sum::<usize>();
    }
    size
}

/// Write an array of the encoded type to stream, preserving distinction between null array and empty array
pub fn write_array<S: Write, T: BinaryEncoder<T>>(
    stream: &mut S,
    values: &Option<Vec<T>>,
) -> EncodingResult<usize> {
    let mut size = 0;
    if let Some(ref values) = values {
        size += write_i32(stream, values.len() as i32)?;
        for value in values.iter() {
            size += value.encode(stream)?;
        }
    } else {
        size += write_i32(stream, -1)?;
    }
    Ok(size)
}

/// Reads an array of the encoded type from a stream, preserving distinction between null array and empty array
pub fn read_array<S: Read, T: BinaryEncoder<T>>(
    stream: &mut S,
    decoding_options: &DecodingOptions,
) -> EncodingResult<Option<Vec<T>>> {
    let len = read_i32(stream)?;
    match decoding_options.check_array_length(len)? {
        None => Ok(None),
        Some(len) => {
            let mut values: Vec<T> = Vec::with_capacity(len);
            for _ in 0..len {
                values.push(T::decode(stream, decoding_options)?);
            }
            Ok(Some(values))
        }
    }
}

/// Writes an unsigned byte to the stream
pub fn write_u8<T>(stream: &mut dyn Write, value: T) -> EncodingResult<usize>
where
    T: Into<u8>,
{
    let buf: [u8; 1] = [value.into()];
    process_encode_io_result(stream.write_all(&buf).map(|_| buf.len()))
}

/// Writes a signed 16-bit value to the stream
pub fn write_i16<T>(stream: &mut dyn Write, value: T) -> EncodingResult<usize>
where
    T: Into<i16>,
{
    let mut buf = [0u8; 2];
    LittleEndian::write_i16(&mut buf, value.into());
    process_encode_io_result(stream.write_all(&buf).map(|_| buf.len()))
}

/// Writes an unsigned 16-bit value to the stream
pub fn write_u16<T>(stream: &mut dyn Write, value: T) -> EncodingResult<usize>
where
    T: Into<u16>,
{
    let mut buf = [0u8; 2];
    LittleEndian::write_u16(&mut buf, value.into());
    process_encode_io_result(stream.write_all(&buf).map(|_| buf.len()))
}

/// Writes a signed 32-bit value to the stream
pub fn write_i32<T>(stream: &mut dyn Write, value: T) -> EncodingResult<usize>
where
    T: Into<i32>,
{
    let mut buf = [0u8; 4];
    LittleEndian::write_i32(&mut buf, value.into());
    process_encode_io_result(stream.write_all(&buf).map(|_| buf.len()))
}

/// Writes an unsigned 32-bit value to the stream
pub fn write_u32<T>(stream: &mut dyn Write, value: T) -> EncodingResult<usize>
where
    T: Into<u32>,
{
    let mut buf = [0u8; 4];
    LittleEndian::write_u32(&mut buf, value.into());
    process_encode_io_result(stream.write_all(&buf).map(|_| buf.len()))
}

/// Writes a signed 64-bit value to the stream
pub fn write_i64<T>(stream: &mut dyn Write, value: T) -> EncodingResult<usize>
where
    T: Into<i64>,
{
    let mut buf = [0u8; 8];
    LittleEndian::write_i64(&mut buf, value.into());
    process_encode_io_result(stream.write_all(&buf).map(|_| buf.len()))
}

/// Writes an unsigned 64-bit value to the stream
pub fn write_u64<T>(stream: &mut dyn Write, value: T) -> EncodingResult<usize>
where
    T: Into<u64>,
{
    let mut buf = [0u8; 8];
    LittleEndian::write_u64(&mut buf, value.into());
    process_encode_io_result(stream.write_all(&buf).map(|_| buf.len()))
}

/// Writes a 32-bit precision value to the stream
pub fn write_f32<T>(stream: &mut dyn Write, value: T) -> EncodingResult<usize>
where
    T: Into<f32>,
{
    let mut buf = [0u8; 4];
    LittleEndian::write_f32(&mut buf, value.into());
    process_encode_io_result(stream.write_all(&buf).map(|_| buf.len()))
}

/// Writes a 64-bit precision value to the stream
pub fn write_f64<T>(stream: &mut dyn Write, value: T) -> EncodingResult<usize>
where
    T: Into<f64>,
{
    let mut buf = [0u8; 8];
    LittleEndian::write_f64(&mut buf, value.into());
    process_encode_io_result(stream.write_all(&buf).map(|_| buf.len()))
}

/// Writes raw bytes to the stream
pub fn write_bytes(stream: &mut dyn Write, buf: &[u8]) -> EncodingResult<usize> {
    process_encode_io_result(stream.write_all(buf).map(|_| buf.len()))
}

/// Reads an array of bytes from the stream
pub fn read_bytes(stream: &mut dyn Read, buf: &mut [u8]) -> EncodingResult<usize> {
    let result = stream.read_exact(buf);
    process_decode_io_result(result)?;
    Ok(buf.len())
}

/// Read an unsigned byte from the stream
pub fn read_u8(stream: &mut dyn Read) -> EncodingResult<u8> {
    let mut buf = [0u8];
    let result = stream.read_exact(&mut buf);
    process_decode_io_result(result)?;
    Ok(buf[0])
}

/// Read an signed 16-bit value from the stream
pub fn read_i16(stream: &mut dyn Read) -> EncodingResult<i16> {
    let mut buf = [0u8; 2];
    let result = stream.read_exact(&mut buf);
    process_decode_io_result(result)?;
    Ok(LittleEndian::read_i16(&buf))
}

/// Read an unsigned 16-bit value from the stream
pub fn read_u16(stream: &mut dyn Read) -> EncodingResult<u16> {
    let mut buf = [0u8; 2];
    let result = stream.read_exact(&mut buf);
    process_decode_io_result(result)?;
    Ok(LittleEndian::read_u16(&buf))
}

/// Read a signed 32-bit value from the stream
pub fn read_i32(stream: &mut dyn Read) -> EncodingResult<i32> {
    let mut buf = [0u8; 4];
    let result = stream.read_exact(&mut buf);
    process_decode_io_result(result)?;
    Ok(LittleEndian::read_i32(&buf))
}

/// Read an unsigned 32-bit value from the stream
pub fn read_u32(stream: &mut dyn Read) -> EncodingResult<u32> {
    let mut buf = [0u8; 4];
    let result = stream.read_exact(&mut buf);
    process_decode_io_result(result)?;
    Ok(LittleEndian::read_u32(&buf))
}

/// Read a signed 64-bit value from the stream
pub fn read_i64(stream: &mut dyn Read) -> EncodingResult<i64> {
    let mut buf = [0u8; 8];
    let result = stream.read_exact(&mut buf);
    process_decode_io_result(result)?;
    Ok(LittleEndian::read_i64(&buf))
}

/// Read an unsigned 64-bit value from the stream
pub fn read_u64(stream: &mut dyn Read) -> EncodingResult<u64> {
    let mut buf = [0u8; 8];
    let result = stream.read_exact(&mut buf);
    process_decode_io_result(result)?;
    Ok(LittleEndian::read_u64(&buf))
}

/// Read a 32-bit precision value from the stream
pub fn read_f32(stream: &mut dyn Read) -> EncodingResult<f32> {
    let mut buf = [0u8; 4];
    let result = stream.read_exact(&mut buf);
    process_decode_io_result(result)?;
    Ok(LittleEndian::read_f32(&buf))
}

/// Read a 64-bit precision from the stream
pub fn read_f64(stream: &mut dyn Read) -> EncodingResult<f64> {
    let mut buf = [0u8; 8];
    let result = stream.read_exact(&mut buf);
    process_decode_io_result(result)?;
    Ok(LittleEndian::read_f64(&buf))
}
