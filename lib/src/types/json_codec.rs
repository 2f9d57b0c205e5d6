// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0
// Copyright (C) 2017-2022 Adam Lock

//! The JSON implementation of `UaEncoder` and `UaDecoder` using the reversible form.
//!
//! Structures are JSON objects with a member per field. Null members are left out of objects and
//! written as `null` inside arrays, a missing member reads as the null value.

use std::{str::FromStr, vec};

use serde_json::{Map, Number, Value};

use crate::types::{
    byte_string::ByteString,
    codec::{
        decode_builtin, decode_builtin_array, encode_builtin, EncodingFormat, UaDecoder,
        UaEncoder,
    },
    data_value::DataValue,
    date_time::DateTime,
    diagnostic_info::DiagnosticInfo,
    encoding::{DecodingOptions, EncodingError, EncodingResult},
    expanded_node_id::ExpandedNodeId,
    extension_object::{ExtensionObject, ExtensionObjectEncoding},
    guid::Guid,
    localized_text::LocalizedText,
    node_id::{Identifier, NodeId},
    qualified_name::QualifiedName,
    status_code::StatusCode,
    string::{UAString, XmlElement},
    structure::{StructureType, UaStructure},
    type_registry::EncodingContext,
    variant::Variant,
    variant_type_id::VariantTypeId,
};

const ID_TYPE_STRING: u64 = 1;
const ID_TYPE_GUID: u64 = 2;
const ID_TYPE_BYTE_STRING: u64 = 3;

const BODY_BYTE_STRING: u64 = 1;
const BODY_XML: u64 = 2;

fn float_to_json(value: f64) -> Value {
    if value.is_nan() {
        Value::from("NaN")
    } else if value.is_infinite() {
        Value::from(if value > 0.0 { "Infinity" } else { "-Infinity" })
    } else {
        Number::from_f64(value).map_or(Value::Null, Value::Number)
    }
}

/// The members of a node id object, the namespace is left to the caller
fn identifier_to_json(identifier: &Identifier, map: &mut Map<String, Value>) {
    let (id_type, id) = match identifier {
        Identifier::Numeric(v) => (None, Value::from(*v)),
        Identifier::String(v) => (Some(ID_TYPE_STRING), Value::from(v.as_ref())),
        Identifier::Guid(v) => (Some(ID_TYPE_GUID), Value::from(v.to_upper_string())),
        Identifier::ByteString(v) => (Some(ID_TYPE_BYTE_STRING), Value::from(v.as_base64())),
    };
    if let Some(id_type) = id_type {
        map.insert("IdType".to_string(), Value::from(id_type));
    }
    map.insert("Id".to_string(), id);
}

fn node_id_to_json(node_id: &NodeId) -> Map<String, Value> {
    let mut map = Map::new();
    identifier_to_json(&node_id.identifier, &mut map);
    if node_id.namespace != 0 {
        map.insert("Namespace".to_string(), Value::from(node_id.namespace));
    }
    map
}

fn invalid_json<T: std::fmt::Display>(field: &str, found: T) -> EncodingError {
    error!("Value of {} is not valid, found {}", field, found);
    EncodingError::invalid_encoding(format!("{} has an invalid value {}", field, found))
}

/// Writes values as a `serde_json::Value`
#[derive(Debug, Default)]
pub struct JsonStreamEncoder {
    stack: Vec<EncoderFrame>,
    root: Option<Value>,
}

#[derive(Debug)]
enum EncoderFrame {
    Object(String, Map<String, Value>),
    Array(String, Vec<Value>),
}

impl JsonStreamEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// The value written so far, `Null` when nothing was written
    pub fn into_value(self) -> Value {
        self.root.unwrap_or(Value::Null)
    }

    fn put(&mut self, field: &str, value: Value) {
        match self.stack.last_mut() {
            Some(EncoderFrame::Object(_, map)) => {
                if !value.is_null() {
                    map.insert(field.to_string(), value);
                }
            }
            Some(EncoderFrame::Array(_, values)) => values.push(value),
            None => self.root = Some(value),
        }
    }

    fn in_array(&self) -> bool {
        matches!(self.stack.last(), Some(EncoderFrame::Array(..)))
    }

    fn pop(&mut self) -> EncodingResult<EncoderFrame> {
        self.stack.pop().ok_or_else(|| {
            error!("End of JSON value without a matching begin");
            EncodingError::invalid_encoding("unbalanced JSON values")
        })
    }
}

impl UaEncoder for JsonStreamEncoder {
    fn format(&self) -> EncodingFormat {
        EncodingFormat::Json
    }

    fn boolean(&mut self, field: &str, value: bool) -> EncodingResult<()> {
        self.put(field, Value::Bool(value));
        Ok(())
    }

    fn sbyte(&mut self, field: &str, value: i8) -> EncodingResult<()> {
        self.put(field, Value::from(value));
        Ok(())
    }

    fn byte(&mut self, field: &str, value: u8) -> EncodingResult<()> {
        self.put(field, Value::from(value));
        Ok(())
    }

    fn int16(&mut self, field: &str, value: i16) -> EncodingResult<()> {
        self.put(field, Value::from(value));
        Ok(())
    }

    fn uint16(&mut self, field: &str, value: u16) -> EncodingResult<()> {
        self.put(field, Value::from(value));
        Ok(())
    }

    fn int32(&mut self, field: &str, value: i32) -> EncodingResult<()> {
        self.put(field, Value::from(value));
        Ok(())
    }

    fn uint32(&mut self, field: &str, value: u32) -> EncodingResult<()> {
        self.put(field, Value::from(value));
        Ok(())
    }

    fn int64(&mut self, field: &str, value: i64) -> EncodingResult<()> {
        // 64-bit integers do not survive a double
        self.put(field, Value::from(value.to_string()));
        Ok(())
    }

    fn uint64(&mut self, field: &str, value: u64) -> EncodingResult<()> {
        self.put(field, Value::from(value.to_string()));
        Ok(())
    }

    fn float(&mut self, field: &str, value: f32) -> EncodingResult<()> {
        let value = if value.is_finite() {
            // Through the decimal form so 0.1f32 is not written as 0.10000000149011612
            value.to_string().parse::<f64>().map_or(Value::Null, float_to_json)
        } else {
            float_to_json(value as f64)
        };
        self.put(field, value);
        Ok(())
    }

    fn double(&mut self, field: &str, value: f64) -> EncodingResult<()> {
        self.put(field, float_to_json(value));
        Ok(())
    }

    fn string(&mut self, field: &str, value: &UAString) -> EncodingResult<()> {
        let value = value.value().as_deref().map_or(Value::Null, Value::from);
        self.put(field, value);
        Ok(())
    }

    fn date_time(&mut self, field: &str, value: &DateTime) -> EncodingResult<()> {
        self.put(field, Value::from(value.to_iso8601()));
        Ok(())
    }

    fn guid(&mut self, field: &str, value: &Guid) -> EncodingResult<()> {
        self.put(field, Value::from(value.to_upper_string()));
        Ok(())
    }

    fn byte_string(&mut self, field: &str, value: &ByteString) -> EncodingResult<()> {
        let value = if value.is_null() {
            Value::Null
        } else {
            Value::from(value.as_base64())
        };
        self.put(field, value);
        Ok(())
    }

    fn xml_element(&mut self, field: &str, value: &XmlElement) -> EncodingResult<()> {
        self.string(field, value)
    }

    fn node_id(&mut self, field: &str, value: &NodeId) -> EncodingResult<()> {
        if value.is_null() && !self.in_array() {
            return Ok(());
        }
        self.put(field, Value::Object(node_id_to_json(value)));
        Ok(())
    }

    fn expanded_node_id(&mut self, field: &str, value: &ExpandedNodeId) -> EncodingResult<()> {
        if value.is_null() && !self.in_array() {
            return Ok(());
        }
        let mut map = Map::new();
        identifier_to_json(&value.node_id.identifier, &mut map);
        if let Some(uri) = value.namespace_uri.value() {
            map.insert("Namespace".to_string(), Value::from(uri.as_str()));
        } else if value.node_id.namespace != 0 {
            map.insert("Namespace".to_string(), Value::from(value.node_id.namespace));
        }
        if value.server_index != 0 {
            map.insert("ServerUri".to_string(), Value::from(value.server_index));
        }
        self.put(field, Value::Object(map));
        Ok(())
    }

    fn status_code(&mut self, field: &str, value: StatusCode) -> EncodingResult<()> {
        self.put(field, Value::from(u32::from(value)));
        Ok(())
    }

    fn qualified_name(&mut self, field: &str, value: &QualifiedName) -> EncodingResult<()> {
        self.begin_struct(field)?;
        self.string("Name", &value.name)?;
        if value.namespace_index != 0 {
            self.uint16("Uri", value.namespace_index)?;
        }
        self.end_struct()
    }

    fn localized_text(&mut self, field: &str, value: &LocalizedText) -> EncodingResult<()> {
        self.begin_struct(field)?;
        self.string("Locale", &value.locale)?;
        self.string("Text", &value.text)?;
        self.end_struct()
    }

    fn extension_object(&mut self, field: &str, value: &ExtensionObject) -> EncodingResult<()> {
        if value.is_null() {
            self.put(field, Value::Null);
            return Ok(());
        }
        self.begin_struct(field)?;
        match (&value.body, value.value()) {
            (ExtensionObjectEncoding::Json(body), _) => {
                self.node_id("TypeId", &value.node_id)?;
                self.put("Body", body.clone());
            }
            (_, Some(structure)) => {
                self.node_id("TypeId", &structure.encoding_id(EncodingFormat::Json))?;
                self.begin_struct("Body")?;
                structure.encode_dyn(self)?;
                self.end_struct()?;
            }
            (ExtensionObjectEncoding::ByteString(body), None) => {
                self.node_id("TypeId", &value.node_id)?;
                self.put("Encoding", Value::from(BODY_BYTE_STRING));
                self.byte_string("Body", body)?;
            }
            (ExtensionObjectEncoding::XmlElement(body), None) => {
                self.node_id("TypeId", &value.node_id)?;
                self.put("Encoding", Value::from(BODY_XML));
                self.xml_element("Body", body)?;
            }
            (ExtensionObjectEncoding::None, None) => {
                self.node_id("TypeId", &value.node_id)?;
            }
        }
        self.end_struct()
    }

    fn data_value(&mut self, field: &str, value: &DataValue) -> EncodingResult<()> {
        self.begin_struct(field)?;
        if let Some(ref v) = value.value {
            self.variant("Value", v)?;
        }
        if let Some(status) = value.status {
            self.status_code("Status", status)?;
        }
        if let Some(ref ts) = value.source_timestamp {
            self.date_time("SourceTimestamp", ts)?;
        }
        if let Some(pico) = value.source_picoseconds {
            self.uint16("SourcePicoseconds", pico)?;
        }
        if let Some(ref ts) = value.server_timestamp {
            self.date_time("ServerTimestamp", ts)?;
        }
        if let Some(pico) = value.server_picoseconds {
            self.uint16("ServerPicoseconds", pico)?;
        }
        self.end_struct()
    }

    fn variant(&mut self, field: &str, value: &Variant) -> EncodingResult<()> {
        if value.is_empty() {
            self.put(field, Value::Null);
            return Ok(());
        }
        self.begin_struct(field)?;
        self.put("Type", Value::from(value.type_id().encoding_mask()));
        match value {
            Variant::Array(array) => {
                let item = array.value_type().name();
                self.begin_array("Body", array.len())?;
                for value in array.values() {
                    encode_builtin(self, item, value)?;
                }
                self.end_array()?;
                if array.has_dimensions() {
                    self.uint32_array("Dimensions", &Some(array.dimensions().to_vec()))?;
                }
            }
            value => encode_builtin(self, "Body", value)?,
        }
        self.end_struct()
    }

    fn diagnostic_info(&mut self, field: &str, value: &DiagnosticInfo) -> EncodingResult<()> {
        self.begin_struct(field)?;
        if let Some(v) = value.symbolic_id {
            self.int32("SymbolicId", v)?;
        }
        if let Some(v) = value.namespace_uri {
            self.int32("NamespaceUri", v)?;
        }
        if let Some(v) = value.locale {
            self.int32("Locale", v)?;
        }
        if let Some(v) = value.localized_text {
            self.int32("LocalizedText", v)?;
        }
        if let Some(ref v) = value.additional_info {
            self.string("AdditionalInfo", v)?;
        }
        if let Some(v) = value.inner_status_code {
            self.status_code("InnerStatusCode", v)?;
        }
        if let Some(ref v) = value.inner_diagnostic_info {
            self.diagnostic_info("InnerDiagnosticInfo", v)?;
        }
        self.end_struct()
    }

    fn enumeration(&mut self, field: &str, value: i32, _symbol: Option<&str>) -> EncodingResult<()> {
        self.int32(field, value)
    }

    fn begin_struct(&mut self, field: &str) -> EncodingResult<()> {
        self.stack
            .push(EncoderFrame::Object(field.to_string(), Map::new()));
        Ok(())
    }

    fn end_struct(&mut self) -> EncodingResult<()> {
        match self.pop()? {
            EncoderFrame::Object(name, map) => {
                self.put(&name, Value::Object(map));
                Ok(())
            }
            EncoderFrame::Array(name, _) => {
                error!("End of structure found while writing array {}", name);
                Err(EncodingError::invalid_encoding("unbalanced JSON values"))
            }
        }
    }

    fn begin_array(&mut self, field: &str, len: usize) -> EncodingResult<()> {
        self.stack
            .push(EncoderFrame::Array(field.to_string(), Vec::with_capacity(len)));
        Ok(())
    }

    fn null_array(&mut self, field: &str) -> EncodingResult<()> {
        self.put(field, Value::Null);
        Ok(())
    }

    fn end_array(&mut self) -> EncodingResult<()> {
        match self.pop()? {
            EncoderFrame::Array(name, values) => {
                self.put(&name, Value::Array(values));
                Ok(())
            }
            EncoderFrame::Object(name, _) => {
                error!("End of array found while writing structure {}", name);
                Err(EncodingError::invalid_encoding("unbalanced JSON values"))
            }
        }
    }
}

#[derive(Debug)]
enum DecoderFrame {
    Object(Map<String, Value>),
    Array(vec::IntoIter<Value>),
}

/// Reads values from a `serde_json::Value`
pub struct JsonStreamDecoder<'a> {
    context: &'a EncodingContext,
    options: DecodingOptions,
    stack: Vec<DecoderFrame>,
}

impl<'a> JsonStreamDecoder<'a> {
    /// Creates a decoder over a single value. The first field read takes the value whatever it
    /// is named.
    pub fn new(value: &Value, context: &'a EncodingContext) -> Self {
        Self::with_frame(DecoderFrame::Array(vec![value.clone()].into_iter()), context)
    }

    /// Creates a decoder whose fields are the members of a JSON object
    pub fn from_body(value: &Value, context: &'a EncodingContext) -> EncodingResult<Self> {
        match value {
            Value::Object(map) => Ok(Self::with_frame(DecoderFrame::Object(map.clone()), context)),
            other => Err(invalid_json("body", other)),
        }
    }

    /// Parses JSON text holding an object whose members are the fields
    pub fn parse(json: &str, context: &'a EncodingContext) -> EncodingResult<Self> {
        let limit = context.options.max_message_size;
        if limit > 0 && json.len() > limit {
            error!("JSON of {} bytes exceeds the message size limit {}", json.len(), limit);
            return Err(EncodingError::InvalidLength {
                length: json.len() as i64,
                limit,
            });
        }
        let value: Value = serde_json::from_str(json).map_err(|err| {
            error!("Cannot parse JSON, {}", err);
            EncodingError::invalid_encoding(format!("malformed JSON, {}", err))
        })?;
        Self::from_body(&value, context)
    }

    fn with_frame(frame: DecoderFrame, context: &'a EncodingContext) -> Self {
        JsonStreamDecoder {
            context,
            options: context.options.for_decoder(),
            stack: vec![frame],
        }
    }

    /// Takes the value of a field out of the current object, or the next value of the current
    /// array. `null` reads as missing.
    fn take(&mut self, field: &str) -> EncodingResult<Option<Value>> {
        let value = match self.stack.last_mut() {
            Some(DecoderFrame::Object(map)) => map.remove(field),
            Some(DecoderFrame::Array(values)) => {
                Some(values.next().ok_or(EncodingError::UnexpectedEof)?)
            }
            None => return Err(EncodingError::invalid_encoding("unbalanced JSON values")),
        };
        Ok(value.filter(|v| !v.is_null()))
    }

    fn has_field(&self, field: &str) -> bool {
        match self.stack.last() {
            Some(DecoderFrame::Object(map)) => map.get(field).map_or(false, |v| !v.is_null()),
            _ => false,
        }
    }

    fn peek(&self, field: &str) -> Option<&Value> {
        match self.stack.last() {
            Some(DecoderFrame::Object(map)) => map.get(field),
            _ => None,
        }
    }

    fn take_object(&mut self, field: &str) -> EncodingResult<Option<Map<String, Value>>> {
        match self.take(field)? {
            None => Ok(None),
            Some(Value::Object(map)) => Ok(Some(map)),
            Some(other) => Err(invalid_json(field, other)),
        }
    }

    fn take_str(&mut self, field: &str) -> EncodingResult<Option<String>> {
        match self.take(field)? {
            None => Ok(None),
            Some(Value::String(s)) => {
                if s.len() > self.options.max_string_length {
                    error!(
                        "String of {} is {} bytes which exceeds the limit {}",
                        field,
                        s.len(),
                        self.options.max_string_length
                    );
                    return Err(EncodingError::InvalidLength {
                        length: s.len() as i64,
                        limit: self.options.max_string_length,
                    });
                }
                Ok(Some(s))
            }
            Some(other) => Err(invalid_json(field, other)),
        }
    }

    /// Integers may be JSON numbers or strings
    fn integer<T: FromStr + Default>(&mut self, field: &str) -> EncodingResult<T> {
        let text = match self.take(field)? {
            None => return Ok(T::default()),
            Some(Value::Number(n)) => n.to_string(),
            Some(Value::String(s)) => s,
            Some(other) => return Err(invalid_json(field, other)),
        };
        text.parse::<T>().map_err(|_| invalid_json(field, text))
    }

    fn real(&mut self, field: &str) -> EncodingResult<f64> {
        match self.take(field)? {
            None => Ok(0.0),
            Some(Value::Number(n)) => n.as_f64().ok_or_else(|| invalid_json(field, n)),
            Some(Value::String(s)) => match s.as_str() {
                "NaN" => Ok(f64::NAN),
                "Infinity" => Ok(f64::INFINITY),
                "-Infinity" => Ok(f64::NEG_INFINITY),
                other => other.parse::<f64>().map_err(|_| invalid_json(field, other)),
            },
            Some(other) => Err(invalid_json(field, other)),
        }
    }

    fn identifier(map: &mut Map<String, Value>) -> EncodingResult<Identifier> {
        let id_type = map.remove("IdType").and_then(|v| v.as_u64()).unwrap_or(0);
        let id = map.remove("Id").unwrap_or(Value::Null);
        let identifier = match (id_type, id) {
            (0, Value::Number(n)) => n
                .as_u64()
                .and_then(|v| u32::try_from(v).ok())
                .map(Identifier::Numeric),
            (0, Value::Null) => Some(Identifier::Numeric(0)),
            (ID_TYPE_STRING, Value::String(s)) => Some(Identifier::String(UAString::from(s))),
            (ID_TYPE_GUID, Value::String(s)) => Guid::from_str(&s).ok().map(Identifier::Guid),
            (ID_TYPE_BYTE_STRING, Value::String(s)) => {
                ByteString::from_base64(&s).map(Identifier::ByteString)
            }
            _ => None,
        };
        identifier.ok_or_else(|| {
            error!("Node id has an invalid identifier of type {}", id_type);
            EncodingError::MalformedIdentifier(format!("id type {}", id_type))
        })
    }

    fn namespace_index(&self, value: Option<Value>) -> EncodingResult<u16> {
        match value {
            None | Some(Value::Null) => Ok(0),
            Some(Value::Number(n)) => n
                .as_u64()
                .and_then(|v| u16::try_from(v).ok())
                .ok_or_else(|| invalid_json("Namespace", n)),
            Some(Value::String(uri)) => self.context.namespaces.index_of(&uri).ok_or_else(|| {
                error!("Namespace {} is not in the namespace table", uri);
                EncodingError::UnknownNamespace(uri)
            }),
            Some(other) => Err(invalid_json("Namespace", other)),
        }
    }

    fn variant_value(&mut self) -> EncodingResult<Variant> {
        let type_mask = self.byte("Type")?;
        let type_id = VariantTypeId::from_encoding_mask(type_mask)?;
        if type_id == VariantTypeId::Empty {
            return Ok(Variant::Empty);
        }
        if !self.peek("Body").map_or(false, Value::is_array) {
            return decode_builtin(self, "Body", type_id);
        }
        let values = match decode_builtin_array(self, "Body", type_id)? {
            Some(values) => values,
            None => return Ok(Variant::Empty),
        };
        match self.uint32_array("Dimensions")? {
            Some(dimensions) => Variant::new_matrix(type_id, values, dimensions),
            None => Variant::new_array(type_id, values),
        }
    }
}

impl<'a> UaDecoder for JsonStreamDecoder<'a> {
    fn format(&self) -> EncodingFormat {
        EncodingFormat::Json
    }

    fn context(&self) -> &EncodingContext {
        self.context
    }

    fn options(&self) -> &DecodingOptions {
        &self.options
    }

    fn boolean(&mut self, field: &str) -> EncodingResult<bool> {
        match self.take(field)? {
            None => Ok(false),
            Some(Value::Bool(v)) => Ok(v),
            Some(other) => Err(invalid_json(field, other)),
        }
    }

    fn sbyte(&mut self, field: &str) -> EncodingResult<i8> {
        self.integer(field)
    }

    fn byte(&mut self, field: &str) -> EncodingResult<u8> {
        self.integer(field)
    }

    fn int16(&mut self, field: &str) -> EncodingResult<i16> {
        self.integer(field)
    }

    fn uint16(&mut self, field: &str) -> EncodingResult<u16> {
        self.integer(field)
    }

    fn int32(&mut self, field: &str) -> EncodingResult<i32> {
        self.integer(field)
    }

    fn uint32(&mut self, field: &str) -> EncodingResult<u32> {
        self.integer(field)
    }

    fn int64(&mut self, field: &str) -> EncodingResult<i64> {
        self.integer(field)
    }

    fn uint64(&mut self, field: &str) -> EncodingResult<u64> {
        self.integer(field)
    }

    fn float(&mut self, field: &str) -> EncodingResult<f32> {
        self.real(field).map(|v| v as f32)
    }

    fn double(&mut self, field: &str) -> EncodingResult<f64> {
        self.real(field)
    }

    fn string(&mut self, field: &str) -> EncodingResult<UAString> {
        Ok(UAString::from(self.take_str(field)?))
    }

    fn date_time(&mut self, field: &str) -> EncodingResult<DateTime> {
        match self.take_str(field)? {
            None => Ok(DateTime::null()),
            Some(text) => DateTime::from_str(&text),
        }
    }

    fn guid(&mut self, field: &str) -> EncodingResult<Guid> {
        match self.take_str(field)? {
            None => Ok(Guid::null()),
            Some(text) => Guid::from_str(&text),
        }
    }

    fn byte_string(&mut self, field: &str) -> EncodingResult<ByteString> {
        let text = match self.take(field)? {
            None => return Ok(ByteString::null()),
            Some(Value::String(s)) => s,
            Some(other) => return Err(invalid_json(field, other)),
        };
        let value = ByteString::from_base64(&text).ok_or_else(|| invalid_json(field, "non base64 text"))?;
        let len = value.value.as_ref().map_or(0, |v| v.len());
        if len > self.options.max_byte_string_length {
            error!(
                "Byte string of {} is {} bytes which exceeds the limit {}",
                field, len, self.options.max_byte_string_length
            );
            return Err(EncodingError::InvalidLength {
                length: len as i64,
                limit: self.options.max_byte_string_length,
            });
        }
        Ok(value)
    }

    fn xml_element(&mut self, field: &str) -> EncodingResult<XmlElement> {
        self.string(field)
    }

    fn node_id(&mut self, field: &str) -> EncodingResult<NodeId> {
        match self.take_object(field)? {
            None => Ok(NodeId::null()),
            Some(mut map) => {
                let identifier = Self::identifier(&mut map)?;
                let namespace = self.namespace_index(map.remove("Namespace"))?;
                Ok(NodeId {
                    namespace,
                    identifier,
                })
            }
        }
    }

    fn expanded_node_id(&mut self, field: &str) -> EncodingResult<ExpandedNodeId> {
        match self.take_object(field)? {
            None => Ok(ExpandedNodeId::null()),
            Some(mut map) => {
                let identifier = Self::identifier(&mut map)?;
                let (namespace, namespace_uri) = match map.remove("Namespace") {
                    Some(Value::String(uri)) => (0, UAString::from(uri)),
                    other => (self.namespace_index(other)?, UAString::null()),
                };
                let server_index = match map.remove("ServerUri") {
                    None | Some(Value::Null) => 0,
                    Some(Value::Number(n)) => n
                        .as_u64()
                        .and_then(|v| u32::try_from(v).ok())
                        .ok_or_else(|| invalid_json("ServerUri", n))?,
                    Some(other) => return Err(invalid_json("ServerUri", other)),
                };
                Ok(ExpandedNodeId {
                    node_id: NodeId {
                        namespace,
                        identifier,
                    },
                    namespace_uri,
                    server_index,
                })
            }
        }
    }

    fn status_code(&mut self, field: &str) -> EncodingResult<StatusCode> {
        self.uint32(field).map(StatusCode::from)
    }

    fn qualified_name(&mut self, field: &str) -> EncodingResult<QualifiedName> {
        self.begin_struct(field)?;
        let name = self.string("Name")?;
        let namespace_index = self.uint16("Uri")?;
        self.end_struct()?;
        Ok(QualifiedName {
            namespace_index,
            name,
        })
    }

    fn localized_text(&mut self, field: &str) -> EncodingResult<LocalizedText> {
        self.begin_struct(field)?;
        let locale = self.string("Locale")?;
        let text = self.string("Text")?;
        self.end_struct()?;
        Ok(LocalizedText { locale, text })
    }

    fn extension_object(&mut self, field: &str) -> EncodingResult<ExtensionObject> {
        // A missing object reads as an empty one, which is the null extension object
        self.begin_struct(field)?;
        let type_id = self.node_id("TypeId")?;
        let encoding = self.uint32("Encoding")?;
        let body = match u64::from(encoding) {
            BODY_BYTE_STRING => match self.byte_string("Body")? {
                body if body.is_null() => ExtensionObjectEncoding::None,
                body => ExtensionObjectEncoding::ByteString(body),
            },
            BODY_XML => match self.xml_element("Body")? {
                body if body.is_null() => ExtensionObjectEncoding::None,
                body => ExtensionObjectEncoding::XmlElement(body),
            },
            0 => match self.take("Body")? {
                None => ExtensionObjectEncoding::None,
                Some(body) => ExtensionObjectEncoding::Json(body),
            },
            other => {
                error!("Extension object {} has an unknown body encoding {}", type_id, other);
                return Err(EncodingError::invalid_encoding(format!(
                    "extension object body encoding {}",
                    other
                )));
            }
        };
        self.end_struct()?;
        Ok(ExtensionObject::new(type_id, body))
    }

    fn data_value(&mut self, field: &str) -> EncodingResult<DataValue> {
        self.begin_struct(field)?;
        let mut value = DataValue::null();
        if self.has_field("Value") {
            value.value = Some(self.variant("Value")?);
        }
        if self.has_field("Status") {
            value.status = Some(self.status_code("Status")?);
        }
        if self.has_field("SourceTimestamp") {
            value.source_timestamp = Some(self.date_time("SourceTimestamp")?);
        }
        if self.has_field("SourcePicoseconds") {
            value.source_picoseconds = Some(self.uint16("SourcePicoseconds")?);
        }
        if self.has_field("ServerTimestamp") {
            value.server_timestamp = Some(self.date_time("ServerTimestamp")?);
        }
        if self.has_field("ServerPicoseconds") {
            value.server_picoseconds = Some(self.uint16("ServerPicoseconds")?);
        }
        self.end_struct()?;
        Ok(value)
    }

    fn variant(&mut self, field: &str) -> EncodingResult<Variant> {
        let map = match self.take_object(field)? {
            None => return Ok(Variant::Empty),
            Some(map) => map,
        };
        self.stack.push(DecoderFrame::Object(map));
        let value = self.variant_value();
        self.end_struct()?;
        value
    }

    fn diagnostic_info(&mut self, field: &str) -> EncodingResult<DiagnosticInfo> {
        self.begin_struct(field)?;
        let mut value = DiagnosticInfo::null();
        if self.has_field("SymbolicId") {
            value.symbolic_id = Some(self.int32("SymbolicId")?);
        }
        if self.has_field("NamespaceUri") {
            value.namespace_uri = Some(self.int32("NamespaceUri")?);
        }
        if self.has_field("Locale") {
            value.locale = Some(self.int32("Locale")?);
        }
        if self.has_field("LocalizedText") {
            value.localized_text = Some(self.int32("LocalizedText")?);
        }
        if self.has_field("AdditionalInfo") {
            value.additional_info = Some(self.string("AdditionalInfo")?);
        }
        if self.has_field("InnerStatusCode") {
            value.inner_status_code = Some(self.status_code("InnerStatusCode")?);
        }
        if self.has_field("InnerDiagnosticInfo") {
            let _depth_lock = self.options.depth_lock()?;
            value.inner_diagnostic_info =
                Some(Box::new(self.diagnostic_info("InnerDiagnosticInfo")?));
        }
        self.end_struct()?;
        Ok(value)
    }

    fn enumeration(&mut self, field: &str) -> EncodingResult<i32> {
        self.int32(field)
    }

    fn begin_struct(&mut self, field: &str) -> EncodingResult<()> {
        let map = self.take_object(field)?.unwrap_or_default();
        self.stack.push(DecoderFrame::Object(map));
        Ok(())
    }

    fn end_struct(&mut self) -> EncodingResult<()> {
        match self.stack.pop() {
            Some(DecoderFrame::Object(_)) => Ok(()),
            _ => Err(EncodingError::invalid_encoding("unbalanced JSON values")),
        }
    }

    fn begin_array(&mut self, field: &str) -> EncodingResult<Option<usize>> {
        match self.take(field)? {
            None => Ok(None),
            Some(Value::Array(values)) => {
                let len = values.len();
                self.options
                    .check_array_length(i32::try_from(len).unwrap_or(i32::MAX))?;
                self.stack.push(DecoderFrame::Array(values.into_iter()));
                Ok(Some(len))
            }
            Some(other) => Err(invalid_json(field, other)),
        }
    }

    fn end_array(&mut self) -> EncodingResult<()> {
        match self.stack.pop() {
            Some(DecoderFrame::Array(_)) => Ok(()),
            _ => Err(EncodingError::invalid_encoding("unbalanced JSON values")),
        }
    }
}

/// Writes a structure as a JSON object
pub fn encode_json(value: &dyn UaStructure) -> EncodingResult<Value> {
    let mut encoder = JsonStreamEncoder::new();
    encoder.begin_struct(value.type_name())?;
    value.encode_dyn(&mut encoder)?;
    encoder.end_struct()?;
    Ok(encoder.into_value())
}

/// Reads a structure of type `T` from JSON text
pub fn decode_json<T: StructureType>(json: &str, ctx: &EncodingContext) -> EncodingResult<T> {
    let mut decoder = JsonStreamDecoder::parse(json, ctx)?;
    T::decode_fields(&mut decoder)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn node_id_members() {
        assert_eq!(Value::Object(node_id_to_json(&NodeId::new(0, 85u32))), json!({"Id": 85}));
        assert_eq!(
            Value::Object(node_id_to_json(&NodeId::new(2, "Hello"))),
            json!({"IdType": 1, "Id": "Hello", "Namespace": 2})
        );
    }

    #[test]
    fn special_floats() {
        assert_eq!(float_to_json(f64::INFINITY), json!("Infinity"));
        assert_eq!(float_to_json(f64::NEG_INFINITY), json!("-Infinity"));
        assert_eq!(float_to_json(f64::NAN), json!("NaN"));
        assert_eq!(float_to_json(1.5), json!(1.5));
    }

    #[test]
    fn nulls_are_dropped_from_objects_only() {
        let mut encoder = JsonStreamEncoder::new();
        encoder.begin_struct("Root").unwrap();
        encoder.string("Missing", &UAString::null()).unwrap();
        encoder
            .string_array("Items", &Some(vec![UAString::null(), UAString::from("a")]))
            .unwrap();
        encoder.end_struct().unwrap();
        assert_eq!(encoder.into_value(), json!({"Items": [null, "a"]}));
    }
}
