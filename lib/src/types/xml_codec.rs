// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0
// Copyright (C) 2017-2022 Adam Lock

//! The XML implementation of `UaEncoder` and `UaDecoder`.
//!
//! Fields are elements named after the field and scalars are the text of their element. Builtin
//! types with parts nest an element per part, e.g. a `NodeId` is written as
//! `<Field><Identifier>ns=1;i=5</Identifier></Field>`. Null values are omitted from structures and
//! written with `xsi:nil="true"` inside arrays. A missing element reads as the null value.
//!
//! The decoder parses the whole document into a small element tree first. Fields are taken out
//! of the tree by name, or by position inside an array.

use std::{fmt::Write as _, mem, str::FromStr};

use quick_xml::{
    escape::escape,
    events::{BytesStart, Event},
    Reader,
};

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
    node_id::NodeId,
    qualified_name::QualifiedName,
    status_code::StatusCode,
    string::{UAString, XmlElement},
    structure::{StructureType, UaStructure},
    type_registry::EncodingContext,
    variant::Variant,
    variant_type_id::VariantTypeId,
};

/// The namespace of the OPC UA XML schema
pub const TYPES_NAMESPACE_URI: &str = "http://opcfoundation.org/UA/2008/02/Types.xsd";
const XSI_NAMESPACE_URI: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// Elements nested deeper than this are rejected while parsing
const MAX_ELEMENT_DEPTH: usize = 512;

fn xml_error<E: std::fmt::Display>(err: E) -> EncodingError {
    error!("Cannot parse XML, {}", err);
    EncodingError::invalid_encoding(format!("malformed XML, {}", err))
}

fn format_float(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value.is_infinite() {
        if value > 0.0 { "INF" } else { "-INF" }.to_string()
    } else {
        value.to_string()
    }
}

fn parse_float(text: &str) -> Option<f64> {
    match text {
        "NaN" => Some(f64::NAN),
        "INF" => Some(f64::INFINITY),
        "-INF" => Some(f64::NEG_INFINITY),
        text => text.parse::<f64>().ok(),
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
struct XmlNode {
    name: String,
    attributes: Vec<(String, String)>,
    text: String,
    children: Vec<XmlNode>,
}

impl XmlNode {
    fn from_start(start: &BytesStart) -> EncodingResult<XmlNode> {
        let mut node = XmlNode {
            name: String::from_utf8_lossy(start.name().local_name().as_ref()).into_owned(),
            ..Default::default()
        };
        for attr in start.attributes() {
            let attr = attr.map_err(xml_error)?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr.unescape_value().map_err(xml_error)?.into_owned();
            node.attributes.push((key, value));
        }
        Ok(node)
    }

    fn is_nil(&self) -> bool {
        self.attributes
            .iter()
            .any(|(k, v)| (k == "nil" || k.ends_with(":nil")) && v.trim() == "true")
    }

    fn child(&self, name: &str) -> Option<&XmlNode> {
        self.children.iter().find(|c| c.name == name)
    }

    fn write_to(&self, out: &mut String) {
        if self.name.is_empty() {
            return;
        }
        out.push('<');
        out.push_str(&self.name);
        for (k, v) in &self.attributes {
            let _ = write!(out, " {}=\"{}\"", k, escape(v));
        }
        if self.children.is_empty() && self.text.is_empty() {
            out.push_str("/>");
            return;
        }
        out.push('>');
        if self.children.is_empty() {
            out.push_str(&escape(&self.text));
        } else {
            self.children.iter().for_each(|c| c.write_to(out));
        }
        let _ = write!(out, "</{}>", self.name);
    }

    fn to_xml_string(&self) -> String {
        let mut out = String::new();
        self.write_to(&mut out);
        out
    }

    /// The content of the element as XML text
    fn inner_xml(&self) -> String {
        if self.children.is_empty() {
            escape(&self.text).into_owned()
        } else {
            let mut out = String::new();
            self.children.iter().for_each(|c| c.write_to(&mut out));
            out
        }
    }
}

/// Parses a document into a node whose children are the top level elements
fn parse_document(xml: &str) -> EncodingResult<XmlNode> {
    let mut reader = Reader::from_str(xml);
    let mut stack = vec![XmlNode::default()];
    loop {
        match reader.read_event() {
            Ok(Event::Start(start)) => {
                if stack.len() > MAX_ELEMENT_DEPTH {
                    error!("XML is nested deeper than {} elements", MAX_ELEMENT_DEPTH);
                    return Err(EncodingError::DecodingDepthExceeded(MAX_ELEMENT_DEPTH));
                }
                stack.push(XmlNode::from_start(&start)?);
            }
            Ok(Event::Empty(start)) => {
                let node = XmlNode::from_start(&start)?;
                if let Some(parent) = stack.last_mut() {
                    parent.children.push(node);
                }
            }
            Ok(Event::End(_)) => {
                let node = stack.pop().filter(|_| !stack.is_empty()).ok_or_else(|| {
                    xml_error("end element without a start")
                })?;
                if let Some(parent) = stack.last_mut() {
                    parent.children.push(node);
                }
            }
            Ok(Event::Text(text)) => {
                let text = text.unescape().map_err(xml_error)?;
                if let Some(node) = stack.last_mut() {
                    node.text.push_str(&text);
                }
            }
            Ok(Event::CData(data)) => {
                let text = String::from_utf8(data.into_inner().into_owned()).map_err(xml_error)?;
                if let Some(node) = stack.last_mut() {
                    node.text.push_str(&text);
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(err) => return Err(xml_error(err)),
        }
    }
    if stack.len() != 1 {
        return Err(xml_error("element is not closed"));
    }
    stack.pop().ok_or_else(|| xml_error("empty document"))
}

/// Writes values as an XML document
#[derive(Debug, Default)]
pub struct XmlStreamEncoder {
    out: String,
    /// Open elements and whether each is an array
    stack: Vec<(String, bool)>,
}

impl XmlStreamEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_string(self) -> String {
        self.out
    }

    fn in_array(&self) -> bool {
        self.stack.last().map_or(false, |(_, array)| *array)
    }

    fn open(&mut self, name: &str) {
        self.out.push('<');
        self.out.push_str(name);
        if self.stack.is_empty() {
            let _ = write!(
                self.out,
                " xmlns=\"{}\" xmlns:xsi=\"{}\"",
                TYPES_NAMESPACE_URI, XSI_NAMESPACE_URI
            );
        }
        self.out.push('>');
    }

    fn close(&mut self, name: &str) {
        let _ = write!(self.out, "</{}>", name);
    }

    fn element(&mut self, name: &str, text: &str) {
        self.open(name);
        self.out.push_str(&escape(text));
        self.close(name);
    }

    /// Writes a value that may be null. A null is omitted from a structure and marked nil in
    /// an array.
    fn nullable_element(&mut self, name: &str, text: Option<&str>) {
        match text {
            Some(text) => self.element(name, text),
            None => self.nil(name),
        }
    }

    fn nil(&mut self, name: &str) {
        if self.in_array() {
            let _ = write!(self.out, "<{} xsi:nil=\"true\"/>", name);
        }
    }

    fn pop(&mut self) -> EncodingResult<(String, bool)> {
        self.stack.pop().ok_or_else(|| {
            error!("End of element without a matching begin");
            EncodingError::invalid_encoding("unbalanced XML elements")
        })
    }

    fn variant_body(&mut self, value: &Variant) -> EncodingResult<()> {
        match value {
            Variant::Empty => Ok(()),
            Variant::Array(array) => {
                let type_name = array.value_type().name();
                if array.has_dimensions() {
                    self.begin_struct("Matrix")?;
                    let dimensions = array.dimensions().iter().map(|d| *d as i32).collect();
                    self.int32_array("Dimensions", &Some(dimensions))?;
                    self.begin_array("Elements", array.len())?;
                    for value in array.values() {
                        encode_builtin(self, type_name, value)?;
                    }
                    self.end_array()?;
                    self.end_struct()
                } else {
                    self.begin_array(&format!("ListOf{}", type_name), array.len())?;
                    for value in array.values() {
                        encode_builtin(self, type_name, value)?;
                    }
                    self.end_array()
                }
            }
            value => encode_builtin(self, value.type_id().name(), value),
        }
    }

    fn structure(&mut self, field: &str, value: &dyn UaStructure) -> EncodingResult<()> {
        self.begin_struct(field)?;
        value.encode_dyn(self)?;
        self.end_struct()
    }
}

impl UaEncoder for XmlStreamEncoder {
    fn format(&self) -> EncodingFormat {
        EncodingFormat::Xml
    }

    fn boolean(&mut self, field: &str, value: bool) -> EncodingResult<()> {
        self.element(field, if value { "true" } else { "false" });
        Ok(())
    }

    fn sbyte(&mut self, field: &str, value: i8) -> EncodingResult<()> {
        self.element(field, &value.to_string());
        Ok(())
    }

    fn byte(&mut self, field: &str, value: u8) -> EncodingResult<()> {
        self.element(field, &value.to_string());
        Ok(())
    }

    fn int16(&mut self, field: &str, value: i16) -> EncodingResult<()> {
        self.element(field, &value.to_string());
        Ok(())
    }

    fn uint16(&mut self, field: &str, value: u16) -> EncodingResult<()> {
        self.element(field, &value.to_string());
        Ok(())
    }

    fn int32(&mut self, field: &str, value: i32) -> EncodingResult<()> {
        self.element(field, &value.to_string());
        Ok(())
    }

    fn uint32(&mut self, field: &str, value: u32) -> EncodingResult<()> {
        self.element(field, &value.to_string());
        Ok(())
    }

    fn int64(&mut self, field: &str, value: i64) -> EncodingResult<()> {
        self.element(field, &value.to_string());
        Ok(())
    }

    fn uint64(&mut self, field: &str, value: u64) -> EncodingResult<()> {
        self.element(field, &value.to_string());
        Ok(())
    }

    fn float(&mut self, field: &str, value: f32) -> EncodingResult<()> {
        let text = if value.is_finite() {
            value.to_string()
        } else {
            format_float(value as f64)
        };
        self.element(field, &text);
        Ok(())
    }

    fn double(&mut self, field: &str, value: f64) -> EncodingResult<()> {
        self.element(field, &format_float(value));
        Ok(())
    }

    fn string(&mut self, field: &str, value: &UAString) -> EncodingResult<()> {
        self.nullable_element(field, value.value().as_deref());
        Ok(())
    }

    fn date_time(&mut self, field: &str, value: &DateTime) -> EncodingResult<()> {
        self.element(field, &value.to_iso8601());
        Ok(())
    }

    fn guid(&mut self, field: &str, value: &Guid) -> EncodingResult<()> {
        self.begin_struct(field)?;
        self.element("String", &value.to_string());
        self.end_struct()
    }

    fn byte_string(&mut self, field: &str, value: &ByteString) -> EncodingResult<()> {
        if value.is_null() {
            self.nil(field);
        } else {
            self.element(field, &value.as_base64());
        }
        Ok(())
    }

    fn xml_element(&mut self, field: &str, value: &XmlElement) -> EncodingResult<()> {
        match value.value() {
            None => self.nil(field),
            Some(xml) => {
                self.open(field);
                self.out.push_str(xml);
                self.close(field);
            }
        }
        Ok(())
    }

    fn node_id(&mut self, field: &str, value: &NodeId) -> EncodingResult<()> {
        if value.is_null() && !self.in_array() {
            return Ok(());
        }
        self.begin_struct(field)?;
        self.element("Identifier", &value.to_string());
        self.end_struct()
    }

    fn expanded_node_id(&mut self, field: &str, value: &ExpandedNodeId) -> EncodingResult<()> {
        if value.is_null() && !self.in_array() {
            return Ok(());
        }
        self.begin_struct(field)?;
        self.element("Identifier", &value.to_string());
        self.end_struct()
    }

    fn status_code(&mut self, field: &str, value: StatusCode) -> EncodingResult<()> {
        self.begin_struct(field)?;
        self.element("Code", &u32::from(value).to_string());
        self.end_struct()
    }

    fn qualified_name(&mut self, field: &str, value: &QualifiedName) -> EncodingResult<()> {
        self.begin_struct(field)?;
        if value.namespace_index != 0 {
            self.uint16("NamespaceIndex", value.namespace_index)?;
        }
        self.string("Name", &value.name)?;
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
            self.nil(field);
            return Ok(());
        }
        self.begin_struct(field)?;
        match (&value.body, value.value()) {
            (ExtensionObjectEncoding::XmlElement(body), _) => {
                self.node_id("TypeId", &value.node_id)?;
                self.open("Body");
                self.out.push_str(body.as_ref());
                self.close("Body");
            }
            (_, Some(structure)) => {
                self.node_id("TypeId", &structure.encoding_id(EncodingFormat::Xml))?;
                self.begin_struct("Body")?;
                self.structure(structure.type_name(), structure)?;
                self.end_struct()?;
            }
            (ExtensionObjectEncoding::ByteString(body), None) => {
                self.node_id("TypeId", &value.node_id)?;
                self.begin_struct("Body")?;
                self.byte_string("ByteString", body)?;
                self.end_struct()?;
            }
            (ExtensionObjectEncoding::None, None) => {
                self.node_id("TypeId", &value.node_id)?;
            }
            (ExtensionObjectEncoding::Json(_), None) => {
                error!(
                    "Extension object {} holds an undecoded JSON body which cannot be written as XML",
                    value.node_id
                );
                return Err(EncodingError::invalid_encoding(
                    "undecoded JSON body cannot be written as XML",
                ));
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
            self.status_code("StatusCode", status)?;
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
            self.nil(field);
            return Ok(());
        }
        self.begin_struct(field)?;
        self.variant_body(value)?;
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

    fn enumeration(&mut self, field: &str, value: i32, symbol: Option<&str>) -> EncodingResult<()> {
        match symbol {
            Some(symbol) => self.element(field, &format!("{}_{}", symbol, value)),
            None => self.element(field, &value.to_string()),
        }
        Ok(())
    }

    fn begin_struct(&mut self, field: &str) -> EncodingResult<()> {
        self.open(field);
        self.stack.push((field.to_string(), false));
        Ok(())
    }

    fn end_struct(&mut self) -> EncodingResult<()> {
        let (name, _) = self.pop()?;
        self.close(&name);
        Ok(())
    }

    fn begin_array(&mut self, field: &str, _len: usize) -> EncodingResult<()> {
        self.open(field);
        self.stack.push((field.to_string(), true));
        Ok(())
    }

    fn null_array(&mut self, field: &str) -> EncodingResult<()> {
        self.nil(field);
        Ok(())
    }

    fn end_array(&mut self) -> EncodingResult<()> {
        let (name, _) = self.pop()?;
        self.close(&name);
        Ok(())
    }
}

#[derive(Debug)]
struct XmlFrame {
    node: XmlNode,
    array: bool,
    next: usize,
}

/// Reads values from an XML document
pub struct XmlStreamDecoder<'a> {
    context: &'a EncodingContext,
    options: DecodingOptions,
    stack: Vec<XmlFrame>,
}

impl<'a> XmlStreamDecoder<'a> {
    /// Creates a decoder over a whole document. The top level element is read as a field.
    pub fn new(xml: &str, context: &'a EncodingContext) -> EncodingResult<Self> {
        let document = Self::parse(xml, context)?;
        Ok(Self::with_root(document, context))
    }

    /// Creates a decoder positioned inside the top level element, so its children are read as
    /// the fields of a structure
    pub fn from_body(xml: &str, context: &'a EncodingContext) -> EncodingResult<Self> {
        let document = Self::parse(xml, context)?;
        let root = document
            .children
            .into_iter()
            .next()
            .ok_or_else(|| xml_error("document has no element"))?;
        Ok(Self::with_root(root, context))
    }

    fn parse(xml: &str, context: &EncodingContext) -> EncodingResult<XmlNode> {
        let limit = context.options.max_message_size;
        if limit > 0 && xml.len() > limit {
            error!("XML of {} bytes exceeds the message size limit {}", xml.len(), limit);
            return Err(EncodingError::InvalidLength {
                length: xml.len() as i64,
                limit,
            });
        }
        parse_document(xml)
    }

    fn with_root(root: XmlNode, context: &'a EncodingContext) -> Self {
        XmlStreamDecoder {
            context,
            options: context.options.for_decoder(),
            stack: vec![XmlFrame {
                node: root,
                array: false,
                next: 0,
            }],
        }
    }

    fn top(&self) -> EncodingResult<&XmlFrame> {
        self.stack
            .last()
            .ok_or_else(|| EncodingError::invalid_encoding("unbalanced XML elements"))
    }

    fn push(&mut self, node: XmlNode, array: bool) {
        self.stack.push(XmlFrame {
            node,
            array,
            next: 0,
        });
    }

    fn pop(&mut self) -> EncodingResult<()> {
        self.stack
            .pop()
            .map(|_| ())
            .ok_or_else(|| EncodingError::invalid_encoding("unbalanced XML elements"))
    }

    /// Takes the element of the field out of the current element. Inside an array the next
    /// element is taken whatever its name. A nil element reads as missing.
    fn take(&mut self, field: &str) -> EncodingResult<Option<XmlNode>> {
        let frame = self
            .stack
            .last_mut()
            .ok_or_else(|| EncodingError::invalid_encoding("unbalanced XML elements"))?;
        let node = if frame.array {
            let node = frame
                .node
                .children
                .get_mut(frame.next)
                .map(mem::take)
                .ok_or(EncodingError::UnexpectedEof)?;
            frame.next += 1;
            node
        } else {
            match frame.node.children.iter_mut().find(|c| c.name == field) {
                Some(node) => mem::take(node),
                None => return Ok(None),
            }
        };
        Ok(Some(node).filter(|n| !n.is_nil()))
    }

    fn has_field(&self, field: &str) -> bool {
        self.top()
            .map(|f| f.node.child(field).map_or(false, |c| !c.is_nil()))
            .unwrap_or(false)
    }

    fn text(&mut self, field: &str) -> EncodingResult<Option<String>> {
        let text = self.take(field)?.map(|n| n.text);
        if let Some(ref text) = text {
            if text.len() > self.options.max_string_length {
                error!(
                    "Text of {} is {} bytes which exceeds the limit {}",
                    field,
                    text.len(),
                    self.options.max_string_length
                );
                return Err(EncodingError::InvalidLength {
                    length: text.len() as i64,
                    limit: self.options.max_string_length,
                });
            }
        }
        Ok(text)
    }

    fn parse_value<T: FromStr + Default>(&mut self, field: &str) -> EncodingResult<T> {
        match self.text(field)? {
            None => Ok(T::default()),
            Some(text) => text.trim().parse::<T>().map_err(|_| {
                error!("Value \"{}\" of {} cannot be parsed", text, field);
                EncodingError::invalid_encoding(format!("\"{}\" is not a valid {}", text, field))
            }),
        }
    }

    fn parse_float(&mut self, field: &str) -> EncodingResult<f64> {
        match self.text(field)? {
            None => Ok(0.0),
            Some(text) => parse_float(text.trim()).ok_or_else(|| {
                error!("Value \"{}\" of {} is not a number", text, field);
                EncodingError::invalid_encoding(format!("\"{}\" is not a number", text))
            }),
        }
    }

    fn type_from_name(name: &str) -> EncodingResult<VariantTypeId> {
        VariantTypeId::from_name(name)
            .filter(|t| *t != VariantTypeId::Empty)
            .ok_or_else(|| {
                error!("Element {} does not name a builtin type", name);
                EncodingError::invalid_encoding(format!("unknown variant type {}", name))
            })
    }

    fn variant_body(&mut self, name: &str) -> EncodingResult<Variant> {
        if name == "Matrix" {
            self.matrix()
        } else if let Some(item) = name.strip_prefix("ListOf") {
            let type_id = Self::type_from_name(item)?;
            match decode_builtin_array(self, name, type_id)? {
                None => Ok(Variant::Empty),
                Some(values) => Variant::new_array(type_id, values),
            }
        } else {
            let type_id = Self::type_from_name(name)?;
            decode_builtin(self, name, type_id)
        }
    }

    fn matrix(&mut self) -> EncodingResult<Variant> {
        let node = self.take("Matrix")?.unwrap_or_default();
        self.push(node, false);
        let dimensions = self.int32_array("Dimensions")?.unwrap_or_default();
        let item_name = self
            .top()?
            .node
            .child("Elements")
            .and_then(|e| e.children.first())
            .map(|c| c.name.clone())
            .ok_or_else(|| xml_error("matrix has no elements to take the type from"))?;
        let type_id = Self::type_from_name(&item_name)?;
        let values = decode_builtin_array(self, "Elements", type_id)?.unwrap_or_default();
        self.pop()?;
        let dimensions = dimensions
            .into_iter()
            .map(|d| {
                u32::try_from(d).map_err(|_| {
                    error!("Matrix dimension {} is negative", d);
                    EncodingError::invalid_encoding(format!("negative dimension {}", d))
                })
            })
            .collect::<EncodingResult<Vec<u32>>>()?;
        Variant::new_matrix(type_id, values, dimensions)
    }
}

impl<'a> UaDecoder for XmlStreamDecoder<'a> {
    fn format(&self) -> EncodingFormat {
        EncodingFormat::Xml
    }

    fn context(&self) -> &EncodingContext {
        self.context
    }

    fn options(&self) -> &DecodingOptions {
        &self.options
    }

    fn boolean(&mut self, field: &str) -> EncodingResult<bool> {
        match self.text(field)?.as_deref().map(str::trim) {
            None => Ok(false),
            Some("true") | Some("1") => Ok(true),
            Some("false") | Some("0") => Ok(false),
            Some(other) => {
                error!("Value \"{}\" of {} is not a boolean", other, field);
                Err(EncodingError::invalid_encoding(format!(
                    "\"{}\" is not a boolean",
                    other
                )))
            }
        }
    }

    fn sbyte(&mut self, field: &str) -> EncodingResult<i8> {
        self.parse_value(field)
    }

    fn byte(&mut self, field: &str) -> EncodingResult<u8> {
        self.parse_value(field)
    }

    fn int16(&mut self, field: &str) -> EncodingResult<i16> {
        self.parse_value(field)
    }

    fn uint16(&mut self, field: &str) -> EncodingResult<u16> {
        self.parse_value(field)
    }

    fn int32(&mut self, field: &str) -> EncodingResult<i32> {
        self.parse_value(field)
    }

    fn uint32(&mut self, field: &str) -> EncodingResult<u32> {
        self.parse_value(field)
    }

    fn int64(&mut self, field: &str) -> EncodingResult<i64> {
        self.parse_value(field)
    }

    fn uint64(&mut self, field: &str) -> EncodingResult<u64> {
        self.parse_value(field)
    }

    fn float(&mut self, field: &str) -> EncodingResult<f32> {
        self.parse_float(field).map(|v| v as f32)
    }

    fn double(&mut self, field: &str) -> EncodingResult<f64> {
        self.parse_float(field)
    }

    fn string(&mut self, field: &str) -> EncodingResult<UAString> {
        Ok(UAString::from(self.text(field)?))
    }

    fn date_time(&mut self, field: &str) -> EncodingResult<DateTime> {
        match self.text(field)? {
            None => Ok(DateTime::null()),
            Some(text) => DateTime::from_str(text.trim()),
        }
    }

    fn guid(&mut self, field: &str) -> EncodingResult<Guid> {
        self.begin_struct(field)?;
        let text = self.text("String")?;
        self.end_struct()?;
        match text {
            None => Ok(Guid::null()),
            Some(text) => Guid::from_str(text.trim()),
        }
    }

    fn byte_string(&mut self, field: &str) -> EncodingResult<ByteString> {
        match self.text(field)? {
            None => Ok(ByteString::null()),
            Some(text) => ByteString::from_base64(text.trim()).ok_or_else(|| {
                error!("Value of {} is not base64", field);
                EncodingError::invalid_encoding(format!("{} is not base64", field))
            }),
        }
    }

    fn xml_element(&mut self, field: &str) -> EncodingResult<XmlElement> {
        Ok(match self.take(field)? {
            None => XmlElement::null(),
            Some(node) => XmlElement::from(node.inner_xml()),
        })
    }

    fn node_id(&mut self, field: &str) -> EncodingResult<NodeId> {
        self.begin_struct(field)?;
        let text = self.text("Identifier")?;
        self.end_struct()?;
        match text {
            None => Ok(NodeId::null()),
            Some(text) => NodeId::from_str(text.trim()),
        }
    }

    fn expanded_node_id(&mut self, field: &str) -> EncodingResult<ExpandedNodeId> {
        self.begin_struct(field)?;
        let text = self.text("Identifier")?;
        self.end_struct()?;
        match text {
            None => Ok(ExpandedNodeId::null()),
            Some(text) => ExpandedNodeId::from_str(text.trim()),
        }
    }

    fn status_code(&mut self, field: &str) -> EncodingResult<StatusCode> {
        self.begin_struct(field)?;
        let code: u32 = self.parse_value("Code")?;
        self.end_struct()?;
        Ok(StatusCode::from(code))
    }

    fn qualified_name(&mut self, field: &str) -> EncodingResult<QualifiedName> {
        self.begin_struct(field)?;
        let namespace_index = self.uint16("NamespaceIndex")?;
        let name = self.string("Name")?;
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
        let node = match self.take(field)? {
            Some(node) => node,
            None => return Ok(ExtensionObject::null()),
        };
        self.push(node, false);
        let type_id = self.node_id("TypeId")?;
        let body = match self.take("Body")?.and_then(|b| b.children.into_iter().next()) {
            None => ExtensionObjectEncoding::None,
            Some(body) if body.name == "ByteString" => {
                let bytes = ByteString::from_base64(body.text.trim()).ok_or_else(|| {
                    error!("Body of extension object {} is not base64", type_id);
                    EncodingError::invalid_encoding("extension object body is not base64")
                })?;
                ExtensionObjectEncoding::ByteString(bytes)
            }
            Some(body) => ExtensionObjectEncoding::XmlElement(XmlElement::from(body.to_xml_string())),
        };
        self.pop()?;
        Ok(ExtensionObject::new(type_id, body))
    }

    fn data_value(&mut self, field: &str) -> EncodingResult<DataValue> {
        self.begin_struct(field)?;
        let mut value = DataValue::null();
        if self.has_field("Value") {
            value.value = Some(self.variant("Value")?);
        }
        if self.has_field("StatusCode") {
            value.status = Some(self.status_code("StatusCode")?);
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
        let node = match self.take(field)? {
            Some(node) => node,
            None => return Ok(Variant::Empty),
        };
        let name = match node.children.first() {
            Some(child) => child.name.clone(),
            None => return Ok(Variant::Empty),
        };
        self.push(node, false);
        let value = self.variant_body(&name)?;
        self.pop()?;
        Ok(value)
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
        match self.text(field)? {
            None => Ok(0),
            Some(text) => {
                let text = text.trim();
                // Symbol_Value or just the value
                let value = text.rsplit('_').next().unwrap_or(text);
                value.parse::<i32>().map_err(|_| {
                    error!("Enumeration value \"{}\" of {} is not valid", text, field);
                    EncodingError::invalid_encoding(format!("\"{}\" is not an enumeration value", text))
                })
            }
        }
    }

    fn begin_struct(&mut self, field: &str) -> EncodingResult<()> {
        let node = self.take(field)?.unwrap_or_default();
        self.push(node, false);
        Ok(())
    }

    fn end_struct(&mut self) -> EncodingResult<()> {
        self.pop()
    }

    fn begin_array(&mut self, field: &str) -> EncodingResult<Option<usize>> {
        match self.take(field)? {
            None => Ok(None),
            Some(node) => {
                let len = node.children.len();
                self.options
                    .check_array_length(i32::try_from(len).unwrap_or(i32::MAX))?;
                self.push(node, true);
                Ok(Some(len))
            }
        }
    }

    fn end_array(&mut self) -> EncodingResult<()> {
        self.pop()
    }
}

/// Writes a structure as an XML document whose top level element is named after its type
pub fn encode_xml(value: &dyn UaStructure) -> EncodingResult<String> {
    let mut encoder = XmlStreamEncoder::new();
    encoder.structure(value.type_name(), value)?;
    Ok(encoder.into_string())
}

/// Reads a structure of type `T` from an XML document
pub fn decode_xml<T: StructureType>(xml: &str, ctx: &EncodingContext) -> EncodingResult<T> {
    let mut decoder = XmlStreamDecoder::from_body(xml, ctx)?;
    T::decode_fields(&mut decoder)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_strips_prefixes_and_keeps_nil() {
        let doc = parse_document(
            r#"<?xml version="1.0"?><uax:Root xmlns:uax="x"><uax:A>1 &amp; 2</uax:A><B xsi:nil="true"/></uax:Root>"#,
        )
        .unwrap();
        let root = &doc.children[0];
        assert_eq!(root.name, "Root");
        assert_eq!(root.children[0].text, "1 & 2");
        assert!(root.children[1].is_nil());
    }

    #[test]
    fn unclosed_elements_are_invalid() {
        assert!(matches!(
            parse_document("<A><B></B>"),
            Err(EncodingError::InvalidEncoding(_))
        ));
    }

    #[test]
    fn floats_use_schema_names() {
        assert_eq!(format_float(f64::INFINITY), "INF");
        assert_eq!(format_float(f64::NEG_INFINITY), "-INF");
        assert_eq!(format_float(f64::NAN), "NaN");
        assert!(parse_float("NaN").unwrap().is_nan());
        assert_eq!(parse_float("-INF"), Some(f64::NEG_INFINITY));
        assert_eq!(parse_float("1.5"), Some(1.5));
    }
}
