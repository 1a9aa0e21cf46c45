//! Minimal XML-RPC encoding and decoding.
//!
//! Covers what the WordPress API needs: scalar values, base64 payloads,
//! arrays and structs in calls, and value or fault responses.
//!
//! ```text
//! <methodCall>
//!   <methodName>wp.newPost</methodName>
//!   <params><param><value><int>0</int></value></param>...</params>
//! </methodCall>
//! ```

use crate::error::Error;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use quick_xml::Reader;
use quick_xml::Writer;
use quick_xml::escape::{resolve_predefined_entity, unescape};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use std::io::Write;

/// An XML-RPC value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Bool(bool),
    Double(f64),
    String(String),
    /// Raw bytes, base64 encoded on the wire.
    Base64(Vec<u8>),
    Array(Vec<Value>),
    /// Members keep insertion order.
    Struct(Vec<(String, Value)>),
    Nil,
}

impl Value {
    pub fn string(s: impl Into<String>) -> Self {
        Value::String(s.into())
    }

    pub fn strings<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Value::Array(items.into_iter().map(|s| Value::String(s.into())).collect())
    }

    /// Look up a struct member by name.
    pub fn member(&self, name: &str) -> Option<&Value> {
        match self {
            Value::Struct(members) => members.iter().find(|(k, _)| k == name).map(|(_, v)| v),
            _ => None,
        }
    }

    /// Read an identifier that servers send either as a string or an int.
    pub fn as_id(&self) -> Option<String> {
        match self {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Int(i) => Some(i.to_string()),
            _ => None,
        }
    }
}

fn xml_err(e: impl std::fmt::Display) -> Error {
    Error::Xml(e.to_string())
}

fn write_text<W: Write>(w: &mut Writer<W>, name: &str, text: &str) -> Result<(), Error> {
    w.write_event(Event::Start(BytesStart::new(name)))
        .map_err(xml_err)?;
    w.write_event(Event::Text(BytesText::new(text)))
        .map_err(xml_err)?;
    w.write_event(Event::End(BytesEnd::new(name)))
        .map_err(xml_err)?;
    Ok(())
}

fn start<W: Write>(w: &mut Writer<W>, name: &str) -> Result<(), Error> {
    w.write_event(Event::Start(BytesStart::new(name)))
        .map_err(xml_err)
}

fn end<W: Write>(w: &mut Writer<W>, name: &str) -> Result<(), Error> {
    w.write_event(Event::End(BytesEnd::new(name))).map_err(xml_err)
}

fn write_value<W: Write>(w: &mut Writer<W>, value: &Value) -> Result<(), Error> {
    start(w, "value")?;
    match value {
        Value::Int(i) => write_text(w, "int", &i.to_string())?,
        Value::Bool(b) => write_text(w, "boolean", if *b { "1" } else { "0" })?,
        Value::Double(d) => write_text(w, "double", &d.to_string())?,
        Value::String(s) => write_text(w, "string", s)?,
        Value::Base64(bytes) => write_text(w, "base64", &STANDARD.encode(bytes))?,
        Value::Array(items) => {
            start(w, "array")?;
            start(w, "data")?;
            for item in items {
                write_value(w, item)?;
            }
            end(w, "data")?;
            end(w, "array")?;
        }
        Value::Struct(members) => {
            start(w, "struct")?;
            for (name, member) in members {
                start(w, "member")?;
                write_text(w, "name", name)?;
                write_value(w, member)?;
                end(w, "member")?;
            }
            end(w, "struct")?;
        }
        Value::Nil => {
            w.write_event(Event::Empty(BytesStart::new("nil")))
                .map_err(xml_err)?;
        }
    }
    end(w, "value")
}

/// Serialize a method call document.
pub fn encode_call(method: &str, params: &[Value]) -> Result<String, Error> {
    let mut writer = Writer::new(Vec::new());
    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(xml_err)?;
    start(&mut writer, "methodCall")?;
    write_text(&mut writer, "methodName", method)?;
    start(&mut writer, "params")?;
    for param in params {
        start(&mut writer, "param")?;
        write_value(&mut writer, param)?;
        end(&mut writer, "param")?;
    }
    end(&mut writer, "params")?;
    end(&mut writer, "methodCall")?;
    String::from_utf8(writer.into_inner()).map_err(xml_err)
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Open(String),
    Close(String),
    Text(String),
}

/// Resolve a `&name;` or `&#nn;` reference to its text.
fn resolve_reference(name: &str) -> Result<String, Error> {
    if let Some(code) = name.strip_prefix('#') {
        let parsed = match code.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16),
            None => code.parse(),
        };
        return parsed
            .ok()
            .and_then(char::from_u32)
            .map(String::from)
            .ok_or_else(|| Error::Xml(format!("bad character reference &{name};")));
    }
    resolve_predefined_entity(name)
        .map(str::to_string)
        .ok_or_else(|| Error::Xml(format!("unknown entity &{name};")))
}

fn flush_text(text: &mut String, tokens: &mut Vec<Token>) {
    if !text.is_empty() {
        tokens.push(Token::Text(std::mem::take(text)));
    }
}

/// Split a document into tags and text. Adjacent text, CDATA and entity
/// references are merged into one token, and text is kept as written.
fn tokenize(xml: &str) -> Result<Vec<Token>, Error> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);

    let mut tokens = Vec::new();
    let mut text = String::new();
    loop {
        match reader.read_event().map_err(xml_err)? {
            Event::Start(e) => {
                flush_text(&mut text, &mut tokens);
                tokens.push(Token::Open(String::from_utf8_lossy(e.name().as_ref()).into_owned()))
            }
            Event::End(e) => {
                flush_text(&mut text, &mut tokens);
                tokens.push(Token::Close(String::from_utf8_lossy(e.name().as_ref()).into_owned()))
            }
            Event::Empty(e) => {
                flush_text(&mut text, &mut tokens);
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                tokens.push(Token::Open(name.clone()));
                tokens.push(Token::Close(name));
            }
            Event::Text(e) => {
                let raw = std::str::from_utf8(&e).map_err(xml_err)?;
                text.push_str(&unescape(raw).map_err(xml_err)?);
            }
            Event::GeneralRef(e) => {
                let name = std::str::from_utf8(&e).map_err(xml_err)?;
                text.push_str(&resolve_reference(name)?);
            }
            Event::CData(e) => text.push_str(&String::from_utf8_lossy(&e)),
            Event::Eof => break,
            _ => {}
        }
    }
    flush_text(&mut text, &mut tokens);
    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    /// Step over whitespace between elements.
    fn skip_layout(&mut self) {
        while matches!(self.tokens.get(self.pos), Some(Token::Text(t)) if t.trim().is_empty()) {
            self.pos += 1;
        }
    }

    fn peek(&mut self) -> Option<&Token> {
        self.skip_layout();
        self.tokens.get(self.pos)
    }

    fn bump(&mut self) -> Option<Token> {
        self.skip_layout();
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn expect_open(&mut self, name: &str) -> Result<(), Error> {
        match self.bump() {
            Some(Token::Open(n)) if n == name => Ok(()),
            other => Err(Error::Xml(format!("expected <{name}>, found {other:?}"))),
        }
    }

    fn expect_close(&mut self, name: &str) -> Result<(), Error> {
        match self.bump() {
            Some(Token::Close(n)) if n == name => Ok(()),
            other => Err(Error::Xml(format!("expected </{name}>, found {other:?}"))),
        }
    }

    /// Text content up to the closing tag, which is consumed.
    fn text_until_close(&mut self, name: &str) -> Result<String, Error> {
        let text = match self.tokens.get(self.pos) {
            Some(Token::Text(t)) => {
                let t = t.clone();
                self.pos += 1;
                t
            }
            _ => String::new(),
        };
        self.expect_close(name)?;
        Ok(text)
    }

    fn value(&mut self) -> Result<Value, Error> {
        self.expect_open("value")?;
        let value = match self.bump() {
            // An untyped value is a string
            Some(Token::Close(n)) if n == "value" => return Ok(Value::String(String::new())),
            Some(Token::Text(t)) => {
                self.expect_close("value")?;
                return Ok(Value::String(t));
            }
            Some(Token::Open(tag)) => self.typed(&tag)?,
            other => return Err(Error::Xml(format!("unexpected {other:?} in <value>"))),
        };
        self.expect_close("value")?;
        Ok(value)
    }

    fn typed(&mut self, tag: &str) -> Result<Value, Error> {
        match tag {
            "int" | "i4" | "i8" => {
                let text = self.text_until_close(tag)?;
                text.trim()
                    .parse()
                    .map(Value::Int)
                    .map_err(|e| Error::Xml(format!("bad <{tag}> {text:?}: {e}")))
            }
            "boolean" => Ok(Value::Bool(self.text_until_close(tag)?.trim() == "1")),
            "double" => {
                let text = self.text_until_close(tag)?;
                text.trim()
                    .parse()
                    .map(Value::Double)
                    .map_err(|e| Error::Xml(format!("bad <double> {text:?}: {e}")))
            }
            "string" | "dateTime.iso8601" => Ok(Value::String(self.text_until_close(tag)?)),
            "base64" => {
                let text = self.text_until_close(tag)?;
                STANDARD
                    .decode(text.trim())
                    .map(Value::Base64)
                    .map_err(|e| Error::Xml(format!("bad <base64>: {e}")))
            }
            "nil" => {
                self.expect_close("nil")?;
                Ok(Value::Nil)
            }
            "array" => {
                self.expect_open("data")?;
                let mut items = Vec::new();
                while matches!(self.peek(), Some(Token::Open(n)) if n == "value") {
                    items.push(self.value()?);
                }
                self.expect_close("data")?;
                self.expect_close("array")?;
                Ok(Value::Array(items))
            }
            "struct" => {
                let mut members = Vec::new();
                while matches!(self.peek(), Some(Token::Open(n)) if n == "member") {
                    self.expect_open("member")?;
                    self.expect_open("name")?;
                    let name = self.text_until_close("name")?;
                    let value = self.value()?;
                    self.expect_close("member")?;
                    members.push((name, value));
                }
                self.expect_close("struct")?;
                Ok(Value::Struct(members))
            }
            other => Err(Error::Xml(format!("unsupported value type <{other}>"))),
        }
    }
}

/// Parse a method response, turning a `<fault>` into [`Error::Fault`].
pub fn parse_response(xml: &str) -> Result<Value, Error> {
    let mut parser = Parser {
        tokens: tokenize(xml)?,
        pos: 0,
    };
    parser.expect_open("methodResponse")?;
    match parser.bump() {
        Some(Token::Open(tag)) if tag == "params" => {
            parser.expect_open("param")?;
            let value = parser.value()?;
            parser.expect_close("param")?;
            Ok(value)
        }
        Some(Token::Open(tag)) if tag == "fault" => {
            let fault = parser.value()?;
            let code = match fault.member("faultCode") {
                Some(Value::Int(code)) => *code,
                _ => 0,
            };
            let message = match fault.member("faultString") {
                Some(Value::String(s)) => s.clone(),
                _ => "unknown fault".to_string(),
            };
            Err(Error::Fault { code, message })
        }
        other => Err(Error::Xml(format!(
            "expected <params> or <fault>, found {other:?}"
        ))),
    }
}
