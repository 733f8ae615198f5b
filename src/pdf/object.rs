//! PDF object types

use std::fmt;
use crate::error::{PDFSyntaxError, PDFSyntaxResult};
use super::{Dictionary, Name, Token};

/// Indirect object identifier, `id gen`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjPtr {
    /// Object number
    pub id: u32,
    /// Generation number
    pub gen: u16,
}

impl ObjPtr {
    pub fn new(id: u32, gen: u16) -> Self {
        Self { id, gen }
    }
}

impl fmt::Display for ObjPtr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} R", self.id, self.gen)
    }
}

/// Object found at an `id gen obj ... endobj` site
#[derive(Debug, Clone, PartialEq)]
pub struct ObjDef {
    pub ptr: ObjPtr,
    pub obj: Box<Object>,
}

impl ObjDef {
    pub fn new(ptr: ObjPtr, obj: Object) -> Self {
        Self {
            ptr,
            obj: Box::new(obj),
        }
    }
}

/// Stream header; the payload starts at `offset` and is not read
#[derive(Debug, Clone, PartialEq)]
pub struct Stream {
    pub header: Dictionary,
    /// Object the stream belongs to
    pub ptr: ObjPtr,
    /// Absolute offset of the first payload byte
    pub offset: i64,
}

impl Stream {
    pub fn new(header: Dictionary, ptr: ObjPtr, offset: i64) -> Self {
        Self { header, ptr, offset }
    }

    /// Direct `/Length` of the payload, when present
    pub fn length(&self) -> Option<i64> {
        self.header.get_integer("Length")
    }
}

/// PDF object
#[derive(Debug, Clone, PartialEq)]
pub enum Object {
    Null,
    Bool(bool),
    Integer(i64),
    Real(f64),
    /// String literal or hex string, decrypted if a key was set
    String(Vec<u8>),
    Name(Name),
    Dictionary(Dictionary),
    Array(Vec<Object>),
    Stream(Stream),
    /// Indirect reference, `id gen R`
    Reference(ObjPtr),
    /// Indirect object definition, `id gen obj ... endobj`
    Definition(ObjDef),
}

impl Object {
    /// Short description of the variant
    pub fn type_name(&self) -> &'static str {
        match self {
            Object::Null => "null",
            Object::Bool(_) => "boolean",
            Object::Integer(_) => "integer",
            Object::Real(_) => "real",
            Object::String(_) => "string",
            Object::Name(_) => "name",
            Object::Dictionary(_) => "dictionary",
            Object::Array(_) => "array",
            Object::Stream(_) => "stream",
            Object::Reference(_) => "reference",
            Object::Definition(_) => "definition",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Object::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Object::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Object::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Numeric value; integers are widened
    pub fn as_real(&self) -> Option<f64> {
        match self {
            Object::Real(x) => Some(*x),
            Object::Integer(n) => Some(*n as f64),
            _ => None,
        }
    }

    pub fn as_string(&self) -> Option<&[u8]> {
        match self {
            Object::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_name(&self) -> Option<&Name> {
        match self {
            Object::Name(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&Dictionary> {
        match self {
            Object::Dictionary(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Object]> {
        match self {
            Object::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_stream(&self) -> Option<&Stream> {
        match self {
            Object::Stream(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_reference(&self) -> Option<ObjPtr> {
        match self {
            Object::Reference(ptr) => Some(*ptr),
            _ => None,
        }
    }

    pub fn as_definition(&self) -> Option<&ObjDef> {
        match self {
            Object::Definition(def) => Some(def),
            _ => None,
        }
    }
}

/// Promote a value token to an object
///
/// Keywords and end of input are not objects on their own.
impl TryFrom<Token> for Object {
    type Error = PDFSyntaxError;

    fn try_from(token: Token) -> PDFSyntaxResult<Self> {
        match token {
            Token::Bool(b) => Ok(Object::Bool(b)),
            Token::Integer(n) => Ok(Object::Integer(n)),
            Token::Real(x) => Ok(Object::Real(x)),
            Token::String(s) => Ok(Object::String(s)),
            Token::Name(n) => Ok(Object::Name(n)),
            Token::Keyword(kw) => Err(PDFSyntaxError::malformed(format!(
                "keyword {} is not an object",
                String::from_utf8_lossy(&kw)
            ))),
            Token::Eof => Err(PDFSyntaxError::malformed("end of input is not an object")),
        }
    }
}

fn write_real(f: &mut fmt::Formatter<'_>, x: f64) -> fmt::Result {
    let text = x.to_string();
    if text.contains('.') || !x.is_finite() {
        f.write_str(&text)
    } else {
        write!(f, "{}.0", text)
    }
}

impl fmt::Display for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\nstream\n", self.header)
    }
}

impl fmt::Display for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Object::Null => f.write_str("null"),
            Object::Bool(b) => write!(f, "{}", b),
            Object::Integer(n) => write!(f, "{}", n),
            Object::Real(x) => write_real(f, *x),
            Object::String(s) => write!(f, "<{}>", hex::encode_upper(s)),
            Object::Name(n) => write!(f, "{}", n),
            Object::Dictionary(d) => write!(f, "{}", d),
            Object::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            Object::Stream(s) => write!(f, "{}", s),
            Object::Reference(ptr) => write!(f, "{}", ptr),
            Object::Definition(def) => {
                write!(f, "{} {} obj\n{}\nendobj", def.ptr.id, def.ptr.gen, def.obj)
            }
        }
    }
}
