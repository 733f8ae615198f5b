//! Lexical tokens and PDF character classes

use std::borrow::Borrow;
use std::fmt;

/// A PDF name, escape decoded and without the leading slash
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Name(Vec<u8>);

impl Name {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// The name as text, if it is valid UTF-8
    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.0).ok()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl From<&str> for Name {
    fn from(s: &str) -> Self {
        Self(s.as_bytes().to_vec())
    }
}

impl From<Vec<u8>> for Name {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl Borrow<[u8]> for Name {
    fn borrow(&self) -> &[u8] {
        &self.0
    }
}

impl PartialEq<str> for Name {
    fn eq(&self, other: &str) -> bool {
        self.0 == other.as_bytes()
    }
}

impl PartialEq<&str> for Name {
    fn eq(&self, other: &&str) -> bool {
        self.0 == other.as_bytes()
    }
}

/// Writes the name in PDF syntax, slash included, `#XX`-escaping any byte
/// that would otherwise end or corrupt the token.
impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("/")?;
        for &b in &self.0 {
            if b == b'#' || is_space(b) || is_delim(b) || !(0x21..=0x7e).contains(&b) {
                write!(f, "#{:02X}", b)?;
            } else {
                write!(f, "{}", char::from(b))?;
            }
        }
        Ok(())
    }
}

/// A single lexical token
///
/// Delimiters used by the higher-level grammar (`<<`, `>>`, `[`, `]`, `{`,
/// `}`) are reported as keywords.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// End of input, produced only when EOF is tolerated
    Eof,
    Bool(bool),
    Integer(i64),
    Real(f64),
    /// String literal or hex string, escapes already decoded
    String(Vec<u8>),
    Name(Name),
    Keyword(Vec<u8>),
}

impl Token {
    pub fn keyword(text: &str) -> Self {
        Token::Keyword(text.as_bytes().to_vec())
    }

    /// Check if this is the keyword `text`
    pub fn is_keyword(&self, text: &str) -> bool {
        matches!(self, Token::Keyword(kw) if kw == text.as_bytes())
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Eof => write!(f, "end of input"),
            Token::Bool(b) => write!(f, "{}", b),
            Token::Integer(n) => write!(f, "{}", n),
            Token::Real(x) => write!(f, "{}", x),
            Token::String(s) => write!(f, "<{}>", hex::encode_upper(s)),
            Token::Name(name) => write!(f, "{}", name),
            Token::Keyword(kw) => write!(f, "{}", String::from_utf8_lossy(kw)),
        }
    }
}

pub(crate) fn is_space(b: u8) -> bool {
    matches!(b, b'\x00' | b'\t' | b'\n' | b'\x0c' | b'\r' | b' ')
}

pub(crate) fn is_delim(b: u8) -> bool {
    matches!(b, b'<' | b'>' | b'(' | b')' | b'[' | b']' | b'{' | b'}' | b'/' | b'%')
}

pub(crate) fn unhex(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

fn strip_sign(s: &[u8]) -> &[u8] {
    match s.first() {
        Some(b'+') | Some(b'-') => &s[1..],
        _ => s,
    }
}

/// Optional sign followed by one or more decimal digits
pub(crate) fn is_integer(s: &[u8]) -> bool {
    let digits = strip_sign(s);
    !digits.is_empty() && digits.iter().all(u8::is_ascii_digit)
}

/// Optional sign, then digits with exactly one `.` among them
pub(crate) fn is_real(s: &[u8]) -> bool {
    let body = strip_sign(s);
    if body.is_empty() {
        return false;
    }
    let mut dots = 0;
    for &c in body {
        match c {
            b'.' => dots += 1,
            b'0'..=b'9' => {}
            _ => return false,
        }
    }
    dots == 1
}
