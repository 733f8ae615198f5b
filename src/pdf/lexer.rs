//! Tokenizer over a [`Buffer`]

use std::io::Read;
use std::str;

use crate::error::{PDFSyntaxError, PDFSyntaxResult};
use super::token::{is_delim, is_integer, is_real, is_space, unhex};
use super::{Buffer, Name, Token};

impl<R: Read> Buffer<R> {
    /// Next token, taking pushed-back tokens first
    pub fn read_token(&mut self) -> PDFSyntaxResult<Token> {
        if let Some(token) = self.pop_token() {
            return Ok(token);
        }

        let mut c = self.read_byte()?;
        loop {
            if is_space(c) {
                if self.eof {
                    if self.allow_eof {
                        return Ok(Token::Eof);
                    }
                    return Err(PDFSyntaxError::UnexpectedEof {
                        offset: self.read_offset(),
                    });
                }
                c = self.read_byte()?;
            } else if c == b'%' {
                while c != b'\r' && c != b'\n' {
                    c = self.read_byte()?;
                }
            } else {
                break;
            }
        }

        match c {
            b'<' => {
                if self.read_byte()? == b'<' {
                    return Ok(Token::keyword("<<"));
                }
                self.unread_byte();
                self.read_hex_string()
            }
            b'(' => self.read_literal_string(),
            b'[' | b']' | b'{' | b'}' => Ok(Token::Keyword(vec![c])),
            b'/' => self.read_name(),
            b'>' => {
                if self.read_byte()? == b'>' {
                    return Ok(Token::keyword(">>"));
                }
                self.unread_byte();
                Err(PDFSyntaxError::UnexpectedDelimiter {
                    byte: c,
                    offset: self.read_offset() - 1,
                })
            }
            _ if is_delim(c) => Err(PDFSyntaxError::UnexpectedDelimiter {
                byte: c,
                offset: self.read_offset() - 1,
            }),
            _ => {
                self.unread_byte();
                self.read_keyword()
            }
        }
    }

    /// Next non-whitespace byte inside a hex string
    fn read_hex_byte(&mut self) -> PDFSyntaxResult<u8> {
        loop {
            let c = self.read_byte()?;
            if self.eof {
                return Err(PDFSyntaxError::MalformedHexString {
                    message: "unterminated hex string".to_string(),
                    offset: self.read_offset(),
                });
            }
            if !is_space(c) {
                return Ok(c);
            }
        }
    }

    // Whitespace is skipped between the two digits of a pair as well,
    // so `<4 1>` reads as "A".
    fn read_hex_string(&mut self) -> PDFSyntaxResult<Token> {
        let mut data = Vec::new();
        loop {
            let c = self.read_hex_byte()?;
            if c == b'>' {
                break;
            }
            let c2 = self.read_hex_byte()?;
            match (unhex(c), unhex(c2)) {
                (Some(hi), Some(lo)) => data.push((hi << 4) | lo),
                _ => {
                    return Err(PDFSyntaxError::MalformedHexString {
                        message: format!(
                            "invalid digit pair {:?}",
                            String::from_utf8_lossy(&[c, c2])
                        ),
                        offset: self.read_offset(),
                    })
                }
            }
        }
        Ok(Token::String(data))
    }

    fn read_literal_string(&mut self) -> PDFSyntaxResult<Token> {
        let mut data = Vec::new();
        let mut depth = 1;
        while !self.eof {
            let c = self.read_byte()?;
            if self.eof {
                break;
            }
            match c {
                b'(' => {
                    depth += 1;
                    data.push(c);
                }
                b')' => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                    data.push(c);
                }
                b'\\' => self.read_escape(&mut data)?,
                _ => data.push(c),
            }
        }
        Ok(Token::String(data))
    }

    /// Decode the escape following a backslash into `data`
    fn read_escape(&mut self, data: &mut Vec<u8>) -> PDFSyntaxResult<()> {
        let c = self.read_byte()?;
        if self.eof {
            return Ok(());
        }
        match c {
            b'n' => data.push(b'\n'),
            b'r' => data.push(b'\r'),
            b'b' => data.push(0x08),
            b't' => data.push(b'\t'),
            b'f' => data.push(0x0c),
            b'(' | b')' | b'\\' => data.push(c),
            b'\r' => {
                if self.read_byte()? != b'\n' {
                    self.unread_byte();
                }
            }
            b'\n' => {}
            b'0'..=b'7' => {
                let mut value = u32::from(c - b'0');
                for _ in 0..2 {
                    let c = self.read_byte()?;
                    if !(b'0'..=b'7').contains(&c) {
                        self.unread_byte();
                        break;
                    }
                    value = value * 8 + u32::from(c - b'0');
                }
                if value > 255 {
                    return Err(PDFSyntaxError::InvalidOctalEscape {
                        value,
                        offset: self.read_offset(),
                    });
                }
                data.push(value as u8);
            }
            _ => {
                return Err(PDFSyntaxError::InvalidEscape {
                    byte: c,
                    offset: self.read_offset() - 1,
                })
            }
        }
        Ok(())
    }

    fn read_name(&mut self) -> PDFSyntaxResult<Token> {
        let mut name = Vec::new();
        loop {
            let c = self.read_byte()?;
            if is_delim(c) || is_space(c) {
                self.unread_byte();
                break;
            }
            if c == b'#' {
                let hi = unhex(self.read_byte()?);
                let lo = unhex(self.read_byte()?);
                match (hi, lo) {
                    (Some(hi), Some(lo)) => name.push((hi << 4) | lo),
                    _ => {
                        return Err(PDFSyntaxError::MalformedName {
                            offset: self.read_offset(),
                        })
                    }
                }
                continue;
            }
            name.push(c);
        }
        Ok(Token::Name(Name::from(name)))
    }

    fn read_keyword(&mut self) -> PDFSyntaxResult<Token> {
        let start = self.read_offset();
        let mut text = Vec::new();
        loop {
            let c = self.read_byte()?;
            if is_delim(c) || is_space(c) {
                self.unread_byte();
                break;
            }
            text.push(c);
        }

        if text == b"true" || text == b"false" {
            return Ok(Token::Bool(text == b"true"));
        }
        if is_integer(&text) {
            return ascii(&text)
                .parse::<i64>()
                .map(Token::Integer)
                .map_err(|_| PDFSyntaxError::InvalidInteger {
                    text: ascii(&text).to_string(),
                    offset: start,
                });
        }
        if is_real(&text) {
            return match ascii(&text).parse::<f64>() {
                Ok(x) if x.is_finite() => Ok(Token::Real(x)),
                _ => Err(PDFSyntaxError::InvalidReal {
                    text: ascii(&text).to_string(),
                    offset: start,
                }),
            };
        }
        Ok(Token::Keyword(text))
    }
}

// Numeric text is validated as ASCII before it gets here.
fn ascii(s: &[u8]) -> &str {
    str::from_utf8(s).unwrap_or_default()
}
