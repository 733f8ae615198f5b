//! Recursive-descent object parser over the token stream

use std::io::Read;
use log::trace;

use crate::error::{PDFSyntaxError, PDFSyntaxResult};
use super::{Buffer, Dictionary, ObjDef, ObjPtr, Object, Stream, Token};

impl<R: Read> Buffer<R> {
    /// Parse the next object
    ///
    /// With reference lookahead on, an integer may turn out to start an
    /// `id gen R` reference or an `id gen obj` definition; up to two extra
    /// tokens are read and pushed back when they don't.
    pub fn read_object(&mut self) -> PDFSyntaxResult<Object> {
        let token = match self.read_token()? {
            Token::Keyword(kw) => {
                return match kw.as_slice() {
                    b"null" => Ok(Object::Null),
                    b"<<" => self.read_dict(),
                    b"[" => self.read_array().map(Object::Array),
                    _ => Err(PDFSyntaxError::UnexpectedKeyword {
                        keyword: String::from_utf8_lossy(&kw).into_owned(),
                        offset: self.read_offset(),
                    }),
                };
            }
            Token::Eof => {
                return Err(PDFSyntaxError::UnexpectedEof {
                    offset: self.read_offset(),
                })
            }
            Token::String(data) => Token::String(self.decrypt(data)?),
            token => token,
        };

        if !self.allow_objptr {
            return Object::try_from(token);
        }
        let Token::Integer(first) = token else {
            return Object::try_from(token);
        };
        let Ok(id) = u32::try_from(first) else {
            return Ok(Object::Integer(first));
        };

        let second = self.read_token()?;
        if let Token::Integer(n) = second {
            if let Ok(gen) = u16::try_from(n) {
                let third = self.read_token()?;
                if third.is_keyword("R") {
                    return Ok(Object::Reference(ObjPtr::new(id, gen)));
                }
                if third.is_keyword("obj") {
                    return self.read_definition(ObjPtr::new(id, gen));
                }
                self.unread_token(third);
            }
        }
        self.unread_token(second);
        Ok(Object::Integer(first))
    }

    /// Decrypt string bytes when a key is set and the current object is known
    fn decrypt(&self, data: Vec<u8>) -> PDFSyntaxResult<Vec<u8>> {
        match &self.key {
            Some(key) if self.objptr.id != 0 => {
                self.crypto.decrypt_string(key, self.cipher, self.objptr, &data)
            }
            _ => Ok(data),
        }
    }

    fn read_definition(&mut self, ptr: ObjPtr) -> PDFSyntaxResult<Object> {
        trace!("Parsing indirect object {} {}", ptr.id, ptr.gen);
        let saved = std::mem::replace(&mut self.objptr, ptr);
        let result = self.read_definition_body();
        self.objptr = saved;

        let obj = result?;
        trace!("Finished indirect object {} {}", ptr.id, ptr.gen);
        Ok(Object::Definition(ObjDef::new(ptr, obj)))
    }

    fn read_definition_body(&mut self) -> PDFSyntaxResult<Object> {
        let obj = self.read_object()?;
        if matches!(obj, Object::Stream(_)) {
            return Ok(obj);
        }
        let token = self.read_token()?;
        if !token.is_keyword("endobj") {
            let offset = self.read_offset();
            self.unread_token(token);
            return Err(PDFSyntaxError::MissingEndobj { offset });
        }
        Ok(obj)
    }

    /// Parse array elements up to `]`; the opening `[` is already consumed.
    pub fn read_array(&mut self) -> PDFSyntaxResult<Vec<Object>> {
        let mut array = Vec::new();
        loop {
            let token = self.read_token()?;
            if token == Token::Eof || token.is_keyword("]") {
                break;
            }
            self.unread_token(token);
            array.push(self.read_object()?);
        }
        Ok(array)
    }

    /// Parse dictionary entries up to `>>`; the opening `<<` is already consumed.
    ///
    /// With stream detection on, a following `stream` keyword turns the
    /// dictionary into the header of a [`Stream`].
    pub fn read_dict(&mut self) -> PDFSyntaxResult<Object> {
        let mut dict = Dictionary::new();
        loop {
            let key = match self.read_token()? {
                Token::Eof => break,
                Token::Name(name) => name,
                token if token.is_keyword(">>") => break,
                token => {
                    return Err(PDFSyntaxError::NonNameKey {
                        found: token.to_string(),
                        offset: self.read_offset(),
                    })
                }
            };
            let value = self.read_object()?;
            dict.insert(key, value);
        }

        if !self.allow_stream {
            return Ok(Object::Dictionary(dict));
        }
        let token = self.read_token()?;
        if !token.is_keyword("stream") {
            self.unread_token(token);
            return Ok(Object::Dictionary(dict));
        }

        match self.read_byte()? {
            b'\r' => {
                if self.read_byte()? != b'\n' {
                    self.unread_byte();
                }
            }
            b'\n' => {}
            _ => {
                return Err(PDFSyntaxError::StreamWithoutNewline {
                    offset: self.read_offset() - 1,
                })
            }
        }

        let offset = self.read_offset();
        trace!("Stream of object {} {} starts at offset {}", self.objptr.id, self.objptr.gen, offset);
        Ok(Object::Stream(Stream::new(dict, self.objptr, offset)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::CryptoProvider;
    use crate::pdf::{BufferConfig, Name};
    use crate::Cipher;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;
    use std::sync::{Arc, Mutex};
    use test_log::test;

    fn lenient(data: &[u8]) -> Buffer<Cursor<Vec<u8>>> {
        let mut buffer = Buffer::from_bytes(data.to_vec());
        buffer.set_allow_eof(true);
        buffer
    }

    /// Records the object pointer of every call and reverses the bytes
    #[derive(Default, Clone)]
    struct RecordingProvider {
        calls: Arc<Mutex<Vec<ObjPtr>>>,
    }

    impl CryptoProvider for RecordingProvider {
        fn decrypt_string(
            &self,
            _key: &[u8],
            _cipher: Cipher,
            ptr: ObjPtr,
            data: &[u8],
        ) -> PDFSyntaxResult<Vec<u8>> {
            self.calls.lock().unwrap().push(ptr);
            Ok(data.iter().rev().copied().collect())
        }
    }

    struct FailingProvider;

    impl CryptoProvider for FailingProvider {
        fn decrypt_string(&self, _: &[u8], _: Cipher, _: ObjPtr, _: &[u8]) -> PDFSyntaxResult<Vec<u8>> {
            Err(PDFSyntaxError::crypto("bad key"))
        }
    }

    #[test]
    fn test_reference() -> PDFSyntaxResult<()> {
        let mut buffer = lenient(b"5 0 R");
        assert_eq!(buffer.read_object()?, Object::Reference(ObjPtr::new(5, 0)));
        Ok(())
    }

    #[test]
    fn test_definition() -> PDFSyntaxResult<()> {
        let mut buffer = lenient(b"5 0 obj 42 endobj");
        let expected = Object::Definition(ObjDef::new(ObjPtr::new(5, 0), Object::Integer(42)));
        assert_eq!(buffer.read_object()?, expected);
        assert_eq!(buffer.objptr(), ObjPtr::default());
        Ok(())
    }

    #[test]
    fn test_integer_followed_by_name() -> PDFSyntaxResult<()> {
        let mut buffer = lenient(b"5 /X");
        assert_eq!(buffer.read_object()?, Object::Integer(5));
        assert_eq!(buffer.read_token()?, Token::Name(Name::from("X")));
        Ok(())
    }

    #[test]
    fn test_two_integers_are_pushed_back_in_order() -> PDFSyntaxResult<()> {
        let mut buffer = lenient(b"1 2 3");
        assert_eq!(buffer.read_object()?, Object::Integer(1));
        assert_eq!(buffer.read_object()?, Object::Integer(2));
        assert_eq!(buffer.read_object()?, Object::Integer(3));
        Ok(())
    }

    #[test]
    fn test_out_of_range_ids_are_plain_integers() -> PDFSyntaxResult<()> {
        let mut buffer = lenient(b"-1 0 R");
        assert_eq!(buffer.read_object()?, Object::Integer(-1));
        assert_eq!(buffer.read_object()?, Object::Integer(0));

        let mut buffer = lenient(b"4 70000 R");
        assert_eq!(buffer.read_object()?, Object::Integer(4));
        assert_eq!(buffer.read_object()?, Object::Integer(70000));
        Ok(())
    }

    #[test]
    fn test_lookahead_disabled() -> PDFSyntaxResult<()> {
        let mut buffer = lenient(b"5 0 R");
        buffer.set_allow_objptr(false);
        assert_eq!(buffer.read_object()?, Object::Integer(5));
        assert_eq!(buffer.read_object()?, Object::Integer(0));
        assert_eq!(buffer.read_token()?, Token::keyword("R"));
        Ok(())
    }

    #[test]
    fn test_dictionary_without_stream() -> PDFSyntaxResult<()> {
        let mut buffer = lenient(b"<< /Type /Catalog >> trailer");
        let obj = buffer.read_object()?;
        let dict = obj.as_dict().unwrap();
        assert_eq!(dict.len(), 1);
        assert_eq!(dict.get_name("Type"), Some(&Name::from("Catalog")));
        assert_eq!(buffer.read_token()?, Token::keyword("trailer"));
        Ok(())
    }

    #[test]
    fn test_nested_containers() -> PDFSyntaxResult<()> {
        let mut buffer = lenient(b"<< /Kids [3 0 R [true null] << /A 1.5 >>] /Count 2 >>");
        let obj = buffer.read_object()?;
        let dict = obj.as_dict().unwrap();
        let kids = dict.get_array("Kids").unwrap();
        assert_eq!(kids[0], Object::Reference(ObjPtr::new(3, 0)));
        assert_eq!(kids[1], Object::Array(vec![Object::Bool(true), Object::Null]));
        assert_eq!(kids[2].as_dict().unwrap().get("A"), Some(&Object::Real(1.5)));
        assert_eq!(dict.get_integer("Count"), Some(2));
        Ok(())
    }

    #[test]
    fn test_stream_offsets() -> PDFSyntaxResult<()> {
        for (input, offset) in [
            (&b"<< /Length 3 >>stream\r\nabc"[..], 23),
            (&b"<< /Length 3 >>stream\nabc"[..], 22),
            (&b"<< /Length 3 >>stream\rabc"[..], 22),
        ] {
            let mut buffer = lenient(input);
            let obj = buffer.read_object()?;
            let stream = obj.as_stream().unwrap();
            assert_eq!(stream.offset, offset);
            assert_eq!(stream.length(), Some(3));
        }
        Ok(())
    }

    #[test]
    fn test_stream_without_newline() {
        let mut buffer = lenient(b"<< >> stream abc");
        let err = buffer.read_object().unwrap_err();
        assert!(matches!(err, PDFSyntaxError::StreamWithoutNewline { offset: 12 }));
    }

    #[test]
    fn test_stream_detection_disabled() -> PDFSyntaxResult<()> {
        let mut buffer = lenient(b"<< >> stream\n");
        buffer.set_allow_stream(false);
        assert_eq!(buffer.read_object()?, Object::Dictionary(Dictionary::new()));
        assert_eq!(buffer.read_token()?, Token::keyword("stream"));
        Ok(())
    }

    #[test]
    fn test_stream_definition_needs_no_endobj() -> PDFSyntaxResult<()> {
        let mut buffer = lenient(b"7 1 obj << /Length 0 >> stream\n");
        let obj = buffer.read_object()?;
        let def = obj.as_definition().unwrap();
        assert_eq!(def.ptr, ObjPtr::new(7, 1));
        let stream = def.obj.as_stream().unwrap();
        assert_eq!(stream.ptr, ObjPtr::new(7, 1));
        assert_eq!(stream.offset, 31);
        Ok(())
    }

    #[test]
    fn test_missing_endobj() -> PDFSyntaxResult<()> {
        let mut buffer = lenient(b"5 0 obj 42 trailer");
        let err = buffer.read_object().unwrap_err();
        assert!(matches!(err, PDFSyntaxError::MissingEndobj { .. }));
        assert_eq!(buffer.objptr(), ObjPtr::default());
        assert_eq!(buffer.read_token()?, Token::keyword("trailer"));
        Ok(())
    }

    #[test]
    fn test_objptr_restored_after_error() {
        let mut buffer = lenient(b"9 0 obj << 1 2 >> endobj");
        buffer.set_objptr(ObjPtr::new(1, 0));
        let err = buffer.read_object().unwrap_err();
        assert!(matches!(err, PDFSyntaxError::NonNameKey { .. }));
        assert_eq!(buffer.objptr(), ObjPtr::new(1, 0));
    }

    #[test]
    fn test_unexpected_keyword() {
        let mut buffer = lenient(b"endobj");
        let err = buffer.read_object().unwrap_err();
        match err {
            PDFSyntaxError::UnexpectedKeyword { keyword, .. } => assert_eq!(keyword, "endobj"),
            other => panic!("unexpected error {:?}", other),
        }
        assert!(matches!(lenient(b"]").read_object(), Err(PDFSyntaxError::UnexpectedKeyword { .. })));
    }

    #[test]
    fn test_eof_object_is_error() {
        let err = lenient(b"  ").read_object().unwrap_err();
        assert!(err.is_eof());
    }

    #[test]
    fn test_unterminated_containers_end_at_eof() -> PDFSyntaxResult<()> {
        assert_eq!(
            lenient(b"[1 2").read_object()?,
            Object::Array(vec![Object::Integer(1), Object::Integer(2)])
        );
        let obj = lenient(b"<< /A (x)").read_object()?;
        assert_eq!(obj.as_dict().unwrap().get_string("A"), Some(&b"x"[..]));
        Ok(())
    }

    #[test]
    fn test_strings_decrypted_inside_definitions() -> PDFSyntaxResult<()> {
        let provider = RecordingProvider::default();
        let calls = provider.calls.clone();

        let mut buffer = lenient(b"(top) 4 0 obj << /T (abc) /K [(de)] >> endobj");
        buffer.set_crypto_provider(Box::new(provider));
        buffer.set_key(b"12345", Cipher::Rc4);

        // Object id 0 means no decryption
        assert_eq!(buffer.read_object()?, Object::String(b"top".to_vec()));

        let obj = buffer.read_object()?;
        let dict = obj.as_definition().unwrap().obj.as_dict().unwrap().clone();
        assert_eq!(dict.get_string("T"), Some(&b"cba"[..]));
        assert_eq!(dict.get_array("K").unwrap()[0], Object::String(b"ed".to_vec()));
        assert_eq!(*calls.lock().unwrap(), vec![ObjPtr::new(4, 0), ObjPtr::new(4, 0)]);
        Ok(())
    }

    #[test]
    fn test_no_decryption_without_key() -> PDFSyntaxResult<()> {
        let mut buffer = lenient(b"(plain)");
        buffer.set_crypto_provider(Box::new(FailingProvider));
        buffer.set_objptr(ObjPtr::new(3, 0));
        assert_eq!(buffer.read_object()?, Object::String(b"plain".to_vec()));
        Ok(())
    }

    #[test]
    fn test_decryption_error_propagates() {
        let mut buffer = lenient(b"(data)");
        buffer.set_crypto_provider(Box::new(FailingProvider));
        buffer.set_key(b"12345", Cipher::Aes);
        buffer.set_objptr(ObjPtr::new(3, 0));
        let err = buffer.read_object().unwrap_err();
        assert!(err.is_crypto_error());
    }

    #[test]
    fn test_parse_across_small_blocks() -> PDFSyntaxResult<()> {
        let config = BufferConfig {
            capacity: 2,
            allow_eof: true,
            ..BufferConfig::default()
        };
        let data = b"12 0 obj\n<< /Length 5 /Filter /FlateDecode >>\nstream\r\nhello".to_vec();
        let mut buffer = Buffer::with_config(Cursor::new(data), 0, config);
        let obj = buffer.read_object()?;
        let stream = obj.as_definition().unwrap().obj.as_stream().unwrap().clone();
        assert_eq!(stream.ptr, ObjPtr::new(12, 0));
        assert_eq!(stream.offset, 54);
        assert_eq!(stream.header.get_name("Filter"), Some(&Name::from("FlateDecode")));
        Ok(())
    }
}
