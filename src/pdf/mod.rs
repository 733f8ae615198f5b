//! PDF lexing and object parsing module

mod buffer;
mod token;
mod lexer;
mod object;
mod dict;
mod parser;

pub use buffer::{Buffer, BufferConfig, DEFAULT_BUFFER_SIZE};
pub use dict::Dictionary;
pub use object::{ObjDef, ObjPtr, Object, Stream};
pub use token::{Name, Token};
