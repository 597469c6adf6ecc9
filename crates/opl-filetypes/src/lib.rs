mod common;
mod parser;
mod writer;

pub mod crc;
pub mod util;

pub use common::*;
pub use parser::*;
pub use writer::*;
