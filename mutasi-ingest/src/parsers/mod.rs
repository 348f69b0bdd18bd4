//! Bank-specific statement parsers.

pub mod jago;
