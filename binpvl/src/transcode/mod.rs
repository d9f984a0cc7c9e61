//! Output formats that need a third-party serializer.

pub mod cbor;
pub mod toml;
pub mod yaml;
