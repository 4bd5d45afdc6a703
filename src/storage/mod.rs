pub mod document;
pub mod kv;
pub mod recent;
