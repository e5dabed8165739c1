// Allow dead code for items that are part of the public API but only used in tests
#![allow(dead_code)]

pub mod convert;
pub mod data;
pub mod dialect;
pub mod error;
pub mod input;
pub mod schema;
pub mod writer;

pub use error::DumpError;
