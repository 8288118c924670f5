pub mod source_client;

pub use source_client::*;
