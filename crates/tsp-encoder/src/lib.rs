#![warn(clippy::pedantic)]

pub mod error;
pub mod encoder;
pub mod framed;
pub mod stream;

pub use encoder::{ResponseEncoder, encode_to_string};
pub use error::EncodeError;
pub use framed::{LegacyBridge, encode_framed};
pub use stream::encode_stream;
