#![warn(clippy::pedantic)]

pub mod error;
pub mod escape;
pub mod frame;
pub mod layout;
pub mod scanner;
pub mod varint;

pub use error::WireError;
pub use escape::{ValueScan, escape, escape_into, scan_value};
pub use frame::{Frame, FrameKind};
pub use scanner::StructuralScanner;
