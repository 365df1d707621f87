//! Core types for wadesk.

mod contact;
mod message;

pub use contact::*;
pub use message::*;
