//! Core domain types for Parlor.
//!
//! This crate contains pure domain types with no IO, no async, and minimal dependencies.
//! Everything here can be used from any layer of the application.

mod message;
mod text;

pub use message::{IMAGE_FORMAT_PATH, Message, MessageKind, MessageShapeError, Role};
pub use text::{elide_middle, head_chars, preview, tail_chars};
