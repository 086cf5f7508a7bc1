//! Common utilities for Vanadiel.
//!
//! This crate provides foundational types and utilities used across all Vanadiel crates:
//!
//! - [`BinaryReader`] - Zero-copy binary reading from byte slices
//! - [`obfuscation`] - Byte-level rotate and XOR transforms applied before record parsing
//! - [`text`] - Decoder for the game's Shift-JIS derived text encoding

mod error;
mod reader;

pub mod obfuscation;
pub mod text;

pub use error::{Error, Result};
pub use reader::BinaryReader;

/// Re-export zerocopy traits for convenience
pub use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};
