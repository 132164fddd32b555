//! Input normalizers shared by every filter category.
//!
//! Keystroke-time helpers restrict what gets stored; submit-time helpers coerce stored text into
//! the JSON types the API expects.

pub mod normalizers;

pub use normalizers::*;
