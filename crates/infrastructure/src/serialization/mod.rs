//! JSON helpers for files the client writes to disk.
//!
//! Output is pretty-printed with 2-space indentation and a trailing newline
//! so the session file stays readable when inspected by hand.

mod json;

pub use json::{SerializationError, from_json_bytes, to_json_stable, to_json_stable_bytes};
