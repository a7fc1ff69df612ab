//! JSONL trail of committed commands.
//!
//! One file per study under the configured trail directory.

pub mod writer;
