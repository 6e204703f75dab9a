//! Match-3 engine (workspace facade crate).
//!
//! This package exposes `match3::{core,types}` while the implementation lives in
//! dedicated crates under `crates/`.

pub use match3_core as core;
pub use match3_types as types;
