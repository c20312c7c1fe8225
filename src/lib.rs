//! Chattris (workspace facade crate).
//!
//! Exposes `chattris::{core,adapter,types}` while the implementation lives in
//! dedicated crates under `crates/`.

pub use chattris_adapter as adapter;
pub use chattris_core as core;
pub use chattris_types as types;
