// PieLog - core/mod.rs
//
// Core record pipeline: levels, colour policy, call-site attribution,
// rendering.
// Must NOT depend on: app or platform. No filesystem or stream I/O.

pub mod callsite;
pub mod color;
pub mod level;
pub mod record;
