// PieLog - platform/mod.rs
//
// Platform layer: configuration loading and the filesystem sink.
// Dependencies: core (level, colour and layout types), util.
// Must NOT depend on: app.

pub mod config;
pub mod fs;
