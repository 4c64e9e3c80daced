// PieLog - app/mod.rs
//
// Application layer: the dispatcher and the execution tracer.
// Dependencies: core, platform, util.

pub mod logger;
pub mod tracer;
