//! Command implementations behind the `chunk-graph` binary.

pub mod commands;

pub use commands::{NavigateOp, SplitMode, load_config, navigate, read_collection, split};
