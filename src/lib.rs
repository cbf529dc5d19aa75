//! Compile a directed graph of shading operations into GLSL fragment source.
//!
//! `dsl` holds the serializable graph model, `graph` the editing operations
//! the surrounding application drives, and `compiler` the memoized
//! graph-walking engine plus the source assembler.

pub mod compiler;
pub mod dsl;
pub mod graph;
