//! Core type definitions for the compiler module.

use std::collections::{HashMap, HashSet};

/// A sampler uniform referenced by a compiled pass, for the rendering host to
/// bind before drawing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SamplerBinding {
    /// GLSL uniform name (`texture_sampler_<id>`).
    pub uniform: String,
    /// Texture node that declared the sampler.
    pub node_id: String,
    /// Image path from the node's parameters; may be empty when unset.
    pub path: String,
}

/// A compiled pass output: the generated fragment source paired with the
/// fixed vertex boilerplate and the sampler bindings the fragment stage
/// expects.
#[derive(Debug, Clone)]
pub struct ShaderBundle {
    pub vertex: String,
    pub fragment: String,
    pub samplers: Vec<SamplerBinding>,
}

/// Per-pass emission state. Created at the start of a compilation pass and
/// discarded at its end; never shared across passes.
#[derive(Default)]
pub struct CompileContext {
    /// Body statements (and comment markers) in emission order.
    pub lines: Vec<String>,
    /// Uniform declarations hoisted above `main()`, in first-reference order.
    pub uniforms: Vec<String>,
    uniform_names: HashSet<String>,
    /// Memo of node id -> result symbol. Guarantees at-most-once emission per
    /// node regardless of fan-out, and that every consumer references the
    /// same value.
    pub symbol_by_node: HashMap<String, String>,
    /// Nodes currently being compiled; re-entry means a dependency cycle.
    pub(crate) resolving: HashSet<String>,
    /// Sampler uniforms declared by Texture nodes, in declaration order.
    pub samplers: Vec<SamplerBinding>,
}

impl CompileContext {
    pub fn push_line(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    /// Declare a uniform once per pass. Repeat declarations of the same name
    /// are dropped, so several UV nodes share one `resolution`.
    pub fn declare_uniform(&mut self, name: &str, decl: impl Into<String>) {
        if self.uniform_names.insert(name.to_string()) {
            self.uniforms.push(decl.into());
        }
    }

    pub fn register_sampler(&mut self, binding: SamplerBinding) {
        self.samplers.push(binding);
    }
}
