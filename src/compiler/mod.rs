//! Graph-to-source compilation engine.
//!
//! Walks the node graph from a root (or every node in iteration order),
//! resolves each node's inputs by following connections or synthesizing
//! defaults, emits each node's statements exactly once per pass, and hands
//! the collected lines to the assembler.

pub mod glsl;
pub mod nodes;
pub mod types;

use std::collections::HashMap;

use anyhow::{Result, bail};
use tracing::{debug, trace};

use crate::dsl::{Node, NodeKind, ShaderGraph, find_node, incoming_connection, nodes_by_id};

pub use glsl::{AssembleMode, BOILERPLATE_VERTEX_GLSL, assemble};
pub use types::{CompileContext, SamplerBinding, ShaderBundle};

/// Compile every node in the graph, in the graph's iteration order.
///
/// The symbol of the last node visited becomes the pass output; an empty
/// graph produces a minimal program writing opaque black.
pub fn compile_graph(graph: &ShaderGraph) -> Result<ShaderBundle> {
    let by_id = nodes_by_id(graph);
    let mut ctx = CompileContext::default();
    let mut final_symbol: Option<String> = None;
    for node in &graph.nodes {
        final_symbol = Some(compile_node_memoized(graph, &by_id, &node.id, &mut ctx)?);
    }
    debug!(
        nodes = graph.nodes.len(),
        lines = ctx.lines.len(),
        final_symbol = final_symbol.as_deref().unwrap_or("<none>"),
        "compiled shader graph"
    );
    Ok(bundle(ctx, final_symbol, AssembleMode::WholeGraph))
}

/// Compile only `root_id` and everything it transitively depends on.
pub fn compile_node(graph: &ShaderGraph, root_id: &str) -> Result<ShaderBundle> {
    let by_id = nodes_by_id(graph);
    let mut ctx = CompileContext::default();
    let final_symbol = compile_node_memoized(graph, &by_id, root_id, &mut ctx)?;
    debug!(root = root_id, lines = ctx.lines.len(), "compiled single node");
    Ok(bundle(ctx, Some(final_symbol), AssembleMode::SingleNode))
}

fn bundle(ctx: CompileContext, final_symbol: Option<String>, mode: AssembleMode) -> ShaderBundle {
    let fragment = assemble(&ctx.uniforms, &ctx.lines, final_symbol.as_deref(), mode);
    ShaderBundle {
        vertex: BOILERPLATE_VERTEX_GLSL.to_string(),
        fragment,
        samplers: ctx.samplers,
    }
}

/// Memoized per-node compile.
///
/// Returns the already-emitted symbol when the node was compiled earlier in
/// this pass, so a node with many consumers is emitted at most once and every
/// consumer references the same value. Re-entry while the node is still being
/// compiled means the graph has a dependency cycle; the pass fails before any
/// text is returned.
fn compile_node_memoized(
    graph: &ShaderGraph,
    by_id: &HashMap<&str, &Node>,
    node_id: &str,
    ctx: &mut CompileContext,
) -> Result<String> {
    if let Some(sym) = ctx.symbol_by_node.get(node_id) {
        return Ok(sym.clone());
    }
    if !ctx.resolving.insert(node_id.to_string()) {
        bail!("cycle detected while compiling node {node_id}");
    }

    let node = find_node(by_id, node_id)?;
    let symbol = match &node.kind {
        NodeKind::Material(p) => nodes::emit_material(graph, by_id, node, p, ctx)?,
        NodeKind::Color(p) => nodes::emit_color(node, p, ctx)?,
        NodeKind::Blend(p) => nodes::emit_blend(graph, by_id, node, p, ctx)?,
        NodeKind::Texture(p) => nodes::emit_texture(graph, by_id, node, p, ctx)?,
        NodeKind::Uv => nodes::emit_uv(node, ctx)?,
        NodeKind::Gradient(p) => nodes::emit_gradient(graph, by_id, node, p, ctx)?,
        NodeKind::Add => nodes::emit_add(graph, by_id, node, ctx)?,
    };

    ctx.resolving.remove(node_id);
    ctx.symbol_by_node
        .insert(node_id.to_string(), symbol.clone());
    trace!(node = node_id, symbol = %symbol, "emitted node");
    Ok(symbol)
}

/// Resolve the symbol feeding `port` on `node`: follow the incoming
/// connection and compile upstream, or synthesize a typed default declaration
/// when the port is unconnected.
pub(crate) fn resolve_input(
    graph: &ShaderGraph,
    by_id: &HashMap<&str, &Node>,
    node: &Node,
    port: &str,
    ctx: &mut CompileContext,
) -> Result<String> {
    if let Some(conn) = incoming_connection(graph, &node.id, port) {
        return compile_node_memoized(graph, by_id, &conn.from.node_id, ctx);
    }
    nodes::emit_default_input(node, port, ctx)
}
