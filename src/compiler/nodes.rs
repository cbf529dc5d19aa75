//! Per-kind source emission: the node model.
//!
//! Each function turns one node's parameters and resolved inputs into GLSL
//! statements appended to the pass context, and returns the symbol the node
//! exposes to downstream consumers. Nothing here mutates graph state.

use std::collections::HashMap;

use anyhow::{Result, bail};

use crate::dsl::{
    BlendMode, BlendParams, ColorParams, GradientParams, MaterialParams, Node, NodeKind,
    ShaderGraph, ShadingModel, TextureParams,
};

use super::glsl::{fmt_f32, sanitize_glsl_ident};
use super::resolve_input;
use super::types::{CompileContext, SamplerBinding};

/// The deterministic variable name a node's result is bound to, derived from
/// the node's kind and stable id. Unique within a pass because node ids are.
pub(crate) fn result_symbol(node: &Node) -> String {
    let prefix = match node.kind {
        NodeKind::Material(_) => "material",
        NodeKind::Color(_) => "color",
        NodeKind::Blend(_) => "blend",
        NodeKind::Texture(_) => "texture",
        NodeKind::Uv => "uv",
        NodeKind::Gradient(_) => "gradient",
        NodeKind::Add => "add",
    };
    format!("{prefix}_{}", sanitize_glsl_ident(&node.id))
}

fn vec3_ctor(c: [f32; 3]) -> String {
    format!(
        "vec3({}, {}, {})",
        fmt_f32(c[0]),
        fmt_f32(c[1]),
        fmt_f32(c[2])
    )
}

fn begin_marker(node: &Node) -> String {
    format!(
        "// Begin {} Node {} ({})",
        node.kind.name(),
        node.id,
        node.kind.name()
    )
}

fn end_marker(node: &Node) -> String {
    format!(
        "// End {} Node {} ({})",
        node.kind.name(),
        node.id,
        node.kind.name()
    )
}

pub(crate) fn emit_color(node: &Node, p: &ColorParams, ctx: &mut CompileContext) -> Result<String> {
    let sym = result_symbol(node);
    ctx.push_line(begin_marker(node));
    ctx.push_line(format!(
        "vec4 {sym} = vec4({}, {}, {}, 1.0);",
        fmt_f32(p.color[0]),
        fmt_f32(p.color[1]),
        fmt_f32(p.color[2])
    ));
    ctx.push_line(end_marker(node));
    Ok(sym)
}

pub(crate) fn emit_material(
    graph: &ShaderGraph,
    by_id: &HashMap<&str, &Node>,
    node: &Node,
    p: &MaterialParams,
    ctx: &mut CompileContext,
) -> Result<String> {
    let color = resolve_input(graph, by_id, node, "Color", ctx)?;
    let sym = result_symbol(node);
    let id = sanitize_glsl_ident(&node.id);
    ctx.push_line(begin_marker(node));
    match p.shading_model {
        ShadingModel::Lambert => {
            ctx.push_line(format!(
                "vec3 lightDir_{id} = normalize(vec3(0.0, 0.0, 1.0)); // Light coming straight down"
            ));
            ctx.push_line(format!(
                "vec3 normal_{id} = normalize(vec3(0.0, 0.0, 1.0)); // Surface normal"
            ));
            ctx.push_line(format!(
                "vec4 {sym} = vec4({color}.rgb * max(dot(normal_{id}, lightDir_{id}), 0.0), 1.0);"
            ));
        }
        ShadingModel::Phong => {
            ctx.push_line(format!(
                "vec3 normal_{id} = normalize(vec3(0.0, 0.0, 1.0)); // Surface normal"
            ));
            ctx.push_line(format!(
                "vec3 lightDir_{id} = normalize(vec3(0.0, 0.0, 1.0)); // Light coming straight down"
            ));
            ctx.push_line(format!(
                "vec3 viewDir_{id} = normalize(vec3(0.0, 0.0, 1.0)); // View direction"
            ));
            ctx.push_line(format!(
                "vec3 reflectDir_{id} = reflect(-lightDir_{id}, normal_{id});"
            ));
            ctx.push_line(format!(
                "float spec_{id} = {} * pow(max(dot(viewDir_{id}, reflectDir_{id}), {}), 32.0);",
                fmt_f32(p.specular_intensity),
                fmt_f32(p.shininess)
            ));
            ctx.push_line(format!(
                "vec4 {sym} = vec4({color}.rgb * max(dot(normal_{id}, lightDir_{id}), 0.0) + {} * spec_{id}, 1.0);",
                vec3_ctor(p.specular_color)
            ));
        }
    }
    ctx.push_line(end_marker(node));
    Ok(sym)
}

pub(crate) fn emit_blend(
    graph: &ShaderGraph,
    by_id: &HashMap<&str, &Node>,
    node: &Node,
    p: &BlendParams,
    ctx: &mut CompileContext,
) -> Result<String> {
    let a = resolve_input(graph, by_id, node, "Color A", ctx)?;
    let b = resolve_input(graph, by_id, node, "Color B", ctx)?;
    let sym = result_symbol(node);
    ctx.push_line(begin_marker(node));
    let stmt = match p.blend_mode {
        BlendMode::Multiply => format!("vec4 {sym} = vec4({a}.rgb * {b}.rgb, 1.0);"),
        BlendMode::Screen => {
            format!("vec4 {sym} = vec4(1.0 - (1.0 - {a}.rgb) * (1.0 - {b}.rgb), 1.0);")
        }
        BlendMode::Overlay => format!(
            "vec4 {sym} = vec4(({a}.r < 0.5) ? (2.0 * {a}.r * {b}.r) : (1.0 - 2.0 * (1.0 - {a}.r) * (1.0 - {b}.r)), ({a}.g < 0.5) ? (2.0 * {a}.g * {b}.g) : (1.0 - 2.0 * (1.0 - {a}.g) * (1.0 - {b}.g)), ({a}.b < 0.5) ? (2.0 * {a}.b * {b}.b) : (1.0 - 2.0 * (1.0 - {a}.b) * (1.0 - {b}.b)), 1.0);"
        ),
    };
    ctx.push_line(stmt);
    ctx.push_line(end_marker(node));
    Ok(sym)
}

pub(crate) fn emit_texture(
    graph: &ShaderGraph,
    by_id: &HashMap<&str, &Node>,
    node: &Node,
    p: &TextureParams,
    ctx: &mut CompileContext,
) -> Result<String> {
    let uv = resolve_input(graph, by_id, node, "UV", ctx)?;
    let sym = result_symbol(node);
    let sampler = format!("texture_sampler_{}", sanitize_glsl_ident(&node.id));
    ctx.declare_uniform(&sampler, format!("uniform sampler2D {sampler};"));
    ctx.register_sampler(SamplerBinding {
        uniform: sampler.clone(),
        node_id: node.id.clone(),
        path: p.texture.clone(),
    });
    ctx.push_line(begin_marker(node));
    ctx.push_line(format!("vec4 {sym} = texture2D({sampler}, {uv});"));
    ctx.push_line(end_marker(node));
    Ok(sym)
}

pub(crate) fn emit_uv(node: &Node, ctx: &mut CompileContext) -> Result<String> {
    let sym = result_symbol(node);
    ctx.declare_uniform("resolution", "uniform vec2 resolution;");
    ctx.push_line(begin_marker(node));
    ctx.push_line(format!("vec2 {sym} = gl_FragCoord.xy / resolution;"));
    ctx.push_line(end_marker(node));
    Ok(sym)
}

pub(crate) fn emit_gradient(
    graph: &ShaderGraph,
    by_id: &HashMap<&str, &Node>,
    node: &Node,
    p: &GradientParams,
    ctx: &mut CompileContext,
) -> Result<String> {
    let uv = resolve_input(graph, by_id, node, "UV", ctx)?;
    let sym = result_symbol(node);
    ctx.push_line(begin_marker(node));
    ctx.push_line(format!(
        "vec3 {sym} = mix({}, {}, {uv}.y);",
        vec3_ctor(p.color_a),
        vec3_ctor(p.color_b)
    ));
    ctx.push_line(end_marker(node));
    Ok(sym)
}

pub(crate) fn emit_add(
    graph: &ShaderGraph,
    by_id: &HashMap<&str, &Node>,
    node: &Node,
    ctx: &mut CompileContext,
) -> Result<String> {
    let a = resolve_input(graph, by_id, node, "A", ctx)?;
    let b = resolve_input(graph, by_id, node, "B", ctx)?;
    let sym = result_symbol(node);
    ctx.push_line(begin_marker(node));
    ctx.push_line(format!("vec4 {sym} = {a} + {b};"));
    ctx.push_line(end_marker(node));
    Ok(sym)
}

/// Synthesize the declaration for an unconnected input port and return its
/// symbol.
///
/// Emitted at most once per (node, port) per pass: a port is only resolved
/// while its node compiles, and a node compiles at most once.
pub(crate) fn emit_default_input(
    node: &Node,
    port: &str,
    ctx: &mut CompileContext,
) -> Result<String> {
    let id = sanitize_glsl_ident(&node.id);
    match (&node.kind, port) {
        (NodeKind::Material(p), "Color") => {
            let sym = format!("base_color_{id}");
            ctx.push_line(format!("vec3 {sym} = {};", vec3_ctor(p.base_color)));
            Ok(sym)
        }
        (NodeKind::Blend(_), "Color A" | "Color B") => {
            let sym = format!("default_{}_{id}", port_slug(port));
            ctx.push_line(format!("vec3 {sym} = vec3(1.0);"));
            Ok(sym)
        }
        (NodeKind::Texture(_) | NodeKind::Gradient(_), "UV") => {
            let sym = format!("default_uv_{id}");
            ctx.push_line(format!("vec2 {sym} = vec2(0.0, 0.0);"));
            Ok(sym)
        }
        (NodeKind::Add, "A" | "B") => {
            let sym = format!("default_{}_{id}", port_slug(port));
            ctx.push_line(format!("vec4 {sym} = vec4(0.0, 0.0, 0.0, 1.0);"));
            Ok(sym)
        }
        _ => bail!(
            "node {} ({}) has no input port {port}",
            node.id,
            node.kind.name()
        ),
    }
}

fn port_slug(port: &str) -> String {
    sanitize_glsl_ident(&port.to_ascii_lowercase())
}
