//! GLSL source assembly: literal formatting, identifier sanitizing, and the
//! final program wrapping.

/// Fixed vertex stage the rendering host links every generated fragment
/// shader against.
pub const BOILERPLATE_VERTEX_GLSL: &str = "\
#version 120
attribute vec3 position;
attribute vec2 texCoord;
varying vec2 TexCoords;
void main() {
    gl_Position = vec4(position, 1.0);
    TexCoords = texCoord;
}
";

/// How the pass's final symbol is written to the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssembleMode {
    /// Narrow via an intermediate `vec3 color` and force alpha to 1.0.
    WholeGraph,
    /// Write the symbol straight into the output.
    SingleNode,
}

pub(crate) fn fmt_f32(v: f32) -> String {
    if v.is_finite() {
        let s = format!("{v:.9}");
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        "0.0".to_string()
    }
}

pub(crate) fn sanitize_glsl_ident(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        if ch.is_ascii_alphanumeric() || ch == '_' {
            out.push(ch);
        } else {
            out.push('_');
        }
    }
    if out.is_empty() {
        out.push('_');
    }
    out
}

/// Wrap uniform declarations and body statements into a complete fragment
/// program.
///
/// With no compiled output (`final_symbol` is `None`), emits a minimal
/// program writing opaque black; the result is never empty. No semantic
/// validation happens here, the wrapping is purely textual.
pub fn assemble(
    uniforms: &[String],
    lines: &[String],
    final_symbol: Option<&str>,
    mode: AssembleMode,
) -> String {
    let Some(final_symbol) = final_symbol else {
        return concat!(
            "#version 120\n",
            "\n",
            "void main() {\n",
            "    gl_FragColor = vec4(0.0, 0.0, 0.0, 1.0);  // Default to black if no output\n",
            "}\n",
        )
        .to_string();
    };

    let mut out = String::from("#version 120\n");
    if !uniforms.is_empty() {
        out.push('\n');
        for u in uniforms {
            out.push_str(u);
            out.push('\n');
        }
    }
    out.push('\n');
    out.push_str("void main() {\n");
    for line in lines {
        out.push_str("    ");
        out.push_str(line);
        out.push('\n');
    }
    match mode {
        AssembleMode::WholeGraph => {
            out.push_str(&format!(
                "    vec3 color = {final_symbol}.rgb;  // Ensure it's a vec3\n"
            ));
            out.push_str("    gl_FragColor = vec4(color, 1.0);  // Convert to vec4 with alpha 1.0\n");
        }
        AssembleMode::SingleNode => {
            out.push_str(&format!(
                "    gl_FragColor = vec4(vec3({final_symbol}), 1.0);\n"
            ));
        }
    }
    out.push_str("}\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fmt_f32_trims_trailing_zeros() {
        assert_eq!(fmt_f32(1.0), "1");
        assert_eq!(fmt_f32(0.0), "0");
        assert_eq!(fmt_f32(0.5), "0.5");
        assert_eq!(fmt_f32(0.25), "0.25");
        assert_eq!(fmt_f32(32.0), "32");
        assert_eq!(fmt_f32(f32::NAN), "0.0");
        assert_eq!(fmt_f32(f32::INFINITY), "0.0");
    }

    #[test]
    fn sanitize_replaces_non_identifier_chars() {
        assert_eq!(sanitize_glsl_ident("color a"), "color_a");
        assert_eq!(sanitize_glsl_ident("n-7"), "n_7");
        assert_eq!(sanitize_glsl_ident(""), "_");
        assert_eq!(sanitize_glsl_ident("plain_3"), "plain_3");
    }

    #[test]
    fn empty_pass_assembles_to_opaque_black() {
        let src = assemble(&[], &[], None, AssembleMode::WholeGraph);
        assert!(src.starts_with("#version 120\n"));
        assert!(src.contains("gl_FragColor = vec4(0.0, 0.0, 0.0, 1.0);"));
        assert!(!src.is_empty());
    }

    #[test]
    fn whole_graph_narrows_through_vec3() {
        let lines = vec!["vec4 color_1 = vec4(1, 0, 0, 1.0);".to_string()];
        let src = assemble(&[], &lines, Some("color_1"), AssembleMode::WholeGraph);
        assert!(src.contains("    vec4 color_1 = vec4(1, 0, 0, 1.0);\n"));
        assert!(src.contains("vec3 color = color_1.rgb;"));
        assert!(src.contains("gl_FragColor = vec4(color, 1.0);"));
    }

    #[test]
    fn single_node_writes_symbol_directly() {
        let lines = vec!["vec4 color_1 = vec4(1, 0, 0, 1.0);".to_string()];
        let src = assemble(&[], &lines, Some("color_1"), AssembleMode::SingleNode);
        assert!(src.contains("gl_FragColor = vec4(vec3(color_1), 1.0);"));
        assert!(!src.contains("vec3 color ="));
    }

    #[test]
    fn uniforms_are_hoisted_above_main() {
        let uniforms = vec!["uniform vec2 resolution;".to_string()];
        let lines = vec!["vec2 uv_1 = gl_FragCoord.xy / resolution;".to_string()];
        let src = assemble(&uniforms, &lines, Some("uv_1"), AssembleMode::WholeGraph);
        let uniform_at = src.find("uniform vec2 resolution;").unwrap();
        let main_at = src.find("void main()").unwrap();
        assert!(uniform_at < main_at);
    }
}
