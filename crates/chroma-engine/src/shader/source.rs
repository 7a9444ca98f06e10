//! GLSL sources for the colored quad.
//!
//! Input, varying and uniform names are part of the contract with
//! `scene::quad`; rename them together or not at all.

/// Vertex stage: converts pixel coordinates to clip space and forwards the
/// per-vertex color.
///
/// `p / u_resolution` maps to `0..1`, `* 2.0` to `0..2`, `- 1.0` to `-1..1`,
/// and the final `vec2(1, -1)` flips Y so the origin sits at the top-left.
pub const VERTEX_SHADER_2D: &str = r"#version 450
layout(location = 0) in vec2 a_position;
layout(location = 1) in vec4 a_color;

layout(std140, set = 0, binding = 0) uniform Resolution {
    vec2 u_resolution;
};

layout(location = 0) out vec4 v_color;

void main() {
    vec2 zeroToOne = a_position / u_resolution;
    vec2 zeroToTwo = zeroToOne * 2.0;
    vec2 clipSpace = zeroToTwo - 1.0;

    gl_Position = vec4(clipSpace * vec2(1.0, -1.0), 0.0, 1.0);
    v_color = a_color;
}
";

/// Fragment stage: writes the interpolated vertex color unmodified.
pub const FRAGMENT_SHADER_2D: &str = r"#version 450

layout(location = 0) in vec4 v_color;
layout(location = 0) out vec4 outColor;

void main() {
    outColor = v_color;
}
";
