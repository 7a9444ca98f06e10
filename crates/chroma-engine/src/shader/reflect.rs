//! Device-free GLSL front-end.
//!
//! Every backend runs sources through here first: naga parses and validates the
//! stage (producing the diagnostic log on failure), and the resulting module is
//! reflected into the location-bound inputs/outputs and uniform blocks that
//! linking and name lookups need.

use wgpu::naga;
use wgpu::naga::front::glsl;
use wgpu::naga::valid::{Capabilities, ValidationFlags, Validator};

use crate::backend::{StageKind, UniformLocation};

/// Shape of one interface value (scalar or vector).
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ValueType {
    pub components: u32,
    pub scalar: naga::Scalar,
}

impl ValueType {
    fn from_inner(inner: &naga::TypeInner) -> Option<Self> {
        match *inner {
            naga::TypeInner::Scalar(scalar) => Some(Self { components: 1, scalar }),
            naga::TypeInner::Vector { size, scalar } => Some(Self {
                components: size as u32,
                scalar,
            }),
            _ => None,
        }
    }

    /// Vertex buffer format that feeds this value, if one exists.
    pub fn vertex_format(self) -> Option<wgpu::VertexFormat> {
        use wgpu::VertexFormat as F;

        let naga::Scalar { kind, width } = self.scalar;
        if width != 4 {
            return None;
        }
        let format = match (kind, self.components) {
            (naga::ScalarKind::Float, 1) => F::Float32,
            (naga::ScalarKind::Float, 2) => F::Float32x2,
            (naga::ScalarKind::Float, 3) => F::Float32x3,
            (naga::ScalarKind::Float, 4) => F::Float32x4,
            (naga::ScalarKind::Sint, 1) => F::Sint32,
            (naga::ScalarKind::Sint, 2) => F::Sint32x2,
            (naga::ScalarKind::Sint, 3) => F::Sint32x3,
            (naga::ScalarKind::Sint, 4) => F::Sint32x4,
            (naga::ScalarKind::Uint, 1) => F::Uint32,
            (naga::ScalarKind::Uint, 2) => F::Uint32x2,
            (naga::ScalarKind::Uint, 3) => F::Uint32x3,
            (naga::ScalarKind::Uint, 4) => F::Uint32x4,
            _ => return None,
        };
        Some(format)
    }
}

/// A location-bound stage input or output.
#[derive(Debug, Clone, PartialEq)]
pub struct Varying {
    pub name: Option<String>,
    pub location: u32,
    pub ty: ValueType,
}

/// A named member of a uniform block.
#[derive(Debug, Clone, PartialEq)]
pub struct UniformMember {
    pub name: String,
    pub offset: u32,
}

/// A uniform block bound at `(group, binding)`.
#[derive(Debug, Clone, PartialEq)]
pub struct UniformBlock {
    pub group: u32,
    pub binding: u32,
    /// Block size in bytes as laid out by naga.
    pub size: u32,
    pub members: Vec<UniformMember>,
}

/// Reflection of one successfully compiled stage.
#[derive(Debug, Clone)]
pub struct StageReflection {
    pub kind: StageKind,
    pub inputs: Vec<Varying>,
    pub outputs: Vec<Varying>,
    pub uniforms: Vec<UniformBlock>,
}

/// Parses and validates `source` as a `kind` stage.
///
/// On failure the error is the rendered diagnostic, never empty.
pub fn parse_stage(kind: StageKind, source: &str) -> Result<StageReflection, String> {
    let mut frontend = glsl::Frontend::default();
    let module = frontend
        .parse(&glsl::Options::from(kind.to_naga()), source)
        .map_err(|errors| non_empty(errors.emit_to_string(source), || errors.to_string()))?;

    let mut validator = Validator::new(ValidationFlags::all(), Capabilities::empty());
    validator
        .validate(&module)
        .map_err(|err| non_empty(err.emit_to_string(source), || err.to_string()))?;

    let entry = module
        .entry_points
        .iter()
        .find(|ep| ep.stage == kind.to_naga())
        .ok_or_else(|| format!("{kind} stage has no `main` entry point"))?;

    let mut inputs = Vec::new();
    for arg in &entry.function.arguments {
        collect_bound(&module, arg.name.as_deref(), arg.ty, arg.binding.as_ref(), &mut inputs);
    }

    let mut outputs = Vec::new();
    if let Some(result) = &entry.function.result {
        collect_bound(&module, None, result.ty, result.binding.as_ref(), &mut outputs);
    }

    inputs.sort_by_key(|v| v.location);
    outputs.sort_by_key(|v| v.location);

    Ok(StageReflection {
        kind,
        inputs,
        outputs,
        uniforms: uniform_blocks(&module),
    })
}

fn non_empty(log: String, fallback: impl FnOnce() -> String) -> String {
    if log.trim().is_empty() { fallback() } else { log }
}

/// Pushes every `Location`-bound value reachable from `ty`, descending into
/// structs whose members carry the bindings.
fn collect_bound(
    module: &naga::Module,
    name: Option<&str>,
    ty: naga::Handle<naga::Type>,
    binding: Option<&naga::Binding>,
    out: &mut Vec<Varying>,
) {
    let inner = &module.types[ty].inner;

    if let Some(naga::Binding::Location { location, .. }) = binding {
        if let Some(value) = ValueType::from_inner(inner) {
            out.push(Varying {
                name: name.map(str::to_owned),
                location: *location,
                ty: value,
            });
        }
        return;
    }

    if let naga::TypeInner::Struct { members, .. } = inner {
        for member in members {
            collect_bound(module, member.name.as_deref(), member.ty, member.binding.as_ref(), out);
        }
    }
}

fn uniform_blocks(module: &naga::Module) -> Vec<UniformBlock> {
    let mut blocks = Vec::new();

    for (_, var) in module.global_variables.iter() {
        if var.space != naga::AddressSpace::Uniform {
            continue;
        }
        let Some(rb) = &var.binding else { continue };

        let (members, span) = match &module.types[var.ty].inner {
            naga::TypeInner::Struct { members, span } => (
                members
                    .iter()
                    .filter_map(|m| {
                        Some(UniformMember {
                            name: m.name.clone()?,
                            offset: m.offset,
                        })
                    })
                    .collect(),
                *span,
            ),
            other => {
                // Bare (non-block) uniform: the variable itself is the member.
                let size = ValueType::from_inner(other)
                    .map_or(0, |v| v.components * v.scalar.width as u32);
                let members = var
                    .name
                    .clone()
                    .map(|name| vec![UniformMember { name, offset: 0 }])
                    .unwrap_or_default();
                (members, size)
            }
        };

        blocks.push(UniformBlock {
            group: rb.group,
            binding: rb.binding,
            size: span,
            members,
        });
    }

    blocks.sort_by_key(|b| (b.group, b.binding));
    blocks
}

/// Link-time view of a vertex/fragment pair.
#[derive(Debug, Clone)]
pub struct ProgramInterface {
    /// Vertex stage inputs in location order.
    pub attributes: Vec<Varying>,
    /// Uniform blocks of both stages, deduplicated by slot.
    pub uniforms: Vec<UniformBlock>,
}

impl ProgramInterface {
    /// Checks that `fragment` only reads what `vertex` writes.
    ///
    /// The error is a link log suitable for `ProgramLinkError`.
    pub fn link(vertex: &StageReflection, fragment: &StageReflection) -> Result<Self, String> {
        if vertex.kind != StageKind::Vertex {
            return Err(format!("vertex slot holds a {} stage", vertex.kind));
        }
        if fragment.kind != StageKind::Fragment {
            return Err(format!("fragment slot holds a {} stage", fragment.kind));
        }

        for input in &fragment.inputs {
            let label = input.name.as_deref().unwrap_or("<unnamed>");
            let Some(output) = vertex.outputs.iter().find(|o| o.location == input.location)
            else {
                return Err(format!(
                    "fragment input `{label}` (location {}) is not written by the vertex stage",
                    input.location
                ));
            };
            if output.ty != input.ty {
                return Err(format!(
                    "fragment input `{label}` (location {}) expects {} component(s) of {:?}, \
                     vertex stage writes {} component(s) of {:?}",
                    input.location,
                    input.ty.components,
                    input.ty.scalar.kind,
                    output.ty.components,
                    output.ty.scalar.kind,
                ));
            }
        }

        let mut uniforms = vertex.uniforms.clone();
        for block in &fragment.uniforms {
            match uniforms
                .iter()
                .find(|b| b.group == block.group && b.binding == block.binding)
            {
                Some(existing) if existing.size != block.size => {
                    return Err(format!(
                        "uniform block at set {} binding {} differs between stages",
                        block.group, block.binding
                    ));
                }
                Some(_) => {}
                None => uniforms.push(block.clone()),
            }
        }
        uniforms.sort_by_key(|b| (b.group, b.binding));

        Ok(Self {
            attributes: vertex.inputs.clone(),
            uniforms,
        })
    }

    pub fn attribute(&self, name: &str) -> Option<&Varying> {
        self.attributes
            .iter()
            .find(|a| a.name.as_deref() == Some(name))
    }

    pub fn attribute_location(&self, name: &str) -> Option<u32> {
        self.attribute(name).map(|a| a.location)
    }

    pub fn uniform_location(&self, name: &str) -> Option<UniformLocation> {
        self.uniforms.iter().find_map(|block| {
            block
                .members
                .iter()
                .find(|m| m.name == name)
                .map(|m| UniformLocation {
                    group: block.group,
                    binding: block.binding,
                    offset: m.offset,
                })
        })
    }
}
