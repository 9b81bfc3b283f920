//! WGSL reflection used to resolve attribute and uniform names.
//!
//! Each shader unit is parsed and validated with naga. The result keeps only
//! what the backend needs after compilation:
//! - the entry point for the unit's stage
//! - user-defined (`@location`) inputs and outputs of that entry point
//! - the layout of the uniform block at `@group(0) @binding(0)`, if any

use naga::valid::{Capabilities, ValidationFlags, Validator};

use super::{GfxError, ShaderStage};

/// One `@location` slot of an entry point interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceSlot {
    pub name: Option<String>,
    pub location: u32,
    /// Number of scalar components (1 for scalars, 2..=4 for vectors, 0 otherwise).
    pub components: u8,
}

/// A named member of the uniform block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniformField {
    pub name: String,
    pub offset: u32,
    pub components: u8,
}

/// Uniform block layout in bytes, as laid out by the WGSL uniform address space rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniformBlock {
    pub span: u32,
    pub fields: Vec<UniformField>,
}

impl UniformBlock {
    pub fn field(&self, name: &str) -> Option<&UniformField> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Reflection data for one compiled shader unit.
#[derive(Debug, Clone)]
pub struct ShaderReflection {
    pub stage: ShaderStage,
    pub entry_point: String,
    pub inputs: Vec<InterfaceSlot>,
    pub outputs: Vec<InterfaceSlot>,
    pub uniforms: Option<UniformBlock>,
}

impl ShaderReflection {
    /// Parses and validates `source`, then extracts the interface of its `stage` entry point.
    pub fn parse(stage: ShaderStage, source: &str) -> Result<Self, GfxError> {
        let compile_err = |log: String| GfxError::Compile { stage, log };

        let module = naga::front::wgsl::parse_str(source)
            .map_err(|e| compile_err(e.emit_to_string(source)))?;

        Validator::new(ValidationFlags::all(), Capabilities::empty())
            .validate(&module)
            .map_err(|e| compile_err(e.as_inner().to_string()))?;

        let naga_stage = match stage {
            ShaderStage::Vertex => naga::ShaderStage::Vertex,
            ShaderStage::Fragment => naga::ShaderStage::Fragment,
        };

        let entry = module
            .entry_points
            .iter()
            .find(|ep| ep.stage == naga_stage)
            .ok_or_else(|| compile_err(format!("no @{stage} entry point")))?;

        let mut inputs = Vec::new();
        for arg in &entry.function.arguments {
            collect_slots(&module, arg.ty, arg.binding.as_ref(), arg.name.as_deref(), &mut inputs);
        }

        let mut outputs = Vec::new();
        if let Some(result) = &entry.function.result {
            collect_slots(&module, result.ty, result.binding.as_ref(), None, &mut outputs);
        }

        let uniforms = uniform_block(&module).map_err(compile_err)?;

        Ok(Self {
            stage,
            entry_point: entry.name.clone(),
            inputs,
            outputs,
            uniforms,
        })
    }

    /// Looks up an entry point input by name.
    pub fn input(&self, name: &str) -> Option<&InterfaceSlot> {
        self.inputs.iter().find(|s| s.name.as_deref() == Some(name))
    }
}

/// Checks that `vertex` feeds every located input of `fragment` and merges their uniform blocks.
///
/// Both stages may declare the uniform block; when they do, the layouts must agree.
pub fn link_interface(
    vertex: &ShaderReflection,
    fragment: &ShaderReflection,
) -> Result<Option<UniformBlock>, GfxError> {
    if vertex.stage != ShaderStage::Vertex {
        return Err(GfxError::Link("first unit is not a vertex shader".into()));
    }
    if fragment.stage != ShaderStage::Fragment {
        return Err(GfxError::Link("second unit is not a fragment shader".into()));
    }

    for input in &fragment.inputs {
        let fed = vertex
            .outputs
            .iter()
            .any(|o| o.location == input.location && o.components == input.components);
        if !fed {
            return Err(GfxError::Link(format!(
                "fragment input @location({}) has no matching vertex output",
                input.location
            )));
        }
    }

    match (&vertex.uniforms, &fragment.uniforms) {
        (Some(v), Some(f)) if v != f => Err(GfxError::Link(
            "uniform block layout differs between stages".into(),
        )),
        (Some(block), _) | (None, Some(block)) => Ok(Some(block.clone())),
        (None, None) => Ok(None),
    }
}

fn collect_slots(
    module: &naga::Module,
    ty: naga::Handle<naga::Type>,
    binding: Option<&naga::Binding>,
    name: Option<&str>,
    out: &mut Vec<InterfaceSlot>,
) {
    match binding {
        Some(naga::Binding::Location { location, .. }) => out.push(InterfaceSlot {
            name: name.map(str::to_owned),
            location: *location,
            components: components_of(&module.types[ty].inner),
        }),
        // Builtins (position, vertex_index, ...) are not user slots.
        Some(_) => {}
        None => {
            if let naga::TypeInner::Struct { members, .. } = &module.types[ty].inner {
                for m in members {
                    collect_slots(module, m.ty, m.binding.as_ref(), m.name.as_deref(), out);
                }
            }
        }
    }
}

fn components_of(inner: &naga::TypeInner) -> u8 {
    match *inner {
        naga::TypeInner::Scalar(_) => 1,
        naga::TypeInner::Vector { size, .. } => size as u8,
        _ => 0,
    }
}

fn uniform_block(module: &naga::Module) -> Result<Option<UniformBlock>, String> {
    let mut found = None;

    for (_, var) in module.global_variables.iter() {
        if var.space != naga::AddressSpace::Uniform {
            continue;
        }
        if found.is_some() {
            return Err("only one uniform block is supported".into());
        }

        let at_zero = var
            .binding
            .as_ref()
            .is_some_and(|b| b.group == 0 && b.binding == 0);
        if !at_zero {
            return Err("uniform block must be bound at @group(0) @binding(0)".into());
        }

        let naga::TypeInner::Struct { members, span } = &module.types[var.ty].inner else {
            return Err("uniform block must be a struct".into());
        };

        let fields = members
            .iter()
            .filter_map(|m| {
                Some(UniformField {
                    name: m.name.clone()?,
                    offset: m.offset,
                    components: components_of(&module.types[m.ty].inner),
                })
            })
            .collect();

        found = Some(UniformBlock {
            span: *span,
            fields,
        });
    }

    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;

    const VS: &str = r#"
@vertex
fn vs_main(@location(0) a_position: vec2<f32>) -> @builtin(position) vec4<f32> {
    return vec4<f32>(a_position, 0.0, 1.0);
}
"#;

    const FS: &str = r#"
struct Params {
    u_resolution: vec2<f32>,
    u_center: vec2<f32>,
    u_scale: f32,
    u_time: f32,
}

@group(0) @binding(0) var<uniform> params: Params;

@fragment
fn fs_main(@builtin(position) frag_coord: vec4<f32>) -> @location(0) vec4<f32> {
    let st = frag_coord.xy / params.u_resolution;
    return vec4<f32>(st * params.u_scale, sin(params.u_time), 1.0);
}
"#;

    #[test]
    fn vertex_attribute_is_reflected() {
        let r = ShaderReflection::parse(ShaderStage::Vertex, VS).unwrap();
        assert_eq!(r.entry_point, "vs_main");
        let slot = r.input("a_position").unwrap();
        assert_eq!(slot.location, 0);
        assert_eq!(slot.components, 2);
        assert!(r.outputs.is_empty());
        assert!(r.uniforms.is_none());
    }

    #[test]
    fn uniform_block_offsets_follow_wgsl_layout() {
        let r = ShaderReflection::parse(ShaderStage::Fragment, FS).unwrap();
        let block = r.uniforms.unwrap();
        assert_eq!(block.span, 24);
        assert_eq!(block.field("u_resolution").unwrap().offset, 0);
        assert_eq!(block.field("u_center").unwrap().offset, 8);
        assert_eq!(block.field("u_scale").unwrap().offset, 16);
        assert_eq!(block.field("u_time").unwrap().offset, 20);
        assert_eq!(block.field("u_scale").unwrap().components, 1);
        assert!(block.field("u_missing").is_none());
    }

    #[test]
    fn syntax_error_is_a_compile_error() {
        let err = ShaderReflection::parse(ShaderStage::Fragment, "fn broken( {").unwrap_err();
        assert!(matches!(err, GfxError::Compile { stage: ShaderStage::Fragment, .. }));
    }

    #[test]
    fn missing_entry_point_is_a_compile_error() {
        let err = ShaderReflection::parse(ShaderStage::Fragment, VS).unwrap_err();
        assert!(err.to_string().contains("no @fragment entry point"));
    }

    #[test]
    fn uniform_outside_group_zero_is_rejected() {
        let src = r#"
struct P { v: f32 }
@group(1) @binding(0) var<uniform> p: P;
@fragment
fn fs_main() -> @location(0) vec4<f32> {
    return vec4<f32>(p.v);
}
"#;
        let err = ShaderReflection::parse(ShaderStage::Fragment, src).unwrap_err();
        assert!(err.to_string().contains("@group(0) @binding(0)"));
    }

    #[test]
    fn link_merges_uniforms_from_fragment() {
        let vs = ShaderReflection::parse(ShaderStage::Vertex, VS).unwrap();
        let fs = ShaderReflection::parse(ShaderStage::Fragment, FS).unwrap();
        let block = link_interface(&vs, &fs).unwrap().unwrap();
        assert_eq!(block.fields.len(), 4);
    }

    #[test]
    fn link_rejects_swapped_stages() {
        let vs = ShaderReflection::parse(ShaderStage::Vertex, VS).unwrap();
        let fs = ShaderReflection::parse(ShaderStage::Fragment, FS).unwrap();
        assert!(matches!(link_interface(&fs, &vs), Err(GfxError::Link(_))));
    }

    #[test]
    fn link_rejects_unfed_fragment_input() {
        let fs_src = r#"
@fragment
fn fs_main(@location(1) tint: vec4<f32>) -> @location(0) vec4<f32> {
    return tint;
}
"#;
        let vs = ShaderReflection::parse(ShaderStage::Vertex, VS).unwrap();
        let fs = ShaderReflection::parse(ShaderStage::Fragment, fs_src).unwrap();
        let err = link_interface(&vs, &fs).unwrap_err();
        assert!(err.to_string().contains("@location(1)"));
    }
}
