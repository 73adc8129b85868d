//! Shader loading, validation, and interface reflection.
//!
//! WGSL is parsed and validated with `naga` on the CPU before any GPU object
//! is created, so a broken shader is reported as a [`ShaderError`] instead of
//! a device-lost panic. Reflection then resolves the vertex attribute
//! locations and the transform uniform binding the renderer needs.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::transform::TransformUniform;

/// Built-in shader, used when no override path is configured.
pub const DEFAULT_WGSL: &str = include_str!("shaders/mesh.wgsl");

pub const VERTEX_ENTRY: &str = "vs_main";
pub const FRAGMENT_ENTRY: &str = "fs_main";
pub const POSITION_ATTRIBUTE: &str = "position";
pub const NORMAL_ATTRIBUTE: &str = "in_normal";
pub const TRANSFORMS_UNIFORM: &str = "transforms";

#[derive(Debug, Error)]
pub enum ShaderError {
    #[error("failed to read shader {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("shader `{label}` failed to compile:\n{diagnostic}")]
    Compile { label: String, diagnostic: String },

    #[error("shader `{label}` failed validation:\n{diagnostic}")]
    Validate { label: String, diagnostic: String },

    #[error("shader `{label}` does not match the vertex/uniform interface: {reason}")]
    Interface { label: String, reason: String },

    #[error("shader `{label}` was rejected by the device:\n{diagnostic}")]
    Pipeline { label: String, diagnostic: String },
}

/// What to do when the shader cannot be built.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum ShaderFailurePolicy {
    /// Report the error to the caller; startup aborts.
    #[default]
    FailFast,
    /// Log the error and keep running without a program; frames are cleared
    /// but nothing is drawn.
    LogAndContinue,
}

impl ShaderFailurePolicy {
    /// Applies the policy to a build result.
    pub fn resolve(
        self,
        result: Result<ShaderProgram, ShaderError>,
    ) -> Result<Option<ShaderProgram>, ShaderError> {
        match (result, self) {
            (Ok(program), _) => Ok(Some(program)),
            (Err(e), ShaderFailurePolicy::FailFast) => Err(e),
            (Err(e), ShaderFailurePolicy::LogAndContinue) => {
                log::error!("{e}");
                log::warn!("continuing without a shader program; only the background will render");
                Ok(None)
            }
        }
    }
}

/// Locations and bindings resolved from the shader source.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ShaderInterface {
    pub position_location: u32,
    pub normal_location: u32,
    pub transforms_group: u32,
    pub transforms_binding: u32,
}

/// A validated shader with its resolved interface.
#[derive(Debug, Clone)]
pub struct ShaderProgram {
    label: String,
    source: String,
    interface: ShaderInterface,
}

impl ShaderProgram {
    /// Loads the shader at `path`, or the built-in one when `path` is `None`.
    pub fn load(path: Option<&Path>) -> Result<Self, ShaderError> {
        match path {
            None => Self::from_wgsl("built-in mesh.wgsl", DEFAULT_WGSL),
            Some(p) => {
                let src = std::fs::read_to_string(p).map_err(|source| ShaderError::Io {
                    path: p.to_path_buf(),
                    source,
                })?;
                Self::from_wgsl(p.display().to_string(), src)
            }
        }
    }

    /// Parses, validates, and reflects WGSL source.
    pub fn from_wgsl(label: impl Into<String>, source: impl Into<String>) -> Result<Self, ShaderError> {
        let label = label.into();
        let source = source.into();

        let module = naga::front::wgsl::parse_str(&source).map_err(|e| ShaderError::Compile {
            label: label.clone(),
            diagnostic: e.emit_to_string(&source),
        })?;

        let mut validator = naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::empty(),
        );
        let info = validator
            .validate(&module)
            .map_err(|e| ShaderError::Validate {
                label: label.clone(),
                diagnostic: error_chain(&e),
            })?;

        let interface = reflect(&module, &info).map_err(|reason| ShaderError::Interface {
            label: label.clone(),
            reason,
        })?;

        log::debug!("shader `{label}` ok: {interface:?}");

        Ok(Self { label, source, interface })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn interface(&self) -> ShaderInterface {
        self.interface
    }
}

fn error_chain(err: &dyn std::error::Error) -> String {
    let mut out = err.to_string();
    let mut cur = err.source();
    while let Some(e) = cur {
        let _ = write!(out, "\n  caused by: {e}");
        cur = e.source();
    }
    out
}

// ── reflection ────────────────────────────────────────────────────────────

/// A location-bound stage input or output.
struct Located {
    name: String,
    location: u32,
    ty: naga::Handle<naga::Type>,
    interpolation: Option<naga::Interpolation>,
    sampling: Option<naga::Sampling>,
}

impl Located {
    fn new(name: Option<&String>, binding: &naga::Binding, ty: naga::Handle<naga::Type>) -> Option<Self> {
        match *binding {
            naga::Binding::Location { location, interpolation, sampling, .. } => Some(Self {
                name: name.cloned().unwrap_or_default(),
                location,
                ty,
                interpolation,
                sampling,
            }),
            naga::Binding::BuiltIn(_) => None,
        }
    }
}

fn is_vec3_f32(module: &naga::Module, ty: naga::Handle<naga::Type>) -> bool {
    matches!(
        module.types[ty].inner,
        naga::TypeInner::Vector { size: naga::VectorSize::Tri, scalar } if scalar == naga::Scalar::F32
    )
}

fn is_vec4_f32(module: &naga::Module, ty: naga::Handle<naga::Type>) -> bool {
    matches!(
        module.types[ty].inner,
        naga::TypeInner::Vector { size: naga::VectorSize::Quad, scalar } if scalar == naga::Scalar::F32
    )
}

/// Location-bound members of a binding, flattening a struct without one.
fn push_located(
    module: &naga::Module,
    out: &mut Vec<Located>,
    name: Option<&String>,
    binding: Option<&naga::Binding>,
    ty: naga::Handle<naga::Type>,
) {
    match binding {
        Some(b) => out.extend(Located::new(name, b, ty)),
        None => {
            if let naga::TypeInner::Struct { members, .. } = &module.types[ty].inner {
                for m in members {
                    if let Some(b) = &m.binding {
                        out.extend(Located::new(m.name.as_ref(), b, m.ty));
                    }
                }
            }
        }
    }
}

fn entry_inputs(module: &naga::Module, ep: &naga::EntryPoint) -> Vec<Located> {
    let mut inputs = Vec::new();
    for arg in &ep.function.arguments {
        push_located(module, &mut inputs, arg.name.as_ref(), arg.binding.as_ref(), arg.ty);
    }
    inputs
}

fn entry_outputs(module: &naga::Module, ep: &naga::EntryPoint) -> Vec<Located> {
    let mut outputs = Vec::new();
    if let Some(result) = &ep.function.result {
        push_located(module, &mut outputs, None, result.binding.as_ref(), result.ty);
    }
    outputs
}

fn find_entry<'a>(
    module: &'a naga::Module,
    name: &str,
    stage: naga::ShaderStage,
) -> Option<(usize, &'a naga::EntryPoint)> {
    module
        .entry_points
        .iter()
        .enumerate()
        .find(|(_, ep)| ep.name == name && ep.stage == stage)
}

/// Every fragment input must be written by the vertex stage with the same type.
fn check_stage_link(module: &naga::Module, vs: &naga::EntryPoint, fs: &naga::EntryPoint) -> Result<(), String> {
    let written = entry_outputs(module, vs);

    for input in entry_inputs(module, fs) {
        let (name, location) = (&input.name, input.location);
        let Some(output) = written.iter().find(|o| o.location == location) else {
            return Err(format!(
                "`{FRAGMENT_ENTRY}` input `{name}` at @location({location}) is not written by `{VERTEX_ENTRY}`"
            ));
        };
        if module.types[output.ty].inner != module.types[input.ty].inner {
            return Err(format!(
                "`{FRAGMENT_ENTRY}` input `{name}` at @location({location}) does not match the type `{VERTEX_ENTRY}` writes"
            ));
        }
        if output.interpolation != input.interpolation || output.sampling != input.sampling {
            return Err(format!(
                "`{FRAGMENT_ENTRY}` input `{name}` at @location({location}) is interpolated differently from `{VERTEX_ENTRY}`"
            ));
        }
    }
    Ok(())
}

/// The renderer has one color target, written as vec4<f32>.
fn check_color_output(module: &naga::Module, fs: &naga::EntryPoint) -> Result<(), String> {
    let outputs = entry_outputs(module, fs);

    if let Some(o) = outputs.iter().find(|o| o.location != 0) {
        return Err(format!(
            "`{FRAGMENT_ENTRY}` writes @location({}), only @location(0) is rendered",
            o.location
        ));
    }
    match outputs.first() {
        Some(o) if is_vec4_f32(module, o.ty) => Ok(()),
        Some(_) => Err(format!("`{FRAGMENT_ENTRY}` @location(0) output must be vec4<f32>")),
        None => Err(format!("`{FRAGMENT_ENTRY}` does not write @location(0)")),
    }
}

/// Bound resources must match the single bind group the renderer creates:
/// `transforms`, visible to the vertex stage only.
fn check_resources(
    module: &naga::Module,
    info: &naga::valid::ModuleInfo,
    vs_index: usize,
    fs_index: usize,
    transforms: naga::Handle<naga::GlobalVariable>,
) -> Result<(), String> {
    let vs_info = info.get_entry_point(vs_index);
    let fs_info = info.get_entry_point(fs_index);

    if !fs_info[transforms].is_empty() {
        return Err(format!(
            "`{TRANSFORMS_UNIFORM}` is only visible to `{VERTEX_ENTRY}` but `{FRAGMENT_ENTRY}` reads it"
        ));
    }

    for (handle, gv) in module.global_variables.iter() {
        if handle == transforms || gv.binding.is_none() {
            continue;
        }
        if !vs_info[handle].is_empty() || !fs_info[handle].is_empty() {
            let name = gv.name.as_deref().unwrap_or("<unnamed>");
            return Err(format!("resource `{name}` is not bound by the renderer"));
        }
    }
    Ok(())
}

fn reflect(module: &naga::Module, info: &naga::valid::ModuleInfo) -> Result<ShaderInterface, String> {
    let (vs_index, vs) = find_entry(module, VERTEX_ENTRY, naga::ShaderStage::Vertex)
        .ok_or_else(|| format!("missing vertex entry point `{VERTEX_ENTRY}`"))?;
    let (fs_index, fs) = find_entry(module, FRAGMENT_ENTRY, naga::ShaderStage::Fragment)
        .ok_or_else(|| format!("missing fragment entry point `{FRAGMENT_ENTRY}`"))?;

    let inputs = entry_inputs(module, vs);
    let attribute = |name: &str| -> Result<u32, String> {
        let input = inputs
            .iter()
            .find(|i| i.name == name)
            .ok_or_else(|| format!("`{VERTEX_ENTRY}` has no `{name}` input"))?;
        if !is_vec3_f32(module, input.ty) {
            return Err(format!("`{name}` must be vec3<f32>"));
        }
        Ok(input.location)
    };
    let position_location = attribute(POSITION_ATTRIBUTE)?;
    let normal_location = attribute(NORMAL_ATTRIBUTE)?;

    let extra: Vec<&str> = inputs
        .iter()
        .map(|i| i.name.as_str())
        .filter(|n| *n != POSITION_ATTRIBUTE && *n != NORMAL_ATTRIBUTE)
        .collect();
    if !extra.is_empty() {
        return Err(format!("unbound vertex inputs: {}", extra.join(", ")));
    }

    check_stage_link(module, vs, fs)?;
    check_color_output(module, fs)?;

    let (transforms_handle, transforms) = module
        .global_variables
        .iter()
        .find(|(_, gv)| gv.name.as_deref() == Some(TRANSFORMS_UNIFORM))
        .ok_or_else(|| format!("missing uniform `{TRANSFORMS_UNIFORM}`"))?;

    if transforms.space != naga::AddressSpace::Uniform {
        return Err(format!("`{TRANSFORMS_UNIFORM}` must be var<uniform>"));
    }
    let binding = transforms
        .binding
        .as_ref()
        .ok_or_else(|| format!("`{TRANSFORMS_UNIFORM}` has no @group/@binding"))?;
    if binding.group != 0 {
        return Err(format!("`{TRANSFORMS_UNIFORM}` must be in @group(0)"));
    }

    match &module.types[transforms.ty].inner {
        naga::TypeInner::Struct { span, .. } if u64::from(*span) == TransformUniform::SIZE => {}
        _ => {
            return Err(format!(
                "`{TRANSFORMS_UNIFORM}` must be a {}-byte struct of four mat4x4<f32>",
                TransformUniform::SIZE
            ));
        }
    }

    check_resources(module, info, vs_index, fs_index, transforms_handle)?;

    Ok(ShaderInterface {
        position_location,
        normal_location,
        transforms_group: binding.group,
        transforms_binding: binding.binding,
    })
}
