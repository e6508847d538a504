//! Shader artifact handling.
//!
//! The WGSL program is treated as an external artifact. Before it reaches wgpu
//! it is parsed and validated with naga, and its entry points and resource
//! bindings are reflected and compared with [`BufferIndex`]. A broken program
//! or a renumbered binding surfaces as a [`RenderError`] at initialization.

use std::borrow::Cow;

use wgpu::naga;

use super::{BufferIndex, RenderError};

/// A WGSL program plus the entry points the render core calls.
#[derive(Debug, Clone)]
pub struct ShaderArtifact {
    pub label: &'static str,
    pub source: Cow<'static, str>,
    pub vertex_entry: &'static str,
    pub fragment_entry: &'static str,
}

impl ShaderArtifact {
    /// The bundled pass-through color program.
    pub fn vertex_color() -> Self {
        Self {
            label: "trigon vertex color shader",
            source: Cow::Borrowed(include_str!("shaders/vertex_color.wgsl")),
            vertex_entry: "vs_main",
            fragment_entry: "fs_main",
        }
    }

    /// Wraps caller-supplied WGSL that uses the default entry point names.
    pub fn from_wgsl(label: &'static str, source: impl Into<Cow<'static, str>>) -> Self {
        Self {
            label,
            source: source.into(),
            vertex_entry: "vs_main",
            fragment_entry: "fs_main",
        }
    }

    /// Parses and validates the source.
    pub fn parse(&self) -> Result<naga::Module, RenderError> {
        let module = naga::front::wgsl::parse_str(&self.source)
            .map_err(|e| self.invalid(e.emit_to_string(&self.source)))?;

        // Device-specific capabilities are checked again by wgpu at pipeline creation.
        naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::all(),
        )
        .validate(&module)
        .map_err(|e| self.invalid(e.emit_to_string(&self.source)))?;

        Ok(module)
    }

    /// Resource declarations of the module, in declaration order.
    pub fn declared_bindings(&self) -> Result<Vec<DeclaredBinding>, RenderError> {
        Ok(reflect_bindings(&self.parse()?))
    }

    /// Checks that both entry points exist for their stage and that every
    /// [`BufferIndex`] slot is declared at the expected group, binding and
    /// address space.
    pub fn check_interface(&self) -> Result<(), RenderError> {
        let module = self.parse()?;

        require_entry_point(&module, self.vertex_entry, naga::ShaderStage::Vertex)?;
        require_entry_point(&module, self.fragment_entry, naga::ShaderStage::Fragment)?;

        check_bindings(&reflect_bindings(&module))
    }

    fn invalid(&self, reason: String) -> RenderError {
        RenderError::InvalidShader {
            label: self.label,
            reason,
        }
    }
}

/// One `@group(g) @binding(b) var<space> name` declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclaredBinding {
    pub group: u32,
    pub binding: u32,
    pub space: naga::AddressSpace,
    pub name: String,
}

fn reflect_bindings(module: &naga::Module) -> Vec<DeclaredBinding> {
    module
        .global_variables
        .iter()
        .filter_map(|(_, var)| {
            let binding = var.binding.as_ref()?;
            Some(DeclaredBinding {
                group: binding.group,
                binding: binding.binding,
                space: var.space,
                name: var.name.clone().unwrap_or_default(),
            })
        })
        .collect()
}

fn require_entry_point(
    module: &naga::Module,
    name: &'static str,
    stage: naga::ShaderStage,
) -> Result<(), RenderError> {
    if module
        .entry_points
        .iter()
        .any(|ep| ep.name == name && ep.stage == stage)
    {
        Ok(())
    } else {
        Err(RenderError::MissingEntryPoint { name, stage })
    }
}

fn check_bindings(declared: &[DeclaredBinding]) -> Result<(), RenderError> {
    for slot in BufferIndex::ALL {
        let name = slot.shader_name();
        let Some(decl) = declared.iter().find(|d| d.name == name) else {
            return Err(RenderError::MissingBinding { slot, name });
        };

        if decl.group != 0 || decl.binding != slot.binding() {
            return Err(RenderError::BindingMismatch {
                name,
                expected: slot.binding(),
                found_group: decl.group,
                found: decl.binding,
            });
        }

        let expected = expected_address_space(slot);
        if decl.space != expected {
            return Err(RenderError::BindingKind {
                name,
                expected: address_space_name(expected),
                found: address_space_name(decl.space).to_string(),
            });
        }
    }

    Ok(())
}

fn expected_address_space(slot: BufferIndex) -> naga::AddressSpace {
    match slot {
        BufferIndex::Vertices => naga::AddressSpace::Storage {
            access: naga::StorageAccess::LOAD,
        },
        BufferIndex::ViewportSize => naga::AddressSpace::Uniform,
    }
}

/// WGSL spelling of an address space, with the access mode for storage.
fn address_space_name(space: naga::AddressSpace) -> &'static str {
    match space {
        naga::AddressSpace::Uniform => "uniform",
        naga::AddressSpace::Storage { access } if access == naga::StorageAccess::LOAD => {
            "storage, read"
        }
        naga::AddressSpace::Storage { .. } => "storage, read_write",
        naga::AddressSpace::Handle => "handle",
        naga::AddressSpace::Private => "private",
        naga::AddressSpace::WorkGroup => "workgroup",
        naga::AddressSpace::Function => "function",
        naga::AddressSpace::Immediate => "immediate",
        naga::AddressSpace::TaskPayload => "task_payload",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::testing::shader_with_bindings;

    #[test]
    fn bundled_shader_agrees_with_buffer_index() {
        let shader = ShaderArtifact::vertex_color();
        shader.check_interface().unwrap();

        let declared = shader.declared_bindings().unwrap();
        assert_eq!(declared.len(), 2);
        assert_eq!(declared[0].name, "vertices");
        assert_eq!(declared[0].binding, BufferIndex::Vertices.binding());
        assert_eq!(declared[1].name, "viewport");
        assert_eq!(declared[1].binding, BufferIndex::ViewportSize.binding());
        assert_eq!(declared[1].space, naga::AddressSpace::Uniform);
    }

    #[test]
    fn swapped_bindings_are_rejected() {
        let shader = shader_with_bindings(
            "swapped",
            "@group(0) @binding(1) var<storage, read> vertices: array<Vertex>;
             @group(0) @binding(0) var<uniform> viewport: ViewportUniform;",
        );
        let err = shader.check_interface().unwrap_err();
        assert!(matches!(
            err,
            RenderError::BindingMismatch { name: "vertices", expected: 0, found: 1, .. }
        ));
    }

    #[test]
    fn wrong_group_is_rejected() {
        let shader = shader_with_bindings(
            "group",
            "@group(1) @binding(0) var<storage, read> vertices: array<Vertex>;
             @group(0) @binding(1) var<uniform> viewport: ViewportUniform;",
        );
        let err = shader.check_interface().unwrap_err();
        assert!(matches!(err, RenderError::BindingMismatch { found_group: 1, .. }));
    }

    #[test]
    fn missing_viewport_is_rejected() {
        let shader = shader_with_bindings(
            "missing",
            "@group(0) @binding(0) var<storage, read> vertices: array<Vertex>;",
        );
        assert!(matches!(
            shader.check_interface(),
            Err(RenderError::MissingBinding { slot: BufferIndex::ViewportSize, .. })
        ));
    }

    #[test]
    fn writable_vertex_storage_is_rejected() {
        let shader = shader_with_bindings(
            "rw",
            "@group(0) @binding(0) var<storage, read_write> vertices: array<Vertex>;
             @group(0) @binding(1) var<uniform> viewport: ViewportUniform;",
        );
        match shader.check_interface().unwrap_err() {
            RenderError::BindingKind { found, expected, .. } => {
                assert_eq!(found, "storage, read_write");
                assert_eq!(expected, "storage, read");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn storage_without_access_mode_is_read_only() {
        let shader = shader_with_bindings(
            "default access",
            "@group(0) @binding(0) var<storage> vertices: array<Vertex>;
             @group(0) @binding(1) var<uniform> viewport: ViewportUniform;",
        );
        shader.check_interface().unwrap();
    }

    #[test]
    fn declaration_split_across_lines_is_accepted() {
        let shader = shader_with_bindings(
            "multi-line",
            "@group(0)
             @binding(0)
             var<storage, read>
                 vertices: array<Vertex>;
             @group(0) @binding(1) var<uniform>
                 viewport: ViewportUniform;",
        );
        shader.check_interface().unwrap();
        assert_eq!(shader.declared_bindings().unwrap().len(), 2);
    }

    #[test]
    fn commented_out_declarations_are_ignored() {
        let shader = shader_with_bindings(
            "commented",
            "// @group(0) @binding(0) var<storage, read> vertices: array<Vertex>;
             /* @group(0) @binding(0) var<storage> vertices: array<Vertex>; */
             @group(0) @binding(1) var<uniform> viewport: ViewportUniform;",
        );
        assert_eq!(shader.declared_bindings().unwrap().len(), 1);
        assert!(matches!(
            shader.check_interface(),
            Err(RenderError::MissingBinding { slot: BufferIndex::Vertices, .. })
        ));
    }

    #[test]
    fn malformed_source_is_rejected() {
        let shader = ShaderArtifact::from_wgsl(
            "broken",
            "@group(0) @binding(0) var<storage, read> vertices: array<vec4<f32>>;
             @group(0) @binding(1) var<uniform> viewport: vec4<f32>;
             fn vs_main( this is not wgsl",
        );
        match shader.check_interface().unwrap_err() {
            RenderError::InvalidShader { label, reason } => {
                assert_eq!(label, "broken");
                assert!(!reason.is_empty());
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn ill_typed_source_is_rejected() {
        let shader = ShaderArtifact::from_wgsl(
            "ill-typed",
            "@vertex fn vs_main() -> @builtin(position) vec4<f32> { return 1u; }
             @fragment fn fs_main() -> @location(0) vec4<f32> { return vec4<f32>(1.0); }",
        );
        assert!(matches!(
            shader.check_interface(),
            Err(RenderError::InvalidShader { .. })
        ));
    }

    #[test]
    fn entry_point_lookup_ignores_whitespace() {
        let source = ShaderArtifact::vertex_color()
            .source
            .replace("fn vs_main(", "fn vs_main (");
        ShaderArtifact::from_wgsl("spaced", source)
            .check_interface()
            .unwrap();
    }

    #[test]
    fn missing_fragment_entry_is_rejected() {
        let mut shader = ShaderArtifact::vertex_color();
        shader.fragment_entry = "main";
        assert!(matches!(
            shader.check_interface(),
            Err(RenderError::MissingEntryPoint {
                name: "main",
                stage: naga::ShaderStage::Fragment
            })
        ));
    }

    #[test]
    fn entry_point_of_wrong_stage_is_rejected() {
        let mut shader = ShaderArtifact::vertex_color();
        shader.vertex_entry = "fs_main";
        assert!(matches!(
            shader.check_interface(),
            Err(RenderError::MissingEntryPoint { name: "fs_main", .. })
        ));
    }
}
