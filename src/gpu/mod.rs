mod backend;
mod buffers;
mod compute;
mod context;
mod layout;
mod render;

pub use backend::GpuPhysics;
pub use buffers::SceneBuffers;
pub use context::GpuContext;
pub use render::{PresentationFrame, RenderPipeline};

#[cfg(test)]
mod tests {
    use super::compute::PHYSICS_SHADER;
    use super::render::RENDER_SHADER;

    /// Validates WGSL code using naga.
    fn validate_wgsl(code: &str) -> Result<(), String> {
        let module = naga::front::wgsl::parse_str(code)
            .map_err(|e| format!("WGSL parse error: {:?}", e))?;

        let mut validator = naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::all(),
        );
        validator
            .validate(&module)
            .map_err(|e| format!("WGSL validation error: {:?}", e))?;

        Ok(())
    }

    #[test]
    fn test_physics_shader_is_valid() {
        validate_wgsl(PHYSICS_SHADER).unwrap();
    }

    #[test]
    fn test_render_shader_is_valid() {
        validate_wgsl(RENDER_SHADER).unwrap();
    }

    #[test]
    fn test_physics_workgroup_matches_config() {
        let declared = format!("@workgroup_size({})", crate::config::WORKGROUP_SIZE);
        assert!(PHYSICS_SHADER.contains(&declared), "Shader and config workgroup sizes differ");
    }
}
