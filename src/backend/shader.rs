// Shader module loading
//
// Shaders are opaque SPIR-V blobs compiled offline; the renderer only reads
// them from disk at pipeline-build time.

use anyhow::{Context, Result};
use ash::vk;
use std::io::Cursor;
use std::path::Path;

use super::DeviceContext;

/// Read a SPIR-V file and wrap it in a shader module.
pub fn load_shader_module<P: AsRef<Path>>(
    device: &DeviceContext,
    path: P,
) -> Result<vk::ShaderModule> {
    let path = path.as_ref();
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read shader {:?}", path))?;

    let code = ash::util::read_spv(&mut Cursor::new(&bytes))
        .with_context(|| format!("Invalid SPIR-V in {:?}", path))?;

    let create_info = vk::ShaderModuleCreateInfo::builder().code(&code);

    unsafe {
        device
            .device
            .create_shader_module(&create_info, None)
            .context("Failed to create shader module")
    }
}
