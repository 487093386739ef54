use super::error::{GpuError, Result};
use super::structs::{
    BlendState, DepthStencilState, PrimitiveTopology, RasterizerState, TextureFormat, VertexLayout,
    MAX_RENDER_TARGETS,
};
use super::types::{Program, RootSignature};
use crate::utils::handle::Handle;

/// Everything needed to create a pipeline state object.
///
/// The three state descriptors default to the documented default states, so a
/// minimal pipeline only names its root signature, program and layout.
#[derive(Clone)]
pub struct PipelineInfo<'a> {
    pub debug_name: &'a str,
    pub root_signature: Handle<RootSignature>,
    pub program: Handle<Program>,
    pub vertex_layout: VertexLayout,
    pub topology: PrimitiveTopology,
    pub rasterizer: RasterizerState,
    pub depth_stencil: DepthStencilState,
    pub blend: BlendState,
    pub render_target_formats: &'a [TextureFormat],
    /// `TextureFormat::Unknown` means no depth-stencil attachment.
    pub depth_stencil_format: TextureFormat,
}

impl<'a> Default for PipelineInfo<'a> {
    fn default() -> Self {
        Self {
            debug_name: "",
            root_signature: Handle::null(),
            program: Handle::null(),
            vertex_layout: VertexLayout::default(),
            topology: PrimitiveTopology::TriangleList,
            rasterizer: RasterizerState::default(),
            depth_stencil: DepthStencilState::default(),
            blend: BlendState::default(),
            render_target_formats: &[TextureFormat::Rgba8Unorm],
            depth_stencil_format: TextureFormat::Unknown,
        }
    }
}

/// The frozen form of a pipeline state object.
///
/// Built once from a [`PipelineInfo`] and immutable afterwards; changing any
/// field means building a new pipeline. State descriptors are stored by
/// value, while root signature and program are held by reference count for
/// the pipeline's entire lifetime (the owning backend adds those references
/// at creation and drops them at destruction).
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineDesc {
    root_signature: Handle<RootSignature>,
    program: Handle<Program>,
    vertex_layout: VertexLayout,
    topology: PrimitiveTopology,
    rasterizer: RasterizerState,
    depth_stencil: DepthStencilState,
    blend: BlendState,
    render_target_formats: [TextureFormat; MAX_RENDER_TARGETS],
    render_target_count: u32,
    depth_stencil_format: TextureFormat,
}

impl PipelineDesc {
    pub fn from_info(info: &PipelineInfo) -> Result<Self> {
        let violation = |msg: &'static str| {
            debug_assert!(false, "{}", msg);
            log::error!("pipeline rejected: {msg}");
            Err(GpuError::Validation(msg))
        };
        if info.root_signature.is_null() {
            return violation("a pipeline requires a root signature");
        }
        if info.program.is_null() {
            return violation("a pipeline requires a program");
        }
        if info.render_target_formats.len() > MAX_RENDER_TARGETS {
            return violation("too many render target formats");
        }

        let mut render_target_formats = [TextureFormat::Unknown; MAX_RENDER_TARGETS];
        render_target_formats[..info.render_target_formats.len()]
            .copy_from_slice(info.render_target_formats);

        Ok(Self {
            root_signature: info.root_signature,
            program: info.program,
            vertex_layout: info.vertex_layout.clone(),
            topology: info.topology,
            rasterizer: info.rasterizer,
            depth_stencil: info.depth_stencil,
            blend: info.blend,
            render_target_formats,
            render_target_count: info.render_target_formats.len() as u32,
            depth_stencil_format: info.depth_stencil_format,
        })
    }

    pub fn root_signature(&self) -> Handle<RootSignature> {
        self.root_signature
    }

    pub fn program(&self) -> Handle<Program> {
        self.program
    }

    pub fn vertex_layout(&self) -> &VertexLayout {
        &self.vertex_layout
    }

    pub fn topology(&self) -> PrimitiveTopology {
        self.topology
    }

    pub fn rasterizer(&self) -> &RasterizerState {
        &self.rasterizer
    }

    pub fn depth_stencil(&self) -> &DepthStencilState {
        &self.depth_stencil
    }

    pub fn blend(&self) -> &BlendState {
        &self.blend
    }

    pub fn render_target_formats(&self) -> &[TextureFormat] {
        &self.render_target_formats[..self.render_target_count as usize]
    }

    pub fn depth_stencil_format(&self) -> TextureFormat {
        self.depth_stencil_format
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_in_state_blocks() {
        let info = PipelineInfo {
            root_signature: Handle::new(1, 0),
            program: Handle::new(1, 0),
            ..Default::default()
        };
        let desc = PipelineDesc::from_info(&info).unwrap();
        assert_eq!(*desc.rasterizer(), RasterizerState::default());
        assert_eq!(*desc.depth_stencil(), DepthStencilState::default());
        assert_eq!(desc.render_target_formats(), &[TextureFormat::Rgba8Unorm]);
        assert_eq!(desc.depth_stencil_format(), TextureFormat::Unknown);
    }

    #[cfg(not(debug_assertions))]
    #[test]
    fn null_root_signature_is_rejected() {
        let info = PipelineInfo {
            program: Handle::new(1, 0),
            ..Default::default()
        };
        assert!(PipelineDesc::from_info(&info).is_err());
    }
}
