use bitflags::bitflags;
use bytemuck::{Pod, Zeroable};

use super::types::{IndexBuffer, Shader, VertexBuffer};
use crate::utils::handle::Handle;
use raw_window_handle::RawWindowHandle;

#[cfg(feature = "nori-serde")]
use serde::{Deserialize, Serialize};

//===----------------------------------------------------------------------===//
// Stable-code enums
//
// The numeric values below follow the Direct3D encodings and are part of the
// wire/state contract: they are never renumbered.
//===----------------------------------------------------------------------===//

#[repr(u32)]
#[derive(Debug, Hash, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "nori-serde", derive(Serialize, Deserialize))]
pub enum FillMode {
    Wireframe = 2,
    #[default]
    Solid = 3,
}

#[repr(u32)]
#[derive(Debug, Hash, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "nori-serde", derive(Serialize, Deserialize))]
pub enum CullMode {
    None = 1,
    Front = 2,
    #[default]
    Back = 3,
}

#[repr(u32)]
#[derive(Debug, Hash, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "nori-serde", derive(Serialize, Deserialize))]
pub enum ConservativeRasterization {
    #[default]
    Off = 0,
    On = 1,
}

#[repr(u32)]
#[derive(Debug, Hash, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "nori-serde", derive(Serialize, Deserialize))]
pub enum ComparisonFunc {
    Never = 1,
    #[default]
    Less = 2,
    Equal = 3,
    LessEqual = 4,
    Greater = 5,
    NotEqual = 6,
    GreaterEqual = 7,
    Always = 8,
}

#[repr(u32)]
#[derive(Debug, Hash, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "nori-serde", derive(Serialize, Deserialize))]
pub enum Blend {
    Zero = 1,
    #[default]
    One = 2,
    SrcColor = 3,
    InvSrcColor = 4,
    SrcAlpha = 5,
    InvSrcAlpha = 6,
    DestAlpha = 7,
    InvDestAlpha = 8,
    DestColor = 9,
    InvDestColor = 10,
    SrcAlphaSat = 11,
    BlendFactor = 14,
    InvBlendFactor = 15,
}

#[repr(u32)]
#[derive(Debug, Hash, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "nori-serde", derive(Serialize, Deserialize))]
pub enum BlendOp {
    #[default]
    Add = 1,
    Subtract = 2,
    RevSubtract = 3,
    Min = 4,
    Max = 5,
}

#[repr(u32)]
#[derive(Debug, Hash, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "nori-serde", derive(Serialize, Deserialize))]
pub enum StencilOp {
    #[default]
    Keep = 1,
    Zero = 2,
    Replace = 3,
    IncrSat = 4,
    DecrSat = 5,
    Invert = 6,
    Incr = 7,
    Decr = 8,
}

#[repr(u32)]
#[derive(Debug, Hash, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "nori-serde", derive(Serialize, Deserialize))]
pub enum FilterMode {
    Nearest = 0,
    #[default]
    Linear = 0x15,
    Anisotropic = 0x55,
}

#[repr(u32)]
#[derive(Debug, Hash, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "nori-serde", derive(Serialize, Deserialize))]
pub enum TextureAddressMode {
    #[default]
    Wrap = 1,
    Mirror = 2,
    Clamp = 3,
    Border = 4,
    MirrorOnce = 5,
}

#[repr(u32)]
#[derive(Debug, Hash, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "nori-serde", derive(Serialize, Deserialize))]
pub enum PrimitiveTopology {
    PointList = 1,
    LineList = 2,
    LineStrip = 3,
    #[default]
    TriangleList = 4,
    TriangleStrip = 5,
}

// Rides inside serialized command payloads.
unsafe impl Zeroable for PrimitiveTopology {}
unsafe impl Pod for PrimitiveTopology {}

#[repr(u32)]
#[derive(Debug, Hash, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "nori-serde", derive(Serialize, Deserialize))]
pub enum TextureFormat {
    Unknown = 0,
    R8Unorm = 1,
    #[default]
    Rgba8Unorm = 2,
    Rgba8UnormSrgb = 3,
    Bgra8Unorm = 4,
    R16Float = 5,
    Rgba16Float = 6,
    R32Uint = 7,
    R32Float = 8,
    Rgba32Float = 9,
    D24UnormS8Uint = 10,
    D32Float = 11,
}

#[repr(u32)]
#[derive(Debug, Hash, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "nori-serde", derive(Serialize, Deserialize))]
pub enum IndexFormat {
    #[default]
    U16 = 0,
    U32 = 1,
}

#[repr(u32)]
#[derive(Debug, Hash, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "nori-serde", derive(Serialize, Deserialize))]
pub enum BufferUsage {
    StaticDraw = 0,
    #[default]
    DynamicDraw = 1,
    StreamDraw = 2,
}

#[repr(u32)]
#[derive(Debug, Hash, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "nori-serde", derive(Serialize, Deserialize))]
pub enum TextureKind {
    D1 = 0,
    #[default]
    D2 = 1,
    D2Array = 2,
    D3 = 3,
    Cube = 4,
}

#[repr(u32)]
#[derive(Debug, Hash, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "nori-serde", derive(Serialize, Deserialize))]
pub enum ShaderStage {
    #[default]
    Vertex = 0,
    TessControl = 1,
    TessEval = 2,
    Geometry = 3,
    Fragment = 4,
    Compute = 5,
}

#[repr(u32)]
#[derive(Debug, Hash, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "nori-serde", derive(Serialize, Deserialize))]
pub enum WindowBuffering {
    #[default]
    Double = 2,
    Triple = 3,
}

#[repr(u32)]
#[derive(Debug, Hash, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "nori-serde", derive(Serialize, Deserialize))]
pub enum AttributeFormat {
    F32 = 0,
    F32x2 = 1,
    F32x3 = 2,
    #[default]
    F32x4 = 3,
    U8x4Norm = 4,
    U32 = 5,
}

#[repr(u32)]
#[derive(Debug, Hash, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "nori-serde", derive(Serialize, Deserialize))]
pub enum DepthWriteMask {
    Zero = 0,
    #[default]
    All = 1,
}

bitflags! {
    /// Which parts of the bound render targets a clear touches.
    #[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ClearFlags: u32 {
        const COLOR   = 0x1;
        const DEPTH   = 0x2;
        const STENCIL = 0x4;
    }
}

//===----------------------------------------------------------------------===//
// State descriptors
//
// Plain value structs, copied into pipeline state objects and never shared
// by reference.
//===----------------------------------------------------------------------===//

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "nori-serde", derive(Serialize, Deserialize))]
pub struct RasterizerState {
    pub fill_mode: FillMode,
    pub cull_mode: CullMode,
    pub front_counter_clockwise: bool,
    pub depth_bias: i32,
    pub depth_bias_clamp: f32,
    pub slope_scaled_depth_bias: f32,
    pub depth_clip_enable: bool,
    pub scissor_enable: bool,
    pub multisample_enable: bool,
    pub antialiased_line_enable: bool,
    pub conservative_rasterization: ConservativeRasterization,
}

impl Default for RasterizerState {
    /// Solid fill, back-face culling, no scissor.
    fn default() -> Self {
        Self {
            fill_mode: FillMode::Solid,
            cull_mode: CullMode::Back,
            front_counter_clockwise: false,
            depth_bias: 0,
            depth_bias_clamp: 0.0,
            slope_scaled_depth_bias: 0.0,
            depth_clip_enable: true,
            scissor_enable: false,
            multisample_enable: false,
            antialiased_line_enable: false,
            conservative_rasterization: ConservativeRasterization::Off,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "nori-serde", derive(Serialize, Deserialize))]
pub struct StencilOpDesc {
    pub fail_op: StencilOp,
    pub depth_fail_op: StencilOp,
    pub pass_op: StencilOp,
    pub func: ComparisonFunc,
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "nori-serde", derive(Serialize, Deserialize))]
pub struct DepthStencilState {
    pub depth_enable: bool,
    pub depth_write_mask: DepthWriteMask,
    pub depth_func: ComparisonFunc,
    pub stencil_enable: bool,
    pub stencil_read_mask: u8,
    pub stencil_write_mask: u8,
    pub front_face: StencilOpDesc,
    pub back_face: StencilOpDesc,
}

impl Default for DepthStencilState {
    /// Depth test enabled, full depth writes, LESS comparison, no stencil.
    fn default() -> Self {
        let face = StencilOpDesc {
            fail_op: StencilOp::Keep,
            depth_fail_op: StencilOp::Keep,
            pass_op: StencilOp::Keep,
            func: ComparisonFunc::Always,
        };
        Self {
            depth_enable: true,
            depth_write_mask: DepthWriteMask::All,
            depth_func: ComparisonFunc::Less,
            stencil_enable: false,
            stencil_read_mask: 0xff,
            stencil_write_mask: 0xff,
            front_face: face,
            back_face: face,
        }
    }
}

pub const COLOR_WRITE_ALL: u8 = 0xf;

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "nori-serde", derive(Serialize, Deserialize))]
pub struct RenderTargetBlend {
    pub blend_enable: bool,
    pub src_blend: Blend,
    pub dest_blend: Blend,
    pub blend_op: BlendOp,
    pub src_blend_alpha: Blend,
    pub dest_blend_alpha: Blend,
    pub blend_op_alpha: BlendOp,
    pub write_mask: u8,
}

impl Default for RenderTargetBlend {
    fn default() -> Self {
        Self {
            blend_enable: false,
            src_blend: Blend::One,
            dest_blend: Blend::Zero,
            blend_op: BlendOp::Add,
            src_blend_alpha: Blend::One,
            dest_blend_alpha: Blend::Zero,
            blend_op_alpha: BlendOp::Add,
            write_mask: COLOR_WRITE_ALL,
        }
    }
}

/// Up to eight simultaneous render targets, matching the pipeline contract.
pub const MAX_RENDER_TARGETS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "nori-serde", derive(Serialize, Deserialize))]
pub struct BlendState {
    pub alpha_to_coverage_enable: bool,
    pub independent_blend_enable: bool,
    pub render_targets: [RenderTargetBlend; MAX_RENDER_TARGETS],
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "nori-serde", derive(Serialize, Deserialize))]
pub struct SamplerDesc {
    pub filter: FilterMode,
    pub address_u: TextureAddressMode,
    pub address_v: TextureAddressMode,
    pub address_w: TextureAddressMode,
    pub mip_lod_bias: f32,
    pub max_anisotropy: u32,
    pub comparison_func: ComparisonFunc,
    pub border_color: [f32; 4],
    pub min_lod: f32,
    pub max_lod: f32,
}

impl Default for SamplerDesc {
    /// Linear filtering, repeat addressing, full mip range.
    fn default() -> Self {
        Self {
            filter: FilterMode::Linear,
            address_u: TextureAddressMode::Wrap,
            address_v: TextureAddressMode::Wrap,
            address_w: TextureAddressMode::Wrap,
            mip_lod_bias: 0.0,
            max_anisotropy: 1,
            comparison_func: ComparisonFunc::Never,
            border_color: [0.0; 4],
            min_lod: 0.0,
            max_lod: f32::MAX,
        }
    }
}

//===----------------------------------------------------------------------===//
// Geometry helpers
//===----------------------------------------------------------------------===//

#[derive(Debug, Hash, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "nori-serde", derive(Serialize, Deserialize))]
pub struct Extent {
    pub width: u32,
    pub height: u32,
}

#[repr(C)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Pod, Zeroable)]
#[cfg_attr(feature = "nori-serde", derive(Serialize, Deserialize))]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub min_depth: f32,
    pub max_depth: f32,
}

#[repr(C)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
#[cfg_attr(feature = "nori-serde", derive(Serialize, Deserialize))]
pub struct ScissorRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

//===----------------------------------------------------------------------===//
// Indirect argument blocks
//
// Field order is part of the wire contract between recording code and every
// backend dispatcher.
//===----------------------------------------------------------------------===//

#[repr(C)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct DrawArguments {
    pub vertex_count: u32,
    pub instance_count: u32,
    pub start_vertex: u32,
    pub start_instance: u32,
}

impl DrawArguments {
    pub fn vertices(vertex_count: u32) -> Self {
        Self {
            vertex_count,
            instance_count: 1,
            ..Default::default()
        }
    }
}

#[repr(C)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct DrawIndexedArguments {
    pub index_count: u32,
    pub instance_count: u32,
    pub start_index: u32,
    pub base_vertex: i32,
    pub start_instance: u32,
}

impl DrawIndexedArguments {
    pub fn indices(index_count: u32) -> Self {
        Self {
            index_count,
            instance_count: 1,
            ..Default::default()
        }
    }
}

//===----------------------------------------------------------------------===//
// Vertex layout
//===----------------------------------------------------------------------===//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "nori-serde", derive(Serialize, Deserialize))]
pub struct VertexAttribute {
    pub location: u32,
    pub format: AttributeFormat,
    pub offset: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "nori-serde", derive(Serialize, Deserialize))]
pub struct VertexLayout {
    pub attributes: Vec<VertexAttribute>,
    pub stride: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexBufferBinding {
    pub buffer: Handle<VertexBuffer>,
    pub stride: u32,
    pub offset: u32,
}

//===----------------------------------------------------------------------===//
// Creation info
//===----------------------------------------------------------------------===//

#[derive(Clone, Copy)]
pub struct BufferInfo<'a> {
    pub debug_name: &'a str,
    pub byte_size: u32,
    pub usage: BufferUsage,
    /// `None` means the buffer starts empty.
    pub initial_data: Option<&'a [u8]>,
}

impl<'a> Default for BufferInfo<'a> {
    fn default() -> Self {
        Self {
            debug_name: "",
            byte_size: 0,
            usage: BufferUsage::DynamicDraw,
            initial_data: None,
        }
    }
}

#[derive(Clone, Copy)]
pub struct TextureBufferInfo<'a> {
    pub debug_name: &'a str,
    pub byte_size: u32,
    pub format: TextureFormat,
    pub usage: BufferUsage,
    pub initial_data: Option<&'a [u8]>,
}

impl<'a> Default for TextureBufferInfo<'a> {
    fn default() -> Self {
        Self {
            debug_name: "",
            byte_size: 0,
            format: TextureFormat::Rgba32Float,
            usage: BufferUsage::DynamicDraw,
            initial_data: None,
        }
    }
}

#[derive(Clone, Copy)]
pub struct TextureInfo<'a> {
    pub debug_name: &'a str,
    pub kind: TextureKind,
    pub dim: [u32; 3],
    pub layers: u32,
    pub format: TextureFormat,
    pub mip_levels: u32,
    pub initial_data: Option<&'a [u8]>,
}

impl<'a> Default for TextureInfo<'a> {
    fn default() -> Self {
        Self {
            debug_name: "",
            kind: TextureKind::D2,
            dim: [1, 1, 1],
            layers: 1,
            format: TextureFormat::Rgba8Unorm,
            mip_levels: 1,
            initial_data: None,
        }
    }
}

#[derive(Clone, Copy)]
pub struct SamplerInfo<'a> {
    pub debug_name: &'a str,
    pub desc: SamplerDesc,
}

impl<'a> Default for SamplerInfo<'a> {
    fn default() -> Self {
        Self {
            debug_name: "",
            desc: SamplerDesc::default(),
        }
    }
}

#[derive(Clone, Copy)]
pub struct ShaderInfo<'a> {
    pub debug_name: &'a str,
    pub stage: ShaderStage,
    pub bytecode: &'a [u8],
}

impl<'a> Default for ShaderInfo<'a> {
    fn default() -> Self {
        Self {
            debug_name: "",
            stage: ShaderStage::Vertex,
            bytecode: &[],
        }
    }
}

#[derive(Clone, Copy, Default)]
pub struct ProgramInfo<'a> {
    pub debug_name: &'a str,
    pub shaders: &'a [Handle<Shader>],
}

#[derive(Clone)]
pub struct VertexArrayInfo<'a> {
    pub debug_name: &'a str,
    pub vertex_buffers: &'a [VertexBufferBinding],
    pub index_buffer: Option<Handle<IndexBuffer>>,
    pub index_format: IndexFormat,
    pub layout: VertexLayout,
}

impl<'a> Default for VertexArrayInfo<'a> {
    fn default() -> Self {
        Self {
            debug_name: "",
            vertex_buffers: &[],
            index_buffer: None,
            index_format: IndexFormat::U32,
            layout: VertexLayout::default(),
        }
    }
}

#[derive(Clone, Copy)]
pub struct SwapChainInfo<'a> {
    pub debug_name: &'a str,
    /// `None` runs the swap chain headless (offscreen presentation).
    pub window_handle: Option<RawWindowHandle>,
    pub extent: Extent,
    pub format: TextureFormat,
    pub buffering: WindowBuffering,
}

impl<'a> Default for SwapChainInfo<'a> {
    fn default() -> Self {
        Self {
            debug_name: "",
            window_handle: None,
            extent: Extent {
                width: 1280,
                height: 720,
            },
            format: TextureFormat::Bgra8Unorm,
            buffering: WindowBuffering::Double,
        }
    }
}
