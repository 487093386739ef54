//! Headless reference backend.
//!
//! Implements the full factory and execution surface without touching any
//! native graphics API. Submitted command buffers are interpreted into a
//! dispatch trace, which makes this backend the ground truth for protocol
//! and lifetime tests as well as a cheap target for CI machines without a
//! GPU.

use raw_window_handle::RawWindowHandle;

use super::binding::{
    validate_resource_group, BoundResource, ResourceGroupInfo, RootSignatureDesc,
    RootSignatureInfo,
};
use super::error::{GpuError, Result};
use super::pipeline::{PipelineDesc, PipelineInfo};
use super::probe::{CapabilityProbe, MarkerHooks, MarkerLoader};
use super::structs::{
    BufferInfo, BufferUsage, ClearFlags, DrawArguments, DrawIndexedArguments, Extent, IndexFormat,
    PrimitiveTopology, ProgramInfo, SamplerDesc, SamplerInfo, ScissorRect, ShaderInfo, ShaderStage,
    SwapChainInfo, TextureBufferInfo, TextureFormat, TextureInfo, TextureKind, VertexArrayInfo,
    VertexBufferBinding, VertexLayout, Viewport, WindowBuffering,
};
use super::types::{
    IndexBuffer, IndirectBuffer, Pipeline, Program, ResourceGroup, RootSignature, SamplerState,
    Shader, SwapChain, Texture, TextureBuffer, UniformBuffer, VertexArray, VertexBuffer,
};
use super::ContextInfo;
use crate::driver::command::{self as cmd, CommandBuffer, CommandSink};
use crate::utils::handle::Handle;
use crate::utils::refcount::{ReleaseOutcome, ResourceTable};

//===----------------------------------------------------------------------===//
// Native payloads
//===----------------------------------------------------------------------===//

#[derive(Debug)]
pub struct NullBuffer {
    pub byte_size: u32,
    pub usage: BufferUsage,
}

#[derive(Debug)]
pub struct NullTextureBuffer {
    pub byte_size: u32,
    pub usage: BufferUsage,
    pub format: TextureFormat,
}

#[derive(Debug)]
pub struct NullTexture {
    pub kind: TextureKind,
    pub dim: [u32; 3],
    pub layers: u32,
    pub format: TextureFormat,
    pub mip_levels: u32,
}

#[derive(Debug)]
pub struct NullShader {
    pub stage: ShaderStage,
    pub bytecode_size: usize,
}

#[derive(Debug)]
pub struct NullProgram {
    pub shaders: Vec<Handle<Shader>>,
}

pub struct NullResourceGroup {
    pub root_parameter_index: u32,
    pub resources: Vec<Option<BoundResource>>,
    pub samplers: Vec<Option<Handle<SamplerState>>>,
}

pub struct NullVertexArray {
    pub vertex_buffers: Vec<VertexBufferBinding>,
    pub index_buffer: Option<Handle<IndexBuffer>>,
    pub index_format: IndexFormat,
    pub layout: VertexLayout,
}

pub struct NullSwapChain {
    pub extent: Extent,
    pub format: TextureFormat,
    pub buffering: WindowBuffering,
    pub fullscreen: bool,
    pub window: Option<RawWindowHandle>,
    pub frames_presented: u64,
}

//===----------------------------------------------------------------------===//
// Dispatch trace
//===----------------------------------------------------------------------===//

/// One interpreted command, in the order the backend visited it.
#[derive(Debug, Clone, PartialEq)]
pub enum TraceCommand {
    Clear {
        flags: ClearFlags,
        color: [f32; 4],
        depth: f32,
        stencil: u32,
    },
    SetRootSignature(Handle<RootSignature>),
    SetResourceGroup {
        root_parameter_index: u32,
        resource_group: Handle<ResourceGroup>,
    },
    SetPipeline(Handle<Pipeline>),
    SetVertexArray(Handle<VertexArray>),
    SetPrimitiveTopology(PrimitiveTopology),
    SetViewport(Viewport),
    SetScissor(ScissorRect),
    Draw(Vec<DrawArguments>),
    DrawIndexed(Vec<DrawIndexedArguments>),
    DrawIndirect {
        buffer: Handle<IndirectBuffer>,
        byte_offset: u32,
        draw_count: u32,
    },
    DrawIndexedIndirect {
        buffer: Handle<IndirectBuffer>,
        byte_offset: u32,
        draw_count: u32,
    },
    Dispatch {
        x: u32,
        y: u32,
        z: u32,
    },
    SetDebugMarker(String),
    BeginDebugEvent(String),
    EndDebugEvent,
}

//===----------------------------------------------------------------------===//
// Context
//===----------------------------------------------------------------------===//

pub struct NullContext {
    vertex_buffers: ResourceTable<VertexBuffer, NullBuffer>,
    index_buffers: ResourceTable<IndexBuffer, NullBuffer>,
    uniform_buffers: ResourceTable<UniformBuffer, NullBuffer>,
    indirect_buffers: ResourceTable<IndirectBuffer, NullBuffer>,
    texture_buffers: ResourceTable<TextureBuffer, NullTextureBuffer>,
    textures: ResourceTable<Texture, NullTexture>,
    samplers: ResourceTable<SamplerState, SamplerDesc>,
    shaders: ResourceTable<Shader, NullShader>,
    programs: ResourceTable<Program, NullProgram>,
    root_signatures: ResourceTable<RootSignature, RootSignatureDesc>,
    resource_groups: ResourceTable<ResourceGroup, NullResourceGroup>,
    pipelines: ResourceTable<Pipeline, PipelineDesc>,
    vertex_arrays: ResourceTable<VertexArray, NullVertexArray>,
    swap_chains: ResourceTable<SwapChain, NullSwapChain>,
    trace: Vec<TraceCommand>,
    markers: CapabilityProbe<MarkerHooks>,
    marker_loader: Option<MarkerLoader>,
}

impl NullContext {
    pub fn new(info: &ContextInfo) -> Result<Self> {
        let cap = info.resource_capacity;
        log::debug!("null rendering backend initialized (capacity {cap} per resource kind)");
        Ok(Self {
            vertex_buffers: ResourceTable::new(cap),
            index_buffers: ResourceTable::new(cap),
            uniform_buffers: ResourceTable::new(cap),
            indirect_buffers: ResourceTable::new(cap),
            texture_buffers: ResourceTable::new(cap),
            textures: ResourceTable::new(cap),
            samplers: ResourceTable::new(cap),
            shaders: ResourceTable::new(cap),
            programs: ResourceTable::new(cap),
            root_signatures: ResourceTable::new(cap),
            resource_groups: ResourceTable::new(cap),
            pipelines: ResourceTable::new(cap),
            vertex_arrays: ResourceTable::new(cap),
            swap_chains: ResourceTable::new(cap),
            trace: Vec::new(),
            markers: CapabilityProbe::new(),
            marker_loader: info.marker_loader,
        })
    }

    //===------------------------------------------------------------------===//
    // Buffer factories
    //===------------------------------------------------------------------===//

    pub fn make_vertex_buffer(&mut self, info: &BufferInfo) -> Result<Handle<VertexBuffer>> {
        let buffer = NullBuffer {
            byte_size: info.byte_size,
            usage: info.usage,
        };
        self.vertex_buffers
            .insert(buffer, info.debug_name)
            .ok_or(GpuError::SlotExhausted)
    }

    pub fn make_index_buffer(&mut self, info: &BufferInfo) -> Result<Handle<IndexBuffer>> {
        let buffer = NullBuffer {
            byte_size: info.byte_size,
            usage: info.usage,
        };
        self.index_buffers
            .insert(buffer, info.debug_name)
            .ok_or(GpuError::SlotExhausted)
    }

    pub fn make_uniform_buffer(&mut self, info: &BufferInfo) -> Result<Handle<UniformBuffer>> {
        let buffer = NullBuffer {
            byte_size: info.byte_size,
            usage: info.usage,
        };
        self.uniform_buffers
            .insert(buffer, info.debug_name)
            .ok_or(GpuError::SlotExhausted)
    }

    pub fn make_indirect_buffer(&mut self, info: &BufferInfo) -> Result<Handle<IndirectBuffer>> {
        let buffer = NullBuffer {
            byte_size: info.byte_size,
            usage: info.usage,
        };
        self.indirect_buffers
            .insert(buffer, info.debug_name)
            .ok_or(GpuError::SlotExhausted)
    }

    pub fn make_texture_buffer(&mut self, info: &TextureBufferInfo) -> Result<Handle<TextureBuffer>> {
        let buffer = NullTextureBuffer {
            byte_size: info.byte_size,
            usage: info.usage,
            format: info.format,
        };
        self.texture_buffers
            .insert(buffer, info.debug_name)
            .ok_or(GpuError::SlotExhausted)
    }

    //===------------------------------------------------------------------===//
    // Texture / sampler / shader factories
    //===------------------------------------------------------------------===//

    pub fn make_texture(&mut self, info: &TextureInfo) -> Result<Handle<Texture>> {
        if info.dim.contains(&0) || info.mip_levels == 0 {
            debug_assert!(false, "texture dimensions and mip count must be non-zero");
            return Err(GpuError::Validation("texture dimensions must be non-zero"));
        }
        let texture = NullTexture {
            kind: info.kind,
            dim: info.dim,
            layers: info.layers,
            format: info.format,
            mip_levels: info.mip_levels,
        };
        self.textures
            .insert(texture, info.debug_name)
            .ok_or(GpuError::SlotExhausted)
    }

    pub fn make_sampler(&mut self, info: &SamplerInfo) -> Result<Handle<SamplerState>> {
        self.samplers
            .insert(info.desc, info.debug_name)
            .ok_or(GpuError::SlotExhausted)
    }

    pub fn make_shader(&mut self, info: &ShaderInfo) -> Result<Handle<Shader>> {
        let shader = NullShader {
            stage: info.stage,
            bytecode_size: info.bytecode.len(),
        };
        self.shaders
            .insert(shader, info.debug_name)
            .ok_or(GpuError::SlotExhausted)
    }

    pub fn make_program(&mut self, info: &ProgramInfo) -> Result<Handle<Program>> {
        for (i, &shader) in info.shaders.iter().enumerate() {
            if self.shaders.add_ref(shader).is_none() {
                for &taken in &info.shaders[..i] {
                    let _ = self.release_shader(taken);
                }
                return Err(GpuError::InvalidHandle);
            }
        }
        let program = NullProgram {
            shaders: info.shaders.to_vec(),
        };
        match self.programs.insert(program, info.debug_name) {
            Some(handle) => Ok(handle),
            None => {
                for &shader in info.shaders {
                    let _ = self.release_shader(shader);
                }
                Err(GpuError::SlotExhausted)
            }
        }
    }

    //===------------------------------------------------------------------===//
    // Binding model
    //===------------------------------------------------------------------===//

    pub fn make_root_signature(&mut self, info: &RootSignatureInfo) -> Result<Handle<RootSignature>> {
        self.root_signatures
            .insert(info.desc.clone(), info.debug_name)
            .ok_or(GpuError::SlotExhausted)
    }

    /// Create a resource group bound at one root parameter of
    /// `root_signature`. Every non-null input gains one reference that the
    /// group holds until it is destroyed.
    pub fn make_resource_group(
        &mut self,
        root_signature: Handle<RootSignature>,
        info: &ResourceGroupInfo,
    ) -> Result<Handle<ResourceGroup>> {
        {
            let desc = self
                .root_signatures
                .get(root_signature)
                .ok_or(GpuError::InvalidHandle)?;
            validate_resource_group(desc, info)?;
        }

        let mut taken: Vec<BoundResource> = Vec::new();
        let mut taken_samplers: Vec<Handle<SamplerState>> = Vec::new();
        let rollback = |ctx: &mut Self, taken: &[BoundResource], samplers: &[Handle<SamplerState>]| {
            for &bound in taken {
                let _ = ctx.release_bound(bound);
            }
            for &sampler in samplers {
                let _ = ctx.release_sampler(sampler);
            }
        };

        for bound in info.resources.iter().flatten() {
            if self.add_ref_bound(*bound).is_err() {
                rollback(self, &taken, &taken_samplers);
                return Err(GpuError::InvalidHandle);
            }
            taken.push(*bound);
        }
        if let Some(samplers) = info.samplers {
            for sampler in samplers.iter().flatten() {
                if self.samplers.add_ref(*sampler).is_none() {
                    rollback(self, &taken, &taken_samplers);
                    return Err(GpuError::InvalidHandle);
                }
                taken_samplers.push(*sampler);
            }
        }

        let group = NullResourceGroup {
            root_parameter_index: info.root_parameter_index,
            resources: info.resources.to_vec(),
            samplers: info.samplers.map(<[_]>::to_vec).unwrap_or_default(),
        };
        match self.resource_groups.insert(group, info.debug_name) {
            Some(handle) => Ok(handle),
            None => {
                rollback(self, &taken, &taken_samplers);
                Err(GpuError::SlotExhausted)
            }
        }
    }

    pub fn make_pipeline(&mut self, info: &PipelineInfo) -> Result<Handle<Pipeline>> {
        let desc = PipelineDesc::from_info(info)?;
        if self.root_signatures.add_ref(info.root_signature).is_none() {
            return Err(GpuError::InvalidHandle);
        }
        if self.programs.add_ref(info.program).is_none() {
            let _ = self.release_root_signature(info.root_signature);
            return Err(GpuError::InvalidHandle);
        }
        match self.pipelines.insert(desc, info.debug_name) {
            Some(handle) => Ok(handle),
            None => {
                let _ = self.release_root_signature(info.root_signature);
                let _ = self.release_program(info.program);
                Err(GpuError::SlotExhausted)
            }
        }
    }

    pub fn make_vertex_array(&mut self, info: &VertexArrayInfo) -> Result<Handle<VertexArray>> {
        for (i, binding) in info.vertex_buffers.iter().enumerate() {
            if self.vertex_buffers.add_ref(binding.buffer).is_none() {
                for prior in &info.vertex_buffers[..i] {
                    let _ = self.release_vertex_buffer(prior.buffer);
                }
                return Err(GpuError::InvalidHandle);
            }
        }
        if let Some(index_buffer) = info.index_buffer {
            if self.index_buffers.add_ref(index_buffer).is_none() {
                for binding in info.vertex_buffers {
                    let _ = self.release_vertex_buffer(binding.buffer);
                }
                return Err(GpuError::InvalidHandle);
            }
        }
        let array = NullVertexArray {
            vertex_buffers: info.vertex_buffers.to_vec(),
            index_buffer: info.index_buffer,
            index_format: info.index_format,
            layout: info.layout.clone(),
        };
        match self.vertex_arrays.insert(array, info.debug_name) {
            Some(handle) => Ok(handle),
            None => {
                for binding in info.vertex_buffers {
                    let _ = self.release_vertex_buffer(binding.buffer);
                }
                if let Some(index_buffer) = info.index_buffer {
                    let _ = self.release_index_buffer(index_buffer);
                }
                Err(GpuError::SlotExhausted)
            }
        }
    }

    pub fn make_swap_chain(&mut self, info: &SwapChainInfo) -> Result<Handle<SwapChain>> {
        let swap_chain = NullSwapChain {
            extent: info.extent,
            format: info.format,
            buffering: info.buffering,
            fullscreen: false,
            window: info.window_handle,
            frames_presented: 0,
        };
        self.swap_chains
            .insert(swap_chain, info.debug_name)
            .ok_or(GpuError::SlotExhausted)
    }

    //===------------------------------------------------------------------===//
    // Reference counting
    //===------------------------------------------------------------------===//

    pub fn add_ref_vertex_buffer(&self, h: Handle<VertexBuffer>) -> Result<u32> {
        self.vertex_buffers.add_ref(h).ok_or(GpuError::InvalidHandle)
    }

    pub fn add_ref_index_buffer(&self, h: Handle<IndexBuffer>) -> Result<u32> {
        self.index_buffers.add_ref(h).ok_or(GpuError::InvalidHandle)
    }

    pub fn add_ref_uniform_buffer(&self, h: Handle<UniformBuffer>) -> Result<u32> {
        self.uniform_buffers.add_ref(h).ok_or(GpuError::InvalidHandle)
    }

    pub fn add_ref_indirect_buffer(&self, h: Handle<IndirectBuffer>) -> Result<u32> {
        self.indirect_buffers.add_ref(h).ok_or(GpuError::InvalidHandle)
    }

    pub fn add_ref_texture_buffer(&self, h: Handle<TextureBuffer>) -> Result<u32> {
        self.texture_buffers.add_ref(h).ok_or(GpuError::InvalidHandle)
    }

    pub fn add_ref_texture(&self, h: Handle<Texture>) -> Result<u32> {
        self.textures.add_ref(h).ok_or(GpuError::InvalidHandle)
    }

    pub fn add_ref_sampler(&self, h: Handle<SamplerState>) -> Result<u32> {
        self.samplers.add_ref(h).ok_or(GpuError::InvalidHandle)
    }

    pub fn add_ref_shader(&self, h: Handle<Shader>) -> Result<u32> {
        self.shaders.add_ref(h).ok_or(GpuError::InvalidHandle)
    }

    pub fn add_ref_program(&self, h: Handle<Program>) -> Result<u32> {
        self.programs.add_ref(h).ok_or(GpuError::InvalidHandle)
    }

    pub fn add_ref_root_signature(&self, h: Handle<RootSignature>) -> Result<u32> {
        self.root_signatures.add_ref(h).ok_or(GpuError::InvalidHandle)
    }

    pub fn add_ref_resource_group(&self, h: Handle<ResourceGroup>) -> Result<u32> {
        self.resource_groups.add_ref(h).ok_or(GpuError::InvalidHandle)
    }

    pub fn add_ref_pipeline(&self, h: Handle<Pipeline>) -> Result<u32> {
        self.pipelines.add_ref(h).ok_or(GpuError::InvalidHandle)
    }

    pub fn add_ref_vertex_array(&self, h: Handle<VertexArray>) -> Result<u32> {
        self.vertex_arrays.add_ref(h).ok_or(GpuError::InvalidHandle)
    }

    pub fn add_ref_swap_chain(&self, h: Handle<SwapChain>) -> Result<u32> {
        self.swap_chains.add_ref(h).ok_or(GpuError::InvalidHandle)
    }

    pub fn add_ref_bound(&self, bound: BoundResource) -> Result<u32> {
        match bound {
            BoundResource::UniformBuffer(h) => self.add_ref_uniform_buffer(h),
            BoundResource::TextureBuffer(h) => self.add_ref_texture_buffer(h),
            BoundResource::Texture(h) => self.add_ref_texture(h),
            BoundResource::Sampler(h) => self.add_ref_sampler(h),
        }
    }

    pub fn release_vertex_buffer(&mut self, h: Handle<VertexBuffer>) -> Result<u32> {
        match self.vertex_buffers.release(h) {
            ReleaseOutcome::Alive(n) => Ok(n),
            ReleaseOutcome::Destroyed(_) => Ok(0),
            ReleaseOutcome::NotFound => Err(GpuError::InvalidHandle),
        }
    }

    pub fn release_index_buffer(&mut self, h: Handle<IndexBuffer>) -> Result<u32> {
        match self.index_buffers.release(h) {
            ReleaseOutcome::Alive(n) => Ok(n),
            ReleaseOutcome::Destroyed(_) => Ok(0),
            ReleaseOutcome::NotFound => Err(GpuError::InvalidHandle),
        }
    }

    pub fn release_uniform_buffer(&mut self, h: Handle<UniformBuffer>) -> Result<u32> {
        match self.uniform_buffers.release(h) {
            ReleaseOutcome::Alive(n) => Ok(n),
            ReleaseOutcome::Destroyed(_) => Ok(0),
            ReleaseOutcome::NotFound => Err(GpuError::InvalidHandle),
        }
    }

    pub fn release_indirect_buffer(&mut self, h: Handle<IndirectBuffer>) -> Result<u32> {
        match self.indirect_buffers.release(h) {
            ReleaseOutcome::Alive(n) => Ok(n),
            ReleaseOutcome::Destroyed(_) => Ok(0),
            ReleaseOutcome::NotFound => Err(GpuError::InvalidHandle),
        }
    }

    pub fn release_texture_buffer(&mut self, h: Handle<TextureBuffer>) -> Result<u32> {
        match self.texture_buffers.release(h) {
            ReleaseOutcome::Alive(n) => Ok(n),
            ReleaseOutcome::Destroyed(_) => Ok(0),
            ReleaseOutcome::NotFound => Err(GpuError::InvalidHandle),
        }
    }

    pub fn release_texture(&mut self, h: Handle<Texture>) -> Result<u32> {
        match self.textures.release(h) {
            ReleaseOutcome::Alive(n) => Ok(n),
            ReleaseOutcome::Destroyed(_) => Ok(0),
            ReleaseOutcome::NotFound => Err(GpuError::InvalidHandle),
        }
    }

    pub fn release_sampler(&mut self, h: Handle<SamplerState>) -> Result<u32> {
        match self.samplers.release(h) {
            ReleaseOutcome::Alive(n) => Ok(n),
            ReleaseOutcome::Destroyed(_) => Ok(0),
            ReleaseOutcome::NotFound => Err(GpuError::InvalidHandle),
        }
    }

    pub fn release_shader(&mut self, h: Handle<Shader>) -> Result<u32> {
        match self.shaders.release(h) {
            ReleaseOutcome::Alive(n) => Ok(n),
            ReleaseOutcome::Destroyed(_) => Ok(0),
            ReleaseOutcome::NotFound => Err(GpuError::InvalidHandle),
        }
    }

    /// Releasing the last program reference also drops the references the
    /// program holds on its shader stages.
    pub fn release_program(&mut self, h: Handle<Program>) -> Result<u32> {
        match self.programs.release(h) {
            ReleaseOutcome::Alive(n) => Ok(n),
            ReleaseOutcome::Destroyed(program) => {
                for shader in program.shaders {
                    let _ = self.release_shader(shader);
                }
                Ok(0)
            }
            ReleaseOutcome::NotFound => Err(GpuError::InvalidHandle),
        }
    }

    pub fn release_root_signature(&mut self, h: Handle<RootSignature>) -> Result<u32> {
        match self.root_signatures.release(h) {
            ReleaseOutcome::Alive(n) => Ok(n),
            ReleaseOutcome::Destroyed(_) => Ok(0),
            ReleaseOutcome::NotFound => Err(GpuError::InvalidHandle),
        }
    }

    /// Releasing the last resource-group reference releases exactly the
    /// references taken at creation; null slots are skipped.
    pub fn release_resource_group(&mut self, h: Handle<ResourceGroup>) -> Result<u32> {
        match self.resource_groups.release(h) {
            ReleaseOutcome::Alive(n) => Ok(n),
            ReleaseOutcome::Destroyed(group) => {
                for bound in group.resources.into_iter().flatten() {
                    let _ = self.release_bound(bound);
                }
                for sampler in group.samplers.into_iter().flatten() {
                    let _ = self.release_sampler(sampler);
                }
                Ok(0)
            }
            ReleaseOutcome::NotFound => Err(GpuError::InvalidHandle),
        }
    }

    /// Releasing the last pipeline reference drops its root-signature and
    /// program references.
    pub fn release_pipeline(&mut self, h: Handle<Pipeline>) -> Result<u32> {
        match self.pipelines.release(h) {
            ReleaseOutcome::Alive(n) => Ok(n),
            ReleaseOutcome::Destroyed(desc) => {
                let _ = self.release_root_signature(desc.root_signature());
                let _ = self.release_program(desc.program());
                Ok(0)
            }
            ReleaseOutcome::NotFound => Err(GpuError::InvalidHandle),
        }
    }

    pub fn release_vertex_array(&mut self, h: Handle<VertexArray>) -> Result<u32> {
        match self.vertex_arrays.release(h) {
            ReleaseOutcome::Alive(n) => Ok(n),
            ReleaseOutcome::Destroyed(array) => {
                for binding in array.vertex_buffers {
                    let _ = self.release_vertex_buffer(binding.buffer);
                }
                if let Some(index_buffer) = array.index_buffer {
                    let _ = self.release_index_buffer(index_buffer);
                }
                Ok(0)
            }
            ReleaseOutcome::NotFound => Err(GpuError::InvalidHandle),
        }
    }

    pub fn release_swap_chain(&mut self, h: Handle<SwapChain>) -> Result<u32> {
        match self.swap_chains.release(h) {
            ReleaseOutcome::Alive(n) => Ok(n),
            ReleaseOutcome::Destroyed(_) => Ok(0),
            ReleaseOutcome::NotFound => Err(GpuError::InvalidHandle),
        }
    }

    pub fn release_bound(&mut self, bound: BoundResource) -> Result<u32> {
        match bound {
            BoundResource::UniformBuffer(h) => self.release_uniform_buffer(h),
            BoundResource::TextureBuffer(h) => self.release_texture_buffer(h),
            BoundResource::Texture(h) => self.release_texture(h),
            BoundResource::Sampler(h) => self.release_sampler(h),
        }
    }

    //===------------------------------------------------------------------===//
    // Accessors (null-handle tolerant)
    //===------------------------------------------------------------------===//

    pub fn vertex_buffer_size(&self, h: Handle<VertexBuffer>) -> Option<u32> {
        self.vertex_buffers.get(h).map(|b| b.byte_size)
    }

    pub fn index_buffer_size(&self, h: Handle<IndexBuffer>) -> Option<u32> {
        self.index_buffers.get(h).map(|b| b.byte_size)
    }

    pub fn uniform_buffer_size(&self, h: Handle<UniformBuffer>) -> Option<u32> {
        self.uniform_buffers.get(h).map(|b| b.byte_size)
    }

    pub fn indirect_buffer_size(&self, h: Handle<IndirectBuffer>) -> Option<u32> {
        self.indirect_buffers.get(h).map(|b| b.byte_size)
    }

    pub fn texture_buffer_size(&self, h: Handle<TextureBuffer>) -> Option<u32> {
        self.texture_buffers.get(h).map(|b| b.byte_size)
    }

    pub fn texture_dim(&self, h: Handle<Texture>) -> Option<[u32; 3]> {
        self.textures.get(h).map(|t| t.dim)
    }

    pub fn texture_format(&self, h: Handle<Texture>) -> Option<TextureFormat> {
        self.textures.get(h).map(|t| t.format)
    }

    pub fn sampler_desc(&self, h: Handle<SamplerState>) -> Option<&SamplerDesc> {
        self.samplers.get(h)
    }

    pub fn root_signature_desc(&self, h: Handle<RootSignature>) -> Option<&RootSignatureDesc> {
        self.root_signatures.get(h)
    }

    pub fn resource_group(&self, h: Handle<ResourceGroup>) -> Option<&NullResourceGroup> {
        self.resource_groups.get(h)
    }

    pub fn vertex_array(&self, h: Handle<VertexArray>) -> Option<&NullVertexArray> {
        self.vertex_arrays.get(h)
    }

    pub fn pipeline_desc(&self, h: Handle<Pipeline>) -> Option<&PipelineDesc> {
        self.pipelines.get(h)
    }

    pub fn bound_ref_count(&self, bound: BoundResource) -> Option<u32> {
        match bound {
            BoundResource::UniformBuffer(h) => self.uniform_buffers.ref_count(h),
            BoundResource::TextureBuffer(h) => self.texture_buffers.ref_count(h),
            BoundResource::Texture(h) => self.textures.ref_count(h),
            BoundResource::Sampler(h) => self.samplers.ref_count(h),
        }
    }

    pub fn vertex_buffer_ref_count(&self, h: Handle<VertexBuffer>) -> Option<u32> {
        self.vertex_buffers.ref_count(h)
    }

    pub fn index_buffer_ref_count(&self, h: Handle<IndexBuffer>) -> Option<u32> {
        self.index_buffers.ref_count(h)
    }

    pub fn sampler_ref_count(&self, h: Handle<SamplerState>) -> Option<u32> {
        self.samplers.ref_count(h)
    }

    pub fn shader_ref_count(&self, h: Handle<Shader>) -> Option<u32> {
        self.shaders.ref_count(h)
    }

    pub fn program_ref_count(&self, h: Handle<Program>) -> Option<u32> {
        self.programs.ref_count(h)
    }

    pub fn root_signature_ref_count(&self, h: Handle<RootSignature>) -> Option<u32> {
        self.root_signatures.ref_count(h)
    }

    pub fn resource_group_ref_count(&self, h: Handle<ResourceGroup>) -> Option<u32> {
        self.resource_groups.ref_count(h)
    }

    pub fn pipeline_ref_count(&self, h: Handle<Pipeline>) -> Option<u32> {
        self.pipelines.ref_count(h)
    }

    /// Total live resources across every kind. Zero right before `destroy`
    /// means a leak-free shutdown.
    pub fn live_resources(&self) -> usize {
        self.vertex_buffers.live()
            + self.index_buffers.live()
            + self.uniform_buffers.live()
            + self.indirect_buffers.live()
            + self.texture_buffers.live()
            + self.textures.live()
            + self.samplers.live()
            + self.shaders.live()
            + self.programs.live()
            + self.root_signatures.live()
            + self.resource_groups.live()
            + self.pipelines.live()
            + self.vertex_arrays.live()
            + self.swap_chains.live()
    }

    //===------------------------------------------------------------------===//
    // Execution
    //===------------------------------------------------------------------===//

    /// Replay a recorded command buffer into the dispatch trace.
    pub fn submit(&mut self, buffer: &CommandBuffer) {
        buffer.dispatch_to(self);
    }

    /// The dispatch trace accumulated by `submit` since the last clear.
    pub fn trace(&self) -> &[TraceCommand] {
        &self.trace
    }

    pub fn take_trace(&mut self) -> Vec<TraceCommand> {
        std::mem::take(&mut self.trace)
    }

    pub fn clear_trace(&mut self) {
        self.trace.clear();
    }

    //===------------------------------------------------------------------===//
    // Swap-chain boundary
    //===------------------------------------------------------------------===//

    pub fn present(&mut self, h: Handle<SwapChain>) -> Result<()> {
        let swap_chain = self.swap_chains.get_mut(h).ok_or(GpuError::InvalidHandle)?;
        swap_chain.frames_presented += 1;
        log::trace!("presented frame {}", swap_chain.frames_presented);
        Ok(())
    }

    pub fn resize_buffers(&mut self, h: Handle<SwapChain>, width: u32, height: u32) -> Result<()> {
        let swap_chain = self.swap_chains.get_mut(h).ok_or(GpuError::InvalidHandle)?;
        swap_chain.extent = Extent { width, height };
        Ok(())
    }

    /// Width and height of the swap chain, queried live. Never served from
    /// a caller-side cache that could be stale after a resize.
    pub fn swap_chain_extent(&self, h: Handle<SwapChain>) -> Option<(u32, u32)> {
        self.swap_chains
            .get(h)
            .map(|sc| (sc.extent.width, sc.extent.height))
    }

    pub fn fullscreen_state(&self, h: Handle<SwapChain>) -> Option<bool> {
        self.swap_chains.get(h).map(|sc| sc.fullscreen)
    }

    pub fn set_fullscreen_state(&mut self, h: Handle<SwapChain>, fullscreen: bool) -> Result<()> {
        let swap_chain = self.swap_chains.get_mut(h).ok_or(GpuError::InvalidHandle)?;
        swap_chain.fullscreen = fullscreen;
        Ok(())
    }

    pub fn frames_presented(&self, h: Handle<SwapChain>) -> Option<u64> {
        self.swap_chains.get(h).map(|sc| sc.frames_presented)
    }

    pub fn native_window_handle(&self, h: Handle<SwapChain>) -> Option<RawWindowHandle> {
        self.swap_chains.get(h).and_then(|sc| sc.window)
    }

    //===------------------------------------------------------------------===//
    // Shutdown
    //===------------------------------------------------------------------===//

    /// Tear the backend down. Every resource should already have been
    /// released; leaks are reported, not reclaimed.
    pub fn destroy(self) {
        let leaks = [
            ("vertex buffers", self.vertex_buffers.live()),
            ("index buffers", self.index_buffers.live()),
            ("uniform buffers", self.uniform_buffers.live()),
            ("indirect buffers", self.indirect_buffers.live()),
            ("texture buffers", self.texture_buffers.live()),
            ("textures", self.textures.live()),
            ("samplers", self.samplers.live()),
            ("shaders", self.shaders.live()),
            ("programs", self.programs.live()),
            ("root signatures", self.root_signatures.live()),
            ("resource groups", self.resource_groups.live()),
            ("pipelines", self.pipelines.live()),
            ("vertex arrays", self.vertex_arrays.live()),
            ("swap chains", self.swap_chains.live()),
        ];
        for (kind, live) in leaks {
            if live > 0 {
                log::warn!("destroying backend with {live} live {kind}");
            }
        }
        log::debug!("null rendering backend destroyed");
    }
}

impl CommandSink for NullContext {
    fn clear(&mut self, c: &cmd::Clear) {
        self.trace.push(TraceCommand::Clear {
            flags: c.flags(),
            color: c.color,
            depth: c.depth,
            stencil: c.stencil,
        });
    }

    fn set_root_signature(&mut self, c: &cmd::SetRootSignature) {
        self.trace
            .push(TraceCommand::SetRootSignature(c.root_signature));
    }

    fn set_resource_group(&mut self, c: &cmd::SetResourceGroup) {
        self.trace.push(TraceCommand::SetResourceGroup {
            root_parameter_index: c.root_parameter_index,
            resource_group: c.resource_group,
        });
    }

    fn set_pipeline(&mut self, c: &cmd::SetPipeline) {
        self.trace.push(TraceCommand::SetPipeline(c.pipeline));
    }

    fn set_vertex_array(&mut self, c: &cmd::SetVertexArray) {
        self.trace.push(TraceCommand::SetVertexArray(c.vertex_array));
    }

    fn set_primitive_topology(&mut self, c: &cmd::SetPrimitiveTopology) {
        self.trace
            .push(TraceCommand::SetPrimitiveTopology(c.topology));
    }

    fn set_viewport(&mut self, c: &cmd::SetViewport) {
        self.trace.push(TraceCommand::SetViewport(c.viewport));
    }

    fn set_scissor(&mut self, c: &cmd::SetScissor) {
        self.trace.push(TraceCommand::SetScissor(c.rect));
    }

    fn draw(&mut self, _c: &cmd::Draw, args: &[DrawArguments]) {
        self.trace.push(TraceCommand::Draw(args.to_vec()));
    }

    fn draw_indexed(&mut self, _c: &cmd::DrawIndexed, args: &[DrawIndexedArguments]) {
        self.trace.push(TraceCommand::DrawIndexed(args.to_vec()));
    }

    fn draw_indirect(&mut self, c: &cmd::DrawIndirect) {
        self.trace.push(TraceCommand::DrawIndirect {
            buffer: c.buffer,
            byte_offset: c.byte_offset,
            draw_count: c.draw_count,
        });
    }

    fn draw_indexed_indirect(&mut self, c: &cmd::DrawIndexedIndirect) {
        self.trace.push(TraceCommand::DrawIndexedIndirect {
            buffer: c.buffer,
            byte_offset: c.byte_offset,
            draw_count: c.draw_count,
        });
    }

    fn dispatch(&mut self, c: &cmd::Dispatch) {
        self.trace.push(TraceCommand::Dispatch {
            x: c.x,
            y: c.y,
            z: c.z,
        });
    }

    fn set_debug_marker(&mut self, label: &str) {
        if let Some(loader) = self.marker_loader {
            if let Some(hooks) = self.markers.get_or_probe(loader) {
                (hooks.set_marker)(label);
            }
        }
        self.trace
            .push(TraceCommand::SetDebugMarker(label.to_owned()));
    }

    fn begin_debug_event(&mut self, label: &str) {
        if let Some(loader) = self.marker_loader {
            if let Some(hooks) = self.markers.get_or_probe(loader) {
                (hooks.begin_event)(label);
            }
        }
        self.trace
            .push(TraceCommand::BeginDebugEvent(label.to_owned()));
    }

    fn end_debug_event(&mut self) {
        if let Some(loader) = self.marker_loader {
            if let Some(hooks) = self.markers.get_or_probe(loader) {
                (hooks.end_event)();
            }
        }
        self.trace.push(TraceCommand::EndDebugEvent);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> NullContext {
        NullContext::new(&ContextInfo::default()).unwrap()
    }

    #[test]
    fn factories_start_resources_at_ref_count_zero() {
        let mut ctx = ctx();
        let buffer = ctx
            .make_uniform_buffer(&BufferInfo {
                debug_name: "camera",
                byte_size: 256,
                ..Default::default()
            })
            .unwrap();
        assert_eq!(
            ctx.bound_ref_count(BoundResource::UniformBuffer(buffer)),
            Some(0)
        );
        assert_eq!(ctx.uniform_buffer_size(buffer), Some(256));
    }

    #[test]
    fn dead_handles_read_as_absent() {
        let ctx = ctx();
        assert_eq!(ctx.uniform_buffer_size(Handle::default()), None);
        assert_eq!(ctx.texture_dim(Handle::default()), None);
        assert_eq!(ctx.swap_chain_extent(Handle::default()), None);
    }

    #[test]
    fn swap_chain_extent_tracks_resizes() {
        let mut ctx = ctx();
        let sc = ctx.make_swap_chain(&SwapChainInfo::default()).unwrap();
        assert_eq!(ctx.swap_chain_extent(sc), Some((1280, 720)));
        ctx.resize_buffers(sc, 1920, 1080).unwrap();
        assert_eq!(ctx.swap_chain_extent(sc), Some((1920, 1080)));
        ctx.present(sc).unwrap();
        assert_eq!(ctx.frames_presented(sc), Some(1));
        assert_eq!(ctx.fullscreen_state(sc), Some(false));
        ctx.set_fullscreen_state(sc, true).unwrap();
        assert_eq!(ctx.fullscreen_state(sc), Some(true));
    }
}
