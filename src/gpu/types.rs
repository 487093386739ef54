//! Marker types that tag [`Handle`]s with the resource kind they address.
//!
//! The markers carry no data; each backend keeps its own native payloads
//! behind the handle.
//!
//! [`Handle`]: crate::utils::handle::Handle

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct VertexBuffer;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct IndexBuffer;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct UniformBuffer;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct TextureBuffer;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct IndirectBuffer;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Texture;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct SamplerState;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Shader;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Program;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct RootSignature;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ResourceGroup;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Pipeline;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct VertexArray;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct SwapChain;
