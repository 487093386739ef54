pub mod binding;
pub mod context;
pub mod error;
pub mod null;
pub mod pipeline;
pub mod probe;
pub mod structs;
pub mod types;

pub use binding::{
    BoundResource, DescriptorRange, DescriptorRangeKind, ResourceGroupInfo, RootParameter,
    RootSignatureDesc, RootSignatureInfo,
};
pub use context::{Context, ContextInfo};
pub use error::{GpuError, Result};
pub use null::{NullContext, TraceCommand};
pub use pipeline::{PipelineDesc, PipelineInfo};
pub use probe::{CapabilityProbe, MarkerHooks, MarkerLoader, ProbeState};
pub use structs::*;
pub use types::*;
