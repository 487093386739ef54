use super::error::{GpuError, Result};
use super::structs::SamplerDesc;
use super::types::{SamplerState, Texture, TextureBuffer, UniformBuffer};
use crate::utils::handle::Handle;

#[cfg(feature = "nori-serde")]
use serde::{Deserialize, Serialize};

/// Resource kinds a descriptor range can bind.
#[repr(u32)]
#[derive(Debug, Hash, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "nori-serde", derive(Serialize, Deserialize))]
pub enum DescriptorRangeKind {
    UniformBuffer = 0,
    TextureBuffer = 1,
    Texture = 2,
    Sampler = 3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "nori-serde", derive(Serialize, Deserialize))]
pub struct DescriptorRange {
    pub kind: DescriptorRangeKind,
    pub count: u32,
    pub base_register: u32,
}

/// One root parameter: either a table of descriptor ranges or a sampler baked
/// directly into the signature.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "nori-serde", derive(Serialize, Deserialize))]
pub enum RootParameter {
    DescriptorTable { ranges: Vec<DescriptorRange> },
    ImmediateSampler(SamplerDesc),
}

/// Data-only description of a root signature. Copied into the root-signature
/// resource at creation; the parameter set and order are fixed from then on.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "nori-serde", derive(Serialize, Deserialize))]
pub struct RootSignatureDesc {
    pub parameters: Vec<RootParameter>,
}

impl RootSignatureDesc {
    /// Resource count a resource group targeting `root_parameter_index` must
    /// supply: the summed range counts of that descriptor table. `None` when
    /// the index is out of range or names an immediate sampler.
    pub fn expected_resource_count(&self, root_parameter_index: u32) -> Option<u32> {
        match self.parameters.get(root_parameter_index as usize)? {
            RootParameter::DescriptorTable { ranges } => {
                Some(ranges.iter().map(|r| r.count).sum())
            }
            RootParameter::ImmediateSampler(_) => None,
        }
    }
}

#[derive(Clone, Copy)]
pub struct RootSignatureInfo<'a> {
    pub debug_name: &'a str,
    pub desc: &'a RootSignatureDesc,
}

/// A typed reference bound into one slot of a resource group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoundResource {
    UniformBuffer(Handle<UniformBuffer>),
    TextureBuffer(Handle<TextureBuffer>),
    Texture(Handle<Texture>),
    Sampler(Handle<SamplerState>),
}

#[derive(Clone, Copy)]
pub struct ResourceGroupInfo<'a> {
    pub debug_name: &'a str,
    pub root_parameter_index: u32,
    /// One slot per descriptor. `None` is a permitted absent binding; it is
    /// skipped at bind time, never dereferenced.
    pub resources: &'a [Option<BoundResource>],
    /// Optional sampler paired with the resource at the same slot.
    pub samplers: Option<&'a [Option<Handle<SamplerState>>]>,
}

impl<'a> Default for ResourceGroupInfo<'a> {
    fn default() -> Self {
        Self {
            debug_name: "",
            root_parameter_index: 0,
            resources: &[],
            samplers: None,
        }
    }
}

/// Check the caller contract of resource-group creation against the owning
/// root signature. Violations are programmer errors: they assert in debug
/// builds and come back as [`GpuError::Validation`] in release builds.
pub fn validate_resource_group(desc: &RootSignatureDesc, info: &ResourceGroupInfo) -> Result<()> {
    let violation = |msg: &'static str| {
        debug_assert!(false, "{}", msg);
        log::error!("resource group rejected: {msg}");
        Err(GpuError::Validation(msg))
    };

    if info.resources.is_empty() {
        return violation("a resource group must bind at least one resource");
    }
    let Some(expected) = desc.expected_resource_count(info.root_parameter_index) else {
        return violation("root parameter index does not address a descriptor table");
    };
    if info.resources.len() != expected as usize {
        return violation("resource count does not match the targeted root parameter");
    }
    if let Some(samplers) = info.samplers {
        if samplers.len() != info.resources.len() {
            return violation("sampler array length must match the resource array");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_table_desc() -> RootSignatureDesc {
        RootSignatureDesc {
            parameters: vec![
                RootParameter::DescriptorTable {
                    ranges: vec![
                        DescriptorRange {
                            kind: DescriptorRangeKind::UniformBuffer,
                            count: 2,
                            base_register: 0,
                        },
                        DescriptorRange {
                            kind: DescriptorRangeKind::Texture,
                            count: 1,
                            base_register: 0,
                        },
                    ],
                },
                RootParameter::ImmediateSampler(SamplerDesc::default()),
            ],
        }
    }

    #[test]
    fn expected_count_sums_ranges() {
        let desc = two_table_desc();
        assert_eq!(desc.expected_resource_count(0), Some(3));
        assert_eq!(desc.expected_resource_count(1), None);
        assert_eq!(desc.expected_resource_count(2), None);
    }

    #[cfg(not(debug_assertions))]
    #[test]
    fn mismatched_count_is_rejected() {
        let desc = two_table_desc();
        let info = ResourceGroupInfo {
            root_parameter_index: 0,
            resources: &[None],
            ..Default::default()
        };
        assert!(validate_resource_group(&desc, &info).is_err());
    }

    #[test]
    fn matching_group_passes() {
        let desc = two_table_desc();
        let resources = [
            Some(BoundResource::UniformBuffer(Handle::new(1, 0))),
            None,
            Some(BoundResource::Texture(Handle::new(2, 0))),
        ];
        let info = ResourceGroupInfo {
            root_parameter_index: 0,
            resources: &resources,
            ..Default::default()
        };
        assert!(validate_resource_group(&desc, &info).is_ok());
    }
}
