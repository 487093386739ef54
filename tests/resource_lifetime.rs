use nori::*;

fn headless() -> Context {
    Context::headless(&ContextInfo::default()).unwrap()
}

fn uniform_table(count: u32) -> RootSignatureDesc {
    RootSignatureDesc {
        parameters: vec![RootParameter::DescriptorTable {
            ranges: vec![DescriptorRange {
                kind: DescriptorRangeKind::UniformBuffer,
                count,
                base_register: 0,
            }],
        }],
    }
}

#[test]
fn balanced_references_destroy_a_resource_exactly_once() {
    let mut ctx = headless();
    let buffer = ctx
        .make_uniform_buffer(&BufferInfo {
            debug_name: "instance data",
            byte_size: 4096,
            usage: BufferUsage::StaticDraw,
            ..Default::default()
        })
        .unwrap();
    let bound = BoundResource::UniformBuffer(buffer);

    // The factory does not add a reference on behalf of the creator.
    assert_eq!(ctx.bound_ref_count(bound), Some(0));

    for expected in 1..=3 {
        assert_eq!(ctx.add_ref_uniform_buffer(buffer).unwrap(), expected);
    }
    assert_eq!(ctx.release_uniform_buffer(buffer).unwrap(), 2);
    assert_eq!(ctx.release_uniform_buffer(buffer).unwrap(), 1);
    assert_eq!(ctx.uniform_buffer_size(buffer), Some(4096));

    // 1 -> 0 destroys; the handle goes dead everywhere.
    assert_eq!(ctx.release_uniform_buffer(buffer).unwrap(), 0);
    assert_eq!(ctx.uniform_buffer_size(buffer), None);
    assert_eq!(ctx.bound_ref_count(bound), None);
    assert_eq!(ctx.live_resources(), 0);

    ctx.destroy();
}

#[test]
fn resource_group_owns_its_bindings_and_skips_null_slots() {
    let mut ctx = headless();

    let root_signature = ctx
        .make_root_signature(&RootSignatureInfo {
            debug_name: "per-material",
            desc: &uniform_table(3),
        })
        .unwrap();
    ctx.add_ref_root_signature(root_signature).unwrap();

    let buffer_a = ctx
        .make_uniform_buffer(&BufferInfo {
            debug_name: "a",
            byte_size: 64,
            ..Default::default()
        })
        .unwrap();
    let buffer_b = ctx
        .make_uniform_buffer(&BufferInfo {
            debug_name: "b",
            byte_size: 64,
            ..Default::default()
        })
        .unwrap();
    ctx.add_ref_uniform_buffer(buffer_a).unwrap();
    ctx.add_ref_uniform_buffer(buffer_b).unwrap();

    // Middle slot intentionally absent; the backend must skip it.
    let resources = [
        Some(BoundResource::UniformBuffer(buffer_a)),
        None,
        Some(BoundResource::UniformBuffer(buffer_b)),
    ];
    let group = ctx
        .make_resource_group(
            root_signature,
            &ResourceGroupInfo {
                debug_name: "material bindings",
                root_parameter_index: 0,
                resources: &resources,
                samplers: None,
            },
        )
        .unwrap();
    ctx.add_ref_resource_group(group).unwrap();

    // Exactly one reference taken per non-null slot.
    assert_eq!(
        ctx.bound_ref_count(BoundResource::UniformBuffer(buffer_a)),
        Some(2)
    );
    assert_eq!(
        ctx.bound_ref_count(BoundResource::UniformBuffer(buffer_b)),
        Some(2)
    );

    // Destroying the group releases exactly those references.
    assert_eq!(ctx.release_resource_group(group).unwrap(), 0);
    assert_eq!(
        ctx.bound_ref_count(BoundResource::UniformBuffer(buffer_a)),
        Some(1)
    );
    assert_eq!(
        ctx.bound_ref_count(BoundResource::UniformBuffer(buffer_b)),
        Some(1)
    );

    ctx.release_uniform_buffer(buffer_a).unwrap();
    ctx.release_uniform_buffer(buffer_b).unwrap();
    ctx.release_root_signature(root_signature).unwrap();
    assert_eq!(ctx.live_resources(), 0);
    ctx.destroy();
}

#[test]
fn resource_group_keeps_inputs_alive_after_the_caller_lets_go() {
    let mut ctx = headless();

    let root_signature = ctx
        .make_root_signature(&RootSignatureInfo {
            debug_name: "",
            desc: &uniform_table(1),
        })
        .unwrap();
    ctx.add_ref_root_signature(root_signature).unwrap();

    let buffer = ctx
        .make_uniform_buffer(&BufferInfo {
            byte_size: 16,
            ..Default::default()
        })
        .unwrap();
    ctx.add_ref_uniform_buffer(buffer).unwrap();

    let group = ctx
        .make_resource_group(
            root_signature,
            &ResourceGroupInfo {
                root_parameter_index: 0,
                resources: &[Some(BoundResource::UniformBuffer(buffer))],
                ..Default::default()
            },
        )
        .unwrap();
    ctx.add_ref_resource_group(group).unwrap();

    // Caller drops its own reference; the group still holds the buffer.
    assert_eq!(ctx.release_uniform_buffer(buffer).unwrap(), 1);
    assert_eq!(ctx.uniform_buffer_size(buffer), Some(16));

    // The group's release is the one that finally destroys the buffer.
    ctx.release_resource_group(group).unwrap();
    assert_eq!(ctx.uniform_buffer_size(buffer), None);

    ctx.release_root_signature(root_signature).unwrap();
    assert_eq!(ctx.live_resources(), 0);
    ctx.destroy();
}

#[test]
fn paired_samplers_are_reference_counted_per_slot() {
    let mut ctx = headless();

    let desc = RootSignatureDesc {
        parameters: vec![RootParameter::DescriptorTable {
            ranges: vec![DescriptorRange {
                kind: DescriptorRangeKind::Texture,
                count: 2,
                base_register: 0,
            }],
        }],
    };
    let root_signature = ctx
        .make_root_signature(&RootSignatureInfo {
            debug_name: "",
            desc: &desc,
        })
        .unwrap();
    ctx.add_ref_root_signature(root_signature).unwrap();

    let texture = ctx.make_texture(&TextureInfo::default()).unwrap();
    ctx.add_ref_texture(texture).unwrap();
    let sampler = ctx.make_sampler(&SamplerInfo::default()).unwrap();
    ctx.add_ref_sampler(sampler).unwrap();

    let resources = [Some(BoundResource::Texture(texture)), None];
    let samplers = [Some(sampler), None];
    let group = ctx
        .make_resource_group(
            root_signature,
            &ResourceGroupInfo {
                root_parameter_index: 0,
                resources: &resources,
                samplers: Some(&samplers),
                ..Default::default()
            },
        )
        .unwrap();
    ctx.add_ref_resource_group(group).unwrap();

    assert_eq!(ctx.sampler_ref_count(sampler), Some(2));
    ctx.release_resource_group(group).unwrap();
    assert_eq!(ctx.sampler_ref_count(sampler), Some(1));

    ctx.release_texture(texture).unwrap();
    ctx.release_sampler(sampler).unwrap();
    ctx.release_root_signature(root_signature).unwrap();
    assert_eq!(ctx.live_resources(), 0);
    ctx.destroy();
}

#[test]
fn program_release_cascades_to_its_shader_stages() {
    let mut ctx = headless();

    let vs = ctx
        .make_shader(&ShaderInfo {
            debug_name: "fullscreen vs",
            stage: ShaderStage::Vertex,
            bytecode: &[0x03, 0x02, 0x23, 0x07],
        })
        .unwrap();
    let fs = ctx
        .make_shader(&ShaderInfo {
            debug_name: "tonemap fs",
            stage: ShaderStage::Fragment,
            bytecode: &[0x03, 0x02, 0x23, 0x07],
        })
        .unwrap();

    let program = ctx
        .make_program(&ProgramInfo {
            debug_name: "tonemap",
            shaders: &[vs, fs],
        })
        .unwrap();
    ctx.add_ref_program(program).unwrap();

    // The program is the only holder of the stage references.
    assert_eq!(ctx.shader_ref_count(vs), Some(1));
    assert_eq!(ctx.shader_ref_count(fs), Some(1));

    ctx.release_program(program).unwrap();
    assert_eq!(ctx.shader_ref_count(vs), None);
    assert_eq!(ctx.shader_ref_count(fs), None);
    assert_eq!(ctx.live_resources(), 0);
    ctx.destroy();
}

#[test]
fn vertex_array_holds_its_buffers() {
    let mut ctx = headless();

    let positions = ctx
        .make_vertex_buffer(&BufferInfo {
            debug_name: "positions",
            byte_size: 3 * 8,
            usage: BufferUsage::StaticDraw,
            ..Default::default()
        })
        .unwrap();
    let indices = ctx
        .make_index_buffer(&BufferInfo {
            debug_name: "indices",
            byte_size: 3 * 4,
            usage: BufferUsage::StaticDraw,
            ..Default::default()
        })
        .unwrap();

    let array = ctx
        .make_vertex_array(&VertexArrayInfo {
            debug_name: "triangle",
            vertex_buffers: &[VertexBufferBinding {
                buffer: positions,
                stride: 8,
                offset: 0,
            }],
            index_buffer: Some(indices),
            index_format: IndexFormat::U32,
            layout: VertexLayout {
                attributes: vec![VertexAttribute {
                    location: 0,
                    format: AttributeFormat::F32x2,
                    offset: 0,
                }],
                stride: 8,
            },
        })
        .unwrap();
    ctx.add_ref_vertex_array(array).unwrap();

    assert_eq!(ctx.vertex_buffer_ref_count(positions), Some(1));
    assert_eq!(ctx.index_buffer_ref_count(indices), Some(1));

    ctx.release_vertex_array(array).unwrap();
    assert_eq!(ctx.vertex_buffer_ref_count(positions), None);
    assert_eq!(ctx.index_buffer_ref_count(indices), None);
    assert_eq!(ctx.live_resources(), 0);
    ctx.destroy();
}
