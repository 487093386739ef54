use bytemuck::{bytes_of, cast_slice, from_bytes, Pod, Zeroable};

use crate::gpu::structs::{
    ClearFlags, DrawArguments, DrawIndexedArguments, PrimitiveTopology, ScissorRect, Viewport,
};
use crate::gpu::types::{
    IndirectBuffer, Pipeline as PipelineRes, ResourceGroup as ResourceGroupRes,
    RootSignature as RootSignatureRes, VertexArray as VertexArrayRes,
};
use crate::utils::handle::Handle;

//===----------------------------------------------------------------------===//
// Command definitions
//
// Tag values and payload field order are the wire contract between recording
// code and every backend dispatcher. Tags are never renumbered.
//===----------------------------------------------------------------------===//

#[repr(u16)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Op {
    Clear = 0,
    SetRootSignature = 1,
    SetResourceGroup = 2,
    SetPipeline = 3,
    SetVertexArray = 4,
    SetPrimitiveTopology = 5,
    SetViewport = 6,
    SetScissor = 7,
    Draw = 8,
    DrawIndexed = 9,
    DrawIndirect = 10,
    DrawIndexedIndirect = 11,
    Dispatch = 12,
    SetDebugMarker = 13,
    BeginDebugEvent = 14,
    EndDebugEvent = 15,
}

impl Op {
    fn from_u16(v: u16) -> Option<Self> {
        Some(match v {
            0 => Op::Clear,
            1 => Op::SetRootSignature,
            2 => Op::SetResourceGroup,
            3 => Op::SetPipeline,
            4 => Op::SetVertexArray,
            5 => Op::SetPrimitiveTopology,
            6 => Op::SetViewport,
            7 => Op::SetScissor,
            8 => Op::Draw,
            9 => Op::DrawIndexed,
            10 => Op::DrawIndirect,
            11 => Op::DrawIndexedIndirect,
            12 => Op::Dispatch,
            13 => Op::SetDebugMarker,
            14 => Op::BeginDebugEvent,
            15 => Op::EndDebugEvent,
            _ => return None,
        })
    }
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable, PartialEq)]
pub struct Clear {
    /// Raw [`ClearFlags`] bits.
    pub flags: u32,
    pub color: [f32; 4],
    pub depth: f32,
    pub stencil: u32,
}

impl Clear {
    pub fn flags(&self) -> ClearFlags {
        ClearFlags::from_bits_truncate(self.flags)
    }
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable, PartialEq, Eq)]
pub struct SetRootSignature {
    pub root_signature: Handle<RootSignatureRes>,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable, PartialEq, Eq)]
pub struct SetResourceGroup {
    pub root_parameter_index: u32,
    pub resource_group: Handle<ResourceGroupRes>,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable, PartialEq, Eq)]
pub struct SetPipeline {
    pub pipeline: Handle<PipelineRes>,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable, PartialEq, Eq)]
pub struct SetVertexArray {
    pub vertex_array: Handle<VertexArrayRes>,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable, PartialEq, Eq)]
pub struct SetPrimitiveTopology {
    pub topology: PrimitiveTopology,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable, PartialEq)]
pub struct SetViewport {
    pub viewport: Viewport,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable, PartialEq, Eq)]
pub struct SetScissor {
    pub rect: ScissorRect,
}

/// Fixed part of a draw; `draw_count` argument blocks follow inline.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable, PartialEq, Eq)]
pub struct Draw {
    pub draw_count: u32,
}

/// Fixed part of an indexed draw; `draw_count` argument blocks follow inline.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable, PartialEq, Eq)]
pub struct DrawIndexed {
    pub draw_count: u32,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable, PartialEq, Eq)]
pub struct DrawIndirect {
    pub buffer: Handle<IndirectBuffer>,
    pub byte_offset: u32,
    pub draw_count: u32,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable, PartialEq, Eq)]
pub struct DrawIndexedIndirect {
    pub buffer: Handle<IndirectBuffer>,
    pub byte_offset: u32,
    pub draw_count: u32,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable, PartialEq, Eq)]
pub struct Dispatch {
    pub x: u32,
    pub y: u32,
    pub z: u32,
}

/// Fixed part of the debug marker/event commands; the UTF-8 label follows
/// inline, zero-padded to keep records 4-byte aligned.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable, PartialEq, Eq)]
pub struct DebugLabel {
    pub byte_length: u32,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable, PartialEq, Eq)]
pub struct EndDebugEvent {}

//===----------------------------------------------------------------------===//
// Command buffer
//===----------------------------------------------------------------------===//

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
struct CmdHeader {
    op: u16,
    size: u16,
}

/// Backend-independent, append-only sequence of typed command records.
///
/// Commands are recorded once by application code and replayed in strict
/// append order against a concrete backend. The store is a compact byte
/// stream: a fixed header per record, a Pod payload, and for variable-size
/// commands trailing inline data, so one contiguous region describes the
/// whole command.
///
/// Building a buffer is single-threaded per instance; independent buffers
/// may be built concurrently on different threads.
pub struct CommandBuffer {
    data: Vec<u8>,
    count: u32,
}

impl CommandBuffer {
    /// Create an empty buffer. Some capacity is reserved up front so typical
    /// frames record without reallocating.
    pub fn new() -> Self {
        Self {
            data: Vec::with_capacity(1024),
            count: 0,
        }
    }

    #[inline(always)]
    fn push<T: Pod>(&mut self, op: Op, payload: &T) {
        self.push_with_data(op, payload, &[]);
    }

    #[inline(always)]
    fn push_with_data<T: Pod>(&mut self, op: Op, payload: &T, trailing: &[u8]) {
        let padded = trailing.len().next_multiple_of(4);
        let size = core::mem::size_of::<T>() + padded;
        debug_assert!(size <= u16::MAX as usize, "command record too large");
        let header = CmdHeader {
            op: op as u16,
            size: size as u16,
        };
        self.data.extend_from_slice(bytes_of(&header));
        self.data.extend_from_slice(bytes_of(payload));
        self.data.extend_from_slice(trailing);
        self.data.resize(self.data.len() + (padded - trailing.len()), 0);
        self.count += 1;
    }

    /// Reset to the empty state without releasing backing storage, so the
    /// buffer can be refilled every frame allocation-free.
    pub fn clear(&mut self) {
        self.data.clear();
        self.count = 0;
    }

    /// Number of recorded commands. A buffer is empty only when this is
    /// zero; zero-length records still count.
    pub fn record_count(&self) -> u32 {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn byte_len(&self) -> usize {
        self.data.len()
    }

    /// Clear the bound render target(s) and/or depth-stencil.
    pub fn clear_targets(&mut self, flags: ClearFlags, color: [f32; 4], depth: f32, stencil: u32) {
        self.push(
            Op::Clear,
            &Clear {
                flags: flags.bits(),
                color,
                depth,
                stencil,
            },
        );
    }

    pub fn set_root_signature(&mut self, root_signature: Handle<RootSignatureRes>) {
        self.push(Op::SetRootSignature, &SetRootSignature { root_signature });
    }

    pub fn set_resource_group(
        &mut self,
        root_parameter_index: u32,
        resource_group: Handle<ResourceGroupRes>,
    ) {
        self.push(
            Op::SetResourceGroup,
            &SetResourceGroup {
                root_parameter_index,
                resource_group,
            },
        );
    }

    pub fn set_pipeline(&mut self, pipeline: Handle<PipelineRes>) {
        self.push(Op::SetPipeline, &SetPipeline { pipeline });
    }

    pub fn set_vertex_array(&mut self, vertex_array: Handle<VertexArrayRes>) {
        self.push(Op::SetVertexArray, &SetVertexArray { vertex_array });
    }

    pub fn set_primitive_topology(&mut self, topology: PrimitiveTopology) {
        self.push(Op::SetPrimitiveTopology, &SetPrimitiveTopology { topology });
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.push(Op::SetViewport, &SetViewport { viewport });
    }

    pub fn set_scissor(&mut self, rect: ScissorRect) {
        self.push(Op::SetScissor, &SetScissor { rect });
    }

    /// Record a single draw; the argument block is stored inline.
    pub fn draw(&mut self, args: DrawArguments) {
        self.draw_multi(&[args]);
    }

    /// Record `args.len()` draws sharing the current state.
    pub fn draw_multi(&mut self, args: &[DrawArguments]) {
        self.push_with_data(
            Op::Draw,
            &Draw {
                draw_count: args.len() as u32,
            },
            cast_slice(args),
        );
    }

    pub fn draw_indexed(&mut self, args: DrawIndexedArguments) {
        self.draw_indexed_multi(&[args]);
    }

    pub fn draw_indexed_multi(&mut self, args: &[DrawIndexedArguments]) {
        self.push_with_data(
            Op::DrawIndexed,
            &DrawIndexed {
                draw_count: args.len() as u32,
            },
            cast_slice(args),
        );
    }

    /// Draw with arguments read from a GPU buffer at execution time.
    pub fn draw_indirect(
        &mut self,
        buffer: Handle<IndirectBuffer>,
        byte_offset: u32,
        draw_count: u32,
    ) {
        self.push(
            Op::DrawIndirect,
            &DrawIndirect {
                buffer,
                byte_offset,
                draw_count,
            },
        );
    }

    pub fn draw_indexed_indirect(
        &mut self,
        buffer: Handle<IndirectBuffer>,
        byte_offset: u32,
        draw_count: u32,
    ) {
        self.push(
            Op::DrawIndexedIndirect,
            &DrawIndexedIndirect {
                buffer,
                byte_offset,
                draw_count,
            },
        );
    }

    pub fn dispatch(&mut self, x: u32, y: u32, z: u32) {
        self.push(Op::Dispatch, &Dispatch { x, y, z });
    }

    /// Drop a single marker into the command stream for GPU debuggers.
    pub fn set_debug_marker(&mut self, label: &str) {
        self.push_label(Op::SetDebugMarker, label);
    }

    pub fn begin_debug_event(&mut self, label: &str) {
        self.push_label(Op::BeginDebugEvent, label);
    }

    pub fn end_debug_event(&mut self) {
        self.push(Op::EndDebugEvent, &EndDebugEvent {});
    }

    fn push_label(&mut self, op: Op, label: &str) {
        self.push_with_data(
            op,
            &DebugLabel {
                byte_length: label.len() as u32,
            },
            label.as_bytes(),
        );
    }

    /// Iterate over recorded commands in append order.
    pub fn iter(&self) -> CommandIter {
        CommandIter { data: &self.data }
    }

    /// Replay the recorded commands, in append order, into a backend sink.
    pub fn dispatch_to<S: CommandSink>(&self, sink: &mut S) {
        use core::mem::size_of;
        for cmd in self.iter() {
            match cmd.op {
                Op::Clear => sink.clear(cmd.payload()),
                Op::SetRootSignature => sink.set_root_signature(cmd.payload()),
                Op::SetResourceGroup => sink.set_resource_group(cmd.payload()),
                Op::SetPipeline => sink.set_pipeline(cmd.payload()),
                Op::SetVertexArray => sink.set_vertex_array(cmd.payload()),
                Op::SetPrimitiveTopology => sink.set_primitive_topology(cmd.payload()),
                Op::SetViewport => sink.set_viewport(cmd.payload()),
                Op::SetScissor => sink.set_scissor(cmd.payload()),
                Op::Draw => {
                    let fixed: &Draw = cmd.payload();
                    let bytes = fixed.draw_count as usize * size_of::<DrawArguments>();
                    let args = cast_slice(&cmd.inline_data::<Draw>()[..bytes]);
                    sink.draw(fixed, args);
                }
                Op::DrawIndexed => {
                    let fixed: &DrawIndexed = cmd.payload();
                    let bytes = fixed.draw_count as usize * size_of::<DrawIndexedArguments>();
                    let args = cast_slice(&cmd.inline_data::<DrawIndexed>()[..bytes]);
                    sink.draw_indexed(fixed, args);
                }
                Op::DrawIndirect => sink.draw_indirect(cmd.payload()),
                Op::DrawIndexedIndirect => sink.draw_indexed_indirect(cmd.payload()),
                Op::Dispatch => sink.dispatch(cmd.payload()),
                Op::SetDebugMarker => sink.set_debug_marker(cmd.label()),
                Op::BeginDebugEvent => sink.begin_debug_event(cmd.label()),
                Op::EndDebugEvent => sink.end_debug_event(),
            }
        }
    }
}

impl Default for CommandBuffer {
    fn default() -> Self {
        Self::new()
    }
}

//===----------------------------------------------------------------------===//
// Iteration
//===----------------------------------------------------------------------===//

pub struct Command<'a> {
    pub op: Op,
    bytes: &'a [u8],
}

impl<'a> Command<'a> {
    /// The fixed payload of this record.
    pub fn payload<T: Pod>(&self) -> &'a T {
        from_bytes(&self.bytes[..core::mem::size_of::<T>()])
    }

    /// Inline data following a fixed payload of type `T` (includes any
    /// alignment padding at the tail).
    pub fn inline_data<T: Pod>(&self) -> &'a [u8] {
        &self.bytes[core::mem::size_of::<T>()..]
    }

    /// The label of a debug marker/event record.
    pub fn label(&self) -> &'a str {
        let fixed: &DebugLabel = self.payload();
        let raw = &self.inline_data::<DebugLabel>()[..fixed.byte_length as usize];
        core::str::from_utf8(raw).expect("debug label must be UTF-8")
    }
}

pub struct CommandIter<'a> {
    data: &'a [u8],
}

impl<'a> Iterator for CommandIter<'a> {
    type Item = Command<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        use core::mem::size_of;
        if self.data.len() < size_of::<CmdHeader>() {
            return None;
        }
        let (head_bytes, rest) = self.data.split_at(size_of::<CmdHeader>());
        let header: CmdHeader = *from_bytes(head_bytes);
        if rest.len() < header.size as usize {
            return None;
        }
        let (payload, remaining) = rest.split_at(header.size as usize);
        self.data = remaining;
        // An unknown tag means the producer and consumer disagree about the
        // protocol version. Not recoverable.
        let op = Op::from_u16(header.op)
            .unwrap_or_else(|| panic!("unknown command tag {}", header.op));
        Some(Command { op, bytes: payload })
    }
}

/// Execution surface every backend dispatcher implements; one method per
/// command, visited in strict append order by [`CommandBuffer::dispatch_to`].
pub trait CommandSink {
    fn clear(&mut self, cmd: &Clear);
    fn set_root_signature(&mut self, cmd: &SetRootSignature);
    fn set_resource_group(&mut self, cmd: &SetResourceGroup);
    fn set_pipeline(&mut self, cmd: &SetPipeline);
    fn set_vertex_array(&mut self, cmd: &SetVertexArray);
    fn set_primitive_topology(&mut self, cmd: &SetPrimitiveTopology);
    fn set_viewport(&mut self, cmd: &SetViewport);
    fn set_scissor(&mut self, cmd: &SetScissor);
    fn draw(&mut self, cmd: &Draw, args: &[DrawArguments]);
    fn draw_indexed(&mut self, cmd: &DrawIndexed, args: &[DrawIndexedArguments]);
    fn draw_indirect(&mut self, cmd: &DrawIndirect);
    fn draw_indexed_indirect(&mut self, cmd: &DrawIndexedIndirect);
    fn dispatch(&mut self, cmd: &Dispatch);
    fn set_debug_marker(&mut self, label: &str);
    fn begin_debug_event(&mut self, label: &str);
    fn end_debug_event(&mut self);
}

//===----------------------------------------------------------------------===//
// Tests
//===----------------------------------------------------------------------===//

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let mut cb = CommandBuffer::new();
        cb.clear_targets(ClearFlags::COLOR | ClearFlags::DEPTH, [0.5; 4], 1.0, 0);
        cb.set_root_signature(Handle::new(1, 0));
        cb.set_resource_group(2, Handle::new(3, 1));
        cb.set_pipeline(Handle::new(4, 0));
        cb.set_vertex_array(Handle::new(5, 0));
        cb.set_primitive_topology(PrimitiveTopology::TriangleStrip);
        cb.dispatch(8, 4, 2);

        let mut iter = cb.iter();

        let cmd = iter.next().unwrap();
        assert_eq!(cmd.op, Op::Clear);
        let clear: &Clear = cmd.payload();
        assert_eq!(clear.flags(), ClearFlags::COLOR | ClearFlags::DEPTH);
        assert_eq!(clear.color, [0.5; 4]);

        assert_eq!(iter.next().unwrap().op, Op::SetRootSignature);

        let cmd = iter.next().unwrap();
        let group: &SetResourceGroup = cmd.payload();
        assert_eq!(group.root_parameter_index, 2);
        assert_eq!(group.resource_group, Handle::new(3, 1));

        assert_eq!(iter.next().unwrap().op, Op::SetPipeline);
        assert_eq!(iter.next().unwrap().op, Op::SetVertexArray);

        let cmd = iter.next().unwrap();
        let topo: &SetPrimitiveTopology = cmd.payload();
        assert_eq!(topo.topology, PrimitiveTopology::TriangleStrip);

        let cmd = iter.next().unwrap();
        assert_eq!(*cmd.payload::<Dispatch>(), Dispatch { x: 8, y: 4, z: 2 });

        assert!(iter.next().is_none());
        assert_eq!(cb.record_count(), 7);
    }

    #[test]
    fn draws_carry_inline_argument_blocks() {
        let mut cb = CommandBuffer::new();
        let args = [
            DrawArguments::vertices(3),
            DrawArguments {
                vertex_count: 6,
                instance_count: 2,
                start_vertex: 3,
                start_instance: 0,
            },
        ];
        cb.draw_multi(&args);

        let cmd = cb.iter().next().unwrap();
        assert_eq!(cmd.op, Op::Draw);
        let fixed: &Draw = cmd.payload();
        assert_eq!(fixed.draw_count, 2);
        let decoded: &[DrawArguments] = cast_slice(cmd.inline_data::<Draw>());
        assert_eq!(decoded, &args);
    }

    #[test]
    fn labels_keep_records_aligned() {
        let mut cb = CommandBuffer::new();
        cb.begin_debug_event("sky"); // 3 bytes, padded to 4
        cb.draw(DrawArguments::vertices(3));
        cb.end_debug_event();

        let mut iter = cb.iter();
        let cmd = iter.next().unwrap();
        assert_eq!(cmd.op, Op::BeginDebugEvent);
        assert_eq!(cmd.label(), "sky");

        let cmd = iter.next().unwrap();
        assert_eq!(cmd.op, Op::Draw);
        let decoded: &[DrawArguments] =
            cast_slice(&cmd.inline_data::<Draw>()[..core::mem::size_of::<DrawArguments>()]);
        assert_eq!(decoded[0].vertex_count, 3);

        assert_eq!(iter.next().unwrap().op, Op::EndDebugEvent);
        assert!(iter.next().is_none());
    }

    #[test]
    fn zero_length_records_still_count() {
        let mut cb = CommandBuffer::new();
        cb.end_debug_event();
        assert_eq!(cb.record_count(), 1);
        assert!(!cb.is_empty());
    }

    #[test]
    fn clear_resets_records_but_keeps_capacity() {
        let mut cb = CommandBuffer::new();
        for _ in 0..32 {
            cb.draw(DrawArguments::vertices(3));
        }
        let capacity = cb.data.capacity();
        cb.clear();
        assert!(cb.is_empty());
        assert_eq!(cb.byte_len(), 0);
        assert_eq!(cb.data.capacity(), capacity);

        cb.dispatch(1, 1, 1);
        let ops: Vec<_> = cb.iter().map(|c| c.op).collect();
        assert_eq!(ops, vec![Op::Dispatch]);
    }
}
