use crate::driver::command::{CommandBuffer, CommandSink};

/// Trait for types that can replay a [`CommandBuffer`] on a [`CommandSink`].
pub trait Replayer<S: CommandSink> {
    /// Obtain the underlying command sink.
    fn sink(&mut self) -> &mut S;

    /// Walk the recorded command stream in append order and forward each
    /// record to the underlying sink.
    fn replay(&mut self, buffer: &CommandBuffer) {
        buffer.dispatch_to(self.sink());
    }
}

/// Generic replayer that forwards commands to any [`CommandSink`].
///
/// Useful for tests and headless execution, where commands are interpreted
/// without touching a real device.
pub struct CommandReplayer<'a, S: CommandSink> {
    sink: &'a mut S,
}

impl<'a, S: CommandSink> CommandReplayer<'a, S> {
    /// Create a new replayer targeting the given sink.
    pub fn new(sink: &'a mut S) -> Self {
        Self { sink }
    }
}

impl<'a, S: CommandSink> Replayer<S> for CommandReplayer<'a, S> {
    fn sink(&mut self) -> &mut S {
        &mut *self.sink
    }
}
