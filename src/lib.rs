pub mod driver;
pub mod gpu;
pub mod ir;
pub mod utils;

pub use driver::command::{CommandBuffer, CommandSink};
pub use utils::handle::{Handle, Pool};
pub use utils::refcount::{RefCount, ReleaseOutcome, ResourceTable};

pub use gpu::*;
