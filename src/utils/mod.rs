pub mod handle;
pub mod refcount;

pub use handle::{Handle, Pool};
pub use refcount::{RefCount, ReleaseOutcome, ResourceTable};
