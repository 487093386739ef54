use super::error::Result;
use super::null::NullContext;
use super::probe::MarkerLoader;

/// Dependency-injected configuration for context creation. There is no
/// process-global state; everything a backend needs arrives here.
#[derive(Clone, Copy)]
pub struct ContextInfo {
    /// Capacity of each per-kind resource pool.
    pub resource_capacity: usize,
    /// Loader for optional native debug-marker entry points. Probed lazily,
    /// at most once.
    pub marker_loader: Option<MarkerLoader>,
}

impl Default for ContextInfo {
    fn default() -> Self {
        Self {
            resource_capacity: 1024,
            marker_loader: None,
        }
    }
}

enum ContextBackend {
    Null(NullContext),
}

/// Public rendering context facade that dispatches to the selected backend.
///
/// The backend is chosen once at construction. Application code records
/// [`CommandBuffer`]s and creates resources through this one object; nothing
/// downstream depends on which backend is behind it.
///
/// [`CommandBuffer`]: crate::driver::command::CommandBuffer
pub struct Context {
    backend: ContextBackend,
}

impl Context {
    /// Construct a context without any windowing requirement.
    pub fn headless(info: &ContextInfo) -> Result<Self> {
        Ok(Self {
            backend: ContextBackend::Null(NullContext::new(info)?),
        })
    }

    /// Explicitly tear the context down. All resources issued by the backend
    /// should have been released first; leaks are reported, not reclaimed.
    pub fn destroy(self) {
        match self.backend {
            ContextBackend::Null(ctx) => ctx.destroy(),
        }
    }
}

// The full factory/execution surface is uniform across backends, so the
// facade exposes the active backend directly.
impl std::ops::Deref for Context {
    type Target = NullContext;

    fn deref(&self) -> &Self::Target {
        match &self.backend {
            ContextBackend::Null(ctx) => ctx,
        }
    }
}

impl std::ops::DerefMut for Context {
    fn deref_mut(&mut self) -> &mut Self::Target {
        match &mut self.backend {
            ContextBackend::Null(ctx) => ctx,
        }
    }
}
