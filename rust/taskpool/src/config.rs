//! Pool construction settings.

use std::{num::NonZeroUsize, sync::Arc};

use crate::worker::{Initializer, WorkerContext};

/// Prefix of worker thread names when none is configured.
pub const DEFAULT_THREAD_NAME_PREFIX: &str = "PoolWorker";

/// Number of logical processors available to this process, or 1 if it cannot
/// be determined.
pub fn default_pool_size() -> usize {
    std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}

/// Settings used by [`Pool::with_config`](crate::pool::Pool::with_config).
///
/// The size is not validated here; a pool of size 0 is rejected when it is
/// opened.
#[derive(Clone)]
pub struct PoolConfig {
    size: usize,
    thread_name_prefix: String,
    initializer: Option<Initializer>,
}

impl PoolConfig {
    pub fn new(size: usize) -> Self {
        PoolConfig {
            size,
            thread_name_prefix: DEFAULT_THREAD_NAME_PREFIX.to_string(),
            initializer: None,
        }
    }

    /// A config sized by [`default_pool_size`].
    pub fn with_default_size() -> Self {
        Self::new(default_pool_size())
    }

    pub fn with_size(mut self, size: usize) -> Self {
        self.size = size;
        self
    }

    pub fn with_thread_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.thread_name_prefix = prefix.into();
        self
    }

    /// Sets the hook every worker runs once, before taking its first task.
    pub fn with_initializer<F>(mut self, initializer: F) -> Self
    where
        F: Fn(&WorkerContext) + Send + Sync + 'static,
    {
        self.initializer = Some(Arc::new(initializer));
        self
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn thread_name_prefix(&self) -> &str {
        &self.thread_name_prefix
    }

    pub(crate) fn initializer(&self) -> Option<Initializer> {
        self.initializer.clone()
    }

    /// Name of the worker at `index`, counting workers from 1.
    pub fn worker_name(&self, index: usize) -> String {
        format!("{}-{}", self.thread_name_prefix, index + 1)
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self::with_default_size()
    }
}

impl std::fmt::Debug for PoolConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PoolConfig")
            .field("size", &self.size)
            .field("thread_name_prefix", &self.thread_name_prefix)
            .field("initializer", &self.initializer.is_some())
            .finish()
    }
}
