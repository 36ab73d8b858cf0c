use thiserror::Error;

#[derive(Debug, Error)]
#[error(transparent)]
pub struct Error(Box<ErrorKind>);

impl Error {
    pub fn kind(&self) -> &ErrorKind {
        self.0.as_ref()
    }

    pub fn into_kind(self) -> ErrorKind {
        *self.0
    }

    pub fn invalid_pool_size(size: usize) -> Error {
        ErrorKind::InvalidPoolSize { size }.into()
    }

    pub fn pool_closed() -> Error {
        ErrorKind::PoolClosed.into()
    }

    pub fn handle_consumed() -> Error {
        ErrorKind::HandleConsumed.into()
    }

    pub fn worker_failure(worker: impl Into<String>, message: impl Into<String>) -> Error {
        ErrorKind::WorkerFailure {
            worker: worker.into(),
            message: message.into(),
        }
        .into()
    }

    pub fn invalid_arg(name: impl Into<String>, message: impl Into<String>) -> Error {
        ErrorKind::InvalidArgument {
            name: name.into(),
            message: message.into(),
        }
        .into()
    }

    pub fn invalid_operation(name: impl Into<String>) -> Error {
        ErrorKind::InvalidOperation { name: name.into() }.into()
    }

    pub fn is_pool_closed(&self) -> bool {
        matches!(self.kind(), ErrorKind::PoolClosed)
    }

    pub fn is_handle_consumed(&self) -> bool {
        matches!(self.kind(), ErrorKind::HandleConsumed)
    }

    pub fn is_worker_failure(&self) -> bool {
        matches!(self.kind(), ErrorKind::WorkerFailure { .. })
    }
}

#[derive(Debug, Error)]
pub enum ErrorKind {
    #[error("invalid pool size {size}: a pool needs at least one worker")]
    InvalidPoolSize { size: usize },

    #[error("pool is closed and no longer accepts tasks")]
    PoolClosed,

    #[error("pending handle was already consumed")]
    HandleConsumed,

    #[error("worker '{worker}' failed: {message}")]
    WorkerFailure { worker: String, message: String },

    #[error("invalid argument {name}: {message}")]
    InvalidArgument { name: String, message: String },

    #[error("invalid operation {name}")]
    InvalidOperation { name: String },
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error(kind.into())
    }
}
