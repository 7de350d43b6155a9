use thiserror::Error;

/// Errors reported by a [`Kernel`](crate::Kernel) dispatch.
#[derive(Error, Debug)]
#[error("Kernel dispatch failed: {0}")]
pub struct KernelError(pub String);

/// Errors that abort a frame.
///
/// Missing collaborators are not errors: the renderer skips the frame and
/// logs a diagnostic instead.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Failed to allocate {width}x{height} accumulation buffers")]
    Allocation { width: u32, height: u32 },

    #[error(transparent)]
    Dispatch(#[from] KernelError),
}

pub type RenderResult<T> = Result<T, RenderError>;
