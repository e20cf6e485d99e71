//! Renderer setup errors

use thiserror::Error;

/// Errors raised while binding a renderer to a UI surface
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// A display region the renderer writes to does not exist
    #[error("Render target missing: no region with id '{id}'")]
    TargetMissing { id: String },
}
