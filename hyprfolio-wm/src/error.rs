use thiserror::Error;

use crate::window::WindowId;

#[derive(Debug, Error)]
pub enum WmError {
	#[error("Window not found: {0}")]
	NotFound(WindowId),
	#[error("Workspace {workspace} out of range (1..={count})")]
	OutOfRange { workspace: usize, count: usize },
	#[error("Invalid operation: {0}")]
	InvalidOperation(String),
	#[error("No drag in progress")]
	NoActiveDrag,
	#[error("Content error: {0}")]
	Content(String),
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	#[error("JSON error: {0}")]
	Json(#[from] serde_json::Error),
}

impl WmError {
	pub fn code(&self) -> &str {
		match self {
			Self::NotFound(_) => "WM_NOT_FOUND",
			Self::OutOfRange { .. } => "WM_OUT_OF_RANGE",
			Self::InvalidOperation(_) => "WM_INVALID_OPERATION",
			Self::NoActiveDrag => "WM_NO_ACTIVE_DRAG",
			Self::Content(_) => "WM_CONTENT_ERROR",
			Self::Io(_) => "WM_IO_ERROR",
			Self::Json(_) => "WM_JSON_ERROR",
		}
	}

	pub fn to_json_rpc_error(&self) -> serde_json::Value {
		serde_json::json!({
			"wmCode": self.code(),
			"message": self.to_string(),
		})
	}
}
