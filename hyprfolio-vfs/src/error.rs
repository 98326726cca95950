use thiserror::Error;

#[derive(Debug, Error)]
pub enum VfsError {
    #[error("Invalid path: {0}")]
    InvalidPath(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Already exists: {0}")]
    AlreadyExists(String),
    #[error("Not a file: {0}")]
    NotAFile(String),
    #[error("Not a directory: {0}")]
    NotADirectory(String),
    #[error("Limit exceeded: {0}")]
    LimitExceeded(String),
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl VfsError {
    pub fn code(&self) -> &str {
        match self {
            Self::InvalidPath(_) => "VFS_INVALID_PATH",
            Self::NotFound(_) => "VFS_NOT_FOUND",
            Self::AlreadyExists(_) => "VFS_ALREADY_EXISTS",
            Self::NotAFile(_) => "VFS_NOT_FILE",
            Self::NotADirectory(_) => "VFS_NOT_DIRECTORY",
            Self::LimitExceeded(_) => "VFS_LIMIT_EXCEEDED",
            Self::InvalidOperation(_) => "VFS_INVALID_OPERATION",
            Self::Io(_) => "VFS_IO_ERROR",
            Self::Json(_) => "VFS_JSON_ERROR",
        }
    }

    /// True when a directory was expected and a file was found, or the reverse.
    pub fn is_type_mismatch(&self) -> bool {
        matches!(self, Self::NotAFile(_) | Self::NotADirectory(_))
    }

    /// Coarse category a terminal front end branches on. Both directions of
    /// a file/directory confusion collapse into `typeMismatch`.
    pub fn kind(&self) -> &'static str {
        if self.is_type_mismatch() {
            return "typeMismatch";
        }
        match self {
            Self::InvalidPath(_) => "invalidPath",
            Self::NotFound(_) => "notFound",
            Self::AlreadyExists(_) => "alreadyExists",
            Self::LimitExceeded(_) => "limitExceeded",
            Self::InvalidOperation(_) => "invalidOperation",
            Self::NotAFile(_) | Self::NotADirectory(_) | Self::Io(_) | Self::Json(_) => "internal",
        }
    }

    pub fn to_json_rpc_error(&self) -> serde_json::Value {
        serde_json::json!({
            "vfsCode": self.code(),
            "kind": self.kind(),
            "message": self.to_string(),
        })
    }
}
