use thiserror::Error;

#[derive(Debug, Error)]
pub enum ShopifyError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("platform returned errors: {0}")]
    Api(String),

    #[error("stagedUploadsCreate returned no usable target")]
    NoStagedTarget,

    #[error("blob storage rejected upload: status {status}")]
    BlobRejected { status: u16, body: String },

    #[error("fileCreate returned neither a file id nor a url")]
    MissingFileId,

    #[error("unexpected response shape: {0}")]
    InvalidResponse(String),

    #[error("operation cancelled")]
    Cancelled,
}

impl From<reqwest::Error> for ShopifyError {
    fn from(err: reqwest::Error) -> Self {
        ShopifyError::Transport(err.to_string())
    }
}
