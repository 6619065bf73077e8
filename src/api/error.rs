use serde::Serialize;

/// 请求级错误：全部带 HTTP 风格状态码，不会跨越 API 边界 panic
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid action {0} request of api.v2")]
    InvalidAction(String),

    #[error("A query must be specified. Refer to our documentation at https://github.com/jsdelivr/api")]
    MissingQuery,

    #[error("Requested project not found.")]
    RecordNotFound,

    #[error("Requested version not found.")]
    VersionNotFound,

    #[error("Unknown collection: {0}")]
    UnknownCollection(String),
}

/// 错误响应体
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub status: u16,
    pub message: String,
}

impl ApiError {
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::InvalidAction(_) => 501,
            ApiError::MissingQuery
            | ApiError::RecordNotFound
            | ApiError::VersionNotFound
            | ApiError::UnknownCollection(_) => 404,
        }
    }

    pub fn body(&self) -> ErrorBody {
        ErrorBody {
            status: self.status_code(),
            message: self.to_string(),
        }
    }
}
