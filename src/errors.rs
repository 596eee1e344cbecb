use std::fmt;

#[derive(Debug, Clone)]
pub enum LinkloomError {
    DatabaseConfig(String),
    DatabaseConnection(String),
    DatabaseOperation(String),
    Validation(String),
    InvalidDestination(String),
    TokenConflict(String),
    AllocationExhausted(String),
    NotFound(String),
    QuotaExceeded { used: u32, limit: u32 },
    Unauthorized(String),
    Forbidden(String),
    Serialization(String),
}

impl LinkloomError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            LinkloomError::DatabaseConfig(_) => "E001",
            LinkloomError::DatabaseConnection(_) => "E002",
            LinkloomError::DatabaseOperation(_) => "E003",
            LinkloomError::Validation(_) => "E004",
            LinkloomError::InvalidDestination(_) => "E005",
            LinkloomError::TokenConflict(_) => "E006",
            LinkloomError::AllocationExhausted(_) => "E007",
            LinkloomError::NotFound(_) => "E008",
            LinkloomError::QuotaExceeded { .. } => "E009",
            LinkloomError::Unauthorized(_) => "E010",
            LinkloomError::Forbidden(_) => "E011",
            LinkloomError::Serialization(_) => "E012",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            LinkloomError::DatabaseConfig(_) => "Database Configuration Error",
            LinkloomError::DatabaseConnection(_) => "Database Connection Error",
            LinkloomError::DatabaseOperation(_) => "Database Operation Error",
            LinkloomError::Validation(_) => "Validation Error",
            LinkloomError::InvalidDestination(_) => "Invalid Destination",
            LinkloomError::TokenConflict(_) => "Token Conflict",
            LinkloomError::AllocationExhausted(_) => "Token Allocation Exhausted",
            LinkloomError::NotFound(_) => "Resource Not Found",
            LinkloomError::QuotaExceeded { .. } => "Quota Exceeded",
            LinkloomError::Unauthorized(_) => "Unauthorized",
            LinkloomError::Forbidden(_) => "Forbidden",
            LinkloomError::Serialization(_) => "Serialization Error",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> String {
        match self {
            LinkloomError::DatabaseConfig(msg)
            | LinkloomError::DatabaseConnection(msg)
            | LinkloomError::DatabaseOperation(msg)
            | LinkloomError::Validation(msg)
            | LinkloomError::InvalidDestination(msg)
            | LinkloomError::TokenConflict(msg)
            | LinkloomError::AllocationExhausted(msg)
            | LinkloomError::NotFound(msg)
            | LinkloomError::Unauthorized(msg)
            | LinkloomError::Forbidden(msg)
            | LinkloomError::Serialization(msg) => msg.clone(),
            LinkloomError::QuotaExceeded { used, limit } => {
                format!("active link quota exceeded: {used} of {limit} used")
            }
        }
    }
}

impl fmt::Display for LinkloomError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.error_type(), self.message())
    }
}

impl std::error::Error for LinkloomError {}

// 便捷的构造函数
impl LinkloomError {
    pub fn database_config<T: Into<String>>(msg: T) -> Self {
        LinkloomError::DatabaseConfig(msg.into())
    }

    pub fn database_connection<T: Into<String>>(msg: T) -> Self {
        LinkloomError::DatabaseConnection(msg.into())
    }

    pub fn database_operation<T: Into<String>>(msg: T) -> Self {
        LinkloomError::DatabaseOperation(msg.into())
    }

    pub fn validation<T: Into<String>>(msg: T) -> Self {
        LinkloomError::Validation(msg.into())
    }

    pub fn invalid_destination<T: Into<String>>(msg: T) -> Self {
        LinkloomError::InvalidDestination(msg.into())
    }

    pub fn token_conflict<T: Into<String>>(msg: T) -> Self {
        LinkloomError::TokenConflict(msg.into())
    }

    pub fn allocation_exhausted<T: Into<String>>(msg: T) -> Self {
        LinkloomError::AllocationExhausted(msg.into())
    }

    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        LinkloomError::NotFound(msg.into())
    }

    pub fn quota_exceeded(used: u32, limit: u32) -> Self {
        LinkloomError::QuotaExceeded { used, limit }
    }

    pub fn unauthorized<T: Into<String>>(msg: T) -> Self {
        LinkloomError::Unauthorized(msg.into())
    }

    pub fn forbidden<T: Into<String>>(msg: T) -> Self {
        LinkloomError::Forbidden(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        LinkloomError::Serialization(msg.into())
    }
}

// 为常见的错误类型实现 From trait
impl From<sea_orm::DbErr> for LinkloomError {
    fn from(err: sea_orm::DbErr) -> Self {
        LinkloomError::DatabaseOperation(err.to_string())
    }
}

impl From<serde_json::Error> for LinkloomError {
    fn from(err: serde_json::Error) -> Self {
        LinkloomError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, LinkloomError>;
