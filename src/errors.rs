use std::fmt;

#[derive(Debug, Clone)]
pub enum CodpulseError {
    DatabaseConfig(String),
    DatabaseConnection(String),
    DatabaseOperation(String),
    Validation(String),
    NotFound(String),
    Serialization(String),
    DateParse(String),
    InvalidTimezone(String),
    UpstreamApi(String),
    HttpClient(String),
    DispatchQueue(String),
}

impl CodpulseError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            CodpulseError::DatabaseConfig(_) => "E001",
            CodpulseError::DatabaseConnection(_) => "E002",
            CodpulseError::DatabaseOperation(_) => "E003",
            CodpulseError::Validation(_) => "E004",
            CodpulseError::NotFound(_) => "E005",
            CodpulseError::Serialization(_) => "E006",
            CodpulseError::DateParse(_) => "E007",
            CodpulseError::InvalidTimezone(_) => "E008",
            CodpulseError::UpstreamApi(_) => "E009",
            CodpulseError::HttpClient(_) => "E010",
            CodpulseError::DispatchQueue(_) => "E011",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            CodpulseError::DatabaseConfig(_) => "Database Configuration Error",
            CodpulseError::DatabaseConnection(_) => "Database Connection Error",
            CodpulseError::DatabaseOperation(_) => "Database Operation Error",
            CodpulseError::Validation(_) => "Validation Error",
            CodpulseError::NotFound(_) => "Resource Not Found",
            CodpulseError::Serialization(_) => "Serialization Error",
            CodpulseError::DateParse(_) => "Date Parse Error",
            CodpulseError::InvalidTimezone(_) => "Invalid Timezone",
            CodpulseError::UpstreamApi(_) => "Upstream API Error",
            CodpulseError::HttpClient(_) => "HTTP Client Error",
            CodpulseError::DispatchQueue(_) => "Dispatch Queue Error",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            CodpulseError::DatabaseConfig(msg) => msg,
            CodpulseError::DatabaseConnection(msg) => msg,
            CodpulseError::DatabaseOperation(msg) => msg,
            CodpulseError::Validation(msg) => msg,
            CodpulseError::NotFound(msg) => msg,
            CodpulseError::Serialization(msg) => msg,
            CodpulseError::DateParse(msg) => msg,
            CodpulseError::InvalidTimezone(msg) => msg,
            CodpulseError::UpstreamApi(msg) => msg,
            CodpulseError::HttpClient(msg) => msg,
            CodpulseError::DispatchQueue(msg) => msg,
        }
    }

    /// 格式化为彩色输出（用于 Server 模式）
    #[cfg(feature = "server")]
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        format!(
            "{} {} {}\n  {}",
            "[ERROR]".red().bold(),
            self.code().yellow(),
            self.error_type().red(),
            self.message().white()
        )
    }

    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for CodpulseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for CodpulseError {}

// 便捷的构造函数
impl CodpulseError {
    pub fn database_config<T: Into<String>>(msg: T) -> Self {
        CodpulseError::DatabaseConfig(msg.into())
    }

    pub fn database_connection<T: Into<String>>(msg: T) -> Self {
        CodpulseError::DatabaseConnection(msg.into())
    }

    pub fn database_operation<T: Into<String>>(msg: T) -> Self {
        CodpulseError::DatabaseOperation(msg.into())
    }

    pub fn validation<T: Into<String>>(msg: T) -> Self {
        CodpulseError::Validation(msg.into())
    }

    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        CodpulseError::NotFound(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        CodpulseError::Serialization(msg.into())
    }

    pub fn date_parse<T: Into<String>>(msg: T) -> Self {
        CodpulseError::DateParse(msg.into())
    }

    pub fn invalid_timezone<T: Into<String>>(msg: T) -> Self {
        CodpulseError::InvalidTimezone(msg.into())
    }

    pub fn upstream_api<T: Into<String>>(msg: T) -> Self {
        CodpulseError::UpstreamApi(msg.into())
    }

    pub fn http_client<T: Into<String>>(msg: T) -> Self {
        CodpulseError::HttpClient(msg.into())
    }

    pub fn dispatch_queue<T: Into<String>>(msg: T) -> Self {
        CodpulseError::DispatchQueue(msg.into())
    }
}

// 为常见的错误类型实现 From trait
impl From<sea_orm::DbErr> for CodpulseError {
    fn from(err: sea_orm::DbErr) -> Self {
        CodpulseError::DatabaseOperation(err.to_string())
    }
}

impl From<serde_json::Error> for CodpulseError {
    fn from(err: serde_json::Error) -> Self {
        CodpulseError::Serialization(err.to_string())
    }
}

impl From<chrono::ParseError> for CodpulseError {
    fn from(err: chrono::ParseError) -> Self {
        CodpulseError::DateParse(err.to_string())
    }
}

impl From<reqwest::Error> for CodpulseError {
    fn from(err: reqwest::Error) -> Self {
        CodpulseError::HttpClient(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CodpulseError>;
