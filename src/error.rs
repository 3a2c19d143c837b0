//! 错误类型
//!
//! 按照出错的层级划分：
//! - 单个文件级别：`ExtractionError` / `GradingError` / `WriteError`，只会让当前文件计为失败
//! - 批次级别：`DiscoveryError`，整个批次直接结束
//! - 启动级别：`ConfigError`，程序无法开始批阅

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 扫描输入文件夹失败
    #[error("扫描错误: {0}")]
    Discovery(#[from] DiscoveryError),
    /// 文本提取失败
    #[error("文件读取错误: {0}")]
    Extraction(#[from] ExtractionError),
    /// 批阅服务调用失败
    #[error("批阅错误: {0}")]
    Grading(#[from] GradingError),
    /// 写入评语失败
    #[error("文件写入错误: {0}")]
    Write(#[from] WriteError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 进度通道已关闭（观察者已退出）
    #[error("进度通道已关闭，观察者已退出")]
    ChannelClosed,
}

/// 扫描输入文件夹时的错误
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// 文件夹不存在或不是文件夹
    #[error("文件夹不存在: {}", .path.display())]
    DirectoryNotFound { path: PathBuf },
    /// 读取文件夹失败
    #[error("无法读取文件夹 ({}): {source}", .path.display())]
    ReadDirFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// 文本提取错误
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// 不支持的文件格式
    #[error("不支持的文件格式: {file_name}")]
    UnsupportedFormat { file_name: String },
    /// 读取或解析失败
    #[error("读取文件'{file_name}'时出错: {reason}")]
    ReadFailed { file_name: String, reason: String },
    /// 提取出的文本为空
    #[error("文件'{file_name}'内容为空")]
    EmptyContent { file_name: String },
}

/// 批阅服务错误
#[derive(Debug, Error)]
pub enum GradingError {
    /// 等待超时
    #[error("调用API超时 (等待超过 {} 秒)", .0.as_secs_f32())]
    Timeout(Duration),
    /// 网络或服务端返回错误
    #[error("调用API时发生错误: {0}")]
    Request(String),
    /// 返回内容为空
    #[error("API返回内容为空")]
    EmptyResponse,
    /// 服务实现内部崩溃
    #[error("批阅服务内部异常: {0}")]
    Internal(String),
}

/// 写入评语时的错误
#[derive(Debug, Error)]
pub enum WriteError {
    /// 无法创建输出文件夹
    #[error("无法创建输出文件夹 ({}): {source}", .path.display())]
    CreateDirFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// 写入文件失败
    #[error("写入文件失败 ({}): {source}", .path.display())]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 未设置 API Key
    #[error("未设置 API Key，请在 config.toml 中填写 llm_api_key 或设置环境变量 DEEPSEEK_API_KEY")]
    MissingApiKey,
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
    /// 配置项取值不合法
    #[error("配置项 {field} 不合法: {reason}")]
    InvalidValue { field: String, reason: String },
    /// 读取配置文件失败
    #[error("读取配置文件失败 ({}): {source}", .path.display())]
    FileReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// 配置文件格式错误
    #[error("配置文件格式错误 ({}): {source}", .path.display())]
    FileParseFailed {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    /// 读取评分标准失败
    #[error("读取评分标准失败 ({}): {source}", .path.display())]
    RubricReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// 评分标准为空
    #[error("评分标准不能为空！")]
    EmptyRubric,
}

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

/// 文本提取结果：成功时为提取出的全文
pub type ExtractionResult = Result<String, ExtractionError>;

/// 批阅结果：成功时为模型返回的原始评语
pub type GradingResult = Result<String, GradingError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_message_mentions_timeout() {
        let err = GradingError::Timeout(Duration::from_secs(60));
        let msg = err.to_string();
        assert!(msg.contains("超时"));
        assert!(msg.contains("60"));
    }

    #[test]
    fn app_error_wraps_per_file_errors() {
        let err: AppError = ExtractionError::UnsupportedFormat {
            file_name: "a.txt".to_string(),
        }
        .into();
        assert_eq!(err.to_string(), "文件读取错误: 不支持的文件格式: a.txt");
    }
}
