//! # 实验报告评析宝
//!
//! 批量批阅一个文件夹中的实验报告：提取 `.docx` / `.pdf` 文本，连同评分标准发给大模型，
//! 把返回的评语写入输入文件夹同级的 `graded_feedback/` 中。
//!
//! ## 架构设计
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 后台任务与观察者之间唯一共享的进度通道
//!
//! ### ② 业务能力层（Services）
//! - `TextExtractor` - 文本提取能力
//! - `GradingService` - 大模型批阅能力
//! - `sanitize_feedback` - 评语清理
//! - `ResultWriter` - 写评语文件能力
//!
//! ### ③ 流程层（Workflow）
//! - `GradingFlow` - "一份报告"的完整流程（提取 → 批阅 → 清理 → 写入）
//!
//! ### ④ 编排层（Orchestration）
//! - `BatchOrchestrator` - 扫描文件夹，逐份处理，隔离失败，发送进度
//! - `observe` - 定时轮询进度，直到收到 `Finished`

pub mod app;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod logger;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use app::App;
pub use config::Config;
pub use error::{AppError, AppResult, ExtractionResult, GradingResult};
pub use infrastructure::{progress_channel, ProgressReceiver, ProgressSender, TryReceive};
pub use models::{BatchJob, BatchSummary, FileTask, ProgressEvent};
pub use orchestrator::{observe, BatchOrchestrator};
pub use services::{
    DocumentExtractor, GradingService, LlmGradingService, ResultWriter, TextExtractor,
};
pub use workflow::{FileFailure, GradingFlow};
