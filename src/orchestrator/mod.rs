//! 编排层（Orchestration Layer）
//!
//! ## 模块划分
//!
//! ### `batch_processor` - 批量报告处理器
//! - 扫描输入文件夹，固定本次运行的文件列表
//! - 逐份委托 `GradingFlow`，统计成功/失败
//! - 通过进度通道通知观察者，最后恰好发送一次 `Finished`
//!
//! ### `observer` - 进度观察者
//! - 在调用方的任务中定时轮询进度通道
//! - 收到 `Finished` 后停止
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (处理 Vec<FileTask>)      observer (轮询进度)
//!     ↓                                         ↑
//! workflow::GradingFlow (处理单个文件)   ──→ infrastructure::ProgressChannel
//!     ↓
//! services (能力层：extract / grade / sanitize / write)
//! ```

pub mod batch_processor;
pub mod observer;

pub use batch_processor::{discover_files, BatchOrchestrator, DEFAULT_GRADING_TIMEOUT};
pub use observer::observe;
