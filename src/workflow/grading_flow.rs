//! 单份报告批阅流程 - 流程层
//!
//! 核心职责：定义"一份报告"的完整处理流程
//!
//! 流程顺序：
//! 1. 提取文本（空文本视为失败）
//! 2. 拼装提示词 → 调用批阅服务（带超时）
//! 3. 清理评语 → 写入输出文件
//!
//! 任何一步失败都只影响当前文件，由编排层计数并继续下一个文件

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use tracing::{debug, info, warn};

use crate::error::{ExtractionError, ExtractionResult, GradingError, WriteError};
use crate::models::{BatchJob, FileTask};
use crate::services::{
    sanitize_feedback, GradingService, PromptBuilder, ResultWriter, TextExtractor,
};
use crate::utils::logging::truncate_text;

/// 单个文件失败的原因
#[derive(Debug)]
pub enum FileFailure {
    /// 文件读取失败或内容为空，没有调用批阅服务
    Extraction(ExtractionError),
    /// 批阅服务失败（含超时）
    Grading(GradingError),
    /// 评语写入失败
    Write(WriteError),
}

impl FileFailure {
    /// 面向用户的一行说明
    pub fn note(&self, file_name: &str) -> String {
        match self {
            FileFailure::Extraction(e) => format!("跳过: {} ({})", file_name, e),
            FileFailure::Grading(e) => format!("失败: {} ({})", file_name, e),
            FileFailure::Write(e) => format!("保存失败: {} ({})", file_name, e),
        }
    }
}

/// 单份报告批阅流程
///
/// - 编排 提取 → 批阅 → 清理 → 写入
/// - 不持有进度通道，不做计数
pub struct GradingFlow {
    extractor: Arc<dyn TextExtractor>,
    grading: Arc<dyn GradingService>,
    writer: ResultWriter,
    prompt: PromptBuilder,
    grading_timeout: Duration,
}

impl GradingFlow {
    pub fn new(
        extractor: Arc<dyn TextExtractor>,
        grading: Arc<dyn GradingService>,
        writer: ResultWriter,
        grading_timeout: Duration,
    ) -> Self {
        Self {
            extractor,
            grading,
            writer,
            prompt: PromptBuilder::new(),
            grading_timeout,
        }
    }

    pub fn with_prompt(mut self, prompt: PromptBuilder) -> Self {
        self.prompt = prompt;
        self
    }

    pub fn with_grading_timeout(mut self, timeout: Duration) -> Self {
        self.grading_timeout = timeout;
        self
    }

    pub fn writer(&self) -> &ResultWriter {
        &self.writer
    }

    /// 处理一份报告，评语写入任务的输出文件夹，成功时返回评语文件路径
    ///
    /// 调用方负责事先创建输出文件夹
    pub async fn run(&self, task: &FileTask, job: &BatchJob) -> Result<PathBuf, FileFailure> {
        let file_name = task.file_name();

        // ========== 1. 提取文本 ==========
        let text = self.extract(task).await.map_err(FileFailure::Extraction)?;
        if text.trim().is_empty() {
            return Err(FileFailure::Extraction(ExtractionError::EmptyContent {
                file_name,
            }));
        }
        debug!("[{}] 报告正文: {}", task, truncate_text(text.trim(), 80));

        // ========== 2. 调用批阅服务 ==========
        info!("[{}] 🤖 正在调用大模型批阅...", task);
        let prompt = self.prompt.build(job.rubric(), &text);
        let raw_feedback = self.grade(&prompt).await.map_err(FileFailure::Grading)?;

        // ========== 3. 清理并写入 ==========
        let feedback = sanitize_feedback(Some(&raw_feedback));
        if feedback.is_empty() {
            return Err(FileFailure::Grading(GradingError::EmptyResponse));
        }

        let path = self
            .writer
            .write_feedback(job.output_dir(), &file_name, &feedback)
            .await
            .map_err(FileFailure::Write)?;

        info!("[{}] ✓ 评语已保存: {}", task, path.display());
        Ok(path)
    }

    /// 在阻塞线程池中提取文本，解析库崩溃也只算作读取失败
    async fn extract(&self, task: &FileTask) -> ExtractionResult {
        let extractor = Arc::clone(&self.extractor);
        let path = task.path.clone();

        match tokio::task::spawn_blocking(move || extractor.extract(&path)).await {
            Ok(result) => result,
            Err(e) => {
                warn!("[{}] ⚠️ 文本提取线程异常退出: {}", task, e);
                Err(ExtractionError::ReadFailed {
                    file_name: task.file_name(),
                    reason: "解析过程中发生异常".to_string(),
                })
            }
        }
    }

    /// 调用批阅服务，超时与服务内部崩溃都转换为 `GradingError`
    async fn grade(&self, prompt: &str) -> Result<String, GradingError> {
        let call = std::panic::AssertUnwindSafe(self.grading.complete(prompt)).catch_unwind();

        match tokio::time::timeout(self.grading_timeout, call).await {
            Ok(Ok(result)) => result,
            Ok(Err(panic)) => Err(GradingError::Internal(panic_message(panic.as_ref()))),
            Err(_) => Err(GradingError::Timeout(self.grading_timeout)),
        }
    }
}

/// 从 panic 负载中取出可读的说明
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "未知异常".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_notes() {
        let extraction = FileFailure::Extraction(ExtractionError::EmptyContent {
            file_name: "b.docx".to_string(),
        });
        assert!(extraction.note("b.docx").starts_with("跳过: b.docx"));

        let grading = FileFailure::Grading(GradingError::Timeout(Duration::from_secs(60)));
        let note = grading.note("c.pdf");
        assert!(note.starts_with("失败: c.pdf"));
        assert!(note.contains("超时"));
    }

    #[test]
    fn test_panic_message() {
        let payload: Box<dyn std::any::Any + Send> = Box::new("boom");
        assert_eq!(panic_message(payload.as_ref()), "boom");
        let payload: Box<dyn std::any::Any + Send> = Box::new(String::from("崩溃"));
        assert_eq!(panic_message(payload.as_ref()), "崩溃");
    }
}
