//! 批量报告处理器 - 编排层
//!
//! ## 职责
//!
//! 在后台任务中把一次 `BatchJob` 跑完：
//!
//! 1. **扫描**：列出输入文件夹下的 `.docx` / `.pdf`（不递归），扫描结果在本次运行中固定
//! 2. **准备输出**：至少有一份报告时才创建输出文件夹
//! 3. **逐份处理**：按扫描顺序委托 `GradingFlow`，单份失败只计数，不中断
//! 4. **进度通知**：每一步通过 `ProgressSender` 通知观察者
//! 5. **收尾**：无论正常结束、扫描失败还是内部异常，都恰好发送一次 `Finished`

use std::panic::AssertUnwindSafe;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use tokio::fs;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::error::{AppResult, DiscoveryError};
use crate::infrastructure::ProgressSender;
use crate::models::{BatchJob, BatchSummary, FileTask, ProgressEvent};
use crate::services::{DocumentKind, GradingService, PromptBuilder, ResultWriter, TextExtractor};
use crate::utils::logging::{log_files_discovered, log_startup, print_final_stats};
use crate::workflow::grading_flow::{panic_message, GradingFlow};

/// 单次 API 调用的默认超时
pub const DEFAULT_GRADING_TIMEOUT: Duration = Duration::from_secs(60);

/// 批量报告处理器
pub struct BatchOrchestrator {
    flow: GradingFlow,
    file_interval: Duration,
}

impl BatchOrchestrator {
    pub fn new(
        extractor: Arc<dyn TextExtractor>,
        grading: Arc<dyn GradingService>,
        writer: ResultWriter,
    ) -> Self {
        Self {
            flow: GradingFlow::new(extractor, grading, writer, DEFAULT_GRADING_TIMEOUT),
            file_interval: Duration::ZERO,
        }
    }

    /// 按配置创建：超时、文件间隔、输出文件夹名与前缀
    pub fn from_config(
        config: &Config,
        extractor: Arc<dyn TextExtractor>,
        grading: Arc<dyn GradingService>,
    ) -> Self {
        Self {
            flow: GradingFlow::new(
                extractor,
                grading,
                ResultWriter::from_config(config),
                config.request_timeout(),
            ),
            file_interval: config.file_interval(),
        }
    }

    pub fn with_grading_timeout(self, timeout: Duration) -> Self {
        let Self { flow, file_interval } = self;
        Self {
            flow: flow.with_grading_timeout(timeout),
            file_interval,
        }
    }

    /// 两份报告之间的等待时间，用于避开接口限流
    pub fn with_file_interval(mut self, interval: Duration) -> Self {
        self.file_interval = interval;
        self
    }

    pub fn with_prompt(self, prompt: PromptBuilder) -> Self {
        let Self { flow, file_interval } = self;
        Self {
            flow: flow.with_prompt(prompt),
            file_interval,
        }
    }

    pub fn writer(&self) -> &ResultWriter {
        self.flow.writer()
    }

    /// 为输入文件夹创建批阅任务
    pub fn prepare_job(
        &self,
        input_dir: impl Into<PathBuf>,
        rubric: impl Into<String>,
    ) -> BatchJob {
        BatchJob::new(input_dir, rubric, self.writer())
    }

    /// 运行一次批阅任务
    ///
    /// 调用方已经确认评分标准非空。本函数不会向外抛出错误：
    /// 所有结果都体现在最后一个 `Finished` 事件以及返回的汇总里。
    pub async fn run(&self, job: BatchJob, sender: ProgressSender) -> BatchSummary {
        let mut tally = Tally::default();

        let outcome = AssertUnwindSafe(self.process_all(&job, &sender, &mut tally))
            .catch_unwind()
            .await;

        let summary = match outcome {
            Ok(Ok(())) if tally.total == 0 => BatchSummary::nothing_to_do(),
            Ok(Ok(())) => tally.completed(),
            Ok(Err(e)) => {
                error!("❌ 批阅中断: {}", e);
                tally.fault(e.to_string())
            }
            Err(panic) => {
                let reason = panic_message(panic.as_ref());
                error!("❌ 批阅过程中发生内部异常: {}", reason);
                tally.fault(reason)
            }
        };

        if !summary.is_empty_input() {
            print_final_stats(&summary);
        }

        if sender.send(ProgressEvent::Finished(summary.clone())).is_err() {
            warn!("⚠️ 观察者已退出，完成通知未送达");
        }

        summary
    }

    async fn process_all(
        &self,
        job: &BatchJob,
        sender: &ProgressSender,
        tally: &mut Tally,
    ) -> AppResult<()> {
        info!("\n📁 正在扫描待批阅的报告...");
        let files = discover_files(job.input_dir()).await?;
        log_files_discovered(files.len());

        if files.is_empty() {
            return Ok(());
        }

        tally.total = files.len();
        let output_dir = job.output_dir();
        self.writer().ensure_output_directory(output_dir).await?;
        tally.output_dir = Some(output_dir.to_path_buf());
        log_startup(job.input_dir(), output_dir);

        for (index, path) in files.into_iter().enumerate() {
            if index > 0 && !self.file_interval.is_zero() {
                tokio::time::sleep(self.file_interval).await;
            }

            let task = FileTask::new(path, index, tally.total);
            info!("\n{}", "─".repeat(30));
            info!("📄 正在处理: {}", task);
            sender.progress(format!("正在处理: {}", task))?;

            match self.flow.run(&task, job).await {
                Ok(_) => tally.succeeded += 1,
                Err(failure) => {
                    tally.failed += 1;
                    let note = failure.note(&task.file_name());
                    warn!("[{}] ⚠️ {}", task, note);
                    sender.progress(note)?;
                }
            }
        }

        Ok(())
    }
}

/// 扫描输入文件夹，返回可批阅的文件（按目录列出的顺序）
///
/// 只看直接子项，扩展名为 `.docx` / `.pdf`（不区分大小写）且是普通文件
pub async fn discover_files(input_dir: &Path) -> Result<Vec<PathBuf>, DiscoveryError> {
    let is_dir = fs::metadata(input_dir)
        .await
        .map(|m| m.is_dir())
        .unwrap_or(false);
    if !is_dir {
        return Err(DiscoveryError::DirectoryNotFound {
            path: input_dir.to_path_buf(),
        });
    }

    let read_failed = |source| DiscoveryError::ReadDirFailed {
        path: input_dir.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    let mut entries = fs::read_dir(input_dir).await.map_err(read_failed)?;

    while let Some(entry) = entries.next_entry().await.map_err(read_failed)? {
        let path = entry.path();
        if DocumentKind::from_path(&path).is_none() {
            continue;
        }

        match fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => files.push(path),
            Ok(_) => debug!("跳过非文件条目: {}", path.display()),
            Err(e) => warn!("⚠️ 无法读取 {}: {}，已跳过", path.display(), e),
        }
    }

    Ok(files)
}

/// 运行中的计数
#[derive(Debug, Default)]
struct Tally {
    total: usize,
    succeeded: usize,
    failed: usize,
    output_dir: Option<PathBuf>,
}

impl Tally {
    fn completed(&self) -> BatchSummary {
        BatchSummary::completed(
            self.total,
            self.succeeded,
            self.failed,
            self.output_dir.clone(),
        )
    }

    fn fault(&self, reason: String) -> BatchSummary {
        BatchSummary {
            fault: Some(reason),
            ..self.completed()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_discover_filters_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["a.pdf", "B.DOCX", "c.txt", "d.doc", "e.pdf.bak"] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }
        std::fs::create_dir(dir.path().join("nested.pdf")).unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("sub").join("inner.pdf"), b"x").unwrap();

        let mut names: Vec<String> = discover_files(dir.path())
            .await
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        names.sort();

        assert_eq!(names, vec!["B.DOCX", "a.pdf"]);
    }

    #[tokio::test]
    async fn test_discover_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let err = discover_files(&dir.path().join("gone")).await.unwrap_err();
        assert!(matches!(err, DiscoveryError::DirectoryNotFound { .. }));
    }

    #[test]
    fn test_fault_keeps_counts() {
        let tally = Tally {
            total: 3,
            succeeded: 1,
            failed: 1,
            output_dir: Some(PathBuf::from("/out")),
        };
        let summary = tally.fault("磁盘已满".to_string());
        assert!(summary.is_fault());
        assert_eq!((summary.total, summary.succeeded, summary.failed), (3, 1, 1));
    }
}
