//! 进度事件

use std::fmt::Display;
use std::path::PathBuf;

/// 后台批阅任务发给观察者的事件
///
/// 每次运行以且仅以一个 `Finished` 结束
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    /// 过程中的进度或单个文件的失败说明
    InProgress(String),
    /// 运行结束
    Finished(BatchSummary),
}

impl ProgressEvent {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ProgressEvent::Finished(_))
    }
}

impl Display for ProgressEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProgressEvent::InProgress(message) => write!(f, "{}", message),
            ProgressEvent::Finished(summary) => write!(f, "{}", summary),
        }
    }
}

/// 批阅结果汇总
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// 扫描到的文件数
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// 输出文件夹，未创建时为 None
    pub output_dir: Option<PathBuf>,
    /// 没有可处理文件时的说明
    pub note: Option<String>,
    /// 运行级错误说明
    pub fault: Option<String>,
}

const NOTHING_TO_DO: &str = "在指定文件夹中没有找到任何.docx或.pdf文件。";

impl BatchSummary {
    /// 没有找到任何可处理的文件
    pub fn nothing_to_do() -> Self {
        Self {
            note: Some(NOTHING_TO_DO.to_string()),
            ..Default::default()
        }
    }

    /// 按计数生成汇总，输出文件夹尚未创建时为 None
    pub fn completed(
        total: usize,
        succeeded: usize,
        failed: usize,
        output_dir: Option<PathBuf>,
    ) -> Self {
        Self {
            total,
            succeeded,
            failed,
            output_dir,
            ..Default::default()
        }
    }

    /// 运行级错误
    pub fn fault(reason: impl Into<String>) -> Self {
        Self {
            fault: Some(reason.into()),
            ..Default::default()
        }
    }

    pub fn is_fault(&self) -> bool {
        self.fault.is_some()
    }

    pub fn is_empty_input(&self) -> bool {
        self.note.is_some()
    }
}

impl Display for BatchSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(fault) = &self.fault {
            write!(f, "处理过程中发生意外错误: {}", fault)?;
            if self.total > 0 {
                write!(
                    f,
                    "\n\n共计: {} 份\n成功: {} 份\n失败: {} 份",
                    self.total, self.succeeded, self.failed
                )?;
            }
            return Ok(());
        }

        if let Some(note) = &self.note {
            return write!(f, "{}", note);
        }

        let output_dir = self
            .output_dir
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        write!(
            f,
            "所有报告批阅完成！\n\n输出文件夹: {}\n共计: {} 份\n成功: {} 份\n失败: {} 份",
            output_dir, self.total, self.succeeded, self.failed
        )
    }
}
