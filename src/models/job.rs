//! 批阅任务数据结构

use std::fmt::Display;
use std::path::{Path, PathBuf};

use crate::services::ResultWriter;

/// 一次批阅任务
///
/// 每次运行创建一次，运行期间不可变
#[derive(Debug, Clone)]
pub struct BatchJob {
    input_dir: PathBuf,
    rubric: String,
    output_dir: PathBuf,
}

impl BatchJob {
    /// 创建批阅任务，输出文件夹由 `writer` 根据输入文件夹推导
    pub fn new(
        input_dir: impl Into<PathBuf>,
        rubric: impl Into<String>,
        writer: &ResultWriter,
    ) -> Self {
        let input_dir = input_dir.into();
        let output_dir = writer.resolve_output_directory(&input_dir);
        Self {
            input_dir,
            rubric: rubric.into(),
            output_dir,
        }
    }

    pub fn input_dir(&self) -> &Path {
        &self.input_dir
    }

    pub fn rubric(&self) -> &str {
        &self.rubric
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}

/// 单个待批阅文件
#[derive(Debug, Clone)]
pub struct FileTask {
    /// 文件完整路径
    pub path: PathBuf,
    /// 在扫描结果中的位置（从0开始）
    pub index: usize,
    /// 本次扫描到的文件总数
    pub total: usize,
}

impl FileTask {
    pub fn new(path: PathBuf, index: usize, total: usize) -> Self {
        Self { path, index, total }
    }

    /// 文件名（含扩展名）
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string()
    }
}

impl Display for FileTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{} - {}", self.index + 1, self.total, self.file_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_output_dir_is_sibling() {
        let job = BatchJob::new("/data/lab1", "评分标准", &ResultWriter::new());
        assert_eq!(job.output_dir(), Path::new("/data/graded_feedback"));
        assert_eq!(job.rubric(), "评分标准");
    }

    #[test]
    fn test_file_task_display_is_one_based() {
        let task = FileTask::new(PathBuf::from("/reports/张三.docx"), 0, 3);
        assert_eq!(task.to_string(), "1/3 - 张三.docx");
        assert_eq!(task.file_name(), "张三.docx");
    }
}
