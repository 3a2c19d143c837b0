//! 评语写入服务 - 业务能力层
//!
//! 只负责"把评语写到输出文件夹"，不关心流程

use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::debug;

use crate::config::Config;
use crate::error::WriteError;

/// 评语写入服务
///
/// - 输出文件夹位于输入文件夹的同级目录（输入文件夹的父目录下）
/// - 文件名为 `<前缀><原文件名去掉扩展名>.txt`，同名文件直接覆盖
/// - 始终以 UTF-8 写入
#[derive(Debug, Clone)]
pub struct ResultWriter {
    folder_name: String,
    prefix: String,
}

impl ResultWriter {
    /// 使用默认名称：`graded_feedback` / `评语_`
    pub fn new() -> Self {
        Self::with_names("graded_feedback", "评语_")
    }

    pub fn with_names(folder_name: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            folder_name: folder_name.into(),
            prefix: prefix.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::with_names(&config.output_folder_name, &config.output_prefix)
    }

    /// 推导输出文件夹路径（不创建）
    pub fn resolve_output_directory(&self, input_dir: &Path) -> PathBuf {
        let parent = input_dir
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        parent.join(&self.folder_name)
    }

    /// 确保输出文件夹存在，可重复调用
    pub async fn ensure_output_directory(&self, output_dir: &Path) -> Result<(), WriteError> {
        fs::create_dir_all(output_dir)
            .await
            .map_err(|source| WriteError::CreateDirFailed {
                path: output_dir.to_path_buf(),
                source,
            })
    }

    /// 根据原文件名生成评语文件名
    pub fn output_file_name(&self, source_file_name: &str) -> String {
        let stem = Path::new(source_file_name)
            .file_stem()
            .unwrap_or_default()
            .to_string_lossy();
        format!("{}{}.txt", self.prefix, stem)
    }

    /// 写入评语，返回写入的文件路径
    pub async fn write_feedback(
        &self,
        output_dir: &Path,
        source_file_name: &str,
        content: &str,
    ) -> Result<PathBuf, WriteError> {
        let path = output_dir.join(self.output_file_name(source_file_name));
        debug!("写入评语: {} ({} 字符)", path.display(), content.chars().count());

        fs::write(&path, content.as_bytes())
            .await
            .map_err(|source| WriteError::WriteFailed {
                path: path.clone(),
                source,
            })?;

        Ok(path)
    }
}

impl Default for ResultWriter {
    fn default() -> Self {
        Self::new()
    }
}
