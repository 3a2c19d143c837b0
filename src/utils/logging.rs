//! 日志工具模块
//!
//! 提供批阅过程中日志格式化和输出的辅助函数

use std::path::Path;

use tracing::{info, warn};

use crate::models::BatchSummary;

/// 记录批阅启动信息
///
/// # 参数
/// - `input_dir`: 报告所在文件夹
/// - `output_dir`: 评语输出文件夹
pub fn log_startup(input_dir: &Path, output_dir: &Path) {
    info!("{}", "=".repeat(60));
    info!("🚀 开始批阅 - 后台逐份处理模式");
    info!("📁 报告文件夹: {}", input_dir.display());
    info!("📂 输出文件夹: {}", output_dir.display());
    info!("{}", "=".repeat(60));
}

/// 记录扫描结果
pub fn log_files_discovered(total: usize) {
    if total == 0 {
        warn!("⚠️ 没有找到待批阅的 .docx 或 .pdf 文件");
    } else {
        info!("✓ 找到 {} 份待批阅的报告\n", total);
    }
}

/// 打印最终统计信息
pub fn print_final_stats(summary: &BatchSummary) {
    info!("\n{}", "=".repeat(60));
    info!("📊 批阅完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    if let Some(fault) = &summary.fault {
        warn!("❌ 运行中断: {}", fault);
    }
    info!("✅ 成功: {}/{}", summary.succeeded, summary.total);
    info!("❌ 失败: {}", summary.failed);
    if let Some(output_dir) = &summary.output_dir {
        info!("📂 评语已保存至: {}", output_dir.display());
    }
    info!("{}", "=".repeat(60));
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大字符数
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_counts_chars_not_bytes() {
        assert_eq!(truncate_text("实验报告正文", 4), "实验报告...");
        assert_eq!(truncate_text("短", 4), "短");
    }
}
