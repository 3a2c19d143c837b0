use std::path::Path;
use std::sync::Arc;

use tracing::{error, info, warn};

use crate::config::Config;
use crate::infrastructure::progress_channel;
use crate::models::{BatchSummary, ProgressEvent};
use crate::orchestrator::{observe, BatchOrchestrator};
use crate::services::{DocumentExtractor, LlmGradingService};

/// 应用主结构
pub struct App {
    config: Config,
    orchestrator: Arc<BatchOrchestrator>,
}

impl App {
    /// 初始化应用：创建文本提取器与批阅服务
    pub fn initialize(config: Config) -> Self {
        let grading = Arc::new(LlmGradingService::new(&config));
        let orchestrator =
            BatchOrchestrator::from_config(&config, Arc::new(DocumentExtractor), grading);

        log_startup(&config);

        Self::with_orchestrator(config, orchestrator)
    }

    /// 使用自定义的处理器
    pub fn with_orchestrator(config: Config, orchestrator: BatchOrchestrator) -> Self {
        Self {
            config,
            orchestrator: Arc::new(orchestrator),
        }
    }

    /// 启动后台批阅任务，并在当前任务中轮询进度
    ///
    /// `on_event` 按发送顺序收到每个进度事件，最后一个一定是 `Finished`
    pub async fn run<F>(&self, input_dir: &Path, rubric: String, on_event: F) -> BatchSummary
    where
        F: FnMut(&ProgressEvent),
    {
        // 无法解析的路径原样交给后台任务，由它通过 Finished 报告扫描失败
        let input_dir = std::fs::canonicalize(input_dir).unwrap_or_else(|e| {
            warn!("⚠️ 无法解析报告文件夹 {}: {}", input_dir.display(), e);
            input_dir.to_path_buf()
        });
        info!("已选择报告文件夹: {}", input_dir.display());

        let job = self.orchestrator.prepare_job(input_dir, rubric);
        let (sender, receiver) = progress_channel();

        // 后台任务
        let orchestrator = Arc::clone(&self.orchestrator);
        let worker = tokio::spawn(async move { orchestrator.run(job, sender).await });

        // 当前任务只负责轮询
        let summary = observe(receiver, self.config.poll_interval(), on_event).await;

        if let Err(e) = worker.await {
            error!("后台批阅任务异常退出: {}", e);
        }

        summary
    }
}

fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 实验报告评析宝 启动");
    info!("🤖 模型: {} ({})", config.llm_model_name, config.llm_api_base_url);
    info!("⏱️ 单份超时: {} 秒", config.request_timeout_secs);
    if config.file_interval_ms > 0 {
        info!("⏳ 报告间隔: {} 毫秒", config.file_interval_ms);
    }
    info!("{}", "=".repeat(60));
}
