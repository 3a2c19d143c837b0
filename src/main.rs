use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use pingxibao::config::{load_rubric, Config};
use pingxibao::{logger, App, ProgressEvent};

/// 实验报告评析宝 - 批量批阅实验报告
#[derive(Parser, Debug)]
#[command(name = "pingxibao", version, about)]
struct Cli {
    /// 包含实验报告（.docx / .pdf）的文件夹
    input_dir: PathBuf,

    /// 评分标准文件
    #[arg(long, default_value = "example_rubric.txt")]
    rubric_file: PathBuf,

    /// 直接给出评分标准文本（优先于 --rubric-file）
    #[arg(long)]
    rubric: Option<String>,

    /// 配置文件路径（不存在时使用默认值与环境变量）
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 加载配置
    let config = Config::load(Some(&cli.config)).context("加载配置失败")?;

    // 初始化日志
    logger::init_with_level(&config.log_level);

    // 评分标准在启动批阅前校验
    let rubric = load_rubric(cli.rubric.as_deref(), &cli.rubric_file)?;
    println!("评分标准已确认。");

    let app = App::initialize(config);

    let summary = app
        .run(&cli.input_dir, rubric, |event| match event {
            ProgressEvent::InProgress(message) => println!("⏳ {}", message),
            ProgressEvent::Finished(summary) => {
                println!("\n{}", "=".repeat(40));
                println!("{}", summary);
                println!("{}", "=".repeat(40));
            }
        })
        .await;

    if summary.is_fault() {
        std::process::exit(1);
    }

    Ok(())
}
