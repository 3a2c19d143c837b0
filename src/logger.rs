//! 日志初始化

use tracing_subscriber::EnvFilter;

/// 以 `info` 为默认级别初始化日志
pub fn init() {
    init_with_level("info");
}

/// 初始化日志，`RUST_LOG` 存在时优先使用
///
/// 日志写到 stderr，stdout 留给进度输出。重复调用是安全的。
pub fn init_with_level(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
