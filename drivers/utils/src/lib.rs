//! 驱动程序依赖的通用组件.

use log::LevelFilter;
use std::env;

pub mod loader;

const SEP: &str = "--------------------------------------------------------";

/// 简单分隔线.
#[inline]
pub fn sep() {
    println!("{SEP}");
}

/// 获得可并行核心数.
pub fn cpus() -> usize {
    std::thread::available_parallelism().map_or_else(|_| num_cpus::get(), usize::from)
}

/// 从 `$VESSEL_LOG` 解析日志等级. 未设置或无法解析时为 `info`.
pub fn log_level_from_env() -> LevelFilter {
    env::var("VESSEL_LOG")
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(LevelFilter::Info)
}

/// 初始化日志. 重复调用时忽略.
pub fn init_logger() {
    let level = log_level_from_env();
    if simple_logger::SimpleLogger::new()
        .with_level(level)
        .init()
        .is_ok()
    {
        log::debug!("logger initialised at `{level}`, {} cpus available", cpus());
    }
}
