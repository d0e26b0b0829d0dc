//! 对 `vessel-berry::dataset` 的更一层封装. 提供测试数据目录与原始数据的加载.

use std::env;
use std::path::{Path, PathBuf};
use vessel_berry::prelude::*;

/// 默认的原始数据文件名.
pub const DEFAULT_RAW_NAME: &str = "Raw_liver_1.tiff";

/// 获取测试数据基本路径.
///
/// 1. 若环境变量 `$VESSEL_FIXTURE_DIR` 非空, 则返回其值;
/// 2. 否则, 返回 `$HOME/dataset/vessel/fixtures`.
pub fn fixture_dir_from_env_or_home() -> Option<PathBuf> {
    match env::var("VESSEL_FIXTURE_DIR") {
        Ok(d) if !d.is_empty() => Some(PathBuf::from(d)),
        _ => home_dataset_dir_with(["vessel", "fixtures"]),
    }
}

/// 原始数据文件名. 取 `$VESSEL_RAW_NAME`, 默认为 [`DEFAULT_RAW_NAME`].
pub fn raw_name() -> String {
    match env::var("VESSEL_RAW_NAME") {
        Ok(n) if !n.is_empty() => n,
        _ => DEFAULT_RAW_NAME.to_string(),
    }
}

/// 从 `dir` 中读取原始体数据.
pub fn load_raw<P: AsRef<Path>>(dir: P) -> Result<Volume, LoadError> {
    let path = dir.as_ref().join(raw_name());
    log::info!("loading raw volume from {}", path.display());
    let v = open_raw(&path)?;
    log::info!("raw volume shape: {:?}", v.shape());
    Ok(v)
}
