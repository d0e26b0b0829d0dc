//! 重新生成全部测试数据.
//!
//! 读取 `$VESSEL_FIXTURE_DIR/$VESSEL_RAW_NAME`, 逐阶段执行流水线,
//! 并将每个阶段的输出以 `.npy` 写回同一目录.

mod report;
mod runner;

use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    utils::init_logger();
    let dir = utils::loader::fixture_dir_from_env_or_home()
        .ok_or("cannot locate fixture directory, set `$VESSEL_FIXTURE_DIR`")?;
    if !dir.is_dir() {
        return Err(format!("{} is not a directory", dir.display()).into());
    }

    println!("Regenerating fixtures in {} ...", dir.display());
    let report = runner::run(&dir)?;
    report.analyze();
    Ok(())
}
