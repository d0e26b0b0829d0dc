//! 数据目录.

use std::path::{Path, PathBuf};

/// 获取 `{用户主目录}/dataset` 目录.
pub fn home_dataset_dir() -> Option<PathBuf> {
    let mut ans = dirs::home_dir()?;
    ans.push("dataset");
    Some(ans)
}

/// 获取 `{用户主目录}/dataset` 目录下给定继续项组成的全路径.
///
/// 例如 `home_dataset_dir_with(["vessel", "fixtures"])` 得到
/// `$HOME/dataset/vessel/fixtures`.
pub fn home_dataset_dir_with<P: AsRef<Path>, I: IntoIterator<Item = P>>(it: I) -> Option<PathBuf> {
    let mut ans = home_dataset_dir()?;
    ans.extend(it);
    Some(ans)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dataset_dir() {
        if let Some(base) = home_dataset_dir() {
            let p = home_dataset_dir_with(["vessel", "fixtures"]).unwrap();
            assert!(p.starts_with(&base));
            assert!(p.ends_with("vessel/fixtures"));
        }
    }
}
