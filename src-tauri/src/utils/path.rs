//! # 路径工具函数
//!
//! 应用自身的数据存放在 `~/.mo/AnonRecords/` 目录下。

use std::path::{Path, PathBuf};

/// 配置文件名
pub const CONFIG_FILE_NAME: &str = "config.json";

/// 获取应用配置目录的绝对路径
///
/// # 错误
/// 如果无法确定用户主目录（如没有 HOME 环境变量），返回错误信息。
///
/// # 示例
/// - Windows: `C:\Users\username\.mo\AnonRecords`
/// - Linux/macOS: `/home/username/.mo/AnonRecords`
pub fn get_app_config_dir() -> Result<PathBuf, String> {
    let home = dirs::home_dir().ok_or_else(|| "无法获取用户主目录".to_string())?;
    Ok(home.join(".mo").join("AnonRecords"))
}

/// 获取配置文件的绝对路径
pub fn get_config_file_path() -> Result<PathBuf, String> {
    Ok(get_app_config_dir()?.join(CONFIG_FILE_NAME))
}

/// 解析配置中引用的文件路径：绝对路径原样返回，相对路径相对于 `base`
pub fn resolve_relative(base: &Path, path: &str) -> PathBuf {
    let path = Path::new(path);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
