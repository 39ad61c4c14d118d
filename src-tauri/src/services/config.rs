//! # 配置加载
//!
//! 启动时按以下顺序确定配置：
//! 1. `~/.mo/AnonRecords/config.json`（文件不存在时使用默认值）
//! 2. 环境变量覆盖：`EDUCHAIN_CONTRACT_ADDRESS`、`EDUCHAIN_PROVIDER_URL`、
//!    `EDUCHAIN_RECORD_VARIANT`、`EDUCHAIN_EXPLORER_URL`
//!
//! 然后由配置构造变体、会话设置和钱包提供者。

use std::path::Path;
use std::time::Duration;

use crate::models::config::AppConfig;
use crate::services::contract::InterfaceNames;
use crate::services::session::{Session, SessionSettings};
use crate::services::variant::{Variant, VariantKind};
use crate::services::wallet::HttpWalletProvider;
use crate::utils::path;

pub const ENV_CONTRACT_ADDRESS: &str = "EDUCHAIN_CONTRACT_ADDRESS";
pub const ENV_PROVIDER_URL: &str = "EDUCHAIN_PROVIDER_URL";
pub const ENV_RECORD_VARIANT: &str = "EDUCHAIN_RECORD_VARIANT";
pub const ENV_EXPLORER_URL: &str = "EDUCHAIN_EXPLORER_URL";

/// 从默认位置加载配置并应用环境变量覆盖
pub async fn load_config() -> Result<AppConfig, String> {
    let config_path = path::get_config_file_path()?;
    let mut config = read_config_file(&config_path).await?;
    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    Ok(config)
}

/// 读取配置文件；文件不存在时返回默认配置
pub async fn read_config_file(config_path: &Path) -> Result<AppConfig, String> {
    if !config_path.exists() {
        log::info!("配置文件 {} 不存在，使用默认配置", config_path.display());
        return Ok(AppConfig::default());
    }

    let content = tokio::fs::read_to_string(config_path)
        .await
        .map_err(|e| format!("读取配置文件失败: {}", e))?;

    serde_json::from_str(&content).map_err(|e| format!("解析配置文件失败: {}", e))
}

/// 用环境变量覆盖配置
///
/// `lookup` 按名称查询变量值；值为空白时视为未设置。
pub fn apply_env_overrides(
    config: &mut AppConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<(), String> {
    let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

    if let Some(address) = get(ENV_CONTRACT_ADDRESS) {
        config.contract_address = address.trim().to_string();
    }
    if let Some(url) = get(ENV_PROVIDER_URL) {
        config.provider_url = url.trim().to_string();
    }
    if let Some(url) = get(ENV_EXPLORER_URL) {
        config.explorer_url = url.trim().to_string();
    }
    if let Some(variant) = get(ENV_RECORD_VARIANT) {
        config.variant = variant
            .parse::<VariantKind>()
            .map_err(|e| format!("{} 无效: {}", ENV_RECORD_VARIANT, e))?;
    }
    Ok(())
}

/// 根据配置构造组件变体
///
/// 配置了 `customInterface` 时读取其 ABI 文件（相对路径相对于 `config_dir`），
/// 否则使用内置变体。接口校验失败直接返回错误，应用不会带着错误的接口启动。
pub async fn build_variant(config: &AppConfig, config_dir: &Path) -> Result<Variant, String> {
    let Some(custom) = &config.custom_interface else {
        return Variant::builtin(config.variant).map_err(|e| format!("内置合约接口无效: {}", e));
    };

    let abi_path = path::resolve_relative(config_dir, &custom.abi_path);
    let abi_json = tokio::fs::read_to_string(&abi_path)
        .await
        .map_err(|e| format!("读取合约 ABI 文件 {} 失败: {}", abi_path.display(), e))?;

    let names = InterfaceNames {
        write_function: custom.write_function.clone(),
        read_function: custom.read_function.clone(),
        event: custom.event.clone(),
    };
    Variant::custom(&abi_json, &names, custom.labels.clone())
        .map_err(|e| format!("自定义合约接口无效: {}", e))
}

/// 根据配置构造会话设置
///
/// `confirmationTimeoutSecs` 为 0 时视为未设置，一直等待确认。
pub fn session_settings(config: &AppConfig) -> SessionSettings {
    let mut settings = SessionSettings::new(config.contract_address.clone());
    settings.confirmation_timeout = config
        .confirmation_timeout_secs
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs);
    settings.explorer_url = config.explorer_url.clone();
    settings
}

/// 根据配置构造钱包提供者
///
/// # 返回值
/// 未配置端点时返回 `Ok(None)`，视为宿主环境中没有钱包
///
/// # 错误
/// 端点不是合法 URL 时返回错误描述
pub fn wallet_provider(config: &AppConfig) -> Result<Option<HttpWalletProvider>, String> {
    let url = config.provider_url.trim();
    if url.is_empty() {
        log::warn!("未配置钱包端点");
        return Ok(None);
    }
    let poll_interval = Duration::from_millis(config.poll_interval_ms.max(1));
    HttpWalletProvider::new(url, poll_interval).map(Some)
}

/// 由配置构造完整的会话
pub async fn build_session(
    config: &AppConfig,
    config_dir: &Path,
) -> Result<Session<HttpWalletProvider>, String> {
    let variant = build_variant(config, config_dir).await?;
    if config.contract_address.trim().is_empty() {
        log::warn!("未配置合约地址，写入和读取将由节点报错");
    }
    log::info!(
        "组件变体: {}，合约地址: {}，钱包端点: {}",
        variant.labels().title,
        config.contract_address,
        config.provider_url
    );
    Ok(Session::new(variant, wallet_provider(config)?, session_settings(config)))
}
