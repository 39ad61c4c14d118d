//! # 显示格式化工具

use alloy_primitives::Address;

/// 缩写地址：保留 `0x` 加前 4 位和后 4 位，如 `0xABCD...1234`
pub fn short_address(address: &Address) -> String {
    let full = address.to_string();
    format!("{}...{}", &full[..6], &full[full.len() - 4..])
}

/// 区块浏览器中地址页的链接
pub fn explorer_address_url(base: &str, address: &Address) -> String {
    format!("{}/address/{}", base.trim_end_matches('/'), address)
}
