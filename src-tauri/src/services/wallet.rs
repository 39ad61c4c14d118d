//! # 钱包提供者与连接
//!
//! [`WalletProvider`] 是客户端与外部钱包之间唯一的接缝：
//! 钱包持有私钥、弹出授权界面、为 `eth_sendTransaction` 签名并广播。
//! 桌面端通过 [`HttpWalletProvider`]（alloy provider 栈）访问钱包暴露的 JSON-RPC 端点；
//! 测试中替换为内存实现。

use std::future::Future;
use std::time::Duration;

use alloy_network::Ethereum;
use alloy_primitives::{Address, Bytes};
use alloy_provider::{DynProvider, Provider, ProviderBuilder};
use alloy_rpc_client::RpcClient;
use alloy_rpc_types_eth::{TransactionReceipt, TransactionRequest};

use crate::services::contract::SigningIdentity;
use crate::services::errors::ClientError;
use crate::services::rpc::RpcError;

/// 默认的回执轮询间隔
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;

/// 外部钱包提供者的能力
pub trait WalletProvider: Send + Sync {
    /// 请求账户访问授权（`eth_requestAccounts`）
    ///
    /// 这是交互式调用：在用户于钱包界面中同意或拒绝之前不会返回。
    fn request_accounts(&self) -> impl Future<Output = Result<Vec<Address>, RpcError>> + Send;

    /// 只读调用（`eth_call`），返回原始输出
    fn call(&self, request: &TransactionRequest) -> impl Future<Output = Result<Bytes, RpcError>> + Send;

    /// 由钱包签名并广播状态变更交易，然后等待回执
    ///
    /// # 参数
    /// - `request` - 未签名的交易，由钱包补全 nonce 和 gas
    /// - `timeout` - 等待回执的最长时间；`None` 表示一直等待
    ///
    /// # 错误
    /// 超时返回 [`RpcError::ConfirmationTimeout`]，此时交易可能已经广播
    fn send_and_confirm(
        &self,
        request: &TransactionRequest,
        timeout: Option<Duration>,
    ) -> impl Future<Output = Result<TransactionReceipt, RpcError>> + Send;
}

/// 请求钱包授权并取得签名身份
///
/// # 错误
/// - 未配置提供者，或端点拒绝连接：`ProviderUnavailable`
/// - 用户拒绝、提供者报错或未授权任何账户：`Connection`
pub async fn connect<P: WalletProvider>(provider: Option<&P>) -> Result<SigningIdentity, ClientError> {
    let provider = provider.ok_or(ClientError::ProviderUnavailable)?;

    let accounts = provider.request_accounts().await.map_err(|e| {
        if e.is_user_rejection() {
            log::info!("用户拒绝了账户授权请求");
        } else {
            log::error!("请求账户授权失败: {}", e);
        }
        ClientError::from_connect(&e)
    })?;

    let account = accounts
        .first()
        .copied()
        .ok_or_else(|| ClientError::Connection("钱包未授权任何账户".to_string()))?;

    log::info!("钱包已连接: {}", account);
    Ok(SigningIdentity { account })
}

/// 通过 HTTP JSON-RPC 访问的钱包提供者
///
/// 不挂载任何 filler：nonce、gas 和签名都交给钱包处理，客户端只发出
/// `eth_sendTransaction`。也不设置请求超时，`eth_requestAccounts` 和
/// `eth_sendTransaction` 会一直挂起到用户在钱包中做出选择。
pub struct HttpWalletProvider {
    provider: DynProvider<Ethereum>,
}

impl HttpWalletProvider {
    /// 连接到钱包端点
    ///
    /// 构造时不发出任何请求，端点是否可达在第一次调用时才知道。
    ///
    /// # 参数
    /// - `endpoint` - JSON-RPC 端点 URL，如 `http://127.0.0.1:1248`
    /// - `poll_interval` - 等待交易回执时的轮询间隔
    ///
    /// # 错误
    /// URL 格式无效时返回错误信息
    pub fn new(endpoint: &str, poll_interval: Duration) -> Result<Self, String> {
        let url = endpoint
            .parse::<reqwest::Url>()
            .map_err(|e| format!("钱包端点 URL 无效: {}", e))?;
        let client = RpcClient::new_http(url).with_poll_interval(poll_interval);
        let provider = ProviderBuilder::new()
            .disable_recommended_fillers()
            .connect_client(client)
            .erased();
        Ok(Self { provider })
    }
}

impl WalletProvider for HttpWalletProvider {
    async fn request_accounts(&self) -> Result<Vec<Address>, RpcError> {
        let accounts = self
            .provider
            .raw_request::<_, Vec<Address>>("eth_requestAccounts".into(), ())
            .await?;
        Ok(accounts)
    }

    async fn call(&self, request: &TransactionRequest) -> Result<Bytes, RpcError> {
        Ok(self.provider.call(request.clone()).await?)
    }

    async fn send_and_confirm(
        &self,
        request: &TransactionRequest,
        timeout: Option<Duration>,
    ) -> Result<TransactionReceipt, RpcError> {
        let pending = self.provider.send_transaction(request.clone()).await?;
        log::info!("交易已发送: {}，等待确认", pending.tx_hash());

        let receipt = pending.with_timeout(timeout).get_receipt().await?;
        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::MockProvider;

    #[tokio::test]
    async fn test_connect_without_provider() {
        let result = connect::<MockProvider>(None).await;
        assert_eq!(result, Err(ClientError::ProviderUnavailable));
    }

    #[tokio::test]
    async fn test_connect_takes_first_account() {
        let provider = MockProvider::new();
        let identity = connect(Some(&provider)).await.unwrap();
        assert_eq!(identity.account, provider.account());
    }

    #[tokio::test]
    async fn test_connect_rejected() {
        let provider = MockProvider::new();
        provider.reject_connect();
        let err = connect(Some(&provider)).await.unwrap_err();
        assert_eq!(err, ClientError::Connection("User rejected the request.".to_string()));
    }

    #[tokio::test]
    async fn test_connect_without_accounts() {
        let provider = MockProvider::with_accounts(vec![]);
        let err = connect(Some(&provider)).await.unwrap_err();
        assert!(matches!(err, ClientError::Connection(_)));
    }

    #[test]
    fn test_invalid_endpoint_url() {
        let err = HttpWalletProvider::new("not a url", Duration::from_secs(1)).err().unwrap();
        assert!(err.starts_with("钱包端点 URL 无效"));
    }

    #[tokio::test]
    async fn test_refused_endpoint_is_unavailable() {
        // 绑定后立即释放端口，保证无人监听
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let provider =
            HttpWalletProvider::new(&format!("http://{}", addr), Duration::from_millis(10)).unwrap();
        let err = connect(Some(&provider)).await.unwrap_err();
        assert_eq!(err, ClientError::ProviderUnavailable);
    }
}
