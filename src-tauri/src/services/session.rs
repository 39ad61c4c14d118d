//! # 会话
//!
//! [`Session`] 是整个客户端唯一的可变状态，由顶层（Tauri managed state）独占持有，
//! 以只读视图 [`SessionView`] 和账户广播通道暴露给界面。
//!
//! ## 状态机
//! `Disconnected -> Connecting -> Connected`。只有 `Connected` 状态下可以写入和读取；
//! 除重启应用外没有回到 `Disconnected` 的转换（钱包的切换账户/断开事件不处理）。
//!
//! ## 并发
//! - 写入由 `pending_write` 标志串行化：写入进行期间再次提交是空操作
//! - 读取不加限制，多个读取并发时以最后完成的为准
//! - 不在持有锁的情况下跨越 `.await`

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use alloy_primitives::Address;
use tokio::sync::watch;

use crate::models::record::{Record, RecordView, WriteReceipt};
use crate::models::session::{SessionStatus, SessionView};
use crate::services::contract::{ContractBinding, ContractHandle};
use crate::services::errors::ClientError;
use crate::services::operations::{self, NonEmptyContent, RecordId};
use crate::services::variant::Variant;
use crate::services::wallet::{self, WalletProvider};
use crate::utils::format;

/// 默认的区块浏览器地址
pub const DEFAULT_EXPLORER_URL: &str = "https://etherscan.io";

enum SessionState {
    Disconnected,
    Connecting,
    Connected(ContractHandle),
}

/// 写入操作的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// 交易已确认，界面可以清空草稿
    Confirmed(WriteReceipt),
    /// 已有写入在进行，本次提交被忽略
    Ignored,
}

/// 会话的静态设置
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub contract_address: String,
    /// 等待写入确认的最长时间；`None` 表示一直等待
    pub confirmation_timeout: Option<Duration>,
    pub explorer_url: String,
}

impl SessionSettings {
    pub fn new(contract_address: impl Into<String>) -> Self {
        Self {
            contract_address: contract_address.into(),
            confirmation_timeout: None,
            explorer_url: DEFAULT_EXPLORER_URL.to_string(),
        }
    }
}

/// 写入进行中的标志守卫：无论成功、失败还是超时，落下时都会复位
struct PendingWrite<'a>(&'a AtomicBool);

impl<'a> PendingWrite<'a> {
    fn begin(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for PendingWrite<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct Session<P> {
    variant: Variant,
    provider: Option<P>,
    settings: SessionSettings,
    state: Mutex<SessionState>,
    account: watch::Sender<Option<Address>>,
    pending_write: AtomicBool,
    last_record: Mutex<Option<Record>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<P: WalletProvider> Session<P> {
    /// 创建未连接的会话；`provider` 为 `None` 表示宿主环境中没有钱包
    pub fn new(variant: Variant, provider: Option<P>, settings: SessionSettings) -> Self {
        let (account, _) = watch::channel(None);
        Self {
            variant,
            provider,
            settings,
            state: Mutex::new(SessionState::Disconnected),
            account,
            pending_write: AtomicBool::new(false),
            last_record: Mutex::new(None),
        }
    }

    pub fn variant(&self) -> &Variant {
        &self.variant
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    /// 订阅已连接账户的变化（只读共享上下文）
    pub fn subscribe_account(&self) -> watch::Receiver<Option<Address>> {
        self.account.subscribe()
    }

    pub fn account(&self) -> Option<Address> {
        *self.account.borrow()
    }

    /// 当前连接状态
    ///
    /// # 返回值
    /// `Connecting` 表示已有连接请求在等待用户授权
    pub fn status(&self) -> SessionStatus {
        match *lock(&self.state) {
            SessionState::Disconnected => SessionStatus::Disconnected,
            SessionState::Connecting => SessionStatus::Connecting,
            SessionState::Connected(_) => SessionStatus::Connected,
        }
    }

    pub fn is_pending_write(&self) -> bool {
        self.pending_write.load(Ordering::Acquire)
    }

    pub fn last_record(&self) -> Option<Record> {
        lock(&self.last_record).clone()
    }

    fn handle(&self) -> Option<ContractHandle> {
        match &*lock(&self.state) {
            SessionState::Connected(handle) => Some(handle.clone()),
            _ => None,
        }
    }

    fn not_connected(&self) -> ClientError {
        ClientError::InvalidInput(format!("请先连接钱包，再操作{}", self.variant.labels().noun))
    }

    /// 连接钱包并绑定合约
    ///
    /// 失败时会话恢复到调用前的状态，可无限次重试。
    ///
    /// # 返回值
    /// 钱包授权的第一个账户，同时广播给所有订阅者
    ///
    /// # 错误
    /// - `ProviderUnavailable` - 没有配置钱包，或端点拒绝连接
    /// - `Connection` - 用户拒绝授权、钱包没有账户，或已有连接请求在等待授权
    pub async fn connect(&self) -> Result<Address, ClientError> {
        if self.provider.is_none() {
            log::warn!("未配置钱包提供者");
            return Err(ClientError::ProviderUnavailable);
        }

        let previous = {
            let mut state = lock(&self.state);
            if matches!(*state, SessionState::Connecting) {
                return Err(ClientError::Connection("正在等待钱包授权，请在钱包中确认".to_string()));
            }
            std::mem::replace(&mut *state, SessionState::Connecting)
        };

        match wallet::connect(self.provider.as_ref()).await {
            Ok(signer) => {
                let handle = ContractBinding::bind(
                    &self.settings.contract_address,
                    self.variant.shared_interface(),
                    signer,
                );
                *lock(&self.state) = SessionState::Connected(handle);
                self.account.send_replace(Some(signer.account));
                Ok(signer.account)
            }
            Err(e) => {
                *lock(&self.state) = previous;
                Err(e)
            }
        }
    }

    /// 提交一条记录并等待确认
    ///
    /// 输入框草稿归界面所有，会话不保存它。
    ///
    /// # 参数
    /// - `content` - 输入框原文
    ///
    /// # 返回值
    /// 写入进行中时返回 `Ignored`，不发起任何请求；否则返回确认后的回执
    ///
    /// # 错误
    /// - `InvalidInput` - 未连接或内容为空，在任何网络请求之前返回
    /// - `Write` - 交易被拒绝、回滚或等待超时；之后可以重新提交
    pub async fn submit(&self, content: &str) -> Result<SubmitOutcome, ClientError> {
        if self.is_pending_write() {
            log::debug!("写入进行中，忽略重复提交");
            return Ok(SubmitOutcome::Ignored);
        }

        let handle = self.handle().ok_or_else(|| self.not_connected())?;
        let content = NonEmptyContent::parse(content, &self.variant.labels().noun)?;
        let provider = self.provider.as_ref().ok_or(ClientError::ProviderUnavailable)?;

        let Some(_pending) = PendingWrite::begin(&self.pending_write) else {
            return Ok(SubmitOutcome::Ignored);
        };

        let receipt =
            operations::submit(provider, &handle, &content, self.settings.confirmation_timeout).await?;
        Ok(SubmitOutcome::Confirmed(receipt))
    }

    /// 按 ID 读取记录
    ///
    /// 成功时替换当前展示的记录；失败时保留之前展示的记录不变。
    ///
    /// # 错误
    /// 未连接或 ID 无效时返回 `InvalidInput`，记录不存在或调用失败时返回 `Read`
    pub async fn retrieve(&self, id_input: &str) -> Result<Record, ClientError> {
        let handle = self.handle().ok_or_else(|| self.not_connected())?;
        let id = RecordId::parse(id_input, &self.variant.labels().noun)?;
        let provider = self.provider.as_ref().ok_or(ClientError::ProviderUnavailable)?;

        let record = operations::retrieve(provider, &handle, id).await?;
        *lock(&self.last_record) = Some(record.clone());
        Ok(record)
    }

    /// 界面渲染所需的只读视图
    ///
    /// 连接进行中和写入进行中时，对应按钮都处于禁用状态。
    pub fn view(&self) -> SessionView {
        let status = self.status();
        let account = self.account();
        let connected = status == SessionStatus::Connected;
        let pending_write = self.is_pending_write();
        let labels = self.variant.labels().clone();

        SessionView {
            status,
            account: account.map(|a| a.to_string()),
            account_label: match account {
                Some(a) => format!("已连接: {}", format::short_address(&a)),
                None => "连接钱包".to_string(),
            },
            submit_enabled: connected && !pending_write,
            retrieve_enabled: connected,
            pending_write,
            submit_label: if pending_write {
                "处理中...".to_string()
            } else {
                labels.submit_action.clone()
            },
            last_record: self
                .last_record()
                .map(|record| RecordView::new(&record, &self.settings.explorer_url)),
            labels,
        }
    }
}
