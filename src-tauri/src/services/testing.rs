//! 测试用的内存钱包提供者：模拟一个部署了消息合约的节点。

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use alloy_dyn_abi::{DynSolType, DynSolValue};
use alloy_primitives::{Address, B256, Bytes, U256, hex};
use alloy_rpc_types_eth::{TransactionReceipt, TransactionRequest};
use alloy_sol_types::{Revert, SolError};
use serde_json::{Value, json};
use tokio::sync::Notify;

use crate::services::rpc::RpcError;
use crate::services::variant::{Variant, VariantKind};

pub const MOCK_CONTRACT: &str = "0x000000000000000000000000000000000000c0de";

pub fn mock_account() -> Address {
    "0xabcd000000000000000000000000000000001234".parse().unwrap()
}

struct Chain {
    accounts: Vec<Address>,
    records: Vec<(U256, String, Address)>,
    next_id: u64,
    sent_count: u8,
    reject_connect: bool,
    fail_next_send: Option<RpcError>,
    revert_next: bool,
}

pub struct MockProvider {
    variant: Variant,
    chain: Mutex<Chain>,
    network_calls: AtomicUsize,
    receipts_held: AtomicBool,
    accounts_held: AtomicBool,
    /// 每次交易广播成功后通知一次
    pub sent: Notify,
    /// 每次收到账户授权请求时通知一次
    pub accounts_requested: Notify,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::with_accounts(vec![mock_account()])
    }

    pub fn with_accounts(accounts: Vec<Address>) -> Self {
        Self {
            variant: Variant::builtin(VariantKind::Message).unwrap(),
            chain: Mutex::new(Chain {
                accounts,
                records: Vec::new(),
                next_id: 1,
                sent_count: 0,
                reject_connect: false,
                fail_next_send: None,
                revert_next: false,
            }),
            network_calls: AtomicUsize::new(0),
            receipts_held: AtomicBool::new(false),
            accounts_held: AtomicBool::new(false),
            sent: Notify::new(),
            accounts_requested: Notify::new(),
        }
    }

    pub fn account(&self) -> Address {
        self.chain.lock().unwrap().accounts[0]
    }

    pub fn set_next_id(&self, id: u64) {
        self.chain.lock().unwrap().next_id = id;
    }

    /// 下一次账户授权请求被用户拒绝
    pub fn reject_connect(&self) {
        self.chain.lock().unwrap().reject_connect = true;
    }

    pub fn fail_next_send(&self, error: RpcError) {
        self.chain.lock().unwrap().fail_next_send = Some(error);
    }

    pub fn revert_next(&self) {
        self.chain.lock().unwrap().revert_next = true;
    }

    /// 暂停出块：已广播的交易拿不到回执，直到 [`Self::release_receipts`]
    pub fn hold_receipts(&self) {
        self.receipts_held.store(true, Ordering::SeqCst);
    }

    pub fn release_receipts(&self) {
        self.receipts_held.store(false, Ordering::SeqCst);
    }

    /// 模拟用户迟迟不在钱包里点授权，直到 [`Self::release_accounts`]
    pub fn hold_accounts(&self) {
        self.accounts_held.store(true, Ordering::SeqCst);
    }

    pub fn release_accounts(&self) {
        self.accounts_held.store(false, Ordering::SeqCst);
    }

    pub fn network_calls(&self) -> usize {
        self.network_calls.load(Ordering::SeqCst)
    }

    pub fn stored(&self) -> usize {
        self.chain.lock().unwrap().records.len()
    }

    fn touch(&self) {
        self.network_calls.fetch_add(1, Ordering::SeqCst);
    }

    fn revert(reason: &str) -> RpcError {
        let mut data = Revert::SELECTOR.to_vec();
        data.extend(DynSolValue::Tuple(vec![DynSolValue::String(reason.to_string())]).abi_encode_params());
        RpcError::Response {
            code: 3,
            message: "execution reverted".to_string(),
            data: Some(json!(hex::encode_prefixed(data))),
        }
    }

    fn decode_single(request: &TransactionRequest, ty: DynSolType) -> Option<DynSolValue> {
        let data = request.input.input()?;
        match DynSolType::Tuple(vec![ty]).abi_decode_params(data.get(4..)?).ok()? {
            DynSolValue::Tuple(mut values) => values.pop(),
            _ => None,
        }
    }

    /// 按节点的 JSON 形态构造回执，`logs` 为 `(topics, data)` 列表
    fn receipt(hash: B256, success: bool, from: Address, logs: Vec<(Vec<B256>, Vec<u8>)>) -> TransactionReceipt {
        let block_hash = B256::with_last_byte(0xbb);
        let contract: Address = MOCK_CONTRACT.parse().unwrap();
        let logs: Vec<Value> = logs
            .into_iter()
            .enumerate()
            .map(|(index, (topics, data))| {
                json!({
                    "address": contract,
                    "topics": topics,
                    "data": hex::encode_prefixed(data),
                    "blockHash": block_hash,
                    "blockNumber": "0x1",
                    "transactionHash": hash,
                    "transactionIndex": "0x0",
                    "logIndex": format!("{:#x}", index),
                    "removed": false,
                })
            })
            .collect();

        serde_json::from_value(json!({
            "type": "0x2",
            "status": if success { "0x1" } else { "0x0" },
            "cumulativeGasUsed": "0x5208",
            "logs": logs,
            "logsBloom": format!("0x{}", "0".repeat(512)),
            "transactionHash": hash,
            "transactionIndex": "0x0",
            "blockHash": block_hash,
            "blockNumber": "0x1",
            "gasUsed": "0x5208",
            "effectiveGasPrice": "0x1",
            "from": from,
            "to": contract,
            "contractAddress": null,
        }))
        .unwrap()
    }
}

impl crate::services::wallet::WalletProvider for MockProvider {
    async fn request_accounts(&self) -> Result<Vec<Address>, RpcError> {
        self.touch();
        self.accounts_requested.notify_one();
        while self.accounts_held.load(Ordering::SeqCst) {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        let mut chain = self.chain.lock().unwrap();
        if std::mem::take(&mut chain.reject_connect) {
            return Err(RpcError::Response {
                code: 4001,
                message: "User rejected the request.".to_string(),
                data: None,
            });
        }
        Ok(chain.accounts.clone())
    }

    async fn call(&self, request: &TransactionRequest) -> Result<Bytes, RpcError> {
        self.touch();
        let read_selector = self.variant.interface().read_function().selector();
        let selector = request.input.input().and_then(|data| data.get(..4));
        if selector != Some(read_selector.as_slice()) {
            return Err(Self::revert("unknown selector"));
        }
        let id = Self::decode_single(request, DynSolType::Uint(256))
            .and_then(|value| value.as_uint())
            .map(|(id, _)| id)
            .ok_or_else(|| Self::revert("bad calldata"))?;

        let chain = self.chain.lock().unwrap();
        let (_, content, author) = chain
            .records
            .iter()
            .find(|(stored, _, _)| *stored == id)
            .ok_or_else(|| Self::revert("Message does not exist"))?;

        Ok(DynSolValue::Tuple(vec![
            DynSolValue::String(content.clone()),
            DynSolValue::Address(*author),
        ])
        .abi_encode_params()
        .into())
    }

    async fn send_and_confirm(
        &self,
        request: &TransactionRequest,
        timeout: Option<Duration>,
    ) -> Result<TransactionReceipt, RpcError> {
        self.touch();
        let receipt = {
            let mut chain = self.chain.lock().unwrap();
            if let Some(error) = chain.fail_next_send.take() {
                return Err(error);
            }

            let content = Self::decode_single(request, DynSolType::String)
                .and_then(|value| value.as_str().map(str::to_string))
                .ok_or_else(|| Self::revert("bad calldata"))?;
            let sender = request.from.unwrap_or_default();
            chain.sent_count += 1;
            let hash = B256::with_last_byte(chain.sent_count);

            if std::mem::take(&mut chain.revert_next) {
                Self::receipt(hash, false, sender, Vec::new())
            } else {
                let id = U256::from(chain.next_id);
                chain.next_id += 1;
                chain.records.push((id, content.clone(), sender));

                let event = self.variant.interface().event().unwrap();
                let data = DynSolValue::Tuple(vec![DynSolValue::Uint(id, 256), DynSolValue::String(content)])
                    .abi_encode_params();
                Self::receipt(hash, true, sender, vec![(vec![event.selector(), sender.into_word()], data)])
            }
        };
        self.sent.notify_one();

        let mined = async {
            while self.receipts_held.load(Ordering::SeqCst) {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        };
        match timeout {
            Some(limit) => tokio::time::timeout(limit, mined)
                .await
                .map_err(|_| RpcError::ConfirmationTimeout)?,
            None => mined.await,
        }
        Ok(receipt)
    }
}
