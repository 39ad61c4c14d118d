//! # 合约接口与绑定
//!
//! - [`ContractInterface`]：从 ABI JSON 中挑出写入函数、读取函数和（可选的）创建事件，
//!   并在启动时校验它们的签名。接口描述有误属于配置错误，启动即失败。
//! - [`ContractBinding::bind`]：把合约地址、接口描述和签名身份组合成可调用的
//!   [`ContractHandle`]，纯构造，不做任何 I/O。
//!
//! 写入函数形如 `createRecord(string) -> uint256`，
//! 读取函数形如 `getRecord(uint256) -> (string, address)`，
//! 事件形如 `RecordCreated(uint256 id, address indexed sender, string content)`。

use std::sync::Arc;

use alloy_dyn_abi::{DynSolType, DynSolValue};
use alloy_json_abi::{Event, Function, JsonAbi, Param};
use alloy_primitives::{Address, Bytes, U256};
use alloy_rpc_types_eth::{Log, TransactionRequest};

/// 接口描述中各成员的名称
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceNames {
    pub write_function: String,
    pub read_function: String,
    pub event: Option<String>,
}

/// 接口描述无法使用的原因
#[derive(Debug, thiserror::Error)]
pub enum InterfaceError {
    #[error("合约 ABI 解析失败: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("合约 ABI 中缺少函数 `{0}`")]
    MissingFunction(String),

    #[error("合约 ABI 中缺少事件 `{0}`")]
    MissingEvent(String),

    #[error("`{name}` 的签名应为 {expected}，实际为 {found}")]
    SignatureMismatch {
        name: String,
        expected: &'static str,
        found: String,
    },
}

/// 经过校验的合约接口描述
#[derive(Debug, Clone)]
pub struct ContractInterface {
    write: Function,
    read: Function,
    event: Option<Event>,
}

impl ContractInterface {
    /// 解析并校验 ABI JSON
    ///
    /// 同名重载函数取第一个签名匹配的版本。
    ///
    /// # 参数
    /// - `abi_json` - 标准 ABI 描述（JSON 数组）
    /// - `names` - 写入函数、读取函数和创建事件的名称
    ///
    /// # 错误
    /// JSON 无法解析、找不到指定名称，或签名不是 `(string)` / `(uint256) -> (string, address)` 时返回
    pub fn from_json(abi_json: &str, names: &InterfaceNames) -> Result<Self, InterfaceError> {
        let abi: JsonAbi = serde_json::from_str(abi_json)?;

        let write = find_function(&abi, &names.write_function, &["string"], &["uint256"], "(string) -> (uint256)")?;
        let read = find_function(
            &abi,
            &names.read_function,
            &["uint256"],
            &["string", "address"],
            "(uint256) -> (string, address)",
        )?;

        let event = match &names.event {
            Some(name) => Some(find_event(&abi, name)?),
            None => None,
        };

        Ok(Self { write, read, event })
    }

    pub fn write_function(&self) -> &Function {
        &self.write
    }

    pub fn read_function(&self) -> &Function {
        &self.read
    }

    pub fn event(&self) -> Option<&Event> {
        self.event.as_ref()
    }

    /// 写入调用的 calldata：选择器 + `(string)`
    pub fn encode_write(&self, content: &str) -> Bytes {
        let args = DynSolValue::Tuple(vec![DynSolValue::String(content.to_string())]);
        encode_call(&self.write, &args)
    }

    /// 读取调用的 calldata：选择器 + `(uint256)`
    pub fn encode_read(&self, id: U256) -> Bytes {
        let args = DynSolValue::Tuple(vec![DynSolValue::Uint(id, 256)]);
        encode_call(&self.read, &args)
    }

    /// 解码读取调用的返回值 `(string, address)`
    ///
    /// # 错误
    /// 返回数据长度或类型不符时返回错误信息
    pub fn decode_read(&self, output: &[u8]) -> Result<(String, Address), String> {
        let ty = DynSolType::Tuple(vec![DynSolType::String, DynSolType::Address]);
        let decoded = ty
            .abi_decode_params(output)
            .map_err(|e| format!("返回值解码失败: {}", e))?;

        if let DynSolValue::Tuple(values) = decoded {
            if let [content, author] = values.as_slice() {
                if let (Some(content), Some(author)) = (content.as_str(), author.as_address()) {
                    return Ok((content.to_string(), author));
                }
            }
        }
        Err("返回值不是 (string, address)".to_string())
    }

    /// 从交易回执日志中找出合约分配的记录 ID
    ///
    /// 只匹配 `contract` 地址发出、topic0 等于事件选择器的日志，
    /// 取第一个非 indexed 的 `uint256` 参数。
    ///
    /// # 返回值
    /// 接口未声明事件，或回执中没有可解码的匹配日志时返回 `None`
    pub fn created_id(&self, contract: Address, logs: &[Log]) -> Option<U256> {
        let event = self.event.as_ref()?;
        let selector = event.selector();
        let body_types: Vec<DynSolType> = event
            .inputs
            .iter()
            .filter(|input| !input.indexed)
            .map(|input| DynSolType::parse(&input.ty))
            .collect::<Result<_, _>>()
            .ok()?;

        logs.iter()
            .map(|log| &log.inner)
            .filter(|log| log.address == contract)
            .filter(|log| log.data.topics().first() == Some(&selector))
            .find_map(|log| {
                let decoded = DynSolType::Tuple(body_types.clone())
                    .abi_decode_params(&log.data.data)
                    .ok()?;
                match decoded {
                    DynSolValue::Tuple(values) => values.first()?.as_uint().map(|(id, _)| id),
                    _ => None,
                }
            })
    }
}

fn encode_call(function: &Function, args: &DynSolValue) -> Bytes {
    let mut data = function.selector().to_vec();
    data.extend(args.abi_encode_params());
    Bytes::from(data)
}

fn param_types(params: &[Param]) -> Vec<&str> {
    params.iter().map(|param| param.ty.as_str()).collect()
}

fn find_function(
    abi: &JsonAbi,
    name: &str,
    inputs: &[&str],
    outputs: &[&str],
    expected: &'static str,
) -> Result<Function, InterfaceError> {
    let overloads = abi
        .function(name)
        .ok_or_else(|| InterfaceError::MissingFunction(name.to_string()))?;

    overloads
        .iter()
        .find(|function| param_types(&function.inputs) == inputs && param_types(&function.outputs) == outputs)
        .cloned()
        .ok_or_else(|| InterfaceError::SignatureMismatch {
            name: name.to_string(),
            expected,
            found: overloads
                .iter()
                .map(|function| {
                    format!(
                        "({}) -> ({})",
                        param_types(&function.inputs).join(", "),
                        param_types(&function.outputs).join(", ")
                    )
                })
                .collect::<Vec<_>>()
                .join(" | "),
        })
}

fn find_event(abi: &JsonAbi, name: &str) -> Result<Event, InterfaceError> {
    let overloads = abi
        .event(name)
        .ok_or_else(|| InterfaceError::MissingEvent(name.to_string()))?;

    overloads
        .iter()
        .find(|event| {
            event
                .inputs
                .iter()
                .find(|input| !input.indexed)
                .is_some_and(|input| input.ty == "uint256")
        })
        .cloned()
        .ok_or_else(|| InterfaceError::SignatureMismatch {
            name: name.to_string(),
            expected: "首个非 indexed 参数为 uint256",
            found: overloads
                .iter()
                .map(|event| {
                    event
                        .inputs
                        .iter()
                        .map(|input| {
                            if input.indexed {
                                format!("{} indexed", input.ty)
                            } else {
                                input.ty.clone()
                            }
                        })
                        .collect::<Vec<_>>()
                        .join(", ")
                })
                .collect::<Vec<_>>()
                .join(" | "),
        })
}

/// 签名身份：钱包中已授权的账户，由钱包负责实际签名
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SigningIdentity {
    pub account: Address,
}

/// 可调用的合约句柄
///
/// 合约地址按配置原样保存，直到构造请求时才解析；
/// 地址无效时写入和读取在发出任何网络请求之前失败。
#[derive(Debug, Clone)]
pub struct ContractHandle {
    address: String,
    interface: Arc<ContractInterface>,
    signer: SigningIdentity,
}

impl ContractHandle {
    /// 配置中的合约地址原文
    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn interface(&self) -> &ContractInterface {
        &self.interface
    }

    /// 解析合约地址
    ///
    /// # 错误
    /// 地址不是 20 字节的十六进制地址时返回错误信息
    pub fn target(&self) -> Result<Address, String> {
        self.address
            .trim()
            .parse::<Address>()
            .map_err(|_| format!("合约地址无效: \"{}\"", self.address))
    }

    /// 构造写入交易：由已授权账户发往合约，调用写入函数
    ///
    /// # 参数
    /// - `content` - 用户输入的原文
    ///
    /// # 错误
    /// 合约地址无效时返回错误信息
    pub fn write_request(&self, content: &str) -> Result<TransactionRequest, String> {
        Ok(TransactionRequest::default()
            .from(self.signer.account)
            .to(self.target()?)
            .input(self.interface.encode_write(content).into()))
    }

    /// 构造只读调用：调用读取函数查询 `id`
    ///
    /// # 错误
    /// 合约地址无效时返回错误信息
    pub fn read_request(&self, id: U256) -> Result<TransactionRequest, String> {
        Ok(TransactionRequest::default()
            .from(self.signer.account)
            .to(self.target()?)
            .input(self.interface.encode_read(id).into()))
    }
}

/// 合约绑定：把地址、接口描述和签名身份组合成 [`ContractHandle`]
pub struct ContractBinding;

impl ContractBinding {
    /// 绑定合约
    ///
    /// 纯构造，不做 I/O，也不校验地址。
    ///
    /// # 参数
    /// - `address` - 配置中的合约地址
    /// - `interface` - 经过校验的接口描述，多个句柄共享
    /// - `signer` - 钱包中已授权的账户
    pub fn bind(
        address: &str,
        interface: Arc<ContractInterface>,
        signer: SigningIdentity,
    ) -> ContractHandle {
        ContractHandle {
            address: address.to_string(),
            interface,
            signer,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::variant::{Variant, VariantKind};
    use alloy_primitives::{B256, TxKind};

    fn message_interface() -> ContractInterface {
        Variant::builtin(VariantKind::Message).unwrap().interface().clone()
    }

    #[test]
    fn test_builtin_interfaces_validate() {
        for kind in [VariantKind::Message, VariantKind::Feedback] {
            let variant = Variant::builtin(kind).unwrap();
            assert!(variant.interface().event().is_some());
        }
    }

    #[test]
    fn test_write_calldata_starts_with_selector() {
        let interface = message_interface();
        let data = interface.encode_write("hello");
        // keccak256("storeMessage(string)")[..4]
        assert_eq!(&data[..4], interface.write_function().selector().as_slice());
        assert_eq!(interface.write_function().signature(), "storeMessage(string)");
        // 选择器 + 偏移 + 长度 + 一个数据字
        assert_eq!(data.len(), 4 + 32 * 3);
    }

    #[test]
    fn test_decode_read_output() {
        let interface = message_interface();
        let author: Address = "0x00000000000000000000000000000000000000aa".parse().unwrap();
        let output = DynSolValue::Tuple(vec![
            DynSolValue::String("hello".to_string()),
            DynSolValue::Address(author),
        ])
        .abi_encode_params();

        let (content, decoded_author) = interface.decode_read(&output).unwrap();
        assert_eq!(content, "hello");
        assert_eq!(decoded_author, author);
    }

    #[test]
    fn test_decode_read_rejects_garbage() {
        let interface = message_interface();
        assert!(interface.decode_read(&[0u8; 3]).is_err());
    }

    fn log(address: Address, topics: Vec<B256>, data: Bytes) -> Log {
        Log {
            inner: alloy_primitives::Log::new_unchecked(address, topics, data),
            ..Log::default()
        }
    }

    #[test]
    fn test_created_id_from_logs() {
        let interface = message_interface();
        let contract: Address = "0x0000000000000000000000000000000000000c0c".parse().unwrap();
        let sender = Address::repeat_byte(0x11);
        let event = interface.event().unwrap();

        let created = log(
            contract,
            vec![event.selector(), sender.into_word()],
            DynSolValue::Tuple(vec![
                DynSolValue::Uint(U256::from(7u64), 256),
                DynSolValue::String("hello".to_string()),
            ])
            .abi_encode_params()
            .into(),
        );
        let unrelated = log(contract, vec![B256::repeat_byte(0x22)], Bytes::new());

        let id = interface.created_id(contract, &[unrelated, created.clone()]);
        assert_eq!(id, Some(U256::from(7u64)));

        // 其他合约发出的同名事件不算
        assert_eq!(interface.created_id(Address::repeat_byte(0x33), &[created]), None);
    }

    #[test]
    fn test_malformed_abi() {
        let names = InterfaceNames {
            write_function: "storeMessage".to_string(),
            read_function: "getMessage".to_string(),
            event: None,
        };
        assert!(matches!(
            ContractInterface::from_json("{not json", &names),
            Err(InterfaceError::Malformed(_))
        ));
        assert!(matches!(
            ContractInterface::from_json("[]", &names),
            Err(InterfaceError::MissingFunction(name)) if name == "storeMessage"
        ));
    }

    #[test]
    fn test_signature_mismatch() {
        let abi = r#"[
            {"type": "function", "name": "storeMessage", "stateMutability": "nonpayable",
             "inputs": [{"name": "id", "type": "uint256"}], "outputs": []},
            {"type": "function", "name": "getMessage", "stateMutability": "view",
             "inputs": [{"name": "id", "type": "uint256"}],
             "outputs": [{"name": "", "type": "string"}, {"name": "", "type": "address"}]}
        ]"#;
        let names = InterfaceNames {
            write_function: "storeMessage".to_string(),
            read_function: "getMessage".to_string(),
            event: None,
        };
        let err = ContractInterface::from_json(abi, &names).unwrap_err();
        assert!(err.to_string().contains("(uint256) -> ()"));
    }

    #[test]
    fn test_bind_is_pure() {
        let interface = Arc::new(message_interface());
        let signer = SigningIdentity {
            account: Address::repeat_byte(0x01),
        };
        let contract = Address::repeat_byte(0xc0);
        let handle = ContractBinding::bind(&contract.to_string(), interface, signer);

        let request = handle.read_request(U256::from(1u64)).unwrap();
        assert_eq!(request.to, Some(TxKind::Call(contract)));
        assert_eq!(request.from, Some(signer.account));
        assert_eq!(
            request.input.input(),
            Some(&handle.interface().encode_read(U256::from(1u64)))
        );
    }

    #[test]
    fn test_invalid_address_fails_when_building_requests() {
        let signer = SigningIdentity {
            account: Address::repeat_byte(0x01),
        };
        // 绑定本身不校验
        let handle = ContractBinding::bind("0xanything", Arc::new(message_interface()), signer);
        assert_eq!(handle.address(), "0xanything");

        let err = handle.write_request("hello").unwrap_err();
        assert!(err.contains("0xanything"));
        assert!(handle.read_request(U256::from(1u64)).is_err());
    }
}
