use crate::{
    error::{ProviderError, ProviderErrorCode},
    provider::{WALLET_ADD_ETHEREUM_CHAIN, WALLET_SWITCH_ETHEREUM_CHAIN, WalletProvider},
};
use core::fmt;
use serde_json::json;

/// The closed set of chains this connector knows how to switch a wallet to.
///
/// The set is fixed at compile time; chains are not user-extensible at
/// runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SupportedChain {
    Sepolia,
    Nahmii3Testnet,
}

/// How a chain-switch attempt concluded.
///
/// Chain switching is best-effort from the user's point of view, but the
/// outcome is reported structurally so the caller decides what (if anything)
/// to surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwitchOutcome {
    /// The wallet is now on the requested chain (possibly after adding it).
    Switched,
    /// The target id is not in the supported table; no request was sent.
    UnsupportedChain(u64),
    /// The user declined the switch or the add-chain prompt.
    Rejected,
    /// The wallet failed for some other reason; not retried.
    Failed(ProviderError),
    /// There is no usable connection to switch on.
    NotConnected,
}

/// Descriptor of a chain's native currency, as `wallet_addEthereumChain`
/// expects it.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct NativeCurrency {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

/// Full chain descriptor in the EIP-3085 `wallet_addEthereumChain` wire
/// shape. `chain_id` is the 0x-prefixed hexadecimal encoding of the id.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainRecord {
    pub chain_id: String,
    pub chain_name: String,
    pub rpc_urls: Vec<String>,
    pub block_explorer_urls: Vec<String>,
    pub native_currency: NativeCurrency,
}

impl fmt::Display for SupportedChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SupportedChain::Sepolia => write!(f, "Sepolia test network"),
            SupportedChain::Nahmii3Testnet => write!(f, "Nahmii3 Test Network"),
        }
    }
}

impl SupportedChain {
    pub const fn chain_id(self) -> u64 {
        match self {
            SupportedChain::Sepolia => 11155111,
            SupportedChain::Nahmii3Testnet => 4062,
        }
    }

    /// The 0x-prefixed hexadecimal chain id, as the chain management methods
    /// want it on the wire.
    pub fn hex_chain_id(self) -> String {
        format!("{:#x}", self.chain_id())
    }

    pub fn from_chain_id(chain_id: u64) -> Option<Self> {
        match chain_id {
            11155111 => Some(SupportedChain::Sepolia),
            4062 => Some(SupportedChain::Nahmii3Testnet),
            _ => None,
        }
    }

    /// The other chain of the pair.
    pub fn toggled(self) -> Self {
        match self {
            SupportedChain::Sepolia => SupportedChain::Nahmii3Testnet,
            SupportedChain::Nahmii3Testnet => SupportedChain::Sepolia,
        }
    }

    /// Build the full descriptor for this chain, suitable as the
    /// `wallet_addEthereumChain` parameter.
    pub fn record(self) -> ChainRecord {
        let native_currency = NativeCurrency {
            name: "ETH".to_owned(),
            symbol: "ETH".to_owned(),
            decimals: 18,
        };
        match self {
            SupportedChain::Sepolia => ChainRecord {
                chain_id: self.hex_chain_id(),
                chain_name: "Sepolia test network".to_owned(),
                rpc_urls: vec!["https://sepolia.infura.io/v3/".to_owned()],
                block_explorer_urls: vec!["https://sepolia.etherscan.io".to_owned()],
                native_currency,
            },
            SupportedChain::Nahmii3Testnet => ChainRecord {
                chain_id: self.hex_chain_id(),
                chain_name: "Nahmii3 Test Network".to_owned(),
                rpc_urls: vec!["https://rpc.testnet.nahmii.io/".to_owned()],
                block_explorer_urls: vec!["https://explorer.testnet.nahmii.io/".to_owned()],
                native_currency,
            },
        }
    }
}

/// Normalize a chain id a wallet returned into an integer.
///
/// `eth_chainId` answers with a 0x-prefixed hexadecimal string, but some
/// providers hand back a plain number or a decimal string instead.
pub fn parse_chain_id(value: &serde_json::Value) -> Result<u64, String> {
    match value {
        serde_json::Value::Number(number) => number
            .as_u64()
            .ok_or_else(|| format!("chain id out of range: {number}")),
        serde_json::Value::String(text) => {
            if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
                u64::from_str_radix(hex, 16)
                    .map_err(|error| format!("invalid chain id `{text}': {error}"))
            } else {
                text.parse()
                    .map_err(|error| format!("invalid chain id `{text}': {error}"))
            }
        }
        other => Err(format!("unexpected chain id payload: {other}")),
    }
}

/// Ask the wallet to switch to `chain_id`, registering the chain with the
/// wallet first if it does not know it.
///
/// This is the standard two-step handshake for injected providers: a
/// `wallet_switchEthereumChain` attempt, then on an unrecognized-chain error
/// (and only on that, see [`ProviderErrorCode::indicates_unrecognized_chain`])
/// exactly one `wallet_addEthereumChain` carrying the full [`ChainRecord`].
/// Wallets switch to a chain they just accepted to add, so a successful
/// fallback counts as a switch.
pub async fn switch_chain<P: WalletProvider>(provider: &P, chain_id: u64) -> SwitchOutcome {
    let Some(target) = SupportedChain::from_chain_id(chain_id) else {
        log::error!("attempt to switch to an unsupported chain: {chain_id}");
        return SwitchOutcome::UnsupportedChain(chain_id);
    };

    let params = json!([{ "chainId": target.hex_chain_id() }]);
    let error = match provider.request(WALLET_SWITCH_ETHEREUM_CHAIN, Some(params)).await {
        Ok(_) => return SwitchOutcome::Switched,
        Err(error) => error,
    };

    if error.code.indicates_unrecognized_chain() {
        log::debug!("wallet does not know chain {target}, requesting addition");
        let record = match serde_json::to_value([target.record()]) {
            Ok(record) => record,
            Err(error) => {
                return SwitchOutcome::Failed(ProviderError::internal(format!(
                    "couldn't encode the chain record: {error}"
                )));
            }
        };
        match provider.request(WALLET_ADD_ETHEREUM_CHAIN, Some(record)).await {
            Ok(_) => SwitchOutcome::Switched,
            Err(error) if error.code == ProviderErrorCode::UserRejectedRequest => {
                log::warn!("user rejected adding chain {target}");
                SwitchOutcome::Rejected
            }
            Err(error) => {
                log::warn!("wallet failed to add chain {target}: {error}");
                SwitchOutcome::Failed(error)
            }
        }
    } else if error.code == ProviderErrorCode::UserRejectedRequest {
        log::warn!("user rejected switching to chain {target}");
        SwitchOutcome::Rejected
    } else {
        log::warn!("wallet failed to switch to chain {target}: {error}");
        SwitchOutcome::Failed(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockProvider;
    use futures::executor::block_on;
    use serde_json::json;

    #[test]
    fn hex_chain_ids() {
        assert_eq!(SupportedChain::Sepolia.hex_chain_id(), "0xaa36a7");
        assert_eq!(SupportedChain::Nahmii3Testnet.hex_chain_id(), "0xfde");
    }

    #[test]
    fn toggling_is_an_involution() {
        assert_eq!(
            SupportedChain::Sepolia.toggled(),
            SupportedChain::Nahmii3Testnet
        );
        assert_eq!(
            SupportedChain::Nahmii3Testnet.toggled(),
            SupportedChain::Sepolia
        );
    }

    #[test]
    fn chain_id_normalization() {
        assert_eq!(parse_chain_id(&json! { "0xaa36a7" }).unwrap(), 11155111);
        assert_eq!(parse_chain_id(&json! { "0xfde" }).unwrap(), 4062);
        assert_eq!(parse_chain_id(&json! { "0XFDE" }).unwrap(), 4062);
        assert_eq!(parse_chain_id(&json! { 4062 }).unwrap(), 4062);
        assert_eq!(parse_chain_id(&json! { "4062" }).unwrap(), 4062);

        assert!(parse_chain_id(&json! { "0xnope" }).is_err());
        assert!(parse_chain_id(&json! { -1 }).is_err());
        assert!(parse_chain_id(&json! { null }).is_err());
        assert!(parse_chain_id(&json! { ["0xfde"] }).is_err());
    }

    #[test]
    fn chain_record_wire_shape() {
        let record = serde_json::to_value(SupportedChain::Sepolia.record()).unwrap();
        assert_eq!(
            record,
            json! {{
                "chainId": "0xaa36a7",
                "chainName": "Sepolia test network",
                "rpcUrls": ["https://sepolia.infura.io/v3/"],
                "blockExplorerUrls": ["https://sepolia.etherscan.io"],
                "nativeCurrency": { "name": "ETH", "symbol": "ETH", "decimals": 18 },
            }}
        );
    }

    #[test]
    fn switch_sends_hex_encoded_target() {
        let provider = MockProvider::new();
        provider.respond(WALLET_SWITCH_ETHEREUM_CHAIN, Ok(json! { null }));

        let outcome = block_on(switch_chain(&provider, 4062));

        assert_eq!(outcome, SwitchOutcome::Switched);
        assert_eq!(
            provider.calls(),
            vec![(
                WALLET_SWITCH_ETHEREUM_CHAIN.to_owned(),
                Some(json! { [{ "chainId": "0xfde" }] })
            )]
        );
    }

    #[test]
    fn unsupported_target_sends_nothing() {
        let provider = MockProvider::new();

        let outcome = block_on(switch_chain(&provider, 999));

        assert_eq!(outcome, SwitchOutcome::UnsupportedChain(999));
        assert!(provider.calls().is_empty());
    }

    #[test]
    fn unrecognized_chain_triggers_single_add() {
        for code in [4902, -32603] {
            let provider = MockProvider::new();
            provider.respond(
                WALLET_SWITCH_ETHEREUM_CHAIN,
                Err(serde_json::from_value(json! {{ "code": code }}).unwrap()),
            );
            provider.respond(WALLET_ADD_ETHEREUM_CHAIN, Ok(json! { null }));

            let outcome = block_on(switch_chain(&provider, 11155111));

            assert_eq!(outcome, SwitchOutcome::Switched);
            let calls = provider.calls();
            assert_eq!(calls.len(), 2);
            assert_eq!(calls[1].0, WALLET_ADD_ETHEREUM_CHAIN);
            assert_eq!(
                calls[1].1,
                Some(json! { [SupportedChain::Sepolia.record()] })
            );
        }
    }

    #[test]
    fn other_errors_are_not_retried() {
        let provider = MockProvider::new();
        provider.respond(
            WALLET_SWITCH_ETHEREUM_CHAIN,
            Err(serde_json::from_value(json! {{ "code": 4001, "message": "nope" }}).unwrap()),
        );

        let outcome = block_on(switch_chain(&provider, 4062));

        assert_eq!(outcome, SwitchOutcome::Rejected);
        assert_eq!(provider.calls().len(), 1);
    }

    #[test]
    fn rejected_addition_is_reported() {
        let provider = MockProvider::new();
        provider.respond(
            WALLET_SWITCH_ETHEREUM_CHAIN,
            Err(serde_json::from_value(json! {{ "code": 4902 }}).unwrap()),
        );
        provider.respond(
            WALLET_ADD_ETHEREUM_CHAIN,
            Err(serde_json::from_value(json! {{ "code": 4001 }}).unwrap()),
        );

        let outcome = block_on(switch_chain(&provider, 4062));

        assert_eq!(outcome, SwitchOutcome::Rejected);
        assert_eq!(provider.calls().len(), 2);
    }

    #[test]
    fn unrelated_failure_is_reported_verbatim() {
        let provider = MockProvider::new();
        let error: ProviderError =
            serde_json::from_value(json! {{ "code": 4200, "message": "not supported" }}).unwrap();
        provider.respond(WALLET_SWITCH_ETHEREUM_CHAIN, Err(error.clone()));

        let outcome = block_on(switch_chain(&provider, 4062));

        assert_eq!(outcome, SwitchOutcome::Failed(error));
        assert_eq!(provider.calls().len(), 1);
    }
}
