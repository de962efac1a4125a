use crate::error::ProviderError;

/// RPC method names used by the connector, as defined by EIP-1193 (accounts,
/// chain id) and EIP-3326/EIP-3085 (chain switching and registration).
pub const ETH_REQUEST_ACCOUNTS: &str = "eth_requestAccounts";
pub const ETH_CHAIN_ID: &str = "eth_chainId";
pub const WALLET_SWITCH_ETHEREUM_CHAIN: &str = "wallet_switchEthereumChain";
pub const WALLET_ADD_ETHEREUM_CHAIN: &str = "wallet_addEthereumChain";

/// The request/response capability an injected wallet exposes.
///
/// The browser implementation is [`InjectedProvider`], wrapping the object an
/// extension handed over in its announcement. The trait exists so the
/// connection and chain-switching logic can be exercised against scripted
/// providers without a browser.
///
/// All calls are asynchronous and may suspend for as long as the wallet
/// pleases: there is no timeout and no cancellation once a request has been
/// issued.
///
/// [`InjectedProvider`]: crate::InjectedProvider
#[allow(async_fn_in_trait)]
pub trait WalletProvider {
    /// Perform a single request against the wallet.
    ///
    /// `params`, when present, is passed through as the JSON `params` value
    /// of the request. The result is whatever JSON payload the wallet
    /// resolved with (`null` for the fire-and-forget chain management
    /// methods).
    async fn request(
        &self,
        method: &str,
        params: Option<serde_json::Value>,
    ) -> Result<serde_json::Value, ProviderError>;
}
