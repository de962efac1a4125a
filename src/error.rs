/// Error codes an injected provider may attach to a rejected request.
///
/// The numeric values follow EIP-1193 (provider errors, `4xxx`) and
/// EIP-1474 (JSON-RPC errors, negative). Wallets are not always faithful
/// to the tables, hence [`ProviderErrorCode::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, thiserror::Error)]
pub enum ProviderErrorCode {
    #[error("The user rejected the request.")]
    UserRejectedRequest,
    #[error("The requested method and/or account has not been authorized by the user.")]
    Unauthorized,
    #[error("The provider does not support the requested method.")]
    UnsupportedMethod,
    #[error("The provider is disconnected from all chains.")]
    Disconnected,
    #[error("The provider is not connected to the requested chain.")]
    ChainDisconnected,
    #[error("The wallet does not recognize the requested chain.")]
    UnrecognizedChain,
    #[error("Internal JSON-RPC error.")]
    InternalError,
    #[error("Unknown error code `{0}'")]
    Unknown(i64),
}

impl ProviderErrorCode {
    /// Whether this code means the wallet has never heard of the chain we
    /// asked it to switch to. `4902` is the code EIP-3085 specifies;
    /// `-32603` is what some wallets report instead. Both must trigger the
    /// `wallet_addEthereumChain` fallback.
    pub fn indicates_unrecognized_chain(self) -> bool {
        matches!(
            self,
            ProviderErrorCode::UnrecognizedChain | ProviderErrorCode::InternalError
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, thiserror::Error, serde::Deserialize)]
#[error("{code}. {message}")]
pub struct ProviderError {
    pub code: ProviderErrorCode,
    /// Wallets occasionally omit the message entirely.
    #[serde(default)]
    pub message: String,
}

impl ProviderError {
    pub(crate) fn internal(message: impl Into<String>) -> Self {
        Self {
            code: ProviderErrorCode::InternalError,
            message: message.into(),
        }
    }
}

/// Failure of an explicit connection attempt.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConnectError {
    /// The uuid does not resolve to a registered provider. Either the
    /// extension never announced itself or the registry was reset since.
    #[error("no provider registered under uuid `{0}'")]
    ProviderNotFound(String),
    #[error("the wallet refused the connection: {0}")]
    Provider(#[from] ProviderError),
    #[error("unexpected payload from the wallet: {0}")]
    InvalidResponse(String),
    /// A newer connect or disconnect happened while this attempt was
    /// awaiting the wallet; its result was discarded.
    #[error("the connection attempt was superseded")]
    Superseded,
}

/// Failure to reach the browser surfaces the discovery protocol runs on.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DiscoveryError {
    #[error("no `window' object in this context")]
    NoWindow,
    #[error("browser event interface failure: {0}")]
    Dom(String),
}

impl<'de> serde::Deserialize<'de> for ProviderErrorCode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct Visitor;
        impl serde::de::Visitor<'_> for Visitor {
            type Value = ProviderErrorCode;

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                write!(formatter, "Expecting an integer ProviderErrorCode")
            }

            fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                match v {
                    4001 => Ok(ProviderErrorCode::UserRejectedRequest),
                    4100 => Ok(ProviderErrorCode::Unauthorized),
                    4200 => Ok(ProviderErrorCode::UnsupportedMethod),
                    4900 => Ok(ProviderErrorCode::Disconnected),
                    4901 => Ok(ProviderErrorCode::ChainDisconnected),
                    4902 => Ok(ProviderErrorCode::UnrecognizedChain),
                    -32603 => Ok(ProviderErrorCode::InternalError),
                    unknown => Ok(ProviderErrorCode::Unknown(unknown)),
                }
            }

            fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                self.visit_i64(v as i64)
            }

            // serde-wasm-bindgen hands JS numbers over as f64
            fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                self.visit_i64(v as i64)
            }
        }

        deserializer.deserialize_i64(Visitor)
    }
}
