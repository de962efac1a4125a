pub mod eip1193;

pub use self::eip1193::Eip1193;
use crate::{error::ProviderError, provider::WalletProvider};
use serde::Serialize as _;
use wasm_bindgen::{JsCast as _, JsValue};

#[derive(serde::Serialize)]
struct RequestArguments<'a> {
    method: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    params: Option<&'a serde_json::Value>,
}

/// [`WalletProvider`] over the request object a browser extension announced.
///
/// Borrowed for the session's lifetime; this crate only ever calls into it,
/// it never mutates the wallet's object.
#[derive(Clone, PartialEq)]
pub struct InjectedProvider {
    provider: Eip1193,
}

impl InjectedProvider {
    pub fn new(provider: Eip1193) -> Self {
        Self { provider }
    }

    /// Wrap `value` if it plausibly is an EIP-1193 provider, i.e. if it has
    /// a `request` function to call.
    pub fn from_js(value: JsValue) -> Option<Self> {
        looks_like_eip1193_provider(&value).then(|| Self::new(value.unchecked_into()))
    }
}

pub fn looks_like_eip1193_provider(value: &JsValue) -> bool {
    if !value.is_object() {
        return false;
    }

    js_sys::Reflect::get(value, &JsValue::from_str("request"))
        .map(|request| request.is_function())
        .unwrap_or(false)
}

impl WalletProvider for InjectedProvider {
    async fn request(
        &self,
        method: &str,
        params: Option<serde_json::Value>,
    ) -> Result<serde_json::Value, ProviderError> {
        let args = RequestArguments {
            method,
            params: params.as_ref(),
        };
        // json_compatible so params become plain JS objects, not Maps
        let args = args
            .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
            .map_err(|error| {
                ProviderError::internal(format!("Couldn't encode the request: {error}"))
            })?;

        match self.provider.request(args).await {
            Ok(result) => serde_wasm_bindgen::from_value(result).map_err(|error| {
                ProviderError::internal(format!("Couldn't decode the result: {error}"))
            }),
            Err(error) => serde_wasm_bindgen::from_value(error)
                .map_err(|decode_error| {
                    ProviderError::internal(format!(
                        "Couldn't decode the error content: {decode_error}"
                    ))
                })
                .and_then(Err),
        }
    }
}
