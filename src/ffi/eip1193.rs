use wasm_bindgen::prelude::*;

#[wasm_bindgen]
extern "C" {
    /// The provider object a wallet extension exposes, as specified by
    /// EIP-1193. This is the `provider` member of an EIP-6963 announcement;
    /// the same object is reused across all calls to the same wallet.
    #[derive(Clone, PartialEq)]
    pub type Eip1193;

    /// Submit a single RPC request to the wallet.
    ///
    /// `args` is a `{ method, params? }` object. The returned promise
    /// resolves with the method's result (possibly `null`) or rejects with
    /// a `{ code, message }` provider error.
    ///
    /// More details [EIP-1193](https://eips.ethereum.org/EIPS/eip-1193#request)
    ///
    #[wasm_bindgen(method, catch)]
    pub async fn request(this: &Eip1193, args: JsValue) -> Result<JsValue, JsValue>;
}
