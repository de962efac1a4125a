/// localStorage key under which the `rdns` of the previously connected
/// provider is remembered.
pub const PREFERRED_PROVIDER_KEY: &str = "PREVIOUSLY_CONNECTED_PROVIDER_RDNS";

/// Durable storage for the "last connected wallet" choice.
///
/// One key, one value: the `rdns` of the wallet to reconnect to on the next
/// page load. Injected as a capability so the connection logic can be tested
/// against an in-memory store.
pub trait PreferenceStore {
    /// The `rdns` of the wallet the user last connected, if any.
    fn preferred_rdns(&self) -> Option<String>;
    /// Remember `rdns` as the wallet to auto-reconnect to.
    fn remember(&self, rdns: &str);
    /// Drop the remembered wallet. Absent key means no auto-reconnect.
    fn forget(&self);
}

/// [`PreferenceStore`] over the browser's `window.localStorage`.
///
/// Storage can be unavailable (sandboxed frames, some private browsing
/// modes); every operation then degrades to a logged no-op and the
/// connector simply loses auto-reconnect.
pub struct LocalStorageStore {
    storage: Option<web_sys::Storage>,
}

impl LocalStorageStore {
    pub fn new() -> Self {
        let storage = web_sys::window().and_then(|window| match window.local_storage() {
            Ok(storage) => storage,
            Err(error) => {
                log::warn!("localStorage unavailable: {error:?}");
                None
            }
        });
        Self { storage }
    }
}

impl Default for LocalStorageStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PreferenceStore for LocalStorageStore {
    fn preferred_rdns(&self) -> Option<String> {
        let storage = self.storage.as_ref()?;
        match storage.get_item(PREFERRED_PROVIDER_KEY) {
            Ok(value) => value,
            Err(error) => {
                log::warn!("couldn't read the preferred provider: {error:?}");
                None
            }
        }
    }

    fn remember(&self, rdns: &str) {
        let Some(storage) = self.storage.as_ref() else {
            return;
        };
        if let Err(error) = storage.set_item(PREFERRED_PROVIDER_KEY, rdns) {
            log::warn!("couldn't persist the preferred provider: {error:?}");
        }
    }

    fn forget(&self) {
        let Some(storage) = self.storage.as_ref() else {
            return;
        };
        if let Err(error) = storage.remove_item(PREFERRED_PROVIDER_KEY) {
            log::warn!("couldn't remove the preferred provider: {error:?}");
        }
    }
}
