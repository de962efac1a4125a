use crate::{
    chain::{self, SupportedChain, SwitchOutcome},
    error::ConnectError,
    provider::{ETH_CHAIN_ID, ETH_REQUEST_ACCOUNTS, WalletProvider},
    registry::{Announcement, ProviderInfo, ProviderRegistry},
    store::PreferenceStore,
};
use std::cell::{Cell, RefCell};

/// The active connection, when there is one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionState {
    /// Session uuid of the connected provider.
    pub provider_uuid: String,
    /// Account addresses the wallet exposed, in the wallet's order.
    pub accounts: Vec<String>,
    /// The chain the wallet is currently on, normalized to an integer.
    pub chain_id: u64,
}

/// Discovery registry and connection state machine, in one place.
///
/// A [`Connector`] collects announced providers, connects to one on demand
/// (or automatically, when a previously remembered wallet re-announces
/// itself), toggles the connected wallet between the two supported chains
/// and disconnects. All state lives on the single browser event loop;
/// interior mutability is enough and no locking exists.
///
/// The preference store is injected so tests can run against an in-memory
/// one; in the browser use [`LocalStorageStore`].
///
/// [`LocalStorageStore`]: crate::LocalStorageStore
pub struct Connector<P, S> {
    registry: RefCell<ProviderRegistry<P>>,
    connection: RefCell<Option<ConnectionState>>,
    store: S,
    // bumped by every connect attempt, disconnect and reset; a connect
    // resolution is applied only if its token is still the latest
    generation: Cell<u64>,
    on_change: RefCell<Option<Box<dyn Fn()>>>,
}

impl<P, S> Connector<P, S>
where
    S: PreferenceStore,
{
    pub fn new(store: S) -> Self {
        Self {
            registry: RefCell::new(ProviderRegistry::new()),
            connection: RefCell::new(None),
            store,
            generation: Cell::new(0),
            on_change: RefCell::new(None),
        }
    }

    /// Register a callback invoked after every observable mutation: a
    /// registry change, a connection, a chain switch, a disconnection.
    /// This is where a UI hooks its re-render.
    ///
    /// The callback must not call `set_on_change` itself.
    pub fn set_on_change(&self, callback: impl Fn() + 'static) {
        *self.on_change.borrow_mut() = Some(Box::new(callback));
    }

    fn notify(&self) {
        if let Some(callback) = self.on_change.borrow().as_ref() {
            callback();
        }
    }

    /// Drop the connection and the auto-reconnect preference.
    ///
    /// Always succeeds, from any state. Local bookkeeping only: the wallet
    /// extension is not notified, there is no reverse handshake in this
    /// protocol.
    pub fn disconnect(&self) {
        self.generation.set(self.generation.get().wrapping_add(1));
        *self.connection.borrow_mut() = None;
        self.store.forget();
        self.notify();
    }

    /// Teardown: forget every announced provider and the in-memory
    /// connection. The persisted preference survives, so the next
    /// discovery session auto-reconnects once the wallet re-announces.
    pub fn reset(&self) {
        self.generation.set(self.generation.get().wrapping_add(1));
        self.registry.borrow_mut().clear();
        *self.connection.borrow_mut() = None;
        self.notify();
    }

    /// Snapshot of the current connection, if any.
    pub fn connection(&self) -> Option<ConnectionState> {
        self.connection.borrow().clone()
    }

    /// Identity of the connected wallet, cross-checked against the
    /// registry: a connection whose provider is gone reports `None` here
    /// and must be rendered as not connected.
    pub fn connected_provider(&self) -> Option<ProviderInfo> {
        let connection = self.connection.borrow();
        let connection = connection.as_ref()?;
        self.registry
            .borrow()
            .get(&connection.provider_uuid)
            .map(|announcement| announcement.info.clone())
    }

    /// Snapshot of the wallets announced so far.
    pub fn providers(&self) -> Vec<ProviderInfo> {
        self.registry.borrow().infos()
    }

    /// Whether `uuid` is the currently connected provider, e.g. to disable
    /// its connect button.
    pub fn is_connected_to(&self, uuid: &str) -> bool {
        self.connection
            .borrow()
            .as_ref()
            .is_some_and(|connection| connection.provider_uuid == uuid)
    }
}

impl<P, S> Connector<P, S>
where
    P: WalletProvider + Clone,
    S: PreferenceStore,
{
    /// Ingest one provider announcement.
    ///
    /// The provider is registered (see [`ProviderRegistry::register`] for
    /// the validation rules) and, if its `rdns` is the remembered preferred
    /// wallet, reconnected automatically. Automatic reconnection runs
    /// without user action, so its failures are logged rather than
    /// surfaced.
    pub async fn handle_announcement(&self, announcement: Announcement<P>) {
        let uuid = announcement.info.uuid.clone();
        let rdns = announcement.info.rdns.clone();

        if !self.registry.borrow_mut().register(announcement) {
            return;
        }
        self.notify();

        if self.store.preferred_rdns().as_deref() == Some(rdns.as_str()) {
            if let Err(error) = self.connect(&uuid).await {
                log::warn!("automatic reconnection to `{rdns}' failed: {error}");
            }
        }
    }

    /// Connect to the provider registered under `uuid`.
    ///
    /// Requests the wallet's accounts and active chain id; only when both
    /// succeed does the state transition to connected, and the wallet's
    /// `rdns` is remembered for auto-reconnection. A failure of either
    /// request leaves the previous state untouched.
    ///
    /// If another connect, a disconnect or a reset happens while this
    /// attempt awaits the wallet, its resolution is discarded and
    /// [`ConnectError::Superseded`] is returned: the latest attempt wins,
    /// not the last to resolve.
    pub async fn connect(&self, uuid: &str) -> Result<(), ConnectError> {
        let (provider, rdns) = {
            let registry = self.registry.borrow();
            let announcement = registry
                .get(uuid)
                .ok_or_else(|| ConnectError::ProviderNotFound(uuid.to_owned()))?;
            (
                announcement.provider.clone(),
                announcement.info.rdns.clone(),
            )
        };

        let generation = self.generation.get().wrapping_add(1);
        self.generation.set(generation);

        let accounts = provider.request(ETH_REQUEST_ACCOUNTS, None).await?;
        let accounts: Vec<String> = serde_json::from_value(accounts)
            .map_err(|error| ConnectError::InvalidResponse(format!("account list: {error}")))?;

        let chain_id = provider.request(ETH_CHAIN_ID, None).await?;
        let chain_id = chain::parse_chain_id(&chain_id).map_err(ConnectError::InvalidResponse)?;

        if self.generation.get() != generation {
            log::debug!("discarding a superseded connection attempt to `{rdns}'");
            return Err(ConnectError::Superseded);
        }

        *self.connection.borrow_mut() = Some(ConnectionState {
            provider_uuid: uuid.to_owned(),
            accounts,
            chain_id,
        });
        self.store.remember(&rdns);
        self.notify();

        Ok(())
    }

    /// Toggle the connected wallet between the two supported chains.
    ///
    /// On Sepolia the target is Nahmii3 and vice versa; on any other chain
    /// the target defaults to Sepolia. Without a usable connection this is
    /// a no-op reported as [`SwitchOutcome::NotConnected`]. The recorded
    /// chain id is updated only when the wallet actually switched.
    pub async fn switch_chain(&self) -> SwitchOutcome {
        let Some((uuid, current)) = self
            .connection
            .borrow()
            .as_ref()
            .map(|connection| (connection.provider_uuid.clone(), connection.chain_id))
        else {
            return SwitchOutcome::NotConnected;
        };

        let Some(provider) = self
            .registry
            .borrow()
            .get(&uuid)
            .map(|announcement| announcement.provider.clone())
        else {
            // the extension left the registry since we connected; the
            // connection is stale and unusable
            log::warn!("connected provider `{uuid}' is no longer registered");
            return SwitchOutcome::NotConnected;
        };

        let target = SupportedChain::from_chain_id(current)
            .map(SupportedChain::toggled)
            .unwrap_or(SupportedChain::Sepolia);

        let outcome = chain::switch_chain(&provider, target.chain_id()).await;
        if outcome == SwitchOutcome::Switched {
            let mut connection = self.connection.borrow_mut();
            match connection.as_mut() {
                // the connection may have moved on while the wallet was
                // prompting; only update the one we switched
                Some(connection) if connection.provider_uuid == uuid => {
                    connection.chain_id = target.chain_id();
                }
                _ => return outcome,
            }
            drop(connection);
            self.notify();
        }
        outcome
    }
}
