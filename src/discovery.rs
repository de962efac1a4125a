use crate::{
    connector::Connector,
    error::DiscoveryError,
    ffi::InjectedProvider,
    provider::WalletProvider,
    registry::{Announcement, ProviderInfo},
    store::{LocalStorageStore, PreferenceStore},
};
use std::rc::Rc;
use wasm_bindgen::{JsCast as _, JsValue, closure::Closure};

/// Event a wallet extension dispatches to announce itself, carrying a
/// `{ info, provider }` detail.
pub const ANNOUNCE_PROVIDER_EVENT: &str = "eip6963:announceProvider";
/// Event a page dispatches to ask installed extensions to announce
/// themselves. Fire-and-forget: each extension answers independently, in
/// any order, at any time.
pub const REQUEST_PROVIDER_EVENT: &str = "eip6963:requestProvider";

/// The announce/request event surface of the EIP-6963 handshake.
///
/// Injected as a capability so discovery can be driven from something other
/// than the real DOM bus; the browser implementation is [`WindowBus`].
pub trait AnnouncementBus {
    type Provider: WalletProvider;
    /// Keeps the announcement subscription alive; dropping it unsubscribes.
    type Subscription;

    /// Listen for provider announcements. The handler runs once per
    /// well-formed announcement, including late ones: there is no
    /// discovery-complete signal.
    fn subscribe(
        &self,
        handler: Box<dyn FnMut(Announcement<Self::Provider>)>,
    ) -> Result<Self::Subscription, DiscoveryError>;

    /// Broadcast one request for providers to announce themselves.
    fn broadcast_request(&self) -> Result<(), DiscoveryError>;
}

/// [`AnnouncementBus`] over the page's `window` event target.
pub struct WindowBus {
    window: web_sys::Window,
}

impl WindowBus {
    pub fn new() -> Result<Self, DiscoveryError> {
        web_sys::window()
            .map(|window| Self { window })
            .ok_or(DiscoveryError::NoWindow)
    }
}

pub struct WindowSubscription {
    window: web_sys::Window,
    listener: Closure<dyn FnMut(web_sys::Event)>,
}

impl Drop for WindowSubscription {
    fn drop(&mut self) {
        if let Err(error) = self.window.remove_event_listener_with_callback(
            ANNOUNCE_PROVIDER_EVENT,
            self.listener.as_ref().unchecked_ref(),
        ) {
            log::warn!("couldn't release the announcement listener: {error:?}");
        }
    }
}

impl AnnouncementBus for WindowBus {
    type Provider = InjectedProvider;
    type Subscription = WindowSubscription;

    fn subscribe(
        &self,
        mut handler: Box<dyn FnMut(Announcement<InjectedProvider>)>,
    ) -> Result<WindowSubscription, DiscoveryError> {
        let listener = Closure::new(move |event: web_sys::Event| {
            if let Some(announcement) = parse_announcement(&event) {
                handler(announcement);
            }
        });

        self.window
            .add_event_listener_with_callback(
                ANNOUNCE_PROVIDER_EVENT,
                listener.as_ref().unchecked_ref(),
            )
            .map_err(dom_error)?;

        Ok(WindowSubscription {
            window: self.window.clone(),
            listener,
        })
    }

    fn broadcast_request(&self) -> Result<(), DiscoveryError> {
        let event = web_sys::Event::new(REQUEST_PROVIDER_EVENT).map_err(dom_error)?;
        self.window.dispatch_event(&event).map_err(dom_error)?;
        Ok(())
    }
}

fn dom_error(error: JsValue) -> DiscoveryError {
    DiscoveryError::Dom(format!("{error:?}"))
}

fn parse_announcement(event: &web_sys::Event) -> Option<Announcement<InjectedProvider>> {
    let event = event.dyn_ref::<web_sys::CustomEvent>()?;
    let detail = event.detail();

    let info = js_sys::Reflect::get(&detail, &JsValue::from_str("info")).ok()?;
    let info: ProviderInfo = match serde_wasm_bindgen::from_value(info) {
        Ok(info) => info,
        Err(error) => {
            log::warn!("undecodable eip6963 announcement: {error}");
            return None;
        }
    };

    let provider = js_sys::Reflect::get(&detail, &JsValue::from_str("provider")).ok()?;
    let Some(provider) = InjectedProvider::from_js(provider) else {
        log::warn!(
            "announced provider `{}' has no request interface",
            info.rdns
        );
        return None;
    };

    Some(Announcement { info, provider })
}

/// One activation of the discovery protocol.
///
/// Starting a session subscribes to announcements, broadcasts a single
/// provider request and routes every announcement that arrives, whenever it
/// arrives, into the connector. Dropping the session releases the
/// subscription and resets the connector: a later session rebuilds the
/// registry from zero, from fresh announcements.
pub struct DiscoverySession<B, S>
where
    B: AnnouncementBus,
    S: PreferenceStore,
{
    connector: Rc<Connector<B::Provider, S>>,
    _subscription: B::Subscription,
}

impl<B, S> DiscoverySession<B, S>
where
    B: AnnouncementBus,
    B::Provider: Clone + 'static,
    S: PreferenceStore + 'static,
{
    pub fn start(
        bus: &B,
        connector: Rc<Connector<B::Provider, S>>,
    ) -> Result<Self, DiscoveryError> {
        let subscription = bus.subscribe(Box::new({
            let connector = Rc::clone(&connector);
            move |announcement| {
                let connector = Rc::clone(&connector);
                wasm_bindgen_futures::spawn_local(async move {
                    connector.handle_announcement(announcement).await;
                });
            }
        }))?;

        bus.broadcast_request()?;

        Ok(Self {
            connector,
            _subscription: subscription,
        })
    }

    pub fn connector(&self) -> &Rc<Connector<B::Provider, S>> {
        &self.connector
    }
}

impl<B, S> Drop for DiscoverySession<B, S>
where
    B: AnnouncementBus,
    S: PreferenceStore,
{
    fn drop(&mut self) {
        self.connector.reset();
    }
}

/// A [`Connector`] wired to the real browser capabilities.
pub type WindowConnector = Connector<InjectedProvider, LocalStorageStore>;

/// Start wallet discovery against the browser window.
///
/// Returns the connector and the running session. Keep the session alive
/// for as long as discovery should run; wallets announced after it is
/// dropped are not seen.
pub fn discover()
-> Result<(Rc<WindowConnector>, DiscoverySession<WindowBus, LocalStorageStore>), DiscoveryError> {
    let bus = WindowBus::new()?;
    let connector = Rc::new(Connector::new(LocalStorageStore::new()));
    let session = DiscoverySession::start(&bus, Rc::clone(&connector))?;
    Ok((connector, session))
}
