use std::collections::HashMap;

/// Identity of a discovered wallet, as carried by an EIP-6963 announcement.
///
/// `uuid` is only stable within one page session; `rdns` is the durable
/// cross-session identity and is what the auto-reconnect preference stores.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ProviderInfo {
    // defaulted so a partial announcement decodes and is then rejected by
    // the registry validation, with a log naming the culprit
    #[serde(default)]
    pub uuid: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub rdns: String,
}

impl ProviderInfo {
    fn is_complete(&self) -> bool {
        !self.uuid.is_empty()
            && !self.name.is_empty()
            && !self.icon.is_empty()
            && !self.rdns.is_empty()
    }
}

/// One `eip6963:announceProvider` payload: the wallet's identity and the
/// request capability it exposes.
#[derive(Debug, Clone, PartialEq)]
pub struct Announcement<P> {
    pub info: ProviderInfo,
    pub provider: P,
}

/// The set of wallets that have announced themselves this session.
///
/// The set is always provisional: there is no discovery-complete signal and
/// a late-loading extension may announce itself at any time.
#[derive(Debug, Clone, Default)]
pub struct ProviderRegistry<P> {
    providers: HashMap<String, Announcement<P>>,
}

impl<P> ProviderRegistry<P> {
    pub fn new() -> Self {
        Self {
            providers: HashMap::new(),
        }
    }

    /// Register an announced provider, keyed by its session `uuid`.
    ///
    /// An announcement missing any of the four identity fields is dropped
    /// with a diagnostic log. Re-announcing an already known `uuid` replaces
    /// the previous entry. Returns whether the announcement was accepted.
    pub fn register(&mut self, announcement: Announcement<P>) -> bool {
        if !announcement.info.is_complete() {
            log::warn!(
                "invalid eip6963 provider info received: {:?}",
                announcement.info
            );
            return false;
        }

        self.providers
            .insert(announcement.info.uuid.clone(), announcement);
        true
    }

    pub fn get(&self, uuid: &str) -> Option<&Announcement<P>> {
        self.providers.get(uuid)
    }

    /// Snapshot of the known wallet identities, for rendering a picker.
    pub fn infos(&self) -> Vec<ProviderInfo> {
        self.providers
            .values()
            .map(|announcement| announcement.info.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Forget every provider. Each discovery session starts from an empty
    /// registry; wallets must re-announce after a reset.
    pub fn clear(&mut self) {
        self.providers.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn announcement(uuid: &str, name: &str) -> Announcement<()> {
        Announcement {
            info: ProviderInfo {
                uuid: uuid.to_owned(),
                name: name.to_owned(),
                icon: "data:image/svg+xml;base64,".to_owned(),
                rdns: "io.demo.wallet".to_owned(),
            },
            provider: (),
        }
    }

    #[test]
    fn re_announcement_replaces_the_entry() {
        let mut registry = ProviderRegistry::new();

        assert!(registry.register(announcement("u1", "Demo Wallet")));
        assert!(registry.register(announcement("u1", "Demo Wallet v2")));

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("u1").unwrap().info.name, "Demo Wallet v2");
    }

    #[test]
    fn incomplete_announcements_are_dropped() {
        let complete = announcement("u1", "Demo Wallet");

        let wipes: [fn(&mut ProviderInfo); 4] = [
            |info| info.uuid.clear(),
            |info| info.name.clear(),
            |info| info.icon.clear(),
            |info| info.rdns.clear(),
        ];
        for wipe in wipes {
            let mut registry = ProviderRegistry::new();
            let mut partial = complete.clone();
            wipe(&mut partial.info);

            assert!(!registry.register(partial));
            assert!(registry.is_empty());
        }
    }

    #[test]
    fn partial_announcement_payload_decodes_to_empty_fields() {
        let info: ProviderInfo =
            serde_json::from_value(serde_json::json! {{ "uuid": "u1", "name": "Demo" }}).unwrap();

        assert!(!info.is_complete());
        assert_eq!(info.uuid, "u1");
        assert_eq!(info.rdns, "");
    }

    #[test]
    fn clear_forgets_everything() {
        let mut registry = ProviderRegistry::new();
        registry.register(announcement("u1", "Demo Wallet"));
        registry.register(announcement("u2", "Other Wallet"));

        registry.clear();

        assert!(registry.is_empty());
        assert!(registry.get("u1").is_none());
    }
}
