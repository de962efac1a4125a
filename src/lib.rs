/*!

# EIP-6963 Connector for injected Ethereum wallets

This library is meant to be used for web applications that need to discover
and connect to Ethereum wallet browser extensions. It implements the
EIP-6963 "Multi Injected Provider Discovery" handshake so that several
installed wallets can coexist and be offered to the user, and the EIP-1193
connection and chain-management calls against whichever wallet the user
picks.

## Features

- Discover every installed wallet announcing itself over EIP-6963
- Connect to a wallet (accounts and active chain)
- Reconnect automatically to the previously chosen wallet on page reload
- Toggle the wallet between the two supported test networks, registering
  the chain with the wallet when it does not know it
- Disconnect

## Usage

First start a discovery session and watch wallets come in:

```no_run
use eip6963_connector::discover;

# fn test() -> anyhow::Result<()> {
let (connector, _session) = discover()?;

connector.set_on_change(|| {
    // re-render the wallet list and connection panel here
});

for wallet in connector.providers() {
    println!("Wallet: {} ({})", wallet.name, wallet.rdns);
}
# Ok(()) }
```

Wallets announce themselves asynchronously, including late-loading
extensions; the set of providers is provisional for the whole session and
the change hook fires whenever it grows.

Connecting is driven by the wallet's session `uuid`:

```no_run
# use eip6963_connector::discover;
#
# async fn test() -> anyhow::Result<()> {
# let (connector, _session) = discover()?;
# let wallet = connector.providers().pop().unwrap();
connector.connect(&wallet.uuid).await?;
# Ok(()) }
```

On success the connection state carries the wallet's accounts and chain id,
and the wallet's `rdns` is remembered in localStorage: the next page load
reconnects to it silently as soon as it re-announces itself.

*/

pub mod chain;
mod connector;
pub mod discovery;
pub mod error;
pub mod ffi;
mod provider;
mod registry;
pub mod store;
#[cfg(test)]
pub(crate) mod testing;

pub use self::{
    chain::{ChainRecord, NativeCurrency, SupportedChain, SwitchOutcome},
    connector::{ConnectionState, Connector},
    discovery::{DiscoverySession, WindowBus, WindowConnector, discover},
    error::{ConnectError, DiscoveryError, ProviderError, ProviderErrorCode},
    ffi::InjectedProvider,
    provider::WalletProvider,
    registry::{Announcement, ProviderInfo, ProviderRegistry},
    store::{LocalStorageStore, PreferenceStore},
};
