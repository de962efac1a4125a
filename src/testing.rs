//! Scripted doubles for the injected capabilities, test builds only.

use crate::{error::ProviderError, provider::WalletProvider, store::PreferenceStore};
use std::{
    cell::RefCell,
    collections::{HashMap, VecDeque},
    rc::Rc,
};

/// A [`WalletProvider`] answering from pre-scripted responses.
///
/// Responses are queued per method and consumed in order; a request with no
/// scripted response fails with an internal error, which keeps a forgotten
/// script visible in the failing assertion rather than hanging a test.
#[derive(Clone, Default)]
pub(crate) struct MockProvider {
    inner: Rc<Inner>,
}

#[derive(Default)]
struct Inner {
    responses: RefCell<HashMap<String, VecDeque<Result<serde_json::Value, ProviderError>>>>,
    calls: RefCell<Vec<(String, Option<serde_json::Value>)>>,
    #[allow(clippy::type_complexity)]
    on_request: RefCell<Option<Box<dyn Fn(&str)>>>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the next response for `method`.
    pub fn respond(&self, method: &str, response: Result<serde_json::Value, ProviderError>) {
        self.inner
            .responses
            .borrow_mut()
            .entry(method.to_owned())
            .or_default()
            .push_back(response);
    }

    /// Every request made so far, in order, with its params.
    pub fn calls(&self) -> Vec<(String, Option<serde_json::Value>)> {
        self.inner.calls.borrow().clone()
    }

    /// Hook invoked at the start of every request, before the scripted
    /// response resolves. Lets a test interleave connector calls with an
    /// in-flight request.
    pub fn on_request(&self, hook: impl Fn(&str) + 'static) {
        *self.inner.on_request.borrow_mut() = Some(Box::new(hook));
    }
}

impl WalletProvider for MockProvider {
    async fn request(
        &self,
        method: &str,
        params: Option<serde_json::Value>,
    ) -> Result<serde_json::Value, ProviderError> {
        self.inner
            .calls
            .borrow_mut()
            .push((method.to_owned(), params));

        if let Some(hook) = self.inner.on_request.borrow().as_ref() {
            hook(method);
        }

        self.inner
            .responses
            .borrow_mut()
            .get_mut(method)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| {
                Err(ProviderError::internal(format!(
                    "no scripted response for `{method}'"
                )))
            })
    }
}

/// In-memory [`PreferenceStore`]; clones share the same slot so a test can
/// inspect what the connector persisted.
#[derive(Clone, Default)]
pub(crate) struct MemoryStore {
    value: Rc<RefCell<Option<String>>>,
}

impl MemoryStore {
    pub fn with(rdns: &str) -> Self {
        Self {
            value: Rc::new(RefCell::new(Some(rdns.to_owned()))),
        }
    }

    pub fn stored(&self) -> Option<String> {
        self.value.borrow().clone()
    }
}

impl PreferenceStore for MemoryStore {
    fn preferred_rdns(&self) -> Option<String> {
        self.value.borrow().clone()
    }

    fn remember(&self, rdns: &str) {
        *self.value.borrow_mut() = Some(rdns.to_owned());
    }

    fn forget(&self) {
        *self.value.borrow_mut() = None;
    }
}
