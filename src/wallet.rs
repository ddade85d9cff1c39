//! Wallet session events.
//!
//! The wallet itself lives outside this crate. What the front end needs is
//! the connected account (it keys the history log) and a way to react when
//! the account or chain changes. Observers register explicitly and stay
//! registered until [`WalletEvents::unsubscribe`] is called.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, instrument, warn};

/// Account used for history when no wallet is connected.
pub const LOCAL_ACCOUNT: &str = "local";

/// Change reported by the wallet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalletEvent {
    /// Active account switched, or `None` when all accounts were removed.
    AccountChanged(Option<String>),
    /// Active chain switched.
    ChainChanged(u64),
    /// Wallet disconnected.
    Disconnected,
}

/// Handle identifying one registered observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

type Observer = Box<dyn Fn(&WalletEvent) + Send>;

#[derive(Default)]
struct Registry {
    next_id: u64,
    observers: BTreeMap<SubscriptionId, Observer>,
}

/// Observer registry for [`WalletEvent`]s.
///
/// Cloning shares the registry.
#[derive(Clone, Default)]
pub struct WalletEvents {
    registry: Arc<Mutex<Registry>>,
}

impl std::fmt::Debug for WalletEvents {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletEvents")
            .field("observers", &self.len())
            .finish()
    }
}

impl WalletEvents {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `observer`; it is called for every event until unsubscribed.
    #[instrument(skip_all)]
    pub fn subscribe<F>(&self, observer: F) -> SubscriptionId
    where
        F: Fn(&WalletEvent) + Send + 'static,
    {
        let mut registry = self.lock();
        let id = SubscriptionId(registry.next_id);
        registry.next_id += 1;
        registry.observers.insert(id, Box::new(observer));
        debug!(?id, "Wallet observer subscribed");
        id
    }

    /// Removes an observer. Returns false if it was not registered.
    #[instrument(skip(self))]
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let removed = self.lock().observers.remove(&id).is_some();
        if !removed {
            warn!(?id, "Unsubscribe for unknown observer");
        }
        removed
    }

    /// Delivers `event` to every observer, in subscription order.
    ///
    /// Observers run under the registry lock and must not call back into it.
    #[instrument(skip(self))]
    pub fn emit(&self, event: &WalletEvent) {
        let registry = self.lock();
        debug!(observers = registry.observers.len(), "Emitting wallet event");
        for observer in registry.observers.values() {
            observer(event);
        }
    }

    /// Number of registered observers.
    pub fn len(&self) -> usize {
        self.lock().observers.len()
    }

    /// True if nobody is listening.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Registry> {
        self.registry
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Current wallet connection state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalletSession {
    account: Option<String>,
    chain_id: Option<u64>,
}

impl WalletSession {
    /// A disconnected session.
    pub fn new() -> Self {
        Self::default()
    }

    /// A session connected to `account`.
    pub fn connected(account: impl Into<String>) -> Self {
        Self {
            account: Some(account.into()),
            chain_id: None,
        }
    }

    /// Folds a wallet event into the session.
    #[instrument(skip(self))]
    pub fn apply(&mut self, event: &WalletEvent) {
        match event {
            WalletEvent::AccountChanged(account) => self.account = account.clone(),
            WalletEvent::ChainChanged(chain_id) => self.chain_id = Some(*chain_id),
            WalletEvent::Disconnected => *self = Self::default(),
        }
        info!(account = ?self.account, chain_id = ?self.chain_id, "Wallet session updated");
    }

    /// Connected account, if any.
    pub fn account(&self) -> Option<&str> {
        self.account.as_deref()
    }

    /// Active chain, if known.
    pub fn chain_id(&self) -> Option<u64> {
        self.chain_id
    }

    /// Key for the history log: the account, or [`LOCAL_ACCOUNT`].
    pub fn history_key(&self) -> &str {
        self.account.as_deref().unwrap_or(LOCAL_ACCOUNT)
    }

    /// Abbreviated account for display, e.g. `0x1234...abcd`.
    pub fn short_address(&self) -> Option<String> {
        let account = self.account.as_deref()?;
        let chars: Vec<char> = account.chars().collect();
        if chars.len() <= 10 {
            return Some(account.to_string());
        }
        let head: String = chars[..6].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        Some(format!("{}...{}", head, tail))
    }
}
