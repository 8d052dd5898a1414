//! Application state shared by every front end.

use std::sync::Arc;

use crate::api::ApiClient;
use crate::cart::CartStore;
use crate::config::StorefrontConfig;
use crate::session::SessionStore;
use crate::storage::{FileStore, KeyValueStore, StorageBridge};

/// Application state, built once at startup and handed to every consumer.
///
/// This struct is cheaply cloneable via `Arc`. The API client, cart and session
/// all share one storage bridge, so a token stored by a login is immediately
/// used by the next API call.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    api: ApiClient,
    cart: CartStore,
    session: SessionStore,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// Create the state over an explicit store.
    ///
    /// The cart is loaded from `store` right away; the session starts
    /// anonymous until [`SessionStore::hydrate`] is awaited.
    #[must_use]
    pub fn new(config: StorefrontConfig, store: Arc<dyn KeyValueStore>) -> Self {
        let storage = StorageBridge::new(store);
        let api = ApiClient::new(&config, storage.clone());
        let cart = CartStore::load(storage.clone());
        let session = SessionStore::new(api.clone(), storage);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                api,
                cart,
                session,
            }),
        }
    }

    /// Create the state over a [`FileStore`] in `config.state_dir`.
    #[must_use]
    pub fn with_file_store(config: StorefrontConfig) -> Self {
        let store = Arc::new(FileStore::new(&config.state_dir));
        Self::new(config, store)
    }

    /// Get a reference to the client configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the REST API client.
    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    #[must_use]
    pub fn cart(&self) -> &CartStore {
        &self.inner.cart
    }

    #[must_use]
    pub fn session(&self) -> &SessionStore {
        &self.inner.session
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::cart::NewCartItem;
    use crate::storage::{MemoryStore, keys};
    use kasra_core::ProductId;
    use rust_decimal::Decimal;

    fn config() -> StorefrontConfig {
        StorefrontConfig::for_base_url("http://localhost:3000/api").unwrap()
    }

    #[test]
    fn test_states_are_isolated() {
        let a = AppState::new(config(), Arc::new(MemoryStore::new()));
        let b = AppState::new(config(), Arc::new(MemoryStore::new()));

        a.cart()
            .add_item(NewCartItem::new(ProductId::new(1), Decimal::new(100, 0)));

        assert_eq!(a.cart().count(), 1);
        assert!(b.cart().is_empty());
    }

    #[test]
    fn test_cart_restored_from_shared_store() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let first = AppState::new(config(), Arc::clone(&store));
        first
            .cart()
            .add_item(NewCartItem::new(ProductId::new(3), Decimal::new(250, 0)).with_quantity(2.0));

        let second = AppState::new(config(), store);
        assert_eq!(second.cart().count(), 2);
        assert_eq!(second.cart().total(), Decimal::new(500, 0));
    }

    #[test]
    fn test_session_and_api_share_storage() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let state = AppState::new(config(), Arc::clone(&store));
        assert!(!state.session().has_token());

        store.set(keys::TOKEN, "jwt").unwrap();
        assert!(state.session().has_token());
    }
}
