//! Session, identity, and access gating for report-portal.
//!
//! This crate provides:
//! - The authenticated account record produced by a successful login
//! - Sessions (`Session`, `SessionId`) and the `SessionStore` abstraction
//! - The auth guard predicate used by protected routes
//! - Identity provider configuration (`OidcConfig`)
//! - Resource descriptors addressed by group key
//! - The error taxonomy shared with the web layer
//!
//! # Example
//!
//! ```
//! use report_portal_access::{
//!     AuthenticatedAccount, MemorySessionStore, SessionId, SessionStore, is_authenticated,
//! };
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let store = MemorySessionStore::new(None);
//! let id = SessionId::generate().expect("randomness");
//!
//! let account = AuthenticatedAccount::new("sub-123".to_string(), "Alice".to_string());
//! store.set_authenticated_account(&id, account).await.unwrap();
//!
//! let session = store.load(&id).await.unwrap();
//! assert!(is_authenticated(session.as_ref()));
//!
//! store.destroy(&id).await.unwrap();
//! assert!(!is_authenticated(store.load(&id).await.unwrap().as_ref()));
//! # }
//! ```

pub mod account;
pub mod error;
pub mod guard;
pub mod oidc;
pub mod resource;
pub mod session;
pub mod store;

// Re-export main types at crate root
pub use account::AuthenticatedAccount;
pub use error::{NotFoundError, ProviderConfigurationError, SessionStoreError, TokenExchangeError};
pub use guard::{FlowState, is_authenticated};
pub use oidc::{OidcConfig, OidcConfigBuilder};
pub use resource::{ResourceCatalog, ResourceDescriptor, StaticResourceCatalog};
pub use session::{Session, SessionId};
pub use store::{MemorySessionStore, SessionStore};
