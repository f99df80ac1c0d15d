// Service layer: persistence, auth, and the two domain facades.
pub mod accounts;
pub mod auth;
pub mod catalog;
pub mod store;

pub use accounts::Accounts;
pub use auth::{AuthError, AuthService};
pub use catalog::Catalog;
pub use store::{Collection, MemoryStore, Repository, StoreError};
