// Session state: persisted token store, cached profile and the predicates over them

pub mod gate;
pub mod profile;
pub mod storage;
pub mod store;

pub use gate::{required_permissions, AdminWatch, SessionGate, ROUTE_PERMISSIONS};
pub use profile::{UserProfile, ADMIN_ROLE, GUEST_ROLE};
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage};
pub use store::{TokenStore, TOKEN_KEY, USER_KEY};
