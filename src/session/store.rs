use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::watch;

use super::profile::UserProfile;
use super::storage::{KeyValueStorage, MemoryStorage};
use crate::error::StorageError;

pub const TOKEN_KEY: &str = "auth_token";
pub const USER_KEY: &str = "current_user";

/// Persisted bearer token plus last-known user profile.
///
/// Cloning is cheap; all clones share the same storage and subscribers. Every
/// `set` and `clear` advances the session epoch, which lets the facade tell a
/// 401 for the live session apart from a stale one.
#[derive(Clone)]
pub struct TokenStore {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    storage: Box<dyn KeyValueStorage>,
    epoch: Mutex<u64>,
    users: watch::Sender<Option<UserProfile>>,
}

impl TokenStore {
    pub fn new(storage: impl KeyValueStorage + 'static) -> Self {
        let storage: Box<dyn KeyValueStorage> = Box::new(storage);
        let initial = read_user(storage.as_ref());
        let (users, _) = watch::channel(initial);

        Self {
            inner: Arc::new(StoreInner {
                storage,
                epoch: Mutex::new(0),
                users,
            }),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(MemoryStorage::new())
    }

    fn lock(&self) -> MutexGuard<'_, u64> {
        self.inner.epoch.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Persist token and user together
    pub fn set(&self, token: &str, user: &UserProfile) -> Result<(), StorageError> {
        let serialized = serde_json::to_string(user)?;
        let mut epoch = self.lock();
        self.inner
            .storage
            .set_items(&[(TOKEN_KEY, token), (USER_KEY, &serialized)])?;
        *epoch += 1;
        self.inner.users.send_replace(Some(user.clone()));
        tracing::debug!("Session stored for {} (epoch {})", user.label(), *epoch);
        Ok(())
    }

    /// Current token; empty strings count as absent
    pub fn get(&self) -> Option<String> {
        let _epoch = self.lock();
        self.inner
            .storage
            .get_item(TOKEN_KEY)
            .filter(|token| !token.is_empty())
    }

    /// Cached profile; a corrupted entry reads as absent
    pub fn get_user(&self) -> Option<UserProfile> {
        let _epoch = self.lock();
        read_user(self.inner.storage.as_ref())
    }

    /// Replace the cached profile without touching the token
    pub fn update_user(&self, user: Option<&UserProfile>) -> Result<(), StorageError> {
        let _epoch = self.lock();
        match user {
            Some(user) => {
                let serialized = serde_json::to_string(user)?;
                self.inner.storage.set_item(USER_KEY, &serialized)?;
            }
            None => self.inner.storage.remove_item(USER_KEY)?,
        }
        self.inner.users.send_replace(user.cloned());
        Ok(())
    }

    pub fn clear(&self) {
        let mut epoch = self.lock();
        self.remove_entries(&mut epoch);
    }

    pub fn epoch(&self) -> u64 {
        *self.lock()
    }

    /// Token and epoch read under one lock, for stamping outbound requests
    pub fn token_with_epoch(&self) -> (Option<String>, u64) {
        let epoch = self.lock();
        let token = self
            .inner
            .storage
            .get_item(TOKEN_KEY)
            .filter(|token| !token.is_empty());
        (token, *epoch)
    }

    /// Clear the session only if it is still the one observed at `epoch`.
    ///
    /// Returns true for exactly one caller per session.
    pub fn invalidate_if_current(&self, epoch: u64) -> bool {
        let mut current = self.lock();
        if *current != epoch {
            return false;
        }
        self.remove_entries(&mut current);
        true
    }

    fn remove_entries(&self, epoch: &mut u64) {
        for key in [TOKEN_KEY, USER_KEY] {
            if let Err(e) = self.inner.storage.remove_item(key) {
                tracing::error!("Failed to remove '{}' from session storage: {}", key, e);
            }
        }
        *epoch += 1;
        self.inner.users.send_replace(None);
        tracing::debug!("Session cleared (epoch {})", *epoch);
    }

    /// Observe profile replacements
    pub fn subscribe(&self) -> watch::Receiver<Option<UserProfile>> {
        self.inner.users.subscribe()
    }
}

impl std::fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenStore")
            .field("epoch", &self.epoch())
            .field("logged_in", &self.get().is_some())
            .finish()
    }
}

fn read_user(storage: &dyn KeyValueStorage) -> Option<UserProfile> {
    let raw = storage.get_item(USER_KEY)?;
    match serde_json::from_str(&raw) {
        Ok(user) => Some(user),
        Err(e) => {
            tracing::warn!("Failed to parse stored user profile: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    fn user(role: &str) -> UserProfile {
        UserProfile::with_role(role)
    }

    /// Memory storage whose profile writes can be made to fail
    #[derive(Default)]
    struct FlakyStorage {
        inner: MemoryStorage,
        fail_user_writes: Arc<AtomicBool>,
    }

    impl KeyValueStorage for FlakyStorage {
        fn get_item(&self, key: &str) -> Option<String> {
            self.inner.get_item(key)
        }

        fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
            if key == USER_KEY && self.fail_user_writes.load(Ordering::SeqCst) {
                return Err(StorageError::Io(std::io::Error::other("disk full")));
            }
            self.inner.set_item(key, value)
        }

        fn remove_item(&self, key: &str) -> Result<(), StorageError> {
            self.inner.remove_item(key)
        }
    }

    #[test]
    fn failed_set_keeps_previous_session_intact() {
        let storage = FlakyStorage::default();
        let fail = storage.fail_user_writes.clone();
        let store = TokenStore::new(storage);
        let rx = store.subscribe();

        store.set("admin-token", &user("admin")).unwrap();
        let epoch = store.epoch();

        fail.store(true, Ordering::SeqCst);
        assert!(store.set("user-token", &user("user")).is_err());

        assert_eq!(store.get().as_deref(), Some("admin-token"));
        assert_eq!(store.get_user().map(|u| u.role), Some("admin".to_string()));
        assert_eq!(store.epoch(), epoch);
        assert_eq!(rx.borrow().as_ref().map(|u| u.role.clone()), Some("admin".to_string()));
    }

    #[test]
    fn failed_first_set_leaves_no_token_behind() {
        let storage = FlakyStorage::default();
        storage.fail_user_writes.store(true, Ordering::SeqCst);
        let store = TokenStore::new(storage);

        assert!(store.set("user-token", &user("user")).is_err());
        assert_eq!(store.get(), None);
        assert_eq!(store.get_user(), None);
        assert_eq!(store.epoch(), 0);
    }

    #[test]
    fn token_presence_tracks_last_operation() {
        let store = TokenStore::in_memory();
        assert_eq!(store.get(), None);

        store.set("t1", &user("user")).unwrap();
        assert_eq!(store.get().as_deref(), Some("t1"));

        store.clear();
        assert_eq!(store.get(), None);
        assert_eq!(store.get_user(), None);

        store.set("t2", &user("admin")).unwrap();
        store.set("t3", &user("admin")).unwrap();
        assert_eq!(store.get().as_deref(), Some("t3"));
    }

    #[test]
    fn empty_token_reads_as_absent() {
        let store = TokenStore::in_memory();
        store.set("", &user("user")).unwrap();
        assert_eq!(store.get(), None);
    }

    #[test]
    fn corrupted_user_reads_as_absent() {
        let storage = MemoryStorage::new();
        storage.set_item(TOKEN_KEY, "tok").unwrap();
        storage.set_item(USER_KEY, "{broken").unwrap();

        let store = TokenStore::new(storage);
        assert_eq!(store.get().as_deref(), Some("tok"));
        assert_eq!(store.get_user(), None);
    }

    #[test]
    fn invalidate_only_once_per_epoch() {
        let store = TokenStore::in_memory();
        store.set("tok", &user("user")).unwrap();
        let epoch = store.epoch();

        assert!(store.invalidate_if_current(epoch));
        assert!(!store.invalidate_if_current(epoch));
        assert_eq!(store.get(), None);
    }

    #[test]
    fn stale_epoch_does_not_clear_new_session() {
        let store = TokenStore::in_memory();
        store.set("old", &user("user")).unwrap();
        let stale = store.epoch();
        store.set("new", &user("user")).unwrap();

        assert!(!store.invalidate_if_current(stale));
        assert_eq!(store.get().as_deref(), Some("new"));
    }

    #[test]
    fn subscribers_see_replacements() {
        let store = TokenStore::in_memory();
        let rx = store.subscribe();
        assert_eq!(*rx.borrow(), None);

        store.set("tok", &user("admin")).unwrap();
        assert_eq!(rx.borrow().as_ref().map(|u| u.role.clone()), Some("admin".to_string()));

        store.update_user(Some(&user("user"))).unwrap();
        assert_eq!(rx.borrow().as_ref().map(|u| u.role.clone()), Some("user".to_string()));

        store.clear();
        assert_eq!(*rx.borrow(), None);
    }
}
