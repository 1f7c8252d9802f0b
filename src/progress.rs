//! Learner accounts and coarse per-course progress.
//!
//! `ProgressStore` is the persistence seam (a local key-value store on the
//! device, a remote service, ...). `MemoryProgressStore` keeps everything in
//! memory for development and tests. `ProgressClient` is what one connected
//! client uses: it remembers who is signed in and exposes the
//! sign up / sign in / sign out / current user / update progress contract.
//!
//! Callers treat every failure as non-fatal: log it and carry on.

use std::{collections::BTreeMap, collections::HashMap, sync::Arc};

use async_trait::async_trait;
use serde::Serialize;
use sha2::{Digest, Sha256};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{info, instrument};
use uuid::Uuid;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProgressError {
    #[error("an account already exists for {0}")]
    EmailTaken(String),
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("no user is signed in")]
    NotSignedIn,
    #[error("unknown user {0}")]
    UnknownUser(String),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    /// course id -> percent complete (0..=100)
    pub progress: BTreeMap<String, u8>,
}

#[async_trait]
pub trait ProgressStore: Send + Sync {
    async fn create_user(&self, email: &str, password: &str, name: &str) -> Result<User, ProgressError>;
    async fn authenticate(&self, email: &str, password: &str) -> Result<User, ProgressError>;
    async fn user(&self, user_id: &str) -> Result<User, ProgressError>;
    async fn find_by_email(&self, email: &str) -> Result<User, ProgressError>;
    async fn set_progress(&self, user_id: &str, course_id: &str, percent: u8) -> Result<(), ProgressError>;
}

struct Account {
    user: User,
    password_hash: String,
}

fn hash_password(email: &str, password: &str) -> String {
    let mut h = Sha256::new();
    h.update(email.as_bytes());
    h.update([0u8]);
    h.update(password.as_bytes());
    hex::encode(h.finalize())
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[derive(Default)]
pub struct MemoryProgressStore {
    accounts: RwLock<HashMap<String, Account>>, // keyed by normalized email
}

impl MemoryProgressStore {
    pub fn new() -> Self { Self::default() }
}

#[async_trait]
impl ProgressStore for MemoryProgressStore {
    async fn create_user(&self, email: &str, password: &str, name: &str) -> Result<User, ProgressError> {
        let email = normalize_email(email);
        if email.is_empty() || password.is_empty() {
            return Err(ProgressError::InvalidCredentials);
        }
        let mut accounts = self.accounts.write().await;
        if accounts.contains_key(&email) {
            return Err(ProgressError::EmailTaken(email));
        }
        let user = User {
            id: Uuid::new_v4().to_string(),
            email: email.clone(),
            name: name.trim().to_string(),
            progress: BTreeMap::new(),
        };
        let password_hash = hash_password(&email, password);
        accounts.insert(email, Account { user: user.clone(), password_hash });
        Ok(user)
    }

    async fn authenticate(&self, email: &str, password: &str) -> Result<User, ProgressError> {
        let email = normalize_email(email);
        let accounts = self.accounts.read().await;
        match accounts.get(&email) {
            Some(acc) if acc.password_hash == hash_password(&email, password) => Ok(acc.user.clone()),
            _ => Err(ProgressError::InvalidCredentials),
        }
    }

    async fn user(&self, user_id: &str) -> Result<User, ProgressError> {
        let accounts = self.accounts.read().await;
        accounts
            .values()
            .find(|a| a.user.id == user_id)
            .map(|a| a.user.clone())
            .ok_or_else(|| ProgressError::UnknownUser(user_id.to_string()))
    }

    async fn find_by_email(&self, email: &str) -> Result<User, ProgressError> {
        let email = normalize_email(email);
        let accounts = self.accounts.read().await;
        accounts
            .get(&email)
            .map(|a| a.user.clone())
            .ok_or(ProgressError::UnknownUser(email))
    }

    async fn set_progress(&self, user_id: &str, course_id: &str, percent: u8) -> Result<(), ProgressError> {
        let mut accounts = self.accounts.write().await;
        let acc = accounts
            .values_mut()
            .find(|a| a.user.id == user_id)
            .ok_or_else(|| ProgressError::UnknownUser(user_id.to_string()))?;
        acc.user.progress.insert(course_id.to_string(), percent.min(100));
        Ok(())
    }
}

/// Per-connection view of the store: who is signed in right now.
pub struct ProgressClient {
    store: Arc<dyn ProgressStore>,
    current: Option<String>,
}

impl ProgressClient {
    pub fn new(store: Arc<dyn ProgressStore>) -> Self {
        Self { store, current: None }
    }

    #[instrument(level = "info", skip(self, password, name), fields(%email))]
    pub async fn sign_up(&mut self, email: &str, password: &str, name: &str) -> Result<User, ProgressError> {
        let user = self.store.create_user(email, password, name).await?;
        info!(target: "progress", user_id = %user.id, "Account created");
        self.current = Some(user.id.clone());
        Ok(user)
    }

    #[instrument(level = "info", skip(self, password), fields(%email))]
    pub async fn sign_in(&mut self, email: &str, password: &str) -> Result<User, ProgressError> {
        let user = self.store.authenticate(email, password).await?;
        info!(target: "progress", user_id = %user.id, "Signed in");
        self.current = Some(user.id.clone());
        Ok(user)
    }

    pub fn sign_out(&mut self) -> Result<(), ProgressError> {
        self.current.take().map(|_| ()).ok_or(ProgressError::NotSignedIn)
    }

    pub async fn current_user(&self) -> Option<User> {
        let id = self.current.as_deref()?;
        self.store.user(id).await.ok()
    }

    /// Persist a course percentage for the signed-in user. Values above 100 are
    /// clamped and a stored value is never lowered.
    #[instrument(level = "debug", skip(self))]
    pub async fn update_progress(&self, course_id: &str, percent: u8) -> Result<(), ProgressError> {
        let id = self.current.as_deref().ok_or(ProgressError::NotSignedIn)?;
        let stored = self.store.user(id).await?.progress.get(course_id).copied().unwrap_or(0);
        let percent = percent.min(100).max(stored);
        self.store.set_progress(id, course_id, percent).await
    }
}

/// Share of `course_activities` found in `solved`, as a whole percentage.
pub fn course_percent(course_activities: &[&str], solved: &std::collections::HashSet<String>) -> u8 {
    if course_activities.is_empty() {
        return 0;
    }
    let done = course_activities.iter().filter(|a| solved.contains(**a)).count();
    ((done * 100) / course_activities.len()) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn client() -> ProgressClient {
        ProgressClient::new(Arc::new(MemoryProgressStore::new()))
    }

    #[tokio::test]
    async fn test_sign_up_then_sign_in() {
        let store: Arc<dyn ProgressStore> = Arc::new(MemoryProgressStore::new());
        let mut a = ProgressClient::new(store.clone());
        let created = a.sign_up("Ada@Example.org ", "pw", "Ada").await.unwrap();
        assert_eq!(created.email, "ada@example.org");

        let mut b = ProgressClient::new(store);
        assert_eq!(b.sign_in("ada@example.org", "wrong").await, Err(ProgressError::InvalidCredentials));
        let user = b.sign_in("ada@example.org", "pw").await.unwrap();
        assert_eq!(user.id, created.id);
        assert_eq!(b.current_user().await.map(|u| u.name), Some("Ada".into()));
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let mut c = client();
        c.sign_up("a@b.c", "pw", "A").await.unwrap();
        assert!(matches!(c.sign_up("A@B.C", "pw", "A").await, Err(ProgressError::EmailTaken(_))));
    }

    #[tokio::test]
    async fn test_progress_requires_user_and_is_clamped() {
        let mut c = client();
        assert_eq!(c.update_progress("svt-6", 50).await, Err(ProgressError::NotSignedIn));
        c.sign_up("a@b.c", "pw", "A").await.unwrap();
        c.update_progress("svt-6", 250).await.unwrap();
        let user = c.current_user().await.unwrap();
        assert_eq!(user.progress.get("svt-6"), Some(&100));
    }

    #[tokio::test]
    async fn test_progress_never_goes_down() {
        let mut c = client();
        c.sign_up("a@b.c", "pw", "A").await.unwrap();
        c.update_progress("svt-6", 66).await.unwrap();
        c.update_progress("svt-6", 33).await.unwrap();
        let user = c.current_user().await.unwrap();
        assert_eq!(user.progress.get("svt-6"), Some(&66));
    }

    #[tokio::test]
    async fn test_sign_out() {
        let mut c = client();
        assert_eq!(c.sign_out(), Err(ProgressError::NotSignedIn));
        c.sign_up("a@b.c", "pw", "A").await.unwrap();
        assert!(c.sign_out().is_ok());
        assert!(c.current_user().await.is_none());
    }

    #[test]
    fn test_course_percent() {
        let solved: HashSet<String> = ["a".to_string()].into_iter().collect();
        assert_eq!(course_percent(&["a", "b", "c"], &solved), 33);
        assert_eq!(course_percent(&[], &solved), 0);
        assert_eq!(course_percent(&["a"], &solved), 100);
    }
}
