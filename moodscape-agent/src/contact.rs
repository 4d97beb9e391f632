//! Safety-contact storage.
//!
//! The contact address lives in remote per-user storage; the core only
//! reads a cached value at session start and writes an updated one on
//! explicit save. The store is a trait seam so tests and embedders can
//! supply their own.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::backend::traits::BackendError;

#[cfg(feature = "typescript")]
use ts_rs::TS;

/// A third-party safety contact for one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct SafetyContact {
    /// Contact email address (non-empty; not otherwise validated)
    pub email: String,
    /// User this contact belongs to
    pub owner_user_id: String,
}

impl SafetyContact {
    /// Create a contact; returns None for an empty trimmed address.
    pub fn new(email: impl Into<String>, owner_user_id: impl Into<String>) -> Option<Self> {
        let email = email.into();
        if email.trim().is_empty() {
            return None;
        }
        Some(Self {
            email,
            owner_user_id: owner_user_id.into(),
        })
    }
}

/// Remote per-user storage for the safety contact.
#[async_trait]
pub trait ContactStore: Send + Sync {
    /// Load the saved contact for a user, if any.
    async fn load(&self, user_id: &str) -> Result<Option<SafetyContact>, BackendError>;

    /// Save or replace the contact for its owner.
    async fn save(&self, contact: &SafetyContact) -> Result<(), BackendError>;
}

/// In-memory contact store for tests and offline use.
#[derive(Default)]
pub struct MemoryContactStore {
    contacts: RwLock<HashMap<String, String>>,
}

impl MemoryContactStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-seeded with one contact.
    pub fn with_contact(contact: SafetyContact) -> Self {
        let mut contacts = HashMap::new();
        contacts.insert(contact.owner_user_id, contact.email);
        Self {
            contacts: RwLock::new(contacts),
        }
    }
}

#[async_trait]
impl ContactStore for MemoryContactStore {
    async fn load(&self, user_id: &str) -> Result<Option<SafetyContact>, BackendError> {
        let contacts = self.contacts.read().await;
        Ok(contacts.get(user_id).map(|email| SafetyContact {
            email: email.clone(),
            owner_user_id: user_id.to_string(),
        }))
    }

    async fn save(&self, contact: &SafetyContact) -> Result<(), BackendError> {
        let mut contacts = self.contacts.write().await;
        contacts.insert(contact.owner_user_id.clone(), contact.email.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_email_rejected() {
        assert!(SafetyContact::new("  ", "user-1").is_none());
        assert!(SafetyContact::new("friend@example.com", "user-1").is_some());
    }

    #[tokio::test]
    async fn test_memory_store_roundtrip() {
        let store = MemoryContactStore::new();
        assert!(store.load("user-1").await.unwrap().is_none());

        let contact = SafetyContact::new("friend@example.com", "user-1").unwrap();
        store.save(&contact).await.unwrap();

        let loaded = store.load("user-1").await.unwrap().unwrap();
        assert_eq!(loaded, contact);
    }
}
