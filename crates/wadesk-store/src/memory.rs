//! In-memory store.

use crate::store::Store;
use crate::{Result, StoreError};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use tokio::sync::RwLock;
use wadesk_core::{
    Contact, ContactFilter, ContactStatus, DashboardStats, Message, NewContact, NewMessage,
};

#[derive(Default)]
struct Tables {
    contacts: Vec<Contact>,
    messages: Vec<Message>,
}

/// In-memory store with the same uniqueness rules as [`crate::SqliteStore`].
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored contacts.
    pub async fn contact_count(&self) -> usize {
        self.tables.read().await.contacts.len()
    }

    /// Number of stored messages.
    pub async fn message_count(&self) -> usize {
        self.tables.read().await.messages.len()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn get_contact(&self, id: &str) -> Result<Option<Contact>> {
        let tables = self.tables.read().await;
        Ok(tables.contacts.iter().find(|c| c.id == id).cloned())
    }

    async fn find_contact_by_phone(&self, phone_normalized: &str) -> Result<Option<Contact>> {
        let tables = self.tables.read().await;
        Ok(tables
            .contacts
            .iter()
            .find(|c| c.phone_normalized == phone_normalized)
            .cloned())
    }

    async fn create_contact(&self, contact: NewContact) -> Result<Contact> {
        let mut tables = self.tables.write().await;
        let phone_normalized = contact.phone_normalized();
        if tables
            .contacts
            .iter()
            .any(|c| c.phone_normalized == phone_normalized)
        {
            return Err(StoreError::DuplicatePhone(phone_normalized));
        }

        let contact = contact.into_contact(Utc::now());
        tables.contacts.push(contact.clone());
        Ok(contact)
    }

    async fn update_contact_status(
        &self,
        id: &str,
        status: ContactStatus,
    ) -> Result<Option<Contact>> {
        let mut tables = self.tables.write().await;
        Ok(tables.contacts.iter_mut().find(|c| c.id == id).map(|c| {
            c.status = status;
            c.updated_at = Utc::now();
            c.clone()
        }))
    }

    async fn list_contacts(&self, filter: &ContactFilter) -> Result<Vec<Contact>> {
        let tables = self.tables.read().await;
        let mut contacts: Vec<Contact> = tables
            .contacts
            .iter()
            .rev()
            .filter(|c| filter.matches(c))
            .cloned()
            .collect();
        // Stable sort keeps later inserts first on equal timestamps
        contacts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(contacts)
    }

    async fn create_message(&self, message: NewMessage) -> Result<Message> {
        let mut tables = self.tables.write().await;
        if !tables.contacts.iter().any(|c| c.id == message.contact_id) {
            return Err(StoreError::MissingContact(message.contact_id));
        }

        let message = message.into_message(Utc::now());
        tables.messages.push(message.clone());
        Ok(message)
    }

    async fn find_message_by_external_id(&self, external_id: &str) -> Result<Option<Message>> {
        let tables = self.tables.read().await;
        Ok(tables
            .messages
            .iter()
            .find(|m| m.whatsapp_message_id.as_deref() == Some(external_id))
            .cloned())
    }

    async fn list_messages(
        &self,
        contact_id: Option<&str>,
        limit: Option<usize>,
    ) -> Result<Vec<Message>> {
        let tables = self.tables.read().await;
        let mut messages: Vec<Message> = match contact_id {
            Some(id) => {
                let mut scoped: Vec<Message> = tables
                    .messages
                    .iter()
                    .filter(|m| m.contact_id == id)
                    .cloned()
                    .collect();
                scoped.sort_by(|a, b| a.sent_at.cmp(&b.sent_at));
                scoped
            }
            None => {
                let mut all: Vec<Message> = tables.messages.iter().rev().cloned().collect();
                all.sort_by(|a, b| b.sent_at.cmp(&a.sent_at));
                all
            }
        };
        if let Some(limit) = limit {
            messages.truncate(limit);
        }
        Ok(messages)
    }

    async fn stats(&self, today: NaiveDate) -> Result<DashboardStats> {
        let tables = self.tables.read().await;
        let mut stats = DashboardStats {
            total_contacts: tables.contacts.len() as u64,
            total_messages: tables.messages.len() as u64,
            today_messages: tables
                .messages
                .iter()
                .filter(|m| m.sent_at.date_naive() == today)
                .count() as u64,
            ..Default::default()
        };
        for contact in &tables.contacts {
            *stats.contacts_by_status.entry(contact.status).or_insert(0) += 1;
        }
        Ok(stats)
    }
}
