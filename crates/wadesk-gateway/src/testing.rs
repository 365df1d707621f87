//! Test doubles for the store and provider seams.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::json;
use tokio::sync::Mutex;
use wadesk_channels::{ChannelError, Provider, SendResponse};
use wadesk_core::{
    Contact, ContactFilter, ContactStatus, DashboardStats, Message, NewContact, NewMessage,
};
use wadesk_store::{MemoryStore, Store, StoreError};

type SentTemplate = (String, String, String, Vec<String>);

/// Provider that records calls and either accepts or rejects every send.
pub struct FakeProvider {
    reject_with: Option<String>,
    message_id: String,
    sent: Mutex<Vec<(String, String)>>,
    templates: Mutex<Vec<SentTemplate>>,
}

impl FakeProvider {
    pub fn accepting(message_id: &str) -> Self {
        Self {
            reject_with: None,
            message_id: message_id.to_string(),
            sent: Mutex::new(Vec::new()),
            templates: Mutex::new(Vec::new()),
        }
    }

    pub fn rejecting(message: &str) -> Self {
        Self {
            reject_with: Some(message.to_string()),
            ..Self::accepting("")
        }
    }

    pub async fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().await.clone()
    }

    pub async fn templates(&self) -> Vec<SentTemplate> {
        self.templates.lock().await.clone()
    }

    fn respond(&self) -> Result<SendResponse, ChannelError> {
        match &self.reject_with {
            Some(message) => Err(ChannelError::api(400, message.clone())),
            None => Ok(SendResponse::from_raw(json!({
                "messaging_product": "whatsapp",
                "messages": [{ "id": self.message_id }]
            }))),
        }
    }
}

#[async_trait]
impl Provider for FakeProvider {
    async fn send_text(&self, to: &str, body: &str) -> Result<SendResponse, ChannelError> {
        let response = self.respond()?;
        self.sent.lock().await.push((to.to_string(), body.to_string()));
        Ok(response)
    }

    async fn send_template(
        &self,
        to: &str,
        name: &str,
        language: &str,
        params: &[String],
    ) -> Result<SendResponse, ChannelError> {
        let response = self.respond()?;
        self.templates.lock().await.push((
            to.to_string(),
            name.to_string(),
            language.to_string(),
            params.to_vec(),
        ));
        Ok(response)
    }
}

/// Store that fails selected operations and delegates the rest.
pub struct FailingStore {
    inner: MemoryStore,
    fail_reads: bool,
    fail_contact_writes: bool,
    fail_message_writes: bool,
}

impl FailingStore {
    /// Every read fails.
    pub fn lookups() -> Self {
        Self::with(true, false, false)
    }

    /// Contact and message inserts fail.
    pub fn writes() -> Self {
        Self::with(false, true, true)
    }

    /// Only message inserts fail.
    pub fn messages() -> Self {
        Self::with(false, false, true)
    }

    fn with(fail_reads: bool, fail_contact_writes: bool, fail_message_writes: bool) -> Self {
        Self {
            inner: MemoryStore::new(),
            fail_reads,
            fail_contact_writes,
            fail_message_writes,
        }
    }

    pub fn inner(&self) -> &MemoryStore {
        &self.inner
    }

    fn check(&self, fail: bool) -> Result<(), StoreError> {
        if fail {
            Err(StoreError::Unavailable("injected failure".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl Store for FailingStore {
    async fn get_contact(&self, id: &str) -> Result<Option<Contact>, StoreError> {
        self.check(self.fail_reads)?;
        self.inner.get_contact(id).await
    }

    async fn find_contact_by_phone(&self, phone: &str) -> Result<Option<Contact>, StoreError> {
        self.check(self.fail_reads)?;
        self.inner.find_contact_by_phone(phone).await
    }

    async fn create_contact(&self, contact: NewContact) -> Result<Contact, StoreError> {
        self.check(self.fail_contact_writes)?;
        self.inner.create_contact(contact).await
    }

    async fn update_contact_status(
        &self,
        id: &str,
        status: ContactStatus,
    ) -> Result<Option<Contact>, StoreError> {
        self.check(self.fail_contact_writes)?;
        self.inner.update_contact_status(id, status).await
    }

    async fn list_contacts(&self, filter: &ContactFilter) -> Result<Vec<Contact>, StoreError> {
        self.check(self.fail_reads)?;
        self.inner.list_contacts(filter).await
    }

    async fn create_message(&self, message: NewMessage) -> Result<Message, StoreError> {
        self.check(self.fail_message_writes)?;
        self.inner.create_message(message).await
    }

    async fn find_message_by_external_id(&self, id: &str) -> Result<Option<Message>, StoreError> {
        self.check(self.fail_reads)?;
        self.inner.find_message_by_external_id(id).await
    }

    async fn list_messages(
        &self,
        contact_id: Option<&str>,
        limit: Option<usize>,
    ) -> Result<Vec<Message>, StoreError> {
        self.check(self.fail_reads)?;
        self.inner.list_messages(contact_id, limit).await
    }

    async fn stats(&self, today: NaiveDate) -> Result<DashboardStats, StoreError> {
        self.check(self.fail_reads)?;
        self.inner.stats(today).await
    }
}

/// Store where another writer always creates the contact between our lookup
/// and our insert.
pub struct RacingStore {
    inner: MemoryStore,
    winner: Mutex<Option<String>>,
}

impl RacingStore {
    pub fn new() -> Self {
        Self {
            inner: MemoryStore::new(),
            winner: Mutex::new(None),
        }
    }

    pub async fn winner_id(&self) -> String {
        self.winner.lock().await.clone().unwrap_or_default()
    }
}

#[async_trait]
impl Store for RacingStore {
    async fn get_contact(&self, id: &str) -> Result<Option<Contact>, StoreError> {
        self.inner.get_contact(id).await
    }

    async fn find_contact_by_phone(&self, phone: &str) -> Result<Option<Contact>, StoreError> {
        self.inner.find_contact_by_phone(phone).await
    }

    async fn create_contact(&self, contact: NewContact) -> Result<Contact, StoreError> {
        let winner = self
            .inner
            .create_contact(NewContact::new(contact.phone.clone(), "Concurrent"))
            .await?;
        *self.winner.lock().await = Some(winner.id);
        self.inner.create_contact(contact).await
    }

    async fn update_contact_status(
        &self,
        id: &str,
        status: ContactStatus,
    ) -> Result<Option<Contact>, StoreError> {
        self.inner.update_contact_status(id, status).await
    }

    async fn list_contacts(&self, filter: &ContactFilter) -> Result<Vec<Contact>, StoreError> {
        self.inner.list_contacts(filter).await
    }

    async fn create_message(&self, message: NewMessage) -> Result<Message, StoreError> {
        self.inner.create_message(message).await
    }

    async fn find_message_by_external_id(&self, id: &str) -> Result<Option<Message>, StoreError> {
        self.inner.find_message_by_external_id(id).await
    }

    async fn list_messages(
        &self,
        contact_id: Option<&str>,
        limit: Option<usize>,
    ) -> Result<Vec<Message>, StoreError> {
        self.inner.list_messages(contact_id, limit).await
    }

    async fn stats(&self, today: NaiveDate) -> Result<DashboardStats, StoreError> {
        self.inner.stats(today).await
    }
}
