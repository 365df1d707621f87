//! The datastore seam.

use crate::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use wadesk_core::{
    Contact, ContactFilter, ContactStatus, DashboardStats, Message, NewContact, NewMessage,
};

/// Trait for contact and message stores.
///
/// Implementations assign ids and timestamps. Contacts are unique on their
/// normalized phone; a second [`Store::create_contact`] for the same digits
/// fails with [`crate::StoreError::DuplicatePhone`].
#[async_trait]
pub trait Store: Send + Sync {
    /// Get a contact by id.
    async fn get_contact(&self, id: &str) -> Result<Option<Contact>>;

    /// Exact lookup on the digits-only phone.
    async fn find_contact_by_phone(&self, phone_normalized: &str) -> Result<Option<Contact>>;

    /// Insert a contact.
    async fn create_contact(&self, contact: NewContact) -> Result<Contact>;

    /// Change a contact's status, returning the updated row if it exists.
    async fn update_contact_status(
        &self,
        id: &str,
        status: ContactStatus,
    ) -> Result<Option<Contact>>;

    /// List contacts, newest first.
    async fn list_contacts(&self, filter: &ContactFilter) -> Result<Vec<Contact>>;

    /// Append a message. The owning contact must exist.
    async fn create_message(&self, message: NewMessage) -> Result<Message>;

    /// First stored message carrying this provider message id.
    async fn find_message_by_external_id(&self, external_id: &str) -> Result<Option<Message>>;

    /// List messages.
    ///
    /// Scoped to a contact the conversation is returned oldest first.
    /// Unscoped, the most recent messages across all contacts come first.
    async fn list_messages(
        &self,
        contact_id: Option<&str>,
        limit: Option<usize>,
    ) -> Result<Vec<Message>>;

    /// Totals, today's message count and contacts per status.
    async fn stats(&self, today: NaiveDate) -> Result<DashboardStats>;
}
