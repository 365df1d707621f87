//! Phone-to-contact reconciliation.

use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};
use wadesk_core::{phone, Contact, NewContact};
use wadesk_store::{Store, StoreError};

use crate::error::GatewayError;

/// How the caller identifies a contact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContactRef {
    /// An existing contact id.
    Id(String),
    /// A phone number, with the name to use if the contact has to be created.
    Phone { phone: String, name: Option<String> },
}

impl ContactRef {
    /// Reference by phone using the default placeholder name.
    pub fn phone(phone: impl Into<String>) -> Self {
        Self::Phone {
            phone: phone.into(),
            name: None,
        }
    }

    /// Reference by phone with an explicit name for creation.
    pub fn phone_named(phone: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Phone {
            phone: phone.into(),
            name: Some(name.into()),
        }
    }
}

/// A resolved contact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub contact: Contact,
    /// Whether this call created the contact.
    pub created: bool,
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Invalid phone number: '{0}'")]
    InvalidPhone(String),

    #[error("Contact not found: {0}")]
    NotFound(String),

    #[error("Contact lookup failed: {0}")]
    Lookup(#[source] StoreError),

    #[error("Contact creation failed: {0}")]
    Create(#[source] StoreError),
}

impl From<ResolveError> for GatewayError {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::InvalidPhone(_) => Self::BadRequest(err.to_string()),
            ResolveError::NotFound(_) => Self::NotFound(err.to_string()),
            ResolveError::Lookup(_) | ResolveError::Create(_) => Self::Store(err.to_string()),
        }
    }
}

/// Finds the contact for a phone or id, creating it on first sight.
///
/// Contacts are matched exactly on their digits-only phone. Creation races
/// are settled by the store's uniqueness rule: the loser re-reads the winner's
/// row, so resolving the same phone concurrently yields one contact.
#[derive(Clone)]
pub struct ContactResolver {
    store: Arc<dyn Store>,
}

impl ContactResolver {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn resolve(&self, reference: ContactRef) -> Result<Resolved, ResolveError> {
        match reference {
            ContactRef::Id(id) => {
                let contact = self
                    .store
                    .get_contact(&id)
                    .await
                    .map_err(ResolveError::Lookup)?
                    .ok_or(ResolveError::NotFound(id))?;
                Ok(Resolved {
                    contact,
                    created: false,
                })
            }
            ContactRef::Phone { phone, name } => self.resolve_phone(phone, name).await,
        }
    }

    async fn resolve_phone(
        &self,
        raw_phone: String,
        name: Option<String>,
    ) -> Result<Resolved, ResolveError> {
        let normalized = phone::normalize(&raw_phone);
        if normalized.is_empty() {
            return Err(ResolveError::InvalidPhone(raw_phone));
        }

        if let Some(contact) = self.lookup(&normalized).await? {
            return Ok(Resolved {
                contact,
                created: false,
            });
        }

        let name = name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| phone::default_contact_name(&raw_phone));
        match self
            .store
            .create_contact(NewContact::new(raw_phone, name))
            .await
        {
            Ok(contact) => {
                info!(contact_id = %contact.id, phone = %normalized, "Created contact");
                Ok(Resolved {
                    contact,
                    created: true,
                })
            }
            Err(err) if err.is_duplicate_phone() => {
                debug!(phone = %normalized, "Contact created concurrently, re-reading");
                let contact = self
                    .lookup(&normalized)
                    .await?
                    .ok_or(ResolveError::Create(err))?;
                Ok(Resolved {
                    contact,
                    created: false,
                })
            }
            Err(err) => Err(ResolveError::Create(err)),
        }
    }

    async fn lookup(&self, normalized: &str) -> Result<Option<Contact>, ResolveError> {
        self.store
            .find_contact_by_phone(normalized)
            .await
            .map_err(ResolveError::Lookup)
    }
}
