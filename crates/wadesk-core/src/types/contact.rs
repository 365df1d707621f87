//! Contact types.

use crate::error::Error;
use crate::phone;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Where a contact stands in the enrollment funnel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactStatus {
    /// Interested; every new contact starts here.
    #[default]
    Interesado,
    /// Enrolled.
    Inscrito,
    /// Declined.
    Rechazado,
    /// Rescheduled.
    Reagendados,
}

impl ContactStatus {
    /// All statuses, in funnel order.
    pub const ALL: [ContactStatus; 4] = [
        ContactStatus::Interesado,
        ContactStatus::Inscrito,
        ContactStatus::Rechazado,
        ContactStatus::Reagendados,
    ];

    /// Wire/storage representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Interesado => "interesado",
            Self::Inscrito => "inscrito",
            Self::Rechazado => "rechazado",
            Self::Reagendados => "reagendados",
        }
    }
}

impl fmt::Display for ContactStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContactStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "interesado" => Ok(Self::Interesado),
            "inscrito" => Ok(Self::Inscrito),
            "rechazado" => Ok(Self::Rechazado),
            "reagendados" => Ok(Self::Reagendados),
            other => Err(Error::unknown("contact status", other)),
        }
    }
}

/// A person we exchange WhatsApp messages with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    /// Unique identifier, assigned on creation.
    pub id: String,

    /// Phone number as first seen.
    pub phone: String,

    /// Digits-only phone; the correlation key for inbound and outbound traffic.
    pub phone_normalized: String,

    /// Display name.
    pub name: String,

    /// Funnel status.
    pub status: ContactStatus,

    /// Creation timestamp.
    pub created_at: DateTime<Utc>,

    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Fields supplied when creating a contact; the store fills in the rest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewContact {
    pub phone: String,
    pub name: String,
    pub status: ContactStatus,
}

impl NewContact {
    /// A contact with the given name and the default status.
    pub fn new(phone: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            phone: phone.into(),
            name: name.into(),
            status: ContactStatus::default(),
        }
    }

    /// A contact named `Usuario <phone>`.
    pub fn placeholder(phone: impl Into<String>) -> Self {
        let phone = phone.into();
        let name = phone::default_contact_name(&phone);
        Self::new(phone, name)
    }

    /// Set the status.
    pub fn with_status(mut self, status: ContactStatus) -> Self {
        self.status = status;
        self
    }

    /// Digits-only form of the phone.
    pub fn phone_normalized(&self) -> String {
        phone::normalize(&self.phone)
    }

    /// Materialize the contact with a fresh id and timestamps.
    pub fn into_contact(self, now: DateTime<Utc>) -> Contact {
        let phone_normalized = self.phone_normalized();
        Contact {
            id: uuid::Uuid::new_v4().to_string(),
            phone: self.phone,
            phone_normalized,
            name: self.name,
            status: self.status,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Filter for listing contacts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactFilter {
    /// Only contacts with this status.
    pub status: Option<ContactStatus>,

    /// Case-insensitive substring over name and phone.
    pub search: Option<String>,
}

impl ContactFilter {
    /// Check a contact against the filter.
    pub fn matches(&self, contact: &Contact) -> bool {
        if let Some(status) = self.status {
            if contact.status != status {
                return false;
            }
        }
        match self.search.as_deref().map(str::trim) {
            Some(needle) if !needle.is_empty() => {
                let needle = needle.to_lowercase();
                contact.name.to_lowercase().contains(&needle)
                    || contact.phone.to_lowercase().contains(&needle)
            }
            _ => true,
        }
    }
}
