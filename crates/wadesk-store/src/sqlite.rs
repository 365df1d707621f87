//! SQLite-backed store.

use crate::store::Store;
use crate::{Result, StoreError};
use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, SecondsFormat, SubsecRound, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use tracing::{debug, info};
use wadesk_core::{
    Contact, ContactFilter, ContactStatus, DashboardStats, Direction, Message, MessageStatus,
    NewContact, NewMessage,
};

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS contacts (
        id               TEXT PRIMARY KEY,
        phone            TEXT NOT NULL,
        phone_normalized TEXT NOT NULL,
        name             TEXT NOT NULL,
        status           TEXT NOT NULL DEFAULT 'interesado',
        created_at       TEXT NOT NULL,
        updated_at       TEXT NOT NULL
    )",
    "CREATE UNIQUE INDEX IF NOT EXISTS idx_contacts_phone_normalized
        ON contacts (phone_normalized)",
    "CREATE TABLE IF NOT EXISTS messages (
        id                  TEXT PRIMARY KEY,
        contact_id          TEXT NOT NULL REFERENCES contacts (id),
        content             TEXT NOT NULL,
        direction           TEXT NOT NULL,
        status              TEXT NOT NULL,
        whatsapp_message_id TEXT,
        sent_at             TEXT NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS idx_messages_contact_sent
        ON messages (contact_id, sent_at)",
    "CREATE INDEX IF NOT EXISTS idx_messages_whatsapp_id
        ON messages (whatsapp_message_id)",
];

#[derive(sqlx::FromRow)]
struct ContactRow {
    id: String,
    phone: String,
    phone_normalized: String,
    name: String,
    status: String,
    created_at: String,
    updated_at: String,
}

impl TryFrom<ContactRow> for Contact {
    type Error = StoreError;

    fn try_from(row: ContactRow) -> Result<Self> {
        Ok(Contact {
            status: ContactStatus::from_str(&row.status)
                .map_err(|e| StoreError::Decode(e.to_string()))?,
            created_at: parse_timestamp(&row.created_at)?,
            updated_at: parse_timestamp(&row.updated_at)?,
            id: row.id,
            phone: row.phone,
            phone_normalized: row.phone_normalized,
            name: row.name,
        })
    }
}

#[derive(sqlx::FromRow)]
struct MessageRow {
    id: String,
    contact_id: String,
    content: String,
    direction: String,
    status: String,
    whatsapp_message_id: Option<String>,
    sent_at: String,
}

impl TryFrom<MessageRow> for Message {
    type Error = StoreError;

    fn try_from(row: MessageRow) -> Result<Self> {
        Ok(Message {
            direction: Direction::from_str(&row.direction)
                .map_err(|e| StoreError::Decode(e.to_string()))?,
            status: MessageStatus::from_str(&row.status)
                .map_err(|e| StoreError::Decode(e.to_string()))?,
            sent_at: parse_timestamp(&row.sent_at)?,
            id: row.id,
            contact_id: row.contact_id,
            content: row.content,
            whatsapp_message_id: row.whatsapp_message_id,
        })
    }
}

/// Fixed-width UTC timestamps so text ordering matches time ordering.
fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Current time at the precision the database keeps.
fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| StoreError::Decode(format!("timestamp '{}': {}", raw, e)))
}

/// Map driver errors to the store taxonomy.
fn classify(err: sqlx::Error, phone_normalized: Option<&str>, contact_id: Option<&str>) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            if let Some(phone) = phone_normalized {
                return StoreError::DuplicatePhone(phone.to_string());
            }
        }
        if db_err.is_foreign_key_violation() {
            if let Some(id) = contact_id {
                return StoreError::MissingContact(id.to_string());
            }
        }
    }
    StoreError::Database(err)
}

/// Contact and message store on SQLite.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Wrap an existing pool. Call [`SqliteStore::init`] before use.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open (creating if missing) the database at `url` and ensure the schema.
    pub async fn connect(url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);

        // Each in-memory connection is its own database
        let in_memory = url.contains(":memory:") || url.contains("mode=memory");
        let pool = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(options)
                .await?
        } else {
            SqlitePoolOptions::new()
                .max_connections(5)
                .connect_with(options)
                .await?
        };

        Self::init(&pool).await?;
        info!("Opened SQLite store at {}", url);
        Ok(Self { pool })
    }

    /// Create tables and indexes if they do not exist.
    pub async fn init(pool: &SqlitePool) -> Result<()> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(pool).await?;
        }
        debug!("SQLite schema ready");
        Ok(())
    }

    /// The underlying pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl Store for SqliteStore {
    async fn get_contact(&self, id: &str) -> Result<Option<Contact>> {
        let row = sqlx::query_as::<_, ContactRow>(
            "SELECT id, phone, phone_normalized, name, status, created_at, updated_at
             FROM contacts WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Contact::try_from).transpose()
    }

    async fn find_contact_by_phone(&self, phone_normalized: &str) -> Result<Option<Contact>> {
        let row = sqlx::query_as::<_, ContactRow>(
            "SELECT id, phone, phone_normalized, name, status, created_at, updated_at
             FROM contacts WHERE phone_normalized = ?",
        )
        .bind(phone_normalized)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Contact::try_from).transpose()
    }

    async fn create_contact(&self, contact: NewContact) -> Result<Contact> {
        let contact = contact.into_contact(now());

        sqlx::query(
            "INSERT INTO contacts
             (id, phone, phone_normalized, name, status, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&contact.id)
        .bind(&contact.phone)
        .bind(&contact.phone_normalized)
        .bind(&contact.name)
        .bind(contact.status.as_str())
        .bind(format_timestamp(&contact.created_at))
        .bind(format_timestamp(&contact.updated_at))
        .execute(&self.pool)
        .await
        .map_err(|e| classify(e, Some(&contact.phone_normalized), None))?;

        Ok(contact)
    }

    async fn update_contact_status(
        &self,
        id: &str,
        status: ContactStatus,
    ) -> Result<Option<Contact>> {
        let result = sqlx::query("UPDATE contacts SET status = ?, updated_at = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(format_timestamp(&now()))
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_contact(id).await
    }

    async fn list_contacts(&self, filter: &ContactFilter) -> Result<Vec<Contact>> {
        let search = filter
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| format!("%{}%", s.to_lowercase()));

        let rows = sqlx::query_as::<_, ContactRow>(
            "SELECT id, phone, phone_normalized, name, status, created_at, updated_at
             FROM contacts
             WHERE (?1 IS NULL OR status = ?1)
               AND (?2 IS NULL OR lower(name) LIKE ?2 OR lower(phone) LIKE ?2)
             ORDER BY created_at DESC, rowid DESC",
        )
        .bind(filter.status.map(|s| s.as_str()))
        .bind(search)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Contact::try_from).collect()
    }

    async fn create_message(&self, message: NewMessage) -> Result<Message> {
        let message = message.into_message(now());

        sqlx::query(
            "INSERT INTO messages
             (id, contact_id, content, direction, status, whatsapp_message_id, sent_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&message.id)
        .bind(&message.contact_id)
        .bind(&message.content)
        .bind(message.direction.as_str())
        .bind(message.status.as_str())
        .bind(&message.whatsapp_message_id)
        .bind(format_timestamp(&message.sent_at))
        .execute(&self.pool)
        .await
        .map_err(|e| classify(e, None, Some(&message.contact_id)))?;

        Ok(message)
    }

    async fn find_message_by_external_id(&self, external_id: &str) -> Result<Option<Message>> {
        let row = sqlx::query_as::<_, MessageRow>(
            "SELECT id, contact_id, content, direction, status, whatsapp_message_id, sent_at
             FROM messages WHERE whatsapp_message_id = ?
             ORDER BY sent_at ASC, rowid ASC
             LIMIT 1",
        )
        .bind(external_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Message::try_from).transpose()
    }

    async fn list_messages(
        &self,
        contact_id: Option<&str>,
        limit: Option<usize>,
    ) -> Result<Vec<Message>> {
        // SQLite treats a negative LIMIT as unbounded
        let limit = limit.map(|l| l as i64).unwrap_or(-1);

        let rows = match contact_id {
            Some(id) => {
                sqlx::query_as::<_, MessageRow>(
                    "SELECT id, contact_id, content, direction, status, whatsapp_message_id, sent_at
                     FROM messages WHERE contact_id = ?
                     ORDER BY sent_at ASC, rowid ASC
                     LIMIT ?",
                )
                .bind(id)
                .bind(limit)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, MessageRow>(
                    "SELECT id, contact_id, content, direction, status, whatsapp_message_id, sent_at
                     FROM messages
                     ORDER BY sent_at DESC, rowid DESC
                     LIMIT ?",
                )
                .bind(limit)
                .fetch_all(&self.pool)
                .await?
            }
        };

        rows.into_iter().map(Message::try_from).collect()
    }

    async fn stats(&self, today: NaiveDate) -> Result<DashboardStats> {
        let (total_contacts,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM contacts")
            .fetch_one(&self.pool)
            .await?;
        let (total_messages,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM messages")
            .fetch_one(&self.pool)
            .await?;

        let start = today.and_hms_opt(0, 0, 0).map(|t| t.and_utc()).ok_or_else(|| {
            StoreError::Decode(format!("invalid day {}", today))
        })?;
        let end = start + Duration::days(1);
        let (today_messages,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM messages WHERE sent_at >= ? AND sent_at < ?")
                .bind(format_timestamp(&start))
                .bind(format_timestamp(&end))
                .fetch_one(&self.pool)
                .await?;

        let by_status: Vec<(String, i64)> =
            sqlx::query_as("SELECT status, COUNT(*) FROM contacts GROUP BY status")
                .fetch_all(&self.pool)
                .await?;

        let mut stats = DashboardStats {
            total_contacts: total_contacts as u64,
            total_messages: total_messages as u64,
            today_messages: today_messages as u64,
            ..Default::default()
        };
        for (status, count) in by_status {
            let status = ContactStatus::from_str(&status)
                .map_err(|e| StoreError::Decode(e.to_string()))?;
            stats.contacts_by_status.insert(status, count as u64);
        }
        Ok(stats)
    }
}
