//! Webhook event ingestion.
//!
//! Every inbound message is reconciled to a contact and stored; delivery
//! statuses make sure the recipient exists as a contact. Entries are
//! independent: one failing never stops the others, and the outcome of each
//! is reported back to the caller.

use futures::future::join_all;
use tracing::{debug, info, warn};
use wadesk_channels::{
    extract_content, RawElement, WebhookEntry, WebhookMessage, WebhookPayload, WebhookStatus,
    WebhookValue,
};
use wadesk_core::NewMessage;

use crate::recorder::{MessageRecorder, RecordOutcome};
use crate::resolver::{ContactRef, ContactResolver};

/// What happened to one message or status in a payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryOutcome {
    /// Inbound message stored.
    Recorded { contact_id: String, message_id: String },
    /// Inbound message already stored under the skip policy.
    Duplicate { contact_id: String, message_id: String },
    /// A delivery status made sure the recipient exists.
    ContactEnsured { contact_id: String, created: bool },
    /// Nothing to do, e.g. a `read` status.
    Skipped { reason: String },
    /// Processing failed; the rest of the payload still went through.
    Failed { external_id: Option<String>, error: String },
}

/// Per-entry results of one webhook delivery.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub outcomes: Vec<EntryOutcome>,
}

impl IngestReport {
    pub fn recorded(&self) -> usize {
        self.count(|o| matches!(o, EntryOutcome::Recorded { .. }))
    }

    pub fn duplicates(&self) -> usize {
        self.count(|o| matches!(o, EntryOutcome::Duplicate { .. }))
    }

    pub fn contacts_ensured(&self) -> usize {
        self.count(|o| matches!(o, EntryOutcome::ContactEnsured { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, EntryOutcome::Skipped { .. }))
    }

    pub fn failures(&self) -> usize {
        self.count(|o| matches!(o, EntryOutcome::Failed { .. }))
    }

    fn count(&self, pred: impl Fn(&EntryOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(o)).count()
    }
}

/// Turns provider callbacks into contacts and messages.
#[derive(Clone)]
pub struct WebhookIngestor {
    resolver: ContactResolver,
    recorder: MessageRecorder,
    use_profile_names: bool,
}

impl WebhookIngestor {
    pub fn new(resolver: ContactResolver, recorder: MessageRecorder) -> Self {
        Self {
            resolver,
            recorder,
            use_profile_names: false,
        }
    }

    /// Name new contacts after their WhatsApp profile when one is present.
    pub fn with_profile_names(mut self, enabled: bool) -> Self {
        self.use_profile_names = enabled;
        self
    }

    /// Ingest a raw JSON body. Fails only when it does not have the payload shape.
    pub async fn ingest_json(
        &self,
        body: serde_json::Value,
    ) -> Result<IngestReport, serde_json::Error> {
        let payload: WebhookPayload = serde_json::from_value(body)?;
        Ok(self.ingest(payload).await)
    }

    pub async fn ingest(&self, payload: WebhookPayload) -> IngestReport {
        let outcomes: Vec<EntryOutcome> = join_all(payload.entry.iter().map(|e| self.ingest_entry(e)))
            .await
            .into_iter()
            .flatten()
            .collect();
        let report = IngestReport { outcomes };

        if report.failures() > 0 {
            warn!(
                failed = report.failures(),
                total = report.outcomes.len(),
                "Webhook processed with failures"
            );
        } else {
            info!(
                recorded = report.recorded(),
                duplicates = report.duplicates(),
                contacts = report.contacts_ensured(),
                skipped = report.skipped(),
                "Webhook processed"
            );
        }
        report
    }

    async fn ingest_entry(&self, entry: &WebhookEntry) -> Vec<EntryOutcome> {
        let mut outcomes = Vec::new();
        for change in &entry.changes {
            for element in change.value.messages() {
                let outcome = match &element.decoded {
                    Ok(message) => self.ingest_message(&change.value, message).await,
                    Err(e) => undecodable("message", &element, e),
                };
                outcomes.push(outcome);
            }
            for element in change.value.statuses() {
                let outcome = match &element.decoded {
                    Ok(status) => self.ingest_status(status).await,
                    Err(e) => undecodable("status", &element, e),
                };
                outcomes.push(outcome);
            }
        }
        outcomes
    }

    async fn ingest_message(&self, value: &WebhookValue, message: &WebhookMessage) -> EntryOutcome {
        let external_id = Some(message.id.clone()).filter(|id| !id.is_empty());
        let fail = |error: String| {
            warn!(external_id = ?external_id, from = %message.from, "Inbound message failed: {}", error);
            EntryOutcome::Failed {
                external_id: external_id.clone(),
                error,
            }
        };

        let name = if self.use_profile_names {
            value.profile_name(&message.from)
        } else {
            None
        };
        let reference = ContactRef::Phone {
            phone: message.from.clone(),
            name,
        };
        let contact = match self.resolver.resolve(reference).await {
            Ok(resolved) => resolved.contact,
            Err(e) => return fail(e.to_string()),
        };

        let content = extract_content(message);
        debug!(
            from = %message.from,
            message_type = message.message_type.as_deref().unwrap_or("unknown"),
            "Inbound message"
        );

        match self
            .recorder
            .record(NewMessage::inbound(&contact.id, content, external_id.clone()))
            .await
        {
            Ok(RecordOutcome::Recorded(m)) => EntryOutcome::Recorded {
                contact_id: contact.id,
                message_id: m.id,
            },
            Ok(RecordOutcome::Duplicate(m)) => EntryOutcome::Duplicate {
                contact_id: contact.id,
                message_id: m.id,
            },
            Err(e) => fail(e.to_string()),
        }
    }

    async fn ingest_status(&self, status: &WebhookStatus) -> EntryOutcome {
        if !status.ensures_contact() {
            debug!(status = %status.status, id = ?status.id, "Ignoring status update");
            return EntryOutcome::Skipped {
                reason: format!("status '{}'", status.status),
            };
        }

        match self
            .resolver
            .resolve(ContactRef::phone(status.recipient_id.clone()))
            .await
        {
            Ok(resolved) => {
                if resolved.created {
                    info!(recipient = %status.recipient_id, "Contact created from status update");
                }
                EntryOutcome::ContactEnsured {
                    contact_id: resolved.contact.id,
                    created: resolved.created,
                }
            }
            Err(e) => {
                warn!(recipient = %status.recipient_id, "Status update failed: {}", e);
                EntryOutcome::Failed {
                    external_id: status.id.clone(),
                    error: e.to_string(),
                }
            }
        }
    }
}

fn undecodable<T>(kind: &str, element: &RawElement<'_, T>, error: &serde_json::Error) -> EntryOutcome {
    let external_id = element.id().map(str::to_string);
    warn!(external_id = ?external_id, "Malformed {} in webhook: {}", kind, error);
    EntryOutcome::Failed {
        external_id,
        error: format!("malformed {}: {}", kind, error),
    }
}
