//! Contact-form submissions.

use std::sync::Arc;

use serde_json::Map;
use thiserror::Error;
use tracing::info;

use crate::{
    application::{
        clock::Clock,
        notify::NotificationDispatcher,
        validation::{looks_like_email, optional_text, require_text},
    },
    domain::{entities::LeadRecord, types::LeadStatus},
    infra::store::{JsonDocumentStore, StoreError},
};

pub const LEAD_ACCEPTED_MESSAGE: &str = "Message sent successfully";

#[derive(Debug, Error)]
pub enum LeadError {
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, Default)]
pub struct SubmitLeadCommand {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub subject: Option<String>,
    pub message: Option<String>,
}

pub struct LeadService {
    store: Arc<JsonDocumentStore>,
    notifier: NotificationDispatcher,
    clock: Arc<dyn Clock>,
}

impl LeadService {
    pub fn new(
        store: Arc<JsonDocumentStore>,
        notifier: NotificationDispatcher,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            notifier,
            clock,
        }
    }

    /// Leads are append-only.
    pub async fn submit(&self, command: SubmitLeadCommand) -> Result<LeadRecord, LeadError> {
        let name = require_text(command.name, "name").map_err(LeadError::Validation)?;
        let email = require_text(command.email, "email").map_err(LeadError::Validation)?;
        let subject = require_text(command.subject, "subject").map_err(LeadError::Validation)?;
        let message = require_text(command.message, "message").map_err(LeadError::Validation)?;
        if !looks_like_email(&email) {
            return Err(LeadError::Validation(
                "email must be a valid email address".to_string(),
            ));
        }

        let created_at = self.clock.now_utc();
        let lead = self
            .store
            .mutate(|document| {
                let lead = LeadRecord {
                    id: document.next_lead_id(),
                    name,
                    email,
                    phone: optional_text(command.phone),
                    subject,
                    message,
                    status: LeadStatus::New,
                    created_at: Some(created_at),
                    extra: Map::new(),
                };
                document.leads.push(lead.clone());
                Ok::<_, LeadError>(lead)
            })
            .await?;

        info!(
            target = "poshpoule::leads",
            op = "leads::submit",
            result = "ok",
            id = %lead.id,
            "Lead received"
        );
        self.notifier.lead_received(&lead);
        Ok(lead)
    }
}
