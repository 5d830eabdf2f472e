//! Owner notifications for new orders and contact-form leads.
//!
//! Delivery is fire-and-forget: the dispatcher spawns the send, bounds it with a timeout
//! and only logs the outcome, so a slow or failing relay never affects the request that
//! triggered it.

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use async_trait::async_trait;
use metrics::counter;
use thiserror::Error;
use time::{OffsetDateTime, macros::format_description};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::domain::{
    currency::format_naira,
    entities::{LeadRecord, OrderRecord},
};

const TARGET: &str = "poshpoule::notify";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundEmail {
    pub subject: String,
    pub text_body: String,
    pub html_body: String,
    pub reply_to: Option<String>,
}

#[derive(Debug, Error)]
pub enum MailError {
    #[error("mail is misconfigured: {0}")]
    Configuration(String),
    #[error("failed to build message: {0}")]
    Build(String),
    #[error("mail transport failed: {0}")]
    Transport(String),
    #[error("mail delivery timed out after {0:?}")]
    Timeout(Duration),
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: OutboundEmail) -> Result<(), MailError>;
}

#[derive(Clone)]
pub struct NotificationDispatcher {
    mailer: Option<Arc<dyn Mailer>>,
    timeout: Duration,
}

impl NotificationDispatcher {
    pub fn new(mailer: Arc<dyn Mailer>, timeout: Duration) -> Self {
        Self {
            mailer: Some(mailer),
            timeout,
        }
    }

    /// A dispatcher that renders nothing and sends nothing.
    pub fn disabled() -> Self {
        Self {
            mailer: None,
            timeout: Duration::ZERO,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.mailer.is_some()
    }

    pub fn order_placed(&self, order: &OrderRecord) -> Option<JoinHandle<()>> {
        self.dispatch("order", &order.id, || render_order_email(order))
    }

    pub fn lead_received(&self, lead: &LeadRecord) -> Option<JoinHandle<()>> {
        self.dispatch("lead", &lead.id, || render_lead_email(lead))
    }

    fn dispatch(
        &self,
        kind: &'static str,
        record_id: &str,
        render: impl FnOnce() -> OutboundEmail,
    ) -> Option<JoinHandle<()>> {
        let Some(mailer) = self.mailer.clone() else {
            debug!(
                target = TARGET,
                op = "notify::dispatch",
                result = "skipped",
                kind,
                record_id,
                "Mail disabled; notification skipped"
            );
            return None;
        };

        let email = render();
        let timeout = self.timeout;
        let record_id = record_id.to_string();

        Some(tokio::spawn(async move {
            let started_at = Instant::now();
            let outcome = match tokio::time::timeout(timeout, mailer.send(email)).await {
                Ok(result) => result,
                Err(_) => Err(MailError::Timeout(timeout)),
            };
            let elapsed_ms = started_at.elapsed().as_millis() as u64;

            match outcome {
                Ok(()) => {
                    counter!("poshpoule_mail_sent_total", "kind" => kind).increment(1);
                    info!(
                        target = TARGET,
                        op = "notify::dispatch",
                        result = "ok",
                        kind,
                        record_id = %record_id,
                        elapsed_ms,
                        "Notification sent"
                    );
                }
                Err(err) => {
                    counter!("poshpoule_mail_failed_total", "kind" => kind).increment(1);
                    warn!(
                        target = TARGET,
                        op = "notify::dispatch",
                        result = "error",
                        kind,
                        record_id = %record_id,
                        elapsed_ms,
                        error = %err,
                        "Notification failed"
                    );
                }
            }
        }))
    }
}

pub fn render_order_email(order: &OrderRecord) -> OutboundEmail {
    let total = format_naira(order.total_amount);
    let submitted_at = format_timestamp(order.created_at);

    let mut text = format!(
        "New preorder received from {}.\n\nEmail: {}\nPhone: {}\nOrder Type: {}\n",
        order.customer_name,
        order.customer_email,
        order.customer_phone,
        order.order_type.as_str()
    );
    if let Some(address) = order.delivery_address.as_deref() {
        text.push_str(&format!("Delivery Address: {address}\n"));
    }
    text.push_str(&format!("Preferred Date: {}\n", order.scheduled_date));
    if let Some(time) = order.scheduled_time.as_deref() {
        text.push_str(&format!("Preferred Time: {time}\n"));
    }
    if let Some(notes) = order.notes.as_deref() {
        text.push_str(&format!("Notes: {notes}\n"));
    }
    text.push_str("\nProducts:\n");
    for line in &order.products {
        text.push_str(&format!(
            "- {} x{} ({})\n",
            line.name,
            line.quantity,
            format_naira(line.price_naira)
        ));
    }
    text.push_str(&format!(
        "\nTotal Amount: {total}\nSubmitted at: {submitted_at}"
    ));

    let mut details = String::new();
    details.push_str(&html_field("Name", &order.customer_name));
    details.push_str(&html_field("Email", &order.customer_email));
    details.push_str(&html_field("Phone", &order.customer_phone));
    details.push_str(&html_field("Order Type", order.order_type.as_str()));
    if let Some(address) = order.delivery_address.as_deref() {
        details.push_str(&html_field("Delivery Address", address));
    }
    details.push_str(&html_field("Preferred Date", &order.scheduled_date));
    if let Some(time) = order.scheduled_time.as_deref() {
        details.push_str(&html_field("Preferred Time", time));
    }
    if let Some(notes) = order.notes.as_deref() {
        details.push_str(&html_field("Notes", notes));
    }

    let mut lines = String::new();
    for line in &order.products {
        lines.push_str(&format!(
            "<div style=\"margin-bottom:12px;padding:12px;border-bottom:1px solid #e5e7eb;\">\
             <strong>{}</strong><br>Quantity: {}<br>Price: {}</div>",
            escape(&line.name),
            line.quantity,
            format_naira(line.price_naira)
        ));
    }

    let html = format!(
        "<div style=\"font-family: Arial, sans-serif; color: #111827; max-width: 600px; margin: 0 auto;\">\
         <h2 style=\"color:#14532d;\">New Preorder Received</h2>\
         <div style=\"background:#f9fafb;padding:20px;border-radius:8px;margin:20px 0;\">\
         <h3 style=\"margin-top:0;color:#14532d;\">Customer Information</h3>{details}</div>\
         <h3 style=\"color:#14532d;\">Order Details</h3>\
         <div style=\"background:#f9fafb;padding:20px;border-radius:8px;margin:20px 0;\">{lines}\
         <div style=\"border-top:2px solid #14532d;padding-top:12px;margin-top:12px;\">\
         <strong>Total: {total}</strong></div></div>\
         <p style=\"color:#6b7280;\">Submitted at: {submitted_at}</p></div>"
    );

    OutboundEmail {
        subject: format!("New Preorder from {} - {total}", order.customer_name),
        text_body: text,
        html_body: html,
        reply_to: Some(order.customer_email.clone()),
    }
}

pub fn render_lead_email(lead: &LeadRecord) -> OutboundEmail {
    let phone = lead.phone.as_deref().unwrap_or("Not provided");

    let text = format!(
        "New contact form submission from {}.\n\nEmail: {}\nPhone: {phone}\nSubject: {}\n\nMessage:\n{}",
        lead.name, lead.email, lead.subject, lead.message
    );

    let message_html = lead
        .message
        .lines()
        .map(escape)
        .collect::<Vec<_>>()
        .join("<br>");
    let html = format!(
        "<div style=\"font-family: Arial, sans-serif; color: #111827;\">\
         <h2 style=\"color:#14532d;\">New Contact Form Submission</h2>{}{}{}{}\
         <h3 style=\"margin-top:24px;\">Message</h3>\
         <p style=\"background:#f9fafb;padding:16px;border-radius:8px;border-left:4px solid #14532d;\">{message_html}</p></div>",
        html_field("Name", &lead.name),
        html_field("Email", &lead.email),
        html_field("Phone", phone),
        html_field("Subject", &lead.subject),
    );

    OutboundEmail {
        subject: format!("New Contact: {}", lead.subject),
        text_body: text,
        html_body: html,
        reply_to: Some(lead.email.clone()),
    }
}

fn html_field(label: &str, value: &str) -> String {
    format!("<p><strong>{label}:</strong> {}</p>", escape(value))
}

fn escape(value: &str) -> String {
    ammonia::clean_text(value)
}

fn format_timestamp(at: Option<OffsetDateTime>) -> String {
    let Some(at) = at else {
        return "unknown".to_string();
    };
    at.format(format_description!(
        "[year]-[month]-[day] [hour]:[minute] UTC"
    ))
    .unwrap_or_else(|_| at.to_string())
}
