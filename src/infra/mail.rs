//! SMTP delivery for owner notifications.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, MultiPart},
    transport::smtp::authentication::Credentials,
};
use tracing::{info, warn};

use crate::{
    application::notify::{MailError, Mailer, NotificationDispatcher, OutboundEmail},
    config::{MailSettings, SmtpSettings},
};

/// Port on which the relay expects TLS from the first byte instead of STARTTLS.
const IMPLICIT_TLS_PORT: u16 = 465;

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
}

impl SmtpMailer {
    pub fn from_settings(settings: &SmtpSettings, timeout: Duration) -> Result<Self, MailError> {
        let from = parse_mailbox("mail.from", &settings.from)?;
        let to = parse_mailbox("mail.notify_to", &settings.notify_to)?;

        let builder = if settings.port == IMPLICIT_TLS_PORT {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host)
        }
        .map_err(|err| {
            MailError::Configuration(format!("invalid relay `{}`: {err}", settings.host))
        })?;

        let transport = builder
            .port(settings.port)
            .credentials(Credentials::new(
                settings.username.clone(),
                settings.password.clone(),
            ))
            .timeout(Some(timeout))
            .build();

        Ok(Self {
            transport,
            from,
            to,
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: OutboundEmail) -> Result<(), MailError> {
        let mut builder = Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(email.subject);

        // A customer-typed address that does not parse only loses the Reply-To header.
        if let Some(reply_to) = email.reply_to.as_deref() {
            match reply_to.parse::<Mailbox>() {
                Ok(mailbox) => builder = builder.reply_to(mailbox),
                Err(err) => warn!(
                    target = "poshpoule::mail",
                    op = "mail::send",
                    reply_to,
                    error = %err,
                    "Dropping unparseable Reply-To address"
                ),
            }
        }

        let message = builder
            .multipart(MultiPart::alternative_plain_html(
                email.text_body,
                email.html_body,
            ))
            .map_err(|err| MailError::Build(err.to_string()))?;

        self.transport
            .send(message)
            .await
            .map(|_| ())
            .map_err(|err| MailError::Transport(err.to_string()))
    }
}

/// Build the dispatcher for the configured mail settings.
pub fn build_dispatcher(settings: &MailSettings) -> Result<NotificationDispatcher, MailError> {
    match settings.smtp.as_ref() {
        Some(smtp) => {
            let mailer = SmtpMailer::from_settings(smtp, settings.timeout)?;
            info!(
                target = "poshpoule::mail",
                host = %smtp.host,
                port = smtp.port,
                notify_to = %smtp.notify_to,
                "SMTP notifications enabled"
            );
            Ok(NotificationDispatcher::new(Arc::new(mailer), settings.timeout))
        }
        None => {
            info!(
                target = "poshpoule::mail",
                "SMTP not configured; notifications disabled"
            );
            Ok(NotificationDispatcher::disabled())
        }
    }
}

fn parse_mailbox(key: &str, value: &str) -> Result<Mailbox, MailError> {
    value.parse().map_err(|err| {
        MailError::Configuration(format!("`{key}` = `{value}` is not a valid address: {err}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn smtp(from: &str) -> SmtpSettings {
        SmtpSettings {
            host: "smtp.example.com".into(),
            port: 587,
            username: "orders@example.com".into(),
            password: "secret".into(),
            from: from.into(),
            notify_to: "farm@example.com".into(),
        }
    }

    #[tokio::test]
    async fn invalid_sender_is_a_configuration_error() {
        let err = SmtpMailer::from_settings(&smtp("not an address"), Duration::from_secs(1))
            .err()
            .expect("sender must parse");
        assert!(matches!(err, MailError::Configuration(_)));
    }

    #[tokio::test]
    async fn builds_for_valid_settings_without_connecting() {
        let settings = MailSettings {
            smtp: Some(smtp("PoshPOULE <orders@example.com>")),
            timeout: Duration::from_secs(1),
        };
        let dispatcher = build_dispatcher(&settings).expect("valid settings");
        assert!(dispatcher.is_enabled());
    }

    #[test]
    fn missing_smtp_disables_dispatch() {
        let settings = MailSettings {
            smtp: None,
            timeout: Duration::from_secs(1),
        };
        assert!(!build_dispatcher(&settings).unwrap().is_enabled());
    }
}
