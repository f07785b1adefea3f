use std::time::Duration;

use lettre::address::AddressError;
use lettre::message::{header::ContentType, Mailbox};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use watch_logging::watch_info;

use crate::message::NotificationEvent;

pub const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";
/// Implicit TLS. Any other port is spoken to with STARTTLS.
pub const DEFAULT_SMTP_PORT: u16 = 465;

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("mail settings incomplete, missing: {}", .0.join(", "))]
    MissingConfig(Vec<&'static str>),
    #[error("invalid {field} address {value:?}: {source}")]
    Address {
        field: &'static str,
        value: String,
        source: AddressError,
    },
    #[error("failed to build message: {0}")]
    Message(#[from] lettre::error::Error),
    #[error("smtp transport setup failed: {0}")]
    Transport(lettre::transport::smtp::Error),
    #[error("smtp delivery failed: {0}")]
    Delivery(lettre::transport::smtp::Error),
}

#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, event: &NotificationEvent) -> Result<(), NotifyError>;
}

#[derive(Debug, Clone)]
pub struct MailSettings {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub from: Option<String>,
    pub to: Option<String>,
    pub secret: Option<String>,
    pub timeout: Duration,
}

impl Default for MailSettings {
    fn default() -> Self {
        Self {
            smtp_host: DEFAULT_SMTP_HOST.to_string(),
            smtp_port: DEFAULT_SMTP_PORT,
            from: None,
            to: None,
            secret: None,
            timeout: Duration::from_secs(20),
        }
    }
}

impl MailSettings {
    /// Names of the identity values that are absent or blank.
    pub fn missing(&self) -> Vec<&'static str> {
        [
            ("sender address", &self.from),
            ("recipient address", &self.to),
            ("secret", &self.secret),
        ]
        .into_iter()
        .filter(|(_, value)| value.as_deref().map_or(true, |v| v.trim().is_empty()))
        .map(|(name, _)| name)
        .collect()
    }
}

pub struct SmtpNotifier {
    from: Mailbox,
    to: Mailbox,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpNotifier {
    /// Validates the settings up front; nothing touches the network until `send`.
    pub fn new(settings: MailSettings) -> Result<Self, NotifyError> {
        let missing = settings.missing();
        if !missing.is_empty() {
            return Err(NotifyError::MissingConfig(missing));
        }
        let from_raw = settings.from.unwrap_or_default();
        let to_raw = settings.to.unwrap_or_default();
        let secret = settings.secret.unwrap_or_default();

        let from = parse_mailbox("sender", &from_raw)?;
        let to = parse_mailbox("recipient", &to_raw)?;

        let builder = if settings.smtp_port == DEFAULT_SMTP_PORT {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.smtp_host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.smtp_host)
        }
        .map_err(NotifyError::Transport)?;

        let transport = builder
            .port(settings.smtp_port)
            .credentials(Credentials::new(from_raw.trim().to_string(), secret))
            .timeout(Some(settings.timeout))
            .build();

        Ok(Self { from, to, transport })
    }
}

#[async_trait::async_trait]
impl Notifier for SmtpNotifier {
    async fn send(&self, event: &NotificationEvent) -> Result<(), NotifyError> {
        let message = Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(event.subject.as_str())
            .header(ContentType::TEXT_PLAIN)
            .body(event.body.clone())?;

        self.transport
            .send(message)
            .await
            .map_err(NotifyError::Delivery)?;
        watch_info!("Mail {:?} sent to {}", event.subject, self.to);
        Ok(())
    }
}

fn parse_mailbox(field: &'static str, value: &str) -> Result<Mailbox, NotifyError> {
    value
        .trim()
        .parse::<Mailbox>()
        .map_err(|source| NotifyError::Address {
            field,
            value: value.to_string(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> MailSettings {
        MailSettings {
            from: Some("watcher@example.org".to_string()),
            to: Some("me@example.org".to_string()),
            secret: Some("app-password".to_string()),
            ..MailSettings::default()
        }
    }

    #[test]
    fn every_missing_value_is_reported() {
        let settings = MailSettings {
            to: Some("  ".to_string()),
            ..MailSettings::default()
        };
        match SmtpNotifier::new(settings) {
            Err(NotifyError::MissingConfig(missing)) => assert_eq!(
                missing,
                vec!["sender address", "recipient address", "secret"]
            ),
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("incomplete settings accepted"),
        }
    }

    #[test]
    fn bad_address_is_rejected_before_sending() {
        let settings = MailSettings {
            to: Some("not an address".to_string()),
            ..complete()
        };
        assert!(matches!(
            SmtpNotifier::new(settings),
            Err(NotifyError::Address { field: "recipient", .. })
        ));
    }

    #[test]
    fn complete_settings_build_without_network() {
        assert!(SmtpNotifier::new(complete()).is_ok());
        let starttls = MailSettings {
            smtp_port: 587,
            ..complete()
        };
        assert!(SmtpNotifier::new(starttls).is_ok());
    }
}
