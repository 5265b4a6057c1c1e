use std::fs;
use std::path::PathBuf;

use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use thiserror::Error;

const SMTP_HOST: &str = "smtp.gmail.com";
const SUBJECT: &str = "PDP harvest results";
const BODY: &str = "Attached are the report files generated by the PDP harvest run.\n\n\
     Multiple mails on the same day correspond to separate runs.\n";

/// Mail credentials, sourced from the environment.
#[derive(Debug, Clone)]
pub struct MailSettings {
    pub sender: String,
    pub password: String,
    /// Comma-separated recipient addresses.
    pub recipients: String,
}

impl MailSettings {
    /// Returns `None` unless `EMAIL_SENDER`, `EMAIL_PASSWORD` and
    /// `EMAIL_TO` are all set; absent credentials mean "skip mail".
    pub fn from_env() -> Option<Self> {
        let sender = std::env::var("EMAIL_SENDER").ok()?;
        let password = std::env::var("EMAIL_PASSWORD").ok()?;
        let recipients = std::env::var("EMAIL_TO").ok()?;
        Some(Self {
            sender,
            password,
            recipients,
        })
    }
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("invalid mail address: {0}")]
    Address(#[from] lettre::address::AddressError),
    #[error("attachment content type: {0}")]
    ContentType(#[from] lettre::message::header::ContentTypeErr),
    #[error("message build failed: {0}")]
    Message(#[from] lettre::error::Error),
    #[error("smtp failure: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

/// Sends one message with every readable attachment; missing files are
/// logged and skipped rather than failing the job.
pub fn send_report(settings: &MailSettings, attachments: &[PathBuf]) -> Result<(), NotifyError> {
    let mut builder = Message::builder()
        .from(settings.sender.parse::<Mailbox>()?)
        .subject(SUBJECT);
    for recipient in settings.recipients.split(',') {
        let recipient = recipient.trim();
        if recipient.is_empty() {
            continue;
        }
        builder = builder.to(recipient.parse::<Mailbox>()?);
    }

    let mut parts = MultiPart::mixed().singlepart(SinglePart::plain(BODY.to_string()));
    for path in attachments {
        match fs::read(path) {
            Ok(data) => {
                let filename = path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "attachment".to_string());
                let content_type = ContentType::parse("application/octet-stream")?;
                parts = parts.singlepart(Attachment::new(filename).body(data, content_type));
                log::info!("attached {}", path.display());
            }
            Err(err) => {
                log::warn!("attachment {} unavailable ({err}); skipping", path.display());
            }
        }
    }

    let message = builder.multipart(parts)?;
    let credentials = Credentials::new(settings.sender.clone(), settings.password.clone());
    let mailer = SmtpTransport::relay(SMTP_HOST)?
        .credentials(credentials)
        .build();

    log::info!("sending report mail to {}", settings.recipients);
    mailer.send(&message)?;
    log::info!("report mail sent");
    Ok(())
}
