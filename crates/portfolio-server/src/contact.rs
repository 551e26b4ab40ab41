use std::sync::LazyLock;

use portfolio_common::error::CommonError;
use portfolio_common::resend::{OutgoingEmail, ResendClient, ResendConfig};
use regex::Regex;
use serde::Deserialize;
use tracing::{info, warn};

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid regex"));

pub const SUCCESS_MESSAGE: &str = "Your message has been sent successfully!";

/// Raw form body. Every field is optional so a missing field is a validation
/// failure rather than a JSON error.
#[derive(Debug, Default, Deserialize)]
pub struct ContactSubmission {
    pub name: Option<String>,
    pub email: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedContact {
    pub name: String,
    pub email: String,
    pub message: String,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ContactValidationError {
    #[error("All fields are required")]
    MissingFields,

    #[error("Invalid email format")]
    InvalidEmail,
}

impl ContactSubmission {
    pub fn validate(self) -> Result<ValidatedContact, ContactValidationError> {
        let present = |field: Option<String>| field.filter(|v| !v.trim().is_empty());
        let (Some(name), Some(email), Some(message)) =
            (present(self.name), present(self.email), present(self.message))
        else {
            return Err(ContactValidationError::MissingFields);
        };

        if !is_valid_email(&email) {
            return Err(ContactValidationError::InvalidEmail);
        }
        Ok(ValidatedContact {
            name,
            email,
            message,
        })
    }
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

pub fn compose_email(config: &ResendConfig, contact: &ValidatedContact) -> OutgoingEmail {
    let text = format!(
        "New contact form submission\n\nName: {}\nEmail: {}\n\nMessage:\n{}\n",
        contact.name, contact.email, contact.message
    );
    let html = format!(
        "<h2>New contact form submission</h2>\
<p><strong>Name:</strong> {}</p>\
<p><strong>Email:</strong> {}</p>\
<p><strong>Message:</strong></p>\
<p>{}</p>",
        escape_html(&contact.name),
        escape_html(&contact.email),
        escape_html(&contact.message).replace("\r\n", "<br>").replace('\n', "<br>"),
    );

    OutgoingEmail {
        from: config.from_email.clone(),
        to: config.contact_email.clone(),
        reply_to: contact.email.clone(),
        subject: format!("New Contact Form Message from {}", contact.name),
        text,
        html,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayOutcome {
    Sent { id: String },
    NotConfigured(String),
    Failed(String),
}

/// Delivery channel for validated submissions. Without credentials the form
/// still succeeds and the submission is only logged.
#[derive(Clone)]
pub enum ContactRelay {
    Resend(ResendClient),
    Disabled(String),
}

impl ContactRelay {
    pub fn from_env() -> Result<Self, CommonError> {
        match ResendConfig::from_env() {
            Ok(config) => Ok(Self::Resend(ResendClient::new(config)?)),
            Err(CommonError::Config(reason)) => Ok(Self::Disabled(reason)),
            Err(other) => Err(other),
        }
    }

    pub async fn relay(&self, contact: &ValidatedContact) -> RelayOutcome {
        let client = match self {
            Self::Resend(client) => client,
            Self::Disabled(reason) => {
                warn!(reason = %reason, "contact relay not configured, submission not forwarded");
                return RelayOutcome::NotConfigured(reason.clone());
            }
        };

        let email = compose_email(client.config(), contact);
        match client.send(&email).await {
            Ok(id) => {
                info!(email_id = %id, "contact message relayed");
                RelayOutcome::Sent { id }
            }
            Err(e) => {
                warn!(error = %e, "contact message relay failed");
                RelayOutcome::Failed(e.to_string())
            }
        }
    }
}
