//! Alert message construction and dispatch.
//!
//! The dispatcher always produces a message and a notification record.
//! Whether anything leaves the process depends only on the injected
//! `Transport`: a missing or failing transport is recorded, never raised,
//! and never retried here.

use crate::config::TwilioSettings;
use crate::logging::{self, DataSource};
use crate::model::{AlertNotification, AlertSubscription, DeliveryStatus, RiskScore};
use chrono::Utc;
use serde::Deserialize;
use std::collections::VecDeque;
use std::fmt;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

const TWILIO_API_BASE: &str = "https://api.twilio.com/2010-04-01";

/// Notifications kept by a dispatcher before the oldest are dropped.
pub const OUTBOX_CAPACITY: usize = 1000;

// ---------------------------------------------------------------------------
// Transport
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum TransportError {
    /// The transport is not configured.
    Disabled,
    HttpError { status: u16, message: String },
    RequestFailed(String),
    ParseError(String),
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::Disabled => write!(f, "Transport disabled"),
            TransportError::HttpError { status, message } => {
                write!(f, "HTTP error {}: {}", status, message)
            }
            TransportError::RequestFailed(msg) => write!(f, "Request failed: {}", msg),
            TransportError::ParseError(msg) => write!(f, "Parse error: {}", msg),
        }
    }
}

impl std::error::Error for TransportError {}

/// Something that can deliver a text message to a contact.
pub trait Transport: Send + Sync {
    /// Whether `send` can succeed at all. A disabled transport is a valid
    /// configuration, not an error.
    fn is_available(&self) -> bool;

    /// Delivers `body` to `to` and returns the provider's message id.
    fn send(&self, to: &str, body: &str) -> Result<String, TransportError>;
}

/// Transport used when no SMS credentials are configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledTransport;

impl Transport for DisabledTransport {
    fn is_available(&self) -> bool {
        false
    }

    fn send(&self, _to: &str, _body: &str) -> Result<String, TransportError> {
        Err(TransportError::Disabled)
    }
}

/// SMS delivery through the Twilio Messages REST API.
pub struct TwilioTransport {
    client: reqwest::blocking::Client,
    account_sid: String,
    auth_token: String,
    from_number: String,
    api_base: String,
}

#[derive(Debug, Deserialize)]
struct TwilioMessageResponse {
    sid: String,
}

#[derive(Debug, Deserialize)]
struct TwilioErrorResponse {
    message: String,
}

impl TwilioTransport {
    pub fn new(settings: &TwilioSettings, timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::RequestFailed(e.to_string()))?;
        Ok(Self {
            client,
            account_sid: settings.account_sid.clone(),
            auth_token: settings.auth_token.clone(),
            from_number: settings.from_number.clone(),
            api_base: TWILIO_API_BASE.to_string(),
        })
    }

    fn messages_url(&self) -> String {
        format!("{}/Accounts/{}/Messages.json", self.api_base, self.account_sid)
    }
}

impl Transport for TwilioTransport {
    fn is_available(&self) -> bool {
        true
    }

    fn send(&self, to: &str, body: &str) -> Result<String, TransportError> {
        let params = [("To", to), ("From", self.from_number.as_str()), ("Body", body)];
        let response = self
            .client
            .post(self.messages_url())
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&params)
            .send()
            .map_err(|e| TransportError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<TwilioErrorResponse>()
                .map(|e| e.message)
                .unwrap_or_else(|_| status.to_string());
            return Err(TransportError::HttpError {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<TwilioMessageResponse>()
            .map(|m| m.sid)
            .map_err(|e| TransportError::ParseError(e.to_string()))
    }
}

/// Builds the configured transport. Missing credentials give the disabled
/// transport; this is the only place credential presence is inspected.
pub fn transport_from_settings(settings: &TwilioSettings, timeout: Duration) -> Box<dyn Transport> {
    if !settings.is_configured() {
        logging::info(
            DataSource::Twilio,
            None,
            "Twilio credentials not configured, alerts will be logged only",
        );
        return Box::new(DisabledTransport);
    }
    match TwilioTransport::new(settings, timeout) {
        Ok(transport) => Box::new(transport),
        Err(e) => {
            logging::error(
                DataSource::Twilio,
                None,
                &format!("Failed to create client: {}", e),
            );
            Box::new(DisabledTransport)
        }
    }
}

// ---------------------------------------------------------------------------
// Message construction
// ---------------------------------------------------------------------------

/// Human-readable alert text. Includes at most the first two
/// recommendations to keep the SMS short.
pub fn build_alert_message(sub: &AlertSubscription, risk: &RiskScore) -> String {
    let recs: Vec<&str> = risk
        .recommendations
        .iter()
        .take(2)
        .map(String::as_str)
        .collect();
    format!(
        "🌊 TideWatch Alert\nLocation: {}\nRisk Level: {} ({:.1}/100)\n{}\nRecommendations: {}",
        sub.address,
        risk.grade,
        risk.score,
        risk.summary,
        recs.join("; ")
    )
}

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

pub struct Dispatcher {
    transport: Box<dyn Transport>,
    outbox: Mutex<VecDeque<AlertNotification>>,
    outbox_capacity: usize,
}

impl Dispatcher {
    pub fn new(transport: Box<dyn Transport>) -> Self {
        Self::with_outbox_capacity(transport, OUTBOX_CAPACITY)
    }

    pub fn with_outbox_capacity(transport: Box<dyn Transport>, outbox_capacity: usize) -> Self {
        Self {
            transport,
            outbox: Mutex::new(VecDeque::new()),
            outbox_capacity: outbox_capacity.max(1),
        }
    }

    /// Builds the message, attempts delivery and records the outcome.
    pub fn dispatch(&self, subscription: &AlertSubscription, risk: &RiskScore) -> AlertNotification {
        let message = build_alert_message(subscription, risk);
        let to = subscription.phone_number.as_str();

        let delivery = if !self.transport.is_available() {
            logging::info(
                DataSource::Alerts,
                Some(to),
                &format!("Would send: {}", message.replace('\n', " | ")),
            );
            DeliveryStatus::Disabled
        } else {
            match self.transport.send(to, &message) {
                Ok(message_id) => {
                    logging::info(
                        DataSource::Twilio,
                        Some(to),
                        &format!("Sent SMS {}", message_id),
                    );
                    DeliveryStatus::Sent { message_id }
                }
                Err(e) => {
                    logging::error(DataSource::Twilio, Some(to), &format!("Failed to send SMS: {}", e));
                    DeliveryStatus::Failed {
                        reason: e.to_string(),
                    }
                }
            }
        };

        let notification = AlertNotification {
            subscription: subscription.clone(),
            risk: risk.clone(),
            message,
            sent_at: Utc::now(),
            delivery,
        };
        let mut outbox = self.outbox.lock().unwrap_or_else(PoisonError::into_inner);
        if outbox.len() >= self.outbox_capacity {
            outbox.pop_front();
        }
        outbox.push_back(notification.clone());
        notification
    }

    /// Recorded notifications not yet drained, oldest first.
    pub fn outbox(&self) -> Vec<AlertNotification> {
        self.outbox
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect()
    }

    /// Removes and returns every recorded notification, oldest first.
    pub fn drain(&self) -> Vec<AlertNotification> {
        self.outbox
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain(..)
            .collect()
    }
}
