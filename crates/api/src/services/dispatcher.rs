//! Notification dispatcher.
//!
//! Delivers a monitoring notification to a subscriber's callback URL. The
//! dispatcher implements the 307/308 redirect semantics itself, so automatic
//! redirect following is disabled on the underlying client.

use std::time::Duration;

use domain::models::MonitoringNotification;
use reqwest::{header, redirect, Client, StatusCode};
use thiserror::Error;
use tracing::{debug, warn};

/// Maximum POST attempts for one notification, redirect hops included.
pub const MAX_DELIVERY_ATTEMPTS: usize = 5;

/// Success status a subscriber is expected to answer with.
pub const DEFAULT_EXPECTED_STATUS: u16 = 204;

/// Errors that can occur while delivering a notification.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("notification rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("redirect response carried no Location header")]
    MissingLocation,

    #[error("exceeded {MAX_DELIVERY_ATTEMPTS} delivery attempts following redirects")]
    RedirectLimit,
}

/// HTTP transport for outbound notifications.
#[derive(Clone)]
pub struct NotificationDispatcher {
    client: Client,
}

impl NotificationDispatcher {
    /// Create a dispatcher with the given connect and request timeouts.
    pub fn new(connect_timeout: Duration, request_timeout: Duration) -> Self {
        let client = Client::builder()
            .redirect(redirect::Policy::none())
            .connect_timeout(connect_timeout)
            .timeout(request_timeout)
            .build()
            .expect("failed to create HTTP client");

        Self { client }
    }

    /// Deliver a notification to `destination`.
    ///
    /// Returns the new destination URL when the subscriber answered with a
    /// permanent redirect (308) somewhere along the way, so the caller can
    /// persist it; temporary redirects (307) are followed but not reported.
    pub async fn send_notification(
        &self,
        destination: &str,
        notification: &MonitoringNotification,
        expected_status: u16,
    ) -> Result<Option<String>, DeliveryError> {
        let mut next_destination = destination.to_string();
        let mut permanent_redirect: Option<String> = None;

        for attempt in 1..=MAX_DELIVERY_ATTEMPTS {
            let response = self
                .client
                .post(&next_destination)
                .json(notification)
                .send()
                .await?;

            let status = response.status();

            if status.as_u16() == expected_status {
                debug!(destination = %next_destination, attempt, "notification delivered");
                return Ok(permanent_redirect);
            }

            if status.is_success() {
                warn!(
                    destination = %next_destination,
                    status = status.as_u16(),
                    "unexpected 2xx status for notification, accepting as delivered"
                );
                return Ok(permanent_redirect);
            }

            if status == StatusCode::TEMPORARY_REDIRECT || status == StatusCode::PERMANENT_REDIRECT
            {
                let location = response
                    .headers()
                    .get(header::LOCATION)
                    .and_then(|value| value.to_str().ok())
                    .map(str::to_string)
                    .ok_or(DeliveryError::MissingLocation)?;

                debug!(
                    from = %next_destination,
                    to = %location,
                    status = status.as_u16(),
                    "following notification redirect"
                );

                if status == StatusCode::PERMANENT_REDIRECT {
                    permanent_redirect = Some(location.clone());
                }
                next_destination = location;
                continue;
            }

            let body = response.text().await.unwrap_or_default();
            return Err(DeliveryError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        Err(DeliveryError::RedirectLimit)
    }
}
