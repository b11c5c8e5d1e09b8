//! Outbound email and SMS delivery.
//!
//! Both channels are optional. When a channel is not configured the message is logged
//! instead of sent, which keeps magic links usable in development.

use serde::Serialize;

use crate::server::{
    config::{Config, EmailConfig, SmsProviderConfig},
    error::AppError,
};

#[derive(Serialize)]
struct EmailPayload<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    text: &'a str,
}

#[derive(Serialize)]
struct SmsPayload<'a> {
    to: &'a str,
    body: &'a str,
}

/// Email and SMS sender shared through application state.
///
/// Cloning is cheap: `reqwest::Client` is reference counted and the provider settings are
/// small.
#[derive(Clone)]
pub struct DeliveryService {
    http_client: reqwest::Client,
    email: Option<EmailConfig>,
    sms_providers: Vec<SmsProviderConfig>,
}

impl DeliveryService {
    pub fn new(
        http_client: reqwest::Client,
        email: Option<EmailConfig>,
        sms_providers: Vec<SmsProviderConfig>,
    ) -> Self {
        Self {
            http_client,
            email,
            sms_providers,
        }
    }

    pub fn from_config(http_client: reqwest::Client, config: &Config) -> Self {
        Self::new(
            http_client,
            config.email.clone(),
            config.sms_providers.clone(),
        )
    }

    /// Sends a plain-text email through the configured provider.
    ///
    /// # Arguments
    /// - `to` - Recipient address
    /// - `subject` - Subject line
    /// - `body` - Plain-text body
    ///
    /// # Returns
    /// - `Ok(())` - Provider accepted the message, or email is disabled and it was logged
    /// - `Err(AppError::ReqwestErr)` - Transport failure or non-2xx response
    pub async fn send_email(&self, to: &str, subject: &str, body: &str) -> Result<(), AppError> {
        let Some(email) = &self.email else {
            tracing::info!(to, subject, body, "Email delivery disabled, message not sent");
            return Ok(());
        };

        self.http_client
            .post(&email.api_url)
            .bearer_auth(&email.api_key)
            .json(&EmailPayload {
                from: &email.from,
                to,
                subject,
                text: body,
            })
            .send()
            .await?
            .error_for_status()?;

        tracing::debug!(to, subject, "Email sent");

        Ok(())
    }

    /// Sends an SMS, trying each configured provider in order.
    ///
    /// A provider fails on a transport error or a non-2xx response; the next one is tried.
    ///
    /// # Returns
    /// - `Ok(())` - A provider accepted the message, or SMS is disabled
    /// - `Err(AppError::ReqwestErr)` - Every provider failed; the last error is returned
    pub async fn send_sms(&self, to: &str, body: &str) -> Result<(), AppError> {
        if self.sms_providers.is_empty() {
            tracing::info!(to, body, "SMS delivery disabled, message not sent");
            return Ok(());
        }

        let mut last_err = None;
        for provider in &self.sms_providers {
            match self.send_sms_via(provider, to, body).await {
                Ok(()) => {
                    tracing::debug!(to, provider = provider.name, "SMS sent");
                    return Ok(());
                }
                Err(e) => {
                    tracing::warn!(provider = provider.name, "SMS provider failed: {}", e);
                    last_err = Some(e);
                }
            }
        }

        match last_err {
            Some(e) => Err(e.into()),
            None => Ok(()),
        }
    }

    async fn send_sms_via(
        &self,
        provider: &SmsProviderConfig,
        to: &str,
        body: &str,
    ) -> Result<(), reqwest::Error> {
        self.http_client
            .post(&provider.url)
            .bearer_auth(&provider.api_key)
            .json(&SmsPayload { to, body })
            .send()
            .await?
            .error_for_status()?;

        Ok(())
    }
}
