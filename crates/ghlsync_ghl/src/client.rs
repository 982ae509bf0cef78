//! Thin REST client for the GoHighLevel (LeadConnector) API.

use ghlsync_common::{create_client, DEFAULT_TIMEOUT_SECS, HTTP_CLIENT};
use ghlsync_config::GhlConfig;
use reqwest::{header, Client};
use serde::Serialize;
use tracing::{debug, error};

use crate::error::GhlError;

pub const DEFAULT_BASE_URL: &str = "https://services.leadconnectorhq.com";
pub const DEFAULT_API_VERSION: &str = "2021-07-28";
/// Contact custom field that holds the Google Calendar event id.
pub const DEFAULT_EVENT_ID_FIELD_KEY: &str = "google_calendar_event_id_from_make";

/// One entry of the `customFields` array on a contact update.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct CustomFieldValue {
    pub key: String,
    pub field_value: String,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct UpdateContactRequest<'a> {
    custom_fields: &'a [CustomFieldValue],
}

#[derive(Clone, Debug)]
pub struct GhlClient {
    http: Client,
    base_url: String,
    api_token: String,
    api_version: String,
    event_id_field_key: String,
}

impl GhlClient {
    /// Builds a client from configuration. The API token is mandatory.
    pub fn from_config(config: &GhlConfig) -> Result<Self, GhlError> {
        let api_token = config
            .api_token
            .clone()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| GhlError::ConfigError("api_token is not set".to_string()))?;

        let http = match config.timeout_secs {
            Some(secs) if secs != DEFAULT_TIMEOUT_SECS => create_client(secs, true)?,
            _ => HTTP_CLIENT.clone(),
        };

        Ok(Self {
            http,
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            api_token,
            api_version: config
                .api_version
                .clone()
                .unwrap_or_else(|| DEFAULT_API_VERSION.to_string()),
            event_id_field_key: config
                .event_id_field_key
                .clone()
                .unwrap_or_else(|| DEFAULT_EVENT_ID_FIELD_KEY.to_string()),
        })
    }

    pub fn event_id_field_key(&self) -> &str {
        &self.event_id_field_key
    }

    /// `PUT /contacts/{contact_id}` with the given custom field values.
    pub async fn update_contact_custom_fields(
        &self,
        contact_id: &str,
        custom_fields: &[CustomFieldValue],
    ) -> Result<(), GhlError> {
        validate_contact_id(contact_id)?;

        let url = format!("{}/contacts/{}", self.base_url, contact_id);
        debug!("PUT {} ({} custom fields)", url, custom_fields.len());

        let response = self
            .http
            .put(&url)
            .bearer_auth(&self.api_token)
            .header(header::ACCEPT, "application/json")
            .header("Version", &self.api_version)
            .json(&UpdateContactRequest { custom_fields })
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let message = response.text().await.unwrap_or_default();
        error!("GHL API error: {} - {}", status.as_u16(), message);
        Err(GhlError::ApiError {
            status_code: status.as_u16(),
            message,
        })
    }

    /// Stores the calendar event id on the contact.
    pub async fn update_contact_calendar_event_id(
        &self,
        contact_id: &str,
        event_id: &str,
    ) -> Result<(), GhlError> {
        let fields = [CustomFieldValue {
            key: self.event_id_field_key.clone(),
            field_value: event_id.to_string(),
        }];
        self.update_contact_custom_fields(contact_id, &fields).await
    }
}

/// Contact ids are opaque tokens. Anything that could change the request path is refused.
fn validate_contact_id(contact_id: &str) -> Result<(), GhlError> {
    if contact_id.trim().is_empty() {
        return Err(GhlError::InvalidInput("contact id is empty".to_string()));
    }
    if !contact_id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(GhlError::InvalidInput(format!(
            "contact id '{}' contains illegal characters",
            contact_id
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(token: Option<&str>) -> GhlConfig {
        GhlConfig {
            api_token: token.map(str::to_string),
            location_id: None,
            base_url: Some("http://localhost:9999/".to_string()),
            api_version: None,
            event_id_field_key: None,
            timeout_secs: None,
        }
    }

    #[test]
    fn test_from_config_requires_token() {
        assert!(matches!(
            GhlClient::from_config(&config(None)),
            Err(GhlError::ConfigError(_))
        ));
        assert!(matches!(
            GhlClient::from_config(&config(Some("  "))),
            Err(GhlError::ConfigError(_))
        ));
    }

    #[test]
    fn test_from_config_defaults() {
        let client = GhlClient::from_config(&config(Some("pit-123"))).unwrap();
        assert_eq!(client.base_url, "http://localhost:9999");
        assert_eq!(client.api_version, DEFAULT_API_VERSION);
        assert_eq!(client.event_id_field_key(), DEFAULT_EVENT_ID_FIELD_KEY);
    }

    #[test]
    fn test_contact_id_must_be_a_plain_token() {
        assert!(validate_contact_id("aBc123-xy_z").is_ok());
        for bad in ["", "  ", "../users/victim", "a/b", "a?b=1", "a#b", "%2e%2e", "a b"] {
            assert!(
                matches!(validate_contact_id(bad), Err(GhlError::InvalidInput(_))),
                "{bad:?} accepted"
            );
        }
    }

    #[test]
    fn test_update_request_shape() {
        let fields = [CustomFieldValue {
            key: DEFAULT_EVENT_ID_FIELD_KEY.to_string(),
            field_value: "evt-1".to_string(),
        }];
        let body = serde_json::to_value(UpdateContactRequest {
            custom_fields: &fields,
        })
        .unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "customFields": [
                    { "key": "google_calendar_event_id_from_make", "field_value": "evt-1" }
                ]
            })
        );
    }
}
