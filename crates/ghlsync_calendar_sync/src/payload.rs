//! The loosely typed webhook body GoHighLevel sends.
//!
//! GHL posts custom fields under their display labels, with values that may be
//! strings, numbers, booleans or null depending on the field type and on how
//! the workflow was configured. Accessors here collapse all of that into
//! "present and non-empty" or absent.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use crate::error::SyncError;

/// Field labels as they appear in the webhook body.
pub mod fields {
    pub const OPPORTUNITY_NAME: &str = "Opportunity Name";
    pub const EVENT_DATE: &str = "Event Date";
    pub const PHOTOGRAPHY_HOURS: &str = "Photography Hours";
    pub const VIDEOGRAPHY_HOURS: &str = "Videography Hours";
    pub const PHOTOGRAPHY_START_TIME: &str = "Photography Start Time";
    pub const VIDEOGRAPHY_START_TIME: &str = "Videography Start Time";
    pub const DRONE_SERVICES: &str = "Drone Services";
    pub const PROJECT_LOCATION: &str = "Project Location";
    pub const SECONDARY_LOCATION: &str = "Secondary Location";
    pub const ASSIGNED_PHOTOGRAPHER: &str = "Assigned Photographer";
    pub const ASSIGNED_VIDEOGRAPHER: &str = "Assigned Videographer";
    pub const TYPE_OF_EVENT: &str = "Type of Event";
    pub const STAGE: &str = "stage";
    pub const PIPELINE: &str = "pipeline";
    pub const CONTACT_ID: &str = "contact_id";
}

/// Names the calendar back-reference has had over time, in lookup order.
pub const BACK_REFERENCE_KEYS: [&str; 3] = [
    "Calendar Event ID",
    "Google Calendar Event ID From Make",
    "google_calendar_event_id_from_make",
];

/// Id of the calendar event previously created for this contact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackReference(String);

impl BackReference {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BackReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What the GHL pipeline asks us to do with the opportunity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineRoute {
    /// Job applicants never get a calendar event.
    Skip,
    /// Archived opportunities lose their event.
    Remove,
    Upsert,
}

/// The raw webhook body.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TriggerPayload(
    #[cfg_attr(feature = "openapi", schema(value_type = Object))] Map<String, Value>,
);

impl TriggerPayload {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Accepts any JSON value, rejecting everything but an object.
    pub fn from_value(value: Value) -> Result<Self, SyncError> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            Value::Null => Ok(Self::default()),
            other => Err(SyncError::Validation(format!(
                "Request body must be a JSON object, got {}",
                json_type_name(&other)
            ))),
        }
    }

    /// The value under `key`, unless it is null or a blank string.
    pub fn raw(&self, key: &str) -> Option<&Value> {
        match self.0.get(key)? {
            Value::Null => None,
            Value::String(s) if s.trim().is_empty() => None,
            value => Some(value),
        }
    }

    /// The value under `key` as trimmed text. Numbers and booleans are rendered.
    pub fn text(&self, key: &str) -> Option<String> {
        match self.raw(key)? {
            Value::String(s) => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// First non-empty legacy back-reference field.
    pub fn back_reference(&self) -> Option<BackReference> {
        BACK_REFERENCE_KEYS
            .iter()
            .find_map(|key| self.text(key))
            .map(BackReference)
    }

    pub fn contact_id(&self) -> Option<String> {
        self.text(fields::CONTACT_ID)
    }

    pub fn opportunity_name(&self) -> Option<String> {
        self.text(fields::OPPORTUNITY_NAME)
    }

    pub fn pipeline_route(&self) -> PipelineRoute {
        match self.text(fields::PIPELINE) {
            Some(p) if p.eq_ignore_ascii_case("APPLICANTS") => PipelineRoute::Skip,
            Some(p) if p.eq_ignore_ascii_case("ARCHIVED") => PipelineRoute::Remove,
            _ => PipelineRoute::Upsert,
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
