//! Turns a loosely typed GHL payload into one calendar event.
//!
//! Every helper here is pure; "today" is passed in so the date fallback can be
//! tested without touching the clock.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Timelike};
use chrono_tz::Tz;
use ghlsync_common::services::{CalendarEvent, LEAD_MARKER};
use serde_json::Value;
use tracing::warn;

use crate::error::SyncError;
use crate::payload::{fields, TriggerPayload};

/// Shortest event ever put on the calendar.
pub const MIN_EVENT_HOURS: u32 = 4;

/// Longest event ever put on the calendar.
pub const MAX_EVENT_HOURS: u32 = 24;

/// Used when neither start time field parses.
pub fn default_start() -> NaiveTime {
    NaiveTime::from_hms_opt(10, 0, 0).unwrap_or(NaiveTime::MIN)
}

/// Google Calendar color of the event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventColor {
    /// Tangerine
    Lead,
    /// Tomato
    Booked,
}

impl EventColor {
    pub fn color_id(self) -> &'static str {
        match self {
            EventColor::Lead => "6",
            EventColor::Booked => "11",
        }
    }
}

/// What to do with an `Event Date` that does not parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DatePolicy {
    /// Fall back to today and log a warning.
    #[default]
    Lenient,
    /// Reject the webhook.
    Strict,
}

/// Hour count from a number or free text such as `"6 hours"`.
///
/// Numbers are truncated, negatives count as zero. Strings yield their first run
/// of ASCII digits. Everything else is zero.
pub fn parse_hours(value: Option<&Value>) -> u32 {
    match value {
        Some(Value::Number(n)) => {
            if let Some(u) = n.as_u64() {
                u32::try_from(u).unwrap_or(u32::MAX)
            } else if let Some(f) = n.as_f64() {
                // `as` saturates and maps NaN to 0
                if f > 0.0 {
                    f as u32
                } else {
                    0
                }
            } else {
                0
            }
        }
        Some(Value::String(s)) => leading_integer(s).unwrap_or(0),
        _ => 0,
    }
}

fn leading_integer(text: &str) -> Option<u32> {
    let digits: String = text
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    if digits.is_empty() {
        return None;
    }
    Some(digits.bytes().fold(0u32, |acc, b| {
        acc.saturating_mul(10).saturating_add(u32::from(b - b'0'))
    }))
}

/// Parses `2:00 PM`, `2:00pm`, `12:30 am` or 24-hour `14:00`.
pub fn parse_start_time(text: &str) -> Option<NaiveTime> {
    let upper = text.trim().to_ascii_uppercase();
    let (clock, meridiem) = if let Some(rest) = upper.strip_suffix("AM") {
        (rest.trim_end(), Some(false))
    } else if let Some(rest) = upper.strip_suffix("PM") {
        (rest.trim_end(), Some(true))
    } else {
        (upper.as_str(), None)
    };

    let (hour, minute) = clock.split_once(':')?;
    if hour.is_empty() || hour.len() > 2 || minute.len() != 2 {
        return None;
    }
    if !hour.bytes().chain(minute.bytes()).all(|b| b.is_ascii_digit()) {
        return None;
    }
    let hour: u32 = hour.parse().ok()?;
    let minute: u32 = minute.parse().ok()?;

    let hour = match meridiem {
        Some(pm) => {
            if !(1..=12).contains(&hour) {
                return None;
            }
            match (pm, hour) {
                (false, 12) => 0,
                (true, 12) => 12,
                (true, h) => h + 12,
                (false, h) => h,
            }
        }
        None => hour,
    };
    NaiveTime::from_hms_opt(hour, minute, 0)
}

/// Earlier of the two start times, the one present, or 10:00.
pub fn pick_start_time(photo: Option<NaiveTime>, video: Option<NaiveTime>) -> NaiveTime {
    match (photo, video) {
        (Some(p), Some(v)) => p.min(v),
        (Some(t), None) | (None, Some(t)) => t,
        (None, None) => default_start(),
    }
}

pub fn event_duration_hours(photo_hours: u32, video_hours: u32) -> u32 {
    photo_hours
        .max(video_hours)
        .clamp(MIN_EVENT_HOURS, MAX_EVENT_HOURS)
}

pub fn has_drone_service(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => matches!(s.trim().to_lowercase().as_str(), "yes" | "true" | "y"),
        _ => false,
    }
}

pub fn is_stage_booked(stage: Option<&str>) -> bool {
    stage.is_some_and(|s| s.trim().eq_ignore_ascii_case("booked"))
}

/// Parses `YYYY-MM-DD`, `MM/DD/YYYY` or `MM/DD/YY`, ignoring a trailing `T...` part.
///
/// Two-digit years below 50 are 20xx, the rest 19xx.
pub fn parse_event_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    let date_part = text.split_once('T').map_or(text, |(date, _)| date).trim();

    if date_part.contains('/') {
        let mut parts = date_part.split('/');
        let month: u32 = parts.next()?.trim().parse().ok()?;
        let day: u32 = parts.next()?.trim().parse().ok()?;
        let year_text = parts.next()?.trim();
        if parts.next().is_some() {
            return None;
        }
        let year: i32 = year_text.parse().ok()?;
        let year = match year_text.len() {
            1 | 2 if year < 50 => 2000 + year,
            1 | 2 => 1900 + year,
            4 => year,
            _ => return None,
        };
        NaiveDate::from_ymd_opt(year, month, day)
    } else {
        NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
    }
}

/// `2:00 PM` style rendering used in the description.
pub fn format_clock(time: NaiveTime) -> String {
    let (pm, hour) = time.hour12();
    format!(
        "{}:{:02} {}",
        hour,
        time.minute(),
        if pm { "PM" } else { "AM" }
    )
}

/// `Name - Photo/Video/Drone`, with ` (Lead)` appended unless booked.
pub fn build_title(
    opportunity_name: Option<&str>,
    photo_hours: u32,
    video_hours: u32,
    drone: bool,
    is_booked: bool,
) -> String {
    let base = opportunity_name
        .map(|name| name.replace(LEAD_MARKER, "").trim().to_string())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| "Event".to_string());

    let mut services = Vec::new();
    if photo_hours > 0 {
        services.push("Photo");
    }
    if video_hours > 0 {
        services.push("Video");
    }
    if drone {
        services.push("Drone");
    }

    let mut title = base;
    if !services.is_empty() {
        title.push_str(" - ");
        title.push_str(&services.join("/"));
    }
    if !is_booked {
        title.push(' ');
        title.push_str(LEAD_MARKER);
    }
    title
}

/// Inputs of the HTML description block.
#[derive(Debug, Default, Clone)]
pub struct DescriptionDetails<'a> {
    pub event_type: Option<&'a str>,
    pub photo_hours: u32,
    pub video_hours: u32,
    pub drone: bool,
    pub project_location: Option<&'a str>,
    pub secondary_location: Option<&'a str>,
    pub photographer: Option<&'a str>,
    pub videographer: Option<&'a str>,
    pub start: NaiveTime,
}

pub fn build_description(details: &DescriptionDetails<'_>) -> String {
    let mut parts = vec!["<hr>".to_string(), "<b>EVENT DETAILS</b>".to_string()];

    if let Some(event_type) = details.event_type {
        parts.push(format!("🎉 Type of Event: {}", event_type));
    }
    if details.photo_hours > 0 {
        parts.push(format!("📸 Photography Hours: {}", details.photo_hours));
    }
    if details.video_hours > 0 {
        parts.push(format!("🎬 Videography Hours: {}", details.video_hours));
    }
    if details.drone {
        parts.push("🚁 Drone Services: Yes".to_string());
    }
    if let Some(location) = details.project_location {
        parts.push(format!("📍 Project Location: {}", location));
    }
    if let Some(location) = details.secondary_location {
        parts.push(format!("📍 Secondary Location: {}", location));
    }
    if let Some(name) = details.photographer {
        parts.push(format!("👨‍💼 Assigned Photographer: {}", name));
    }
    if let Some(name) = details.videographer {
        parts.push(format!("👨‍💼 Assigned Videographer: {}", name));
    }
    parts.push(format!("⏰ Start Time: {}", format_clock(details.start)));
    parts.push("<br><hr>".to_string());

    parts.join("<br>")
}

/// A payload reduced to what the calendar needs.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedEvent {
    pub title: String,
    pub description: String,
    pub location: Option<String>,
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
    pub duration_hours: u32,
    pub is_booked: bool,
    pub color: EventColor,
    pub calendar_id: String,
    pub date: NaiveDate,
    /// True when the date came from the "today" fallback.
    pub date_defaulted: bool,
}

impl NormalizedEvent {
    pub fn time_zone(&self) -> Tz {
        self.start.timezone()
    }

    pub fn to_calendar_event(&self) -> CalendarEvent {
        CalendarEvent {
            summary: self.title.clone(),
            description: Some(self.description.clone()),
            location: self.location.clone(),
            start_time: self.start.to_rfc3339(),
            end_time: self.end.to_rfc3339(),
            time_zone: self.time_zone().name().to_string(),
            color_id: Some(self.color.color_id().to_string()),
        }
    }
}

/// Local wall-clock time in `tz`.
///
/// Ambiguous times take the earlier offset. Times skipped by a DST jump move
/// forward past the gap, the same way Google reads a local time in a zone.
fn localize(tz: Tz, local: NaiveDateTime) -> DateTime<Tz> {
    tz.from_local_datetime(&local)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(local + Duration::hours(1))).earliest())
        .unwrap_or_else(|| tz.from_utc_datetime(&local))
}

/// Payload-to-event conversion bound to one calendar and time zone.
#[derive(Debug, Clone)]
pub struct Normalizer {
    pub time_zone: Tz,
    pub calendar_id: String,
    pub date_policy: DatePolicy,
}

impl Normalizer {
    pub fn new(time_zone: Tz, calendar_id: impl Into<String>, date_policy: DatePolicy) -> Self {
        Self {
            time_zone,
            calendar_id: calendar_id.into(),
            date_policy,
        }
    }

    /// Today's date in the configured zone.
    pub fn today(&self) -> NaiveDate {
        chrono::Utc::now().with_timezone(&self.time_zone).date_naive()
    }

    fn resolve_date(
        &self,
        raw: Option<String>,
        today: NaiveDate,
    ) -> Result<(NaiveDate, bool), SyncError> {
        let Some(raw) = raw else {
            return Ok((today, true));
        };
        match parse_event_date(&raw) {
            Some(date) => Ok((date, false)),
            None => match self.date_policy {
                DatePolicy::Strict => Err(SyncError::Validation(format!(
                    "Unrecognized Event Date '{}'",
                    raw
                ))),
                DatePolicy::Lenient => {
                    warn!("Unrecognized Event Date '{}', using {}", raw, today);
                    Ok((today, true))
                }
            },
        }
    }

    pub fn normalize(
        &self,
        payload: &TriggerPayload,
        today: NaiveDate,
    ) -> Result<NormalizedEvent, SyncError> {
        let photo_hours = parse_hours(payload.raw(fields::PHOTOGRAPHY_HOURS));
        let video_hours = parse_hours(payload.raw(fields::VIDEOGRAPHY_HOURS));
        let drone = has_drone_service(payload.raw(fields::DRONE_SERVICES));
        let stage = payload.text(fields::STAGE);
        let is_booked = is_stage_booked(stage.as_deref());

        let start_time = pick_start_time(
            payload
                .text(fields::PHOTOGRAPHY_START_TIME)
                .and_then(|t| parse_start_time(&t)),
            payload
                .text(fields::VIDEOGRAPHY_START_TIME)
                .and_then(|t| parse_start_time(&t)),
        );
        let duration_hours = event_duration_hours(photo_hours, video_hours);
        let (date, date_defaulted) = self.resolve_date(payload.text(fields::EVENT_DATE), today)?;

        let start = localize(self.time_zone, date.and_time(start_time));
        let end = start
            .checked_add_signed(Duration::hours(i64::from(duration_hours)))
            .ok_or_else(|| {
                SyncError::Validation(format!("Event on {} ends out of range", date))
            })?;

        let name = payload.opportunity_name();
        let event_type = payload.text(fields::TYPE_OF_EVENT);
        let project_location = payload.text(fields::PROJECT_LOCATION);
        let secondary_location = payload.text(fields::SECONDARY_LOCATION);
        let photographer = payload.text(fields::ASSIGNED_PHOTOGRAPHER);
        let videographer = payload.text(fields::ASSIGNED_VIDEOGRAPHER);

        let description = build_description(&DescriptionDetails {
            event_type: event_type.as_deref(),
            photo_hours,
            video_hours,
            drone,
            project_location: project_location.as_deref(),
            secondary_location: secondary_location.as_deref(),
            photographer: photographer.as_deref(),
            videographer: videographer.as_deref(),
            start: start_time,
        });

        Ok(NormalizedEvent {
            title: build_title(name.as_deref(), photo_hours, video_hours, drone, is_booked),
            description,
            location: project_location.or(secondary_location),
            start,
            end,
            duration_hours,
            is_booked,
            color: if is_booked {
                EventColor::Booked
            } else {
                EventColor::Lead
            },
            calendar_id: self.calendar_id.clone(),
            date,
            date_defaulted,
        })
    }
}
