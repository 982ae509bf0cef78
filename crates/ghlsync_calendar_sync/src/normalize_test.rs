#[cfg(test)]
mod tests {
    use crate::error::SyncError;
    use crate::normalize::*;
    use crate::payload::TriggerPayload;
    use chrono::{NaiveDate, NaiveTime};
    use chrono_tz::Tz;
    use serde_json::{json, Value};

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn normalizer(policy: DatePolicy) -> Normalizer {
        Normalizer::new(Tz::America__New_York, "primary", policy)
    }

    fn payload(value: Value) -> TriggerPayload {
        TriggerPayload::from_value(value).unwrap()
    }

    #[test]
    fn test_parse_hours_variants() {
        assert_eq!(parse_hours(Some(&json!("6"))), 6);
        assert_eq!(parse_hours(Some(&json!("6 hours"))), 6);
        assert_eq!(parse_hours(Some(&json!("about 8h"))), 8);
        assert_eq!(parse_hours(Some(&json!(5))), 5);
        assert_eq!(parse_hours(Some(&json!(5.9))), 5);
        assert_eq!(parse_hours(Some(&json!(-3))), 0);
        assert_eq!(parse_hours(Some(&json!("none"))), 0);
        assert_eq!(parse_hours(Some(&json!(true))), 0);
        assert_eq!(parse_hours(None), 0);
        assert_eq!(parse_hours(Some(&json!("99999999999999"))), u32::MAX);
    }

    #[test]
    fn test_parse_start_time_formats() {
        assert_eq!(parse_start_time("2:00 PM"), Some(t(14, 0)));
        assert_eq!(parse_start_time("2:30pm"), Some(t(14, 30)));
        assert_eq!(parse_start_time("10:00 AM"), Some(t(10, 0)));
        assert_eq!(parse_start_time("12:00 AM"), Some(t(0, 0)));
        assert_eq!(parse_start_time("12:15 PM"), Some(t(12, 15)));
        assert_eq!(parse_start_time("14:45"), Some(t(14, 45)));
        assert_eq!(parse_start_time(" 9:05 am "), Some(t(9, 5)));

        assert_eq!(parse_start_time("13:00 PM"), None);
        assert_eq!(parse_start_time("25:00"), None);
        assert_eq!(parse_start_time("noon"), None);
        assert_eq!(parse_start_time("2 PM"), None);
        assert_eq!(parse_start_time(""), None);
    }

    #[test]
    fn test_pick_start_time() {
        assert_eq!(pick_start_time(Some(t(14, 0)), Some(t(13, 0))), t(13, 0));
        assert_eq!(pick_start_time(Some(t(9, 0)), None), t(9, 0));
        assert_eq!(pick_start_time(None, Some(t(16, 30))), t(16, 30));
        assert_eq!(pick_start_time(None, None), t(10, 0));
    }

    #[test]
    fn test_duration_floor() {
        assert_eq!(event_duration_hours(0, 0), 4);
        assert_eq!(event_duration_hours(2, 3), 4);
        assert_eq!(event_duration_hours(6, 0), 6);
        assert_eq!(event_duration_hours(5, 8), 8);
        assert_eq!(event_duration_hours(30, 0), MAX_EVENT_HOURS);
    }

    #[test]
    fn test_huge_hour_count_is_capped() {
        let p = payload(json!({
            "Photography Hours": "99999999999 hours",
            "Videography Hours": 1e300,
            "Event Date": "2025-07-15"
        }));
        let event = normalizer(DatePolicy::Lenient)
            .normalize(&p, d(2025, 6, 1))
            .unwrap();
        assert_eq!(event.duration_hours, MAX_EVENT_HOURS);
        assert_eq!(event.end.to_rfc3339(), "2025-07-16T10:00:00-04:00");
    }

    #[test]
    fn test_start_in_spring_forward_gap_moves_past_it() {
        let p = payload(json!({
            "Photography Start Time": "2:30 AM",
            "Event Date": "2026-03-08"
        }));
        let event = normalizer(DatePolicy::Lenient)
            .normalize(&p, d(2025, 6, 1))
            .unwrap();
        assert_eq!(event.start.date_naive(), d(2026, 3, 8));
        assert_eq!(event.start.to_rfc3339(), "2026-03-08T03:30:00-04:00");
    }

    #[test]
    fn test_ambiguous_fall_back_time_takes_earlier_offset() {
        let p = payload(json!({
            "Photography Start Time": "1:30 AM",
            "Event Date": "2025-11-02"
        }));
        let event = normalizer(DatePolicy::Lenient)
            .normalize(&p, d(2025, 6, 1))
            .unwrap();
        assert_eq!(event.start.to_rfc3339(), "2025-11-02T01:30:00-04:00");
    }

    #[test]
    fn test_drone_flag() {
        assert!(has_drone_service(Some(&json!(true))));
        assert!(has_drone_service(Some(&json!("Yes"))));
        assert!(has_drone_service(Some(&json!(" y "))));
        assert!(has_drone_service(Some(&json!("TRUE"))));
        assert!(!has_drone_service(Some(&json!(false))));
        assert!(!has_drone_service(Some(&json!("No"))));
        assert!(!has_drone_service(Some(&json!("yes please"))));
        assert!(!has_drone_service(Some(&json!(1))));
        assert!(!has_drone_service(None));
    }

    #[test]
    fn test_booked_and_color() {
        assert!(is_stage_booked(Some("booked")));
        assert!(is_stage_booked(Some("BOOKED")));
        assert!(!is_stage_booked(Some("lead")));
        assert!(!is_stage_booked(Some("booked later")));
        assert!(!is_stage_booked(None));
        assert_eq!(EventColor::Booked.color_id(), "11");
        assert_eq!(EventColor::Lead.color_id(), "6");
    }

    #[test]
    fn test_parse_event_date_formats() {
        assert_eq!(parse_event_date("2025-07-15"), Some(d(2025, 7, 15)));
        assert_eq!(parse_event_date("03/01/2026"), Some(d(2026, 3, 1)));
        assert_eq!(parse_event_date("03/01/26T10:00:00"), Some(d(2026, 3, 1)));
        assert_eq!(parse_event_date("12/31/99"), Some(d(1999, 12, 31)));
        assert_eq!(parse_event_date("2025-07-15T00:00:00Z"), Some(d(2025, 7, 15)));

        assert_eq!(parse_event_date("not a date"), None);
        assert_eq!(parse_event_date("13/40/2025"), None);
        assert_eq!(parse_event_date("2025-02-30"), None);
    }

    #[test]
    fn test_build_title() {
        assert_eq!(
            build_title(Some("Smith Wedding"), 6, 0, false, true),
            "Smith Wedding - Photo"
        );
        assert_eq!(
            build_title(Some("Smith Wedding (Lead)"), 6, 4, true, false),
            "Smith Wedding - Photo/Video/Drone (Lead)"
        );
        assert_eq!(build_title(None, 0, 0, false, false), "Event (Lead)");
        assert_eq!(build_title(Some("(Lead)"), 0, 0, false, true), "Event");
    }

    #[test]
    fn test_build_description_includes_present_fields_only() {
        let description = build_description(&DescriptionDetails {
            event_type: Some("Wedding"),
            photo_hours: 6,
            drone: true,
            project_location: Some("Central Park"),
            start: t(14, 0),
            ..Default::default()
        });

        assert!(description.starts_with("<hr><br><b>EVENT DETAILS</b><br>"));
        assert!(description.contains("🎉 Type of Event: Wedding"));
        assert!(description.contains("📸 Photography Hours: 6"));
        assert!(!description.contains("Videography Hours"));
        assert!(description.contains("🚁 Drone Services: Yes"));
        assert!(description.contains("📍 Project Location: Central Park"));
        assert!(!description.contains("Assigned Photographer"));
        assert!(description.contains("⏰ Start Time: 2:00 PM"));
        assert!(description.ends_with("<br><br><hr>"));
    }

    #[test]
    fn test_booked_photo_scenario() {
        let p = payload(json!({
            "Photography Hours": "6",
            "Videography Hours": "0",
            "stage": "booked",
            "Event Date": "2025-07-15"
        }));
        let event = normalizer(DatePolicy::Lenient)
            .normalize(&p, d(2030, 1, 1))
            .unwrap();

        assert_eq!(event.duration_hours, 6);
        assert!(event.is_booked);
        assert_eq!(event.color, EventColor::Booked);
        assert!(!event.title.contains("(Lead)"));
        assert_eq!(event.title, "Event - Photo");
        assert_eq!(event.date, d(2025, 7, 15));
        assert!(!event.date_defaulted);
        assert_eq!(event.start.to_rfc3339(), "2025-07-15T10:00:00-04:00");
        assert_eq!(event.end.to_rfc3339(), "2025-07-15T16:00:00-04:00");
    }

    #[test]
    fn test_empty_payload_defaults() {
        let today = d(2025, 1, 20);
        let event = normalizer(DatePolicy::Lenient)
            .normalize(&TriggerPayload::default(), today)
            .unwrap();

        assert_eq!(event.date, today);
        assert!(event.date_defaulted);
        assert_eq!(event.duration_hours, 4);
        assert_eq!(event.start.to_rfc3339(), "2025-01-20T10:00:00-05:00");
        assert_eq!(event.color, EventColor::Lead);
        assert_eq!(event.title, "Event (Lead)");
        assert_eq!(event.location, None);
    }

    #[test]
    fn test_bad_date_policy() {
        let p = payload(json!({ "Event Date": "sometime in June" }));
        let today = d(2025, 6, 1);

        let lenient = normalizer(DatePolicy::Lenient).normalize(&p, today).unwrap();
        assert_eq!(lenient.date, today);
        assert!(lenient.date_defaulted);

        let strict = normalizer(DatePolicy::Strict).normalize(&p, today);
        assert!(matches!(strict, Err(SyncError::Validation(_))));
    }

    #[test]
    fn test_location_falls_back_to_secondary() {
        let p = payload(json!({ "Secondary Location": "Hotel Lobby" }));
        let event = normalizer(DatePolicy::Lenient)
            .normalize(&p, d(2025, 6, 1))
            .unwrap();
        assert_eq!(event.location.as_deref(), Some("Hotel Lobby"));

        let calendar_event = event.to_calendar_event();
        assert_eq!(calendar_event.time_zone, "America/New_York");
        assert_eq!(calendar_event.color_id.as_deref(), Some("6"));
        assert_eq!(calendar_event.location.as_deref(), Some("Hotel Lobby"));
    }

    #[test]
    fn test_earlier_start_time_wins() {
        let p = payload(json!({
            "Photography Start Time": "2:00 PM",
            "Videography Start Time": "1:00 PM",
            "Event Date": "03/01/2026"
        }));
        let event = normalizer(DatePolicy::Lenient)
            .normalize(&p, d(2025, 6, 1))
            .unwrap();
        assert_eq!(event.start.to_rfc3339(), "2026-03-01T13:00:00-05:00");
        assert!(event.description.contains("⏰ Start Time: 1:00 PM"));
    }
}
