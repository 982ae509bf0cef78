#[cfg(test)]
mod tests {
    use crate::normalize::{
        build_title, event_duration_hours, parse_hours, parse_start_time, pick_start_time,
        MAX_EVENT_HOURS, MIN_EVENT_HOURS,
    };
    use chrono::NaiveTime;
    use proptest::prelude::*;
    use serde_json::json;

    fn clock(hour: u32, minute: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
    }

    proptest! {
        // Whatever trails the number is ignored
        #[test]
        fn test_leading_integer_wins(n in 0u32..100_000, suffix in "[ a-zA-Z]{0,12}") {
            let text = format!("{}{}", n, suffix);
            prop_assert_eq!(parse_hours(Some(&json!(text))), n);
        }

        #[test]
        fn test_duration_stays_within_bounds(photo in any::<u32>(), video in any::<u32>()) {
            let hours = event_duration_hours(photo, video);
            prop_assert!((MIN_EVENT_HOURS..=MAX_EVENT_HOURS).contains(&hours));
            prop_assert!(hours >= photo.min(MAX_EVENT_HOURS) && hours >= video.min(MAX_EVENT_HOURS));
            prop_assert!(
                hours == MIN_EVENT_HOURS || hours == MAX_EVENT_HOURS || hours == photo || hours == video
            );
        }

        #[test]
        fn test_earlier_start_is_chosen(
            h1 in 0u32..24, m1 in 0u32..60,
            h2 in 0u32..24, m2 in 0u32..60,
        ) {
            let a = clock(h1, m1);
            let b = clock(h2, m2);
            prop_assert_eq!(pick_start_time(Some(a), Some(b)), a.min(b));
            prop_assert_eq!(pick_start_time(Some(a), None), a);
            prop_assert_eq!(pick_start_time(None, Some(b)), b);
        }

        #[test]
        fn test_twelve_hour_clock_round_trips(h in 1u32..=12, m in 0u32..60, pm in any::<bool>()) {
            let text = format!("{}:{:02} {}", h, m, if pm { "PM" } else { "AM" });
            let expected_hour = match (pm, h) {
                (false, 12) => 0,
                (true, 12) => 12,
                (true, h) => h + 12,
                (false, h) => h,
            };
            prop_assert_eq!(parse_start_time(&text), Some(clock(expected_hour, m)));
        }

        #[test]
        fn test_lead_marker_only_when_not_booked(
            name in "[A-Za-z ]{0,20}",
            photo in 0u32..10,
            video in 0u32..10,
            drone in any::<bool>(),
            booked in any::<bool>(),
        ) {
            let title = build_title(Some(&name), photo, video, drone, booked);
            prop_assert_eq!(title.ends_with(" (Lead)"), !booked);
            prop_assert_eq!(title.matches("(Lead)").count(), usize::from(!booked));
        }
    }
}
