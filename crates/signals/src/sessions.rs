use chrono::{DateTime, FixedOffset, Timelike, Utc};

/// Eastern Standard Time, fixed at UTC-5. Kill-zone hours follow the
/// ICT convention which quotes them in EST year round.
fn est() -> FixedOffset {
    FixedOffset::west_opt(5 * 3600).unwrap()
}

/// Named trading session for the given instant, by UTC hour.
pub fn market_session(now: DateTime<Utc>) -> &'static str {
    match now.hour() {
        8..=12 => "London",
        13..=20 => "New York",
        _ => "Asian",
    }
}

/// ICT kill zones: London 02:00-05:00 EST, New York 08:30-11:00 EST.
/// Returns the zone name and whether the instant falls inside one.
pub fn kill_zone(now: DateTime<Utc>) -> (&'static str, bool) {
    let local = now.with_timezone(&est());
    let minutes = local.hour() * 60 + local.minute();

    if (2 * 60..5 * 60).contains(&minutes) {
        ("London Kill Zone", true)
    } else if (8 * 60 + 30..11 * 60).contains(&minutes) {
        ("New York Kill Zone", true)
    } else {
        ("Outside Kill Zones", false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, hour, minute, 0).unwrap()
    }

    #[test]
    fn london_kill_zone_spans_0200_to_0500_est() {
        // 03:00 EST is 08:00 UTC.
        assert_eq!(kill_zone(at(8, 0)), ("London Kill Zone", true));
        // 05:00 EST is past the window.
        assert_eq!(kill_zone(at(10, 0)).1, false);
    }

    #[test]
    fn new_york_kill_zone_starts_at_0830_est() {
        assert_eq!(kill_zone(at(13, 29)).1, false);
        assert_eq!(kill_zone(at(13, 30)), ("New York Kill Zone", true));
        assert_eq!(kill_zone(at(15, 59)).1, true);
        assert_eq!(kill_zone(at(16, 0)).1, false);
    }

    #[test]
    fn sessions_follow_utc_hours() {
        assert_eq!(market_session(at(9, 0)), "London");
        assert_eq!(market_session(at(14, 0)), "New York");
        assert_eq!(market_session(at(2, 0)), "Asian");
        assert_eq!(market_session(at(22, 0)), "Asian");
    }
}
