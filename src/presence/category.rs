use chrono::{NaiveDateTime, Timelike};
use std::borrow::Cow;
use std::fmt;

use crate::consts::{LAST_SEEN_FILE_FORMAT, LAST_SEEN_FORMAT};
use crate::utils::Timezone;

use super::types::{Account, Presence};

/// Where a username ends up after one lookup
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum Category {
    CurrentlyOnline,
    /// Wall-clock time in the configured zone, minute precision
    LastSeenAt(NaiveDateTime),
    LastSeenRecently,
    LastSeenWeekAgo,
    LastSeenMonthAgo,
    LastSeenLongAgo,
    Bot,
    Error,
}

impl Category {
    /// Result file name for this category
    pub(crate) fn file_name(&self) -> Cow<'static, str> {
        match self {
            Category::Error => Cow::Borrowed("errors.txt"),
            Category::Bot => Cow::Borrowed("bots.txt"),
            Category::CurrentlyOnline => Cow::Borrowed("online.txt"),
            Category::LastSeenRecently => Cow::Borrowed("recently.txt"),
            Category::LastSeenWeekAgo => Cow::Borrowed("week.txt"),
            Category::LastSeenMonthAgo => Cow::Borrowed("month.txt"),
            Category::LastSeenLongAgo => Cow::Borrowed("longtime.txt"),
            Category::LastSeenAt(at) => {
                Cow::Owned(format!("lastseen_{}.txt", at.format(LAST_SEEN_FILE_FORMAT)))
            }
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::CurrentlyOnline => f.write_str("Currently online"),
            Category::LastSeenAt(at) => write!(f, "Last seen on {}", at.format(LAST_SEEN_FORMAT)),
            Category::LastSeenRecently => f.write_str("Last seen recently"),
            Category::LastSeenWeekAgo => f.write_str("Last seen week ago"),
            Category::LastSeenMonthAgo => f.write_str("Last seen month ago"),
            Category::LastSeenLongAgo => f.write_str("Last seen long time ago"),
            Category::Bot => f.write_str("Bot"),
            Category::Error => f.write_str("Error"),
        }
    }
}

/// Map a fetched account to its category. Bots win over any presence value.
pub(crate) fn classify(account: &Account, timezone: Timezone) -> Category {
    if account.bot {
        return Category::Bot;
    }
    match &account.status {
        Presence::Online => Category::CurrentlyOnline,
        Presence::Offline { was_online } => {
            let wall = timezone.to_wall_clock(*was_online);
            // Seconds are not rendered, so they must not split buckets either.
            let minute = wall
                .with_second(0)
                .and_then(|w| w.with_nanosecond(0))
                .unwrap_or(wall);
            Category::LastSeenAt(minute)
        }
        Presence::Recently => Category::LastSeenRecently,
        Presence::LastWeek => Category::LastSeenWeekAgo,
        Presence::LastMonth => Category::LastSeenMonthAgo,
        Presence::Unknown => Category::LastSeenLongAgo,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn account(bot: bool, status: Presence) -> Account {
        Account { bot, status }
    }

    fn offline_at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> Presence {
        Presence::Offline {
            was_online: Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap(),
        }
    }

    #[test]
    fn fixed_kinds_map_to_fixed_categories() {
        let tz = Timezone::default();
        let cases = [
            (Presence::Online, Category::CurrentlyOnline),
            (Presence::Recently, Category::LastSeenRecently),
            (Presence::LastWeek, Category::LastSeenWeekAgo),
            (Presence::LastMonth, Category::LastSeenMonthAgo),
            (Presence::Unknown, Category::LastSeenLongAgo),
        ];
        for (presence, expected) in cases {
            assert_eq!(classify(&account(false, presence), tz), expected);
        }
    }

    #[test]
    fn bots_are_always_bots() {
        let tz = Timezone::default();
        for presence in [
            Presence::Online,
            Presence::Recently,
            Presence::LastWeek,
            Presence::LastMonth,
            Presence::Unknown,
            offline_at(2024, 3, 5, 14, 7, 0),
        ] {
            assert_eq!(classify(&account(true, presence), tz), Category::Bot);
        }
    }

    #[test]
    fn offline_renders_exact_time() {
        let category = classify(
            &account(false, offline_at(2024, 3, 5, 14, 7, 42)),
            Timezone::default(),
        );
        assert_eq!(category.to_string(), "Last seen on 05/03/2024, 14:07");
        assert_eq!(category.file_name(), "lastseen_05-03-2024_14-07.txt");
    }

    #[test]
    fn offline_within_same_minute_shares_a_bucket() {
        let tz = Timezone::default();
        let a = classify(&account(false, offline_at(2024, 3, 5, 14, 7, 1)), tz);
        let b = classify(&account(false, offline_at(2024, 3, 5, 14, 7, 59)), tz);
        let c = classify(&account(false, offline_at(2024, 3, 5, 14, 8, 0)), tz);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn offline_uses_configured_timezone() {
        let tz = Timezone::parse(Some("Asia/Tokyo")).unwrap();
        let category = classify(&account(false, offline_at(2024, 3, 5, 14, 7, 0)), tz);
        assert_eq!(category.to_string(), "Last seen on 05/03/2024, 23:07");
    }

    #[test]
    fn static_file_names() {
        assert_eq!(Category::Error.file_name(), "errors.txt");
        assert_eq!(Category::Bot.file_name(), "bots.txt");
        assert_eq!(Category::LastSeenRecently.file_name(), "recently.txt");
        assert_eq!(Category::LastSeenWeekAgo.file_name(), "week.txt");
        assert_eq!(Category::LastSeenMonthAgo.file_name(), "month.txt");
        assert_eq!(Category::LastSeenLongAgo.file_name(), "longtime.txt");
        assert_eq!(Category::CurrentlyOnline.file_name(), "online.txt");
    }

    #[test]
    fn display_text() {
        assert_eq!(Category::CurrentlyOnline.to_string(), "Currently online");
        assert_eq!(Category::LastSeenLongAgo.to_string(), "Last seen long time ago");
        assert_eq!(Category::Error.to_string(), "Error");
    }
}
