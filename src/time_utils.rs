use chrono::{DateTime, Duration, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use once_cell::sync::Lazy;
use regex::Regex;

/// Default wall-clock time for date-only expressions ("tomorrow", "on the
/// 12th"). The validator still rejects a resulting past instant, which
/// loops back to ask for a time.
pub const DEFAULT_REMINDER_TIME: NaiveTime = match NaiveTime::from_hms_opt(9, 0, 0) {
    Some(t) => t,
    None => unreachable!(),
};

static TEMPORAL_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        // Clock times: "10:50", "10:50pm", "8 pm", "at 8"
        r"(?i)\b\d{1,2}:\d{2}\b",
        r"(?i)\b\d{1,2}\s*(a\.?m\.?|p\.?m\.?)\b",
        r"(?i)\bat\s+\d{1,2}\b",
        r"(?i)\b(noon|midnight)\b",
        // Day words
        r"(?i)\b(today|tonight|tomorrow|yesterday|morning|afternoon|evening)\b",
        r"(?i)\b(monday|tuesday|wednesday|thursday|friday|saturday|sunday)\b",
        // Relative offsets: "in 2 hours", "in an hour"
        r"(?i)\bin\s+(a|an|one|two|three|four|five|ten|\d+)\s*(minute|min|hour|hr|day|week|month)s?\b",
        r"(?i)\b(next|this|coming)\s+(week|weekend|month|year)\b",
        // Calendar dates: "2026-03-01", "3/14", "the 12th", "august 9"
        r"\b\d{4}-\d{2}-\d{2}\b",
        r"\b\d{1,2}/\d{1,2}(/\d{2,4})?\b",
        r"(?i)\b\d{1,2}(st|nd|rd|th)\b",
        r"(?i)\b(january|february|march|april|june|july|august|september|october|november|december)\b",
        // "may" only counts as a month when followed by a day number
        r"(?i)\bmay\s+\d{1,2}\b",
        r"(?i)\b(jan|feb|mar|apr|jun|jul|aug|sept?|oct|nov|dec)\.?\s+\d{1,2}\b",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("temporal pattern must compile"))
    .collect()
});

static ALL_PETS_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)\b(all|both)\b",
        r"(?i)\bevery\s*(one|pet|dog|cat|animal)\b",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("all-pets pattern must compile"))
    .collect()
});

/// Words that carry no reminder purpose on their own. A message whose
/// non-temporal words all land in this set has nothing to title a reminder
/// after ("set a reminder for 10:50 pm").
const FILLER_WORDS: &[&str] = &[
    "a", "about", "add", "also", "am", "an", "and", "animal", "animals", "at", "both", "can",
    "cat", "cats", "could", "create", "daily", "do", "dog", "dogs", "every", "for", "hey", "hi",
    "i", "in", "it", "like", "make", "me", "monthly", "my", "need", "new", "of", "ok", "okay",
    "on", "one", "our", "pet", "pets", "please", "pm", "remind", "reminder", "reminders", "set",
    "schedule", "sure", "that", "the", "them", "this", "to", "up", "us", "want", "weekly",
    "will", "with", "would", "yeah", "yes", "you",
];

/// Does the message contain any temporal expression at all? Gates whether
/// extracted date/time fields are kept: no mention in the *current* turn
/// means no due date this turn, whatever the model claims.
pub fn mentions_time(message: &str) -> bool {
    TEMPORAL_PATTERNS.iter().any(|re| re.is_match(message))
}

/// Explicit all/both/every phrasing. Required before an extracted
/// `PetRef::All` is believed.
pub fn mentions_all_pets(message: &str) -> bool {
    ALL_PETS_PATTERNS.iter().any(|re| re.is_match(message))
}

fn normalize_word(word: &str) -> String {
    word.trim_matches(|c: char| c.is_ascii_punctuation() && c != '\'')
        .to_lowercase()
}

/// Check if a phrase appears as complete words in text. Case-insensitive,
/// punctuation-tolerant; works for multi-word pet names ("Mr Pickles").
pub fn contains_as_words(text: &str, phrase: &str) -> bool {
    let text_words: Vec<String> = text
        .split_whitespace()
        .map(normalize_word)
        .filter(|w| !w.is_empty())
        .collect();
    let phrase_words: Vec<String> = phrase
        .split_whitespace()
        .map(normalize_word)
        .filter(|w| !w.is_empty())
        .collect();
    if phrase_words.is_empty() {
        return false;
    }
    text_words
        .windows(phrase_words.len())
        .any(|window| window == phrase_words.as_slice())
}

/// Does the message carry an actionable purpose beyond filler, temporal
/// expressions, and pet names? Gates the extracted title: "remind me at 8"
/// names no task, so no title may be synthesized from it.
pub fn has_actionable_content(message: &str, pet_names: &[String]) -> bool {
    let mut stripped = message.to_string();
    for re in TEMPORAL_PATTERNS.iter() {
        stripped = re.replace_all(&stripped, " ").into_owned();
    }

    let pet_words: Vec<String> = pet_names
        .iter()
        .flat_map(|n| n.split_whitespace())
        .map(normalize_word)
        .collect();

    stripped.split_whitespace().map(normalize_word).any(|word| {
        !word.is_empty()
            && !word.chars().all(|c| c.is_ascii_digit())
            && !FILLER_WORDS.contains(&word.as_str())
            && !pet_words.contains(&word)
    })
}

/// Combine extracted date/time components into an absolute instant.
///
/// - date + time: taken as given.
/// - date only: `DEFAULT_REMINDER_TIME`.
/// - time only: today if that time has not yet passed locally, else tomorrow.
/// - neither: `None`.
pub fn resolve_due(
    date: Option<NaiveDate>,
    time: Option<NaiveTime>,
    now_local: NaiveDateTime,
    tz: Tz,
) -> Option<DateTime<Utc>> {
    let naive = match (date, time) {
        (Some(d), Some(t)) => d.and_time(t),
        (Some(d), None) => d.and_time(DEFAULT_REMINDER_TIME),
        (None, Some(t)) => {
            if t > now_local.time() {
                now_local.date().and_time(t)
            } else {
                (now_local.date() + Duration::days(1)).and_time(t)
            }
        }
        (None, None) => return None,
    };
    local_to_utc(naive, tz)
}

/// Interpret a naive local datetime in `tz` and convert to UTC. Ambiguous
/// wall-clock times (DST fall-back) take the earlier instant; nonexistent
/// ones (spring-forward gap) slide one hour later.
pub fn local_to_utc(naive: NaiveDateTime, tz: Tz) -> Option<DateTime<Utc>> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Some(dt.with_timezone(&Utc)),
        LocalResult::Ambiguous(early, _) => Some(early.with_timezone(&Utc)),
        LocalResult::None => tz
            .from_local_datetime(&(naive + Duration::hours(1)))
            .earliest()
            .map(|dt| dt.with_timezone(&Utc)),
    }
}

/// Parse an IANA zone id, e.g. "America/New_York". `None` on junk; the
/// caller decides the fallback (UTC) and owns the warning.
pub fn parse_timezone(raw: &str) -> Option<Tz> {
    raw.trim().parse::<Tz>().ok()
}

/// Render an absolute instant back in the user's zone for display.
pub fn format_local(due_at: DateTime<Utc>, tz: Tz) -> String {
    due_at
        .with_timezone(&tz)
        .format("%A, %B %-d at %-I:%M %p")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tz(name: &str) -> Tz {
        name.parse().unwrap()
    }

    #[test]
    fn test_mentions_time_positives() {
        for msg in [
            "remind me at 10:50 PM",
            "tomorrow morning",
            "in 2 hours",
            "in an hour",
            "next Friday", // weekday word
            "on the 12th",
            "vet visit on 2026-09-01",
            "feed them at 8",
            "grooming on may 14",
            "appointment 3/14",
            "tonight",
        ] {
            assert!(mentions_time(msg), "expected temporal mention in {:?}", msg);
        }
    }

    #[test]
    fn test_mentions_time_negatives() {
        for msg in [
            "set a reminder",
            "remind me to give Rex his medication",
            "you may want to ask",
            "for all my dogs please",
        ] {
            assert!(!mentions_time(msg), "unexpected temporal mention in {:?}", msg);
        }
    }

    #[test]
    fn test_mentions_all_pets() {
        assert!(mentions_all_pets("all my dogs"));
        assert!(mentions_all_pets("both of them"));
        assert!(mentions_all_pets("everyone needs flea treatment"));
        assert!(!mentions_all_pets("just Rex"));
    }

    #[test]
    fn test_actionable_content() {
        let pets = vec!["Rex".to_string(), "Mr Pickles".to_string()];
        assert!(has_actionable_content("remind me to give Rex his medication", &pets));
        assert!(has_actionable_content("walk the dog tomorrow", &pets));
        assert!(!has_actionable_content("set a reminder", &pets));
        assert!(!has_actionable_content("remind me at 10:50 PM", &pets));
        assert!(!has_actionable_content("a reminder for Mr Pickles please", &pets));
        assert!(!has_actionable_content("tomorrow at 8am", &pets));
    }

    #[test]
    fn test_contains_as_words() {
        assert!(contains_as_words("give Rex his pill", "rex"));
        assert!(contains_as_words("Mr. Pickles needs grooming", "mr pickles"));
        assert!(!contains_as_words("rexford needs a walk", "rex"));
    }

    #[test]
    fn test_bare_time_resolves_today_or_tomorrow() {
        let zone = tz("America/New_York");
        let now = NaiveDate::from_ymd_opt(2026, 8, 5)
            .unwrap()
            .and_hms_opt(14, 0, 0)
            .unwrap();

        // 22:50 has not passed at 14:00 — today.
        let due = resolve_due(None, NaiveTime::from_hms_opt(22, 50, 0), now, zone).unwrap();
        assert_eq!(
            due.with_timezone(&zone).naive_local(),
            NaiveDate::from_ymd_opt(2026, 8, 5)
                .unwrap()
                .and_hms_opt(22, 50, 0)
                .unwrap()
        );

        // 09:00 already passed at 14:00 — tomorrow.
        let due = resolve_due(None, NaiveTime::from_hms_opt(9, 0, 0), now, zone).unwrap();
        assert_eq!(
            due.with_timezone(&zone).naive_local(),
            NaiveDate::from_ymd_opt(2026, 8, 6)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap()
        );
    }

    #[test]
    fn test_date_only_defaults_morning() {
        let zone = tz("UTC");
        let now = NaiveDate::from_ymd_opt(2026, 8, 5)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        let due = resolve_due(NaiveDate::from_ymd_opt(2026, 8, 9), None, now, zone).unwrap();
        assert_eq!(
            due.naive_utc(),
            NaiveDate::from_ymd_opt(2026, 8, 9)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap()
        );
    }

    #[test]
    fn test_local_round_trip_no_drift() {
        // Local wall clock -> absolute -> back to the same zone is exact.
        for zone_name in ["America/New_York", "Asia/Kolkata", "Pacific/Auckland"] {
            let zone = tz(zone_name);
            let wall = NaiveDate::from_ymd_opt(2026, 11, 30)
                .unwrap()
                .and_hms_opt(22, 50, 0)
                .unwrap();
            let absolute = local_to_utc(wall, zone).unwrap();
            assert_eq!(
                absolute.with_timezone(&zone).naive_local(),
                wall,
                "round trip drifted in {}",
                zone_name
            );
        }
    }

    #[test]
    fn test_dst_gap_slides_forward() {
        // 2:30 AM on 2026-03-08 does not exist in New York.
        let zone = tz("America/New_York");
        let gap = NaiveDate::from_ymd_opt(2026, 3, 8)
            .unwrap()
            .and_hms_opt(2, 30, 0)
            .unwrap();
        let resolved = local_to_utc(gap, zone).unwrap();
        assert_eq!(
            resolved.with_timezone(&zone).naive_local(),
            NaiveDate::from_ymd_opt(2026, 3, 8)
                .unwrap()
                .and_hms_opt(3, 30, 0)
                .unwrap()
        );
    }

    #[test]
    fn test_parse_timezone() {
        assert!(parse_timezone("America/New_York").is_some());
        assert!(parse_timezone("Not/AZone").is_none());
    }

    #[test]
    fn test_format_local() {
        let zone = tz("America/New_York");
        let wall = NaiveDate::from_ymd_opt(2026, 8, 7)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        let absolute = local_to_utc(wall, zone).unwrap();
        assert_eq!(format_local(absolute, zone), "Friday, August 7 at 8:00 AM");
    }
}
