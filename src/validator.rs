use chrono::{DateTime, Duration, Utc};

use crate::draft::ReminderDraft;

/// Plausibility bounds on the resolved due instant. Runs only once all
/// required slots are filled; entity ambiguity is handled earlier as a
/// missing field because it is resolvable by asking, not by rejecting.
pub fn validate(draft: &ReminderDraft, now: DateTime<Utc>) -> Vec<String> {
    let mut errors = Vec::new();

    if let Some(due_at) = draft.due_at {
        if due_at < now {
            errors.push("I can't schedule a reminder in the past.".to_string());
        } else if due_at > now + Duration::days(365) {
            errors.push("I can't schedule a reminder more than 1 year ahead.".to_string());
        }
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 5, 14, 0, 0).unwrap()
    }

    fn draft_due(due_at: DateTime<Utc>) -> ReminderDraft {
        ReminderDraft {
            title: Some("vet visit".to_string()),
            due_at: Some(due_at),
            ..Default::default()
        }
    }

    #[test]
    fn test_past_rejected() {
        let errors = validate(&draft_due(now() - Duration::hours(1)), now());
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("past"));
    }

    #[test]
    fn test_too_far_ahead_rejected() {
        let errors = validate(&draft_due(now() + Duration::days(400)), now());
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("1 year"));
    }

    #[test]
    fn test_near_future_accepted() {
        assert!(validate(&draft_due(now() + Duration::minutes(5)), now()).is_empty());
        assert!(validate(&draft_due(now() + Duration::days(364)), now()).is_empty());
    }
}
