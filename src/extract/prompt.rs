use chrono::NaiveDateTime;
use chrono_tz::Tz;

use crate::traits::Pet;

/// System prompt for the extraction call. The current turn's message is the
/// only conversational context the model ever sees; accumulated state lives
/// in the draft, not in the prompt.
pub fn build_system_prompt(pets: &[Pet], now_local: NaiveDateTime, tz: Tz) -> String {
    let mut catalog = String::new();
    if pets.is_empty() {
        catalog.push_str("The user has no pets on file.\n");
    } else {
        catalog.push_str("The user's pets:\n");
        for pet in pets {
            match &pet.species {
                Some(species) => catalog.push_str(&format!("- {} ({})\n", pet.name, species)),
                None => catalog.push_str(&format!("- {}\n", pet.name)),
            }
        }
    }

    format!(
        r#"You extract reminder fields from a single chat message sent to a pet-care assistant.

Current local date and time: {now} ({day_of_week})
User timezone: {tz}
{catalog}
Reply with ONLY a JSON object, no prose:
{{
  "title": short imperative label for the task, or null,
  "description": extra detail beyond the title, or null,
  "due_date": "YYYY-MM-DD" or null,
  "due_time": "HH:MM" 24-hour or null,
  "kind": one of "medication", "appointment", "grooming", "feeding", "training", "exercise", "play", "other", or null,
  "pet": exact pet name from the list above, or "all", or null,
  "recurrence": one of "once", "daily", "weekly", "monthly", or null,
  "confidence": "high", "medium", or "low"
}}

Rules:
- Use null for anything the message does not say. Never guess.
- If the message has no task or purpose in it (e.g. just "set a reminder" or only a time), title MUST be null.
- If the message has no date or time expression, due_date and due_time MUST both be null.
- Resolve relative expressions ("tomorrow", "in 2 hours", "next friday") against the current local time above.
- A time with no date: fill only due_time. A date with no time: fill only due_date.
- A date without a year is the current year, unless the message says next year.
- "pet" is "all" ONLY when the message explicitly covers all pets ("all my dogs", "both of them"). A pet not named in the message stays null, even if the user has exactly one pet."#,
        now = now_local.format("%Y-%m-%d %H:%M"),
        day_of_week = now_local.format("%A"),
        tz = tz,
        catalog = catalog,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_prompt_carries_catalog_and_clock() {
        let pets = vec![
            Pet {
                id: "p1".to_string(),
                name: "Rex".to_string(),
                species: Some("dog".to_string()),
            },
            Pet {
                id: "p2".to_string(),
                name: "Luna".to_string(),
                species: None,
            },
        ];
        let now = NaiveDate::from_ymd_opt(2026, 8, 5)
            .unwrap()
            .and_hms_opt(14, 0, 0)
            .unwrap();
        let prompt = build_system_prompt(&pets, now, "America/New_York".parse().unwrap());

        assert!(prompt.contains("- Rex (dog)"));
        assert!(prompt.contains("- Luna"));
        assert!(prompt.contains("2026-08-05 14:00"));
        assert!(prompt.contains("Wednesday"));
        assert!(prompt.contains("America/New_York"));
    }

    #[test]
    fn test_prompt_handles_empty_catalog() {
        let now = NaiveDate::from_ymd_opt(2026, 8, 5)
            .unwrap()
            .and_hms_opt(14, 0, 0)
            .unwrap();
        let prompt = build_system_prompt(&[], now, chrono_tz::UTC);
        assert!(prompt.contains("no pets on file"));
    }
}
