use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use crate::broadcast::{CreatedRecord, FailedTarget};
use crate::draft::FieldName;
use crate::time_utils::format_local;

/// Terminal state of a turn, as handed to the composer. No other shape is
/// reachable; every turn ends in exactly one of these.
#[derive(Debug, Clone)]
pub enum TurnOutcome {
    /// At least one record was created. Single create and broadcast share
    /// this shape; `failed` is non-empty only for a partial broadcast.
    Created {
        title: String,
        due_at: DateTime<Utc>,
        tz: Tz,
        created: Vec<CreatedRecord>,
        failed: Vec<FailedTarget>,
    },
    /// Validation rejected the draft; user can correct and continue.
    Invalid { errors: Vec<String> },
    /// Required slots still open; ask only for those.
    NeedsFields {
        missing: Vec<FieldName>,
        pet_names: Vec<String>,
    },
    /// Nothing was persisted (single target failed, or every broadcast
    /// target failed). Retryable.
    StoreFailed,
    /// Correction rounds exhausted; the flow is giving up.
    Abandoned,
    /// Unexpected internal fault; accumulated state was preserved.
    Failed,
}

/// Pure mapping from end state to the user-facing message.
pub fn compose(outcome: &TurnOutcome) -> String {
    match outcome {
        TurnOutcome::Created {
            title,
            due_at,
            tz,
            created,
            failed,
        } => compose_created(title, *due_at, *tz, created, failed),
        TurnOutcome::Invalid { errors } => compose_invalid(errors),
        TurnOutcome::NeedsFields { missing, pet_names } => compose_missing(missing, pet_names),
        TurnOutcome::StoreFailed => {
            "I couldn't save that reminder just now. Please try again in a moment.".to_string()
        }
        TurnOutcome::Abandoned => {
            "I'm having trouble pinning this reminder down — let's start fresh when you're ready."
                .to_string()
        }
        TurnOutcome::Failed => "Something went wrong on my end. Please try again.".to_string(),
    }
}

fn compose_created(
    title: &str,
    due_at: DateTime<Utc>,
    tz: Tz,
    created: &[CreatedRecord],
    failed: &[FailedTarget],
) -> String {
    let when = format_local(due_at, tz);
    let created_names: Vec<&str> = created
        .iter()
        .filter_map(|c| c.pet_name.as_deref())
        .collect();

    let mut message = match created_names.as_slice() {
        [] => format!("Reminder set: \"{}\" — {}.", title, when),
        [one] => format!("Reminder set: \"{}\" — {} (for {}).", title, when, one),
        names => format!(
            "Reminder set: \"{}\" — {} for {}.",
            title,
            when,
            join_names(names)
        ),
    };

    if !failed.is_empty() {
        let failed_names: Vec<&str> = failed
            .iter()
            .map(|f| f.pet_name.as_deref().unwrap_or("one reminder"))
            .collect();
        message.push_str(&format!(
            " Heads up: I couldn't create it for {} — you may want to try again for {}.",
            join_names(&failed_names),
            if failed_names.len() == 1 { "that one" } else { "those" },
        ));
    }

    message
}

fn compose_invalid(errors: &[String]) -> String {
    let mut message = String::from("That doesn't quite work:\n");
    for error in errors {
        message.push_str(&format!("- {}\n", error));
    }
    message.push_str("Could you give me a different time?");
    message
}

fn compose_missing(missing: &[FieldName], pet_names: &[String]) -> String {
    let needs_title = missing.contains(&FieldName::Title);
    let needs_due = missing.contains(&FieldName::DueAt);
    let needs_pet = missing.contains(&FieldName::Pet);

    let mut parts: Vec<String> = Vec::new();
    match (needs_title, needs_due) {
        (true, true) => parts.push("What should I remind you about, and when?".to_string()),
        (true, false) => parts.push("What should I remind you about?".to_string()),
        (false, true) => parts.push("When should I remind you?".to_string()),
        (false, false) => {}
    }

    if needs_pet {
        let names: Vec<&str> = pet_names.iter().map(|n| n.as_str()).collect();
        parts.push(format!(
            "Which pet is this for — {} — or all of them?",
            join_names(&names)
        ));
    }

    if parts.is_empty() {
        // Unreachable through the flow, but compose totally anyway.
        parts.push("Could you tell me a bit more about this reminder?".to_string());
    }

    parts.join(" ")
}

fn join_names(names: &[&str]) -> String {
    match names {
        [] => String::new(),
        [one] => (*one).to_string(),
        [first, second] => format!("{} and {}", first, second),
        [head @ .., last] => format!("{}, and {}", head.join(", "), last),
    }
}
