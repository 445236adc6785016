use serde::{Deserialize, Serialize};

/// What the reminder is about, as far as scheduling and downstream display
/// care. Defaults to `Other` when the conversation never says.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReminderKind {
    Medication,
    Appointment,
    Grooming,
    Feeding,
    Training,
    Exercise,
    Play,
    #[default]
    Other,
}

impl ReminderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReminderKind::Medication => "medication",
            ReminderKind::Appointment => "appointment",
            ReminderKind::Grooming => "grooming",
            ReminderKind::Feeding => "feeding",
            ReminderKind::Training => "training",
            ReminderKind::Exercise => "exercise",
            ReminderKind::Play => "play",
            ReminderKind::Other => "other",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "medication" | "meds" => Some(ReminderKind::Medication),
            "appointment" | "vet" => Some(ReminderKind::Appointment),
            "grooming" => Some(ReminderKind::Grooming),
            "feeding" | "food" => Some(ReminderKind::Feeding),
            "training" => Some(ReminderKind::Training),
            "exercise" | "walk" => Some(ReminderKind::Exercise),
            "play" => Some(ReminderKind::Play),
            "other" => Some(ReminderKind::Other),
            _ => None,
        }
    }

    /// Event-type label used by the legacy `care_events` mirror. Exhaustive
    /// on purpose: a new kind must pick a legacy bucket explicitly.
    pub fn legacy_event_type(&self) -> &'static str {
        match self {
            ReminderKind::Medication => "health",
            ReminderKind::Appointment => "health",
            ReminderKind::Grooming => "hygiene",
            ReminderKind::Feeding => "nutrition",
            ReminderKind::Training => "activity",
            ReminderKind::Exercise => "activity",
            ReminderKind::Play => "activity",
            ReminderKind::Other => "general",
        }
    }
}

/// How often the reminder repeats once the delivery scheduler picks it up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Recurrence {
    #[default]
    Once,
    Daily,
    Weekly,
    Monthly,
}

impl Recurrence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Recurrence::Once => "once",
            Recurrence::Daily => "daily",
            Recurrence::Weekly => "weekly",
            Recurrence::Monthly => "monthly",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "once" | "one_time" | "oneshot" => Some(Recurrence::Once),
            "daily" | "every_day" => Some(Recurrence::Daily),
            "weekly" | "every_week" => Some(Recurrence::Weekly),
            "monthly" | "every_month" => Some(Recurrence::Monthly),
            _ => None,
        }
    }

    /// Repeat-interval label used by the legacy `care_events` mirror.
    pub fn legacy_repeat_interval(&self) -> &'static str {
        match self {
            Recurrence::Once => "none",
            Recurrence::Daily => "day",
            Recurrence::Weekly => "week",
            Recurrence::Monthly => "month",
        }
    }
}

/// Lifecycle status of a persisted reminder. The delivery scheduler flips
/// `Pending` to `Completed` after firing; this crate only writes `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderStatus {
    Pending,
    Completed,
}

impl ReminderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReminderStatus::Pending => "pending",
            ReminderStatus::Completed => "completed",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pending" => Some(ReminderStatus::Pending),
            "completed" => Some(ReminderStatus::Completed),
            _ => None,
        }
    }
}
