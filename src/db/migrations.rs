use sqlx::SqlitePool;
use tracing::info;

/// Centralized database migrations for the reminder stores.
///
/// Each migration is safe to call multiple times (idempotent) via
/// `IF NOT EXISTS`; the store runs them all at pool creation.
pub(crate) async fn migrate_reminders(pool: &SqlitePool) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS reminders (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            title TEXT NOT NULL,
            description TEXT,
            due_at TEXT NOT NULL,
            recurrence TEXT NOT NULL DEFAULT 'once',
            kind TEXT NOT NULL DEFAULT 'other',
            pet_id TEXT,
            status TEXT NOT NULL DEFAULT 'pending',
            source TEXT NOT NULL DEFAULT 'conversational',
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    // The delivery scheduler polls by status + due instant.
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_reminders_due
         ON reminders(status, due_at)",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_reminders_user
         ON reminders(user_id, created_at DESC)",
    )
    .execute(pool)
    .await?;

    info!("Reminders table migration complete");
    Ok(())
}

/// Legacy mirror table still read by older care-log consumers. Its enum
/// vocabulary predates `reminders`; values are mapped explicitly at write
/// time (see `types::ReminderKind::legacy_event_type`).
pub(crate) async fn migrate_care_events(pool: &SqlitePool) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS care_events (
            id TEXT PRIMARY KEY,
            reminder_id TEXT NOT NULL,
            user_id TEXT NOT NULL,
            pet_id TEXT,
            label TEXT NOT NULL,
            event_type TEXT NOT NULL DEFAULT 'general',
            scheduled_for TEXT NOT NULL,
            repeat_interval TEXT NOT NULL DEFAULT 'none',
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_care_events_reminder
         ON care_events(reminder_id)",
    )
    .execute(pool)
    .await?;

    info!("Care events mirror migration complete");
    Ok(())
}
