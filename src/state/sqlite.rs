use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};
use tracing::warn;

use crate::db::migrations;
use crate::traits::{NewReminder, PersistedReminder, ReminderStore};
use crate::types::{Recurrence, ReminderKind, ReminderStatus};

/// Set restrictive file permissions (0600) on the database and WAL files.
fn set_db_file_permissions(db_path: &str) {
    use std::os::unix::fs::PermissionsExt;
    let mode = std::fs::Permissions::from_mode(0o600);
    if let Err(e) = std::fs::set_permissions(db_path, mode.clone()) {
        warn!("Failed to set permissions on {}: {}", db_path, e);
    }
    for suffix in &["-wal", "-shm"] {
        let path = format!("{}{}", db_path, suffix);
        if std::path::Path::new(&path).exists() {
            if let Err(e) = std::fs::set_permissions(&path, mode.clone()) {
                warn!("Failed to set permissions on {}: {}", path, e);
            }
        }
    }
}

/// SQLite-backed reminder persistence.
///
/// `reminders` is the authoritative table; every create is also mirrored
/// into the legacy `care_events` table for older consumers. The mirror is
/// best-effort: its failure is logged and never fails the logical create.
pub struct SqliteReminderStore {
    pool: SqlitePool,
}

impl SqliteReminderStore {
    pub async fn new(db_path: &str) -> anyhow::Result<Self> {
        let opts = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(opts)
            .await?;

        set_db_file_permissions(db_path);

        migrations::migrate_reminders(&pool).await?;
        migrations::migrate_care_events(&pool).await?;

        Ok(Self { pool })
    }

    pub async fn get_reminder(&self, id: &str) -> anyhow::Result<Option<PersistedReminder>> {
        let row = sqlx::query(
            "SELECT id, user_id, title, description, due_at, recurrence, kind, pet_id, status, source, created_at
             FROM reminders WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(row_to_reminder).transpose()
    }

    /// Pending reminders due at or before `before`, oldest first. This is
    /// the read surface the delivery scheduler polls on.
    pub async fn list_due(&self, before: DateTime<Utc>) -> anyhow::Result<Vec<PersistedReminder>> {
        let rows = sqlx::query(
            "SELECT id, user_id, title, description, due_at, recurrence, kind, pet_id, status, source, created_at
             FROM reminders WHERE status = 'pending' AND due_at <= ?
             ORDER BY due_at ASC",
        )
        .bind(before.to_rfc3339())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(row_to_reminder).collect()
    }

    /// Best-effort write into the legacy table. Enum values are mapped
    /// explicitly from the primary vocabulary; see `types.rs`.
    async fn mirror_care_event(&self, record: &PersistedReminder) {
        let result = sqlx::query(
            "INSERT INTO care_events (id, reminder_id, user_id, pet_id, label, event_type, scheduled_for, repeat_interval, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(uuid::Uuid::new_v4().to_string())
        .bind(&record.id)
        .bind(&record.user_id)
        .bind(&record.pet_id)
        .bind(&record.title)
        .bind(record.kind.legacy_event_type())
        .bind(record.due_at.to_rfc3339())
        .bind(record.recurrence.legacy_repeat_interval())
        .bind(record.created_at.to_rfc3339())
        .execute(&self.pool)
        .await;

        if let Err(e) = result {
            warn!(reminder_id = %record.id, "Legacy care_events mirror write failed: {}", e);
        }
    }
}

#[async_trait]
impl ReminderStore for SqliteReminderStore {
    async fn create_reminder(&self, new: &NewReminder) -> anyhow::Result<PersistedReminder> {
        let record = PersistedReminder {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: new.user_id.clone(),
            title: new.title.clone(),
            description: new.description.clone(),
            due_at: new.due_at,
            recurrence: new.recurrence,
            kind: new.kind,
            pet_id: new.pet_id.clone(),
            status: ReminderStatus::Pending,
            created_at: Utc::now(),
            source: "conversational".to_string(),
        };

        sqlx::query(
            "INSERT INTO reminders (id, user_id, title, description, due_at, recurrence, kind, pet_id, status, source, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&record.id)
        .bind(&record.user_id)
        .bind(&record.title)
        .bind(&record.description)
        .bind(record.due_at.to_rfc3339())
        .bind(record.recurrence.as_str())
        .bind(record.kind.as_str())
        .bind(&record.pet_id)
        .bind(record.status.as_str())
        .bind(&record.source)
        .bind(record.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        self.mirror_care_event(&record).await;

        Ok(record)
    }
}

fn row_to_reminder(row: sqlx::sqlite::SqliteRow) -> anyhow::Result<PersistedReminder> {
    let due_at: String = row.get("due_at");
    let created_at: String = row.get("created_at");
    let recurrence: String = row.get("recurrence");
    let kind: String = row.get("kind");
    let status: String = row.get("status");

    Ok(PersistedReminder {
        id: row.get("id"),
        user_id: row.get("user_id"),
        title: row.get("title"),
        description: row.get("description"),
        due_at: DateTime::parse_from_rfc3339(&due_at)
            .map_err(|e| anyhow::anyhow!("Bad due_at in reminders row: {}", e))?
            .with_timezone(&Utc),
        recurrence: Recurrence::parse(&recurrence).unwrap_or_default(),
        kind: ReminderKind::parse(&kind).unwrap_or_default(),
        pet_id: row.get("pet_id"),
        status: ReminderStatus::parse(&status).unwrap_or(ReminderStatus::Pending),
        created_at: DateTime::parse_from_rfc3339(&created_at)
            .map_err(|e| anyhow::anyhow!("Bad created_at in reminders row: {}", e))?
            .with_timezone(&Utc),
        source: row.get("source"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    async fn setup_store() -> (SqliteReminderStore, tempfile::NamedTempFile) {
        let db_file = tempfile::NamedTempFile::new().unwrap();
        let store = SqliteReminderStore::new(db_file.path().to_str().unwrap())
            .await
            .unwrap();
        (store, db_file)
    }

    fn new_reminder(pet_id: Option<&str>) -> NewReminder {
        NewReminder {
            user_id: "user-1".to_string(),
            title: "give Rex his pill".to_string(),
            description: Some("heartworm prevention".to_string()),
            due_at: Utc.with_ymd_and_hms(2026, 8, 10, 12, 0, 0).unwrap(),
            kind: ReminderKind::Medication,
            recurrence: Recurrence::Daily,
            pet_id: pet_id.map(|s| s.to_string()),
        }
    }

    #[tokio::test]
    async fn test_create_and_read_back() {
        let (store, _db) = setup_store().await;
        let record = store.create_reminder(&new_reminder(Some("pet-1"))).await.unwrap();

        let fetched = store.get_reminder(&record.id).await.unwrap().unwrap();
        assert_eq!(fetched.title, "give Rex his pill");
        assert_eq!(fetched.due_at, record.due_at);
        assert_eq!(fetched.kind, ReminderKind::Medication);
        assert_eq!(fetched.recurrence, Recurrence::Daily);
        assert_eq!(fetched.pet_id.as_deref(), Some("pet-1"));
        assert_eq!(fetched.status, ReminderStatus::Pending);
        assert_eq!(fetched.source, "conversational");
    }

    #[tokio::test]
    async fn test_mirror_row_uses_legacy_vocabulary() {
        let (store, _db) = setup_store().await;
        let record = store.create_reminder(&new_reminder(Some("pet-1"))).await.unwrap();

        let row = sqlx::query(
            "SELECT label, event_type, repeat_interval, pet_id FROM care_events WHERE reminder_id = ?",
        )
        .bind(&record.id)
        .fetch_one(&store.pool)
        .await
        .unwrap();

        let event_type: String = row.get("event_type");
        let repeat_interval: String = row.get("repeat_interval");
        let label: String = row.get("label");
        assert_eq!(event_type, "health");
        assert_eq!(repeat_interval, "day");
        assert_eq!(label, "give Rex his pill");
    }

    #[tokio::test]
    async fn test_list_due_filters_on_instant() {
        let (store, _db) = setup_store().await;
        let record = store.create_reminder(&new_reminder(None)).await.unwrap();

        let due = store.list_due(record.due_at + Duration::minutes(1)).await.unwrap();
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].id, record.id);

        let not_yet = store.list_due(record.due_at - Duration::minutes(1)).await.unwrap();
        assert!(not_yet.is_empty());
    }
}
