mod sqlite;

pub use sqlite::SqliteReminderStore;
