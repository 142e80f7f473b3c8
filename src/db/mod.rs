use crate::errors::StoreError;
use crate::models::UserRecord;
use rusqlite::{params, Connection};
use std::fs;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

const SCHEMA_SQL: &str = include_str!("schema.sql");

/// Single-table SQLite store for the fetched user list. The schema is fixed;
/// a refresh drops and recreates the table instead of migrating it.
#[derive(Debug)]
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    pub fn new(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|_| StoreError("database mutex poisoned".to_string()))
    }

    /// Replaces the table contents with `records` in one transaction: drop,
    /// recreate, bulk insert. A failure mid-write rolls back to the prior
    /// contents. Duplicate ids within the input: last write wins.
    pub fn replace_all(&self, records: &[UserRecord]) -> Result<usize, StoreError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        tx.execute_batch("DROP TABLE IF EXISTS users;")?;
        tx.execute_batch(SCHEMA_SQL)?;
        {
            let mut stmt = tx.prepare(
                "INSERT OR REPLACE INTO users (id, name, username, email, phone, website)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;
            for record in records {
                stmt.execute(params![
                    record.id,
                    record.name,
                    record.username,
                    record.email,
                    record.phone,
                    record.website,
                ])?;
            }
        }
        let stored: i64 = tx.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
        tx.commit()?;
        Ok(stored as usize)
    }

    /// All rows in unspecified order. An empty or missing table is not an
    /// error; it reads as an empty list.
    pub fn read_all(&self) -> Result<Vec<UserRecord>, StoreError> {
        let conn = self.lock()?;
        let mut stmt = match conn
            .prepare("SELECT id, name, username, email, phone, website FROM users")
        {
            Ok(stmt) => stmt,
            Err(err) if is_missing_table(&err) => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };

        let rows = stmt.query_map([], |row| {
            Ok(UserRecord {
                id: row.get(0)?,
                name: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                username: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
                email: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
                phone: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
                website: row.get::<_, Option<String>>(5)?.unwrap_or_default(),
            })
        })?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    }

    pub fn count_users(&self) -> Result<i64, StoreError> {
        let conn = self.lock()?;
        let count = match conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0)) {
            Ok(count) => count,
            Err(err) if is_missing_table(&err) => 0,
            Err(err) => return Err(err.into()),
        };
        Ok(count)
    }
}

fn is_missing_table(err: &rusqlite::Error) -> bool {
    matches!(err, rusqlite::Error::SqliteFailure(_, Some(message)) if message.contains("no such table"))
}

#[cfg(test)]
mod tests {
    use super::Database;
    use crate::models::UserRecord;

    fn user(id: i64, name: &str, email: &str) -> UserRecord {
        UserRecord {
            id,
            name: name.to_string(),
            username: name.to_lowercase(),
            email: email.to_string(),
            phone: "555-0100".to_string(),
            website: "example.org".to_string(),
        }
    }

    #[test]
    fn replace_and_read_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let db = Database::new(&dir.path().join("usuarios.db")).expect("db");

        let input = vec![
            user(1, "Leanne Graham", "Sincere@april.biz"),
            user(2, "Ervin Howell", "Shanna@melissa.tv"),
        ];
        let stored = db.replace_all(&input).expect("replace");
        assert_eq!(stored, 2);

        let mut read = db.read_all().expect("read");
        read.sort_by_key(|record| record.id);
        assert_eq!(read, input);
    }

    #[test]
    fn duplicate_ids_resolve_to_last_write() {
        let dir = tempfile::tempdir().expect("tempdir");
        let db = Database::new(&dir.path().join("usuarios.db")).expect("db");

        let stored = db
            .replace_all(&[
                user(1, "First Version", "first@a.com"),
                user(1, "Second Version", "second@b.com"),
            ])
            .expect("replace");
        assert_eq!(stored, 1);

        let read = db.read_all().expect("read");
        assert_eq!(read.len(), 1);
        assert_eq!(read[0].name, "Second Version");
    }

    #[test]
    fn refresh_fully_replaces_prior_contents() {
        let dir = tempfile::tempdir().expect("tempdir");
        let db = Database::new(&dir.path().join("usuarios.db")).expect("db");

        db.replace_all(&[user(1, "Old", "old@a.com"), user(2, "Older", "older@a.com")])
            .expect("first replace");
        db.replace_all(&[user(9, "New", "new@b.com")])
            .expect("second replace");

        let read = db.read_all().expect("read");
        assert_eq!(read.len(), 1);
        assert_eq!(read[0].id, 9);
        assert_eq!(db.count_users().expect("count"), 1);
    }

    #[test]
    fn empty_store_reads_as_empty_list() {
        let dir = tempfile::tempdir().expect("tempdir");
        let db = Database::new(&dir.path().join("usuarios.db")).expect("db");

        assert!(db.read_all().expect("read").is_empty());
        assert_eq!(db.count_users().expect("count"), 0);
    }

    #[test]
    fn store_survives_reopen() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("usuarios.db");

        {
            let db = Database::new(&path).expect("db");
            db.replace_all(&[user(3, "Persistent", "keep@a.com")])
                .expect("replace");
        }

        let reopened = Database::new(&path).expect("reopen");
        let read = reopened.read_all().expect("read");
        assert_eq!(read.len(), 1);
        assert_eq!(read[0].name, "Persistent");
    }
}
