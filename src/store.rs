//! SQLite-backed user data: favorite verses and a personal dictionary

use crate::error::Result;
use crate::records::VerseAddress;
use rusqlite::{Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Favorite {
    pub address: VerseAddress,
    pub created_at: String,
}

/// One word of the personal dictionary. `word` is unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DictionaryEntry {
    pub word: String,
    pub pronunciation: String,
    pub origin: String,
    pub meaning: String,
    pub example: String,
}

pub struct UserStore {
    conn: Connection,
}

impl UserStore {
    pub fn open(path: &Path) -> Result<Self> {
        Self::init(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS favorites (
                sura INTEGER NOT NULL,
                ayet INTEGER NOT NULL,
                created_at TEXT NOT NULL,
                PRIMARY KEY (sura, ayet)
            );

            CREATE TABLE IF NOT EXISTS entries (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                word TEXT NOT NULL UNIQUE,
                pronunciation TEXT NOT NULL DEFAULT '',
                origin TEXT NOT NULL DEFAULT '',
                meaning TEXT NOT NULL DEFAULT '',
                example TEXT NOT NULL DEFAULT ''
            );
            "#,
        )?;
        Ok(Self { conn })
    }

    /// Returns false when the verse was already a favorite.
    pub fn add_favorite(&self, addr: VerseAddress) -> Result<bool> {
        let now = chrono::Utc::now().to_rfc3339();
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO favorites (sura, ayet, created_at) VALUES (?1, ?2, ?3)",
            rusqlite::params![addr.sura, addr.ayet, now],
        )?;
        Ok(inserted > 0)
    }

    /// Returns false when the verse was not a favorite.
    pub fn remove_favorite(&self, addr: VerseAddress) -> Result<bool> {
        let removed = self.conn.execute(
            "DELETE FROM favorites WHERE sura = ?1 AND ayet = ?2",
            rusqlite::params![addr.sura, addr.ayet],
        )?;
        Ok(removed > 0)
    }

    /// Flip membership; returns whether the verse is a favorite afterwards.
    pub fn toggle_favorite(&self, addr: VerseAddress) -> Result<bool> {
        if self.remove_favorite(addr)? {
            Ok(false)
        } else {
            self.add_favorite(addr)
        }
    }

    pub fn is_favorite(&self, addr: VerseAddress) -> Result<bool> {
        let found: Option<i64> = self
            .conn
            .query_row(
                "SELECT 1 FROM favorites WHERE sura = ?1 AND ayet = ?2",
                rusqlite::params![addr.sura, addr.ayet],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    /// All favorites in verse order.
    pub fn favorites(&self) -> Result<Vec<Favorite>> {
        let mut stmt = self
            .conn
            .prepare("SELECT sura, ayet, created_at FROM favorites ORDER BY sura, ayet")?;
        let favorites = stmt
            .query_map([], |row| {
                Ok(Favorite {
                    address: VerseAddress::new(row.get(0)?, row.get(1)?),
                    created_at: row.get(2)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(favorites)
    }

    /// Insert or replace the entry for `entry.word`.
    pub fn upsert_entry(&self, entry: &DictionaryEntry) -> Result<()> {
        self.conn.execute(
            "INSERT INTO entries (word, pronunciation, origin, meaning, example)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(word) DO UPDATE SET
                pronunciation = excluded.pronunciation,
                origin = excluded.origin,
                meaning = excluded.meaning,
                example = excluded.example",
            rusqlite::params![
                entry.word.trim(),
                entry.pronunciation,
                entry.origin,
                entry.meaning,
                entry.example
            ],
        )?;
        Ok(())
    }

    pub fn entry(&self, word: &str) -> Result<Option<DictionaryEntry>> {
        let entry = self
            .conn
            .query_row(
                "SELECT word, pronunciation, origin, meaning, example FROM entries WHERE word = ?1",
                [word.trim()],
                row_to_entry,
            )
            .optional()?;
        Ok(entry)
    }

    pub fn delete_entry(&self, word: &str) -> Result<bool> {
        let removed = self
            .conn
            .execute("DELETE FROM entries WHERE word = ?1", [word.trim()])?;
        Ok(removed > 0)
    }

    /// Entries sorted by word.
    pub fn entries(&self) -> Result<Vec<DictionaryEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT word, pronunciation, origin, meaning, example FROM entries ORDER BY word",
        )?;
        let entries = stmt
            .query_map([], row_to_entry)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(entries)
    }
}

fn row_to_entry(row: &rusqlite::Row) -> rusqlite::Result<DictionaryEntry> {
    Ok(DictionaryEntry {
        word: row.get(0)?,
        pronunciation: row.get(1)?,
        origin: row.get(2)?,
        meaning: row.get(3)?,
        example: row.get(4)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(word: &str, meaning: &str) -> DictionaryEntry {
        DictionaryEntry {
            word: word.to_string(),
            pronunciation: String::new(),
            origin: "Arapça".to_string(),
            meaning: meaning.to_string(),
            example: String::new(),
        }
    }

    #[test]
    fn test_favorites_have_set_semantics() {
        let store = UserStore::open_in_memory().unwrap();
        let addr = VerseAddress::new(2, 255);
        assert!(store.add_favorite(addr).unwrap());
        assert!(!store.add_favorite(addr).unwrap());
        assert_eq!(store.favorites().unwrap().len(), 1);
        assert!(store.is_favorite(addr).unwrap());

        assert!(store.remove_favorite(addr).unwrap());
        assert!(!store.remove_favorite(addr).unwrap());
        assert!(!store.is_favorite(addr).unwrap());
    }

    #[test]
    fn test_toggle_and_order() {
        let store = UserStore::open_in_memory().unwrap();
        assert!(store.toggle_favorite(VerseAddress::new(96, 1)).unwrap());
        assert!(store.toggle_favorite(VerseAddress::new(1, 1)).unwrap());
        assert!(!store.toggle_favorite(VerseAddress::new(96, 1)).unwrap());
        store.add_favorite(VerseAddress::new(2, 3)).unwrap();

        let addrs: Vec<VerseAddress> =
            store.favorites().unwrap().into_iter().map(|f| f.address).collect();
        assert_eq!(addrs, vec![VerseAddress::new(1, 1), VerseAddress::new(2, 3)]);
    }

    #[test]
    fn test_dictionary_upsert() {
        let store = UserStore::open_in_memory().unwrap();
        store.upsert_entry(&entry("rahmet", "merhamet")).unwrap();
        store.upsert_entry(&entry("ilim", "bilgi")).unwrap();
        store.upsert_entry(&entry(" rahmet ", "acıma")).unwrap();

        let entries = store.entries().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].word, "ilim");
        assert_eq!(store.entry("rahmet").unwrap().unwrap().meaning, "acıma");
        assert_eq!(store.entry("yok").unwrap(), None);

        assert!(store.delete_entry("ilim").unwrap());
        assert!(!store.delete_entry("ilim").unwrap());
    }

    #[test]
    fn test_store_persists_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kullanici.db");
        {
            let store = UserStore::open(&path).unwrap();
            store.add_favorite(VerseAddress::new(1, 7)).unwrap();
        }
        let store = UserStore::open(&path).unwrap();
        assert!(store.is_favorite(VerseAddress::new(1, 7)).unwrap());
    }
}
