//! SQLite-backed document store.

use std::{
    fmt,
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard},
};

use log::debug;
use rusqlite::{Connection, ToSql, params, params_from_iter};
use thiserror::Error;

use crate::{
    Behaviour, Child, ChildId, Coordinates, EntityKind, Location, LocationId, PersistenceError,
};

use super::{ChildDocument, ChildFilter, DocumentStore, LocationDocument, LocationFilter};

/// SQLite limits bound parameters per statement to 999 by default. The store
/// chunks `IN` queries to remain below that ceiling.
const SQLITE_MAX_VARIABLE_NUMBER: usize = 999;

// Names are indexed but not unique: registries check for duplicates before
// inserting, and concurrent registrations of one name can both succeed.
const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS locations (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        lat REAL NOT NULL,
        lon REAL NOT NULL,
        good_children INTEGER NOT NULL DEFAULT 0 CHECK (good_children >= 0)
    );
    CREATE INDEX IF NOT EXISTS locations_name ON locations (name);
    CREATE TABLE IF NOT EXISTS children (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        behaviour TEXT NOT NULL CHECK (behaviour IN ('good', 'bad'))
    );
    CREATE INDEX IF NOT EXISTS children_name ON children (name);
    CREATE INDEX IF NOT EXISTS children_behaviour ON children (behaviour);
    CREATE TABLE IF NOT EXISTS child_locations (
        child_id INTEGER NOT NULL REFERENCES children (id),
        location_id INTEGER NOT NULL,
        position INTEGER NOT NULL,
        PRIMARY KEY (child_id, location_id)
    );
";

const LOCATION_COLUMNS: &str = "id, name, lat, lon, good_children";

/// Error raised while opening a [`SqliteDocumentStore`].
#[derive(Debug, Error)]
pub enum SqliteDocumentStoreError {
    /// Opening the SQLite database failed.
    #[error("failed to open SQLite database at {path}: {source}")]
    OpenDatabase {
        /// Location of the SQLite database on disk.
        path: PathBuf,
        /// Source error returned by `rusqlite`.
        #[source]
        source: rusqlite::Error,
    },
    /// Creating the database's parent directory failed.
    #[error("failed to create directory {path}: {source}")]
    CreateDirectory {
        /// Directory that could not be created.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// Applying the schema failed.
    #[error("failed to initialise schema: {source}")]
    Schema {
        /// Source error returned by `rusqlite`.
        #[source]
        source: rusqlite::Error,
    },
}

/// Document store persisted in a SQLite database.
///
/// The connection sits behind a mutex so the store can be shared across
/// threads. Counter increments are a single `UPDATE … SET good_children =
/// good_children + ?` statement, never a read followed by a write.
pub struct SqliteDocumentStore {
    connection: Mutex<Connection>,
}

impl fmt::Debug for SqliteDocumentStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteDocumentStore").finish_non_exhaustive()
    }
}

impl SqliteDocumentStore {
    /// Open (or create) the database at `path` and apply the schema.
    ///
    /// Missing parent directories are created.
    ///
    /// # Errors
    /// Returns [`SqliteDocumentStoreError`] when the directory, database or
    /// schema cannot be set up.
    pub fn open<P>(path: P) -> Result<Self, SqliteDocumentStoreError>
    where
        P: AsRef<Path>,
    {
        let db_path = path.as_ref();
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| {
                SqliteDocumentStoreError::CreateDirectory {
                    path: parent.to_path_buf(),
                    source,
                }
            })?;
        }
        let connection =
            Connection::open(db_path).map_err(|source| SqliteDocumentStoreError::OpenDatabase {
                path: db_path.to_path_buf(),
                source,
            })?;
        debug!("opened document store at {}", db_path.display());
        Self::with_connection(connection)
    }

    /// Open a private in-memory database.
    ///
    /// # Errors
    /// Returns [`SqliteDocumentStoreError`] when SQLite cannot allocate the
    /// database or apply the schema.
    pub fn open_in_memory() -> Result<Self, SqliteDocumentStoreError> {
        let connection =
            Connection::open_in_memory().map_err(|source| SqliteDocumentStoreError::OpenDatabase {
                path: PathBuf::from(":memory:"),
                source,
            })?;
        Self::with_connection(connection)
    }

    fn with_connection(connection: Connection) -> Result<Self, SqliteDocumentStoreError> {
        connection
            .execute_batch(SCHEMA)
            .map_err(|source| SqliteDocumentStoreError::Schema { source })?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, PersistenceError> {
        self.connection.lock().map_err(|_| PersistenceError::Poisoned)
    }
}

impl DocumentStore for SqliteDocumentStore {
    fn find_locations(&self, filter: &LocationFilter) -> Result<Vec<Location>, PersistenceError> {
        let connection = self.lock()?;
        select_locations(&connection, filter)
    }

    fn insert_location(&self, document: &LocationDocument) -> Result<LocationId, PersistenceError> {
        let connection = self.lock()?;
        connection.execute(
            "INSERT INTO locations (name, lat, lon, good_children) VALUES (?1, ?2, ?3, ?4)",
            params![
                document.name,
                document.coordinates.lat,
                document.coordinates.lon,
                document.good_children_count
            ],
        )?;
        let id = generated_id(&connection, EntityKind::Location)?;
        Ok(LocationId::new(id))
    }

    fn increment_good_children(
        &self,
        filter: &LocationFilter,
        delta: u64,
    ) -> Result<bool, PersistenceError> {
        let connection = self.lock()?;
        let target = match filter {
            LocationFilter::Id(id) => Some(*id),
            // Resolve the first match in storage order, then update by id.
            other => select_locations(&connection, other)?
                .first()
                .map(|location| location.id),
        };
        let Some(id) = target else {
            return Ok(false);
        };
        let updated = connection.execute(
            "UPDATE locations SET good_children = good_children + ?1 WHERE id = ?2",
            params![delta, id.get()],
        )?;
        Ok(updated > 0)
    }

    fn find_children(&self, filter: &ChildFilter) -> Result<Vec<Child>, PersistenceError> {
        let connection = self.lock()?;
        let rows = match filter {
            ChildFilter::All => query_child_rows(&connection, "", &[]),
            ChildFilter::Name(name) => {
                query_child_rows(&connection, "WHERE name = ?1", &[name])
            }
            ChildFilter::Behaviour(behaviour) => {
                query_child_rows(&connection, "WHERE behaviour = ?1", &[&behaviour.as_str()])
            }
        }?;

        let mut links = connection.prepare(
            "SELECT location_id FROM child_locations WHERE child_id = ?1 ORDER BY position",
        )?;
        let mut children = Vec::with_capacity(rows.len());
        for (id, name, behaviour) in rows {
            let behaviour = parse_behaviour(id, &behaviour)?;
            let locations = links
                .query_map([id], |row| row.get::<_, u64>(0).map(LocationId::new))?
                .collect::<Result<Vec<_>, _>>()?;
            children.push(Child {
                id: ChildId::new(id),
                name,
                behaviour,
                locations,
            });
        }
        Ok(children)
    }

    fn insert_child(&self, document: &ChildDocument) -> Result<ChildId, PersistenceError> {
        let mut connection = self.lock()?;
        let transaction = connection.transaction()?;
        transaction.execute(
            "INSERT INTO children (name, behaviour) VALUES (?1, ?2)",
            params![document.name, document.behaviour.as_str()],
        )?;
        let id = generated_id(&transaction, EntityKind::Child)?;
        {
            let mut link = transaction.prepare(
                "INSERT OR IGNORE INTO child_locations (child_id, location_id, position)
                 VALUES (?1, ?2, ?3)",
            )?;
            for (position, location) in document.locations.iter().enumerate() {
                link.execute(params![id, location.get(), position])?;
            }
        }
        transaction.commit()?;
        Ok(ChildId::new(id))
    }
}

fn generated_id(connection: &Connection, entity: EntityKind) -> Result<u64, PersistenceError> {
    let raw = connection.last_insert_rowid();
    u64::try_from(raw).map_err(|_| PersistenceError::Corrupt {
        entity,
        id: raw,
        reason: "generated id is negative",
    })
}

fn select_locations(
    connection: &Connection,
    filter: &LocationFilter,
) -> Result<Vec<Location>, PersistenceError> {
    match filter {
        LocationFilter::All => query_locations(connection, "", &[]),
        LocationFilter::Id(id) => query_locations(connection, "WHERE id = ?1", &[&id.get()]),
        LocationFilter::Name(name) => query_locations(connection, "WHERE name = ?1", &[name]),
        LocationFilter::Ids(ids) => {
            let mut ids: Vec<u64> = ids.iter().map(|id| id.get()).collect();
            ids.sort_unstable();
            ids.dedup();
            let mut locations = Vec::new();
            for chunk in ids.chunks(SQLITE_MAX_VARIABLE_NUMBER) {
                let placeholders = vec!["?"; chunk.len()].join(", ");
                let clause = format!("WHERE id IN ({placeholders})");
                let params: Vec<&dyn ToSql> = chunk.iter().map(|id| id as &dyn ToSql).collect();
                locations.extend(query_locations(connection, &clause, &params)?);
            }
            locations.sort_unstable_by_key(|location| location.id);
            Ok(locations)
        }
    }
}

fn query_locations(
    connection: &Connection,
    clause: &str,
    params: &[&dyn ToSql],
) -> Result<Vec<Location>, PersistenceError> {
    let query = format!("SELECT {LOCATION_COLUMNS} FROM locations {clause} ORDER BY id");
    let mut statement = connection.prepare(&query)?;
    let rows = statement.query_map(params_from_iter(params.iter()), |row| {
        Ok(Location {
            id: LocationId::new(row.get(0)?),
            name: row.get(1)?,
            coordinates: Coordinates::new(row.get(2)?, row.get(3)?),
            good_children_count: row.get(4)?,
        })
    })?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

fn query_child_rows(
    connection: &Connection,
    clause: &str,
    params: &[&dyn ToSql],
) -> Result<Vec<(u64, String, String)>, PersistenceError> {
    let query = format!("SELECT id, name, behaviour FROM children {clause} ORDER BY id");
    let mut statement = connection.prepare(&query)?;
    let rows = statement.query_map(params_from_iter(params.iter()), |row| {
        Ok((row.get(0)?, row.get(1)?, row.get(2)?))
    })?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

fn parse_behaviour(id: u64, raw: &str) -> Result<Behaviour, PersistenceError> {
    raw.parse().map_err(|_| PersistenceError::Corrupt {
        entity: EntityKind::Child,
        id: i64::try_from(id).unwrap_or(i64::MAX),
        reason: "unknown behaviour",
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    fn document(name: &str, lat: f64, lon: f64) -> LocationDocument {
        LocationDocument {
            name: name.into(),
            coordinates: Coordinates::new(lat, lon),
            good_children_count: 0,
        }
    }

    #[fixture]
    fn store() -> SqliteDocumentStore {
        SqliteDocumentStore::open_in_memory().expect("open in-memory store")
    }

    #[rstest]
    fn round_trips_locations_in_storage_order(store: SqliteDocumentStore) {
        let a = store.insert_location(&document("b", 1.0, 2.0)).expect("insert");
        let b = store.insert_location(&document("a", -3.5, 4.25)).expect("insert");
        let found = store.find_locations(&LocationFilter::All).expect("find");
        let ids: Vec<_> = found.iter().map(|location| location.id).collect();
        assert_eq!(ids, vec![a, b]);
        assert_eq!(found[1].coordinates, Coordinates::new(-3.5, 4.25));
    }

    #[rstest]
    fn finds_locations_by_name_and_ids(store: SqliteDocumentStore) {
        let a = store.insert_location(&document("a", 0.0, 0.0)).expect("insert");
        let b = store.insert_location(&document("b", 0.0, 0.0)).expect("insert");
        let by_name = store
            .find_one_location(&LocationFilter::Name("b".into()))
            .expect("find")
            .expect("present");
        assert_eq!(by_name.id, b);
        let by_ids = store
            .find_locations(&LocationFilter::Ids(vec![b, a, b]))
            .expect("find");
        assert_eq!(by_ids.len(), 2);
        assert!(
            store
                .find_locations(&LocationFilter::Ids(Vec::new()))
                .expect("find")
                .is_empty()
        );
    }

    #[rstest]
    fn increments_in_place(store: SqliteDocumentStore) {
        let id = store.insert_location(&document("a", 0.0, 0.0)).expect("insert");
        assert!(
            store
                .increment_good_children(&LocationFilter::Id(id), 3)
                .expect("increment")
        );
        assert!(
            !store
                .increment_good_children(&LocationFilter::Id(LocationId::new(99)), 1)
                .expect("increment")
        );
        let location = store
            .find_one_location(&LocationFilter::Id(id))
            .expect("find")
            .expect("present");
        assert_eq!(location.good_children_count, 3);
    }

    #[rstest]
    fn stores_child_links_in_order(store: SqliteDocumentStore) {
        let id = store
            .insert_child(&ChildDocument {
                name: "Tim".into(),
                behaviour: Behaviour::Good,
                locations: vec![LocationId::new(5), LocationId::new(2)],
            })
            .expect("insert child");
        let children = store
            .find_children(&ChildFilter::Behaviour(Behaviour::Good))
            .expect("find children");
        assert_eq!(
            children,
            vec![Child {
                id,
                name: "Tim".into(),
                behaviour: Behaviour::Good,
                locations: vec![LocationId::new(5), LocationId::new(2)],
            }]
        );
        assert!(
            store
                .find_children(&ChildFilter::Behaviour(Behaviour::Bad))
                .expect("find children")
                .is_empty()
        );
    }

    #[rstest]
    fn reports_corrupt_behaviour(store: SqliteDocumentStore) {
        {
            let connection = store.lock().expect("lock");
            connection
                .execute_batch(
                    "PRAGMA ignore_check_constraints = ON;
                     INSERT INTO children (name, behaviour) VALUES ('Eve', 'naughty');",
                )
                .expect("insert corrupt row");
        }
        let err = store
            .find_children(&ChildFilter::All)
            .expect_err("corrupt behaviour should fail");
        assert!(matches!(
            err,
            PersistenceError::Corrupt {
                entity: EntityKind::Child,
                ..
            }
        ));
    }

    #[rstest]
    fn persists_across_reopen() {
        let dir = TempDir::new().expect("create temp dir");
        let path = dir.path().join("nested").join("sleigh.db");
        let id = {
            let store = SqliteDocumentStore::open(&path).expect("open store");
            store.insert_location(&document("a", 0.0, 0.0)).expect("insert")
        };
        let store = SqliteDocumentStore::open(&path).expect("reopen store");
        let found = store
            .find_one_location(&LocationFilter::Id(id))
            .expect("find")
            .expect("present");
        assert_eq!(found.name, "a");
    }
}
