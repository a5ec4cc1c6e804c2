// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::error::Error;
use std::path::Path;

use async_trait::async_trait;
use sqlx::SqliteConnection;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use crate::container::ContainerPairing;
use crate::error::StoreResult;

/// A container pairing as it existed after the last successful run.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct ContainerRow {
    pub id: Option<i64>,
    pub local_name: Option<String>,
    pub remote_name: Option<String>,
    pub sync: bool,
}

/// An item as it existed after the last successful run.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct ItemRow {
    pub id: Option<i64>,
    pub local_uuid: Option<String>,
    pub local_name: Option<String>,
    pub remote_uuid: Option<String>,
    pub remote_name: Option<String>,
    pub local_container: Option<String>,
    pub remote_container: Option<String>,
}

/// Durable storage for the snapshot the next run diffs against.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    async fn read_containers(&self) -> StoreResult<Vec<ContainerRow>>;

    async fn read_items(&self) -> StoreResult<Vec<ItemRow>>;

    /// Replaces the stored snapshot. Either every row is written or the
    /// previous snapshot is left untouched.
    async fn write(&self, snapshot: &Snapshot) -> StoreResult<()>;
}

/// Snapshot rows of the last run, read once at the start of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub containers: Vec<ContainerRow>,
    pub items: Vec<ItemRow>,
}

impl Snapshot {
    pub(crate) async fn read(store: &dyn SnapshotStore) -> StoreResult<Self> {
        Ok(Self {
            containers: store.read_containers().await?,
            items: store.read_items().await?,
        })
    }

    /// Builds the snapshot describing the state after a run.
    ///
    /// `retained` holds rows whose deletion failed, so the next run retries it.
    pub(crate) fn capture(pairings: &[ContainerPairing], retained: Snapshot) -> Self {
        let mut containers: Vec<ContainerRow> = pairings
            .iter()
            .map(|p| ContainerRow {
                id: None,
                local_name: p.local_name().map(str::to_string),
                remote_name: p.remote_name().map(str::to_string),
                sync: p.sync,
            })
            .collect();
        containers.extend(retained.containers);

        let mut items = Vec::new();
        for p in pairings.iter().filter(|p| p.syncs_items()) {
            let local_container = p.local_name().map(str::to_string);
            let remote_container = p.remote_name().map(str::to_string);

            for item in &p.local_items {
                let remote = item
                    .remote_id
                    .as_ref()
                    .and_then(|id| p.remote_items.iter().find(|r| r.remote_id.as_ref() == Some(id)));
                items.push(ItemRow {
                    id: None,
                    local_uuid: item.local_id.clone(),
                    local_name: Some(item.name.clone()),
                    remote_uuid: item.remote_id.clone(),
                    remote_name: remote.map(|r| r.name.clone()),
                    local_container: local_container.clone(),
                    remote_container: remote_container.clone(),
                });
            }

            // Remote items already linked to a local one are covered above.
            for item in p.remote_items.iter().filter(|r| {
                !p.local_items
                    .iter()
                    .any(|l| l.remote_id.is_some() && l.remote_id == r.remote_id)
            }) {
                items.push(ItemRow {
                    id: None,
                    local_uuid: item.local_id.clone(),
                    local_name: None,
                    remote_uuid: item.remote_id.clone(),
                    remote_name: Some(item.name.clone()),
                    local_container: local_container.clone(),
                    remote_container: remote_container.clone(),
                });
            }
        }
        items.extend(retained.items);

        Self { containers, items }
    }

    pub(crate) async fn write(&self, store: &dyn SnapshotStore) -> StoreResult<()> {
        store.write(self).await
    }
}

/// [`SnapshotStore`] backed by SQLite.
#[derive(Debug, Clone)]
pub struct SqliteSnapshot {
    pool: SqlitePool,
}

impl SqliteSnapshot {
    /// Opens a sqlite database connection.
    /// If `filename` is `None`, it opens an in-memory database.
    pub async fn open(filename: Option<&Path>) -> Result<Self, Box<dyn Error>> {
        let (options, pool_options) = if let Some(filename) = filename {
            tracing::info!(path = %filename.display(), "connecting to SQLite database");
            let options = SqliteConnectOptions::new()
                .filename(filename)
                .create_if_missing(true);
            (options, SqlitePoolOptions::new())
        } else {
            tracing::info!("connecting to in-memory SQLite database");
            // Every connection to `:memory:` is a separate database.
            let pool_options = SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
            (SqliteConnectOptions::new().in_memory(true), pool_options)
        };

        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(|e| format!("Failed to connect to SQLite database: {e}"))?;

        sqlx::migrate!("src/snapshot/migrations") // relative path from the crate root
            .run(&pool)
            .await
            .map_err(|e| format!("Failed to run migrations: {e}"))?;

        Ok(Self { pool })
    }

    pub async fn close(self) {
        tracing::debug!("closing database connection");
        self.pool.close().await;
    }
}

#[async_trait]
impl SnapshotStore for SqliteSnapshot {
    async fn read_containers(&self) -> StoreResult<Vec<ContainerRow>> {
        const SQL: &str = "\
SELECT id, local_name, remote_name, sync
FROM containers
ORDER BY id;
";

        Ok(sqlx::query_as(SQL).fetch_all(&self.pool).await?)
    }

    async fn read_items(&self) -> StoreResult<Vec<ItemRow>> {
        const SQL: &str = "\
SELECT id, local_uuid, local_name, remote_uuid, remote_name, local_container, remote_container
FROM items
ORDER BY id;
";

        Ok(sqlx::query_as(SQL).fetch_all(&self.pool).await?)
    }

    async fn write(&self, snapshot: &Snapshot) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;
        replace_containers(&mut tx, &snapshot.containers).await?;
        replace_items(&mut tx, &snapshot.items).await?;
        tx.commit().await?;

        tracing::debug!(
            containers = snapshot.containers.len(),
            items = snapshot.items.len(),
            "wrote snapshot"
        );
        Ok(())
    }
}

async fn replace_containers(
    conn: &mut SqliteConnection,
    rows: &[ContainerRow],
) -> Result<(), sqlx::Error> {
    const SQL: &str = "\
INSERT INTO containers (local_name, remote_name, sync)
VALUES (?, ?, ?);
";

    sqlx::query("DELETE FROM containers;")
        .execute(&mut *conn)
        .await?;
    for row in rows {
        sqlx::query(SQL)
            .bind(&row.local_name)
            .bind(&row.remote_name)
            .bind(row.sync)
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}

async fn replace_items(conn: &mut SqliteConnection, rows: &[ItemRow]) -> Result<(), sqlx::Error> {
    const SQL: &str = "\
INSERT INTO items (local_uuid, local_name, remote_uuid, remote_name, local_container, remote_container)
VALUES (?, ?, ?, ?, ?, ?);
";

    sqlx::query("DELETE FROM items;").execute(&mut *conn).await?;
    for row in rows {
        sqlx::query(SQL)
            .bind(&row.local_uuid)
            .bind(&row.local_name)
            .bind(&row.remote_uuid)
            .bind(&row.remote_name)
            .bind(&row.local_container)
            .bind(&row.remote_container)
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}
