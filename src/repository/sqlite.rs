//! SQLite host store.
//!
//! Reads a forum-like schema: `topics`, `users`, `group_users` and a
//! key-value `category_custom_fields` table holding the per-category filter
//! flag and allowed group list. Connections are opened per call and the
//! blocking work runs on tokio's blocking pool.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use tracing::warn;

use super::{CategoryStore, GroupStore, Result, TopicStore, UserStore};
use crate::models::{CategoryFilter, CategoryId, GroupId, Topic, TopicId, User, UserId};
use crate::utils::parse_id_list;

/// Custom field that turns filtering on for a category.
pub const FILTER_ENABLED_FIELD: &str = "private_topics_enabled";
/// Custom field listing the groups that may still see a filtered category.
pub const ALLOWED_GROUPS_FIELD: &str = "private_topics_allowed_groups";

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

fn connect(path: &Path) -> rusqlite::Result<Connection> {
    let conn = Connection::open(path)?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    Ok(conn)
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "t" | "true" | "1" | "yes"
    )
}

/// SQLite-backed host store.
#[derive(Debug, Clone)]
pub struct SqliteHost {
    db_path: PathBuf,
}

impl SqliteHost {
    /// Open a host database, creating any missing tables.
    pub async fn open(db_path: &Path) -> Result<Self> {
        let host = Self {
            db_path: db_path.to_path_buf(),
        };
        host.with_conn(|conn| {
            conn.execute_batch(
                r#"
                CREATE TABLE IF NOT EXISTS topics (
                    id INTEGER PRIMARY KEY,
                    category_id INTEGER,
                    user_id INTEGER NOT NULL,
                    pinned INTEGER NOT NULL DEFAULT 0,
                    hidden INTEGER NOT NULL DEFAULT 0
                );
                CREATE INDEX IF NOT EXISTS idx_topics_category ON topics(category_id);
                CREATE TABLE IF NOT EXISTS users (
                    id INTEGER PRIMARY KEY,
                    admin INTEGER NOT NULL DEFAULT 0,
                    anonymous INTEGER NOT NULL DEFAULT 0
                );
                CREATE TABLE IF NOT EXISTS group_users (
                    group_id INTEGER NOT NULL,
                    user_id INTEGER NOT NULL,
                    PRIMARY KEY (group_id, user_id)
                );
                CREATE TABLE IF NOT EXISTS category_custom_fields (
                    category_id INTEGER NOT NULL,
                    name TEXT NOT NULL,
                    value TEXT,
                    PRIMARY KEY (category_id, name)
                );
            "#,
            )
        })
        .await?;
        Ok(host)
    }

    async fn with_conn<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> rusqlite::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let path = self.db_path.clone();
        tokio::task::spawn_blocking(move || -> Result<T> {
            let conn = connect(&path)?;
            Ok(f(&conn)?)
        })
        .await?
    }

    /// Insert or replace a topic row.
    pub async fn upsert_topic(&self, topic: &Topic) -> Result<()> {
        let topic = topic.clone();
        self.with_conn(move |conn| {
            conn.execute(
                r#"
                INSERT INTO topics (id, category_id, user_id, pinned, hidden)
                VALUES (?1, ?2, ?3, ?4, ?5)
                ON CONFLICT(id) DO UPDATE SET
                    category_id = excluded.category_id,
                    user_id = excluded.user_id,
                    pinned = excluded.pinned,
                    hidden = excluded.hidden
                "#,
                params![
                    topic.id,
                    topic.category_id,
                    topic.user_id,
                    topic.pinned,
                    topic.hidden
                ],
            )?;
            Ok(())
        })
        .await
    }

    /// Insert or replace a user row and replace their group memberships.
    pub async fn upsert_user(&self, user: &User) -> Result<()> {
        let user = user.clone();
        self.with_conn(move |conn| {
            let tx = conn.unchecked_transaction()?;
            tx.execute(
                r#"
                INSERT INTO users (id, admin, anonymous) VALUES (?1, ?2, ?3)
                ON CONFLICT(id) DO UPDATE SET
                    admin = excluded.admin,
                    anonymous = excluded.anonymous
                "#,
                params![user.id, user.admin, user.anonymous],
            )?;
            tx.execute(
                "DELETE FROM group_users WHERE user_id = ?1",
                params![user.id],
            )?;
            for group_id in &user.group_ids {
                tx.execute(
                    "INSERT OR IGNORE INTO group_users (group_id, user_id) VALUES (?1, ?2)",
                    params![group_id, user.id],
                )?;
            }
            tx.commit()
        })
        .await
    }

    /// Write a category custom field.
    pub async fn set_category_field(
        &self,
        category_id: CategoryId,
        name: &str,
        value: &str,
    ) -> Result<()> {
        let name = name.to_string();
        let value = value.to_string();
        self.with_conn(move |conn| {
            conn.execute(
                r#"
                INSERT INTO category_custom_fields (category_id, name, value)
                VALUES (?1, ?2, ?3)
                ON CONFLICT(category_id, name) DO UPDATE SET value = excluded.value
                "#,
                params![category_id, name, value],
            )?;
            Ok(())
        })
        .await
    }

    /// Store a [`CategoryFilter`] as the two custom fields.
    pub async fn save_category_filter(&self, filter: &CategoryFilter) -> Result<()> {
        let mut groups: Vec<GroupId> = filter.allowed_groups.iter().copied().collect();
        groups.sort_unstable();
        let groups = groups
            .iter()
            .map(|g| g.to_string())
            .collect::<Vec<_>>()
            .join("|");

        self.set_category_field(
            filter.category_id,
            FILTER_ENABLED_FIELD,
            if filter.filter_enabled { "true" } else { "false" },
        )
        .await?;
        self.set_category_field(filter.category_id, ALLOWED_GROUPS_FIELD, &groups)
            .await
    }
}

fn topic_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Topic> {
    Ok(Topic {
        id: row.get("id")?,
        category_id: row.get("category_id")?,
        user_id: row.get("user_id")?,
        pinned: row.get("pinned")?,
        hidden: row.get("hidden")?,
    })
}

#[async_trait]
impl TopicStore for SqliteHost {
    async fn topics_in_category(&self, category_id: CategoryId) -> Result<Vec<Topic>> {
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, category_id, user_id, pinned, hidden FROM topics WHERE category_id = ?1 ORDER BY id",
            )?;
            let topics = stmt
                .query_map(params![category_id], topic_from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(topics)
        })
        .await
    }

    async fn find_topic(&self, topic_id: TopicId) -> Result<Option<Topic>> {
        self.with_conn(move |conn| {
            conn.query_row(
                "SELECT id, category_id, user_id, pinned, hidden FROM topics WHERE id = ?1",
                params![topic_id],
                topic_from_row,
            )
            .optional()
        })
        .await
    }

    async fn set_hidden(&self, topic_id: TopicId, hidden: bool) -> Result<bool> {
        self.with_conn(move |conn| {
            let changed = conn.execute(
                "UPDATE topics SET hidden = ?1 WHERE id = ?2",
                params![hidden, topic_id],
            )?;
            Ok(changed > 0)
        })
        .await
    }
}

#[async_trait]
impl CategoryStore for SqliteHost {
    async fn filter_enabled_categories(&self) -> Result<Vec<CategoryFilter>> {
        let rows: Vec<(CategoryId, String, Option<String>)> = self
            .with_conn(|conn| {
                let mut stmt = conn.prepare(
                    r#"
                    SELECT e.category_id, e.value, g.value
                    FROM category_custom_fields e
                    LEFT JOIN category_custom_fields g
                        ON g.category_id = e.category_id AND g.name = ?2
                    WHERE e.name = ?1
                    ORDER BY e.category_id
                    "#,
                )?;
                let rows = stmt
                    .query_map(params![FILTER_ENABLED_FIELD, ALLOWED_GROUPS_FIELD], |row| {
                        Ok((
                            row.get(0)?,
                            row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                            row.get(2)?,
                        ))
                    })?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                Ok(rows)
            })
            .await?;

        Ok(rows
            .into_iter()
            .filter(|(_, enabled, _)| is_truthy(enabled))
            .map(|(category_id, _, groups)| {
                let parsed = parse_id_list(groups.as_deref().unwrap_or(""));
                if !parsed.rejected.is_empty() {
                    warn!(
                        "Ignoring invalid allowed group entries {:?} on category {}",
                        parsed.rejected, category_id
                    );
                }
                CategoryFilter {
                    category_id,
                    filter_enabled: true,
                    allowed_groups: parsed.ids,
                }
            })
            .collect())
    }
}

#[async_trait]
impl GroupStore for SqliteHost {
    async fn members_of(&self, group_ids: &HashSet<GroupId>) -> Result<HashSet<UserId>> {
        if group_ids.is_empty() {
            return Ok(HashSet::new());
        }
        let group_ids: Vec<GroupId> = group_ids.iter().copied().collect();
        self.with_conn(move |conn| {
            let placeholders = vec!["?"; group_ids.len()].join(", ");
            let sql = format!(
                "SELECT DISTINCT user_id FROM group_users WHERE group_id IN ({})",
                placeholders
            );
            let mut stmt = conn.prepare(&sql)?;
            let members = stmt
                .query_map(params_from_iter(group_ids.iter()), |row| row.get(0))?
                .collect::<rusqlite::Result<HashSet<UserId>>>()?;
            Ok(members)
        })
        .await
    }
}

#[async_trait]
impl UserStore for SqliteHost {
    async fn find_user(&self, user_id: UserId) -> Result<Option<User>> {
        self.with_conn(move |conn| {
            let user = conn
                .query_row(
                    "SELECT id, admin, anonymous FROM users WHERE id = ?1",
                    params![user_id],
                    |row| {
                        Ok(User {
                            id: row.get("id")?,
                            admin: row.get("admin")?,
                            anonymous: row.get("anonymous")?,
                            group_ids: HashSet::new(),
                        })
                    },
                )
                .optional()?;

            let Some(mut user) = user else {
                return Ok(None);
            };

            let mut stmt = conn.prepare("SELECT group_id FROM group_users WHERE user_id = ?1")?;
            user.group_ids = stmt
                .query_map(params![user_id], |row| row.get(0))?
                .collect::<rusqlite::Result<HashSet<GroupId>>>()?;
            Ok(Some(user))
        })
        .await
    }
}
