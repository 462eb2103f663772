//! PostgreSQL implementation of the locked-link repository.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::json;
use sqlx::PgPool;
use sqlx::types::Json;

use crate::domain::entities::{
    AdvanceOption, ButtonStyle, LockedLink, NewLockedLink, SocialAction, TargetSlot, ThemeColor,
};
use crate::domain::repositories::{LinkTotals, LockedLinkRepository};
use crate::error::AppError;

const SELECT_COLUMNS: &str = r#"
    id, key, title, subtitle, button_name, actions, targets,
    password_hash, note, expires_on, thumbnail, button_style, theme_color, created_at
"#;

/// Stores locked links in the `locked_links` table.
///
/// Actions and targets are JSONB columns; the advance options are plain
/// columns so the admin statistics can filter on them.
pub struct PgLockedLinkRepository {
    pool: Arc<PgPool>,
}

impl PgLockedLinkRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct LockedLinkRow {
    id: i64,
    key: String,
    title: Option<String>,
    subtitle: Option<String>,
    button_name: Option<String>,
    actions: Json<Vec<SocialAction>>,
    targets: Json<BTreeMap<TargetSlot, String>>,
    password_hash: Option<String>,
    note: Option<String>,
    expires_on: Option<NaiveDate>,
    thumbnail: Option<String>,
    button_style: String,
    theme_color: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<LockedLinkRow> for LockedLink {
    type Error = AppError;

    fn try_from(row: LockedLinkRow) -> Result<Self, Self::Error> {
        let corrupt = |field: &str, e: AppError| {
            AppError::internal(
                "Stored locked link is malformed",
                json!({ "key": row.key, "field": field, "reason": e.to_string() }),
            )
        };

        let button_style: ButtonStyle = row
            .button_style
            .parse()
            .map_err(|e| corrupt("button_style", e))?;
        let theme_color = row
            .theme_color
            .clone()
            .map(ThemeColor::try_from)
            .transpose()
            .map_err(|e| corrupt("theme_color", e))?;

        Ok(LockedLink {
            id: row.id,
            key: row.key,
            title: row.title,
            subtitle: row.subtitle,
            button_name: row.button_name,
            actions: row.actions.0,
            targets: row.targets.0,
            advanced: AdvanceOption {
                password_hash: row.password_hash,
                note: row.note,
                expires_on: row.expires_on,
                thumbnail: row.thumbnail,
                button_style,
                theme_color,
            },
            created_at: row.created_at,
        })
    }
}

#[async_trait]
impl LockedLinkRepository for PgLockedLinkRepository {
    async fn create(&self, new_link: NewLockedLink) -> Result<LockedLink, AppError> {
        let sql = format!(
            r#"
            INSERT INTO locked_links (
                key, title, subtitle, button_name, actions, targets,
                password_hash, note, expires_on, thumbnail, button_style, theme_color
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING {SELECT_COLUMNS}
            "#
        );

        let advanced = new_link.advanced;
        let row: LockedLinkRow = sqlx::query_as(&sql)
            .bind(&new_link.key)
            .bind(&new_link.title)
            .bind(&new_link.subtitle)
            .bind(&new_link.button_name)
            .bind(Json(&new_link.actions))
            .bind(Json(&new_link.targets))
            .bind(&advanced.password_hash)
            .bind(&advanced.note)
            .bind(advanced.expires_on)
            .bind(&advanced.thumbnail)
            .bind(advanced.button_style.as_str())
            .bind(advanced.theme_color.as_ref().map(ThemeColor::as_str))
            .fetch_one(self.pool.as_ref())
            .await?;

        row.try_into()
    }

    async fn find_by_key(&self, key: &str) -> Result<Option<LockedLink>, AppError> {
        let sql = format!("SELECT {SELECT_COLUMNS} FROM locked_links WHERE key = $1");

        let row: Option<LockedLinkRow> = sqlx::query_as(&sql)
            .bind(key)
            .fetch_optional(self.pool.as_ref())
            .await?;

        row.map(LockedLink::try_from).transpose()
    }

    async fn delete(&self, key: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM locked_links WHERE key = $1")
            .bind(key)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn totals(&self, today: NaiveDate) -> Result<LinkTotals, AppError> {
        let (total, password_protected, expired): (i64, i64, i64) = sqlx::query_as(
            r#"
            SELECT
                COUNT(*),
                COUNT(*) FILTER (WHERE password_hash IS NOT NULL),
                COUNT(*) FILTER (WHERE expires_on IS NOT NULL AND expires_on <= $1)
            FROM locked_links
            "#,
        )
        .bind(today)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(LinkTotals {
            total,
            password_protected,
            expired,
        })
    }
}
