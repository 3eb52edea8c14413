//! Activity log - best-effort, append-only record of mutating actions.
//!
//! Writing an activity entry never fails the operation that triggered it. A failed insert is
//! logged and handed back to the caller as a warning, which the HTTP layer includes in its
//! response.

use crate::{
    entities::{ActivityCategory, ActivityLog, activity_log},
    errors::Result,
};
use sea_orm::{ConnectionTrait, QueryOrder, QuerySelect, Set, prelude::*};
use serde::Serialize;

/// Result of a mutating operation plus any activity-log warnings it produced.
#[derive(Debug, Clone, Serialize)]
pub struct Audited<T> {
    /// What the operation produced
    pub value: T,
    /// Activity-log failures that did not abort the operation
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl<T> Audited<T> {
    /// Wraps a value with no warnings.
    pub const fn new(value: T) -> Self {
        Self {
            value,
            warnings: Vec::new(),
        }
    }

    /// Appends the warning returned by [`record`], if any.
    #[must_use]
    pub fn with_warning(mut self, warning: Option<String>) -> Self {
        self.warnings.extend(warning);
        self
    }

    /// Transforms the wrapped value, keeping the warnings.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Audited<U> {
        Audited {
            value: f(self.value),
            warnings: self.warnings,
        }
    }
}

/// Appends an activity entry. Returns a warning message instead of an error on failure.
pub async fn record<C>(
    db: &C,
    category: ActivityCategory,
    description: impl Into<String>,
    ref_id: Option<i64>,
) -> Option<String>
where
    C: ConnectionTrait,
{
    let description = description.into();
    let entry = activity_log::ActiveModel {
        created_at: Set(chrono::Utc::now()),
        description: Set(description.clone()),
        category: Set(category),
        ref_id: Set(ref_id),
        ..Default::default()
    };

    match entry.insert(db).await {
        Ok(_) => None,
        Err(e) => {
            tracing::warn!(?category, %description, error = %e, "failed to write activity log entry");
            Some(format!("Activity log not updated: {e}"))
        }
    }
}

/// Most recent activity entries, newest first.
///
/// Entries with the same timestamp are ordered by insertion sequence.
pub async fn list_recent(db: &DatabaseConnection, limit: u64) -> Result<Vec<activity_log::Model>> {
    ActivityLog::find()
        .order_by_desc(activity_log::Column::CreatedAt)
        .order_by_desc(activity_log::Column::Id)
        .limit(limit)
        .all(db)
        .await
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::setup_test_db;
    use sea_orm::Database;

    #[tokio::test]
    async fn test_record_and_list_newest_first() -> Result<()> {
        let db = setup_test_db().await?;

        assert!(record(&db, ActivityCategory::EventAdd, "first", Some(1)).await.is_none());
        assert!(record(&db, ActivityCategory::PhaseAdd, "second", Some(2)).await.is_none());
        assert!(record(&db, ActivityCategory::EventDelete, "third", None).await.is_none());

        let entries = list_recent(&db, 10).await?;
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].description, "third");
        assert_eq!(entries[1].description, "second");
        assert_eq!(entries[2].description, "first");
        assert_eq!(entries[2].ref_id, Some(1));

        let limited = list_recent(&db, 2).await?;
        assert_eq!(limited.len(), 2);
        assert_eq!(limited[0].description, "third");

        Ok(())
    }

    #[tokio::test]
    async fn test_equal_timestamps_fall_back_to_insertion_order() -> Result<()> {
        let db = setup_test_db().await?;
        let at = chrono::Utc::now();

        for description in ["a", "b", "c"] {
            activity_log::ActiveModel {
                created_at: Set(at),
                description: Set(description.to_string()),
                category: Set(ActivityCategory::AccountEntryAdd),
                ref_id: Set(None),
                ..Default::default()
            }
            .insert(&db)
            .await?;
        }

        let entries = list_recent(&db, 10).await?;
        let order: Vec<&str> = entries.iter().map(|e| e.description.as_str()).collect();
        assert_eq!(order, vec!["c", "b", "a"]);

        Ok(())
    }

    #[tokio::test]
    async fn test_record_failure_becomes_warning() -> Result<()> {
        // No tables created, so the insert fails
        let db = Database::connect("sqlite::memory:").await?;

        let warning = record(&db, ActivityCategory::ClientDelete, "gone", Some(7)).await;
        assert!(warning.unwrap().starts_with("Activity log not updated"));

        let audited = Audited::new(7).with_warning(Some("w".to_string())).with_warning(None);
        assert_eq!(audited.warnings, vec!["w".to_string()]);
        assert_eq!(audited.map(|v| v * 2).value, 14);

        Ok(())
    }
}
