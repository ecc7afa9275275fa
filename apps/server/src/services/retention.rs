//! Project retention sweep.
//!
//! Runs as a side effect of the project list read, scoped to the calling
//! user's rows only. Failure never blocks the read; callers log and
//! continue.

use chrono::{DateTime, Duration, Utc};
use tracing::info;

use crate::db::DbPool;
use crate::error::AppResult;

/// Delete the user's projects older than the retention window.
/// Returns the number of rows removed.
pub async fn sweep_expired_projects(
    pool: &DbPool,
    user_id: &str,
    retention_days: i64,
) -> AppResult<u64> {
    let cutoff = retention_cutoff(Utc::now(), retention_days);
    let removed = pool.delete_projects_older_than(user_id, cutoff).await?;

    if removed > 0 {
        info!(
            "Retention sweep removed {} project(s) for user {}",
            removed, user_id
        );
    }

    Ok(removed)
}

/// Compute the cutoff timestamp for the retention window.
fn retention_cutoff(now: DateTime<Utc>, retention_days: i64) -> DateTime<Utc> {
    now - Duration::days(retention_days)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_cutoff_is_exactly_n_days_back() {
        let now = Utc.with_ymd_and_hms(2026, 7, 16, 12, 0, 0).unwrap();
        let cutoff = retention_cutoff(now, 15);
        assert_eq!(cutoff, Utc.with_ymd_and_hms(2026, 7, 1, 12, 0, 0).unwrap());
    }

    #[test]
    fn test_project_on_the_boundary_survives() {
        // A row created exactly at the cutoff is not strictly older than it;
        // the delete filter uses `<`, so it must survive the sweep.
        let now = Utc.with_ymd_and_hms(2026, 7, 16, 12, 0, 0).unwrap();
        let cutoff = retention_cutoff(now, 15);
        let created_at = cutoff;
        assert!(!(created_at < cutoff));
    }
}
