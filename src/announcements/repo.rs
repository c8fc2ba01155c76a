use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::Date;

use crate::announcements::dto::TodayAnnouncement;
use crate::error::ApiError;

/// The two announcement roles. Stored as plain TEXT.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Driver,
    Passenger,
}

impl Role {
    pub fn parse(s: &str) -> Option<Role> {
        match s {
            "driver" => Some(Role::Driver),
            "passenger" => Some(Role::Passenger),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Driver => "driver",
            Role::Passenger => "passenger",
        }
    }
}

/// Announcement record in the database. One per user per calendar day,
/// enforced by the unique index on (user_id, date).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Announcement {
    pub id: i64,
    pub user_id: i64,
    pub role: String,
    pub date: Date,
    pub latitude: f64,
    pub longitude: f64,
}

impl Announcement {
    /// The daily-uniqueness check.
    pub async fn find_for_user_on_date(
        db: &PgPool,
        user_id: i64,
        date: Date,
    ) -> Result<Option<Announcement>, ApiError> {
        let row = sqlx::query_as::<_, Announcement>(
            r#"
            SELECT id, user_id, role, date, latitude, longitude
            FROM announcements
            WHERE user_id = $1 AND date = $2
            "#,
        )
        .bind(user_id)
        .bind(date)
        .fetch_optional(db)
        .await?;
        Ok(row)
    }

    /// Insert the day's announcement. A concurrent duplicate surfaces as a
    /// unique violation and is reported exactly like the pre-check hit.
    pub async fn create(
        db: &PgPool,
        user_id: i64,
        role: Role,
        date: Date,
        latitude: f64,
        longitude: f64,
    ) -> Result<Announcement, ApiError> {
        let row = sqlx::query_as::<_, Announcement>(
            r#"
            INSERT INTO announcements (user_id, role, date, latitude, longitude)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, role, date, latitude, longitude
            "#,
        )
        .bind(user_id)
        .bind(role.as_str())
        .bind(date)
        .bind(latitude)
        .bind(longitude)
        .fetch_one(db)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                ApiError::Conflict("You have already made an announcement today.".into())
            }
            _ => ApiError::from(e),
        })?;
        Ok(row)
    }

    /// Joined view of one calendar day's announcements with their owners'
    /// usernames.
    pub async fn list_for_date(
        db: &PgPool,
        date: Date,
    ) -> Result<Vec<TodayAnnouncement>, ApiError> {
        #[derive(FromRow)]
        struct JoinedRow {
            username: String,
            role: String,
            date: Date,
        }

        let rows = sqlx::query_as::<_, JoinedRow>(
            r#"
            SELECT u.username, a.role, a.date
            FROM announcements a
            JOIN users u ON u.id = a.user_id
            WHERE a.date = $1
            ORDER BY a.id
            "#,
        )
        .bind(date)
        .fetch_all(db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| TodayAnnouncement {
                username: r.username,
                role: r.role,
                date: r.date,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parses_only_the_two_known_values() {
        assert_eq!(Role::parse("driver"), Some(Role::Driver));
        assert_eq!(Role::parse("passenger"), Some(Role::Passenger));
        assert_eq!(Role::parse("pilot"), None);
        assert_eq!(Role::parse("Driver"), None);
        assert_eq!(Role::parse(""), None);
    }

    #[test]
    fn role_round_trips_through_text() {
        for role in [Role::Driver, Role::Passenger] {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
    }
}
