use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::Row;
use sqlx::migrate::{MigrateError, Migrator};
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteRow,
};
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::models::{Booking, BookingDetails, FitnessClass};

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("migration error: {0}")]
    Migrate(#[from] MigrateError),
    #[error("failed to prepare database directory: {0}")]
    Io(#[from] std::io::Error),
}

/// Result of the atomic slot claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimOutcome {
    /// Slot decremented and booking row inserted in the same transaction.
    Booked,
    /// No slot left at write time (or the class vanished). Nothing changed.
    NoSlot,
    /// The (class_id, user_email) pair already exists. Nothing changed.
    Duplicate,
}

/// Persistence interface consumed by the booking and query layers.
#[async_trait]
pub trait BookingStore: Send + Sync {
    async fn insert_class(&self, class: &FitnessClass) -> Result<(), StoreError>;

    /// All classes in insertion order.
    async fn list_classes(&self) -> Result<Vec<FitnessClass>, StoreError>;

    async fn find_class(&self, id: Uuid) -> Result<Option<FitnessClass>, StoreError>;

    async fn booking_exists(&self, class_id: Uuid, user_email: &str) -> Result<bool, StoreError>;

    /// Decrements `available_slots` of `booking.class_id` and inserts `booking`,
    /// both or neither. The slot check is re-done inside the write.
    async fn claim_slot(&self, booking: &Booking) -> Result<ClaimOutcome, StoreError>;

    /// Bookings for `user_email` joined with their class, in insertion order.
    async fn bookings_by_email(&self, user_email: &str) -> Result<Vec<BookingDetails>, StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;
}

#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        ensure_parent_dir(database_url)?;

        let opts = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(opts)
            .await?;

        info!("Opened database: {database_url}");
        Self::migrated(pool).await
    }

    /// Single-connection in-memory database. The connection is never recycled
    /// since closing it would drop the data.
    pub async fn in_memory() -> Result<Self, StoreError> {
        let opts = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None::<Duration>)
            .max_lifetime(None::<Duration>)
            .connect_with(opts)
            .await?;
        Self::migrated(pool).await
    }

    async fn migrated(pool: SqlitePool) -> Result<Self, StoreError> {
        MIGRATOR.run(&pool).await?;
        Ok(Self { pool })
    }
}

fn ensure_parent_dir(database_url: &str) -> std::io::Result<()> {
    let Some(path) = database_url.strip_prefix("sqlite://") else {
        return Ok(());
    };
    let path = path.split('?').next().unwrap_or_default();
    if path.is_empty() || path.starts_with(":memory:") {
        return Ok(());
    }
    match Path::new(path).parent() {
        Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent),
        _ => Ok(()),
    }
}

fn row_to_class(row: &SqliteRow) -> Result<FitnessClass, sqlx::Error> {
    Ok(FitnessClass {
        id: row.try_get::<uuid::fmt::Hyphenated, _>("id")?.into_uuid(),
        name: row.try_get("name")?,
        instructor: row.try_get("instructor")?,
        date_time: row.try_get("date_time")?,
        capacity: row.try_get("capacity")?,
        available_slots: row.try_get("available_slots")?,
    })
}

fn row_to_details(row: &SqliteRow) -> Result<BookingDetails, sqlx::Error> {
    Ok(BookingDetails {
        booking: Booking {
            id: row.try_get::<uuid::fmt::Hyphenated, _>("id")?.into_uuid(),
            class_id: row.try_get::<uuid::fmt::Hyphenated, _>("class_id")?.into_uuid(),
            user_name: row.try_get("user_name")?,
            user_email: row.try_get("user_email")?,
            booking_time: row.try_get("booking_time")?,
        },
        class_name: row.try_get("class_name")?,
        class_date_time: row.try_get("class_date_time")?,
    })
}

#[async_trait]
impl BookingStore for SqliteStore {
    async fn insert_class(&self, class: &FitnessClass) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO fitness_classes (id, name, instructor, date_time, capacity, available_slots)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(class.id.hyphenated())
        .bind(&class.name)
        .bind(&class.instructor)
        .bind(class.date_time)
        .bind(class.capacity)
        .bind(class.available_slots)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_classes(&self) -> Result<Vec<FitnessClass>, StoreError> {
        let rows = sqlx::query(
            "SELECT id, name, instructor, date_time, capacity, available_slots FROM fitness_classes ORDER BY rowid",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(row_to_class).collect::<Result<Vec<_>, sqlx::Error>>()?)
    }

    async fn find_class(&self, id: Uuid) -> Result<Option<FitnessClass>, StoreError> {
        let row = sqlx::query(
            "SELECT id, name, instructor, date_time, capacity, available_slots FROM fitness_classes WHERE id = ?1",
        )
        .bind(id.hyphenated())
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.as_ref().map(row_to_class).transpose()?)
    }

    async fn booking_exists(&self, class_id: Uuid, user_email: &str) -> Result<bool, StoreError> {
        let row = sqlx::query("SELECT 1 FROM bookings WHERE class_id = ?1 AND user_email = ?2")
            .bind(class_id.hyphenated())
            .bind(user_email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }

    async fn claim_slot(&self, booking: &Booking) -> Result<ClaimOutcome, StoreError> {
        // The conditional update comes first so the transaction takes the
        // write lock before anything else is read.
        let mut tx = self.pool.begin().await?;

        let claimed = sqlx::query(
            "UPDATE fitness_classes SET available_slots = available_slots - 1 WHERE id = ?1 AND available_slots > 0",
        )
        .bind(booking.class_id.hyphenated())
        .execute(&mut *tx)
        .await?;

        if claimed.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(ClaimOutcome::NoSlot);
        }

        let inserted = sqlx::query(
            r#"
            INSERT INTO bookings (id, class_id, user_name, user_email, booking_time)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(booking.id.hyphenated())
        .bind(booking.class_id.hyphenated())
        .bind(&booking.user_name)
        .bind(&booking.user_email)
        .bind(booking.booking_time)
        .execute(&mut *tx)
        .await;

        match inserted {
            Ok(_) => {
                tx.commit().await?;
                Ok(ClaimOutcome::Booked)
            }
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                tx.rollback().await?;
                Ok(ClaimOutcome::Duplicate)
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn bookings_by_email(&self, user_email: &str) -> Result<Vec<BookingDetails>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT b.id, b.class_id, b.user_name, b.user_email, b.booking_time,
                   c.name AS class_name, c.date_time AS class_date_time
            FROM bookings b
            JOIN fitness_classes c ON c.id = b.class_id
            WHERE b.user_email = ?1
            ORDER BY b.rowid
            "#,
        )
        .bind(user_email)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(row_to_details).collect::<Result<Vec<_>, sqlx::Error>>()?)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
