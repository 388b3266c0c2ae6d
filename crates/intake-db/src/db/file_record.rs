//! File record repository: slot allocation and record mutations on PostgreSQL.

use async_trait::async_trait;
use intake_core::models::{ConvertedFile, FileKind, FileRecord, NewFileRecord};
use intake_core::naming::next_slot;
use intake_core::AppError;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::store_traits::{FileRecordStore, SlotLease};

const FILE_RECORD_COLUMNS: &str = "id, original_filename, content_type, file_name, directory, slot, \
     original_file_path, file_path, size, file_kind, metadata, caption, tag, error_message, \
     created_at, updated_at";

/// Repository for the file_records table.
#[derive(Clone)]
pub struct FileRecordRepository {
    pool: PgPool,
}

impl FileRecordRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn not_found(id: Uuid) -> AppError {
        AppError::NotFound(format!("File record {} not found", id))
    }
}

#[async_trait]
impl FileRecordStore for FileRecordRepository {
    /// Open a transaction, take the directory's advisory lock, then lock the row holding
    /// the highest slot. The advisory lock also covers directories with no rows yet.
    #[tracing::instrument(
        skip(self),
        fields(db.table = "file_records", db.operation = "reserve_slot")
    )]
    async fn reserve_slot(&self, directory: &str) -> Result<Box<dyn SlotLease>, AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
            .bind(directory)
            .execute(&mut *tx)
            .await?;

        let highest: Option<i64> = sqlx::query_scalar::<Postgres, i64>(
            r#"
            SELECT slot FROM file_records
            WHERE directory = $1
            ORDER BY slot DESC
            LIMIT 1
            FOR UPDATE
            "#,
        )
        .bind(directory)
        .fetch_optional(&mut *tx)
        .await?;

        let slot = next_slot(highest);
        tracing::debug!(directory = %directory, slot, "Slot reserved");

        Ok(Box::new(PgSlotLease {
            tx,
            directory: directory.to_string(),
            slot,
        }))
    }

    #[tracing::instrument(skip(self), fields(db.table = "file_records", db.record_id = %id))]
    async fn get(&self, id: Uuid) -> Result<Option<FileRecord>, AppError> {
        let record = sqlx::query_as::<Postgres, FileRecord>(&format!(
            "SELECT {} FROM file_records WHERE id = $1",
            FILE_RECORD_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(record)
    }

    #[tracing::instrument(skip(self), fields(db.table = "file_records"))]
    async fn count_in_directory(&self, directory: &str) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar::<Postgres, i64>(
            "SELECT COUNT(*) FROM file_records WHERE directory = $1",
        )
        .bind(directory)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    #[tracing::instrument(skip(self), fields(db.table = "file_records", db.record_id = %id))]
    async fn assign_kind(&self, id: Uuid, kind: FileKind) -> Result<FileKind, AppError> {
        let stored: Option<FileKind> = sqlx::query_scalar::<Postgres, FileKind>(
            r#"
            UPDATE file_records
            SET file_kind = COALESCE(file_kind, $2), updated_at = NOW()
            WHERE id = $1
            RETURNING file_kind
            "#,
        )
        .bind(id)
        .bind(kind)
        .fetch_optional(&self.pool)
        .await?;

        stored.ok_or_else(|| Self::not_found(id))
    }

    #[tracing::instrument(
        skip(self, converted),
        fields(db.table = "file_records", db.record_id = %id)
    )]
    async fn mark_converted(&self, id: Uuid, converted: &ConvertedFile) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            UPDATE file_records
            SET file_path = $2,
                file_name = $3,
                size = $4,
                metadata = $5,
                error_message = NULL,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&converted.file_path)
        .bind(&converted.file_name)
        .bind(converted.size)
        .bind(converted.metadata.to_json())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(Self::not_found(id));
        }
        Ok(())
    }

    #[tracing::instrument(skip(self), fields(db.table = "file_records", db.record_id = %id))]
    async fn mark_failed(&self, id: Uuid, reason: &str) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            UPDATE file_records
            SET file_path = NULL,
                metadata = NULL,
                error_message = $2,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(reason)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(Self::not_found(id));
        }
        Ok(())
    }

    async fn health_check(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Slot lease backed by an open transaction. Dropping it rolls the transaction back.
pub struct PgSlotLease {
    tx: Transaction<'static, Postgres>,
    directory: String,
    slot: i64,
}

#[async_trait]
impl SlotLease for PgSlotLease {
    fn directory(&self) -> &str {
        &self.directory
    }

    fn slot(&self) -> i64 {
        self.slot
    }

    async fn commit(self: Box<Self>, record: NewFileRecord) -> Result<FileRecord, AppError> {
        let PgSlotLease {
            mut tx,
            directory,
            slot,
        } = *self;

        let inserted = sqlx::query_as::<Postgres, FileRecord>(&format!(
            r#"
            INSERT INTO file_records
                (id, original_filename, content_type, file_name, directory, slot,
                 original_file_path, size)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            FILE_RECORD_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(&record.original_filename)
        .bind(&record.content_type)
        .bind(&record.file_name)
        .bind(&directory)
        .bind(slot)
        .bind(&record.original_file_path)
        .bind(record.size)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::debug!(
            db.table = "file_records",
            record_id = %inserted.id,
            directory = %inserted.directory,
            slot = inserted.slot,
            "File record committed"
        );
        Ok(inserted)
    }

    async fn release(self: Box<Self>) -> Result<(), AppError> {
        self.tx.rollback().await?;
        Ok(())
    }
}
