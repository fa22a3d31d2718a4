use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{Result, StorageError};
use crate::models::ParticipantRow;

pub struct ParticipantRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ParticipantRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all participants, oldest first
    pub async fn list(&self) -> Result<Vec<ParticipantRow>> {
        let participants = sqlx::query_as::<_, ParticipantRow>(
            r#"
            SELECT participant_id, name, created_at
            FROM participants
            ORDER BY created_at, name
            "#,
        )
        .fetch_all(self.pool)
        .await?;

        Ok(participants)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<ParticipantRow> {
        sqlx::query_as::<_, ParticipantRow>(
            r#"
            SELECT participant_id, name, created_at
            FROM participants
            WHERE participant_id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound)
    }

    /// Create a participant. Names are unique.
    pub async fn create(&self, name: &str) -> Result<ParticipantRow> {
        let participant = sqlx::query_as::<_, ParticipantRow>(
            r#"
            INSERT INTO participants (participant_id, name)
            VALUES ($1, $2)
            RETURNING participant_id, name, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .fetch_one(self.pool)
        .await?;

        Ok(participant)
    }
}
