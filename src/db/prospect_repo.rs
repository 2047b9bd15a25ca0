// src/db/prospect_repo.rs

use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::prospect::{
        BrokerProspect, ProspectActivity, ProspectPriority, ProspectStatus, ProspectType,
    },
};

// Cambios acumulados sobre un prospecto; los None dejan la columna intacta
#[derive(Debug, Default)]
pub struct ProspectChanges {
    pub status: Option<ProspectStatus>,
    pub priority: Option<ProspectPriority>,
    pub notes: Option<String>,
    pub lost_reason: Option<String>,
    pub converted_at: Option<DateTime<Utc>>,
    pub converted_client_id: Option<Uuid>,
    pub last_contact_date: Option<DateTime<Utc>>,
    pub next_follow_up_date: Option<DateTime<Utc>>,
    pub bump_contact_count: bool,
}

// Señales de engagement para el cálculo del lead score
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ActivitySignal {
    pub activity_type: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct ProspectRepository {
    pool: PgPool,
}

impl ProspectRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        &self,
        broker_id: Uuid,
        name: &str,
        email: Option<&str>,
        phone: Option<&str>,
        rut: Option<&str>,
        prospect_type: ProspectType,
        source: Option<&str>,
        budget: Option<&Value>,
        preferred_locations: Option<&Value>,
        notes: Option<&str>,
    ) -> Result<BrokerProspect, AppError> {
        let prospect = sqlx::query_as::<_, BrokerProspect>(
            r#"
            INSERT INTO broker_prospects
                (broker_id, name, email, phone, rut, prospect_type, source,
                 budget, preferred_locations, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(broker_id)
        .bind(name)
        .bind(email)
        .bind(phone)
        .bind(rut)
        .bind(prospect_type)
        .bind(source)
        .bind(budget)
        .bind(preferred_locations)
        .bind(notes)
        .fetch_one(&self.pool)
        .await?;
        Ok(prospect)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<BrokerProspect>, AppError> {
        let prospect =
            sqlx::query_as::<_, BrokerProspect>("SELECT * FROM broker_prospects WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(prospect)
    }

    pub async fn list_by_broker(
        &self,
        broker_id: Uuid,
        status: Option<ProspectStatus>,
    ) -> Result<Vec<BrokerProspect>, AppError> {
        let prospects = sqlx::query_as::<_, BrokerProspect>(
            r#"
            SELECT * FROM broker_prospects
            WHERE broker_id = $1 AND status = COALESCE($2, status)
            ORDER BY lead_score DESC, created_at DESC
            "#,
        )
        .bind(broker_id)
        .bind(status)
        .fetch_all(&self.pool)
        .await?;
        Ok(prospects)
    }

    // Aplica un conjunto de cambios en una sola pasada
    pub async fn apply_changes(
        &self,
        id: Uuid,
        changes: &ProspectChanges,
    ) -> Result<BrokerProspect, AppError> {
        let prospect = sqlx::query_as::<_, BrokerProspect>(
            r#"
            UPDATE broker_prospects SET
                status              = COALESCE($2, status),
                priority            = COALESCE($3, priority),
                notes               = COALESCE($4, notes),
                lost_reason         = COALESCE($5, lost_reason),
                converted_at        = COALESCE($6, converted_at),
                converted_client_id = COALESCE($7, converted_client_id),
                last_contact_date   = COALESCE($8, last_contact_date),
                next_follow_up_date = COALESCE($9, next_follow_up_date),
                contact_count       = contact_count + $10,
                updated_at          = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(changes.status)
        .bind(changes.priority)
        .bind(changes.notes.as_deref())
        .bind(changes.lost_reason.as_deref())
        .bind(changes.converted_at)
        .bind(changes.converted_client_id)
        .bind(changes.last_contact_date)
        .bind(changes.next_follow_up_date)
        .bind(if changes.bump_contact_count { 1i32 } else { 0i32 })
        .fetch_one(&self.pool)
        .await?;
        Ok(prospect)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        sqlx::query("DELETE FROM broker_prospects WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    // IDs de prospectos no terminales para el recálculo masivo de scores
    pub async fn ids_for_rescore(&self, broker_id: Uuid) -> Result<Vec<Uuid>, AppError> {
        let ids = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT id FROM broker_prospects
            WHERE broker_id = $1 AND status NOT IN ('CONVERTED', 'LOST')
            "#,
        )
        .bind(broker_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(ids)
    }

    pub async fn persist_score(
        &self,
        id: Uuid,
        lead_score: i32,
        conversion_probability: i32,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE broker_prospects
            SET lead_score = $2, conversion_probability = $3, updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(lead_score)
        .bind(conversion_probability)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    // =========================================================================
    //  ACTIVIDADES Y PROPIEDADES COMPARTIDAS
    // =========================================================================

    pub async fn insert_activity(
        &self,
        prospect_id: Uuid,
        broker_id: Uuid,
        activity_type: &str,
        title: &str,
        description: Option<&str>,
        outcome: Option<&str>,
    ) -> Result<ProspectActivity, AppError> {
        let activity = sqlx::query_as::<_, ProspectActivity>(
            r#"
            INSERT INTO prospect_activities
                (prospect_id, broker_id, activity_type, title, description, outcome, completed_at)
            VALUES ($1, $2, $3, $4, $5, $6, now())
            RETURNING *
            "#,
        )
        .bind(prospect_id)
        .bind(broker_id)
        .bind(activity_type)
        .bind(title)
        .bind(description)
        .bind(outcome)
        .fetch_one(&self.pool)
        .await?;
        Ok(activity)
    }

    // Señales recientes (las últimas 50) para el scoring
    pub async fn activity_signals(&self, prospect_id: Uuid) -> Result<Vec<ActivitySignal>, AppError> {
        let signals = sqlx::query_as::<_, ActivitySignal>(
            r#"
            SELECT activity_type, created_at FROM prospect_activities
            WHERE prospect_id = $1
            ORDER BY created_at DESC
            LIMIT 50
            "#,
        )
        .bind(prospect_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(signals)
    }

    // (compartidas, vistas al menos una vez)
    pub async fn shared_property_counts(&self, prospect_id: Uuid) -> Result<(i64, i64), AppError> {
        let row = sqlx::query_as::<_, (i64, i64)>(
            r#"
            SELECT COUNT(*), COUNT(*) FILTER (WHERE view_count > 0)
            FROM prospect_shared_properties
            WHERE prospect_id = $1
            "#,
        )
        .bind(prospect_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn user_rut_verified(&self, user_id: Uuid) -> Result<bool, AppError> {
        let verified =
            sqlx::query_scalar::<_, bool>("SELECT rut_verified FROM users WHERE id = $1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?
                .unwrap_or(false);
        Ok(verified)
    }
}
