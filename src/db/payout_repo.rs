// src/db/payout_repo.rs
//
// Filas fuente para el cálculo de payouts. No hay ledger: cada cálculo
// escanea las visitas / trabajos completados del período.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::common::error::AppError;

// Una visita completada, con los datos del runner ya unidos
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CompletedVisitRow {
    pub visit_id: Uuid,
    pub runner_id: Uuid,
    pub runner_name: String,
    pub runner_email: String,
    pub earnings: Decimal,
    pub completed_at: DateTime<Utc>,
    pub property_address: String,
}

// Un trabajo completado, con los datos del proveedor ya unidos
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CompletedJobRow {
    pub job_id: Uuid,
    pub provider_id: Uuid,
    pub provider_name: String,
    pub provider_email: String,
    pub provider_since: DateTime<Utc>,
    pub final_price: Decimal,
    pub completed_at: DateTime<Utc>,
    pub job_type: String,
}

#[derive(Clone)]
pub struct PayoutRepository {
    pool: PgPool,
}

impl PayoutRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // start_date en NULL deja el período abierto hacia atrás ("pendiente")
    pub async fn completed_visits_in_period(
        &self,
        start_date: Option<DateTime<Utc>>,
        end_date: DateTime<Utc>,
    ) -> Result<Vec<CompletedVisitRow>, AppError> {
        let rows = sqlx::query_as::<_, CompletedVisitRow>(
            r#"
            SELECT
                v.id           AS visit_id,
                v.runner_id,
                u.name         AS runner_name,
                u.email        AS runner_email,
                COALESCE(v.earnings, 0) AS earnings,
                v.completed_at,
                p.address      AS property_address
            FROM visits v
            JOIN users u ON u.id = v.runner_id
            JOIN properties p ON p.id = v.property_id
            WHERE v.status = 'COMPLETED'
              AND v.completed_at IS NOT NULL
              AND ($1::timestamptz IS NULL OR v.completed_at >= $1)
              AND v.completed_at <= $2
              AND u.is_active
            ORDER BY v.completed_at ASC
            "#,
        )
        .bind(start_date)
        .bind(end_date)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn completed_jobs_in_period(
        &self,
        start_date: Option<DateTime<Utc>>,
        end_date: DateTime<Utc>,
    ) -> Result<Vec<CompletedJobRow>, AppError> {
        let rows = sqlx::query_as::<_, CompletedJobRow>(
            r#"
            SELECT
                j.id           AS job_id,
                j.provider_id,
                u.name         AS provider_name,
                u.email        AS provider_email,
                u.created_at   AS provider_since,
                COALESCE(j.final_price, 0) AS final_price,
                j.completed_at,
                j.job_type
            FROM service_jobs j
            JOIN users u ON u.id = j.provider_id
            WHERE j.status = 'COMPLETED'
              AND j.completed_at IS NOT NULL
              AND ($1::timestamptz IS NULL OR j.completed_at >= $1)
              AND j.completed_at <= $2
              AND u.is_active
            ORDER BY j.completed_at ASC
            "#,
        )
        .bind(start_date)
        .bind(end_date)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
