// src/db/operations_repo.rs
//
// Contratos, pagos, visitas, trabajos de servicio y mantenimiento.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        auth::UserRole,
        operations::{
            Contract, MaintenanceRequest, MaintenanceStatus, ServiceJob, Visit,
        },
    },
};

#[derive(Clone)]
pub struct OperationsRepository {
    pool: PgPool,
}

impl OperationsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  CONTRATOS
    // =========================================================================

    #[allow(clippy::too_many_arguments)]
    pub async fn create_contract(
        &self,
        property_id: Uuid,
        owner_id: Uuid,
        tenant_id: Uuid,
        broker_id: Option<Uuid>,
        monthly_rent: Decimal,
        start_date: DateTime<Utc>,
        end_date: Option<DateTime<Utc>>,
    ) -> Result<Contract, AppError> {
        let contract = sqlx::query_as::<_, Contract>(
            r#"
            INSERT INTO contracts
                (property_id, owner_id, tenant_id, broker_id, monthly_rent, status, start_date, end_date)
            VALUES ($1, $2, $3, $4, $5, 'ACTIVE', $6, $7)
            RETURNING *
            "#,
        )
        .bind(property_id)
        .bind(owner_id)
        .bind(tenant_id)
        .bind(broker_id)
        .bind(monthly_rent)
        .bind(start_date)
        .bind(end_date)
        .fetch_one(&self.pool)
        .await?;
        Ok(contract)
    }

    // Listado según el rol del solicitante: cada rol ve lo suyo
    pub async fn list_contracts_for(
        &self,
        user_id: Uuid,
        role: UserRole,
    ) -> Result<Vec<Contract>, AppError> {
        let column = match role {
            UserRole::Tenant => "tenant_id",
            UserRole::Broker => "broker_id",
            _ => "owner_id",
        };
        let query = format!(
            "SELECT * FROM contracts WHERE {column} = $1 ORDER BY created_at DESC"
        );
        let contracts = sqlx::query_as::<_, Contract>(&query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(contracts)
    }

    pub async fn count_contracts_for_client(
        &self,
        broker_id: Uuid,
        user_id: Uuid,
    ) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM contracts
            WHERE broker_id = $1 AND (owner_id = $2 OR tenant_id = $2)
            "#,
        )
        .bind(broker_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    pub async fn count_active_contracts_for_client(
        &self,
        broker_id: Uuid,
        user_id: Uuid,
    ) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM contracts
            WHERE broker_id = $1 AND (owner_id = $2 OR tenant_id = $2) AND status = 'ACTIVE'
            "#,
        )
        .bind(broker_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    // Renta mensual agregada de los contratos activos del cliente (base para
    // estimar el ingreso por comisión)
    pub async fn sum_active_rent_for_client(
        &self,
        broker_id: Uuid,
        user_id: Uuid,
    ) -> Result<Decimal, AppError> {
        let total = sqlx::query_scalar::<_, Decimal>(
            r#"
            SELECT COALESCE(SUM(monthly_rent), 0) FROM contracts
            WHERE broker_id = $1 AND (owner_id = $2 OR tenant_id = $2) AND status = 'ACTIVE'
            "#,
        )
        .bind(broker_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(total)
    }

    // Comisiones efectivamente pagadas al corredor por contratos del cliente
    pub async fn sum_paid_commissions_for_client(
        &self,
        broker_id: Uuid,
        user_id: Uuid,
    ) -> Result<Decimal, AppError> {
        let total = sqlx::query_scalar::<_, Decimal>(
            r#"
            SELECT COALESCE(SUM(p.amount), 0)
            FROM payments p
            JOIN contracts c ON c.id = p.contract_id
            WHERE c.broker_id = $1
              AND (c.owner_id = $2 OR c.tenant_id = $2)
              AND p.kind = 'COMMISSION'
              AND p.status = 'PAID'
            "#,
        )
        .bind(broker_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(total)
    }

    // =========================================================================
    //  VISITAS (runners)
    // =========================================================================

    pub async fn create_visit(
        &self,
        property_id: Uuid,
        runner_id: Uuid,
        scheduled_at: DateTime<Utc>,
    ) -> Result<Visit, AppError> {
        let visit = sqlx::query_as::<_, Visit>(
            r#"
            INSERT INTO visits (property_id, runner_id, scheduled_at)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(property_id)
        .bind(runner_id)
        .bind(scheduled_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(visit)
    }

    pub async fn find_visit_by_id(&self, id: Uuid) -> Result<Option<Visit>, AppError> {
        let visit = sqlx::query_as::<_, Visit>("SELECT * FROM visits WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(visit)
    }

    pub async fn complete_visit(
        &self,
        id: Uuid,
        duration_minutes: i32,
        photos_taken: i32,
        earnings: Decimal,
    ) -> Result<Visit, AppError> {
        let visit = sqlx::query_as::<_, Visit>(
            r#"
            UPDATE visits
            SET status = 'COMPLETED',
                completed_at = now(),
                duration_minutes = $2,
                photos_taken = $3,
                earnings = $4
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(duration_minutes)
        .bind(photos_taken)
        .bind(earnings)
        .fetch_one(&self.pool)
        .await?;
        Ok(visit)
    }

    pub async fn list_visits_by_runner(&self, runner_id: Uuid) -> Result<Vec<Visit>, AppError> {
        let visits = sqlx::query_as::<_, Visit>(
            "SELECT * FROM visits WHERE runner_id = $1 ORDER BY scheduled_at DESC",
        )
        .bind(runner_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(visits)
    }

    // =========================================================================
    //  TRABAJOS DE SERVICIO (providers)
    // =========================================================================

    pub async fn create_job(
        &self,
        provider_id: Uuid,
        property_id: Uuid,
        description: &str,
        job_type: &str,
        quoted_price: Option<Decimal>,
    ) -> Result<ServiceJob, AppError> {
        let job = sqlx::query_as::<_, ServiceJob>(
            r#"
            INSERT INTO service_jobs (provider_id, property_id, description, job_type, quoted_price, status)
            VALUES ($1, $2, $3, $4, $5, 'ACCEPTED')
            RETURNING *
            "#,
        )
        .bind(provider_id)
        .bind(property_id)
        .bind(description)
        .bind(job_type)
        .bind(quoted_price)
        .fetch_one(&self.pool)
        .await?;
        Ok(job)
    }

    pub async fn find_job_by_id(&self, id: Uuid) -> Result<Option<ServiceJob>, AppError> {
        let job = sqlx::query_as::<_, ServiceJob>("SELECT * FROM service_jobs WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(job)
    }

    pub async fn complete_job(&self, id: Uuid, final_price: Decimal) -> Result<ServiceJob, AppError> {
        let job = sqlx::query_as::<_, ServiceJob>(
            r#"
            UPDATE service_jobs
            SET status = 'COMPLETED', completed_at = now(), final_price = $2
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(final_price)
        .fetch_one(&self.pool)
        .await?;
        Ok(job)
    }

    pub async fn list_jobs_by_provider(
        &self,
        provider_id: Uuid,
    ) -> Result<Vec<ServiceJob>, AppError> {
        let jobs = sqlx::query_as::<_, ServiceJob>(
            "SELECT * FROM service_jobs WHERE provider_id = $1 ORDER BY created_at DESC",
        )
        .bind(provider_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(jobs)
    }

    // =========================================================================
    //  MANTENIMIENTO
    // =========================================================================

    pub async fn create_maintenance(
        &self,
        property_id: Uuid,
        requested_by: Uuid,
        title: &str,
        description: &str,
        priority: &str,
        estimated_cost: Option<Decimal>,
    ) -> Result<MaintenanceRequest, AppError> {
        let request = sqlx::query_as::<_, MaintenanceRequest>(
            r#"
            INSERT INTO maintenance_requests
                (property_id, requested_by, title, description, priority, estimated_cost)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(property_id)
        .bind(requested_by)
        .bind(title)
        .bind(description)
        .bind(priority)
        .bind(estimated_cost)
        .fetch_one(&self.pool)
        .await?;
        Ok(request)
    }

    pub async fn find_maintenance_by_id(
        &self,
        id: Uuid,
    ) -> Result<Option<MaintenanceRequest>, AppError> {
        let request = sqlx::query_as::<_, MaintenanceRequest>(
            "SELECT * FROM maintenance_requests WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(request)
    }

    pub async fn update_maintenance_status(
        &self,
        id: Uuid,
        status: MaintenanceStatus,
        actual_cost: Option<Decimal>,
    ) -> Result<MaintenanceRequest, AppError> {
        let request = sqlx::query_as::<_, MaintenanceRequest>(
            r#"
            UPDATE maintenance_requests
            SET status = $2,
                actual_cost = COALESCE($3, actual_cost),
                completed_at = CASE WHEN $2 = 'COMPLETED'::maintenance_status THEN now() ELSE completed_at END,
                updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(actual_cost)
        .fetch_one(&self.pool)
        .await?;
        Ok(request)
    }
}
