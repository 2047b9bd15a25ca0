// src/db/broker_repo.rs
//
// Acceso a broker_clients, broker_property_management y broker_invitations.

use rust_decimal::Decimal;
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::broker::{
        BrokerClient, BrokerClientSummary, BrokerInvitation, BrokerPropertyManagement,
        ClientStatus, ClientType, InvitationStatus, InvitationType, ManagementType,
        PropertyManagementType,
    },
};

#[derive(Clone)]
pub struct BrokerRepository {
    pool: PgPool,
}

impl BrokerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  INVITACIONES
    // =========================================================================

    pub async fn find_pending_invitation(
        &self,
        broker_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<BrokerInvitation>, AppError> {
        let invitation = sqlx::query_as::<_, BrokerInvitation>(
            r#"
            SELECT * FROM broker_invitations
            WHERE broker_id = $1 AND user_id = $2 AND status = 'PENDING'
            "#,
        )
        .bind(broker_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(invitation)
    }

    pub async fn create_invitation(
        &self,
        broker_id: Uuid,
        user_id: Uuid,
        invitation_type: InvitationType,
        services_offered: Option<&Value>,
        message: Option<&str>,
        commission_rate: Decimal,
    ) -> Result<BrokerInvitation, AppError> {
        let invitation = sqlx::query_as::<_, BrokerInvitation>(
            r#"
            INSERT INTO broker_invitations
                (broker_id, user_id, invitation_type, services_offered, message, commission_rate)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(broker_id)
        .bind(user_id)
        .bind(invitation_type)
        .bind(services_offered)
        .bind(message)
        .bind(commission_rate)
        .fetch_one(&self.pool)
        .await?;
        Ok(invitation)
    }

    pub async fn find_invitation_by_id(
        &self,
        id: Uuid,
    ) -> Result<Option<BrokerInvitation>, AppError> {
        let invitation =
            sqlx::query_as::<_, BrokerInvitation>("SELECT * FROM broker_invitations WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(invitation)
    }

    pub async fn list_invitations_by_broker(
        &self,
        broker_id: Uuid,
    ) -> Result<Vec<BrokerInvitation>, AppError> {
        let invitations = sqlx::query_as::<_, BrokerInvitation>(
            "SELECT * FROM broker_invitations WHERE broker_id = $1 ORDER BY created_at DESC",
        )
        .bind(broker_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(invitations)
    }

    pub async fn list_pending_invitations_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<BrokerInvitation>, AppError> {
        let invitations = sqlx::query_as::<_, BrokerInvitation>(
            r#"
            SELECT * FROM broker_invitations
            WHERE user_id = $1 AND status = 'PENDING'
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(invitations)
    }

    pub async fn update_invitation_status(
        &self,
        id: Uuid,
        status: InvitationStatus,
    ) -> Result<BrokerInvitation, AppError> {
        let invitation = sqlx::query_as::<_, BrokerInvitation>(
            r#"
            UPDATE broker_invitations
            SET status = $2, responded_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(status)
        .fetch_one(&self.pool)
        .await?;
        Ok(invitation)
    }

    // =========================================================================
    //  RELACIONES (broker_clients)
    // =========================================================================

    pub async fn find_active_client(
        &self,
        broker_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<BrokerClient>, AppError> {
        let client = sqlx::query_as::<_, BrokerClient>(
            r#"
            SELECT * FROM broker_clients
            WHERE broker_id = $1 AND user_id = $2 AND status = 'ACTIVE'
            "#,
        )
        .bind(broker_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(client)
    }

    pub async fn find_client_by_id(&self, id: Uuid) -> Result<Option<BrokerClient>, AppError> {
        let client = sqlx::query_as::<_, BrokerClient>("SELECT * FROM broker_clients WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(client)
    }

    pub async fn create_client(
        &self,
        broker_id: Uuid,
        user_id: Uuid,
        client_type: ClientType,
        commission_rate: Decimal,
        services_offered: Option<&Value>,
    ) -> Result<BrokerClient, AppError> {
        let client = sqlx::query_as::<_, BrokerClient>(
            r#"
            INSERT INTO broker_clients
                (broker_id, user_id, client_type, commission_rate, services_offered)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(broker_id)
        .bind(user_id)
        .bind(client_type)
        .bind(commission_rate)
        .bind(services_offered)
        .fetch_one(&self.pool)
        .await?;
        Ok(client)
    }

    // Listado del corredor con datos del usuario y filtros opcionales.
    // Los filtros en NULL no restringen.
    pub async fn list_clients(
        &self,
        broker_id: Uuid,
        search: Option<&str>,
        status: Option<ClientStatus>,
        client_type: Option<ClientType>,
    ) -> Result<Vec<BrokerClientSummary>, AppError> {
        let clients = sqlx::query_as::<_, BrokerClientSummary>(
            r#"
            SELECT
                bc.id,
                bc.user_id,
                u.name  AS client_name,
                u.email AS client_email,
                u.phone AS client_phone,
                bc.status,
                bc.client_type,
                bc.property_management_type,
                bc.commission_rate,
                bc.total_properties_managed,
                bc.total_contracts,
                bc.total_commissions,
                bc.satisfaction_rating,
                bc.last_interaction,
                bc.start_date
            FROM broker_clients bc
            JOIN users u ON u.id = bc.user_id
            WHERE bc.broker_id = $1
              AND bc.status = COALESCE($2, bc.status)
              AND bc.client_type = COALESCE($3, bc.client_type)
              AND ($4::text IS NULL OR u.name ILIKE '%' || $4 || '%' OR u.email ILIKE '%' || $4 || '%')
            ORDER BY bc.last_interaction DESC NULLS LAST, bc.start_date DESC
            "#,
        )
        .bind(broker_id)
        .bind(status)
        .bind(client_type)
        .bind(search)
        .fetch_all(&self.pool)
        .await?;
        Ok(clients)
    }

    pub async fn update_management_type(
        &self,
        client_id: Uuid,
        management_type: PropertyManagementType,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE broker_clients
            SET property_management_type = $2, last_interaction = now(), updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(client_id)
        .bind(management_type)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    // Persiste los contadores derivados recalculados
    pub async fn update_client_metrics(
        &self,
        client_id: Uuid,
        total_properties_managed: i64,
        total_contracts: i64,
        total_commissions: Decimal,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE broker_clients
            SET total_properties_managed = $2,
                total_contracts = $3,
                total_commissions = $4,
                updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(client_id)
        .bind(total_properties_managed as i32)
        .bind(total_contracts as i32)
        .bind(total_commissions)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    // =========================================================================
    //  GESTIÓN POR PROPIEDAD (broker_property_management)
    // =========================================================================

    // Chequeo de existencia previo al insert: la idempotencia del flujo
    // "attach" depende de esta consulta.
    pub async fn management_exists(
        &self,
        broker_id: Uuid,
        client_id: Uuid,
        property_id: Uuid,
    ) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM broker_property_management
                WHERE broker_id = $1 AND client_id = $2 AND property_id = $3
                  AND status = 'ACTIVE'
            )
            "#,
        )
        .bind(broker_id)
        .bind(client_id)
        .bind(property_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    pub async fn insert_management(
        &self,
        broker_id: Uuid,
        client_id: Uuid,
        property_id: Uuid,
        management_type: ManagementType,
        services: Option<&Value>,
        commission_rate: Decimal,
        exclusivity: bool,
    ) -> Result<BrokerPropertyManagement, AppError> {
        let row = sqlx::query_as::<_, BrokerPropertyManagement>(
            r#"
            INSERT INTO broker_property_management
                (broker_id, client_id, property_id, management_type, services, commission_rate, exclusivity)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(broker_id)
        .bind(client_id)
        .bind(property_id)
        .bind(management_type)
        .bind(services)
        .bind(commission_rate)
        .bind(exclusivity)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    return AppError::DuplicateResource(
                        "La propiedad ya está bajo gestión de este corredor.".into(),
                    );
                }
            }
            AppError::DatabaseError(e)
        })?;
        Ok(row)
    }

    pub async fn terminate_management(
        &self,
        client_id: Uuid,
        property_id: Uuid,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE broker_property_management
            SET status = 'TERMINATED'
            WHERE client_id = $1 AND property_id = $2 AND status = 'ACTIVE'
            "#,
        )
        .bind(client_id)
        .bind(property_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn active_property_ids_by_client(
        &self,
        client_id: Uuid,
    ) -> Result<Vec<Uuid>, AppError> {
        let ids = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT property_id FROM broker_property_management
            WHERE client_id = $1 AND status = 'ACTIVE'
            "#,
        )
        .bind(client_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(ids)
    }

    pub async fn count_active_management(&self, client_id: Uuid) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM broker_property_management
            WHERE client_id = $1 AND status = 'ACTIVE'
            "#,
        )
        .bind(client_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    // Regla de acceso de mantenimiento: el corredor ve solicitudes de las
    // propiedades que gestiona
    pub async fn broker_manages_property(
        &self,
        broker_id: Uuid,
        property_id: Uuid,
    ) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM broker_property_management
                WHERE broker_id = $1 AND property_id = $2 AND status = 'ACTIVE'
            )
            "#,
        )
        .bind(broker_id)
        .bind(property_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }
}
