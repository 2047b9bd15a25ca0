// src/services/operations_service.rs
//
// Flujos transaccionales: contratos, visitas de runners, trabajos de
// proveedores y solicitudes de mantenimiento.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{OperationsRepository, PropertyRepository},
    models::{
        auth::{User, UserRole},
        notification::{NotificationKind, NotificationPriority},
        operations::{
            Contract, MaintenanceRequest, MaintenanceStatus, ServiceJob, Visit, VisitStatus,
        },
        property::Property,
    },
    services::{
        broker_service::BrokerService,
        notification_service::{NotificationService, NotifyParams},
    },
};

// Tarifas de visita (CLP): base por minuto más bono por propiedad premium
const VISIT_RATE_PER_MINUTE: u32 = 500;
const PREMIUM_PROPERTY_BONUS: u32 = 200;
const PREMIUM_PROPERTY_THRESHOLD: u32 = 1_000_000;

// Ganancia de una visita completada
pub fn compute_visit_earnings(duration_minutes: i32, property_price: Decimal) -> Decimal {
    let base = Decimal::from(VISIT_RATE_PER_MINUTE) * Decimal::from(duration_minutes.max(0));
    let bonus = if property_price >= Decimal::from(PREMIUM_PROPERTY_THRESHOLD) {
        Decimal::from(PREMIUM_PROPERTY_BONUS)
    } else {
        Decimal::ZERO
    };
    base + bonus
}

#[derive(Clone)]
pub struct OperationsService {
    repo: OperationsRepository,
    property_repo: PropertyRepository,
    broker_service: BrokerService,
    notifications: NotificationService,
}

impl OperationsService {
    pub fn new(
        repo: OperationsRepository,
        property_repo: PropertyRepository,
        broker_service: BrokerService,
        notifications: NotificationService,
    ) -> Self {
        Self { repo, property_repo, broker_service, notifications }
    }

    async fn property_or_404(&self, property_id: Uuid) -> Result<Property, AppError> {
        self.property_repo
            .find_by_id(property_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Propiedad".into()))
    }

    // =========================================================================
    //  CONTRATOS
    // =========================================================================

    pub async fn create_contract(
        &self,
        owner: &User,
        property_id: Uuid,
        tenant_id: Uuid,
        monthly_rent: Decimal,
        start_date: DateTime<Utc>,
        end_date: Option<DateTime<Utc>>,
    ) -> Result<Contract, AppError> {
        let property = self.property_or_404(property_id).await?;
        if property.owner_id != owner.id {
            return Err(AppError::BusinessRule(
                "La propiedad no pertenece al solicitante.".into(),
            ));
        }

        // El contrato hereda el corredor que gestiona la propiedad
        let contract = self
            .repo
            .create_contract(
                property_id,
                owner.id,
                tenant_id,
                property.broker_id,
                monthly_rent,
                start_date,
                end_date,
            )
            .await?;

        // Un contrato nuevo mueve los contadores de la relación, si la hay
        if let Some(broker_id) = contract.broker_id {
            if let Some(client) = self
                .broker_service
                .repo()
                .find_active_client(broker_id, owner.id)
                .await?
            {
                self.broker_service.refresh_client_metrics(&client).await?;
            }
        }

        tracing::info!(contract_id = %contract.id, property_id = %property_id, "Contrato creado");
        Ok(contract)
    }

    pub async fn list_contracts(&self, caller: &User) -> Result<Vec<Contract>, AppError> {
        self.repo.list_contracts_for(caller.id, caller.role).await
    }

    // =========================================================================
    //  VISITAS
    // =========================================================================

    pub async fn schedule_visit(
        &self,
        runner: &User,
        property_id: Uuid,
        scheduled_at: DateTime<Utc>,
    ) -> Result<Visit, AppError> {
        self.property_or_404(property_id).await?;
        self.repo.create_visit(property_id, runner.id, scheduled_at).await
    }

    pub async fn complete_visit(
        &self,
        runner: &User,
        visit_id: Uuid,
        duration_minutes: i32,
        photos_taken: i32,
    ) -> Result<Visit, AppError> {
        let visit = self
            .repo
            .find_visit_by_id(visit_id)
            .await?
            .filter(|v| v.runner_id == runner.id)
            .ok_or_else(|| AppError::ResourceNotFound("Visita".into()))?;

        if !matches!(visit.status, VisitStatus::Scheduled | VisitStatus::InProgress) {
            return Err(AppError::BusinessRule(
                "La visita ya fue completada o cancelada.".into(),
            ));
        }

        let property = self.property_or_404(visit.property_id).await?;
        let earnings = compute_visit_earnings(duration_minutes, property.price);

        let visit = self
            .repo
            .complete_visit(visit_id, duration_minutes, photos_taken, earnings)
            .await?;

        tracing::info!(
            visit_id = %visit.id,
            runner_id = %runner.id,
            earnings = %earnings,
            "Visita completada"
        );
        Ok(visit)
    }

    pub async fn list_visits(&self, runner: &User) -> Result<Vec<Visit>, AppError> {
        self.repo.list_visits_by_runner(runner.id).await
    }

    // =========================================================================
    //  TRABAJOS DE SERVICIO
    // =========================================================================

    pub async fn create_job(
        &self,
        provider: &User,
        property_id: Uuid,
        description: &str,
        job_type: &str,
        quoted_price: Option<Decimal>,
    ) -> Result<ServiceJob, AppError> {
        self.property_or_404(property_id).await?;
        self.repo
            .create_job(provider.id, property_id, description, job_type, quoted_price)
            .await
    }

    pub async fn complete_job(
        &self,
        provider: &User,
        job_id: Uuid,
        final_price: Decimal,
    ) -> Result<ServiceJob, AppError> {
        let job = self
            .repo
            .find_job_by_id(job_id)
            .await?
            .filter(|j| j.provider_id == provider.id)
            .ok_or_else(|| AppError::ResourceNotFound("Trabajo".into()))?;

        if job.completed_at.is_some() {
            return Err(AppError::BusinessRule("El trabajo ya fue completado.".into()));
        }

        self.repo.complete_job(job_id, final_price).await
    }

    pub async fn list_jobs(&self, provider: &User) -> Result<Vec<ServiceJob>, AppError> {
        self.repo.list_jobs_by_provider(provider.id).await
    }

    // =========================================================================
    //  MANTENIMIENTO
    // =========================================================================

    pub async fn create_maintenance(
        &self,
        caller: &User,
        property_id: Uuid,
        title: &str,
        description: &str,
        priority: &str,
        estimated_cost: Option<Decimal>,
    ) -> Result<MaintenanceRequest, AppError> {
        self.property_or_404(property_id).await?;
        self.repo
            .create_maintenance(property_id, caller.id, title, description, priority, estimated_cost)
            .await
    }

    // Pueden ver la solicitud: quien la pidió, el dueño de la propiedad, el
    // corredor con gestión activa sobre ella, el proveedor asignado y admin.
    pub async fn get_maintenance(
        &self,
        caller: &User,
        request_id: Uuid,
    ) -> Result<MaintenanceRequest, AppError> {
        let request = self
            .repo
            .find_maintenance_by_id(request_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Solicitud de mantenimiento".into()))?;

        if caller.role == UserRole::Admin || request.requested_by == caller.id {
            return Ok(request);
        }

        let property = self.property_or_404(request.property_id).await?;
        let authorized = match caller.role {
            UserRole::Owner => property.owner_id == caller.id,
            UserRole::Broker => {
                self.broker_service
                    .repo()
                    .broker_manages_property(caller.id, property.id)
                    .await?
            }
            UserRole::Maintenance | UserRole::Provider => request.provider_id == Some(caller.id),
            _ => false,
        };

        if !authorized {
            return Err(AppError::AccessDenied("maintenance:read".into()));
        }
        Ok(request)
    }

    pub async fn update_maintenance_status(
        &self,
        caller: &User,
        request_id: Uuid,
        status: MaintenanceStatus,
        actual_cost: Option<Decimal>,
    ) -> Result<MaintenanceRequest, AppError> {
        let request = self
            .repo
            .find_maintenance_by_id(request_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Solicitud de mantenimiento".into()))?;

        let property = self.property_or_404(request.property_id).await?;
        let authorized = caller.role == UserRole::Admin
            || property.owner_id == caller.id
            || request.provider_id == Some(caller.id);
        if !authorized {
            return Err(AppError::AccessDenied("maintenance:write".into()));
        }

        let updated = self
            .repo
            .update_maintenance_status(request_id, status, actual_cost)
            .await?;

        self.notifications
            .notify(
                NotifyParams::new(
                    updated.requested_by,
                    NotificationKind::MaintenanceUpdate,
                    "Mantenimiento actualizado",
                    &format!("La solicitud '{}' pasó a {:?}.", updated.title, status),
                )
                .with_priority(NotificationPriority::Medium),
            )
            .await;

        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn la_ganancia_es_tarifa_por_minuto() {
        let earnings = compute_visit_earnings(40, Decimal::from(350_000));
        assert_eq!(earnings, Decimal::from(20_000));
    }

    #[test]
    fn propiedad_premium_suma_el_bono() {
        let earnings = compute_visit_earnings(40, Decimal::from(1_500_000));
        assert_eq!(earnings, Decimal::from(20_200));
    }

    #[test]
    fn el_umbral_premium_es_inclusivo() {
        let earnings = compute_visit_earnings(10, Decimal::from(1_000_000));
        assert_eq!(earnings, Decimal::from(5_200));
    }

    #[test]
    fn duracion_negativa_no_genera_ganancia_base() {
        let earnings = compute_visit_earnings(-5, Decimal::from(100_000));
        assert_eq!(earnings, Decimal::ZERO);
    }
}
