// src/services/prospect_service.rs
//
// Gestión de prospectos y sus transiciones de estado. La validación del
// estado es pertenencia al enum; cualquier estado es alcanzable desde
// cualquier otro (comportamiento heredado, ver DESIGN.md). Los efectos
// laterales de una transición se concentran en `build_status_changes`.

use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{prospect_repo::ProspectChanges, BrokerRepository, ProspectRepository},
    models::{
        auth::{User, UserRole},
        notification::{NotificationKind, NotificationPriority},
        prospect::{BrokerProspect, ProspectPriority, ProspectStatus, ProspectType},
    },
    services::notification_service::{NotificationService, NotifyParams},
};

#[derive(Debug, Clone)]
pub struct StatusChangeRequest {
    pub status: ProspectStatus,
    pub notes: Option<String>,
    pub lost_reason: Option<String>,
}

// Traduce una solicitud de cambio de estado a los cambios concretos de fila.
// CONVERTED estampa converted_at; LOST persiste la razón; un cambio real de
// estado refresca last_contact_date y suma al contador de contactos. Las
// notas nuevas se anexan con un prefijo de fecha, preservando las anteriores.
pub fn build_status_changes(
    prospect: &BrokerProspect,
    request: &StatusChangeRequest,
    now: DateTime<Utc>,
) -> ProspectChanges {
    let status_changed = prospect.status != request.status;

    let mut changes = ProspectChanges {
        status: Some(request.status),
        ..Default::default()
    };

    if status_changed {
        changes.last_contact_date = Some(now);
        changes.bump_contact_count = true;
    }

    if let Some(new_note) = request.notes.as_deref() {
        let stamped = format!("[{}] {}", now.format("%Y-%m-%d %H:%M"), new_note);
        changes.notes = Some(match prospect.notes.as_deref() {
            Some(existing) if !existing.is_empty() => format!("{existing}\n{stamped}"),
            _ => stamped,
        });
    }

    match request.status {
        ProspectStatus::Converted => {
            changes.converted_at = Some(now);
        }
        ProspectStatus::Lost => {
            changes.lost_reason = request.lost_reason.clone();
        }
        _ => {}
    }

    changes
}

#[derive(Clone)]
pub struct ProspectService {
    repo: ProspectRepository,
    broker_repo: BrokerRepository,
    notifications: NotificationService,
}

impl ProspectService {
    pub fn new(
        repo: ProspectRepository,
        broker_repo: BrokerRepository,
        notifications: NotificationService,
    ) -> Self {
        Self { repo, broker_repo, notifications }
    }

    pub fn repo(&self) -> &ProspectRepository {
        &self.repo
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
        let prospect = self
            .repo
            .create(
                broker_id,
                name,
                email,
                phone,
                rut,
                prospect_type,
                source,
                budget,
                preferred_locations,
                notes,
            )
            .await?;

        tracing::info!(prospect_id = %prospect.id, broker_id = %broker_id, "Prospecto creado");
        Ok(prospect)
    }

    pub async fn list(
        &self,
        broker_id: Uuid,
        status: Option<ProspectStatus>,
    ) -> Result<Vec<BrokerProspect>, AppError> {
        self.repo.list_by_broker(broker_id, status).await
    }

    // Corredores solo ven sus prospectos; un propietario puede leer el
    // prospecto que apunta a su propio usuario
    pub async fn get_authorized(
        &self,
        caller: &User,
        prospect_id: Uuid,
    ) -> Result<BrokerProspect, AppError> {
        let prospect = self
            .repo
            .find_by_id(prospect_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Prospecto".into()))?;

        let authorized = match caller.role {
            UserRole::Admin => true,
            UserRole::Broker => prospect.broker_id == caller.id,
            UserRole::Owner => prospect.user_id == Some(caller.id),
            _ => false,
        };
        if !authorized {
            return Err(AppError::AccessDenied("broker:prospects:read".into()));
        }

        Ok(prospect)
    }

    async fn get_owned_by_broker(
        &self,
        broker_id: Uuid,
        prospect_id: Uuid,
    ) -> Result<BrokerProspect, AppError> {
        let prospect = self
            .repo
            .find_by_id(prospect_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Prospecto".into()))?;

        if prospect.broker_id != broker_id {
            return Err(AppError::AccessDenied("broker:prospects:write".into()));
        }
        Ok(prospect)
    }

    pub async fn change_status(
        &self,
        broker: &User,
        prospect_id: Uuid,
        request: StatusChangeRequest,
    ) -> Result<BrokerProspect, AppError> {
        let prospect = self.get_owned_by_broker(broker.id, prospect_id).await?;

        let status_changed = prospect.status != request.status;
        let mut changes = build_status_changes(&prospect, &request, Utc::now());

        // Al convertir, enlaza la relación BrokerClient activa si ya existe
        if request.status == ProspectStatus::Converted {
            if let Some(user_id) = prospect.user_id {
                changes.converted_client_id = self
                    .broker_repo
                    .find_active_client(broker.id, user_id)
                    .await?
                    .map(|c| c.id);
            }
        }

        let updated = self.repo.apply_changes(prospect_id, &changes).await?;

        if status_changed {
            // La transición queda registrada como actividad del prospecto
            self.repo
                .insert_activity(
                    prospect_id,
                    broker.id,
                    "note",
                    &format!("Estado cambiado a {:?}", request.status),
                    request.lost_reason.as_deref(),
                    Some("successful"),
                )
                .await?;

            if request.status == ProspectStatus::Converted {
                self.notifications
                    .notify(
                        NotifyParams::new(
                            broker.id,
                            NotificationKind::ProspectConverted,
                            "Prospecto convertido",
                            &format!("{} pasó a ser cliente.", updated.name),
                        )
                        .with_priority(NotificationPriority::High),
                    )
                    .await;
            }
        }

        tracing::info!(
            prospect_id = %prospect_id,
            broker_id = %broker.id,
            status = ?request.status,
            "Prospecto actualizado"
        );
        Ok(updated)
    }

    pub async fn update_follow_up(
        &self,
        broker: &User,
        prospect_id: Uuid,
        priority: Option<ProspectPriority>,
        notes: Option<&str>,
        next_follow_up_date: Option<DateTime<Utc>>,
    ) -> Result<BrokerProspect, AppError> {
        let prospect = self.get_owned_by_broker(broker.id, prospect_id).await?;

        let notes = notes.map(|n| {
            let stamped = format!("[{}] {}", Utc::now().format("%Y-%m-%d %H:%M"), n);
            match prospect.notes.as_deref() {
                Some(existing) if !existing.is_empty() => format!("{existing}\n{stamped}"),
                _ => stamped,
            }
        });

        let changes = ProspectChanges {
            priority,
            notes,
            next_follow_up_date,
            ..Default::default()
        };
        self.repo.apply_changes(prospect_id, &changes).await
    }

    // Los prospectos convertidos no se pueden eliminar
    pub async fn delete(&self, broker: &User, prospect_id: Uuid) -> Result<(), AppError> {
        let prospect = self.get_owned_by_broker(broker.id, prospect_id).await?;

        if prospect.status == ProspectStatus::Converted {
            return Err(AppError::BusinessRule(
                "No se puede eliminar un prospecto convertido a cliente.".into(),
            ));
        }

        self.repo.delete(prospect_id).await?;
        tracing::info!(prospect_id = %prospect_id, broker_id = %broker.id, "Prospecto eliminado");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn prospect(status: ProspectStatus, notes: Option<&str>) -> BrokerProspect {
        let now = Utc::now();
        BrokerProspect {
            id: Uuid::new_v4(),
            broker_id: Uuid::new_v4(),
            user_id: None,
            name: "Lead".into(),
            email: None,
            phone: None,
            rut: None,
            prospect_type: ProspectType::OwnerLead,
            status,
            priority: ProspectPriority::Medium,
            source: None,
            budget: None,
            preferred_locations: None,
            notes: notes.map(String::from),
            lead_score: 0,
            conversion_probability: 0,
            contact_count: 2,
            last_contact_date: None,
            next_follow_up_date: None,
            converted_at: None,
            lost_reason: None,
            converted_client_id: None,
            created_at: now - Duration::days(10),
            updated_at: now,
        }
    }

    #[test]
    fn convertir_estampa_converted_at() {
        let now = Utc::now();
        let p = prospect(ProspectStatus::Negotiating, None);
        let changes = build_status_changes(
            &p,
            &StatusChangeRequest {
                status: ProspectStatus::Converted,
                notes: None,
                lost_reason: None,
            },
            now,
        );

        assert_eq!(changes.status, Some(ProspectStatus::Converted));
        assert_eq!(changes.converted_at, Some(now));
        assert!(changes.bump_contact_count);
        assert_eq!(changes.last_contact_date, Some(now));
    }

    #[test]
    fn perder_persiste_la_razon() {
        let now = Utc::now();
        let p = prospect(ProspectStatus::ProposalSent, None);
        let changes = build_status_changes(
            &p,
            &StatusChangeRequest {
                status: ProspectStatus::Lost,
                notes: None,
                lost_reason: Some("Eligió otra corredora".into()),
            },
            now,
        );

        assert_eq!(changes.lost_reason.as_deref(), Some("Eligió otra corredora"));
        assert!(changes.converted_at.is_none());
    }

    #[test]
    fn las_notas_se_anexan_con_prefijo_de_fecha() {
        let now = Utc::now();
        let p = prospect(ProspectStatus::Contacted, Some("primera llamada"));
        let changes = build_status_changes(
            &p,
            &StatusChangeRequest {
                status: ProspectStatus::Qualified,
                notes: Some("pidió visitar el departamento".into()),
                lost_reason: None,
            },
            now,
        );

        let notes = changes.notes.expect("notas anexadas");
        assert!(notes.starts_with("primera llamada\n["));
        assert!(notes.contains("pidió visitar el departamento"));
        assert!(notes.contains(&now.format("%Y-%m-%d").to_string()));
    }

    #[test]
    fn mismo_estado_no_toca_el_contador_de_contactos() {
        let now = Utc::now();
        let p = prospect(ProspectStatus::Contacted, None);
        let changes = build_status_changes(
            &p,
            &StatusChangeRequest {
                status: ProspectStatus::Contacted,
                notes: None,
                lost_reason: None,
            },
            now,
        );

        assert!(!changes.bump_contact_count);
        assert!(changes.last_contact_date.is_none());
    }
}
