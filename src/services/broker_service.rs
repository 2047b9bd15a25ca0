// src/services/broker_service.rs
//
// Materializa y mantiene el grafo BrokerClient / BrokerPropertyManagement:
// invitaciones, activación idempotente de la relación, enganche de
// propiedades a la gestión y configuración del alcance elegido por el dueño.

use rust_decimal::Decimal;
use serde_json::Value;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{BrokerRepository, OperationsRepository, PropertyRepository, UserRepository},
    models::{
        auth::{User, UserRole},
        broker::{
            BrokerClient, BrokerClientDetail, BrokerClientListResponse, BrokerInvitation,
            ClientStatus, ClientType, InvitationStatus, InvitationType, ManagementType,
            PropertyManagementType,
        },
        notification::{NotificationKind, NotificationPriority},
    },
    services::notification_service::{NotificationService, NotifyParams},
};

// Diferencia entre el alcance vigente y el solicitado
#[derive(Debug, Default, PartialEq)]
pub struct ScopeChanges {
    pub to_attach: Vec<Uuid>,
    pub to_terminate: Vec<Uuid>,
}

// El diff es puro: enganchar lo pedido que falta, terminar lo vigente que
// sobra. Pedir dos veces la misma propiedad no la engancha dos veces.
pub fn diff_management_scope(current: &[Uuid], requested: &[Uuid]) -> ScopeChanges {
    let mut to_attach: Vec<Uuid> = Vec::new();
    for id in requested {
        if !current.contains(id) && !to_attach.contains(id) {
            to_attach.push(*id);
        }
    }

    let to_terminate = current
        .iter()
        .filter(|id| !requested.contains(id))
        .copied()
        .collect();

    ScopeChanges { to_attach, to_terminate }
}

// Todo id solicitado debe pertenecer al dueño que configura
pub fn validate_scope_ownership(owned: &[Uuid], requested: &[Uuid]) -> Result<(), AppError> {
    let foreign: Vec<Uuid> = requested
        .iter()
        .filter(|id| !owned.contains(id))
        .copied()
        .collect();

    if foreign.is_empty() {
        Ok(())
    } else {
        Err(AppError::BusinessRule(format!(
            "Las siguientes propiedades no pertenecen al solicitante: {}",
            foreign
                .iter()
                .map(|id| id.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        )))
    }
}

fn client_type_for_role(role: UserRole) -> ClientType {
    match role {
        UserRole::Owner => ClientType::Owner,
        UserRole::Tenant => ClientType::Tenant,
        _ => ClientType::Both,
    }
}

#[derive(Clone)]
pub struct BrokerService {
    broker_repo: BrokerRepository,
    property_repo: PropertyRepository,
    operations_repo: OperationsRepository,
    user_repo: UserRepository,
    notifications: NotificationService,
}

impl BrokerService {
    pub fn new(
        broker_repo: BrokerRepository,
        property_repo: PropertyRepository,
        operations_repo: OperationsRepository,
        user_repo: UserRepository,
        notifications: NotificationService,
    ) -> Self {
        Self {
            broker_repo,
            property_repo,
            operations_repo,
            user_repo,
            notifications,
        }
    }

    pub fn repo(&self) -> &BrokerRepository {
        &self.broker_repo
    }

    // =========================================================================
    //  INVITACIONES
    // =========================================================================

    pub async fn invite_client(
        &self,
        broker: &User,
        user_id: Uuid,
        invitation_type: InvitationType,
        services_offered: Option<&Value>,
        message: Option<&str>,
        commission_rate: Decimal,
    ) -> Result<BrokerInvitation, AppError> {
        if user_id == broker.id {
            return Err(AppError::BusinessRule(
                "Un corredor no puede invitarse a sí mismo.".into(),
            ));
        }

        let target = self
            .user_repo
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Usuario".into()))?;

        if self
            .broker_repo
            .find_pending_invitation(broker.id, user_id)
            .await?
            .is_some()
        {
            return Err(AppError::DuplicateResource(
                "Ya existe una invitación pendiente para este usuario.".into(),
            ));
        }

        let invitation = self
            .broker_repo
            .create_invitation(
                broker.id,
                user_id,
                invitation_type,
                services_offered,
                message,
                commission_rate,
            )
            .await?;

        self.notifications
            .notify(
                NotifyParams::new(
                    target.id,
                    NotificationKind::InvitationReceived,
                    "Invitación de corretaje",
                    &format!("{} te invitó a trabajar con su corretaje.", broker.name),
                )
                .with_link(format!("/owner/invitations/{}", invitation.id)),
            )
            .await;

        tracing::info!(
            invitation_id = %invitation.id,
            broker_id = %broker.id,
            user_id = %user_id,
            "Invitación creada"
        );
        Ok(invitation)
    }

    pub async fn list_invitations(&self, broker_id: Uuid) -> Result<Vec<BrokerInvitation>, AppError> {
        self.broker_repo.list_invitations_by_broker(broker_id).await
    }

    pub async fn pending_invitations_for(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<BrokerInvitation>, AppError> {
        self.broker_repo.list_pending_invitations_for_user(user_id).await
    }

    // La aceptación de una invitación es lo que crea (o reactiva) la relación
    // BrokerClient. Idempotente: si ya existe una relación ACTIVE para el par
    // (corredor, usuario) se reutiliza esa fila.
    pub async fn respond_invitation(
        &self,
        caller: &User,
        invitation_id: Uuid,
        accept: bool,
    ) -> Result<(BrokerInvitation, Option<BrokerClient>), AppError> {
        let invitation = self
            .broker_repo
            .find_invitation_by_id(invitation_id)
            .await?
            .filter(|i| i.user_id == caller.id)
            .ok_or_else(|| AppError::ResourceNotFound("Invitación".into()))?;

        if invitation.status != InvitationStatus::Pending {
            return Err(AppError::BusinessRule(
                "La invitación ya fue respondida.".into(),
            ));
        }

        let new_status = if accept {
            InvitationStatus::Accepted
        } else {
            InvitationStatus::Rejected
        };
        let invitation = self
            .broker_repo
            .update_invitation_status(invitation_id, new_status)
            .await?;

        let client = if accept {
            let existing = self
                .broker_repo
                .find_active_client(invitation.broker_id, caller.id)
                .await?;

            let client = match existing {
                Some(client) => client,
                None => {
                    self.broker_repo
                        .create_client(
                            invitation.broker_id,
                            caller.id,
                            client_type_for_role(caller.role),
                            invitation.commission_rate,
                            invitation.services_offered.as_ref(),
                        )
                        .await?
                }
            };

            tracing::info!(
                client_id = %client.id,
                broker_id = %invitation.broker_id,
                user_id = %caller.id,
                "Relación corredor-cliente activa"
            );
            Some(client)
        } else {
            None
        };

        let (kind, title, message) = if accept {
            (
                NotificationKind::InvitationAccepted,
                "Invitación aceptada",
                format!("{} aceptó tu invitación.", caller.name),
            )
        } else {
            (
                NotificationKind::InvitationRejected,
                "Invitación rechazada",
                format!("{} rechazó tu invitación.", caller.name),
            )
        };
        self.notifications
            .notify(NotifyParams::new(invitation.broker_id, kind, title, &message))
            .await;

        Ok((invitation, client))
    }

    // =========================================================================
    //  ENGANCHE DE PROPIEDADES Y ALCANCE
    // =========================================================================

    // Engancha cada propiedad que aún no tenga fila de gestión para el triple
    // (corredor, cliente, propiedad). El loop no va dentro de una transacción:
    // cada propiedad queda confirmada por sí sola y el contador derivado se
    // recalcula al final, así que una interrupción a mitad de camino deja el
    // contador desfasado hasta el próximo recálculo.
    pub async fn attach_properties(
        &self,
        client: &BrokerClient,
        property_ids: &[Uuid],
    ) -> Result<usize, AppError> {
        let mut attached = 0;

        for property_id in property_ids {
            let exists = self
                .broker_repo
                .management_exists(client.broker_id, client.id, *property_id)
                .await?;
            if exists {
                continue;
            }

            self.broker_repo
                .insert_management(
                    client.broker_id,
                    client.id,
                    *property_id,
                    ManagementType::Full,
                    client.services_offered.as_ref(),
                    client.commission_rate,
                    client.exclusivity,
                )
                .await?;
            self.property_repo
                .assign_broker(*property_id, client.broker_id)
                .await?;
            attached += 1;
        }

        self.refresh_client_metrics(client).await?;

        tracing::info!(
            client_id = %client.id,
            attached,
            "Propiedades enganchadas a la gestión"
        );
        Ok(attached)
    }

    // Configuración del alcance por parte del dueño. Valida pertenencia antes
    // de escribir: si algún id no es del dueño, la relación queda intacta.
    // Última escritura gana; no hay token de concurrencia optimista.
    pub async fn configure_management_scope(
        &self,
        owner: &User,
        client_id: Uuid,
        management_type: PropertyManagementType,
        managed_property_ids: Option<Vec<Uuid>>,
    ) -> Result<BrokerClient, AppError> {
        let client = self
            .broker_repo
            .find_client_by_id(client_id)
            .await?
            .filter(|c| c.user_id == owner.id)
            .ok_or_else(|| AppError::ResourceNotFound("Cliente".into()))?;

        let owned = self.property_repo.ids_owned_by(owner.id).await?;

        let requested: Vec<Uuid> = match management_type {
            PropertyManagementType::Full => owned.clone(),
            PropertyManagementType::None => Vec::new(),
            PropertyManagementType::Partial => managed_property_ids.unwrap_or_default(),
        };

        validate_scope_ownership(&owned, &requested)?;

        self.broker_repo
            .update_management_type(client_id, management_type)
            .await?;

        let current = self.broker_repo.active_property_ids_by_client(client_id).await?;
        let changes = diff_management_scope(&current, &requested);

        for property_id in &changes.to_terminate {
            self.broker_repo
                .terminate_management(client_id, *property_id)
                .await?;
            self.property_repo.release_broker(*property_id).await?;
        }

        self.attach_properties(&client, &changes.to_attach).await?;

        self.notifications
            .notify(
                NotifyParams::new(
                    client.broker_id,
                    NotificationKind::CommissionCalculated,
                    "Alcance de gestión actualizado",
                    &format!(
                        "{} configuró la gestión como {:?} ({} propiedades).",
                        owner.name,
                        management_type,
                        requested.len()
                    ),
                )
                .with_priority(NotificationPriority::Medium),
            )
            .await;

        // Relee la fila para devolver los contadores ya recalculados
        self.broker_repo
            .find_client_by_id(client_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Cliente".into()))
    }

    // Recalcula los contadores derivados desde las filas subyacentes
    pub async fn refresh_client_metrics(&self, client: &BrokerClient) -> Result<(), AppError> {
        let total_managed = self.broker_repo.count_active_management(client.id).await?;
        let total_contracts = self
            .operations_repo
            .count_contracts_for_client(client.broker_id, client.user_id)
            .await?;
        let total_commissions = self
            .operations_repo
            .sum_paid_commissions_for_client(client.broker_id, client.user_id)
            .await?;

        self.broker_repo
            .update_client_metrics(client.id, total_managed, total_contracts, total_commissions)
            .await
    }

    // =========================================================================
    //  LISTADOS DEL CORREDOR
    // =========================================================================

    pub async fn list_clients(
        &self,
        broker_id: Uuid,
        search: Option<&str>,
        status: Option<ClientStatus>,
        client_type: Option<ClientType>,
    ) -> Result<BrokerClientListResponse, AppError> {
        let clients = self
            .broker_repo
            .list_clients(broker_id, search, status, client_type)
            .await?;

        let total_managed_properties = clients
            .iter()
            .map(|c| c.total_properties_managed as i64)
            .sum();
        let total_commissions = clients.iter().map(|c| c.total_commissions).sum();

        Ok(BrokerClientListResponse {
            total: clients.len(),
            total_managed_properties,
            total_commissions,
            clients,
        })
    }

    pub async fn client_detail(
        &self,
        broker: &User,
        client_id: Uuid,
    ) -> Result<BrokerClientDetail, AppError> {
        let client = self
            .broker_repo
            .find_client_by_id(client_id)
            .await?
            .filter(|c| c.broker_id == broker.id)
            .ok_or_else(|| AppError::ResourceNotFound("Cliente".into()))?;

        let managed_ids = self.broker_repo.active_property_ids_by_client(client.id).await?;
        let managed_properties = if managed_ids.is_empty() {
            Vec::new()
        } else {
            self.property_repo.list_by_ids(&managed_ids).await?
        };

        let active_contracts = self
            .operations_repo
            .count_active_contracts_for_client(client.broker_id, client.user_id)
            .await?;
        let active_rent = self
            .operations_repo
            .sum_active_rent_for_client(client.broker_id, client.user_id)
            .await?;
        let estimated_monthly_income =
            active_rent * client.commission_rate / Decimal::ONE_HUNDRED;

        Ok(BrokerClientDetail {
            client,
            managed_properties,
            active_contracts,
            estimated_monthly_income,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(n: usize) -> Vec<Uuid> {
        (0..n).map(|_| Uuid::new_v4()).collect()
    }

    #[test]
    fn diff_engancha_solo_lo_que_falta() {
        let current = ids(2);
        let mut requested = current.clone();
        let nueva = Uuid::new_v4();
        requested.push(nueva);

        let changes = diff_management_scope(&current, &requested);
        assert_eq!(changes.to_attach, vec![nueva]);
        assert!(changes.to_terminate.is_empty());
    }

    #[test]
    fn diff_termina_lo_que_sale_del_alcance() {
        let current = ids(3);
        let requested = vec![current[0]];

        let changes = diff_management_scope(&current, &requested);
        assert!(changes.to_attach.is_empty());
        assert_eq!(changes.to_terminate, vec![current[1], current[2]]);
    }

    #[test]
    fn diff_es_idempotente_frente_a_duplicados() {
        let current: Vec<Uuid> = Vec::new();
        let repetida = Uuid::new_v4();
        let requested = vec![repetida, repetida];

        let changes = diff_management_scope(&current, &requested);
        assert_eq!(changes.to_attach, vec![repetida]);
    }

    #[test]
    fn mismo_alcance_no_produce_cambios() {
        let current = ids(2);
        let changes = diff_management_scope(&current, &current.clone());
        assert_eq!(changes, ScopeChanges::default());
    }

    #[test]
    fn alcance_con_propiedad_ajena_se_rechaza() {
        let owned = ids(2);
        let mut requested = vec![owned[0]];
        requested.push(Uuid::new_v4());

        let result = validate_scope_ownership(&owned, &requested);
        assert!(matches!(result, Err(AppError::BusinessRule(_))));
    }

    #[test]
    fn alcance_propio_pasa_la_validacion() {
        let owned = ids(3);
        assert!(validate_scope_ownership(&owned, &owned[..2].to_vec()).is_ok());
    }

    #[test]
    fn rol_del_usuario_determina_el_tipo_de_cliente() {
        assert_eq!(client_type_for_role(UserRole::Owner), ClientType::Owner);
        assert_eq!(client_type_for_role(UserRole::Tenant), ClientType::Tenant);
        assert_eq!(client_type_for_role(UserRole::Broker), ClientType::Both);
    }
}
