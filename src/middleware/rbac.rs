// src/middleware/rbac.rs
//
// Tabla declarativa rol -> operaciones permitidas. Reemplaza a las
// comparaciones de rol repetidas por handler: la capacidad se declara una
// vez como extractor y la tabla es la única fuente de verdad.

use axum::{extract::FromRequestParts, http::request::Parts};
use std::marker::PhantomData;

use crate::{common::error::AppError, models::auth::{User, UserRole}};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    BrokerClientsRead,
    BrokerProspectsRead,
    BrokerProspectsWrite,
    BrokerInvitationsWrite,
    OwnerManagementWrite,
    InvitationsRespond,
    PropertiesWrite,
    ContractsRead,
    ContractsWrite,
    RunnerVisitsWrite,
    ProviderJobsWrite,
    MaintenanceWrite,
    AdminPayoutsRead,
    AdminPayoutsProcess,
}

impl Capability {
    pub fn slug(&self) -> &'static str {
        match self {
            Capability::BrokerClientsRead => "broker:clients:read",
            Capability::BrokerProspectsRead => "broker:prospects:read",
            Capability::BrokerProspectsWrite => "broker:prospects:write",
            Capability::BrokerInvitationsWrite => "broker:invitations:write",
            Capability::OwnerManagementWrite => "owner:management:write",
            Capability::InvitationsRespond => "invitations:respond",
            Capability::PropertiesWrite => "properties:write",
            Capability::ContractsRead => "contracts:read",
            Capability::ContractsWrite => "contracts:write",
            Capability::RunnerVisitsWrite => "runner:visits:write",
            Capability::ProviderJobsWrite => "provider:jobs:write",
            Capability::MaintenanceWrite => "maintenance:write",
            Capability::AdminPayoutsRead => "admin:payouts:read",
            Capability::AdminPayoutsProcess => "admin:payouts:process",
        }
    }
}

// La tabla completa. ADMIN no aparece: tiene todas las capacidades.
pub fn role_capabilities(role: UserRole) -> &'static [Capability] {
    use Capability::*;
    match role {
        UserRole::Owner => &[
            OwnerManagementWrite,
            InvitationsRespond,
            PropertiesWrite,
            ContractsRead,
            ContractsWrite,
            MaintenanceWrite,
        ],
        UserRole::Tenant => &[InvitationsRespond, ContractsRead, MaintenanceWrite],
        UserRole::Broker => &[
            BrokerClientsRead,
            BrokerProspectsRead,
            BrokerProspectsWrite,
            BrokerInvitationsWrite,
            ContractsRead,
        ],
        UserRole::Runner => &[RunnerVisitsWrite],
        UserRole::Provider | UserRole::Maintenance => &[ProviderJobsWrite, MaintenanceWrite],
        UserRole::Support => &[BrokerClientsRead, ContractsRead],
        UserRole::Admin => &[],
    }
}

pub fn role_allows(role: UserRole, capability: Capability) -> bool {
    role == UserRole::Admin || role_capabilities(role).contains(&capability)
}

// El trait que define qué es una capacidad requerida
pub trait CapabilityDef: Send + Sync + 'static {
    fn capability() -> Capability;
}

// El extractor guardián: consulta solo la tabla, sin tocar la base
pub struct RequireCapability<T>(pub PhantomData<T>);

impl<T, S> FromRequestParts<S> for RequireCapability<T>
where
    T: CapabilityDef,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts
            .extensions
            .get::<User>()
            .ok_or(AppError::InvalidToken)?;

        let required = T::capability();
        if !role_allows(user.role, required) {
            return Err(AppError::AccessDenied(required.slug().to_string()));
        }

        Ok(RequireCapability(PhantomData))
    }
}

// ---
// DEFINICIÓN DE LAS CAPACIDADES (TIPOS)
// ---

macro_rules! capability_type {
    ($name:ident, $cap:expr) => {
        pub struct $name;
        impl CapabilityDef for $name {
            fn capability() -> Capability {
                $cap
            }
        }
    };
}

capability_type!(CapBrokerClientsRead, Capability::BrokerClientsRead);
capability_type!(CapBrokerProspectsRead, Capability::BrokerProspectsRead);
capability_type!(CapBrokerProspectsWrite, Capability::BrokerProspectsWrite);
capability_type!(CapBrokerInvitationsWrite, Capability::BrokerInvitationsWrite);
capability_type!(CapOwnerManagementWrite, Capability::OwnerManagementWrite);
capability_type!(CapInvitationsRespond, Capability::InvitationsRespond);
capability_type!(CapPropertiesWrite, Capability::PropertiesWrite);
capability_type!(CapContractsRead, Capability::ContractsRead);
capability_type!(CapContractsWrite, Capability::ContractsWrite);
capability_type!(CapRunnerVisitsWrite, Capability::RunnerVisitsWrite);
capability_type!(CapProviderJobsWrite, Capability::ProviderJobsWrite);
capability_type!(CapMaintenanceWrite, Capability::MaintenanceWrite);
capability_type!(CapAdminPayoutsRead, Capability::AdminPayoutsRead);
capability_type!(CapAdminPayoutsProcess, Capability::AdminPayoutsProcess);

#[cfg(test)]
mod tests {
    use super::*;

    const BROKER_CAPS: [Capability; 4] = [
        Capability::BrokerClientsRead,
        Capability::BrokerProspectsRead,
        Capability::BrokerProspectsWrite,
        Capability::BrokerInvitationsWrite,
    ];

    #[test]
    fn solo_broker_y_admin_acceden_a_endpoints_de_corredor() {
        for cap in [
            Capability::BrokerClientsRead,
            Capability::BrokerProspectsRead,
            Capability::BrokerProspectsWrite,
        ] {
            for role in [
                UserRole::Owner,
                UserRole::Tenant,
                UserRole::Provider,
                UserRole::Maintenance,
                UserRole::Runner,
            ] {
                assert!(!role_allows(role, cap), "{role:?} no debería tener {cap:?}");
            }
            assert!(role_allows(UserRole::Broker, cap));
            assert!(role_allows(UserRole::Admin, cap));
        }
    }

    #[test]
    fn los_payouts_son_solo_de_admin() {
        for role in [
            UserRole::Owner,
            UserRole::Tenant,
            UserRole::Broker,
            UserRole::Provider,
            UserRole::Maintenance,
            UserRole::Runner,
            UserRole::Support,
        ] {
            assert!(!role_allows(role, Capability::AdminPayoutsRead));
            assert!(!role_allows(role, Capability::AdminPayoutsProcess));
        }
        assert!(role_allows(UserRole::Admin, Capability::AdminPayoutsRead));
    }

    #[test]
    fn admin_tiene_todas_las_capacidades() {
        for cap in BROKER_CAPS {
            assert!(role_allows(UserRole::Admin, cap));
        }
        assert!(role_allows(UserRole::Admin, Capability::OwnerManagementWrite));
        assert!(role_allows(UserRole::Admin, Capability::RunnerVisitsWrite));
    }

    #[test]
    fn el_corredor_no_configura_el_alcance_del_dueno() {
        assert!(!role_allows(UserRole::Broker, Capability::OwnerManagementWrite));
        assert!(role_allows(UserRole::Owner, Capability::OwnerManagementWrite));
    }

    #[test]
    fn los_slugs_son_unicos() {
        let caps = [
            Capability::BrokerClientsRead,
            Capability::BrokerProspectsRead,
            Capability::BrokerProspectsWrite,
            Capability::BrokerInvitationsWrite,
            Capability::OwnerManagementWrite,
            Capability::InvitationsRespond,
            Capability::PropertiesWrite,
            Capability::ContractsRead,
            Capability::ContractsWrite,
            Capability::RunnerVisitsWrite,
            Capability::ProviderJobsWrite,
            Capability::MaintenanceWrite,
            Capability::AdminPayoutsRead,
            Capability::AdminPayoutsProcess,
        ];
        let mut slugs: Vec<&str> = caps.iter().map(|c| c.slug()).collect();
        slugs.sort();
        slugs.dedup();
        assert_eq!(slugs.len(), caps.len());
    }
}
