// src/docs.rs

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::OpenApi;

use crate::handlers;
use crate::models;
use crate::services;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::get_me,

        // --- Properties ---
        handlers::properties::create_property,
        handlers::properties::list_my_properties,
        handlers::properties::get_property,

        // --- Broker ---
        handlers::broker_clients::list_clients,
        handlers::broker_clients::get_client,

        // --- Prospects ---
        handlers::prospects::list_prospects,
        handlers::prospects::create_prospect,
        handlers::prospects::get_prospect,
        handlers::prospects::update_prospect,
        handlers::prospects::delete_prospect,
        handlers::prospects::get_prospect_status,
        handlers::prospects::change_prospect_status,
        handlers::prospects::get_prospect_score,
        handlers::prospects::recalculate_prospect_score,
        handlers::prospects::recalculate_all_scores,

        // --- Invitations ---
        handlers::invitations::create_invitation,
        handlers::invitations::list_broker_invitations,
        handlers::invitations::list_pending_invitations,
        handlers::invitations::respond_invitation,

        // --- Owner ---
        handlers::owner::manage_properties,

        // --- Payouts ---
        handlers::payouts::list_runner_payouts,
        handlers::payouts::process_runner_payouts,
        handlers::payouts::list_provider_payouts,
        handlers::payouts::process_provider_payouts,

        // --- Operations ---
        handlers::operations::create_contract,
        handlers::operations::list_contracts,
        handlers::operations::schedule_visit,
        handlers::operations::complete_visit,
        handlers::operations::list_visits,
        handlers::operations::create_job,
        handlers::operations::complete_job,
        handlers::operations::list_jobs,
        handlers::operations::create_maintenance,
        handlers::operations::get_maintenance,
        handlers::operations::update_maintenance_status,

        // --- Notifications ---
        handlers::notifications::list_notifications,
        handlers::notifications::mark_read,
        handlers::notifications::mark_all_read,

        // --- Realtime ---
        handlers::realtime::realtime,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::UserRole,
            models::auth::User,
            models::auth::RegisterUserPayload,
            models::auth::LoginUserPayload,
            models::auth::AuthResponse,

            // --- Properties ---
            models::property::PropertyStatus,
            models::property::PropertyType,
            models::property::Property,
            models::property::PropertyImage,
            models::property::PropertyDetail,
            handlers::properties::CreatePropertyPayload,

            // --- Broker ---
            models::broker::ClientStatus,
            models::broker::ClientType,
            models::broker::PropertyManagementType,
            models::broker::ManagementType,
            models::broker::ManagementStatus,
            models::broker::InvitationStatus,
            models::broker::InvitationType,
            models::broker::BrokerClient,
            models::broker::BrokerPropertyManagement,
            models::broker::BrokerInvitation,
            models::broker::BrokerClientSummary,
            models::broker::BrokerClientListResponse,
            models::broker::BrokerClientDetail,
            handlers::invitations::CreateInvitationPayload,
            handlers::invitations::RespondInvitationPayload,
            handlers::owner::ManagePropertiesPayload,

            // --- Prospects ---
            models::prospect::ProspectStatus,
            models::prospect::ProspectType,
            models::prospect::ProspectPriority,
            models::prospect::BrokerProspect,
            models::prospect::ProspectActivity,
            models::prospect::ProspectSharedProperty,
            handlers::prospects::CreateProspectPayload,
            handlers::prospects::UpdateProspectPayload,
            handlers::prospects::ChangeStatusPayload,
            services::lead_scoring::LeadScoreFactors,
            services::lead_scoring::LeadScoreResult,

            // --- Operations ---
            models::operations::ContractStatus,
            models::operations::Contract,
            models::operations::PaymentKind,
            models::operations::PaymentStatus,
            models::operations::Payment,
            models::operations::VisitStatus,
            models::operations::Visit,
            models::operations::JobStatus,
            models::operations::ServiceJob,
            models::operations::MaintenanceStatus,
            models::operations::MaintenanceRequest,
            handlers::operations::CreateContractPayload,
            handlers::operations::ScheduleVisitPayload,
            handlers::operations::CompleteVisitPayload,
            handlers::operations::CreateJobPayload,
            handlers::operations::CompleteJobPayload,
            handlers::operations::CreateMaintenancePayload,
            handlers::operations::UpdateMaintenancePayload,

            // --- Payouts ---
            models::payout::PayoutPeriod,
            models::payout::PayoutItem,
            models::payout::PayoutCalculation,
            models::payout::PayoutReport,
            handlers::payouts::PayoutPeriodPayload,

            // --- Notifications ---
            models::notification::NotificationKind,
            models::notification::NotificationPriority,
            models::notification::Notification,
        )
    ),
    tags(
        (name = "Auth", description = "Autenticación y registro"),
        (name = "Users", description = "Datos del usuario autenticado"),
        (name = "Properties", description = "Propiedades y sus imágenes"),
        (name = "Broker", description = "Clientes del corredor y sus métricas"),
        (name = "Prospects", description = "Prospección y lead scoring"),
        (name = "Invitations", description = "Invitaciones de corretaje"),
        (name = "Owner", description = "Configuración del alcance de gestión"),
        (name = "Payouts", description = "Cálculo de pagos a runners y proveedores"),
        (name = "Operations", description = "Contratos, visitas, trabajos y mantenimiento"),
        (name = "Notifications", description = "Notificaciones por usuario"),
        (name = "Realtime", description = "Stream SSE de eventos")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}
