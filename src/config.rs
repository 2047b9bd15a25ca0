// src/config.rs

use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{env, time::Duration};

use crate::{
    db::{
        BrokerRepository, NotificationRepository, OperationsRepository, PayoutRepository,
        PropertyRepository, ProspectRepository, UserRepository,
    },
    realtime::RealtimeHub,
    services::{
        auth::AuthService, broker_service::BrokerService, lead_scoring::LeadScoringService,
        notification_service::NotificationService, operations_service::OperationsService,
        payout_service::PayoutService, prospect_service::ProspectService,
    },
};

// El estado compartido, accesible en toda la aplicación
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub jwt_secret: String,
    pub auth_service: AuthService,
    pub broker_service: BrokerService,
    pub prospect_service: ProspectService,
    pub lead_scoring: LeadScoringService,
    pub payout_service: PayoutService,
    pub operations_service: OperationsService,
    pub notification_service: NotificationService,
    pub property_repo: PropertyRepository,
    pub realtime: RealtimeHub,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL debe estar definida");
        let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET debe estar definido");

        // Conecta a la base de datos, propagando el error con '?'
        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await?;

        tracing::info!("✅ Conexión con la base de datos establecida");

        Ok(Self::from_pool(db_pool, jwt_secret))
    }

    // Arma el grafo de dependencias a partir de un pool ya creado.
    // Los tests usan este constructor con un pool perezoso.
    pub fn from_pool(db_pool: PgPool, jwt_secret: String) -> Self {
        let user_repo = UserRepository::new(db_pool.clone());
        let property_repo = PropertyRepository::new(db_pool.clone());
        let broker_repo = BrokerRepository::new(db_pool.clone());
        let prospect_repo = ProspectRepository::new(db_pool.clone());
        let operations_repo = OperationsRepository::new(db_pool.clone());
        let payout_repo = PayoutRepository::new(db_pool.clone());
        let notification_repo = NotificationRepository::new(db_pool.clone());

        let realtime = RealtimeHub::new();
        let notification_service =
            NotificationService::new(notification_repo, realtime.clone());

        let auth_service = AuthService::new(user_repo.clone(), jwt_secret.clone());
        let broker_service = BrokerService::new(
            broker_repo.clone(),
            property_repo.clone(),
            operations_repo.clone(),
            user_repo,
            notification_service.clone(),
        );
        let prospect_service = ProspectService::new(
            prospect_repo.clone(),
            broker_repo.clone(),
            notification_service.clone(),
        );
        let lead_scoring = LeadScoringService::new(prospect_repo);
        let payout_service = PayoutService::new(payout_repo, notification_service.clone());
        let operations_service = OperationsService::new(
            operations_repo,
            property_repo.clone(),
            broker_service.clone(),
            notification_service.clone(),
        );

        Self {
            db_pool,
            jwt_secret,
            auth_service,
            broker_service,
            prospect_service,
            lead_scoring,
            payout_service,
            operations_service,
            notification_service,
            property_repo,
            realtime,
        }
    }
}
