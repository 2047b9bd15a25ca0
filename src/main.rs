// src/main.rs

use tokio::net::TcpListener;

use rent360_backend::{build_router, config::AppState};

#[tokio::main]
async fn main() {
    // Logger estructurado con filtro por variable de entorno
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_target(false)
        .compact()
        .init();

    // Si la configuración falla, la aplicación no debe partir
    let app_state = AppState::new()
        .await
        .expect("Falla al inicializar el estado de la aplicación.");

    // Corre las migraciones de SQLx al partir
    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .expect("Falla al correr las migraciones de la base de datos.");

    tracing::info!("✅ Migraciones de la base de datos ejecutadas");

    let app = build_router(app_state);

    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let listener = TcpListener::bind(&addr)
        .await
        .expect("Falla al iniciar el listener TCP");
    tracing::info!("🚀 Servidor escuchando en {}", listener.local_addr().unwrap());
    axum::serve(listener, app).await.expect("Error en el servidor Axum");
}
