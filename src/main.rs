//! # Plano Reservas Server
//!
//! Servidor web de gestión de planos de mesas y reservas de restaurantes,
//! construido con Rust, Actix Web y MongoDB.
//!
//! ## Características principales
//!
//! - **Plano de mesas**: cuadrícula por restaurante con regiones
//!   rectangulares validadas (sin solapes, dentro de los límites)
//! - **Sistema de reservas**: franjas fijas de media hora (05:00–23:30)
//!   con resolución de conflictos por solape de intervalos
//! - **Disponibilidad**: consulta de mesas libres por fecha y franja
//! - **API REST**: API completa con autenticación por tokens
//!
//! ## Configuración
//!
//! El servidor se configura mediante variables de entorno (archivo `.env`):
//!
//! ```env
//! # Base de datos MongoDB
//! MONGODB_URI=mongodb://localhost:27017
//! MONGODB_DATABASE=plano_reservas
//!
//! # Servidor
//! BIND_ADDRESS=0.0.0.0:8080
//!
//! # Logging
//! RUST_LOG=debug,mongodb=info
//! ```
//!
//! ## Ejecución
//!
//! ```bash
//! # 1. Instalar y ejecutar MongoDB
//! # Local: mongod
//! # Docker: docker run -d --name mongo -p 27017:27017 mongo:latest
//!
//! # 2. Configurar variables de entorno
//! cp .env.example .env
//!
//! # 3. Compilar y ejecutar
//! cargo run
//! ```

use actix_files::Files;
use actix_web::{middleware::Logger, web, App, HttpServer};
use std::env;

use plano_reservas::{api, db};

/// Función principal que inicia el servidor web
///
/// 1. Carga variables de entorno desde `.env`
/// 2. Configura el sistema de logging con tracing
/// 3. Establece conexión con MongoDB y crea los índices
/// 4. Configura el servidor HTTP con las rutas de la API y el frontend
///    estático del editor de plano
///
/// # Errores
///
/// Retorna `std::io::Error` si no se puede conectar a MongoDB o bindear
/// al puerto especificado.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();

    // Configurar sistema de logging con tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("plano_reservas=debug".parse().unwrap())
                .add_directive("mongodb=info".parse().unwrap()),
        )
        .init();

    tracing::info!("Iniciando Plano Reservas Server con MongoDB...");

    // Inicializar conexión a MongoDB
    let mongo_repo = match db::MongoRepo::init().await {
        Ok(repo) => {
            tracing::info!("Conexión a MongoDB establecida exitosamente");

            // Intentar crear índices para optimizar consultas
            if let Err(e) = repo.create_indexes().await {
                tracing::warn!("Advertencia creando índices: {}", e);
                // No es un error fatal, continuamos sin índices
            }

            repo
        }
        Err(e) => {
            tracing::error!("Error conectando a MongoDB: {}", e);
            return Err(std::io::Error::other(format!("Error de MongoDB: {}", e)));
        }
    };

    // Obtener dirección de bind desde variables de entorno
    let bind_address = env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

    tracing::info!("Servidor iniciando en {}", bind_address);

    // Crear y configurar el servidor HTTP
    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(mongo_repo.clone()))
            .wrap(Logger::default())
            .configure(api::init_routes)
            .service(Files::new("/static", "./static").show_files_listing())
            .route(
                "/",
                web::get().to(|| async {
                    actix_web::HttpResponse::PermanentRedirect()
                        .append_header(("Location", "/static/index.html"))
                        .finish()
                }),
            )
    })
    .bind(&bind_address)?
    .run()
    .await
}
