//! # Módulo API
//!
//! Este módulo contiene todas las rutas y controladores de la API REST.
//!
//! ## Módulos principales
//!
//! - [`restaurant`] - Gestión de restaurantes (registro, login, estado)
//! - [`table`] - Gestión de mesas sobre el plano (crear, editar, eliminar)
//! - [`reservation`] - Gestión de reservas (crear, editar, completar, cancelar)
//! - [`visual`] - Vistas del plano: foto física y disponibilidad calculada
//! - [`errors`] - Manejo de errores de la aplicación

pub mod errors;
pub mod reservation;
pub mod restaurant;
pub mod table;
pub mod visual;
mod middleware;

// Re-exportar tipos comunes para facilitar su uso
pub use errors::{AppError, AppResult, ErrorResponse};

use actix_web::web;

/// Configura todas las rutas de la API
///
/// ## Rutas configuradas
///
/// - `/restaurants/*` - Ver [`restaurant::routes`]
/// - `/tables/*` - Ver [`table::routes`]
/// - `/reservations/*` - Ver [`reservation::routes`]
/// - `/visual/*` - Ver [`visual::routes`]
pub fn init_routes(cfg: &mut web::ServiceConfig) {
    reservation::routes(cfg);
    restaurant::routes(cfg);
    table::routes(cfg);
    visual::routes(cfg);
}
