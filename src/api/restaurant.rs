//! # API de Restaurantes
//!
//! Este módulo maneja todas las operaciones relacionadas con restaurantes:
//! - Registro de nuevos restaurantes (con las dimensiones fijas del plano)
//! - Login y autenticación
//! - Listado de restaurantes
//! - Cambio de estado operativo
//! - Validación de tokens de acceso

use actix_web::{get, post, web, HttpRequest, HttpResponse, Responder};
use mongodb::bson::{doc, oid::ObjectId, to_bson};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use super::middleware::ErrorLogExt;
use super::reservation::extract_token;
use super::{AppError, AppResult};
use crate::core::GridBounds;
use crate::db::{EstadoRestaurante, MongoRepo, Restaurante};

/// Estructura para el registro de restaurantes
#[derive(Deserialize)]
struct RegisterRestaurant {
    /// Nombre del restaurante
    name: String,
    /// Contraseña (debería estar hasheada en producción)
    password: String,
    /// Ancho de la cuadrícula del plano, en celdas (1..=10)
    max_x: i32,
    /// Alto de la cuadrícula del plano, en celdas (1..=10)
    max_y: i32,
}

#[derive(Deserialize)]
struct LoginRequest {
    name: String,
    password: String,
}

#[derive(Deserialize)]
struct StatusChange {
    estado: EstadoRestaurante,
}

#[derive(Serialize)]
struct RestaurantInfo {
    id: String,
    nombre: String,
    max_x: i32,
    max_y: i32,
    estado: EstadoRestaurante,
}

/// Registra un nuevo restaurante en el sistema
///
/// Las dimensiones del plano (`max_x`, `max_y`) quedan fijadas aquí y no
/// se pueden cambiar después: todas las regiones de mesa se validarán
/// contra esta cuadrícula.
///
/// # Respuesta
///
/// ```json
/// {
///   "access_token": "uuid-token",
///   "message": "Restaurante registrado correctamente",
///   "id": "mongodb-object-id"
/// }
/// ```
///
/// # Errores
///
/// - `400 Bad Request`: Datos de validación incorrectos
/// - `409 Conflict`: El restaurante ya existe
/// - `500 Internal Server Error`: Error de base de datos
#[post("/restaurants/register")]
async fn register_restaurant(
    repo: web::Data<MongoRepo>,
    data: web::Json<RegisterRestaurant>,
) -> AppResult<impl Responder> {
    // Validación básica
    if data.name.trim().is_empty() {
        return Err(AppError::Validation("El nombre del restaurante es requerido".to_string()));
    }

    if data.password.len() < 6 {
        return Err(AppError::Validation("La contraseña debe tener al menos 6 caracteres".to_string()));
    }

    if !GridBounds::son_validas(data.max_x, data.max_y) {
        return Err(AppError::Validation(format!(
            "Las dimensiones del plano deben estar entre 1 y {} celdas por eje",
            GridBounds::LADO_MAXIMO
        )));
    }

    // Verificar si el restaurante ya existe
    let restaurantes = repo.restaurantes();

    let existing = restaurantes
        .find_one(doc! { "nombre": &data.name })
        .await
        .log_error_context("checking if restaurant exists")
        .map_err(|e| AppError::database("check_restaurant_exists", e))?;

    if existing.is_some() {
        return Err(AppError::Conflict("El restaurante ya existe".to_string()));
    }

    let access_token = Uuid::new_v4().to_string();

    let restaurante = Restaurante {
        id: None,
        nombre: data.name.clone(),
        password: data.password.clone(),
        access_token: access_token.clone(),
        max_x: data.max_x,
        max_y: data.max_y,
        estado: EstadoRestaurante::Activo,
        created_at: MongoRepo::current_timestamp(),
    };

    let result = restaurantes
        .insert_one(restaurante)
        .await
        .log_error_context("inserting new restaurant")
        .map_err(|e| AppError::database("register_restaurant", e))?;

    Ok(HttpResponse::Ok().json(json!({
        "access_token": access_token,
        "message": "Restaurante registrado correctamente",
        "id": result.inserted_id.as_object_id().unwrap().to_hex()
    })))
}

#[post("/restaurants/login")]
async fn login_restaurant(
    repo: web::Data<MongoRepo>,
    data: web::Json<LoginRequest>,
) -> AppResult<impl Responder> {
    // Validación básica
    if data.name.is_empty() || data.password.is_empty() {
        return Err(AppError::Validation("Nombre y contraseña son requeridos".to_string()));
    }

    let restaurantes = repo.restaurantes();

    let restaurante = restaurantes
        .find_one(doc! {
            "nombre": &data.name,
            "password": &data.password
        })
        .await
        .map_err(|e| AppError::database("login_restaurant", e))?;

    match restaurante {
        Some(restaurante) => Ok(HttpResponse::Ok().json(json!({
            "access_token": restaurante.access_token,
            "id_restaurante": restaurante.id.unwrap().to_hex(),
            "message": "Login exitoso"
        }))),
        None => Err(AppError::Unauthorized("Credenciales incorrectas".to_string())),
    }
}

#[get("/restaurants/all")]
async fn list_restaurants(repo: web::Data<MongoRepo>) -> AppResult<impl Responder> {
    let restaurantes = repo.restaurantes();

    let cursor = restaurantes
        .find(doc! {})
        .await
        .log_error_context("listing all restaurants")
        .map_err(|e| AppError::database("list_restaurants", e))?;

    let mut results = Vec::new();
    let mut cursor = cursor;

    while cursor.advance().await.map_err(|e| AppError::database("list_restaurants_cursor", e))? {
        let restaurante = cursor
            .deserialize_current()
            .map_err(|e| AppError::Internal(format!("Error deserializando restaurante: {}", e)))?;

        results.push(RestaurantInfo {
            id: restaurante.id.unwrap().to_hex(),
            nombre: restaurante.nombre,
            max_x: restaurante.max_x,
            max_y: restaurante.max_y,
            estado: restaurante.estado,
        });
    }

    Ok(HttpResponse::Ok().json(results))
}

/// Cambia el estado operativo del restaurante autenticado
///
/// Estados posibles: `inactivo`, `activo`, `mantenimiento`. El estado no
/// afecta al plano ni a las reservas ya creadas; solo el alta de nuevas
/// reservas exige que el restaurante esté activo.
#[post("/restaurants/status")]
async fn change_status(
    repo: web::Data<MongoRepo>,
    data: web::Json<StatusChange>,
    req: HttpRequest,
) -> AppResult<impl Responder> {
    let token = extract_token(&req)?;
    let id_restaurante = validate_access_token(repo.get_ref(), &token).await?;

    let estado = to_bson(&data.estado)
        .map_err(|e| AppError::Internal(format!("Error serializando estado: {}", e)))?;

    let result = repo
        .restaurantes()
        .update_one(
            doc! { "_id": id_restaurante },
            doc! { "$set": { "estado": estado } },
        )
        .await
        .map_err(|e| AppError::database("change_restaurant_status", e))?;

    if result.matched_count == 0 {
        return Err(AppError::NotFound("Restaurante no encontrado".to_string()));
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Estado actualizado correctamente",
        "estado": data.estado,
    })))
}

/// Valida un token de acceso y devuelve el id del restaurante propietario
pub async fn validate_access_token(repo: &MongoRepo, token: &str) -> AppResult<ObjectId> {
    let restaurantes = repo.restaurantes();

    let restaurante = restaurantes
        .find_one(doc! { "access_token": token })
        .await
        .log_error_context("validating access token")
        .map_err(|e| AppError::database("validate_token", e))?;

    match restaurante {
        Some(restaurante) => Ok(restaurante.id.unwrap()),
        None => Err(AppError::Unauthorized("Token inválido".to_string())),
    }
}

/// Como [`validate_access_token`], pero devuelve el documento completo
/// (hace falta para conocer las dimensiones del plano al validar regiones)
pub async fn restaurante_por_token(repo: &MongoRepo, token: &str) -> AppResult<Restaurante> {
    let restaurante = repo
        .restaurantes()
        .find_one(doc! { "access_token": token })
        .await
        .log_error_context("fetching restaurant by token")
        .map_err(|e| AppError::database("restaurante_por_token", e))?;

    restaurante.ok_or_else(|| AppError::Unauthorized("Token inválido".to_string()))
}

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(register_restaurant);
    cfg.service(login_restaurant);
    cfg.service(list_restaurants);
    cfg.service(change_status);
}
