//! # Plano visual
//!
//! Dos vistas del plano que el frontend pinta por separado y que no deben
//! confundirse:
//!
//! - `/visual/floorplan`: la foto física del salón — regiones de cada mesa
//!   y su bandera manual `disponible` (el operador la apaga cuando la mesa
//!   está ocupada ahora mismo o fuera de servicio).
//! - `/visual/availability`: el estado calculado de reservas — qué mesas
//!   quedan libres en una fecha y franja concretas según el resolutor de
//!   conflictos del núcleo.

use actix_web::{get, web, HttpRequest, HttpResponse, Responder};
use serde::{Deserialize, Serialize};

use super::reservation::{extract_token, validate_date};
use super::restaurant::restaurante_por_token;
use super::{AppError, AppResult};
use crate::core::{find_available_tables, MesaVista, Region, ReservaVista, Slot};
use crate::db::MongoRepo;
use mongodb::bson::doc;

#[derive(Deserialize)]
struct AvailabilityQuery {
    /// Fecha a consultar (formato YYYY-MM-DD)
    fecha: String,
    /// Franja a sondear (etiqueta HH:MM); se comprueba la media hora
    /// `[hora, hora+0:30)`
    hora: String,
}

#[derive(Serialize)]
struct FloorplanTable {
    id: String,
    numero: i32,
    capacidad: i32,
    region: Region,
    disponible: bool,
}

/// Devuelve el plano completo del restaurante autenticado
///
/// Incluye las dimensiones de la cuadrícula y, por mesa, su región y la
/// bandera manual `disponible`. No consulta reservas: esta vista responde
/// "qué mesas están físicamente operativas ahora", no "qué mesas se pueden
/// reservar a tal hora".
#[get("/visual/floorplan")]
async fn get_floorplan(repo: web::Data<MongoRepo>, req: HttpRequest) -> AppResult<impl Responder> {
    let token = extract_token(&req)?;
    let restaurante = restaurante_por_token(repo.get_ref(), &token).await?;

    let mut cursor = repo
        .mesas()
        .find(doc! { "id_restaurante": restaurante.id.unwrap() })
        .await
        .map_err(|e| AppError::database("find_mesas_floorplan", e))?;

    let mut mesas = Vec::new();

    while cursor.advance().await.map_err(|e| AppError::database("floorplan_cursor", e))? {
        let mesa = cursor
            .deserialize_current()
            .map_err(|e| AppError::Internal(format!("Error deserializando mesa: {}", e)))?;

        mesas.push(FloorplanTable {
            id: mesa.id.unwrap().to_hex(),
            numero: mesa.numero,
            capacidad: mesa.capacidad,
            region: mesa.region,
            disponible: mesa.disponible,
        });
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "max_x": restaurante.max_x,
        "max_y": restaurante.max_y,
        "mesas": mesas,
    })))
}

/// Mesas libres del restaurante para una fecha y franja
///
/// Carga la instantánea de mesas y reservas del restaurante y delega la
/// decisión en [`find_available_tables`]: una mesa está libre si su
/// bandera manual está encendida y ninguna reserva activa de esa fecha
/// cubre la media hora sondeada.
///
/// # Errores
/// - `400 Bad Request`: Fecha mal formada o franja fuera de la escalera
///   05:00–23:30
#[get("/visual/availability")]
async fn get_availability(
    repo: web::Data<MongoRepo>,
    query: web::Query<AvailabilityQuery>,
    req: HttpRequest,
) -> AppResult<impl Responder> {
    let token = extract_token(&req)?;
    let restaurante = restaurante_por_token(repo.get_ref(), &token).await?;
    let id_restaurante = restaurante.id.unwrap();

    let fecha = validate_date(&query.fecha)?;
    let slot = Slot::from_label(&query.hora).ok_or_else(|| {
        AppError::Validation(
            "Franja inválida: use una etiqueta HH:MM de media hora entre 05:00 y 23:30"
                .to_string(),
        )
    })?;

    // Instantánea de mesas del restaurante
    let mut cursor = repo
        .mesas()
        .find(doc! { "id_restaurante": id_restaurante })
        .await
        .map_err(|e| AppError::database("find_mesas_availability", e))?;

    let mut mesas: Vec<MesaVista> = Vec::new();

    while cursor.advance().await.map_err(|e| AppError::database("availability_cursor", e))? {
        let mesa = cursor
            .deserialize_current()
            .map_err(|e| AppError::Internal(format!("Error deserializando mesa: {}", e)))?;
        mesas.push(mesa.vista()?);
    }

    // Instantánea de reservas del restaurante para esa fecha
    let mut cursor = repo
        .reservas()
        .find(doc! { "id_restaurante": id_restaurante, "fecha": &query.fecha })
        .await
        .map_err(|e| AppError::database("find_reservas_availability", e))?;

    let mut reservas: Vec<ReservaVista> = Vec::new();

    while cursor.advance().await.map_err(|e| AppError::database("availability_cursor", e))? {
        let reserva = cursor
            .deserialize_current()
            .map_err(|e| AppError::Internal(format!("Error deserializando reserva: {}", e)))?;
        reservas.push(reserva.vista()?);
    }

    let libres = find_available_tables(id_restaurante, fecha, slot, &mesas, &reservas);

    let mut mesas_libres: Vec<String> = libres.iter().map(|id| id.to_hex()).collect();
    mesas_libres.sort(); // respuesta estable para el frontend

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "fecha": query.fecha,
        "hora": query.hora,
        "mesas_libres": mesas_libres,
    })))
}

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(get_floorplan);
    cfg.service(get_availability);
}
