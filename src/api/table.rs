//! # API de Mesas
//!
//! Alta, edición, baja y previsualización de mesas sobre el plano del
//! restaurante. Toda mutación de geometría pasa por el mismo validador
//! puro del núcleo ([`validate_region`]), tanto la previsualización del
//! arrastre en el editor de plano como el alta definitiva: el invariante
//! es que dos mesas del mismo restaurante nunca comparten celda.

use actix_web::{delete, get, post, put, web, HttpRequest, HttpResponse, Responder};
use mongodb::bson::{doc, oid::ObjectId, to_bson};
use serde::{Deserialize, Serialize};

use super::reservation::extract_token;
use super::restaurant::restaurante_por_token;
use super::{AppError, AppResult};
use crate::core::{validate_region, Region};
use crate::db::{Mesa, MongoRepo};

#[derive(Deserialize)]
struct NewTable {
    /// Número de mesa, único por restaurante e inmutable
    numero: i32,
    capacidad: i32,
    region: Region,
}

/// Edición de una mesa; los campos ausentes no se tocan
///
/// El número no aparece: es inmutable tras el alta.
#[derive(Deserialize)]
struct UpdateTable {
    capacidad: Option<i32>,
    region: Option<Region>,
    disponible: Option<bool>,
}

/// Región candidata para previsualizar en el editor de plano
#[derive(Deserialize)]
struct PreviewRegion {
    region: Region,
    /// Al arrastrar una mesa existente, su propia región no cuenta
    excluir_mesa: Option<String>,
}

#[derive(Serialize)]
struct TableResponse {
    id: String,
    numero: i32,
    capacidad: i32,
    region: Region,
    disponible: bool,
}

impl From<Mesa> for TableResponse {
    fn from(mesa: Mesa) -> Self {
        TableResponse {
            id: mesa.id.unwrap().to_hex(),
            numero: mesa.numero,
            capacidad: mesa.capacidad,
            region: mesa.region,
            disponible: mesa.disponible,
        }
    }
}

/// Regiones ocupadas del restaurante, excluyendo opcionalmente una mesa
///
/// Al mover una mesa, su propia región previa no cuenta como ocupada.
pub(super) async fn regiones_ocupadas(
    repo: &MongoRepo,
    id_restaurante: ObjectId,
    excluir: Option<ObjectId>,
) -> AppResult<Vec<Region>> {
    let mut filter = doc! { "id_restaurante": id_restaurante };
    if let Some(id) = excluir {
        filter.insert("_id", doc! { "$ne": id });
    }

    let mut cursor = repo
        .mesas()
        .find(filter)
        .await
        .map_err(|e| AppError::database("find_mesas_regiones", e))?;

    let mut regiones = Vec::new();

    while cursor.advance().await.map_err(|e| AppError::database("mesas_cursor", e))? {
        let mesa: Mesa = cursor
            .deserialize_current()
            .map_err(|e| AppError::Internal(format!("Error deserializando mesa: {}", e)))?;
        regiones.push(mesa.region);
    }

    Ok(regiones)
}

/// Da de alta una mesa nueva en el plano
///
/// La región candidata se valida contra la cuadrícula del restaurante y
/// contra todas las regiones ya ocupadas antes de insertar.
///
/// # Errores
/// - `400 Bad Request`: Capacidad no positiva o región fuera del plano
/// - `401 Unauthorized`: Token inválido
/// - `409 Conflict`: Número de mesa repetido o región solapada
#[post("/tables")]
async fn create_table(
    repo: web::Data<MongoRepo>,
    data: web::Json<NewTable>,
    req: HttpRequest,
) -> AppResult<impl Responder> {
    let token = extract_token(&req)?;
    let restaurante = restaurante_por_token(repo.get_ref(), &token).await?;
    let id_restaurante = restaurante.id.unwrap();

    if data.capacidad <= 0 {
        return Err(AppError::Validation("La capacidad debe ser mayor a 0".to_string()));
    }

    let duplicada = repo
        .mesas()
        .find_one(doc! { "id_restaurante": id_restaurante, "numero": data.numero })
        .await
        .map_err(|e| AppError::database("check_numero_mesa", e))?;

    if duplicada.is_some() {
        return Err(AppError::Conflict(format!(
            "Ya existe la mesa número {} en este restaurante",
            data.numero
        )));
    }

    let ocupadas = regiones_ocupadas(repo.get_ref(), id_restaurante, None).await?;
    validate_region(restaurante.plano(), &ocupadas, data.region)?;

    let mesa = Mesa {
        id: None,
        id_restaurante,
        numero: data.numero,
        capacidad: data.capacidad,
        region: data.region,
        disponible: true,
        created_at: MongoRepo::current_timestamp(),
    };

    let result = repo
        .mesas()
        .insert_one(mesa)
        .await
        .map_err(|e| AppError::database("insert_mesa", e))?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Mesa creada correctamente",
        "id": result.inserted_id.as_object_id().unwrap().to_hex(),
    })))
}

/// Valida una región candidata sin escribir nada
///
/// Lo usa el editor de plano durante el arrastre, con la misma función de
/// decisión que el alta definitiva. Responde 200 con `{"valida": true}` o
/// el mismo error 400/409 que devolvería el alta.
#[post("/tables/preview")]
async fn preview_region(
    repo: web::Data<MongoRepo>,
    data: web::Json<PreviewRegion>,
    req: HttpRequest,
) -> AppResult<impl Responder> {
    let token = extract_token(&req)?;
    let restaurante = restaurante_por_token(repo.get_ref(), &token).await?;
    let id_restaurante = restaurante.id.unwrap();

    let excluir = match &data.excluir_mesa {
        Some(id) => Some(
            ObjectId::parse_str(id)
                .map_err(|_| AppError::Validation("ID de mesa inválido".to_string()))?,
        ),
        None => None,
    };

    let ocupadas = regiones_ocupadas(repo.get_ref(), id_restaurante, excluir).await?;
    validate_region(restaurante.plano(), &ocupadas, data.region)?;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "valida": true })))
}

/// Lista las mesas del restaurante autenticado
#[get("/tables")]
async fn get_tables(repo: web::Data<MongoRepo>, req: HttpRequest) -> AppResult<impl Responder> {
    let token = extract_token(&req)?;
    let restaurante = restaurante_por_token(repo.get_ref(), &token).await?;

    let mut cursor = repo
        .mesas()
        .find(doc! { "id_restaurante": restaurante.id.unwrap() })
        .await
        .map_err(|e| AppError::database("find_mesas", e))?;

    let mut results = Vec::new();

    while cursor.advance().await.map_err(|e| AppError::database("mesas_cursor", e))? {
        let mesa = cursor
            .deserialize_current()
            .map_err(|e| AppError::Internal(format!("Error deserializando mesa: {}", e)))?;
        results.push(TableResponse::from(mesa));
    }

    Ok(HttpResponse::Ok().json(results))
}

/// Edita capacidad, región o disponibilidad de una mesa
///
/// Si cambia la región, se revalida contra el resto del plano excluyendo
/// la región previa de esta misma mesa. La bandera `disponible` es el
/// override manual del operador y no toca las reservas existentes.
#[put("/tables/{id}")]
async fn update_table(
    repo: web::Data<MongoRepo>,
    path: web::Path<String>,
    data: web::Json<UpdateTable>,
    req: HttpRequest,
) -> AppResult<impl Responder> {
    let token = extract_token(&req)?;
    let restaurante = restaurante_por_token(repo.get_ref(), &token).await?;
    let id_restaurante = restaurante.id.unwrap();

    let id_mesa = ObjectId::parse_str(&path.into_inner())
        .map_err(|_| AppError::Validation("ID de mesa inválido".to_string()))?;

    let mesa = repo
        .mesas()
        .find_one(doc! { "_id": id_mesa, "id_restaurante": id_restaurante })
        .await
        .map_err(|e| AppError::database("find_mesa", e))?
        .ok_or(AppError::NotFound("Mesa no encontrada".to_string()))?;

    let mut cambios = doc! {};

    if let Some(capacidad) = data.capacidad {
        if capacidad <= 0 {
            return Err(AppError::Validation("La capacidad debe ser mayor a 0".to_string()));
        }
        cambios.insert("capacidad", capacidad);
    }

    if let Some(region) = data.region {
        if region != mesa.region {
            let ocupadas =
                regiones_ocupadas(repo.get_ref(), id_restaurante, Some(id_mesa)).await?;
            validate_region(restaurante.plano(), &ocupadas, region)?;
        }
        let region = to_bson(&region)
            .map_err(|e| AppError::Internal(format!("Error serializando región: {}", e)))?;
        cambios.insert("region", region);
    }

    if let Some(disponible) = data.disponible {
        cambios.insert("disponible", disponible);
    }

    if cambios.is_empty() {
        return Err(AppError::Validation("No hay cambios que aplicar".to_string()));
    }

    repo.mesas()
        .update_one(doc! { "_id": id_mesa }, doc! { "$set": cambios })
        .await
        .map_err(|e| AppError::database("update_mesa", e))?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Mesa actualizada correctamente",
        "id": id_mesa.to_hex(),
    })))
}

/// Elimina una mesa del plano
///
/// Se rechaza mientras exista una reserva activa que la referencie; las
/// reservas terminales no bloquean la baja.
#[delete("/tables/{id}")]
async fn delete_table(
    repo: web::Data<MongoRepo>,
    path: web::Path<String>,
    req: HttpRequest,
) -> AppResult<impl Responder> {
    let token = extract_token(&req)?;
    let restaurante = restaurante_por_token(repo.get_ref(), &token).await?;
    let id_restaurante = restaurante.id.unwrap();

    let id_mesa = ObjectId::parse_str(&path.into_inner())
        .map_err(|_| AppError::Validation("ID de mesa inválido".to_string()))?;

    let activa = repo
        .reservas()
        .find_one(doc! { "id_mesa": id_mesa, "estado": "reservada" })
        .await
        .map_err(|e| AppError::database("check_reservas_activas", e))?;

    if activa.is_some() {
        return Err(AppError::Conflict(
            "La mesa tiene reservas activas y no se puede eliminar".to_string(),
        ));
    }

    let result = repo
        .mesas()
        .delete_one(doc! { "_id": id_mesa, "id_restaurante": id_restaurante })
        .await
        .map_err(|e| AppError::database("delete_mesa", e))?;

    if result.deleted_count == 0 {
        return Err(AppError::NotFound("Mesa no encontrada".to_string()));
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Mesa eliminada correctamente",
        "id": id_mesa.to_hex(),
    })))
}

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(create_table);
    cfg.service(preview_region);
    cfg.service(get_tables);
    cfg.service(update_table);
    cfg.service(delete_table);
}
