//! # API de Reservas
//!
//! Este módulo maneja todas las operaciones relacionadas con reservas:
//! - Crear nuevas reservas (validando el horario contra el núcleo)
//! - Listar reservas con filtros opcionales
//! - Editar una reserva mientras siga activa
//! - Completar y cancelar reservas (transiciones terminales)
//!
//! Todas las operaciones requieren autenticación mediante token Bearer.
//! La ventana horaria se expresa en franjas fijas de media hora
//! ([`Slot`]), y el conflicto con otras reservas se decide por solape de
//! intervalos semiabiertos en [`crate::core`].

use actix_web::{get, post, put, web, HttpRequest, HttpResponse, Responder};
use chrono::{NaiveDate, Utc};
use mongodb::bson::{doc, oid::ObjectId, to_bson};
use serde::{Deserialize, Serialize};

use super::restaurant::{restaurante_por_token, validate_access_token};
use super::{AppError, AppResult};
use crate::core::{can_book, EstadoReserva, ReservaVista, Slot};
use crate::db::{EstadoRestaurante, Mesa, MongoRepo, Reserva};

/// Estructura para crear una nueva reserva
///
/// Contiene toda la información necesaria para realizar una reserva:
/// mesa, datos del cliente, fecha, ventana horaria y número de comensales.
#[derive(Deserialize)]
struct MakeReservation {
    /// ID de la mesa a reservar (ObjectId como string)
    id_mesa: String,
    /// Nombre completo del cliente
    nombre_cliente: String,
    /// Email del cliente (usado para confirmaciones)
    email_cliente: String,
    /// Teléfono del cliente
    telefono_cliente: String,
    /// Número de comensales
    numero_personas: i32,
    /// Fecha de la reserva (formato YYYY-MM-DD)
    fecha: String,
    /// Franja de inicio (etiqueta HH:MM, de 05:00 a 23:30)
    hora_inicio: Slot,
    /// Franja de fin, exclusiva y posterior a la de inicio
    hora_fin: Slot,
}

/// Estructura para editar una reserva todavía activa
///
/// La mesa no se puede cambiar: para mover la reserva a otra mesa se
/// cancela y se crea de nuevo, pasando por la validación completa.
#[derive(Deserialize)]
struct UpdateReservation {
    nombre_cliente: String,
    email_cliente: String,
    telefono_cliente: String,
    numero_personas: i32,
    fecha: String,
    hora_inicio: Slot,
    hora_fin: Slot,
}

/// Estructura de respuesta para una reserva
///
/// Versión del modelo Reserva para envío al frontend, con ObjectIds
/// convertidos a strings y las franjas con su etiqueta de reloj.
#[derive(Serialize)]
struct ReservationResponse {
    id: String,
    id_restaurante: String,
    id_mesa: String,
    nombre_cliente: String,
    email_cliente: String,
    telefono_cliente: String,
    numero_personas: i32,
    fecha: String,
    hora_inicio: Slot,
    hora_fin: Slot,
    estado: EstadoReserva,
}

/// Parámetros de consulta para listar reservas
#[derive(Deserialize)]
struct ReservationQuery {
    /// Filtrar por fecha específica (formato YYYY-MM-DD)
    fecha: Option<String>,
    /// Filtrar por estado ("reservada", "cancelada", "completada")
    estado: Option<EstadoReserva>,
}

/// Extrae el token Bearer del header Authorization
///
/// # Errores
/// - `Unauthorized`: Si falta el header, es inválido o no tiene el formato correcto
pub(super) fn extract_token(req: &HttpRequest) -> AppResult<String> {
    let auth_header = req
        .headers()
        .get("authorization")
        .ok_or(AppError::Unauthorized("Falta header Authorization".to_string()))?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| AppError::Unauthorized("Header Authorization inválido".to_string()))?;

    if !auth_str.starts_with("Bearer ") {
        return Err(AppError::Unauthorized("Formato de token inválido".to_string()));
    }

    Ok(auth_str[7..].to_string())
}

/// Valida un email de forma básica
///
/// Esta es una validación muy básica, en producción se debería usar una
/// librería especializada
fn validate_email(email: &str) -> bool {
    email.contains('@') && email.contains('.')
}

/// Valida y parsea una fecha en formato YYYY-MM-DD
///
/// # Errores
/// - `Validation`: Si el formato de fecha es incorrecto
pub(super) fn validate_date(date_str: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        .map_err(|_| AppError::Validation("Formato de fecha inválido, use YYYY-MM-DD".to_string()))
}

/// Validaciones de los datos del cliente, compartidas por alta y edición
fn validate_customer(
    nombre: &str,
    email: &str,
    telefono: &str,
    personas: i32,
    mesa: &Mesa,
) -> AppResult<()> {
    if nombre.trim().is_empty() {
        return Err(AppError::Validation("El nombre del cliente es requerido".to_string()));
    }

    if !validate_email(email) {
        return Err(AppError::Validation("Email inválido".to_string()));
    }

    if telefono.trim().is_empty() {
        return Err(AppError::Validation("El teléfono del cliente es requerido".to_string()));
    }

    if personas <= 0 {
        return Err(AppError::Validation("El número de personas debe ser mayor a 0".to_string()));
    }

    if personas > mesa.capacidad {
        return Err(AppError::Validation(format!(
            "La mesa {} admite como máximo {} personas",
            mesa.numero, mesa.capacidad
        )));
    }

    Ok(())
}

/// Carga la mesa y comprueba que pertenece al restaurante autenticado
async fn mesa_del_restaurante(
    repo: &MongoRepo,
    id_mesa: ObjectId,
    id_restaurante: ObjectId,
) -> AppResult<Mesa> {
    let mesa = repo
        .mesas()
        .find_one(doc! { "_id": id_mesa })
        .await
        .map_err(|e| AppError::database("find_mesa", e))?
        .ok_or(AppError::NotFound("Mesa no encontrada".to_string()))?;

    if mesa.id_restaurante != id_restaurante {
        return Err(AppError::Unauthorized(
            "No tienes permiso para operar sobre esta mesa".to_string(),
        ));
    }

    Ok(mesa)
}

/// Instantánea de todas las reservas de una mesa, para el resolutor
///
/// Se cargan todas, también las terminales: el núcleo ya sabe que las
/// canceladas y completadas no bloquean.
pub(super) async fn reservas_de_mesa(
    repo: &MongoRepo,
    id_mesa: ObjectId,
) -> AppResult<Vec<ReservaVista>> {
    let mut cursor = repo
        .reservas()
        .find(doc! { "id_mesa": id_mesa })
        .await
        .map_err(|e| AppError::database("find_reservas_mesa", e))?;

    let mut vistas = Vec::new();

    while cursor.advance().await.map_err(|e| AppError::database("reservas_mesa_cursor", e))? {
        let reserva: Reserva = cursor
            .deserialize_current()
            .map_err(|e| AppError::Internal(format!("Error deserializando reserva: {}", e)))?;
        vistas.push(reserva.vista()?);
    }

    Ok(vistas)
}

impl From<Reserva> for ReservationResponse {
    fn from(reserva: Reserva) -> Self {
        ReservationResponse {
            id: reserva.id.unwrap().to_hex(),
            id_restaurante: reserva.id_restaurante.to_hex(),
            id_mesa: reserva.id_mesa.to_hex(),
            nombre_cliente: reserva.nombre_cliente,
            email_cliente: reserva.email_cliente,
            telefono_cliente: reserva.telefono_cliente,
            numero_personas: reserva.numero_personas,
            fecha: reserva.fecha,
            hora_inicio: reserva.hora_inicio,
            hora_fin: reserva.hora_fin,
            estado: reserva.estado,
        }
    }
}

/// Crea una nueva reserva
///
/// # Autenticación
/// Requiere token Bearer válido del restaurante.
///
/// # Validaciones
/// - Datos del cliente completos y número de personas dentro de la
///   capacidad de la mesa
/// - Fecha válida (YYYY-MM-DD) y no anterior a hoy
/// - `hora_fin` estrictamente posterior a `hora_inicio`
/// - La mesa existe, pertenece al restaurante y está disponible
/// - Ninguna reserva activa de la mesa solapa la ventana pedida (los
///   intervalos son semiabiertos: terminar a las 19:30 y empezar a las
///   19:30 no choca)
///
/// # Errores
/// - `400 Bad Request`: Datos de validación incorrectos, fecha pasada,
///   intervalo invertido o mesa no disponible
/// - `401 Unauthorized`: Token inválido o falta autorización
/// - `404 Not Found`: Mesa no encontrada
/// - `409 Conflict`: Otra reserva activa ocupa ese horario
/// - `500 Internal Server Error`: Error de base de datos
#[post("/reservations")]
async fn make_reservation(
    repo: web::Data<MongoRepo>,
    data: web::Json<MakeReservation>,
    req: HttpRequest,
) -> AppResult<impl Responder> {
    let token = extract_token(&req)?;
    let restaurante = restaurante_por_token(repo.get_ref(), &token).await?;
    let id_restaurante = restaurante.id.unwrap();

    // Un restaurante inactivo o en mantenimiento no acepta reservas nuevas
    if restaurante.estado != EstadoRestaurante::Activo {
        return Err(AppError::Conflict(
            "El restaurante no está activo y no acepta reservas nuevas".to_string(),
        ));
    }

    let fecha = validate_date(&data.fecha)?;

    let id_mesa = ObjectId::parse_str(&data.id_mesa)
        .map_err(|_| AppError::Validation("ID de mesa inválido".to_string()))?;

    let mesa = mesa_del_restaurante(repo.get_ref(), id_mesa, id_restaurante).await?;

    validate_customer(
        &data.nombre_cliente,
        &data.email_cliente,
        &data.telefono_cliente,
        data.numero_personas,
        &mesa,
    )?;

    // Instantánea de las reservas de la mesa y decisión del núcleo.
    // La exclusión mutua por mesa la da la unicidad del flujo
    // leer-validar-insertar dentro de la transacción de Mongo.
    let existentes = reservas_de_mesa(repo.get_ref(), id_mesa).await?;
    let hoy = Utc::now().date_naive();

    can_book(mesa.disponible, hoy, fecha, data.hora_inicio, data.hora_fin, &existentes, None)?;

    let current_time = MongoRepo::current_timestamp();
    let reserva = Reserva {
        id: None,
        id_restaurante,
        id_mesa,
        nombre_cliente: data.nombre_cliente.clone(),
        email_cliente: data.email_cliente.clone(),
        telefono_cliente: data.telefono_cliente.clone(),
        numero_personas: data.numero_personas,
        fecha: data.fecha.clone(),
        hora_inicio: data.hora_inicio,
        hora_fin: data.hora_fin,
        estado: EstadoReserva::Reservada,
        created_at: current_time,
        updated_at: current_time,
    };

    let result = repo
        .reservas()
        .insert_one(reserva)
        .await
        .map_err(|e| AppError::database("insert_reserva", e))?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Reserva creada correctamente",
        "id": result.inserted_id.as_object_id().unwrap().to_hex(),
        "estado": EstadoReserva::Reservada,
    })))
}

/// Lista las reservas de un restaurante con filtros opcionales
///
/// # Filtros disponibles
/// - `fecha`: Filtrar por fecha específica (formato YYYY-MM-DD)
/// - `estado`: Filtrar por estado ("reservada", "cancelada", "completada")
#[get("/reservations")]
async fn get_reservations(
    repo: web::Data<MongoRepo>,
    query: web::Query<ReservationQuery>,
    req: HttpRequest,
) -> AppResult<impl Responder> {
    let token = extract_token(&req)?;
    let id_restaurante = validate_access_token(repo.get_ref(), &token).await?;

    // Construir filtro dinámico basado en parámetros
    let mut filter = doc! { "id_restaurante": id_restaurante };

    if let Some(fecha) = &query.fecha {
        validate_date(fecha)?;
        filter.insert("fecha", fecha);
    }

    if let Some(estado) = &query.estado {
        let estado = to_bson(estado)
            .map_err(|e| AppError::Internal(format!("Error serializando estado: {}", e)))?;
        filter.insert("estado", estado);
    }

    let mut cursor = repo
        .reservas()
        .find(filter)
        .await
        .map_err(|e| AppError::database("find_reservas", e))?;

    let mut results = Vec::new();

    while cursor.advance().await.map_err(|e| AppError::database("reservas_cursor", e))? {
        let reserva = cursor
            .deserialize_current()
            .map_err(|e| AppError::Internal(format!("Error deserializando reserva: {}", e)))?;
        results.push(ReservationResponse::from(reserva));
    }

    Ok(HttpResponse::Ok().json(results))
}

/// Edita una reserva que sigue activa
///
/// Solo se pueden editar reservas en estado `reservada`. La nueva ventana
/// horaria pasa por la misma validación que el alta, excluyendo a la
/// propia reserva de la búsqueda de conflictos (una reserva no choca
/// consigo misma al recortarse o desplazarse).
///
/// # Errores
/// - `400 Bad Request`: Datos inválidos, fecha pasada o intervalo invertido
/// - `401 Unauthorized`: Token inválido
/// - `404 Not Found`: Reserva no encontrada
/// - `409 Conflict`: La reserva ya es terminal, u otra reserva ocupa el horario
#[put("/reservations/{id}")]
async fn update_reservation(
    repo: web::Data<MongoRepo>,
    path: web::Path<String>,
    data: web::Json<UpdateReservation>,
    req: HttpRequest,
) -> AppResult<impl Responder> {
    let token = extract_token(&req)?;
    let id_restaurante = validate_access_token(repo.get_ref(), &token).await?;

    let id_reserva = ObjectId::parse_str(&path.into_inner())
        .map_err(|_| AppError::Validation("ID de reserva inválido".to_string()))?;

    let reserva = repo
        .reservas()
        .find_one(doc! { "_id": id_reserva, "id_restaurante": id_restaurante })
        .await
        .map_err(|e| AppError::database("find_reserva", e))?
        .ok_or(AppError::NotFound("Reserva no encontrada".to_string()))?;

    if reserva.estado.es_terminal() {
        return Err(AppError::Conflict(
            "La reserva ya está cancelada o completada y no se puede editar".to_string(),
        ));
    }

    let fecha = validate_date(&data.fecha)?;
    let mesa = mesa_del_restaurante(repo.get_ref(), reserva.id_mesa, id_restaurante).await?;

    validate_customer(
        &data.nombre_cliente,
        &data.email_cliente,
        &data.telefono_cliente,
        data.numero_personas,
        &mesa,
    )?;

    let existentes = reservas_de_mesa(repo.get_ref(), reserva.id_mesa).await?;
    let hoy = Utc::now().date_naive();

    can_book(
        mesa.disponible,
        hoy,
        fecha,
        data.hora_inicio,
        data.hora_fin,
        &existentes,
        Some(id_reserva),
    )?;

    let hora_inicio = to_bson(&data.hora_inicio)
        .map_err(|e| AppError::Internal(format!("Error serializando franja: {}", e)))?;
    let hora_fin = to_bson(&data.hora_fin)
        .map_err(|e| AppError::Internal(format!("Error serializando franja: {}", e)))?;

    repo.reservas()
        .update_one(
            doc! { "_id": id_reserva, "estado": "reservada" },
            doc! {
                "$set": {
                    "nombre_cliente": &data.nombre_cliente,
                    "email_cliente": &data.email_cliente,
                    "telefono_cliente": &data.telefono_cliente,
                    "numero_personas": data.numero_personas,
                    "fecha": &data.fecha,
                    "hora_inicio": hora_inicio,
                    "hora_fin": hora_fin,
                    "updated_at": MongoRepo::current_timestamp(),
                }
            },
        )
        .await
        .map_err(|e| AppError::database("update_reserva", e))?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Reserva actualizada correctamente",
        "id": id_reserva.to_hex(),
    })))
}

/// Marca como completada una reserva activa
///
/// Transición `reservada` → `completada`. Es terminal: la reserva deja de
/// bloquear la mesa para nuevos horarios.
#[post("/reservations/{id}/complete")]
async fn complete_reservation(
    repo: web::Data<MongoRepo>,
    path: web::Path<String>,
    req: HttpRequest,
) -> AppResult<impl Responder> {
    transition(repo, path, req, EstadoReserva::Completada, "completada").await
}

/// Cancela una reserva activa
///
/// Transición `reservada` → `cancelada`. Una vez cancelada, la reserva no
/// se puede reactivar ni modificar, y deja de contar para los conflictos.
#[post("/reservations/{id}/cancel")]
async fn cancel_reservation(
    repo: web::Data<MongoRepo>,
    path: web::Path<String>,
    req: HttpRequest,
) -> AppResult<impl Responder> {
    transition(repo, path, req, EstadoReserva::Cancelada, "cancelada").await
}

/// Transición de estado común a completar y cancelar
///
/// El filtro exige `estado: reservada`, así que las reservas ya
/// terminales no se tocan (las transiciones solo salen del estado activo).
async fn transition(
    repo: web::Data<MongoRepo>,
    path: web::Path<String>,
    req: HttpRequest,
    destino: EstadoReserva,
    etiqueta: &str,
) -> AppResult<HttpResponse> {
    let token = extract_token(&req)?;
    let id_restaurante = validate_access_token(repo.get_ref(), &token).await?;

    let id_reserva = ObjectId::parse_str(&path.into_inner())
        .map_err(|_| AppError::Validation("ID de reserva inválido".to_string()))?;

    let estado = to_bson(&destino)
        .map_err(|e| AppError::Internal(format!("Error serializando estado: {}", e)))?;

    let result = repo
        .reservas()
        .update_one(
            doc! {
                "_id": id_reserva,
                "id_restaurante": id_restaurante,
                "estado": "reservada"
            },
            doc! {
                "$set": {
                    "estado": estado,
                    "updated_at": MongoRepo::current_timestamp()
                }
            },
        )
        .await
        .map_err(|e| AppError::database("transition_reserva", e))?;

    if result.modified_count == 0 {
        return Err(AppError::NotFound("Reserva no encontrada o ya procesada".to_string()));
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": format!("Reserva {} correctamente", etiqueta),
        "id": id_reserva.to_hex(),
        "estado": destino,
    })))
}

/// Configura las rutas relacionadas con reservas
///
/// # Rutas disponibles
/// - `POST /reservations` - Crear nueva reserva
/// - `GET /reservations` - Listar reservas con filtros opcionales
/// - `PUT /reservations/{id}` - Editar una reserva activa
/// - `POST /reservations/{id}/complete` - Completar reserva
/// - `POST /reservations/{id}/cancel` - Cancelar reserva
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(make_reservation);
    cfg.service(get_reservations);
    cfg.service(update_reservation);
    cfg.service(complete_reservation);
    cfg.service(cancel_reservation);
}
