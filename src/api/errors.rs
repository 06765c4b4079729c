//! # Manejo de errores de la aplicación
//!
//! Los rechazos de dominio del núcleo ([`Rechazo`]) y los fallos de
//! infraestructura (base de datos, autenticación) comparten una sola
//! jerarquía `thiserror` que sabe traducirse a respuestas HTTP.

use actix_web::{HttpResponse, ResponseError};
use std::error::Error; // para recorrer la cadena de fuentes en los logs
use thiserror::Error;

use crate::core::Rechazo;

/// Tipos de error de la aplicación
#[derive(Error, Debug)]
pub enum AppError {
    /// Error de base de datos con contexto de la operación
    ///
    /// Mantiene la cadena de errores original de mongodb para el logging.
    #[error("Error de base de datos en operación '{operation}': {source}")]
    Database {
        operation: String,
        #[source]
        source: mongodb::error::Error,
    },

    /// Rechazo de dominio del núcleo (entrada corregible por el usuario)
    #[error(transparent)]
    Rechazo(#[from] Rechazo),

    /// Error de validación de entrada
    #[error("Error de validación: {0}")]
    Validation(String),

    /// Error de autorización
    #[error("No autorizado: {0}")]
    Unauthorized(String),

    /// Error de recurso no encontrado
    #[error("No encontrado: {0}")]
    NotFound(String),

    /// Error de conflicto de estado
    #[error("Conflicto: {0}")]
    Conflict(String),

    /// Error interno
    #[error("Error interno: {0}")]
    Internal(String),
}

impl AppError {
    /// Crea un error de base de datos con contexto de operación
    pub fn database(operation: &str, source: mongodb::error::Error) -> Self {
        Self::Database {
            operation: operation.to_string(),
            source,
        }
    }
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        // Log detallado del error antes de responder
        match self {
            Self::Database { operation, source } => {
                tracing::error!(
                    operation = %operation,
                    error = %source,
                    error_chain = ?source.source(),
                    "Database error occurred"
                );
                HttpResponse::InternalServerError().json(ErrorResponse {
                    error: "Error de base de datos".to_string(),
                    message: "Error interno del servidor".to_string(),
                })
            }
            Self::Rechazo(motivo) => {
                tracing::warn!(motivo = ?motivo, "Operación rechazada por el dominio");

                let body = ErrorResponse {
                    error: "Operación rechazada".to_string(),
                    message: motivo.to_string(),
                };

                // El solape (de región o de horario) es un conflicto con el
                // estado actual; el resto son entradas incorrectas.
                match motivo {
                    Rechazo::RegionSolapada | Rechazo::MesaYaReservada => {
                        HttpResponse::Conflict().json(body)
                    }
                    _ => HttpResponse::BadRequest().json(body),
                }
            }
            Self::Validation(message) => {
                tracing::warn!(message = %message, "Validation error");
                HttpResponse::BadRequest().json(ErrorResponse {
                    error: "Error de validación".to_string(),
                    message: message.clone(),
                })
            }
            Self::Unauthorized(reason) => {
                tracing::warn!(reason = %reason, "Unauthorized access attempt");
                HttpResponse::Unauthorized().json(ErrorResponse {
                    error: "No autorizado".to_string(),
                    message: reason.clone(),
                })
            }
            Self::NotFound(resource) => {
                tracing::info!(resource = %resource, "Resource not found");
                HttpResponse::NotFound().json(ErrorResponse {
                    error: "No encontrado".to_string(),
                    message: resource.clone(),
                })
            }
            Self::Conflict(message) => {
                tracing::warn!(message = %message, "State conflict");
                HttpResponse::Conflict().json(ErrorResponse {
                    error: "Conflicto".to_string(),
                    message: message.clone(),
                })
            }
            Self::Internal(message) => {
                tracing::error!(message = %message, "Internal error");
                HttpResponse::InternalServerError().json(ErrorResponse {
                    error: "Error interno".to_string(),
                    message: "Error interno del servidor".to_string(),
                })
            }
        }
    }
}

#[derive(serde::Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

pub type AppResult<T> = Result<T, AppError>;

// Conversión automática desde mongodb::error::Error
impl From<mongodb::error::Error> for AppError {
    fn from(error: mongodb::error::Error) -> Self {
        Self::Database {
            operation: "database_operation".to_string(),
            source: error,
        }
    }
}

// Conversión desde errores de ObjectId
impl From<mongodb::bson::oid::Error> for AppError {
    fn from(e: mongodb::bson::oid::Error) -> Self {
        Self::Validation(format!("ObjectId inválido: {}", e))
    }
}
