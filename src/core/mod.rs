//! # Núcleo de plano y reservas
//!
//! Lógica pura del sistema: colocación de mesas sobre la cuadrícula del
//! restaurante y resolución de conflictos de horario entre reservas.
//!
//! Todas las operaciones son funciones síncronas sobre instantáneas que
//! aporta el llamador (sin estado compartido, sin E/S, sin leer el reloj).
//! La capa de persistencia es la responsable de envolver cada ciclo
//! "leer instantánea → validar → escribir" en una transacción por
//! restaurante (plano) o por mesa (reservas).
//!
//! ## Módulos
//!
//! - [`slot`] - Escalera fija de franjas de media hora (05:00–23:30)
//! - [`region`] - Rectángulos de mesa sobre la cuadrícula y su validador
//! - [`booking`] - Intervalos de reserva y resolución de conflictos
//! - [`availability`] - Consulta de mesas libres para una fecha/franja

pub mod availability;
pub mod booking;
pub mod region;
pub mod slot;

pub use availability::{find_available_tables, MesaVista};
pub use booking::{can_book, conflicts, EstadoReserva, Intervalo, ReservaVista};
pub use region::{validate_region, GridBounds, Region};
pub use slot::Slot;

use thiserror::Error;

/// Motivos por los que el núcleo rechaza una operación.
///
/// Son siempre resultados de validación recuperables (el usuario puede
/// corregir la entrada), nunca fallos de infraestructura: el núcleo no
/// hace E/S. La capa API los traduce a mensajes y códigos HTTP.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rechazo {
    /// La región se sale de la cuadrícula o tiene coordenadas invertidas.
    #[error("La región se sale del plano o tiene coordenadas invertidas")]
    FueraDePlano,

    /// La región pisa celdas de otra mesa ya colocada.
    #[error("La región se solapa con otra mesa del plano")]
    RegionSolapada,

    /// La franja de fin no es estrictamente posterior a la de inicio.
    #[error("La hora de fin debe ser posterior a la hora de inicio")]
    IntervaloInvalido,

    /// La fecha de la reserva es anterior a la fecha actual.
    #[error("La fecha de la reserva ya ha pasado")]
    FechaPasada,

    /// La mesa está marcada como no disponible por el operador.
    #[error("La mesa no está disponible")]
    MesaNoDisponible,

    /// Otra reserva activa ocupa la mesa en ese horario.
    #[error("La mesa ya tiene una reserva en ese horario")]
    MesaYaReservada,
}
