//! # Plano Reservas
//!
//! Biblioteca del servidor de gestión de planos de mesas y reservas:
//!
//! - [`core`] - Lógica pura: colocación de mesas en la cuadrícula y
//!   resolución de conflictos de horario entre reservas
//! - [`db`] - Persistencia en MongoDB (modelos y repositorio)
//! - [`api`] - Rutas y controladores REST sobre Actix Web

pub mod api;
pub mod core;
pub mod db;
