// src/db/mod.rs
pub mod mongodb;

pub use mongodb::{EstadoRestaurante, Mesa, MongoRepo, Reserva, Restaurante};
