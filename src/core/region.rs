//! # Regiones del plano de mesas
//!
//! Cada mesa ocupa un rectángulo de celdas enteras sobre la cuadrícula del
//! restaurante. Las coordenadas son inclusivas en ambos extremos: la región
//! `(0,0)-(1,1)` ocupa cuatro celdas. El invariante del plano es que las
//! regiones de dos mesas del mismo restaurante nunca comparten celda.

use serde::{Deserialize, Serialize};

use super::Rechazo;

/// Dimensiones de la cuadrícula de un restaurante.
///
/// Se fijan al registrar el restaurante y no cambian después. Cada eje
/// admite entre 1 y 10 celdas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridBounds {
    pub max_x: i32,
    pub max_y: i32,
}

impl GridBounds {
    /// Límite permitido por eje al crear un restaurante.
    pub const LADO_MAXIMO: i32 = 10;

    /// `true` si ambos ejes están dentro de `[1, 10]`.
    pub fn son_validas(max_x: i32, max_y: i32) -> bool {
        (1..=Self::LADO_MAXIMO).contains(&max_x) && (1..=Self::LADO_MAXIMO).contains(&max_y)
    }
}

/// Rectángulo de celdas enteras, extremos inclusivos.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub start_x: i32,
    pub start_y: i32,
    pub end_x: i32,
    pub end_y: i32,
}

impl Region {
    pub fn new(start_x: i32, start_y: i32, end_x: i32, end_y: i32) -> Region {
        Region { start_x, start_y, end_x, end_y }
    }

    /// `true` si las dos regiones comparten al menos una celda.
    ///
    /// Los extremos son inclusivos: dos regiones que solo se tocan por un
    /// borde o una esquina (sin celda común) NO se solapan.
    pub fn intersects(&self, otra: &Region) -> bool {
        !(self.end_x < otra.start_x
            || self.start_x > otra.end_x
            || self.end_y < otra.start_y
            || self.start_y > otra.end_y)
    }

    fn dentro_de(&self, plano: GridBounds) -> bool {
        self.start_x >= 0
            && self.start_y >= 0
            && self.end_x < plano.max_x
            && self.end_y < plano.max_y
            && self.start_x <= self.end_x
            && self.start_y <= self.end_y
    }
}

/// Decide si una región candidata puede colocarse en el plano.
///
/// `existentes` son las regiones ya ocupadas del restaurante; al editar la
/// región de una mesa, el llamador debe excluir de la lista la región previa
/// de esa misma mesa. La función es pura: la misma entrada produce siempre
/// la misma decisión, tanto para la previsualización del arrastre en el
/// plano como para el alta definitiva.
///
/// # Errores
/// - [`Rechazo::FueraDePlano`] si la región sale de la cuadrícula o tiene
///   las coordenadas invertidas
/// - [`Rechazo::RegionSolapada`] si comparte alguna celda con una región
///   existente
pub fn validate_region(
    plano: GridBounds,
    existentes: &[Region],
    candidata: Region,
) -> Result<(), Rechazo> {
    if !candidata.dentro_de(plano) {
        return Err(Rechazo::FueraDePlano);
    }

    if existentes.iter().any(|r| candidata.intersects(r)) {
        return Err(Rechazo::RegionSolapada);
    }

    Ok(())
}
