//! # Escalera de franjas horarias
//!
//! El restaurante trabaja con franjas fijas de media hora, desde las 05:00
//! hasta las 23:30 (38 franjas en total). La escalera es constante y se
//! serializa en el API con su etiqueta de reloj `HH:MM`, igual que el campo
//! `hora` de las reservas.

use serde::{Deserialize, Serialize};

/// Define la escalera completa de franjas: enum + tabla ordenada + etiquetas.
macro_rules! franjas {
    ($($variant:ident => $label:literal),+ $(,)?) => {
        /// Una franja de media hora del día de servicio.
        ///
        /// El orden de declaración define el ordinal (`Ord` deriva de él),
        /// que es la unidad en la que se comparan los intervalos de reserva.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub enum Slot {
            $(#[serde(rename = $label)] $variant),+
        }

        impl Slot {
            /// Todas las franjas, en orden ascendente.
            pub const ALL: [Slot; 38] = [$(Slot::$variant),+];

            /// Etiqueta de reloj `HH:MM` de la franja.
            pub fn label(&self) -> &'static str {
                match self {
                    $(Slot::$variant => $label),+
                }
            }

            /// Busca una franja por su etiqueta `HH:MM`.
            pub fn from_label(label: &str) -> Option<Slot> {
                match label {
                    $($label => Some(Slot::$variant),)+
                    _ => None,
                }
            }
        }
    };
}

franjas! {
    H0500 => "05:00", H0530 => "05:30",
    H0600 => "06:00", H0630 => "06:30",
    H0700 => "07:00", H0730 => "07:30",
    H0800 => "08:00", H0830 => "08:30",
    H0900 => "09:00", H0930 => "09:30",
    H1000 => "10:00", H1030 => "10:30",
    H1100 => "11:00", H1130 => "11:30",
    H1200 => "12:00", H1230 => "12:30",
    H1300 => "13:00", H1330 => "13:30",
    H1400 => "14:00", H1430 => "14:30",
    H1500 => "15:00", H1530 => "15:30",
    H1600 => "16:00", H1630 => "16:30",
    H1700 => "17:00", H1730 => "17:30",
    H1800 => "18:00", H1830 => "18:30",
    H1900 => "19:00", H1930 => "19:30",
    H2000 => "20:00", H2030 => "20:30",
    H2100 => "21:00", H2130 => "21:30",
    H2200 => "22:00", H2230 => "22:30",
    H2300 => "23:00", H2330 => "23:30",
}

impl Slot {
    /// Posición de la franja dentro de la escalera (0..38).
    pub fn ordinal(&self) -> u8 {
        *self as u8
    }

    /// La franja siguiente, o `None` para la última (23:30).
    pub fn next(&self) -> Option<Slot> {
        Slot::ALL.get(self.ordinal() as usize + 1).copied()
    }

    /// `true` si `self` es estrictamente posterior a `otra`.
    pub fn is_after(&self, otra: Slot) -> bool {
        self.ordinal() > otra.ordinal()
    }
}
