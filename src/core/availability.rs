//! # Consulta de disponibilidad
//!
//! Responde "¿qué mesas están libres en esta fecha y franja?" componiendo
//! las dos señales independientes del sistema: la bandera manual
//! `disponible` (la apaga el operador cuando la mesa está ocupada o fuera
//! de servicio, al margen de las reservas) y el estado calculado de
//! conflicto de reservas. Ninguna de las dos sustituye a la otra.

use std::collections::HashSet;

use chrono::NaiveDate;
use mongodb::bson::oid::ObjectId;

use super::{ReservaVista, Slot};

/// Instantánea mínima de una mesa para la consulta de disponibilidad.
#[derive(Debug, Clone, Copy)]
pub struct MesaVista {
    pub id: ObjectId,
    pub id_restaurante: ObjectId,
    pub disponible: bool,
}

/// Mesas del restaurante libres durante la media hora `[slot, slot+1)`.
///
/// Una mesa entra en el resultado si pertenece al restaurante, su bandera
/// manual `disponible` está encendida y ninguna reserva activa de esa mesa
/// en `fecha` cubre la franja sondeada. Función pura sobre las
/// instantáneas recibidas: no lee el reloj ni la base de datos.
pub fn find_available_tables(
    id_restaurante: ObjectId,
    fecha: NaiveDate,
    slot: Slot,
    mesas: &[MesaVista],
    reservas: &[ReservaVista],
) -> HashSet<ObjectId> {
    mesas
        .iter()
        .filter(|m| m.id_restaurante == id_restaurante)
        .filter(|m| m.disponible)
        .filter(|m| {
            !reservas.iter().any(|r| {
                r.id_mesa == m.id
                    && r.estado.es_activa()
                    && r.fecha == fecha
                    && r.intervalo.cubre_slot(slot)
            })
        })
        .map(|m| m.id)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{EstadoReserva, Intervalo};

    fn fecha(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn mesa(id_restaurante: ObjectId, disponible: bool) -> MesaVista {
        MesaVista { id: ObjectId::new(), id_restaurante, disponible }
    }

    fn reserva_activa(id_mesa: ObjectId, dia: &str, inicio: Slot, fin: Slot) -> ReservaVista {
        ReservaVista {
            id: ObjectId::new(),
            id_mesa,
            fecha: fecha(dia),
            intervalo: Intervalo::new(inicio, fin).unwrap(),
            estado: EstadoReserva::Reservada,
        }
    }

    #[test]
    fn excluye_la_mesa_con_reserva_solapada() {
        let rest = ObjectId::new();
        let a = mesa(rest, true);
        let b = mesa(rest, true);
        let t = mesa(rest, true);

        let reservas = [reserva_activa(t.id, "2025-06-01", Slot::H1800, Slot::H1930)];

        let libres =
            find_available_tables(rest, fecha("2025-06-01"), Slot::H1830, &[a, b, t], &reservas);

        assert_eq!(libres, HashSet::from([a.id, b.id]));
    }

    #[test]
    fn la_reserva_cancelada_no_bloquea() {
        let rest = ObjectId::new();
        let t = mesa(rest, true);

        let mut r = reserva_activa(t.id, "2025-06-01", Slot::H1800, Slot::H1930);
        r.estado = EstadoReserva::Cancelada;

        let libres =
            find_available_tables(rest, fecha("2025-06-01"), Slot::H1830, &[t], &[r]);

        assert!(libres.contains(&t.id));
    }

    #[test]
    fn la_bandera_manual_excluye_aunque_no_haya_reservas() {
        let rest = ObjectId::new();
        let apagada = mesa(rest, false);
        let encendida = mesa(rest, true);

        let libres = find_available_tables(
            rest,
            fecha("2025-06-01"),
            Slot::H1200,
            &[apagada, encendida],
            &[],
        );

        assert_eq!(libres, HashSet::from([encendida.id]));
    }

    #[test]
    fn ignora_mesas_de_otros_restaurantes() {
        let rest = ObjectId::new();
        let ajena = mesa(ObjectId::new(), true);
        let propia = mesa(rest, true);

        let libres =
            find_available_tables(rest, fecha("2025-06-01"), Slot::H1200, &[ajena, propia], &[]);

        assert_eq!(libres, HashSet::from([propia.id]));
    }

    #[test]
    fn la_sonda_respeta_el_extremo_abierto() {
        let rest = ObjectId::new();
        let t = mesa(rest, true);
        let reservas = [reserva_activa(t.id, "2025-06-01", Slot::H1800, Slot::H1930)];
        let dia = fecha("2025-06-01");

        // 19:30 ya está fuera de [18:00, 19:30)
        let libres = find_available_tables(rest, dia, Slot::H1930, &[t], &reservas);
        assert!(libres.contains(&t.id));

        // 17:30 aún no entra en la reserva
        let libres = find_available_tables(rest, dia, Slot::H1730, &[t], &reservas);
        assert!(libres.contains(&t.id));
    }

    #[test]
    fn otra_fecha_no_bloquea() {
        let rest = ObjectId::new();
        let t = mesa(rest, true);
        let reservas = [reserva_activa(t.id, "2025-06-01", Slot::H1800, Slot::H1930)];

        let libres =
            find_available_tables(rest, fecha("2025-06-02"), Slot::H1830, &[t], &reservas);

        assert!(libres.contains(&t.id));
    }

    #[test]
    fn resultado_determinista() {
        let rest = ObjectId::new();
        let mesas = [mesa(rest, true), mesa(rest, false), mesa(rest, true)];
        let reservas = [reserva_activa(mesas[0].id, "2025-06-01", Slot::H1200, Slot::H1400)];
        let dia = fecha("2025-06-01");

        let primera = find_available_tables(rest, dia, Slot::H1300, &mesas, &reservas);
        let segunda = find_available_tables(rest, dia, Slot::H1300, &mesas, &reservas);

        assert_eq!(primera, segunda);
        assert_eq!(primera, HashSet::from([mesas[2].id]));
    }
}
