//! # Intervalos de reserva y conflictos de horario
//!
//! Una reserva ocupa su mesa durante el intervalo semiabierto
//! `[hora_inicio, hora_fin)` medido en ordinales de franja: dos reservas
//! que se tocan (una termina a las 19:30 y la otra empieza a las 19:30)
//! no entran en conflicto. Solo las reservas activas (estado `reservada`)
//! bloquean la mesa; las canceladas y las completadas quedan inertes.

use chrono::NaiveDate;
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use super::{Rechazo, Slot};

/// Estado del ciclo de vida de una reserva.
///
/// Nace en `reservada` y solo transiciona a `cancelada` o `completada`,
/// ambos estados terminales.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EstadoReserva {
    #[serde(rename = "reservada")]
    Reservada,
    #[serde(rename = "cancelada")]
    Cancelada,
    #[serde(rename = "completada")]
    Completada,
}

impl EstadoReserva {
    /// Solo las reservas activas cuentan para los conflictos de horario.
    pub fn es_activa(&self) -> bool {
        matches!(self, EstadoReserva::Reservada)
    }

    /// `cancelada` y `completada` no admiten más transiciones.
    pub fn es_terminal(&self) -> bool {
        !self.es_activa()
    }
}

/// Intervalo semiabierto `[inicio, fin)` en ordinales de franja.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Intervalo {
    inicio: Slot,
    fin: Slot,
}

impl Intervalo {
    /// Construye el intervalo validando que `fin` sea estrictamente
    /// posterior a `inicio` (un intervalo vacío no es reservable).
    pub fn new(inicio: Slot, fin: Slot) -> Result<Intervalo, Rechazo> {
        if !fin.is_after(inicio) {
            return Err(Rechazo::IntervaloInvalido);
        }
        Ok(Intervalo { inicio, fin })
    }

    pub fn inicio(&self) -> Slot {
        self.inicio
    }

    pub fn fin(&self) -> Slot {
        self.fin
    }

    /// Solape clásico de intervalos semiabiertos sobre ordinales.
    pub fn solapa(&self, otro: &Intervalo) -> bool {
        self.inicio.ordinal() < otro.fin.ordinal() && otro.inicio.ordinal() < self.fin.ordinal()
    }

    /// `true` si el intervalo cubre la media hora que empieza en `slot`.
    ///
    /// Equivale a solapar con la ventana de sondeo `[slot, slot+1)`, sin
    /// necesitar que exista la franja siguiente (23:30 sondea `[23:30, fin
    /// del día)`).
    pub fn cubre_slot(&self, slot: Slot) -> bool {
        self.inicio.ordinal() <= slot.ordinal() && slot.ordinal() < self.fin.ordinal()
    }
}

/// Instantánea de una reserva existente, tal y como la ve el resolutor.
///
/// La capa de persistencia la construye a partir del documento almacenado;
/// el núcleo nunca consulta la base de datos por sí mismo.
#[derive(Debug, Clone, Copy)]
pub struct ReservaVista {
    pub id: ObjectId,
    pub id_mesa: ObjectId,
    pub fecha: NaiveDate,
    pub intervalo: Intervalo,
    pub estado: EstadoReserva,
}

/// Decide si una reserva existente entra en conflicto con un intervalo
/// candidato sobre la misma mesa.
///
/// Hay conflicto solo si la reserva está activa, es del mismo día y los
/// dos intervalos semiabiertos se solapan. Es una función pura: repetir la
/// llamada con la misma entrada devuelve siempre lo mismo.
pub fn conflicts(existente: &ReservaVista, fecha: NaiveDate, candidato: Intervalo) -> bool {
    existente.estado.es_activa()
        && existente.fecha == fecha
        && existente.intervalo.solapa(&candidato)
}

/// Comprobación completa previa a crear (o editar) una reserva.
///
/// Orden de validación:
/// 1. `fecha` no puede ser anterior a `hoy` (que aporta el llamador; el
///    núcleo no lee el reloj)
/// 2. `fin` debe ser estrictamente posterior a `inicio`
/// 3. la mesa debe estar marcada como disponible por el operador
/// 4. ninguna reserva activa de la mesa puede solapar el intervalo
///
/// Al editar una reserva existente se pasa su id en `excluir` para que no
/// entre en conflicto consigo misma.
///
/// Devuelve el [`Intervalo`] validado para que el llamador lo persista.
pub fn can_book(
    mesa_disponible: bool,
    hoy: NaiveDate,
    fecha: NaiveDate,
    inicio: Slot,
    fin: Slot,
    reservas_de_la_mesa: &[ReservaVista],
    excluir: Option<ObjectId>,
) -> Result<Intervalo, Rechazo> {
    if fecha < hoy {
        return Err(Rechazo::FechaPasada);
    }

    let candidato = Intervalo::new(inicio, fin)?;

    if !mesa_disponible {
        return Err(Rechazo::MesaNoDisponible);
    }

    let hay_conflicto = reservas_de_la_mesa
        .iter()
        .filter(|r| Some(r.id) != excluir)
        .any(|r| conflicts(r, fecha, candidato));

    if hay_conflicto {
        return Err(Rechazo::MesaYaReservada);
    }

    Ok(candidato)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fecha(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn reserva(fecha_str: &str, inicio: Slot, fin: Slot, estado: EstadoReserva) -> ReservaVista {
        ReservaVista {
            id: ObjectId::new(),
            id_mesa: ObjectId::new(),
            fecha: fecha(fecha_str),
            intervalo: Intervalo::new(inicio, fin).unwrap(),
            estado,
        }
    }

    #[test]
    fn intervalo_exige_fin_posterior() {
        assert!(Intervalo::new(Slot::H1800, Slot::H1930).is_ok());
        assert_eq!(
            Intervalo::new(Slot::H1800, Slot::H1800),
            Err(Rechazo::IntervaloInvalido)
        );
        assert_eq!(
            Intervalo::new(Slot::H1930, Slot::H1800),
            Err(Rechazo::IntervaloInvalido)
        );
    }

    #[test]
    fn solape_semiabierto() {
        let a = Intervalo::new(Slot::H1800, Slot::H1930).unwrap();
        let b = Intervalo::new(Slot::H1830, Slot::H2000).unwrap();
        let c = Intervalo::new(Slot::H1930, Slot::H2000).unwrap();

        assert!(a.solapa(&b));
        assert!(b.solapa(&a));
        // Se tocan en 19:30 pero no comparten media hora
        assert!(!a.solapa(&c));
        assert!(!c.solapa(&a));
    }

    #[test]
    fn cubre_slot_es_la_sonda_de_media_hora() {
        let i = Intervalo::new(Slot::H1800, Slot::H1930).unwrap();

        assert!(i.cubre_slot(Slot::H1800));
        assert!(i.cubre_slot(Slot::H1900));
        // 19:30 es el extremo abierto
        assert!(!i.cubre_slot(Slot::H1930));
        assert!(!i.cubre_slot(Slot::H1730));

        // La última franja del día también se puede sondear
        let tarde = Intervalo::new(Slot::H2300, Slot::H2330).unwrap();
        assert!(!tarde.cubre_slot(Slot::H2330));
    }

    #[test]
    fn conflicto_solo_con_reservas_activas() {
        let candidato = Intervalo::new(Slot::H1830, Slot::H2000).unwrap();
        let dia = fecha("2025-06-01");

        let activa = reserva("2025-06-01", Slot::H1800, Slot::H1930, EstadoReserva::Reservada);
        let cancelada = reserva("2025-06-01", Slot::H1800, Slot::H1930, EstadoReserva::Cancelada);
        let completada =
            reserva("2025-06-01", Slot::H1800, Slot::H1930, EstadoReserva::Completada);

        assert!(conflicts(&activa, dia, candidato));
        assert!(!conflicts(&cancelada, dia, candidato));
        assert!(!conflicts(&completada, dia, candidato));

        // Misma llamada, mismo resultado
        assert!(conflicts(&activa, dia, candidato));
    }

    #[test]
    fn conflicto_exige_misma_fecha() {
        let candidato = Intervalo::new(Slot::H1830, Slot::H2000).unwrap();
        let activa = reserva("2025-06-01", Slot::H1800, Slot::H1930, EstadoReserva::Reservada);

        assert!(!conflicts(&activa, fecha("2025-06-02"), candidato));
    }

    #[test]
    fn can_book_rechaza_fecha_pasada() {
        let hoy = fecha("2025-06-01");

        assert_eq!(
            can_book(true, hoy, fecha("2025-05-31"), Slot::H1000, Slot::H1100, &[], None),
            Err(Rechazo::FechaPasada)
        );
        // Hoy mismo sí se puede reservar
        assert!(can_book(true, hoy, hoy, Slot::H1000, Slot::H1100, &[], None).is_ok());
    }

    #[test]
    fn can_book_rechaza_mesa_no_disponible() {
        let hoy = fecha("2025-06-01");

        assert_eq!(
            can_book(false, hoy, hoy, Slot::H1000, Slot::H1100, &[], None),
            Err(Rechazo::MesaNoDisponible)
        );
    }

    #[test]
    fn can_book_detecta_solape_con_reserva_activa() {
        let hoy = fecha("2025-06-01");
        let existentes = [reserva(
            "2025-06-01",
            Slot::H1800,
            Slot::H1930,
            EstadoReserva::Reservada,
        )];

        assert_eq!(
            can_book(true, hoy, hoy, Slot::H1830, Slot::H2000, &existentes, None),
            Err(Rechazo::MesaYaReservada)
        );
        // Intervalos que se tocan en 19:30: sin conflicto
        assert!(can_book(true, hoy, hoy, Slot::H1930, Slot::H2000, &existentes, None).is_ok());
    }

    #[test]
    fn can_book_excluye_la_reserva_que_se_edita() {
        let hoy = fecha("2025-06-01");
        let propia = reserva("2025-06-01", Slot::H1800, Slot::H1930, EstadoReserva::Reservada);

        // Sin exclusión la reserva choca consigo misma
        assert_eq!(
            can_book(true, hoy, hoy, Slot::H1800, Slot::H2000, &[propia], None),
            Err(Rechazo::MesaYaReservada)
        );
        // Con exclusión puede ampliar su propio horario
        assert!(
            can_book(true, hoy, hoy, Slot::H1800, Slot::H2000, &[propia], Some(propia.id)).is_ok()
        );
    }

    #[test]
    fn can_book_ordena_las_validaciones() {
        let hoy = fecha("2025-06-01");

        // La fecha pasada gana al intervalo invertido
        assert_eq!(
            can_book(false, hoy, fecha("2025-05-01"), Slot::H1100, Slot::H1000, &[], None),
            Err(Rechazo::FechaPasada)
        );
        // El intervalo invertido gana a la mesa no disponible
        assert_eq!(
            can_book(false, hoy, hoy, Slot::H1100, Slot::H1000, &[], None),
            Err(Rechazo::IntervaloInvalido)
        );
    }
}
