//! Escenarios de extremo a extremo sobre el núcleo puro: plano de mesas,
//! conflictos de horario y consulta de disponibilidad trabajando juntos.

use std::collections::HashSet;

use chrono::NaiveDate;
use mongodb::bson::oid::ObjectId;

use plano_reservas::core::{
    can_book, conflicts, find_available_tables, validate_region, EstadoReserva, GridBounds,
    Intervalo, MesaVista, Rechazo, Region, ReservaVista, Slot,
};

fn fecha(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

#[test]
fn colocacion_de_mesas_en_un_plano_10x10() {
    let plano = GridBounds { max_x: 10, max_y: 10 };
    let mesa_a = Region::new(0, 0, 1, 1);

    // Toca la esquina de A sin compartir celda: se acepta
    assert_eq!(validate_region(plano, &[mesa_a], Region::new(2, 2, 3, 3)), Ok(()));

    // Lado adyacente sin celda común: se acepta
    assert_eq!(validate_region(plano, &[mesa_a], Region::new(2, 0, 3, 1)), Ok(()));

    // Una sola celda dentro de A: solape
    assert_eq!(
        validate_region(plano, &[mesa_a], Region::new(0, 0, 0, 0)),
        Err(Rechazo::RegionSolapada)
    );

    // Se sale del plano por la esquina inferior derecha
    assert_eq!(
        validate_region(plano, &[mesa_a], Region::new(3, 3, 11, 11)),
        Err(Rechazo::FueraDePlano)
    );
}

#[test]
fn el_plano_mantiene_la_disyuncion_tras_una_secuencia_de_altas() {
    let plano = GridBounds { max_x: 10, max_y: 10 };
    let candidatas = [
        Region::new(0, 0, 1, 1),
        Region::new(2, 0, 3, 1),
        Region::new(0, 2, 1, 3),
        Region::new(1, 1, 2, 2), // pisa a las tres anteriores
        Region::new(5, 5, 9, 9),
        Region::new(9, 9, 9, 9), // pisa la grande
    ];

    // Solo se colocan las que el validador acepta, como haría el alta real
    let mut colocadas: Vec<Region> = Vec::new();
    for candidata in candidatas {
        if validate_region(plano, &colocadas, candidata).is_ok() {
            colocadas.push(candidata);
        }
    }

    assert_eq!(colocadas.len(), 4);

    // Invariante: ningún par de regiones colocadas comparte celda y todas
    // caben en el plano
    for (i, a) in colocadas.iter().enumerate() {
        assert!(a.start_x >= 0 && a.end_x < plano.max_x);
        assert!(a.start_y >= 0 && a.end_y < plano.max_y);
        for b in &colocadas[i + 1..] {
            assert!(!a.intersects(b), "{:?} y {:?} se solapan", a, b);
        }
    }
}

#[test]
fn reserva_activa_bloquea_el_horario_solapado() {
    let id_mesa = ObjectId::new();
    let existente = ReservaVista {
        id: ObjectId::new(),
        id_mesa,
        fecha: fecha("2025-06-01"),
        intervalo: Intervalo::new(Slot::H1800, Slot::H1930).unwrap(),
        estado: EstadoReserva::Reservada,
    };
    let hoy = fecha("2025-05-20");

    // [18:00,19:30) y [18:30,20:00) se solapan
    assert_eq!(
        can_book(true, hoy, fecha("2025-06-01"), Slot::H1830, Slot::H2000, &[existente], None),
        Err(Rechazo::MesaYaReservada)
    );

    // [19:30,20:00) empieza justo donde termina la existente: libre
    assert!(can_book(true, hoy, fecha("2025-06-01"), Slot::H1930, Slot::H2000, &[existente], None)
        .is_ok());
}

#[test]
fn la_reserva_cancelada_libera_el_horario() {
    let existente = ReservaVista {
        id: ObjectId::new(),
        id_mesa: ObjectId::new(),
        fecha: fecha("2025-06-01"),
        intervalo: Intervalo::new(Slot::H1800, Slot::H1930).unwrap(),
        estado: EstadoReserva::Cancelada,
    };
    let hoy = fecha("2025-05-20");

    assert!(can_book(true, hoy, fecha("2025-06-01"), Slot::H1830, Slot::H2000, &[existente], None)
        .is_ok());

    // Y el resolutor tampoco la considera, sea cual sea el intervalo
    let cualquiera = Intervalo::new(Slot::H0500, Slot::H2330).unwrap();
    assert!(!conflicts(&existente, fecha("2025-06-01"), cualquiera));
}

#[test]
fn reservar_en_fecha_pasada_se_rechaza() {
    let hoy = fecha("2025-06-01");

    assert_eq!(
        can_book(true, hoy, fecha("2025-05-31"), Slot::H1000, Slot::H1100, &[], None),
        Err(Rechazo::FechaPasada)
    );
}

#[test]
fn disponibilidad_excluye_solo_la_mesa_reservada() {
    let rest = ObjectId::new();
    let a = MesaVista { id: ObjectId::new(), id_restaurante: rest, disponible: true };
    let b = MesaVista { id: ObjectId::new(), id_restaurante: rest, disponible: true };
    let t = MesaVista { id: ObjectId::new(), id_restaurante: rest, disponible: true };

    let reservas = [ReservaVista {
        id: ObjectId::new(),
        id_mesa: t.id,
        fecha: fecha("2025-06-01"),
        intervalo: Intervalo::new(Slot::H1800, Slot::H1930).unwrap(),
        estado: EstadoReserva::Reservada,
    }];

    let libres =
        find_available_tables(rest, fecha("2025-06-01"), Slot::H1830, &[a, b, t], &reservas);

    assert_eq!(libres, HashSet::from([a.id, b.id]));

    // A las 19:30 la reserva ya no cubre la sonda y T vuelve a estar libre
    let libres =
        find_available_tables(rest, fecha("2025-06-01"), Slot::H1930, &[a, b, t], &reservas);

    assert_eq!(libres, HashSet::from([a.id, b.id, t.id]));
}

#[test]
fn la_bandera_manual_y_el_conflicto_son_senales_independientes() {
    let rest = ObjectId::new();
    let dia = fecha("2025-06-01");

    // Mesa sin reservas pero apagada por el operador: no aparece
    let apagada = MesaVista { id: ObjectId::new(), id_restaurante: rest, disponible: false };
    let libres = find_available_tables(rest, dia, Slot::H1200, &[apagada], &[]);
    assert!(libres.is_empty());

    // Y el alta de reserva también la rechaza, antes de mirar conflictos
    assert_eq!(
        can_book(false, fecha("2025-05-20"), dia, Slot::H1200, Slot::H1300, &[], None),
        Err(Rechazo::MesaNoDisponible)
    );
}

#[test]
fn editar_una_reserva_no_choca_consigo_misma() {
    let id_mesa = ObjectId::new();
    let propia = ReservaVista {
        id: ObjectId::new(),
        id_mesa,
        fecha: fecha("2025-06-01"),
        intervalo: Intervalo::new(Slot::H2000, Slot::H2100).unwrap(),
        estado: EstadoReserva::Reservada,
    };
    let ajena = ReservaVista {
        id: ObjectId::new(),
        id_mesa,
        fecha: fecha("2025-06-01"),
        intervalo: Intervalo::new(Slot::H2130, Slot::H2230).unwrap(),
        estado: EstadoReserva::Reservada,
    };
    let hoy = fecha("2025-05-20");
    let reservas = [propia, ajena];

    // Ampliar la propia hasta las 21:30 es válido si se excluye a sí misma
    assert!(can_book(
        true,
        hoy,
        fecha("2025-06-01"),
        Slot::H2000,
        Slot::H2130,
        &reservas,
        Some(propia.id)
    )
    .is_ok());

    // Pero seguir ampliando hasta pisar la ajena se rechaza
    assert_eq!(
        can_book(
            true,
            hoy,
            fecha("2025-06-01"),
            Slot::H2000,
            Slot::H2200,
            &reservas,
            Some(propia.id)
        ),
        Err(Rechazo::MesaYaReservada)
    );
}

#[test]
fn intervalo_vacio_se_rechaza_antes_de_buscar_conflictos() {
    let hoy = fecha("2025-06-01");

    assert_eq!(
        can_book(true, hoy, hoy, Slot::H1000, Slot::H1000, &[], None),
        Err(Rechazo::IntervaloInvalido)
    );
}
