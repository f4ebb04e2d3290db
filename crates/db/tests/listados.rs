//! Integration tests for listing queries against a real database:
//! - Pagination windows and totals
//! - AND-composed filters
//! - Free-text busqueda across expediente and solicitante fields
//! - Inclusive date ranges
//! - Sort direction with id tiebreak
//! - Perito flag filters and the derived open-case counter

use chrono::{TimeZone, Utc};
use peritos_core::oficio::{ESTADO_EN_PROCESO, PRIORIDAD_ALTA, PRIORIDAD_URGENTE};
use peritos_core::pagination::{PageParams, SortOrder};
use peritos_core::types::{DbId, Timestamp};
use peritos_db::models::cita::{CitaFilter, CreateCita};
use peritos_db::models::oficio::{CreateOficio, OficioFilter};
use peritos_db::models::perito::CreatePerito;
use peritos_db::repositories::{CitaRepo, OficioRepo, PeritoRepo};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn ts(d: u32, h: u32) -> Timestamp {
    Utc.with_ymd_and_hms(2030, 6, d, h, 0, 0).unwrap()
}

fn page(page: i64, limit: i64) -> PageParams {
    PageParams::new(Some(page), Some(limit)).unwrap()
}

fn new_perito(matricula: &str, apellido: &str) -> CreatePerito {
    CreatePerito {
        nombre: "Laura".to_string(),
        apellido: apellido.to_string(),
        matricula: matricula.to_string(),
        especialidades: vec![],
        telefono: None,
        email: None,
        disponible: None,
    }
}

fn new_oficio(expediente: &str) -> CreateOficio {
    CreateOficio {
        numero_expediente: expediente.to_string(),
        solicitante_nombre: "Marta".to_string(),
        solicitante_apellido: "Quiroga".to_string(),
        solicitante_dni: "28456123".to_string(),
        solicitante_telefono: None,
        solicitante_email: None,
        tipo_peritaje: "Contable".to_string(),
        descripcion: None,
        fecha_ingreso: None,
        fecha_audiencia: None,
        fecha_vencimiento: ts(30, 12),
        prioridad: None,
        perito_id: None,
        observaciones: None,
    }
}

fn new_cita(oficio_id: DbId, perito_id: DbId, inicio: Timestamp, fin: Timestamp) -> CreateCita {
    CreateCita {
        titulo: "Pericia en sede".to_string(),
        descripcion: None,
        fecha_inicio: inicio,
        fecha_fin: fin,
        ubicacion: None,
        tipo: peritos_core::cita::TIPO_EVALUACION.to_string(),
        oficio_id,
        perito_id,
        recordatorio_24h: None,
        recordatorio_1h: None,
    }
}

// ---------------------------------------------------------------------------
// Test: Pagination windows and totals
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_oficios_pagination_windows(pool: PgPool) {
    for n in 1..=25 {
        let mut input = new_oficio(&format!("EXP-L-{n:03}"));
        input.fecha_ingreso = Some(ts(1, 0) + chrono::Duration::minutes(n));
        OficioRepo::create(&pool, &input).await.unwrap();
    }

    let filter = OficioFilter::default();
    let (items, total) = OficioRepo::list(&pool, &filter, page(1, 10), "fecha_ingreso", SortOrder::Asc)
        .await
        .unwrap();
    assert_eq!(total, 25);
    assert_eq!(items.len(), 10);
    assert_eq!(items[0].numero_expediente, "EXP-L-001");

    let (items, total) = OficioRepo::list(&pool, &filter, page(3, 10), "fecha_ingreso", SortOrder::Asc)
        .await
        .unwrap();
    assert_eq!(total, 25);
    assert_eq!(items.len(), 5);
    assert_eq!(items[0].numero_expediente, "EXP-L-021");

    // A page past the end is empty but the total still counts every match.
    let (items, total) = OficioRepo::list(&pool, &filter, page(4, 10), "fecha_ingreso", SortOrder::Asc)
        .await
        .unwrap();
    assert_eq!(total, 25);
    assert!(items.is_empty());
}

// ---------------------------------------------------------------------------
// Test: Filters compose with AND
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_oficios_filters_and_composed(pool: PgPool) {
    let mut a = new_oficio("EXP-F-001");
    a.prioridad = Some(PRIORIDAD_ALTA.to_string());
    let a = OficioRepo::create(&pool, &a).await.unwrap();

    let mut b = new_oficio("EXP-F-002");
    b.prioridad = Some(PRIORIDAD_ALTA.to_string());
    let b = OficioRepo::create(&pool, &b).await.unwrap();
    OficioRepo::set_estado(&pool, b.id, ESTADO_EN_PROCESO, None)
        .await
        .unwrap();

    let mut c = new_oficio("EXP-F-003");
    c.prioridad = Some(PRIORIDAD_URGENTE.to_string());
    OficioRepo::create(&pool, &c).await.unwrap();

    // estado AND prioridad together must both hold.
    let filter = OficioFilter {
        estado: Some(peritos_core::oficio::ESTADO_PENDIENTE.to_string()),
        prioridad: Some(PRIORIDAD_ALTA.to_string()),
        ..Default::default()
    };
    let (items, total) = OficioRepo::list(&pool, &filter, page(1, 10), "fecha_ingreso", SortOrder::Asc)
        .await
        .unwrap();
    assert_eq!(total, 1);
    assert_eq!(items[0].id, a.id);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_oficios_filter_by_perito(pool: PgPool) {
    let perito = PeritoRepo::create(&pool, &new_perito("MAT-F-1", "Sosa"))
        .await
        .unwrap();

    let mut assigned = new_oficio("EXP-F-010");
    assigned.perito_id = Some(perito.id);
    let assigned = OficioRepo::create(&pool, &assigned).await.unwrap();
    OficioRepo::create(&pool, &new_oficio("EXP-F-011")).await.unwrap();

    let filter = OficioFilter {
        perito_id: Some(perito.id),
        ..Default::default()
    };
    let (items, total) = OficioRepo::list(&pool, &filter, page(1, 10), "fecha_ingreso", SortOrder::Asc)
        .await
        .unwrap();
    assert_eq!(total, 1);
    assert_eq!(items[0].id, assigned.id);
}

// ---------------------------------------------------------------------------
// Test: busqueda free text
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_oficios_busqueda_matches_across_fields(pool: PgPool) {
    let mut a = new_oficio("EXP-B-001");
    a.solicitante_apellido = "Ferreyra".to_string();
    a.solicitante_dni = "31222333".to_string();
    OficioRepo::create(&pool, &a).await.unwrap();

    let mut b = new_oficio("CAUSA-7781");
    b.solicitante_apellido = "Medina".to_string();
    b.solicitante_dni = "27999888".to_string();
    OficioRepo::create(&pool, &b).await.unwrap();

    let search = |term: &str| OficioFilter {
        busqueda: Some(term.to_string()),
        ..Default::default()
    };

    // Case-insensitive match on apellido.
    let (items, total) =
        OficioRepo::list(&pool, &search("ferrey"), page(1, 10), "fecha_ingreso", SortOrder::Asc)
            .await
            .unwrap();
    assert_eq!(total, 1);
    assert_eq!(items[0].solicitante_apellido, "Ferreyra");

    // Substring of the expediente number.
    let (_, total) =
        OficioRepo::list(&pool, &search("7781"), page(1, 10), "fecha_ingreso", SortOrder::Asc)
            .await
            .unwrap();
    assert_eq!(total, 1);

    // DNI fragment.
    let (_, total) =
        OficioRepo::list(&pool, &search("27999"), page(1, 10), "fecha_ingreso", SortOrder::Asc)
            .await
            .unwrap();
    assert_eq!(total, 1);

    // Shared nombre matches both rows.
    let (_, total) =
        OficioRepo::list(&pool, &search("marta"), page(1, 10), "fecha_ingreso", SortOrder::Asc)
            .await
            .unwrap();
    assert_eq!(total, 2);

    let (_, total) =
        OficioRepo::list(&pool, &search("inexistente"), page(1, 10), "fecha_ingreso", SortOrder::Asc)
            .await
            .unwrap();
    assert_eq!(total, 0);
}

// ---------------------------------------------------------------------------
// Test: Date range bounds are inclusive
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_oficios_date_range_inclusive(pool: PgPool) {
    for (n, day) in [(1, 10), (2, 15), (3, 20)] {
        let mut input = new_oficio(&format!("EXP-D-00{n}"));
        input.fecha_ingreso = Some(ts(day, 12));
        OficioRepo::create(&pool, &input).await.unwrap();
    }

    let filter = OficioFilter {
        fecha_desde: Some(ts(10, 12)),
        fecha_hasta: Some(ts(15, 12)),
        ..Default::default()
    };
    let (items, total) = OficioRepo::list(&pool, &filter, page(1, 10), "fecha_ingreso", SortOrder::Asc)
        .await
        .unwrap();
    assert_eq!(total, 2, "Both boundary rows are inside the range");
    assert_eq!(items[0].numero_expediente, "EXP-D-001");
    assert_eq!(items[1].numero_expediente, "EXP-D-002");
}

// ---------------------------------------------------------------------------
// Test: Sort direction
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_oficios_sort_desc(pool: PgPool) {
    for n in 1..=3 {
        OficioRepo::create(&pool, &new_oficio(&format!("EXP-S-00{n}")))
            .await
            .unwrap();
    }

    let (items, _) = OficioRepo::list(
        &pool,
        &OficioFilter::default(),
        page(1, 10),
        "numero_expediente",
        SortOrder::Desc,
    )
    .await
    .unwrap();
    assert_eq!(items[0].numero_expediente, "EXP-S-003");
    assert_eq!(items[2].numero_expediente, "EXP-S-001");
}

// ---------------------------------------------------------------------------
// Test: Cita listings
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_citas_filters_and_id_tiebreak(pool: PgPool) {
    let pa = PeritoRepo::create(&pool, &new_perito("MAT-C-1", "Aguirre"))
        .await
        .unwrap();
    let pb = PeritoRepo::create(&pool, &new_perito("MAT-C-2", "Bravo"))
        .await
        .unwrap();
    let mut oa = new_oficio("EXP-C-001");
    oa.perito_id = Some(pa.id);
    let oa = OficioRepo::create(&pool, &oa).await.unwrap();
    let mut ob = new_oficio("EXP-C-002");
    ob.perito_id = Some(pb.id);
    let ob = OficioRepo::create(&pool, &ob).await.unwrap();

    // Identical windows on different peritos; id breaks the tie.
    let c1 = match CitaRepo::create_checked(&pool, &new_cita(oa.id, pa.id, ts(3, 10), ts(3, 11)))
        .await
        .unwrap()
    {
        peritos_db::models::cita::ScheduleOutcome::Scheduled(c) => c,
        other => panic!("expected scheduled, got {other:?}"),
    };
    let c2 = match CitaRepo::create_checked(&pool, &new_cita(ob.id, pb.id, ts(3, 10), ts(3, 11)))
        .await
        .unwrap()
    {
        peritos_db::models::cita::ScheduleOutcome::Scheduled(c) => c,
        other => panic!("expected scheduled, got {other:?}"),
    };

    let (items, total) = CitaRepo::list(
        &pool,
        &CitaFilter::default(),
        page(1, 10),
        "fecha_inicio",
        SortOrder::Asc,
    )
    .await
    .unwrap();
    assert_eq!(total, 2);
    assert_eq!(items[0].id, c1.id, "Equal fecha_inicio falls back to id order");
    assert_eq!(items[1].id, c2.id);

    // Filter by perito narrows to their bookings.
    let (items, total) = CitaRepo::list(
        &pool,
        &CitaFilter {
            perito_id: Some(pb.id),
            ..Default::default()
        },
        page(1, 10),
        "fecha_inicio",
        SortOrder::Asc,
    )
    .await
    .unwrap();
    assert_eq!(total, 1);
    assert_eq!(items[0].id, c2.id);

    // Filter by oficio.
    let (items, _) = CitaRepo::list(
        &pool,
        &CitaFilter {
            oficio_id: Some(oa.id),
            ..Default::default()
        },
        page(1, 10),
        "fecha_inicio",
        SortOrder::Asc,
    )
    .await
    .unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].id, c1.id);
}

// ---------------------------------------------------------------------------
// Test: Perito flag filters
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_peritos_list_flags(pool: PgPool) {
    let libre = PeritoRepo::create(&pool, &new_perito("MAT-P-1", "Aguirre"))
        .await
        .unwrap();

    let mut ocupado = new_perito("MAT-P-2", "Bravo");
    ocupado.disponible = Some(false);
    PeritoRepo::create(&pool, &ocupado).await.unwrap();

    let baja = PeritoRepo::create(&pool, &new_perito("MAT-P-3", "Cruz"))
        .await
        .unwrap();
    assert!(PeritoRepo::deactivate(&pool, baja.id).await.unwrap());

    let todos = PeritoRepo::list(&pool, None, None).await.unwrap();
    assert_eq!(todos.len(), 3);
    // Listing orders by apellido.
    assert_eq!(todos[0].apellido, "Aguirre");
    assert_eq!(todos[2].apellido, "Cruz");
    assert!(todos.iter().all(|p| p.casos_asignados == 0));

    let activos = PeritoRepo::list(&pool, Some(true), None).await.unwrap();
    assert_eq!(activos.len(), 2);

    let disponibles = PeritoRepo::list(&pool, Some(true), Some(true)).await.unwrap();
    assert_eq!(disponibles.len(), 1);
    assert_eq!(disponibles[0].id, libre.id);

    // Deactivation is one-way through this method.
    assert!(!PeritoRepo::deactivate(&pool, baja.id).await.unwrap());
}
