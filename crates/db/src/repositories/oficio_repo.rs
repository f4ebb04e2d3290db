//! Repository for the `oficios` table.

use chrono::Utc;
use peritos_core::oficio::{DEFAULT_PRIORIDAD, ESTADO_ASIGNADO, ESTADO_PENDIENTE};
use peritos_core::pagination::{PageParams, SortOrder};
use peritos_core::types::DbId;
use sqlx::PgPool;

use crate::models::oficio::{CreateOficio, Oficio, OficioFilter, UpdateOficio};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, numero_expediente, solicitante_nombre, solicitante_apellido, \
                        solicitante_dni, solicitante_telefono, solicitante_email, \
                        tipo_peritaje, descripcion, fecha_ingreso, fecha_asignacion, \
                        fecha_audiencia, fecha_vencimiento, estado, prioridad, perito_id, \
                        observaciones, created_at, updated_at";

/// Provides CRUD operations for oficios.
pub struct OficioRepo;

impl OficioRepo {
    /// Insert a new oficio, returning the created row.
    ///
    /// When `perito_id` is present the oficio starts out ASIGNADO with
    /// `fecha_asignacion` stamped (create-and-assign); otherwise it starts
    /// PENDIENTE. The caller is responsible for checking that the perito
    /// exists and is activo.
    pub async fn create(pool: &PgPool, input: &CreateOficio) -> Result<Oficio, sqlx::Error> {
        let estado = if input.perito_id.is_some() {
            ESTADO_ASIGNADO
        } else {
            ESTADO_PENDIENTE
        };
        let fecha_asignacion = input.perito_id.map(|_| Utc::now());

        let query = format!(
            "INSERT INTO oficios \
                 (numero_expediente, solicitante_nombre, solicitante_apellido, \
                  solicitante_dni, solicitante_telefono, solicitante_email, \
                  tipo_peritaje, descripcion, fecha_ingreso, fecha_audiencia, \
                  fecha_vencimiento, estado, prioridad, perito_id, fecha_asignacion, \
                  observaciones) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, COALESCE($9, NOW()), $10, $11, \
                     $12, COALESCE($13, '{DEFAULT_PRIORIDAD}'), $14, $15, $16) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Oficio>(&query)
            .bind(&input.numero_expediente)
            .bind(&input.solicitante_nombre)
            .bind(&input.solicitante_apellido)
            .bind(&input.solicitante_dni)
            .bind(&input.solicitante_telefono)
            .bind(&input.solicitante_email)
            .bind(&input.tipo_peritaje)
            .bind(&input.descripcion)
            .bind(input.fecha_ingreso)
            .bind(input.fecha_audiencia)
            .bind(input.fecha_vencimiento)
            .bind(estado)
            .bind(&input.prioridad)
            .bind(input.perito_id)
            .bind(fecha_asignacion)
            .bind(&input.observaciones)
            .fetch_one(pool)
            .await
    }

    /// Find an oficio by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Oficio>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM oficios WHERE id = $1");
        sqlx::query_as::<_, Oficio>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List oficios matching `filter`, windowed per `params` and sorted by
    /// `sort_column` (whitelisted by the caller) with `id` as the stable
    /// tiebreak. Returns the page rows plus the total match count.
    pub async fn list(
        pool: &PgPool,
        filter: &OficioFilter,
        params: PageParams,
        sort_column: &str,
        order: SortOrder,
    ) -> Result<(Vec<Oficio>, i64), sqlx::Error> {
        // Build the WHERE clause and track the next bind parameter index.
        let mut conditions: Vec<String> = Vec::new();
        let mut bind_idx: u32 = 1;

        if filter.estado.is_some() {
            conditions.push(format!("estado = ${bind_idx}"));
            bind_idx += 1;
        }
        if filter.prioridad.is_some() {
            conditions.push(format!("prioridad = ${bind_idx}"));
            bind_idx += 1;
        }
        if filter.perito_id.is_some() {
            conditions.push(format!("perito_id = ${bind_idx}"));
            bind_idx += 1;
        }
        if filter.tipo_peritaje.is_some() {
            conditions.push(format!("tipo_peritaje ILIKE ${bind_idx}"));
            bind_idx += 1;
        }
        if filter.busqueda.is_some() {
            // One bound pattern checked against every searchable column.
            conditions.push(format!(
                "(numero_expediente ILIKE ${bind_idx} \
                  OR solicitante_nombre ILIKE ${bind_idx} \
                  OR solicitante_apellido ILIKE ${bind_idx} \
                  OR solicitante_dni ILIKE ${bind_idx})"
            ));
            bind_idx += 1;
        }
        if filter.fecha_desde.is_some() {
            conditions.push(format!("fecha_ingreso >= ${bind_idx}"));
            bind_idx += 1;
        }
        if filter.fecha_hasta.is_some() {
            conditions.push(format!("fecha_ingreso <= ${bind_idx}"));
            bind_idx += 1;
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let tipo_pattern = filter.tipo_peritaje.as_ref().map(|t| format!("%{t}%"));
        let busqueda_pattern = filter.busqueda.as_ref().map(|b| format!("%{b}%"));

        // Total before windowing; both queries bind the filters in the
        // same order.
        let count_query = format!("SELECT COUNT(*) FROM oficios {where_clause}");
        let mut cq = sqlx::query_scalar::<_, i64>(&count_query);
        if let Some(estado) = &filter.estado {
            cq = cq.bind(estado);
        }
        if let Some(prioridad) = &filter.prioridad {
            cq = cq.bind(prioridad);
        }
        if let Some(perito_id) = filter.perito_id {
            cq = cq.bind(perito_id);
        }
        if let Some(pattern) = &tipo_pattern {
            cq = cq.bind(pattern);
        }
        if let Some(pattern) = &busqueda_pattern {
            cq = cq.bind(pattern);
        }
        if let Some(desde) = filter.fecha_desde {
            cq = cq.bind(desde);
        }
        if let Some(hasta) = filter.fecha_hasta {
            cq = cq.bind(hasta);
        }
        let total = cq.fetch_one(pool).await?;

        let sort_dir = order.as_sql();
        let rows_query = format!(
            "SELECT {COLUMNS} FROM oficios \
             {where_clause} \
             ORDER BY {sort_column} {sort_dir}, id ASC \
             LIMIT ${bind_idx} OFFSET ${}",
            bind_idx + 1,
        );
        let mut rq = sqlx::query_as::<_, Oficio>(&rows_query);
        if let Some(estado) = &filter.estado {
            rq = rq.bind(estado);
        }
        if let Some(prioridad) = &filter.prioridad {
            rq = rq.bind(prioridad);
        }
        if let Some(perito_id) = filter.perito_id {
            rq = rq.bind(perito_id);
        }
        if let Some(pattern) = &tipo_pattern {
            rq = rq.bind(pattern);
        }
        if let Some(pattern) = &busqueda_pattern {
            rq = rq.bind(pattern);
        }
        if let Some(desde) = filter.fecha_desde {
            rq = rq.bind(desde);
        }
        if let Some(hasta) = filter.fecha_hasta {
            rq = rq.bind(hasta);
        }
        rq = rq.bind(params.limit).bind(params.offset());
        let items = rq.fetch_all(pool).await?;

        Ok((items, total))
    }

    /// Update an oficio. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateOficio,
    ) -> Result<Option<Oficio>, sqlx::Error> {
        let query = format!(
            "UPDATE oficios SET
                numero_expediente = COALESCE($2, numero_expediente),
                solicitante_nombre = COALESCE($3, solicitante_nombre),
                solicitante_apellido = COALESCE($4, solicitante_apellido),
                solicitante_dni = COALESCE($5, solicitante_dni),
                solicitante_telefono = COALESCE($6, solicitante_telefono),
                solicitante_email = COALESCE($7, solicitante_email),
                tipo_peritaje = COALESCE($8, tipo_peritaje),
                descripcion = COALESCE($9, descripcion),
                fecha_audiencia = COALESCE($10, fecha_audiencia),
                fecha_vencimiento = COALESCE($11, fecha_vencimiento),
                prioridad = COALESCE($12, prioridad),
                observaciones = COALESCE($13, observaciones)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Oficio>(&query)
            .bind(id)
            .bind(&input.numero_expediente)
            .bind(&input.solicitante_nombre)
            .bind(&input.solicitante_apellido)
            .bind(&input.solicitante_dni)
            .bind(&input.solicitante_telefono)
            .bind(&input.solicitante_email)
            .bind(&input.tipo_peritaje)
            .bind(&input.descripcion)
            .bind(input.fecha_audiencia)
            .bind(input.fecha_vencimiento)
            .bind(&input.prioridad)
            .bind(&input.observaciones)
            .fetch_optional(pool)
            .await
    }

    /// Assign a perito to an oficio.
    ///
    /// A PENDIENTE oficio moves to ASIGNADO, and `fecha_asignacion` is
    /// stamped on first assignment only. Reassignment keeps the current
    /// estado and the original assignment date.
    pub async fn assign_perito(
        pool: &PgPool,
        id: DbId,
        perito_id: DbId,
    ) -> Result<Option<Oficio>, sqlx::Error> {
        let query = format!(
            "UPDATE oficios SET \
                perito_id = $2, \
                estado = CASE WHEN estado = '{ESTADO_PENDIENTE}' \
                              THEN '{ESTADO_ASIGNADO}' ELSE estado END, \
                fecha_asignacion = COALESCE(fecha_asignacion, NOW()) \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Oficio>(&query)
            .bind(id)
            .bind(perito_id)
            .fetch_optional(pool)
            .await
    }

    /// Change estado, optionally replacing observaciones. The caller has
    /// already validated the transition through the domain policy.
    pub async fn set_estado(
        pool: &PgPool,
        id: DbId,
        estado: &str,
        observaciones: Option<&str>,
    ) -> Result<Option<Oficio>, sqlx::Error> {
        let query = format!(
            "UPDATE oficios SET estado = $2, observaciones = COALESCE($3, observaciones) \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Oficio>(&query)
            .bind(id)
            .bind(estado)
            .bind(observaciones)
            .fetch_optional(pool)
            .await
    }
}
