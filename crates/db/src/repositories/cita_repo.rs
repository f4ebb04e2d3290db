//! Repository for the `citas` table, including the agenda conflict scan.
//!
//! Conflict-checked writes (`create_checked`, `update_checked`) run check
//! and write inside one transaction, taking a `FOR UPDATE` lock on the
//! perito row first so concurrent bookings for the same perito serialize
//! instead of racing past each other's scans.

use peritos_core::cita;
use peritos_core::pagination::{PageParams, SortOrder};
use peritos_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::cita::{Cita, CitaFilter, CreateCita, ScheduleOutcome, UpdateCita};
use crate::repositories::PeritoRepo;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, titulo, descripcion, fecha_inicio, fecha_fin, ubicacion, tipo, \
                        estado, oficio_id, perito_id, recordatorio_24h, recordatorio_1h, \
                        notificado_24h, notificado_1h, created_at, updated_at";

/// `IN (...)` list of estados that reserve the perito's time, quoted for
/// interpolation into query strings. Values come from the domain catalogue,
/// never from caller input.
fn blocking_list() -> String {
    cita::BLOCKING_ESTADOS
        .iter()
        .map(|e| format!("'{e}'"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Build the conflict scan query.
///
/// The three-way inclusive comparison is the documented agenda contract
/// (mirrored in `peritos_core::agenda::ranges_overlap`): boundaries touch,
/// boundaries conflict. Keep the SQL and the Rust mirror in sync.
fn conflict_query(exclude: bool) -> String {
    let blocking = blocking_list();
    let exclude_clause = if exclude { "AND id != $4" } else { "" };
    format!(
        "SELECT {COLUMNS} FROM citas \
         WHERE perito_id = $1 \
           AND estado IN ({blocking}) \
           {exclude_clause} \
           AND ((fecha_inicio <= $2 AND $2 <= fecha_fin) \
             OR (fecha_inicio <= $3 AND $3 <= fecha_fin) \
             OR ($2 <= fecha_inicio AND fecha_fin <= $3)) \
         ORDER BY fecha_inicio ASC \
         LIMIT 1"
    )
}

/// Provides CRUD operations for citas.
pub struct CitaRepo;

impl CitaRepo {
    /// Find the first blocking cita overlapping `[inicio, fin]` for the
    /// perito, optionally excluding one cita id (so an update never
    /// conflicts with the row being updated). Read-only probe backing
    /// `GET /citas/disponibilidad`.
    pub async fn find_conflict(
        pool: &PgPool,
        perito_id: DbId,
        inicio: Timestamp,
        fin: Timestamp,
        excluir: Option<DbId>,
    ) -> Result<Option<Cita>, sqlx::Error> {
        Self::find_conflict_on(pool, perito_id, inicio, fin, excluir).await
    }

    /// Conflict scan against any executor; the transactional writers pass
    /// their open transaction so the scan sees locked state.
    async fn find_conflict_on<'e, E>(
        executor: E,
        perito_id: DbId,
        inicio: Timestamp,
        fin: Timestamp,
        excluir: Option<DbId>,
    ) -> Result<Option<Cita>, sqlx::Error>
    where
        E: sqlx::Executor<'e, Database = sqlx::Postgres>,
    {
        let query = conflict_query(excluir.is_some());
        let mut q = sqlx::query_as::<_, Cita>(&query)
            .bind(perito_id)
            .bind(inicio)
            .bind(fin);
        if let Some(id) = excluir {
            q = q.bind(id);
        }
        q.fetch_optional(executor).await
    }

    /// Book a cita, checking the perito's agenda first.
    ///
    /// Check and insert share one transaction behind the perito row lock,
    /// so two concurrent bookings cannot both pass the scan. On conflict
    /// nothing is written and the blocking cita is returned.
    pub async fn create_checked(
        pool: &PgPool,
        input: &CreateCita,
    ) -> Result<ScheduleOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;

        if !PeritoRepo::lock_row(&mut tx, input.perito_id).await? {
            return Err(sqlx::Error::RowNotFound);
        }

        if let Some(conflicto) = Self::find_conflict_on(
            &mut *tx,
            input.perito_id,
            input.fecha_inicio,
            input.fecha_fin,
            None,
        )
        .await?
        {
            tx.rollback().await?;
            return Ok(ScheduleOutcome::Conflict(conflicto));
        }

        let query = format!(
            "INSERT INTO citas \
                 (titulo, descripcion, fecha_inicio, fecha_fin, ubicacion, tipo, \
                  oficio_id, perito_id, recordatorio_24h, recordatorio_1h) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, \
                     COALESCE($9, TRUE), COALESCE($10, FALSE)) \
             RETURNING {COLUMNS}"
        );
        let cita = sqlx::query_as::<_, Cita>(&query)
            .bind(&input.titulo)
            .bind(&input.descripcion)
            .bind(input.fecha_inicio)
            .bind(input.fecha_fin)
            .bind(&input.ubicacion)
            .bind(&input.tipo)
            .bind(input.oficio_id)
            .bind(input.perito_id)
            .bind(input.recordatorio_24h)
            .bind(input.recordatorio_1h)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(ScheduleOutcome::Scheduled(cita))
    }

    /// Update a cita. When the effective perito or time range changes, the
    /// agenda is re-checked (excluding this cita's own id) under the same
    /// transaction-plus-lock regime as `create_checked`.
    ///
    /// Returns `None` if no row with the given `id` exists. Estado is not
    /// touched here; it has its own endpoint.
    pub async fn update_checked(
        pool: &PgPool,
        id: DbId,
        input: &UpdateCita,
    ) -> Result<Option<ScheduleOutcome>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let select = format!("SELECT {COLUMNS} FROM citas WHERE id = $1");
        let Some(current) = sqlx::query_as::<_, Cita>(&select)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };

        let perito_id = input.perito_id.unwrap_or(current.perito_id);
        let inicio = input.fecha_inicio.unwrap_or(current.fecha_inicio);
        let fin = input.fecha_fin.unwrap_or(current.fecha_fin);

        let reschedules = perito_id != current.perito_id
            || inicio != current.fecha_inicio
            || fin != current.fecha_fin;

        if reschedules {
            if !PeritoRepo::lock_row(&mut tx, perito_id).await? {
                return Err(sqlx::Error::RowNotFound);
            }
            if let Some(conflicto) =
                Self::find_conflict_on(&mut *tx, perito_id, inicio, fin, Some(id)).await?
            {
                tx.rollback().await?;
                return Ok(Some(ScheduleOutcome::Conflict(conflicto)));
            }
        }

        let update = format!(
            "UPDATE citas SET
                titulo = COALESCE($2, titulo),
                descripcion = COALESCE($3, descripcion),
                fecha_inicio = COALESCE($4, fecha_inicio),
                fecha_fin = COALESCE($5, fecha_fin),
                ubicacion = COALESCE($6, ubicacion),
                tipo = COALESCE($7, tipo),
                oficio_id = COALESCE($8, oficio_id),
                perito_id = COALESCE($9, perito_id),
                recordatorio_24h = COALESCE($10, recordatorio_24h),
                recordatorio_1h = COALESCE($11, recordatorio_1h)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let cita = sqlx::query_as::<_, Cita>(&update)
            .bind(id)
            .bind(&input.titulo)
            .bind(&input.descripcion)
            .bind(input.fecha_inicio)
            .bind(input.fecha_fin)
            .bind(&input.ubicacion)
            .bind(&input.tipo)
            .bind(input.oficio_id)
            .bind(input.perito_id)
            .bind(input.recordatorio_24h)
            .bind(input.recordatorio_1h)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(ScheduleOutcome::Scheduled(cita)))
    }

    /// Find a cita by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Cita>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM citas WHERE id = $1");
        sqlx::query_as::<_, Cita>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List citas matching `filter`, windowed per `params` and sorted by
    /// `sort_column` (whitelisted by the caller) with `id` as the stable
    /// tiebreak. Returns the page rows plus the total match count.
    pub async fn list(
        pool: &PgPool,
        filter: &CitaFilter,
        params: PageParams,
        sort_column: &str,
        order: SortOrder,
    ) -> Result<(Vec<Cita>, i64), sqlx::Error> {
        // Build the WHERE clause and track the next bind parameter index.
        let mut conditions: Vec<String> = Vec::new();
        let mut bind_idx: u32 = 1;

        if filter.perito_id.is_some() {
            conditions.push(format!("perito_id = ${bind_idx}"));
            bind_idx += 1;
        }
        if filter.oficio_id.is_some() {
            conditions.push(format!("oficio_id = ${bind_idx}"));
            bind_idx += 1;
        }
        if filter.tipo.is_some() {
            conditions.push(format!("tipo = ${bind_idx}"));
            bind_idx += 1;
        }
        if filter.estado.is_some() {
            conditions.push(format!("estado = ${bind_idx}"));
            bind_idx += 1;
        }
        if filter.fecha_desde.is_some() {
            conditions.push(format!("fecha_inicio >= ${bind_idx}"));
            bind_idx += 1;
        }
        if filter.fecha_hasta.is_some() {
            conditions.push(format!("fecha_inicio <= ${bind_idx}"));
            bind_idx += 1;
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let count_query = format!("SELECT COUNT(*) FROM citas {where_clause}");
        let mut cq = sqlx::query_scalar::<_, i64>(&count_query);
        if let Some(perito_id) = filter.perito_id {
            cq = cq.bind(perito_id);
        }
        if let Some(oficio_id) = filter.oficio_id {
            cq = cq.bind(oficio_id);
        }
        if let Some(tipo) = &filter.tipo {
            cq = cq.bind(tipo);
        }
        if let Some(estado) = &filter.estado {
            cq = cq.bind(estado);
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
            "SELECT {COLUMNS} FROM citas \
             {where_clause} \
             ORDER BY {sort_column} {sort_dir}, id ASC \
             LIMIT ${bind_idx} OFFSET ${}",
            bind_idx + 1,
        );
        let mut rq = sqlx::query_as::<_, Cita>(&rows_query);
        if let Some(perito_id) = filter.perito_id {
            rq = rq.bind(perito_id);
        }
        if let Some(oficio_id) = filter.oficio_id {
            rq = rq.bind(oficio_id);
        }
        if let Some(tipo) = &filter.tipo {
            rq = rq.bind(tipo);
        }
        if let Some(estado) = &filter.estado {
            rq = rq.bind(estado);
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

    /// Citas starting within the next `horas` hours with a blocking
    /// estado, soonest first.
    pub async fn proximas(pool: &PgPool, horas: i64) -> Result<Vec<Cita>, sqlx::Error> {
        let blocking = blocking_list();
        let query = format!(
            "SELECT {COLUMNS} FROM citas \
             WHERE estado IN ({blocking}) \
               AND fecha_inicio >= NOW() \
               AND fecha_inicio <= NOW() + $1 * INTERVAL '1 hour' \
             ORDER BY fecha_inicio ASC, id ASC"
        );
        sqlx::query_as::<_, Cita>(&query)
            .bind(horas)
            .fetch_all(pool)
            .await
    }

    /// Change estado. The caller has already validated the value; no
    /// conflict re-check happens here even when the cita re-enters a
    /// blocking estado (long-standing behaviour, kept on purpose).
    pub async fn set_estado(
        pool: &PgPool,
        id: DbId,
        estado: &str,
    ) -> Result<Option<Cita>, sqlx::Error> {
        let query = format!(
            "UPDATE citas SET estado = $2 WHERE id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Cita>(&query)
            .bind(id)
            .bind(estado)
            .fetch_optional(pool)
            .await
    }

    /// Delete a cita. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM citas WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Flip the 24-hour sent marker to TRUE. One-way: neither the update
    /// DTO nor any repository method ever resets it. Returns `true` only
    /// on the first call for a given cita.
    pub async fn mark_notificado_24h(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE citas SET notificado_24h = TRUE WHERE id = $1 AND notificado_24h = FALSE",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Flip the 1-hour sent marker to TRUE. Same one-way contract as
    /// [`Self::mark_notificado_24h`].
    pub async fn mark_notificado_1h(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE citas SET notificado_1h = TRUE WHERE id = $1 AND notificado_1h = FALSE",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
