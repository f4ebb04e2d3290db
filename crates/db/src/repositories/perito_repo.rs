//! Repository for the `peritos` table.

use peritos_core::oficio;
use peritos_core::types::DbId;
use sqlx::PgPool;

use crate::models::perito::{CreatePerito, Perito, PeritoConCarga, UpdatePerito};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, nombre, apellido, matricula, especialidades, telefono, email, \
                        activo, disponible, created_at, updated_at";

/// Column list for carga queries (table-qualified, plus the derived
/// open-case counter). Terminal estados come from the domain catalogue so
/// the SQL cannot drift from the state machine.
fn columns_con_carga() -> String {
    let terminal = oficio::TERMINAL_ESTADOS
        .iter()
        .map(|e| format!("'{e}'"))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "p.id, p.nombre, p.apellido, p.matricula, p.especialidades, p.telefono, p.email, \
         p.activo, p.disponible, \
         (SELECT COUNT(*) FROM oficios o \
          WHERE o.perito_id = p.id AND o.estado NOT IN ({terminal})) AS casos_asignados, \
         p.created_at, p.updated_at"
    )
}

/// Provides CRUD operations for peritos.
pub struct PeritoRepo;

impl PeritoRepo {
    /// Insert a new perito, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreatePerito) -> Result<Perito, sqlx::Error> {
        let query = format!(
            "INSERT INTO peritos (nombre, apellido, matricula, especialidades, telefono, email, disponible)
             VALUES ($1, $2, $3, $4, $5, $6, COALESCE($7, TRUE))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Perito>(&query)
            .bind(&input.nombre)
            .bind(&input.apellido)
            .bind(&input.matricula)
            .bind(&input.especialidades)
            .bind(&input.telefono)
            .bind(&input.email)
            .bind(input.disponible)
            .fetch_one(pool)
            .await
    }

    /// Find a perito by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Perito>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM peritos WHERE id = $1");
        sqlx::query_as::<_, Perito>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a perito by ID including the derived open-case counter.
    pub async fn find_con_carga(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<PeritoConCarga>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM peritos p WHERE p.id = $1",
            columns_con_carga()
        );
        sqlx::query_as::<_, PeritoConCarga>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List peritos with the derived open-case counter.
    ///
    /// `activo` / `disponible` filter to the given value when present.
    pub async fn list(
        pool: &PgPool,
        activo: Option<bool>,
        disponible: Option<bool>,
    ) -> Result<Vec<PeritoConCarga>, sqlx::Error> {
        let mut conditions: Vec<String> = Vec::new();

        if activo.is_some() {
            conditions.push(format!("p.activo = ${}", conditions.len() + 1));
        }
        if disponible.is_some() {
            conditions.push(format!("p.disponible = ${}", conditions.len() + 1));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let query = format!(
            "SELECT {} FROM peritos p \
             {where_clause} \
             ORDER BY p.apellido ASC, p.nombre ASC, p.id ASC",
            columns_con_carga()
        );

        let mut q = sqlx::query_as::<_, PeritoConCarga>(&query);
        if let Some(flag) = activo {
            q = q.bind(flag);
        }
        if let Some(flag) = disponible {
            q = q.bind(flag);
        }

        q.fetch_all(pool).await
    }

    /// Update a perito. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdatePerito,
    ) -> Result<Option<Perito>, sqlx::Error> {
        let query = format!(
            "UPDATE peritos SET
                nombre = COALESCE($2, nombre),
                apellido = COALESCE($3, apellido),
                matricula = COALESCE($4, matricula),
                especialidades = COALESCE($5, especialidades),
                telefono = COALESCE($6, telefono),
                email = COALESCE($7, email),
                activo = COALESCE($8, activo),
                disponible = COALESCE($9, disponible)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Perito>(&query)
            .bind(id)
            .bind(&input.nombre)
            .bind(&input.apellido)
            .bind(&input.matricula)
            .bind(&input.especialidades)
            .bind(&input.telefono)
            .bind(&input.email)
            .bind(input.activo)
            .bind(input.disponible)
            .fetch_optional(pool)
            .await
    }

    /// Soft-delete a perito by setting `activo = false`.
    ///
    /// Existing oficios and citas keep their references; the perito just
    /// stops being assignable. Returns `true` if the row was updated.
    pub async fn deactivate(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("UPDATE peritos SET activo = false WHERE id = $1 AND activo = true")
                .bind(id)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Lock the perito row inside an open transaction (`SELECT ... FOR
    /// UPDATE`). Conflict-checked cita writes take this lock first, so two
    /// concurrent bookings for the same perito serialize and the second
    /// one's conflict scan sees the first one's row.
    ///
    /// Returns `false` when the perito does not exist.
    pub async fn lock_row(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let row: Option<(DbId,)> =
            sqlx::query_as("SELECT id FROM peritos WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut **tx)
                .await?;
        Ok(row.is_some())
    }
}
