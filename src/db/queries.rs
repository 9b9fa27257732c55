//! Postgres queries against the managed backend

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::warn;

use crate::error::Result;
use crate::models::{Excursion, ExcursionRow, Location, LocationId, LocationRow, PackageRow, TravelPackage};
use crate::pricing::{RouteDetails, RouteDetailsRow};

use super::Backend;

const EXCURSION_COLUMNS: &str = r#"
    e.id::text AS id,
    to_jsonb(e) ->> 'titulo' AS titulo,
    e.titulo_es, e.titulo_en, e.titulo_fr,
    to_jsonb(e) ->> 'descripcion' AS descripcion,
    e.descripcion_es, e.descripcion_en, e.descripcion_fr,
    e.ubicacion,
    e.precio::numeric AS precio,
    e.precio_por_pax::numeric AS precio_por_pax,
    e.min_pax::int4 AS min_pax,
    e.max_pax::int4 AS max_pax,
    e.precio_por_pax_nivel2::numeric AS precio_por_pax_nivel2,
    e.umbral_nivel2::int4 AS umbral_nivel2,
    e.imagen_url,
    to_jsonb(e) ->> 'duracion' AS duracion,
    to_jsonb(e) ->> 'hr_salida' AS hr_salida
"#;

const PACKAGE_COLUMNS: &str = r#"
    p.id::text AS id,
    to_jsonb(p) ->> 'nombre' AS nombre,
    p.nombre_es, p.nombre_en, p.nombre_fr,
    p.descripcion_es, p.descripcion_en, p.descripcion_fr,
    p.region,
    p.precio::numeric AS precio,
    p.duracion_dias::int4 AS duracion_dias,
    p.duracion_noches::int4 AS duracion_noches,
    p.imagen_url,
    p.incluye_es, p.incluye_en, p.incluye_fr,
    p.destinos_es, p.destinos_en, p.destinos_fr,
    p.activo,
    p.orden::int4 AS orden
"#;

// Location ids are int4 in the database; the function takes integer arguments
const ROUTE_DETAILS_SQL: &str = r#"
    SELECT
        distancia_km::numeric AS distancia_km,
        tiempo_min::numeric AS tiempo_min,
        precio::numeric AS precio
    FROM calculate_reservation_details(p_id_origen => $1::int4, p_id_destino => $2::int4)
    LIMIT 1
"#;

/// Backend backed by a Postgres connection pool
#[derive(Clone)]
pub struct PgBackend {
    pool: PgPool,
}

impl PgBackend {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a small pool; the core issues few, short reads
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn excursions_from(&self, relation: &str, location: &str) -> Result<Vec<Excursion>> {
        let sql = format!(
            "SELECT {} FROM {} e WHERE e.ubicacion = $1 ORDER BY e.titulo_es",
            EXCURSION_COLUMNS, relation
        );
        let rows = sqlx::query_as::<_, ExcursionRow>(&sql)
            .bind(location.trim())
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Excursion::from).collect())
    }

    async fn packages_from(&self, relation: &str) -> Result<Vec<TravelPackage>> {
        let sql = format!(
            "SELECT {} FROM {} p WHERE p.activo = true ORDER BY p.orden",
            PACKAGE_COLUMNS, relation
        );
        let rows = sqlx::query_as::<_, PackageRow>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(TravelPackage::from).collect())
    }
}

/// Run `optimized`; if its relation does not exist, run `fallback` instead
async fn with_view_fallback<T, O, F>(what: &str, optimized: O, fallback: F) -> Result<T>
where
    O: std::future::Future<Output = Result<T>>,
    F: std::future::Future<Output = Result<T>>,
{
    match optimized.await {
        Err(e) if e.is_missing_relation() => {
            warn!("Read view for {} unavailable, falling back to base table: {}", what, e);
            fallback.await
        }
        other => other,
    }
}

#[async_trait]
impl Backend for PgBackend {
    async fn fetch_locations(&self) -> Result<Vec<Location>> {
        let rows = sqlx::query_as::<_, LocationRow>(
            r#"
            SELECT id::int8 AS id, nombre, codigo, region, tipo, provincia
            FROM ubicaciones_cuba
            ORDER BY nombre ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Location::from).collect())
    }

    async fn search_locations(&self, query: &str, limit: i64) -> Result<Vec<Location>> {
        let rows = sqlx::query_as::<_, LocationRow>(
            r#"
            SELECT id::int8 AS id, nombre, codigo, region, tipo, provincia
            FROM ubicaciones_cuba
            WHERE nombre ILIKE '%' || $1 || '%'
            ORDER BY nombre ASC
            LIMIT $2
            "#,
        )
        .bind(query)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Location::from).collect())
    }

    async fn route_details(
        &self,
        origin: LocationId,
        destination: LocationId,
    ) -> Result<Option<RouteDetails>> {
        let row = sqlx::query_as::<_, RouteDetailsRow>(ROUTE_DETAILS_SQL)
            .bind(origin)
            .bind(destination)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(RouteDetails::from))
    }

    async fn excursion_locations(&self) -> Result<Vec<String>> {
        let locations: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT DISTINCT ubicacion
            FROM excursiones
            WHERE ubicacion IS NOT NULL
            ORDER BY ubicacion
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(locations)
    }

    async fn fetch_excursions(&self, location: &str) -> Result<Vec<Excursion>> {
        with_view_fallback(
            "excursions",
            self.excursions_from("excursiones_publicas", location),
            self.excursions_from("excursiones", location),
        )
        .await
    }

    async fn fetch_active_packages(&self) -> Result<Vec<TravelPackage>> {
        with_view_fallback(
            "packages",
            self.packages_from("paquetes_activos"),
            self.packages_from("paquetes_viaje"),
        )
        .await
    }
}
