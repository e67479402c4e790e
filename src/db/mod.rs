use sqlx::PgPool;
use std::env;

use crate::errors::AppError;
use crate::models::usuario::Usuario;

pub async fn create_pool() -> PgPool {
    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    PgPool::connect(&database_url)
        .await
        .expect("Failed to connect to the database")
}

/// Busqueda por cedula en el directorio. Todos los handlers pasan por aqui
/// para que el error de base de datos quede registrado una sola vez.
pub async fn buscar_usuario(pool: &PgPool, cedula: i64) -> Result<Option<Usuario>, AppError> {
    sqlx::query_as::<_, Usuario>(r#"SELECT * FROM usuarios WHERE "CEDULA" = $1"#)
        .bind(cedula)
        .fetch_optional(pool)
        .await
        .map_err(|err| {
            log::error!("Error de base de datos al buscar la cédula {}: {:?}", cedula, err);
            AppError::from(err)
        })
}
