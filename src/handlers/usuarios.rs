use actix_web::{web, HttpResponse};
use serde::Deserialize;
use sqlx::PgPool;

use crate::db;
use crate::errors::AppError;
use crate::models::usuario::{DetalleUsuario, PerfilUsuario, Usuario};
use crate::utils::validation::{cedula_de_parametro, parsear_cedula};

#[derive(Deserialize)]
pub struct ConsultaCedula {
    cedula: Option<String>,
}

/// Chequeo de identidad previo al formulario. El cuerpo llega como JSON
/// arbitrario porque el cliente envia la cedula como numero o como cadena.
pub async fn validate_cedula(
    pool: web::Data<PgPool>,
    body: web::Json<serde_json::Value>,
) -> Result<HttpResponse, AppError> {
    let valor = body
        .get("cedula")
        .ok_or_else(|| AppError::BadRequest("Se requiere la cédula".to_string()))?;
    let cedula = parsear_cedula(valor)
        .ok_or_else(|| AppError::BadRequest("La cédula debe ser un número válido".to_string()))?;

    match db::buscar_usuario(&pool, cedula).await? {
        Some(usuario) => {
            let mut respuesta = serde_json::to_value(PerfilUsuario::from(&usuario))
                .map_err(|_| AppError::InternalServerError("Error interno del servidor".to_string()))?;
            respuesta["valid"] = serde_json::Value::Bool(true);
            Ok(HttpResponse::Ok().json(respuesta))
        }
        None => Ok(HttpResponse::NotFound().json(serde_json::json!({
            "valid": false,
            "error": "Usuario no encontrado"
        }))),
    }
}

/// Perfil completo por cedula, usado por los flujos de evaluacion de lideres.
pub async fn get_user_details(
    pool: web::Data<PgPool>,
    consulta: web::Query<ConsultaCedula>,
) -> Result<HttpResponse, AppError> {
    let cedula = cedula_de_parametro(consulta.cedula.as_deref())?;

    let usuario = db::buscar_usuario(&pool, cedula)
        .await?
        .ok_or_else(|| AppError::NotFound("Usuario no encontrado".to_string()))?;

    Ok(HttpResponse::Ok().json(DetalleUsuario::from(&usuario)))
}

/// Subordinados directos de un lider: filas cuyo campo `LIDER` es la cedula
/// consultada. El lider mismo debe existir; cero subordinados es una lista
/// vacia, no un error.
pub async fn get_employees_under_leader(
    pool: web::Data<PgPool>,
    consulta: web::Query<ConsultaCedula>,
) -> Result<HttpResponse, AppError> {
    let cedula = cedula_de_parametro(consulta.cedula.as_deref())?;

    let lider = db::buscar_usuario(&pool, cedula)
        .await?
        .ok_or_else(|| AppError::NotFound("Líder no encontrado".to_string()))?;

    let subordinados = sqlx::query_as::<_, Usuario>(
        r#"SELECT * FROM usuarios WHERE "LIDER" = $1 ORDER BY "NOMBRE""#,
    )
    .bind(cedula)
    .fetch_all(pool.get_ref())
    .await
    .map_err(|err| {
        log::error!("Error al listar subordinados del líder {}: {:?}", cedula, err);
        AppError::from(err)
    })?;

    let empleados: Vec<DetalleUsuario> = subordinados.iter().map(DetalleUsuario::from).collect();

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "employees": empleados,
        "leader_info": DetalleUsuario::from(&lider)
    })))
}
