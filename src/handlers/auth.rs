use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use validator::Validate;

use crate::db;
use crate::errors::AppError;
use crate::models::usuario::PerfilUsuario;
use crate::utils::seguridad;
use crate::utils::validation::{cedula_flexible, validate_payload};

#[derive(Deserialize, Validate)]
pub struct ValidarUsuarioRequest {
    #[serde(deserialize_with = "cedula_flexible")]
    username: i64,
    #[validate(length(min = 1, message = "Se requieren usuario y contraseña"))]
    password: String,
}

#[derive(Serialize)]
struct ValidarUsuarioResponse {
    valid: bool,
    #[serde(flatten)]
    perfil: PerfilUsuario,
    #[serde(rename = "requiresSecurityUpdate")]
    requires_security_update: bool,
}

/// Autenticacion por cedula y contraseña. La comparacion corre contra el
/// hash Argon2id almacenado; una cedula desconocida y una contraseña
/// incorrecta responden igual.
pub async fn validate_user(
    pool: web::Data<PgPool>,
    req: web::Json<ValidarUsuarioRequest>,
) -> Result<HttpResponse, AppError> {
    validate_payload(&req.0)?;

    let usuario = db::buscar_usuario(&pool, req.username)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Usuario o contraseña incorrectos".to_string()))?;

    let coincide = usuario
        .clave
        .as_deref()
        .map(|hash| seguridad::verificar_clave(&req.password, hash))
        .unwrap_or(false);
    if !coincide {
        return Err(AppError::Unauthorized("Usuario o contraseña incorrectos".to_string()));
    }

    Ok(HttpResponse::Ok().json(ValidarUsuarioResponse {
        valid: true,
        perfil: PerfilUsuario::from(&usuario),
        requires_security_update: usuario.pregunta_seguridad.is_none(),
    }))
}

#[derive(Deserialize, Validate)]
pub struct CambioClaveRequest {
    #[serde(rename = "CEDULA", deserialize_with = "cedula_flexible")]
    cedula: i64,
    #[serde(rename = "oldPassword")]
    #[validate(length(min = 1, message = "Se requiere la contraseña actual"))]
    old_password: String,
    #[serde(rename = "newPassword")]
    #[validate(
        length(min = 1, message = "Se requiere la nueva contraseña"),
        must_match(other = "confirm_password", message = "Las contraseñas no coinciden")
    )]
    new_password: String,
    #[serde(rename = "confirmPassword")]
    confirm_password: String,
}

/// Cambio de contraseña autenticado por la contraseña actual. Toda violacion
/// responde 400 sin tocar el estado almacenado.
pub async fn change_password(
    pool: web::Data<PgPool>,
    req: web::Json<CambioClaveRequest>,
) -> Result<HttpResponse, AppError> {
    validate_payload(&req.0)?;

    let usuario = db::buscar_usuario(&pool, req.cedula)
        .await?
        .ok_or_else(|| AppError::NotFound("Usuario no encontrado".to_string()))?;

    let hash_actual = usuario
        .clave
        .as_deref()
        .ok_or_else(|| AppError::BadRequest("La contraseña actual es incorrecta".to_string()))?;
    if !seguridad::verificar_clave(&req.old_password, hash_actual) {
        return Err(AppError::BadRequest("La contraseña actual es incorrecta".to_string()));
    }
    if seguridad::verificar_clave(&req.new_password, hash_actual) {
        return Err(AppError::BadRequest(
            "La nueva contraseña debe ser diferente a la actual".to_string(),
        ));
    }

    let nuevo_hash = seguridad::hash_clave(&req.new_password)?;
    sqlx::query(r#"UPDATE usuarios SET "CLAVE" = $1 WHERE "CEDULA" = $2"#)
        .bind(&nuevo_hash)
        .bind(req.cedula)
        .execute(pool.get_ref())
        .await
        .map_err(|err| {
            log::error!("Error al actualizar la contraseña: {:?}", err);
            AppError::from(err)
        })?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": "Contraseña actualizada correctamente"
    })))
}

fn validar_id_pregunta(id: &str) -> Result<(), validator::ValidationError> {
    if !seguridad::es_pregunta_valida(id) {
        let mut err = validator::ValidationError::new("pregunta_invalida");
        err.message = Some("Pregunta de seguridad inválida".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Deserialize, Validate)]
pub struct ActualizarPreguntaRequest {
    #[serde(deserialize_with = "cedula_flexible")]
    username: i64,
    #[serde(rename = "securityQuestion")]
    #[validate(custom = "validar_id_pregunta")]
    security_question: String,
    #[serde(rename = "securityAnswer")]
    #[validate(length(min = 1, message = "Se requiere la respuesta de seguridad"))]
    security_answer: String,
}

/// Guarda identificador de pregunta y respuesta como atributos separados,
/// sobrescribiendo cualquier valor anterior.
pub async fn update_security_question(
    pool: web::Data<PgPool>,
    req: web::Json<ActualizarPreguntaRequest>,
) -> Result<HttpResponse, AppError> {
    validate_payload(&req.0)?;

    db::buscar_usuario(&pool, req.username)
        .await?
        .ok_or_else(|| AppError::NotFound("Usuario no encontrado".to_string()))?;

    sqlx::query(
        r#"UPDATE usuarios SET "PREGUNTA_SEGURIDAD" = $1, "RESPUESTA_SEGURIDAD" = $2 WHERE "CEDULA" = $3"#,
    )
    .bind(&req.security_question)
    .bind(req.security_answer.trim())
    .bind(req.username)
    .execute(pool.get_ref())
    .await
    .map_err(|err| {
        log::error!("Error al actualizar la pregunta de seguridad: {:?}", err);
        AppError::from(err)
    })?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": "Pregunta de seguridad actualizada correctamente"
    })))
}

#[derive(Deserialize)]
pub struct PreguntaSeguridadRequest {
    #[serde(deserialize_with = "cedula_flexible")]
    username: i64,
}

/// Devuelve el texto de la pregunta configurada. Un identificador almacenado
/// fuera del catalogo, o una pregunta sin respuesta guardada, es dato
/// corrupto y responde 500.
pub async fn get_security_question(
    pool: web::Data<PgPool>,
    req: web::Json<PreguntaSeguridadRequest>,
) -> Result<HttpResponse, AppError> {
    let usuario = db::buscar_usuario(&pool, req.username)
        .await?
        .ok_or_else(|| AppError::NotFound("Usuario no encontrado".to_string()))?;

    let id_pregunta = usuario.pregunta_seguridad.as_deref().ok_or_else(|| {
        AppError::NotFound("Pregunta de seguridad no configurada".to_string())
    })?;

    if usuario.respuesta_seguridad.is_none() {
        log::error!(
            "Pregunta de seguridad sin respuesta almacenada para la cédula {}",
            req.username
        );
        return Err(AppError::InternalServerError("Error interno del servidor".to_string()));
    }

    let texto = seguridad::texto_pregunta(id_pregunta).ok_or_else(|| {
        log::error!(
            "Identificador de pregunta desconocido '{}' para la cédula {}",
            id_pregunta,
            req.username
        );
        AppError::InternalServerError("Error interno del servidor".to_string())
    })?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "securityQuestion": texto
    })))
}

#[derive(Deserialize, Validate)]
pub struct VerificarRespuestaRequest {
    #[serde(deserialize_with = "cedula_flexible")]
    username: i64,
    #[serde(rename = "securityAnswer")]
    #[validate(length(min = 1, message = "Se requiere la respuesta de seguridad"))]
    security_answer: String,
}

/// Compara la respuesta sin distinguir mayusculas. Una respuesta no
/// configurada nunca coincide.
pub async fn verify_security_answer(
    pool: web::Data<PgPool>,
    req: web::Json<VerificarRespuestaRequest>,
) -> Result<HttpResponse, AppError> {
    validate_payload(&req.0)?;

    let usuario = db::buscar_usuario(&pool, req.username)
        .await?
        .ok_or_else(|| AppError::NotFound("Usuario no encontrado".to_string()))?;

    let coincide = usuario
        .respuesta_seguridad
        .as_deref()
        .map(|almacenada| seguridad::respuesta_coincide(&req.security_answer, almacenada))
        .unwrap_or(false);

    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": coincide })))
}

#[derive(Deserialize)]
pub struct ResetClaveRequest {
    #[serde(deserialize_with = "cedula_flexible")]
    username: i64,
    #[serde(rename = "newPassword")]
    new_password: String,
}

/// Restablecimiento de contraseña tras el flujo de pregunta de seguridad.
///
/// Contrato en dos pasos: este endpoint NO verifica la respuesta de
/// seguridad; el cliente debe llamar antes a `/verify_security_answer` y
/// solo continuar si la verificacion fue positiva.
pub async fn reset_password(
    pool: web::Data<PgPool>,
    req: web::Json<ResetClaveRequest>,
) -> Result<HttpResponse, AppError> {
    seguridad::validar_politica_clave(&req.new_password)?;

    db::buscar_usuario(&pool, req.username)
        .await?
        .ok_or_else(|| AppError::NotFound("Usuario no encontrado".to_string()))?;

    let nuevo_hash = seguridad::hash_clave(&req.new_password)?;
    sqlx::query(r#"UPDATE usuarios SET "CLAVE" = $1 WHERE "CEDULA" = $2"#)
        .bind(&nuevo_hash)
        .bind(req.username)
        .execute(pool.get_ref())
        .await
        .map_err(|err| {
            log::error!("Error al restablecer la contraseña: {:?}", err);
            AppError::from(err)
        })?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": "Contraseña actualizada correctamente"
    })))
}
