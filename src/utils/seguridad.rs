use argon2::{
    password_hash::{PasswordHash, PasswordHasher, SaltString},
    Argon2, PasswordVerifier,
};

use crate::errors::AppError;

/// Catalogo fijo de preguntas de seguridad: identificador almacenado y texto
/// que se muestra al usuario.
pub const PREGUNTAS_SEGURIDAD: [(&str, &str); 4] = [
    ("mascota", "Nombre de tu mascota"),
    ("fecha", "Una fecha importante"),
    ("palabra", "Una palabra secreta"),
    ("numero", "Un número secreto"),
];

pub fn texto_pregunta(id: &str) -> Option<&'static str> {
    PREGUNTAS_SEGURIDAD
        .iter()
        .find(|(clave, _)| *clave == id)
        .map(|(_, texto)| *texto)
}

pub fn es_pregunta_valida(id: &str) -> bool {
    texto_pregunta(id).is_some()
}

/// Hash Argon2id con sal aleatoria; la columna `CLAVE` solo guarda el hash.
pub fn hash_clave(clave: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut rand::thread_rng());
    Argon2::default()
        .hash_password(clave.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AppError::InternalServerError("Error interno del servidor".to_string()))
}

pub fn verificar_clave(clave: &str, hash_almacenado: &str) -> bool {
    match PasswordHash::new(hash_almacenado) {
        Ok(hash) => Argon2::default()
            .verify_password(clave.as_bytes(), &hash)
            .is_ok(),
        Err(_) => false,
    }
}

/// Politica para contraseñas nuevas: minimo ocho caracteres, al menos una
/// letra y al menos un digito.
pub fn validar_politica_clave(clave: &str) -> Result<(), AppError> {
    let tiene_letra = clave.chars().any(|c| c.is_alphabetic());
    let tiene_digito = clave.chars().any(|c| c.is_ascii_digit());
    if clave.chars().count() < 8 || !tiene_letra || !tiene_digito {
        return Err(AppError::BadRequest(
            "La contraseña debe tener al menos 8 caracteres, una letra y un número".to_string(),
        ));
    }
    Ok(())
}

/// Comparacion de respuestas de seguridad, insensible a mayusculas y a
/// espacios en los extremos.
pub fn respuesta_coincide(respuesta: &str, almacenada: &str) -> bool {
    respuesta.trim().to_lowercase() == almacenada.trim().to_lowercase()
}
