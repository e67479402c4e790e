use serde::{Deserialize, Deserializer};
use validator::Validate;

use crate::errors::AppError;

pub fn validate_payload<T: Validate>(payload: &T) -> Result<(), AppError> {
    payload
        .validate()
        .map_err(|err| AppError::BadRequest(err.to_string()))
}

// El formulario envia cedulas y años indistintamente como numero o como
// cadena, segun la pantalla de origen.
#[derive(Deserialize)]
#[serde(untagged)]
enum NumeroOCadena {
    Numero(i64),
    Cadena(String),
}

pub fn cedula_flexible<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    match NumeroOCadena::deserialize(deserializer)? {
        NumeroOCadena::Numero(n) => Ok(n),
        NumeroOCadena::Cadena(s) => s
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom("La cédula debe ser un número válido")),
    }
}

pub fn entero_flexible<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    match NumeroOCadena::deserialize(deserializer)? {
        NumeroOCadena::Numero(n) => i32::try_from(n)
            .map_err(|_| serde::de::Error::custom("Valor numérico fuera de rango")),
        NumeroOCadena::Cadena(s) => s
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom("Valor numérico inválido")),
    }
}

/// Extrae una cedula de un valor JSON que puede llegar como numero o cadena.
/// Los handlers la usan para los cuerpos `{cedula}`.
pub fn parsear_cedula(valor: &serde_json::Value) -> Option<i64> {
    match valor {
        serde_json::Value::Number(n) => n.as_i64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Valida el query param `cedula` con los mismos mensajes que los cuerpos
/// JSON.
pub fn cedula_de_parametro(crudo: Option<&str>) -> Result<i64, AppError> {
    let crudo = crudo.ok_or_else(|| AppError::BadRequest("Se requiere la cédula".to_string()))?;
    crudo
        .trim()
        .parse()
        .map_err(|_| AppError::BadRequest("La cédula debe ser un número válido".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parsear_cedula_acepta_numero_y_cadena() {
        assert_eq!(parsear_cedula(&serde_json::json!(1036402944_i64)), Some(1036402944));
        assert_eq!(parsear_cedula(&serde_json::json!("1036402944")), Some(1036402944));
        assert_eq!(parsear_cedula(&serde_json::json!(" 123 ")), Some(123));
    }

    #[test]
    fn parsear_cedula_rechaza_valores_no_numericos() {
        assert_eq!(parsear_cedula(&serde_json::json!("abc")), None);
        assert_eq!(parsear_cedula(&serde_json::json!(12.5)), None);
        assert_eq!(parsear_cedula(&serde_json::json!(null)), None);
        assert_eq!(parsear_cedula(&serde_json::json!(["1"])), None);
    }

    #[test]
    fn el_parametro_cedula_exige_un_numero() {
        assert!(matches!(
            cedula_de_parametro(None),
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            cedula_de_parametro(Some("abc")),
            Err(AppError::BadRequest(_))
        ));
        assert_eq!(cedula_de_parametro(Some(" 1036402944 ")).unwrap(), 1036402944);
    }
}
