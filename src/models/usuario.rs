use serde::Serialize;

/// Fila del directorio de empleados (tabla `usuarios`, columnas entre
/// comillas porque el esquema original conserva mayusculas).
///
/// `clave` guarda un hash Argon2id, nunca la contraseña en claro.
#[derive(sqlx::FromRow, Debug)]
pub struct Usuario {
    #[sqlx(rename = "CEDULA")]
    pub cedula: i64,
    #[sqlx(rename = "NOMBRE")]
    pub nombre: String,
    #[sqlx(rename = "CARGO")]
    pub cargo: String,
    #[sqlx(rename = "CENTRO_DE_COSTO")]
    pub centro_de_costo: Option<String>,
    #[sqlx(rename = "LIDER_EVALUADOR")]
    pub lider_evaluador: Option<String>,
    #[sqlx(rename = "CARGO_DE_LIDER_EVALUADOR")]
    pub cargo_de_lider_evaluador: Option<String>,
    #[sqlx(rename = "ESTADO")]
    pub estado: Option<String>,
    #[sqlx(rename = "ANO_INGRESO")]
    pub ano_ingreso: Option<i32>,
    #[sqlx(rename = "MES_INGRESO")]
    pub mes_ingreso: Option<String>,
    #[sqlx(rename = "ANOS")]
    pub anos: Option<f64>,
    #[sqlx(rename = "ANTIGUEDAD")]
    pub antiguedad: Option<String>,
    #[sqlx(rename = "LIDER")]
    pub lider: Option<i64>,
    #[sqlx(rename = "CLAVE")]
    pub clave: Option<String>,
    #[sqlx(rename = "PREGUNTA_SEGURIDAD")]
    pub pregunta_seguridad: Option<String>,
    #[sqlx(rename = "RESPUESTA_SEGURIDAD")]
    pub respuesta_seguridad: Option<String>,
}

/// Proyeccion publica del perfil: los campos que devuelven
/// `/validate_cedula` y `/validate_user`. Nunca expone credenciales.
#[derive(Serialize, Debug, Clone)]
pub struct PerfilUsuario {
    pub nombre: String,
    pub cargo: String,
    pub centro_de_costo: Option<String>,
    pub lider_evaluador: Option<String>,
    pub cargo_de_lider_evaluador: Option<String>,
    pub estado: Option<String>,
    pub ano_ingreso: Option<i32>,
    pub mes_ingreso: Option<String>,
    pub anos: Option<f64>,
    pub antiguedad: Option<String>,
}

impl From<&Usuario> for PerfilUsuario {
    fn from(u: &Usuario) -> Self {
        PerfilUsuario {
            nombre: u.nombre.clone(),
            cargo: u.cargo.clone(),
            centro_de_costo: u.centro_de_costo.clone(),
            lider_evaluador: u.lider_evaluador.clone(),
            cargo_de_lider_evaluador: u.cargo_de_lider_evaluador.clone(),
            estado: u.estado.clone(),
            ano_ingreso: u.ano_ingreso,
            mes_ingreso: u.mes_ingreso.clone(),
            anos: u.anos,
            antiguedad: u.antiguedad.clone(),
        }
    }
}

/// Perfil con cedula, para `/get_user_details` y los listados de
/// subordinados de `/get_employees_under_leader`.
#[derive(Serialize, Debug, Clone)]
pub struct DetalleUsuario {
    pub cedula: i64,
    #[serde(flatten)]
    pub perfil: PerfilUsuario,
}

impl From<&Usuario> for DetalleUsuario {
    fn from(u: &Usuario) -> Self {
        DetalleUsuario {
            cedula: u.cedula,
            perfil: PerfilUsuario::from(u),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usuario_de_prueba() -> Usuario {
        Usuario {
            cedula: 1036402944,
            nombre: "ANA MARIA RIOS".to_string(),
            cargo: "AUXILIAR OPERATIVO".to_string(),
            centro_de_costo: Some("LOGISTICA".to_string()),
            lider_evaluador: Some("CARLOS PEREZ".to_string()),
            cargo_de_lider_evaluador: Some("COORDINADOR DE ZONA".to_string()),
            estado: Some("Activo".to_string()),
            ano_ingreso: Some(2019),
            mes_ingreso: Some("Marzo".to_string()),
            anos: Some(6.4),
            antiguedad: Some("6 años".to_string()),
            lider: Some(71234567),
            clave: Some("$argon2id$...".to_string()),
            pregunta_seguridad: Some("mascota".to_string()),
            respuesta_seguridad: Some("Rex".to_string()),
        }
    }

    #[test]
    fn el_perfil_no_expone_credenciales() {
        let perfil = PerfilUsuario::from(&usuario_de_prueba());
        let json = serde_json::to_value(&perfil).unwrap();
        assert!(json.get("clave").is_none());
        assert!(json.get("respuesta_seguridad").is_none());
        assert_eq!(json["nombre"], "ANA MARIA RIOS");
    }

    #[test]
    fn el_detalle_aplana_el_perfil_junto_a_la_cedula() {
        let detalle = DetalleUsuario::from(&usuario_de_prueba());
        let json = serde_json::to_value(&detalle).unwrap();
        assert_eq!(json["cedula"], 1036402944_i64);
        assert_eq!(json["cargo"], "AUXILIAR OPERATIVO");
        assert!(json.get("perfil").is_none());
    }
}
