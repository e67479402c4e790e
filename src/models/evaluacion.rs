use chrono::{Datelike, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::utils::validation::{cedula_flexible, entero_flexible};

/// Fila completa de la tabla `colaboradores`.
#[derive(sqlx::FromRow, Debug, Clone)]
pub struct Evaluacion {
    pub id: i64,
    pub marca_temporal: String,
    pub anio: i32,
    pub nombres_apellidos: String,
    pub cedula: i64,
    pub cargo: Option<String>,
    pub fecha_ingreso: Option<String>,
    pub antiguedad: Option<String>,
    pub antiguedad_anios: Option<String>,
    pub nombre_jefe_inmediato: Option<String>,
    pub cargo_jefe_inmediato: Option<String>,
    pub area_jefe_pertenencia: Option<String>,
    pub estado: Option<String>,
    pub compromiso_pasion_entrega: i32,
    pub honestidad: i32,
    pub respeto: i32,
    pub sencillez: i32,
    pub servicio: i32,
    pub trabajo_equipo: i32,
    pub conocimiento_trabajo: i32,
    pub productividad: i32,
    pub cumple_sistema_gestion: i32,
    pub total_puntos: i32,
    pub porcentaje_calificacion: String,
    pub acuerdos_mejora_desempeno_colaborador: Option<String>,
    pub acuerdos_mejora_desempeno_jefe: Option<String>,
    pub necesidades_desarrollo: Option<String>,
    pub aspectos_positivos: Option<String>,
    pub formacion: Option<String>,
}

/// Cuerpo de `/submit_evaluation`: tres grupos anidados tal como los envia el
/// formulario.
#[derive(Deserialize, Debug)]
pub struct FormularioEvaluacion {
    pub datos: DatosEmpleado,
    pub valores: ValoresEvaluacion,
    pub acuerdos: AcuerdosEvaluacion,
}

#[derive(Deserialize, Debug)]
pub struct DatosEmpleado {
    pub nombres: String,
    #[serde(deserialize_with = "cedula_flexible")]
    pub cedula: i64,
    pub cargo: String,
    #[serde(rename = "anoIngreso", deserialize_with = "entero_flexible")]
    pub ano_ingreso: i32,
    #[serde(rename = "mesIngreso")]
    pub mes_ingreso: String,
    pub antiguedad: String,
    pub jefe: String,
    #[serde(rename = "cargoJefe")]
    pub cargo_jefe: String,
    pub area: String,
    #[serde(default)]
    pub estado: Option<String>,
}

/// Los nueve puntajes del formulario. Cada campo ausente vale cero en lugar
/// de rechazar el envio. El rango 0-4 es convencion del formulario y no se
/// valida en el servidor.
#[derive(Deserialize, Debug, Default)]
pub struct ValoresEvaluacion {
    #[serde(default)]
    pub compromiso: i32,
    #[serde(default)]
    pub honestidad: i32,
    #[serde(default)]
    pub respeto: i32,
    #[serde(default)]
    pub sencillez: i32,
    #[serde(default)]
    pub servicio: i32,
    #[serde(default)]
    pub trabajo_equipo: i32,
    #[serde(default)]
    pub conocimiento_trabajo: i32,
    #[serde(default)]
    pub productividad: i32,
    #[serde(default)]
    pub cumple_sistema_gestion: i32,
}

impl ValoresEvaluacion {
    pub fn total(&self) -> i32 {
        self.compromiso
            + self.honestidad
            + self.respeto
            + self.sencillez
            + self.servicio
            + self.trabajo_equipo
            + self.conocimiento_trabajo
            + self.productividad
            + self.cumple_sistema_gestion
    }

    /// Total sobre 36 expresado como porcentaje con dos decimales fijos.
    pub fn porcentaje(&self) -> String {
        format!("{:.2}", (self.total() as f64 / 36.0) * 100.0)
    }
}

#[derive(Deserialize, Debug)]
pub struct AcuerdosEvaluacion {
    pub colaborador_acuerdos: String,
    pub jefe_acuerdos: String,
    pub desarrollo_necesidades: String,
    pub aspectos_positivos: String,
    #[serde(default)]
    pub formacion: Option<String>,
}

/// Fila lista para insertar: campos derivados ya calculados. `total_puntos`
/// y `porcentaje_calificacion` salen siempre de los nueve puntajes, nunca
/// del cliente.
#[derive(Debug)]
pub struct NuevaEvaluacion {
    pub marca_temporal: String,
    pub anio: i32,
    pub nombres_apellidos: String,
    pub cedula: i64,
    pub cargo: String,
    pub fecha_ingreso: String,
    pub antiguedad: String,
    pub antiguedad_anios: String,
    pub nombre_jefe_inmediato: String,
    pub cargo_jefe_inmediato: String,
    pub area_jefe_pertenencia: String,
    pub estado: String,
    pub valores: ValoresEvaluacion,
    pub total_puntos: i32,
    pub porcentaje_calificacion: String,
    pub acuerdos_mejora_desempeno_colaborador: String,
    pub acuerdos_mejora_desempeno_jefe: String,
    pub necesidades_desarrollo: String,
    pub aspectos_positivos: String,
    pub formacion: Option<String>,
}

impl NuevaEvaluacion {
    pub fn desde_formulario(formulario: FormularioEvaluacion, ahora: NaiveDateTime) -> Self {
        let FormularioEvaluacion { datos, valores, acuerdos } = formulario;
        let anio = ahora.year();
        let total_puntos = valores.total();
        let porcentaje_calificacion = valores.porcentaje();

        NuevaEvaluacion {
            marca_temporal: ahora.format("%Y-%m-%d %H:%M:%S").to_string(),
            anio,
            nombres_apellidos: datos.nombres,
            cedula: datos.cedula,
            cargo: datos.cargo,
            fecha_ingreso: format!("{}-{}-01", datos.ano_ingreso, datos.mes_ingreso),
            antiguedad: datos.antiguedad,
            antiguedad_anios: (anio - datos.ano_ingreso).to_string(),
            nombre_jefe_inmediato: datos.jefe,
            cargo_jefe_inmediato: datos.cargo_jefe,
            area_jefe_pertenencia: datos.area,
            estado: datos.estado.unwrap_or_else(|| "Activo".to_string()),
            valores,
            total_puntos,
            porcentaje_calificacion,
            acuerdos_mejora_desempeno_colaborador: acuerdos.colaborador_acuerdos,
            acuerdos_mejora_desempeno_jefe: acuerdos.jefe_acuerdos,
            necesidades_desarrollo: acuerdos.desarrollo_necesidades,
            aspectos_positivos: acuerdos.aspectos_positivos,
            formacion: acuerdos.formacion,
        }
    }
}

/// Convierte el porcentaje almacenado a numero para las vistas que lo
/// exponen como tal. Tolera filas legadas con sufijo `%`.
pub fn porcentaje_a_numero(almacenado: &str) -> f64 {
    almacenado
        .trim()
        .trim_end_matches('%')
        .parse()
        .unwrap_or(0.0)
}

/// Entrada del historial individual (`/get_evaluation_history`). Conserva
/// las claves cortas del contrato original: `compromiso` en lugar de
/// `compromiso_pasion_entrega`, porcentaje como cadena almacenada.
#[derive(Serialize, Debug)]
pub struct ResumenHistorial {
    pub fecha_evaluacion: String,
    pub anio: i32,
    pub cargo: Option<String>,
    pub compromiso: i32,
    pub honestidad: i32,
    pub respeto: i32,
    pub sencillez: i32,
    pub servicio: i32,
    pub trabajo_equipo: i32,
    pub conocimiento_trabajo: i32,
    pub productividad: i32,
    pub cumple_sistema_gestion: i32,
    pub total_puntos: i32,
    pub porcentaje_calificacion: String,
    pub acuerdos_mejora_desempeno_colaborador: Option<String>,
    pub acuerdos_mejora_desempeno_jefe: Option<String>,
    pub necesidades_desarrollo: Option<String>,
    pub aspectos_positivos: Option<String>,
}

impl From<&Evaluacion> for ResumenHistorial {
    fn from(e: &Evaluacion) -> Self {
        ResumenHistorial {
            fecha_evaluacion: e.marca_temporal.clone(),
            anio: e.anio,
            cargo: e.cargo.clone(),
            compromiso: e.compromiso_pasion_entrega,
            honestidad: e.honestidad,
            respeto: e.respeto,
            sencillez: e.sencillez,
            servicio: e.servicio,
            trabajo_equipo: e.trabajo_equipo,
            conocimiento_trabajo: e.conocimiento_trabajo,
            productividad: e.productividad,
            cumple_sistema_gestion: e.cumple_sistema_gestion,
            total_puntos: e.total_puntos,
            porcentaje_calificacion: e.porcentaje_calificacion.clone(),
            acuerdos_mejora_desempeno_colaborador: e.acuerdos_mejora_desempeno_colaborador.clone(),
            acuerdos_mejora_desempeno_jefe: e.acuerdos_mejora_desempeno_jefe.clone(),
            necesidades_desarrollo: e.necesidades_desarrollo.clone(),
            aspectos_positivos: e.aspectos_positivos.clone(),
        }
    }
}

/// Proyeccion completa para `/historial` y `/get_all_evaluations`, con el
/// porcentaje ya convertido a numero.
#[derive(Serialize, Debug)]
pub struct ProyeccionEvaluacion {
    pub id: i64,
    pub fecha_evaluacion: String,
    pub anio: i32,
    pub nombres_apellidos: String,
    pub cedula: i64,
    pub cargo: Option<String>,
    pub area_jefe_pertenencia: Option<String>,
    pub estado: Option<String>,
    pub compromiso_pasion_entrega: i32,
    pub honestidad: i32,
    pub respeto: i32,
    pub sencillez: i32,
    pub servicio: i32,
    pub trabajo_equipo: i32,
    pub conocimiento_trabajo: i32,
    pub productividad: i32,
    pub cumple_sistema_gestion: i32,
    pub total_puntos: i32,
    pub porcentaje_calificacion: f64,
    pub acuerdos_mejora_desempeno_colaborador: Option<String>,
    pub acuerdos_mejora_desempeno_jefe: Option<String>,
    pub necesidades_desarrollo: Option<String>,
    pub aspectos_positivos: Option<String>,
    pub formacion: Option<String>,
}

impl From<&Evaluacion> for ProyeccionEvaluacion {
    fn from(e: &Evaluacion) -> Self {
        ProyeccionEvaluacion {
            id: e.id,
            fecha_evaluacion: e.marca_temporal.clone(),
            anio: e.anio,
            nombres_apellidos: e.nombres_apellidos.clone(),
            cedula: e.cedula,
            cargo: e.cargo.clone(),
            area_jefe_pertenencia: e.area_jefe_pertenencia.clone(),
            estado: e.estado.clone(),
            compromiso_pasion_entrega: e.compromiso_pasion_entrega,
            honestidad: e.honestidad,
            respeto: e.respeto,
            sencillez: e.sencillez,
            servicio: e.servicio,
            trabajo_equipo: e.trabajo_equipo,
            conocimiento_trabajo: e.conocimiento_trabajo,
            productividad: e.productividad,
            cumple_sistema_gestion: e.cumple_sistema_gestion,
            total_puntos: e.total_puntos,
            porcentaje_calificacion: porcentaje_a_numero(&e.porcentaje_calificacion),
            acuerdos_mejora_desempeno_colaborador: e.acuerdos_mejora_desempeno_colaborador.clone(),
            acuerdos_mejora_desempeno_jefe: e.acuerdos_mejora_desempeno_jefe.clone(),
            necesidades_desarrollo: e.necesidades_desarrollo.clone(),
            aspectos_positivos: e.aspectos_positivos.clone(),
            formacion: e.formacion.clone(),
        }
    }
}

/// Desglose de un año para `/get_employee_stats`.
#[derive(Serialize, Debug)]
pub struct ResultadoAnual {
    pub fecha_evaluacion: String,
    pub compromiso_pasion_entrega: i32,
    pub honestidad: i32,
    pub respeto: i32,
    pub sencillez: i32,
    pub servicio: i32,
    pub trabajo_equipo: i32,
    pub conocimiento_trabajo: i32,
    pub productividad: i32,
    pub cumple_sistema_gestion: i32,
    pub total_puntos: i32,
    pub porcentaje_calificacion: f64,
}

impl From<&Evaluacion> for ResultadoAnual {
    fn from(e: &Evaluacion) -> Self {
        ResultadoAnual {
            fecha_evaluacion: e.marca_temporal.clone(),
            compromiso_pasion_entrega: e.compromiso_pasion_entrega,
            honestidad: e.honestidad,
            respeto: e.respeto,
            sencillez: e.sencillez,
            servicio: e.servicio,
            trabajo_equipo: e.trabajo_equipo,
            conocimiento_trabajo: e.conocimiento_trabajo,
            productividad: e.productividad,
            cumple_sistema_gestion: e.cumple_sistema_gestion,
            total_puntos: e.total_puntos,
            porcentaje_calificacion: porcentaje_a_numero(&e.porcentaje_calificacion),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn formulario_json(valores: serde_json::Value) -> FormularioEvaluacion {
        serde_json::from_value(serde_json::json!({
            "datos": {
                "nombres": "ANA MARIA RIOS",
                "cedula": "1036402944",
                "cargo": "AUXILIAR OPERATIVO",
                "anoIngreso": "2020",
                "mesIngreso": "Marzo",
                "antiguedad": "5 años",
                "jefe": "CARLOS PEREZ",
                "cargoJefe": "COORDINADOR DE ZONA",
                "area": "LOGISTICA"
            },
            "valores": valores,
            "acuerdos": {
                "colaborador_acuerdos": "Mejorar puntualidad",
                "jefe_acuerdos": "Acompañamiento mensual",
                "desarrollo_necesidades": "Curso de Excel",
                "aspectos_positivos": "Buena actitud"
            }
        }))
        .expect("formulario valido")
    }

    fn ahora_fija() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 15)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap()
    }

    #[test]
    fn total_y_porcentaje_con_todos_los_puntajes_en_cuatro() {
        let valores = ValoresEvaluacion {
            compromiso: 4,
            honestidad: 4,
            respeto: 4,
            sencillez: 4,
            servicio: 4,
            trabajo_equipo: 4,
            conocimiento_trabajo: 4,
            productividad: 4,
            cumple_sistema_gestion: 4,
        };
        assert_eq!(valores.total(), 36);
        assert_eq!(valores.porcentaje(), "100.00");
    }

    #[test]
    fn porcentaje_con_dos_decimales_fijos() {
        let valores = ValoresEvaluacion {
            compromiso: 4,
            honestidad: 4,
            respeto: 4,
            sencillez: 4,
            servicio: 4,
            trabajo_equipo: 4,
            conocimiento_trabajo: 4,
            productividad: 4,
            cumple_sistema_gestion: 3,
        };
        assert_eq!(valores.total(), 35);
        assert_eq!(valores.porcentaje(), "97.22");

        assert_eq!(ValoresEvaluacion::default().porcentaje(), "0.00");
    }

    #[test]
    fn puntajes_ausentes_valen_cero() {
        let formulario = formulario_json(serde_json::json!({
            "compromiso": 4,
            "honestidad": 3,
            "respeto": 2
        }));
        assert_eq!(formulario.valores.servicio, 0);
        assert_eq!(formulario.valores.cumple_sistema_gestion, 0);
        assert_eq!(formulario.valores.total(), 9);
        assert_eq!(formulario.valores.porcentaje(), "25.00");
    }

    #[test]
    fn la_cedula_se_acepta_como_cadena_o_numero() {
        let formulario = formulario_json(serde_json::json!({}));
        assert_eq!(formulario.datos.cedula, 1036402944);

        let con_numero: FormularioEvaluacion = serde_json::from_value(serde_json::json!({
            "datos": {
                "nombres": "X",
                "cedula": 123,
                "cargo": "Y",
                "anoIngreso": 2021,
                "mesIngreso": "Enero",
                "antiguedad": "4 años",
                "jefe": "Z",
                "cargoJefe": "W",
                "area": "A"
            },
            "valores": {},
            "acuerdos": {
                "colaborador_acuerdos": "",
                "jefe_acuerdos": "",
                "desarrollo_necesidades": "",
                "aspectos_positivos": ""
            }
        }))
        .unwrap();
        assert_eq!(con_numero.datos.cedula, 123);
        assert_eq!(con_numero.datos.ano_ingreso, 2021);
    }

    #[test]
    fn desde_formulario_deriva_los_campos_calculados() {
        let formulario = formulario_json(serde_json::json!({
            "compromiso": 4, "honestidad": 4, "respeto": 4, "sencillez": 4,
            "servicio": 4, "trabajo_equipo": 4, "conocimiento_trabajo": 4,
            "productividad": 4, "cumple_sistema_gestion": 4
        }));
        let nueva = NuevaEvaluacion::desde_formulario(formulario, ahora_fija());

        assert_eq!(nueva.marca_temporal, "2025-03-15 10:30:00");
        assert_eq!(nueva.anio, 2025);
        assert_eq!(nueva.fecha_ingreso, "2020-Marzo-01");
        assert_eq!(nueva.antiguedad_anios, "5");
        assert_eq!(nueva.estado, "Activo");
        assert_eq!(nueva.total_puntos, 36);
        assert_eq!(nueva.porcentaje_calificacion, "100.00");
    }

    #[test]
    fn el_estado_enviado_prevalece_sobre_el_predeterminado() {
        let mut formulario = formulario_json(serde_json::json!({}));
        formulario.datos.estado = Some("Retirado".to_string());
        let nueva = NuevaEvaluacion::desde_formulario(formulario, ahora_fija());
        assert_eq!(nueva.estado, "Retirado");
    }

    #[test]
    fn porcentaje_a_numero_tolera_filas_legadas() {
        assert_eq!(porcentaje_a_numero("97.22"), 97.22);
        assert_eq!(porcentaje_a_numero("97.22%"), 97.22);
        assert_eq!(porcentaje_a_numero(" 100.00 "), 100.0);
        assert_eq!(porcentaje_a_numero("no-numerico"), 0.0);
    }

    #[test]
    fn el_resumen_usa_la_clave_corta_compromiso() {
        let fila = Evaluacion {
            id: 1,
            marca_temporal: "2025-03-15 10:30:00".into(),
            anio: 2025,
            nombres_apellidos: "ANA MARIA RIOS".into(),
            cedula: 1036402944,
            cargo: Some("AUXILIAR OPERATIVO".into()),
            fecha_ingreso: Some("2020-Marzo-01".into()),
            antiguedad: Some("5 años".into()),
            antiguedad_anios: Some("5".into()),
            nombre_jefe_inmediato: Some("CARLOS PEREZ".into()),
            cargo_jefe_inmediato: Some("COORDINADOR DE ZONA".into()),
            area_jefe_pertenencia: Some("LOGISTICA".into()),
            estado: Some("Activo".into()),
            compromiso_pasion_entrega: 3,
            honestidad: 4,
            respeto: 4,
            sencillez: 4,
            servicio: 4,
            trabajo_equipo: 4,
            conocimiento_trabajo: 4,
            productividad: 4,
            cumple_sistema_gestion: 4,
            total_puntos: 35,
            porcentaje_calificacion: "97.22".into(),
            acuerdos_mejora_desempeno_colaborador: None,
            acuerdos_mejora_desempeno_jefe: None,
            necesidades_desarrollo: None,
            aspectos_positivos: None,
            formacion: None,
        };

        let resumen = serde_json::to_value(ResumenHistorial::from(&fila)).unwrap();
        assert_eq!(resumen["compromiso"], 3);
        assert!(resumen.get("compromiso_pasion_entrega").is_none());
        assert_eq!(resumen["porcentaje_calificacion"], "97.22");

        let proyeccion = serde_json::to_value(ProyeccionEvaluacion::from(&fila)).unwrap();
        assert_eq!(proyeccion["compromiso_pasion_entrega"], 3);
        assert_eq!(proyeccion["porcentaje_calificacion"], 97.22);
    }
}
