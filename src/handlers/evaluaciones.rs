use std::collections::BTreeMap;

use actix_web::{web, HttpResponse};
use chrono::Local;
use serde::Deserialize;
use sqlx::PgPool;

use crate::db;
use crate::errors::AppError;
use crate::models::evaluacion::{
    Evaluacion, FormularioEvaluacion, NuevaEvaluacion, ProyeccionEvaluacion, ResultadoAnual,
    ResumenHistorial,
};
use crate::models::rol::Rol;
use crate::utils::validation::{cedula_de_parametro, parsear_cedula};

const INSERTAR_EVALUACION: &str = r#"
INSERT INTO colaboradores (
    marca_temporal, anio, nombres_apellidos, cedula, cargo,
    fecha_ingreso, antiguedad, antiguedad_anios,
    nombre_jefe_inmediato, cargo_jefe_inmediato, area_jefe_pertenencia, estado,
    compromiso_pasion_entrega, honestidad, respeto, sencillez, servicio,
    trabajo_equipo, conocimiento_trabajo, productividad, cumple_sistema_gestion,
    total_puntos, porcentaje_calificacion,
    acuerdos_mejora_desempeno_colaborador, acuerdos_mejora_desempeno_jefe,
    necesidades_desarrollo, aspectos_positivos, formacion
) VALUES (
    $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14,
    $15, $16, $17, $18, $19, $20, $21, $22, $23, $24, $25, $26, $27, $28
)
"#;

const LISTAR_POR_CEDULA: &str =
    "SELECT * FROM colaboradores WHERE cedula = $1 ORDER BY marca_temporal DESC";

/// Registra un envio del formulario. Los campos derivados (total, porcentaje,
/// marca temporal, año) se calculan aqui y nunca vienen del cliente. El
/// insert corre dentro de una transaccion que se revierte ante cualquier
/// fallo de escritura.
pub async fn submit_evaluation(
    pool: web::Data<PgPool>,
    formulario: web::Json<FormularioEvaluacion>,
) -> Result<HttpResponse, AppError> {
    let nueva = NuevaEvaluacion::desde_formulario(formulario.into_inner(), Local::now().naive_local());

    let mut tx = pool.begin().await.map_err(|err| {
        log::error!("Error al abrir la transacción: {:?}", err);
        AppError::DatabaseError("Error al guardar la evaluación".to_string())
    })?;

    let resultado = sqlx::query(INSERTAR_EVALUACION)
        .bind(&nueva.marca_temporal)
        .bind(nueva.anio)
        .bind(&nueva.nombres_apellidos)
        .bind(nueva.cedula)
        .bind(&nueva.cargo)
        .bind(&nueva.fecha_ingreso)
        .bind(&nueva.antiguedad)
        .bind(&nueva.antiguedad_anios)
        .bind(&nueva.nombre_jefe_inmediato)
        .bind(&nueva.cargo_jefe_inmediato)
        .bind(&nueva.area_jefe_pertenencia)
        .bind(&nueva.estado)
        .bind(nueva.valores.compromiso)
        .bind(nueva.valores.honestidad)
        .bind(nueva.valores.respeto)
        .bind(nueva.valores.sencillez)
        .bind(nueva.valores.servicio)
        .bind(nueva.valores.trabajo_equipo)
        .bind(nueva.valores.conocimiento_trabajo)
        .bind(nueva.valores.productividad)
        .bind(nueva.valores.cumple_sistema_gestion)
        .bind(nueva.total_puntos)
        .bind(&nueva.porcentaje_calificacion)
        .bind(&nueva.acuerdos_mejora_desempeno_colaborador)
        .bind(&nueva.acuerdos_mejora_desempeno_jefe)
        .bind(&nueva.necesidades_desarrollo)
        .bind(&nueva.aspectos_positivos)
        .bind(&nueva.formacion)
        .execute(&mut *tx)
        .await;

    match resultado {
        Ok(_) => {
            tx.commit().await.map_err(|err| {
                log::error!("Error al confirmar la transacción: {:?}", err);
                AppError::DatabaseError("Error al guardar la evaluación".to_string())
            })?;
            Ok(HttpResponse::Ok().json(serde_json::json!({
                "success": true,
                "message": "Evaluación guardada exitosamente"
            })))
        }
        Err(err) => {
            log::error!("Error al guardar la evaluación: {:?}", err);
            tx.rollback().await.ok();
            Err(AppError::DatabaseError("Error al guardar la evaluación".to_string()))
        }
    }
}

/// Historial individual: todas las evaluaciones de una cedula, de la mas
/// reciente a la mas antigua. Una cedula sin evaluaciones devuelve la lista
/// vacia.
pub async fn get_evaluation_history(
    pool: web::Data<PgPool>,
    body: web::Json<serde_json::Value>,
) -> Result<HttpResponse, AppError> {
    let valor = body
        .get("cedula")
        .ok_or_else(|| AppError::BadRequest("Se requiere la cédula".to_string()))?;
    let cedula = parsear_cedula(valor)
        .ok_or_else(|| AppError::BadRequest("La cédula debe ser un número válido".to_string()))?;

    let evaluaciones = sqlx::query_as::<_, Evaluacion>(LISTAR_POR_CEDULA)
        .bind(cedula)
        .fetch_all(pool.get_ref())
        .await
        .map_err(|err| {
            log::error!("Error al obtener el historial de la cédula {}: {:?}", cedula, err);
            AppError::DatabaseError("Error al obtener el historial de evaluaciones".to_string())
        })?;

    let history: Vec<ResumenHistorial> = evaluaciones.iter().map(ResumenHistorial::from).collect();

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "history": history
    })))
}

/// Volcado completo para el panel de administracion, con el porcentaje ya
/// convertido a numero.
pub async fn get_all_evaluations(pool: web::Data<PgPool>) -> Result<HttpResponse, AppError> {
    let evaluaciones = sqlx::query_as::<_, Evaluacion>(
        "SELECT * FROM colaboradores ORDER BY marca_temporal DESC",
    )
    .fetch_all(pool.get_ref())
    .await
    .map_err(|err| {
        log::error!("Error al obtener todas las evaluaciones: {:?}", err);
        AppError::DatabaseError("Error al obtener las evaluaciones".to_string())
    })?;

    let evaluations: Vec<ProyeccionEvaluacion> =
        evaluaciones.iter().map(ProyeccionEvaluacion::from).collect();

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "evaluations": evaluations
    })))
}

#[derive(Deserialize)]
pub struct ConsultaHistorial {
    cedula: Option<String>,
    page: Option<usize>,
    per_page: Option<usize>,
}

fn paginar<T>(items: Vec<T>, page: usize, per_page: usize) -> (Vec<T>, usize) {
    let per_page = per_page.max(1);
    let total_pages = items.len().div_ceil(per_page);
    let page = page.max(1);
    let pagina = items
        .into_iter()
        .skip((page - 1) * per_page)
        .take(per_page)
        .collect();
    (pagina, total_pages)
}

/// Historial organizacional, limitado al centro de costo del consultante y
/// filtrado por rol: un director no ve evaluaciones de cargos COORDINADOR* y
/// un coordinador no ve las de cargos DIRECTOR*.
pub async fn historial(
    pool: web::Data<PgPool>,
    consulta: web::Query<ConsultaHistorial>,
) -> Result<HttpResponse, AppError> {
    let cedula = cedula_de_parametro(consulta.cedula.as_deref())?;

    let consultante = db::buscar_usuario(&pool, cedula)
        .await?
        .ok_or_else(|| AppError::NotFound("Usuario no encontrado".to_string()))?;

    let rol = Rol::desde_cargo(&consultante.cargo);
    if !rol.autoriza_historial() {
        return Err(AppError::Forbidden(
            "No tiene permisos para consultar el historial".to_string(),
        ));
    }

    let visibles = match consultante.centro_de_costo.as_deref() {
        Some(centro) => {
            let evaluaciones = sqlx::query_as::<_, Evaluacion>(
                "SELECT * FROM colaboradores WHERE area_jefe_pertenencia = $1 ORDER BY marca_temporal DESC",
            )
            .bind(centro)
            .fetch_all(pool.get_ref())
            .await
            .map_err(|err| {
                log::error!("Error al obtener el historial del centro {}: {:?}", centro, err);
                AppError::DatabaseError("Error al obtener el historial".to_string())
            })?;

            evaluaciones
                .into_iter()
                .filter(|e| rol.ve_cargo(e.cargo.as_deref().unwrap_or("")))
                .collect()
        }
        None => Vec::new(),
    };

    let page = consulta.page.unwrap_or(1);
    let per_page = consulta.per_page.unwrap_or(10);
    let (pagina, total_pages) = paginar(visibles, page, per_page);
    let entradas: Vec<ProyeccionEvaluacion> = pagina.iter().map(ProyeccionEvaluacion::from).collect();

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "historial": entradas,
        "nombre_lider": consultante.nombre,
        "cargo_lider": consultante.cargo,
        "total_pages": total_pages,
        "page": page
    })))
}

#[derive(Deserialize)]
pub struct ConsultaEstadisticas {
    cedula: Option<String>,
}

/// Desglose por año de revision para una cedula. Si un año acumula varios
/// envios gana el mas reciente.
pub async fn get_employee_stats(
    pool: web::Data<PgPool>,
    consulta: web::Query<ConsultaEstadisticas>,
) -> Result<HttpResponse, AppError> {
    let cedula = cedula_de_parametro(consulta.cedula.as_deref())?;

    db::buscar_usuario(&pool, cedula)
        .await?
        .ok_or_else(|| AppError::NotFound("Usuario no encontrado".to_string()))?;

    let evaluaciones = sqlx::query_as::<_, Evaluacion>(LISTAR_POR_CEDULA)
        .bind(cedula)
        .fetch_all(pool.get_ref())
        .await
        .map_err(|err| {
            log::error!("Error al obtener estadísticas de la cédula {}: {:?}", cedula, err);
            AppError::DatabaseError("Error al obtener las estadísticas".to_string())
        })?;

    // Orden descendente por marca temporal: la primera fila de cada año es la
    // mas reciente.
    let mut resultados: BTreeMap<i32, ResultadoAnual> = BTreeMap::new();
    for evaluacion in &evaluaciones {
        resultados
            .entry(evaluacion.anio)
            .or_insert_with(|| ResultadoAnual::from(evaluacion));
    }
    let anios: Vec<i32> = resultados.keys().copied().collect();

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "anios": anios,
        "resultados": resultados
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paginar_calcula_el_total_de_paginas() {
        let items: Vec<i32> = (1..=25).collect();
        let (pagina, total) = paginar(items.clone(), 1, 10);
        assert_eq!(pagina, (1..=10).collect::<Vec<_>>());
        assert_eq!(total, 3);

        let (ultima, _) = paginar(items.clone(), 3, 10);
        assert_eq!(ultima, vec![21, 22, 23, 24, 25]);

        let (fuera_de_rango, _) = paginar(items, 4, 10);
        assert!(fuera_de_rango.is_empty());
    }

    #[test]
    fn paginar_tolera_parametros_degenerados() {
        let (pagina, total) = paginar(vec![1, 2, 3], 0, 0);
        assert_eq!(pagina, vec![1]);
        assert_eq!(total, 3);

        let (vacia, total_vacia) = paginar(Vec::<i32>::new(), 1, 10);
        assert!(vacia.is_empty());
        assert_eq!(total_vacia, 0);
    }
}
