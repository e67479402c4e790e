mod db;
mod errors;
mod handlers;
mod models;
mod utils;

use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use dotenv::dotenv;
use log::info;
use std::env;

use crate::errors::AppError;

async fn estado() -> &'static str {
    "Backend de Evaluación de Desempeño funcionando correctamente"
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init();

    // Initialize the database pool and bring the schema up to date, the
    // counterpart of the original deployment's create-tables-on-boot step.
    let pool = db::create_pool().await;
    sqlx::migrate!()
        .run(&pool)
        .await
        .expect("Failed to run database migrations");

    let port = env::var("PORT").unwrap_or_else(|_| "5000".to_string());
    let bind_addr = format!("0.0.0.0:{}", port);
    info!("Starting server at {}", bind_addr);

    // Start the HTTP server
    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(pool.clone()))
            // Malformed JSON bodies and query strings keep the same
            // {"error": ...} shape as the handler-level failures.
            .app_data(web::JsonConfig::default().error_handler(|err, _| {
                AppError::BadRequest(err.to_string()).into()
            }))
            .app_data(web::QueryConfig::default().error_handler(|err, _| {
                AppError::BadRequest(err.to_string()).into()
            }))
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header(),
            )
            .service(web::resource("/").route(web::get().to(estado)))
            .service(
                web::resource("/validate_cedula")
                    .route(web::post().to(handlers::usuarios::validate_cedula)),
            )
            .service(
                web::resource("/validate_user")
                    .route(web::post().to(handlers::auth::validate_user)),
            )
            .service(
                web::resource("/change_password")
                    .route(web::post().to(handlers::auth::change_password)),
            )
            .service(
                web::resource("/update_security_question")
                    .route(web::post().to(handlers::auth::update_security_question)),
            )
            .service(
                web::resource("/get_security_question")
                    .route(web::post().to(handlers::auth::get_security_question)),
            )
            .service(
                web::resource("/verify_security_answer")
                    .route(web::post().to(handlers::auth::verify_security_answer)),
            )
            .service(
                web::resource("/reset_password")
                    .route(web::post().to(handlers::auth::reset_password)),
            )
            .service(
                web::resource("/submit_evaluation")
                    .route(web::post().to(handlers::evaluaciones::submit_evaluation)),
            )
            .service(
                web::resource("/get_evaluation_history")
                    .route(web::post().to(handlers::evaluaciones::get_evaluation_history)),
            )
            .service(
                web::resource("/get_all_evaluations")
                    .route(web::get().to(handlers::evaluaciones::get_all_evaluations)),
            )
            .service(
                web::resource("/get_employees_under_leader")
                    .route(web::get().to(handlers::usuarios::get_employees_under_leader)),
            )
            .service(
                web::resource("/historial")
                    .route(web::get().to(handlers::evaluaciones::historial)),
            )
            .service(
                web::resource("/get_user_details")
                    .route(web::get().to(handlers::usuarios::get_user_details)),
            )
            .service(
                web::resource("/get_employee_stats")
                    .route(web::get().to(handlers::evaluaciones::get_employee_stats)),
            )
    })
    .bind(bind_addr)?
    .run()
    .await
}
