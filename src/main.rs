use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};

use mathsprint_server::{app_state::AppState, auth::AuthMiddleware, config::Config, handlers};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_env();
    if config.environment.is_production() {
        config.validate_for_production();
    }

    let state = AppState::new(config)
        .await
        .expect("failed to initialize application state");

    let host = state.config.web_server_host.clone();
    let port = state.config.web_server_port;
    let client_origin = state.config.client_origin.clone();

    println!("🚀 Server running at http://{}:{}", host, port);

    let state = Arc::new(state);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(&client_origin)
            .allow_any_method()
            .allow_any_header()
            .supports_credentials()
            .max_age(3600);

        App::new()
            .app_data(web::Data::new(state.clone()))
            .app_data(web::Data::from(state.token_service.clone()))
            .wrap(cors)
            .wrap(Logger::default())
            .service(handlers::health_check)
            .service(handlers::health_check_ready)
            .service(handlers::health_check_live)
            .service(
                web::scope("/api/auth")
                    .service(handlers::register)
                    .service(handlers::login)
                    .service(handlers::refresh_token)
                    .service(handlers::logout),
            )
            .service(
                web::scope("/api/game")
                    .wrap(AuthMiddleware)
                    .service(handlers::start_game)
                    .service(handlers::submit_answer)
                    .service(handlers::get_questions)
                    .service(handlers::get_result),
            )
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}
