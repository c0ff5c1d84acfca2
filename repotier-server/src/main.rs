#![deny(missing_docs)]
//! Repotier server executable.
//!
//! Hosts the HTTP endpoint that fetches repository metadata from GitHub and
//! scores its maturity.

mod github;
mod openapi;
mod routes;

#[cfg(not(test))]
use actix_cors::Cors;
#[cfg(not(test))]
use actix_web::{App, HttpServer, http::header, web};
#[cfg(not(test))]
use dotenvy::dotenv;

#[allow(unused_imports)]
use std::str::FromStr;
#[cfg(not(test))]
use std::sync::Arc;

#[cfg(not(test))]
use crate::github::GitHubApiClient;
#[cfg(not(test))]
use crate::routes::{AppState, analyze, health, openapi_json};

#[cfg(not(test))]
fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // The blocking client must be built before the actix runtime starts.
    let github = GitHubApiClient::from_env().map_err(std::io::Error::other)?;
    let state = web::Data::new(AppState {
        source: Arc::new(github),
    });

    let origins = std::env::var("REPOTIER_UI_ORIGINS")
        .unwrap_or_else(|_| "http://127.0.0.1:4200,http://localhost:4200".to_string());
    let allowed_origins: Vec<String> = origins
        .split(',')
        .map(|value| value.trim())
        .filter(|origin| !origin.is_empty())
        .map(String::from)
        .collect();

    let listen_addr = std::env::var("REPOTIER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let listen_port =
        u16::from_str(&std::env::var("REPOTIER_PORT").unwrap_or_else(|_| "8080".to_string()))
            .map_err(|err| {
                std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    format!("REPOTIER_PORT must be a u16 number: {err}"),
                )
            })?;
    log::info!("listening on {listen_addr}:{listen_port}");

    actix_web::rt::System::new().block_on(async move {
        HttpServer::new(move || {
            let mut cors = Cors::default()
                .allowed_methods(vec!["GET", "POST", "OPTIONS"])
                .allowed_headers(vec![header::CONTENT_TYPE])
                .max_age(3600);
            for origin in &allowed_origins {
                cors = cors.allowed_origin(origin);
            }
            App::new()
                .wrap(actix_web::middleware::Logger::default())
                .wrap(cors)
                .app_data(state.clone())
                .service(analyze)
                .service(health)
                .service(openapi_json)
        })
        .bind((listen_addr, listen_port))?
        .run()
        .await
    })
}

#[cfg(test)]
fn main() {}
