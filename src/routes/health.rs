use actix_web::{web, HttpResponse, Responder};
use serde::Serialize;
use std::collections::BTreeMap;
use std::env;

use crate::routes::AppState;
use crate::services::tour_repository::TourRepository;

#[derive(Serialize)]
struct HealthStatus {
    status: String,
    services: BTreeMap<String, ServiceStatus>,
    environment: String,
    version: String,
}

#[derive(Serialize, Clone)]
struct ServiceStatus {
    status: String,
    details: Option<String>,
}

pub async fn health_check<R: TourRepository + 'static>(
    state: web::Data<AppState<R>>,
) -> impl Responder {
    let mut health = HealthStatus {
        status: "ok".to_string(),
        services: BTreeMap::new(),
        environment: env::var("RUST_ENV").unwrap_or("development".to_string()),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    let catalog = match state.repository.list_tours().await {
        Ok(tours) => ServiceStatus {
            status: "ok".to_string(),
            details: Some(format!("{} tour(s)", tours.len())),
        },
        Err(e) => ServiceStatus {
            status: "error".to_string(),
            details: Some(e.to_string()),
        },
    };
    health.services.insert("catalog".to_string(), catalog);

    let templates = state
        .templates
        .iter()
        .map(|template| format!("{}={}", template.key, template.location))
        .collect::<Vec<_>>()
        .join(", ");
    health.services.insert(
        "templates".to_string(),
        ServiceStatus {
            status: "configured".to_string(),
            details: Some(templates),
        },
    );

    if health.services.values().any(|s| s.status == "error") {
        health.status = "degraded".to_string();
        return HttpResponse::ServiceUnavailable().json(health);
    }

    HttpResponse::Ok().json(health)
}
