use std::io;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use env_logger::Env;

use tourbroker_api::{
    config::{CatalogSource, Config},
    db,
    routes::{self, AppState},
    services::{
        document::{DocumentEngine, TemplateSource},
        tour_repository::{MongoTourRepository, StaticTourRepository, TourRepository},
    },
};

#[actix_web::main]
async fn main() -> io::Result<()> {
    if cfg!(debug_assertions) {
        dotenv::dotenv().ok();
    }

    env_logger::init_from_env(Env::default().default_filter_or("info"));
    log::info!("Application starting...");

    let config = Config::from_env().map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
    for template in &config.templates {
        log::info!("Template {} -> {}", template.key, template.location);
    }

    let source = TemplateSource::new(config.fetch_timeout).map_err(io::Error::other)?;
    let engine = DocumentEngine::new(source, config.substitution);

    match config.catalog.clone() {
        CatalogSource::Mongo(uri) => {
            let client = db::mongo::create_mongo_client(&uri)
                .await
                .map_err(io::Error::other)?;
            serve(config, MongoTourRepository::new(client), engine).await
        }
        CatalogSource::File(path) => {
            let repository = StaticTourRepository::load(&path)
                .await
                .map_err(io::Error::other)?;
            serve(config, repository, engine).await
        }
    }
}

async fn serve<R>(config: Config, repository: R, engine: DocumentEngine) -> io::Result<()>
where
    R: TourRepository + Send + Sync + 'static,
{
    let state = web::Data::new(AppState::new(
        repository,
        engine,
        config.templates.clone(),
    ));
    let allowed_origin = config.allowed_origin.clone();

    log::info!("Starting HTTP server on {}:{}", config.host, config.port);

    HttpServer::new(move || {
        let cors = match &allowed_origin {
            Some(origin) => Cors::default()
                .allowed_origin(origin)
                .allowed_methods(vec!["GET", "POST"])
                .allow_any_header()
                .expose_headers(vec!["content-disposition"])
                .max_age(3600),
            None => Cors::permissive(),
        };

        App::new()
            .wrap(cors)
            .wrap(Logger::default())
            .app_data(state.clone())
            .configure(routes::configure::<R>)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
