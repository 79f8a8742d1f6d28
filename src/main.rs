use actix_web::{App, HttpServer, web};
use tinylink::{
    config::{self, StoreBackend, logger::LoggerConfig},
    domain::{
        id::{Generator, RandomGenerator},
        repository::MappingStore,
    },
    handler::{handlers::Handler, routes},
    memory, postgres,
    usecase::usecase::Usecase,
};
use tracing_subscriber::{EnvFilter, fmt::time::ChronoLocal};

fn build_logger(config: &LoggerConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(ChronoLocal::rfc_3339());

    match config.format {
        config::logger::LogFormat::Json => builder.json().init(),
        config::logger::LogFormat::Text => builder.init(),
    }
}

async fn serve<G, S>(cfg: &config::Config, usecase: Usecase<G, S>) -> std::io::Result<()>
where
    G: Generator + 'static,
    S: MappingStore + 'static,
{
    let handler = web::Data::new(Handler::new(usecase));

    tracing::info!(host = %cfg.handler.host, port = cfg.handler.port, "Starting HTTP server");
    HttpServer::new(move || {
        App::new()
            .app_data(handler.clone())
            .configure(routes::configure::<G, S>)
    })
    .bind((cfg.handler.host.as_str(), cfg.handler.port))?
    .run()
    .await
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let cfg = match config::load() {
        Ok(cfg) => cfg,
        Err(err) => {
            eprintln!("Failed to load configuration: {}", err);
            std::process::exit(1);
        }
    };
    build_logger(&cfg.logger);

    tracing::debug!(config = ?cfg, "Configuration loaded successfully");

    let format = cfg.usecase.id_format().map_err(std::io::Error::other)?;
    tracing::info!(
        length = format.length(),
        alphabet_size = format.alphabet().len(),
        keyspace = %format.keyspace(),
        store = ?cfg.store,
        "Short id format"
    );
    let generator = RandomGenerator::new(format.clone());

    match cfg.store {
        StoreBackend::Memory => {
            let db = memory::db::DB::new();
            let usecase = Usecase::new(generator, db, format, cfg.usecase.max_retries())
                .map_err(std::io::Error::other)?;
            serve(&cfg, usecase).await
        }
        StoreBackend::Postgres => {
            let db = postgres::db::DB::new(cfg.postgres.clone())
                .await
                .map_err(|e| std::io::Error::other(format!("Failed to connect to Postgres: {e:#}")))?;
            let usecase = Usecase::new(generator, db, format, cfg.usecase.max_retries())
                .map_err(std::io::Error::other)?;
            serve(&cfg, usecase).await
        }
    }
}
