use std::{process, sync::Arc};

use poshpoule::{
    application::{clock::SystemClock, error::AppError},
    config,
    domain::document::Database,
    infra::{
        error::InfraError,
        http::{self, ApiState},
        mail, telemetry,
        store::JsonDocumentStore,
    },
};
use tokio::sync::oneshot;
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
        config::Command::Init(_) => run_init(settings).await,
        config::Command::Check(_) => run_check(settings).await,
    }
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let store = Arc::new(JsonDocumentStore::open(settings.store.path.clone()));
    let notifier = mail::build_dispatcher(&settings.mail)
        .map_err(|err| AppError::from(InfraError::configuration(err.to_string())))?;

    let state = ApiState::assemble(
        store.clone(),
        settings.catalog.cache_ttl,
        Arc::new(SystemClock),
        notifier,
    );

    // The service still starts so /healthz can report the broken store.
    if let Err(err) = state.catalog.init().await {
        warn!(
            target = "poshpoule::serve",
            path = %store.path().display(),
            error = %err,
            "Product catalog could not be warmed"
        );
    }

    serve_http(&settings, state).await
}

async fn run_init(settings: config::Settings) -> Result<(), AppError> {
    let store = JsonDocumentStore::open(settings.store.path.clone());
    let created = store
        .initialize(Database::default())
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;

    if created {
        info!(
            target = "poshpoule::init",
            path = %store.path().display(),
            "Created empty data file"
        );
    } else {
        info!(
            target = "poshpoule::init",
            path = %store.path().display(),
            "Data file already exists; left untouched"
        );
    }
    Ok(())
}

async fn run_check(settings: config::Settings) -> Result<(), AppError> {
    let store = JsonDocumentStore::open(settings.store.path.clone());
    let document = store
        .read()
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;

    info!(
        target = "poshpoule::check",
        path = %store.path().display(),
        version = document.version,
        products = document.products.len(),
        orders = document.orders.len(),
        leads = document.leads.len(),
        quarantined = document.quarantined.len(),
        currency_rates = document.currency_rates.len(),
        "Data file is readable"
    );
    Ok(())
}

async fn serve_http(settings: &config::Settings, state: ApiState) -> Result<(), AppError> {
    let router = http::build_router(state);
    let listener = tokio::net::TcpListener::bind(settings.server.addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;

    info!(
        target = "poshpoule::serve",
        addr = %settings.server.addr,
        "Listening"
    );

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let server = axum::serve(listener, router.into_make_service()).with_graceful_shutdown(
        async move {
            let _ = shutdown_rx.await;
        },
    );
    let mut handle = tokio::spawn(async move { server.await });

    tokio::select! {
        joined = &mut handle => return server_outcome(joined),
        signal = tokio::signal::ctrl_c() => {
            if let Err(err) = signal {
                warn!(target = "poshpoule::serve", error = %err, "Signal listener failed");
            }
            info!(target = "poshpoule::serve", "Shutdown requested");
        }
    }

    let _ = shutdown_tx.send(());
    match tokio::time::timeout(settings.server.graceful_shutdown, &mut handle).await {
        Ok(joined) => server_outcome(joined),
        Err(_) => {
            warn!(
                target = "poshpoule::serve",
                deadline_seconds = settings.server.graceful_shutdown.as_secs(),
                "Graceful shutdown deadline elapsed; dropping open connections"
            );
            handle.abort();
            Ok(())
        }
    }
}

fn server_outcome(
    joined: Result<std::io::Result<()>, tokio::task::JoinError>,
) -> Result<(), AppError> {
    match joined {
        Ok(Ok(())) => Ok(()),
        Ok(Err(err)) => Err(AppError::unexpected(format!("server error: {err}"))),
        Err(err) => Err(AppError::unexpected(format!("server task failed: {err}"))),
    }
}
