use lenscat::api;
use lenscat::logger::*;
use lenscat::server::*;
use lenscat::settings::*;
use std::fs;
use std::sync::Arc;
use tokio::signal;
use warp::Filter;

async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        error!("could not listen for ctrl-c: {}", e);
        std::future::pending::<()>().await;
    }
}

fn ensure_file(path: &str, what: &str) -> anyhow::Result<()> {
    if !fs::metadata(path)?.is_file() {
        return Err(anyhow::anyhow!("TLS {} is not a regular file: {:?}", what, path));
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut project_settings = parse_settings(cli.settings.as_deref())?;
    if let Some(address) = cli.address {
        project_settings.http.address = address;
    }

    let logger = Logger::new_bootstrap(project_settings.log.format);
    info!(?project_settings);
    let logger_config = LogConfig {
        filter: project_settings.log.filter.clone(),
    };
    logger.reload_from_config(&logger_config)?;

    let address: std::net::SocketAddr = project_settings.http.address.parse()?;
    let tls = match (&project_settings.http.cert_path, &project_settings.http.key_path) {
        (Some(cert), Some(key)) => {
            ensure_file(cert, "cert")?;
            ensure_file(key, "key")?;
            Some((cert.clone(), key.clone()))
        }
        (None, None) => None,
        _ => {
            return Err(anyhow::anyhow!(
                "http.cert_path and http.key_path must be set together"
            ));
        }
    };

    let server = Arc::new(Server::try_new(&project_settings).await?);

    let app = api::routes(server.clone())
        .recover(api::recover_error)
        .with(warp::trace::request());

    match tls {
        Some((cert, key)) => {
            info!(%address, "listening with TLS");
            warp::serve(app)
                .tls()
                .cert_path(cert)
                .key_path(key)
                .bind_with_graceful_shutdown(address, shutdown_signal())
                .1
                .await;
        }
        None => {
            info!(%address, "listening");
            let (_, serving) =
                warp::serve(app).try_bind_with_graceful_shutdown(address, shutdown_signal())?;
            serving.await;
        }
    }

    let shutdown_timeout = std::time::Duration::from_secs(30);
    match tokio::time::timeout(shutdown_timeout, server.shutdown()).await {
        Ok(_) => info!("server shutdown successfully"),
        Err(_) => error!("server shutdown timed out"),
    }

    Ok(())
}
