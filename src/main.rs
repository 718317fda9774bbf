use std::{process, sync::Arc};

use cartage::{
    application::{
        content_cache::ThreadRngJitter,
        error::AppError,
        sitemap::{SitemapConfig, SitemapService},
    },
    config,
    domain::services::service_slugs,
    infra::{
        content::TomlContentStore,
        error::InfraError,
        http::{self, HttpState},
        telemetry,
    },
};
use tracing::{Dispatch, Level, dispatcher, error, info};
use tracing_subscriber::fmt as tracing_fmt;

/// Marketing pages with no backing content document.
const STATIC_PATHS: [&str; 6] = ["/", "/services", "/cases", "/about", "/contact", "/tools"];

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
        config::Command::Sitemap(_) => run_sitemap(settings).await,
    }
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let (content, sitemap) = build_content_services(&settings)?;

    let state = HttpState {
        content,
        jitter: Arc::new(ThreadRngJitter),
        sitemap,
        page_size: settings.site.page_size,
    };
    let router = http::build_router(state);

    let listener = tokio::net::TcpListener::bind(settings.server.public_addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;

    info!(addr = %settings.server.public_addr, "listening");
    axum::serve(listener, router.into_make_service())
        .await
        .map_err(|err| AppError::unexpected(format!("server error: {err}")))?;

    Ok(())
}

async fn run_sitemap(settings: config::Settings) -> Result<(), AppError> {
    let (_, sitemap) = build_content_services(&settings)?;
    let xml = sitemap.sitemap_xml().await?;
    print!("{xml}");
    Ok(())
}

fn build_content_services(
    settings: &config::Settings,
) -> Result<(Arc<TomlContentStore>, Arc<SitemapService>), AppError> {
    let content = Arc::new(TomlContentStore::load(&settings.content.directory)?);
    info!(
        directory = %settings.content.directory.display(),
        documents = content.len(),
        "content store ready"
    );

    let sitemap = Arc::new(SitemapService::new(
        content.clone(),
        SitemapConfig {
            base_url: settings.site.base_url.clone(),
            static_paths: STATIC_PATHS.iter().map(|path| path.to_string()).collect(),
            service_slugs: service_slugs(),
            page_size: settings.site.page_size,
            default_lastmod: settings.site.default_lastmod,
        },
    ));

    Ok((content, sitemap))
}
