//! publish-worker
//!
//! Pops `PublishRequestEvent`s from a Redis list, executes each one and
//! publishes lifecycle events on a Redis channel.
//!
//! All settings come from `PUBLISHER__*` environment variables; see
//! `publish_orchestrator::config`.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use tokio::sync::Semaphore;
use tracing::{error, info, warn};

use publish_orchestrator::adapters::events::RedisEventPublisher;
use publish_orchestrator::adapters::media::LocalMediaStorage;
use publish_orchestrator::adapters::oauth::{HttpOAuthTokenClient, OAuthClientCredentials};
use publish_orchestrator::adapters::platforms::{
    FacebookPublisher, InstagramPublisher, LinkedInPublisher, YouTubePublisher,
};
use publish_orchestrator::adapters::postgres::{
    PostgresConnectedAccountStore, PostgresContentItemReader, PostgresPublishJobRepository,
    PostgresPublishedPostRepository,
};
use publish_orchestrator::adapters::redis::RedisRequestQueue;
use publish_orchestrator::application::publishing::{
    ExecutionOutcome, PublishEventEmitter, PublishExecutionService, PublishJobService,
    PublisherRegistry, TokenRefresher,
};
use publish_orchestrator::config::AppConfig;
use publish_orchestrator::ports::{
    ConnectedAccountStore, ContentItemReader, MediaStorage, PublishRequestSource, PublisherStrategy,
};
use publish_orchestrator::telemetry;

const SHUTDOWN_GRACE: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load().context("failed to load configuration")?;
    config.validate().context("invalid configuration")?;
    telemetry::init(&config.worker.log_level);

    info!(environment = ?config.worker.environment, "Starting publish worker");

    let pool = PgPoolOptions::new()
        .min_connections(config.database.min_connections)
        .max_connections(config.database.max_connections)
        .acquire_timeout(config.database.acquire_timeout())
        .connect(&config.database.url)
        .await
        .context("failed to connect to PostgreSQL")?;

    if config.database.run_migrations {
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("failed to run migrations")?;
        info!("Database migrations applied");
    }

    // BRPOP blocks its connection, so the queue gets its own.
    let redis = redis::Client::open(config.redis.url.as_str()).context("invalid Redis URL")?;
    let events_conn = redis
        .get_multiplexed_async_connection()
        .await
        .context("failed to connect to Redis")?;
    let queue_conn = redis
        .get_multiplexed_async_connection()
        .await
        .context("failed to connect to Redis")?;

    let http = reqwest::Client::builder()
        .timeout(config.platforms.request_timeout())
        .build()
        .context("failed to build HTTP client")?;

    let mut oauth = HttpOAuthTokenClient::new(http.clone());
    for (platform, client, token_url) in config.oauth.configured() {
        oauth = oauth.with_credentials(
            platform,
            OAuthClientCredentials::new(
                token_url,
                client.client_id.clone(),
                client.client_secret.clone(),
            ),
        );
        info!(platform = %platform, "OAuth client registered");
    }

    let accounts: Arc<dyn ConnectedAccountStore> =
        Arc::new(PostgresConnectedAccountStore::new(pool.clone()));
    let content: Arc<dyn ContentItemReader> =
        Arc::new(PostgresContentItemReader::new(pool.clone()));
    let media: Arc<dyn MediaStorage> = Arc::new(LocalMediaStorage::new(&config.media.root));

    let strategies: Vec<Arc<dyn PublisherStrategy>> = vec![
        Arc::new(
            YouTubePublisher::new(http.clone(), content.clone(), media)
                .with_base_url(&config.platforms.youtube_base_url),
        ),
        Arc::new(
            LinkedInPublisher::new(http.clone(), content.clone())
                .with_base_url(&config.platforms.linkedin_base_url),
        ),
        Arc::new(
            InstagramPublisher::new(http.clone(), content.clone())
                .with_base_url(&config.platforms.graph_base_url),
        ),
        Arc::new(
            FacebookPublisher::new(http, content).with_base_url(&config.platforms.graph_base_url),
        ),
    ];
    let registry = Arc::new(PublisherRegistry::new(strategies)?);

    let jobs = Arc::new(
        PublishJobService::new(
            Arc::new(PostgresPublishJobRepository::new(pool.clone())),
            Arc::new(PostgresPublishedPostRepository::new(pool)),
        )
        .with_default_max_retries(config.engine.default_max_retries),
    );
    let refresher = Arc::new(
        TokenRefresher::new(accounts.clone(), Arc::new(oauth))
            .with_refresh_buffer(config.engine.refresh_buffer())
            .with_refresh_timeout(config.engine.refresh_timeout()),
    );
    let emitter = PublishEventEmitter::new(Arc::new(RedisEventPublisher::new(
        events_conn,
        config.worker.events_channel.clone(),
    )));
    let service = Arc::new(PublishExecutionService::new(
        jobs, accounts, refresher, registry, emitter,
    ));

    let queue = RedisRequestQueue::new(
        queue_conn,
        config.worker.queue_key.clone(),
        config.worker.poll_timeout_secs,
    );

    info!(
        queue = %config.worker.queue_key,
        channel = %config.worker.events_channel,
        concurrency = config.worker.concurrency,
        "Publish worker started"
    );

    run(&queue, service, config.worker.concurrency).await;

    info!("Publish worker stopped");
    Ok(())
}

/// Consumes requests until Ctrl+C, then waits for in-flight jobs.
async fn run(
    queue: &dyn PublishRequestSource,
    service: Arc<PublishExecutionService>,
    concurrency: usize,
) {
    let permits = Arc::new(Semaphore::new(concurrency));
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        let permit = tokio::select! {
            _ = &mut shutdown => break,
            permit = permits.clone().acquire_owned() => match permit {
                Ok(permit) => permit,
                Err(_) => break,
            },
        };

        let request = tokio::select! {
            _ = &mut shutdown => break,
            next = queue.next_request() => next,
        };

        match request {
            Ok(Some(request)) => {
                let service = service.clone();
                tokio::spawn(async move {
                    let _permit = permit;
                    match service.execute(&request).await {
                        Ok(result) => match result.outcome {
                            ExecutionOutcome::Published { .. }
                            | ExecutionOutcome::AlreadyCompleted => {}
                            ExecutionOutcome::Failed {
                                kind,
                                retry_requested,
                                ..
                            } => info!(
                                job_id = %result.job.id,
                                kind = %kind,
                                retry_requested,
                                "Publish job failed"
                            ),
                        },
                        Err(err) => error!(
                            event_id = %request.event_id,
                            kind = %err.kind(),
                            error = %err,
                            "Publish request could not be executed"
                        ),
                    }
                });
            }
            Ok(None) => {}
            Err(err) => {
                warn!(error = %err, "Failed to read from request queue");
                tokio::time::sleep(Duration::from_secs(1)).await;
            }
        }
    }

    info!("Shutdown signal received, draining in-flight jobs");
    let drained =
        tokio::time::timeout(SHUTDOWN_GRACE, permits.acquire_many(concurrency as u32)).await;
    if drained.is_err() {
        warn!("In-flight jobs still running after shutdown grace period");
    }
}
