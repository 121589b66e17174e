use std::time::Duration;

use node_purge::PurgeError;
use node_purge_controller::CancelSignal;
use node_purge_controller::CycleOutcome;
use node_purge_controller::PurgeController;
use node_purge_gke::Credentials;
use node_purge_gke::GkeApi;
use node_purge_kubeapi::KubeApi;

use config::Config;

mod config;

type Purger = PurgeController<KubeApi, GkeApi>;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
    tracing::info!("Starting node-purger");

    let config = Config::from_env()?;
    tracing::info!(
        project = %config.project_id,
        cluster = %config.cluster,
        pools = ?config.node_pools,
        local = config.local,
        "Loaded configuration"
    );

    let credentials = config
        .static_token()
        .map_or(Credentials::MetadataServer, |token| Credentials::Static(token.to_string()));
    let kube = KubeApi::new(config.local).await?;
    let gke = GkeApi::new(&config.project_id, credentials, config.step_timeout())?;
    let purger = PurgeController::new(kube, gke).step_timeout(config.step_timeout());

    let (handle, mut cancel) = CancelSignal::new();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, cancelling");
            handle.cancel();
        }
    });

    let Some(interval) = config.interval() else {
        cycle(&purger, &config, cancel).await?;
        return Ok(());
    };

    tracing::info!(?interval, "Purging on an interval");
    loop {
        if let Err(err) = cycle(&purger, &config, cancel.clone()).await {
            tracing::error!(error = %err, "Purge cycle failed");
        }
        if cancel.is_cancelled() || !sleep(interval, &mut cancel).await {
            break;
        }
    }
    tracing::info!("Stopped");
    Ok(())
}

async fn cycle(purger: &Purger, config: &Config, cancel: CancelSignal) -> Result<(), PurgeError> {
    let outcome = purger
        .run_cycle_until(&config.cluster, &config.node_pools, cancel)
        .await
        .inspect_err(|err| {
            if err.requires_attention() {
                tracing::error!(error = %err, "Node left cordoned, manual uncordon required");
            }
        })?;
    match outcome {
        CycleOutcome::Idle => tracing::info!("Nothing to purge"),
        CycleOutcome::Unhealthy { pools } => tracing::info!(?pools, "Node pool group is unhealthy"),
        CycleOutcome::NoCandidate => tracing::info!("Every node pool is at its floor"),
        CycleOutcome::Purged(node) => tracing::info!(node = %node.name, pool = %node.pool, "Purged"),
    }
    Ok(())
}

/// Wait out `interval`; false when cancelled first.
async fn sleep(interval: Duration, cancel: &mut CancelSignal) -> bool {
    tokio::select! {
        () = cancel.cancelled() => false,
        () = tokio::time::sleep(interval) => true,
    }
}
