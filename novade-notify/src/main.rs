use anyhow::{Context, Result};
use novade_core::{init_logging, init_minimal_logging, ConfigLoader};
use novade_notify::{
    BannerBoard, DesktopNotifier, FilesystemNotificationHistoryProvider, NotificationService,
    Notifier, Presenter, WebSocketTransport,
};
use std::sync::Arc;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let config = match ConfigLoader::load() {
        Ok(config) => config,
        Err(e) => {
            init_minimal_logging();
            error!("Invalid notification configuration: {}", e);
            return Err(e).context("Failed to load configuration");
        }
    };
    init_logging(&config.logging, false).context("Failed to initialize logging")?;

    let history_path = config
        .history
        .file_path
        .clone()
        .context("No notification history path configured")?;
    info!("Notification history at {:?}", history_path);

    let alert: Option<Arc<dyn Notifier>> = if config.presenter.native_alerts {
        Some(Arc::new(DesktopNotifier::new().await))
    } else {
        None
    };
    let banners = Arc::new(BannerBoard::new(config.presenter.banner_timeout()));
    let presenter = Arc::new(Presenter::new(alert, banners));

    let service = NotificationService::new(
        &config,
        Arc::new(WebSocketTransport::new()),
        Arc::new(FilesystemNotificationHistoryProvider::new(history_path)),
        presenter,
    )
    .await;

    if !service.request_permission().await {
        warn!("Desktop alerts unavailable, showing in-app banners only");
    }
    info!(
        "{} notification(s) in history, {} unread",
        service.get_all().await.len(),
        service.unread_count().await
    );

    service.subscribe("listener", |notification| {
        info!(
            id = %notification.id,
            kind = %notification.kind,
            "{}: {}",
            notification.title,
            notification.message
        );
        Ok(())
    });

    let mut states = service.watch_connection_state();
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Ctrl-C received, shutting down");
                break;
            }
            changed = states.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = *states.borrow_and_update();
                info!("Connection state: {}", state);
            }
        }
    }

    service.disconnect();
    Ok(())
}
