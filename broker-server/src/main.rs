use broker_server::{setup_environment, WorkflowManager};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Environment (dotenv, work directory, logging)
    let config = setup_environment()?;

    tracing::info!(environment = %config.environment, "Broker server starting");

    // 2. Open the workflow engine
    let manager = WorkflowManager::new(config.db_path())?;
    tracing::info!(
        open_orders = manager.get_open_orders()?.len(),
        db = %config.db_path().display(),
        "Workflow engine ready"
    );

    // 3. Relay emitted alerts to the log until shutdown; transport
    // layers embed the manager and subscribe the same way
    let mut alerts = manager.subscribe();
    loop {
        match alerts.recv().await {
            Ok(alert) => tracing::info!(
                notification_id = %alert.notification_id,
                order_id = %alert.order_id,
                kind = ?alert.kind,
                recipient = alert.recipient_key(),
                "Alert emitted"
            ),
            Err(tokio::sync::broadcast::error::RecvError::Lagged(missed)) => {
                tracing::warn!(missed, "Alert subscriber lagged");
            }
            Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
        }
    }

    Ok(())
}
