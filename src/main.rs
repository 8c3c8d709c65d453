use atelier::{
    config::{admin, catalog, database},
    core::dashboard::{self, DashboardPeriod},
    errors::Result,
};
use dotenvy::dotenv;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; env vars can also be set externally
    dotenv().ok();

    // 3. Period for the dashboard summary, `month` when not given
    let period = std::env::args()
        .nth(1)
        .map(|arg| arg.parse::<DashboardPeriod>())
        .transpose()
        .inspect_err(|e| error!("Invalid period argument: {}", e))?
        .unwrap_or_default();

    // 4. Connect and make sure the schema exists
    let db = database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db).await?;
    info!("Database initialized successfully.");

    // 5. Seed the catalog into empty tables and resolve the admin account
    let seed = catalog::load_default_catalog()
        .inspect_err(|e| error!("Failed to load catalog seed: {}", e))?;
    catalog::seed_catalog(&db, &seed).await?;
    let credentials = admin::get_admin_credentials()
        .inspect_err(|e| error!("Failed to read admin credentials: {}", e))?;
    info!(admin_email = %credentials.email, "Admin credentials loaded");

    // 6. Print the dashboard
    let stats = dashboard::get_dashboard_stats(&db, period).await?;
    print!("{}", dashboard::format_dashboard_summary(&stats));

    Ok(())
}
