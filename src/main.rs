use chrono::Local;
use dotenvy::dotenv;
use tailwind_backoffice::{
    config::{catalog, database},
    core::{billing_plan, report},
    errors::Result,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; variables may also come from the environment
    dotenv().ok();
    info!("Attempted to load .env file.");

    // 3. Connect and make sure the schema exists
    let db = database::create_connection()
        .await
        .inspect(|_| info!("Connected to database."))
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db)
        .await
        .inspect_err(|e| error!("Failed to create tables: {}", e))?;

    // 4. Seed billing plans from the catalog, if there is one
    let catalog_path = catalog::get_catalog_path();
    match catalog::load_catalog_if_present(&catalog_path)
        .inspect_err(|e| error!("Failed to load plan catalog: {}", e))?
    {
        Some(catalog) => {
            let inserted = billing_plan::seed_catalog(&db, &catalog.plans)
                .await
                .inspect_err(|e| error!("Failed to seed plan catalog: {}", e))?;
            info!(inserted, path = %catalog_path, "Plan catalog processed.");
        }
        None => info!(path = %catalog_path, "No plan catalog found, skipping seeding."),
    }

    // 5. Report where the business stands today
    let summary = report::generate_summary(&db, Local::now().date_naive()).await?;
    info!("{summary}");

    Ok(())
}
