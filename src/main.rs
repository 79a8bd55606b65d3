use product_catalog::config::load_config;
use product_catalog::infrastructure::{logger::Logger, table::TableFile};
use tokio::net::TcpListener;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (config, source) = load_config()?;
    config.validate()?;

    Logger::init(&config.logging.level);
    match source {
        Some(path) => info!("Loaded configuration from {}", path.display()),
        None => info!("No configuration file found, using defaults"),
    }

    let table = TableFile::new(&config.storage.path);
    if !table.path().exists() {
        warn!(
            "Product table {} does not exist, requests will fail until it is provisioned",
            table.path().display()
        );
    }

    let addr = config.socket_addr()?;
    let listener = TcpListener::bind(addr).await?;

    info!("Product catalog listening on http://{}", addr);
    info!("   GET  /products/view    - list products");
    info!("   POST /products/create  - create a product");
    info!("   PUT  /products/update  - update a product by sku");

    axum::serve(listener, product_catalog::router(table)).await?;
    Ok(())
}
