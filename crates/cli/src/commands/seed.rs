//! Seed the product catalog from a YAML file.
//!
//! The file is a list of products using the same keys as
//! `POST /api/products`:
//!
//! ```yaml
//! - name: Sapphire Ring
//!   price: 249.99
//!   imageUrl: /images/sapphire-ring.jpg
//!   stock: 4
//!   category: Rings
//! ```

use std::path::Path;

use tracing::{error, info};

use gem_shop_api::models::NewProduct;
use gem_shop_api::services::ProductService;

/// Parse a YAML catalog.
fn parse_catalog(content: &str) -> Result<Vec<NewProduct>, serde_yaml::Error> {
    serde_yaml::from_str(content)
}

/// Create every product in the file.
///
/// Products that fail validation are reported and skipped.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, the database is
/// unreachable, or any product was rejected.
pub async fn products(file_path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let path = Path::new(file_path);
    if !path.exists() {
        return Err(format!("File not found: {file_path}").into());
    }

    info!(path = %file_path, "Loading products from file");

    // Parse before connecting to the database
    let content = tokio::fs::read_to_string(path).await?;
    let catalog = parse_catalog(&content)?;

    info!(products = catalog.len(), "Parsed catalog");

    let store = super::connect().await?;
    let service = ProductService::new(&store);

    let mut created = 0_usize;
    let mut failures = Vec::new();
    for (index, product) in catalog.into_iter().enumerate() {
        let label = product.name.clone().unwrap_or_else(|| format!("#{index}"));
        match service.create(product).await {
            Ok(product) => {
                created += 1;
                info!(id = %product.id, name = %product.name, "Created product");
            }
            Err(e) => failures.push((label, e)),
        }
    }

    info!("Seeding complete!");
    info!("  Products created: {created}");

    if !failures.is_empty() {
        error!("  Errors: {}", failures.len());
        for (label, err) in &failures {
            error!("    - {label}: {err}");
        }
        return Err(format!("{} products rejected", failures.len()).into());
    }

    Ok(())
}
