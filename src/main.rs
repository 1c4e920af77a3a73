use catalog_relations::core::flatten;
use catalog_relations::utils::{logger, validation::Validate};
use catalog_relations::{BatchGateway, CatalogApiClient, CliConfig, Command, Result};
use clap::Parser;
use std::fs;
use std::path::Path;

#[tokio::main]
async fn main() {
    let config = CliConfig::parse();

    logger::init_cli_logger(config.verbose);

    tracing::info!("Starting catalog-relations CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    if let Err(e) = config.validate() {
        tracing::error!("Configuration validation failed: {}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    if let Err(e) = run(&config).await {
        tracing::error!("Command failed: {}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(config: &CliConfig) -> Result<()> {
    let client = CatalogApiClient::new(&config.api_endpoint);

    match &config.command {
        Command::Export => {
            let products = client.export().await?;
            tracing::info!("Fetched {} products for export", products.len());

            let document = flatten::export_document(&products);
            let path = write_output(&config.output_path, "catalogo_productos.csv", &document)?;
            println!("Export saved to: {}", path);
        }
        Command::Template => {
            let document = flatten::template_document();
            let path = write_output(&config.output_path, "plantilla_importacion.csv", &document)?;
            println!("Template saved to: {}", path);
        }
        Command::Preview { file } => {
            let data = fs::read(file)?;
            let response = client.preview(&data).await?;

            println!("Rows: {}", response.total_rows);
            println!("Can import: {}", response.can_import);
            if response.validation_errors.is_empty() {
                println!("No validation errors");
            } else {
                println!("Validation errors:");
                for error in &response.validation_errors {
                    println!("  - {}", error);
                }
            }
        }
    }

    Ok(())
}

fn write_output(output_path: &str, file_name: &str, content: &str) -> Result<String> {
    let dir = Path::new(output_path);
    fs::create_dir_all(dir)?;
    let full_path = dir.join(file_name);
    fs::write(&full_path, content.as_bytes())?;
    Ok(full_path.display().to_string())
}
