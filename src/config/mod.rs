use crate::utils::error::Result;
use crate::utils::validation::{validate_path, validate_url, Validate};
use clap::{Parser, Subcommand};

#[derive(Debug, Clone, Parser)]
#[command(name = "catalog-relations")]
#[command(about = "Bulk import/export tooling for catalog product relations")]
pub struct CliConfig {
    #[arg(long, default_value = "http://localhost:8000/api")]
    pub api_endpoint: String,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Fetch the joined catalog from the API and write the export file
    Export,
    /// Write the static import template, no network calls
    Template,
    /// Upload a file to the collaborator preview endpoint and print the result
    Preview {
        #[arg(long)]
        file: String,
    },
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_url("api_endpoint", &self.api_endpoint)?;
        validate_path("output_path", &self.output_path)?;
        if let Command::Preview { file } = &self.command {
            validate_path("file", file)?;
        }
        Ok(())
    }
}
