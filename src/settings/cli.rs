use super::Parser;

/// Lens catalog API server.
#[derive(Parser, Debug)]
#[command(version, about)]
pub struct Cli {
    /// Path to a TOML settings file. Environment variables still override it.
    #[arg(long)]
    pub settings: Option<String>,

    /// Listen address, overriding `http.address`.
    #[arg(long)]
    pub address: Option<String>,
}
