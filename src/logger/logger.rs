use crate::settings::LogFormat;
use anyhow::{Result, anyhow};
use tracing_subscriber::{
    EnvFilter, Registry, fmt, layer::SubscriberExt, reload, util::SubscriberInitExt,
};

pub struct LogConfig {
    pub filter: String,
}

pub struct Logger {
    reload_handle: reload::Handle<EnvFilter, Registry>,
}

impl Logger {
    /// Install the global subscriber at `info`. The output format is fixed
    /// here; only the filter can be swapped later.
    pub fn new_bootstrap(format: LogFormat) -> Self {
        let filter = EnvFilter::new("info");
        let (filter, reload_handle) = reload::Layer::new(filter);

        let (text, json) = match format {
            LogFormat::Text => (Some(fmt::layer()), None),
            LogFormat::Json => (None, Some(fmt::layer().json())),
        };

        tracing_subscriber::registry()
            .with(filter)
            .with(text)
            .with(json)
            .init();

        Self { reload_handle }
    }

    pub fn reload_from_config(&self, config: &LogConfig) -> Result<()> {
        let filter = parse_filter(&config.filter)?;
        self.reload_handle.reload(filter).map_err(|e| anyhow!(e))?;
        Ok(())
    }
}

fn parse_filter(filter: &str) -> Result<EnvFilter> {
    EnvFilter::try_new(filter).map_err(|e| anyhow!("invalid log filter {filter:?}: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_directive_lists() {
        assert!(parse_filter("lenscat=debug,warp=info,warn").is_ok());
    }

    #[test]
    fn rejects_malformed_directives() {
        assert!(parse_filter("lenscat=[").is_err());
    }
}
