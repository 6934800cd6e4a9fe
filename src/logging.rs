use anyhow::{Context, Result};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::Config;

pub fn init_tracing(config: &Config) -> Result<()> {
    let filter_layer = EnvFilter::try_new(&config.log_filter)
        .with_context(|| format!("invalid log filter: {:?}", config.log_filter))?;

    let fmt_layer = fmt::layer().compact().with_target(false).boxed();

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .try_init()
        .context("failed to initialize tracing subscriber")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_filter_is_rejected() {
        let config = Config {
            log_filter: "github_explorer=loudest".to_string(),
            ..Config::default()
        };
        let err = init_tracing(&config).unwrap_err();
        assert!(err.to_string().contains("invalid log filter"));
    }
}
