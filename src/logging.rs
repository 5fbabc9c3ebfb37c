use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log to stderr so stdout stays clean JSON. `RUST_LOG` wins over `default`.
pub fn init_logger(default: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_thread_ids(false)
                .compact(),
        )
        .init();
}

/// Default filter: quiet for one-shot lookups, request logs when serving.
pub fn default_filter(verbose: bool, serving: bool) -> &'static str {
    match (verbose, serving) {
        (true, _) => "gohubs_locator=debug,gohubs=debug,warn",
        (false, true) => "gohubs_locator=info,gohubs=info,warn",
        (false, false) => "gohubs_locator=warn,gohubs=warn,warn",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_parses() {
        for (v, s) in [(true, false), (false, true), (false, false)] {
            assert!(EnvFilter::try_new(default_filter(v, s)).is_ok());
        }
    }
}
