use tracing::Level;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::FmtSubscriber;

/// Install a global fmt subscriber.
///
/// `RUST_LOG` takes precedence over `default_level`. Calling this more than
/// once is fine, only the first call installs a subscriber.
pub fn configure_global_logger(default_level: Level) {
    let env_filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy();

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_file(true)
        .with_line_number(true)
        .finish();

    // Errors only if a global subscriber is already set.
    let _ = tracing::subscriber::set_global_default(subscriber);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configure_twice() {
        configure_global_logger(Level::INFO);
        configure_global_logger(Level::DEBUG);
        tracing::info!("logger installed");
    }
}
