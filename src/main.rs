use cube_morph::cli::CliOverrides;
use cube_morph::run_with_overrides;
use tracing_subscriber::EnvFilter;

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("cube_morph=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli_overrides = match CliOverrides::parse_from_env() {
        Ok(parsed) => parsed.into_config_overrides(),
        Err(err) => {
            tracing::error!("{err}");
            std::process::exit(2);
        }
    };
    if let Err(err) = run_with_overrides(cli_overrides) {
        tracing::error!("Application error: {err:?}");
        std::process::exit(1);
    }
}
