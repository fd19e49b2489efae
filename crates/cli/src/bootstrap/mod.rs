mod logging;

use dnswire_domain::{CliOverrides, Config};

pub use logging::init_logging;

pub fn load_config(path: Option<&str>, overrides: CliOverrides) -> anyhow::Result<Config> {
    Ok(Config::load(path, overrides)?)
}
