//! Configuration template writer.

use fofa::{BotConfig, ConfigError, ConfigErrorKind, FofaResult};
use std::path::Path;
use tracing::info;

/// Write the configuration template to `path`.
///
/// Refuses to replace an existing file unless `force` is set.
pub fn write_template(path: &Path, force: bool) -> FofaResult<()> {
    if path.exists() && !force {
        return Err(ConfigError::new(ConfigErrorKind::AlreadyExists(
            path.display().to_string(),
        ))
        .into());
    }

    BotConfig::template().save(path)?;
    info!(path = %path.display(), "Wrote configuration template");
    println!(
        "Created {}. Fill in bot_token and apis before running `fofa run`.",
        path.display()
    );
    Ok(())
}
