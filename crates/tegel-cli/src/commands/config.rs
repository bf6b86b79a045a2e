use std::path::Path;

use anyhow::Result;

use tegel_core::config::GeneratorConfig;

use crate::output;

/// Print the effective configuration, or write a starter file with `--write`.
///
/// Refuses to replace an existing config file.
pub fn run(config_path: &Path, write: bool) -> Result<()> {
    if write {
        if config_path.exists() {
            anyhow::bail!("{} already exists", config_path.display());
        }
        GeneratorConfig::starter().save(config_path)?;
        output::print_success(&format!("Wrote {}", config_path.display()));
        return Ok(());
    }

    let config = GeneratorConfig::load_or_default(config_path)?;
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_starter_then_refuse_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tegel.config.json");
        run(&path, true).unwrap();
        let config = GeneratorConfig::load(&path).unwrap();
        assert_eq!(config, GeneratorConfig::starter());
        assert!(run(&path, true).is_err());
    }

    #[test]
    fn test_print_with_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        run(&dir.path().join("missing.json"), false).unwrap();
    }
}
