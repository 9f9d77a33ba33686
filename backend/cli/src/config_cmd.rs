//! `vani config show|init`.

use std::path::Path;

use anyhow::{bail, Context, Result};

use vani_config::{apply_all_defaults, write_config, VaniConfig};

use crate::terminal_output as out;

/// Effective config as YAML, secrets masked.
pub fn render(config: &VaniConfig) -> Result<String> {
    let mut shown = config.clone();
    if let Some(translation) = shown.translation.as_mut() {
        if translation.api_key.is_some() {
            translation.api_key = Some("***".to_string());
        }
    }
    serde_yaml::to_string(&shown).context("Failed to render config")
}

pub fn show(config: &VaniConfig, path: &Path) -> Result<()> {
    out::print_dim(&format!("# {}", path.display()));
    print!("{}", render(config)?);
    Ok(())
}

/// Writes a fully defaulted config. An existing file needs `--force`; the
/// old one is kept as a backup.
pub async fn init(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    write_config(&apply_all_defaults(VaniConfig::default()), path).await?;
    out::note_success(&format!("Wrote {}", path.display()));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use vani_config::TranslationConfig;

    #[test]
    fn render_masks_api_key() {
        let mut cfg = apply_all_defaults(VaniConfig::default());
        cfg.translation = Some(TranslationConfig {
            provider: Some("libretranslate".into()),
            api_key: Some("lt-secret-123".into()),
            ..Default::default()
        });
        let yaml = render(&cfg).unwrap();
        assert!(!yaml.contains("lt-secret-123"));
        assert!(yaml.contains("apiKey: '***'") || yaml.contains("apiKey: \"***\""));
        assert!(yaml.contains("hintStreak: 2"));
    }

    #[tokio::test]
    async fn init_refuses_to_overwrite_without_force() {
        let dir = std::env::temp_dir().join(format!("vani-cli-init-{}", std::process::id()));
        let path = dir.join("config.yaml");
        init(&path, false).await.unwrap();
        assert!(init(&path, false).await.is_err());
        init(&path, true).await.unwrap();
        assert!(dir.join("config.yaml.bak.1").exists());
        let _ = tokio::fs::remove_dir_all(&dir).await;
    }
}
