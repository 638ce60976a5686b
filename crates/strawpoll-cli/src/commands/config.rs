use anyhow::{Context as _, Result};

use super::Context;
use crate::cli::{ConfigCommand, ConfigSetArgs};
use crate::config::{config_path, ConfigFile};

pub fn run(command: ConfigCommand, ctx: &Context) -> Result<()> {
    match command {
        ConfigCommand::Show => show(ctx),
        ConfigCommand::Set(args) => set(args),
        ConfigCommand::Path => {
            println!("{}", config_path()?.display());
            Ok(())
        }
    }
}

fn show(ctx: &Context) -> Result<()> {
    let config = ConfigFile::load(&config_path()?)?;
    if ctx.output.is_json() {
        return ctx.output.json(&config);
    }
    println!("{}", render_toml(&config)?);
    Ok(())
}

fn render_toml(config: &ConfigFile) -> Result<String> {
    if config.is_empty() {
        return Ok("# No configuration set (using defaults)".to_string());
    }
    let body = toml::to_string_pretty(config).context("encode config")?;
    Ok(body.trim_end().to_string())
}

fn set(args: ConfigSetArgs) -> Result<()> {
    let path = config_path()?;
    let mut config = ConfigFile::load(&path)?;
    config.set(&args.key, &args.value)?;
    config.save(&path)?;
    println!("{} = {}", args.key, args.value);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_renders_placeholder() {
        assert_eq!(
            render_toml(&ConfigFile::default()).unwrap(),
            "# No configuration set (using defaults)"
        );
    }

    #[test]
    fn set_values_render_as_toml() {
        let mut config = ConfigFile::default();
        config.set("results_visibility", "hidden").unwrap();
        config.set("allow_comments", "true").unwrap();
        let text = render_toml(&config).unwrap();
        assert!(text.contains("results_visibility = \"hidden\""));
        assert!(text.contains("allow_comments = true"));
        assert!(!text.ends_with('\n'));
    }
}
