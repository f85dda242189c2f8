//! Init command implementation
//!
//! Writes a starter `joigo.toml` and `.env.example` into a directory.

use super::output::Output;
use crate::i18n::Language;
use crate::models::Currency;
use std::fs;
use std::path::{Path, PathBuf};

/// Result of the init operation
#[derive(Debug, PartialEq, Eq)]
pub enum InitResult {
    /// Initialization completed successfully
    Success,
    /// joigo.toml is already present
    AlreadyExists,
    /// An error occurred during initialization
    Error(String),
}

/// Configuration for the init command
pub struct InitConfig {
    /// Directory to initialize
    pub path: PathBuf,
    /// Overwrite existing files
    pub force: bool,
    /// Backend base URL
    pub api_url: String,
    /// Supabase project URL, if known
    pub supabase_url: Option<String>,
    pub language: Language,
    pub currency: Currency,
}

/// Run the init command
pub fn run(config: InitConfig, output: &Output) -> InitResult {
    output.banner();
    output.header("Initializing Joigo client");

    let base_path = &config.path;
    if !base_path.exists() {
        if let Err(e) = fs::create_dir_all(base_path) {
            output.error(&format!("Failed to create {}: {}", base_path.display(), e));
            return InitResult::Error(e.to_string());
        }
        output.created_dir(&base_path.display().to_string());
    }

    let config_path = base_path.join("joigo.toml");
    if config_path.exists() && !config.force {
        output.warning("joigo.toml already exists!");
        output.hint("Use --force to overwrite existing files");
        return InitResult::AlreadyExists;
    }

    output.subheader("Creating configuration files");

    if let Err(e) = write_file(&config_path, &generate_joigo_toml(&config), config.force) {
        output.error(&format!("Failed to create joigo.toml: {}", e));
        return InitResult::Error(e.to_string());
    }
    output.created("config", "joigo.toml");

    let env_example_path = base_path.join(".env.example");
    match write_file(&env_example_path, &generate_env_example(), config.force) {
        Ok(()) => output.created("env", ".env.example"),
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
            output.skipped(".env.example", "already exists")
        }
        Err(e) => {
            output.error(&format!("Failed to create .env.example: {}", e));
            return InitResult::Error(e.to_string());
        }
    }

    output.complete("Joigo is ready");
    output.hint("Copy .env.example to .env and fill in your Supabase anon key, then try:");
    output.command("joigo tours list");

    InitResult::Success
}

fn write_file(path: &Path, content: &str, force: bool) -> std::io::Result<()> {
    if path.exists() && !force {
        return Err(std::io::Error::new(
            std::io::ErrorKind::AlreadyExists,
            format!("{} already exists", path.display()),
        ));
    }
    fs::write(path, content)
}

fn generate_joigo_toml(config: &InitConfig) -> String {
    let supabase_url = match &config.supabase_url {
        Some(url) => format!("url = \"{}\"", url),
        None => "# url = \"https://<project>.supabase.co\"".to_string(),
    };

    format!(
        r#"# Joigo client configuration
#
# Every section is optional. Environment variables (or a .env file)
# override these values: JOIGO_API_URL, SUPABASE_URL, SUPABASE_ANON_KEY,
# JOIGO_LANGUAGE.

[api]
base_url = "{api_url}"
# timeout_secs = 30

[supabase]
{supabase_url}
anon_key_env = "SUPABASE_ANON_KEY"
redirect_to = "http://localhost:8080"

[storage]
# path = "./storage.json"

[logging]
level = "warn"
format = "pretty"

[ui]
language = "{language}"
currency = "{currency}"
"#,
        api_url = config.api_url,
        supabase_url = supabase_url,
        language = config.language,
        currency = config.currency,
    )
}

fn generate_env_example() -> String {
    r#"# Joigo environment overrides
JOIGO_API_URL=http://127.0.0.1:8000
SUPABASE_URL=https://<project>.supabase.co
SUPABASE_ANON_KEY=
# JOIGO_LANGUAGE=VI
# RUST_LOG=joigo=debug
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::config::JoigoConfig;
    use tempfile::TempDir;

    fn init_config(path: &Path, force: bool) -> InitConfig {
        InitConfig {
            path: path.to_path_buf(),
            force,
            api_url: "https://api.joigo.vn".to_string(),
            supabase_url: None,
            language: Language::Vi,
            currency: Currency::Vnd,
        }
    }

    #[test]
    fn test_generated_toml_parses() {
        let dir = TempDir::new().unwrap();
        let toml = generate_joigo_toml(&init_config(dir.path(), false));
        let parsed = JoigoConfig::from_toml(&toml).unwrap();

        assert_eq!(parsed.api.base_url, "https://api.joigo.vn");
        assert_eq!(parsed.ui.language, Language::Vi);
        assert_eq!(parsed.ui.currency, Currency::Vnd);
        assert!(parsed.supabase.url.is_none());
    }

    #[test]
    fn test_init_refuses_to_overwrite() {
        let dir = TempDir::new().unwrap();
        let output = Output::no_color();

        assert_eq!(run(init_config(dir.path(), false), &output), InitResult::Success);
        assert!(dir.path().join("joigo.toml").exists());
        assert!(dir.path().join(".env.example").exists());

        assert_eq!(
            run(init_config(dir.path(), false), &output),
            InitResult::AlreadyExists
        );
        assert_eq!(run(init_config(dir.path(), true), &output), InitResult::Success);
    }
}
