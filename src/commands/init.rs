use std::io::{self, Write};

use serde::Serialize;

use crate::config::{Config, DEFAULT_API_URL};
use crate::error::{DirectoryError, Result};

fn prompt(message: &str) -> Result<String> {
    print!("{message}");
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

pub async fn run() -> Result<()> {
    let config_path = Config::config_path()?;

    if config_path.exists() {
        let answer = prompt(&format!(
            "Config file already exists at {}. Overwrite? [y/N] ",
            config_path.display()
        ))?;

        if !answer.eq_ignore_ascii_case("y") {
            println!("Aborted.");
            return Ok(());
        }
    }

    println!("User Directory Configuration");
    println!("============================\n");

    let api_url = prompt(&format!("API base URL [{DEFAULT_API_URL}]: "))?;
    let data_dir = prompt("Data directory for local users [optional]: ")?;

    let config_content = render_config(&ConfigFile {
        api_url: Some(api_url).filter(|v| !v.is_empty()),
        data_dir: Some(data_dir).filter(|v| !v.is_empty()),
    })?;

    let write_err = |e| DirectoryError::ConfigWrite {
        path: config_path.clone(),
        source: e,
    };

    // Create config directory if it doesn't exist
    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent).map_err(write_err)?;
    }

    std::fs::write(&config_path, config_content).map_err(write_err)?;

    println!("\nConfig saved to {}", config_path.display());
    println!("You can now use 'userdir' commands!");

    Ok(())
}

#[derive(Serialize)]
struct ConfigFile {
    #[serde(skip_serializing_if = "Option::is_none")]
    api_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    data_dir: Option<String>,
}

fn render_config(file: &ConfigFile) -> Result<String> {
    Ok(toml::to_string(file)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_config_skips_blank_fields() {
        let rendered = render_config(&ConfigFile {
            api_url: Some("http://localhost:3000".to_string()),
            data_dir: None,
        })
        .unwrap();

        assert_eq!(rendered.trim(), r#"api_url = "http://localhost:3000""#);
    }

    #[test]
    fn test_rendered_config_loads_back() {
        let rendered = render_config(&ConfigFile {
            api_url: Some("http://localhost:3000".to_string()),
            data_dir: Some("/var/lib/userdir".to_string()),
        })
        .unwrap();

        let config: Config = toml::from_str(&rendered).unwrap();
        assert_eq!(config.api_url.as_deref(), Some("http://localhost:3000"));
        assert_eq!(
            config.data_dir,
            Some(std::path::PathBuf::from("/var/lib/userdir"))
        );
    }
}
