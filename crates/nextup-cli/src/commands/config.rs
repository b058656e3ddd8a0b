use super::prompts;
use crate::output::{styled_table, Output};
use crate::ConfigCommands;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use comfy_table::Cell;
use nextup_config::{ComicVineConfig, Config, Credential, CredentialStore, PathManager, TvdbConfig};
use nextup_sources::PlexHttpClient;
use owo_colors::OwoColorize;
use serde_json::json;

pub async fn run_config(cmd: ConfigCommands, output: &Output) -> Result<()> {
    match cmd {
        ConfigCommands::Show { full } => show_config(full, output),
        ConfigCommands::Plex { server_url, token } => configure_plex(server_url, token, output).await,
        ConfigCommands::Tvdb { api_key, pin, disable } => configure_tvdb(api_key, pin, disable, output),
        ConfigCommands::Comicvine { api_key, disable } => configure_comicvine(api_key, disable, output),
    }
}

struct Files {
    paths: PathManager,
    config: Config,
    credentials: CredentialStore,
}

impl Files {
    fn load() -> Result<Self> {
        let paths = PathManager::default();
        paths
            .ensure_directories()
            .map_err(|e| eyre!("Failed to create configuration directories: {}", e))?;

        let config_file = paths.config_file();
        let config = Config::load_or_default(&config_file)
            .map_err(|e| eyre!("Failed to load config from {}: {}", config_file.display(), e))?;

        let mut credentials = CredentialStore::new(paths.credentials_file());
        credentials
            .load()
            .map_err(|e| eyre!("Failed to load credentials: {}", e))?;

        Ok(Self {
            paths,
            config,
            credentials,
        })
    }

    fn save(&self) -> Result<()> {
        let config_file = self.paths.config_file();
        self.config
            .save_to_file(&config_file)
            .map_err(|e| eyre!("Failed to save config to {}: {}", config_file.display(), e))?;
        self.credentials
            .save()
            .map_err(|e| eyre!("Failed to save credentials: {}", e))?;
        Ok(())
    }
}

fn show_config(full: bool, output: &Output) -> Result<()> {
    let files = Files::load()?;
    let config = &files.config;
    let creds = &files.credentials;
    let secret = |value: Option<&String>| match value {
        Some(v) if full => v.clone(),
        Some(v) => mask_string(v),
        None => "(not set)".to_string(),
    };
    let tvdb_enabled = config.tvdb.as_ref().map(|t| t.enabled).unwrap_or(false);
    let comicvine_enabled = config.comicvine.as_ref().map(|c| c.enabled).unwrap_or(false);
    let scheduler = config.scheduler_or_default();
    let database = config.database_path(&files.paths.data_dir());

    if !output.is_human() {
        output.data(&json!({
            "config_file": files.paths.config_file(),
            "database": database,
            "plex": {
                "server_url": config.plex.server_url,
                "timeout_secs": config.plex.timeout_secs,
                "token": secret(creds.get(Credential::PlexToken)),
            },
            "tvdb": {
                "enabled": tvdb_enabled,
                "api_key": secret(creds.get(Credential::TvdbApiKey)),
            },
            "comicvine": {
                "enabled": comicvine_enabled,
                "api_key": secret(creds.get(Credential::ComicVineApiKey)),
            },
            "scheduler": {
                "run_on_startup": scheduler.run_on_startup,
                "default_interval_hours": scheduler.default_interval_hours,
            },
            "selection": {
                "max_attempts": config.selection.max_attempts,
            },
        }));
        return Ok(());
    }

    let enabled = |on: bool| if on { "✓".green().to_string() } else { "✗".red().to_string() };
    let mut table = styled_table(&["Setting", "Value"]);
    let rows = [
        ("Config file", files.paths.config_file().display().to_string()),
        ("Database", database.display().to_string()),
        (
            "Plex server",
            Some(config.plex.server_url.clone())
                .filter(|u| !u.is_empty())
                .unwrap_or_else(|| "(not set)".to_string()),
        ),
        ("Plex token", secret(creds.get(Credential::PlexToken))),
        ("TVDB", enabled(tvdb_enabled)),
        ("TVDB API key", secret(creds.get(Credential::TvdbApiKey))),
        ("ComicVine", enabled(comicvine_enabled)),
        ("ComicVine API key", secret(creds.get(Credential::ComicVineApiKey))),
        ("Sync on startup", enabled(scheduler.run_on_startup)),
        ("Fallback interval", format!("{}h", scheduler.default_interval_hours)),
        ("Max pick attempts", config.selection.max_attempts.to_string()),
    ];
    for (label, value) in rows {
        table.add_row(vec![Cell::new(label), Cell::new(value)]);
    }
    output.table(&table);
    Ok(())
}

async fn configure_plex(server_url: Option<String>, token: Option<String>, output: &Output) -> Result<()> {
    let mut files = Files::load()?;

    let current = Some(files.config.plex.server_url.clone()).filter(|u| !u.is_empty());
    let server_url = prompts::value_or_prompt(server_url, || {
        prompts::prompt_string(
            "Plex server URL",
            Some(current.as_deref().unwrap_or("http://localhost:32400")),
        )
    })?;
    let token = prompts::value_or_prompt(token, || prompts::prompt_secret("Plex token"))?;

    files.config.plex.server_url = server_url.trim_end_matches('/').to_string();
    files.config.validate()?;
    files.credentials.set(Credential::PlexToken, token.clone());

    let client = PlexHttpClient::new(&files.config.plex.server_url, &token, files.config.plex.timeout())
        .map_err(|e| eyre!("Invalid Plex settings: {:#}", e))?;
    match client.check_connection().await {
        Ok(machine) => output.success(format!("Connected to Plex server {}", machine)),
        Err(e) => output.warn(format!("Could not reach Plex yet: {:#}", e)),
    }

    files.save()?;
    output.success("Plex configuration saved");
    Ok(())
}

fn configure_tvdb(api_key: Option<String>, pin: Option<String>, disable: bool, output: &Output) -> Result<()> {
    let mut files = Files::load()?;

    if disable {
        files.config.tvdb = Some(TvdbConfig { enabled: false });
        files.save()?;
        output.success("TVDB lookups disabled");
        return Ok(());
    }

    let api_key = prompts::value_or_prompt(api_key, || prompts::prompt_secret("TVDB API key"))?;
    files.credentials.set(Credential::TvdbApiKey, api_key);
    if let Some(pin) = pin.map(|p| p.trim().to_string()).filter(|p| !p.is_empty()) {
        files.credentials.set(Credential::TvdbPin, pin);
    }
    files.config.tvdb = Some(TvdbConfig { enabled: true });
    files.save()?;
    output.success("TVDB configuration saved");
    Ok(())
}

fn configure_comicvine(api_key: Option<String>, disable: bool, output: &Output) -> Result<()> {
    let mut files = Files::load()?;

    if disable {
        files.config.comicvine = Some(ComicVineConfig { enabled: false });
        files.save()?;
        output.success("ComicVine lookups disabled");
        return Ok(());
    }

    let api_key = prompts::value_or_prompt(api_key, || prompts::prompt_secret("ComicVine API key"))?;
    files.credentials.set(Credential::ComicVineApiKey, api_key);
    files.config.comicvine = Some(ComicVineConfig { enabled: true });
    files.save()?;
    output.success("ComicVine configuration saved");
    Ok(())
}

/// First and last four characters for values long enough to keep some hidden.
fn mask_string(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_string() {
        assert_eq!(mask_string("abc"), "***");
        assert_eq!(mask_string("abcdefghijkl"), "abcd...ijkl");
    }
}
