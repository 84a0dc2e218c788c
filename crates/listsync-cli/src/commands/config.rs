use super::prompts;
use crate::output::{Output, OutputFormat};
use color_eyre::Result;
use comfy_table::{Cell, Table};
use list_sync_config::{default_simkl_status_mapping, Config, CredentialStore, PathManager, ServiceTokens, SimklConfig};
use list_sync_plugins::http::create_http_client;
use list_sync_plugins::simkl_authenticate;
use owo_colors::OwoColorize;
use serde_json::json;

pub async fn run_config(cmd: crate::ConfigCommands, output: &Output) -> Result<()> {
    match cmd {
        crate::ConfigCommands::Show { full } => show_config(full, output).await,
        crate::ConfigCommands::Simkl { client_id, client_secret } => configure_simkl(client_id, client_secret, output).await,
    }
}

async fn show_config(full: bool, output: &Output) -> Result<()> {
    let path_manager = PathManager::default();
    let config_file = path_manager.config_file();

    if !config_file.exists() {
        output.warn(format!("Configuration file not found at: {}", config_file.display()));
        output.info("Configuration will be created automatically when you run 'listsync config simkl'.");
        return Ok(());
    }

    let config = Config::load_from_file(&config_file)
        .map_err(|e| color_eyre::eyre::eyre!("Failed to load config from {}: {}", config_file.display(), e))?;

    let mut credentials = CredentialStore::new(path_manager.credentials_file());
    credentials
        .load()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to load credentials: {}", e))?;
    let signed_in = credentials.has_access_token("simkl");
    let configured = config.is_simkl_configured();

    let secret = |value: &str| if full { value.to_string() } else { mask_string(value) };

    match output.format() {
        OutputFormat::Human => {
            if output.is_quiet() {
                return Ok(());
            }

            println!("\n{}", "╔════════════════════════════════════════════════════════════╗".bright_white());
            println!("{}", "║".bright_white());
            println!("{} {}", "║".bright_white(), "Configuration".bright_cyan().bold());
            println!("{}", "╚════════════════════════════════════════════════════════════╝".bright_white());
            println!();

            let mut info_table = rounded_table();
            info_table.set_header(vec![
                Cell::new("Config File").add_attribute(comfy_table::Attribute::Bold),
                Cell::new(config_file.display().to_string()),
            ]);
            println!("{}", info_table);
            println!();

            if let Some(simkl) = &config.simkl {
                let mut simkl_table = section_table("Simkl Configuration");
                simkl_table.add_row(vec![Cell::new("Enabled"), Cell::new(check_mark(simkl.enabled))]);
                simkl_table.add_row(vec![Cell::new("App credentials set"), Cell::new(check_mark(configured))]);
                simkl_table.add_row(vec![Cell::new("Client ID"), Cell::new(secret(&simkl.client_id))]);
                simkl_table.add_row(vec![Cell::new("Client Secret"), Cell::new(secret(&simkl.client_secret))]);
                simkl_table.add_row(vec![Cell::new("Signed in"), Cell::new(check_mark(signed_in))]);
                println!("{}", simkl_table);
                println!();
            } else {
                println!("{}", "Simkl: Not configured".bright_black());
                println!();
            }

            let mut endpoints_table = section_table("Endpoints");
            endpoints_table.add_row(vec![Cell::new("Simkl API"), Cell::new(&config.endpoints.simkl_api)]);
            endpoints_table.add_row(vec![Cell::new("ID mapping (ARM)"), Cell::new(&config.endpoints.arm_api)]);
            endpoints_table.add_row(vec![Cell::new("AniList GraphQL"), Cell::new(&config.endpoints.anilist_graphql)]);
            println!("{}", endpoints_table);
            println!();
        }
        OutputFormat::Json | OutputFormat::JsonPretty => {
            let json_config = json!({
                "config_file": config_file.display().to_string(),
                "simkl": config.simkl.as_ref().map(|simkl| json!({
                    "enabled": simkl.enabled,
                    "configured": configured,
                    "client_id": secret(&simkl.client_id),
                    "client_secret": secret(&simkl.client_secret),
                    "signed_in": signed_in,
                })),
                "endpoints": {
                    "simkl_api": config.endpoints.simkl_api,
                    "arm_api": config.endpoints.arm_api,
                    "anilist_graphql": config.endpoints.anilist_graphql,
                },
            });
            output.json(&json_config);
        }
    }

    Ok(())
}

async fn configure_simkl(client_id_arg: Option<String>, client_secret_arg: Option<String>, output: &Output) -> Result<()> {
    let path_manager = PathManager::default();
    path_manager
        .ensure_directories()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to create configuration directories: {}", e))?;

    let config_file = path_manager.config_file();
    let mut config = if config_file.exists() {
        Config::load_from_file(&config_file)
            .map_err(|e| color_eyre::eyre::eyre!("Failed to load config from {}: {}", config_file.display(), e))?
    } else {
        output.info("Configuration file not found. Creating default configuration...");
        Config::default()
    };

    print_section_header("Simkl API Setup", output);
    output.println("");
    output.println("Follow the instructions to setup your Simkl API application:");
    print_instruction_list(
        &[
            "Login to Simkl and navigate to your API apps page: https://simkl.com/settings/developer/new/",
            "Create a new API application named 'ListSync'",
            "No redirect URI is needed - we use PIN authentication",
        ],
        output,
    );
    output.println("");

    let existing = config.simkl.as_ref();
    let client_id = match client_id_arg {
        Some(id) => id,
        None => {
            let default = existing
                .map(|simkl| simkl.client_id.as_str())
                .filter(|id| !id.is_empty() && *id != "YOUR_CLIENT_ID");
            loop {
                let input = prompts::prompt_string("Simkl Client ID", default)?;
                match validate_client_id(&input) {
                    Ok(()) => break input,
                    Err(e) => {
                        output.error(format!("Validation error: {}", e));
                        output.info("You can find your Client ID at: https://simkl.com/settings/developer/");
                    }
                }
            }
        }
    };

    let client_secret = match client_secret_arg {
        Some(secret) => secret,
        None => {
            let confirm = existing
                .map(|simkl| simkl.client_secret.as_str())
                .filter(|s| !s.is_empty() && *s != "YOUR_CLIENT_SECRET")
                .is_none();
            prompts::prompt_password("Simkl Client Secret", confirm)?
        }
    };

    if client_id.is_empty() || client_secret.is_empty() {
        return Err(color_eyre::eyre::eyre!("Client ID and Client Secret are required"));
    }

    config.simkl = Some(simkl_config_with_credentials(config.simkl.as_ref(), &client_id, &client_secret));
    config
        .validate()
        .map_err(|e| color_eyre::eyre::eyre!("Invalid configuration: {}", e))?;
    config
        .save_to_file(&config_file)
        .map_err(|e| color_eyre::eyre::eyre!("Failed to save config to {}: {}", config_file.display(), e))?;

    let credentials_file = path_manager.credentials_file();
    let mut cred_store = CredentialStore::new(credentials_file.clone());
    cred_store
        .load()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to load credentials from {}: {}", credentials_file.display(), e))?;

    output.println("");
    print_auth_progress("Starting Simkl authentication...", output);

    let http = create_http_client();
    let refresh_token = cred_store.refresh_token("simkl");
    let token_info = simkl_authenticate(
        &http,
        &config.endpoints.simkl_api,
        &client_id,
        &client_secret,
        refresh_token,
        |code| {
            output.println("");
            output.println(format!("Visit {} and enter the code:", code.verification_url.bright_blue()));
            output.println(format!("  {}", code.user_code.bold().bright_green()));
            output.println("");
            print_auth_progress("Waiting for authorization...", output);
        },
    )
    .await
    .map_err(|e| color_eyre::eyre::eyre!("Simkl authentication failed: {}", e))?;

    print_auth_progress("Authentication successful! Saving credentials...", output);

    let refresh_token = Some(token_info.refresh_token).filter(|token| !token.is_empty());
    cred_store.set_tokens(
        "simkl",
        ServiceTokens {
            access_token: token_info.access_token,
            refresh_token,
            expires_at: Some(token_info.expires_at),
        },
    );
    cred_store
        .save()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to save credentials to {}: {}", credentials_file.display(), e))?;

    output.println("");
    output.success("Simkl authentication successful!");

    Ok(())
}

/// New Simkl section for the given app credentials, keeping an edited status mapping
fn simkl_config_with_credentials(existing: Option<&SimklConfig>, client_id: &str, client_secret: &str) -> SimklConfig {
    // The default mapping is written out on first setup so it can be edited
    let status_mapping = existing
        .map(|simkl| simkl.status_mapping.clone())
        .unwrap_or_else(default_simkl_status_mapping);

    SimklConfig {
        enabled: true,
        client_id: client_id.to_string(),
        client_secret: client_secret.to_string(),
        status_mapping,
    }
}

fn mask_string(s: &str) -> String {
    if s.is_empty() || s == "YOUR_CLIENT_ID" || s == "YOUR_CLIENT_SECRET" {
        return "<not set>".to_string();
    }
    let chars: Vec<char> = s.chars().collect();
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..2].iter().collect();
    let tail: String = chars[chars.len() - 2..].iter().collect();
    format!("{}***{}", head, tail)
}

fn validate_client_id(input: &str) -> Result<(), &'static str> {
    if input.is_empty() {
        return Err("Client ID cannot be empty");
    }
    if input.len() < 10 {
        return Err("Client ID seems too short. Please verify it's correct.");
    }
    Ok(())
}

fn check_mark(value: bool) -> String {
    if value {
        "✓".green().to_string()
    } else {
        "✗".red().to_string()
    }
}

fn rounded_table() -> Table {
    let mut table = Table::new();
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
    table
}

fn section_table(title: &str) -> Table {
    let mut table = rounded_table();
    table.set_header(vec![Cell::new(title)
        .fg(comfy_table::Color::Cyan)
        .add_attribute(comfy_table::Attribute::Bold)]);
    table
}

// Formatting helpers

fn print_section_header(title: &str, output: &Output) {
    output.println("");
    output.println(format!("{}", title.bold().bright_cyan()));
    output.println(format!("{}", "─".repeat(title.len()).bright_cyan()));
}

fn print_instruction_list(items: &[&str], output: &Output) {
    for (idx, item) in items.iter().enumerate() {
        output.println(format!("  {}. {}", idx + 1, item));
    }
}

fn print_auth_progress(message: &str, output: &Output) {
    output.println(format!("{} {}", "→".bright_blue(), message.bright_white()));
}
