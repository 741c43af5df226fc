use anyhow::{Context, Result};
use console::style;
use dialoguer::{Input, Select};
use voyagent_core::config::{self, Config};

const BANNER: &str = r"
    -------------------------------------

        ✈   v o y a g e n t
            travel booking concierge

    -------------------------------------
";

fn print_step(step: usize, total: usize, title: &str) {
    println!();
    println!(
        "{}",
        style(format!("[{}/{}] {}", step, total, title))
            .cyan()
            .bold()
    );
    println!();
}

fn setup_provider() -> Result<(String, String)> {
    let providers = vec!["openai", "openrouter"];

    let selection = Select::new()
        .with_prompt("Select your model provider")
        .items(&providers)
        .default(0)
        .interact()
        .context("Failed to select provider")?;
    let provider = providers[selection].to_string();

    let api_key: String = Input::new()
        .with_prompt(format!("Enter your {} API key", provider))
        .interact_text()
        .context("Failed to read API key")?;

    if api_key.is_empty() {
        return Err(anyhow::anyhow!("API key cannot be empty"));
    }

    Ok((provider, api_key))
}

fn setup_model(provider: &str) -> Result<String> {
    if provider == "openrouter" {
        let model: String = Input::new()
            .with_prompt("Model id")
            .default("openai/gpt-4o".to_string())
            .interact_text()
            .context("Failed to read model id")?;
        return Ok(model);
    }

    let models = vec!["gpt-5", "gpt-5-mini", "gpt-4o", "gpt-4o-mini"];

    let selection = Select::new()
        .with_prompt("Select your model")
        .items(&models)
        .default(0)
        .interact()
        .context("Failed to select model")?;

    Ok(models[selection].to_string())
}

fn optional_input(prompt: &str) -> Result<Option<String>> {
    let value: String = Input::new()
        .with_prompt(prompt)
        .allow_empty(true)
        .interact_text()
        .context("Failed to read input")?;

    if value.is_empty() {
        Ok(None)
    } else {
        Ok(Some(value))
    }
}

fn setup_travel_keys() -> Result<(Option<String>, Option<String>, Option<String>)> {
    println!(
        "  {}",
        style("Optional. Press Enter to skip any of these; searches without keys return sample data.")
            .dim()
    );
    println!();

    let serpapi_key = optional_input("SerpAPI key (live flight search)")?;
    let amadeus_api_key = optional_input("Amadeus API key (live hotel search)")?;
    let amadeus_api_secret = if amadeus_api_key.is_some() {
        optional_input("Amadeus API secret")?
    } else {
        None
    };

    Ok((serpapi_key, amadeus_api_key, amadeus_api_secret))
}

pub fn run_onboard() -> Result<Config> {
    println!("{}", style(BANNER).cyan().bold());

    println!("  {}", style("Welcome to voyagent!").white().bold());
    println!(
        "  {}",
        style("This wizard will configure your concierge in under a minute.").dim()
    );
    println!();

    print_step(1, 4, "Provider Setup");
    let (provider, api_key) = setup_provider()?;

    print_step(2, 4, "Model Selection");
    let model = setup_model(&provider)?;

    print_step(3, 4, "Travel Data Providers");
    let (serpapi_key, amadeus_api_key, amadeus_api_secret) = setup_travel_keys()?;

    let config = Config {
        provider: Some(provider),
        api_key,
        model,
        serpapi_key,
        amadeus_api_key,
        amadeus_api_secret,
        ..Default::default()
    };

    print_step(4, 4, "Data Directory");
    if let Err(e) = std::fs::create_dir_all(&config.data_dir) {
        eprintln!(
            "  {} Warning: Could not create data directory: {}",
            style("!").yellow(),
            e
        );
    } else {
        println!(
            "  {} Bookings will be stored at {}",
            style("✓").green(),
            style(config.data_dir.join("bookings").display()).cyan()
        );
    }

    println!();
    println!("  {} Configuration complete!", style("✓").green().bold());
    println!(
        "  {} Config saved to {}",
        style("→").green(),
        style(config::get_config_path().display()).cyan()
    );
    println!();
    println!(
        "  {} You can now run: {}",
        style("→").green(),
        style("voyagent chat").cyan().bold()
    );
    println!();

    Ok(config)
}
