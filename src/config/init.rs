use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use crate::config::{get_config_path, Config, DataSourceMode};
use crate::data_source::DEFAULT_SEED;
use crate::scoring::{validate_scoring, CompositeWeights, Domain};

/// Prompt user with a message and return their trimmed input.
fn prompt(message: &str) -> Result<String> {
    print!("{}", message);
    std::io::stdout()
        .flush()
        .context("Failed to flush stdout")?;
    let mut input = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut input)
        .context("Failed to read input")?;
    Ok(input.trim().to_string())
}

/// Prompt user with a message and a default value. Returns default if input is empty.
fn prompt_with_default(message: &str, default: &str) -> Result<String> {
    let input = prompt(&format!("{} [{}]: ", message, default))?;
    if input.is_empty() {
        Ok(default.to_string())
    } else {
        Ok(input)
    }
}

/// Prompt user with a yes/no question. Returns bool based on input and default.
fn prompt_yes_no(message: &str, default_yes: bool) -> Result<bool> {
    let hint = if default_yes { "Y/n" } else { "y/N" };
    let input = prompt(&format!("{} [{}]: ", message, hint))?;
    let input = input.to_lowercase();
    if input.is_empty() {
        Ok(default_yes)
    } else {
        Ok(input == "y" || input == "yes")
    }
}

/// Prompt for a non-negative number until one parses.
fn prompt_weight(message: &str, default: f64) -> Result<f64> {
    loop {
        let input = prompt_with_default(message, &default.to_string())?;
        match input.parse::<f64>() {
            Ok(v) if v.is_finite() && v >= 0.0 => return Ok(v),
            _ => println!("  Invalid: must be a non-negative number. Try again."),
        }
    }
}

fn set_weight(weights: &mut CompositeWeights, domain: Domain, value: f64) {
    match domain {
        Domain::Emf => weights.emf = value,
        Domain::Crime => weights.crime = value,
        Domain::Climate => weights.climate = value,
        Domain::Esoteric => weights.esoteric = value,
    }
}

/// Write a config file atomically, creating parent directories as needed.
pub fn write_config(path: &Path, config: &Config) -> Result<()> {
    let yaml = serde_saphyr::to_string(config)
        .map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    let mut file = AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;
    file.write_all(yaml.as_bytes())
        .with_context(|| format!("Failed to write config to {}", path.display()))?;
    file.commit().context("Failed to save config")?;
    Ok(())
}

/// Create a config file. With `accept_defaults` the built-in defaults are
/// written without prompting; otherwise the user is walked through the
/// data source and composite weights.
///
/// Returns the path written, or `None` when the user declined to overwrite.
pub fn run_init(default_path: Option<PathBuf>, accept_defaults: bool) -> Result<Option<PathBuf>> {
    let default_config_path = match default_path {
        Some(p) => p,
        None => get_config_path()?,
    };

    if accept_defaults {
        write_config(&default_config_path, &Config::default())?;
        return Ok(Some(default_config_path));
    }

    println!();
    println!("Realty Risk Configuration");
    println!("=========================");
    println!();

    let mut config = Config::default();

    // 1. Data source
    println!("Crime and climate lookups can use seeded demo data or a live feed.");
    println!("Demo results are always marked as simulated.");
    let synthetic = prompt_yes_no("Use synthetic demo data?", true)?;
    if synthetic {
        config.data_source.mode = DataSourceMode::Synthetic;
        config.data_source.seed = loop {
            let input = prompt_with_default("Random seed", &DEFAULT_SEED.to_string())?;
            match input.parse::<u64>() {
                Ok(v) => break v,
                Err(_) => println!("  Invalid: must be a whole number. Try again."),
            }
        };
    } else {
        config.data_source.mode = DataSourceMode::Live;
    }

    // 2. Composite weights
    println!();
    println!("The composite score blends each domain by weight. Weights must sum to 1.0.");
    if prompt_yes_no("Customize composite weights? (n accepts defaults)", false)? {
        loop {
            let mut weights = config.scoring.composite.clone();
            for domain in Domain::ALL {
                let value = prompt_weight(&format!("  {} weight", domain), weights.weight(domain))?;
                set_weight(&mut weights, domain, value);
            }
            let mut candidate = config.scoring.clone();
            candidate.composite = weights;
            match validate_scoring(&candidate) {
                Ok(()) => {
                    config.scoring = candidate;
                    break;
                }
                Err(errors) => {
                    for error in errors {
                        println!("  Invalid: {}", error);
                    }
                    println!("  Try again.");
                }
            }
        }
    }

    // 3. Config path
    println!();
    let path_str = prompt_with_default(
        "Where should the config be saved?",
        &default_config_path.display().to_string(),
    )?;
    let config_path = PathBuf::from(&path_str);

    if config_path.exists() {
        let overwrite = prompt_yes_no(
            &format!(
                "Config already exists at {}. Overwrite?",
                config_path.display()
            ),
            false,
        )?;
        if !overwrite {
            println!("Aborted.");
            return Ok(None);
        }
    }

    write_config(&config_path, &config)?;
    Ok(Some(config_path))
}
