//! Ethereum vanity wallet CLI
//!
//! Usage:
//!   eth_vanity_wallet                      # Random address, plaintext key
//!   eth_vanity_wallet -p cafe              # Address starting with "cafe"
//!   eth_vanity_wallet -p Bob -k hunter2    # Address starting with "80b", key encrypted
//!   eth_vanity_wallet -e hunter2           # Encrypt a line from stdin
//!   eth_vanity_wallet -d hunter2           # Decrypt a line from stdin

use std::io::{self, BufRead};
use std::process;

use clap::error::ErrorKind;
use tracing_subscriber::EnvFilter;

use eth_vanity_wallet::config::{Invocation, Mode};
use eth_vanity_wallet::{cipher, Config, Prefix, SearchEngine, Secp256k1Source, StdoutProgress};

fn main() {
    let config = match Config::from_env() {
        Invocation::Run(config) => config,
        Invocation::Usage(e) => match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => e.exit(),
            _ => {
                print!("{}", Config::usage());
                return;
            }
        },
    };

    init_logging(config.verbose);

    match config.mode() {
        Mode::Encrypt { key } => {
            println!("Enter the string to encrypt:");
            match read_line() {
                Some(input) => println!("Encrypted string: {}", cipher::encrypt(&input, &key)),
                None => println!("Invalid input"),
            }
        }
        Mode::Decrypt { key } => {
            println!("Enter the string to decrypt:");
            match read_line() {
                Some(input) => match cipher::decrypt(&input, &key) {
                    Ok(plaintext) => println!("Decrypted string: {}", plaintext),
                    Err(e) => println!("Decryption failed: {}", e),
                },
                None => println!("Invalid input"),
            }
        }
        Mode::Generate { prefix, key } => generate(&config, &prefix, key.as_deref()),
    }
}

fn generate(config: &Config, input: &str, key: Option<&str>) {
    // Validate before any worker starts
    let prefix = match Prefix::new(input) {
        Ok(prefix) => prefix,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            process::exit(1);
        }
    };

    let target = if prefix.is_empty() {
        "Generating random private key".to_string()
    } else {
        format!(
            "Generating private key for addresses starting with: {} (searching 0x{})",
            input, prefix
        )
    };
    match key {
        Some(key) => println!("{} and encrypting it with key \"{}\"", target, key),
        None => println!("{}", target),
    }

    let engine = SearchEngine::new(Secp256k1Source::new()).with_workers(config.worker_count());
    println!("Difficulty: {}", prefix.difficulty_description());
    println!("Workers:    {}", engine.num_workers());
    println!();

    let outcome = match engine.search(&prefix, StdoutProgress) {
        Ok(outcome) => outcome,
        Err(e) => {
            eprintln!("Search failed: {}", e);
            process::exit(1);
        }
    };

    let found = &outcome.found;
    println!();
    println!("Address: {}", found.checksum_address());
    match key {
        Some(key) => println!(
            "Private key encrypted with key \"{}\": {}",
            key,
            cipher::encrypt(&found.private_key, key)
        ),
        None => println!("Private key not encrypted: {}", found.private_key),
    }

    println!();
    println!("Keys generated: {}", format_number(outcome.total_generated));
    println!("Time elapsed:   {:.2}s", outcome.elapsed.as_secs_f64());
    println!(
        "Average speed:  {}/s",
        format_number(outcome.keys_per_second() as u64)
    );
}

/// One line from stdin without its line terminator; `None` on EOF.
fn read_line() -> Option<String> {
    let mut line = String::new();
    match io::stdin().lock().read_line(&mut line) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(line.trim_end_matches(['\r', '\n']).to_string()),
    }
}

fn format_number(n: u64) -> String {
    if n >= 1_000_000_000 {
        format!("{:.2}B", n as f64 / 1_000_000_000.0)
    } else if n >= 1_000_000 {
        format!("{:.2}M", n as f64 / 1_000_000.0)
    } else if n >= 1_000 {
        format!("{:.2}K", n as f64 / 1_000.0)
    } else {
        n.to_string()
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .with_thread_names(true)
        .init();
}
