//! Command line configuration.

use clap::{CommandFactory, Parser};

/// Ethereum vanity address generator with password-protected private keys
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Address prefix to search for; look-alike letters are mapped onto hex
    /// (e.g. "Bob" searches for 0x80b...)
    #[arg(short, long, default_value = "", allow_hyphen_values = true)]
    pub prefix: String,

    /// Encrypt the generated private key with this key
    #[arg(short, long, allow_hyphen_values = true)]
    pub key: Option<String>,

    /// Read a line from stdin and print it encrypted with KEY
    #[arg(short, long, value_name = "KEY", allow_hyphen_values = true)]
    pub encrypt: Option<String>,

    /// Read a line from stdin and print it decrypted with KEY
    #[arg(short, long, value_name = "KEY", allow_hyphen_values = true)]
    pub decrypt: Option<String>,

    /// Number of worker threads (default: number of CPU cores)
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Log diagnostics at debug level on stderr
    #[arg(short, long, default_value = "false")]
    pub verbose: bool,
}

/// What a run of the binary does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Search for an address, optionally encrypting its private key.
    Generate { prefix: String, key: Option<String> },
    /// Encrypt one line of stdin.
    Encrypt { key: String },
    /// Decrypt one line of stdin.
    Decrypt { key: String },
}

/// Outcome of reading the command line.
#[derive(Debug)]
pub enum Invocation {
    Run(Config),
    /// Help or version was requested, or the arguments were malformed.
    Usage(clap::Error),
}

impl Config {
    /// Parses the process arguments.
    pub fn from_env() -> Invocation {
        Self::from_args(std::env::args_os())
    }

    pub fn from_args<I, T>(args: I) -> Invocation
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        match Self::try_parse_from(args) {
            Ok(config) => Invocation::Run(config),
            Err(e) => Invocation::Usage(e),
        }
    }

    /// Rendered usage text.
    pub fn usage() -> String {
        Self::command().render_help().to_string()
    }

    /// Resolves the operating mode. Encrypt wins over decrypt, and both win
    /// over generation.
    pub fn mode(&self) -> Mode {
        if let Some(key) = &self.encrypt {
            Mode::Encrypt { key: key.clone() }
        } else if let Some(key) = &self.decrypt {
            Mode::Decrypt { key: key.clone() }
        } else {
            Mode::Generate {
                prefix: self.prefix.clone(),
                key: self.key.clone(),
            }
        }
    }

    /// Returns the number of workers, defaulting to CPU count
    pub fn worker_count(&self) -> usize {
        self.workers.filter(|&n| n > 0).unwrap_or_else(num_cpus::get)
    }
}
