//! # stash
//!
//! Runs a single cache operation against the configured store and prints
//! the outcome. Exits with status 1 when the operation failed.

use anyhow::Context;
use clap::{Parser, Subcommand};
use stash_cache::{build_store_module, register_metrics, CacheFacade, CacheOutcome};
use stash_config::ConfigLoader;
use stash_core::{init_tracing, ErrorReport, StashError, StashResult};
use stash_store::InMemoryStore;
use std::collections::HashMap;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error};

#[derive(Parser, Debug)]
#[command(name = "stash", version, about = "Run cache operations against Redis")]
struct Cli {
    /// Directory holding default.toml, {environment}.toml and local.toml.
    #[arg(long, env = "STASH_CONFIG_DIR", default_value = "config")]
    config_dir: PathBuf,

    /// Use a process-local store instead of Redis.
    #[arg(long)]
    memory: bool,

    /// Print failures as JSON error reports.
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Read a value.
    Get { key: String },
    /// Store a value.
    Set {
        key: String,
        value: String,
        /// Expire after this many seconds.
        #[arg(long)]
        ttl: Option<u64>,
    },
    /// Store a value under a generated key PREFIX:N and print the key.
    AutoKey { prefix: String, value: String },
    /// Check whether a key exists.
    Has { key: String },
    /// Replace a value and print the previous one.
    GetSet { key: String, value: String },
    /// Delete a key.
    Del { key: String },
    /// Delete every key starting with PREFIX.
    DelPrefix { prefix: String },
    /// List every key starting with PREFIX.
    Keys { prefix: String },
    /// Append values to a list.
    ListPush {
        key: String,
        #[arg(required = true)]
        values: Vec<String>,
    },
    /// Remove the first list element equal to VALUE.
    ListRm { key: String, value: String },
    /// Print a whole list.
    List { key: String },
    /// Write hash fields given as FIELD=VALUE.
    HashPut {
        key: String,
        #[arg(required = true, value_parser = parse_field)]
        fields: Vec<(String, String)>,
    },
    /// Delete a hash field.
    HashDel { key: String, field: String },
    /// Print all fields of a hash.
    HashGet { key: String },
    /// Check the store is reachable.
    Ping,
}

fn parse_field(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((field, value)) if !field.is_empty() => Ok((field.to_string(), value.to_string())),
        _ => Err(format!("expected FIELD=VALUE, got '{}'", raw)),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<bool> {
    let config = ConfigLoader::new(&cli.config_dir)
        .load()
        .with_context(|| format!("loading configuration from {}", cli.config_dir.display()))?;

    init_tracing(&config.logging)?;
    register_metrics();
    debug!(environment = %config.app.environment, memory = cli.memory, "Configuration loaded");

    let cache = if cli.memory {
        CacheFacade::new(Arc::new(InMemoryStore::new()))
    } else {
        let module = build_store_module(&config.redis)
            .await
            .context("connecting to Redis")?;
        CacheFacade::from_module(module.as_ref())
    };

    let printer = Printer { json: cli.json };
    Ok(execute(&cache, &printer, cli.command).await)
}

/// Runs one command and prints its result. Returns false when it failed.
async fn execute(cache: &CacheFacade, out: &Printer, command: Command) -> bool {
    match command {
        Command::Get { key } => out.read(cache.get(&key).await, or_nil),
        Command::Set { key, value, ttl } => {
            let outcome = match ttl {
                Some(secs) => {
                    cache
                        .set_with_ttl(&key, &value, Duration::from_secs(secs))
                        .await
                }
                None => cache.set(&key, &value).await,
            };
            out.report(outcome, |()| "OK".to_string())
        }
        Command::AutoKey { prefix, value } => {
            out.report(cache.set_auto_key(&prefix, &value).await, |key| key)
        }
        Command::Has { key } => out.report(cache.has_key(&key).await, |()| "yes".to_string()),
        Command::GetSet { key, value } => out.report(cache.get_and_set(&key, &value).await, or_nil),
        Command::Del { key } => out.report(cache.delete(&key).await, |()| "deleted".to_string()),
        Command::DelPrefix { prefix } => {
            out.read(cache.delete_by_prefix(&prefix).await, |count| count.to_string())
        }
        Command::Keys { prefix } => {
            out.read(cache.keys_by_prefix(&prefix).await, |keys| keys.join("\n"))
        }
        Command::ListPush { key, values } => {
            let outcome = match values.as_slice() {
                [single] => cache.add_list(&key, single).await,
                _ => cache.add_list_all(&key, &values).await,
            };
            out.report(outcome, |len| len.to_string())
        }
        Command::ListRm { key, value } => {
            let outcome = cache.remove_first_list_match(&key, &value).await;
            out.report(outcome, |()| "removed".to_string())
        }
        Command::List { key } => out.read(cache.get_list(&key).await, |items| items.join("\n")),
        Command::HashPut { key, fields } => {
            let fields: HashMap<String, String> = fields.into_iter().collect();
            out.report(cache.add_hash(&key, &fields).await, |()| "OK".to_string())
        }
        Command::HashDel { key, field } => {
            let outcome = cache.delete_hash_field(&key, &field).await;
            out.report(outcome, |()| "deleted".to_string())
        }
        Command::HashGet { key } => out.read(cache.get_all_hash_fields(&key).await, |fields| {
            let mut lines: Vec<String> = fields
                .into_iter()
                .map(|(f, v)| format!("{}={}", f, v))
                .collect();
            lines.sort();
            lines.join("\n")
        }),
        Command::Ping => out.read(cache.ping().await, |()| "PONG".to_string()),
    }
}

fn or_nil(value: Option<String>) -> String {
    value.unwrap_or_else(|| "(nil)".to_string())
}

/// Prints outcomes to stdout and failures to stderr.
struct Printer {
    json: bool,
}

impl Printer {
    fn report<T>(&self, outcome: CacheOutcome<T>, render: impl FnOnce(T) -> String) -> bool {
        match outcome {
            CacheOutcome::Done(value) => {
                println!("{}", render(value));
                true
            }
            CacheOutcome::NotFound => {
                println!("(not found)");
                true
            }
            CacheOutcome::Failed(e) => {
                eprintln!("{}", self.failure(&e));
                false
            }
        }
    }

    fn read<T>(&self, result: StashResult<T>, render: impl FnOnce(T) -> String) -> bool {
        self.report(result.into(), render)
    }

    fn failure(&self, error: &StashError) -> String {
        let plain = || format!("error [{}]: {}", error.error_code(), error);
        if !self.json {
            return plain();
        }
        serde_json::to_string(&ErrorReport::from(error)).unwrap_or_else(|_| plain())
    }
}
