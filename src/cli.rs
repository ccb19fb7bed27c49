//! CLI argument parsing. Grounded on the teacher's `cli.rs`, trimmed to the
//! single run behavior this gateway has: no daemon/stop/status/reload
//! subcommands, since there is no config file to watch or PID file to signal.

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "llmgate", version, about = "Multi-tenant LLM API gateway")]
pub struct RunArgs {
    /// Path to the model registry file.
    #[arg(long, default_value = "models.json", env = "MODELS_FILE")]
    pub models_file: String,

    /// Path to the identity store file (only read when identity_store=json).
    #[arg(long, default_value = "identities.json", env = "IDENTITY_STORE_JSON_FILENAME")]
    pub identities_file: String,

    /// Listen host.
    #[arg(long, default_value = "0.0.0.0", env = "AI_PROXY_HOST")]
    pub host: String,

    /// Listen port.
    #[arg(long, default_value_t = 8080, env = "AI_PROXY_PORT")]
    pub port: u16,

    /// Log level.
    #[arg(long, default_value = "info", env = "AI_PROXY_LOG_LEVEL")]
    pub log_level: String,
}
