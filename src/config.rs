//!
//! widget configuration
//! --------------------
//! Server and login-client settings, layered as defaults, then environment
//! variables, then command-line flags (flags win).

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, Result};

use crate::login::EntryPoint;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_HTTP_PORT: u16 = 3000;
pub const DEFAULT_SESSION_TTL_SECS: u64 = 86_400;
pub const DEFAULT_API_ROOT: &str = "http://localhost:3000";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub http_port: u16,
    /// Fixture JSON to load at startup; `None` seeds the demo dataset.
    pub data_file: Option<PathBuf>,
    pub session_ttl: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            http_port: DEFAULT_HTTP_PORT,
            data_file: None,
            session_ttl: Duration::from_secs(DEFAULT_SESSION_TTL_SECS),
        }
    }
}

impl ServerConfig {
    /// Resolve from the process environment and the given argv.
    pub fn from_env_and_args(args: &[String]) -> Result<Self> {
        Self::resolve(|name| std::env::var(name).ok(), args)
    }

    pub fn resolve<F>(env: F, args: &[String]) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();
        if let Some(h) = arg_value(args, "--host").or_else(|| env("WIDGET_HOST")) {
            cfg.host = h;
        }
        if let Some(p) = arg_value(args, "--http-port").or_else(|| env("WIDGET_HTTP_PORT")) {
            cfg.http_port = p.parse::<u16>().map_err(|_| anyhow!("invalid http port: {p}"))?;
        }
        if let Some(f) = arg_value(args, "--data-file").or_else(|| env("WIDGET_DATA_FILE")) {
            if !f.is_empty() {
                cfg.data_file = Some(PathBuf::from(f));
            }
        }
        if let Some(t) = arg_value(args, "--session-ttl-secs").or_else(|| env("WIDGET_SESSION_TTL_SECS")) {
            let secs = t.parse::<u64>().map_err(|_| anyhow!("invalid session ttl: {t}"))?;
            cfg.session_ttl = Duration::from_secs(secs);
        }
        Ok(cfg)
    }

    pub fn bind_addr(&self) -> String { format!("{}:{}", self.host, self.http_port) }
}

/// Settings for the command-line login client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginConfig {
    pub api_root: String,
    pub email: Option<String>,
    pub password: Option<String>,
    pub docker_hosted: bool,
    /// Raw query string the login page was opened with (`code=..&next=..`).
    pub query: Option<String>,
}

impl LoginConfig {
    pub fn from_env_and_args(args: &[String]) -> Self {
        Self::resolve(|name| std::env::var(name).ok(), args)
    }

    pub fn resolve<F>(env: F, args: &[String]) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let docker_env = env("WIDGET_DOCKER_HOSTED").and_then(|v| parse_bool(&v)).unwrap_or(false);
        Self {
            api_root: arg_value(args, "--api")
                .or_else(|| env("WIDGET_API_ROOT"))
                .unwrap_or_else(|| DEFAULT_API_ROOT.to_string()),
            email: arg_value(args, "--email"),
            password: arg_value(args, "--password"),
            docker_hosted: has_flag(args, "--docker-hosted") || docker_env,
            query: arg_value(args, "--query"),
        }
    }

    pub fn entry(&self) -> EntryPoint { EntryPoint::from_query(self.query.as_deref()) }
}

pub fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|a| a == flag)
}

fn arg_value(args: &[String], flag: &str) -> Option<String> {
    let mut i = 0;
    while i < args.len() {
        if args[i] == flag {
            return args.get(i + 1).cloned();
        }
        if let Some(v) = args[i].strip_prefix(flag).and_then(|rest| rest.strip_prefix('=')) {
            return Some(v.to_string());
        }
        i += 1;
    }
    None
}

fn parse_bool(v: &str) -> Option<bool> {
    match v.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
