//!
//! widget login client
//! -------------------
//! Drives the headless login form against an authentication API and prints
//! the resulting form state, links and outcome.

use std::sync::Arc;

use anyhow::{anyhow, Result};
use tracing_subscriber::{fmt, EnvFilter};

use widget_inbox::config::{has_flag, LoginConfig};
use widget_inbox::login::{
    login_links, Credentials, HttpAuthApi, LogNavigator, LoginForm, SessionContext, SubmitOutcome,
    TracingErrorReporter,
};

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    let args: Vec<String> = std::env::args().collect();
    if has_flag(&args, "--help") || has_flag(&args, "-h") {
        println!("widget login\n\nUSAGE:\n  widget_login --email EMAIL --password PASSWORD [--api URL] [--docker-hosted] [--query QUERY]\n\nOPTIONS:\n  --api URL          Authentication API root (env: WIDGET_API_ROOT, default http://localhost:3000)\n  --docker-hosted    Hide the GitHub sign-in link\n  --query QUERY      Query string of the login page, e.g. code=..&next=.. for an integration handoff\n");
        return Ok(());
    }
    let cfg = LoginConfig::from_env_and_args(&args);

    let entry = cfg.entry();
    let links = login_links(&cfg.api_root, &entry, cfg.docker_hosted);
    println!("sign up: {}", links.signup);
    if let Some(github) = &links.github {
        println!("sign in with GitHub: {github}");
    }
    if let Some(reset) = &links.forgot_password {
        println!("forgot password: {reset}");
    }

    let api = HttpAuthApi::new(&cfg.api_root)?;
    let session = SessionContext::new();
    let form = LoginForm::new(
        Arc::new(api),
        session.clone(),
        Arc::new(LogNavigator),
        Arc::new(TracingErrorReporter),
        entry,
    );
    let creds = Credentials { email: cfg.email.unwrap_or_default(), password: cfg.password.unwrap_or_default() };

    match form.submit(creds).await {
        SubmitOutcome::LoggedIn { navigated_to } => {
            println!("logged in: {}", session.is_authenticated());
            if let Some(route) = navigated_to {
                println!("next: {route}");
            }
            Ok(())
        }
        SubmitOutcome::Busy => Err(anyhow!("a login request is already in flight")),
        SubmitOutcome::Invalid(_) | SubmitOutcome::Failed(_) => {
            let view = form.view();
            if let Some(e) = &view.fields.email { println!("email: {e}"); }
            if let Some(p) = &view.fields.password { println!("password: {p}"); }
            if let Some(banner) = &view.banner { println!("error: {banner}"); }
            Err(anyhow!("login failed"))
        }
    }
}
