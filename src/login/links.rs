//! Entry-point detection and the auxiliary links shown next to the login form.

use crate::params::QueryParams;

/// Query parameters forwarded by a third-party integration handoff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntegrationParams {
    pub code: String,
    pub next: String,
    pub configuration_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum EntryPoint {
    #[default]
    Direct,
    Integration(IntegrationParams),
}

impl EntryPoint {
    /// An entry is an integration handoff when both `code` and `next` are present.
    pub fn from_query(raw: Option<&str>) -> Self {
        let q = QueryParams::parse(raw);
        match (q.first("code"), q.first("next")) {
            (Some(code), Some(next)) => EntryPoint::Integration(IntegrationParams {
                code: code.to_string(),
                next: next.to_string(),
                configuration_id: q.first("configurationId").map(str::to_string),
            }),
            _ => EntryPoint::Direct,
        }
    }

    pub fn is_integration(&self) -> bool { matches!(self, EntryPoint::Integration(_)) }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginLinks {
    pub signup: String,
    /// Hidden for docker-hosted builds.
    pub github: Option<String>,
    /// Hidden for integration entries.
    pub forgot_password: Option<String>,
}

fn encode_query(pairs: &[(&str, &str)]) -> String {
    pairs
        .iter()
        .map(|(k, v)| format!("{k}={}", urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

pub fn login_links(api_root: &str, entry: &EntryPoint, docker_hosted: bool) -> LoginLinks {
    let root = api_root.trim_end_matches('/');
    let (signup, github) = match entry {
        EntryPoint::Direct => ("/auth/signup".to_string(), format!("{root}/v1/auth/github")),
        EntryPoint::Integration(p) => {
            let config = p.configuration_id.as_deref().unwrap_or_default();
            let signup_q = encode_query(&[("code", p.code.as_str()), ("next", p.next.as_str()), ("configurationId", config)]);
            let github_q = encode_query(&[("partnerCode", p.code.as_str()), ("next", p.next.as_str()), ("configurationId", config)]);
            (format!("/auth/signup?{signup_q}"), format!("{root}/v1/auth/github?{github_q}"))
        }
    };
    LoginLinks {
        signup,
        github: (!docker_hosted).then_some(github),
        forgot_password: (!entry.is_integration()).then(|| "/auth/reset/request".to_string()),
    }
}
