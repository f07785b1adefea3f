use std::path::PathBuf;
use std::time::Duration;

use log::LevelFilter;
use thiserror::Error;
use watch_core::{ExtractMode, Target, TargetError};
use watch_engine::{FetchSettings, MailSettings, DEFAULT_SMTP_HOST, DEFAULT_SMTP_PORT, DEFAULT_USER_AGENT};

const DEFAULT_URLS: &str = "https://www.di-ksp.jp/school";
const DEFAULT_KEYWORDS: &str = "硬式テニス";
const DEFAULT_SUBJECT: &str = "[hard tennis] class information updated";
const DEFAULT_STATE_FILE: &str = "state.json";
const DEFAULT_TIMEOUT_SECS: u64 = 20;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("mail settings missing: {} must be set", .0.join(", "))]
    MissingMail(Vec<&'static str>),
    #[error("invalid value for {var}: {message}")]
    Invalid { var: &'static str, message: String },
    #[error("no target urls configured (WATCH_URLS)")]
    NoTargets,
    #[error(transparent)]
    Target(#[from] TargetError),
}

/// Everything one run needs, read once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub targets: Vec<Target>,
    pub subject: String,
    pub fetch: FetchSettings,
    pub mail: MailSettings,
    pub state_file: PathBuf,
    pub store_text: bool,
    pub log_level: LevelFilter,
    pub log_file: Option<PathBuf>,
}

impl AppConfig {
    /// Reads `.env` if present, then the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str, default: &str| lookup(name).unwrap_or_else(|| default.to_string());

        let mode = parse_mode(&get("WATCH_MODE", "markup"))?;
        let keywords: Vec<String> = get("WATCH_KEYWORDS", DEFAULT_KEYWORDS)
            .split(',')
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .collect();
        let targets = get("WATCH_URLS", DEFAULT_URLS)
            .split([',', '\n'])
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .map(|url| Target::new(url, &keywords, mode))
            .collect::<Result<Vec<_>, _>>()?;
        if targets.is_empty() {
            return Err(ConfigError::NoTargets);
        }

        let fetch = FetchSettings {
            request_timeout: Duration::from_secs(parse_num(
                "WATCH_TIMEOUT_SECS",
                lookup("WATCH_TIMEOUT_SECS"),
                DEFAULT_TIMEOUT_SECS,
            )?),
            user_agent: get("WATCH_USER_AGENT", DEFAULT_USER_AGENT),
            ..FetchSettings::default()
        };

        let mail = MailSettings {
            smtp_host: get("WATCH_SMTP_HOST", DEFAULT_SMTP_HOST),
            smtp_port: parse_num("WATCH_SMTP_PORT", lookup("WATCH_SMTP_PORT"), DEFAULT_SMTP_PORT)?,
            from: lookup("WATCH_FROM_EMAIL"),
            to: lookup("WATCH_TO_EMAIL"),
            secret: lookup("WATCH_APP_PASSWORD"),
            timeout: Duration::from_secs(parse_num(
                "WATCH_SMTP_TIMEOUT_SECS",
                lookup("WATCH_SMTP_TIMEOUT_SECS"),
                DEFAULT_TIMEOUT_SECS,
            )?),
        };
        // Checked on every run, even when nothing will be mailed, so a broken
        // deployment fails on its first run rather than on the first change.
        let missing = missing_mail_vars(&mail);
        if !missing.is_empty() {
            return Err(ConfigError::MissingMail(missing));
        }

        let log_level = match lookup("WATCH_LOG_LEVEL") {
            Some(raw) => watch_logging::parse_level(&raw).ok_or(ConfigError::Invalid {
                var: "WATCH_LOG_LEVEL",
                message: format!("unknown level {raw:?}"),
            })?,
            None => LevelFilter::Info,
        };

        Ok(Self {
            targets,
            subject: get("WATCH_SUBJECT", DEFAULT_SUBJECT),
            fetch,
            mail,
            state_file: PathBuf::from(get("WATCH_STATE_FILE", DEFAULT_STATE_FILE)),
            store_text: parse_bool("WATCH_STORE_TEXT", lookup("WATCH_STORE_TEXT"), true)?,
            log_level,
            log_file: lookup("WATCH_LOG_FILE")
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),
        })
    }
}

fn missing_mail_vars(mail: &MailSettings) -> Vec<&'static str> {
    mail.missing()
        .into_iter()
        .map(|name| match name {
            "sender address" => "WATCH_FROM_EMAIL",
            "recipient address" => "WATCH_TO_EMAIL",
            _ => "WATCH_APP_PASSWORD",
        })
        .collect()
}

fn parse_mode(raw: &str) -> Result<ExtractMode, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "markup" | "html" => Ok(ExtractMode::Markup),
        "lines" | "text" => Ok(ExtractMode::Lines),
        other => Err(ConfigError::Invalid {
            var: "WATCH_MODE",
            message: format!("expected markup or lines, got {other:?}"),
        }),
    }
}

fn parse_num<T: std::str::FromStr>(
    var: &'static str,
    raw: Option<String>,
    default: T,
) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match raw {
        Some(value) => value.trim().parse().map_err(|err: T::Err| ConfigError::Invalid {
            var,
            message: err.to_string(),
        }),
        None => Ok(default),
    }
}

fn parse_bool(var: &'static str, raw: Option<String>, default: bool) -> Result<bool, ConfigError> {
    let Some(value) = raw else {
        return Ok(default);
    };
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::Invalid {
            var,
            message: format!("expected a boolean, got {other:?}"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    const MAIL: [(&str, &str); 3] = [
        ("WATCH_FROM_EMAIL", "watcher@example.org"),
        ("WATCH_TO_EMAIL", "me@example.org"),
        ("WATCH_APP_PASSWORD", "secret"),
    ];

    #[test]
    fn defaults_watch_the_school_page() {
        let config = AppConfig::from_lookup(env(&MAIL)).unwrap();
        assert_eq!(config.targets.len(), 1);
        let target = &config.targets[0];
        assert_eq!(target.key(), "https://www.di-ksp.jp/school");
        assert_eq!(target.keywords(), &["硬式テニス".to_string()][..]);
        assert_eq!(target.mode(), ExtractMode::Markup);
        assert_eq!(config.fetch.request_timeout, Duration::from_secs(20));
        assert_eq!(config.mail.smtp_host, "smtp.gmail.com");
        assert_eq!(config.mail.smtp_port, 465);
        assert_eq!(config.state_file, PathBuf::from("state.json"));
        assert!(config.store_text);
        assert_eq!(config.log_level, LevelFilter::Info);
        assert_eq!(config.log_file, None);
    }

    #[test]
    fn missing_mail_settings_are_all_listed() {
        let err = AppConfig::from_lookup(env(&[("WATCH_TO_EMAIL", "me@example.org")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::MissingMail(vec!["WATCH_FROM_EMAIL", "WATCH_APP_PASSWORD"])
        );
    }

    #[test]
    fn multiple_urls_and_empty_keywords() {
        let mut pairs = MAIL.to_vec();
        pairs.extend([
            ("WATCH_URLS", "https://a.example/, https://b.example/\n"),
            ("WATCH_KEYWORDS", ""),
            ("WATCH_MODE", "lines"),
        ]);
        let config = AppConfig::from_lookup(env(&pairs)).unwrap();
        let keys: Vec<&str> = config.targets.iter().map(|t| t.key()).collect();
        assert_eq!(keys, vec!["https://a.example/", "https://b.example/"]);
        assert!(config.targets.iter().all(|t| t.is_unfiltered()));
        assert!(config.targets.iter().all(|t| t.mode() == ExtractMode::Lines));
    }

    #[test]
    fn invalid_values_name_their_variable() {
        for (var, value) in [
            ("WATCH_TIMEOUT_SECS", "soon"),
            ("WATCH_SMTP_PORT", "70000"),
            ("WATCH_STORE_TEXT", "maybe"),
            ("WATCH_MODE", "xml"),
            ("WATCH_LOG_LEVEL", "loud"),
        ] {
            let mut pairs = MAIL.to_vec();
            pairs.push((var, value));
            match AppConfig::from_lookup(env(&pairs)) {
                Err(ConfigError::Invalid { var: got, .. }) => assert_eq!(got, var),
                other => panic!("{var}={value}: unexpected {other:?}"),
            }
        }
    }

    #[test]
    fn bad_url_and_blank_url_list_are_rejected() {
        let mut pairs = MAIL.to_vec();
        pairs.push(("WATCH_URLS", "not-a-url"));
        assert!(matches!(
            AppConfig::from_lookup(env(&pairs)),
            Err(ConfigError::Target(_))
        ));

        let mut pairs = MAIL.to_vec();
        pairs.push(("WATCH_URLS", " , "));
        assert_eq!(
            AppConfig::from_lookup(env(&pairs)).unwrap_err(),
            ConfigError::NoTargets
        );
    }
}
