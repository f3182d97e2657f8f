//! Credential Resolution
//!
//! Each credential comes from the first non-empty source: command-line flag,
//! environment variable, then an interactive prompt. Flag and environment
//! lookup are handled by clap; this module fills in whatever is still
//! missing.

use std::fmt;
use std::io::{self, BufRead, Write};

use tracing::debug;

use crate::error::ConfigError;

/// Default hosts file consumed by Pi-hole
pub const DEFAULT_HOSTS_FILE: &str = "/etc/pihole/lan.list";

/// Environment variable holding the controller address
pub const ENV_CONTROLLER: &str = "UNIFI_CONTROLLER";
/// Environment variable holding the controller username
pub const ENV_USER: &str = "UNIFI_USER";
/// Environment variable holding the controller password
pub const ENV_PASSWORD: &str = "UNIFI_PASSWORD";

/// Controller login details, fixed for the lifetime of the process
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Controller IP or hostname
    pub controller: String,
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("controller", &self.controller)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Source of interactive answers for missing credentials
pub trait Prompt {
    /// Show `label` and return the trimmed answer
    fn ask(&mut self, label: &str) -> io::Result<String>;
}

/// Prompts on stdout and reads answers from stdin
pub struct StdinPrompt;

impl Prompt for StdinPrompt {
    fn ask(&mut self, label: &str) -> io::Result<String> {
        let mut stdout = io::stdout();
        write!(stdout, "{}", label)?;
        stdout.flush()?;

        let mut line = String::new();
        io::stdin().lock().read_line(&mut line)?;
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }
}

/// Values already supplied by flag or environment
#[derive(Debug, Default, Clone)]
pub struct CredentialSources {
    pub controller: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl CredentialSources {
    /// Prompt for anything still missing and build the final credentials
    pub fn resolve(self, prompt: &mut dyn Prompt) -> Result<Credentials, ConfigError> {
        Ok(Credentials {
            controller: resolve_field(self.controller, "controller", "Controller: ", prompt)?,
            username: resolve_field(self.username, "username", "Username: ", prompt)?,
            password: resolve_field(self.password, "password", "Password: ", prompt)?,
        })
    }
}

fn resolve_field(
    supplied: Option<String>,
    field: &'static str,
    label: &str,
    prompt: &mut dyn Prompt,
) -> Result<String, ConfigError> {
    if let Some(value) = supplied.filter(|v| !v.is_empty()) {
        return Ok(value);
    }

    debug!(field, "No value from flag or environment, prompting");
    prompt
        .ask(label)
        .map_err(|source| ConfigError::Prompt { field, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    struct Scripted {
        answers: VecDeque<&'static str>,
        asked: Vec<String>,
    }

    impl Scripted {
        fn new(answers: &[&'static str]) -> Self {
            Self {
                answers: answers.iter().copied().collect(),
                asked: Vec::new(),
            }
        }
    }

    impl Prompt for Scripted {
        fn ask(&mut self, label: &str) -> io::Result<String> {
            self.asked.push(label.to_string());
            self.answers
                .pop_front()
                .map(str::to_string)
                .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "no input"))
        }
    }

    #[test]
    fn test_supplied_values_skip_prompt() {
        let sources = CredentialSources {
            controller: Some("192.168.1.1".to_string()),
            username: Some("admin".to_string()),
            password: Some("hunter2".to_string()),
        };
        let mut prompt = Scripted::new(&[]);

        let creds = sources.resolve(&mut prompt).unwrap();

        assert_eq!(creds.controller, "192.168.1.1");
        assert_eq!(creds.username, "admin");
        assert_eq!(creds.password, "hunter2");
        assert!(prompt.asked.is_empty());
    }

    #[test]
    fn test_missing_and_empty_values_are_prompted() {
        let sources = CredentialSources {
            controller: Some("unifi.lan".to_string()),
            username: Some(String::new()),
            password: None,
        };
        let mut prompt = Scripted::new(&["admin", "secret"]);

        let creds = sources.resolve(&mut prompt).unwrap();

        assert_eq!(creds.username, "admin");
        assert_eq!(creds.password, "secret");
        assert_eq!(prompt.asked, vec!["Username: ", "Password: "]);
    }

    #[test]
    fn test_prompt_failure_names_field() {
        let mut prompt = Scripted::new(&[]);
        let err = CredentialSources::default().resolve(&mut prompt).unwrap_err();

        assert!(matches!(err, ConfigError::Prompt { field: "controller", .. }));
    }

    #[test]
    fn test_debug_redacts_password() {
        let creds = Credentials {
            controller: "c".to_string(),
            username: "u".to_string(),
            password: "topsecret".to_string(),
        };
        let rendered = format!("{:?}", creds);
        assert!(!rendered.contains("topsecret"));
        assert!(rendered.contains("<redacted>"));
    }
}
