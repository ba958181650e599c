//! OS user name providers for local-mode identity.

use std::env;
use std::process::Command;

use tracing::debug;

use crate::core::identity::UsernameSource;

/// Reads the user name from an environment variable.
pub struct EnvVarSource {
    var: &'static str,
}

impl EnvVarSource {
    pub fn new(var: &'static str) -> Self {
        Self { var }
    }
}

impl UsernameSource for EnvVarSource {
    fn label(&self) -> &str {
        self.var
    }

    fn username(&self) -> Option<String> {
        env::var(self.var).ok().filter(|value| !value.is_empty())
    }
}

/// Asks the `whoami` binary.
pub struct WhoamiSource;

impl UsernameSource for WhoamiSource {
    fn label(&self) -> &str {
        "whoami"
    }

    fn username(&self) -> Option<String> {
        let output = match Command::new("whoami").output() {
            Ok(output) => output,
            Err(e) => {
                debug!(err = %e, "failed to spawn whoami");
                return None;
            }
        };
        if !output.status.success() {
            debug!(exit_code = ?output.status.code(), "whoami failed");
            return None;
        }
        Some(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// `USER` (*nix), then `USERNAME` (Windows), then `whoami`.
pub fn default_sources() -> Vec<Box<dyn UsernameSource>> {
    vec![
        Box::new(EnvVarSource::new("USER")),
        Box::new(EnvVarSource::new("USERNAME")),
        Box::new(WhoamiSource),
    ]
}
