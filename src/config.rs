#[cfg(test)]
mod tests;

use {
    crate::{cli::VirtwlArgs, utils::xrd::xrd},
    std::{env, path::Path, time::Duration},
    thiserror::Error,
};

pub const DISPLAY_NAME_VAR: &str = "WAYLAND_DISPLAY_NAME";

const FIRST_DISPLAY: u32 = 2;
const LAST_DISPLAY: u32 = 1000;

const ACCEPT_TIMEOUT_MS: i32 = 2000;
const READ_TIMEOUT_MS: i32 = 10;
const WRITE_TIMEOUT_MS: i32 = 5000;
const STARTUP_GRACE: Duration = Duration::from_millis(500);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not find an unused wayland socket name in {0}. Pass one with --display-name")]
    NoFreeDisplay(String),
    #[error("The virtual monitor must not be empty")]
    EmptyMonitor,
    #[error("The frame rate must be positive")]
    ZeroFps,
}

/// The settings of one server instance.
#[derive(Clone, Debug)]
pub struct Config {
    pub runtime_dir: String,
    pub display_name: String,
    pub width: u32,
    pub height: u32,
    pub frame_interval: Duration,
    /// How long the placeholder is held back after startup.
    pub startup_grace: Duration,
    pub accept_timeout_ms: i32,
    pub read_timeout_ms: i32,
    pub write_timeout_ms: i32,
    pub dump_frame: Option<String>,
}

impl Config {
    pub fn from_args(args: &VirtwlArgs) -> Result<Self, ConfigError> {
        if args.width == 0 || args.height == 0 {
            return Err(ConfigError::EmptyMonitor);
        }
        if args.fps == 0 {
            return Err(ConfigError::ZeroFps);
        }
        let runtime_dir = xrd();
        let env_name = env::var(DISPLAY_NAME_VAR).ok();
        let display_name =
            resolve_display_name(args.display_name.as_deref(), env_name.as_deref(), &runtime_dir)?;
        let startup_grace = match args.will_show_app_at_startup {
            true => STARTUP_GRACE,
            false => Duration::ZERO,
        };
        Ok(Self {
            runtime_dir,
            display_name,
            width: args.width,
            height: args.height,
            frame_interval: Duration::from_secs(1) / args.fps,
            startup_grace,
            accept_timeout_ms: ACCEPT_TIMEOUT_MS,
            read_timeout_ms: READ_TIMEOUT_MS,
            write_timeout_ms: WRITE_TIMEOUT_MS,
            dump_frame: args.dump_frame.clone(),
        })
    }

    #[cfg(test)]
    pub fn for_tests(runtime_dir: &str, display_name: &str) -> Self {
        Self {
            runtime_dir: runtime_dir.to_string(),
            display_name: display_name.to_string(),
            width: 64,
            height: 48,
            frame_interval: Duration::from_millis(16),
            startup_grace: Duration::ZERO,
            accept_timeout_ms: 50,
            read_timeout_ms: 10,
            write_timeout_ms: 500,
            dump_frame: None,
        }
    }

    pub fn socket_path(&self) -> String {
        format!("{}/{}", self.runtime_dir, self.display_name)
    }
}

/// Picks the socket name.
///
/// An explicit name wins over the environment. Otherwise the first `wayland-N` without an
/// existing file in the runtime directory is used.
pub fn resolve_display_name(
    explicit: Option<&str>,
    env_name: Option<&str>,
    runtime_dir: &str,
) -> Result<String, ConfigError> {
    for name in [explicit, env_name].into_iter().flatten() {
        if !name.is_empty() {
            return Ok(name.to_string());
        }
    }
    for n in FIRST_DISPLAY..LAST_DISPLAY {
        let name = format!("wayland-{}", n);
        if !Path::new(runtime_dir).join(&name).exists() {
            return Ok(name);
        }
    }
    Err(ConfigError::NoFreeDisplay(runtime_dir.to_string()))
}
