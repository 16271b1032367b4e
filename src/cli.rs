use {
    crate::compositor::start_compositor,
    ::log::Level,
    clap::{Parser, ValueEnum},
};

/// A headless wayland server that composites its clients into a virtual monitor.
#[derive(Parser, Debug)]
#[clap(version)]
pub struct VirtwlArgs {
    /// The name of the wayland socket.
    ///
    /// If no name is given, the `WAYLAND_DISPLAY_NAME` environment variable is used. If that
    /// is not set either, the first unused name of the form `wayland-N` is picked.
    #[clap(long)]
    pub display_name: Option<String>,
    /// The log level.
    #[clap(value_enum, long, default_value_t)]
    pub log_level: CliLogLevel,
    /// The width of the virtual monitor.
    #[clap(long, default_value_t = 640)]
    pub width: u32,
    /// The height of the virtual monitor.
    #[clap(long, default_value_t = 480)]
    pub height: u32,
    /// The number of frames composited per second.
    #[clap(long, default_value_t = 60)]
    pub fps: u32,
    /// Delay the placeholder icon because an application will connect right away.
    #[clap(long)]
    pub will_show_app_at_startup: bool,
    /// Write the last composited frame to this file as a PNG on shutdown.
    #[clap(long)]
    pub dump_frame: Option<String>,
}

#[derive(ValueEnum, Debug, Copy, Clone, Hash, Default, Eq, PartialEq)]
pub enum CliLogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl From<CliLogLevel> for Level {
    fn from(level: CliLogLevel) -> Self {
        match level {
            CliLogLevel::Trace => Level::Trace,
            CliLogLevel::Debug => Level::Debug,
            CliLogLevel::Info => Level::Info,
            CliLogLevel::Warn => Level::Warn,
            CliLogLevel::Error => Level::Error,
        }
    }
}

pub fn main() {
    let args = VirtwlArgs::parse();
    start_compositor(args);
}
