use {
    crate::object::Interface,
    std::fmt::{Display, Formatter},
    thiserror::Error,
};

/// Interface names echoed back in errors are cut to this many characters.
const MAX_ECHOED_INTERFACE: usize = 64;

#[derive(Debug, Error)]
pub enum GlobalsError {
    #[error("The requested global {0} does not exist")]
    GlobalDoesNotExist(GlobalName),
    #[error("Global {name} has interface `{actual}` but the client requested `{requested}`")]
    InterfaceMismatch {
        name: GlobalName,
        actual: Interface,
        requested: String,
    },
    #[error("The client requested version {requested} of `{interface}` but only {max} is supported")]
    VersionTooHigh {
        interface: Interface,
        requested: u32,
        max: u32,
    },
    #[error("Version 0 is not a valid version")]
    VersionZero,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct GlobalName(u32);

impl GlobalName {
    pub const fn from_raw(id: u32) -> Self {
        Self(id)
    }

    pub fn raw(self) -> u32 {
        self.0
    }
}

impl Display for GlobalName {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

#[derive(Copy, Clone, Debug)]
pub struct Global {
    pub name: GlobalName,
    pub interface: Interface,
    pub version: u32,
}

pub const WL_COMPOSITOR: GlobalName = GlobalName::from_raw(1);
pub const WL_SUBCOMPOSITOR: GlobalName = GlobalName::from_raw(2);
pub const WL_SHM: GlobalName = GlobalName::from_raw(3);
pub const WL_OUTPUT: GlobalName = GlobalName::from_raw(4);
pub const XDG_WM_BASE: GlobalName = GlobalName::from_raw(5);
pub const XWAYLAND_SHELL_V1: GlobalName = GlobalName::from_raw(6);

/// The globals every client can bind. The set never changes.
pub static GLOBALS: &[Global] = &[
    Global {
        name: WL_COMPOSITOR,
        interface: Interface::WlCompositor,
        version: 6,
    },
    Global {
        name: WL_SUBCOMPOSITOR,
        interface: Interface::WlSubcompositor,
        version: 1,
    },
    Global {
        name: WL_SHM,
        interface: Interface::WlShm,
        version: 1,
    },
    Global {
        name: WL_OUTPUT,
        interface: Interface::WlOutput,
        version: 4,
    },
    Global {
        name: XDG_WM_BASE,
        interface: Interface::XdgWmBase,
        version: 5,
    },
    Global {
        name: XWAYLAND_SHELL_V1,
        interface: Interface::XwaylandShellV1,
        version: 1,
    },
];

/// Validates a bind request and returns the global.
pub fn check_bind(name: u32, interface: &str, version: u32) -> Result<&'static Global, GlobalsError> {
    let name = GlobalName::from_raw(name);
    let Some(global) = GLOBALS.iter().find(|g| g.name == name) else {
        return Err(GlobalsError::GlobalDoesNotExist(name));
    };
    if global.interface.name() != interface {
        return Err(GlobalsError::InterfaceMismatch {
            name,
            actual: global.interface,
            requested: interface.chars().take(MAX_ECHOED_INTERFACE).collect(),
        });
    }
    if version == 0 {
        return Err(GlobalsError::VersionZero);
    }
    if version > global.version {
        return Err(GlobalsError::VersionTooHigh {
            interface: global.interface,
            requested: version,
            max: global.version,
        });
    }
    Ok(global)
}
