#[cfg(test)]
mod tests;

use {
    crate::wire::{
        WlSubsurfaceId, WlSurfaceId, XdgPopupId, XdgSurfaceId, XdgToplevelId,
        XwaylandSurfaceV1Id,
    },
    std::fmt::{Display, Formatter},
    thiserror::Error,
};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum RoleKind {
    Unassigned,
    Cursor,
    XdgToplevel,
    XdgPopup,
    Subsurface,
    XwaylandSurface,
}

impl RoleKind {
    pub fn name(self) -> &'static str {
        match self {
            RoleKind::Unassigned => "none",
            RoleKind::Cursor => "cursor",
            RoleKind::XdgToplevel => "xdg_toplevel",
            RoleKind::XdgPopup => "xdg_popup",
            RoleKind::Subsurface => "subsurface",
            RoleKind::XwaylandSurface => "xwayland_surface",
        }
    }
}

impl Display for RoleKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct CursorRole {
    pub hotspot: (i32, i32),
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct ToplevelRole {
    pub toplevel: XdgToplevelId,
    pub xdg_surface: XdgSurfaceId,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct PopupRole {
    pub popup: XdgPopupId,
    pub xdg_surface: XdgSurfaceId,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct SubsurfaceRole {
    pub subsurface: WlSubsurfaceId,
    pub parent: WlSurfaceId,
    pub sync: bool,
    pub x: i32,
    pub y: i32,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct XwaylandRole {
    pub xwayland_surface: XwaylandSurfaceV1Id,
    pub serial: Option<u64>,
}

/// The role of a surface.
///
/// A role keeps its tag for the lifetime of the surface. Destroying the role object only
/// empties the payload, after which the same role can be assigned again.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum SurfaceRole {
    Unassigned,
    Cursor(Option<CursorRole>),
    XdgToplevel(Option<ToplevelRole>),
    XdgPopup(Option<PopupRole>),
    Subsurface(Option<SubsurfaceRole>),
    XwaylandSurface(Option<XwaylandRole>),
}

#[derive(Debug, Error, Eq, PartialEq)]
pub enum RoleError {
    #[error("The surface already has an active `{0}` role")]
    AlreadyActive(RoleKind),
    #[error("Cannot assign the `{requested}` role to a surface that has the `{current}` role")]
    Mismatch {
        current: RoleKind,
        requested: RoleKind,
    },
    #[error("A role request must carry a role")]
    NoRoleRequested,
    #[error("The `{0}` role object must be destroyed before the surface")]
    ActiveRole(RoleKind),
}

impl SurfaceRole {
    pub fn kind(&self) -> RoleKind {
        match self {
            SurfaceRole::Unassigned => RoleKind::Unassigned,
            SurfaceRole::Cursor(_) => RoleKind::Cursor,
            SurfaceRole::XdgToplevel(_) => RoleKind::XdgToplevel,
            SurfaceRole::XdgPopup(_) => RoleKind::XdgPopup,
            SurfaceRole::Subsurface(_) => RoleKind::Subsurface,
            SurfaceRole::XwaylandSurface(_) => RoleKind::XwaylandSurface,
        }
    }

    pub fn has_payload(&self) -> bool {
        match self {
            SurfaceRole::Unassigned => false,
            SurfaceRole::Cursor(p) => p.is_some(),
            SurfaceRole::XdgToplevel(p) => p.is_some(),
            SurfaceRole::XdgPopup(p) => p.is_some(),
            SurfaceRole::Subsurface(p) => p.is_some(),
            SurfaceRole::XwaylandSurface(p) => p.is_some(),
        }
    }

    /// Empties the payload. The tag is kept.
    pub fn clear(&mut self) {
        match self {
            SurfaceRole::Unassigned => {}
            SurfaceRole::Cursor(p) => *p = None,
            SurfaceRole::XdgToplevel(p) => *p = None,
            SurfaceRole::XdgPopup(p) => *p = None,
            SurfaceRole::Subsurface(p) => *p = None,
            SurfaceRole::XwaylandSurface(p) => *p = None,
        }
    }

    pub fn assign(&mut self, requested: SurfaceRole) -> Result<(), RoleError> {
        *self = transition(self, requested)?;
        Ok(())
    }

    pub fn check_teardown(&self) -> Result<(), RoleError> {
        match self.has_payload() {
            true => Err(RoleError::ActiveRole(self.kind())),
            false => Ok(()),
        }
    }

    pub fn subsurface(&self) -> Option<&SubsurfaceRole> {
        match self {
            SurfaceRole::Subsurface(Some(s)) => Some(s),
            _ => None,
        }
    }

    pub fn subsurface_mut(&mut self) -> Option<&mut SubsurfaceRole> {
        match self {
            SurfaceRole::Subsurface(Some(s)) => Some(s),
            _ => None,
        }
    }

    pub fn toplevel(&self) -> Option<&ToplevelRole> {
        match self {
            SurfaceRole::XdgToplevel(Some(t)) => Some(t),
            _ => None,
        }
    }

    pub fn popup(&self) -> Option<&PopupRole> {
        match self {
            SurfaceRole::XdgPopup(Some(p)) => Some(p),
            _ => None,
        }
    }

    pub fn xwayland_mut(&mut self) -> Option<&mut XwaylandRole> {
        match self {
            SurfaceRole::XwaylandSurface(Some(x)) => Some(x),
            _ => None,
        }
    }

    /// Returns whether the surface is a subsurface whose state is applied by its parent.
    pub fn is_sync_subsurface(&self) -> bool {
        self.subsurface().map(|s| s.sync).unwrap_or(false)
    }
}

/// Computes the role after a role request.
///
/// An unassigned surface accepts any role. A surface that already has a role accepts the
/// same role again only after the previous payload has been cleared.
pub fn transition(current: &SurfaceRole, requested: SurfaceRole) -> Result<SurfaceRole, RoleError> {
    if requested.kind() == RoleKind::Unassigned {
        return Err(RoleError::NoRoleRequested);
    }
    if current.kind() == RoleKind::Unassigned {
        return Ok(requested);
    }
    if current.kind() != requested.kind() {
        return Err(RoleError::Mismatch {
            current: current.kind(),
            requested: requested.kind(),
        });
    }
    if current.has_payload() {
        return Err(RoleError::AlreadyActive(current.kind()));
    }
    Ok(requested)
}
