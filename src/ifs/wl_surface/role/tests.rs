use crate::{
    ifs::wl_surface::role::{
        CursorRole, PopupRole, RoleError, RoleKind, SubsurfaceRole, SurfaceRole, ToplevelRole,
    },
    wire::{WlSubsurfaceId, WlSurfaceId, XdgPopupId, XdgSurfaceId, XdgToplevelId},
};

fn toplevel() -> SurfaceRole {
    SurfaceRole::XdgToplevel(Some(ToplevelRole {
        toplevel: XdgToplevelId::from_raw(10),
        xdg_surface: XdgSurfaceId::from_raw(9),
    }))
}

fn popup() -> SurfaceRole {
    SurfaceRole::XdgPopup(Some(PopupRole {
        popup: XdgPopupId::from_raw(11),
        xdg_surface: XdgSurfaceId::from_raw(9),
    }))
}

#[test]
fn unassigned_accepts_any_role() {
    let mut role = SurfaceRole::Unassigned;
    role.assign(toplevel()).unwrap();
    assert_eq!(role.kind(), RoleKind::XdgToplevel);
    assert!(role.has_payload());

    let mut role = SurfaceRole::Unassigned;
    role.assign(SurfaceRole::Cursor(Some(CursorRole { hotspot: (1, 2) })))
        .unwrap();
    assert_eq!(role.kind(), RoleKind::Cursor);
}

#[test]
fn other_role_is_rejected_while_active() {
    let mut role = SurfaceRole::Unassigned;
    role.assign(toplevel()).unwrap();
    assert_eq!(
        role.assign(popup()),
        Err(RoleError::Mismatch {
            current: RoleKind::XdgToplevel,
            requested: RoleKind::XdgPopup,
        })
    );
    assert_eq!(role, toplevel());
}

#[test]
fn same_role_requires_cleared_payload() {
    let mut role = SurfaceRole::Unassigned;
    role.assign(toplevel()).unwrap();
    assert_eq!(
        role.assign(toplevel()),
        Err(RoleError::AlreadyActive(RoleKind::XdgToplevel))
    );
    role.clear();
    assert_eq!(role, SurfaceRole::XdgToplevel(None));
    role.assign(toplevel()).unwrap();
    assert!(role.has_payload());
}

#[test]
fn cleared_role_keeps_its_tag() {
    let mut role = SurfaceRole::Unassigned;
    role.assign(toplevel()).unwrap();
    role.clear();
    assert!(matches!(
        role.assign(popup()),
        Err(RoleError::Mismatch { .. })
    ));
}

#[test]
fn teardown_requires_empty_payload() {
    let mut role = SurfaceRole::Subsurface(Some(SubsurfaceRole {
        subsurface: WlSubsurfaceId::from_raw(4),
        parent: WlSurfaceId::from_raw(3),
        sync: true,
        x: 0,
        y: 0,
    }));
    assert!(role.is_sync_subsurface());
    assert_eq!(
        role.check_teardown(),
        Err(RoleError::ActiveRole(RoleKind::Subsurface))
    );
    role.clear();
    assert!(!role.is_sync_subsurface());
    role.check_teardown().unwrap();
    SurfaceRole::Unassigned.check_teardown().unwrap();
}

#[test]
fn unassigned_is_not_a_role() {
    let mut role = SurfaceRole::Unassigned;
    assert_eq!(
        role.assign(SurfaceRole::Unassigned),
        Err(RoleError::NoRoleRequested)
    );
}
