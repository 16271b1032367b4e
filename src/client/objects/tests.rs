use crate::{
    client::{ClientError, Objects},
    globals::GlobalName,
    ifs::{
        wl_region::WlRegion,
        wl_surface::{
            WlSurface,
            role::{SubsurfaceRole, SurfaceRole, ToplevelRole},
        },
    },
    object::{Interface, ObjectId, Version},
    wire::{WlRegionId, WlSubsurfaceId, WlSurfaceId, XdgSurfaceId, XdgToplevelId},
};

#[test]
fn typed_lookup_never_confuses_types() {
    let mut objects = Objects::new();
    objects.add(WlSurface::new(WlSurfaceId::from_raw(3), Version(6))).unwrap();
    objects.add(WlRegion::new(WlRegionId::from_raw(4))).unwrap();
    assert!(objects.get::<WlSurface>(WlSurfaceId::from_raw(3)).is_some());
    assert!(objects.get::<WlRegion>(WlRegionId::from_raw(3)).is_none());
    assert!(objects.get::<WlSurface>(WlSurfaceId::from_raw(4)).is_none());
    assert!(objects.get::<WlSurface>(WlSurfaceId::from_raw(5)).is_none());
    assert_eq!(
        objects.interface(ObjectId::from_raw(4)),
        Some(Interface::WlRegion)
    );
    match objects.lookup::<WlSurface>(WlSurfaceId::from_raw(4)) {
        Err(ClientError::LookupError(e)) => {
            assert_eq!(e.interface, Interface::WlSurface);
            assert_eq!(e.id, ObjectId::from_raw(4));
        }
        _ => panic!("lookup of a region as a surface succeeded"),
    }
}

#[test]
fn ids_are_unique() {
    let mut objects = Objects::new();
    let id = WlSurfaceId::from_raw(3);
    objects.add(WlSurface::new(id, Version(1))).unwrap();
    assert!(matches!(
        objects.add(WlRegion::new(WlRegionId::from_raw(3))),
        Err(ClientError::IdAlreadyInUse)
    ));
    assert!(matches!(
        objects.add(WlRegion::new(WlRegionId::from_raw(0))),
        Err(ClientError::ClientIdOutOfBounds)
    ));
    assert!(objects.remove(id).is_some());
    assert!(objects.remove(id).is_none());
    objects.add(WlSurface::new(id, Version(1))).unwrap();
}

#[test]
fn bind_tables() {
    let mut objects = Objects::new();
    let name = GlobalName::from_raw(2);
    objects.add_bind(name, ObjectId::from_raw(5), Version(3));
    objects.add_bind(name, ObjectId::from_raw(6), Version(1));
    let mut binds: Vec<_> = objects.binds(name).collect();
    binds.sort();
    assert_eq!(
        binds,
        vec![
            (ObjectId::from_raw(5), Version(3)),
            (ObjectId::from_raw(6), Version(1)),
        ]
    );
    objects.remove_bind(name, ObjectId::from_raw(5));
    assert_eq!(objects.binds(name).count(), 1);
    assert_eq!(objects.binds(GlobalName::from_raw(9)).count(), 0);
}

#[test]
fn role_objects_resolve_to_their_surface() {
    let mut objects = Objects::new();
    let surface = WlSurfaceId::from_raw(3);
    objects.set_role_surface(XdgToplevelId::from_raw(9), surface);
    assert_eq!(objects.role_surface(XdgToplevelId::from_raw(9)), Some(surface));
    assert_eq!(objects.role_surface(XdgToplevelId::from_raw(8)), None);
}

#[test]
fn drawable_requires_role_and_buffer() {
    let mut objects = Objects::new();
    let id = WlSurfaceId::from_raw(3);
    objects.add(WlSurface::new(id, Version(6))).unwrap();
    objects.refresh_drawable(id);
    assert!(!objects.is_drawable(id));

    let surface = objects.get_mut::<WlSurface>(id).unwrap();
    surface.has_committed_buffer = true;
    objects.refresh_drawable(id);
    assert!(!objects.is_drawable(id));

    let surface = objects.get_mut::<WlSurface>(id).unwrap();
    surface
        .set_role(SurfaceRole::XdgToplevel(Some(ToplevelRole {
            toplevel: XdgToplevelId::from_raw(5),
            xdg_surface: XdgSurfaceId::from_raw(4),
        })))
        .unwrap();
    objects.refresh_drawable(id);
    assert!(objects.is_drawable(id));
    assert_eq!(objects.drawable().count(), 1);

    objects.get_mut::<WlSurface>(id).unwrap().role.clear();
    objects.refresh_drawable(id);
    assert!(!objects.is_drawable(id));
}

#[test]
fn orphaned_subsurface_is_not_drawable() {
    let mut objects = Objects::new();
    let parent = WlSurfaceId::from_raw(3);
    let child = WlSurfaceId::from_raw(4);
    objects.add(WlSurface::new(parent, Version(6))).unwrap();
    objects.add(WlSurface::new(child, Version(6))).unwrap();
    let surface = objects.get_mut::<WlSurface>(child).unwrap();
    surface.has_committed_buffer = true;
    surface
        .set_role(SurfaceRole::Subsurface(Some(SubsurfaceRole {
            subsurface: WlSubsurfaceId::from_raw(5),
            parent,
            sync: false,
            x: 0,
            y: 0,
        })))
        .unwrap();
    objects.refresh_drawable(child);
    assert!(objects.is_drawable(child));
    objects.remove(parent);
    objects.refresh_drawable(child);
    assert!(!objects.is_drawable(child));
}

#[test]
fn removal_clears_indexes() {
    let mut objects = Objects::new();
    let id = WlSurfaceId::from_raw(3);
    objects.add(WlSurface::new(id, Version(6))).unwrap();
    objects.set_role_surface(ObjectId::from_raw(3), id);
    objects.add_toplevel(XdgToplevelId::from_raw(3));
    objects.add_bind(GlobalName::from_raw(1), ObjectId::from_raw(3), Version(1));
    objects.remove(id);
    assert_eq!(objects.role_surface(ObjectId::from_raw(3)), None);
    assert_eq!(objects.toplevels().count(), 0);
    // Binds are released by the requests that release the global.
    assert_eq!(objects.binds(GlobalName::from_raw(1)).count(), 1);
}
