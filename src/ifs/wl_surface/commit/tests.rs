use {
    crate::{
        client::Objects,
        ifs::wl_surface::{
            WlSurface, ZMove,
            commit::{BufferSwap, commit, move_child},
            role::{SubsurfaceRole, SurfaceRole, ToplevelRole, XwaylandRole},
            xdg_surface::XdgSurface,
            xdg_toplevel::XdgToplevel,
        },
        object::Version,
        rect::{Rect, RegionBuilder},
        wire::{
            WlBufferId, WlCallbackId, WlSubsurfaceId, WlSurfaceId, XdgSurfaceId, XdgToplevelId,
            XdgWmBaseId, XwaylandSurfaceV1Id,
        },
    },
    std::rc::Rc,
};

const A: WlSurfaceId = WlSurfaceId::from_raw(10);
const B: WlSurfaceId = WlSurfaceId::from_raw(11);
const C: WlSurfaceId = WlSurfaceId::from_raw(12);
const D: WlSurfaceId = WlSurfaceId::from_raw(13);

fn add_surface(objects: &mut Objects, id: u32) -> WlSurfaceId {
    let id = WlSurfaceId::from_raw(id);
    objects.add(WlSurface::new(id, Version(6))).unwrap();
    id
}

fn add_subsurface(objects: &mut Objects, id: u32, parent: WlSurfaceId, sync: bool) -> WlSurfaceId {
    let id = add_surface(objects, id);
    let surface = objects.get_mut::<WlSurface>(id).unwrap();
    surface
        .set_role(SurfaceRole::Subsurface(Some(SubsurfaceRole {
            subsurface: WlSubsurfaceId::from_raw(id.raw() + 1000),
            parent,
            sync,
            x: 0,
            y: 0,
        })))
        .unwrap();
    objects
        .get_mut::<WlSurface>(parent)
        .unwrap()
        .pending
        .subsurfaces
        .push(id);
    id
}

fn surface(objects: &mut Objects, id: WlSurfaceId) -> &mut WlSurface {
    objects.get_mut::<WlSurface>(id).unwrap()
}

fn attach(objects: &mut Objects, id: WlSurfaceId, buffer: u32) {
    surface(objects, id).pending.buffer = Some(Some(WlBufferId::from_raw(buffer)));
}

fn z_move(child: WlSurfaceId, relative_to: Option<WlSurfaceId>, above: bool) -> ZMove {
    ZMove {
        child,
        relative_to,
        above,
    }
}

#[test]
fn move_above_sibling() {
    let mut children = vec![A, B, C];
    move_child(&mut children, z_move(A, Some(B), true));
    assert_eq!(children, vec![B, A, C]);
}

#[test]
fn move_below_sibling() {
    let mut children = vec![A, B, C];
    move_child(&mut children, z_move(A, Some(B), false));
    assert_eq!(children, vec![A, B, C]);
    move_child(&mut children, z_move(C, Some(A), false));
    assert_eq!(children, vec![C, A, B]);
}

#[test]
fn move_relative_to_absent_sibling_is_ignored() {
    let mut children = vec![A, B, C];
    move_child(&mut children, z_move(A, Some(D), true));
    assert_eq!(children, vec![A, B, C]);
    move_child(&mut children, z_move(D, Some(A), true));
    assert_eq!(children, vec![A, B, C]);
}

#[test]
fn move_relative_to_parent() {
    let mut children = vec![A, B, C];
    move_child(&mut children, z_move(A, None, true));
    assert_eq!(children, vec![B, C, A]);
    move_child(&mut children, z_move(C, None, false));
    assert_eq!(children, vec![C, B, A]);
}

#[test]
fn new_subsurfaces_go_to_the_front() {
    let mut objects = Objects::new();
    let parent = add_surface(&mut objects, 1);
    let first = add_subsurface(&mut objects, 2, parent, false);
    commit(&mut objects, parent, false, 0);
    let second = add_subsurface(&mut objects, 3, parent, false);
    commit(&mut objects, parent, false, 0);
    assert_eq!(surface(&mut objects, parent).children, vec![second, first]);
}

#[test]
fn damage_is_not_sticky() {
    let mut objects = Objects::new();
    let id = add_surface(&mut objects, 1);
    surface(&mut objects, id)
        .pending
        .damage
        .push(Rect::new_sized_saturating(0, 0, 10, 10));
    commit(&mut objects, id, false, 0);
    assert!(surface(&mut objects, id).damaged);
    commit(&mut objects, id, false, 0);
    assert!(!surface(&mut objects, id).damaged);
    surface(&mut objects, id)
        .pending
        .damage_buffer
        .push(Rect::new_sized_saturating(0, 0, 1, 1));
    commit(&mut objects, id, false, 0);
    assert!(surface(&mut objects, id).damaged);
}

#[test]
fn offsets_accumulate() {
    let mut objects = Objects::new();
    let id = add_surface(&mut objects, 1);
    surface(&mut objects, id).pending.offset = Some((3, -2));
    commit(&mut objects, id, false, 0);
    surface(&mut objects, id).pending.offset = Some((1, 1));
    commit(&mut objects, id, false, 0);
    commit(&mut objects, id, false, 0);
    assert_eq!(surface(&mut objects, id).offset, (4, -1));
}

#[test]
fn scale_and_transform_apply() {
    let mut objects = Objects::new();
    let id = add_surface(&mut objects, 1);
    surface(&mut objects, id).pending.scale = Some(2);
    surface(&mut objects, id).pending.transform = Some(5);
    commit(&mut objects, id, false, 0);
    let s = surface(&mut objects, id);
    assert_eq!((s.scale, s.transform), (2, 5));
}

#[test]
fn sync_children_follow_their_parent() {
    let mut objects = Objects::new();
    let parent = add_surface(&mut objects, 1);
    let sync = add_subsurface(&mut objects, 2, parent, true);
    let desync = add_subsurface(&mut objects, 3, parent, false);
    let grandchild = add_subsurface(&mut objects, 4, desync, true);
    commit(&mut objects, desync, false, 0);
    for (id, buffer) in [(parent, 100), (sync, 101), (desync, 102), (grandchild, 103)] {
        attach(&mut objects, id, buffer);
    }
    let swaps = commit(&mut objects, parent, false, 0);
    assert_eq!(
        swaps,
        vec![
            BufferSwap {
                surface: parent,
                buffer: Some(WlBufferId::from_raw(100)),
                z: 0,
            },
            BufferSwap {
                surface: sync,
                buffer: Some(WlBufferId::from_raw(101)),
                z: 1,
            },
        ]
    );
    assert!(surface(&mut objects, desync).pending.buffer.is_some());
    assert!(surface(&mut objects, grandchild).pending.buffer.is_some());
}

#[test]
fn forced_commit_reaches_every_descendant() {
    let mut objects = Objects::new();
    let parent = add_surface(&mut objects, 1);
    let desync = add_subsurface(&mut objects, 2, parent, false);
    let grandchild = add_subsurface(&mut objects, 3, desync, false);
    commit(&mut objects, parent, false, 0);
    commit(&mut objects, desync, false, 0);
    attach(&mut objects, desync, 200);
    attach(&mut objects, grandchild, 201);
    let swaps = commit(&mut objects, parent, true, 5);
    let got: Vec<_> = swaps.iter().map(|s| (s.surface, s.z)).collect();
    assert_eq!(got, vec![(desync, 6), (grandchild, 7)]);
}

#[test]
fn child_positions_only_apply_to_listed_children() {
    let mut objects = Objects::new();
    let parent = add_surface(&mut objects, 1);
    let child = add_subsurface(&mut objects, 2, parent, true);
    let stranger = add_surface(&mut objects, 3);
    {
        let pending = &mut surface(&mut objects, parent).pending;
        pending.child_positions.push((child, 7, 8));
        pending.child_positions.push((stranger, 9, 9));
    }
    commit(&mut objects, parent, false, 0);
    let c = surface(&mut objects, child);
    assert_eq!((c.x, c.y), (7, 8));
    assert_eq!(c.role.subsurface().map(|s| (s.x, s.y)), Some((7, 8)));
    let s = surface(&mut objects, stranger);
    assert_eq!((s.x, s.y), (0, 0));
}

#[test]
fn replaced_region_is_released() {
    let mut objects = Objects::new();
    let id = add_surface(&mut objects, 1);
    let mut builder = RegionBuilder::default();
    builder.add(Rect::new_sized_saturating(0, 0, 4, 4));
    let first = Rc::new(builder.get());
    surface(&mut objects, id).pending.input_region = Some(Some(first.clone()));
    commit(&mut objects, id, false, 0);
    assert_eq!(Rc::strong_count(&first), 2);

    surface(&mut objects, id).pending.input_region = Some(Some(first.clone()));
    commit(&mut objects, id, false, 0);
    assert_eq!(Rc::strong_count(&first), 2);

    let second = Rc::new(builder.get());
    surface(&mut objects, id).pending.input_region = Some(Some(second.clone()));
    commit(&mut objects, id, false, 0);
    assert_eq!(Rc::strong_count(&first), 1);
    assert_eq!(Rc::strong_count(&second), 2);

    surface(&mut objects, id).pending.input_region = Some(None);
    commit(&mut objects, id, false, 0);
    assert_eq!(Rc::strong_count(&second), 1);
    assert!(surface(&mut objects, id).input_region.is_none());
}

#[test]
fn xwayland_serial_is_stamped() {
    let mut objects = Objects::new();
    let id = add_surface(&mut objects, 1);
    let s = surface(&mut objects, id);
    s.set_role(SurfaceRole::XwaylandSurface(Some(XwaylandRole {
        xwayland_surface: XwaylandSurfaceV1Id::from_raw(5),
        serial: None,
    })))
    .unwrap();
    s.pending.xwayland_serial = Some(0x1_0000_0002);
    commit(&mut objects, id, false, 0);
    assert_eq!(
        surface(&mut objects, id).role,
        SurfaceRole::XwaylandSurface(Some(XwaylandRole {
            xwayland_surface: XwaylandSurfaceV1Id::from_raw(5),
            serial: Some(0x1_0000_0002),
        }))
    );
}

#[test]
fn pending_state_is_cleared() {
    let mut objects = Objects::new();
    let id = add_surface(&mut objects, 1);
    attach(&mut objects, id, 9);
    surface(&mut objects, id)
        .pending
        .frame_callbacks
        .push(WlCallbackId::from_raw(20));
    assert_eq!(commit(&mut objects, id, false, 0).len(), 1);
    assert!(commit(&mut objects, id, false, 0).is_empty());
    let callbacks: Vec<_> = objects.take_frame_callbacks().collect();
    assert_eq!(callbacks, vec![WlCallbackId::from_raw(20)]);
}

#[test]
fn toplevel_geometry_and_size_limits_are_applied() {
    let mut objects = Objects::new();
    let id = add_surface(&mut objects, 1);
    let xdg_surface = XdgSurfaceId::from_raw(2);
    let toplevel = XdgToplevelId::from_raw(3);
    objects
        .add(XdgSurface::new(xdg_surface, id, XdgWmBaseId::from_raw(4)))
        .unwrap();
    objects
        .add(XdgToplevel::new(toplevel, xdg_surface, id))
        .unwrap();
    let s = surface(&mut objects, id);
    s.xdg_surface = Some(xdg_surface);
    s.set_role(SurfaceRole::XdgToplevel(Some(ToplevelRole {
        toplevel,
        xdg_surface,
    })))
    .unwrap();
    let geometry = Rect::new_sized_saturating(5, 6, 100, 50);
    s.pending.window_geometry = Some(geometry);
    s.pending.min_size = Some((10, 20));
    s.pending.max_size = Some((300, 400));
    commit(&mut objects, id, false, 0);

    let check = |objects: &Objects| {
        let xs = objects.get::<XdgSurface>(xdg_surface).unwrap();
        assert_eq!(xs.geometry, Some(geometry));
        let tl = objects.get::<XdgToplevel>(toplevel).unwrap();
        assert_eq!(tl.min_size, (10, 20));
        assert_eq!(tl.max_size, (300, 400));
    };
    check(&objects);
    let s = surface(&mut objects, id);
    assert!(s.pending.window_geometry.is_none());
    assert!(s.pending.min_size.is_none());
    assert!(s.pending.max_size.is_none());
    commit(&mut objects, id, false, 0);
    check(&objects);
}
