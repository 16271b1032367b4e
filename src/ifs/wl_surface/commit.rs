#[cfg(test)]
mod tests;

use {
    crate::{
        client::Objects,
        ifs::wl_surface::{
            WlSurface, ZMove, xdg_surface::XdgSurface, xdg_toplevel::XdgToplevel,
        },
        rect::Region,
        wire::{WlBufferId, WlSurfaceId},
    },
    std::{mem, rc::Rc},
};

/// A buffer attached during a commit. Buffers are swapped in after the whole subtree has been
/// walked.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct BufferSwap {
    pub surface: WlSurfaceId,
    /// `None` if a null buffer was attached.
    pub buffer: Option<WlBufferId>,
    pub z: i32,
}

/// Applies the pending state of `surface` and of the subsurfaces that follow it.
///
/// If `force` is set, every child is committed and forces its own children. Otherwise only
/// children in synchronized mode are committed. A child that is skipped is not descended into.
/// Children are committed with a depth one higher than their parent.
pub fn commit(objects: &mut Objects, surface: WlSurfaceId, force: bool, z: i32) -> Vec<BufferSwap> {
    let mut swaps = vec![];
    let mut stack = vec![(surface, force, z)];
    while let Some((id, force, z)) = stack.pop() {
        let children = apply_pending(objects, id, z, &mut swaps);
        for &child in children.iter().rev() {
            let sync = objects
                .get::<WlSurface>(child)
                .map(|c| c.role.is_sync_subsurface())
                .unwrap_or(false);
            if force || sync {
                stack.push((child, true, z + 1));
            }
        }
    }
    swaps
}

fn apply_pending(
    objects: &mut Objects,
    id: WlSurfaceId,
    z: i32,
    swaps: &mut Vec<BufferSwap>,
) -> Vec<WlSurfaceId> {
    let Some(surface) = objects.get_mut::<WlSurface>(id) else {
        return vec![];
    };
    let mut pending = mem::take(&mut surface.pending);
    if let Some(buffer) = pending.buffer {
        swaps.push(BufferSwap {
            surface: id,
            buffer,
            z,
        });
    }
    if let Some(scale) = pending.scale {
        surface.scale = scale;
    }
    if let Some(transform) = pending.transform {
        surface.transform = transform;
    }
    surface.damaged = !pending.damage.is_empty() || !pending.damage_buffer.is_empty();
    if let Some((dx, dy)) = pending.offset {
        surface.offset.0 += dx;
        surface.offset.1 += dy;
    }
    swap_region(&mut surface.input_region, pending.input_region.take(), "input");
    swap_region(&mut surface.opaque_region, pending.opaque_region.take(), "opaque");
    for child in pending.subsurfaces.drain(..) {
        surface.children.insert(0, child);
    }
    let positions: Vec<_> = pending
        .child_positions
        .drain(..)
        .filter(|(child, _, _)| surface.children.contains(child))
        .collect();
    for z_move in pending.z_moves.drain(..) {
        move_child(&mut surface.children, z_move);
    }
    if let Some(serial) = pending.xwayland_serial {
        if let Some(xwayland) = surface.role.xwayland_mut() {
            xwayland.serial = Some(serial);
        }
    }
    let children = surface.children.clone();
    let xdg_surface = surface.xdg_surface;
    let toplevel = surface.role.toplevel().map(|t| t.toplevel);

    for (child, x, y) in positions {
        if let Some(child) = objects.get_mut::<WlSurface>(child) {
            if let Some(subsurface) = child.role.subsurface_mut() {
                subsurface.x = x;
                subsurface.y = y;
            }
            child.x = x;
            child.y = y;
        }
    }
    if let (Some(geometry), Some(xdg_surface)) = (pending.window_geometry, xdg_surface) {
        if let Some(xdg_surface) = objects.get_mut::<XdgSurface>(xdg_surface) {
            xdg_surface.geometry = Some(geometry);
        }
    }
    if let Some(toplevel) = toplevel.and_then(|t| objects.get_mut::<XdgToplevel>(t)) {
        if let Some(size) = pending.min_size {
            toplevel.min_size = size;
        }
        if let Some(size) = pending.max_size {
            toplevel.max_size = size;
        }
    }
    objects.push_frame_callbacks(pending.frame_callbacks.drain(..));
    children
}

fn swap_region(
    current: &mut Option<Rc<Region>>,
    staged: Option<Option<Rc<Region>>>,
    name: &str,
) {
    let Some(staged) = staged else {
        return;
    };
    let same = match (&*current, &staged) {
        (Some(a), Some(b)) => Rc::ptr_eq(a, b),
        (None, None) => true,
        _ => false,
    };
    if same {
        return;
    }
    if let Some(old) = current.take() {
        log::trace!("Releasing the previous {} region", name);
        drop(old);
    }
    *current = staged;
}

/// Moves `child` within the draw order.
///
/// With a sibling the child is placed directly above or below it. Without one the child
/// becomes the topmost or bottommost entry. Moves that name an entry that is not in the list
/// are ignored.
pub fn move_child(children: &mut Vec<WlSurfaceId>, z_move: ZMove) {
    let Some(pos) = children.iter().position(|c| *c == z_move.child) else {
        return;
    };
    if let Some(sibling) = z_move.relative_to {
        if sibling == z_move.child || !children.contains(&sibling) {
            return;
        }
    }
    children.remove(pos);
    match z_move.relative_to {
        Some(sibling) => {
            let Some(idx) = children.iter().position(|c| *c == sibling) else {
                children.insert(pos, z_move.child);
                return;
            };
            let idx = match z_move.above {
                true => idx + 1,
                false => idx,
            };
            children.insert(idx, z_move.child);
        }
        None => match z_move.above {
            true => children.push(z_move.child),
            false => children.insert(0, z_move.child),
        },
    }
}
