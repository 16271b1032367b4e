#[cfg(test)]
mod tests;

use {
    crate::{
        client::{ClientError, LookupError},
        globals::GlobalName,
        ifs::{wl_display::WlDisplay, wl_surface::WlSurface},
        object::{Interface, Object, ObjectId, ObjectKind, Version},
        wire::{WlCallbackId, WlSurfaceId, XdgToplevelId},
    },
    ahash::{AHashMap, AHashSet},
    std::{collections::VecDeque, mem},
};

pub const MIN_SERVER_ID: u32 = 0xff000000;

/// The objects of one client.
pub struct Objects {
    registry: AHashMap<ObjectId, Object>,
    binds: AHashMap<GlobalName, AHashMap<ObjectId, Version>>,
    role_surfaces: AHashMap<ObjectId, WlSurfaceId>,
    drawable: AHashSet<WlSurfaceId>,
    toplevels: AHashSet<XdgToplevelId>,
    frame_callbacks: VecDeque<WlCallbackId>,
}

impl Default for Objects {
    fn default() -> Self {
        Self::new()
    }
}

impl Objects {
    pub fn new() -> Self {
        Self {
            registry: Default::default(),
            binds: Default::default(),
            role_surfaces: Default::default(),
            drawable: Default::default(),
            toplevels: Default::default(),
            frame_callbacks: Default::default(),
        }
    }

    pub fn destroy(&mut self) {
        self.registry.clear();
        self.binds.clear();
        self.role_surfaces.clear();
        self.drawable.clear();
        self.toplevels.clear();
        self.frame_callbacks.clear();
    }

    /// Checks that a client may create an object with this id.
    pub fn check_new_id(&self, id: impl Into<ObjectId>) -> Result<(), ClientError> {
        let id = id.into();
        if id.raw() == 0 || id.raw() >= MIN_SERVER_ID {
            return Err(ClientError::ClientIdOutOfBounds);
        }
        if self.registry.contains_key(&id) {
            return Err(ClientError::IdAlreadyInUse);
        }
        Ok(())
    }

    pub fn add<T: ObjectKind>(&mut self, obj: T) -> Result<(), ClientError> {
        let id = obj.id().into();
        self.check_new_id(id)?;
        self.registry.insert(id, obj.wrap());
        Ok(())
    }

    /// Installs the display object, which exists for the whole life of the client.
    pub fn insert_display(&mut self, display: WlDisplay) {
        self.registry.insert(display.id.into(), display.wrap());
    }

    /// Removes an object together with every index entry that refers to it.
    pub fn remove(&mut self, id: impl Into<ObjectId>) -> Option<Object> {
        let id = id.into();
        let obj = self.registry.remove(&id)?;
        self.role_surfaces.remove(&id);
        self.drawable.remove(&WlSurfaceId::from(id));
        self.toplevels.remove(&XdgToplevelId::from(id));
        Some(obj)
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.registry.contains_key(&id)
    }

    pub fn interface(&self, id: ObjectId) -> Option<Interface> {
        self.registry.get(&id).map(|o| o.interface())
    }

    /// Returns the object if it exists and has the requested type.
    pub fn get<T: ObjectKind>(&self, id: T::Id) -> Option<&T> {
        self.registry.get(&id.into()).and_then(T::unwrap_ref)
    }

    pub fn get_mut<T: ObjectKind>(&mut self, id: T::Id) -> Option<&mut T> {
        self.registry.get_mut(&id.into()).and_then(T::unwrap_mut)
    }

    pub fn all<T: ObjectKind>(&self) -> impl Iterator<Item = &T> + '_ {
        self.registry.values().filter_map(T::unwrap_ref)
    }

    pub fn lookup<T: ObjectKind>(&self, id: T::Id) -> Result<&T, ClientError> {
        match self.get::<T>(id) {
            Some(t) => Ok(t),
            None => Err(lookup_error::<T>(id)),
        }
    }

    pub fn lookup_mut<T: ObjectKind>(&mut self, id: T::Id) -> Result<&mut T, ClientError> {
        match self.get_mut::<T>(id) {
            Some(t) => Ok(t),
            None => Err(lookup_error::<T>(id)),
        }
    }

    pub fn add_bind(&mut self, name: GlobalName, id: ObjectId, version: Version) {
        self.binds.entry(name).or_default().insert(id, version);
    }

    pub fn remove_bind(&mut self, name: GlobalName, id: ObjectId) {
        if let Some(binds) = self.binds.get_mut(&name) {
            binds.remove(&id);
            if binds.is_empty() {
                self.binds.remove(&name);
            }
        }
    }

    pub fn binds(&self, name: GlobalName) -> impl Iterator<Item = (ObjectId, Version)> + '_ {
        self.binds
            .get(&name)
            .into_iter()
            .flat_map(|b| b.iter().map(|(id, v)| (*id, *v)))
    }

    pub fn set_role_surface(&mut self, role: impl Into<ObjectId>, surface: WlSurfaceId) {
        self.role_surfaces.insert(role.into(), surface);
    }

    pub fn role_surface(&self, role: impl Into<ObjectId>) -> Option<WlSurfaceId> {
        self.role_surfaces.get(&role.into()).copied()
    }

    /// Recomputes whether the surface can be drawn.
    ///
    /// A surface is drawable once it has an active role and has committed a buffer. A
    /// subsurface whose parent is gone is not drawable.
    pub fn refresh_drawable(&mut self, id: WlSurfaceId) {
        let drawable = match self.get::<WlSurface>(id) {
            Some(s) => {
                let parent_alive = match s.role.subsurface() {
                    Some(ss) => self.get::<WlSurface>(ss.parent).is_some(),
                    None => true,
                };
                s.role.has_payload() && s.has_committed_buffer && parent_alive
            }
            None => false,
        };
        match drawable {
            true => self.drawable.insert(id),
            false => self.drawable.remove(&id),
        };
    }

    pub fn is_drawable(&self, id: WlSurfaceId) -> bool {
        self.drawable.contains(&id)
    }

    pub fn drawable(&self) -> impl Iterator<Item = &WlSurface> + '_ {
        self.drawable
            .iter()
            .filter_map(|id| self.get::<WlSurface>(*id))
    }

    pub fn add_toplevel(&mut self, id: XdgToplevelId) {
        self.toplevels.insert(id);
    }

    pub fn remove_toplevel(&mut self, id: XdgToplevelId) {
        self.toplevels.remove(&id);
    }

    pub fn toplevels(&self) -> impl Iterator<Item = XdgToplevelId> + '_ {
        self.toplevels.iter().copied()
    }

    pub fn push_frame_callbacks(&mut self, callbacks: impl IntoIterator<Item = WlCallbackId>) {
        self.frame_callbacks.extend(callbacks);
    }

    pub fn take_frame_callbacks(&mut self) -> impl Iterator<Item = WlCallbackId> + use<> {
        mem::take(&mut self.frame_callbacks).into_iter()
    }
}

fn lookup_error<T: ObjectKind>(id: T::Id) -> ClientError {
    ClientError::LookupError(LookupError {
        interface: T::INTERFACE,
        id: id.into(),
    })
}
