macro_rules! efrom {
    ($ename:ty, $vname:ident) => {
        efrom!($ename, $vname, $vname);
    };
    ($ename:ty, $vname:ident, $sname:ty) => {
        impl From<$sname> for $ename {
            fn from(e: $sname) -> Self {
                Self::$vname(Box::new(e))
            }
        }
    };
}

macro_rules! fatal {
    ($($arg:tt)+) => {{
        log::error!($($arg)+);
        std::process::exit(1);
    }};
}

macro_rules! id {
    ($name:ident) => {
        #[derive(Debug, Copy, Clone, Hash, Ord, PartialOrd, Eq, PartialEq)]
        pub struct $name(u32);

        #[allow(dead_code)]
        impl $name {
            pub const NONE: Self = $name(0);

            pub const fn from_raw(raw: u32) -> Self {
                Self(raw)
            }

            pub fn raw(self) -> u32 {
                self.0
            }

            pub fn is_some(self) -> bool {
                self.0 != 0
            }

            pub fn is_none(self) -> bool {
                self.0 == 0
            }
        }

        impl From<crate::object::ObjectId> for $name {
            fn from(f: crate::object::ObjectId) -> Self {
                Self(f.raw())
            }
        }

        impl From<$name> for crate::object::ObjectId {
            fn from(f: $name) -> Self {
                crate::object::ObjectId::from_raw(f.0)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                std::fmt::Display::fmt(&self.0, f)
            }
        }
    };
}

macro_rules! linear_ids {
    ($ids:ident, $id:ident) => {
        #[derive(Debug, Copy, Clone, Hash, Ord, PartialOrd, Eq, PartialEq)]
        pub struct $id(u64);

        impl $id {
            #[allow(dead_code)]
            pub fn raw(self) -> u64 {
                self.0
            }
        }

        impl std::fmt::Display for $id {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                std::fmt::Display::fmt(&self.0, f)
            }
        }

        pub struct $ids {
            next: std::sync::atomic::AtomicU64,
        }

        impl Default for $ids {
            fn default() -> Self {
                Self {
                    next: std::sync::atomic::AtomicU64::new(1),
                }
            }
        }

        impl $ids {
            pub fn next(&self) -> $id {
                $id(self.next.fetch_add(1, std::sync::atomic::Ordering::Relaxed))
            }
        }
    };
}

/// Declares the typed object of an interface and wires it into the object registry.
///
/// The registry stores every object in the tagged `Object` enum. This macro implements
/// `ObjectKind` for the typed object so that `Objects::get::<T>(id)` only succeeds when the
/// stored object has the requested interface.
macro_rules! object_kind {
    ($oname:ident, $idname:ident, $variant:ident, $iface:ident) => {
        impl crate::object::ObjectKind for $oname {
            type Id = $idname;
            const INTERFACE: crate::object::Interface = crate::object::Interface::$iface;

            fn id(&self) -> Self::Id {
                self.id
            }

            fn wrap(self) -> crate::object::Object {
                crate::object::Object::$variant(Box::new(self))
            }

            fn unwrap_ref(obj: &crate::object::Object) -> Option<&Self> {
                match obj {
                    crate::object::Object::$variant(o) => Some(o),
                    _ => None,
                }
            }

            fn unwrap_mut(obj: &mut crate::object::Object) -> Option<&mut Self> {
                match obj {
                    crate::object::Object::$variant(o) => Some(o),
                    _ => None,
                }
            }
        }
    };
}
