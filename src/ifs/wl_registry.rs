use {
    crate::{
        client::{Client, ClientError, ErrorCode, INVALID_OBJECT, RequestError},
        globals::{GlobalsError, check_bind},
        ifs::{
            wl_compositor::WlCompositor, wl_output::WlOutput, wl_shm::WlShm,
            wl_subcompositor::WlSubcompositor, xdg_wm_base::XdgWmBase,
            xwayland_shell_v1::XwaylandShellV1,
        },
        object::{Interface, Version},
        utils::buffd::MsgParserError,
        wire::{WlRegistryId, wl_registry::*},
    },
    thiserror::Error,
};

pub struct WlRegistry {
    pub id: WlRegistryId,
}

impl WlRegistry {
    pub fn new(id: WlRegistryId) -> Self {
        Self { id }
    }
}

object_kind!(WlRegistry, WlRegistryId, Registry, WlRegistry);

impl WlRegistryRequestHandler for WlRegistry {
    type Error = WlRegistryError;

    fn bind(client: &mut Client, _id: WlRegistryId, req: Bind) -> Result<(), Self::Error> {
        let global = check_bind(req.name, &req.interface, req.version)?;
        let version = Version(req.version);
        match global.interface {
            Interface::WlCompositor => WlCompositor::bind(client, req.id, version)?,
            Interface::WlSubcompositor => WlSubcompositor::bind(client, req.id)?,
            Interface::WlShm => WlShm::bind(client, req.id)?,
            Interface::WlOutput => WlOutput::bind(client, req.id, version)?,
            Interface::XdgWmBase => XdgWmBase::bind(client, req.id)?,
            Interface::XwaylandShellV1 => XwaylandShellV1::bind(client, req.id)?,
            _ => return Err(WlRegistryError::NotBindable(global.interface)),
        }
        client.objects.add_bind(global.name, req.id, version);
        log::debug!(
            "Client {} bound {} v{} as {}",
            client.id,
            global.interface,
            version,
            req.id
        );
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum WlRegistryError {
    #[error("Parsing failed")]
    ParserError(#[source] Box<MsgParserError>),
    #[error(transparent)]
    ClientError(Box<ClientError>),
    #[error(transparent)]
    GlobalsError(#[from] GlobalsError),
    #[error("`{0}` cannot be bound")]
    NotBindable(Interface),
}
efrom!(WlRegistryError, ParserError, MsgParserError);
efrom!(WlRegistryError, ClientError);

impl RequestError for WlRegistryError {
    fn code(&self) -> ErrorCode {
        match self {
            WlRegistryError::ParserError(_) => ClientError::InvalidMethod.code(),
            WlRegistryError::ClientError(e) => e.code(),
            WlRegistryError::GlobalsError(_) | WlRegistryError::NotBindable(_) => {
                ErrorCode::Display(INVALID_OBJECT)
            }
        }
    }
}
