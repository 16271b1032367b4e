use {
    crate::{
        client::{Client, ClientError, ErrorCode, RequestError},
        globals::GLOBALS,
        ifs::{wl_callback::WlCallback, wl_registry::WlRegistry},
        utils::buffd::MsgParserError,
        wire::{WlDisplayId, wl_display::*, wl_registry::Global},
    },
    thiserror::Error,
};

pub struct WlDisplay {
    pub id: WlDisplayId,
}

impl WlDisplay {
    pub fn new(id: WlDisplayId) -> Self {
        Self { id }
    }
}

object_kind!(WlDisplay, WlDisplayId, Display, WlDisplay);

impl WlDisplayRequestHandler for WlDisplay {
    type Error = WlDisplayError;

    fn sync(client: &mut Client, _id: WlDisplayId, req: Sync) -> Result<(), Self::Error> {
        client.objects.add(WlCallback::new(req.callback))?;
        let serial = client.next_serial();
        client.fire_callback(req.callback, serial);
        Ok(())
    }

    fn get_registry(
        client: &mut Client,
        _id: WlDisplayId,
        req: GetRegistry,
    ) -> Result<(), Self::Error> {
        client.objects.add(WlRegistry::new(req.registry))?;
        for global in GLOBALS {
            client.event(Global {
                self_id: req.registry,
                name: global.name.raw(),
                interface: global.interface.name().to_string(),
                version: global.version,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum WlDisplayError {
    #[error("Parsing failed")]
    ParserError(#[source] Box<MsgParserError>),
    #[error(transparent)]
    ClientError(Box<ClientError>),
}
efrom!(WlDisplayError, ParserError, MsgParserError);
efrom!(WlDisplayError, ClientError);

impl RequestError for WlDisplayError {
    fn code(&self) -> ErrorCode {
        match self {
            WlDisplayError::ParserError(_) => ClientError::InvalidMethod.code(),
            WlDisplayError::ClientError(e) => e.code(),
        }
    }
}
