use {
    crate::{
        client::{Client, ClientError, ErrorCode, RequestError},
        globals::WL_OUTPUT,
        object::{ObjectId, Version},
        utils::buffd::MsgParserError,
        wire::{WlOutputId, wl_output::*},
    },
    thiserror::Error,
};

const SUBPIXEL_UNKNOWN: i32 = 0;
const TRANSFORM_NORMAL: i32 = 0;
const MODE_CURRENT: u32 = 1;
const MODE_PREFERRED: u32 = 2;
const REFRESH_MHZ: i32 = 60_000;

const SCALE_SINCE: Version = Version(2);
const DONE_SINCE: Version = Version(2);
const NAME_SINCE: Version = Version(4);

pub const OUTPUT_NAME: &str = "VIRTUAL-1";

/// The virtual monitor.
pub struct WlOutput {
    pub id: WlOutputId,
}

impl WlOutput {
    pub fn bind(client: &mut Client, id: ObjectId, version: Version) -> Result<(), ClientError> {
        let id = WlOutputId::from(id);
        client.objects.add(WlOutput { id })?;
        let (width, height) = (client.config.width as i32, client.config.height as i32);
        client.event(Geometry {
            self_id: id,
            x: 0,
            y: 0,
            physical_width: 0,
            physical_height: 0,
            subpixel: SUBPIXEL_UNKNOWN,
            make: "virtwl".to_string(),
            model: "virtual monitor".to_string(),
            transform: TRANSFORM_NORMAL,
        });
        client.event(Mode {
            self_id: id,
            flags: MODE_CURRENT | MODE_PREFERRED,
            width,
            height,
            refresh: REFRESH_MHZ,
        });
        if version >= SCALE_SINCE {
            client.event(Scale {
                self_id: id,
                factor: 1,
            });
        }
        if version >= NAME_SINCE {
            client.event(Name {
                self_id: id,
                name: OUTPUT_NAME.to_string(),
            });
            client.event(Description {
                self_id: id,
                description: format!("Virtual monitor {}x{}", width, height),
            });
        }
        if version >= DONE_SINCE {
            client.event(Done { self_id: id });
        }
        Ok(())
    }
}

object_kind!(WlOutput, WlOutputId, Output, WlOutput);

impl WlOutputRequestHandler for WlOutput {
    type Error = WlOutputError;

    fn release(client: &mut Client, id: WlOutputId, _req: Release) -> Result<(), Self::Error> {
        client.objects.remove_bind(WL_OUTPUT, id.into());
        client.remove_obj(id)?;
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum WlOutputError {
    #[error("Parsing failed")]
    ParserError(#[source] Box<MsgParserError>),
    #[error(transparent)]
    ClientError(Box<ClientError>),
}
efrom!(WlOutputError, ParserError, MsgParserError);
efrom!(WlOutputError, ClientError);

impl RequestError for WlOutputError {
    fn code(&self) -> ErrorCode {
        match self {
            WlOutputError::ParserError(_) => ClientError::InvalidMethod.code(),
            WlOutputError::ClientError(e) => e.code(),
        }
    }
}
