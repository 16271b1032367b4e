use {
    crate::{
        client::{Client, ClientError, ErrorCode, RequestError},
        rect::Rect,
        utils::buffd::MsgParserError,
        wire::{XdgPositionerId, xdg_positioner::*},
    },
    thiserror::Error,
};

const INVALID_INPUT: u32 = 0;

/// The placement rules of a popup.
///
/// Only the anchor rectangle, the offset and the size take part in positioning. Anchor,
/// gravity and constraint adjustments are accepted and recorded but there is nothing to
/// constrain against on a virtual monitor.
#[derive(Copy, Clone, Debug, Default)]
pub struct Positioning {
    pub size: Option<(i32, i32)>,
    pub anchor_rect: Option<Rect>,
    pub offset: (i32, i32),
    pub anchor: u32,
    pub gravity: u32,
    pub constraint_adjustment: u32,
    pub reactive: bool,
}

impl Positioning {
    pub fn is_complete(&self) -> bool {
        self.size.is_some() && self.anchor_rect.is_some()
    }

    /// The popup geometry relative to the parent.
    pub fn geometry(&self) -> Rect {
        let (width, height) = self.size.unwrap_or_default();
        let (x, y) = match self.anchor_rect {
            Some(r) => (r.x1(), r.y1()),
            None => (0, 0),
        };
        Rect::new_sized_saturating(x + self.offset.0, y + self.offset.1, width, height)
    }
}

pub struct XdgPositioner {
    pub id: XdgPositionerId,
    pub positioning: Positioning,
}

impl XdgPositioner {
    pub fn new(id: XdgPositionerId) -> Self {
        Self {
            id,
            positioning: Default::default(),
        }
    }
}

object_kind!(XdgPositioner, XdgPositionerId, XdgPositioner, XdgPositioner);

fn positioning(
    client: &mut Client,
    id: XdgPositionerId,
) -> Result<&mut Positioning, XdgPositionerError> {
    Ok(&mut client.objects.lookup_mut::<XdgPositioner>(id)?.positioning)
}

impl XdgPositionerRequestHandler for XdgPositioner {
    type Error = XdgPositionerError;

    fn destroy(client: &mut Client, id: XdgPositionerId, _req: Destroy) -> Result<(), Self::Error> {
        client.remove_obj(id)?;
        Ok(())
    }

    fn set_size(client: &mut Client, id: XdgPositionerId, req: SetSize) -> Result<(), Self::Error> {
        if req.width <= 0 || req.height <= 0 {
            return Err(XdgPositionerError::NonPositiveSize);
        }
        positioning(client, id)?.size = Some((req.width, req.height));
        Ok(())
    }

    fn set_anchor_rect(
        client: &mut Client,
        id: XdgPositionerId,
        req: SetAnchorRect,
    ) -> Result<(), Self::Error> {
        if req.width < 0 || req.height < 0 {
            return Err(XdgPositionerError::NegativeAnchorRect);
        }
        positioning(client, id)?.anchor_rect = Some(Rect::new_sized_saturating(
            req.x, req.y, req.width, req.height,
        ));
        Ok(())
    }

    fn set_anchor(
        client: &mut Client,
        id: XdgPositionerId,
        req: SetAnchor,
    ) -> Result<(), Self::Error> {
        positioning(client, id)?.anchor = req.anchor;
        Ok(())
    }

    fn set_gravity(
        client: &mut Client,
        id: XdgPositionerId,
        req: SetGravity,
    ) -> Result<(), Self::Error> {
        positioning(client, id)?.gravity = req.gravity;
        Ok(())
    }

    fn set_constraint_adjustment(
        client: &mut Client,
        id: XdgPositionerId,
        req: SetConstraintAdjustment,
    ) -> Result<(), Self::Error> {
        positioning(client, id)?.constraint_adjustment = req.constraint_adjustment;
        Ok(())
    }

    fn set_offset(
        client: &mut Client,
        id: XdgPositionerId,
        req: SetOffset,
    ) -> Result<(), Self::Error> {
        positioning(client, id)?.offset = (req.x, req.y);
        Ok(())
    }

    fn set_reactive(
        client: &mut Client,
        id: XdgPositionerId,
        _req: SetReactive,
    ) -> Result<(), Self::Error> {
        positioning(client, id)?.reactive = true;
        Ok(())
    }

    fn set_parent_size(
        client: &mut Client,
        id: XdgPositionerId,
        _req: SetParentSize,
    ) -> Result<(), Self::Error> {
        positioning(client, id)?;
        Ok(())
    }

    fn set_parent_configure(
        client: &mut Client,
        id: XdgPositionerId,
        _req: SetParentConfigure,
    ) -> Result<(), Self::Error> {
        positioning(client, id)?;
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum XdgPositionerError {
    #[error("Parsing failed")]
    ParserError(#[source] Box<MsgParserError>),
    #[error(transparent)]
    ClientError(Box<ClientError>),
    #[error("Cannot set a non-positive size")]
    NonPositiveSize,
    #[error("Cannot set an anchor rect with negative size")]
    NegativeAnchorRect,
}
efrom!(XdgPositionerError, ParserError, MsgParserError);
efrom!(XdgPositionerError, ClientError);

impl RequestError for XdgPositionerError {
    fn code(&self) -> ErrorCode {
        match self {
            XdgPositionerError::ParserError(_) => ClientError::InvalidMethod.code(),
            XdgPositionerError::ClientError(e) => e.code(),
            XdgPositionerError::NonPositiveSize | XdgPositionerError::NegativeAnchorRect => {
                ErrorCode::Interface(INVALID_INPUT)
            }
        }
    }
}
