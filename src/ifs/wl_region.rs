use {
    crate::{
        client::{Client, ClientError, ErrorCode, RequestError},
        rect::{Rect, Region, RegionBuilder},
        utils::buffd::MsgParserError,
        wire::{WlRegionId, wl_region::*},
    },
    std::rc::Rc,
    thiserror::Error,
};

pub struct WlRegion {
    pub id: WlRegionId,
    builder: RegionBuilder,
    snapshot: Option<Rc<Region>>,
}

impl WlRegion {
    pub fn new(id: WlRegionId) -> Self {
        Self {
            id,
            builder: Default::default(),
            snapshot: None,
        }
    }

    /// Returns the current region.
    ///
    /// Repeated calls without intermediate changes return the same allocation.
    pub fn region(&mut self) -> Rc<Region> {
        self.snapshot
            .get_or_insert_with(|| Rc::new(self.builder.get()))
            .clone()
    }

    fn modify(&mut self) -> &mut RegionBuilder {
        self.snapshot = None;
        &mut self.builder
    }
}

object_kind!(WlRegion, WlRegionId, Region, WlRegion);

fn extents(x: i32, y: i32, width: i32, height: i32) -> Result<Rect, WlRegionError> {
    if width < 0 || height < 0 {
        return Err(WlRegionError::NegativeExtents);
    }
    Ok(Rect::new_sized_saturating(x, y, width, height))
}

impl WlRegionRequestHandler for WlRegion {
    type Error = WlRegionError;

    fn destroy(client: &mut Client, id: WlRegionId, _req: Destroy) -> Result<(), Self::Error> {
        client.remove_obj(id)?;
        Ok(())
    }

    fn add(client: &mut Client, id: WlRegionId, req: Add) -> Result<(), Self::Error> {
        let rect = extents(req.x, req.y, req.width, req.height)?;
        let region = client.objects.lookup_mut::<WlRegion>(id)?;
        region.modify().add(rect);
        Ok(())
    }

    fn subtract(client: &mut Client, id: WlRegionId, req: Subtract) -> Result<(), Self::Error> {
        let rect = extents(req.x, req.y, req.width, req.height)?;
        let region = client.objects.lookup_mut::<WlRegion>(id)?;
        region.modify().sub(rect);
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum WlRegionError {
    #[error("Parsing failed")]
    ParserError(#[source] Box<MsgParserError>),
    #[error(transparent)]
    ClientError(Box<ClientError>),
    #[error("width and/or height are negative")]
    NegativeExtents,
}
efrom!(WlRegionError, ParserError, MsgParserError);
efrom!(WlRegionError, ClientError);

impl RequestError for WlRegionError {
    fn code(&self) -> ErrorCode {
        match self {
            WlRegionError::ParserError(_) => ClientError::InvalidMethod.code(),
            WlRegionError::ClientError(e) => e.code(),
            WlRegionError::NegativeExtents => ErrorCode::Interface(0),
        }
    }
}
