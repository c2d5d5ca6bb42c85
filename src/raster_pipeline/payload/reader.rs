use crate::raster_pipeline::common::error::Result;
use crate::raster_pipeline::payload::types::GridPayload;

pub trait PayloadReader {
    fn read_payload(&self, text: &str) -> Result<GridPayload>;
}
