pub mod raster_pipeline;
pub mod logger;
