use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConversionError {
    #[error("Failed to read input file: {0}")]
    InputReadError(String),

    #[error("Failed to write output file: {0}")]
    OutputWriteError(String),

    #[error("Expected 2 payload segments separated by '|||', found {0}")]
    DelimiterCount(usize),

    #[error("Malformed JSON in {segment} segment: {message}")]
    JsonError { segment: &'static str, message: String },

    #[error("Origin must be [minX, maxY], got {0} value(s)")]
    InvalidOrigin(usize),

    #[error("Non-numeric grid value at {path}: {value}")]
    NonNumericValue { path: String, value: String },

    #[error("Ragged grid at {path}: expected {expected}, found {found}")]
    RaggedGrid {
        path: String,
        expected: String,
        found: String,
    },

    #[error("Grid has {0} dimension(s), at least {1} required")]
    InsufficientDimensions(usize, usize),

    #[error("Grid has {0} dimension(s), at most {1} supported")]
    TooManyDimensions(usize, usize),

    #[error("Grid holds {0} band(s) but the output raster has exactly 1")]
    BandCountMismatch(usize),

    #[error("Invalid raster dimensions: width={0}, height={1}")]
    InvalidDimensions(usize, usize),

    #[error("Invalid CRS definition: {0}")]
    InvalidCrs(String),

    #[error("Missing GeoTIFF key or tag: {0}")]
    MissingGeoKey(String),

    #[error("Failed to encode GeoTIFF: {0}")]
    EncodeError(String),

    #[error("Failed to decode GeoTIFF: {0}")]
    DecodeError(String),

    #[error("Array construction failed: {0}")]
    ShapeError(#[from] ndarray::ShapeError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConversionError>;
