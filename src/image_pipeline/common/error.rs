use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConversionError {
    #[error("Failed to read input file: {0}")]
    InputReadError(String),
    
    #[error("Failed to write output file: {0}")]
    OutputWriteError(String),
    
    #[error("Malformed {axis} distance in metadata: {reason}")]
    CalibrationMalformed { axis: String, reason: String },
    
    #[error("Inconsistent acquisition structure: {0}")]
    StructuralInconsistency(String),
    
    #[error("Failed to read plane: {0}")]
    PlaneReadError(String),
    
    #[error("Planes of one entry disagree in shape: expected {expected:?}, found {found:?}")]
    ShapeMismatch { expected: Vec<usize>, found: Vec<usize> },
    
    #[error("Mosaic entry {0} has no tile bounding box")]
    MissingBoundingBox(usize),
    
    #[error("Failed to encode TIFF image: {0}")]
    EncodeError(String),
    
    #[error("Invalid image dimensions: width={0}, height={1}")]
    InvalidDimensions(usize, usize),
    
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),
    
    #[error("No {0} decoder is linked into this build")]
    BackendUnavailable(&'static str),
    
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConversionError>;
