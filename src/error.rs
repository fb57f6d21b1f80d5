use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlotError {
    InvalidSpacing {
        sample_spacing: f64,
        pixel_size: f64,
    },
    InvalidDomainDims {
        width: f64,
        height: f64,
    },
    KeyRangeOverflow {
        offset: f64,
        limit: f64,
    },
}

pub type PlotResult<T> = Result<T, PlotError>;

impl fmt::Display for PlotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlotError::InvalidSpacing {
                sample_spacing,
                pixel_size,
            } => {
                write!(
                    f,
                    "sample spacing and pixel size must be positive powers of two (sample_spacing: {}, pixel_size: {})",
                    sample_spacing, pixel_size
                )
            }
            PlotError::InvalidDomainDims { width, height } => {
                write!(
                    f,
                    "domain width/height must be finite and non-negative (width: {}, height: {})",
                    width, height
                )
            }
            PlotError::KeyRangeOverflow { offset, limit } => {
                write!(
                    f,
                    "keying offset exceeds the safe integer range (offset: {}, limit: {})",
                    offset, limit
                )
            }
        }
    }
}

impl std::error::Error for PlotError {}
