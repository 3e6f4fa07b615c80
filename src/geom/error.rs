//! Error type for geometry-construction failures.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GeometryError {
    #[error("a ray frame could not be built: {0}")]
    DegenerateFrame(String),

    #[error("antenna pattern had zero gain everywhere, no frame axis available")]
    ZeroGainPattern,
}
