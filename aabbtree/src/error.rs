use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TreeError {
    InvalidAabb {
        min_x: f32,
        min_y: f32,
        max_x: f32,
        max_y: f32,
    },
    ZeroLengthSegment {
        x: f32,
        y: f32,
    },
}

pub type TreeResult<T> = Result<T, TreeError>;

impl fmt::Display for TreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TreeError::InvalidAabb {
                min_x,
                min_y,
                max_x,
                max_y,
            } => {
                write!(
                    f,
                    "aabb bounds must be finite with lower <= upper (min_x: {}, min_y: {}, max_x: {}, max_y: {})",
                    min_x, min_y, max_x, max_y
                )
            }
            TreeError::ZeroLengthSegment { x, y } => {
                write!(
                    f,
                    "ray segment must have non-zero length (p1 == p2 == ({}, {}))",
                    x, y
                )
            }
        }
    }
}

impl std::error::Error for TreeError {}
