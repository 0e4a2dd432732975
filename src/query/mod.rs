// ABOUTME: Typed result reduction module
// ABOUTME: Exports the scalar decoding trait and matrix/row/column/scalar helpers

pub mod reduce;
pub mod scalar;

pub use reduce::{
    query_column, query_matrix, query_row, query_scalar, reduce_column, reduce_row,
    reduce_scalar, Matrix,
};
pub use scalar::Scalar;

/// Result rows decoded as text
pub type StringMatrix = Matrix<String>;

/// Result rows decoded as integers
pub type IntMatrix = Matrix<i64>;
