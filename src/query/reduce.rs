// ABOUTME: Typed query helpers reducing result sets to matrices, rows, columns, scalars
// ABOUTME: Each reduction step validates the result shape before narrowing it

use crate::error::{DbUriError, Result};
use crate::query::Scalar;
use crate::utils::sanitize_identifier;
use futures::TryStreamExt;
use tokio_postgres::types::ToSql;
use tokio_postgres::{Client, Row};

/// Rows of homogeneous scalar values, in query order
pub type Matrix<T> = Vec<Vec<T>>;

/// Run `query` and decode every column of every row into `T`
///
/// Row and column order are preserved. Rows are streamed and decoded one at a
/// time; the stream is dropped before returning on every path.
///
/// # Errors
///
/// Returns [`DbUriError::Query`] if the query fails and [`DbUriError::Decode`]
/// if any value cannot be converted into `T`.
///
/// # Examples
///
/// ```no_run
/// # use pg_dburi::postgres::DbUri;
/// # use pg_dburi::query::query_matrix;
/// # async fn example() -> pg_dburi::error::Result<()> {
/// let client = DbUri::new("localhost", "5432", "app", "admin", "")?.open().await?;
/// let pairs: Vec<Vec<String>> =
///     query_matrix(&client, "SELECT datname, datdba FROM pg_database", &[]).await?;
/// # Ok(())
/// # }
/// ```
pub async fn query_matrix<T: Scalar>(
    client: &Client,
    query: &str,
    params: &[&(dyn ToSql + Sync)],
) -> Result<Matrix<T>> {
    tracing::debug!("Running query: {}", sanitize_identifier(query));

    let query_error = |source| DbUriError::Query {
        query: query.to_string(),
        source,
    };

    let rows = client
        .query_raw(query, params.iter().map(|p| *p as &dyn ToSql))
        .await
        .map_err(query_error)?;
    futures::pin_mut!(rows);

    let mut matrix = Vec::new();
    while let Some(row) = rows.try_next().await.map_err(query_error)? {
        matrix.push(decode_row(&row)?);
    }

    Ok(matrix)
}

/// Run `query` expecting at most one row
///
/// No rows yields an empty row.
///
/// # Errors
///
/// Returns [`DbUriError::Cardinality`] if the query returns more than one row,
/// plus any error from [`query_matrix`].
pub async fn query_row<T: Scalar>(
    client: &Client,
    query: &str,
    params: &[&(dyn ToSql + Sync)],
) -> Result<Vec<T>> {
    let matrix = query_matrix(client, query, params).await?;
    reduce_row(matrix, query)
}

/// Run `query` expecting exactly one column
///
/// No rows yields an empty column.
///
/// # Errors
///
/// Returns [`DbUriError::Shape`] if rows are not exactly one column wide,
/// plus any error from [`query_matrix`].
pub async fn query_column<T: Scalar>(
    client: &Client,
    query: &str,
    params: &[&(dyn ToSql + Sync)],
) -> Result<Vec<T>> {
    let matrix = query_matrix(client, query, params).await?;
    reduce_column(matrix, query)
}

/// Run `query` expecting exactly one row holding exactly one value
///
/// # Errors
///
/// Returns [`DbUriError::Cardinality`] if the query yields more than one row
/// or a row without exactly one value (including no row at all).
pub async fn query_scalar<T: Scalar>(
    client: &Client,
    query: &str,
    params: &[&(dyn ToSql + Sync)],
) -> Result<T> {
    let row = query_row(client, query, params).await?;
    reduce_scalar(row, query)
}

/// Narrow a matrix to its only row; empty when there are no rows
pub fn reduce_row<T>(matrix: Matrix<T>, query: &str) -> Result<Vec<T>> {
    let count = matrix.len();
    if count > 1 {
        return Err(DbUriError::Cardinality {
            query: query.to_string(),
            unit: "rows",
            actual: count,
            expected: "0 or 1",
        });
    }
    Ok(matrix.into_iter().next().unwrap_or_default())
}

/// Narrow a matrix of single-value rows to the sequence of those values
pub fn reduce_column<T>(matrix: Matrix<T>, query: &str) -> Result<Vec<T>> {
    let mut column = Vec::with_capacity(matrix.len());
    for row in matrix {
        if row.len() != 1 {
            return Err(DbUriError::Shape {
                query: query.to_string(),
                actual: row.len(),
                expected: 1,
            });
        }
        column.extend(row);
    }
    Ok(column)
}

/// Narrow a row to its only value
pub fn reduce_scalar<T>(row: Vec<T>, query: &str) -> Result<T> {
    let count = row.len();
    let mut values = row.into_iter();
    match (values.next(), values.next()) {
        (Some(value), None) => Ok(value),
        _ => Err(DbUriError::Cardinality {
            query: query.to_string(),
            unit: "values",
            actual: count,
            expected: "1",
        }),
    }
}

fn decode_row<T: Scalar>(row: &Row) -> Result<Vec<T>> {
    (0..row.len()).map(|idx| T::decode(row, idx)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const Q: &str = "SELECT test";

    #[test]
    fn test_reduce_row_empty_matrix_is_empty_row() {
        let row = reduce_row::<String>(Vec::new(), Q).unwrap();
        assert!(row.is_empty());
    }

    #[test]
    fn test_reduce_row_single_row() {
        let row = reduce_row(vec![vec![1i64, 2, 3]], Q).unwrap();
        assert_eq!(row, vec![1, 2, 3]);
    }

    #[test]
    fn test_reduce_row_reports_exact_row_count() {
        let matrix = vec![vec!["a".to_string()], vec!["b".to_string()], vec!["c".to_string()]];
        match reduce_row(matrix, Q) {
            Err(DbUriError::Cardinality {
                unit,
                actual,
                expected,
                query,
            }) => {
                assert_eq!(unit, "rows");
                assert_eq!(actual, 3);
                assert_eq!(expected, "0 or 1");
                assert_eq!(query, Q);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_reduce_column_empty_matrix_is_empty_column() {
        assert!(reduce_column::<i64>(Vec::new(), Q).unwrap().is_empty());
    }

    #[test]
    fn test_reduce_column_keeps_row_order() {
        let column = reduce_column(vec![vec![3i64], vec![1], vec![2]], Q).unwrap();
        assert_eq!(column, vec![3, 1, 2]);
    }

    #[test]
    fn test_reduce_column_rejects_two_columns() {
        let err = reduce_column(vec![vec![1i64, 2]], Q).unwrap_err();
        assert!(matches!(
            err,
            DbUriError::Shape {
                actual: 2,
                expected: 1,
                ..
            }
        ));
        assert!(err.to_string().contains("2 columns, expected 1"));
    }

    #[test]
    fn test_reduce_column_rejects_zero_width_rows() {
        let err = reduce_column::<i64>(vec![vec![]], Q).unwrap_err();
        assert!(matches!(err, DbUriError::Shape { actual: 0, .. }));
    }

    #[test]
    fn test_reduce_scalar_single_value() {
        assert_eq!(reduce_scalar(vec!["42".to_string()], Q).unwrap(), "42");
    }

    #[test]
    fn test_reduce_scalar_rejects_two_values() {
        let err = reduce_scalar(vec![1i64, 2], Q).unwrap_err();
        assert!(matches!(
            err,
            DbUriError::Cardinality {
                unit: "values",
                actual: 2,
                expected: "1",
                ..
            }
        ));
    }

    #[test]
    fn test_reduce_scalar_rejects_empty_row() {
        let err = reduce_scalar::<String>(Vec::new(), Q).unwrap_err();
        assert!(matches!(err, DbUriError::Cardinality { actual: 0, .. }));
    }

    #[test]
    fn test_reduction_chain_row_then_scalar() {
        let matrix = vec![vec![7i64]];
        let row = reduce_row(matrix, Q).unwrap();
        assert_eq!(reduce_scalar(row, Q).unwrap(), 7);
    }
}
