//! Conversion of labeled rows into model inputs.

use ndarray::{Array1, Array2};

use crate::{ForesightError, LabeledRow, Result};

/// Stacks the feature vectors of `rows` into a matrix.
///
/// # Errors
///
/// Returns [`ForesightError::InvalidData`] if a row has no features and
/// [`ForesightError::SchemaMismatch`] if a row is not `width` wide.
pub fn feature_matrix<'a, I>(rows: I, width: usize) -> Result<Array2<f64>>
where
    I: IntoIterator<Item = &'a LabeledRow>,
{
    let mut data = Vec::new();
    let mut nrows = 0;
    for row in rows {
        let values = row.features.as_ref().ok_or_else(|| {
            ForesightError::InvalidData(format!("no features on {}", row.date))
        })?;
        if values.len() != width {
            return Err(ForesightError::SchemaMismatch {
                expected: width,
                found: values.len(),
            });
        }
        data.extend_from_slice(values);
        nrows += 1;
    }
    Array2::from_shape_vec((nrows, width), data)
        .map_err(|e| ForesightError::InvalidData(e.to_string()))
}

/// Features and 0/1 labels of the trainable rows among `rows`.
///
/// Rows without features or without a label are skipped.
///
/// # Errors
///
/// Returns [`ForesightError::SchemaMismatch`] if a row is not `width` wide.
pub fn training_set<'a, I>(rows: I, width: usize) -> Result<(Array2<f64>, Array1<u8>)>
where
    I: IntoIterator<Item = &'a LabeledRow>,
{
    let trainable: Vec<&LabeledRow> = rows.into_iter().filter(|r| r.is_trainable()).collect();
    let labels: Array1<u8> = trainable
        .iter()
        .filter_map(|r| r.label.map(|l| l.as_u8()))
        .collect();
    let features = feature_matrix(trainable, width)?;
    Ok((features, labels))
}
