//! Dataset providers.
//!
//! The network only depends on [`DataSet`]: a feature matrix with values in
//! `[0, 1]` and one string label per row. [`Mnist`] implements it for the
//! classic IDX byte layout (big-endian headers, row-major unsigned-byte
//! pixels), with transparent gzip support for `.gz` files.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;

use crate::error::{Error, Result};
use crate::matrix::Matrix;

const IMAGES_MAGIC: u32 = 2051;
const LABELS_MAGIC: u32 = 2049;

/// Supplier of a labeled numeric dataset.
pub trait DataSet {
    /// Feature matrix of shape `[examples, features]` with values normalized
    /// to `[0, 1]`, plus one label string per row.
    fn get_data_set(&self) -> Result<(Matrix, Vec<String>)>;
}

/// MNIST-style IDX image/label file pair.
pub struct Mnist {
    images_path: PathBuf,
    labels_path: PathBuf,
}

impl Mnist {
    pub fn new<P: AsRef<Path>>(images_path: P, labels_path: P) -> Mnist {
        Mnist {
            images_path: images_path.as_ref().to_path_buf(),
            labels_path: labels_path.as_ref().to_path_buf(),
        }
    }

    fn open(path: &Path) -> Result<Box<dyn Read>> {
        let file = File::open(path)?;
        if path.extension().is_some_and(|ext| ext == "gz") {
            Ok(Box::new(GzDecoder::new(file)))
        } else {
            Ok(Box::new(file))
        }
    }
}

impl DataSet for Mnist {
    fn get_data_set(&self) -> Result<(Matrix, Vec<String>)> {
        let images = read_images(Self::open(&self.images_path)?)?;
        let labels = read_labels(Self::open(&self.labels_path)?)?;

        if images.rows() != labels.len() {
            return Err(Error::Format(format!(
                "{} images but {} labels",
                images.rows(),
                labels.len()
            )));
        }
        Ok((images, labels))
    }
}

/// Parse an IDX image file: header `[magic, count, rows, cols]`, then
/// `count * rows * cols` pixel bytes, normalized by 255.
pub fn read_images<R: Read>(mut reader: R) -> Result<Matrix> {
    let magic = read_u32(&mut reader)?;
    if magic != IMAGES_MAGIC {
        return Err(Error::Format(format!(
            "bad image magic {magic} (expected {IMAGES_MAGIC})"
        )));
    }

    let count = read_u32(&mut reader)? as usize;
    let rows = read_u32(&mut reader)? as usize;
    let cols = read_u32(&mut reader)? as usize;
    let pixels_per_image = rows * cols;

    let mut data = Vec::with_capacity(count * pixels_per_image);
    let mut buffer = vec![0u8; pixels_per_image];
    for i in 0..count {
        reader
            .read_exact(&mut buffer)
            .map_err(|e| Error::Format(format!("truncated image {i}: {e}")))?;
        data.extend(buffer.iter().map(|&pixel| pixel as f64 / 255.0));
    }

    Matrix::from_vec(data, count, pixels_per_image)
}

/// Parse an IDX label file: header `[magic, count]`, then one byte per
/// label, rendered as its decimal string.
pub fn read_labels<R: Read>(mut reader: R) -> Result<Vec<String>> {
    let magic = read_u32(&mut reader)?;
    if magic != LABELS_MAGIC {
        return Err(Error::Format(format!(
            "bad label magic {magic} (expected {LABELS_MAGIC})"
        )));
    }

    let count = read_u32(&mut reader)? as usize;
    let mut bytes = vec![0u8; count];
    reader
        .read_exact(&mut bytes)
        .map_err(|e| Error::Format(format!("truncated labels: {e}")))?;

    Ok(bytes.iter().map(|b| b.to_string()).collect())
}

fn read_u32<R: Read>(reader: &mut R) -> Result<u32> {
    let mut bytes = [0u8; 4];
    reader.read_exact(&mut bytes)?;
    Ok(u32::from_be_bytes(bytes))
}
