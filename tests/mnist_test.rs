use std::io::{Cursor, Write};

use flate2::write::GzEncoder;
use flate2::Compression;
use simpleml::dataset::{read_images, read_labels};
use simpleml::{DataSet, Error, Mnist};

fn image_bytes(count: u32, rows: u32, cols: u32, pixels: &[u8]) -> Vec<u8> {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&2051u32.to_be_bytes());
    bytes.extend_from_slice(&count.to_be_bytes());
    bytes.extend_from_slice(&rows.to_be_bytes());
    bytes.extend_from_slice(&cols.to_be_bytes());
    bytes.extend_from_slice(pixels);
    bytes
}

fn label_bytes(count: u32, values: &[u8]) -> Vec<u8> {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&2049u32.to_be_bytes());
    bytes.extend_from_slice(&count.to_be_bytes());
    bytes.extend_from_slice(values);
    bytes
}

#[test]
fn parses_images_and_normalizes_pixels() {
    let bytes = image_bytes(2, 2, 2, &[0, 255, 51, 102, 255, 0, 204, 153]);
    let images = read_images(Cursor::new(bytes)).unwrap();

    assert_eq!(images.dims(), (2, 4));
    assert_eq!(images.get(0, 0).unwrap(), 0.0);
    assert_eq!(images.get(0, 1).unwrap(), 1.0);
    assert!((images.get(0, 2).unwrap() - 0.2).abs() < 1e-12);
    assert_eq!(images.get(1, 1).unwrap(), 0.0);
    assert!(images.data().iter().all(|&p| (0.0..=1.0).contains(&p)));
}

#[test]
fn parses_labels_as_decimal_strings() {
    let bytes = label_bytes(3, &[3, 0, 9]);
    let parsed = read_labels(Cursor::new(bytes)).unwrap();
    assert_eq!(parsed, vec!["3", "0", "9"]);
}

#[test]
fn rejects_bad_magic_numbers() {
    let mut bytes = image_bytes(1, 1, 1, &[7]);
    bytes[3] = 0x99;
    assert!(matches!(
        read_images(Cursor::new(bytes)),
        Err(Error::Format(_))
    ));

    let mut bytes = label_bytes(1, &[7]);
    bytes[3] = 0x99;
    assert!(matches!(
        read_labels(Cursor::new(bytes)),
        Err(Error::Format(_))
    ));
}

#[test]
fn rejects_truncated_bodies() {
    // Header promises 2 images of 4 pixels but only 5 bytes follow.
    let bytes = image_bytes(2, 2, 2, &[1, 2, 3, 4, 5]);
    assert!(matches!(
        read_images(Cursor::new(bytes)),
        Err(Error::Format(_))
    ));
}

#[test]
fn loads_gzipped_file_pairs() {
    let dir = std::env::temp_dir().join(format!("simpleml-mnist-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let images_path = dir.join("images.gz");
    let labels_path = dir.join("labels.gz");

    let write_gz = |path: &std::path::Path, bytes: &[u8]| {
        let file = std::fs::File::create(path).unwrap();
        let mut encoder = GzEncoder::new(file, Compression::default());
        encoder.write_all(bytes).unwrap();
        encoder.finish().unwrap();
    };
    write_gz(&images_path, &image_bytes(2, 1, 2, &[10, 20, 30, 40]));
    write_gz(&labels_path, &label_bytes(2, &[1, 8]));

    let (images, parsed_labels) = Mnist::new(&images_path, &labels_path).get_data_set().unwrap();
    assert_eq!(images.dims(), (2, 2));
    assert_eq!(parsed_labels, vec!["1", "8"]);

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn rejects_image_label_count_mismatch() {
    let dir = std::env::temp_dir().join(format!("simpleml-mnist-mismatch-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let images_path = dir.join("images.idx");
    let labels_path = dir.join("labels.idx");

    std::fs::write(&images_path, image_bytes(2, 1, 2, &[1, 2, 3, 4])).unwrap();
    std::fs::write(&labels_path, label_bytes(3, &[1, 2, 3])).unwrap();

    let result = Mnist::new(&images_path, &labels_path).get_data_set();
    assert!(matches!(result, Err(Error::Format(_))));

    std::fs::remove_dir_all(&dir).unwrap();
}
