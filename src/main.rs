use std::env;
use std::process;
use std::time::Instant;

use simpleml::{DataSet, Mnist, NeuralNetwork};

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let data_dir = env::args().nth(1).unwrap_or_else(|| "data".to_owned());

    let started = Instant::now();
    let (train_data, train_labels) = Mnist::new(
        format!("{data_dir}/train-images-idx3-ubyte.gz"),
        format!("{data_dir}/train-labels-idx1-ubyte.gz"),
    )
    .get_data_set()?;
    let (test_data, test_labels) = Mnist::new(
        format!("{data_dir}/t10k-images-idx3-ubyte.gz"),
        format!("{data_dir}/t10k-labels-idx1-ubyte.gz"),
    )
    .get_data_set()?;
    println!("data loaded in {:.2?}", started.elapsed());

    let labels = (0..10).map(|d| d.to_string()).collect();
    let mut network = NeuralNetwork::new(784, vec![20, 20], labels, 1, 30, 0.2, Some(42))?;

    for round in 0..30 {
        let started = Instant::now();
        network.train(&train_data, &train_labels, false)?;

        let score = network.score(&test_data, &test_labels)?;
        println!(
            "round {round:>2}: accuracy {:.2}% ({}/{}), {:.2?}",
            score * 100.0,
            (score * test_labels.len() as f64).round() as usize,
            test_labels.len(),
            started.elapsed()
        );
    }

    Ok(())
}
