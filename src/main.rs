use std::error::Error;

use college_graph::{create_college_graph, extract_from_csv};

const DATASET_PATH: &str = "data/college.csv";
const OUTPUT_PATH: &str = "college_graph.html";

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().filter_or("RUST_LOG", "info")).init();

    println!("Loading College Dataset...");
    let triples = extract_from_csv(DATASET_PATH)?;
    log::info!("Extracted {} triples from {}", triples.len(), DATASET_PATH);

    println!("Building Knowledge Graph...");
    create_college_graph(&triples, OUTPUT_PATH)?;

    println!("Graph Generated Successfully!");

    Ok(())
}
