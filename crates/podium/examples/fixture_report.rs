//! Run the full pipeline against the bundled demo fixture.
//!
//! Run with: cargo run -p podium --example fixture_report

use podium::data::MemorySource;
use podium::{Pipeline, PipelineConfig};

const FIXTURE: &str = include_str!("../../../demos/club.json");

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let source = MemorySource::from_json_str(FIXTURE)?;
    let config = PipelineConfig {
        top_n: 3,
        ..Default::default()
    };

    let pipeline = Pipeline::new(&source, config)?;
    let report = pipeline.run().await?;

    println!(
        "Discovered {} drivers across {} seasons",
        report.discovery.drivers.len(),
        report.discovery.seasons.len()
    );
    for category in &report.categories {
        println!("{}", category.summary());
    }

    Ok(())
}
