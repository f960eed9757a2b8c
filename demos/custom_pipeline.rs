use panelcut::config::{FilterConfig, ThresholdConfig};
use panelcut::detection::steps::*;
use panelcut::synthetic::MockPage;
use panelcut::{Pipeline, load_page};
use std::env;

fn main() -> anyhow::Result<()> {
    // Use the given page, or a synthetic one when none is passed
    let img = match env::args().nth(1) {
        Some(path) => load_page(&path)?,
        None => image::DynamicImage::ImageRgb8(MockPage::default().render()),
    };

    println!("Loaded image: {}x{}", img.width(), img.height());

    // Example 1: Standard steps, spelled out
    println!("\n=== Standard Panel Pipeline ===");
    let standard_pipeline = Pipeline::new()
        .add_step_boxed(Box::new(BinarizeStep { config: ThresholdConfig::default() }))
        .add_step_boxed(Box::new(RegionExtractionStep))
        .add_step_boxed(Box::new(BoxFilterStep { config: FilterConfig::default() }))
        .add_step_boxed(Box::new(SuppressionStep { overlap_thresh: 0.3 }))
        .add_step_boxed(Box::new(ReadingOrderStep))
        .add_step_boxed(Box::new(CropStep));

    let panels = standard_pipeline.run(img.clone())?;

    println!("Total panels: {}", panels.len());
    for panel in &panels {
        let index = panel.get_int("panel_index").unwrap_or(0);
        if let Some(bbox) = &panel.bbox {
            println!("  {}: ({}, {}) {}x{}", index, bbox.x(), bbox.y(), bbox.width(), bbox.height());
        }
    }

    // Example 2: Looser filter, no suppression
    println!("\n\n=== Custom Pipeline (Keep Nested Regions) ===");
    let custom_pipeline = Pipeline::new()
        .add_step_boxed(Box::new(BinarizeStep {
            config: ThresholdConfig { block_size: 25, bias: 5 },
        }))
        .add_step_boxed(Box::new(RegionExtractionStep))
        .add_step_boxed(Box::new(BoxFilterStep {
            config: FilterConfig {
                min_dim: 10,
                min_area_frac: 0.0,
                max_area_frac: 0.95,
            },
        }))
        .add_step_boxed(Box::new(ReadingOrderStep));

    let custom_panels = custom_pipeline.run(img.clone())?;
    println!("Custom pipeline found {} regions", custom_panels.len());

    // Example 3: Stop after region extraction (partial execution for debugging)
    println!("\n\n=== Partial Pipeline (Stop After Region Extraction) ===");
    let partial_result = standard_pipeline.run_partial(img, 2)?;
    println!("Partial pipeline returned {} candidate regions", partial_result.len());
    if let Some(first) = partial_result.first() {
        println!("  First item: {}x{} mask, {} contour points",
                first.image.width(), first.image.height(),
                first.get_int("point_count").unwrap_or(0));
    }

    Ok(())
}
