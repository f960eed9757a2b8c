use image::DynamicImage;
use panelcut::synthetic::MockPage;
use panelcut::{BoundingBox, ExportConfig};
use tempfile::NamedTempFile;

/// The default 800x1200 four-panel mock page.
pub fn mock_page() -> (MockPage, DynamicImage) {
    let page = MockPage::default();
    let img = DynamicImage::ImageRgb8(page.render());
    (page, img)
}

/// Writes the default mock page to a temporary PNG and returns the temp file.
/// The file will be automatically cleaned up when dropped.
pub fn create_mock_page_file() -> NamedTempFile {
    let (_, img) = mock_page();
    let file = tempfile::Builder::new()
        .suffix(".png")
        .tempfile()
        .expect("Failed to create temp image file");
    img.save_with_format(file.path(), image::ImageFormat::Png)
        .expect("Failed to save mock page");
    file
}

/// Export config writing into `dir` with the default template.
pub fn export_config(dir: &std::path::Path) -> ExportConfig {
    ExportConfig {
        output_dir: dir.to_path_buf(),
        ..Default::default()
    }
}

pub fn bbox(x: u32, y: u32, w: u32, h: u32) -> BoundingBox {
    BoundingBox::new(x, y, w, h).expect("valid test box")
}

/// The four panels of the default mock page in reading order.
pub fn expected_panels() -> Vec<BoundingBox> {
    vec![
        bbox(50, 50, 700, 300),
        bbox(410, 400, 340, 350),
        bbox(50, 400, 340, 350),
        bbox(50, 800, 700, 350),
    ]
}
