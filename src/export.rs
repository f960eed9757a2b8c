use std::path::PathBuf;

use image::DynamicImage;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::ExportConfig;
use crate::error::{ExportError, PanelError};
use crate::models::BoundingBox;

/// A panel crop persisted to disk.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Artifact {
    /// 1-based position in reading order
    pub index: usize,
    pub bbox: BoundingBox,
    pub path: PathBuf,
}

/// Writes ordered panel crops as individual image files.
#[derive(Debug, Clone)]
pub struct Exporter {
    config: ExportConfig,
}

impl Exporter {
    pub fn new(config: ExportConfig) -> Result<Self, PanelError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Path the panel at 1-based `index` is written to.
    pub fn artifact_path(&self, index: usize) -> PathBuf {
        self.config.output_dir.join(self.config.file_name(index))
    }

    /// Crop every box from `page` and save it, in order.
    ///
    /// Stops at the first panel that cannot be written; the error lists the
    /// artifacts written before it.
    pub fn export(
        &self,
        page: &DynamicImage,
        panels: &[BoundingBox],
    ) -> Result<Vec<Artifact>, ExportError> {
        self.write_all(panels.iter().map(|bbox| -> Result<_, PanelError> {
            BoundingBox::new_within(
                bbox.x(),
                bbox.y(),
                bbox.width(),
                bbox.height(),
                page.width(),
                page.height(),
            )?;
            Ok((*bbox, page.crop_imm(bbox.x(), bbox.y(), bbox.width(), bbox.height())))
        }))
    }

    /// Save panels that were already cropped, in order.
    pub fn export_crops(
        &self,
        crops: Vec<(BoundingBox, DynamicImage)>,
    ) -> Result<Vec<Artifact>, ExportError> {
        self.write_all(crops.into_iter().map(Ok))
    }

    fn write_all<I>(&self, crops: I) -> Result<Vec<Artifact>, ExportError>
    where
        I: Iterator<Item = Result<(BoundingBox, DynamicImage), PanelError>>,
    {
        let mut crops = crops.peekable();
        if crops.peek().is_none() {
            debug!("No panels to export");
            return Ok(Vec::new());
        }

        let output_dir = &self.config.output_dir;
        std::fs::create_dir_all(output_dir).map_err(|source| ExportError::CreateDir {
            path: output_dir.clone(),
            source,
        })?;

        let mut written = Vec::new();

        for (i, crop) in crops.enumerate() {
            let index = i + 1;

            let (bbox, panel) = match crop {
                Ok(crop) => crop,
                Err(source) => {
                    return Err(ExportError::OutOfBounds {
                        index,
                        written,
                        source,
                    });
                }
            };

            let path = self.artifact_path(index);
            if let Err(source) = panel.save(&path) {
                return Err(ExportError::Write {
                    index,
                    path,
                    written,
                    source,
                });
            }

            info!("Saved panel {} to {}", index, path.display());
            written.push(Artifact { index, bbox, path });
        }

        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, Rgb, RgbImage};

    fn page() -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_fn(200, 100, |x, y| {
            Rgb([(x % 256) as u8, (y % 256) as u8, 7])
        }))
    }

    fn exporter(dir: &std::path::Path) -> Exporter {
        Exporter::new(ExportConfig {
            output_dir: dir.to_path_buf(),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn writes_one_file_per_panel_in_order() {
        let dir = tempfile::TempDir::new().unwrap();
        let out = dir.path().join("panels");
        let panels = [
            BoundingBox::new(100, 0, 50, 40).unwrap(),
            BoundingBox::new(0, 50, 30, 20).unwrap(),
        ];

        let artifacts = exporter(&out).export(&page(), &panels).unwrap();

        assert_eq!(artifacts.len(), 2);
        assert_eq!(artifacts[0].path, out.join("panel_1.png"));
        assert_eq!(artifacts[1].path, out.join("panel_2.png"));
        assert_eq!(artifacts[1].index, 2);

        let first = image::open(&artifacts[0].path).unwrap();
        assert_eq!(first.dimensions(), (50, 40));
        assert_eq!(first.to_rgb8().get_pixel(0, 0), &Rgb([100, 0, 7]));
    }

    #[test]
    fn empty_panel_list_writes_nothing() {
        let dir = tempfile::TempDir::new().unwrap();
        let out = dir.path().join("panels");
        let artifacts = exporter(&out).export(&page(), &[]).unwrap();
        assert!(artifacts.is_empty());
        assert!(!out.exists());
    }

    #[test]
    fn out_of_bounds_panel_stops_export() {
        let dir = tempfile::TempDir::new().unwrap();
        let panels = [
            BoundingBox::new(0, 0, 10, 10).unwrap(),
            BoundingBox::new(190, 90, 20, 20).unwrap(),
            BoundingBox::new(20, 20, 10, 10).unwrap(),
        ];

        let err = exporter(dir.path()).export(&page(), &panels).unwrap_err();
        assert!(matches!(err, ExportError::OutOfBounds { index: 2, .. }));
        assert_eq!(err.written().len(), 1);
        assert!(dir.path().join("panel_1.png").exists());
        assert!(!dir.path().join("panel_3.png").exists());
    }

    #[test]
    fn write_failure_reports_earlier_artifacts() {
        let dir = tempfile::TempDir::new().unwrap();
        // A directory squatting on the second file name makes that save fail
        std::fs::create_dir(dir.path().join("panel_2.png")).unwrap();
        let panels = [
            BoundingBox::new(0, 0, 10, 10).unwrap(),
            BoundingBox::new(10, 10, 10, 10).unwrap(),
            BoundingBox::new(20, 20, 10, 10).unwrap(),
        ];

        let err = exporter(dir.path()).export(&page(), &panels).unwrap_err();
        match &err {
            ExportError::Write { index, written, .. } => {
                assert_eq!(*index, 2);
                assert_eq!(written.len(), 1);
                assert_eq!(written[0].path, dir.path().join("panel_1.png"));
            }
            other => panic!("expected write error, got {other:?}"),
        }
        assert!(!dir.path().join("panel_3.png").exists());
    }

    #[test]
    fn exports_precropped_panels() {
        let dir = tempfile::TempDir::new().unwrap();
        let bbox = BoundingBox::new(3, 4, 5, 6).unwrap();
        let crop = page().crop_imm(3, 4, 5, 6);

        let artifacts = exporter(dir.path()).export_crops(vec![(bbox, crop)]).unwrap();
        assert_eq!(artifacts, vec![Artifact {
            index: 1,
            bbox,
            path: dir.path().join("panel_1.png"),
        }]);
        assert_eq!(image::open(&artifacts[0].path).unwrap().dimensions(), (5, 6));
    }

    #[test]
    fn template_extension_selects_format() {
        let dir = tempfile::TempDir::new().unwrap();
        let exporter = Exporter::new(ExportConfig {
            output_dir: dir.path().to_path_buf(),
            file_template: "page01_{index}.bmp".to_string(),
        })
        .unwrap();

        let artifacts = exporter
            .export(&page(), &[BoundingBox::new(0, 0, 8, 8).unwrap()])
            .unwrap();
        assert_eq!(artifacts[0].path, dir.path().join("page01_1.bmp"));
        assert_eq!(
            image::ImageFormat::from_path(&artifacts[0].path).unwrap(),
            image::ImageFormat::Bmp
        );
        assert!(image::open(&artifacts[0].path).is_ok());
    }
}
