use crate::pipeline::{PipelineData, PipelineStep, PipelineContext, MetadataValue};
use crate::detection::{preprocessing, contours, filter, nms, ordering};
use crate::config::{FilterConfig, ThresholdConfig};
use anyhow::Result;
use image::DynamicImage;

/// Turn each page into its inverted adaptive-threshold mask
pub struct BinarizeStep {
    pub config: ThresholdConfig,
}

impl PipelineStep for BinarizeStep {
    fn process(&self, data: Vec<PipelineData>, _context: &PipelineContext) -> Result<Vec<PipelineData>> {
        let mut result = Vec::new();
        for item in data {
            let mask = preprocessing::binarize(&item.image, &self.config)?;
            result.push(item.with_image(DynamicImage::ImageLuma8(mask)));
        }
        Ok(result)
    }

    fn name(&self) -> &str {
        "Binarize"
    }
}

/// Split a mask into one item per external region
pub struct RegionExtractionStep;

impl PipelineStep for RegionExtractionStep {
    fn process(&self, data: Vec<PipelineData>, _context: &PipelineContext) -> Result<Vec<PipelineData>> {
        let mut result = Vec::new();

        for item in data {
            let mask = item.image.to_luma8();

            for contour in contours::find_external_contours(&mask) {
                let bbox = contour.bounding_box();

                // Keep the mask of the region so debug output shows what was found
                let region_mask = item.image.crop_imm(bbox.x(), bbox.y(), bbox.width(), bbox.height());

                result.push(
                    PipelineData::from_region(region_mask, item.original.clone(), bbox)
                        .with_metadata("point_count", MetadataValue::Int(contour.point_count as i64))
                        .with_metadata("area", MetadataValue::Int(bbox.area() as i64)),
                );
            }
        }

        Ok(result)
    }

    fn name(&self) -> &str {
        "Region Extraction"
    }
}

/// Keep regions sized like a panel
pub struct BoxFilterStep {
    pub config: FilterConfig,
}

impl PipelineStep for BoxFilterStep {
    fn process(&self, data: Vec<PipelineData>, _context: &PipelineContext) -> Result<Vec<PipelineData>> {
        let mut result = Vec::new();

        for item in data {
            let bbox = item.region(self.name())?;
            let page_area = item.original.width() as u64 * item.original.height() as u64;

            if filter::is_panel_sized(&bbox, page_area, &self.config) {
                let area_frac = bbox.area() as f64 / page_area as f64;
                result.push(item.with_metadata("area_frac", MetadataValue::Float(area_frac)));
            }
        }

        Ok(result)
    }

    fn name(&self) -> &str {
        "Box Filter"
    }
}

/// Collapse overlapping regions, keeping one per panel
pub struct SuppressionStep {
    pub overlap_thresh: f64,
}

impl PipelineStep for SuppressionStep {
    fn process(&self, data: Vec<PipelineData>, _context: &PipelineContext) -> Result<Vec<PipelineData>> {
        let boxes = data
            .iter()
            .map(|item| item.region(self.name()))
            .collect::<Result<Vec<_>>>()?;

        let kept = nms::suppress_indices(&boxes, self.overlap_thresh);

        let mut slots: Vec<Option<PipelineData>> = data.into_iter().map(Some).collect();
        Ok(kept
            .into_iter()
            .filter_map(|i| slots[i].take())
            .collect())
    }

    fn name(&self) -> &str {
        "Suppression"
    }
}

/// Sort regions into reading order and number them
pub struct ReadingOrderStep;

impl PipelineStep for ReadingOrderStep {
    fn process(&self, data: Vec<PipelineData>, _context: &PipelineContext) -> Result<Vec<PipelineData>> {
        let mut items = data
            .into_iter()
            .map(|item| -> Result<_> { Ok((item.region(self.name())?, item)) })
            .collect::<Result<Vec<_>>>()?;
        items.sort_by_key(|(bbox, _)| ordering::reading_order_key(bbox));

        Ok(items
            .into_iter()
            .enumerate()
            .map(|(i, (_, item))| item.with_metadata("panel_index", MetadataValue::Int(i as i64 + 1)))
            .collect())
    }

    fn name(&self) -> &str {
        "Reading Order"
    }
}

/// Replace each region's mask with the matching crop of the original page
pub struct CropStep;

impl PipelineStep for CropStep {
    fn process(&self, data: Vec<PipelineData>, _context: &PipelineContext) -> Result<Vec<PipelineData>> {
        let mut result = Vec::new();

        for item in data {
            let bbox = item.region(self.name())?;
            let crop = item.original.crop_imm(bbox.x(), bbox.y(), bbox.width(), bbox.height());
            result.push(item.with_image(crop));
        }

        Ok(result)
    }

    fn name(&self) -> &str {
        "Crop"
    }
}
