use crate::chart;
use crate::codec::{self, DecodeLimits};
use crate::errors::Result;
use crate::heightmap::{self, HeightmapStats};
use crate::histogram::{self, Histogram};
use crate::settings::{ChartSettings, Settings};
use image::{GrayImage, RgbImage};
use std::time::Instant;

/// One upload's worth of work: the decoded source and its derived height map.
///
/// Nothing here outlives the request that created it.
#[derive(Debug, Clone)]
pub struct HeightmapJob {
    source: RgbImage,
    heightmap: GrayImage,
    stats: HeightmapStats,
}

/// Everything the result page embeds, as `data:` URIs.
#[derive(Debug, Clone)]
pub struct PageImages {
    pub original: String,
    pub heightmap: String,
    pub histogram: String,
    pub stats: HeightmapStats,
    pub mode: Option<u8>,
}

impl HeightmapJob {
    pub fn from_upload(bytes: &[u8], settings: &Settings) -> Result<Self> {
        let start = Instant::now();
        let source = codec::decode_upload(bytes, DecodeLimits::from(settings))?;
        let job = Self::from_image(source);
        tracing::info!(
            width = job.stats.width,
            height = job.stats.height,
            uniform = job.stats.is_uniform(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "processed upload"
        );
        Ok(job)
    }

    pub fn from_image(source: RgbImage) -> Self {
        let (heightmap, stats) = heightmap::derive_with_stats(&source);
        Self {
            source,
            heightmap,
            stats,
        }
    }

    pub fn source(&self) -> &RgbImage {
        &self.source
    }

    pub fn heightmap(&self) -> &GrayImage {
        &self.heightmap
    }

    pub fn stats(&self) -> HeightmapStats {
        self.stats
    }

    pub fn histogram(&self) -> Histogram {
        histogram::summarize(&self.heightmap)
    }

    pub fn original_png(&self) -> Result<Vec<u8>> {
        codec::encode_rgb_png(&self.source)
    }

    pub fn heightmap_png(&self) -> Result<Vec<u8>> {
        codec::encode_gray_png(&self.heightmap)
    }

    pub fn histogram_png(&self, chart_settings: &ChartSettings) -> Result<Vec<u8>> {
        let histogram = self.histogram();
        codec::encode_rgb_png(&chart::render_histogram(&histogram, chart_settings))
    }

    pub fn page_images(&self, chart_settings: &ChartSettings) -> Result<PageImages> {
        let histogram = self.histogram();
        let chart_png = codec::encode_rgb_png(&chart::render_histogram(&histogram, chart_settings))?;
        Ok(PageImages {
            original: codec::to_data_uri(&self.original_png()?),
            heightmap: codec::to_data_uri(&self.heightmap_png()?),
            histogram: codec::to_data_uri(&chart_png),
            stats: self.stats,
            mode: histogram.mode(),
        })
    }
}
