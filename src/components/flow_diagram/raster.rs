//! PNG export through resvg.

/// Failures while rasterizing.
#[derive(Debug, thiserror::Error)]
pub enum RasterError {
	/// The document is not valid SVG.
	#[error("failed to parse SVG")]
	SvgParse,
	/// Zero or oversized target.
	#[error("failed to allocate pixmap for raster rendering")]
	PixmapAlloc,
	/// PNG encoder failure.
	#[error("failed to encode PNG")]
	PngEncode,
}

/// Raster export settings.
#[derive(Debug, Clone)]
pub struct RasterOptions {
	/// Device pixels per SVG unit.
	pub scale: f32,
}

impl Default for RasterOptions {
	fn default() -> Self {
		Self { scale: 1.0 }
	}
}

/// Rasterizes an exported SVG document to PNG bytes.
pub fn svg_to_png(svg: &str, options: &RasterOptions) -> Result<Vec<u8>, RasterError> {
	let mut opt = usvg::Options::default();
	opt.fontdb_mut().load_system_fonts();
	opt.font_family = "Arial".to_string();

	let tree = usvg::Tree::from_str(svg, &opt).map_err(|_| RasterError::SvgParse)?;
	let size = tree.size();
	let width = (size.width() * options.scale).ceil().max(1.0) as u32;
	let height = (size.height() * options.scale).ceil().max(1.0) as u32;

	let mut pixmap = tiny_skia::Pixmap::new(width, height).ok_or(RasterError::PixmapAlloc)?;
	resvg::render(
		&tree,
		tiny_skia::Transform::from_scale(options.scale, options.scale),
		&mut pixmap.as_mut(),
	);
	pixmap.encode_png().map_err(|_| RasterError::PngEncode)
}
