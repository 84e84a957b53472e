//! Software canvas drawing into an in-memory pixel buffer

use super::{
    BarcodeKind, Canvas, CanvasError, FontFace, Point, Raster, Rgba,
};

/// An in-memory RGBA canvas with source-over compositing.
///
/// Glyphs are drawn as filled boxes from the face's advance metrics; real
/// glyph outlines belong to a richer canvas implementation. Barcode
/// symbology stays an external collaborator, so [`Canvas::barcode`] reports
/// the primitive as unsupported here.
#[derive(Debug, Clone)]
pub struct PixmapCanvas {
    raster: Raster,
    ppi: f64,
}

impl PixmapCanvas {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            raster: Raster::new(width, height),
            ppi: 72.0,
        }
    }

    /// A canvas whose pixels are taken from an existing raster.
    pub fn from_raster(raster: Raster) -> Self {
        Self { raster, ppi: 72.0 }
    }

    pub fn raster(&self) -> &Raster {
        &self.raster
    }

    fn blend(&mut self, x: i32, y: i32, colour: Rgba) {
        let below = self.raster.get(x, y);
        self.raster.set(x, y, composite_over(below, colour));
    }
}

/// Source-over compositing of `above` onto `below`.
fn composite_over(below: Rgba, above: Rgba) -> Rgba {
    let alpha = u32::from(above.a);
    let inverse = 255 - alpha;
    let channel = |top: u8, bottom: u8| -> u8 {
        ((u32::from(top) * alpha + u32::from(bottom) * inverse) / 255) as u8
    };
    Rgba {
        r: channel(above.r, below.r),
        g: channel(above.g, below.g),
        b: channel(above.b, below.b),
        a: (alpha + u32::from(below.a) * inverse / 255) as u8,
    }
}

impl Canvas for PixmapCanvas {
    fn width(&self) -> i32 {
        self.raster.width()
    }

    fn height(&self) -> i32 {
        self.raster.height()
    }

    fn ppi(&self) -> f64 {
        self.ppi
    }

    fn with_ppi(&self, ppi: f64) -> Box<dyn Canvas> {
        let mut next = self.clone();
        next.ppi = ppi;
        Box::new(next)
    }

    fn set_base_image(&self, image: &Raster) -> Result<Box<dyn Canvas>, CanvasError> {
        let mut next = self.clone();
        for y in 0..image.height() {
            for x in 0..image.width() {
                next.raster.set(x, y, image.get(x, y));
            }
        }
        Ok(Box::new(next))
    }

    fn rectangle(
        &self,
        top_left: Point,
        width: i32,
        height: i32,
        colour: Rgba,
    ) -> Result<Box<dyn Canvas>, CanvasError> {
        if width < 0 || height < 0 {
            return Err(CanvasError::Draw {
                message: format!("rectangle dimensions {width}x{height} are negative"),
            });
        }
        let mut next = self.clone();
        for y in top_left.y..top_left.y + height {
            for x in top_left.x..top_left.x + width {
                next.blend(x, y, colour);
            }
        }
        Ok(Box::new(next))
    }

    fn circle(
        &self,
        centre: Point,
        radius: i32,
        colour: Rgba,
    ) -> Result<Box<dyn Canvas>, CanvasError> {
        if radius < 0 {
            return Err(CanvasError::Draw {
                message: format!("circle radius {radius} is negative"),
            });
        }
        let mut next = self.clone();
        let radius_squared = i64::from(radius) * i64::from(radius);
        for y in centre.y - radius..=centre.y + radius {
            for x in centre.x - radius..=centre.x + radius {
                let dx = i64::from(x - centre.x);
                let dy = i64::from(y - centre.y);
                if dx * dx + dy * dy <= radius_squared {
                    next.blend(x, y, colour);
                }
            }
        }
        Ok(Box::new(next))
    }

    fn draw_image(&self, top_left: Point, image: &Raster) -> Result<Box<dyn Canvas>, CanvasError> {
        let mut next = self.clone();
        for y in 0..image.height() {
            for x in 0..image.width() {
                next.blend(top_left.x + x, top_left.y + y, image.get(x, y));
            }
        }
        Ok(Box::new(next))
    }

    fn barcode(
        &self,
        _kind: BarcodeKind,
        _content: &[u8],
        _top_left: Point,
        _width: i32,
        _height: i32,
        _data_colour: Rgba,
        _background_colour: Rgba,
    ) -> Result<Box<dyn Canvas>, CanvasError> {
        Err(CanvasError::Unsupported {
            primitive: "barcode".to_string(),
        })
    }

    fn text(
        &self,
        text: &str,
        start: Point,
        face: &dyn FontFace,
        scale: f64,
        colour: Rgba,
        max_width: i32,
    ) -> Result<Box<dyn Canvas>, CanvasError> {
        if max_width <= 0 {
            return Err(CanvasError::Draw {
                message: format!("invalid max width {max_width} for text draw"),
            });
        }
        let width = face.measure(text, scale).ceil() as i32;
        if width > max_width {
            return Err(CanvasError::TextOverflow);
        }
        let mut next = self.clone();
        let glyph_height = (scale * 0.7).round() as i32;
        let mut pen_x = f64::from(start.x);
        for ch in text.chars() {
            let advance = face.measure(&ch.to_string(), scale);
            if !ch.is_whitespace() {
                let glyph_width = ((advance * 0.8).round() as i32).max(1);
                let left = pen_x.round() as i32;
                for y in start.y - glyph_height..start.y {
                    for x in left..left + glyph_width {
                        next.blend(x, y, colour);
                    }
                }
            }
            pen_x += advance;
        }
        Ok(Box::new(next))
    }

    fn try_text(&self, text: &str, face: &dyn FontFace, scale: f64, max_width: i32) -> (bool, i32) {
        if max_width <= 0 {
            return (false, -1);
        }
        let width = face.measure(text, scale).ceil() as i32;
        (width <= max_width, width)
    }

    fn snapshot(&self) -> Raster {
        self.raster.clone()
    }
}
