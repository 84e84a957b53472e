//! Drawing collaborators reached through narrow interfaces
//!
//! The core engine decides *what* to render; everything pixel-shaped lives
//! behind the [`Canvas`] trait. Canvases are value-threading: every drawing
//! call takes `&self` and returns a fresh boxed canvas, so a failed call
//! leaves the caller's canvas exactly as it was.

use std::fmt;

use thiserror::Error;

pub mod fit;
pub mod font;
pub mod mock;
pub mod pixmap;
pub mod raster;

pub use fit::{fit_text, Alignment, FitError, TextFit};
pub use font::{FixedAdvanceFace, FixedAdvanceSource, FontError, FontFace, FontSource};
pub use mock::{MockCall, MockCanvas};
pub use pixmap::PixmapCanvas;
pub use raster::{ImageDecoder, PpmDecoder, Raster};

/// A pixel position relative to the canvas top-left corner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// A non-premultiplied RGBA colour.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0);
    pub const BLACK: Rgba = Rgba::new(0, 0, 0, 255);
    pub const WHITE: Rgba = Rgba::new(255, 255, 255, 255);
}

/// The barcode symbologies a canvas may be asked to draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarcodeKind {
    Qr,
    Aztec,
    Pdf417,
    DataMatrix,
    Code39,
    Code93,
    Code128,
    Codabar,
    Ean13,
    Ean8,
    TwoOfFive,
    TwoOfFiveInterleaved,
}

impl BarcodeKind {
    /// Look up a symbology by its template name.
    pub fn from_name(name: &str) -> Option<BarcodeKind> {
        let kind = match name {
            "qr" => BarcodeKind::Qr,
            "aztec" => BarcodeKind::Aztec,
            "pdf417" => BarcodeKind::Pdf417,
            "datamatrix" => BarcodeKind::DataMatrix,
            "code39" => BarcodeKind::Code39,
            "code93" => BarcodeKind::Code93,
            "code128" => BarcodeKind::Code128,
            "codabar" => BarcodeKind::Codabar,
            "ean13" => BarcodeKind::Ean13,
            "ean8" => BarcodeKind::Ean8,
            "2of5" => BarcodeKind::TwoOfFive,
            "2of5interleaved" => BarcodeKind::TwoOfFiveInterleaved,
            _ => return None,
        };
        Some(kind)
    }

    /// The template name of this symbology.
    pub fn name(&self) -> &'static str {
        match self {
            BarcodeKind::Qr => "qr",
            BarcodeKind::Aztec => "aztec",
            BarcodeKind::Pdf417 => "pdf417",
            BarcodeKind::DataMatrix => "datamatrix",
            BarcodeKind::Code39 => "code39",
            BarcodeKind::Code93 => "code93",
            BarcodeKind::Code128 => "code128",
            BarcodeKind::Codabar => "codabar",
            BarcodeKind::Ean13 => "ean13",
            BarcodeKind::Ean8 => "ean8",
            BarcodeKind::TwoOfFive => "2of5",
            BarcodeKind::TwoOfFiveInterleaved => "2of5interleaved",
        }
    }
}

/// Errors raised by drawing collaborators.
#[derive(Debug, Error)]
pub enum CanvasError {
    /// A component still has unresolved variable bindings.
    #[error("cannot draw {kind}, not all variable bindings are set: {remaining}")]
    UnboundVariables { kind: String, remaining: String },

    /// The canvas cannot draw this primitive.
    #[error("canvas does not support drawing primitive {primitive}")]
    Unsupported { primitive: String },

    /// Drawn text would exceed its width budget.
    #[error("resultant drawn text was longer than maxWidth")]
    TextOverflow,

    /// The template named an unknown barcode symbology.
    #[error("unknown barcode type {name}")]
    UnknownBarcodeKind { name: String },

    /// Image bytes did not decode.
    #[error("could not decode image data: {reason}")]
    Decode { reason: String },

    /// A drawing operation failed.
    #[error("draw failed: {message}")]
    Draw { message: String },

    /// The text fit search did not converge.
    #[error(transparent)]
    Fit(#[from] FitError),
}

/// The draw-primitive interface between components and pixels.
///
/// Every drawing method returns a new canvas; on error the input canvas is
/// unchanged. The fit probe `try_text` is the one read-only query: it
/// reports whether text at a given scale fits a width budget, and the width
/// it would use.
pub trait Canvas: fmt::Debug {
    fn width(&self) -> i32;
    fn height(&self) -> i32;
    fn ppi(&self) -> f64;

    /// A copy of this canvas with a different pixel density.
    fn with_ppi(&self, ppi: f64) -> Box<dyn Canvas>;

    /// Blit a pre-sized base image at the origin.
    fn set_base_image(&self, image: &Raster) -> Result<Box<dyn Canvas>, CanvasError>;

    fn rectangle(
        &self,
        top_left: Point,
        width: i32,
        height: i32,
        colour: Rgba,
    ) -> Result<Box<dyn Canvas>, CanvasError>;

    fn circle(
        &self,
        centre: Point,
        radius: i32,
        colour: Rgba,
    ) -> Result<Box<dyn Canvas>, CanvasError>;

    fn draw_image(&self, top_left: Point, image: &Raster) -> Result<Box<dyn Canvas>, CanvasError>;

    #[allow(clippy::too_many_arguments)]
    fn barcode(
        &self,
        kind: BarcodeKind,
        content: &[u8],
        top_left: Point,
        width: i32,
        height: i32,
        data_colour: Rgba,
        background_colour: Rgba,
    ) -> Result<Box<dyn Canvas>, CanvasError>;

    #[allow(clippy::too_many_arguments)]
    fn text(
        &self,
        text: &str,
        start: Point,
        face: &dyn FontFace,
        scale: f64,
        colour: Rgba,
        max_width: i32,
    ) -> Result<Box<dyn Canvas>, CanvasError>;

    /// Whether `text` fits `max_width` at `scale`, and the width it uses.
    fn try_text(&self, text: &str, face: &dyn FontFace, scale: f64, max_width: i32) -> (bool, i32);

    /// Copy of the current pixel state, for hand-off to an encoder.
    fn snapshot(&self) -> Raster;
}
