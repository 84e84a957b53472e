//! Scripted canvas collaborator for tests
//!
//! The mock records every drawing call and replays canned `try_text`
//! responses. Clones returned from drawing calls share the recording state,
//! so a test can keep its original handle and inspect the full call log
//! after a render pass.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use super::{
    BarcodeKind, Canvas, CanvasError, FontFace, Point, Raster, Rgba,
};

/// One recorded drawing call.
#[derive(Debug, Clone, PartialEq)]
pub enum MockCall {
    SetBaseImage {
        width: i32,
        height: i32,
    },
    Rectangle {
        top_left: Point,
        width: i32,
        height: i32,
        colour: Rgba,
    },
    Circle {
        centre: Point,
        radius: i32,
        colour: Rgba,
    },
    DrawImage {
        top_left: Point,
        width: i32,
        height: i32,
    },
    Barcode {
        kind: BarcodeKind,
        content: Vec<u8>,
        top_left: Point,
        width: i32,
        height: i32,
    },
    Text {
        text: String,
        start: Point,
        scale: f64,
        colour: Rgba,
        max_width: i32,
    },
}

#[derive(Debug, Default)]
struct MockState {
    width: i32,
    height: i32,
    ppi: f64,
    try_text_responses: VecDeque<(bool, i32)>,
    calls: Vec<MockCall>,
    fail_on: Option<String>,
}

/// A scripted [`Canvas`] for exercising components and the builder.
#[derive(Debug, Clone)]
pub struct MockCanvas {
    state: Rc<RefCell<MockState>>,
}

impl Default for MockCanvas {
    fn default() -> Self {
        Self::new(100, 100)
    }
}

impl MockCanvas {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            state: Rc::new(RefCell::new(MockState {
                width,
                height,
                ppi: 72.0,
                ..MockState::default()
            })),
        }
    }

    /// Queue a `try_text` response; responses are consumed in order. When
    /// the queue is empty the probe reports an immediate exact fit.
    pub fn push_try_text(&self, fits: bool, width: i32) {
        self.state
            .borrow_mut()
            .try_text_responses
            .push_back((fits, width));
    }

    /// Fail the next call to the named primitive.
    pub fn fail_on(&self, primitive: &str) {
        self.state.borrow_mut().fail_on = Some(primitive.to_string());
    }

    /// Every drawing call recorded so far, across all clones.
    pub fn calls(&self) -> Vec<MockCall> {
        self.state.borrow().calls.clone()
    }

    fn record(&self, primitive: &str, call: MockCall) -> Result<Box<dyn Canvas>, CanvasError> {
        let mut state = self.state.borrow_mut();
        if state.fail_on.as_deref() == Some(primitive) {
            state.fail_on = None;
            return Err(CanvasError::Draw {
                message: format!("scripted failure for {primitive}"),
            });
        }
        state.calls.push(call);
        drop(state);
        Ok(Box::new(self.clone()))
    }
}

impl Canvas for MockCanvas {
    fn width(&self) -> i32 {
        self.state.borrow().width
    }

    fn height(&self) -> i32 {
        self.state.borrow().height
    }

    fn ppi(&self) -> f64 {
        self.state.borrow().ppi
    }

    fn with_ppi(&self, ppi: f64) -> Box<dyn Canvas> {
        self.state.borrow_mut().ppi = ppi;
        Box::new(self.clone())
    }

    fn set_base_image(&self, image: &Raster) -> Result<Box<dyn Canvas>, CanvasError> {
        self.record(
            "set_base_image",
            MockCall::SetBaseImage {
                width: image.width(),
                height: image.height(),
            },
        )
    }

    fn rectangle(
        &self,
        top_left: Point,
        width: i32,
        height: i32,
        colour: Rgba,
    ) -> Result<Box<dyn Canvas>, CanvasError> {
        self.record(
            "rectangle",
            MockCall::Rectangle {
                top_left,
                width,
                height,
                colour,
            },
        )
    }

    fn circle(
        &self,
        centre: Point,
        radius: i32,
        colour: Rgba,
    ) -> Result<Box<dyn Canvas>, CanvasError> {
        self.record(
            "circle",
            MockCall::Circle {
                centre,
                radius,
                colour,
            },
        )
    }

    fn draw_image(&self, top_left: Point, image: &Raster) -> Result<Box<dyn Canvas>, CanvasError> {
        self.record(
            "draw_image",
            MockCall::DrawImage {
                top_left,
                width: image.width(),
                height: image.height(),
            },
        )
    }

    fn barcode(
        &self,
        kind: BarcodeKind,
        content: &[u8],
        top_left: Point,
        width: i32,
        height: i32,
        _data_colour: Rgba,
        _background_colour: Rgba,
    ) -> Result<Box<dyn Canvas>, CanvasError> {
        self.record(
            "barcode",
            MockCall::Barcode {
                kind,
                content: content.to_vec(),
                top_left,
                width,
                height,
            },
        )
    }

    fn text(
        &self,
        text: &str,
        start: Point,
        _face: &dyn FontFace,
        scale: f64,
        colour: Rgba,
        max_width: i32,
    ) -> Result<Box<dyn Canvas>, CanvasError> {
        self.record(
            "text",
            MockCall::Text {
                text: text.to_string(),
                start,
                scale,
                colour,
                max_width,
            },
        )
    }

    fn try_text(
        &self,
        _text: &str,
        _face: &dyn FontFace,
        _scale: f64,
        max_width: i32,
    ) -> (bool, i32) {
        self.state
            .borrow_mut()
            .try_text_responses
            .pop_front()
            .unwrap_or((true, max_width))
    }

    fn snapshot(&self) -> Raster {
        let state = self.state.borrow();
        Raster::new(state.width, state.height)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_clones_share_the_call_log() {
        let mock = MockCanvas::new(10, 10);
        let after = mock
            .rectangle(Point::new(0, 0), 2, 2, Rgba::BLACK)
            .expect("Should draw");
        let _ = after
            .circle(Point::new(5, 5), 2, Rgba::WHITE)
            .expect("Should draw");
        assert_eq!(mock.calls().len(), 2);
    }

    #[test]
    fn test_scripted_failure_fires_once() {
        let mock = MockCanvas::new(10, 10);
        mock.fail_on("circle");
        assert!(mock.circle(Point::new(0, 0), 1, Rgba::BLACK).is_err());
        assert!(mock.circle(Point::new(0, 0), 1, Rgba::BLACK).is_ok());
    }

    #[test]
    fn test_try_text_replays_queue() {
        let mock = MockCanvas::new(10, 10);
        mock.push_try_text(false, 200);
        mock.push_try_text(true, 90);
        let face = crate::render::FixedAdvanceFace::default();
        assert_eq!(mock.try_text("x", &face, 1.0, 100), (false, 200));
        assert_eq!(mock.try_text("x", &face, 1.0, 100), (true, 90));
        // Empty queue reports an exact fit.
        assert_eq!(mock.try_text("x", &face, 1.0, 100), (true, 100));
    }
}
