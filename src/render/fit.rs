//! Iterative search for a text scale meeting a width budget

use thiserror::Error;

/// Errors from the text fit search.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FitError {
    /// The search did not converge within the iteration cap.
    #[error("unable to fit text {content} into max width {max_width} after {tries} tries")]
    IterationsExceeded {
        content: String,
        max_width: i32,
        tries: u32,
    },

    /// The width budget was zero or negative.
    #[error("invalid max width {max_width} for text fitting")]
    InvalidBudget { max_width: i32 },
}

/// Horizontal placement of text inside its width budget.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Alignment {
    #[default]
    Left,
    Right,
    Centre,
}

impl Alignment {
    /// Parse a template alignment name, defaulting to left for anything
    /// unrecognised.
    pub fn from_name(name: &str) -> Alignment {
        match name {
            "right" => Alignment::Right,
            "centre" => Alignment::Centre,
            _ => Alignment::Left,
        }
    }
}

/// The converged result of a fit search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextFit {
    /// Final scale in pixels per em.
    pub scale: f64,
    /// Horizontal offset to apply for the requested alignment.
    pub offset: i32,
}

const MAX_TRIES: u32 = 10;

/// Search for a scale at which `content` fits `max_width`.
///
/// The starting scale converts the nominal point size through the canvas
/// pixel density (`size / 72 * ppi`). Each iteration asks `probe` whether
/// the content fits at the current scale and what width it measures; an
/// over-budget measurement shrinks the scale by the ratio of budget to
/// measured width and retries. This is damped proportional convergence, not
/// binary search: the scale only ever shrinks, so an overshoot correction
/// that lands under budget leaves the remaining width as alignment slack
/// rather than growing the scale back up.
///
/// An under-budget fit stops with the alignment offset (zero leading, full
/// slack trailing, half slack centred); an exact fit stops with zero
/// offset. Running past the iteration cap without a fit is a hard error.
pub fn fit_text(
    content: &str,
    size: f64,
    max_width: i32,
    ppi: f64,
    alignment: Alignment,
    mut probe: impl FnMut(f64) -> (bool, i32),
) -> Result<TextFit, FitError> {
    if max_width <= 0 {
        return Err(FitError::InvalidBudget { max_width });
    }
    let mut scale = size / 72.0 * ppi;
    let mut tries = 0;
    while tries < MAX_TRIES {
        tries += 1;
        let (fits, measured) = probe(scale);
        tracing::trace!(tries, scale, measured, fits, "text fit probe");
        if !fits {
            if measured > max_width {
                scale *= f64::from(max_width) / f64::from(measured);
            }
            continue;
        }
        let offset = if measured < max_width {
            let slack = max_width - measured;
            match alignment {
                Alignment::Left => 0,
                Alignment::Right => slack,
                Alignment::Centre => slack / 2,
            }
        } else {
            0
        };
        return Ok(TextFit { scale, offset });
    }
    Err(FitError::IterationsExceeded {
        content: content.to_string(),
        max_width,
        tries,
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_immediate_fit_alignment_offsets() {
        // Budget 100, measured 60: slack is 40.
        let probe = |_: f64| (true, 60);
        let fit = fit_text("hello", 12.0, 100, 72.0, Alignment::Left, probe)
            .expect("Should fit");
        assert_eq!(fit.offset, 0);
        assert_eq!(fit.scale, 12.0);

        let fit = fit_text("hello", 12.0, 100, 72.0, Alignment::Right, probe)
            .expect("Should fit");
        assert_eq!(fit.offset, 40);

        let fit = fit_text("hello", 12.0, 100, 72.0, Alignment::Centre, probe)
            .expect("Should fit");
        assert_eq!(fit.offset, 20);
    }

    #[test]
    fn test_exact_fit_has_zero_offset() {
        let fit = fit_text("hello", 12.0, 100, 72.0, Alignment::Right, |_| (true, 100))
            .expect("Should fit");
        assert_eq!(fit.offset, 0);
    }

    #[test]
    fn test_initial_scale_uses_pixel_density() {
        let mut seen = Vec::new();
        let _ = fit_text("hello", 18.0, 100, 144.0, Alignment::Left, |scale| {
            seen.push(scale);
            (true, 50)
        });
        assert_eq!(seen, vec![36.0]);
    }

    #[test]
    fn test_overshoot_shrinks_proportionally() {
        let mut calls = 0;
        let fit = fit_text("wide text", 12.0, 100, 72.0, Alignment::Left, |scale| {
            calls += 1;
            if calls == 1 {
                (false, 200)
            } else {
                // The scale was halved by the 100/200 ratio.
                assert_eq!(scale, 6.0);
                (true, 95)
            }
        })
        .expect("Should fit");
        assert_eq!(calls, 2);
        assert_eq!(fit.scale, 6.0);
        assert_eq!(fit.offset, 0);
    }

    #[test]
    fn test_never_fitting_is_a_hard_error() {
        let mut calls = 0;
        let err = fit_text("stubborn", 12.0, 100, 72.0, Alignment::Left, |_| {
            calls += 1;
            (false, 200)
        })
        .expect_err("Should fail");
        assert_eq!(calls, 10);
        assert_eq!(
            err,
            FitError::IterationsExceeded {
                content: "stubborn".to_string(),
                max_width: 100,
                tries: 10,
            }
        );
    }

    #[test]
    fn test_invalid_budget_errors_without_probing() {
        let err = fit_text("hello", 12.0, 0, 72.0, Alignment::Left, |_| {
            panic!("probe must not run for an invalid budget")
        })
        .expect_err("Should fail");
        assert_eq!(err, FitError::InvalidBudget { max_width: 0 });
    }

    #[test]
    fn test_alignment_name_parsing_defaults_left() {
        assert_eq!(Alignment::from_name("left"), Alignment::Left);
        assert_eq!(Alignment::from_name("right"), Alignment::Right);
        assert_eq!(Alignment::from_name("centre"), Alignment::Centre);
        assert_eq!(Alignment::from_name("middle"), Alignment::Left);
    }
}
