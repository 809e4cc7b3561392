//! Viewport visibility checks and scrollbar measurement.

use crate::dom::{Element, Viewport};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Margins subtracted from the viewport before testing visibility.
///
/// Unset sides take the fallback values (top 10, right 0, bottom 10, left 0).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportSpacing {
    pub top: Option<f64>,
    pub right: Option<f64>,
    pub bottom: Option<f64>,
    pub left: Option<f64>,
}

/// Spacing with every side resolved.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Insets {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

pub const SPACING_FALLBACK: Insets = Insets {
    top: 10.0,
    right: 0.0,
    bottom: 10.0,
    left: 0.0,
};

impl ViewportSpacing {
    /// All four sides set explicitly.
    pub fn all(top: f64, right: f64, bottom: f64, left: f64) -> Self {
        Self {
            top: Some(top),
            right: Some(right),
            bottom: Some(bottom),
            left: Some(left),
        }
    }

    pub fn top(mut self, top: f64) -> Self {
        self.top = Some(top);
        self
    }

    pub fn right(mut self, right: f64) -> Self {
        self.right = Some(right);
        self
    }

    pub fn bottom(mut self, bottom: f64) -> Self {
        self.bottom = Some(bottom);
        self
    }

    pub fn left(mut self, left: f64) -> Self {
        self.left = Some(left);
        self
    }

    /// Fill unset sides from [`SPACING_FALLBACK`].
    pub fn resolve(&self) -> Insets {
        Insets {
            top: self.top.unwrap_or(SPACING_FALLBACK.top),
            right: self.right.unwrap_or(SPACING_FALLBACK.right),
            bottom: self.bottom.unwrap_or(SPACING_FALLBACK.bottom),
            left: self.left.unwrap_or(SPACING_FALLBACK.left),
        }
    }
}

/// Whether `element` is visible inside the spaced viewport.
///
/// With `partial` any overlap counts; otherwise the whole bounding box has
/// to fit. A missing element is an error.
pub fn is_element_in_viewport(
    element: Option<&dyn Element>,
    viewport: &dyn Viewport,
    spacing: &ViewportSpacing,
    partial: bool,
) -> Result<bool> {
    let element = element.ok_or(Error::InvalidElement)?;
    let Insets {
        top,
        right,
        bottom,
        left,
    } = spacing.resolve();
    let rect = element.bounding_client_rect();
    let height = viewport.inner_height();
    let width = viewport.inner_width();

    if partial {
        return Ok(rect.bottom > top
            && rect.right > left
            && rect.top < height - bottom
            && rect.left < width - right);
    }

    Ok(rect.top >= top
        && rect.left >= left
        && rect.bottom <= height - bottom
        && rect.right <= width - right)
}

/// Width of the vertical scrollbar in pixels.
pub fn scrollbar_width(viewport: &dyn Viewport) -> f64 {
    viewport.inner_width() - viewport.client_width()
}
