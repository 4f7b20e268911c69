//! Integer geometry and affine transform helpers.

use glam::{DAffine2, DMat2, DVec2, IVec2};
use serde::Serialize;

pub use glam::DAffine2 as Transform;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct Size {
    pub w: i32,
    pub h: i32,
}

impl Size {
    pub const fn new(w: i32, h: i32) -> Self {
        Self { w, h }
    }

    pub fn is_empty(self) -> bool {
        self.w <= 0 || self.h <= 0
    }
}

/// An axis-aligned rectangle in logical screen pixels.
///
/// `right()` and `bottom()` are exclusive, so a rectangle contains `x..right()` horizontally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    pub fn right(&self) -> i32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.h
    }

    pub fn size(&self) -> Size {
        Size::new(self.w, self.h)
    }

    pub fn loc(&self) -> IVec2 {
        IVec2::new(self.x, self.y)
    }

    pub fn is_empty(&self) -> bool {
        self.size().is_empty()
    }

    pub fn contains(&self, point: IVec2) -> bool {
        point.x >= self.x && point.x < self.right() && point.y >= self.y && point.y < self.bottom()
    }

    pub fn contains_rect(&self, other: Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Shrinks by `dx` on the left and right and by `dy` on the top and bottom.
    pub fn inset(self, dx: i32, dy: i32) -> Self {
        Self::new(
            self.x + dx,
            self.y + dy,
            (self.w - 2 * dx).max(0),
            (self.h - 2 * dy).max(0),
        )
    }

    pub fn translated(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.w, self.h)
    }

    pub fn offset_by(self, delta: IVec2) -> Self {
        self.translated(delta.x, delta.y)
    }

    pub fn with_width(self, w: i32) -> Self {
        Self { w, ..self }
    }

    pub fn to_f64(self) -> RectF {
        RectF {
            loc: DVec2::new(f64::from(self.x), f64::from(self.y)),
            size: DVec2::new(f64::from(self.w), f64::from(self.h)),
        }
    }
}

/// A rectangle with fractional coordinates, used for transform targets.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RectF {
    pub loc: DVec2,
    pub size: DVec2,
}

impl RectF {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self {
            loc: DVec2::new(x, y),
            size: DVec2::new(w, h),
        }
    }
}

pub fn lerp_i32(progress: f64, from: i32, to: i32) -> i32 {
    (f64::from(from) + (f64::from(to) - f64::from(from)) * progress).round() as i32
}

pub fn lerp_f32(progress: f64, from: f32, to: f32) -> f32 {
    (f64::from(from) + (f64::from(to) - f64::from(from)) * progress) as f32
}

pub fn lerp_rect(progress: f64, from: Rect, to: Rect) -> Rect {
    Rect::new(
        lerp_i32(progress, from.x, to.x),
        lerp_i32(progress, from.y, to.y),
        lerp_i32(progress, from.w, to.w),
        lerp_i32(progress, from.h, to.h),
    )
}

/// Blends the linear part and the translation of two transforms independently.
///
/// For the scale-and-translate transforms used here this matches decomposed interpolation.
pub fn lerp_transform(progress: f64, from: Transform, to: Transform) -> Transform {
    let matrix2: DMat2 = from.matrix2 * (1. - progress) + to.matrix2 * progress;
    let translation = from.translation.lerp(to.translation, progress);
    DAffine2::from_mat2_translation(matrix2, translation)
}

/// Returns the transform that maps `src` onto `dst`.
///
/// The transform is applied relative to the origin of `src`, so the translation is the
/// difference of the origins and the scale is taken per axis.
pub fn transform_between(src: RectF, dst: RectF) -> Transform {
    let scale = DVec2::new(
        if src.size.x != 0. { dst.size.x / src.size.x } else { 1. },
        if src.size.y != 0. { dst.size.y / src.size.y } else { 1. },
    );
    DAffine2::from_mat2_translation(DMat2::from_diagonal(scale), dst.loc - src.loc)
}

pub fn scale_y_translate(scale_y: f64, translate_y: f64) -> Transform {
    DAffine2::from_mat2_translation(
        DMat2::from_diagonal(DVec2::new(1., scale_y)),
        DVec2::new(0., translate_y),
    )
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn inset_is_symmetric() {
        let rect = Rect::new(10, 20, 100, 50).inset(5, 10);
        assert_eq!(rect, Rect::new(15, 30, 90, 30));
    }

    #[test]
    fn contains_excludes_far_edges() {
        let rect = Rect::new(0, 0, 10, 10);
        assert!(rect.contains(IVec2::new(0, 0)));
        assert!(rect.contains(IVec2::new(9, 9)));
        assert!(!rect.contains(IVec2::new(10, 5)));
        assert!(!rect.contains(IVec2::new(5, 10)));
    }

    #[test]
    fn transform_between_maps_corners() {
        let src = RectF::new(100., 100., 200., 100.);
        let dst = RectF::new(50., -300., 100., 80.);
        let t = transform_between(src, dst);

        // Points are relative to the source origin.
        let origin = t.transform_point2(DVec2::ZERO) + src.loc;
        let far = t.transform_point2(src.size) + src.loc;
        assert_abs_diff_eq!(origin.x, 50., epsilon = 1e-6);
        assert_abs_diff_eq!(origin.y, -300., epsilon = 1e-6);
        assert_abs_diff_eq!(far.x, 150., epsilon = 1e-6);
        assert_abs_diff_eq!(far.y, -220., epsilon = 1e-6);
    }

    #[test]
    fn lerp_transform_endpoints() {
        let a = Transform::IDENTITY;
        let b = transform_between(
            RectF::new(0., 0., 100., 100.),
            RectF::new(10., 20., 50., 25.),
        );
        assert_eq!(lerp_transform(0., a, b), a);
        assert!(lerp_transform(1., a, b).abs_diff_eq(b, 1e-9));

        let mid = lerp_transform(0.5, a, b);
        assert_abs_diff_eq!(mid.matrix2.x_axis.x, 0.75, epsilon = 1e-6);
        assert_abs_diff_eq!(mid.matrix2.y_axis.y, 0.625, epsilon = 1e-6);
        assert_abs_diff_eq!(mid.translation.x, 5., epsilon = 1e-6);
        assert_abs_diff_eq!(mid.translation.y, 10., epsilon = 1e-6);
    }

    #[test]
    fn lerp_rect_rounds() {
        let r = lerp_rect(0.5, Rect::new(0, 0, 10, 10), Rect::new(5, 5, 20, 20));
        assert_eq!(r, Rect::new(3, 3, 15, 15));
    }
}
