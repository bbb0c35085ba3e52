use image::GrayImage;
use imageproc::{distance_transform::Norm, morphology};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};
use tracing::trace;

use crate::traits::BinaryRefiner;

/// The 3×3 elliptical structuring element is the 4-connected cross, i.e.
/// the unit ball of the L1 norm. `n` iterations with it equal one pass with
/// the L1 ball of radius `n`.
const ELLIPSE_3X3: Norm = Norm::L1;

#[derive(
    Debug, Clone, Copy,
    Display, EnumString, EnumIter, IntoStaticStr,
    PartialEq, Eq
)]
#[strum(serialize_all = "snake_case")]
pub enum MorphOp {
    /// Dilate then erode: fills gaps narrower than the element
    Close,
    /// Erode then dilate: removes blobs smaller than the element
    Open,
    Erode,
    Dilate,
}

/// One morphological pass. For `Open`/`Close`, `iterations` repeats each
/// half of the operation, not the whole operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MorphStep {
    pub op: MorphOp,
    pub iterations: u8,
}

impl MorphStep {
    pub const fn new(op: MorphOp, iterations: u8) -> Self {
        Self { op, iterations }
    }

    pub fn apply(&self, image: &GrayImage) -> GrayImage {
        let k = self.iterations;
        match self.op {
            MorphOp::Close => morphology::close(image, ELLIPSE_3X3, k),
            MorphOp::Open => morphology::open(image, ELLIPSE_3X3, k),
            MorphOp::Erode => morphology::erode(image, ELLIPSE_3X3, k),
            MorphOp::Dilate => morphology::dilate(image, ELLIPSE_3X3, k),
        }
    }
}

/// Refinement applied after thresholding. Results are sensitive to this
/// exact order and these counts.
pub const VESSEL_REFINEMENT: [MorphStep; 6] = [
    MorphStep::new(MorphOp::Close, 2),
    MorphStep::new(MorphOp::Open, 1),
    MorphStep::new(MorphOp::Erode, 1),
    MorphStep::new(MorphOp::Dilate, 1),
    MorphStep::new(MorphOp::Open, 1),
    MorphStep::new(MorphOp::Close, 1),
];

/// Applies a sequence of morphological steps in order
#[derive(Debug, Clone)]
pub struct MorphologicalRefiner {
    steps: Vec<MorphStep>,
}

impl MorphologicalRefiner {
    pub fn new(steps: impl Into<Vec<MorphStep>>) -> Self {
        Self {
            steps: steps.into(),
        }
    }

    pub fn steps(&self) -> &[MorphStep] {
        &self.steps
    }

    /// Short description such as `close(2) -> open(1)`
    pub fn describe(&self) -> String {
        self.steps
            .iter()
            .map(|s| format!("{}({})", s.op, s.iterations))
            .collect::<Vec<_>>()
            .join(" -> ")
    }
}

impl Default for MorphologicalRefiner {
    fn default() -> Self {
        Self::new(VESSEL_REFINEMENT)
    }
}

impl BinaryRefiner for MorphologicalRefiner {
    fn refine(&self, binary: GrayImage) -> GrayImage {
        self.steps.iter().fold(binary, |image, step| {
            let out = step.apply(&image);
            trace!(op = %step.op, iterations = step.iterations, "morphology pass");
            out
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn bar_image() -> GrayImage {
        // 7 px wide vertical bar plus one isolated speck
        let mut img = GrayImage::new(40, 40);
        for y in 5..35 {
            for x in 10..17 {
                img.put_pixel(x, y, Luma([255u8]));
            }
        }
        img.put_pixel(30, 20, Luma([255u8]));
        img
    }

    #[test]
    fn test_refinement_order_is_fixed() {
        let ops: Vec<&'static str> = VESSEL_REFINEMENT.iter().map(|s| s.op.into()).collect();
        assert_eq!(ops, ["close", "open", "erode", "dilate", "open", "close"]);
        let counts: Vec<u8> = VESSEL_REFINEMENT.iter().map(|s| s.iterations).collect();
        assert_eq!(counts, [2, 1, 1, 1, 1, 1]);
        assert_eq!(
            MorphologicalRefiner::default().describe(),
            "close(2) -> open(1) -> erode(1) -> dilate(1) -> open(1) -> close(1)"
        );
    }

    #[test]
    fn test_speck_removed_bar_kept() {
        let refined = MorphologicalRefiner::default().refine(bar_image());
        assert_eq!(refined.get_pixel(30, 20)[0], 0);
        assert_eq!(refined.get_pixel(13, 20)[0], 255);
        assert!(refined.pixels().all(|p| p[0] == 0 || p[0] == 255));
    }

    #[test]
    fn test_close_fills_single_pixel_gap() {
        let mut img = GrayImage::new(20, 20);
        for y in 5..15 {
            for x in 5..15 {
                if x != 10 {
                    img.put_pixel(x, y, Luma([255u8]));
                }
            }
        }
        let closed = MorphStep::new(MorphOp::Close, 1).apply(&img);
        assert_eq!(closed.get_pixel(10, 10)[0], 255);
    }

    #[test]
    fn test_every_op_keeps_image_binary() {
        use strum::IntoEnumIterator;
        let img = bar_image();
        for op in MorphOp::iter() {
            let out = MorphStep::new(op, 1).apply(&img);
            assert_eq!(out.dimensions(), img.dimensions());
            assert!(out.pixels().all(|p| p[0] == 0 || p[0] == 255), "{op} produced gray levels");
        }
    }

    #[test]
    fn test_op_names_parse() {
        use std::str::FromStr;
        assert_eq!(MorphOp::from_str("erode").ok(), Some(MorphOp::Erode));
        assert_eq!(MorphOp::Close.to_string(), "close");
    }
}
