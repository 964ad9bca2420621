//! 两目标切片分类器.

use crate::data::{Convention, RegionSlice, RegionSliceMut};

/// 若 `mask` 中最大的两个全肺连通区域都足够大, 则按它们几何中心在左右轴
/// `lr_axis` 上的先后, 把两者在 `out` 中分别标为左肺和右肺.
///
/// "足够大" 指区域像素数占整个切片像素数的比例 **严格大于** `size_threshold`.
/// 两个中心坐标相等时, 第二大的区域被视为坐标较大的一侧.
/// 第三大及更小的区域不做处理.
///
/// 证据不足时不修改 `out`, 也不会失败. 返回值指示是否写入了 `out`.
///
/// # 注意
///
/// `mask` 与 `out` 形状必须一致, `lr_axis` 只能是 0 或 1, 否则程序行为未定义.
pub fn two_object_cut(
    mask: &RegionSlice,
    out: &mut RegionSliceMut,
    lr_axis: usize,
    convention: Convention,
    size_threshold: f64,
) -> bool {
    debug_assert_eq!(mask.shape(), out.shape());
    debug_assert!(lr_axis < 2);

    let comps = mask.whole_lung_components();
    if comps.len() < 2 {
        return false;
    }

    let area = mask.size() as f64;
    let (first, second) = (&comps[1], &comps[2]);
    let large_enough = |n: usize| n as f64 / area > size_threshold;
    if !large_enough(first.count()) || !large_enough(second.count()) {
        return false;
    }

    let larger = convention.side_at_larger();
    let (first_side, second_side) =
        if first.centroid_along(lr_axis) > second.centroid_along(lr_axis) {
            (larger, larger.opposite())
        } else {
            (larger.opposite(), larger)
        };

    out.fill_batch(first.positions().iter().copied(), first_side.label());
    out.fill_batch(second.positions().iter().copied(), second_side.label());
    true
}

#[cfg(test)]
mod tests {
    use super::two_object_cut;
    use crate::consts::region::*;
    use crate::data::{Convention, RegionSlice, RegionSliceMut};
    use ndarray::Array2;

    /// 20x20 切片, 在 `cols` 列范围内各放一个 `rows` 行高的矩形.
    fn two_blocks(rows: std::ops::Range<usize>, cols: [std::ops::Range<usize>; 2]) -> Array2<u8> {
        let mut s = Array2::zeros((20, 20));
        for c in cols {
            for h in rows.clone() {
                for w in c.clone() {
                    s[(h, w)] = WHOLE_LUNG;
                }
            }
        }
        s
    }

    fn run(mask: &Array2<u8>, convention: Convention, threshold: f64) -> (bool, Array2<u8>) {
        let mut out = mask.clone();
        let fired = two_object_cut(
            &RegionSlice::from(mask.view()),
            &mut RegionSliceMut::from(out.view_mut()),
            1,
            convention,
            threshold,
        );
        (fired, out)
    }

    #[test]
    fn test_lps_larger_is_left() {
        // 每块 50 像素, 占 12.5%.
        let mask = two_blocks(5..15, [2..7, 12..17]);
        let (fired, out) = run(&mask, Convention::Lps, 0.05);
        assert!(fired);
        assert_eq!(out[(10, 4)], RIGHT_LUNG);
        assert_eq!(out[(10, 14)], LEFT_LUNG);
        assert_eq!(out[(0, 0)], BACKGROUND);
    }

    #[test]
    fn test_ras_larger_is_right() {
        let mask = two_blocks(5..15, [2..7, 12..17]);
        let (fired, out) = run(&mask, Convention::Ras, 0.05);
        assert!(fired);
        assert_eq!(out[(10, 4)], LEFT_LUNG);
        assert_eq!(out[(10, 14)], RIGHT_LUNG);
    }

    #[test]
    fn test_single_component_declines() {
        let mask = two_blocks(5..15, [2..17, 2..17]);
        let (fired, out) = run(&mask, Convention::Lps, 0.05);
        assert!(!fired);
        assert_eq!(out, mask);
    }

    #[test]
    fn test_small_component_declines() {
        // 第二块 4 像素, 只占 1%.
        let mut mask = two_blocks(5..15, [2..7, 2..7]);
        for w in 15..19 {
            mask[(10, w)] = WHOLE_LUNG;
        }
        let (fired, out) = run(&mask, Convention::Lps, 0.05);
        assert!(!fired);
        assert_eq!(out, mask);

        // 阈值放宽后可以触发.
        let (fired, out) = run(&mask, Convention::Lps, 0.005);
        assert!(fired);
        assert_eq!(out[(10, 16)], LEFT_LUNG);
        assert_eq!(out[(10, 3)], RIGHT_LUNG);
    }

    #[test]
    fn test_threshold_is_strict() {
        // 每块恰好 20 像素 = 5%.
        let mask = two_blocks(5..9, [2..7, 12..17]);
        let (fired, _) = run(&mask, Convention::Lps, 0.05);
        assert!(!fired);
    }

    #[test]
    fn test_third_component_untouched() {
        let mut mask = two_blocks(5..15, [2..7, 12..17]);
        mask[(0, 19)] = WHOLE_LUNG;
        let (fired, out) = run(&mask, Convention::Lps, 0.05);
        assert!(fired);
        assert_eq!(out[(0, 19)], WHOLE_LUNG);
    }
}
