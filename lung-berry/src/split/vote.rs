//! 多数投票切片协调器.

use crate::consts::{region::*, Side};
use crate::data::{RegionSlice, RegionSliceMut};

/// 对 `mask` 中的每个全肺连通区域, 统计其覆盖范围内 `out` 已有的左肺和右肺像素数,
/// 然后把整个区域改写为占多数的一侧. 票数相同时取右肺.
///
/// 区域内既没有左肺也没有右肺像素时不做任何修改, 保留为全肺.
///
/// 返回被改写的区域个数.
pub fn majority_vote(mask: &RegionSlice, out: &mut RegionSliceMut) -> usize {
    debug_assert_eq!(mask.shape(), out.shape());

    let mut voted = 0usize;
    for comp in mask.whole_lung_components().iter() {
        let n_left = out.count_at(comp.positions(), LEFT_LUNG);
        let n_right = out.count_at(comp.positions(), RIGHT_LUNG);
        if n_left == 0 && n_right == 0 {
            continue;
        }
        let side = if n_left > n_right {
            Side::Left
        } else {
            Side::Right
        };
        out.fill_batch(comp.positions().iter().copied(), side.label());
        voted += 1;
    }
    voted
}
