//! 单侧肺按体积三等分.

use crate::consts::{Side, Third};
use crate::data::{AxialOrder, RegionSliceMut};
use ndarray::{Array3, Axis};

/// 三等分结果统计, 按侧别和分区记录体素数.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct ThirdsSummary {
    /// `[侧别][分区]`, 侧别按 [`Side::BOTH`], 分区按 [`Third::ALL`] 排列.
    counts: [[usize; 3]; 2],
}

impl ThirdsSummary {
    /// `side` 侧 `third` 分区的体素数.
    #[inline]
    pub fn get(&self, side: Side, third: Third) -> usize {
        self.counts[side.index()][third.index()]
    }

    /// `side` 侧三个分区的体素总数.
    #[inline]
    pub fn total(&self, side: Side) -> usize {
        self.counts[side.index()].iter().sum()
    }

    #[inline]
    fn add(&mut self, side: Side, third: Third, n: usize) {
        self.counts[side.index()][third.index()] += n;
    }
}

/// 将 `region` 中的左肺、右肺体素按轴向划分为体积相等的下、中、上三个分区.
///
/// 从足侧开始逐个水平切片处理, 每侧独立地以 **本切片之前** 的累计体素数决定本切片的分区,
/// 规则见 [`Third::classify`]. 因此每个分区与 `V / 3` 的差距不超过一个切片的贡献.
///
/// `order` 指明 `z = 0` 位于足侧还是头侧.
pub fn split_thirds(region: &mut Array3<u8>, order: AxialOrder) -> ThirdsSummary {
    let totals = Side::BOTH.map(|side| region.iter().filter(|&&p| p == side.label()).count());
    let mut consumed = [0usize; 2];
    let mut summary = ThirdsSummary::default();

    for z in order.inferior_to_superior(region.len_of(Axis(0))) {
        let mut sli = RegionSliceMut::new(region.index_axis_mut(Axis(0), z));
        for side in Side::BOTH {
            let i = side.index();
            let third = Third::classify(consumed[i], totals[i]);
            let n = sli.replace(side.label(), side.third_label(third));
            summary.add(side, third, n);
            consumed[i] += n;
        }
    }

    debug_assert!(Side::BOTH
        .iter()
        .all(|s| summary.total(*s) == totals[s.index()]));
    summary
}
