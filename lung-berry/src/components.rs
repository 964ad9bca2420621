//! 二维连通区域标记.
//!
//! 连通规则固定为 **4-邻接**.

use crate::{Area2d, Areas2d, Idx2d, Idx2dF, Predicate};
use ndarray::{Array2, ArrayView2};
use std::collections::VecDeque;
use std::ops::Index;

/// 获得 `(h, w)` 的 4-邻居索引. 不检查越界.
#[inline]
pub(crate) fn neighbour4((h, w): Idx2d) -> [Idx2d; 4] {
    [
        (h.wrapping_sub(1), w),
        (h.saturating_add(1), w),
        (h, w.wrapping_sub(1)),
        (h, w.saturating_add(1)),
    ]
}

/// 单个连通区域.
#[derive(Clone, Debug)]
pub struct Component {
    label: u32,
    centroid: Idx2dF,
    positions: Area2d,
}

impl Component {
    /// 标签号, 从 1 开始.
    #[inline]
    pub fn label(&self) -> u32 {
        self.label
    }

    /// 像素个数.
    #[inline]
    pub fn count(&self) -> usize {
        self.positions.len()
    }

    /// 几何中心, 以切片的 `(行, 列)` 索引空间表示.
    #[inline]
    pub fn centroid(&self) -> Idx2dF {
        self.centroid
    }

    /// 几何中心在第 `axis` 维 (0 为行, 1 为列) 上的坐标.
    #[inline]
    pub fn centroid_along(&self, axis: usize) -> f64 {
        match axis {
            0 => self.centroid.0,
            1 => self.centroid.1,
            _ => panic!("二维切片不存在第 {axis} 维"),
        }
    }

    /// 区域内所有像素的索引, 按 BFS 访问顺序排列.
    #[inline]
    pub fn positions(&self) -> &[Idx2d] {
        &self.positions
    }
}

/// [`label2d`] 的结果.
#[derive(Clone, Debug)]
pub struct Components {
    /// 背景为 0, 前景为 `1..=n`.
    labels: Array2<u32>,

    /// 按像素个数非增排列, 第 `k` 项是标签 `k + 1`.
    items: Vec<Component>,
}

impl Components {
    /// 重新编号后的标签图.
    #[inline]
    pub fn labels(&self) -> ArrayView2<u32> {
        self.labels.view()
    }

    /// 连通区域个数.
    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// 是否不存在任何前景?
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// 按标签号获取连通区域. 标签号为 0 或越界时返回 `None`.
    #[inline]
    pub fn get(&self, label: usize) -> Option<&Component> {
        label.checked_sub(1).and_then(|i| self.items.get(i))
    }

    /// 按标签号升序 (即面积非增) 迭代所有连通区域.
    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, Component> {
        self.items.iter()
    }
}

/// 按标签号 (从 1 开始) 索引. 标签号为 0 或越界时 panic.
impl Index<usize> for Components {
    type Output = Component;

    #[inline]
    fn index(&self, label: usize) -> &Self::Output {
        assert_ne!(label, 0, "标签 0 是背景");
        &self.items[label - 1]
    }
}

/// 按照 4-相邻规则标记 `slice` 中满足谓词 `pred` 的所有连通区域.
///
/// 区域按像素个数非增的顺序编号为 `1..=n`; 面积相同时,
/// 按行优先序中先出现者在前. 因此对同一输入, 结果总是相同的.
pub fn label2d(slice: ArrayView2<u8>, pred: Predicate) -> Components {
    let mut visited = Array2::from_elem(slice.dim(), false);
    let mut areas = Areas2d::with_capacity(2);
    let mut bfs_q = VecDeque::with_capacity(16);

    for (pos, &pixel) in slice.indexed_iter() {
        if visited[pos] || !pred(pixel) {
            continue;
        }
        visited[pos] = true;
        bfs_q.push_back(pos);

        let mut this_area = Area2d::with_capacity(16);
        while let Some(cur) = bfs_q.pop_front() {
            this_area.push(cur);
            for neigh in neighbour4(cur) {
                if matches!(slice.get(neigh), Some(&v) if pred(v)) && !visited[neigh] {
                    visited[neigh] = true;
                    bfs_q.push_back(neigh);
                }
            }
        }
        areas.push(this_area);
    }

    // 稳定排序, 保证同面积区域的相对顺序.
    areas.sort_by(|a, b| b.len().cmp(&a.len()));

    let mut labels = Array2::zeros(slice.dim());
    let items = areas
        .into_iter()
        .zip(1u32..)
        .map(|(positions, label)| {
            let (mut sum_h, mut sum_w) = (0.0, 0.0);
            for &pos in positions.iter() {
                labels[pos] = label;
                sum_h += pos.0 as f64;
                sum_w += pos.1 as f64;
            }
            let n = positions.len() as f64;
            Component {
                label,
                centroid: (sum_h / n, sum_w / n),
                positions,
            }
        })
        .collect();

    Components { labels, items }
}

#[cfg(test)]
mod tests {
    use super::label2d;
    use crate::consts::region::{is_whole_lung, WHOLE_LUNG};
    use ndarray::{array, Array2};

    fn f64_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_empty_slice() {
        let s = Array2::<u8>::zeros((4, 5));
        let c = label2d(s.view(), is_whole_lung);
        assert!(c.is_empty());
        assert!(c.get(1).is_none());
        assert!(c.labels().iter().all(|&l| l == 0));
    }

    #[test]
    fn test_sorted_by_size() {
        let s = array![
            [1u8, 0, 0, 1, 1],
            [0, 0, 0, 1, 1],
            [1, 1, 0, 0, 0],
            [1, 0, 0, 0, 1],
        ];
        let c = label2d(s.view(), is_whole_lung);
        assert_eq!(c.len(), 4);
        let counts: Vec<_> = c.iter().map(|x| x.count()).collect();
        assert_eq!(counts, [4, 3, 1, 1]);

        // 左上角和右下角的单像素区域: 行优先序中 (0, 0) 先出现.
        assert_eq!(c.labels()[(0, 0)], 3);
        assert_eq!(c.labels()[(3, 4)], 4);
        assert_eq!(c.labels()[(1, 4)], 1);
        assert_eq!(c.labels()[(3, 0)], 2);

        let (ch, cw) = c[1].centroid();
        assert!(f64_eq(ch, 0.5) && f64_eq(cw, 3.5));
        assert!(f64_eq(c[2].centroid_along(0), 7.0 / 3.0));
        assert!(f64_eq(c[2].centroid_along(1), 1.0 / 3.0));
    }

    #[test]
    fn test_four_connectivity() {
        // 对角线相邻的像素不连通.
        let s = array![[1u8, 0, 0], [0, 1, 0], [0, 0, 1]];
        let c = label2d(s.view(), is_whole_lung);
        assert_eq!(c.len(), 3);
        assert!(c.iter().all(|x| x.count() == 1));
    }

    #[test]
    fn test_predicate_selects_foreground() {
        // 只有 WHOLE_LUNG 算前景, 其它区域值等同背景.
        let s = array![[WHOLE_LUNG, 7, WHOLE_LUNG], [WHOLE_LUNG, 7, WHOLE_LUNG]];
        let c = label2d(s.view(), is_whole_lung);
        assert_eq!(c.len(), 2);
        assert_eq!(c[1].count(), 2);
        assert_eq!(c[1].positions(), &[(0, 0), (1, 0)]);
        assert_eq!(c.labels()[(0, 1)], 0);
    }
}
