use crate::components::{label2d, Components};
use crate::consts::region::*;
use crate::{Idx2d, Predicate};
use ndarray::iter::Iter;
use ndarray::{ArrayView2, ArrayViewMut2, Ix2};
use std::ops::{Index, IndexMut};

/// 不可变、借用的二维区域字节切片.
pub struct RegionSlice<'a> {
    /// 底层数据的轻量级视图, 一般借用于区域字节体或处理掩码.
    data: ArrayView2<'a, u8>,
}

impl<'a> From<ArrayView2<'a, u8>> for RegionSlice<'a> {
    #[inline]
    fn from(data: ArrayView2<'a, u8>) -> Self {
        Self::new(data)
    }
}

impl Index<Idx2d> for RegionSlice<'_> {
    type Output = u8;

    #[inline]
    fn index(&self, index: Idx2d) -> &Self::Output {
        &self.data[index]
    }
}

/// 可变、借用的二维区域字节切片.
pub struct RegionSliceMut<'a> {
    /// 底层数据的轻量级视图, 借用于输出区域字节体.
    data: ArrayViewMut2<'a, u8>,
}

impl<'a> From<ArrayViewMut2<'a, u8>> for RegionSliceMut<'a> {
    #[inline]
    fn from(data: ArrayViewMut2<'a, u8>) -> Self {
        Self::new(data)
    }
}

/// 可变方法集合.
impl<'a> RegionSliceMut<'a> {
    /// 将切片中值为 `old` 的像素全部替换为 `new`.
    ///
    /// 返回总共成功替换的个数.
    pub fn replace(&mut self, old: u8, new: u8) -> usize {
        let mut cnt = 0usize;
        self.data.iter_mut().filter(|pix| **pix == old).for_each(|p| {
            cnt += 1;
            *p = new;
        });
        cnt
    }

    /// 将 `it` 给出的所有位置设为 `value`. 越界时 panic.
    pub fn fill_batch<I: IntoIterator<Item = Idx2d>>(&mut self, it: I, value: u8) {
        for pos in it.into_iter() {
            self[pos] = value;
        }
    }
}

impl Index<Idx2d> for RegionSliceMut<'_> {
    type Output = u8;

    #[inline]
    fn index(&self, index: Idx2d) -> &Self::Output {
        &self.data[index]
    }
}

impl IndexMut<Idx2d> for RegionSliceMut<'_> {
    #[inline]
    fn index_mut(&mut self, index: Idx2d) -> &mut Self::Output {
        &mut self.data[index]
    }
}

/// 不可变方法集合.
macro_rules! impl_region_slice_immut {
    ($life: lifetime, $slice: ty, $array: ty) => {
        /// 不可变方法集合.
        impl<$life> $slice {
            /// 直接初始化.
            #[inline]
            pub(crate) fn new(data: $array) -> Self {
                Self { data }
            }

            /// 获得 **底层** 数据的一份不可变 shallow copy.
            #[inline]
            pub fn array_view(&self) -> ArrayView2<u8> {
                self.data.view()
            }

            /// 获取可以迭代图像像素的迭代器.
            #[inline]
            pub fn iter(&self) -> Iter<'_, u8, Ix2> {
                self.data.iter()
            }

            /// 获取给定位置 (行, 列) 的像素值. 越界时返回 `None`.
            #[inline]
            pub fn get(&self, pos: Idx2d) -> Option<&u8> {
                self.data.get(pos)
            }

            /// 该图是否为全背景图?
            #[inline]
            pub fn is_background(&self) -> bool {
                self.data.iter().copied().all(is_background)
            }

            /// 切片的形状 (行, 列).
            #[inline]
            pub fn shape(&self) -> Idx2d {
                self.data.dim()
            }

            /// 切片的像素个数.
            #[inline]
            pub fn size(&self) -> usize {
                let (h, w) = self.shape();
                h * w
            }

            /// 判断一个索引是否合法 (未越界).
            #[inline]
            pub fn check(&self, (h, w): Idx2d) -> bool {
                let (h_len, w_len) = self.shape();
                h < h_len && w < w_len
            }

            /// 统计切片中值为 `label` 的像素总个数.
            #[inline]
            pub fn count(&self, label: u8) -> usize {
                self.data.iter().filter(|&p| *p == label).count()
            }

            /// 统计 `it` 给出的位置中, 值为 `label` 的像素个数. 越界时 panic.
            pub fn count_at<'p, I>(&self, it: I, label: u8) -> usize
            where
                I: IntoIterator<Item = &'p Idx2d>,
            {
                it.into_iter().filter(|&&pos| self[pos] == label).count()
            }

            /// 以行优先规则, 获取能迭代图像所有 `(索引, 像素值)` 的迭代器.
            #[inline]
            pub fn indexed_iter(&self) -> impl Iterator<Item = (Idx2d, &u8)> {
                self.data.indexed_iter()
            }

            /// 按照 4-相邻规则标记满足谓词 `pred` 的所有连通区域.
            /// 详见 [`crate::components::label2d`].
            #[inline]
            pub fn components(&self, pred: Predicate) -> Components {
                label2d(self.array_view(), pred)
            }

            /// 按照 4-相邻规则标记所有全肺区域.
            #[inline]
            pub fn whole_lung_components(&self) -> Components {
                self.components(is_whole_lung)
            }
        }
    };
}
impl_region_slice_immut!('a, RegionSlice<'a>, ArrayView2<'a, u8>);
impl_region_slice_immut!('a, RegionSliceMut<'a>, ArrayViewMut2<'a, u8>);

#[cfg(test)]
mod tests {
    use super::{RegionSlice, RegionSliceMut};
    use crate::consts::region::*;
    use ndarray::{array, Array2};

    #[test]
    fn test_replace_and_count() {
        let mut data = array![[1u8, 2, 2], [3, 2, 0]];
        let mut s = RegionSliceMut::from(data.view_mut());
        assert_eq!(s.count(RIGHT_LUNG), 3);
        assert_eq!(s.replace(RIGHT_LUNG, RIGHT_LOWER_THIRD), 3);
        assert_eq!(s.count(RIGHT_LUNG), 0);
        assert_eq!(s.count_at(&[(0, 0), (0, 1), (1, 0)], RIGHT_LOWER_THIRD), 1);
        assert_eq!(data[(1, 1)], RIGHT_LOWER_THIRD);
    }

    #[test]
    fn test_fill_batch() {
        let mut data = Array2::<u8>::zeros((3, 3));
        let mut s = RegionSliceMut::from(data.view_mut());
        s.fill_batch([(0, 0), (2, 2)], LEFT_LUNG);
        assert!(!s.is_background());
        assert_eq!(s.count(LEFT_LUNG), 2);
        assert!(s.check((2, 2)));
        assert!(!s.check((3, 0)));
    }

    #[test]
    fn test_read_access() {
        let data = array![[BACKGROUND, LEFT_LUNG], [RIGHT_LUNG, LEFT_LUNG]];
        let s = RegionSlice::from(data.view());
        assert_eq!(s.get((1, 0)), Some(&RIGHT_LUNG));
        assert_eq!(s.get((2, 0)), None);
        assert_eq!(s.iter().filter(|&&p| is_side(p)).count(), 3);
        let lefts: Vec<_> = s
            .indexed_iter()
            .filter(|(_, p)| **p == LEFT_LUNG)
            .map(|(pos, _)| pos)
            .collect();
        assert_eq!(lefts, [(0, 1), (1, 1)]);
        assert_eq!(s.array_view(), data.view());
    }

    #[test]
    fn test_components_on_view() {
        let data = array![[WHOLE_LUNG, 0, WHOLE_LUNG], [WHOLE_LUNG, 0, 0]];
        let s = RegionSlice::from(data.view());
        assert_eq!(s.shape(), (2, 3));
        assert_eq!(s.size(), 6);
        let c = s.whole_lung_components();
        assert_eq!(c.len(), 2);
        assert_eq!(c[1].count(), 2);
    }
}
