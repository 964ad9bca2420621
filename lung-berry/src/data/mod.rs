use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::ops::{Index, IndexMut};

use itertools::Itertools;
use ndarray::{Array3, ArrayView, Ix3};
use nifti::NiftiHeader;

use crate::codec;
use crate::{Idx2d, Idx3d};

pub mod orient;
pub mod slice;

pub use orient::{AxialOrder, Convention, ParseConventionError};
pub use slice::{RegionSlice, RegionSliceMut};

/// `NiftiHeader` 是栈上大对象, 移动该对象的开销很可观.
/// 因此我们将其分配到堆上.
type BoxedHeader = Box<NiftiHeader>;

/// nifti `datatype` 中 `uint16` 的编码.
const DT_UINT16: i16 = 512;

/// 将 (W, H, z) 转换成 (z, H, W). 以后均按照该模式访问.
#[inline]
fn get_shape_from_header(h: &NiftiHeader) -> Idx3d {
    // [W, H, z]. 体素个数数组.
    let [_, w, h, z, ..] = h.dim;
    (z as usize, h as usize, w as usize)
}

/// 3D 体数据 header 的共用属性和部分通用操作.
pub trait NiftiHeaderAttr {
    /// 获取 header 部分.
    fn header(&self) -> &NiftiHeader;

    /// 获取数据形状大小 `(z, h, w)`.
    #[inline]
    fn shape(&self) -> Idx3d {
        get_shape_from_header(self.header())
    }

    /// 获取数据水平切片形状大小.
    #[inline]
    fn slice_shape(&self) -> Idx2d {
        let (_, h, w) = self.shape();
        (h, w)
    }

    /// 获取水平切片个数.
    #[inline]
    fn len_z(&self) -> usize {
        self.shape().0
    }

    /// 获取数据体素个数.
    #[inline]
    fn size(&self) -> usize {
        let (z, h, w) = self.shape();
        z * h * w
    }

    /// 检查索引是否合法.
    #[inline]
    fn check(&self, (z0, h0, w0): &Idx3d) -> bool {
        let (z, h, w) = self.shape();
        *z0 < z && *h0 < h && *w0 < w
    }

    /// 获取单个体素分辨率 `(sz, sy, sx)`. 该分辨率以毫米为单位, 分别代表空间
    /// (相邻切片方向), 高 (前后方向), 宽 (左右方向).
    #[inline]
    fn pix_dim(&self) -> [f64; 3] {
        let [_, w, h, z, ..] = self.header().pixdim;
        [z as f64, h as f64, w as f64]
    }

    /// 获取左右方向体素分辨率, 以毫米为单位.
    #[inline]
    fn width_mm(&self) -> f64 {
        self.header().pixdim[1] as f64
    }

    /// 获取体素的实际体积值, 以立方毫米为单位.
    #[inline]
    fn voxel(&self) -> f64 {
        self.pix_dim().iter().product()
    }

    /// 从 header 推断左右方向约定. 方向未知时返回 `None`.
    #[inline]
    fn convention(&self) -> Option<Convention> {
        Convention::from_header(self.header())
    }

    /// 从 header 推断水平切片的头足顺序. 方向未知时返回 `None`.
    #[inline]
    fn axial_order(&self) -> Option<AxialOrder> {
        AxialOrder::from_header(self.header())
    }
}

/// 创建 [`LabelMap`] 错误.
#[derive(Clone, Debug, PartialEq)]
pub enum InitLabelMapError {
    /// 某一维超出 nifti header 可表示的范围. 参数为 `(z, h, w)` 形状.
    ShapeTooLarge(Idx3d),

    /// header 描述的形状与数据不一致.
    ShapeMismatch {
        /// header 中的 `(z, h, w)`.
        header: Idx3d,
        /// 数据的 `(z, h, w)`.
        data: Idx3d,
    },

    /// 体素分辨率必须是有限正数. 参数为 `(sz, sy, sx)`.
    InvalidSpacing([f64; 3]),
}

impl Display for InitLabelMapError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ShapeTooLarge(sh) => write!(f, "形状 {sh:?} 超出 nifti header 表示范围"),
            Self::ShapeMismatch { header, data } => {
                write!(f, "header 形状 {header:?} 与数据形状 {data:?} 不一致")
            }
            Self::InvalidSpacing(sp) => write!(f, "体素分辨率 {sp:?} 必须是有限正数"),
        }
    }
}

impl std::error::Error for InitLabelMapError {}

/// 3D 胸部 CT 标签, 包括 header 和 16-bit 打包标签.
///
/// 打包规则见 [`crate::codec`]. 数据以 `(z, h, w)` 访问, 其中 `w`
/// 是病人的左右方向, `z` 是相邻水平切片的方向.
#[derive(Debug, Clone)]
pub struct LabelMap {
    header: BoxedHeader,
    data: Array3<u16>,
}

impl NiftiHeaderAttr for LabelMap {
    #[inline]
    fn header(&self) -> &NiftiHeader {
        &self.header
    }
}

impl Index<Idx3d> for LabelMap {
    type Output = u16;

    #[inline]
    fn index(&self, index: Idx3d) -> &Self::Output {
        &self.data[index]
    }
}

impl IndexMut<Idx3d> for LabelMap {
    #[inline]
    fn index_mut(&mut self, index: Idx3d) -> &mut Self::Output {
        &mut self.data[index]
    }
}

impl LabelMap {
    /// 根据 `(z, h, w)` 数据和体素分辨率 `(sz, sy, sx)` 直接创建标签体.
    ///
    /// 生成的 header 只包含形状、分辨率和数据类型, 不含方向信息.
    pub fn new(data: Array3<u16>, spacing: [f64; 3]) -> Result<Self, InitLabelMapError> {
        if !spacing.iter().all(|s| s.is_finite() && *s > 0.0) {
            return Err(InitLabelMapError::InvalidSpacing(spacing));
        }
        let shape = data.dim();
        let (z, h, w) = shape;
        let to_u16 = |n: usize| u16::try_from(n).map_err(|_| InitLabelMapError::ShapeTooLarge(shape));
        let (z, h, w) = (to_u16(z)?, to_u16(h)?, to_u16(w)?);

        let mut header = Box::<NiftiHeader>::default();
        header.dim = [3, w, h, z, 1, 1, 1, 1];
        let [sz, sy, sx] = spacing;
        let [qfac, pw, ph, pz, ..] = &mut header.pixdim;
        (*qfac, *pw, *ph, *pz) = (1.0, sx as f32, sy as f32, sz as f32);
        header.datatype = DT_UINT16;
        header.bitpix = 16;
        // 默认 header 带有单位 sform/qform, 这里清除以表示方向未知.
        (header.sform_code, header.qform_code) = (0, 0);

        Ok(Self { header, data })
    }

    /// 使用已有的 `header` 创建标签体. `data` 按 `(z, h, w)` 组织,
    /// 其形状必须与 header 一致.
    pub fn with_header(header: &NiftiHeader, data: Array3<u16>) -> Result<Self, InitLabelMapError> {
        let expected = get_shape_from_header(header);
        if expected != data.dim() {
            return Err(InitLabelMapError::ShapeMismatch {
                header: expected,
                data: data.dim(),
            });
        }
        Ok(Self {
            header: Box::new(header.clone()),
            data,
        })
    }

    /// 以 `self` 的几何信息包装新数据.
    ///
    /// 如果 `data` 形状与 `self` 不一致, 则程序 panic.
    pub fn with_geometry_of(&self, data: Array3<u16>) -> Self {
        assert_eq!(self.shape(), data.dim(), "几何信息与数据形状不一致");
        Self {
            header: self.header.clone(),
            data,
        }
    }

    /// 将 `self` 的几何信息 (形状, 分辨率, 方向, 偏移) 复制给 `to`.
    ///
    /// 如果两者形状不一致, 则程序 panic.
    pub fn copy_geometry(&self, to: &mut LabelMap) {
        assert_eq!(self.shape(), to.shape(), "几何信息与数据形状不一致");
        to.header.clone_from(&self.header);
    }

    /// 获得数据的一份不可变 shallow copy.
    #[inline]
    pub fn data(&self) -> ArrayView<'_, u16, Ix3> {
        self.data.view()
    }

    /// 获取 `pos` 处的区域字节. 越界时 panic.
    #[inline]
    pub fn region_at(&self, pos: Idx3d) -> u8 {
        codec::region_of(self[pos])
    }

    /// 获取 `pos` 处的类型字节. 越界时 panic.
    #[inline]
    pub fn type_at(&self, pos: Idx3d) -> u8 {
        codec::type_of(self[pos])
    }

    /// 拷贝出区域字节体.
    #[inline]
    pub fn region_bytes(&self) -> Array3<u8> {
        self.data.mapv(codec::region_of)
    }

    /// 拷贝出类型字节体.
    #[inline]
    pub fn type_bytes(&self) -> Array3<u8> {
        self.data.mapv(codec::type_of)
    }

    /// 获取区域字节为 `region` 的体素个数.
    #[inline]
    pub fn count_region(&self, region: u8) -> usize {
        self.data
            .iter()
            .filter(|&&c| codec::region_of(c) == region)
            .count()
    }

    /// 区域字节直方图. 只包含至少出现一次的区域.
    pub fn region_statistics(&self) -> HashMap<u8, usize> {
        self.data.iter().map(|&c| codec::region_of(c)).counts()
    }

    /// 将区域字节为 `old` 的体素改为 `new`, 类型字节保持不变.
    ///
    /// 返回总共成功替换的个数.
    pub fn replace_region(&mut self, old: u8, new: u8) -> usize {
        let mut cnt = 0usize;
        self.data
            .iter_mut()
            .filter(|c| codec::region_of(**c) == old)
            .for_each(|c| {
                cnt += 1;
                *c = codec::combine(new, codec::type_of(*c));
            });
        cnt
    }
}

#[cfg(test)]
mod tests {
    use super::{InitLabelMapError, LabelMap, NiftiHeaderAttr};
    use crate::codec::combine;
    use crate::consts::region::*;
    use ndarray::Array3;

    fn tiny() -> LabelMap {
        let mut data = Array3::<u16>::zeros((2, 3, 4));
        data[(0, 1, 1)] = combine(WHOLE_LUNG, 0x7F);
        data[(1, 2, 3)] = combine(RIGHT_LUNG, 0x01);
        data[(1, 0, 0)] = combine(WHOLE_LUNG, 0x00);
        LabelMap::new(data, [2.5, 0.7, 0.8]).unwrap()
    }

    #[test]
    fn test_geometry_from_spacing() {
        let m = tiny();
        assert_eq!(m.shape(), (2, 3, 4));
        assert_eq!(m.slice_shape(), (3, 4));
        assert_eq!(m.len_z(), 2);
        assert_eq!(m.size(), 24);
        assert!(m.check(&(1, 2, 3)));
        assert!(!m.check(&(2, 0, 0)));

        let [sz, sy, sx] = m.pix_dim();
        assert!((sz - 2.5).abs() < 1e-6);
        assert!((sy - 0.7).abs() < 1e-6);
        assert!((sx - 0.8).abs() < 1e-6);
        assert!((m.width_mm() - 0.8).abs() < 1e-6);
        assert!((m.voxel() - 2.5 * 0.7 * 0.8).abs() < 1e-5);
        assert!(m.convention().is_none());
        assert!(m.axial_order().is_none());
    }

    #[test]
    fn test_invalid_inputs() {
        let data = Array3::<u16>::zeros((1, 1, 1));
        assert_eq!(
            LabelMap::new(data.clone(), [1.0, 0.0, 1.0]).unwrap_err(),
            InitLabelMapError::InvalidSpacing([1.0, 0.0, 1.0])
        );
        assert!(LabelMap::new(data, [1.0, f64::NAN, 1.0]).is_err());

        let big = Array3::<u16>::zeros((1, 1, 70_000));
        assert_eq!(
            LabelMap::new(big, [1.0; 3]).unwrap_err(),
            InitLabelMapError::ShapeTooLarge((1, 1, 70_000))
        );

        let m = tiny();
        let err = LabelMap::with_header(m.header(), Array3::zeros((3, 3, 4))).unwrap_err();
        assert_eq!(
            err,
            InitLabelMapError::ShapeMismatch {
                header: (2, 3, 4),
                data: (3, 3, 4)
            }
        );
    }

    #[test]
    fn test_region_type_access() {
        let m = tiny();
        assert_eq!(m.region_at((0, 1, 1)), WHOLE_LUNG);
        assert_eq!(m.type_at((0, 1, 1)), 0x7F);
        assert_eq!(m.count_region(WHOLE_LUNG), 2);
        assert_eq!(m.region_bytes()[(1, 2, 3)], RIGHT_LUNG);
        assert_eq!(m.type_bytes()[(1, 2, 3)], 0x01);

        let stats = m.region_statistics();
        assert_eq!(stats[&BACKGROUND], 21);
        assert_eq!(stats[&WHOLE_LUNG], 2);
        assert_eq!(stats[&RIGHT_LUNG], 1);
        assert!(!stats.contains_key(&LEFT_LUNG));
    }

    #[test]
    fn test_replace_region_keeps_type() {
        let mut m = tiny();
        assert_eq!(m.replace_region(WHOLE_LUNG, LEFT_LUNG), 2);
        assert_eq!(m[(0, 1, 1)], combine(LEFT_LUNG, 0x7F));
        assert_eq!(m.count_region(WHOLE_LUNG), 0);
    }

    #[test]
    fn test_copy_geometry() {
        let m = tiny();
        let mut other = LabelMap::new(Array3::zeros((2, 3, 4)), [1.0; 3]).unwrap();
        m.copy_geometry(&mut other);
        assert_eq!(other.pix_dim(), m.pix_dim());

        let wrapped = m.with_geometry_of(Array3::zeros((2, 3, 4)));
        assert_eq!(wrapped.pix_dim(), m.pix_dim());
        assert_eq!(wrapped.count_region(BACKGROUND), 24);
    }

    #[test]
    #[should_panic]
    fn test_with_geometry_of_shape_mismatch() {
        tiny().with_geometry_of(Array3::zeros((1, 3, 4)));
    }
}
