//! 体数据的方向约定.
//!
//! 数组统一按 `(z, h, w)` 访问, `w` (自然图像的水平方向) 就是病人的左右方向.
//! nifti 的世界坐标系是 RAS+, 即 x 轴指向病人右侧, z 轴指向头侧.

use crate::consts::Side;
use nifti::NiftiHeader;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// 左右方向约定: 切片内左右轴的索引增大时朝向病人的哪一侧.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum Convention {
    /// 索引增大朝向病人左侧 (DICOM 惯例).
    #[default]
    Lps,

    /// 索引增大朝向病人右侧.
    Ras,
}

impl Convention {
    /// 左右轴坐标 **较大** 的一侧是哪一侧?
    #[inline]
    pub const fn side_at_larger(&self) -> Side {
        match self {
            Self::Lps => Side::Left,
            Self::Ras => Side::Right,
        }
    }

    /// 另一种约定.
    #[inline]
    pub const fn flipped(&self) -> Self {
        match self {
            Self::Lps => Self::Ras,
            Self::Ras => Self::Lps,
        }
    }

    /// 从 nifti 元数据 `header` 中推断左右方向约定.
    ///
    /// 如果 header 不含 sform/qform 方向信息, 或 `w` 轴不以世界 x 轴为主方向
    /// (例如斜切扫描), 则返回 `None`.
    pub fn from_header(header: &NiftiHeader) -> Option<Self> {
        let m = direction_matrix(header)?;
        // 第 0 列是 `w` 轴在世界坐标中的方向.
        let x = dominant_component(m, 0, 0)?;
        // 世界 x 轴指向右侧, 所以正分量意味着索引增大朝向右侧.
        Some(if x > 0.0 { Self::Ras } else { Self::Lps })
    }
}

impl Display for Convention {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Lps => "lps",
            Self::Ras => "ras",
        })
    }
}

/// 解析 [`Convention`] 错误. 内含无法识别的原始字符串.
#[derive(Clone, Debug, PartialEq)]
pub struct ParseConventionError(pub String);

impl Display for ParseConventionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "未知的方向约定 `{}`, 应为 `lps` 或 `ras`", self.0)
    }
}

impl std::error::Error for ParseConventionError {}

impl FromStr for Convention {
    type Err = ParseConventionError;

    /// 大小写不敏感.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "lps" => Ok(Self::Lps),
            "ras" => Ok(Self::Ras),
            _ => Err(ParseConventionError(s.to_owned())),
        }
    }
}

/// 水平切片 `z = 0` 位于体数据的哪一端?
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum AxialOrder {
    /// `z = 0` 位于足侧 (inferior), `z` 增大朝向头侧.
    #[default]
    InferiorFirst,

    /// `z = 0` 位于头侧 (superior), `z` 增大朝向足侧.
    SuperiorFirst,
}

impl AxialOrder {
    /// 从足侧到头侧依次访问 `len_z` 个水平切片的索引.
    pub fn inferior_to_superior(
        &self,
        len_z: usize,
    ) -> either::Either<std::ops::Range<usize>, std::iter::Rev<std::ops::Range<usize>>> {
        match self {
            Self::InferiorFirst => either::Left(0..len_z),
            Self::SuperiorFirst => either::Right((0..len_z).rev()),
        }
    }

    /// 从 nifti 元数据 `header` 中推断切片顺序.
    ///
    /// 如果 header 不含 sform/qform 方向信息, 或 `z` 轴不以世界 z 轴为主方向,
    /// 则返回 `None`.
    pub fn from_header(header: &NiftiHeader) -> Option<Self> {
        let m = direction_matrix(header)?;
        let z = dominant_component(m, 2, 2)?;
        Some(if z > 0.0 {
            Self::InferiorFirst
        } else {
            Self::SuperiorFirst
        })
    }
}

/// 3x3 方向矩阵, 第 `j` 列是 nifti 第 `j` 个索引轴 (`i, j, k` 即 `w, h, z`)
/// 在世界坐标中的方向. 优先使用 sform, 其次 qform.
fn direction_matrix(header: &NiftiHeader) -> Option<[[f64; 3]; 3]> {
    if header.sform_code > 0 {
        let row = |r: &[f32; 4]| [r[0] as f64, r[1] as f64, r[2] as f64];
        return Some([
            row(&header.srow_x),
            row(&header.srow_y),
            row(&header.srow_z),
        ]);
    }
    (header.qform_code > 0).then(|| quatern_matrix(header))
}

/// 由四元数 `(b, c, d)` 与 `qfac` 还原旋转矩阵.
fn quatern_matrix(header: &NiftiHeader) -> [[f64; 3]; 3] {
    let (b, c, d) = (
        header.quatern_b as f64,
        header.quatern_c as f64,
        header.quatern_d as f64,
    );
    let a = (1.0 - (b * b + c * c + d * d)).max(0.0).sqrt();
    let qfac = if header.pixdim[0] < 0.0 { -1.0 } else { 1.0 };
    [
        [
            a * a + b * b - c * c - d * d,
            2.0 * (b * c - a * d),
            2.0 * (b * d + a * c) * qfac,
        ],
        [
            2.0 * (b * c + a * d),
            a * a + c * c - b * b - d * d,
            2.0 * (c * d - a * b) * qfac,
        ],
        [
            2.0 * (b * d - a * c),
            2.0 * (c * d + a * b),
            (a * a + d * d - b * b - c * c) * qfac,
        ],
    ]
}

/// 若第 `col` 列在第 `row` 行上的分量是该列绝对值最大的分量, 返回该分量.
fn dominant_component(m: [[f64; 3]; 3], row: usize, col: usize) -> Option<f64> {
    let v = m[row][col];
    let dominant = (0..3).all(|r| r == row || m[r][col].abs() < v.abs());
    (dominant && v != 0.0).then_some(v)
}
