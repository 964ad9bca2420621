//! 通用常量.

/// 区域字节 (16-bit 打包标签的低 8 位) 的取值与判定.
///
/// 未在此列出的取值会被原样透传, 不参与任何判定.
pub mod region {
    /// 背景.
    pub const BACKGROUND: u8 = 0;

    /// 全肺, 即待拆分的输入前景.
    pub const WHOLE_LUNG: u8 = 1;

    /// 右肺.
    pub const RIGHT_LUNG: u8 = 2;

    /// 左肺.
    pub const LEFT_LUNG: u8 = 3;

    /// 左肺上三分之一.
    pub const LEFT_UPPER_THIRD: u8 = 9;

    /// 左肺中三分之一.
    pub const LEFT_MIDDLE_THIRD: u8 = 10;

    /// 左肺下三分之一.
    pub const LEFT_LOWER_THIRD: u8 = 11;

    /// 右肺上三分之一.
    pub const RIGHT_UPPER_THIRD: u8 = 12;

    /// 右肺中三分之一.
    pub const RIGHT_MIDDLE_THIRD: u8 = 13;

    /// 右肺下三分之一.
    pub const RIGHT_LOWER_THIRD: u8 = 14;

    /// 输入中预先标注的上三分之一 (不分左右), 按全肺处理.
    pub const UPPER_THIRD: u8 = 20;

    /// 输入中预先标注的中三分之一 (不分左右), 按全肺处理.
    pub const MIDDLE_THIRD: u8 = 21;

    /// 输入中预先标注的下三分之一 (不分左右), 按全肺处理.
    pub const LOWER_THIRD: u8 = 22;

    /// 像素是否是背景?
    #[inline]
    pub const fn is_background(p: u8) -> bool {
        matches!(p, BACKGROUND)
    }

    /// 像素是否是全肺?
    #[inline]
    pub const fn is_whole_lung(p: u8) -> bool {
        matches!(p, WHOLE_LUNG)
    }

    /// 像素是否属于处理掩码 (全肺或预标注的三等分带)?
    #[inline]
    pub const fn is_processing(p: u8) -> bool {
        matches!(p, WHOLE_LUNG | UPPER_THIRD | MIDDLE_THIRD | LOWER_THIRD)
    }

    /// 像素是否是右肺?
    #[inline]
    pub const fn is_right_lung(p: u8) -> bool {
        matches!(p, RIGHT_LUNG)
    }

    /// 像素是否是左肺?
    #[inline]
    pub const fn is_left_lung(p: u8) -> bool {
        matches!(p, LEFT_LUNG)
    }

    /// 像素是否已被判定为左肺或右肺?
    #[inline]
    pub const fn is_side(p: u8) -> bool {
        matches!(p, RIGHT_LUNG | LEFT_LUNG)
    }

    /// 像素是否是左肺的某个三等分区?
    #[inline]
    pub const fn is_left_third(p: u8) -> bool {
        matches!(p, LEFT_UPPER_THIRD | LEFT_MIDDLE_THIRD | LEFT_LOWER_THIRD)
    }

    /// 像素是否是右肺的某个三等分区?
    #[inline]
    pub const fn is_right_third(p: u8) -> bool {
        matches!(p, RIGHT_UPPER_THIRD | RIGHT_MIDDLE_THIRD | RIGHT_LOWER_THIRD)
    }
}

use region::*;

/// 肺的左右侧.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Side {
    /// 右肺.
    Right,

    /// 左肺.
    Left,
}

impl Side {
    /// 两侧, 按 (右, 左) 排列.
    pub const BOTH: [Side; 2] = [Side::Right, Side::Left];

    /// 该侧对应的区域字节.
    #[inline]
    pub const fn label(&self) -> u8 {
        match self {
            Self::Right => RIGHT_LUNG,
            Self::Left => LEFT_LUNG,
        }
    }

    /// 另一侧.
    #[inline]
    pub const fn opposite(&self) -> Self {
        match self {
            Self::Right => Self::Left,
            Self::Left => Self::Right,
        }
    }

    /// 由区域字节反查侧别. 非 `RIGHT_LUNG` / `LEFT_LUNG` 时返回 `None`.
    #[inline]
    pub const fn from_label(p: u8) -> Option<Self> {
        match p {
            RIGHT_LUNG => Some(Self::Right),
            LEFT_LUNG => Some(Self::Left),
            _ => None,
        }
    }

    /// 该侧某个三等分区的区域字节.
    #[inline]
    pub const fn third_label(&self, third: Third) -> u8 {
        match (self, third) {
            (Self::Right, Third::Lower) => RIGHT_LOWER_THIRD,
            (Self::Right, Third::Middle) => RIGHT_MIDDLE_THIRD,
            (Self::Right, Third::Upper) => RIGHT_UPPER_THIRD,
            (Self::Left, Third::Lower) => LEFT_LOWER_THIRD,
            (Self::Left, Third::Middle) => LEFT_MIDDLE_THIRD,
            (Self::Left, Third::Upper) => LEFT_UPPER_THIRD,
        }
    }

    /// 在 [`Side::BOTH`] 中的下标.
    #[inline]
    pub(crate) const fn index(&self) -> usize {
        match self {
            Self::Right => 0,
            Self::Left => 1,
        }
    }
}

/// 单侧肺沿轴向的三等分区.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Third {
    /// 下 (靠足侧).
    Lower,

    /// 中.
    Middle,

    /// 上 (靠头侧).
    Upper,
}

impl Third {
    /// 按 (下, 中, 上) 排列.
    pub const ALL: [Third; 3] = [Third::Lower, Third::Middle, Third::Upper];

    /// 根据 **本切片之前** 已累计的体素数 `consumed` 和该侧总体素数 `total`
    /// 决定本切片所属的三等分区.
    ///
    /// 使用严格小于比较, 以整数运算避免浮点误差.
    #[inline]
    pub const fn classify(consumed: usize, total: usize) -> Self {
        if consumed * 3 < total {
            Self::Lower
        } else if consumed * 3 < total * 2 {
            Self::Middle
        } else {
            Self::Upper
        }
    }

    /// 在 [`Third::ALL`] 中的下标.
    #[inline]
    pub(crate) const fn index(&self) -> usize {
        match self {
            Self::Lower => 0,
            Self::Middle => 1,
            Self::Upper => 2,
        }
    }
}
