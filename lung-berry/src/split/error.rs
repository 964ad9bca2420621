//! 配置错误.

use std::fmt::{Display, Formatter};

/// 创建 [`super::SplitConfig`] 错误.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum InitConfigError {
    /// 面积阈值必须位于 `(0, 1)` 之间. 参数为实际传入的值.
    ThresholdOutOfRange(f64),

    /// 面积阈值不是有限数.
    ThresholdNotFinite,
}

impl Display for InitConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ThresholdOutOfRange(t) => write!(f, "面积阈值 {t} 不在 (0, 1) 之间"),
            Self::ThresholdNotFinite => f.write_str("面积阈值不是有限数"),
        }
    }
}

impl std::error::Error for InitConfigError {}
