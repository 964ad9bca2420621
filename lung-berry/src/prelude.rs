//! 🫁欢迎光临🫁
//!
//! 涵盖了本 crate 一系列常用的功能.

pub use crate::{Idx2d, Idx3d};

pub use crate::data::{
    AxialOrder, Convention, LabelMap, NiftiHeaderAttr, RegionSlice, RegionSliceMut,
};

pub use crate::consts::region::{
    BACKGROUND, LEFT_LOWER_THIRD, LEFT_LUNG, LEFT_MIDDLE_THIRD, LEFT_UPPER_THIRD, LOWER_THIRD,
    MIDDLE_THIRD, RIGHT_LOWER_THIRD, RIGHT_LUNG, RIGHT_MIDDLE_THIRD, RIGHT_UPPER_THIRD,
    UPPER_THIRD, WHOLE_LUNG,
};
pub use crate::consts::{Side, Third};

pub use crate::split::{self, SplitConfig, SplitReport};
