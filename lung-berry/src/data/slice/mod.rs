//! 二维区域字节切片的借用视图.
//!
//! 三个方向 (水平, 冠状, 矢状) 的切片都用同一组类型表示.

mod core;

pub use core::{RegionSlice, RegionSliceMut};
