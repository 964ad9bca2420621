#![warn(missing_docs)]

//! 核心库. 将胸部 CT 全肺标签拆分为左肺和右肺, 并可进一步把每侧按体积三等分为下、中、上三个肺区.
//!
//! 输入是已经分割好的 16-bit 打包标签体 ([`LabelMap`]), 低字节为区域, 高字节为组织类型.
//! 该 crate 只读写区域字节, 类型字节原样带回输出.
//!
//! # 注意
//!
//! 1. 该 crate 不负责从灰度 CT 分割肺, 也不做文件读写.
//! 2. 数组统一按 `(z, h, w)` 访问, 其中 `w` 为病人左右方向.
//!   `w` 增大朝向哪一侧由 [`Convention`] 给出, 默认为 LPS (朝向左侧).
//! 3. 三等分默认假定 `z = 0` 位于足侧, 否则请设置 [`AxialOrder`].
//! 4. 调用方传入不一致的数据 (如形状不符) 时程序直接 panic.
//!
//! # 流程
//!
//! ### 打包标签编解码 ✅
//!
//! 实现位于 `lung-berry/src/codec.rs`.
//!
//! ### 二维 4-邻接连通区域标记 ✅
//!
//! 区域按面积非增排序, 附带几何中心. 实现位于 `lung-berry/src/components.rs`.
//!
//! ### 三轮切片拆分 ✅
//!
//! 水平、冠状切片上的两目标分类器, 矢状切片上的多数投票.
//!
//! 实现位于 `lung-berry/src/split`.
//!
//! ### 按体积三等分 ✅
//!
//! 实现位于 `lung-berry/src/split/thirds.rs`.
//!
//! ### 从 nifti header 推断方向 ✅
//!
//! 实现位于 `lung-berry/src/data/orient.rs`.
//!
//! # 示例
//!
//! ```
//! use lung_berry::prelude::*;
//! use ndarray::Array3;
//!
//! let mut data = Array3::<u16>::zeros((4, 16, 32));
//! for z in 0..4 {
//!     for h in 4..12 {
//!         for w in (2..10).chain(22..30) {
//!             data[(z, h, w)] = WHOLE_LUNG as u16;
//!         }
//!     }
//! }
//! let input = LabelMap::new(data, [2.0, 0.8, 0.8]).unwrap();
//! let output = split::execute(&input, &SplitConfig::default());
//! assert_eq!(output.region_at((0, 8, 5)), RIGHT_LUNG);
//! assert_eq!(output.region_at((0, 8, 25)), LEFT_LUNG);
//! ```

/// 二维索引, 同时也可一定程度上用作非负整数向量.
pub type Idx2d = (usize, usize);

/// 三维索引, 同时也可一定程度上用作非负整数向量.
pub type Idx3d = (usize, usize, usize);

/// 高精度二维坐标, 如几何中心.
pub type Idx2dF = (f64, f64);

type Predicate = fn(u8) -> bool;

type Area2d = Vec<Idx2d>;
type Areas2d = Vec<Area2d>;

/// 3D 标签体与二维切片的基础数据结构.
mod data;

pub use data::{
    AxialOrder, Convention, InitLabelMapError, LabelMap, NiftiHeaderAttr, ParseConventionError,
    RegionSlice, RegionSliceMut,
};

pub mod codec;

pub mod components;

pub mod consts;

pub mod split;

pub mod prelude;
