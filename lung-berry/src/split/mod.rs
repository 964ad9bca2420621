//! 左右肺拆分流程.
//!
//! 对处理掩码依次执行三轮切片处理:
//!
//! 1. 水平 (axial) 切片: 两目标分类器, 在两肺明显分离的切片上直接判定左右;
//! 2. 冠状 (coronal) 切片: 同上, 提供另一方向上的独立证据;
//! 3. 矢状 (sagittal) 切片: 多数投票协调器. 矢状面上两肺常常连成一个区域,
//!    因此只能把前两轮已经判定的侧别在区域内传播开.
//!
//! 三轮之后仍为 [`WHOLE_LUNG`] 的体素说明没有任何一轮得到足够证据,
//! 调用方可以据此判断拆分失败. 之后可选地对每侧按体积三等分.

mod classify;
mod error;
mod thirds;
mod vote;


pub use classify::two_object_cut;
pub use error::InitConfigError;
pub use thirds::{split_thirds, ThirdsSummary};
pub use vote::majority_vote;

use crate::codec;
use crate::consts::{region::*, Side};
use crate::data::{AxialOrder, Convention, LabelMap, NiftiHeaderAttr, RegionSlice, RegionSliceMut};
use ndarray::{Array3, ArrayView3, ArrayViewMut3, Axis, Zip};

/// 水平切片和冠状切片中, 左右轴都是切片的第 1 维 (即体数据的 `w` 轴).
const LR_AXIS: usize = 1;

/// 拆分参数.
///
/// 该结构是只读的. 若要修改参数, 请使用 `with_*` 方法获得新的实例.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SplitConfig {
    split_thirds: bool,
    convention: Convention,
    size_threshold: f64,
    axial_order: AxialOrder,
}

impl Default for SplitConfig {
    #[inline]
    fn default() -> Self {
        Self {
            split_thirds: false,
            convention: Convention::Lps,
            size_threshold: Self::DEFAULT_SIZE_THRESHOLD,
            axial_order: AxialOrder::InferiorFirst,
        }
    }
}

impl SplitConfig {
    /// 默认面积阈值: 单个连通区域至少占切片面积的 5%.
    pub const DEFAULT_SIZE_THRESHOLD: f64 = 0.05;

    /// 构建拆分参数. `size_threshold` 必须位于 `(0, 1)` 之间.
    pub fn new(
        split_thirds: bool,
        convention: Convention,
        size_threshold: f64,
    ) -> Result<Self, InitConfigError> {
        Self::default()
            .with_split_thirds(split_thirds)
            .with_convention(convention)
            .with_size_threshold(size_threshold)
    }

    /// 根据 `label` 的 header 推断左右方向约定和切片顺序, 其余参数取默认值.
    /// header 不含可用的方向信息时退回默认值.
    pub fn detect(label: &LabelMap) -> Self {
        let mut config = Self::default();
        match label.convention() {
            Some(c) => config.convention = c,
            None => log::warn!("header 不含可用的左右方向信息, 使用默认约定 `{}`", config.convention),
        }
        match label.axial_order() {
            Some(o) => config.axial_order = o,
            None => log::warn!("header 不含可用的头足方向信息, 假定 z = 0 位于足侧"),
        }
        log::debug!("从 header 推断拆分参数: {config:?}");
        config
    }

    /// 是否执行三等分.
    #[inline]
    pub fn with_split_thirds(mut self, split_thirds: bool) -> Self {
        self.split_thirds = split_thirds;
        self
    }

    /// 设置左右方向约定.
    #[inline]
    pub fn with_convention(mut self, convention: Convention) -> Self {
        self.convention = convention;
        self
    }

    /// 设置 `z = 0` 位于足侧还是头侧.
    #[inline]
    pub fn with_axial_order(mut self, axial_order: AxialOrder) -> Self {
        self.axial_order = axial_order;
        self
    }

    /// 设置两目标分类器的面积阈值. 阈值必须位于 `(0, 1)` 之间.
    pub fn with_size_threshold(mut self, size_threshold: f64) -> Result<Self, InitConfigError> {
        self.size_threshold = size_threshold;
        self.validate().map(|_| self)
    }

    /// 检查参数是否合法. 主要用于反序列化得到的实例.
    pub fn validate(&self) -> Result<(), InitConfigError> {
        let t = self.size_threshold;
        if !t.is_finite() {
            Err(InitConfigError::ThresholdNotFinite)
        } else if t <= 0.0 || t >= 1.0 {
            Err(InitConfigError::ThresholdOutOfRange(t))
        } else {
            Ok(())
        }
    }

    /// 是否执行三等分.
    #[inline]
    pub fn split_thirds(&self) -> bool {
        self.split_thirds
    }

    /// 左右方向约定.
    #[inline]
    pub fn convention(&self) -> Convention {
        self.convention
    }

    /// 两目标分类器的面积阈值.
    #[inline]
    pub fn size_threshold(&self) -> f64 {
        self.size_threshold
    }

    /// `z = 0` 位于足侧还是头侧.
    #[inline]
    pub fn axial_order(&self) -> AxialOrder {
        self.axial_order
    }
}

/// 一次拆分的运行统计.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct SplitReport {
    /// 两目标分类器成功写入的水平切片数.
    pub axial_slices: usize,

    /// 两目标分类器成功写入的冠状切片数.
    pub coronal_slices: usize,

    /// 矢状切片上被多数投票改写的连通区域数.
    pub sagittal_components: usize,

    /// 最终的右肺体素数 (三等分时为右肺三个分区之和).
    pub right_voxels: usize,

    /// 最终的左肺体素数 (三等分时为左肺三个分区之和).
    pub left_voxels: usize,

    /// 处理掩码中仍为全肺的体素数.
    pub unassigned_voxels: usize,

    /// 三等分统计. 未执行三等分时为 `None`.
    pub thirds: Option<ThirdsSummary>,
}

impl SplitReport {
    /// 处理掩码中的体素是否都已判定侧别?
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.unassigned_voxels == 0
    }
}

/// 拆分 `input` 中的全肺为左右肺, 按 `config` 可选地继续三等分.
///
/// 返回与 `input` 几何信息一致的新标签体. 详见 [`execute_with_report`].
#[inline]
pub fn execute(input: &LabelMap, config: &SplitConfig) -> LabelMap {
    execute_with_report(input, config).0
}

/// 与 [`execute`] 相同, 同时返回运行统计.
///
/// # 行为
///
/// 1. 处理掩码 (全肺和三个预标注带) 以外的区域字节原样保留,
///    所有体素的类型字节原样保留.
/// 2. 处理掩码为空时跳过左右拆分. 若不执行三等分, 输出与输入完全相同.
/// 3. 三等分作用于拆分后所有左肺、右肺体素, 包括输入中已有的左右肺标签.
///
/// # 注意
///
/// `config` 不合法 (见 [`SplitConfig::validate`]) 说明调用方有 bug, 程序 panic.
pub fn execute_with_report(input: &LabelMap, config: &SplitConfig) -> (LabelMap, SplitReport) {
    assert!(config.validate().is_ok(), "拆分参数不合法: {config:?}");

    let (region_in, types) = codec::unpack(input.data());
    let mask = region_in.mapv(|p| if is_processing(p) { WHOLE_LUNG } else { BACKGROUND });
    let mut region = region_in.clone();
    let mut report = SplitReport::default();

    if mask.iter().any(|&m| is_whole_lung(m)) {
        split_sides(region_in.view(), mask.view(), &mut region, config, &mut report);
    } else {
        log::debug!("处理掩码为空, 跳过左右拆分");
    }

    report.unassigned_voxels = Zip::from(&region)
        .and(&mask)
        .fold(0, |acc, &r, &m| acc + usize::from(is_whole_lung(m) && is_whole_lung(r)));

    if config.split_thirds() {
        let summary = split_thirds(&mut region, config.axial_order());
        report.right_voxels = summary.total(Side::Right);
        report.left_voxels = summary.total(Side::Left);
        report.thirds = Some(summary);
    } else {
        report.right_voxels = region.iter().filter(|&&p| is_right_lung(p)).count();
        report.left_voxels = region.iter().filter(|&&p| is_left_lung(p)).count();
    }

    let ml = |n: usize| n as f64 * input.voxel() / 1000.0;
    log::info!(
        "肺拆分完成: 右肺 {} 体素 ({:.1} ml), 左肺 {} 体素 ({:.1} ml), 未判定 {} 体素",
        report.right_voxels,
        ml(report.right_voxels),
        report.left_voxels,
        ml(report.left_voxels),
        report.unassigned_voxels
    );
    if !report.is_complete() {
        log::warn!("{} 个全肺体素没有得到足够的左右证据", report.unassigned_voxels);
    }

    (assemble(region.view(), types.view(), input), report)
}

/// 合并区域字节与类型字节, 并以 `geometry` 的几何信息包装.
///
/// 三者形状不一致说明调用方有 bug, 程序 panic.
pub fn assemble(region: ArrayView3<u8>, types: ArrayView3<u8>, geometry: &LabelMap) -> LabelMap {
    assert_eq!(region.dim(), geometry.shape(), "区域字节与几何信息形状不一致");
    geometry.with_geometry_of(codec::pack(region, types))
}

/// 三轮切片处理, 结果写入 `region`.
fn split_sides(
    region_in: ArrayView3<u8>,
    mask: ArrayView3<u8>,
    region: &mut Array3<u8>,
    config: &SplitConfig,
    report: &mut SplitReport,
) {
    Zip::from(&mut *region).and(mask).for_each(|r, &m| {
        if is_whole_lung(m) {
            *r = WHOLE_LUNG;
        }
    });

    report.axial_slices = two_object_pass(mask, region.view_mut(), Axis(0), config);
    log::debug!("水平切片: {} 个切片完成左右判定", report.axial_slices);

    report.coronal_slices = two_object_pass(mask, region.view_mut(), Axis(1), config);
    log::debug!("冠状切片: {} 个切片完成左右判定", report.coronal_slices);

    report.sagittal_components = vote_pass(mask, region.view_mut(), Axis(2));
    log::debug!("矢状切片: {} 个区域经投票改写", report.sagittal_components);

    Zip::from(region)
        .and(region_in)
        .and(mask)
        .for_each(|r, &orig, &m| {
            if !is_whole_lung(m) {
                *r = orig;
            }
        });
}

cfg_if::cfg_if! {
    if #[cfg(feature = "rayon")] {
        use ndarray::parallel::prelude::*;

        /// 沿 `axis` 对每个切片并行运行两目标分类器. 返回写入的切片数.
        fn two_object_pass(
            mask: ArrayView3<u8>,
            mut region: ArrayViewMut3<u8>,
            axis: Axis,
            config: &SplitConfig,
        ) -> usize {
            region
                .axis_iter_mut(axis)
                .into_par_iter()
                .zip(mask.axis_iter(axis).into_par_iter())
                .map(|(o, m)| {
                    two_object_cut(
                        &RegionSlice::new(m),
                        &mut RegionSliceMut::new(o),
                        LR_AXIS,
                        config.convention(),
                        config.size_threshold(),
                    )
                })
                .filter(|fired| *fired)
                .count()
        }

        /// 沿 `axis` 对每个切片并行运行多数投票. 返回改写的区域总数.
        fn vote_pass(mask: ArrayView3<u8>, mut region: ArrayViewMut3<u8>, axis: Axis) -> usize {
            region
                .axis_iter_mut(axis)
                .into_par_iter()
                .zip(mask.axis_iter(axis).into_par_iter())
                .map(|(o, m)| majority_vote(&RegionSlice::new(m), &mut RegionSliceMut::new(o)))
                .sum()
        }
    } else {
        /// 沿 `axis` 对每个切片运行两目标分类器. 返回写入的切片数.
        fn two_object_pass(
            mask: ArrayView3<u8>,
            mut region: ArrayViewMut3<u8>,
            axis: Axis,
            config: &SplitConfig,
        ) -> usize {
            region
                .axis_iter_mut(axis)
                .zip(mask.axis_iter(axis))
                .map(|(o, m)| {
                    two_object_cut(
                        &RegionSlice::new(m),
                        &mut RegionSliceMut::new(o),
                        LR_AXIS,
                        config.convention(),
                        config.size_threshold(),
                    )
                })
                .filter(|fired| *fired)
                .count()
        }

        /// 沿 `axis` 对每个切片运行多数投票. 返回改写的区域总数.
        fn vote_pass(mask: ArrayView3<u8>, mut region: ArrayViewMut3<u8>, axis: Axis) -> usize {
            region
                .axis_iter_mut(axis)
                .zip(mask.axis_iter(axis))
                .map(|(o, m)| majority_vote(&RegionSlice::new(m), &mut RegionSliceMut::new(o)))
                .sum()
        }
    }
}
