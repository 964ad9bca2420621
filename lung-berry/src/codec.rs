//! 16-bit 打包标签的编解码.
//!
//! 低字节是区域 (region), 高字节是组织类型 (type). 拆分算法只读写区域字节,
//! 类型字节对本 crate 不透明, 原样带回输出.

use ndarray::{Array3, ArrayView3, Zip};

/// 将打包标签拆为 `(区域, 类型)`.
#[inline]
pub const fn split(code: u16) -> (u8, u8) {
    (region_of(code), type_of(code))
}

/// 将 `(区域, 类型)` 合并为打包标签.
#[inline]
pub const fn combine(region: u8, ty: u8) -> u16 {
    region as u16 | (ty as u16) << 8
}

/// 打包标签的区域字节.
#[inline]
pub const fn region_of(code: u16) -> u8 {
    (code & 0xFF) as u8
}

/// 打包标签的类型字节.
#[inline]
pub const fn type_of(code: u16) -> u8 {
    (code >> 8) as u8
}

/// 将整个打包体拆为区域字节体和类型字节体, 两者形状与输入一致.
pub fn unpack(codes: ArrayView3<u16>) -> (Array3<u8>, Array3<u8>) {
    (codes.mapv(region_of), codes.mapv(type_of))
}

/// 逐体素合并区域字节体和类型字节体.
///
/// 两者形状不一致说明调用方有 bug, 程序 panic.
pub fn pack(region: ArrayView3<u8>, types: ArrayView3<u8>) -> Array3<u16> {
    assert_eq!(region.dim(), types.dim(), "区域字节与类型字节形状不一致");
    Zip::from(&region)
        .and(&types)
        .map_collect(|&r, &t| combine(r, t))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    #[test]
    fn test_split_combine() {
        assert_eq!(split(0x7F03), (0x03, 0x7F));
        assert_eq!(split(0x0001), (0x01, 0x00));
        assert_eq!(combine(0x02, 0xFF), 0xFF02);

        for code in [0u16, 1, 0x00FF, 0x0100, 0x7F16, u16::MAX] {
            let (r, t) = split(code);
            assert_eq!(combine(r, t), code);
        }
    }

    #[test]
    fn test_unpack_pack_volume() {
        let codes = Array3::from_shape_fn((2, 3, 4), |(z, h, w)| {
            combine((z + h + w) as u8, (z * 16 + w) as u8)
        });
        let (region, types) = unpack(codes.view());
        assert_eq!(region[(1, 2, 3)], 6);
        assert_eq!(types[(1, 2, 3)], 19);
        assert_eq!(pack(region.view(), types.view()), codes);
    }

    #[test]
    #[should_panic]
    fn test_pack_shape_mismatch() {
        let region = Array3::<u8>::zeros((2, 2, 2));
        let types = Array3::<u8>::zeros((2, 2, 3));
        pack(region.view(), types.view());
    }
}
