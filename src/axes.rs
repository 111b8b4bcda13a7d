//! 轴向映射表
//!
//! 三套轴命名：
//! - 关节轴 yaw / pitch / roll
//! - 部件轴 length / width / thickness
//! - 原始轴 x / y / z（部件局部坐标）
//!
//! 约束空间中 X 为扭转轴（部件长度方向），Y 为偏航轴（厚度方向），
//! Z = X × Y 为俯仰轴（宽度方向）。

use std::ops::{Index, IndexMut};

use bitflags::bitflags;
use glam::Vec3;

// ============================================================================
// 轴枚举
// ============================================================================

/// 关节旋转轴
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum JointAxis {
    Yaw,
    Pitch,
    Roll,
}

/// 部件尺寸轴
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PartAxis {
    Length,
    Width,
    Thickness,
}

/// 原始坐标轴
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RawAxis {
    X,
    Y,
    Z,
}

// ============================================================================
// 映射表
// ============================================================================

/// 一行轴映射
#[derive(Clone, Copy, Debug)]
pub struct AxisConfig {
    pub joint_axis: JointAxis,
    pub part_axis: PartAxis,
    /// 部件局部坐标中的方向
    pub raw_axis: RawAxis,
    /// 约束空间中的旋转轴（马达/限位/欧拉分解都用这个）
    pub constraint_axis: RawAxis,
    pub joint_label: &'static str,
    pub part_label: &'static str,
}

/// 全局唯一的轴映射表（编译期常量）
///
/// yaw 与 roll 在对称部件上会被镜像。
pub const AXIS_CONFIGS: [AxisConfig; 3] = [
    AxisConfig {
        joint_axis: JointAxis::Yaw,
        part_axis: PartAxis::Thickness,
        raw_axis: RawAxis::Z,
        constraint_axis: RawAxis::Y,
        joint_label: "Yaw",
        part_label: "Thickness",
    },
    AxisConfig {
        joint_axis: JointAxis::Pitch,
        part_axis: PartAxis::Width,
        raw_axis: RawAxis::X,
        constraint_axis: RawAxis::Z,
        joint_label: "Pitch",
        part_label: "Width",
    },
    AxisConfig {
        joint_axis: JointAxis::Roll,
        part_axis: PartAxis::Length,
        raw_axis: RawAxis::Y,
        constraint_axis: RawAxis::X,
        joint_label: "Roll",
        part_label: "Length",
    },
];

impl JointAxis {
    pub const ALL: [JointAxis; 3] = [JointAxis::Yaw, JointAxis::Pitch, JointAxis::Roll];

    #[inline]
    pub fn config(self) -> &'static AxisConfig {
        match self {
            JointAxis::Yaw => &AXIS_CONFIGS[0],
            JointAxis::Pitch => &AXIS_CONFIGS[1],
            JointAxis::Roll => &AXIS_CONFIGS[2],
        }
    }

    /// 对应的镜像标志位
    #[inline]
    pub fn mask(self) -> AxisMask {
        match self {
            JointAxis::Yaw => AxisMask::YAW,
            JointAxis::Pitch => AxisMask::PITCH,
            JointAxis::Roll => AxisMask::ROLL,
        }
    }
}

impl PartAxis {
    pub const ALL: [PartAxis; 3] = [PartAxis::Length, PartAxis::Width, PartAxis::Thickness];

    #[inline]
    pub fn config(self) -> &'static AxisConfig {
        match self {
            PartAxis::Thickness => &AXIS_CONFIGS[0],
            PartAxis::Width => &AXIS_CONFIGS[1],
            PartAxis::Length => &AXIS_CONFIGS[2],
        }
    }
}

impl RawAxis {
    pub const ALL: [RawAxis; 3] = [RawAxis::X, RawAxis::Y, RawAxis::Z];

    /// 以该原始轴为部件局部方向的映射行
    #[inline]
    pub fn config(self) -> &'static AxisConfig {
        match self {
            RawAxis::Z => &AXIS_CONFIGS[0],
            RawAxis::X => &AXIS_CONFIGS[1],
            RawAxis::Y => &AXIS_CONFIGS[2],
        }
    }

    #[inline]
    pub fn unit(self) -> Vec3 {
        match self {
            RawAxis::X => Vec3::X,
            RawAxis::Y => Vec3::Y,
            RawAxis::Z => Vec3::Z,
        }
    }

    #[inline]
    pub fn index(self) -> usize {
        match self {
            RawAxis::X => 0,
            RawAxis::Y => 1,
            RawAxis::Z => 2,
        }
    }

    #[inline]
    pub fn get(self, v: Vec3) -> f32 {
        v[self.index()]
    }

    #[inline]
    pub fn set(self, v: &mut Vec3, value: f32) {
        v[self.index()] = value;
    }
}

// ============================================================================
// 镜像标志
// ============================================================================

bitflags! {
    /// 每个关节轴一位
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct AxisMask: u8 {
        const YAW = 1 << 0;
        const PITCH = 1 << 1;
        const ROLL = 1 << 2;
    }
}

impl AxisMask {
    #[inline]
    pub fn has(self, axis: JointAxis) -> bool {
        self.contains(axis.mask())
    }
}

// ============================================================================
// 按轴索引的三元组
// ============================================================================

/// yaw / pitch / roll 三元组
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct JointAxes<T> {
    pub yaw: T,
    pub pitch: T,
    pub roll: T,
}

impl<T> JointAxes<T> {
    pub const fn new(yaw: T, pitch: T, roll: T) -> Self {
        Self { yaw, pitch, roll }
    }

    pub fn map<U>(self, mut f: impl FnMut(T) -> U) -> JointAxes<U> {
        JointAxes {
            yaw: f(self.yaw),
            pitch: f(self.pitch),
            roll: f(self.roll),
        }
    }
}

impl<T: Copy> JointAxes<T> {
    pub const fn splat(v: T) -> Self {
        Self { yaw: v, pitch: v, roll: v }
    }
}

impl<T> Index<JointAxis> for JointAxes<T> {
    type Output = T;

    fn index(&self, axis: JointAxis) -> &T {
        match axis {
            JointAxis::Yaw => &self.yaw,
            JointAxis::Pitch => &self.pitch,
            JointAxis::Roll => &self.roll,
        }
    }
}

impl<T> IndexMut<JointAxis> for JointAxes<T> {
    fn index_mut(&mut self, axis: JointAxis) -> &mut T {
        match axis {
            JointAxis::Yaw => &mut self.yaw,
            JointAxis::Pitch => &mut self.pitch,
            JointAxis::Roll => &mut self.roll,
        }
    }
}

/// length / width / thickness 三元组
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PartAxes<T> {
    pub l: T,
    pub w: T,
    pub t: T,
}

impl<T> PartAxes<T> {
    pub const fn new(l: T, w: T, t: T) -> Self {
        Self { l, w, t }
    }
}

impl<T: Copy> PartAxes<T> {
    pub const fn splat(v: T) -> Self {
        Self { l: v, w: v, t: v }
    }
}

impl PartAxes<f32> {
    /// 转换为部件局部坐标 (x = w, y = l, z = t)
    pub fn to_raw(&self) -> Vec3 {
        let mut v = Vec3::ZERO;
        for axis in PartAxis::ALL {
            axis.config().raw_axis.set(&mut v, self[axis]);
        }
        v
    }
}

impl<T> Index<PartAxis> for PartAxes<T> {
    type Output = T;

    fn index(&self, axis: PartAxis) -> &T {
        match axis {
            PartAxis::Length => &self.l,
            PartAxis::Width => &self.w,
            PartAxis::Thickness => &self.t,
        }
    }
}

impl<T> IndexMut<PartAxis> for PartAxes<T> {
    fn index_mut(&mut self, axis: PartAxis) -> &mut T {
        match axis {
            PartAxis::Length => &mut self.l,
            PartAxis::Width => &mut self.w,
            PartAxis::Thickness => &mut self.t,
        }
    }
}
