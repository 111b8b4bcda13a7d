//! 关节蓝图

use glam::Vec3;

use crate::axes::{AxisMask, JointAxes, JointAxis, PartAxes, PartAxis};

use super::settings::JointOverrides;

/// 锚点倍率：-1 / 0 / 1，乘以部件在该轴上的半尺寸
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AnchorSide {
    Min,
    #[default]
    Center,
    Max,
}

impl AnchorSide {
    #[inline]
    pub fn factor(self) -> f32 {
        match self {
            AnchorSide::Min => -1.0,
            AnchorSide::Center => 0.0,
            AnchorSide::Max => 1.0,
        }
    }

    #[inline]
    pub fn flipped(self) -> Self {
        match self {
            AnchorSide::Min => AnchorSide::Max,
            AnchorSide::Center => AnchorSide::Center,
            AnchorSide::Max => AnchorSide::Min,
        }
    }
}

/// 锚点：固定偏移 + 按半尺寸缩放的倍率
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AnchorSpec {
    pub offset: PartAxes<f32>,
    pub from: PartAxes<AnchorSide>,
}

impl AnchorSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn offset(mut self, axis: PartAxis, value: f32) -> Self {
        self.offset[axis] = value;
        self
    }

    pub fn from(mut self, axis: PartAxis, side: AnchorSide) -> Self {
        self.from[axis] = side;
        self
    }

    /// 解析为部件局部坐标
    ///
    /// 每轴：offset + from × ½ × 全尺寸（= from × 半尺寸）
    pub fn bake(&self, half_extents: &PartAxes<f32>) -> Vec3 {
        let mut baked = Vec3::ZERO;
        for axis in PartAxis::ALL {
            let extent = half_extents[axis] * 2.0;
            let value = self.offset[axis] + self.from[axis].factor() * 0.5 * extent;
            axis.config().raw_axis.set(&mut baked, value);
        }
        baked
    }

    /// 宽度方向取反（对称部件的右侧）
    pub fn mirror_width(&mut self) {
        self.offset.w = -self.offset.w;
        self.from.w = self.from.w.flipped();
    }
}

/// 关节蓝图
#[derive(Clone, Debug, Default)]
pub struct JointSpec {
    /// 父部件局部空间锚点
    pub parent_anchor: AnchorSpec,
    /// 子部件局部空间锚点
    pub child_anchor: AnchorSpec,
    /// 静止朝向（角度制，相对父部件）
    pub axis: JointAxes<f32>,
    /// 控制方向取反的轴
    pub mirror: AxisMask,
    /// 每轴限位（角度制），None 或 0 表示锁死
    pub limits: JointAxes<Option<f32>>,
    pub overrides: JointOverrides,
}

impl JointSpec {
    pub fn new(parent_anchor: AnchorSpec, child_anchor: AnchorSpec) -> Self {
        Self {
            parent_anchor,
            child_anchor,
            ..Default::default()
        }
    }

    pub fn axis(mut self, yaw: f32, pitch: f32, roll: f32) -> Self {
        self.axis = JointAxes::new(yaw, pitch, roll);
        self
    }

    pub fn mirror(mut self, mirror: AxisMask) -> Self {
        self.mirror = mirror;
        self
    }

    pub fn limit(mut self, axis: JointAxis, degrees: f32) -> Self {
        self.limits[axis] = Some(degrees);
        self
    }

    pub fn overrides(mut self, overrides: JointOverrides) -> Self {
        self.overrides = overrides;
        self
    }
}
