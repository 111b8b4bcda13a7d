//! 关节马达控制
//!
//! - [`calibrate`]: 构建后一次性按质量分布标定每个关节的基础力矩
//! - [`law`]: 单轴控制律（纯函数）
//! - [`JointMotorController`]: 每个物理步之前写入马达参数

mod calibrator;
pub mod law;
mod controller;

pub use calibrator::calibrate;
pub use controller::JointMotorController;
pub use law::{axis_command, centering_bias, AxisCommand};

use crate::axes::JointAxes;

/// 外部控制输入（每轴）
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ControlDirection {
    Negative,
    #[default]
    Neutral,
    Positive,
}

impl ControlDirection {
    #[inline]
    pub fn as_f32(self) -> f32 {
        match self {
            ControlDirection::Negative => -1.0,
            ControlDirection::Neutral => 0.0,
            ControlDirection::Positive => 1.0,
        }
    }

    /// 按符号取方向
    pub fn from_sign(value: f32) -> Self {
        if value > 0.0 {
            ControlDirection::Positive
        } else if value < 0.0 {
            ControlDirection::Negative
        } else {
            ControlDirection::Neutral
        }
    }
}

/// 关节运行时状态
///
/// `control` 是唯一对外可写的字段，其余由标定器和控制器维护。
/// 控制输入在同一线程、两个 tick 之间写入。
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RuntimeJointState {
    pub control: JointAxes<ControlDirection>,
    /// 当前角度 / 限位，未截断
    pub deviation: JointAxes<f32>,
    /// 控制输入减去回中偏置
    pub drive: JointAxes<f32>,
    pub base_torque: f32,
    /// 负值（base × min 倍率）
    pub min_torque: f32,
    pub max_torque: f32,
    /// 马达累计冲量（引擎支持时）
    pub lambda: Option<JointAxes<f32>>,
    pub calibrated: bool,
}

impl RuntimeJointState {
    pub fn new() -> Self {
        Self::default()
    }
}
