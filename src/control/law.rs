//! 单轴控制律
//!
//! drive = 控制方向 - 回中偏置，偏置随偏离比例在 `start` 之后非线性增长。
//! 力矩上下限在下限比例（floor）与满力矩之间按 drive 插值。

use crate::blueprint::{CenteringSettings, JointSettings};
use crate::math::{lerp, unlerp};

/// 单轴输出
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AxisCommand {
    pub drive: f32,
    pub min_torque_limit: f32,
    pub max_torque_limit: f32,
    /// 约束空间目标角速度 (rad/s)
    pub target_velocity: f32,
}

/// 回中偏置，符号与 deviation 相同
///
/// |deviation| ≤ start 时为 0，|deviation| = 1 时达到 fraction，之后不再增长。
pub fn centering_bias(deviation: f32, centering: &CenteringSettings) -> f32 {
    if deviation == 0.0 || !deviation.is_finite() {
        return 0.0;
    }
    let magnitude = deviation.abs();
    let t = if centering.start >= 1.0 {
        if magnitude >= 1.0 {
            1.0
        } else {
            0.0
        }
    } else {
        unlerp(centering.start, 1.0, magnitude, 0.0).clamp(0.0, 1.0)
    };
    if t <= 0.0 {
        return 0.0;
    }
    let bias = t.powf(centering.exponent) * centering.fraction;
    bias.copysign(deviation)
}

/// 计算单轴马达参数
///
/// `direction` 为已按镜像标志翻转后的控制输入，`min_torque` 为负值。
pub fn axis_command(
    direction: f32,
    deviation: f32,
    settings: &JointSettings,
    min_torque: f32,
    max_torque: f32,
) -> AxisCommand {
    let drive = direction - centering_bias(deviation, &settings.centering);

    let max_floor = max_torque * settings.torque.floor;
    let min_floor = min_torque * settings.torque.floor;

    let mut command = AxisCommand {
        drive,
        min_torque_limit: min_floor,
        max_torque_limit: max_floor,
        target_velocity: 0.0,
    };
    if drive > 0.0 {
        command.max_torque_limit = lerp(max_floor, max_torque, drive);
        command.target_velocity = settings.max_velocity;
    } else if drive < 0.0 {
        command.min_torque_limit = lerp(min_floor, min_torque, -drive);
        command.target_velocity = -settings.max_velocity;
    }
    command
}
