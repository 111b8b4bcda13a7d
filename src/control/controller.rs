//! 关节马达控制器
//!
//! 每个物理步之前调用一次 [`JointMotorController::tick`]，按骨架索引顺序访问所有
//! 至少有一个未锁死轴的关节：
//! 1. 读取约束空间相对旋转，按 YZX 分解为 yaw / pitch / roll
//! 2. deviation = 角度 / 限位
//! 3. 控制输入（镜像轴取反）减去回中偏置得到 drive
//! 4. 写入力矩上下限，累加目标角速度
//! 5. 约束休眠时先唤醒，再一次性写入三轴目标角速度

use glam::{EulerRot, Vec3};

use crate::axes::{JointAxes, JointAxis};
use crate::error::{Result, RigError};
use crate::physics::config::get_config;
use crate::physics::{PhysicsBackend, SkeletonBinding};
use crate::skeleton::Skeleton;

use super::law::axis_command;
use super::RuntimeJointState;

/// 关节马达控制器
#[derive(Debug, Default)]
pub struct JointMotorController {
    tick_count: u64,
}

impl JointMotorController {
    pub fn new() -> Self {
        Self::default()
    }

    /// 已执行的 tick 数
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// 执行一次控制
    pub fn tick<B: PhysicsBackend>(
        &mut self,
        skeleton: &Skeleton,
        binding: &SkeletonBinding<B>,
        states: &mut [Option<RuntimeJointState>],
        engine: &mut B,
    ) -> Result<()> {
        let debug_log = get_config().debug_log;

        for part in skeleton.parts() {
            let Some(joint) = &part.joint else {
                continue;
            };
            if !joint.has_motion() {
                continue;
            }

            let state = states
                .get_mut(part.index)
                .and_then(Option::as_mut)
                .ok_or_else(|| RigError::EngineDesync(format!("no runtime state for '{}'", part.name)))?;
            let constraint = binding
                .constraint(part.index)
                .ok_or_else(|| RigError::EngineDesync(format!("no constraint bound for '{}'", part.name)))?;

            // 约束空间：Y = yaw，Z = pitch，X = roll
            let rotation = engine.constraint_rotation(constraint)?;
            let (y, z, x) = rotation.to_euler(EulerRot::YZX);
            let angles = Vec3::new(x, y, z);

            if let Some(lambda) = engine.motor_lambda(constraint)? {
                state.lambda = Some(JointAxes::new(
                    JointAxis::Yaw.config().constraint_axis.get(lambda),
                    JointAxis::Pitch.config().constraint_axis.get(lambda),
                    JointAxis::Roll.config().constraint_axis.get(lambda),
                ));
            }

            let mut velocity = Vec3::ZERO;
            for axis in joint.unlocked_axes() {
                let Some(limit) = joint.limit_radians(axis) else {
                    continue;
                };
                let constraint_axis = axis.config().constraint_axis;

                let deviation = constraint_axis.get(angles) / limit;
                state.deviation[axis] = deviation;

                let mut direction = state.control[axis].as_f32();
                if joint.mirror.has(axis) {
                    direction = -direction;
                }

                let command = axis_command(
                    direction,
                    deviation,
                    &joint.settings,
                    state.min_torque,
                    state.max_torque,
                );
                state.drive[axis] = command.drive;

                engine.set_motor_torque_limits(
                    constraint,
                    constraint_axis,
                    command.min_torque_limit,
                    command.max_torque_limit,
                )?;
                constraint_axis.set(&mut velocity, command.target_velocity);
            }

            if !engine.is_constraint_active(constraint)? {
                engine.activate_constraint(constraint)?;
            }
            engine.set_target_angular_velocity(constraint, velocity)?;

            if debug_log {
                log::debug!(
                    "[Motor] '{}': deviation=({:.3},{:.3},{:.3}), drive=({:.3},{:.3},{:.3})",
                    part.name,
                    state.deviation.yaw,
                    state.deviation.pitch,
                    state.deviation.roll,
                    state.drive.yaw,
                    state.drive.pitch,
                    state.drive.roll
                );
            }
        }

        self.tick_count += 1;
        Ok(())
    }
}
