//! 物理引擎接口
//!
//! 骨架只依赖 [`PhysicsBackend`] 这一小组调用：
//! - 创建刚体 / 约束
//! - 每帧读取约束相对旋转
//! - 每帧写入马达力矩上下限与目标角速度
//! - 唤醒休眠的约束
//!
//! 默认实现为 [`RapierWorld`]。

pub mod binding;
pub mod config;
mod rapier_world;

#[cfg(test)]
pub(crate) mod mock;

pub use binding::SkeletonBinding;
pub use config::{get_config, reset_config, set_config, PhysicsConfig};
pub use rapier_world::RapierWorld;

use std::f32::consts::PI;
use std::fmt::Debug;

use glam::{Quat, Vec3};

use crate::axes::{JointAxes, PartAxes, RawAxis};
use crate::blueprint::{Material, PartShape};
use crate::error::Result;

// ============================================================================
// 描述符
// ============================================================================

/// 碰撞形状（创建刚体时一次性分派）
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ShapeDesc {
    Sphere { radius: f32 },
    /// 沿局部 Y 轴
    Cylinder { half_height: f32, radius: f32 },
    /// 沿局部 Y 轴，half_height 为圆柱段的一半
    Capsule { half_height: f32, radius: f32 },
    Box { half_extents: Vec3 },
}

impl ShapeDesc {
    pub fn from_part(shape: PartShape, half_extents: &PartAxes<f32>) -> Self {
        match shape {
            PartShape::Sphere => ShapeDesc::Sphere {
                radius: half_extents.l,
            },
            PartShape::Cylinder => ShapeDesc::Cylinder {
                half_height: half_extents.l,
                radius: half_extents.t,
            },
            PartShape::Capsule => ShapeDesc::Capsule {
                half_height: half_extents.l,
                radius: half_extents.t,
            },
            PartShape::Box => ShapeDesc::Box {
                half_extents: half_extents.to_raw(),
            },
        }
    }

    pub fn volume(&self) -> f32 {
        match *self {
            ShapeDesc::Sphere { radius } => 4.0 / 3.0 * PI * radius.powi(3),
            ShapeDesc::Cylinder { half_height, radius } => PI * radius * radius * half_height * 2.0,
            ShapeDesc::Capsule { half_height, radius } => {
                PI * radius * radius * half_height * 2.0 + 4.0 / 3.0 * PI * radius.powi(3)
            }
            ShapeDesc::Box { half_extents } => half_extents.x * half_extents.y * half_extents.z * 8.0,
        }
    }
}

/// 刚体创建参数
#[derive(Clone, Debug)]
pub struct BodyDesc {
    pub name: String,
    pub shape: ShapeDesc,
    /// 密度为 0 时创建静态刚体
    pub material: Material,
    pub position: Vec3,
    pub rotation: Quat,
}

/// 约束创建参数
///
/// 约束空间：X = 扭转轴，Y = 偏航轴，Z = X × Y。
/// 父侧轴在父部件局部空间给出，子侧轴固定为子部件的 Y / Z。
#[derive(Clone, Debug)]
pub struct ConstraintDesc {
    pub name: String,
    pub parent_anchor: Vec3,
    pub child_anchor: Vec3,
    pub parent_twist_axis: Vec3,
    pub parent_yaw_axis: Vec3,
    pub child_twist_axis: Vec3,
    pub child_yaw_axis: Vec3,
    /// 每轴对称限位（弧度），None 为锁死
    pub limits: JointAxes<Option<f32>>,
    /// 关闭父子刚体之间的碰撞
    pub disable_collision: bool,
    /// 未锁死的轴创建为速度马达，初始目标为 0
    pub motors_enabled: bool,
}

/// 刚体状态快照
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BodyState {
    pub position: Vec3,
    pub rotation: Quat,
    /// 0 表示静态刚体
    pub inverse_mass: f32,
    /// 世界空间质心
    pub center_of_mass: Vec3,
}

impl BodyState {
    #[inline]
    pub fn mass(&self) -> f32 {
        if self.inverse_mass > 0.0 {
            1.0 / self.inverse_mass
        } else {
            0.0
        }
    }
}

// ============================================================================
// 引擎接口
// ============================================================================

/// 物理引擎接口
///
/// 句柄失效等错误统一返回 [`RigError::EngineDesync`](crate::RigError::EngineDesync)。
pub trait PhysicsBackend {
    type Body: Copy + Debug;
    type Constraint: Copy + Debug;

    fn create_body(&mut self, desc: &BodyDesc) -> Result<Self::Body>;

    fn create_constraint(
        &mut self,
        parent: Self::Body,
        child: Self::Body,
        desc: &ConstraintDesc,
    ) -> Result<Self::Constraint>;

    fn body_state(&self, body: Self::Body) -> Result<BodyState>;

    /// 约束空间中子侧相对父侧的当前旋转
    fn constraint_rotation(&self, constraint: Self::Constraint) -> Result<Quat>;

    /// 写入单轴马达力矩上下限（axis 为约束空间轴）
    fn set_motor_torque_limits(
        &mut self,
        constraint: Self::Constraint,
        axis: RawAxis,
        min: f32,
        max: f32,
    ) -> Result<()>;

    /// 一次写入三轴目标角速度（约束空间）
    fn set_target_angular_velocity(&mut self, constraint: Self::Constraint, velocity: Vec3) -> Result<()>;

    fn is_constraint_active(&self, constraint: Self::Constraint) -> Result<bool>;

    fn activate_constraint(&mut self, constraint: Self::Constraint) -> Result<()>;

    /// 上一步马达的累计冲量（约束空间），不支持时返回 None
    fn motor_lambda(&self, _constraint: Self::Constraint) -> Result<Option<Vec3>> {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_from_part() {
        let half = PartAxes::new(0.2, 0.1, 0.05);
        assert_eq!(ShapeDesc::from_part(PartShape::Sphere, &half), ShapeDesc::Sphere { radius: 0.2 });
        assert_eq!(
            ShapeDesc::from_part(PartShape::Capsule, &half),
            ShapeDesc::Capsule {
                half_height: 0.2,
                radius: 0.05
            }
        );
        assert_eq!(
            ShapeDesc::from_part(PartShape::Box, &half),
            ShapeDesc::Box {
                half_extents: Vec3::new(0.1, 0.2, 0.05)
            }
        );
    }

    #[test]
    fn test_box_volume() {
        let shape = ShapeDesc::Box {
            half_extents: Vec3::new(0.5, 0.5, 0.5),
        };
        assert!((shape.volume() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_static_body_mass() {
        let state = BodyState {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            inverse_mass: 0.0,
            center_of_mass: Vec3::ZERO,
        };
        assert_eq!(state.mass(), 0.0);
    }
}
