//! Rapier3D 物理世界
//!
//! ## 接口 → Rapier 映射
//! | 接口 | Rapier |
//! |------|--------|
//! | 刚体 | RigidBody + 居中于原点的单个 Collider |
//! | 约束 | GenericJoint（线性三轴锁死，角度轴按限位锁死或限位） |
//! | 速度马达 | `MotorModel::ForceBased` + `motor_velocity` |
//! | 力矩上下限 | 按目标速度方向选取 `motor_max_force` |
//! | 约束休眠 | 两端动态刚体任一休眠 |

use std::collections::HashMap;

use glam::{Mat3, Quat, Vec3};
use rapier3d::na::{Quaternion, Translation3, UnitQuaternion};
use rapier3d::prelude::{
    CCDSolver, ColliderBuilder, ColliderSet, DefaultBroadPhase, GenericJointBuilder, ImpulseJoint,
    ImpulseJointHandle, ImpulseJointSet, IntegrationParameters, IslandManager, Isometry, JointAxesMask,
    JointAxis as EngineAxis, MotorModel, MultibodyJointSet, NarrowPhase, PhysicsPipeline, RigidBody,
    RigidBodyBuilder, RigidBodyHandle, RigidBodySet, Vector,
};

use crate::axes::{JointAxis, RawAxis};
use crate::error::{Result, RigError};

use super::config::get_config;
use super::{BodyDesc, BodyState, ConstraintDesc, PhysicsBackend, ShapeDesc};

// ============================================================================
// glam ↔ nalgebra
// ============================================================================

#[inline]
fn to_na_vector(v: Vec3) -> Vector<f32> {
    Vector::new(v.x, v.y, v.z)
}

#[inline]
fn to_na_rotation(q: Quat) -> UnitQuaternion<f32> {
    UnitQuaternion::new_normalize(Quaternion::new(q.w, q.x, q.y, q.z))
}

#[inline]
fn to_isometry(position: Vec3, rotation: Quat) -> Isometry<f32> {
    Isometry::from_parts(Translation3::new(position.x, position.y, position.z), to_na_rotation(rotation))
}

#[inline]
fn from_na_rotation(q: &UnitQuaternion<f32>) -> Quat {
    let c = q.coords;
    Quat::from_xyzw(c.x, c.y, c.z, c.w)
}

#[inline]
fn from_na_vector(v: &Vector<f32>) -> Vec3 {
    Vec3::new(v.x, v.y, v.z)
}

/// 由扭转轴 / 偏航轴构造约束坐标系（X = 扭转，Y = 偏航，Z = X × Y）
fn constraint_basis(twist: Vec3, yaw: Vec3) -> Quat {
    let x = twist.normalize_or_zero();
    // 偏航轴对扭转轴正交化
    let y = (yaw - x * yaw.dot(x)).normalize_or_zero();
    if x == Vec3::ZERO || y == Vec3::ZERO {
        return Quat::IDENTITY;
    }
    Quat::from_mat3(&Mat3::from_cols(x, y, x.cross(y))).normalize()
}

#[inline]
fn engine_axis(axis: RawAxis) -> (EngineAxis, JointAxesMask) {
    match axis {
        RawAxis::X => (EngineAxis::AngX, JointAxesMask::ANG_X),
        RawAxis::Y => (EngineAxis::AngY, JointAxesMask::ANG_Y),
        RawAxis::Z => (EngineAxis::AngZ, JointAxesMask::ANG_Z),
    }
}

// ============================================================================
// RapierWorld
// ============================================================================

/// Rapier3D 物理世界
///
/// 流程：创建刚体/约束 → 每帧 [控制器写马达 → step]
pub struct RapierWorld {
    pub physics_pipeline: PhysicsPipeline,
    pub integration_parameters: IntegrationParameters,
    pub island_manager: IslandManager,
    pub broad_phase: DefaultBroadPhase,
    pub narrow_phase: NarrowPhase,
    pub rigid_body_set: RigidBodySet,
    pub collider_set: ColliderSet,
    pub impulse_joint_set: ImpulseJointSet,
    pub multibody_joint_set: MultibodyJointSet,
    pub ccd_solver: CCDSolver,
    pub gravity: Vector<f32>,
    /// 地面刚体句柄
    pub floor_handle: Option<RigidBodyHandle>,
    /// 每个约束每个轴的力矩上下限 (min, max)，按约束空间轴 x/y/z 存放
    torque_limits: HashMap<ImpulseJointHandle, [(f32, f32); 3]>,
    motor_velocity_gain: f32,
}

impl Default for RapierWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl RapierWorld {
    /// 创建空世界（参数来自全局配置）
    pub fn new() -> Self {
        let config = get_config();

        let mut integration_parameters = IntegrationParameters::default();
        integration_parameters.dt = 1.0 / config.physics_fps;

        if config.debug_log {
            log::info!(
                "[Rapier] 物理世界创建: FPS={}, 重力Y={}",
                config.physics_fps,
                config.gravity_y
            );
        }

        Self {
            physics_pipeline: PhysicsPipeline::new(),
            integration_parameters,
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            gravity: Vector::new(0.0, config.gravity_y, 0.0),
            floor_handle: None,
            torque_limits: HashMap::new(),
            motor_velocity_gain: config.motor_velocity_gain,
        }
    }

    /// 添加静态地面（上表面位于 height）
    pub fn add_floor(&mut self, height: f32) -> RigidBodyHandle {
        let floor = RigidBodyBuilder::fixed()
            .translation(Vector::new(0.0, height - 0.5, 0.0))
            .build();
        let handle = self.rigid_body_set.insert(floor);
        let collider = ColliderBuilder::cuboid(50.0, 0.5, 50.0).friction(0.8).build();
        self.collider_set
            .insert_with_parent(collider, handle, &mut self.rigid_body_set);
        self.floor_handle = Some(handle);
        handle
    }

    pub fn set_gravity(&mut self, gravity: Vec3) {
        self.gravity = to_na_vector(gravity);
    }

    /// 固定步长（秒）
    #[inline]
    pub fn fixed_dt(&self) -> f32 {
        self.integration_parameters.dt
    }

    /// 步进一个固定时间步
    pub fn step(&mut self) {
        self.physics_pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            None,
            &(),
            &(),
        );
    }

    pub fn rigid_body_count(&self) -> usize {
        self.rigid_body_set.len()
    }

    pub fn joint_count(&self) -> usize {
        self.impulse_joint_set.len()
    }

    fn rigid_body(&self, handle: RigidBodyHandle) -> Result<&RigidBody> {
        self.rigid_body_set
            .get(handle)
            .ok_or_else(|| RigError::EngineDesync(format!("rigid body {handle:?}")))
    }

    fn joint(&self, handle: ImpulseJointHandle) -> Result<&ImpulseJoint> {
        self.impulse_joint_set
            .get(handle)
            .ok_or_else(|| RigError::EngineDesync(format!("joint {handle:?}")))
    }

    fn joint_mut(&mut self, handle: ImpulseJointHandle) -> Result<&mut ImpulseJoint> {
        self.impulse_joint_set
            .get_mut(handle)
            .ok_or_else(|| RigError::EngineDesync(format!("joint {handle:?}")))
    }

    /// 刚体质量（碰撞体质量之和）
    fn body_mass(&self, body: &RigidBody) -> f32 {
        body.colliders()
            .iter()
            .filter_map(|&h| self.collider_set.get(h))
            .map(|c| c.mass())
            .sum()
    }
}

impl PhysicsBackend for RapierWorld {
    type Body = RigidBodyHandle;
    type Constraint = ImpulseJointHandle;

    fn create_body(&mut self, desc: &BodyDesc) -> Result<RigidBodyHandle> {
        let config = get_config();
        let builder = if desc.material.is_static() {
            RigidBodyBuilder::fixed()
        } else {
            RigidBodyBuilder::dynamic()
        };
        let body = builder
            .position(to_isometry(desc.position, desc.rotation))
            .angular_damping(config.angular_damping)
            .linear_damping(config.linear_damping)
            .can_sleep(config.allow_sleeping)
            .build();
        let handle = self.rigid_body_set.insert(body);

        let collider = match desc.shape {
            ShapeDesc::Sphere { radius } => ColliderBuilder::ball(radius),
            ShapeDesc::Cylinder { half_height, radius } => ColliderBuilder::cylinder(half_height, radius),
            ShapeDesc::Capsule { half_height, radius } => ColliderBuilder::capsule_y(half_height, radius),
            ShapeDesc::Box { half_extents } => {
                ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
            }
        }
        .density(desc.material.density)
        .friction(desc.material.friction)
        .restitution(desc.material.restitution)
        .build();
        self.collider_set
            .insert_with_parent(collider, handle, &mut self.rigid_body_set);

        if config.debug_log {
            log::debug!(
                "[Rapier] 刚体 '{}': {:?}, 静态={}",
                desc.name,
                desc.shape,
                desc.material.is_static()
            );
        }
        Ok(handle)
    }

    fn create_constraint(
        &mut self,
        parent: RigidBodyHandle,
        child: RigidBodyHandle,
        desc: &ConstraintDesc,
    ) -> Result<ImpulseJointHandle> {
        self.rigid_body(parent)?;
        self.rigid_body(child)?;

        let frame1 = to_isometry(
            desc.parent_anchor,
            constraint_basis(desc.parent_twist_axis, desc.parent_yaw_axis),
        );
        let frame2 = to_isometry(
            desc.child_anchor,
            constraint_basis(desc.child_twist_axis, desc.child_yaw_axis),
        );

        let mut locked = JointAxesMask::LIN_AXES;
        let mut free = Vec::with_capacity(3);
        for axis in JointAxis::ALL {
            let (engine, mask) = engine_axis(axis.config().constraint_axis);
            match desc.limits[axis] {
                Some(limit) => free.push((engine, limit)),
                None => locked |= mask,
            }
        }

        let mut builder = GenericJointBuilder::new(locked)
            .local_frame1(frame1)
            .local_frame2(frame2)
            .contacts_enabled(!desc.disable_collision);
        for (axis, limit) in free {
            builder = builder.limits(axis, [-limit, limit]);
            if desc.motors_enabled {
                builder = builder
                    .motor_model(axis, MotorModel::ForceBased)
                    .motor_velocity(axis, 0.0, self.motor_velocity_gain)
                    .motor_max_force(axis, 0.0);
            }
        }

        let handle = self
            .impulse_joint_set
            .insert(parent, child, builder.build(), true);
        self.torque_limits.insert(handle, [(0.0, 0.0); 3]);
        Ok(handle)
    }

    fn body_state(&self, body: RigidBodyHandle) -> Result<BodyState> {
        let rb = self.rigid_body(body)?;
        let mass = if rb.is_dynamic() { self.body_mass(rb) } else { 0.0 };
        // 碰撞体居中于刚体原点，质心即刚体位置
        let position = from_na_vector(rb.translation());
        Ok(BodyState {
            position,
            rotation: from_na_rotation(rb.rotation()),
            inverse_mass: if mass > 0.0 { 1.0 / mass } else { 0.0 },
            center_of_mass: position,
        })
    }

    fn constraint_rotation(&self, constraint: ImpulseJointHandle) -> Result<Quat> {
        let joint = self.joint(constraint)?;
        let frame1 = self.rigid_body(joint.body1)?.position() * joint.data.local_frame1;
        let frame2 = self.rigid_body(joint.body2)?.position() * joint.data.local_frame2;
        let relative = frame1.rotation.inverse() * frame2.rotation;
        Ok(from_na_rotation(&relative))
    }

    fn set_motor_torque_limits(
        &mut self,
        constraint: ImpulseJointHandle,
        axis: RawAxis,
        min: f32,
        max: f32,
    ) -> Result<()> {
        let limits = self
            .torque_limits
            .get_mut(&constraint)
            .ok_or_else(|| RigError::EngineDesync(format!("joint {constraint:?}")))?;
        limits[axis.index()] = (min, max);
        Ok(())
    }

    fn set_target_angular_velocity(&mut self, constraint: ImpulseJointHandle, velocity: Vec3) -> Result<()> {
        let limits = *self
            .torque_limits
            .get(&constraint)
            .ok_or_else(|| RigError::EngineDesync(format!("joint {constraint:?}")))?;
        let gain = self.motor_velocity_gain;
        let joint = self.joint_mut(constraint)?;

        for axis in RawAxis::ALL {
            let (engine, mask) = engine_axis(axis);
            if joint.data.locked_axes.contains(mask) {
                continue;
            }
            let target = velocity[axis.index()];
            let (min, max) = limits[axis.index()];
            // Rapier 只有对称的力上限：按目标速度方向取对应一侧
            let max_force = if target > 0.0 {
                max
            } else if target < 0.0 {
                -min
            } else {
                max.max(-min)
            };
            joint.data.set_motor_velocity(engine, target, gain);
            joint.data.set_motor_max_force(engine, max_force.max(0.0));
        }
        Ok(())
    }

    fn is_constraint_active(&self, constraint: ImpulseJointHandle) -> Result<bool> {
        let joint = self.joint(constraint)?;
        let bodies = [self.rigid_body(joint.body1)?, self.rigid_body(joint.body2)?];
        Ok(bodies
            .iter()
            .filter(|rb| rb.is_dynamic())
            .all(|rb| !rb.is_sleeping()))
    }

    fn activate_constraint(&mut self, constraint: ImpulseJointHandle) -> Result<()> {
        let joint = self.joint(constraint)?;
        let (body1, body2) = (joint.body1, joint.body2);
        for handle in [body1, body2] {
            let rb = self
                .rigid_body_set
                .get_mut(handle)
                .ok_or_else(|| RigError::EngineDesync(format!("rigid body {handle:?}")))?;
            if rb.is_dynamic() {
                rb.wake_up(true);
            }
        }
        Ok(())
    }

    fn motor_lambda(&self, constraint: ImpulseJointHandle) -> Result<Option<Vec3>> {
        let joint = self.joint(constraint)?;
        let impulses = &joint.impulses;
        Ok(Some(Vec3::new(impulses[3], impulses[4], impulses[5])))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::axes::JointAxes;
    use glam::EulerRot;
    use crate::blueprint::Material;

    fn box_desc(name: &str, position: Vec3, density: f32) -> BodyDesc {
        BodyDesc {
            name: name.to_string(),
            shape: ShapeDesc::Box {
                half_extents: Vec3::splat(0.1),
            },
            material: Material {
                density,
                ..Material::default()
            },
            position,
            rotation: Quat::IDENTITY,
        }
    }

    fn hinge_desc() -> ConstraintDesc {
        ConstraintDesc {
            name: "hinge".to_string(),
            parent_anchor: Vec3::new(0.0, 0.1, 0.0),
            child_anchor: Vec3::new(0.0, -0.1, 0.0),
            parent_twist_axis: Vec3::Y,
            parent_yaw_axis: Vec3::Z,
            child_twist_axis: Vec3::Y,
            child_yaw_axis: Vec3::Z,
            limits: JointAxes::new(None, Some(1.0), None),
            disable_collision: true,
            motors_enabled: true,
        }
    }

    #[test]
    fn test_conversions() {
        let q = Quat::from_rotation_x(0.7);
        let back = from_na_rotation(&to_na_rotation(q));
        assert!(back.angle_between(q) < 1e-6);
        let basis = constraint_basis(Vec3::Y, Vec3::Z);
        assert!((basis * Vec3::X - Vec3::Y).length() < 1e-6);
        assert!((basis * Vec3::Z - Vec3::X).length() < 1e-6);
    }

    #[test]
    fn test_static_and_dynamic_mass() {
        let mut world = RapierWorld::new();
        let fixed = world.create_body(&box_desc("fixed", Vec3::ZERO, 0.0)).unwrap();
        let dynamic = world.create_body(&box_desc("dynamic", Vec3::Y, 1000.0)).unwrap();
        assert_eq!(world.body_state(fixed).unwrap().inverse_mass, 0.0);
        let state = world.body_state(dynamic).unwrap();
        // 0.2³ m³ × 1000 kg/m³ = 8 kg
        assert!((state.mass() - 8.0).abs() < 1e-3);
        assert!((state.position - Vec3::Y).length() < 1e-6);
    }

    #[test]
    fn test_rest_rotation_is_identity() {
        let mut world = RapierWorld::new();
        let a = world.create_body(&box_desc("a", Vec3::ZERO, 0.0)).unwrap();
        let b = world.create_body(&box_desc("b", Vec3::new(0.0, 0.2, 0.0), 1000.0)).unwrap();
        let joint = world.create_constraint(a, b, &hinge_desc()).unwrap();
        let rotation = world.constraint_rotation(joint).unwrap();
        assert!(rotation.angle_between(Quat::IDENTITY) < 1e-5);
        assert!(world.is_constraint_active(joint).unwrap());
    }

    #[test]
    fn test_motor_write_and_step() {
        let mut world = RapierWorld::new();
        let a = world.create_body(&box_desc("a", Vec3::ZERO, 0.0)).unwrap();
        let b = world.create_body(&box_desc("b", Vec3::new(0.0, 0.2, 0.0), 1000.0)).unwrap();
        let joint = world.create_constraint(a, b, &hinge_desc()).unwrap();

        world.set_motor_torque_limits(joint, RawAxis::Z, -5.0, 5.0).unwrap();
        world
            .set_target_angular_velocity(joint, Vec3::new(0.0, 0.0, 2.0))
            .unwrap();
        for _ in 0..10 {
            world.step();
        }
        let rotation = world.constraint_rotation(joint).unwrap();
        assert!(rotation.angle_between(Quat::IDENTITY) > 1e-3);
        assert!(world.motor_lambda(joint).unwrap().is_some());
    }

    /// 只放开一个关节轴，限位 ±1 rad
    fn single_axis_desc(axis: JointAxis) -> ConstraintDesc {
        let mut desc = hinge_desc();
        desc.limits = JointAxes::new(None, None, None);
        desc.limits[axis] = Some(1.0);
        desc
    }

    #[test]
    fn test_positive_target_gives_positive_euler_angle() {
        // 控制器按 YZX 读回角度，正目标速度必须得到正角度
        for axis in JointAxis::ALL {
            let mut world = RapierWorld::new();
            let a = world.create_body(&box_desc("a", Vec3::ZERO, 0.0)).unwrap();
            let b = world.create_body(&box_desc("b", Vec3::new(0.0, 0.2, 0.0), 1000.0)).unwrap();
            let joint = world.create_constraint(a, b, &single_axis_desc(axis)).unwrap();

            let raw = axis.config().constraint_axis;
            world.set_motor_torque_limits(joint, raw, -5.0, 5.0).unwrap();
            world.set_target_angular_velocity(joint, raw.unit() * 2.0).unwrap();
            for _ in 0..5 {
                world.step();
            }

            let (y, z, x) = world.constraint_rotation(joint).unwrap().to_euler(EulerRot::YZX);
            let angle = raw.get(Vec3::new(x, y, z));
            assert!(angle > 0.05, "{axis:?}: {angle}");
        }
    }

    #[test]
    fn test_idle_joint_sleeps_until_activated() {
        let mut world = RapierWorld::new();
        let a = world.create_body(&box_desc("a", Vec3::ZERO, 0.0)).unwrap();
        let b = world.create_body(&box_desc("b", Vec3::new(0.0, 0.2, 0.0), 1000.0)).unwrap();
        let mut desc = hinge_desc();
        desc.limits = JointAxes::new(None, None, None);
        let joint = world.create_constraint(a, b, &desc).unwrap();

        for _ in 0..400 {
            world.step();
        }
        assert!(!world.is_constraint_active(joint).unwrap());

        world.activate_constraint(joint).unwrap();
        assert!(world.is_constraint_active(joint).unwrap());
    }

    #[test]
    fn test_invalid_handle_is_desync() {
        let world = RapierWorld::new();
        let stale = RigidBodyHandle::from_raw_parts(42, 0);
        assert!(matches!(world.body_state(stale), Err(RigError::EngineDesync(_))));
    }
}
