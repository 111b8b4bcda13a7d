//! 骨架 → 物理对象绑定
//!
//! 按骨架索引顺序创建刚体和约束，索引与 [`Skeleton`] 一一对应。

use glam::Vec3;

use crate::error::{Result, RigError};
use crate::skeleton::{BakedJoint, BakedPart, Skeleton};

use super::config::get_config;
use super::{BodyDesc, BodyState, ConstraintDesc, PhysicsBackend, ShapeDesc};

/// 骨架索引到引擎句柄的映射
#[derive(Debug)]
pub struct SkeletonBinding<B: PhysicsBackend> {
    bodies: Vec<B::Body>,
    /// 根部件为 None
    constraints: Vec<Option<B::Constraint>>,
}

impl<B: PhysicsBackend> SkeletonBinding<B> {
    /// 为骨架中的每个部件创建刚体，为每个关节创建约束
    pub fn bind(skeleton: &Skeleton, engine: &mut B) -> Result<Self> {
        let config = get_config();
        let mut bodies = Vec::with_capacity(skeleton.len());
        let mut constraints = Vec::with_capacity(skeleton.len());

        for part in skeleton.parts() {
            let body = engine.create_body(&body_desc(part))?;
            bodies.push(body);

            let constraint = match (&part.joint, part.parent) {
                (Some(joint), Some(parent)) => {
                    let mut desc = constraint_desc(part, joint);
                    desc.disable_collision = config.disable_parent_child_collisions;
                    Some(engine.create_constraint(bodies[parent], body, &desc)?)
                }
                _ => None,
            };
            constraints.push(constraint);

            if config.debug_log {
                log::debug!(
                    "[Binding] 部件[{}] '{}' → {:?}, 约束 {:?}",
                    part.index,
                    part.name,
                    body,
                    constraint
                );
            }
        }

        log::info!(
            "[Binding] 绑定完成: {} 刚体, {} 约束",
            bodies.len(),
            constraints.iter().flatten().count()
        );

        Ok(Self { bodies, constraints })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    pub fn body(&self, index: usize) -> Result<B::Body> {
        self.bodies
            .get(index)
            .copied()
            .ok_or_else(|| RigError::EngineDesync(format!("no body bound for part {index}")))
    }

    pub fn constraint(&self, index: usize) -> Option<B::Constraint> {
        self.constraints.get(index).copied().flatten()
    }

    pub fn bodies(&self) -> &[B::Body] {
        &self.bodies
    }

    /// 所有刚体当前状态（骨架顺序）
    pub fn body_states(&self, engine: &B) -> Result<Vec<BodyState>> {
        self.bodies.iter().map(|&body| engine.body_state(body)).collect()
    }
}

pub fn body_desc(part: &BakedPart) -> BodyDesc {
    BodyDesc {
        name: part.name.clone(),
        shape: ShapeDesc::from_part(part.shape, &part.half_extents),
        material: part.material,
        position: part.world_position,
        rotation: part.world_rotation,
    }
}

pub fn constraint_desc(part: &BakedPart, joint: &BakedJoint) -> ConstraintDesc {
    ConstraintDesc {
        name: part.name.clone(),
        parent_anchor: joint.parent_anchor,
        child_anchor: joint.child_anchor,
        parent_twist_axis: joint.twist_axis,
        parent_yaw_axis: joint.yaw_axis,
        child_twist_axis: Vec3::Y,
        child_yaw_axis: Vec3::Z,
        limits: joint.limits.map(|limit| limit.map(f32::to_radians)),
        disable_collision: true,
        motors_enabled: joint.has_motion(),
    }
}
