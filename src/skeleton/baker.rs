//! 骨架烘焙器
//!
//! 先序遍历蓝图树，计算每个部件的半尺寸、关节锚点、静止旋转和世界变换。
//! 对称部件先深拷贝一份，原件以 l_ 前缀烘焙，拷贝在其后以 r_ 前缀烘焙并镜像。

use glam::{Mat3, Quat, Vec3};

use crate::axes::{AxisMask, PartAxes, AXIS_CONFIGS};
use crate::blueprint::{JointSettings, JointSpec, Material, PartSpec};
use crate::error::{Result, RigError};
use crate::math::ypr_to_quat;
use crate::physics::config::get_config;

use super::{BakedJoint, BakedPart, Skeleton};

/// 对称对左侧前缀
pub const LEFT_PREFIX: &str = "l_";
/// 对称对右侧（镜像）前缀
pub const RIGHT_PREFIX: &str = "r_";

/// 当前分支的命名与镜像状态，向子节点传递
#[derive(Clone, Debug, Default)]
struct Branch {
    prefix: String,
    mirrored: bool,
}

impl Branch {
    fn left(&self) -> Self {
        Self {
            prefix: format!("{}{}", self.prefix, LEFT_PREFIX),
            mirrored: self.mirrored,
        }
    }

    fn right(&self) -> Self {
        Self {
            prefix: format!("{}{}", self.prefix, RIGHT_PREFIX),
            mirrored: !self.mirrored,
        }
    }
}

struct Baker {
    skeleton: Skeleton,
    root_position: Vec3,
    root_rotation: Quat,
    debug_log: bool,
}

/// 烘焙蓝图树
///
/// 根部件的世界变换由调用方给出，其余部件由关节锚点与静止旋转推导。
pub fn bake(root: &PartSpec, world_position: Vec3, world_rotation: Quat) -> Result<Skeleton> {
    if root.joint.is_some() {
        return Err(RigError::RootJoint(root.id.clone()));
    }
    if root.symmetrical {
        return Err(RigError::SymmetricRoot(root.id.clone()));
    }
    if !world_position.is_finite() {
        return Err(RigError::InvalidRootTransform(format!("position {world_position}")));
    }
    if !world_rotation.is_finite() || world_rotation.length_squared() < 1e-12 {
        return Err(RigError::InvalidRootTransform(format!("rotation {world_rotation}")));
    }

    let mut baker = Baker {
        skeleton: Skeleton::default(),
        root_position: world_position,
        root_rotation: world_rotation.normalize(),
        debug_log: get_config().debug_log,
    };
    baker.bake_part(root, None, &Branch::default())?;

    let skeleton = baker.skeleton;
    log::info!(
        "[Rig] 骨架烘焙完成: '{}', {} 部件, {} 关节",
        root.id,
        skeleton.len(),
        skeleton.joint_count()
    );
    Ok(skeleton)
}

impl Baker {
    fn bake_part(&mut self, spec: &PartSpec, parent: Option<usize>, branch: &Branch) -> Result<usize> {
        let half_extents = resolve_half_extents(spec)?;

        // 对称：递归前先深拷贝，右侧在整个左侧子树之后烘焙
        let (own_branch, twin) = if spec.symmetrical {
            let mut twin = spec.clone();
            twin.symmetrical = false;
            if let Some(joint) = twin.joint.as_mut() {
                joint.parent_anchor.mirror_width();
                joint.child_anchor.mirror_width();
            }
            (branch.left(), Some(twin))
        } else {
            (branch.clone(), None)
        };

        let name = format!("{}{}", own_branch.prefix, spec.id);

        let (world_position, world_rotation, joint) = match parent {
            None => (self.root_position, self.root_rotation, None),
            Some(parent_index) => {
                let joint_spec = spec
                    .joint
                    .as_ref()
                    .ok_or_else(|| RigError::MissingJoint(name.clone()))?;
                let parent_part = &self.skeleton.parts()[parent_index];
                let joint = bake_joint(joint_spec, parent_part, &half_extents, own_branch.mirrored);

                let world_rotation = (parent_part.world_rotation * joint.rest_rotation).normalize();

                // 父侧锚点世界位置 - 子侧锚点相对偏移
                let parent_anchor_world =
                    parent_part.world_position + parent_part.world_rotation * joint.parent_anchor;
                let world_position = parent_anchor_world - world_rotation * joint.child_anchor;

                (world_position, world_rotation, Some(joint))
            }
        };

        if self.debug_log {
            log::debug!(
                "[Rig] 部件[{}] '{}': 位置=({:.3},{:.3},{:.3}), 半尺寸=[{}], 锁死轴=[{}], 镜像={}",
                self.skeleton.len(),
                name,
                world_position.x,
                world_position.y,
                world_position.z,
                describe_extents(&half_extents),
                joint.as_ref().map(describe_locked_axes).unwrap_or_default(),
                own_branch.mirrored
            );
        }

        let index = self.skeleton.push(BakedPart {
            index: self.skeleton.len(),
            name,
            source_id: spec.id.clone(),
            shape: spec.shape,
            half_extents,
            material: Material::resolve(&spec.material),
            parent,
            children: Vec::new(),
            world_position,
            world_rotation,
            mirrored: own_branch.mirrored,
            joint,
        })?;

        for child in &spec.children {
            self.bake_part(child, Some(index), &own_branch)?;
        }

        if let Some(twin) = twin {
            self.bake_part(&twin, parent, &branch.right())?;
        }

        Ok(index)
    }
}

fn describe_extents(half_extents: &PartAxes<f32>) -> String {
    AXIS_CONFIGS
        .iter()
        .map(|c| format!("{}={:.3}", c.part_label, half_extents[c.part_axis]))
        .collect::<Vec<_>>()
        .join(", ")
}

fn describe_locked_axes(joint: &BakedJoint) -> String {
    AXIS_CONFIGS
        .iter()
        .filter(|c| joint.is_locked(c.joint_axis))
        .map(|c| c.joint_label)
        .collect::<Vec<_>>()
        .join(", ")
}

/// 半尺寸，长度必须为正
fn resolve_half_extents(spec: &PartSpec) -> Result<PartAxes<f32>> {
    let invalid = |reason: String| RigError::InvalidSize {
        name: spec.id.clone(),
        reason,
    };
    let size = &spec.size;
    if !size.l.is_finite() || size.l <= 0.0 {
        return Err(invalid(format!("length must be positive, got {}", size.l)));
    }
    for (label, value) in [("width", size.w), ("thickness", size.t)] {
        if let Some(v) = value {
            if !v.is_finite() || v < 0.0 {
                return Err(invalid(format!("{label} must be non-negative, got {v}")));
            }
        }
    }
    Ok(size.half_extents())
}

fn bake_joint(spec: &JointSpec, parent: &BakedPart, half_extents: &PartAxes<f32>, mirrored: bool) -> BakedJoint {
    let parent_anchor = spec.parent_anchor.bake(&parent.half_extents);
    let child_anchor = spec.child_anchor.bake(half_extents);

    let settings = JointSettings::resolve(parent.joint.as_ref().map(|j| &j.settings), &spec.overrides);

    // 镜像实例：yaw / roll 取反，对应的控制方向也翻转
    let mut axis = spec.axis;
    let mut mirror = spec.mirror;
    if mirrored {
        axis.yaw = -axis.yaw;
        axis.roll = -axis.roll;
        mirror.toggle(AxisMask::YAW | AxisMask::ROLL);
    }

    let rest_rotation = ypr_to_quat(&axis);
    let basis = Mat3::from_quat(rest_rotation);

    BakedJoint {
        parent_anchor,
        child_anchor,
        axis,
        rest_rotation,
        yaw_axis: basis.z_axis.normalize(),
        twist_axis: basis.y_axis.normalize(),
        limits: spec.limits.map(|limit| limit.filter(|v| *v != 0.0).map(f32::abs)),
        mirror,
        settings,
    }
}
