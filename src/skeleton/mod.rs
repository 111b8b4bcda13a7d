//! 骨架 - 烘焙后的扁平部件列表
//!
//! 核心设计思想：
//! - BakedPart: 已解析的部件（世界变换、半尺寸、材质）
//! - BakedJoint: 已解析的关节（锚点、静止旋转、约束轴、限位、参数）
//! - Skeleton: 按先序排列的部件数组 + 名称索引
//!
//! 父子关系用数组索引表示（arena + index），父索引总是小于子索引。

mod baker;

pub use baker::{bake, LEFT_PREFIX, RIGHT_PREFIX};

use std::collections::HashMap;

use glam::{Quat, Vec3};

use crate::axes::{AxisMask, JointAxes, JointAxis, PartAxes};
use crate::blueprint::{JointSettings, Material, PartShape};
use crate::error::{Result, RigError};

// ============================================================================
// 烘焙关节
// ============================================================================

/// 烘焙后的关节
#[derive(Clone, Debug)]
pub struct BakedJoint {
    /// 父部件局部空间锚点
    pub parent_anchor: Vec3,
    /// 子部件局部空间锚点
    pub child_anchor: Vec3,
    /// 生效的静止朝向（角度制，右侧已镜像）
    pub axis: JointAxes<f32>,
    /// 静止旋转（相对父部件）
    pub rest_rotation: Quat,
    /// 偏航轴（父部件局部空间，旋转矩阵第 2 列）
    pub yaw_axis: Vec3,
    /// 扭转轴（父部件局部空间，旋转矩阵第 1 列）
    pub twist_axis: Vec3,
    /// 限位（角度制），None 表示锁死
    pub limits: JointAxes<Option<f32>>,
    pub mirror: AxisMask,
    pub settings: JointSettings,
}

impl BakedJoint {
    /// 该轴是否锁死
    #[inline]
    pub fn is_locked(&self, axis: JointAxis) -> bool {
        self.limits[axis].is_none()
    }

    #[inline]
    pub fn limit_radians(&self, axis: JointAxis) -> Option<f32> {
        self.limits[axis].map(f32::to_radians)
    }

    /// 未锁死的轴
    pub fn unlocked_axes(&self) -> impl Iterator<Item = JointAxis> + '_ {
        JointAxis::ALL.into_iter().filter(|&a| !self.is_locked(a))
    }

    #[inline]
    pub fn has_motion(&self) -> bool {
        self.unlocked_axes().next().is_some()
    }
}

// ============================================================================
// 烘焙部件
// ============================================================================

/// 烘焙后的部件
#[derive(Clone, Debug)]
pub struct BakedPart {
    /// 骨架索引（先序）
    pub index: usize,
    /// 带对称前缀的名称
    pub name: String,
    /// 蓝图中的原始 id
    pub source_id: String,
    pub shape: PartShape,
    pub half_extents: PartAxes<f32>,
    pub material: Material,
    /// 父部件索引（非拥有）
    pub parent: Option<usize>,
    pub children: Vec<usize>,
    pub world_position: Vec3,
    pub world_rotation: Quat,
    /// 是否为对称对中的镜像（右侧）实例
    pub mirrored: bool,
    /// 根部件为 None
    pub joint: Option<BakedJoint>,
}

impl BakedPart {
    #[inline]
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// 关节在世界空间中的位置（静止姿态）
    pub fn joint_world_position(&self) -> Option<Vec3> {
        self.joint
            .as_ref()
            .map(|j| self.world_position + self.world_rotation * j.child_anchor)
    }
}

// ============================================================================
// 骨架
// ============================================================================

/// 扁平骨架
#[derive(Clone, Debug, Default)]
pub struct Skeleton {
    parts: Vec<BakedPart>,
    name_index: HashMap<String, usize>,
}

impl Skeleton {
    pub(crate) fn push(&mut self, part: BakedPart) -> Result<usize> {
        let index = self.parts.len();
        if self.name_index.contains_key(&part.name) {
            return Err(RigError::DuplicateName(part.name));
        }
        self.name_index.insert(part.name.clone(), index);
        if let Some(parent) = part.parent {
            self.parts[parent].children.push(index);
        }
        self.parts.push(part);
        Ok(index)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    #[inline]
    pub fn parts(&self) -> &[BakedPart] {
        &self.parts
    }

    #[inline]
    pub fn part(&self, index: usize) -> Option<&BakedPart> {
        self.parts.get(index)
    }

    #[inline]
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.name_index.get(name).copied()
    }

    pub fn get(&self, name: &str) -> Option<&BakedPart> {
        self.index_of(name).map(|i| &self.parts[i])
    }

    pub fn name_index(&self) -> &HashMap<String, usize> {
        &self.name_index
    }

    pub fn root(&self) -> Option<&BakedPart> {
        self.parts.first()
    }

    /// 直接子部件索引
    pub fn children(&self, index: usize) -> &[usize] {
        self.parts
            .get(index)
            .map(|p| p.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn joint_count(&self) -> usize {
        self.parts.iter().filter(|p| p.joint.is_some()).count()
    }

    /// 后序遍历索引（子先于父）
    pub fn postorder(&self) -> Vec<usize> {
        let mut out = Vec::with_capacity(self.parts.len());
        if !self.parts.is_empty() {
            self.postorder_from(0, &mut out);
        }
        out
    }

    fn postorder_from(&self, index: usize, out: &mut Vec<usize>) {
        for &child in &self.parts[index].children {
            self.postorder_from(child, out);
        }
        out.push(index);
    }

    /// 子树内的所有索引（含自身）
    pub fn subtree(&self, index: usize) -> Vec<usize> {
        let mut out = Vec::new();
        if index >= self.parts.len() {
            return out;
        }
        let mut stack = vec![index];
        while let Some(i) = stack.pop() {
            out.push(i);
            stack.extend(self.children(i).iter().rev());
        }
        out
    }

    /// 左右成对的部件名 (l_name, r_name)
    pub fn mirrored_pairs(&self) -> Vec<(String, String)> {
        self.parts
            .iter()
            .filter_map(|p| {
                let rest = p.name.strip_prefix(LEFT_PREFIX)?;
                let right = format!("{RIGHT_PREFIX}{rest}");
                self.name_index.contains_key(&right).then(|| (p.name.clone(), right))
            })
            .collect()
    }
}
