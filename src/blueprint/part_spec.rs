//! 部件蓝图

use crate::axes::PartAxes;

use super::joint_spec::JointSpec;

// ============================================================================
// 形状与尺寸
// ============================================================================

/// 刚体形状，默认盒子
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PartShape {
    /// 半径 = 长度的一半
    Sphere,
    /// 沿长度方向，半径取厚度
    Cylinder,
    /// 沿长度方向，半径取厚度
    Capsule,
    #[default]
    Box,
}

/// 部件尺寸（全长）
///
/// width 未设置或为 0 时取 length，thickness 未设置或为 0 时取 width。
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Size {
    pub l: f32,
    pub w: Option<f32>,
    pub t: Option<f32>,
}

impl Size {
    pub fn new(l: f32, w: f32, t: f32) -> Self {
        Self { l, w: Some(w), t: Some(t) }
    }

    /// 只给长度，其余两轴回退
    pub fn length(l: f32) -> Self {
        Self { l, w: None, t: None }
    }

    /// 长度 + 宽度，厚度回退到宽度
    pub fn lw(l: f32, w: f32) -> Self {
        Self { l, w: Some(w), t: None }
    }

    /// 解析半尺寸
    pub fn half_extents(&self) -> PartAxes<f32> {
        let l = self.l / 2.0;
        let w = fallback(self.w, l);
        let t = fallback(self.t, w);
        PartAxes::new(l, w, t)
    }
}

#[inline]
fn fallback(full: Option<f32>, half_default: f32) -> f32 {
    match full {
        Some(v) if v != 0.0 => v / 2.0,
        _ => half_default,
    }
}

// ============================================================================
// 材质
// ============================================================================

/// 材质覆盖（未设置的字段使用默认材质）
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MaterialOverrides {
    pub density: Option<f32>,
    pub friction: Option<f32>,
    pub restitution: Option<f32>,
    pub color: Option<u32>,
}

/// 解析后的材质
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Material {
    /// 密度为 0 时刚体为静态
    pub density: f32,
    pub friction: f32,
    pub restitution: f32,
    pub color: u32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            density: 985.0,
            friction: 0.5,
            restitution: 0.1,
            color: 0x888888,
        }
    }
}

impl Material {
    pub fn resolve(overrides: &MaterialOverrides) -> Self {
        let base = Self::default();
        Self {
            density: overrides.density.unwrap_or(base.density),
            friction: overrides.friction.unwrap_or(base.friction),
            restitution: overrides.restitution.unwrap_or(base.restitution),
            color: overrides.color.unwrap_or(base.color),
        }
    }

    #[inline]
    pub fn is_static(&self) -> bool {
        self.density == 0.0
    }
}

// ============================================================================
// 部件蓝图
// ============================================================================

/// 部件蓝图节点
#[derive(Clone, Debug)]
pub struct PartSpec {
    pub id: String,
    pub shape: PartShape,
    pub size: Size,
    /// 为 true 时生成左右两份（l_ / r_ 前缀）
    pub symmetrical: bool,
    pub material: MaterialOverrides,
    /// 非根部件必须有，根部件不能有
    pub joint: Option<JointSpec>,
    pub children: Vec<PartSpec>,
}

impl PartSpec {
    pub fn new(id: impl Into<String>, size: Size) -> Self {
        Self {
            id: id.into(),
            shape: PartShape::Box,
            size,
            symmetrical: false,
            material: MaterialOverrides::default(),
            joint: None,
            children: Vec::new(),
        }
    }

    pub fn shape(mut self, shape: PartShape) -> Self {
        self.shape = shape;
        self
    }

    pub fn symmetrical(mut self) -> Self {
        self.symmetrical = true;
        self
    }

    pub fn with_joint(mut self, joint: JointSpec) -> Self {
        self.joint = Some(joint);
        self
    }

    pub fn with_child(mut self, child: PartSpec) -> Self {
        self.children.push(child);
        self
    }

    pub fn density(mut self, density: f32) -> Self {
        self.material.density = Some(density);
        self
    }

    pub fn friction(mut self, friction: f32) -> Self {
        self.material.friction = Some(friction);
        self
    }

    pub fn restitution(mut self, restitution: f32) -> Self {
        self.material.restitution = Some(restitution);
        self
    }

    pub fn color(mut self, color: u32) -> Self {
        self.material.color = Some(color);
        self
    }

    /// 子树节点总数（对称节点算两次）
    pub fn baked_count(&self) -> usize {
        let subtree = 1 + self.children.iter().map(PartSpec::baked_count).sum::<usize>();
        if self.symmetrical {
            subtree * 2
        } else {
            subtree
        }
    }
}
