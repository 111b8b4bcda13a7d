//! 内置蓝图
//!
//! 单位为米和角度。

use crate::axes::{AxisMask, JointAxis, PartAxis};
use crate::blueprint::{AnchorSide, AnchorSpec, JointSpec, PartShape, PartSpec, Size};

use AnchorSide::{Max, Min};
use PartAxis::{Length, Thickness, Width};

/// 颈椎一节（下颈 / 上颈）
fn neck_joint() -> JointSpec {
    JointSpec::new(
        AnchorSpec::new()
            .from(Length, Max)
            .offset(Length, 0.002)
            .offset(Thickness, 0.02),
        AnchorSpec::new()
            .from(Length, Min)
            .offset(Length, -0.002)
            .offset(Thickness, 0.02),
    )
    .axis(0.0, -10.0, 0.0)
    .mirror(AxisMask::YAW | AxisMask::ROLL)
    .limit(JointAxis::Yaw, 10.0)
    .limit(JointAxis::Pitch, 20.0)
    .limit(JointAxis::Roll, 20.0)
}

fn shoulder() -> PartSpec {
    PartSpec::new("shoulder", Size::new(0.11, 0.01, 0.08))
        .symmetrical()
        .with_joint(
            JointSpec::new(
                AnchorSpec::new()
                    .from(Width, Max)
                    .from(Length, Max)
                    .from(Thickness, Max)
                    .offset(Width, -0.06)
                    .offset(Length, -0.045),
                AnchorSpec::new().from(Length, Min).from(Width, Max),
            )
            .axis(-70.0, -10.0, 80.0)
            .mirror(AxisMask::YAW | AxisMask::PITCH)
            .limit(JointAxis::Yaw, 10.0)
            .limit(JointAxis::Pitch, 10.0),
        )
}

fn upper_arm() -> PartSpec {
    PartSpec::new("upper_arm", Size::new(0.22, 0.04, 0.05)).with_joint(
        JointSpec::new(
            AnchorSpec::new()
                .from(Length, Max)
                .from(Width, Min)
                .offset(Width, -0.01),
            AnchorSpec::new().from(Length, Min),
        )
        .axis(-40.0, 10.0, -20.0)
        .mirror(AxisMask::PITCH)
        .limit(JointAxis::Yaw, 130.0)
        .limit(JointAxis::Pitch, 110.0)
        .limit(JointAxis::Roll, 40.0),
    )
}

fn end_to_start() -> (AnchorSpec, AnchorSpec) {
    (
        AnchorSpec::new().from(Length, Max),
        AnchorSpec::new().from(Length, Min),
    )
}

/// 上半身人形：胸 + 两节颈 + 头 + 对称的肩 / 上臂 / 前臂 / 手
pub fn simple_human_top() -> PartSpec {
    let head = PartSpec::new("head", Size::lw(0.05, 0.15))
        .shape(PartShape::Capsule)
        .with_joint(
            JointSpec::new(
                AnchorSpec::new()
                    .from(Length, Max)
                    .offset(Length, 0.04)
                    .offset(Thickness, 0.02),
                AnchorSpec::new()
                    .from(Length, Min)
                    .offset(Length, -0.02)
                    .offset(Thickness, 0.05),
            )
            .axis(0.0, -10.0, 0.0)
            .mirror(AxisMask::YAW | AxisMask::ROLL)
            .limit(JointAxis::Yaw, 20.0)
            .limit(JointAxis::Pitch, 40.0)
            .limit(JointAxis::Roll, 30.0),
        );

    let upper_neck = PartSpec::new("upper_neck", Size::lw(0.04, 0.07))
        .shape(PartShape::Cylinder)
        .with_joint(neck_joint())
        .with_child(head);

    let lower_neck = PartSpec::new("lower_neck", Size::lw(0.04, 0.07))
        .shape(PartShape::Cylinder)
        .with_joint(neck_joint())
        .with_child(upper_neck);

    let hand = PartSpec::new("hand", Size::new(0.05, 0.04, 0.02)).with_joint(
        JointSpec::new(
            AnchorSpec::new().from(Length, Max).from(Thickness, Min),
            AnchorSpec::new().from(Length, Min).from(Thickness, Min),
        )
        .axis(10.0, 10.0, 10.0)
        .mirror(AxisMask::PITCH)
        .limit(JointAxis::Yaw, 20.0)
        .limit(JointAxis::Pitch, 60.0),
    );

    let (parent_anchor, child_anchor) = end_to_start();
    let lower_arm = PartSpec::new("lower_arm", Size::new(0.22, 0.04, 0.03))
        .with_joint(
            JointSpec::new(parent_anchor, child_anchor)
                .axis(0.0, -80.0, 80.0)
                .mirror(AxisMask::YAW)
                .limit(JointAxis::Yaw, 80.0)
                .limit(JointAxis::Roll, 80.0),
        )
        .with_child(hand);

    PartSpec::new("chest", Size::new(0.2, 0.3, 0.08))
        .with_child(lower_neck)
        .with_child(shoulder().with_child(upper_arm().with_child(lower_arm)))
}

/// 胸 + 一条对称的 肩 → 上臂 → 前臂
pub fn symmetric_arm() -> PartSpec {
    let (parent_anchor, child_anchor) = end_to_start();
    let lower_arm = PartSpec::new("lower_arm", Size::new(0.22, 0.04, 0.03)).with_joint(
        JointSpec::new(parent_anchor, child_anchor)
            .limit(JointAxis::Pitch, 120.0)
            .limit(JointAxis::Yaw, 10.0),
    );

    PartSpec::new("chest", Size::new(0.2, 0.3, 0.08))
        .with_child(shoulder().with_child(upper_arm().with_child(lower_arm)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_counts() {
        // 胸 + 颈×2 + 头 + 2 × (肩 + 上臂 + 前臂 + 手)
        assert_eq!(simple_human_top().baked_count(), 12);
        assert_eq!(symmetric_arm().baked_count(), 7);
    }

    #[test]
    fn test_only_root_lacks_joint() {
        fn walk(spec: &PartSpec, is_root: bool) {
            assert_eq!(spec.joint.is_none(), is_root, "{}", spec.id);
            for child in &spec.children {
                walk(child, false);
            }
        }
        walk(&simple_human_top(), true);
        walk(&symmetric_arm(), true);
    }
}
