//! 数值工具

use glam::{Quat, Vec3};

use crate::axes::{JointAxes, JointAxis};

#[inline]
pub fn lerp(min: f32, max: f32, t: f32) -> f32 {
    min + (max - min) * t
}

/// lerp 的逆运算，区间宽度为 0 时返回 `zero_width_value`
#[inline]
pub fn unlerp(min: f32, max: f32, v: f32, zero_width_value: f32) -> f32 {
    let delta = max - min;
    if delta.abs() <= f32::EPSILON {
        return zero_width_value;
    }
    (v - min) / delta
}

/// yaw → pitch → roll 顺序组合的旋转（角度制）
///
/// 每个分量绕其对应的部件局部原始轴旋转：q = R(Z, yaw) · R(X, pitch) · R(Y, roll)
pub fn ypr_to_quat(angles: &JointAxes<f32>) -> Quat {
    let mut q = Quat::IDENTITY;
    for axis in JointAxis::ALL {
        let angle = angles[axis];
        if angle != 0.0 {
            q *= Quat::from_axis_angle(axis.config().raw_axis.unit(), angle.to_radians());
        }
    }
    q
}

/// 质量加权质心，总质量为 0（空集或全为静态刚体）时返回 None
pub fn center_of_mass<I>(bodies: I) -> Option<Vec3>
where
    I: IntoIterator<Item = (f32, Vec3)>,
{
    let mut total_mass = 0.0;
    let mut weighted = Vec3::ZERO;
    for (mass, position) in bodies {
        if mass <= 0.0 {
            continue;
        }
        weighted += position * mass;
        total_mass += mass;
    }
    if total_mass > 0.0 {
        Some(weighted / total_mass)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unlerp_zero_width() {
        assert_eq!(unlerp(1.0, 1.0, 1.0, 0.5), 0.5);
        assert!((unlerp(0.5, 1.0, 0.75, 0.0) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_ypr_order() {
        let q = ypr_to_quat(&JointAxes::new(90.0, 0.0, 0.0));
        // 绕 Z 旋转 90°：Y 轴转到 -X
        let twist = q * Vec3::Y;
        assert!((twist - Vec3::NEG_X).length() < 1e-5);
    }

    #[test]
    fn test_center_of_mass_skips_static() {
        let com = center_of_mass([(0.0, Vec3::new(100.0, 0.0, 0.0)), (2.0, Vec3::ONE)]);
        assert_eq!(com, Some(Vec3::ONE));
        assert_eq!(center_of_mass([(0.0, Vec3::ONE)]), None);
        assert_eq!(center_of_mass(std::iter::empty()), None);
    }
}
