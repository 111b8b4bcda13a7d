//! 关节参数与继承
//!
//! 解析规则：内置默认 ← 父关节已解析值 ← 本关节覆盖。
//! 只在烘焙时合并一次，运行期不再查找。

/// 质量 × 距离的权重，用于计算基础力矩
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TorqueFactors {
    /// 关节之后（到末端）的部件
    pub to_end: f32,
    /// 其余部件
    pub others: f32,
}

/// 马达力矩倍率（乘以基础力矩）
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TorqueSettings {
    pub max: f32,
    /// 未设置时取 -max
    pub min: Option<f32>,
    /// 零驱动时保留的最小力矩比例
    pub floor: f32,
}

/// 回中参数
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CenteringSettings {
    /// 回中偏置的最大值（相对驱动量）
    pub fraction: f32,
    /// 偏离比例超过此值才开始回中
    pub start: f32,
    /// 曲线指数，通常 > 1，只在限位附近产生大偏置
    pub exponent: f32,
}

/// 解析后的关节参数
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct JointSettings {
    pub factors: TorqueFactors,
    pub torque: TorqueSettings,
    /// 马达目标角速度 (rad/s)
    pub max_velocity: f32,
    pub centering: CenteringSettings,
}

impl Default for JointSettings {
    fn default() -> Self {
        Self {
            factors: TorqueFactors {
                to_end: 1.0,
                others: 0.2,
            },
            torque: TorqueSettings {
                max: 10.0,
                min: None,
                floor: 0.1,
            },
            max_velocity: 10.0,
            centering: CenteringSettings {
                fraction: 0.1,
                start: 0.5,
                exponent: 3.0,
            },
        }
    }
}

// ============================================================================
// 覆盖
// ============================================================================

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FactorOverrides {
    pub to_end: Option<f32>,
    pub others: Option<f32>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TorqueOverrides {
    pub max: Option<f32>,
    pub min: Option<f32>,
    pub floor: Option<f32>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CenteringOverrides {
    pub fraction: Option<f32>,
    pub start: Option<f32>,
    pub exponent: Option<f32>,
}

/// 关节本地覆盖，全部可选
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct JointOverrides {
    pub factors: FactorOverrides,
    pub torque: TorqueOverrides,
    pub max_velocity: Option<f32>,
    pub centering: CenteringOverrides,
}

impl JointOverrides {
    pub fn to_end_factor(mut self, v: f32) -> Self {
        self.factors.to_end = Some(v);
        self
    }

    pub fn others_factor(mut self, v: f32) -> Self {
        self.factors.others = Some(v);
        self
    }

    pub fn max_torque(mut self, v: f32) -> Self {
        self.torque.max = Some(v);
        self
    }

    pub fn min_torque(mut self, v: f32) -> Self {
        self.torque.min = Some(v);
        self
    }

    pub fn torque_floor(mut self, v: f32) -> Self {
        self.torque.floor = Some(v);
        self
    }

    pub fn max_velocity(mut self, v: f32) -> Self {
        self.max_velocity = Some(v);
        self
    }

    pub fn centering(mut self, fraction: f32, start: f32, exponent: f32) -> Self {
        self.centering = CenteringOverrides {
            fraction: Some(fraction),
            start: Some(start),
            exponent: Some(exponent),
        };
        self
    }
}

impl JointSettings {
    /// 以 self 为底叠加覆盖值
    pub fn overlay(&self, o: &JointOverrides) -> Self {
        Self {
            factors: TorqueFactors {
                to_end: o.factors.to_end.unwrap_or(self.factors.to_end),
                others: o.factors.others.unwrap_or(self.factors.others),
            },
            torque: TorqueSettings {
                max: o.torque.max.unwrap_or(self.torque.max),
                min: o.torque.min.or(self.torque.min),
                floor: o.torque.floor.unwrap_or(self.torque.floor),
            },
            max_velocity: o.max_velocity.unwrap_or(self.max_velocity),
            centering: CenteringSettings {
                fraction: o.centering.fraction.unwrap_or(self.centering.fraction),
                start: o.centering.start.unwrap_or(self.centering.start),
                exponent: o.centering.exponent.unwrap_or(self.centering.exponent),
            },
        }
    }

    /// 三级合并：内置默认 ← 父关节 ← 本地
    pub fn resolve(parent: Option<&JointSettings>, local: &JointOverrides) -> Self {
        match parent {
            Some(parent) => parent.overlay(local),
            None => Self::default().overlay(local),
        }
    }

    /// 力矩下限倍率
    #[inline]
    pub fn min_factor(&self) -> f32 {
        self.torque.min.unwrap_or(-self.torque.max)
    }
}
