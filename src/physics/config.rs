//! 物理与控制配置
//!
//! 所有参数扁平化，直接在代码中修改默认值即可。

use once_cell::sync::Lazy;
use std::sync::RwLock;

/// 物理配置（扁平化，不嵌套）
#[derive(Debug, Clone)]
pub struct PhysicsConfig {
    // ========== 重力 ==========
    /// 重力 Y 分量（负数向下），默认 -9.81
    pub gravity_y: f32,

    // ========== 模拟参数 ==========
    /// 物理 FPS，默认 60.0
    pub physics_fps: f32,

    // ========== 刚体阻尼 ==========
    /// 角速度阻尼，默认 10.0
    /// 马达只给速度目标，阻尼负责吸收多余的旋转
    pub angular_damping: f32,
    /// 线性阻尼，默认 0.0
    pub linear_damping: f32,

    // ========== 马达 ==========
    /// 速度马达增益（Rapier motor factor），默认 100.0
    pub motor_velocity_gain: f32,

    // ========== 碰撞 / 休眠 ==========
    /// 关节相连的父子刚体之间不产生碰撞，默认 true
    pub disable_parent_child_collisions: bool,
    /// 允许刚体休眠，默认 true
    pub allow_sleeping: bool,

    // ========== 调试 ==========
    /// 是否输出调试日志，默认 false
    pub debug_log: bool,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            // ====== 重力 ======
            // 部件尺寸以米为单位，使用真实重力
            gravity_y: -9.81,

            // ====== 模拟参数 ======
            // 控制器在每个物理步之前运行一次
            physics_fps: 60.0,

            // ====== 刚体阻尼 ======
            angular_damping: 10.0,
            linear_damping: 0.0,

            // ====== 马达 ======
            // 增益越大越接近目标角速度，实际力矩由 max force 截断
            motor_velocity_gain: 100.0,

            // ====== 碰撞 / 休眠 ======
            disable_parent_child_collisions: true,
            allow_sleeping: true,

            // ====== 调试 ======
            debug_log: false,
        }
    }
}

/// 全局配置实例
static PHYSICS_CONFIG: Lazy<RwLock<PhysicsConfig>> = Lazy::new(|| {
    RwLock::new(PhysicsConfig::default())
});

/// 获取当前配置（只读）
pub fn get_config() -> PhysicsConfig {
    PHYSICS_CONFIG.read().unwrap_or_else(|e| e.into_inner()).clone()
}

/// 手动设置配置（用于运行时调试）
pub fn set_config(config: PhysicsConfig) {
    *PHYSICS_CONFIG.write().unwrap_or_else(|e| e.into_inner()) = config;
}

/// 重置为默认配置
pub fn reset_config() {
    *PHYSICS_CONFIG.write().unwrap_or_else(|e| e.into_inner()) = PhysicsConfig::default();
}
