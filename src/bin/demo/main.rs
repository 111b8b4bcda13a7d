//! 无界面演示：把上半身人形放进 Rapier 世界，驱动左上臂并打印关节状态
//!
//! 运行：`RUST_LOG=info cargo run --features demo --bin demo`

use creature_rig::physics::{get_config, set_config};
use creature_rig::presets;
use creature_rig::{ControlDirection, Creature, JointAxis, RapierWorld};
use glam::{Quat, Vec3};

const TICKS: u32 = 240;
const REPORT_EVERY: u32 = 30;
/// 抬臂 / 放臂一个来回的 tick 数
const SWING_PERIOD: u32 = 120;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if std::env::args().any(|a| a == "--debug") {
        let mut config = get_config();
        config.debug_log = true;
        set_config(config);
    }

    if let Err(e) = run() {
        log::error!("Demo 失败: {e}");
        std::process::exit(1);
    }
}

fn run() -> creature_rig::Result<()> {
    let mut world = RapierWorld::new();
    world.add_floor(0.0);

    // 胸部固定在空中
    let spec = presets::simple_human_top().density(0.0);
    let mut creature = Creature::build(&spec, Vec3::new(0.0, 1.4, 0.0), Quat::IDENTITY, &mut world)?;

    log::info!(
        "刚体 {} 个, 关节 {} 个, 对称对 {:?}",
        world.rigid_body_count(),
        world.joint_count(),
        creature.mirrored_pairs()
    );

    for tick in 0..TICKS {
        // 每个周期前半抬臂，后半放下
        let phase = (tick % SWING_PERIOD) as f32 / SWING_PERIOD as f32;
        let direction = ControlDirection::from_sign((phase * std::f32::consts::TAU).sin());
        for arm in ["l_upper_arm", "r_upper_arm"] {
            creature.set_control(arm, JointAxis::Pitch, direction)?;
        }

        creature.update(&mut world)?;
        world.step();

        if tick % REPORT_EVERY == 0 {
            for name in ["l_upper_arm", "r_upper_arm", "head"] {
                if let Some(state) = creature.joint_state(name) {
                    log::info!(
                        "[{tick:>3}] {name:<12} deviation=({:+.3}, {:+.3}, {:+.3}) drive=({:+.3}, {:+.3}, {:+.3})",
                        state.deviation.yaw,
                        state.deviation.pitch,
                        state.deviation.roll,
                        state.drive.yaw,
                        state.drive.pitch,
                        state.drive.roll
                    );
                }
            }
        }
    }

    log::info!("完成 {} 次控制 tick", creature.tick_count());
    Ok(())
}
