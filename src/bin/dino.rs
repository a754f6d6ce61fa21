//! Dino手势跳跃控制器
//!
//! 摄像头里的上移动作 → 合成空格按键, 配合chrome小恐龙等按空格跳跃的游戏。
//!
//! 运行:
//!   cargo run --release --bin dino                 # 手势模式 (食指指尖)
//!   cargo run --release --bin dino -- --mode pose  # 姿态模式 (左肩)
//!
//! 按键: ESC/q 退出, s 保存快照
use clap::Parser;
use macroquad::prelude::next_frame;

use gesture_cam_rs::config::Args;
use gesture_cam_rs::input::CameraSource;
use gesture_cam_rs::keyout::GameInput;
use gesture_cam_rs::models::build_landmark_model;
use gesture_cam_rs::overlay::{self, Shape};
use gesture_cam_rs::render::{self, FrameView};
use gesture_cam_rs::trigger::JumpDetector;
use gesture_cam_rs::PipelineError;

/// 推理失败诊断打印上限, 超过后静默
const MAX_INFERENCE_WARNINGS: u32 = 3;

fn window_conf() -> macroquad::prelude::Conf {
    render::conf("🦖 Dino 手势跳跃控制")
}

#[macroquad::main(window_conf)]
async fn main() {
    let args = Args::parse();
    if let Err(e) = run(args).await {
        eprintln!("❌ {:#}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    println!(
        "🚀 Dino手势跳跃控制器 | 模式 {:?} | 阈值 {:.3} | 镜像 {}",
        args.mode,
        args.threshold,
        args.mirror()
    );

    // 启动期任何一步失败都直接退出, 进入主循环后不再终止
    let mut model = build_landmark_model(&args)?;
    model.summary();
    let mut camera = CameraSource::open(args.device)?;
    let mut detector = JumpDetector::with_threshold(args.threshold);
    let mut game = GameInput::new()?;
    let mut view = FrameView::new();

    let tracked = args.mode.tracked_landmark();
    let connections = args.mode.connections();
    let mut inference_failures: u32 = 0;

    loop {
        let mut shapes: Vec<Shape> = Vec::new();

        // 单线程阻塞读帧, 帧速由摄像头节流; 读失败跳过本次迭代
        if let Some(mut frame) = camera.read() {
            if args.mirror() {
                image::imageops::flip_horizontal_in_place(&mut frame);
            }
            let (fw, fh) = (frame.width() as f32, frame.height() as f32);

            match model.detect(&frame) {
                Ok(subjects) => {
                    // 多主体按检测顺序串行喂同一触发器:
                    // 基线跨主体共享, 后一个主体与前一个主体的本帧读数比较
                    for subject in &subjects {
                        shapes.extend(overlay::landmark_shapes(
                            subject,
                            connections,
                            tracked,
                            fw,
                            fh,
                        ));
                        if let Some(y) = subject.y(tracked) {
                            if detector.update(y) {
                                game.press_jump();
                            }
                        }
                    }
                }
                Err(e) => {
                    // 本帧不标注不触发, 触发器基线保留
                    inference_failures += 1;
                    if inference_failures <= MAX_INFERENCE_WARNINGS {
                        let err = PipelineError::PerceptionFailure(format!("{:#}", e));
                        eprintln!("⚠️ {} (第{}次)", err, inference_failures);
                    }
                }
            }

            view.update(&frame);
        }

        view.draw(&shapes);

        if render::snapshot_requested() && view.has_frame() {
            match view.save_snapshot() {
                Ok(name) => println!("📸 已保存快照 {}", name),
                Err(e) => eprintln!("⚠️ {:#}", e),
            }
        }
        if render::quit_requested() {
            break;
        }

        next_frame().await;
    }

    println!("👋 已退出");
    Ok(())
}
