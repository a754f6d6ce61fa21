//! 情绪标注摄像头
//!
//! 每帧检测人脸并标注主导情绪, 不做镜像翻转, 不做跨帧平滑。
//! 模型首次运行自动下载到用户缓存目录。
//!
//! 运行:
//!   cargo run --release --bin emotion
//!
//! 按键: ESC/q 退出, s 保存快照
use clap::Parser;
use macroquad::prelude::next_frame;

use gesture_cam_rs::input::CameraSource;
use gesture_cam_rs::models::FaceAnalyzer;
use gesture_cam_rs::overlay::{self, Shape};
use gesture_cam_rs::render::{self, FrameView};
use gesture_cam_rs::PipelineError;

/// 推理失败诊断打印上限, 超过后静默
const MAX_INFERENCE_WARNINGS: u32 = 3;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "情绪标注摄像头 - 人脸框 + 主导情绪", long_about = None)]
struct Args {
    /// 摄像头设备索引
    #[arg(short, long, default_value_t = 0)]
    device: u32,

    /// 人脸检测置信度下限
    #[arg(long, default_value_t = 0.7)]
    min_confidence: f32,
}

fn window_conf() -> macroquad::prelude::Conf {
    render::conf("🎭 情绪标注摄像头")
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
        "🚀 情绪标注摄像头 | 设备 {} | 置信度下限 {:.2}",
        args.device, args.min_confidence
    );

    let mut analyzer = FaceAnalyzer::new(args.min_confidence)?;
    analyzer.summary();
    let mut camera = CameraSource::open(args.device)?;
    let mut view = FrameView::new();

    let mut inference_failures: u32 = 0;

    loop {
        let mut shapes: Vec<Shape> = Vec::new();

        if let Some(frame) = camera.read() {
            // 零人脸是正常路径 (空列表), 只有推理本身失败才走Err分支
            match analyzer.analyze(&frame) {
                Ok(faces) => shapes = overlay::face_shapes(&faces),
                Err(e) => {
                    // 本帧不标注, 循环继续
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
