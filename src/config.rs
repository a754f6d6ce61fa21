/// CLI参数与模式选择
///
/// 模式在进程启动时一次性确定, 同时决定感知模型与追踪landmark编号,
/// 运行期不做任何字符串分支。
use clap::{Parser, ValueEnum};

use crate::{
    HAND_CONNECTIONS, HAND_LANDMARK_COUNT, INDEX_TIP_ID, LEFT_SHOULDER_ID, POSE_CONNECTIONS,
    POSE_LANDMARK_COUNT,
};

/// 输入模式 (封闭枚举, 启动时固定)
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// 手势模式: 追踪食指指尖
    Hand,
    /// 姿态模式: 追踪左肩
    Pose,
}

impl Mode {
    /// 该模式下追踪的landmark编号
    pub fn tracked_landmark(&self) -> usize {
        match self {
            Mode::Hand => INDEX_TIP_ID,
            Mode::Pose => LEFT_SHOULDER_ID,
        }
    }

    /// 该模式下模型输出的landmark总数
    pub fn landmark_count(&self) -> usize {
        match self {
            Mode::Hand => HAND_LANDMARK_COUNT,
            Mode::Pose => POSE_LANDMARK_COUNT,
        }
    }

    /// 骨架连接表 (标注绘制用)
    pub fn connections(&self) -> &'static [(usize, usize)] {
        match self {
            Mode::Hand => &HAND_CONNECTIONS,
            Mode::Pose => &POSE_CONNECTIONS,
        }
    }

    /// 默认模型路径
    pub fn default_model_path(&self) -> &'static str {
        match self {
            Mode::Hand => "models/hand_landmark.onnx",
            Mode::Pose => "models/pose_landmark.onnx",
        }
    }
}

/// Dino手势跳跃控制器参数
#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Dino手势跳跃控制器 - 摄像头动作转按键", long_about = None)]
pub struct Args {
    /// 输入模式: hand=手势(食指指尖), pose=姿态(左肩)
    #[arg(short, long, value_enum, default_value_t = Mode::Hand)]
    pub mode: Mode,

    /// 摄像头设备索引
    #[arg(short, long, default_value_t = 0)]
    pub device: u32,

    /// 跳跃触发阈值 (归一化帧高比例, 越小越灵敏)
    #[arg(short, long, default_value_t = 0.05)]
    pub threshold: f32,

    /// landmark模型路径 (默认按模式取 models/ 下的模型)
    #[arg(long)]
    pub model: Option<String>,

    /// 检测置信度下限
    #[arg(long, default_value_t = 0.7)]
    pub min_confidence: f32,

    /// 关闭镜像(自拍)翻转
    #[arg(long)]
    pub no_mirror: bool,
}

impl Args {
    pub fn model_path(&self) -> String {
        self.model
            .clone()
            .unwrap_or_else(|| self.mode.default_model_path().to_string())
    }

    pub fn mirror(&self) -> bool {
        !self.no_mirror
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_defaults() {
        let args = Args::parse_from(["dino"]);
        assert_eq!(args.mode, Mode::Hand);
        assert_eq!(args.device, 0);
        assert_eq!(args.threshold, 0.05);
        assert!(args.mirror());
        assert_eq!(args.model_path(), "models/hand_landmark.onnx");
    }

    #[test]
    fn test_mode_parse() {
        let args = Args::parse_from(["dino", "--mode", "pose"]);
        assert_eq!(args.mode, Mode::Pose);
        assert_eq!(args.model_path(), "models/pose_landmark.onnx");
    }

    #[test]
    fn test_invalid_mode_rejected() {
        // 非法模式在任何资源获取之前被拒绝
        assert!(Args::try_parse_from(["dino", "--mode", "face"]).is_err());
    }

    #[test]
    fn test_tracked_landmark_per_mode() {
        assert_eq!(Mode::Hand.tracked_landmark(), INDEX_TIP_ID);
        assert_eq!(Mode::Pose.tracked_landmark(), LEFT_SHOULDER_ID);
    }

    #[test]
    fn test_connections_within_range() {
        for &(a, b) in Mode::Hand.connections() {
            assert!(a < HAND_LANDMARK_COUNT && b < HAND_LANDMARK_COUNT);
        }
        for &(a, b) in Mode::Pose.connections() {
            assert!(a < POSE_LANDMARK_COUNT && b < POSE_LANDMARK_COUNT);
        }
    }
}
