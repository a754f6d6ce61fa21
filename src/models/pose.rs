/// 姿态landmark模型 (MediaPipe Pose Landmark, ONNX)
///
/// 输入: 1x3x256x256 RGB [0,1]
/// 输出: 33个landmark的 (x, y, z, visibility, presence) (256空间) + 人体置信度
use anyhow::{Context, Result};
use image::RgbImage;
use ndarray::ArrayViewD;
use ort::session::Session;
use ort::value::Tensor;

use crate::models::{chw_tensor, load_session, resize_rgb, LandmarkModel};
use crate::{Landmark, LandmarkSet, POSE_LANDMARK_COUNT};

/// 模型输入尺寸
const INPUT_SIZE: u32 = 256;
/// 每个landmark的通道数 (x, y, z, visibility, presence)
const VALUES_PER_LANDMARK: usize = 5;

// tflite→onnx转换后的张量名
const INPUT_NAME: &str = "input";
const OUTPUT_LANDMARKS: &str = "Identity";
const OUTPUT_SCORE: &str = "Identity_1";

pub struct PoseLandmarker {
    session: Session,
    model_path: String,
    min_confidence: f32,
}

impl PoseLandmarker {
    pub fn new(model_path: &str, min_confidence: f32) -> Result<Self> {
        println!("🧍 加载姿态landmark模型: {}", model_path);
        let session = load_session(model_path)?;
        Ok(Self {
            session,
            model_path: model_path.to_string(),
            min_confidence,
        })
    }
}

impl LandmarkModel for PoseLandmarker {
    fn detect(&mut self, frame: &RgbImage) -> Result<Vec<LandmarkSet>> {
        let rgb = resize_rgb(frame, INPUT_SIZE, INPUT_SIZE)?;
        let input = chw_tensor(&rgb, INPUT_SIZE, INPUT_SIZE, |v| v as f32 / 255.0);

        let tensor = Tensor::from_array(input)?;
        let (flat, score) = {
            let outputs = self
                .session
                .run(ort::inputs![INPUT_NAME => tensor])
                .context("姿态模型推理失败")?;

            let landmarks: ArrayViewD<f32> = outputs[OUTPUT_LANDMARKS]
                .try_extract_array()
                .context("提取姿态landmark输出失败")?;
            let scores: ArrayViewD<f32> = outputs[OUTPUT_SCORE]
                .try_extract_array()
                .context("提取姿态置信度输出失败")?;

            let flat: Vec<f32> = landmarks.iter().copied().collect();
            let score = scores.iter().copied().next().unwrap_or(0.0);
            (flat, score)
        };

        Ok(decode_pose_landmarks(&flat, score, self.min_confidence))
    }

    fn summary(&self) {
        println!(
            "📦 姿态landmark模型 | {} | 输入{}x{} | {}个landmark | 置信度下限{:.2}",
            self.model_path, INPUT_SIZE, INPUT_SIZE, POSE_LANDMARK_COUNT, self.min_confidence
        );
    }
}

/// 原始输出 → landmark集合 (坐标归一化到 [0,1])
///
/// 姿态模型单人输出: 有人体则恰好一个主体, 否则空列表。
fn decode_pose_landmarks(flat: &[f32], score: f32, min_confidence: f32) -> Vec<LandmarkSet> {
    if score < min_confidence || flat.len() < POSE_LANDMARK_COUNT * VALUES_PER_LANDMARK {
        return Vec::new();
    }

    let points = (0..POSE_LANDMARK_COUNT)
        .map(|i| {
            let base = i * VALUES_PER_LANDMARK;
            Landmark::new_with_z(
                flat[base] / INPUT_SIZE as f32,
                flat[base + 1] / INPUT_SIZE as f32,
                flat[base + 2] / INPUT_SIZE as f32,
            )
        })
        .collect();

    vec![LandmarkSet::new(points, score)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LEFT_SHOULDER_ID;

    fn synthetic_raw() -> Vec<f32> {
        let mut flat = vec![0.0; POSE_LANDMARK_COUNT * VALUES_PER_LANDMARK];
        // 左肩放在 (128, 64) 像素 → 归一化 (0.5, 0.25)
        let base = LEFT_SHOULDER_ID * VALUES_PER_LANDMARK;
        flat[base] = 128.0;
        flat[base + 1] = 64.0;
        flat
    }

    #[test]
    fn test_decode_left_shoulder() {
        let sets = decode_pose_landmarks(&synthetic_raw(), 0.9, 0.7);
        assert_eq!(sets.len(), 1);
        assert_eq!(sets[0].len(), POSE_LANDMARK_COUNT);
        let shoulder = sets[0].get(LEFT_SHOULDER_ID).unwrap();
        assert!((shoulder.x() - 0.5).abs() < 1e-6);
        assert!((shoulder.y() - 0.25).abs() < 1e-6);
        assert_eq!(sets[0].y(LEFT_SHOULDER_ID), Some(shoulder.y()));
    }

    #[test]
    fn test_decode_rejects_low_confidence() {
        assert!(decode_pose_landmarks(&synthetic_raw(), 0.1, 0.7).is_empty());
    }
}
