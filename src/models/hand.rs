/// 手部landmark模型 (MediaPipe Hand Landmark, ONNX)
///
/// 输入: 1x3x224x224 RGB [0,1]
/// 输出: 21个landmark的 (x, y, z) 像素坐标 (224空间) + 手部置信度
use anyhow::{Context, Result};
use image::RgbImage;
use ndarray::ArrayViewD;
use ort::session::Session;
use ort::value::Tensor;

use crate::models::{chw_tensor, load_session, resize_rgb, LandmarkModel};
use crate::{Landmark, LandmarkSet, HAND_LANDMARK_COUNT};

/// 模型输入尺寸
const INPUT_SIZE: u32 = 224;

// tflite→onnx转换后的张量名
const INPUT_NAME: &str = "input";
const OUTPUT_LANDMARKS: &str = "xyz_x21";
const OUTPUT_SCORE: &str = "hand_score";

pub struct HandLandmarker {
    session: Session,
    model_path: String,
    min_confidence: f32,
}

impl HandLandmarker {
    pub fn new(model_path: &str, min_confidence: f32) -> Result<Self> {
        println!("🖐 加载手部landmark模型: {}", model_path);
        let session = load_session(model_path)?;
        Ok(Self {
            session,
            model_path: model_path.to_string(),
            min_confidence,
        })
    }
}

impl LandmarkModel for HandLandmarker {
    fn detect(&mut self, frame: &RgbImage) -> Result<Vec<LandmarkSet>> {
        let rgb = resize_rgb(frame, INPUT_SIZE, INPUT_SIZE)?;
        let input = chw_tensor(&rgb, INPUT_SIZE, INPUT_SIZE, |v| v as f32 / 255.0);

        let tensor = Tensor::from_array(input)?;
        let (flat, score) = {
            let outputs = self
                .session
                .run(ort::inputs![INPUT_NAME => tensor])
                .context("手部模型推理失败")?;

            let landmarks: ArrayViewD<f32> = outputs[OUTPUT_LANDMARKS]
                .try_extract_array()
                .context("提取手部landmark输出失败")?;
            let scores: ArrayViewD<f32> = outputs[OUTPUT_SCORE]
                .try_extract_array()
                .context("提取手部置信度输出失败")?;

            let flat: Vec<f32> = landmarks.iter().copied().collect();
            let score = scores.iter().copied().next().unwrap_or(0.0);
            (flat, score)
        };

        Ok(decode_hand_landmarks(&flat, score, self.min_confidence))
    }

    fn summary(&self) {
        println!(
            "📦 手部landmark模型 | {} | 输入{}x{} | {}个landmark | 置信度下限{:.2}",
            self.model_path, INPUT_SIZE, INPUT_SIZE, HAND_LANDMARK_COUNT, self.min_confidence
        );
    }
}

/// 原始输出 → landmark集合 (坐标归一化到 [0,1])
fn decode_hand_landmarks(flat: &[f32], score: f32, min_confidence: f32) -> Vec<LandmarkSet> {
    if score < min_confidence || flat.len() < HAND_LANDMARK_COUNT * 3 {
        return Vec::new();
    }

    let points = (0..HAND_LANDMARK_COUNT)
        .map(|i| {
            Landmark::new_with_z(
                flat[i * 3] / INPUT_SIZE as f32,
                flat[i * 3 + 1] / INPUT_SIZE as f32,
                flat[i * 3 + 2] / INPUT_SIZE as f32,
            )
        })
        .collect();

    vec![LandmarkSet::new(points, score)]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn synthetic_raw() -> Vec<f32> {
        // 21个landmark, 第i个位于 (i, 2i, 0) 像素
        (0..HAND_LANDMARK_COUNT)
            .flat_map(|i| [i as f32, 2.0 * i as f32, 0.0])
            .collect()
    }

    #[test]
    fn test_decode_normalizes_to_unit_range() {
        let sets = decode_hand_landmarks(&synthetic_raw(), 0.95, 0.7);
        assert_eq!(sets.len(), 1);
        assert_eq!(sets[0].len(), HAND_LANDMARK_COUNT);
        let p8 = sets[0].get(8).unwrap();
        assert!((p8.x() - 8.0 / 224.0).abs() < 1e-6);
        assert!((p8.y() - 16.0 / 224.0).abs() < 1e-6);
    }

    #[test]
    fn test_decode_rejects_low_confidence() {
        assert!(decode_hand_landmarks(&synthetic_raw(), 0.3, 0.7).is_empty());
    }

    #[test]
    fn test_decode_rejects_truncated_output() {
        assert!(decode_hand_landmarks(&[0.0; 10], 0.95, 0.7).is_empty());
    }
}
