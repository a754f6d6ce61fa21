/// 人脸情绪分析 (两级模型)
///
/// 1. Ultraface RFB-320 人脸检测: 输入 1x3x240x320, (v-127)/128 归一化,
///    输出 scores [1,N,2] + boxes [1,N,4] (归一化角点)
/// 2. FER+ 情绪分类: 输入 1x1x64x64 灰度原始像素, 输出8类原始分数
///
/// 零人脸返回空列表, 不算错误。
/// 逐帧推理失败返回 `Err`, 调用方显式选择"本帧不标注, 继续运行"。
use anyhow::{Context, Result};
use image::imageops::FilterType;
use image::RgbImage;
use ndarray::{Array4, ArrayViewD};
use ort::session::Session;
use ort::value::Tensor;

use crate::models::{chw_tensor, load_session, resize_rgb, ZooModel};
use crate::{non_max_suppression, FaceBox, FaceEmotion};

/// FER+的8类情绪标签 (输出顺序固定)
pub const EMOTION_LABELS: [&str; 8] = [
    "neutral",
    "happiness",
    "surprise",
    "sadness",
    "anger",
    "disgust",
    "fear",
    "contempt",
];

/// 检测模型输入尺寸
const DETECT_WIDTH: u32 = 320;
const DETECT_HEIGHT: u32 = 240;
/// 分类模型输入尺寸
const CLASSIFY_SIZE: u32 = 64;
/// 人脸候选框NMS阈值
const IOU_THRESHOLD: f32 = 0.5;

// onnx模型张量名
const DETECT_INPUT: &str = "input";
const DETECT_SCORES: &str = "scores";
const DETECT_BOXES: &str = "boxes";
const CLASSIFY_INPUT: &str = "Input3";
const CLASSIFY_OUTPUT: &str = "Plus692_Output_0";

pub struct FaceAnalyzer {
    detector: Session,
    classifier: Session,
    min_confidence: f32,
}

impl FaceAnalyzer {
    /// 构建两级模型, 首次运行自动下载到缓存目录
    pub fn new(min_confidence: f32) -> Result<Self> {
        let detector_path = ZooModel::UltraFace320.fetch()?;
        let classifier_path = ZooModel::EmotionFerPlus.fetch()?;

        println!("🙂 加载人脸检测模型: {}", detector_path.display());
        let detector = load_session(&detector_path.to_string_lossy())?;
        println!("🎭 加载情绪分类模型: {}", classifier_path.display());
        let classifier = load_session(&classifier_path.to_string_lossy())?;

        Ok(Self {
            detector,
            classifier,
            min_confidence,
        })
    }

    /// 分析一帧: 人脸区域 + 主导情绪, 可能为空
    pub fn analyze(&mut self, frame: &RgbImage) -> Result<Vec<FaceEmotion>> {
        let faces = self.detect_faces(frame)?;

        let mut results = Vec::with_capacity(faces.len());
        for region in faces {
            let (dominant_emotion, confidence) = self.classify_face(frame, &region)?;
            results.push(FaceEmotion {
                region,
                dominant_emotion,
                confidence,
            });
        }
        Ok(results)
    }

    pub fn summary(&self) {
        println!(
            "📦 情绪分析 | Ultraface {}x{} + FER+ {}x{} | 置信度下限{:.2}",
            DETECT_WIDTH, DETECT_HEIGHT, CLASSIFY_SIZE, CLASSIFY_SIZE, self.min_confidence
        );
    }

    fn detect_faces(&mut self, frame: &RgbImage) -> Result<Vec<FaceBox>> {
        let rgb = resize_rgb(frame, DETECT_WIDTH, DETECT_HEIGHT)?;
        let input = chw_tensor(&rgb, DETECT_WIDTH, DETECT_HEIGHT, |v| {
            (v as f32 - 127.0) / 128.0
        });

        let tensor = Tensor::from_array(input)?;
        let (scores, boxes) = {
            let outputs = self
                .detector
                .run(ort::inputs![DETECT_INPUT => tensor])
                .context("人脸检测推理失败")?;

            let scores: ArrayViewD<f32> = outputs[DETECT_SCORES]
                .try_extract_array()
                .context("提取人脸分数输出失败")?;
            let boxes: ArrayViewD<f32> = outputs[DETECT_BOXES]
                .try_extract_array()
                .context("提取人脸框输出失败")?;

            (
                scores.iter().copied().collect::<Vec<f32>>(),
                boxes.iter().copied().collect::<Vec<f32>>(),
            )
        };

        Ok(decode_face_boxes(
            &scores,
            &boxes,
            frame.width() as f32,
            frame.height() as f32,
            self.min_confidence,
        ))
    }

    fn classify_face(&mut self, frame: &RgbImage, region: &FaceBox) -> Result<(String, f32)> {
        let gray = crop_to_gray(frame, region);

        let mut input = Array4::<f32>::zeros((1, 1, CLASSIFY_SIZE as usize, CLASSIFY_SIZE as usize));
        for (x, y, pixel) in gray.enumerate_pixels() {
            input[[0, 0, y as usize, x as usize]] = pixel.0[0] as f32;
        }

        let tensor = Tensor::from_array(input)?;
        let raw = {
            let outputs = self
                .classifier
                .run(ort::inputs![CLASSIFY_INPUT => tensor])
                .context("情绪分类推理失败")?;

            let raw: ArrayViewD<f32> = outputs[CLASSIFY_OUTPUT]
                .try_extract_array()
                .context("提取情绪分数输出失败")?;
            raw.iter().copied().collect::<Vec<f32>>()
        };

        Ok(dominant_emotion(&raw))
    }
}

/// 裁剪人脸区域并转为灰度分类输入 (区域越界时夹取到帧内)
fn crop_to_gray(frame: &RgbImage, region: &FaceBox) -> image::GrayImage {
    let fw = frame.width();
    let fh = frame.height();
    let x = (region.xmin().max(0.0) as u32).min(fw.saturating_sub(1));
    let y = (region.ymin().max(0.0) as u32).min(fh.saturating_sub(1));
    let w = (region.width() as u32).clamp(1, fw - x);
    let h = (region.height() as u32).clamp(1, fh - y);

    let crop = image::imageops::crop_imm(frame, x, y, w, h).to_image();
    image::DynamicImage::ImageRgb8(crop)
        .resize_exact(CLASSIFY_SIZE, CLASSIFY_SIZE, FilterType::Triangle)
        .to_luma8()
}

/// 检测输出解码: 过滤低置信度候选, 还原像素坐标, NMS去重
fn decode_face_boxes(
    scores: &[f32],
    boxes: &[f32],
    frame_width: f32,
    frame_height: f32,
    min_confidence: f32,
) -> Vec<FaceBox> {
    let count = (scores.len() / 2).min(boxes.len() / 4);
    let mut candidates = Vec::new();

    for i in 0..count {
        let confidence = scores[i * 2 + 1];
        if confidence < min_confidence {
            continue;
        }
        let x1 = boxes[i * 4] * frame_width;
        let y1 = boxes[i * 4 + 1] * frame_height;
        let x2 = boxes[i * 4 + 2] * frame_width;
        let y2 = boxes[i * 4 + 3] * frame_height;
        if x2 <= x1 || y2 <= y1 {
            continue;
        }
        candidates.push(FaceBox::new(x1, y1, x2 - x1, y2 - y1, confidence));
    }

    non_max_suppression(&mut candidates, IOU_THRESHOLD);
    candidates
}

/// 原始分数 → softmax → 主导情绪 (标签, 概率)
fn dominant_emotion(raw: &[f32]) -> (String, f32) {
    let probs = softmax(raw);
    let (best, prob) = probs
        .iter()
        .copied()
        .enumerate()
        .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap())
        .unwrap_or((0, 0.0));
    let label = EMOTION_LABELS.get(best).copied().unwrap_or("neutral");
    (label.to_string(), prob)
}

fn softmax(raw: &[f32]) -> Vec<f32> {
    if raw.is_empty() {
        return Vec::new();
    }
    let max = raw.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = raw.iter().map(|v| (v - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.into_iter().map(|v| v / sum).collect()
}
