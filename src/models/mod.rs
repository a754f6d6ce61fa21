/// 感知模型统一接口与实现
///
/// # 架构说明
///
/// 所有感知模型都是外部黑盒, 通过固定契约消费, 本仓库不实现任何推理引擎:
///
/// - **HandLandmarker / PoseLandmarker**: landmark模型, 实现 [`LandmarkModel`] trait,
///   每帧返回0个或多个主体的归一化landmark集合。文件: `hand.rs`, `pose.rs`
/// - **FaceAnalyzer**: 人脸检测 + 情绪分类两级模型, 每帧返回0个或多个
///   [`FaceEmotion`] 记录, 零人脸不算错误。文件: `emotion.rs`
/// - **zoo**: 已知模型的下载缓存。文件: `zoo.rs`
///
/// ## 核心流程
/// ```text
/// 原始帧 → preprocess → ndarray张量
///        ↓
///    ort推理 run
///        ↓
///    原始输出 → postprocess → landmark集合 / 情绪记录
/// ```
///
/// ## 错误策略
/// 模型加载失败是启动期致命错误; 逐帧推理失败返回 `Err`,
/// 由调用方在显式分支里选择忽略并继续 (不做隐式捕获)。
use anyhow::{Context, Result};
use image::RgbImage;
use ndarray::Array4;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;

use crate::config::{Args, Mode};
use crate::LandmarkSet;

pub mod emotion;
pub mod hand;
pub mod pose;
pub mod zoo;

pub use emotion::{FaceAnalyzer, EMOTION_LABELS};
pub use hand::HandLandmarker;
pub use pose::PoseLandmarker;
pub use zoo::ZooModel;

/// landmark感知模型统一接口
pub trait LandmarkModel {
    /// 检测一帧中的所有主体, 返回归一化landmark集合 (可能为空)。
    /// 单帧失败返回 `Err`, 由调用方决定忽略策略。
    fn detect(&mut self, frame: &RgbImage) -> Result<Vec<LandmarkSet>>;

    /// 打印模型信息
    fn summary(&self);
}

/// 按模式构建landmark模型 (进程启动时一次性分发, 运行期无模式分支)
pub fn build_landmark_model(args: &Args) -> Result<Box<dyn LandmarkModel>> {
    let path = args.model_path();
    Ok(match args.mode {
        Mode::Hand => Box::new(HandLandmarker::new(&path, args.min_confidence)?),
        Mode::Pose => Box::new(PoseLandmarker::new(&path, args.min_confidence)?),
    })
}

/// 加载ONNX会话 (各模型共用)
pub(crate) fn load_session(path: &str) -> Result<Session> {
    let session = Session::builder()?
        .with_optimization_level(GraphOptimizationLevel::Level3)?
        .commit_from_file(path)
        .with_context(|| format!("加载ONNX模型失败: {}", path))?;
    Ok(session)
}

/// 缩放RGB帧到模型输入尺寸 (Nearest插值, 速度优先)
pub(crate) fn resize_rgb(frame: &RgbImage, width: u32, height: u32) -> Result<Vec<u8>> {
    use fast_image_resize as fr;

    let src = fr::images::Image::from_vec_u8(
        frame.width(),
        frame.height(),
        frame.as_raw().clone(),
        fr::PixelType::U8x3,
    )
    .context("构建缩放源图像失败")?;
    let mut dst = fr::images::Image::new(width, height, fr::PixelType::U8x3);

    let mut resizer = fr::Resizer::new();
    resizer
        .resize(
            &src,
            &mut dst,
            &fr::ResizeOptions::new().resize_alg(fr::ResizeAlg::Nearest),
        )
        .context("缩放帧失败")?;

    Ok(dst.into_vec())
}

/// RGB字节 → NCHW张量, 逐通道应用归一化函数
pub(crate) fn chw_tensor<F: Fn(u8) -> f32>(
    rgb: &[u8],
    width: u32,
    height: u32,
    normalize: F,
) -> Array4<f32> {
    let (w, h) = (width as usize, height as usize);
    let mut tensor = Array4::<f32>::zeros((1, 3, h, w));
    for y in 0..h {
        for x in 0..w {
            let idx = (y * w + x) * 3;
            tensor[[0, 0, y, x]] = normalize(rgb[idx]);
            tensor[[0, 1, y, x]] = normalize(rgb[idx + 1]);
            tensor[[0, 2, y, x]] = normalize(rgb[idx + 2]);
        }
    }
    tensor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chw_tensor_layout() {
        // 2x1 两像素: (10,20,30) 和 (40,50,60)
        let rgb = [10u8, 20, 30, 40, 50, 60];
        let t = chw_tensor(&rgb, 2, 1, |v| v as f32);
        assert_eq!(t.shape(), &[1, 3, 1, 2]);
        assert_eq!(t[[0, 0, 0, 0]], 10.0); // R像素0
        assert_eq!(t[[0, 0, 0, 1]], 40.0); // R像素1
        assert_eq!(t[[0, 1, 0, 0]], 20.0); // G像素0
        assert_eq!(t[[0, 2, 0, 1]], 60.0); // B像素1
    }

    #[test]
    fn test_resize_rgb_dimensions() {
        let frame = RgbImage::from_pixel(8, 8, image::Rgb([100, 150, 200]));
        let out = resize_rgb(&frame, 4, 2).unwrap();
        assert_eq!(out.len(), 4 * 2 * 3);
        // 纯色图缩放后仍是纯色
        assert!(out.chunks_exact(3).all(|p| p == [100, 150, 200]));
    }
}
