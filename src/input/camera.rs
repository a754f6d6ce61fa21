/// 摄像头帧源
///
/// 打开失败是启动期致命错误; 单帧读取失败返回 `None`,
/// 主循环跳过本次迭代继续跑, 前几次失败打印诊断后静默。
use image::RgbImage;
use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{CameraIndex, RequestedFormat, RequestedFormatType};
use nokhwa::Camera;

use crate::PipelineError;

/// 连续失败诊断打印上限, 超过后静默
const MAX_READ_WARNINGS: u32 = 3;

pub struct CameraSource {
    camera: Camera,
    index: u32,
    read_failures: u32,
}

impl CameraSource {
    /// 打开设备并启动取流
    pub fn open(index: u32) -> Result<Self, PipelineError> {
        let requested =
            RequestedFormat::new::<RgbFormat>(RequestedFormatType::AbsoluteHighestFrameRate);
        let mut camera =
            Camera::new(CameraIndex::Index(index), requested).map_err(|e| {
                PipelineError::CannotOpenDevice {
                    index,
                    reason: e.to_string(),
                }
            })?;
        camera
            .open_stream()
            .map_err(|e| PipelineError::CannotOpenDevice {
                index,
                reason: e.to_string(),
            })?;

        let resolution = camera.resolution();
        println!(
            "📷 摄像头 {} 已打开 | {}x{}",
            index,
            resolution.width(),
            resolution.height()
        );

        Ok(Self {
            camera,
            index,
            read_failures: 0,
        })
    }

    /// 阻塞读取一帧并解码为RGB, 失败返回 `None`
    pub fn read(&mut self) -> Option<RgbImage> {
        let decoded = self
            .camera
            .frame()
            .and_then(|buffer| buffer.decode_image::<RgbFormat>());
        match decoded {
            Ok(frame) => {
                self.read_failures = 0;
                Some(frame)
            }
            Err(e) => {
                self.read_failures += 1;
                if self.read_failures <= MAX_READ_WARNINGS {
                    eprintln!(
                        "⚠️ {} (第{}次): {}",
                        PipelineError::FrameReadFailure,
                        self.read_failures,
                        e
                    );
                }
                None
            }
        }
    }

    pub fn width(&self) -> u32 {
        self.camera.resolution().width()
    }

    pub fn height(&self) -> u32 {
        self.camera.resolution().height()
    }

    pub fn index(&self) -> u32 {
        self.index
    }
}

impl Drop for CameraSource {
    fn drop(&mut self) {
        if let Err(e) = self.camera.stop_stream() {
            eprintln!("⚠️ 停止摄像头取流失败: {}", e);
        }
        println!("📷 摄像头 {} 已释放", self.index);
    }
}
