/// 摄像头输入系统
///
/// 单线程阻塞式读取: 主循环每次迭代同步等一帧, 不开采集线程,
/// 帧速自然被摄像头节流。文件: `camera.rs`
use anyhow::{Context, Result};
use nokhwa::utils::ApiBackend;

pub mod camera;

pub use camera::CameraSource;

/// 可用视频设备描述
#[derive(Debug, Clone)]
pub struct VideoDevice {
    pub index: String,
    pub name: String,
}

/// 枚举系统可用摄像头
pub fn get_camera_devices() -> Result<Vec<VideoDevice>> {
    let devices = nokhwa::query(ApiBackend::Auto).context("枚举摄像头设备失败")?;
    Ok(devices
        .into_iter()
        .map(|info| VideoDevice {
            index: info.index().to_string(),
            name: info.human_name(),
        })
        .collect())
}
