/// 已知模型的下载缓存
///
/// 情绪链路的两个模型体积小且有固定的官方发布地址,
/// 首次运行自动下载到用户缓存目录, 之后直接复用。
use std::fs;
use std::io;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};

/// onnx/models仓库的固定提交, 避免上游挪动文件
const ZOO_COMMIT: &str = "5faef4c33eba0395177850e1e31c4a6a9e634c82";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZooModel {
    /// Ultraface RFB-320 人脸检测
    UltraFace320,
    /// FER+ 情绪分类
    EmotionFerPlus,
}

impl ZooModel {
    pub fn url(&self) -> String {
        let path = match self {
            ZooModel::UltraFace320 => "vision/body_analysis/ultraface/models/version-RFB-320.onnx",
            ZooModel::EmotionFerPlus => {
                "vision/body_analysis/emotion_ferplus/model/emotion-ferplus-8.onnx"
            }
        };
        format!(
            "https://github.com/onnx/models/raw/{}/{}",
            ZOO_COMMIT, path
        )
    }

    pub fn file_name(&self) -> &'static str {
        match self {
            ZooModel::UltraFace320 => "version-RFB-320.onnx",
            ZooModel::EmotionFerPlus => "emotion-ferplus-8.onnx",
        }
    }

    /// 缓存位置: `<用户缓存目录>/gesture-cam-rs/<文件名>`
    pub fn cache_path(&self) -> Result<PathBuf> {
        let dir = dirs::cache_dir()
            .ok_or_else(|| anyhow!("无法定位用户缓存目录"))?
            .join("gesture-cam-rs");
        Ok(dir.join(self.file_name()))
    }

    /// 返回本地模型路径, 不存在时先下载
    pub fn fetch(&self) -> Result<PathBuf> {
        let path = self.cache_path()?;
        if path.exists() {
            return Ok(path);
        }

        let dir = path
            .parent()
            .ok_or_else(|| anyhow!("缓存路径没有父目录: {}", path.display()))?;
        fs::create_dir_all(dir)
            .with_context(|| format!("创建缓存目录失败: {}", dir.display()))?;

        let url = self.url();
        println!("⬇️ 下载模型 {} -> {}", url, path.display());

        // 先写临时文件再改名, 中断不会留下半截模型
        let tmp = path.with_extension("onnx.part");
        let response = ureq::get(&url)
            .call()
            .with_context(|| format!("下载模型失败: {}", url))?;
        let mut file = fs::File::create(&tmp)
            .with_context(|| format!("创建临时文件失败: {}", tmp.display()))?;
        io::copy(&mut response.into_reader(), &mut file)
            .with_context(|| format!("写入模型文件失败: {}", tmp.display()))?;
        fs::rename(&tmp, &path)
            .with_context(|| format!("落盘模型文件失败: {}", path.display()))?;

        Ok(path)
    }
}
