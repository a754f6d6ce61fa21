pub mod config; // CLI参数与模式选择
pub mod input; // 摄像头输入系统
pub mod keyout; // 合成按键输出
pub mod models; // 感知模型接口与具体实现
pub mod overlay; // 标注图元计算
pub mod render; // macroquad渲染
pub mod trigger; // 跳跃触发检测器 (核心逻辑)

pub use crate::config::{Args, Mode};
pub use crate::trigger::{JumpDetector, TriggerSettings};

use thiserror::Error;

/// 流水线错误分类
///
/// 传播策略: 只有启动期错误 (打不开设备、模型加载失败) 才终止进程;
/// 逐帧错误一律就地吸收, 保证交互循环不中断。
/// 非法 `--mode` 由 clap 在任何资源获取之前拒绝。
#[derive(Debug, Error)]
pub enum PipelineError {
    /// 摄像头无法打开 (启动期致命错误)
    #[error("无法打开摄像头设备 {index}: {reason}")]
    CannotOpenDevice { index: u32, reason: String },

    /// 单帧读取失败 (就地恢复: 跳过本次迭代)
    #[error("读取摄像头帧失败")]
    FrameReadFailure,

    /// 感知模型单帧推理失败 (就地恢复: 本帧不标注)
    #[error("感知模型推理失败: {0}")]
    PerceptionFailure(String),
}

// ========== 公共常量 ==========

/// 食指指尖landmark编号 (hand模式追踪点)
pub const INDEX_TIP_ID: usize = 8;
/// 左肩landmark编号 (pose模式追踪点)
pub const LEFT_SHOULDER_ID: usize = 11;

/// 手部landmark总数 (MediaPipe手部模型)
pub const HAND_LANDMARK_COUNT: usize = 21;
/// 姿态landmark总数 (MediaPipe姿态模型)
pub const POSE_LANDMARK_COUNT: usize = 33;

/// 手部骨架连接表 (腕→拇指/食指/中指/无名指/小指)
pub const HAND_CONNECTIONS: [(usize, usize); 21] = [
    (0, 1),
    (1, 2),
    (2, 3),
    (3, 4),
    (0, 5),
    (5, 6),
    (6, 7),
    (7, 8),
    (5, 9),
    (9, 10),
    (10, 11),
    (11, 12),
    (9, 13),
    (13, 14),
    (14, 15),
    (15, 16),
    (13, 17),
    (17, 18),
    (18, 19),
    (19, 20),
    (0, 17),
];

/// 姿态骨架连接表 (躯干 + 四肢)
pub const POSE_CONNECTIONS: [(usize, usize); 20] = [
    (11, 12),
    (11, 13),
    (13, 15),
    (12, 14),
    (14, 16),
    (11, 23),
    (12, 24),
    (23, 24),
    (23, 25),
    (25, 27),
    (24, 26),
    (26, 28),
    (27, 29),
    (29, 31),
    (28, 30),
    (30, 32),
    (27, 31),
    (28, 32),
    (15, 21),
    (16, 22),
];

// ========== 共享数据结构 ==========

/// 归一化landmark点 (0.0左上 → 1.0右下, y越小越靠上)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Landmark {
    x: f32,
    y: f32,
    z: f32,
}

impl Landmark {
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            ..Default::default()
        }
    }

    pub fn new_with_z(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn x(&self) -> f32 {
        self.x
    }

    pub fn y(&self) -> f32 {
        self.y
    }

    pub fn z(&self) -> f32 {
        self.z
    }
}

/// 单个检测主体的landmark集合, 每帧由感知模型重新产出, 不跨帧保留
#[derive(Debug, Clone, Default)]
pub struct LandmarkSet {
    points: Vec<Landmark>,
    score: f32,
}

impl LandmarkSet {
    pub fn new(points: Vec<Landmark>, score: f32) -> Self {
        Self { points, score }
    }

    pub fn points(&self) -> &[Landmark] {
        &self.points
    }

    pub fn score(&self) -> f32 {
        self.score
    }

    pub fn get(&self, id: usize) -> Option<&Landmark> {
        self.points.get(id)
    }

    /// 信号提取: 指定landmark的纵坐标
    pub fn y(&self, id: usize) -> Option<f32> {
        self.points.get(id).map(|p| p.y)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// 人脸检测框 (像素坐标)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FaceBox {
    xmin: f32,
    ymin: f32,
    width: f32,
    height: f32,
    confidence: f32,
}

impl FaceBox {
    pub fn new(xmin: f32, ymin: f32, width: f32, height: f32, confidence: f32) -> Self {
        Self {
            xmin,
            ymin,
            width,
            height,
            confidence,
        }
    }

    pub fn xmin(&self) -> f32 {
        self.xmin
    }

    pub fn ymin(&self) -> f32 {
        self.ymin
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn xmax(&self) -> f32 {
        self.xmin + self.width
    }

    pub fn ymax(&self) -> f32 {
        self.ymin + self.height
    }

    pub fn confidence(&self) -> f32 {
        self.confidence
    }

    pub fn area(&self) -> f32 {
        self.width * self.height
    }

    pub fn intersection_area(&self, another: &FaceBox) -> f32 {
        let l = self.xmin.max(another.xmin);
        let r = self.xmax().min(another.xmax());
        let t = self.ymin.max(another.ymin);
        let b = self.ymax().min(another.ymax());
        (r - l).max(0.) * (b - t).max(0.)
    }

    pub fn union(&self, another: &FaceBox) -> f32 {
        self.area() + another.area() - self.intersection_area(another)
    }

    pub fn iou(&self, another: &FaceBox) -> f32 {
        self.intersection_area(another) / self.union(another)
    }
}

/// 情绪标注记录: 人脸区域 + 主导情绪, 每帧从头重算, 不做跨帧平滑
#[derive(Debug, Clone)]
pub struct FaceEmotion {
    pub region: FaceBox,
    pub dominant_emotion: String,
    pub confidence: f32,
}

/// 按置信度做非极大值抑制, 去除重叠人脸候选框
pub fn non_max_suppression(xs: &mut Vec<FaceBox>, iou_threshold: f32) {
    xs.sort_by(|b1, b2| b2.confidence().partial_cmp(&b1.confidence()).unwrap());

    let mut current_index = 0;
    for index in 0..xs.len() {
        let mut drop = false;
        for prev_index in 0..current_index {
            let iou = xs[prev_index].iou(&xs[index]);
            if iou > iou_threshold {
                drop = true;
                break;
            }
        }
        if !drop {
            xs.swap(current_index, index);
            current_index += 1;
        }
    }
    xs.truncate(current_index);
}

pub fn gen_time_string(delimiter: &str) -> String {
    let offset = chrono::FixedOffset::east_opt(8 * 60 * 60).unwrap(); // Beijing
    let t_now = chrono::Utc::now().with_timezone(&offset);
    let fmt = format!(
        "%Y{}%m{}%d{}%H{}%M{}%S{}%f",
        delimiter, delimiter, delimiter, delimiter, delimiter, delimiter
    );
    t_now.format(&fmt).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_landmark_set_y() {
        let set = LandmarkSet::new(
            vec![Landmark::new(0.1, 0.2), Landmark::new(0.3, 0.4)],
            0.9,
        );
        assert_eq!(set.y(1), Some(0.4));
        assert_eq!(set.y(5), None);
    }

    #[test]
    fn test_facebox_iou() {
        let a = FaceBox::new(0.0, 0.0, 10.0, 10.0, 0.9);
        let b = FaceBox::new(5.0, 5.0, 10.0, 10.0, 0.8);
        let iou = a.iou(&b);
        // 交集25, 并集175
        assert!((iou - 25.0 / 175.0).abs() < 1e-6);
    }

    #[test]
    fn test_facebox_iou_disjoint() {
        let a = FaceBox::new(0.0, 0.0, 10.0, 10.0, 0.9);
        let b = FaceBox::new(20.0, 20.0, 10.0, 10.0, 0.8);
        assert_eq!(a.iou(&b), 0.0);
    }

    #[test]
    fn test_nms_keeps_highest_confidence() {
        let mut boxes = vec![
            FaceBox::new(0.0, 0.0, 10.0, 10.0, 0.6),
            FaceBox::new(1.0, 1.0, 10.0, 10.0, 0.9),
            FaceBox::new(50.0, 50.0, 10.0, 10.0, 0.8),
        ];
        non_max_suppression(&mut boxes, 0.5);
        assert_eq!(boxes.len(), 2);
        assert_eq!(boxes[0].confidence(), 0.9);
        assert_eq!(boxes[1].confidence(), 0.8);
    }
}
