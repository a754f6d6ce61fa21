/// 标注图元计算
///
/// 纯计算层: 把landmark集合/情绪记录转成像素空间绘制图元,
/// 不依赖任何窗口或字体, 方便单元测试。实际绘制在 `render` 层。
use crate::{FaceEmotion, LandmarkSet};

pub type Color = (u8, u8, u8);

pub const GREEN: Color = (0, 255, 0);
pub const RED: Color = (255, 0, 0);
pub const YELLOW: Color = (255, 255, 0);

/// 绘制图元 (像素坐标)
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// 空心矩形框
    Rect {
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        color: Color,
    },
    /// 文本标签 (基线坐标)
    Label {
        text: String,
        x: f32,
        y: f32,
        color: Color,
    },
    /// 实心圆点
    Dot {
        x: f32,
        y: f32,
        radius: f32,
        color: Color,
    },
    /// 线段
    Segment {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        color: Color,
    },
}

/// landmark骨架图元: 连接线 + 各点圆点, 追踪点高亮。
/// 连接表里超出集合范围的编号直接跳过。
pub fn landmark_shapes(
    set: &LandmarkSet,
    connections: &[(usize, usize)],
    tracked: usize,
    frame_w: f32,
    frame_h: f32,
) -> Vec<Shape> {
    let mut shapes = Vec::new();

    for &(a, b) in connections {
        if let (Some(pa), Some(pb)) = (set.get(a), set.get(b)) {
            shapes.push(Shape::Segment {
                x1: pa.x() * frame_w,
                y1: pa.y() * frame_h,
                x2: pb.x() * frame_w,
                y2: pb.y() * frame_h,
                color: GREEN,
            });
        }
    }

    for (id, point) in set.points().iter().enumerate() {
        let (radius, color) = if id == tracked {
            (6.0, YELLOW)
        } else {
            (3.0, RED)
        };
        shapes.push(Shape::Dot {
            x: point.x() * frame_w,
            y: point.y() * frame_h,
            radius,
            color,
        });
    }

    shapes
}

/// 情绪标注图元: 人脸框 + "Emotion: Xxx" 标签 (框上方10像素, 贴顶时夹回帧内)
pub fn face_shapes(faces: &[FaceEmotion]) -> Vec<Shape> {
    let mut shapes = Vec::with_capacity(faces.len() * 2);
    for face in faces {
        let r = &face.region;
        shapes.push(Shape::Rect {
            x: r.xmin(),
            y: r.ymin(),
            w: r.width(),
            h: r.height(),
            color: GREEN,
        });
        shapes.push(Shape::Label {
            text: format!("Emotion: {}", capitalize(&face.dominant_emotion)),
            x: r.xmin(),
            y: (r.ymin() - 10.0).max(12.0),
            color: GREEN,
        });
    }
    shapes
}

/// 首字母大写 (情绪标签展示格式)
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FaceBox, Landmark};

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("happiness"), "Happiness");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn test_landmark_shapes_scales_to_pixels() {
        let set = LandmarkSet::new(
            vec![Landmark::new(0.5, 0.25), Landmark::new(1.0, 1.0)],
            0.9,
        );
        let shapes = landmark_shapes(&set, &[(0, 1)], 0, 640.0, 480.0);
        // 1条连接线 + 2个点
        assert_eq!(shapes.len(), 3);
        assert_eq!(
            shapes[0],
            Shape::Segment {
                x1: 320.0,
                y1: 120.0,
                x2: 640.0,
                y2: 480.0,
                color: GREEN,
            }
        );
        // 追踪点高亮
        assert!(matches!(shapes[1], Shape::Dot { color: YELLOW, .. }));
        assert!(matches!(shapes[2], Shape::Dot { color: RED, .. }));
    }

    #[test]
    fn test_landmark_shapes_skips_out_of_range_connection() {
        let set = LandmarkSet::new(vec![Landmark::new(0.1, 0.1)], 0.9);
        let shapes = landmark_shapes(&set, &[(0, 7)], 0, 100.0, 100.0);
        // 连接另一端缺失: 只剩圆点
        assert_eq!(shapes.len(), 1);
        assert!(matches!(shapes[0], Shape::Dot { .. }));
    }

    #[test]
    fn test_face_shapes_label_above_box() {
        let faces = vec![FaceEmotion {
            region: FaceBox::new(100.0, 80.0, 50.0, 50.0, 0.9),
            dominant_emotion: "surprise".to_string(),
            confidence: 0.8,
        }];
        let shapes = face_shapes(&faces);
        assert_eq!(shapes.len(), 2);
        match &shapes[1] {
            Shape::Label { text, x, y, .. } => {
                assert_eq!(text, "Emotion: Surprise");
                assert_eq!(*x, 100.0);
                assert_eq!(*y, 70.0);
            }
            other => panic!("期望标签, 实得 {:?}", other),
        }
    }

    #[test]
    fn test_face_shapes_label_clamped_at_top() {
        let faces = vec![FaceEmotion {
            region: FaceBox::new(0.0, 2.0, 40.0, 40.0, 0.9),
            dominant_emotion: "fear".to_string(),
            confidence: 0.8,
        }];
        let shapes = face_shapes(&faces);
        match &shapes[1] {
            Shape::Label { y, .. } => assert_eq!(*y, 12.0),
            other => panic!("期望标签, 实得 {:?}", other),
        }
    }

    #[test]
    fn test_empty_inputs_yield_no_shapes() {
        // 零检测帧不产生任何标注
        assert!(face_shapes(&[]).is_empty());
        let empty = LandmarkSet::default();
        assert!(landmark_shapes(&empty, &[(0, 1)], 0, 640.0, 480.0).is_empty());
    }
}
