/// 跳跃触发检测器
///
/// 整个仓库唯一的原创逻辑: 对一条有噪声的纵坐标流做一维上移触发。
/// 状态只有一个: 最近一次成功检测帧的纵坐标。
/// 检测缺失的帧不会调用 [`JumpDetector::update`], 基线原样保留,
/// 下一次成功检测直接与这条旧基线比较。

/// 触发器配置
#[derive(Debug, Clone, Copy)]
pub struct TriggerSettings {
    /// 上移触发阈值 (归一化帧高比例)
    pub threshold: f32,
}

/// 默认跳跃阈值, 越小越灵敏
pub const DEFAULT_JUMP_THRESHOLD: f32 = 0.05;

impl Default for TriggerSettings {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_JUMP_THRESHOLD,
        }
    }
}

/// 两状态机: 未装载(无基线) → 装载(有基线), 装载后每次调用自环并重新装载。
/// 不做冷却: 持续上移每帧都可能重复触发, 这是刻意保留的策略。
#[derive(Debug)]
pub struct JumpDetector {
    threshold: f32,
    previous: Option<f32>,
}

impl JumpDetector {
    pub fn new(settings: TriggerSettings) -> Self {
        Self {
            threshold: settings.threshold,
            previous: None,
        }
    }

    pub fn with_threshold(threshold: f32) -> Self {
        Self::new(TriggerSettings { threshold })
    }

    /// 喂入本帧读数, 返回是否触发跳跃。
    ///
    /// 触发条件: 已有基线且 `current - previous < -threshold` (严格不等)。
    /// 无论是否触发, 基线都无条件推进到 `current`。
    pub fn update(&mut self, current: f32) -> bool {
        let fired = matches!(self.previous, Some(prev) if current - prev < -self.threshold);
        self.previous = Some(current);
        fired
    }

    /// 当前基线 (最近一次成功检测帧的读数)
    pub fn previous(&self) -> Option<f32> {
        self.previous
    }

    pub fn is_armed(&self) -> bool {
        self.previous.is_some()
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_never_fires_on_first_sample() {
        for y in [0.0, 0.5, 1.0, -3.0, 100.0] {
            let mut det = JumpDetector::new(TriggerSettings::default());
            assert!(!det.update(y));
            assert_eq!(det.previous(), Some(y));
        }
    }

    #[test]
    fn test_threshold_boundary_is_strict() {
        let v = 0.6;
        let eps = 1e-4;

        // 刚好等于阈值: 不触发 (严格不等)
        let mut det = JumpDetector::with_threshold(0.05);
        det.update(v);
        assert!(!det.update(v - 0.05));

        // 超过阈值任意小量: 触发
        let mut det = JumpDetector::with_threshold(0.05);
        det.update(v);
        assert!(det.update(v - 0.05 - eps));

        // 不足阈值: 不触发
        let mut det = JumpDetector::with_threshold(0.05);
        det.update(v);
        assert!(!det.update(v - 0.05 + eps));
    }

    #[test]
    fn test_downward_or_flat_never_fires() {
        let mut det = JumpDetector::with_threshold(0.05);
        det.update(0.3);
        assert!(!det.update(0.3)); // 持平
        assert!(!det.update(0.5)); // 下移
        assert!(!det.update(0.9)); // 大幅下移
    }

    #[test]
    fn test_state_always_advances() {
        let mut det = JumpDetector::with_threshold(0.05);
        for y in [0.8, 0.2, 0.9, 0.1] {
            det.update(y);
            assert_eq!(det.previous(), Some(y));
        }
    }

    #[test]
    fn test_missed_detections_keep_baseline() {
        let mut det = JumpDetector::with_threshold(0.05);
        det.update(0.6);
        // 中间若干帧检测缺失: update不被调用, 基线不变
        assert_eq!(det.previous(), Some(0.6));
        // 下一次成功检测与旧基线比较, 跨帧累计的上移也能触发
        assert!(det.update(0.5));
    }

    #[test]
    fn test_typical_jump_sequence() {
        // 食指y序列 [0.60, 0.60, 0.50, 0.50], 阈值0.05
        // → [无基线不触发, Δ=0不触发, Δ=-0.10触发, Δ=0不触发]
        let mut det = JumpDetector::with_threshold(0.05);
        let fired: Vec<bool> = [0.60, 0.60, 0.50, 0.50]
            .iter()
            .map(|&y| det.update(y))
            .collect();
        assert_eq!(fired, vec![false, false, true, false]);
    }

    #[test]
    fn test_sustained_rise_retriggers_every_frame() {
        // 无冷却: 连续上移每帧都触发
        let mut det = JumpDetector::with_threshold(0.05);
        det.update(0.9);
        assert!(det.update(0.8));
        assert!(det.update(0.7));
        assert!(det.update(0.6));
    }

    #[test]
    fn test_shared_state_across_subjects_in_one_frame() {
        // 同一帧多个主体按检测顺序串行喂入同一触发器:
        // 第二个主体的基线是第一个主体本帧的新读数 (刻意保留, 顺序相关)
        let mut det = JumpDetector::with_threshold(0.05);
        det.update(0.9); // 上一帧
        assert!(det.update(0.5)); // 主体1: 相对0.9大幅上移
        assert!(!det.update(0.52)); // 主体2: 相对主体1几乎持平, 不触发
        assert_eq!(det.previous(), Some(0.52));
    }
}
