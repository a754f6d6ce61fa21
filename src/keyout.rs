/// 合成按键输出
///
/// 跳跃触发后向前台应用注入一次空格点击 (按下+抬起)。
/// 发送失败只打印诊断不终止, 控制循环继续跑。
use anyhow::{Context, Result};
use enigo::{Direction, Enigo, Key, Keyboard, Settings};

pub struct GameInput {
    enigo: Enigo,
}

impl GameInput {
    pub fn new() -> Result<Self> {
        let enigo = Enigo::new(&Settings::default()).context("初始化虚拟键盘失败")?;
        Ok(Self { enigo })
    }

    /// 发一次空格点击 (fire-and-forget)
    pub fn press_jump(&mut self) {
        println!("⬆️ Jump");
        if let Err(e) = self.enigo.key(Key::Space, Direction::Click) {
            eprintln!("⚠️ 发送空格按键失败: {}", e);
        }
    }
}
