/// macroquad渲染层
///
/// 只负责把RGB帧贴成纹理 + 按图元列表绘制标注, 不做任何业务判断。
/// 窗口尺寸与帧尺寸独立, x/y各自拉伸。
use anyhow::{Context, Result};
use image::RgbImage;
use macroquad::prelude::*;

use crate::gen_time_string;
use crate::overlay::Shape;

/// 窗口配置 (帧到达前的初始尺寸)
pub fn conf(title: &str) -> Conf {
    Conf {
        window_title: title.to_string(),
        window_width: 1280,
        window_height: 720,
        fullscreen: false,
        ..Default::default()
    }
}

pub struct FrameView {
    texture: Option<Texture2D>,
    frame_w: u32,
    frame_h: u32,
    rgba: Vec<u8>,
    render_count: u32,
    render_last: f64,
    render_fps: f32,
}

impl FrameView {
    pub fn new() -> Self {
        Self {
            texture: None,
            frame_w: 0,
            frame_h: 0,
            rgba: Vec::new(),
            render_count: 0,
            render_last: get_time(),
            render_fps: 0.0,
        }
    }

    /// 上传一帧到纹理, 尺寸变化时重建纹理
    pub fn update(&mut self, frame: &RgbImage) {
        let (w, h) = frame.dimensions();

        self.rgba.clear();
        self.rgba.reserve((w * h * 4) as usize);
        for pixel in frame.pixels() {
            self.rgba.extend_from_slice(&[pixel.0[0], pixel.0[1], pixel.0[2], 255]);
        }

        match &self.texture {
            Some(texture) if self.frame_w == w && self.frame_h == h => {
                texture.update(&Image {
                    bytes: self.rgba.clone(),
                    width: w as u16,
                    height: h as u16,
                });
            }
            _ => {
                // 只在分辨率变化时重建纹理
                let texture = Texture2D::from_rgba8(w as u16, h as u16, &self.rgba);
                texture.set_filter(FilterMode::Linear);
                self.texture = Some(texture);
                self.frame_w = w;
                self.frame_h = h;
            }
        }
    }

    /// 绘制当前帧 + 标注图元 + 渲染帧率
    pub fn draw(&mut self, shapes: &[Shape]) {
        clear_background(BLACK);

        let Some(texture) = &self.texture else {
            draw_text("等待摄像头帧...", 20.0, 40.0, 30.0, WHITE);
            return;
        };

        draw_texture_ex(
            texture,
            0.0,
            0.0,
            WHITE,
            DrawTextureParams {
                dest_size: Some(vec2(screen_width(), screen_height())),
                ..Default::default()
            },
        );

        // 帧空间 → 窗口空间, x/y独立拉伸
        let sx = screen_width() / self.frame_w as f32;
        let sy = screen_height() / self.frame_h as f32;

        for shape in shapes {
            match shape {
                Shape::Rect { x, y, w, h, color } => {
                    draw_rectangle_lines(x * sx, y * sy, w * sx, h * sy, 2.0, mq_color(*color));
                }
                Shape::Label { text, x, y, color } => {
                    draw_text(text, x * sx, y * sy, 24.0, mq_color(*color));
                }
                Shape::Dot { x, y, radius, color } => {
                    draw_circle(x * sx, y * sy, *radius, mq_color(*color));
                }
                Shape::Segment {
                    x1,
                    y1,
                    x2,
                    y2,
                    color,
                } => {
                    draw_line(x1 * sx, y1 * sy, x2 * sx, y2 * sy, 2.0, mq_color(*color));
                }
            }
        }

        self.render_count += 1;
        let now = get_time();
        if now - self.render_last >= 1.0 {
            self.render_fps = self.render_count as f32 / (now - self.render_last) as f32;
            self.render_count = 0;
            self.render_last = now;
        }
        draw_text(
            &format!("FPS: {:.1}", self.render_fps),
            10.0,
            25.0,
            24.0,
            GREEN,
        );
    }

    /// 把当前帧存成png快照, 返回文件名
    pub fn save_snapshot(&self) -> Result<String> {
        let img = image::RgbaImage::from_raw(self.frame_w, self.frame_h, self.rgba.clone())
            .context("当前没有可保存的帧")?;
        let name = format!("snapshot_{}.png", gen_time_string("-"));
        img.save(&name)
            .with_context(|| format!("保存快照失败: {}", name))?;
        Ok(name)
    }

    pub fn has_frame(&self) -> bool {
        self.texture.is_some()
    }
}

impl Default for FrameView {
    fn default() -> Self {
        Self::new()
    }
}

fn mq_color((r, g, b): crate::overlay::Color) -> Color {
    Color::from_rgba(r, g, b, 255)
}

/// ESC或q退出
pub fn quit_requested() -> bool {
    is_key_pressed(KeyCode::Escape) || is_key_pressed(KeyCode::Q)
}

/// s保存快照
pub fn snapshot_requested() -> bool {
    is_key_pressed(KeyCode::S)
}
