/// 测试摄像头列表获取功能
use gesture_cam_rs::input::get_camera_devices;

fn main() {
    println!("🔍 开始扫描摄像头设备...\n");

    match get_camera_devices() {
        Ok(devices) if devices.is_empty() => {
            println!("⚠️  未找到任何摄像头设备");
        }
        Ok(devices) => {
            println!("✅ 找到 {} 个摄像头设备:\n", devices.len());
            for device in &devices {
                println!("  📹 [{}] {}", device.index, device.name);
            }
        }
        Err(e) => {
            eprintln!("❌ 枚举摄像头失败: {:#}", e);
        }
    }

    println!("\n✅ 设备扫描完成");
}
