// 防止在 Windows 发布版本中显示额外的控制台窗口，不要删除！
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

//! # HelpCard — 应用入口
//!
//! 本文件仅负责应用初始化与插件/命令注册。
//! 业务逻辑分布在各子模块中，详见 `lib.rs` 架构文档。

use helpcard::{clipboard, printers, settings, support, sysinfo};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    tauri::Builder::default()
        // 插件初始化
        .plugin(tauri_plugin_shell::init())
        // 应用设置
        .setup(|app| {
            log::info!("setup: begin");
            settings::init(app.handle());
            log::info!("setup: complete");
            Ok(())
        })
        // 注册所有 Tauri 命令
        .invoke_handler(tauri::generate_handler![
            // 系统信息
            sysinfo::system_snapshot,
            // 剪贴板
            clipboard::copy_snapshot_to_clipboard,
            clipboard::write_text_to_clipboard,
            // 打印机
            printers::list_printers,
            printers::filter_printer_list,
            printers::add_printer,
            // 求助入口
            support::email_help_desk,
            support::open_help_portal,
            // 应用设置存储
            settings::get_app_settings,
            settings::set_app_settings,
        ])
        .run(tauri::generate_context!())
        .expect("运行 Tauri 应用时出错");
}
