//! 终端前端
//!
//! 读取脚本文件交给 novel-runtime 执行，在终端上展示显示缓冲区，
//! 按回车推进（动画期间等价于跳过）。

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use novel_runtime::{Queue, QueueConfig};

#[derive(Parser, Debug)]
#[command(about = "视觉小说脚本的终端播放器")]
struct Args {
    /// 脚本文件路径
    script: PathBuf,

    /// 逐字显示间隔（毫秒）
    #[arg(long, default_value_t = 20)]
    speed: u64,

    /// 自动换行宽度（字符数，0 表示不换行）
    #[arg(long, default_value_t = 24)]
    wrap: usize,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let text = fs::read_to_string(&args.script)
        .with_context(|| format!("无法读取脚本文件 {}", args.script.display()))?;
    let evaluator = novel_runtime::compile(&text)
        .with_context(|| format!("脚本 {} 编译失败", args.script.display()))?;
    info!("脚本包含标签: {:?}", evaluator.label_names());

    let queue = Queue::with_config(
        evaluator,
        QueueConfig {
            message_speed: Duration::from_millis(args.speed),
            wrap_width: args.wrap,
        },
    );
    queue.start().context("入口标签播放失败")?;

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        queue.wait_for_settled();

        while let Some(notification) = queue.poll_notification() {
            match notification {
                novel_runtime::SideEffect::ChangeBg(bg) => {
                    println!("-- 背景切换: {} --", bg.source);
                }
            }
        }

        for error in queue.runtime_errors() {
            eprintln!("!! {error}");
        }

        println!("{}", queue.display());
        print!("[Enter] ▶ ");
        io::stdout().flush()?;
        match lines.next() {
            Some(line) => {
                line?;
                queue.advance();
            }
            // EOF，退出
            None => break,
        }
    }

    Ok(())
}
