//! # 命令行接口模块
//!
//! 使用 `clap` 定义了程序的命令行结构，包括子命令和参数。
//! 所有用户通过命令行与程序交互的入口点都在此模块中定义。

use clap::Parser;
use std::path::PathBuf;

use crate::encoder::GapPolicy;

/// 一款基于 LSB 隐写术的命令行工具：把任意文件分散隐藏在图像 (PNG, JPEG 等) 的像素中，输出无损 PNG。
#[derive(Parser, Debug)]
#[command(
    version,
    about,
    long_about = "一款基于 LSB 隐写术的命令行工具：把任意文件分散隐藏在图像 (PNG, JPEG 等) 的 RGB 通道最低两位中，并能从结果 PNG 中完整恢复。"
)]
pub struct Cli {
    /// 输出调试日志 (写入 stderr)。
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令：conceal (隐藏) 和 reveal (恢复)。
#[derive(Parser, Debug)]
pub enum Commands {
    /// 将数据文件隐藏到图像中，结果保存为 PNG。
    #[command(alias = "hide")]
    Conceal(ConcealArgs),

    /// 从隐写结果图像中恢复隐藏的数据。
    #[command(alias = "recover")]
    Reveal(RevealArgs),
}

/// 'conceal' 命令所需的参数。
#[derive(Parser, Debug)]
pub struct ConcealArgs {
    /// 用作载体的输入图像文件路径 (如 PNG, JPEG)。
    #[arg(short, long)]
    pub image: PathBuf,

    /// 要隐藏的数据文件路径。
    #[arg(short = 'D', long)]
    pub data: PathBuf,

    /// 结果图像的输出路径。缺省为输入图像同目录下的 `doctored_<名称>.png`。
    #[arg(short, long)]
    pub dest: Option<PathBuf>,

    /// 允许覆盖已存在的输出文件。
    #[arg(short, long)]
    pub force: bool,

    /// 隐藏前先用 zlib 压缩数据。
    #[arg(short, long)]
    pub zip: bool,

    /// 隐藏前用该口令加密数据 (AES-256-GCM-SIV)。
    #[arg(short, long)]
    pub key: Option<String>,

    /// 不承载数据的单元的处理方式。
    #[arg(short, long, value_enum, default_value_t = GapPolicy::Untouched)]
    pub gap: GapPolicy,
}

/// 'reveal' 命令所需的参数。
#[derive(Parser, Debug)]
pub struct RevealArgs {
    /// 隐藏了数据的图像文件路径。
    #[arg(short, long)]
    pub image: PathBuf,

    /// 恢复数据的输出路径。缺省为图像同目录下的 `recovered_<名称>.bin`。
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// 允许覆盖已存在的输出文件。
    #[arg(short, long)]
    pub force: bool,

    /// 恢复后用 zlib 解压数据。
    #[arg(short, long)]
    pub zip: bool,

    /// 恢复后用该口令解密数据。
    #[arg(short, long)]
    pub key: Option<String>,
}
