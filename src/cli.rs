//! # 命令行接口模块
//!
//! 使用 `clap` 定义了程序的命令行结构，包括子命令和参数。
//! 所有用户通过命令行与程序交互的入口点都在此模块中定义。

use crate::constants::DEFAULT_BITS;
use clap::Parser;
use std::path::PathBuf;

/// 在未压缩 TIFF 图像的栅格条带中隐藏任意文件，或从中恢复隐藏的文件。
#[derive(Parser, Debug)]
#[command(
    version,
    about,
    long_about = "在未压缩的小端序 TIFF 图像中，通过替换每个像素字节的低 1、2 或 4 位来隐藏或恢复任意文件。"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令：hide (隐藏)、recover (恢复) 和 capacity (容量)。
#[derive(Parser, Debug)]
pub enum Commands {
    /// 把文件隐藏到 TIFF 图像中。
    Hide(HideArgs),

    /// 从经过隐写的 TIFF 图像中恢复隐藏的文件。
    Recover(RecoverArgs),

    /// 显示 TIFF 图像的条带布局与可隐藏的字节数。
    Capacity(CapacityArgs),
}

/// 'hide' 命令所需的参数。
#[derive(Parser, Debug)]
pub struct HideArgs {
    /// 用作载体的 TIFF 图像路径。
    #[arg(short, long)]
    pub image: PathBuf,

    /// 要隐藏的文件路径。
    #[arg(short, long)]
    pub payload: PathBuf,

    /// 结果图像的输出路径，默认为图像所在目录下的 `doctored_<文件名>`。
    #[arg(short, long, conflicts_with = "in_place")]
    pub dest: Option<PathBuf>,

    /// 直接修改输入图像，不生成副本。
    #[arg(long)]
    pub in_place: bool,

    /// 每个载体字节替换的低位数 (1、2 或 4)。
    #[arg(short, long, default_value_t = DEFAULT_BITS)]
    pub bits: u8,

    /// 输出文件已存在时强制覆盖。
    #[arg(short, long)]
    pub force: bool,
}

/// 'recover' 命令所需的参数。
#[derive(Parser, Debug)]
pub struct RecoverArgs {
    /// 已隐藏数据的 TIFF 图像路径。
    #[arg(short, long)]
    pub image: PathBuf,

    /// 恢复出的文件的保存路径，默认为图像所在目录下的 `recovered_<图像名>.bin`。
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// 隐藏时使用的低位数 (1、2 或 4)。
    #[arg(short, long, default_value_t = DEFAULT_BITS)]
    pub bits: u8,

    /// 输出文件已存在时强制覆盖。
    #[arg(short, long)]
    pub force: bool,
}

/// 'capacity' 命令所需的参数。
#[derive(Parser, Debug)]
pub struct CapacityArgs {
    /// 要检查的 TIFF 图像路径。
    #[arg(short, long)]
    pub image: PathBuf,

    /// 只显示指定低位数下的容量；省略时显示 1、2、4 三种情况。
    #[arg(short, long)]
    pub bits: Option<u8>,
}
