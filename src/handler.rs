//! # 命令处理逻辑模块
//!
//! 包含处理 `conceal` 和 `reveal` 子命令的高级业务逻辑。
//! 本模块负责协调文件 I/O、前后处理 (压缩/加密)、调用隐写核心以及向用户报告结果。

use crate::cli::{ConcealArgs, RevealArgs};
use crate::constants::{DOCTORED_PREFIX, RECOVERED_EXTENSION, RECOVERED_PREFIX};
use crate::error::StegoError;
use crate::pipeline::Pipeline;
use crate::steganography::Stegano;
use anyhow::{Context, Result};
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};

/// 在 `source` 同目录下生成 `<prefix><文件名主干>.<extension>`。
fn sibling_path(source: &Path, prefix: &str, extension: &str) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy())
        .unwrap_or_default();
    source.with_file_name(format!("{prefix}{stem}.{extension}"))
}

fn ensure_writable(path: &Path, force: bool) -> Result<()> {
    anyhow::ensure!(
        force || !path.exists(),
        "Output file already exists: {}. \nUse --force to overwrite it.",
        path.to_string_lossy().red().bold()
    );
    Ok(())
}

/// 处理 'Conceal' 命令的执行逻辑。
///
/// 负责读取图像和数据文件、执行可选的压缩与加密、调用隐写核心隐藏数据，
/// 最后将结果写入目标 PNG 文件。
///
/// # Arguments
///
/// * `args` - 包含输入/输出路径与选项的 `ConcealArgs` 结构体。
///
/// # Errors
///
/// 如果发生以下任一情况，将返回错误：
/// * 输出文件已存在且未指定 `--force`。
/// * 无法读取输入的图像或数据文件。
/// * 图像没有足够的空间来隐藏数据。
/// * 图像无法解码，或结果无法编码为 PNG。
/// * 无法写入到目标图像文件。
pub fn handle_conceal(args: ConcealArgs) -> Result<()> {
    let dest = args
        .dest
        .clone()
        .unwrap_or_else(|| sibling_path(&args.image, DOCTORED_PREFIX, "png"));
    ensure_writable(&dest, args.force)?;

    let picture = fs::read(&args.image).with_context(|| {
        format!(
            "Unable to read image file: {}",
            args.image.to_string_lossy().red().bold()
        )
    })?;

    let data = fs::read(&args.data).with_context(|| {
        format!(
            "Unable to read data file: {}",
            args.data.to_string_lossy().red().bold()
        )
    })?;

    let payload = Pipeline::new(args.zip, args.key.as_deref())
        .seal(data)
        .context("Failed to prepare the data for concealment.")?;

    let stegano = Stegano::new().with_gap_policy(args.gap);
    let steganogram = match stegano.conceal(&payload, &picture) {
        Ok(steganogram) => steganogram,
        Err(StegoError::CapacityOverflow { length, capacity }) => anyhow::bail!(
            "Not enough space in the image to hide the data. \nRequired: {}, Available: {}",
            length.to_string().red().bold(),
            capacity.to_string().green().bold()
        ),
        Err(e) => {
            return Err(e).with_context(|| {
                format!(
                    "Failed to conceal data in '{}'.",
                    args.image.to_string_lossy().red().bold()
                )
            });
        }
    };

    fs::write(&dest, steganogram).with_context(|| {
        format!(
            "Unable to write to target image file: {}",
            dest.to_string_lossy().red().bold()
        )
    })?;

    println!(
        "The data has been successfully concealed and saved: {}",
        dest.to_string_lossy().green().bold()
    );

    Ok(())
}

/// 处理 'Reveal' 命令的执行逻辑。
///
/// 负责读取隐写结果图像、调用隐写核心恢复载荷、执行可选的解密与解压，
/// 最后将恢复的数据写入目标文件。
///
/// # Arguments
///
/// * `args` - 包含输入/输出路径与选项的 `RevealArgs` 结构体。
///
/// # Errors
///
/// 如果发生以下任一情况，将返回错误：
/// * 输出文件已存在且未指定 `--force`。
/// * 无法读取输入的图像文件。
/// * 图像中没有有效的隐藏数据。
/// * 解密或解压失败。
/// * 无法写入到目标文件。
pub fn handle_reveal(args: RevealArgs) -> Result<()> {
    let out = args
        .out
        .clone()
        .unwrap_or_else(|| sibling_path(&args.image, RECOVERED_PREFIX, RECOVERED_EXTENSION));
    ensure_writable(&out, args.force)?;

    let picture = fs::read(&args.image).with_context(|| {
        format!(
            "Unable to read image file: {}",
            args.image.to_string_lossy().red().bold()
        )
    })?;

    let payload = Stegano::new().reveal(&picture).with_context(|| {
        format!(
            "Failed to reveal data from '{}'. \nThe image may not contain hidden data or is corrupted.",
            args.image.to_string_lossy().red().bold()
        )
    })?;

    let data = Pipeline::new(args.zip, args.key.as_deref())
        .open(payload)
        .context("Failed to restore the revealed data.")?;

    fs::write(&out, data).with_context(|| {
        format!(
            "Unable to write to target file: {}",
            out.to_string_lossy().red().bold()
        )
    })?;

    println!(
        "The data has been successfully revealed and saved: {}",
        out.to_string_lossy().green().bold()
    );
    Ok(())
}
