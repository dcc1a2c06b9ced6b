use clap::Parser;
use tracing_subscriber::EnvFilter;

use lsb_spread::{
    cli::{Cli, Commands},
    handler::{handle_conceal, handle_reveal},
};

/// 初始化日志：写入 stderr，`RUST_LOG` 优先，否则由 `--verbose` 决定级别
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// 程序的主入口点
///
/// 负责解析命令行参数，并根据指定的子命令（`conceal` 或 `reveal`）
/// 将执行分派到相应的处理函数
fn main() -> anyhow::Result<()> {
    // 解析命令行参数
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // 根据子命令调用相应的处理函数
    match cli.command {
        Commands::Conceal(args) => handle_conceal(args),
        Commands::Reveal(args) => handle_reveal(args),
    }
}
