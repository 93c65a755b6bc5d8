// ==========================================
// 采购申请跟踪 - 命令行入口
// ==========================================
// 子命令: load / dashboard / chat / init-db
// 日志输出到 stderr，命令结果输出到 stdout
// ==========================================

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use purchase_tracker::api::{ApiError, ChatApi, DashboardApi, ImportApi};
use purchase_tracker::{i18n, logging, AppConfig, APP_NAME, VERSION};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "purchase-tracker", version, about = "Purchasing-request spreadsheet tracker")]
struct Cli {
    /// SQLite 数据库路径（默认取 PURCHASE_TRACKER_DB 或用户数据目录）
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 导入表格（整表替换）
    Load {
        /// .xlsx / .xls / .csv 文件
        file: PathBuf,
    },
    /// 输出看板快照（JSON）
    Dashboard,
    /// 向问答机器人提问
    Chat {
        #[arg(required = true, num_args = 1..)]
        message: Vec<String>,
    },
    /// 建表（幂等）
    InitDb,
}

fn main() -> Result<ExitCode> {
    logging::init();
    let cli = Cli::parse();

    let mut config = AppConfig::from_env();
    if let Some(db) = cli.db {
        config.db_path = db;
    }
    i18n::set_locale(&config.locale);

    tracing::info!(
        app = APP_NAME,
        version = VERSION,
        db = %config.db_path.display(),
        "starting"
    );

    match cli.command {
        Command::Load { file } => {
            let report = ImportApi::new(&config).load(&file);
            println!("{}", report.message);
            if report.success {
                Ok(ExitCode::SUCCESS)
            } else {
                Ok(ExitCode::FAILURE)
            }
        }
        Command::Dashboard => match DashboardApi::new(&config).snapshot() {
            Ok(snapshot) => {
                let json = serde_json::to_string_pretty(&snapshot)
                    .context("failed to serialize dashboard snapshot")?;
                println!("{}", json);
                Ok(ExitCode::SUCCESS)
            }
            Err(err) => {
                println!("{}", DashboardApi::error_message(&err));
                match err {
                    ApiError::NoData => Ok(ExitCode::SUCCESS),
                    _ => Ok(ExitCode::FAILURE),
                }
            }
        },
        Command::Chat { message } => {
            let reply = ChatApi::new(&config).reply(&message.join(" "));
            println!("{}", reply.reply);
            Ok(ExitCode::SUCCESS)
        }
        Command::InitDb => {
            ImportApi::new(&config)
                .init_db()
                .context("failed to create table")?;
            println!("{}", config.db_path.display());
            Ok(ExitCode::SUCCESS)
        }
    }
}
