use cdn_query::query::{AppState, QueryServer};
use cdn_query::storage::{reload_on_change, CatalogStore, CatalogWatcher};
use cdn_query::{Api, Config};
use clap::Parser;
use std::path::PathBuf;
use std::sync::atomic::AtomicU64;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// 库目录查询服务
#[derive(Parser, Debug)]
#[command(name = "cdn-query", version, about)]
struct Args {
    /// 配置文件（TOML）
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// 目录快照（JSON），覆盖配置
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// 监听地址，覆盖配置
    #[arg(long)]
    bind: Option<String>,

    /// 监听端口，覆盖配置
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let mut config = Config::load(args.config.as_deref())?;
    if let Some(p) = args.catalog {
        config.catalog_path = p;
    }
    if let Some(b) = args.bind {
        config.bind_addr = b;
    }
    if let Some(p) = args.port {
        config.port = p;
    }

    info!("Starting cdn-query: catalog {:?}", config.catalog_path);

    let catalog = Arc::new(CatalogStore::open(config.catalog_path.clone()).await?);
    let api = Api::new(config.schema(), config.rank_metric);
    let state = Arc::new(AppState::new(catalog.clone(), api));

    // 启动查询服务 (HTTP)
    let addr = config.socket_addr()?;
    let query_server = QueryServer::new(state.clone());
    let mut server = tokio::spawn(query_server.run(addr));

    // 定时重载
    if let Some(interval) = config.reload_interval() {
        tokio::spawn(catalog.clone().reload_loop(interval));
    }

    // 文件变更热重载：watcher 需在 main 中持有
    let overflow_drops = Arc::new(AtomicU64::new(0));
    let _watcher = if config.watch_catalog {
        match CatalogWatcher::start(&config.catalog_path, 16, overflow_drops) {
            Ok((rx, watcher)) => {
                tokio::spawn(reload_on_change(catalog.clone(), rx, Duration::from_millis(200)));
                Some(watcher)
            }
            Err(e) => {
                tracing::warn!("Catalog watch disabled: {}", e);
                None
            }
        }
    } else {
        None
    };

    info!("cdn-query ready. Query via: http://{}/v2/<cdn>/libraries?name=<term>", addr);

    // 优雅退出处理；服务任务提前结束（如端口绑定失败）时进程随之退出
    tokio::select! {
        res = tokio::signal::ctrl_c() => {
            res?;
            info!("Shutting down...\n{}", state.status());
        }
        res = &mut server => {
            let err = match res {
                Ok(Ok(())) => anyhow::anyhow!("HTTP server exited unexpectedly"),
                Ok(Err(e)) => e,
                Err(e) => anyhow::Error::new(e),
            };
            tracing::error!("HTTP server stopped: {}", err);
            return Err(err);
        }
    }

    Ok(())
}
