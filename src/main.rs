//! Charsite - 角色目录服务
//!
//! 启动流程：配置 → 日志 → 数据库 → 事件总线 → Unit of Work → HTTP

use std::sync::Arc;

use charsite::application::{ImageCleanupHandler, UnitOfWorkFactory};
use charsite::config::{load_config, print_config, LogConfig};
use charsite::infrastructure::adapters::{FileImageStorage, FileImageStorageConfig};
use charsite::infrastructure::events::InProcessEventBus;
use charsite::infrastructure::http::{AppDependencies, AppState, HttpServer, ServerConfig};
use charsite::infrastructure::persistence::sqlite::{
    create_pool, run_migrations, DatabaseConfig, SqliteChangeStore, SqliteCharacterRepository,
    SqliteImageRepository, SqlitePronounRepository,
};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

fn init_logging(log: &LogConfig) {
    let log_filter = format!("{},charsite={},tower_http=debug", log.level, log.level);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_filter));

    if log.json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = load_config().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    init_logging(&config.log);

    tracing::info!("Charsite - 角色目录服务");
    print_config(&config);

    // 确保数据目录存在
    if let Some(parent) = std::path::Path::new(&config.database.path).parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    // 初始化数据库
    let db_config = DatabaseConfig {
        database_url: config.database.database_url(),
        max_connections: config.database.max_connections,
    };
    let pool = create_pool(&db_config).await?;
    run_migrations(&pool).await?;

    // Repository / ChangeStore 适配器
    let character_repo = Arc::new(SqliteCharacterRepository::new(pool.clone()));
    let pronoun_repo = Arc::new(SqlitePronounRepository::new(pool.clone()));
    let image_repo = Arc::new(SqliteImageRepository::new(pool.clone()));
    let change_store = Arc::new(SqliteChangeStore::new(pool.clone()));

    // 图片存储
    let image_storage = Arc::new(
        FileImageStorage::new(FileImageStorageConfig {
            base_dir: config.storage.images_dir.clone(),
            public_base_url: config.server.public_base_url(),
            signing_secret: config.storage.signing_secret.clone(),
        })
        .await?,
    );

    // 事件总线及处理器
    let event_bus = Arc::new(InProcessEventBus::new(config.events.channel_capacity));
    event_bus.subscribe(Arc::new(ImageCleanupHandler::new(
        image_storage.clone(),
        config.events.cleanup_failed_uploads,
    )));

    let unit_of_work = UnitOfWorkFactory::new(change_store, event_bus.clone());
    let shutdown = CancellationToken::new();

    let state = AppState::new(AppDependencies {
        character_repo,
        pronoun_repo,
        image_repo,
        image_storage,
        unit_of_work,
        upload_url_ttl: config.storage.upload_url_ttl(),
        max_upload_size: config.storage.max_upload_size,
        shutdown,
    });

    let server_config = ServerConfig::new(&config.server.host, config.server.port);
    let server = HttpServer::new(server_config, state);

    tracing::info!("Starting HTTP server...");

    server
        .run_with_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for ctrl-c");
            }
            tracing::info!("Received shutdown signal");
        })
        .await?;

    pool.close().await;
    tracing::info!("Server shutdown complete");

    Ok(())
}
