//! 凭据服务主入口

use credential_service::{
    auth::{jwt::TokenService, password::PasswordHasher},
    config::AppConfig,
    db,
    handlers::health,
    middleware::AppState,
    repository::{CredentialStore, MemoryCredentialStore, PgCredentialStore},
    routes,
    services::CredentialService,
    telemetry,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ===== CLI 参数处理 =====
    let args: Vec<String> = std::env::args().collect();

    if args.len() > 1 {
        match args[1].as_str() {
            "--version" => {
                println!("credential-service {}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            "--help" => {
                print_help();
                return Ok(());
            }
            _ => {
                eprintln!("未知参数: {}", args[1]);
                print_help();
                std::process::exit(1);
            }
        }
    }

    // 加载 .env 文件（开发环境）
    // 按优先级加载：.env.local > .env.development > .env
    if let Ok(env) = std::env::var("AUTH_ENV") {
        dotenv::from_filename(format!(".env.{}", env)).ok();
    } else {
        dotenv::from_filename(".env.local").ok();
        dotenv::from_filename(".env.development").ok();
        dotenv::dotenv().ok();
    }

    health::set_start_time();

    // 1. 加载配置（缺少签名密钥时直接退出）
    let config = AppConfig::from_env().map_err(|e| {
        eprintln!("Configuration error: {}", e);
        anyhow::anyhow!("Failed to load configuration: {}", e)
    })?;

    // 2. 初始化日志
    telemetry::init_telemetry(&config.logging);

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Credential service starting...");

    // 3. 凭据存储：配置了数据库 URL 时使用 PostgreSQL
    let store: Arc<dyn CredentialStore> = match &config.database.url {
        Some(url) => {
            let pool = db::connect(url, &config.database).await?;
            tracing::info!("Using PostgreSQL credential store");
            Arc::new(PgCredentialStore::new(pool))
        }
        None => {
            tracing::warn!("AUTH_DATABASE__URL not set, using in-memory credential store");
            Arc::new(MemoryCredentialStore::new())
        }
    };

    // 4. 构建应用状态
    let token_service = Arc::new(TokenService::from_config(&config)?);
    let hasher = PasswordHasher::from_config(&config.security)?;
    let credential_service = Arc::new(CredentialService::new(
        store.clone(),
        hasher,
        token_service.clone(),
    )?);

    let app_state = Arc::new(AppState {
        config: config.clone(),
        store,
        credential_service,
        token_service,
    });

    // 5. 构建路由
    let app = routes::create_router(app_state);

    // 6. 启动服务器
    let addr = &config.server.addr;
    let listener = TcpListener::bind(addr).await?;

    tracing::info!(addr = %addr, "Server listening");

    // 7. 优雅关闭
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// 优雅关闭信号处理
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Ctrl+C received, starting graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Terminate signal received, starting graceful shutdown");
        },
    }
}

/// 打印帮助信息
fn print_help() {
    println!("credential-service {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("用法: credential-service [选项]");
    println!();
    println!("选项:");
    println!("  --version     打印版本信息并退出");
    println!("  --help        打印此帮助信息并退出");
    println!();
    println!("环境变量:");
    println!("  AUTH_SECURITY__JWT_SECRET       签名密钥（必填，至少 32 字符）");
    println!("  AUTH_SECURITY__ACCESS_TOKEN_TTL_SECS  令牌有效期，默认 1800");
    println!("  AUTH_DATABASE__URL              PostgreSQL URL，未设置时使用内存存储");
    println!("  AUTH_SERVER__ADDR               监听地址，默认 0.0.0.0:8000");
    println!("  AUTH_LOGGING__LEVEL / AUTH_LOGGING__FORMAT");
}
