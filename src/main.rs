use codpulse::config;
use codpulse::runtime::{logging, server};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    config::init_config();
    let loaded = config::get_config();

    // guard 必须活到进程结束，否则缓冲日志会丢
    let _log_guard = logging::init_logging(&loaded);

    server::run_server().await
}
