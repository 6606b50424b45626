use clap::Parser;
use softserve_map::adapters::server::{DevServer, DEFAULT_HOST, DEFAULT_PORT};
use softserve_map::utils::logger;

#[derive(Debug, Parser)]
#[command(name = "dev-server", about = "Serve a rendered store map locally")]
struct Args {
    /// Directory to serve
    #[arg(short, long, default_value = "./dist")]
    dir: String,

    #[arg(long, default_value = DEFAULT_HOST)]
    host: String,

    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    port: u16,

    #[arg(long, help = "Emit JSON logs")]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logger::init_server_logger(args.json_logs);

    if !std::path::Path::new(&args.dir).is_dir() {
        anyhow::bail!("directory not found: {}", args.dir);
    }

    let server = DevServer::bind(&args.dir, &args.host, args.port).await?;
    println!("🌐 http://{}", server.local_addr()?);
    server.serve().await?;
    Ok(())
}
