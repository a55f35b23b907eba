use clap::Parser;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[arg(short, long, env = "BIND", default_value = "127.0.0.1")]
    pub bind: String,

    #[arg(short, long, env = "PORT", default_value = "8000")]
    pub port: u16,

    #[arg(
        long,
        env = "INFURA_URL",
        help = "Full RPC URL. Takes precedence over --infura-project-id."
    )]
    pub infura_url: Option<String>,

    #[arg(
        long,
        env = "INFURA_PROJECT_ID",
        hide_env_values = true,
        help = "Infura project ID used to build the mainnet RPC URL."
    )]
    pub infura_project_id: Option<String>,

    #[arg(
        long,
        env = "CACHE_TTL_SECONDS",
        default_value = "5",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub cache_ttl_seconds: u64,
}
