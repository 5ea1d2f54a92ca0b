use clap::Parser;

use limsmeta::cli::{Cli, Commands};
use limsmeta::config::{get_config, init_config};
use limsmeta::errors::LimsError;
use limsmeta::runtime::modes;
use limsmeta::system::logging::init_logging;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    init_config(Some(&cli.config));
    let config = get_config();
    let _guard = init_logging(&config.logging)?;

    let result = match cli.command {
        None | Some(Commands::Serve) => modes::run_server(&config).await,
        Some(command) => modes::run_cli(command, &config).await,
    };

    if let Err(e) = &result {
        match e.downcast_ref::<LimsError>() {
            Some(err) => eprintln!("{}", err.format_colored()),
            None => limsmeta::print_error!("{:#}", e),
        }
        std::process::exit(1);
    }
    Ok(())
}
