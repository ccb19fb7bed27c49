mod app;
mod cli;

use clap::Parser;
use cli::RunArgs;

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = RunArgs::parse();

    let _guard = gateway_core::lifecycle::logging::init_logging(&args.log_level, false, None);

    let runtime = tokio::runtime::Builder::new_multi_thread().enable_all().build()?;

    runtime.block_on(async {
        let application = app::Application::build(&args)?;
        application.serve().await
    })
}
