mod display;

use ghkit::{GitHub, RunContext, execute, parse_args};
use tracing::debug;

fn handle_clap_help_version(clap_err: &clap::Error) -> ! {
    use clap::error::ErrorKind;
    match clap_err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
            print!("{clap_err}");
            std::process::exit(0);
        }
        _ => {
            eprint!("{clap_err}");
            std::process::exit(2);
        }
    }
}

fn init_tracing() {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn run_context() -> Option<RunContext> {
    match RunContext::from_env() {
        Ok(context) => Some(context),
        Err(err) => {
            debug!("No workflow run context: {err:#}");
            None
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let context = run_context();
    let invocation = match parse_args(std::env::args(), context.as_ref()) {
        Ok(invocation) => invocation,
        Err(err) => {
            if let Some(clap_err) = err.downcast_ref::<clap::Error>() {
                handle_clap_help_version(clap_err);
            } else {
                return Err(err);
            }
        }
    };

    let github = GitHub::from_env()?;
    let output = execute(&invocation.command, &github).await?;

    let mut stdout = std::io::stdout();
    display::render(&output, invocation.output, &mut stdout)?;

    Ok(())
}
