//! Entry point for `cloudlab-verify`.

use clap::Parser;

use cloudlab_cli::cli::verify::{self, VerifyCli};
use cloudlab_cli::output::json::format_error;

#[tokio::main]
async fn main() {
    let cli = VerifyCli::parse();
    let json = cli.json;
    match verify::run(&cli).await {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            if json {
                if let Ok(rendered) = format_error(&format!("{e:#}"), "verify_error") {
                    println!("{rendered}");
                }
            }
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}
