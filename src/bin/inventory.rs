//! Entry point for `cloudlab-inventory`.

use clap::Parser;

use cloudlab_cli::cli::inventory::{self, InventoryCli};

#[tokio::main]
async fn main() {
    let cli = match InventoryCli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            // Ansible treats any non-zero exit as "inventory unavailable",
            // so usage mistakes exit 1 instead of clap's default 2; help
            // and version are not errors.
            if err.use_stderr() {
                std::process::exit(1);
            }
            std::process::exit(0);
        }
    };
    if let Err(e) = inventory::run(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
