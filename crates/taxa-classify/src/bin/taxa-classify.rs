use anyhow::Result;
use clap::Parser;
use mimalloc::MiMalloc;
use taxa_classify::cli::{self, Cli};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

fn main() -> Result<()> {
    let cli = Cli::parse();
    cli::init_logging(&cli);
    cli::run(&cli)
}
