use anyhow::Result;

fn main() -> Result<()> {
    divbench::cli::run()
}
