use anyhow::Result;

fn main() -> Result<()> {
    pyscope_cli::main_entry()
}
