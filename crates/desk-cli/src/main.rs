use desk_cli::{cli, init_tracing, run, DeskFile};
use std::path::PathBuf;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let matches = cli().get_matches();
    let path = matches
        .get_one::<PathBuf>("file")
        .cloned()
        .unwrap_or_else(|| PathBuf::from("desk.yaml"));

    let file = DeskFile::load(&path)?;
    init_tracing(&file.log)?;
    tracing::debug!(path = %path.display(), version = desk_cli::VERSION, "Loaded desk file");

    let output = run(&file, &matches).await?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
