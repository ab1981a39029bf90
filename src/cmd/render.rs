use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use clap::Args;
use tracing::info;

use crate::context::AppContext;
use crate::error::AppResult;
use crate::workflow::dashboard::current_dashboard;

#[derive(Args, Debug, Clone)]
pub struct RenderArgs {
    /// Write the HTML here instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub async fn run(ctx: &AppContext, args: RenderArgs) -> AppResult<()> {
    let dashboard = current_dashboard(ctx).await?;
    let html = ctx.view.render(&dashboard)?;

    match args.output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            fs::write(&path, html)?;
            info!(path = %path.display(), "dashboard written");
        }
        None => {
            let mut stdout = io::stdout();
            stdout.write_all(html.as_bytes())?;
            stdout.flush()?;
        }
    }
    Ok(())
}
