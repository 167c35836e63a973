use anyhow::Result;

use crate::Context;
use crate::config::Config;
use crate::ui;

pub fn show(ctx: &Context) -> Result<()> {
    ui::header("Configuration");

    let path = Config::default_path()?;
    ui::kv("Config file", &path.display().to_string());
    ui::kv(
        "Transaction file",
        &ctx.config.transaction_path()?.display().to_string(),
    );
    println!();

    let rendered = ctx.config.to_toml()?;
    if rendered.trim().is_empty() {
        ui::dim("All settings at their defaults.");
    } else {
        print!("{rendered}");
    }
    Ok(())
}
