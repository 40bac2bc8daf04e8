//! Upload command - posts a file to a running server.

use std::path::PathBuf;

use anyhow::{Context as _, Result, bail};
use clap::Args;
use reqwest::multipart::{Form, Part};

use super::Context;

/// Arguments for the upload command.
#[derive(Args, Debug)]
pub struct UploadArgs {
    /// File to upload
    pub file: PathBuf,

    /// Upload endpoint (default: the configured server's /upload)
    #[arg(long)]
    pub url: Option<String>,
}

/// Run the upload command.
pub async fn run(args: UploadArgs, ctx: &Context) -> Result<()> {
    let url = match args.url {
        Some(url) => url,
        None => {
            let addr = ctx.config.config.server().socket_addr()?;
            format!("http://{}/upload", addr)
        }
    };

    let file_name = args
        .file
        .file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .with_context(|| format!("not a file path: {}", args.file.display()))?;
    let contents = tokio::fs::read(&args.file)
        .await
        .with_context(|| format!("reading {}", args.file.display()))?;

    if ctx.verbose {
        println!("Uploading {} ({} bytes) to {}", file_name, contents.len(), url);
    }

    let client = reqwest::Client::new();

    // The server hands out a form token; send it back with the file.
    let token = client
        .get(&url)
        .send()
        .await
        .ok()
        .and_then(|resp| resp.error_for_status().ok());
    let token = match token {
        Some(resp) => resp
            .json::<serde_json::Value>()
            .await
            .ok()
            .and_then(|v| v["token"].as_str().map(str::to_string)),
        None => None,
    };

    let mut form = Form::new().part("uploadfile", Part::bytes(contents).file_name(file_name));
    if let Some(token) = token {
        form = form.text("token", token);
    }

    let response = client
        .post(&url)
        .multipart(form)
        .send()
        .await
        .with_context(|| format!("posting to {}", url))?;

    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        bail!("upload failed ({}): {}", status, body);
    }

    println!("{}", body);
    Ok(())
}
