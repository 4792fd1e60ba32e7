use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(name = "rget", version, about, long_about = None)]
pub struct Args {
    /// URL of the file to download.
    pub url: String,

    /// Destination file. Derived from the URL under the download directory
    /// when omitted.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Bytes requested per range.
    #[arg(long, value_name = "BYTES")]
    pub chunk_size: Option<u64>,

    /// Extension appended to the destination for the staging file.
    #[arg(long, value_name = "EXT")]
    pub partial_ext: Option<String>,

    #[arg(long, value_name = "UNIT")]
    pub range_unit: Option<String>,

    /// Where derived destinations are placed.
    #[arg(long, value_name = "DIR")]
    pub download_dir: Option<PathBuf>,

    /// Pause between attempts.
    #[arg(long, value_name = "MS")]
    pub retry_delay_ms: Option<u64>,

    /// How many 5xx responses to retry before giving up.
    #[arg(long, value_name = "COUNT")]
    pub server_error_retries: Option<u32>,

    /// Extra request header, as `Name: value`. May be repeated.
    #[arg(short = 'H', long = "header", value_name = "HEADER", value_parser = parse_header)]
    pub headers: Vec<(String, String)>,

    #[arg(short = 'X', long, value_name = "METHOD", default_value = "GET")]
    pub method: String,

    /// Log every request/response exchange.
    #[arg(long)]
    pub debug: bool,

    /// Append every exchange as a JSON line to FILE. Implies --debug.
    #[arg(long, value_name = "FILE")]
    pub stats: Option<PathBuf>,

    /// TOML config file.
    #[arg(long, value_name = "FILE", default_value = "rget.toml")]
    pub config: PathBuf,
}

fn parse_header(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected `Name: value`, got {raw:?}"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("empty header name in {raw:?}"));
    }
    Ok((name.to_string(), value.trim().to_string()))
}
