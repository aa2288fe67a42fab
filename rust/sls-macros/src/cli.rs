use crate::{
    config::{AppConfig, OutputFormat},
    error::Result,
    models::{interpolate_request, InterpolateRequest, InterpolateResponse},
};
use chrono::{DateTime, Utc};
use clap::Parser;
use std::io::{Read, Write};

#[derive(Debug, Parser)]
#[command(name = "sls-macros")]
#[command(about = "Expand Grafana time macros into SLS SQL", long_about = None)]
pub struct Cli {
    /// Query text. Read from stdin when omitted
    #[arg(short, long)]
    pub query: Option<String>,

    /// Inclusive lower bound in epoch seconds
    #[arg(long, requires = "to", allow_negative_numbers = true)]
    pub from: Option<i64>,

    /// Exclusive upper bound in epoch seconds
    #[arg(long, requires = "from", allow_negative_numbers = true)]
    pub to: Option<i64>,

    /// Range preset (`last_1h`, `today`, `[start,end]`) used instead of --from/--to
    #[arg(short, long, conflicts_with_all = ["from", "to"])]
    pub range: Option<String>,

    /// Read a JSON request document from stdin and answer with JSON
    #[arg(long, conflicts_with_all = ["query", "from", "to", "range"])]
    pub json: bool,

    /// Output format (defaults to SLS_MACROS_OUTPUT)
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,
}

impl Cli {
    pub fn execute<R, W>(
        self,
        config: &AppConfig,
        input: &mut R,
        out: &mut W,
        now: DateTime<Utc>,
    ) -> Result<()>
    where
        R: Read,
        W: Write,
    {
        let (request, output) = if self.json {
            let request: InterpolateRequest = serde_json::from_reader(input)?;
            (request, OutputFormat::Json)
        } else {
            let query = match self.query {
                Some(query) => query,
                None => {
                    let mut buf = String::new();
                    input.read_to_string(&mut buf)?;
                    buf.trim_end_matches(['\n', '\r']).to_string()
                }
            };
            let request = InterpolateRequest {
                query,
                from: self.from,
                to: self.to,
                range: self.range,
            };
            (request, self.output.unwrap_or(config.output))
        };

        let response = interpolate_request(config, request, now)?;
        write_response(out, &response, output)
    }
}

fn write_response<W: Write>(
    out: &mut W,
    response: &InterpolateResponse,
    format: OutputFormat,
) -> Result<()> {
    match format {
        OutputFormat::Text => writeln!(out, "{}", response.sql)?,
        OutputFormat::Json => {
            serde_json::to_writer(&mut *out, response)?;
            writeln!(out)?;
        }
    }
    out.flush()?;
    Ok(())
}
