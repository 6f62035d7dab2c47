//! Convert a single item or a range from the command line
//!
//! Reads the same environment variables a chat front-end would (`ASTCENC_PATH`,
//! `LIVE_BASE_URL`, `CONVERT_QUALITY`, ...) and writes the resulting image or archive
//! into the current directory.
//!
//! ```text
//! cargo run --example convert_range -- live 902000101-10
//! ```

use astc_dl::{BatchConfig, Config, ConversionService, Response, ServerVariant, help_text};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing for logging (optional)
    // Uncomment if you add tracing-subscriber to your dependencies:
    // tracing_subscriber::fmt::init();

    let mut args = std::env::args().skip(1);
    let (Some(variant), token) = (args.next(), args.next()) else {
        let usage = help_text(BatchConfig::default().max_items());
        println!("usage: convert_range <live|adv> <token>\n\n{usage}");
        return Ok(());
    };
    let variant: ServerVariant = variant.parse()?;

    let service = ConversionService::new(Config::from_env()?)?;

    match service.handle(0, variant, token.as_deref()).await {
        Response::Image {
            file_name,
            caption,
            bytes,
        } => {
            std::fs::write(&file_name, bytes)?;
            println!("{caption} -> {file_name}");
        }
        Response::Archive {
            file_name,
            caption,
            bytes,
            failure_report,
        } => {
            std::fs::write(&file_name, bytes)?;
            println!("{caption} -> {file_name}");
            if let Some(report) = failure_report {
                println!("{report}");
            }
        }
        Response::Failure { message } => eprintln!("{message}"),
        Response::Rejected { origin } => eprintln!("origin {origin} is not allowed"),
    }

    Ok(())
}
