//! Request handling for chat front-ends
//!
//! [`ConversionService`] turns a command (origin, server variant, token) into a
//! [`Response`] the front-end can send as-is: one image, one archive with a condensed
//! failure listing, or a short failure message.

use std::sync::Arc;

use tracing::{error, info};

use crate::archive::ArchiveBuilder;
use crate::batch::BatchOrchestrator;
use crate::config::Config;
use crate::convert::{Converter, converter_from_config};
use crate::error::{ArchiveError, ConvertError, Error, ParseError, Result};
use crate::failure_ranges::format_failure_report;
use crate::fetch::{HttpItemFetcher, ItemFetcher};
use crate::range::RangeParser;
use crate::types::{BatchResult, ItemOutcome, ServerVariant};

/// What to send back for one command
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Response {
    /// A single converted image
    Image {
        /// Suggested file name, e.g. `902000101.png`
        file_name: String,
        /// Caption naming the server variant and identifier
        caption: String,
        /// Image bytes
        bytes: Vec<u8>,
    },
    /// A zip archive of every converted image in a bulk request
    Archive {
        /// Suggested file name, e.g. `live_902000101-10.zip`
        file_name: String,
        /// Caption naming the server variant, token and success count
        caption: String,
        /// Archive bytes
        bytes: Vec<u8>,
        /// Condensed listing of failed identifiers, sent as a separate message
        failure_report: Option<String>,
    },
    /// Nothing could be produced
    Failure {
        /// User-facing message
        message: String,
    },
    /// The origin is not allowed to use the service; nothing should be sent
    Rejected {
        /// The rejected origin
        origin: i64,
    },
}

/// Usage message shown for the start/help command
///
/// `max_items` is the most identifiers one range may cover, see
/// [`BatchConfig::max_items`](crate::config::BatchConfig::max_items).
pub fn help_text(max_items: usize) -> String {
    let live = ServerVariant::Live.command();
    let adv = ServerVariant::Advance.command();
    format!(
        "🔥 ASTC to PNG Converter 🔥\n\
         Commands:\n\
         /{live} <id> - Live server item\n\
         /{adv} <id> - Advance server item\n\
         \n\
         Ranges convert up to {max_items} items into one zip:\n\
         /{live} 902000101-50\n\
         \n\
         Example: /{live} 902000101"
    )
}

/// Entry point for front-ends: access check, parsing, batch run and response shaping
#[derive(Clone)]
pub struct ConversionService {
    config: Arc<Config>,
    parser: RangeParser,
    live: BatchOrchestrator,
    advance: BatchOrchestrator,
    archive: ArchiveBuilder,
}

impl ConversionService {
    /// Build a service with HTTP fetchers and the configured conversion tool
    ///
    /// If the tool cannot be located the service still starts and answers every
    /// conversion request with a tool-missing message.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let client = reqwest::Client::builder()
            .timeout(config.batch.fetch_timeout)
            .build()?;
        let live = Arc::new(HttpItemFetcher::with_client(
            client.clone(),
            config.servers.live_base_url.clone(),
        ));
        let advance = Arc::new(HttpItemFetcher::with_client(
            client,
            config.servers.advance_base_url.clone(),
        ));
        let converter = converter_from_config(&config.converter);
        Ok(Self::with_collaborators(config, live, advance, converter))
    }

    /// Build a service from explicit collaborators
    pub fn with_collaborators(
        config: Config,
        live: Arc<dyn ItemFetcher>,
        advance: Arc<dyn ItemFetcher>,
        converter: Arc<dyn Converter>,
    ) -> Self {
        let parser = RangeParser::new(config.batch.max_range_span);
        let live = BatchOrchestrator::new(live, converter.clone(), &config.batch);
        let advance = BatchOrchestrator::new(advance, converter, &config.batch);
        Self {
            config: Arc::new(config),
            parser,
            live,
            advance,
            archive: ArchiveBuilder::default(),
        }
    }

    /// Active configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Usage message for this service's batch limit
    pub fn help_text(&self) -> String {
        help_text(self.config().batch.max_items())
    }

    /// Check `origin` against the allow-list
    ///
    /// # Errors
    ///
    /// [`Error::AccessDenied`] if an allow-list is configured and `origin` is not on it.
    pub fn authorize(&self, origin: i64) -> Result<()> {
        if self.config.access.is_allowed(origin) {
            Ok(())
        } else {
            Err(Error::AccessDenied { origin })
        }
    }

    fn orchestrator(&self, variant: ServerVariant) -> &BatchOrchestrator {
        match variant {
            ServerVariant::Live => &self.live,
            ServerVariant::Advance => &self.advance,
        }
    }

    /// Handle one command
    ///
    /// Never fails: request-level errors become [`Response::Failure`] and per-item
    /// failures are folded into the response.
    pub async fn handle(
        &self,
        origin: i64,
        variant: ServerVariant,
        token: Option<&str>,
    ) -> Response {
        if let Err(e) = self.authorize(origin) {
            info!(origin, error = %e, "rejected request");
            return Response::Rejected { origin };
        }

        let Some(token) = token.map(str::trim).filter(|t| !t.is_empty()) else {
            return Response::Failure {
                message: "Please provide item ID".to_string(),
            };
        };

        match self.process(variant, token).await {
            Ok(response) => response,
            Err(e) => {
                info!(token, error = %e, code = e.error_code(), "request failed");
                Response::Failure {
                    message: failure_message(&e),
                }
            }
        }
    }

    /// Parse and run a token against a server variant without the access check
    ///
    /// # Errors
    ///
    /// Request-level failures: bad token, missing tool, or nothing converted in a bulk
    /// request.
    pub async fn process(&self, variant: ServerVariant, token: &str) -> Result<Response> {
        let request = self.parser.parse(token)?;
        let result = self.orchestrator(variant).run(&request).await?;

        if result.is_bulk() {
            self.bulk_response(variant, &result)
        } else {
            Ok(self.single_response(variant, &result))
        }
    }

    fn single_response(&self, variant: ServerVariant, result: &BatchResult) -> Response {
        let extension = self.orchestrator(variant).converter().output_extension();
        let Some(outcome) = result.outcomes().first() else {
            return Response::Failure {
                message: format!("❌ Nothing could be converted for {}", result.token()),
            };
        };

        match outcome {
            ItemOutcome::Success { id, bytes } => Response::Image {
                file_name: ArchiveBuilder::entry_name(id, extension),
                caption: format!("{variant} {id}"),
                bytes: bytes.clone(),
            },
            ItemOutcome::FetchFailed { id, .. } => Response::Failure {
                message: format!("❌ Failed to download {id}"),
            },
            ItemOutcome::ConvertFailed {
                id,
                error: ConvertError::Timeout { .. },
            } => Response::Failure {
                message: format!("⌛ Conversion of {id} timed out"),
            },
            ItemOutcome::ConvertFailed { id, error } => Response::Failure {
                message: format!("⚠️ Error converting {id}: {error}"),
            },
        }
    }

    fn bulk_response(&self, variant: ServerVariant, result: &BatchResult) -> Result<Response> {
        let succeeded = result.success_count();
        if succeeded == 0 {
            return Err(Error::NothingSucceeded {
                token: result.token().to_string(),
            });
        }

        let extension = self.orchestrator(variant).converter().output_extension();
        let entries: Vec<(String, &[u8])> = result
            .successes()
            .map(|(id, bytes)| (ArchiveBuilder::entry_name(id, extension), bytes))
            .collect();
        let failure_report = format_failure_report(&result.failed_ids());

        let bytes = match self.archive.build(&entries) {
            Ok(bytes) => bytes,
            Err(e) => {
                error!(token = result.token(), error = %e, "failed to build archive");
                return Ok(archive_failure_response(e, failure_report));
            }
        };

        Ok(Response::Archive {
            file_name: format!(
                "{}_{}.zip",
                variant.display_name().to_ascii_lowercase(),
                result.token()
            ),
            caption: format!("{variant} {} ({succeeded} converted)", result.token()),
            bytes,
            failure_report,
        })
    }
}

/// Failure sent when packaging fails; failed identifiers are still listed
fn archive_failure_response(error: ArchiveError, failure_report: Option<String>) -> Response {
    let mut message = failure_message(&Error::from(error));
    if let Some(report) = failure_report {
        message.push_str("\n\n");
        message.push_str(&report);
    }
    Response::Failure { message }
}

/// User-facing text for a request-level error
pub fn failure_message(e: &Error) -> String {
    match e {
        Error::Parse(ParseError::InvalidFormat { .. }) => {
            "❌ Invalid item ID. Use /live <id> or /live <id>-<end>".to_string()
        }
        Error::Parse(ParseError::EmptyRange { .. }) => {
            "❌ Range end must be greater than its start".to_string()
        }
        Error::Parse(ParseError::RangeTooLarge { max, .. }) => {
            format!("❌ Range too large, the end may be at most {max} past the start")
        }
        Error::ToolMissing { .. } => {
            "⚠️ Converter is not available, please contact the administrator".to_string()
        }
        Error::NothingSucceeded { token } => format!("❌ Nothing could be converted for {token}"),
        Error::AccessDenied { .. } => "⛔ Access denied".to_string(),
        Error::Archive(e) => format!("⚠️ Failed to build archive: {e}"),
        other => format!("⚠️ Error: {other}"),
    }
}
