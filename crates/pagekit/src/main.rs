//! `pagekit` command-line interface.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use pagekit::dom::memory::{MemoryElement, MemoryViewport};
use pagekit::dom::{Element, Rect};
use pagekit::price::format_price;
use pagekit::prop_scale::{prop_scale, EnvMode};
use pagekit::viewport::{is_element_in_viewport, ViewportSpacing};
use pagekit::Config;
use serde_json::json;
use std::io::Read;
use std::path::PathBuf;
use tracing::debug;

#[derive(Parser)]
#[command(name = "pagekit", version, about = "Browser page helpers from the shell")]
struct Cli {
    /// Emit JSON instead of plain text.
    #[arg(long, global = true)]
    json: bool,

    /// JSON config file; PAGEKIT_* variables still apply on top.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Format a price.
    Price {
        #[arg(allow_hyphen_values = true)]
        value: f64,
        /// The value is in cents.
        #[arg(long)]
        cents: bool,
        /// Prefix the currency.
        #[arg(long)]
        before: bool,
        /// Suffix the currency.
        #[arg(long)]
        after: bool,
        #[arg(long)]
        locale: Option<String>,
        #[arg(long)]
        currency: Option<String>,
    },
    /// Check values against a scale prop validator.
    Scale {
        #[arg(required = true, allow_hyphen_values = true)]
        values: Vec<String>,
        /// Allowed numbers, comma separated.
        #[arg(long, value_delimiter = ',', required = true)]
        valid: Vec<f64>,
        #[arg(long, default_value_t = 0.0)]
        default: f64,
        /// Build mode; defaults to the configured one.
        #[arg(long)]
        mode: Option<String>,
    },
    /// Test a rectangle against a viewport.
    Viewport {
        /// top,left,bottom,right
        #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
        rect: Vec<f64>,
        /// width,height
        #[arg(long, value_delimiter = ',')]
        size: Vec<f64>,
        /// top,right,bottom,left
        #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
        spacing: Option<Vec<f64>>,
        #[arg(long)]
        partial: bool,
    },
    /// Deep-copy JSON from stdin to stdout.
    #[command(name = "clone")]
    DeepClone,
}

fn main() -> Result<()> {
    pagekit::telemetry::init("pagekit=info");
    let cli = Cli::parse();

    let base = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    let config = base.with_env_overrides();
    debug!(?config, "resolved config");

    match cli.command {
        Commands::Price {
            value,
            cents,
            before,
            after,
            locale,
            currency,
        } => {
            let mut options = config.price_options(value);
            options.is_value_cent_amount = cents;
            options.currency_before = before;
            options.currency_after = after;
            if let Some(locale) = locale {
                options.locale = locale;
            }
            if let Some(currency) = currency {
                options.currency = currency;
            }

            let formatted = format_price(&options);
            if cli.json {
                println!("{}", json!({ "options": options, "formatted": formatted }));
            } else {
                println!("{formatted}");
            }
        }
        Commands::Scale {
            values,
            valid,
            default,
            mode,
        } => {
            let mode = mode.map(EnvMode::from).unwrap_or(config.env_mode);
            let prop = prop_scale(default, &valid, &mode);
            let results: Vec<(String, bool)> = values
                .into_iter()
                .map(|v| {
                    let ok = prop.validate(&v);
                    (v, ok)
                })
                .collect();

            if cli.json {
                let checks: Vec<_> = results
                    .iter()
                    .map(|(value, ok)| json!({ "value": value, "valid": ok }))
                    .collect();
                println!(
                    "{}",
                    json!({ "mode": mode, "prop": prop, "checks": checks })
                );
            } else {
                for (value, ok) in &results {
                    println!("{value}\t{}", if *ok { "valid" } else { "invalid" });
                }
            }
        }
        Commands::Viewport {
            rect,
            size,
            spacing,
            partial,
        } => {
            let &[top, left, bottom, right] = rect.as_slice() else {
                bail!("--rect takes four numbers: top,left,bottom,right");
            };
            let &[width, height] = size.as_slice() else {
                bail!("--size takes two numbers: width,height");
            };
            let spacing = match spacing.as_deref() {
                Some(&[t, r, b, l]) => ViewportSpacing::all(t, r, b, l),
                Some(_) => bail!("--spacing takes four numbers: top,right,bottom,left"),
                None => config.viewport_spacing,
            };

            let element = MemoryElement::new(Rect::new(top, left, bottom, right));
            let element: &dyn Element = &element;
            let visible = is_element_in_viewport(
                Some(element),
                &MemoryViewport::new(width, height),
                &spacing,
                partial,
            )?;

            if cli.json {
                println!("{}", json!({ "visible": visible, "partial": partial }));
            } else {
                println!("{}", if visible { "visible" } else { "hidden" });
            }
        }
        Commands::DeepClone => {
            let mut input = String::new();
            std::io::stdin()
                .read_to_string(&mut input)
                .context("reading stdin")?;
            let value: serde_json::Value =
                serde_json::from_str(&input).context("stdin is not valid JSON")?;
            let copy = pagekit::clone::clone_value(&value)?;
            println!("{}", serde_json::to_string_pretty(&copy)?);
        }
    }

    Ok(())
}
