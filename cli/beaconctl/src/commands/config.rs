//! Config command: read values through the remote config resolver.

use anyhow::Result;
use beacon_sdk::{ConfigResolver, ConfigValue};
use clap::{Args, Subcommand, ValueEnum};
use serde::Serialize;
use tabled::Tabled;

use crate::output::{print_output, OutputFormat};

use super::CommandContext;

/// Config command.
#[derive(Debug, Args)]
pub struct ConfigCommand {
    #[command(subcommand)]
    command: ConfigSubcommand,
}

#[derive(Debug, Subcommand)]
enum ConfigSubcommand {
    /// Read one key.
    Get(ConfigGetArgs),

    /// List every active key.
    List,
}

#[derive(Debug, Args)]
struct ConfigGetArgs {
    key: String,

    /// Value returned when the key is missing or empty.
    #[arg(long, default_value = "")]
    default: String,

    /// How to interpret the value.
    #[arg(long = "as", value_enum, default_value_t = ValueKind::String)]
    kind: ValueKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ValueKind {
    String,
    Bool,
    Number,
}

#[derive(Debug, Serialize, Tabled)]
struct ConfigRow {
    #[tabled(rename = "Key")]
    key: String,

    #[tabled(rename = "Value")]
    value: String,

    #[tabled(rename = "Source")]
    source: String,
}

impl From<ConfigValue> for ConfigRow {
    fn from(value: ConfigValue) -> Self {
        Self {
            key: value.key,
            value: value.value,
            source: value.source.to_string(),
        }
    }
}

impl ConfigCommand {
    pub async fn run(self, ctx: CommandContext) -> Result<()> {
        let resolver = ctx.resolver().await?;
        match self.command {
            ConfigSubcommand::Get(args) => {
                let row = read_key(&resolver, &args);
                print_output(&[row], ctx.format);
            }
            ConfigSubcommand::List => {
                let rows: Vec<ConfigRow> = resolver.all().into_iter().map(ConfigRow::from).collect();
                print_output(&rows, ctx.format);
            }
        }
        Ok(())
    }
}

fn read_key(resolver: &ConfigResolver, args: &ConfigGetArgs) -> ConfigRow {
    let resolved = resolver.get_value(&args.key);
    let value = match args.kind {
        ValueKind::String => resolver.get_string(&args.key, &args.default),
        ValueKind::Bool => {
            let default = args.default.parse::<bool>().unwrap_or(false);
            resolver.get_bool(&args.key, default).to_string()
        }
        ValueKind::Number => {
            let default = args.default.parse::<f64>().unwrap_or(0.0);
            resolver.get_number(&args.key, default).to_string()
        }
    };

    let fell_back = match args.kind {
        ValueKind::String => resolved.value.is_empty(),
        ValueKind::Bool => resolved.as_bool().is_none(),
        ValueKind::Number => resolved.as_number().is_none(),
    };
    let source = if fell_back {
        "fallback".to_string()
    } else {
        resolved.source.to_string()
    };

    ConfigRow {
        key: args.key.clone(),
        value,
        source,
    }
}
