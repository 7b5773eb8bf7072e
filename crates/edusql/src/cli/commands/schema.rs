use anyhow::{Context, Result};
use clap::Args;

use crate::models::wire_json_schema;
use crate::schema::SchemaDescriptor;

#[derive(Debug, Clone, Args)]
pub struct SchemaArgs {
    #[arg(long, default_value_t = false, conflicts_with = "wire")]
    pub json: bool,

    /// Print the JSON Schema of the chat relay line formats instead.
    #[arg(long, default_value_t = false)]
    pub wire: bool,
}

pub fn run(args: &SchemaArgs) -> Result<()> {
    let encoded = if args.wire {
        serde_json::to_string_pretty(&wire_json_schema())
            .context("failed to encode chat wire schema")?
    } else if args.json {
        serde_json::to_string_pretty(&SchemaDescriptor::school())
            .context("failed to encode schema descriptor")?
    } else {
        SchemaDescriptor::school().render()
    };
    println!("{}", encoded.trim_end());
    Ok(())
}
