//! `tcr item-id`: compute the id an item would get in the registry.

use anyhow::{Context, Result};
use clap::Args;

use tcr_core::ItemId;

/// Item-id arguments.
#[derive(Args, Debug)]
pub struct ItemIdArgs {
    /// Item data, as UTF-8 text (or hex with `--hex`).
    pub data: String,

    /// Derive a sequential id for the given submission index.
    #[arg(long)]
    pub sequence: Option<u64>,

    /// Treat `data` as hex-encoded bytes.
    #[arg(long)]
    pub hex: bool,
}

/// Id of the item described by `args`.
pub fn item_id(args: &ItemIdArgs) -> Result<ItemId> {
    let data = if args.hex {
        hex::decode(args.data.trim_start_matches("0x")).context("item data is not valid hex")?
    } else {
        args.data.as_bytes().to_vec()
    };
    anyhow::ensure!(!data.is_empty(), "item data is empty");
    let id = match args.sequence {
        Some(sequence) => ItemId::from_sequence(&data, sequence)?,
        None => ItemId::from_content(&data)?,
    };
    Ok(id)
}

/// Execute the item-id subcommand.
pub fn run_item_id(args: &ItemIdArgs) -> Result<u8> {
    println!("{}", item_id(args)?);
    Ok(0)
}
