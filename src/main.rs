//! Feature dump tool: parse a FEN and print the active feature indices for
//! both perspectives.

use anyhow::{Context, Result, bail};
use tracing::info;

use skiff_core::{Board, Color};
use skiff_eval::{FeatureSet, IndexList, SimplifiedThreats};

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let mut args = std::env::args().skip(1);
    let Some(fen) = args.next() else {
        bail!("usage: skiff \"<FEN>\"");
    };

    let board: Board = fen
        .parse()
        .map_err(anyhow::Error::new)
        .with_context(|| format!("cannot parse FEN \"{fen}\""))?;
    info!(%board, "extracting features");

    let features = SimplifiedThreats::new();
    for persp in Color::ALL {
        let mut presence = IndexList::new();
        let mut threats = IndexList::new();
        features.append_active_features(&board, persp, &mut presence, &mut threats);

        println!(
            "{persp}: {} presence, {} threats",
            presence.len(),
            threats.len()
        );
        for index in presence.iter().chain(threats.iter()) {
            println!("{index}");
        }
    }

    Ok(())
}
