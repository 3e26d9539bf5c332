//! Interactive search against the embedded Melbourne dataset
//!
//! Every line read from stdin is treated as the new contents of the search
//! box. Lines starting with `:` are commands:
//! - `:pick N`   select the Nth prediction (1-based)
//! - `:poi ID`   select a place id as if tapped on the map
//! - `:clear`    dismiss the selected place
//! - `:quit`     exit
//!
//! Run with `RUST_LOG=wayfinder=debug` to watch tokens being minted and
//! stale responses being dropped.

use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};
use wayfinder::{SearchSession, SessionConfigBuilder, places::FixtureProvider};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    wayfinder::init_logging(tracing::Level::INFO)?;

    // Some latency makes the debounce and supersede behaviour visible.
    let provider = FixtureProvider::embedded()?.with_latency(Duration::from_millis(400));
    let config = SessionConfigBuilder::new().build()?;
    let session = SearchSession::new(std::sync::Arc::new(provider), config)?;

    let mut state = session.subscribe_state();
    tokio::spawn(async move {
        while state.changed().await.is_ok() {
            let snapshot = state.borrow_and_update().clone();
            if snapshot.is_loading {
                println!("  ...searching");
            } else if let Some(error) = &snapshot.error {
                println!("  ! {error}");
            } else {
                for (i, prediction) in snapshot.predictions.iter().enumerate() {
                    println!(
                        "  {}. {} [{:?}]",
                        i + 1,
                        prediction.full_text(),
                        prediction.category()
                    );
                }
            }
        }
    });

    let mut selected = session.subscribe_selected_place();
    tokio::spawn(async move {
        while selected.changed().await.is_ok() {
            match &*selected.borrow_and_update() {
                Some(place) => println!("  => {place}"),
                None => println!("  => (no selection)"),
            }
        }
    });

    println!("Type to search Melbourne places, :quit to exit");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match line.split_once(' ').unwrap_or((line.as_str(), "")) {
            (":quit", _) => break,
            (":clear", _) => session.clear_selection()?,
            (":poi", id) => session.on_point_of_interest_selected(id.trim())?,
            (":pick", n) => {
                let index = n.trim().parse::<usize>().unwrap_or(0);
                match index
                    .checked_sub(1)
                    .and_then(|i| session.state().predictions.get(i).cloned())
                {
                    Some(prediction) => session.on_prediction_selected(prediction.place_id)?,
                    None => println!("  no prediction #{index}"),
                }
            }
            _ => session.on_query_changed(line.as_str())?,
        }
    }

    session.shutdown();
    Ok(())
}
