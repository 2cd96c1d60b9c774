//! Random container colors with a deny-list.
//!
//! New containers avoid the colors of topologically adjacent tabs so they
//! are visually distinct from their neighbors. That is a heuristic, not a
//! correctness property - but a deny-list covering the whole palette is a
//! caller bug and reported as such rather than silently tolerated.

use rand::Rng;
use tmpc_directory::ContainerColor;

use crate::error::{Error, Result};

/// Every color the host allows for containers.
pub const PALETTE: [ContainerColor; 8] = [
    ContainerColor::Blue,
    ContainerColor::Turquoise,
    ContainerColor::Green,
    ContainerColor::Yellow,
    ContainerColor::Orange,
    ContainerColor::Red,
    ContainerColor::Pink,
    ContainerColor::Purple,
];

/// Pick a color uniformly at random from the palette minus `deny`.
///
/// # Errors
///
/// [`Error::NoColorAvailable`] when the deny-list covers the palette.
pub fn pick_color(deny: &[ContainerColor]) -> Result<ContainerColor> {
    let options: Vec<ContainerColor> = PALETTE
        .into_iter()
        .filter(|color| !deny.contains(color))
        .collect();
    if options.is_empty() {
        return Err(Error::NoColorAvailable);
    }
    let index = rand::thread_rng().gen_range(0..options.len());
    Ok(options[index])
}
