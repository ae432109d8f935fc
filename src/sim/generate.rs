//! World generation: shelf grid, balanced colors, pre-shelved blocks

use rand::seq::SliceRandom;

use super::block::{Block, BlockColor};
use super::shelf::Shelf;
use super::state::{BlockId, GameState, ShelfId};

/// Colors for `count` shelves: round-robin over the palette, then shuffled
///
/// Every color appears either `count / len` or `count / len + 1` times.
pub fn balanced_colors<R: rand::Rng>(palette: &[BlockColor], count: usize, rng: &mut R) -> Vec<BlockColor> {
    if palette.is_empty() {
        return Vec::new();
    }
    let mut colors: Vec<BlockColor> = palette.iter().copied().cycle().take(count).collect();
    colors.shuffle(rng);
    colors
}

/// Build shelves and blocks from the session config
pub fn generate_world(state: &mut GameState) {
    let config = state.config.clone();
    let colors = balanced_colors(&config.color_palette, config.shelf_count(), &mut state.rng);

    state.shelves.clear();
    state.blocks.clear();

    for (index, pos) in config.shelf_positions().enumerate() {
        let Some(&color) = colors.get(index) else {
            continue;
        };
        let mut shelf = Shelf::new(ShelfId(index as u32), pos, color, config.shelf_capacity);

        for _ in 0..config.initial_fill {
            let mut block = Block::new(BlockId(state.blocks.len() as u32), color, pos);
            if shelf.add_block(&mut block) {
                state.blocks.push(block);
            }
        }
        state.shelves.push(shelf);
    }

    log::info!(
        "Generated world {}x{}: {} shelves, {} blocks, palette {:?}",
        config.world_width,
        config.world_height,
        state.shelves.len(),
        state.blocks.len(),
        config.color_palette
    );
}
