/// Glyph tiles: placeable instances of a single character.
///
/// A tile's identity (`TileId`) is distinct from its glyph value, so two
/// tiles carrying the same character stay distinguishable across the pool
/// and the slots. Tiles are minted fresh every time a word is loaded or
/// reset and never survive a word change.

/// Unique handle for one tile within a session.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct TileId(pub u32);

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Tile {
    pub id: TileId,
    pub glyph: char,
    /// The slot index this tile belongs in within the current word.
    #[allow(dead_code)]
    pub home_index: usize,
}

impl Tile {
    pub fn new(id: TileId, glyph: char, home_index: usize) -> Self {
        Tile { id, glyph, home_index }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_glyph_distinct_identity() {
        let a = Tile::new(TileId(0), '树', 1);
        let b = Tile::new(TileId(1), '树', 2);
        assert_eq!(a.glyph, b.glyph);
        assert_ne!(a.id, b.id);
        assert_ne!(a, b);
    }
}
