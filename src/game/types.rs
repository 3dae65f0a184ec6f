//! Core value types shared by every system: coordinates, directions,
//! footprints, traits and item classification.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The neighbouring cell one step in `direction` (may be out of bounds).
    pub fn offset(self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        Self { x: self.x + dx, y: self.y + dy }
    }

    pub fn manhattan(self, other: Position) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }

    /// The four orthogonal neighbours, in `Direction::ALL` order.
    pub fn neighbors(self) -> [Position; 4] {
        Direction::ALL.map(|d| self.offset(d))
    }
}

/// Unit step on the grid. `Up` decreases `y` (row 0 is the top edge).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [Direction::Up, Direction::Down, Direction::Left, Direction::Right];

    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    pub fn inverted(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    /// How far along this direction a cell lies; larger means farther ahead.
    pub fn progress(self, pos: Position) -> i32 {
        let (dx, dy) = self.delta();
        pos.x * dx + pos.y * dy
    }
}

/// Footprint of an entity in cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Size {
    pub w: i32,
    pub h: i32,
}

impl Size {
    pub const ONE: Size = Size { w: 1, h: 1 };
    /// Two cells side by side (knives).
    pub const WIDE: Size = Size { w: 2, h: 1 };
    /// Two cells stacked (bottles).
    pub const TALL: Size = Size { w: 1, h: 2 };

    /// Every cell covered when anchored at `anchor`, row by row.
    pub fn cells(self, anchor: Position) -> impl Iterator<Item = Position> {
        (0..self.h).flat_map(move |dy| (0..self.w).map(move |dx| Position::new(anchor.x + dx, anchor.y + dy)))
    }

    pub fn area(self) -> usize {
        (self.w * self.h) as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TraitTag {
    Fire,
    Ice,
    Sentient,
    Haunted,
}

impl TraitTag {
    pub const ALL: [TraitTag; 4] = [TraitTag::Fire, TraitTag::Ice, TraitTag::Sentient, TraitTag::Haunted];

    fn bit(self) -> u8 {
        match self {
            TraitTag::Fire => 1 << 0,
            TraitTag::Ice => 1 << 1,
            TraitTag::Sentient => 1 << 2,
            TraitTag::Haunted => 1 << 3,
        }
    }

    /// The element this one cancels out, if any.
    pub fn opposite(self) -> Option<TraitTag> {
        match self {
            TraitTag::Fire => Some(TraitTag::Ice),
            TraitTag::Ice => Some(TraitTag::Fire),
            TraitTag::Sentient | TraitTag::Haunted => None,
        }
    }
}

/// Small bit set of [`TraitTag`]s.
///
/// This is a plain set: the Fire/Ice exclusivity rule lives in
/// `Entity::apply_trait`, because order requirements may legally ask for both.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Vec<TraitTag>", into = "Vec<TraitTag>")]
pub struct TraitSet(u8);

impl TraitSet {
    pub const fn empty() -> Self {
        Self(0)
    }

    pub fn contains(self, tag: TraitTag) -> bool {
        self.0 & tag.bit() != 0
    }

    /// Returns `true` if the tag was not present before.
    pub fn insert(&mut self, tag: TraitTag) -> bool {
        let fresh = !self.contains(tag);
        self.0 |= tag.bit();
        fresh
    }

    /// Returns `true` if the tag was present.
    pub fn remove(&mut self, tag: TraitTag) -> bool {
        let present = self.contains(tag);
        self.0 &= !tag.bit();
        present
    }

    pub fn is_subset(self, other: TraitSet) -> bool {
        self.0 & other.0 == self.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn iter(self) -> impl Iterator<Item = TraitTag> {
        TraitTag::ALL.into_iter().filter(move |t| self.contains(*t))
    }
}

impl FromIterator<TraitTag> for TraitSet {
    fn from_iter<I: IntoIterator<Item = TraitTag>>(iter: I) -> Self {
        let mut set = TraitSet::empty();
        for tag in iter {
            set.insert(tag);
        }
        set
    }
}

impl From<Vec<TraitTag>> for TraitSet {
    fn from(tags: Vec<TraitTag>) -> Self {
        tags.into_iter().collect()
    }
}

impl From<TraitSet> for Vec<TraitTag> {
    fn from(set: TraitSet) -> Self {
        set.iter().collect()
    }
}

/// Order-matching type of an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemSubtype {
    Bread,
    Knife,
    Bottle,
    Ghost,
    TraitTile,
}

impl ItemSubtype {
    /// Subtypes the conveyor can deliver.
    pub const SPAWNABLE: [ItemSubtype; 3] = [ItemSubtype::Bread, ItemSubtype::Knife, ItemSubtype::Bottle];

    pub fn default_size(self) -> Size {
        match self {
            ItemSubtype::Knife => Size::WIDE,
            ItemSubtype::Bottle => Size::TALL,
            ItemSubtype::Bread | ItemSubtype::Ghost | ItemSubtype::TraitTile => Size::ONE,
        }
    }
}

/// What a player-handled item does when used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    /// Sealed crate: can be moved and delivered, never used.
    PlainBox,
    Sword,
    Potion,
    Bread,
}

impl ItemKind {
    /// The usable kind an unsealed item of `subtype` arrives as.
    pub fn for_subtype(subtype: ItemSubtype) -> Option<ItemKind> {
        match subtype {
            ItemSubtype::Bread => Some(ItemKind::Bread),
            ItemSubtype::Knife => Some(ItemKind::Sword),
            ItemSubtype::Bottle => Some(ItemKind::Potion),
            ItemSubtype::Ghost | ItemSubtype::TraitTile => None,
        }
    }
}

/// Ghost behaviour variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GhostFlavor {
    /// Haunts nearby items and is consumed by doing so.
    Wisp,
    /// Sets nearby items on fire.
    Ember,
    /// Freezes nearby items and moves twice as often.
    Frost,
}
