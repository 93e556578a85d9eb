/// Constructs: what occupies a place, and the predicates the action
/// handlers ask about it.

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ConstructKind {
    NoFloor,
    Floor,
    BrokenFloor,
    SkeletonFloor,
    LooseFloor,
    SpikesFloor,
    OpenerFloor,
    CloserFloor,
    Pillar,
    Wall,
    Door,
    LevelDoor,
    Mirror,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Potion {
    SmallLife,
    BigLife,
    Poison,
    Float,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Item {
    #[default]
    None,
    Potion(Potion),
    Sword,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Construct {
    pub fg: ConstructKind,
    pub item: Item,
    /// Event index for opener/closer floors.
    pub event: Option<usize>,
}

impl Construct {
    pub const fn new(fg: ConstructKind) -> Self {
        Construct { fg, item: Item::None, event: None }
    }

    pub fn with_item(mut self, item: Item) -> Self {
        self.item = item;
        self
    }

    /// Nothing to stand on: the only construct an actor falls through.
    pub fn is_strictly_traversable(&self) -> bool {
        self.fg == ConstructKind::NoFloor
    }

    /// Has a floor edge an actor can hang from.
    pub fn has_hang_edge(&self) -> bool {
        !matches!(
            self.fg,
            ConstructKind::NoFloor | ConstructKind::Wall | ConstructKind::Mirror
        )
    }

    pub fn is_depressible(&self) -> bool {
        matches!(self.fg, ConstructKind::OpenerFloor | ConstructKind::CloserFloor)
    }
}

impl Default for Construct {
    fn default() -> Self {
        Construct::new(ConstructKind::NoFloor)
    }
}

impl ConstructKind {
    /// Single-character glyph (level files and the terminal renderer).
    pub fn glyph(self) -> char {
        match self {
            ConstructKind::NoFloor => '.',
            ConstructKind::Floor => '_',
            ConstructKind::BrokenFloor => 'x',
            ConstructKind::SkeletonFloor => 'b',
            ConstructKind::LooseFloor => '~',
            ConstructKind::SpikesFloor => '^',
            ConstructKind::OpenerFloor => 'o',
            ConstructKind::CloserFloor => 'c',
            ConstructKind::Pillar => '|',
            ConstructKind::Wall => '#',
            ConstructKind::Door => 'D',
            ConstructKind::LevelDoor => 'L',
            ConstructKind::Mirror => 'M',
        }
    }
}

impl Item {
    pub fn glyph(self) -> Option<char> {
        match self {
            Item::None => None,
            Item::Potion(Potion::SmallLife) => Some('p'),
            Item::Potion(Potion::BigLife) => Some('P'),
            Item::Potion(Potion::Poison) => Some('!'),
            Item::Potion(Potion::Float) => Some('f'),
            Item::Sword => Some('s'),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_no_floor_is_strictly_traversable() {
        assert!(Construct::new(ConstructKind::NoFloor).is_strictly_traversable());
        assert!(!Construct::new(ConstructKind::LooseFloor).is_strictly_traversable());
        assert!(!Construct::new(ConstructKind::BrokenFloor).is_strictly_traversable());
    }

    #[test]
    fn hang_edges() {
        assert!(Construct::new(ConstructKind::Floor).has_hang_edge());
        assert!(Construct::new(ConstructKind::Door).has_hang_edge());
        assert!(!Construct::new(ConstructKind::Wall).has_hang_edge());
        assert!(!Construct::new(ConstructKind::NoFloor).has_hang_edge());
    }
}
