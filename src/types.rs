use glam::Vec2;
use serde::Serialize;

/// Travel direction. The discriminants are the signed encoding used by the
/// movement rules: reversing a direction negates it and `Stop` is its own
/// reverse.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
#[repr(i8)]
pub enum Direction {
    Stop = 0,
    Up = 1,
    Down = -1,
    Left = 2,
    Right = -2,
}

impl Direction {
    // Tie-break order.
    pub const CARDINALS: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    pub fn signed(self) -> i8 {
        self as i8
    }

    pub fn reverse(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
            Self::Stop => Self::Stop,
        }
    }

    pub fn is_reverse_of(self, other: Direction) -> bool {
        self != Self::Stop && self == other.reverse()
    }

    pub fn index(self) -> Option<usize> {
        match self {
            Self::Up => Some(0),
            Self::Down => Some(1),
            Self::Left => Some(2),
            Self::Right => Some(3),
            Self::Stop => None,
        }
    }

    pub fn unit_vector(self) -> Vec2 {
        match self {
            Self::Up => Vec2::new(0.0, -1.0),
            Self::Down => Vec2::new(0.0, 1.0),
            Self::Left => Vec2::new(-1.0, 0.0),
            Self::Right => Vec2::new(1.0, 0.0),
            Self::Stop => Vec2::ZERO,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Species {
    Direct,
    Ambush,
    Flank,
    Shy,
}

impl Species {
    pub const ALL: [Species; 4] = [
        Species::Direct,
        Species::Ambush,
        Species::Flank,
        Species::Shy,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Direct => "blinky",
            Self::Ambush => "pinky",
            Self::Flank => "inky",
            Self::Shy => "clyde",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Pacman,
    Ghost(Species),
    Fruit,
}

impl EntityKind {
    pub const ALL: [EntityKind; 6] = [
        EntityKind::Pacman,
        EntityKind::Ghost(Species::Direct),
        EntityKind::Ghost(Species::Ambush),
        EntityKind::Ghost(Species::Flank),
        EntityKind::Ghost(Species::Shy),
        EntityKind::Fruit,
    ];

    pub fn bit(self) -> u8 {
        let shift = match self {
            Self::Pacman => 0,
            Self::Ghost(Species::Direct) => 1,
            Self::Ghost(Species::Ambush) => 2,
            Self::Ghost(Species::Flank) => 3,
            Self::Ghost(Species::Shy) => 4,
            Self::Fruit => 5,
        };
        1 << shift
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GhostMode {
    Scatter,
    Chase,
    Freight,
    Spawn,
}

#[derive(Clone, Debug, Serialize)]
pub struct EntityView {
    pub x: f32,
    pub y: f32,
    pub dir: Direction,
    pub visible: bool,
}

#[derive(Clone, Debug, Serialize)]
pub struct GhostView {
    pub species: Species,
    pub x: f32,
    pub y: f32,
    pub dir: Direction,
    pub mode: GhostMode,
    pub visible: bool,
    pub points: u32,
}

#[derive(Clone, Debug, Serialize)]
pub struct FruitView {
    pub x: f32,
    pub y: f32,
    pub points: u32,
    #[serde(rename = "ageSecs")]
    pub age_secs: f32,
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RuntimeEvent {
    LevelStarted {
        level: u32,
    },
    PelletEaten {
        points: u32,
        power: bool,
    },
    GhostReleased {
        species: Species,
    },
    GhostModeChanged {
        species: Species,
        mode: GhostMode,
    },
    GhostCaptured {
        species: Species,
        points: u32,
    },
    PlayerDied {
        #[serde(rename = "livesLeft")]
        lives_left: u32,
    },
    FruitSpawned {
        points: u32,
    },
    FruitEaten {
        points: u32,
    },
    FruitExpired,
    LevelCleared {
        level: u32,
    },
    GameOver {
        score: u32,
    },
}

#[derive(Clone, Debug, Serialize)]
pub struct Snapshot {
    pub tick: u64,
    #[serde(rename = "elapsedSecs")]
    pub elapsed_secs: f32,
    pub level: u32,
    pub score: u32,
    pub lives: u32,
    pub paused: bool,
    #[serde(rename = "pelletsRemaining")]
    pub pellets_remaining: usize,
    pub player: EntityView,
    pub ghosts: Vec<GhostView>,
    pub fruit: Option<FruitView>,
    pub events: Vec<RuntimeEvent>,
}
